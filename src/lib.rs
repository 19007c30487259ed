//! Library crate for timeline-quiz-back, exposing modules for the binary and tests.

pub mod config;
pub mod dao;
pub mod dto;
pub mod engine;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
