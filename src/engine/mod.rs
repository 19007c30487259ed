/// Normalization and fuzzy comparison of guessed names.
pub mod matcher;
/// Round scoring from guesses and placement outcome.
pub mod scoring;
/// Timeline placement validation and insertion.
pub mod timeline;
