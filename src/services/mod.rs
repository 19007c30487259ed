/// Cancellable countdowns for the timed phases.
pub mod countdown;
/// Session setup and read-only projections.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Ordered forwarding of playback commands.
pub mod playback_worker;
/// Session driver applying actions and their side effects.
pub mod round_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
