//! Collaborator seams: catalog, playback device and credentials, plus their adapters.

pub mod credentials;
pub mod playback;
#[cfg(feature = "spotify")]
pub mod spotify;
pub mod track_source;
