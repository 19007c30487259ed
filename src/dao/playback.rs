use std::{
    error::Error,
    sync::{Arc, Mutex, PoisonError},
};

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::info;

/// Result alias for playback operations.
pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// Failures reported by a playback controller.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No playback device is available to receive commands.
    #[error("no playback device available")]
    NoDevice,
    /// The device or its remote API rejected the command.
    #[error("playback command `{command}` failed: {message}")]
    Command {
        command: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
}

/// Remote control of the device streaming the tracks.
pub trait PlaybackController: Send + Sync {
    /// Start streaming the track identified by `uri` from its beginning.
    fn play_track(&self, uri: String) -> BoxFuture<'static, PlaybackResult<()>>;
    /// Pause the current stream.
    fn pause(&self) -> BoxFuture<'static, PlaybackResult<()>>;
    /// Resume the paused stream.
    fn resume(&self) -> BoxFuture<'static, PlaybackResult<()>>;
    /// Name of the device once it is ready to receive commands, `None` while it is not.
    fn ready_device(&self) -> BoxFuture<'static, PlaybackResult<Option<String>>>;
}

/// Playback command as observed by [`LoggingPlayback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackCall {
    Play(String),
    Pause,
    Resume,
}

/// Headless controller that only logs commands, used when no device is configured.
#[derive(Debug, Clone)]
pub struct LoggingPlayback {
    device_name: String,
    calls: Arc<Mutex<Vec<PlaybackCall>>>,
}

impl LoggingPlayback {
    /// Create a controller reporting itself ready under `device_name`.
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            calls: Arc::default(),
        }
    }

    /// Commands received so far, oldest first.
    pub fn calls(&self) -> Vec<PlaybackCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: PlaybackCall) {
        info!(device = %self.device_name, ?call, "playback command");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl PlaybackController for LoggingPlayback {
    fn play_track(&self, uri: String) -> BoxFuture<'static, PlaybackResult<()>> {
        self.record(PlaybackCall::Play(uri));
        Box::pin(async { Ok(()) })
    }

    fn pause(&self) -> BoxFuture<'static, PlaybackResult<()>> {
        self.record(PlaybackCall::Pause);
        Box::pin(async { Ok(()) })
    }

    fn resume(&self) -> BoxFuture<'static, PlaybackResult<()>> {
        self.record(PlaybackCall::Resume);
        Box::pin(async { Ok(()) })
    }

    fn ready_device(&self) -> BoxFuture<'static, PlaybackResult<Option<String>>> {
        let name = self.device_name.clone();
        Box::pin(async move { Ok(Some(name)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logging_playback_is_ready_and_records_calls() {
        let device = LoggingPlayback::new("Living Room");

        assert_eq!(
            device.ready_device().await.unwrap(),
            Some("Living Room".to_string())
        );
        device.play_track("spotify:track:a".into()).await.unwrap();
        device.pause().await.unwrap();
        device.resume().await.unwrap();

        assert_eq!(
            device.calls(),
            vec![
                PlaybackCall::Play("spotify:track:a".into()),
                PlaybackCall::Pause,
                PlaybackCall::Resume,
            ]
        );
    }
}
