//! Ordered delivery of playback commands to the device controller.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::dao::playback::PlaybackController;

enum Command {
    Play(String),
    Pause,
    Flush(oneshot::Sender<()>),
}

/// Queue feeding a background task that forwards commands one at a time, so a pause
/// can never overtake the play it follows.
#[derive(Clone)]
pub struct PlaybackWorker {
    tx: mpsc::UnboundedSender<Command>,
}

impl PlaybackWorker {
    /// Spawn the worker on the current runtime.
    pub fn spawn(controller: Arc<dyn PlaybackController>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();

        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                let result = match command {
                    Command::Play(uri) => controller.play_track(uri).await,
                    Command::Pause => controller.pause().await,
                    Command::Flush(done) => {
                        let _ = done.send(());
                        continue;
                    }
                };

                if let Err(err) = result {
                    warn!(error = %err, "playback command failed");
                }
            }
        });

        Self { tx }
    }

    pub fn play(&self, uri: String) {
        self.send(Command::Play(uri));
    }

    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    /// Wait until every command queued so far has been forwarded.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        self.send(Command::Flush(done));
        let _ = wait.await;
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("playback worker stopped; dropping command");
        }
    }
}
