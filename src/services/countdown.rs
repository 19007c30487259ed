//! Cancellable countdown driving the listening and guessing phases.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::debug;

struct Running {
    id: u64,
    deadline: Instant,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    next_id: u64,
    running: Option<Running>,
}

/// Countdown firing its completion at most once per start.
///
/// Starting a countdown supersedes the previous one, and stopping it before the deadline
/// guarantees the completion never runs.
#[derive(Clone)]
pub struct CountdownTimer {
    name: &'static str,
    slot: Arc<Mutex<Slot>>,
}

impl CountdownTimer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Arc::default(),
        }
    }

    /// Arm the countdown, running `on_elapsed` once `duration` has passed.
    pub fn start<F, Fut>(&self, duration: Duration, on_elapsed: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let deadline = Instant::now() + duration;
        let mut slot = self.lock();
        slot.next_id += 1;
        let id = slot.next_id;

        let weak_slot = Arc::downgrade(&self.slot);
        let name = self.name;
        let task = tokio::spawn(async move {
            sleep_until(deadline).await;

            let Some(slot) = weak_slot.upgrade() else {
                return;
            };
            {
                let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                match &slot.running {
                    Some(running) if running.id == id => slot.running = None,
                    _ => return,
                }
            }

            debug!(timer = name, "countdown elapsed");
            on_elapsed().await;
        });

        if let Some(previous) = slot.running.replace(Running { id, deadline, task }) {
            previous.task.abort();
        }
        debug!(timer = self.name, seconds = duration.as_secs(), "countdown started");
    }

    /// Cancel the countdown; its completion will not run.
    pub fn stop(&self) {
        if let Some(running) = self.lock().running.take() {
            running.task.abort();
            debug!(timer = self.name, "countdown stopped");
        }
    }

    /// Time left before the completion fires, `None` when idle.
    pub fn remaining(&self) -> Option<Duration> {
        self.lock()
            .running
            .as_ref()
            .map(|running| running.deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_running(&self) -> bool {
        self.lock().running.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::advance;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> std::future::Ready<()> + Clone) {
        let fired = Arc::new(AtomicUsize::new(0));
        let hook = {
            let fired = fired.clone();
            move || {
                fired.fetch_add(1, Ordering::SeqCst);
                std::future::ready(())
            }
        };
        (fired, hook)
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_duration() {
        let timer = CountdownTimer::new("test");
        let (fired, hook) = counter();

        timer.start(Duration::from_secs(10), hook);
        assert_eq!(timer.remaining(), Some(Duration::from_secs(10)));

        advance(Duration::from_secs(9)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(timer.remaining(), Some(Duration::from_secs(1)));

        advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_completion() {
        let timer = CountdownTimer::new("test");
        let (fired, hook) = counter();

        timer.start(Duration::from_secs(5), hook);
        advance(Duration::from_secs(3)).await;
        timer.stop();
        advance(Duration::from_secs(5)).await;
        settle().await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(timer.remaining(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_supersedes_previous_countdown() {
        let timer = CountdownTimer::new("test");
        let (fired, hook) = counter();

        timer.start(Duration::from_secs(5), hook.clone());
        advance(Duration::from_secs(3)).await;
        timer.start(Duration::from_secs(5), hook);

        advance(Duration::from_secs(3)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        advance(Duration::from_secs(3)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
