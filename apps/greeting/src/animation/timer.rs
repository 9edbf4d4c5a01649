//! A window that opens on request and closes by itself after a fixed duration.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub struct TimedWindow {
    duration: Duration,
    active: Arc<watch::Sender<bool>>,
    timer: Option<JoinHandle<()>>,
}

impl TimedWindow {
    pub fn new(duration: Duration) -> Self {
        let (active, _) = watch::channel(false);
        Self {
            duration,
            active: Arc::new(active),
            timer: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_active(&self) -> bool {
        *self.active.borrow()
    }

    /// Opens the window, restarting the close timer if it was already open.
    /// Must be called from within a tokio runtime.
    pub fn open(&mut self) {
        self.cancel_timer();
        self.active.send_replace(true);

        // Deadline is fixed here, not when the task is first polled.
        let deadline = Instant::now() + self.duration;
        let active = Arc::clone(&self.active);
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            active.send_replace(false);
        }));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for TimedWindow {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
