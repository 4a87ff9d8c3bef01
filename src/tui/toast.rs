//! Auto-dismissing notifications for the terminal form.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::notify::{Notification, NotificationSink};

/// Toasts live until their life runs out, however many arrive meanwhile.
/// The draw code decides how many fit on screen.
#[derive(Debug)]
pub struct ToastSink {
    life: Duration,
    toasts: VecDeque<(Notification, Instant)>,
}

impl ToastSink {
    pub fn new(life: Duration) -> Self {
        Self {
            life,
            toasts: VecDeque::new(),
        }
    }

    /// Drop every toast shown for at least its life as of `now`.
    pub fn expire(&mut self, now: Instant) {
        let life = self.life;
        self.toasts
            .retain(|(_, shown)| now.saturating_duration_since(*shown) < life);
    }

    /// Newest first.
    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.toasts.iter().rev().map(|(n, _)| n)
    }

    fn push(&mut self, notification: Notification, now: Instant) {
        self.toasts.push_back((notification, now));
    }
}

impl NotificationSink for ToastSink {
    fn notify(&mut self, notification: Notification) {
        self.push(notification, Instant::now());
    }
}
