use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Fire-and-forget sink for user facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: String);

    fn success(&self, message: String) {
        self.notify(NotificationKind::Success, message)
    }

    fn error(&self, message: String) {
        self.notify(NotificationKind::Error, message)
    }
}

/// Keeps the most recent notifications until a client collects them.
pub struct NotificationLog {
    capacity: usize,
    queue: Mutex<VecDeque<Notification>>,
}

impl NotificationLog {
    pub fn new(capacity: usize) -> NotificationLog {
        NotificationLog {
            capacity: capacity.max(1),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        let queue = self.queue.lock().unwrap();
        queue.iter().cloned().collect()
    }

    pub fn drain(&self) -> Vec<Notification> {
        let mut queue = self.queue.lock().unwrap();
        queue.drain(..).collect()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, kind: NotificationKind, message: String) {
        match kind {
            NotificationKind::Success => tracing::info!(notification = %message),
            NotificationKind::Error => tracing::warn!(notification = %message),
        }
        let mut queue = self.queue.lock().unwrap();
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(Notification { kind, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_log() {
        let log = NotificationLog::new(10);
        log.success("one".to_string());
        log.error("two".to_string());
        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].kind, NotificationKind::Error);
        assert!(log.drain().is_empty());
    }

    #[test]
    fn oldest_entries_are_dropped_at_capacity() {
        let log = NotificationLog::new(2);
        for i in 0..3 {
            log.success(format!("{i}"));
        }
        let messages: Vec<String> = log.snapshot().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["1", "2"]);
    }
}
