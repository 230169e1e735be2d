//! User-facing notifications
//!
//! Components that report success or failure get a `Notifier` at
//! construction. The simulator's implementation is a timestamped log.

use chrono::{DateTime, Local};
use std::cell::RefCell;
use std::rc::Rc;

/// Capability to show feedback on the surface
pub trait Notifier {
    /// Transient message after a successful action
    fn show_notification(&self, text: &str);

    /// Blocking message the user has to acknowledge, used for host limits
    fn expect_dialog(&self, text: &str);
}

pub type SharedNotifier = Rc<dyn Notifier>;

/// Message texts
pub mod message {
    pub const TRACK_LIMIT_REACHED: &str = "Cannot create more tracks. Track limit reached.";
    pub const MAX_RETURN_TRACKS_REACHED: &str =
        "Cannot create more return tracks. Return track limit reached.";
    pub const SCENE_LIMIT_REACHED: &str = "Cannot create more scenes. Scene limit reached.";

    pub fn capture_and_insert_scene(scene_name: &str) -> String {
        format!("Captured and inserted scene {}", scene_name)
    }

    pub fn duplicate_loop(length: &str) -> String {
        format!("Loop duplicated. New length: {}", length)
    }

    pub fn delete_clip(clip_name: &str) -> String {
        format!("Clip deleted: {}", clip_name)
    }

    pub fn delete_scene(scene_name: &str) -> String {
        format!("Scene deleted: {}", scene_name)
    }

    pub fn delete_envelope(automation: &str) -> String {
        format!("Delete automation: {}", automation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Notification,
    Dialog,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub timestamp: DateTime<Local>,
    pub kind: NotificationKind,
    pub text: String,
}

/// Keeps the most recent notifications for display
#[derive(Debug)]
pub struct NotificationLog {
    entries: RefCell<Vec<Notification>>,
    capacity: usize,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(100)
    }
}

impl NotificationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            capacity,
        }
    }

    fn push(&self, kind: NotificationKind, text: &str) {
        tracing::info!(?kind, "{}", text);
        let mut entries = self.entries.borrow_mut();
        entries.insert(
            0,
            Notification {
                timestamp: Local::now(),
                kind,
                text: text.to_string(),
            },
        );
        entries.truncate(self.capacity);
    }

    /// Newest first
    pub fn recent(&self, count: usize) -> Vec<Notification> {
        self.entries.borrow().iter().take(count).cloned().collect()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.entries.borrow().first().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

impl Notifier for NotificationLog {
    fn show_notification(&self, text: &str) {
        self.push(NotificationKind::Notification, text);
    }

    fn expect_dialog(&self, text: &str) {
        self.push(NotificationKind::Dialog, text);
    }
}
