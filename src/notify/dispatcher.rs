use std::sync::Arc;

use tracing::trace;

use super::MessageSink;
use super::PermissionStore;
use super::SoundCue;
use super::SoundPlayer;
use super::TransientMessage;
use crate::constants::*;
use crate::metrics::NOTIFICATIONS_DISPATCHED;
use crate::utils::async_task::spawn_side_effect;
use crate::ChangeEvent;
use crate::EventType;
use crate::NotificationConfig;
use crate::RoleId;
use crate::SubscriptionScope;

/// What was dispatched for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub table: String,
    pub title: String,
    pub description: String,
    pub cue: SoundCue,
}

pub struct NotificationDispatcher {
    config: NotificationConfig,
    sound: Arc<dyn SoundPlayer>,
    messages: Arc<dyn MessageSink>,
    permission: Arc<dyn PermissionStore>,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NotificationDispatcher {
    pub fn new(
        config: NotificationConfig,
        sound: Arc<dyn SoundPlayer>,
        messages: Arc<dyn MessageSink>,
        permission: Arc<dyn PermissionStore>,
    ) -> Self {
        Self {
            config,
            sound,
            messages,
            permission,
        }
    }

    /// Shows a toast and starts a sound for a qualifying INSERT.
    ///
    /// Returns `None` when nothing was dispatched: another event type, an
    /// unmapped table, disabled notifications, or no permission. Playback
    /// runs on its own task; this call never waits for it.
    pub fn notify(
        &self,
        event: &ChangeEvent,
        scope: &SubscriptionScope,
    ) -> Option<Notification> {
        if event.event_type != EventType::Insert || !self.config.enabled {
            return None;
        }
        if !self.permission.notifications_granted() {
            trace!(table = %event.table, "notification permission not granted");
            return None;
        }

        let notification = describe(event, scope)?;

        self.messages.show(TransientMessage {
            title: notification.title.clone(),
            description: notification.description.clone(),
            duration: self.config.toast_duration(),
        });

        let sound = self.sound.clone();
        let cue = notification.cue;
        spawn_side_effect("notification-sound", async move { sound.play(cue).await });

        NOTIFICATIONS_DISPATCHED.with_label_values(&[notification.table.as_str()]).inc();
        Some(notification)
    }
}

/// Maps an inserted row to `(title, description, cue)`; `None` for tables
/// that do not notify.
pub(crate) fn describe(
    event: &ChangeEvent,
    scope: &SubscriptionScope,
) -> Option<Notification> {
    let field = |key: &str| event.new_field(key);
    let room = field("room_number").map(|r| format!("Room {r}"));

    let (title, description, cue) = match event.table.as_str() {
        GUEST_REQUESTS => {
            let request = field("request_type").unwrap_or_else(|| "Service request".to_string());
            let description = match room {
                Some(room) => format!("{room}: {request}"),
                None => request,
            };
            ("New Guest Request".to_string(), description, SoundCue::HighPriorityChime)
        }
        QR_ORDERS => {
            let description = match room {
                Some(room) => format!("{room} placed an order"),
                None => "A guest placed an order".to_string(),
            };
            ("New Order".to_string(), description, SoundCue::NewOrder)
        }
        GUEST_MESSAGES => {
            let description = field("message").unwrap_or_else(|| "A guest sent a message".to_string());
            ("New Guest Message".to_string(), description, SoundCue::Message)
        }
        STAFF_NOTIFICATIONS => {
            if !is_addressed_to(event, scope) {
                return None;
            }
            let title = field("title").unwrap_or_else(|| "Staff Notification".to_string());
            let description = field("message").unwrap_or_default();
            (title, description, SoundCue::StaffAlert)
        }
        PAYMENTS => {
            let description = match field("amount") {
                Some(amount) => format!("Amount: {amount}"),
                None => "A payment was recorded".to_string(),
            };
            ("Payment Received".to_string(), description, SoundCue::Payment)
        }
        _ => return None,
    };

    Some(Notification {
        table: event.table.clone(),
        title,
        description,
        cue,
    })
}

/// Staff notifications may target one user or one role; untargeted ones go
/// to everyone subscribed.
fn is_addressed_to(
    event: &ChangeEvent,
    scope: &SubscriptionScope,
) -> bool {
    if let Some(recipient) = event.new_field("recipient_id") {
        if scope.user_id() != Some(recipient.as_str()) {
            return false;
        }
    }
    if let Some(target) = event.new_field("target_role") {
        if &RoleId::from(target.as_str()) != scope.role() {
            return false;
        }
    }
    true
}
