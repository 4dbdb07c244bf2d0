//! Push notification payload models.

use serde::{Deserialize, Serialize};

/// The fixed notification options shape shown for a push message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

/// Payload attached to the notification; carries the URL opened on click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationData {
    pub url: String,
}

/// One of the notification's buttons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}
