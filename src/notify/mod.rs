// Push notification payload construction

pub mod models;

pub use models::{Notification, NotificationAction, NotificationData};

use crate::config::NotifyConfig;

/// Build the notification for an incoming push message. The shape is
/// fixed; only the body varies with the push payload.
pub fn build_push_notification(payload: Option<String>, config: &NotifyConfig) -> Notification {
    Notification {
        title: config.title.clone(),
        body: payload.unwrap_or_else(|| config.default_body.clone()),
        icon: config.icon.clone(),
        badge: config.badge.clone(),
        vibrate: vec![200, 100, 200],
        data: NotificationData {
            url: config.target_url.clone(),
        },
        actions: vec![
            NotificationAction {
                action: "open".to_string(),
                title: config.open_title.clone(),
                icon: config.badge.clone(),
            },
            NotificationAction {
                action: "close".to_string(),
                title: config.close_title.clone(),
                icon: config.badge.clone(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_shape() {
        let config = NotifyConfig::default();
        let notification = build_push_notification(None, &config);

        assert_eq!(notification.title, config.title);
        assert_eq!(notification.body, config.default_body);
        assert_eq!(notification.vibrate, vec![200, 100, 200]);
        assert_eq!(notification.data.url, "/");
        assert_eq!(notification.actions.len(), 2);
        assert_eq!(notification.actions[0].action, "open");
        assert_eq!(notification.actions[1].action, "close");
    }

    #[test]
    fn test_push_payload_overrides_body() {
        let config = NotifyConfig::default();
        let notification = build_push_notification(Some("New post published".to_string()), &config);
        assert_eq!(notification.body, "New post published");
    }
}
