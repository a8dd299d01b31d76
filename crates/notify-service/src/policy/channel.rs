//! Delivery channel routing.

use notify_entity::{ActionType, Channel, NotificationPreference};

/// Maps preferences and action type to channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelSelector;

impl ChannelSelector {
    /// Creates the selector.
    pub fn new() -> Self {
        Self
    }

    /// Primary channel recorded on the notification. Never empty: when
    /// every channel is switched off the result is `in_app`.
    pub fn select_channel(&self, preference: &NotificationPreference, action: &ActionType) -> Channel {
        if *action == ActionType::Download && preference.email_notifications {
            return Channel::Email;
        }
        if preference.in_app_notifications {
            return Channel::InApp;
        }
        Channel::ALL
            .into_iter()
            .find(|c| preference.channel_enabled(*c))
            .unwrap_or(Channel::InApp)
    }

    /// Channels a new notification is dispatched through. In-app is always
    /// included since the persisted row is what the in-app inbox reads.
    pub fn eligible_channels(&self, preference: &NotificationPreference) -> Vec<Channel> {
        let mut channels = vec![Channel::InApp];
        if preference.email_notifications {
            channels.push(Channel::Email);
        }
        if preference.push_notifications {
            channels.push(Channel::Push);
        }
        channels
    }
}
