//! Notification domain entities.

pub mod action;
pub mod channel;
pub mod delivery;
pub mod model;
pub mod page;
pub mod preference;
pub mod priority;
pub mod spam;

pub use action::ActionType;
pub use channel::Channel;
pub use delivery::{DeliveryRecord, DeliveryStatus};
pub use model::{Notification, ReadReceipt};
pub use page::{NotificationPage, SourceTag, UnreadCount};
pub use preference::{NotificationPreference, PreferenceUpdate};
pub use priority::Priority;
pub use spam::{SpamGuardRecord, SpamKey};
