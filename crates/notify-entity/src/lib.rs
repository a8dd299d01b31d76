//! # notify-entity
//!
//! Domain entity models for the notification engine. Every struct in this
//! crate represents a persisted row, a synthesized record, or a domain
//! value object. All entities derive `Debug`, `Clone`, `Serialize`, and
//! `Deserialize`.

pub mod activity;
pub mod notification;

pub use activity::{Comment, Interaction};
pub use notification::{
    ActionType, Channel, DeliveryRecord, DeliveryStatus, Notification, NotificationPage,
    NotificationPreference, PreferenceUpdate, Priority, ReadReceipt, SourceTag, SpamGuardRecord,
    SpamKey, UnreadCount,
};
