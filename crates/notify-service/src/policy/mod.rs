//! Creation-time policies: quiet hours, channel routing, and duplicate
//! suppression.

pub mod channel;
pub mod quiet_hours;
pub mod spam_guard;

pub use channel::ChannelSelector;
pub use quiet_hours::QuietHoursPolicy;
pub use spam_guard::SpamGuard;
