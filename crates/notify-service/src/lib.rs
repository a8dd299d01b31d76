//! # notify-service
//!
//! Business logic for the notification engine. Each component takes its
//! collaborators at construction time as `Arc` references; the
//! [`NotificationEngine`] composes them into the creation and query
//! pipelines.

pub mod clock;
pub mod delivery;
pub mod engine;
pub mod policy;
pub mod preference;
pub mod source;

pub use clock::{Clock, FixedClock, SystemClock};
pub use delivery::{
    DeferredDelivery, DeferredNotification, DeliverySink, DeliveryTracker, InAppSink,
    LoggingDeferral, LoggingSink, NoopPush, RealtimePush,
};
pub use engine::{CreateNotification, CreateOutcome, NotificationEngine, SkipReason};
pub use policy::{ChannelSelector, QuietHoursPolicy, SpamGuard};
pub use preference::PreferenceService;
pub use source::{FallbackSynthesizer, NotificationSource, PrimarySource};
