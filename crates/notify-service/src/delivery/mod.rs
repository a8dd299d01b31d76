//! Outbound delivery: channel sinks with an audit trail, real-time push,
//! and quiet-hours deferral.

pub mod deferred;
pub mod push;
pub mod sink;
pub mod tracker;

pub use deferred::{DeferredDelivery, DeferredNotification, LoggingDeferral};
pub use push::{NoopPush, RealtimePush};
pub use sink::{DeliverySink, InAppSink, LoggingSink};
pub use tracker::DeliveryTracker;
