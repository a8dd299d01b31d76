//! PostgreSQL implementations of the store traits.

pub mod activity;
pub mod delivery;
pub mod notification;
pub mod preference;
pub mod spam_guard;
pub mod transactional;

pub use activity::ActivityRepository;
pub use delivery::DeliveryRepository;
pub use notification::NotificationRepository;
pub use preference::PreferenceRepository;
pub use spam_guard::SpamGuardRepository;
pub use transactional::TransactionalRepository;

/// `LIMIT`/`OFFSET` bind value; Postgres rejects negatives, so clamp.
pub(crate) fn sql_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
