//! Do-not-disturb window evaluation.

use chrono::{DateTime, NaiveTime, Timelike, Utc};

use notify_entity::NotificationPreference;

/// Decides whether an instant falls inside a user's quiet hours.
///
/// Times of day are compared at minute resolution in UTC. Both bounds are
/// inclusive. A window whose start is later than its end wraps midnight.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuietHoursPolicy;

impl QuietHoursPolicy {
    /// Creates the policy.
    pub fn new() -> Self {
        Self
    }

    /// Whether `now` is inside the configured window. Missing bounds mean
    /// the user has no quiet hours.
    pub fn is_quiet_hours(&self, preference: &NotificationPreference, now: DateTime<Utc>) -> bool {
        let (Some(start), Some(end)) = (preference.quiet_hours_start, preference.quiet_hours_end)
        else {
            return false;
        };

        let t = now.hour() * 60 + now.minute();
        let start = minute_of_day(start);
        let end = minute_of_day(end);

        if start > end {
            t >= start || t <= end
        } else {
            t >= start && t <= end
        }
    }
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
