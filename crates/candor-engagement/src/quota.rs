//! Guest daily-question quota.
//!
//! Unauthenticated sessions in guest mode may ask up to three questions per
//! calendar day. Day boundaries are detected lazily on the next permission
//! check; the component schedules nothing itself.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Questions a guest may ask per calendar day.
pub const DAILY_QUESTION_LIMIT: u32 = 3;
/// Sentinel returned by [`GuestQuota::remaining`] for authenticated users.
pub const UNLIMITED: i32 = -1;

/// The calendar day (UTC) a millisecond timestamp falls on.
pub fn calendar_day(timestamp_millis: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .unwrap_or_default()
        .date_naive()
}

/// Where a session stands with respect to the question quota.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessState {
    Authenticated,
    GuestWithinLimit,
    GuestAtLimit,
    Unauthenticated,
}

/// Outcome of a permission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotaDecision {
    pub permitted: bool,
    /// True when the check itself mutated the quota (day rollover reset);
    /// the caller must persist the new state.
    pub state_changed: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestQuota {
    pub questions_asked_today: u32,
    pub last_question_at: Option<i64>,
}

impl GuestQuota {
    pub fn new(questions_asked_today: u32, last_question_at: Option<i64>) -> Self {
        Self {
            questions_asked_today,
            last_question_at,
        }
    }

    /// Classify the session without mutating anything.
    pub fn access_state(&self, is_authenticated: bool, is_guest_mode: bool, now: i64) -> AccessState {
        if is_authenticated {
            return AccessState::Authenticated;
        }
        if !is_guest_mode {
            return AccessState::Unauthenticated;
        }
        match self.last_question_at {
            Some(last) if calendar_day(last) == calendar_day(now) => {
                if self.questions_asked_today < DAILY_QUESTION_LIMIT {
                    AccessState::GuestWithinLimit
                } else {
                    AccessState::GuestAtLimit
                }
            }
            // New day (or first ever): the counter is due for a reset.
            _ => AccessState::GuestWithinLimit,
        }
    }

    /// May the session ask a question right now?
    ///
    /// Authenticated users are always permitted and the quota is untouched.
    /// A guest crossing a day boundary gets the counter reset here; the
    /// decision reports `state_changed` so the caller persists the reset.
    pub fn can_ask(&mut self, is_authenticated: bool, is_guest_mode: bool, now: i64) -> QuotaDecision {
        if is_authenticated {
            return QuotaDecision {
                permitted: true,
                state_changed: false,
            };
        }
        if !is_guest_mode {
            return QuotaDecision {
                permitted: false,
                state_changed: false,
            };
        }

        match self.last_question_at {
            Some(last) if calendar_day(last) == calendar_day(now) => QuotaDecision {
                permitted: self.questions_asked_today < DAILY_QUESTION_LIMIT,
                state_changed: false,
            },
            _ => {
                debug!(previous = self.questions_asked_today, "guest quota reset for new day");
                self.questions_asked_today = 0;
                self.last_question_at = Some(now);
                QuotaDecision {
                    permitted: true,
                    state_changed: true,
                }
            }
        }
    }

    /// Record one asked question. Call only after a permitted [`GuestQuota::can_ask`];
    /// there is no internal deduplication.
    pub fn record_question(&mut self, now: i64) {
        self.questions_asked_today += 1;
        self.last_question_at = Some(now);
    }

    /// Questions left today: [`UNLIMITED`] when authenticated, 0 outside
    /// guest mode, otherwise the remainder of today's allowance.
    pub fn remaining(&self, is_authenticated: bool, is_guest_mode: bool) -> i32 {
        if is_authenticated {
            return UNLIMITED;
        }
        if !is_guest_mode {
            return 0;
        }
        DAILY_QUESTION_LIMIT.saturating_sub(self.questions_asked_today) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;
    const NOON: i64 = 1_700_000_000_000; // 2023-11-14T22:13:20Z

    #[test]
    fn test_authenticated_always_permitted() {
        let mut quota = GuestQuota::new(DAILY_QUESTION_LIMIT, Some(NOON));
        let decision = quota.can_ask(true, false, NOON);
        assert!(decision.permitted);
        assert!(!decision.state_changed);
        assert_eq!(quota.questions_asked_today, DAILY_QUESTION_LIMIT);
        assert_eq!(quota.remaining(true, false), UNLIMITED);
    }

    #[test]
    fn test_not_guest_never_permitted() {
        let mut quota = GuestQuota::default();
        assert!(!quota.can_ask(false, false, NOON).permitted);
        assert_eq!(quota.remaining(false, false), 0);
    }

    #[test]
    fn test_first_ask_resets_and_permits() {
        let mut quota = GuestQuota::default();
        let decision = quota.can_ask(false, true, NOON);
        assert!(decision.permitted);
        assert!(decision.state_changed);
        assert_eq!(quota.questions_asked_today, 0);
        assert_eq!(quota.last_question_at, Some(NOON));
    }

    #[test]
    fn test_guest_limit_reached_same_day() {
        let mut quota = GuestQuota::default();
        for i in 0..DAILY_QUESTION_LIMIT {
            let now = NOON + i as i64 * 60_000;
            assert!(quota.can_ask(false, true, now).permitted, "ask {i} should pass");
            quota.record_question(now);
        }
        assert_eq!(quota.questions_asked_today, 3);

        let fourth = quota.can_ask(false, true, NOON + 3 * 60_000);
        assert!(!fourth.permitted);
        assert!(!fourth.state_changed);
        assert_eq!(quota.remaining(false, true), 0);
    }

    #[test]
    fn test_day_rollover_resets_counter() {
        let mut quota = GuestQuota::new(DAILY_QUESTION_LIMIT, Some(NOON));
        assert!(!quota.can_ask(false, true, NOON).permitted);

        let tomorrow = NOON + DAY_MS;
        let decision = quota.can_ask(false, true, tomorrow);
        assert!(decision.permitted);
        assert!(decision.state_changed);
        assert_eq!(quota.questions_asked_today, 0);

        quota.record_question(tomorrow);
        assert_eq!(quota.questions_asked_today, 1);
        assert_eq!(quota.remaining(false, true), 2);
    }

    #[test]
    fn test_rollover_detected_lazily_mid_session() {
        let mut quota = GuestQuota::default();
        quota.can_ask(false, true, NOON);
        quota.record_question(NOON);

        // No background timer: nothing happens until the next check.
        assert_eq!(quota.questions_asked_today, 1);
        let next_day_check = quota.can_ask(false, true, NOON + DAY_MS);
        assert!(next_day_check.permitted);
        assert!(next_day_check.state_changed);
    }

    #[test]
    fn test_access_state_classification() {
        let quota = GuestQuota::new(DAILY_QUESTION_LIMIT, Some(NOON));
        assert_eq!(quota.access_state(true, false, NOON), AccessState::Authenticated);
        assert_eq!(quota.access_state(false, false, NOON), AccessState::Unauthenticated);
        assert_eq!(quota.access_state(false, true, NOON), AccessState::GuestAtLimit);
        // Next day the same counter no longer binds.
        assert_eq!(
            quota.access_state(false, true, NOON + DAY_MS),
            AccessState::GuestWithinLimit
        );
    }

    #[test]
    fn test_remaining_floors_at_zero() {
        let quota = GuestQuota::new(DAILY_QUESTION_LIMIT + 2, Some(NOON));
        assert_eq!(quota.remaining(false, true), 0);
    }
}
