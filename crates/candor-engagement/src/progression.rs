//! XP accounting and level derivation.
//!
//! The XP curve is quadratic: completing level L takes `50 * L^2` cumulative
//! XP, so the threshold to begin level L is `50 * (L-1)^2`. Level and the
//! progress fields are always derived from the XP total; nothing writes them
//! independently.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::counters::ActivityCounters;

/// Cumulative XP to finish level L is `XP_CURVE_BASE * L^2`.
pub const XP_CURVE_BASE: u64 = 50;

/// Fixed weighting of activity counters into XP.
pub const XP_PER_SAVE: u64 = 5;
pub const XP_PER_QUESTION: u64 = 10;
pub const XP_PER_REACTION: u64 = 2;
pub const XP_PER_STREAK_DAY: u64 = 20;

/// One-time bonus granted with every badge award.
pub const BADGE_BONUS_XP: i64 = 25;
/// One-time award for upgrading to premium.
pub const PREMIUM_UPGRADE_XP: i64 = 50;

/// Level and progress derived from an XP total.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: u32,
    pub xp_to_next_level: u64,
    /// Position within the current level, in [0, 1].
    pub progress_fraction: f64,
}

/// Derive level, XP-to-next, and progress from a total. Pure and total.
pub fn level_for(total_xp: u64) -> LevelInfo {
    let level = ((total_xp as f64) / (XP_CURVE_BASE as f64)).sqrt() as u32 + 1;

    let xp_for_current = XP_CURVE_BASE * (level as u64 - 1).pow(2);
    let xp_for_next = XP_CURVE_BASE * (level as u64).pow(2);
    let xp_to_next_level = xp_for_next.saturating_sub(total_xp);

    let span = xp_for_next - xp_for_current;
    let gained = total_xp.saturating_sub(xp_for_current);
    let progress_fraction = if span == 0 {
        0.0
    } else {
        ((gained as f64) / (span as f64)).clamp(0.0, 1.0)
    };

    LevelInfo {
        level,
        xp_to_next_level,
        progress_fraction,
    }
}

/// Final XP awarded for an action: premium doubles, negatives clamp to zero.
pub fn awarded_xp(amount: i64, is_premium: bool) -> u64 {
    let amount = amount.max(0) as u64;
    if is_premium { amount * 2 } else { amount }
}

/// XP a profile's activity counters are worth under the fixed weighting.
pub fn base_xp(counters: &ActivityCounters) -> u64 {
    counters.saved_advice as u64 * XP_PER_SAVE
        + counters.questions_asked as u64 * XP_PER_QUESTION
        + counters.reactions_given as u64 * XP_PER_REACTION
        + counters.daily_streak as u64 * XP_PER_STREAK_DAY
}

/// A user's XP total. Level and progress are views over it, never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    total_xp: u64,
}

impl Progression {
    pub fn new(total_xp: u64) -> Self {
        Self { total_xp }
    }

    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    pub fn level(&self) -> u32 {
        level_for(self.total_xp).level
    }

    pub fn info(&self) -> LevelInfo {
        level_for(self.total_xp)
    }

    /// Add XP for an action. Returns the new level when the award crossed a
    /// level boundary.
    pub fn add(&mut self, amount: i64, is_premium: bool) -> Option<u32> {
        let before = self.level();
        self.total_xp = self.total_xp.saturating_add(awarded_xp(amount, is_premium));
        let after = self.level();
        if after > before {
            info!(level = after, total_xp = self.total_xp, "level up");
            Some(after)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_zero() {
        let info = level_for(0);
        assert_eq!(info.level, 1);
        assert_eq!(info.xp_to_next_level, 50);
        assert_eq!(info.progress_fraction, 0.0);
    }

    #[test]
    fn test_level_boundary_exactly_at_threshold() {
        let info = level_for(50);
        assert_eq!(info.level, 2);
        assert_eq!(info.xp_to_next_level, 150);
        assert_eq!(info.progress_fraction, 0.0);
    }

    #[test]
    fn test_level_just_below_threshold() {
        let info = level_for(49);
        assert_eq!(info.level, 1);
        assert_eq!(info.xp_to_next_level, 1);
    }

    #[test]
    fn test_mid_level_progress() {
        // Level 2 spans 50..200; 125 is halfway.
        let info = level_for(125);
        assert_eq!(info.level, 2);
        assert_eq!(info.xp_to_next_level, 75);
        assert!((info.progress_fraction - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_level_monotonic_in_xp() {
        let mut last = 0;
        for total in 0..5_000u64 {
            let level = level_for(total).level;
            assert!(level >= 1);
            assert!(level >= last, "level regressed at total_xp={total}");
            last = level;
        }
    }

    #[test]
    fn test_premium_doubles_award() {
        assert_eq!(awarded_xp(10, true), 20);
        assert_eq!(awarded_xp(10, false), 10);
    }

    #[test]
    fn test_negative_award_treated_as_zero() {
        assert_eq!(awarded_xp(-25, false), 0);
        assert_eq!(awarded_xp(-25, true), 0);

        let mut progression = Progression::new(100);
        progression.add(-40, false);
        assert_eq!(progression.total_xp(), 100);
    }

    #[test]
    fn test_add_reports_level_up() {
        let mut progression = Progression::default();
        assert_eq!(progression.add(10, true), None); // 20 XP, still level 1
        assert_eq!(progression.total_xp(), 20);
        assert_eq!(progression.add(30, false), Some(2)); // crosses 50
        assert_eq!(progression.add(5, false), None);
    }

    #[test]
    fn test_base_xp_weighting() {
        let mut counters = ActivityCounters::default();
        counters.saved_advice = 18;
        counters.questions_asked = 7;
        counters.reactions_given = 45;
        counters.daily_streak = 12;
        // 18*5 + 7*10 + 45*2 + 12*20 = 490
        assert_eq!(base_xp(&counters), 490);
    }
}
