//! Badge catalog and award evaluation.
//!
//! The catalog is a fixed slice, closed at compile time. Every entry pairs a
//! badge id with an explicit rule over the activity counters, level, and
//! premium flag; there is no open-ended predicate dispatch. Earned badges
//! only accumulate.

use std::collections::BTreeSet;

use crate::card::Persona;
use crate::counters::ActivityCounters;

/// Passes a single award batch may run. Two is enough for the one chain the
/// catalog contains: badge-bonus XP lifting the level across a level rule.
pub const BADGE_PASS_LIMIT: usize = 2;

/// Rule a badge is awarded under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeRule {
    QuestionsAsked(u32),
    AdviceSaved(u32),
    SavesFromPersona(Persona, u32),
    ReactionsGiven(u32),
    StreakDays(u32),
    LevelReached(u32),
    PersonasUsed(u32),
    Premium,
}

impl BadgeRule {
    pub fn is_met(&self, counters: &ActivityCounters, level: u32, is_premium: bool) -> bool {
        match *self {
            BadgeRule::QuestionsAsked(n) => counters.questions_asked >= n,
            BadgeRule::AdviceSaved(n) => counters.saved_advice >= n,
            BadgeRule::SavesFromPersona(persona, n) => counters.saves_for(persona) >= n,
            BadgeRule::ReactionsGiven(n) => counters.reactions_given >= n,
            BadgeRule::StreakDays(n) => counters.daily_streak >= n,
            BadgeRule::LevelReached(n) => level >= n,
            BadgeRule::PersonasUsed(n) => counters.personas_used.len() as u32 >= n,
            BadgeRule::Premium => is_premium,
        }
    }
}

/// Immutable catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub requirement: &'static str,
    pub rule: BadgeRule,
}

/// The full badge catalog, fixed at process start.
pub const CATALOG: &[Badge] = &[
    Badge {
        id: "first_question",
        name: "Curious Cat",
        emoji: "\u{1F431}",
        requirement: "Ask 1 question",
        rule: BadgeRule::QuestionsAsked(1),
    },
    Badge {
        id: "ghostbuster",
        name: "Ghostbuster",
        emoji: "\u{1F47B}",
        requirement: "Save 5 No-BS Sis advice",
        rule: BadgeRule::SavesFromPersona(Persona::NoBsSis, 5),
    },
    Badge {
        id: "queen_energy",
        name: "Queen Energy",
        emoji: "\u{1F451}",
        requirement: "Reach Level 5",
        rule: BadgeRule::LevelReached(5),
    },
    Badge {
        id: "advice_collector",
        name: "Wisdom Seeker",
        emoji: "\u{1F4DA}",
        requirement: "Save 25 advice cards",
        rule: BadgeRule::AdviceSaved(25),
    },
    Badge {
        id: "streak_master",
        name: "Consistency Queen",
        emoji: "\u{1F525}",
        requirement: "7-day streak",
        rule: BadgeRule::StreakDays(7),
    },
    Badge {
        id: "persona_explorer",
        name: "Open Minded",
        emoji: "\u{1F9E0}",
        requirement: "Use all 3 personas",
        rule: BadgeRule::PersonasUsed(3),
    },
    Badge {
        id: "premium_member",
        name: "VIP Member",
        emoji: "\u{1F48E}",
        requirement: "Upgrade to Premium",
        rule: BadgeRule::Premium,
    },
    Badge {
        id: "level_master",
        name: "XP Legend",
        emoji: "\u{2B50}",
        requirement: "Reach Level 10",
        rule: BadgeRule::LevelReached(10),
    },
    Badge {
        id: "social_butterfly",
        name: "Social Butterfly",
        emoji: "\u{1F98B}",
        requirement: "Give 100 reactions",
        rule: BadgeRule::ReactionsGiven(100),
    },
];

/// Look up a catalog entry by id.
pub fn badge(id: &str) -> Option<&'static Badge> {
    CATALOG.iter().find(|b| b.id == id)
}

/// One evaluation pass: every catalog entry not yet earned whose rule is met
/// right now. Never yields an already-earned id.
pub fn newly_earned(
    counters: &ActivityCounters,
    level: u32,
    is_premium: bool,
    earned: &BTreeSet<String>,
) -> Vec<&'static Badge> {
    CATALOG
        .iter()
        .filter(|b| !earned.contains(b.id))
        .filter(|b| b.rule.is_met(counters, level, is_premium))
        .collect()
}
