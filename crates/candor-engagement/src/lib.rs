//! Engagement engine for Candor: XP/leveling and badges, the guest
//! daily-question quota, the advice card deck, and per-card reaction
//! tallies. Everything here is a synchronous value transformation over
//! explicit state; clocks and randomness are injected, and all I/O lives
//! behind the collaborator traits in [`store`].

pub mod badges;
pub mod card;
pub mod counters;
pub mod deck;
pub mod error;
pub mod progression;
pub mod quota;
pub mod reactions;
pub mod session;
pub mod store;

pub use badges::{BADGE_PASS_LIMIT, Badge, BadgeRule, CATALOG, badge, newly_earned};
pub use card::{CardId, ContentCard, Persona, Reaction, card_id};
pub use counters::{ActivityCounters, StreakUpdate};
pub use deck::{
    Deck, LOW_WATER_MARK, RELOAD_QUEUE_LEN, REPLENISH_SAMPLE, ReloadOutcome, SwipeAction,
    SwipeOutcome,
};
pub use error::EngagementError;
pub use progression::{
    BADGE_BONUS_XP, LevelInfo, PREMIUM_UPGRADE_XP, Progression, XP_CURVE_BASE, awarded_xp,
    base_xp, level_for,
};
pub use quota::{AccessState, DAILY_QUESTION_LIMIT, GuestQuota, QuotaDecision, UNLIMITED};
pub use reactions::{ToggleOutcome, mirror_reactions, toggle_reaction};
pub use session::{AskOutcome, EngagementSession, MAX_QUESTION_LEN};
pub use store::{
    AdviceGenerator, CannedAdviceGenerator, ContentSource, GeneratedAdvice, InMemoryKvStore,
    KvStore, StaticContentSource,
};
