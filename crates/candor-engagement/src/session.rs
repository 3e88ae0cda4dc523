//! Per-session engagement hub.
//!
//! One `EngagementSession` owns one user's progression, counters, earned
//! badges, quota, and deck, and applies one action at a time: action in, new
//! state out. Callers serialize actions; the hub persists quota and profile
//! snapshots through the key-value seam after every mutation and degrades to
//! zeroed defaults when a read fails.

use rand::Rng;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::badges::{self, BADGE_PASS_LIMIT, Badge};
use crate::card::{CardId, ContentCard, Persona, Reaction};
use crate::counters::{ActivityCounters, StreakUpdate};
use crate::deck::{Deck, ReloadOutcome, SwipeAction, SwipeOutcome};
use crate::error::EngagementError;
use crate::progression::{
    BADGE_BONUS_XP, PREMIUM_UPGRADE_XP, Progression, XP_PER_QUESTION, XP_PER_REACTION,
    XP_PER_SAVE, XP_PER_STREAK_DAY,
};
use crate::quota::{AccessState, GuestQuota};
use crate::reactions::ToggleOutcome;
use crate::store::{AdviceGenerator, ContentSource, GeneratedAdvice, InMemoryKvStore, KvStore};

type Result<T> = std::result::Result<T, EngagementError>;

/// Longest accepted question, in characters.
pub const MAX_QUESTION_LEN: usize = 500;

/// Keys the session persists under.
pub mod keys {
    pub const QUESTIONS_ASKED_TODAY: &str = "questions_asked_today";
    pub const LAST_QUESTION_AT: &str = "last_question_at";
    pub const DEFAULT_PERSONA: &str = "default_persona";
    pub const PROGRESSION: &str = "progression";
    pub const COUNTERS: &str = "counters";
    pub const EARNED_BADGES: &str = "earned_badges";
}

/// Result of asking for advice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AskOutcome {
    Advice(ContentCard),
    /// The input tripped moderation; nothing was counted.
    Flagged,
    /// The guest daily quota is spent.
    LimitReached,
    /// Empty or oversized input; nothing was counted.
    InvalidInput,
}

pub struct EngagementSession<K: KvStore> {
    store: K,
    is_authenticated: bool,
    is_guest_mode: bool,
    is_premium: bool,
    default_persona: Persona,
    progression: Progression,
    counters: ActivityCounters,
    earned_badges: BTreeSet<String>,
    quota: GuestQuota,
    deck: Deck,
    /// Generated advice, newest first.
    advice_history: Vec<ContentCard>,
}

impl EngagementSession<InMemoryKvStore> {
    /// Session over an in-memory store, for tests and standalone use.
    pub fn in_memory() -> Self {
        Self::load(InMemoryKvStore::new())
    }
}

impl<K: KvStore> EngagementSession<K> {
    /// Open a session, hydrating persisted state from the store. Any read
    /// failure degrades to the zeroed default for that piece of state.
    pub fn load(store: K) -> Self {
        let mut session = Self {
            store,
            is_authenticated: false,
            is_guest_mode: false,
            is_premium: false,
            default_persona: Persona::default(),
            progression: Progression::default(),
            counters: ActivityCounters::default(),
            earned_badges: BTreeSet::new(),
            quota: GuestQuota::default(),
            deck: Deck::new(),
            advice_history: Vec::new(),
        };
        session.hydrate();
        session
    }

    fn hydrate(&mut self) {
        let asked = self
            .read_string(keys::QUESTIONS_ASKED_TODAY)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let last = self
            .read_string(keys::LAST_QUESTION_AT)
            .and_then(|s| s.parse().ok());
        self.quota = GuestQuota::new(asked, last);

        if let Some(persona) = self
            .read_string(keys::DEFAULT_PERSONA)
            .and_then(|tag| Persona::from_tag(&tag))
        {
            self.default_persona = persona;
        }

        if let Some(progression) = self.read_json(keys::PROGRESSION) {
            self.progression = progression;
        }
        if let Some(counters) = self.read_json(keys::COUNTERS) {
            self.counters = counters;
        }
        if let Some(earned) = self.read_json(keys::EARNED_BADGES) {
            self.earned_badges = earned;
        }
    }

    // -----------------------------------------------------------------------
    // Identity flags (owned by the auth collaborator, mirrored here)
    // -----------------------------------------------------------------------

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.is_authenticated = authenticated;
    }

    pub fn enable_guest_mode(&mut self) {
        self.is_guest_mode = true;
    }

    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    /// Flip the premium flag on, with its one-time XP award. Idempotent.
    pub fn upgrade_to_premium(&mut self) -> Result<()> {
        if self.is_premium {
            return Ok(());
        }
        self.is_premium = true;
        info!("premium upgrade");
        self.progression.add(PREMIUM_UPGRADE_XP, self.is_premium);
        self.run_badge_passes();
        self.persist_profile()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn counters(&self) -> &ActivityCounters {
        &self.counters
    }

    pub fn earned_badges(&self) -> &BTreeSet<String> {
        &self.earned_badges
    }

    pub fn quota(&self) -> &GuestQuota {
        &self.quota
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn default_persona(&self) -> Persona {
        self.default_persona
    }

    pub fn advice_history(&self) -> &[ContentCard] {
        &self.advice_history
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut K {
        &mut self.store
    }

    pub fn access_state(&self, now: i64) -> AccessState {
        self.quota
            .access_state(self.is_authenticated, self.is_guest_mode, now)
    }

    pub fn remaining_questions(&self) -> i32 {
        self.quota
            .remaining(self.is_authenticated, self.is_guest_mode)
    }

    // -----------------------------------------------------------------------
    // Preferences
    // -----------------------------------------------------------------------

    /// Choose the default advisor persona. Persisted immediately; counts as
    /// persona usage for the explorer badge.
    pub fn set_default_persona(&mut self, persona: Persona) -> Result<()> {
        self.default_persona = persona;
        self.counters.record_persona_used(persona);
        self.run_badge_passes();
        self.store.set(keys::DEFAULT_PERSONA, persona.tag())?;
        self.persist_profile()
    }

    // -----------------------------------------------------------------------
    // Asking
    // -----------------------------------------------------------------------

    /// May this session ask a question right now? A day-rollover reset is
    /// persisted as a side effect.
    pub fn can_ask_question(&mut self, now: i64) -> Result<bool> {
        let decision = self
            .quota
            .can_ask(self.is_authenticated, self.is_guest_mode, now);
        if decision.state_changed {
            self.persist_quota()?;
        }
        Ok(decision.permitted)
    }

    /// Ask for advice in the given persona's voice.
    ///
    /// Counters, quota, and XP move only when advice actually comes back;
    /// invalid input, a spent quota, a moderation flag, or a generation
    /// failure all leave them untouched.
    pub fn ask_question<G: AdviceGenerator>(
        &mut self,
        input: &str,
        persona: Persona,
        generator: &G,
        now: i64,
    ) -> Result<AskOutcome> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_QUESTION_LEN {
            return Ok(AskOutcome::InvalidInput);
        }

        if !self.can_ask_question(now)? {
            debug!("question blocked by guest quota");
            return Ok(AskOutcome::LimitReached);
        }

        let advice = match generator.generate(trimmed, persona)? {
            GeneratedAdvice::Advice(text) => text,
            GeneratedAdvice::Flagged => return Ok(AskOutcome::Flagged),
        };

        if !self.is_authenticated && self.is_guest_mode {
            self.quota.record_question(now);
            self.persist_quota()?;
        }

        self.counters.record_question_asked(persona);
        self.progression.add(XP_PER_QUESTION as i64, self.is_premium);
        self.run_badge_passes();

        let card = ContentCard::new(advice, persona, now);
        self.advice_history.insert(0, card.clone());
        self.persist_profile()?;
        Ok(AskOutcome::Advice(card))
    }

    // -----------------------------------------------------------------------
    // Feed
    // -----------------------------------------------------------------------

    /// Fetch a fresh pool from the content source and re-deal the queue. An
    /// unavailable source degrades to an empty pool (the caught-up state).
    pub fn refresh_feed<C: ContentSource, R: Rng + ?Sized>(
        &mut self,
        source: &C,
        rng: &mut R,
    ) -> ReloadOutcome {
        match source.list_cards() {
            Ok(cards) => self.deck.set_pool(cards),
            Err(e) => {
                warn!("content source unavailable, treating pool as empty: {e}");
                self.deck.set_pool(Vec::new());
            }
        }
        self.deck.reload(rng)
    }

    /// Re-deal the queue from the already known pool.
    pub fn reload_deck<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ReloadOutcome {
        self.deck.reload(rng)
    }

    /// Swipe the front card away. A save feeds the counters and XP; a
    /// dismiss only advances the queue.
    pub fn swipe<R: Rng + ?Sized>(
        &mut self,
        action: SwipeAction,
        card_id: CardId,
        rng: &mut R,
    ) -> Result<SwipeOutcome> {
        let persona = self
            .deck
            .front()
            .filter(|card| card.id == card_id)
            .map(|card| card.persona);

        let outcome = self.deck.advance(action, card_id, rng);
        if let (
            SwipeOutcome::Advanced {
                newly_saved: true, ..
            },
            Some(persona),
        ) = (outcome, persona)
        {
            self.counters.record_advice_saved(persona);
            self.progression.add(XP_PER_SAVE as i64, self.is_premium);
            self.run_badge_passes();
            self.persist_profile()?;
        }
        Ok(outcome)
    }

    /// Toggle a reaction on a card, wherever this session holds it.
    /// Attributing a reaction counts toward activity; clearing one does not
    /// un-count it.
    pub fn react(&mut self, card_id: CardId, kind: Reaction) -> Result<Option<ToggleOutcome>> {
        let outcome = self.deck.toggle_reaction(card_id, kind);
        if outcome.is_some_and(|o| o.is_set()) {
            self.counters.record_reaction_given();
            self.progression.add(XP_PER_REACTION as i64, self.is_premium);
            self.run_badge_passes();
            self.persist_profile()?;
        }
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Visits
    // -----------------------------------------------------------------------

    /// Mark a session visit, rolling the daily streak forward. New streak
    /// days earn streak XP; repeat visits on the same day do nothing.
    pub fn record_visit(&mut self, now: i64) -> Result<StreakUpdate> {
        let update = self.counters.record_visit(now);
        if update != StreakUpdate::SameDay {
            self.progression
                .add(XP_PER_STREAK_DAY as i64, self.is_premium);
            self.run_badge_passes();
            self.persist_profile()?;
        }
        Ok(update)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Award every badge whose rule is now met, letting the 25 XP bonus from
    /// one award unlock level-dependent badges on the next pass. Bounded by
    /// [`BADGE_PASS_LIMIT`]; a pass with no new awards ends the batch.
    fn run_badge_passes(&mut self) -> Vec<&'static Badge> {
        let mut awarded = Vec::new();
        for _ in 0..BADGE_PASS_LIMIT {
            let new = badges::newly_earned(
                &self.counters,
                self.progression.level(),
                self.is_premium,
                &self.earned_badges,
            );
            if new.is_empty() {
                break;
            }
            for badge in new {
                self.earned_badges.insert(badge.id.to_string());
                info!(badge = badge.id, name = badge.name, "badge earned");
                self.progression.add(BADGE_BONUS_XP, self.is_premium);
                awarded.push(badge);
            }
        }
        awarded
    }

    fn persist_quota(&mut self) -> Result<()> {
        self.store.set(
            keys::QUESTIONS_ASKED_TODAY,
            &self.quota.questions_asked_today.to_string(),
        )?;
        let last = self
            .quota
            .last_question_at
            .map(|t| t.to_string())
            .unwrap_or_default();
        self.store.set(keys::LAST_QUESTION_AT, &last)?;
        Ok(())
    }

    fn persist_profile(&mut self) -> Result<()> {
        let progression = to_json(&self.progression)?;
        let counters = to_json(&self.counters)?;
        let earned = to_json(&self.earned_badges)?;
        self.store.set(keys::PROGRESSION, &progression)?;
        self.store.set(keys::COUNTERS, &counters)?;
        self.store.set(keys::EARNED_BADGES, &earned)
    }

    fn read_string(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|s| !s.is_empty()),
            Err(e) => {
                warn!(key, "preference read failed, using default: {e}");
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_string(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, "stored snapshot unreadable, using default: {e}");
                None
            }
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| EngagementError::StoreError(e.to_string()))
}
