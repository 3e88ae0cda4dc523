//! Activity counters feeding badge rules and the XP weighting.
//!
//! Counters only grow (a dismissed save does not un-count), with one
//! exception: the daily streak resets when a day is skipped.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::card::Persona;
use crate::quota::calendar_day;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounters {
    pub saved_advice: u32,
    pub questions_asked: u32,
    pub reactions_given: u32,
    pub daily_streak: u32,
    /// Saves tallied per persona tag (keyed by [`Persona::tag`]).
    pub saves_by_persona: BTreeMap<String, u32>,
    /// Personas this user has asked with or selected.
    pub personas_used: BTreeSet<Persona>,
    pub last_visit_at: Option<i64>,
}

/// What a visit did to the daily streak.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreakUpdate {
    /// Already visited today; nothing changed.
    SameDay,
    /// Visited on the day after the last visit.
    Extended(u32),
    /// First visit ever, or a day was skipped.
    Started,
}

impl ActivityCounters {
    pub fn record_question_asked(&mut self, persona: Persona) {
        self.questions_asked += 1;
        self.personas_used.insert(persona);
    }

    pub fn record_advice_saved(&mut self, persona: Persona) {
        self.saved_advice += 1;
        *self
            .saves_by_persona
            .entry(persona.tag().to_string())
            .or_insert(0) += 1;
    }

    pub fn record_reaction_given(&mut self) {
        self.reactions_given += 1;
    }

    pub fn record_persona_used(&mut self, persona: Persona) {
        self.personas_used.insert(persona);
    }

    pub fn saves_for(&self, persona: Persona) -> u32 {
        self.saves_by_persona
            .get(persona.tag())
            .copied()
            .unwrap_or(0)
    }

    /// Roll the daily streak forward for a visit at `now`.
    ///
    /// Same calendar day is a no-op, the next day extends the streak, and a
    /// gap (or first visit) restarts it at 1. Lazy like the quota rollover:
    /// nothing happens between visits.
    pub fn record_visit(&mut self, now: i64) -> StreakUpdate {
        let today = calendar_day(now);
        let update = match self.last_visit_at {
            Some(last) => {
                let last_day = calendar_day(last);
                if last_day == today {
                    StreakUpdate::SameDay
                } else if today.signed_duration_since(last_day).num_days() == 1 {
                    self.daily_streak += 1;
                    StreakUpdate::Extended(self.daily_streak)
                } else {
                    self.daily_streak = 1;
                    StreakUpdate::Started
                }
            }
            None => {
                self.daily_streak = 1;
                StreakUpdate::Started
            }
        };
        if update != StreakUpdate::SameDay {
            self.last_visit_at = Some(now);
        }
        update
    }
}
