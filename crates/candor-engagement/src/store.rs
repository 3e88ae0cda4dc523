//! Collaborator seams: preference persistence, the content feed, and advice
//! generation. The engine owns only these traits and the in-memory
//! implementations used by tests and demos; production transports live
//! elsewhere.

use std::collections::HashMap;

use crate::card::{ContentCard, Persona};
use crate::error::EngagementError;

type Result<T> = std::result::Result<T, EngagementError>;

// ---------------------------------------------------------------------------
// KvStore
// ---------------------------------------------------------------------------

/// Key-value persistence for session preferences and quota state.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory key-value store backed by HashMap.
#[derive(Clone, Debug, Default)]
pub struct InMemoryKvStore {
    entries: HashMap<String, String>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for InMemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ContentSource
// ---------------------------------------------------------------------------

/// Backend feed of advice cards.
pub trait ContentSource {
    fn list_cards(&self) -> Result<Vec<ContentCard>>;
}

/// Fixed in-memory content source.
#[derive(Clone, Debug, Default)]
pub struct StaticContentSource {
    cards: Vec<ContentCard>,
}

impl StaticContentSource {
    pub fn new(cards: Vec<ContentCard>) -> Self {
        Self { cards }
    }
}

impl ContentSource for StaticContentSource {
    fn list_cards(&self) -> Result<Vec<ContentCard>> {
        Ok(self.cards.clone())
    }
}

// ---------------------------------------------------------------------------
// AdviceGenerator
// ---------------------------------------------------------------------------

/// What the opaque generation call produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GeneratedAdvice {
    Advice(String),
    /// The input tripped content moderation; no advice is produced.
    Flagged,
}

/// Opaque advice generation: situation text + persona voice in, advice text
/// (or a moderation flag) out.
pub trait AdviceGenerator {
    fn generate(&self, input: &str, persona: Persona) -> Result<GeneratedAdvice>;
}

/// Canned generator for tests and demos: echoes a fixed line per persona.
#[derive(Clone, Debug, Default)]
pub struct CannedAdviceGenerator;

impl AdviceGenerator for CannedAdviceGenerator {
    fn generate(&self, _input: &str, persona: Persona) -> Result<GeneratedAdvice> {
        let line = match persona {
            Persona::BestFriend => "You deserve someone who chooses you every day.",
            Persona::Therapist => "Notice the pattern before you act on it.",
            Persona::NoBsSis => "If they wanted to, they would. Next.",
        };
        Ok(GeneratedAdvice::Advice(line.to_string()))
    }
}
