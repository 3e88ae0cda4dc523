use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies a content card. Content-addressed by BLAKE3 over the persona
/// tag and card text, so the same advice under the same persona resolves to
/// one logical card across the feed and saved views.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId([u8; 32]);

impl CardId {
    pub fn bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: String = self.0.iter().take(4).map(|b| format!("{b:02x}")).collect();
        write!(f, "Card({hex}..)")
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Generate a card ID by hashing persona tag + content with BLAKE3.
pub fn card_id(content: &str, persona: Persona) -> CardId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(persona.tag().as_bytes());
    hasher.update(b":");
    hasher.update(content.as_bytes());
    CardId(*hasher.finalize().as_bytes())
}

/// The advisor persona a piece of advice is written in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    BestFriend,
    Therapist,
    NoBsSis,
}

impl Persona {
    pub const ALL: [Persona; 3] = [Persona::BestFriend, Persona::Therapist, Persona::NoBsSis];

    /// Stable tag used for persistence keys and card addressing.
    pub fn tag(&self) -> &'static str {
        match self {
            Persona::BestFriend => "best_friend",
            Persona::Therapist => "therapist",
            Persona::NoBsSis => "no_bs_sis",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Persona> {
        Persona::ALL.into_iter().find(|p| p.tag() == tag)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Persona::BestFriend => "Best Friend",
            Persona::Therapist => "Therapist",
            Persona::NoBsSis => "No-BS Sis",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Persona::BestFriend => "your bestie",
            Persona::Therapist => "your therapist",
            Persona::NoBsSis => "your sis",
        }
    }

    /// Voice instruction handed to the advice-generation collaborator.
    pub fn prompt_modifier(&self) -> &'static str {
        match self {
            Persona::BestFriend => "as a supportive best friend who is encouraging and empathetic",
            Persona::Therapist => "as a professional therapist with psychological insights",
            Persona::NoBsSis => "as a direct, no-nonsense sister who tells it like it is",
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Persona::BestFriend
    }
}

/// A single emoji tag a viewer may attach to a card.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Love,
    Fire,
    Cry,
}

impl Reaction {
    pub const ALL: [Reaction; 3] = [Reaction::Love, Reaction::Fire, Reaction::Cry];

    pub fn emoji(&self) -> &'static str {
        match self {
            Reaction::Love => "\u{1F497}",
            Reaction::Fire => "\u{1F525}",
            Reaction::Cry => "\u{1F62D}",
        }
    }
}

/// One piece of advice content as seen by a viewer.
///
/// Reaction counts are assigned once at construction and change only through
/// toggling; `user_reaction` records this viewer's single attributed kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCard {
    pub id: CardId,
    pub content: String,
    pub persona: Persona,
    pub created_at: i64,
    pub reactions: BTreeMap<Reaction, u32>,
    pub user_reaction: Option<Reaction>,
    pub is_saved: bool,
}

impl ContentCard {
    /// Create a card with zeroed reaction counts.
    pub fn new(content: impl Into<String>, persona: Persona, created_at: i64) -> Self {
        Self::with_reactions(content, persona, created_at, BTreeMap::new())
    }

    /// Create a card with counts supplied by the backend. Counts are fixed
    /// here and from now on move only via reaction toggles.
    pub fn with_reactions(
        content: impl Into<String>,
        persona: Persona,
        created_at: i64,
        reactions: BTreeMap<Reaction, u32>,
    ) -> Self {
        let content = content.into();
        Self {
            id: card_id(&content, persona),
            content,
            persona,
            created_at,
            reactions,
            user_reaction: None,
            is_saved: false,
        }
    }

    pub fn reaction_count(&self, kind: Reaction) -> u32 {
        self.reactions.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_reactions(&self) -> u32 {
        self.reactions.values().sum()
    }
}
