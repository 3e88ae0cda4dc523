//! Reaction toggle semantics.
//!
//! A viewer holds at most one attributed reaction per card. Tapping the same
//! kind again clears it (toggle-off); tapping a different kind moves the
//! attribution, adjusting both aggregate counts. Counts floor at zero, and
//! the attributed kind's count is always at least one while attributed.

use serde::{Deserialize, Serialize};

use crate::card::{ContentCard, Reaction};

/// What a toggle did to the viewer's attribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleOutcome {
    /// The viewer's attribution is now this kind (fresh or switched).
    Set(Reaction),
    /// The viewer tapped their current kind; attribution cleared.
    Cleared(Reaction),
}

impl ToggleOutcome {
    pub fn is_set(&self) -> bool {
        matches!(self, ToggleOutcome::Set(_))
    }
}

/// Apply one reaction toggle to a card.
pub fn toggle_reaction(card: &mut ContentCard, kind: Reaction) -> ToggleOutcome {
    if let Some(previous) = card.user_reaction {
        let count = card.reactions.entry(previous).or_insert(0);
        *count = count.saturating_sub(1);

        if previous == kind {
            card.user_reaction = None;
            return ToggleOutcome::Cleared(kind);
        }
    }

    card.user_reaction = Some(kind);
    *card.reactions.entry(kind).or_insert(0) += 1;
    ToggleOutcome::Set(kind)
}

/// Copy one representation's reaction state onto another representation of
/// the same logical card, so the feed and saved views never diverge.
pub fn mirror_reactions(from: &ContentCard, to: &mut ContentCard) {
    if from.id != to.id {
        return;
    }
    to.reactions = from.reactions.clone();
    to.user_reaction = from.user_reaction;
}
