//! Card deck management.
//!
//! The deck tracks three collections of one logical card set: the `pool` of
//! every known card, the `queue` of cards currently dealt for viewing
//! (front = displayed), and the `saved` list built up by right-swipes. The
//! queue is replenished by sampling cards that have not yet been dealt this
//! tenure, so nothing repeats until the next reload.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::card::{CardId, ContentCard, Reaction};
use crate::reactions::{ToggleOutcome, mirror_reactions, toggle_reaction};

/// Queue length at or below which a swipe triggers replenishment.
pub const LOW_WATER_MARK: usize = 3;
/// Maximum cards dealt per replenishment.
pub const REPLENISH_SAMPLE: usize = 5;
/// Queue length dealt by a full reload.
pub const RELOAD_QUEUE_LEN: usize = 10;

/// The two terminal actions on a displayed card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwipeAction {
    Save,
    Dismiss,
}

/// Result of advancing past the front card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// The card was not at the front; nothing changed.
    NotFront,
    Advanced {
        /// True when a save action inserted a card that was not already saved.
        newly_saved: bool,
        /// Cards dealt into the queue by the low-water replenishment.
        replenished: usize,
    },
}

/// Result of rebuilding the visible queue from the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadOutcome {
    Reloaded(usize),
    /// Nothing known to deal; the caller should re-fetch the pool.
    PoolEmpty,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Deck {
    pool: Vec<ContentCard>,
    queue: Vec<ContentCard>,
    saved: Vec<ContentCard>,
    /// Ids dealt into the queue since the last reload. Replenishment samples
    /// outside this set, so a card seen this tenure cannot come back until
    /// the deck is reloaded.
    dealt: BTreeSet<CardId>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the known card set. Duplicate ids keep their first occurrence.
    /// The queue is left untouched; call [`Deck::reload`] to re-deal.
    pub fn set_pool(&mut self, cards: Vec<ContentCard>) {
        let mut seen = BTreeSet::new();
        self.pool = cards
            .into_iter()
            .filter(|card| seen.insert(card.id))
            .collect();
    }

    pub fn pool(&self) -> &[ContentCard] {
        &self.pool
    }

    pub fn queue(&self) -> &[ContentCard] {
        &self.queue
    }

    pub fn saved(&self) -> &[ContentCard] {
        &self.saved
    }

    /// The currently displayed card.
    pub fn front(&self) -> Option<&ContentCard> {
        self.queue.first()
    }

    /// True when the queue has drained and the pool has nothing left to deal.
    pub fn is_caught_up(&self) -> bool {
        self.queue.is_empty()
    }

    /// Advance past the front card with a save or dismiss.
    ///
    /// Interaction is front-only: an action on any other card is a no-op.
    /// After the front is removed, a queue at or below the low-water mark is
    /// topped up with a random sample of cards not yet dealt this tenure.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        action: SwipeAction,
        card_id: CardId,
        rng: &mut R,
    ) -> SwipeOutcome {
        if self.front().map(|card| card.id) != Some(card_id) {
            return SwipeOutcome::NotFront;
        }

        let card = self.queue.remove(0);
        let newly_saved = match action {
            SwipeAction::Save => self.save_card(card),
            SwipeAction::Dismiss => {
                self.saved.retain(|saved| saved.id != card.id);
                false
            }
        };

        let replenished = if self.queue.len() < LOW_WATER_MARK {
            self.replenish(rng)
        } else {
            0
        };

        SwipeOutcome::Advanced {
            newly_saved,
            replenished,
        }
    }

    /// Re-deal the queue: a fresh permutation of the pool, truncated to
    /// [`RELOAD_QUEUE_LEN`]. Clears the dealt set, so previously seen cards
    /// are eligible again.
    pub fn reload<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ReloadOutcome {
        if self.pool.is_empty() {
            self.queue.clear();
            self.dealt.clear();
            return ReloadOutcome::PoolEmpty;
        }

        let mut cards = self.pool.clone();
        cards.shuffle(rng);
        cards.truncate(RELOAD_QUEUE_LEN);

        self.dealt = cards.iter().map(|card| card.id).collect();
        let queue: Vec<ContentCard> = cards
            .into_iter()
            .map(|card| self.synced_for_dealing(card))
            .collect();
        self.queue = queue;

        debug!(queue_len = self.queue.len(), "deck reloaded");
        ReloadOutcome::Reloaded(self.queue.len())
    }

    /// Toggle this viewer's reaction on a card, updating every held
    /// representation (queue and saved) so the views never diverge.
    pub fn toggle_reaction(&mut self, card_id: CardId, kind: Reaction) -> Option<ToggleOutcome> {
        if let Some(index) = self.queue.iter().position(|card| card.id == card_id) {
            let outcome = toggle_reaction(&mut self.queue[index], kind);
            let updated = self.queue[index].clone();
            if let Some(saved) = self.saved.iter_mut().find(|card| card.id == card_id) {
                mirror_reactions(&updated, saved);
            }
            return Some(outcome);
        }

        self.saved
            .iter_mut()
            .find(|card| card.id == card_id)
            .map(|card| toggle_reaction(card, kind))
    }

    /// Drop a card from the saved list without touching the queue.
    pub fn remove_saved(&mut self, card_id: CardId) {
        self.saved.retain(|card| card.id != card_id);
    }

    fn save_card(&mut self, mut card: ContentCard) -> bool {
        if self.saved.iter().any(|saved| saved.id == card.id) {
            return false;
        }
        card.is_saved = true;
        self.saved.insert(0, card);
        true
    }

    fn replenish<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut remaining: Vec<ContentCard> = self
            .pool
            .iter()
            .filter(|card| !self.dealt.contains(&card.id))
            .cloned()
            .collect();
        if remaining.is_empty() {
            return 0;
        }

        remaining.shuffle(rng);
        remaining.truncate(REPLENISH_SAMPLE);

        let count = remaining.len();
        for card in remaining {
            self.dealt.insert(card.id);
            let card = self.synced_for_dealing(card);
            self.queue.push(card);
        }

        debug!(dealt = count, queue_len = self.queue.len(), "queue replenished");
        count
    }

    /// Bring a pool copy in line with the saved representation before it is
    /// dealt, so a previously saved card shows its save state and current
    /// reaction tallies.
    fn synced_for_dealing(&self, mut card: ContentCard) -> ContentCard {
        if let Some(saved) = self.saved.iter().find(|saved| saved.id == card.id) {
            card.is_saved = true;
            mirror_reactions(saved, &mut card);
        }
        card
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{ContentCard, Persona, Reaction};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn cards(n: usize) -> Vec<ContentCard> {
        (0..n)
            .map(|i| {
                ContentCard::new(
                    format!("advice #{i}"),
                    Persona::ALL[i % Persona::ALL.len()],
                    1_000 + i as i64,
                )
            })
            .collect()
    }

    fn assert_no_duplicates(deck: &Deck) {
        let ids: BTreeSet<CardId> = deck.queue().iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), deck.queue().len(), "queue must not hold duplicate ids");
    }

    #[test]
    fn test_reload_deals_up_to_ten() {
        let mut deck = Deck::new();
        deck.set_pool(cards(25));
        assert_eq!(deck.reload(&mut rng()), ReloadOutcome::Reloaded(RELOAD_QUEUE_LEN));
        assert_eq!(deck.queue().len(), RELOAD_QUEUE_LEN);
        assert_no_duplicates(&deck);
    }

    #[test]
    fn test_reload_small_pool_deals_everything() {
        let mut deck = Deck::new();
        deck.set_pool(cards(4));
        assert_eq!(deck.reload(&mut rng()), ReloadOutcome::Reloaded(4));
    }

    #[test]
    fn test_reload_empty_pool_requests_fetch() {
        let mut deck = Deck::new();
        assert_eq!(deck.reload(&mut rng()), ReloadOutcome::PoolEmpty);
        assert!(deck.is_caught_up());
    }

    #[test]
    fn test_reload_is_deterministic_under_seed() {
        let mut a = Deck::new();
        let mut b = Deck::new();
        a.set_pool(cards(25));
        b.set_pool(cards(25));
        a.reload(&mut StdRng::seed_from_u64(42));
        b.reload(&mut StdRng::seed_from_u64(42));
        let ids_a: Vec<CardId> = a.queue().iter().map(|c| c.id).collect();
        let ids_b: Vec<CardId> = b.queue().iter().map(|c| c.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_advance_requires_front_card() {
        let mut deck = Deck::new();
        deck.set_pool(cards(6));
        deck.reload(&mut rng());

        let second = deck.queue()[1].id;
        let before = deck.queue().len();
        assert_eq!(
            deck.advance(SwipeAction::Save, second, &mut rng()),
            SwipeOutcome::NotFront
        );
        assert_eq!(deck.queue().len(), before);
        assert!(deck.saved().is_empty());
    }

    #[test]
    fn test_save_inserts_newest_first() {
        let mut deck = Deck::new();
        deck.set_pool(cards(12));
        deck.reload(&mut rng());

        let first = deck.front().unwrap().id;
        deck.advance(SwipeAction::Save, first, &mut rng());
        let second = deck.front().unwrap().id;
        deck.advance(SwipeAction::Save, second, &mut rng());

        assert_eq!(deck.saved().len(), 2);
        assert_eq!(deck.saved()[0].id, second);
        assert_eq!(deck.saved()[1].id, first);
        assert!(deck.saved().iter().all(|card| card.is_saved));
    }

    #[test]
    fn test_dismiss_removes_from_saved() {
        let mut deck = Deck::new();
        deck.set_pool(cards(2));
        deck.reload(&mut rng());

        let front = deck.front().unwrap().id;
        deck.advance(SwipeAction::Save, front, &mut rng());
        assert_eq!(deck.saved().len(), 1);

        let next = deck.front().unwrap().id;
        deck.advance(SwipeAction::Dismiss, next, &mut rng());
        deck.reload(&mut rng());

        // Dismissing the previously saved card drops it from the saved list.
        while deck.front().map(|c| c.id) != Some(front) {
            let f = deck.front().unwrap().id;
            deck.advance(SwipeAction::Dismiss, f, &mut rng());
        }
        deck.advance(SwipeAction::Dismiss, front, &mut rng());
        assert!(deck.saved().is_empty());
    }

    #[test]
    fn test_replenish_below_low_water() {
        let mut deck = Deck::new();
        deck.set_pool(cards(25));
        deck.reload(&mut rng());

        let mut r = rng();
        // Swipe until the queue first dips below the low-water mark.
        for _ in 0..(RELOAD_QUEUE_LEN - LOW_WATER_MARK) {
            let front = deck.front().unwrap().id;
            deck.advance(SwipeAction::Dismiss, front, &mut r);
            assert_no_duplicates(&deck);
        }
        // 10 dealt, 7 swiped -> 3 left, then one more swipe triggers a top-up.
        let front = deck.front().unwrap().id;
        let outcome = deck.advance(SwipeAction::Dismiss, front, &mut r);
        assert_eq!(
            outcome,
            SwipeOutcome::Advanced {
                newly_saved: false,
                replenished: REPLENISH_SAMPLE
            }
        );
        assert_no_duplicates(&deck);
    }

    #[test]
    fn test_no_repeat_within_tenure() {
        let mut deck = Deck::new();
        deck.set_pool(cards(15));
        deck.reload(&mut rng());

        let mut r = rng();
        let mut seen = BTreeSet::new();
        while let Some(front) = deck.front().map(|card| card.id) {
            assert!(seen.insert(front), "card repeated within one queue tenure");
            deck.advance(SwipeAction::Dismiss, front, &mut r);
        }
        // Every pool card was dealt exactly once.
        assert_eq!(seen.len(), 15);
        assert!(deck.is_caught_up());
    }

    #[test]
    fn test_exhausted_pool_drains_to_caught_up() {
        let mut deck = Deck::new();
        deck.set_pool(cards(2));
        deck.reload(&mut rng());
        assert_eq!(deck.queue().len(), 2);

        let mut r = rng();
        let front = deck.front().unwrap().id;
        let outcome = deck.advance(SwipeAction::Dismiss, front, &mut r);
        // Below low water but nothing left to deal.
        assert_eq!(
            outcome,
            SwipeOutcome::Advanced {
                newly_saved: false,
                replenished: 0
            }
        );
        assert_eq!(deck.queue().len(), 1);

        let front = deck.front().unwrap().id;
        deck.advance(SwipeAction::Dismiss, front, &mut r);
        assert!(deck.is_caught_up());
    }

    #[test]
    fn test_card_can_return_after_reload() {
        let mut deck = Deck::new();
        deck.set_pool(cards(3));
        deck.reload(&mut rng());

        let mut r = rng();
        while let Some(front) = deck.front().map(|card| card.id) {
            deck.advance(SwipeAction::Dismiss, front, &mut r);
        }
        assert!(deck.is_caught_up());

        assert_eq!(deck.reload(&mut r), ReloadOutcome::Reloaded(3));
    }

    #[test]
    fn test_set_pool_dedupes_by_id() {
        let mut deck = Deck::new();
        let card = ContentCard::new("same advice", Persona::Therapist, 1_000);
        deck.set_pool(vec![card.clone(), card.clone()]);
        assert_eq!(deck.pool().len(), 1);
    }

    #[test]
    fn test_toggle_updates_queue_and_saved_views() {
        let mut deck = Deck::new();
        deck.set_pool(cards(8));
        deck.reload(&mut rng());

        let front = deck.front().unwrap().id;
        deck.advance(SwipeAction::Save, front, &mut rng());

        // The saved card is no longer in the queue; toggle through the saved view.
        let outcome = deck.toggle_reaction(front, Reaction::Love);
        assert!(outcome.is_some_and(|o| o.is_set()));
        let saved = deck.saved().iter().find(|c| c.id == front).unwrap();
        assert_eq!(saved.reaction_count(Reaction::Love), 1);
        assert_eq!(saved.user_reaction, Some(Reaction::Love));
    }

    #[test]
    fn test_dealt_saved_card_carries_reactions() {
        let mut deck = Deck::new();
        deck.set_pool(cards(3));
        deck.reload(&mut rng());

        let front = deck.front().unwrap().id;
        deck.advance(SwipeAction::Save, front, &mut rng());
        deck.toggle_reaction(front, Reaction::Fire);

        // After a reload the saved card is dealt again with its reaction state.
        deck.reload(&mut rng());
        let dealt = deck.queue().iter().find(|card| card.id == front).unwrap();
        assert!(dealt.is_saved);
        assert_eq!(dealt.user_reaction, Some(Reaction::Fire));
        assert_eq!(dealt.reaction_count(Reaction::Fire), 1);
    }
}
