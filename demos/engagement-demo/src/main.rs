//! Walks one guest session end to end: browse the feed, react, save, ask
//! questions up to the daily limit, and print the resulting progression.
//! Seeded RNG and a fixed clock keep every run identical.

use candor_engagement::{
    AskOutcome, CannedAdviceGenerator, ContentCard, EngagementSession, Persona, Reaction,
    StaticContentSource, SwipeAction, badge,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

const NOON: i64 = 1_754_560_800_000;

fn sample_pool() -> Vec<ContentCard> {
    let lines = [
        (Persona::BestFriend, "Dating should be fun, not stressful. Trust your gut!"),
        (Persona::BestFriend, "You're worth consistent effort. Don't settle for breadcrumbs."),
        (Persona::Therapist, "Consider your attachment style before your next first date."),
        (Persona::Therapist, "Notice your patterns; conscious choices follow awareness."),
        (Persona::NoBsSis, "If they wanted to, they would. Period."),
        (Persona::NoBsSis, "Stop trying to change people. Accept or move on."),
        (Persona::BestFriend, "First dates should be low pressure. Coffee counts."),
        (Persona::Therapist, "Early red flags are data, not puzzles to solve."),
    ];
    lines
        .iter()
        .enumerate()
        .map(|(i, (persona, text))| ContentCard::new(*text, *persona, NOON - i as i64 * 3_600_000))
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut rng = StdRng::seed_from_u64(2024);
    let mut session = EngagementSession::in_memory();
    session.enable_guest_mode();
    session.record_visit(NOON).expect("visit");

    let source = StaticContentSource::new(sample_pool());
    session.refresh_feed(&source, &mut rng);
    info!(queue = session.deck().queue().len(), "feed loaded");

    // Browse: react to the front card, save it, dismiss the next two.
    let front = session.deck().front().expect("front card").id;
    session.react(front, Reaction::Fire).expect("react");
    session.swipe(SwipeAction::Save, front, &mut rng).expect("save");
    for _ in 0..2 {
        if let Some(card) = session.deck().front() {
            let id = card.id;
            session.swipe(SwipeAction::Dismiss, id, &mut rng).expect("dismiss");
        }
    }

    // Ask until the guest quota runs dry.
    let generator = CannedAdviceGenerator;
    let questions = [
        (Persona::BestFriend, "Should I text them first?"),
        (Persona::Therapist, "Why do I always chase unavailable people?"),
        (Persona::NoBsSis, "They ghosted me twice. Thoughts?"),
        (Persona::BestFriend, "One more question?"),
    ];
    for (i, (persona, question)) in questions.iter().enumerate() {
        let now = NOON + (i as i64 + 1) * 60_000;
        match session.ask_question(question, *persona, &generator, now).expect("ask") {
            AskOutcome::Advice(card) => {
                println!("{} says: {}", card.persona.display_name(), card.content)
            }
            AskOutcome::LimitReached => {
                println!("Daily limit reached ({} questions left)", session.remaining_questions())
            }
            other => println!("no advice: {other:?}"),
        }
    }

    let info = session.progression().info();
    println!();
    println!(
        "Level {} — {} XP total, {} XP to next level ({:.0}% through)",
        info.level,
        session.progression().total_xp(),
        info.xp_to_next_level,
        info.progress_fraction * 100.0
    );
    println!(
        "Saved {} card(s), asked {} question(s), streak {} day(s)",
        session.counters().saved_advice,
        session.counters().questions_asked,
        session.counters().daily_streak
    );
    for id in session.earned_badges() {
        if let Some(b) = badge(id) {
            println!("Badge earned: {} {} — {}", b.emoji, b.name, b.requirement);
        }
    }
}
