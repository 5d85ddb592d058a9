//! Home screen projections: greeting name and motivational quote.

use rand::seq::SliceRandom;
use rand::Rng;

pub const QUOTES: &[&str] = &[
    "A word after a word after a word is power. – Margaret Atwood",
    "The scariest moment is always just before you start. – Stephen King",
    "Don’t get it right, just get it written. – James Thurber",
    "You can make anything by writing. – C.S. Lewis",
];

/// Returns the part of `email` before `@`, used in the welcome line.
pub fn greeting_name(email: &str) -> &str {
    let trimmed = email.trim();
    trimmed.split('@').next().unwrap_or(trimmed)
}

/// Picks one quote using the thread-local RNG.
pub fn pick_quote() -> &'static str {
    pick_quote_with(&mut rand::thread_rng())
}

pub fn pick_quote_with<G: Rng + ?Sized>(rng: &mut G) -> &'static str {
    QUOTES.choose(rng).copied().unwrap_or(QUOTES[0])
}
