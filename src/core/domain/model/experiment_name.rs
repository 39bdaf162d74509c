//! Human readable names for drafts created without one.

use rand::Rng;
use rand::seq::SliceRandom;

const ADJECTIVES: [&str; 24] = [
    "autumn", "hidden", "bitter", "misty", "silent", "empty", "dry", "dark", "summer", "icy",
    "quiet", "white", "cool", "spring", "winter", "patient", "twilight", "dawn", "crimson",
    "wispy", "weathered", "blue", "billowing", "broken",
];

const NOUNS: [&str; 24] = [
    "waterfall", "river", "breeze", "moon", "rain", "wind", "sea", "morning", "snow", "lake",
    "sunset", "pine", "shadow", "leaf", "dawn", "glitter", "forest", "hill", "cloud", "meadow",
    "sun", "glade", "bird", "brook",
];

/// Returns a token like `misty-river-4821`.
pub(crate) fn generate() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("quiet");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("meadow");
    let token: u16 = rng.gen_range(1000..10000);
    format!("{}-{}-{}", adjective, noun, token)
}
