use rand::Rng;

use super::Personality;

/// Scores above this read as friendship.
pub const FRIENDLY_THRESHOLD: u8 = 50;
/// Scores below this read as hostility.
pub const HOSTILE_THRESHOLD: u8 = 20;

const BASE_RELATION: i32 = 50;
const RELATION_JITTER: i32 = 15;

/// Symmetric personality compatibility modifier.
pub fn compatibility(a: Personality, b: Personality) -> i32 {
    use Personality::*;
    match (a, b) {
        (Peaceful, Peaceful) => 30,
        (Peaceful, Trading) | (Trading, Peaceful) => 25,
        (Trading, Trading) => 20,
        (Aggressive, Aggressive) => -30,
        (Aggressive, Peaceful) | (Peaceful, Aggressive) => -10,
        (Expansionist, Expansionist) => -20,
        (Isolationist, Isolationist) => 10,
        _ => 0,
    }
}

/// First-contact score in `0..=100`.
pub fn initial_relation<R: Rng + ?Sized>(a: Personality, b: Personality, rng: &mut R) -> u8 {
    let jitter = rng.gen_range(-RELATION_JITTER..=RELATION_JITTER);
    (BASE_RELATION + compatibility(a, b) + jitter).clamp(0, 100) as u8
}
