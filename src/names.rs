use rand::seq::SliceRandom;
use rand::Rng;

const PREFIXES: [&str; 6] = ["The", "Clan", "House", "Kingdom of", "Tribe of", "Order of"];
const CULTURES: [&str; 6] = ["Elves", "Dwarves", "Humans", "Orcs", "Goblins", "Gnomes"];
const SUFFIXES: [&str; 6] = [
    "of the North",
    "of the Mountains",
    "of the Plains",
    "of the Forest",
    "the Brave",
    "the Wise",
];

/// Number of distinct names [`generate`] can produce.
pub const MAX_NAMES: usize = CULTURES.len();

/// Up to `count` names, each built on a different culture with either a
/// prefix ("Clan Dwarves") or a suffix ("Elves of the North").
pub fn generate<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    let mut cultures = CULTURES.to_vec();
    let mut names = Vec::with_capacity(count.min(MAX_NAMES));
    for _ in 0..count.min(MAX_NAMES) {
        let pick = rng.gen_range(0..cultures.len());
        let culture = cultures.remove(pick);
        let name = if rng.gen::<f64>() < 0.5 {
            format!("{} {culture}", PREFIXES.choose(rng).unwrap_or(&PREFIXES[0]))
        } else {
            format!("{culture} {}", SUFFIXES.choose(rng).unwrap_or(&SUFFIXES[0]))
        };
        names.push(name);
    }
    names
}
