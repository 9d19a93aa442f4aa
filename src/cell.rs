//! A single tile of the world map

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::spatial::GridPos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Plains,
    Forest,
    Mountain,
    Water,
    Desert,
}

impl Terrain {
    pub fn is_passable(self) -> bool {
        !matches!(self, Terrain::Water | Terrain::Mountain)
    }

    pub fn glyph(self) -> char {
        match self {
            Terrain::Plains => '.',
            Terrain::Forest => 'T',
            Terrain::Mountain => '^',
            Terrain::Water => '~',
            Terrain::Desert => ':',
        }
    }

    /// Inclusive range the initial food stock (and ceiling) is drawn from.
    /// Water holds fish.
    pub fn food_range(self) -> (u32, u32) {
        match self {
            Terrain::Plains => (50, 100),
            Terrain::Forest => (80, 150),
            Terrain::Mountain => (10, 30),
            Terrain::Water => (60, 120),
            Terrain::Desert => (5, 20),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Terrain::Plains => "plains",
            Terrain::Forest => "forest",
            Terrain::Mountain => "mountain",
            Terrain::Water => "water",
            Terrain::Desert => "desert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mineral {
    None,
    Iron,
    Gold,
    Copper,
    Stone,
}

const MOUNTAIN_MINERALS: [Mineral; 4] = [
    Mineral::Iron,
    Mineral::Gold,
    Mineral::Copper,
    Mineral::Stone,
];

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pos: GridPos,
    pub altitude: u8,
    pub base_temperature: i32,
    pub temperature: i32,
    pub terrain: Terrain,
    pub mineral: Mineral,
    food: u32,
    max_food: u32,
    pub owner: Option<String>,
}

impl Cell {
    /// Builds a cell with fixed terrain whose stock starts full at `max_food`.
    pub fn new(pos: GridPos, terrain: Terrain, max_food: u32) -> Self {
        Self {
            pos,
            altitude: 50,
            base_temperature: 15,
            temperature: 15,
            terrain,
            mineral: Mineral::None,
            food: max_food,
            max_food,
            owner: None,
        }
    }

    /// Rolls altitude and temperature, then derives terrain, mineral and the
    /// initial food stock from them.
    pub fn generate<R: Rng + ?Sized>(pos: GridPos, rng: &mut R) -> Self {
        let altitude: u8 = rng.gen_range(0..=100);
        let base_temperature: i32 = rng.gen_range(-20..=40);

        let terrain = if altitude > 80 {
            Terrain::Mountain
        } else if altitude < 10 {
            Terrain::Water
        } else if base_temperature > 35 {
            Terrain::Desert
        } else if rng.gen::<f64>() < 0.3 {
            Terrain::Forest
        } else {
            Terrain::Plains
        };

        let mineral = match terrain {
            Terrain::Mountain => *MOUNTAIN_MINERALS
                .choose(rng)
                .unwrap_or(&Mineral::Stone),
            Terrain::Plains if rng.gen::<f64>() < 0.1 => Mineral::Stone,
            _ => Mineral::None,
        };

        let (low, high) = terrain.food_range();
        let food = rng.gen_range(low..=high);

        Self {
            pos,
            altitude,
            base_temperature,
            temperature: base_temperature,
            terrain,
            mineral,
            food,
            max_food: food,
            owner: None,
        }
    }

    pub fn pos(&self) -> GridPos {
        self.pos
    }

    pub fn x(&self) -> i32 {
        self.pos.x
    }

    pub fn y(&self) -> i32 {
        self.pos.y
    }

    pub fn food(&self) -> u32 {
        self.food
    }

    pub fn max_food(&self) -> u32 {
        self.max_food
    }

    pub fn is_passable(&self) -> bool {
        self.terrain.is_passable()
    }

    /// Passable and not yet owned by anyone.
    pub fn is_claimable(&self) -> bool {
        self.is_passable() && self.owner.is_none()
    }

    pub fn is_owned_by(&self, name: &str) -> bool {
        self.owner.as_deref() == Some(name)
    }

    pub fn glyph(&self) -> char {
        self.terrain.glyph()
    }

    pub fn update_climate(&mut self, seasonal_modifier: i32) {
        self.temperature = self.base_temperature + seasonal_modifier;
    }

    /// Grows the stock by `rate` of the ceiling, clamped to the ceiling.
    /// Water keeps its fixed fish stock.
    pub fn regenerate_food(&mut self, rate: f64) {
        if self.terrain == Terrain::Water {
            return;
        }
        let growth = (self.max_food as f64 * rate) as u32;
        self.food = self.max_food.min(self.food.saturating_add(growth));
    }

    /// Removes up to `amount` and returns what was actually taken.
    pub fn harvest_food(&mut self, amount: u32) -> u32 {
        let harvested = amount.min(self.food);
        self.food -= harvested;
        harvested
    }

    /// Removes up to `amount` without reporting the yield.
    pub fn deplete_food(&mut self, amount: u32) {
        self.food = self.food.saturating_sub(amount);
    }

    /// Adds up to `amount`, never beyond twice the ceiling.
    pub fn enrich_food(&mut self, amount: u32) {
        self.food = self
            .food
            .saturating_add(amount)
            .min(self.max_food.saturating_mul(2));
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn harvest_reports_actual_yield() {
        let mut cell = Cell::new(GridPos::new(0, 0), Terrain::Plains, 15);
        assert_eq!(cell.harvest_food(20), 15);
        assert_eq!(cell.food(), 0);
        assert_eq!(cell.harvest_food(20), 0);
    }

    #[test]
    fn regeneration_clamps_to_ceiling() {
        let mut cell = Cell::new(GridPos::new(0, 0), Terrain::Forest, 100);
        cell.harvest_food(95);
        cell.regenerate_food(0.1);
        assert_eq!(cell.food(), 15);
        for _ in 0..20 {
            cell.regenerate_food(0.1);
        }
        assert_eq!(cell.food(), 100);
    }

    #[test]
    fn water_never_regenerates() {
        let mut cell = Cell::new(GridPos::new(0, 0), Terrain::Water, 80);
        cell.harvest_food(50);
        cell.regenerate_food(0.1);
        assert_eq!(cell.food(), 30);
    }

    #[test]
    fn enrichment_caps_at_twice_ceiling() {
        let mut cell = Cell::new(GridPos::new(0, 0), Terrain::Desert, 20);
        cell.enrich_food(50);
        assert_eq!(cell.food(), 40);
    }

    #[test]
    fn water_and_mountain_are_not_claimable() {
        let water = Cell::new(GridPos::new(0, 0), Terrain::Water, 60);
        let mountain = Cell::new(GridPos::new(0, 0), Terrain::Mountain, 10);
        let plains = Cell::new(GridPos::new(0, 0), Terrain::Plains, 60);
        assert!(!water.is_claimable());
        assert!(!mountain.is_claimable());
        assert!(plains.is_claimable());
    }

    #[test]
    fn generated_cells_follow_terrain_rules() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for i in 0..500 {
            let cell = Cell::generate(GridPos::new(i, 0), &mut rng);
            if cell.altitude > 80 {
                assert_eq!(cell.terrain, Terrain::Mountain);
                assert_ne!(cell.mineral, Mineral::None);
            } else if cell.altitude < 10 {
                assert_eq!(cell.terrain, Terrain::Water);
            } else if cell.base_temperature > 35 {
                assert_eq!(cell.terrain, Terrain::Desert);
            }
            if matches!(cell.terrain, Terrain::Forest | Terrain::Water | Terrain::Desert) {
                assert_eq!(cell.mineral, Mineral::None);
            }
            let (low, high) = cell.terrain.food_range();
            assert!((low..=high).contains(&cell.food()));
            assert_eq!(cell.food(), cell.max_food());
            assert_eq!(cell.temperature, cell.base_temperature);
        }
    }

    proptest! {
        #[test]
        fn food_stays_within_bounds(
            ceiling in 1u32..200,
            ops in proptest::collection::vec((0u8..4, 0u32..80), 0..60),
        ) {
            let mut cell = Cell::new(GridPos::new(0, 0), Terrain::Plains, ceiling);
            for (op, amount) in ops {
                match op {
                    0 => { cell.harvest_food(amount); }
                    1 => cell.deplete_food(amount),
                    2 => cell.enrich_food(amount),
                    _ => cell.regenerate_food(amount as f64 / 100.0),
                }
                prop_assert!(cell.food() <= ceiling * 2);
            }
        }
    }
}
