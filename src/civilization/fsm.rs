use rand::Rng;

use super::{
    initial_relation, CivState, Civilization, Personality, FOOD_EXCESS, FOOD_LOW, FOOD_STARVING,
    FRIENDLY_THRESHOLD, HOSTILE_THRESHOLD, TERRITORY_CAP,
};
use crate::chronicle::Chronicle;
use crate::spatial::GridPos;
use crate::world::World;

const CAUTIOUS_EXPANSION_CHANCE: f64 = 0.3;
const HUNT_YIELD: u32 = 20;
const HUNT_APPETITE: u32 = 30;
const GATHER_YIELD: u32 = 12;
const GATHER_APPETITE: u32 = 25;
const IDLE_APPETITE: u32 = 20;
const EXPANSION_COST: u32 = 10;

/// Another live civilization whose territory touches ours this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Position in the engine's civilization list.
    pub index: usize,
    pub name: String,
    pub personality: Personality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Rested { consumed: u32 },
    Hunted { harvested: u32 },
    Gathered { harvested: u32 },
    Expanded { to: GridPos },
    NoRoom,
    /// Our side of the relation is recorded; the caller mirrors `score` onto
    /// the civilization at `index`.
    FirstContact {
        index: usize,
        name: String,
        score: u8,
    },
    /// Nobody left to meet; the state dropped back to idle.
    NoContact,
    Fortified,
    Inactive,
}

impl Civilization {
    /// Picks this tick's state. Rules are checked in priority order and the
    /// first match wins: survival, then first contact, then expansion.
    pub fn update_state<R: Rng + ?Sized>(&mut self, nearby: &[Contact], rng: &mut R) {
        if !self.alive {
            return;
        }

        let fpc = self.food_per_capita();
        if fpc < FOOD_STARVING {
            self.state = CivState::Hunting;
            return;
        }
        if fpc < FOOD_LOW {
            self.state = CivState::Gathering;
            return;
        }

        if self.state != CivState::Diplomacy
            && nearby.iter().any(|other| !self.has_met(&other.name))
        {
            self.state = CivState::Diplomacy;
            return;
        }

        let expansive = self.personality.always_expands();
        if fpc > FOOD_EXCESS
            && self.territory.len() < TERRITORY_CAP
            && (expansive || rng.gen::<f64>() < CAUTIOUS_EXPANSION_CHANCE)
        {
            self.state = CivState::Expanding;
            return;
        }

        self.state = CivState::Idle;
    }

    pub fn execute_action<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        nearby: &[Contact],
        rng: &mut R,
        chronicle: &mut dyn Chronicle,
        year: u64,
    ) -> ActionOutcome {
        if !self.alive {
            return ActionOutcome::Inactive;
        }

        match self.state {
            CivState::Idle => self.rest(),
            CivState::Hunting => ActionOutcome::Hunted {
                harvested: self.forage(world, HUNT_YIELD, HUNT_APPETITE),
            },
            CivState::Gathering => ActionOutcome::Gathered {
                harvested: self.forage(world, GATHER_YIELD, GATHER_APPETITE),
            },
            CivState::Expanding => self.expand(world),
            CivState::Diplomacy => self.negotiate(nearby, rng, chronicle, year),
            CivState::Defending => {
                self.lower_morale(2);
                ActionOutcome::Fortified
            }
            CivState::Collapsed => ActionOutcome::Inactive,
        }
    }

    fn rest(&mut self) -> ActionOutcome {
        let consumed = (self.population / IDLE_APPETITE).max(1);
        self.food = self.food.saturating_sub(consumed);
        if self.food as f64 > FOOD_LOW {
            self.raise_morale(2);
        } else {
            self.raise_morale(1);
        }
        ActionOutcome::Rested { consumed }
    }

    /// Harvests up to `yield_cap` from every owned cell and eats
    /// `population / appetite` (at least one). Returns the harvest.
    fn forage(&mut self, world: &mut World, yield_cap: u32, appetite: u32) -> u32 {
        let mut harvested = 0;
        for &pos in &self.territory {
            if let Some(cell) = world.cell_mut(pos) {
                harvested = cell.harvest_food(yield_cap).saturating_add(harvested);
            }
        }
        let consumed = (self.population / appetite).max(1);
        self.food = self.food.saturating_add(harvested).saturating_sub(consumed);
        if harvested > 0 {
            self.raise_morale(1);
        }
        harvested
    }

    /// Claims the first free passable neighbour found, walking territory in
    /// claim order. At most one cell per call.
    fn expand(&mut self, world: &mut World) -> ActionOutcome {
        let target = self.territory.iter().find_map(|pos| {
            world
                .get_passable_neighbors(pos.x, pos.y)
                .into_iter()
                .find(|cell| cell.owner.is_none())
                .map(|cell| cell.pos())
        });

        match target {
            Some(pos) if self.claim(world, pos) => {
                self.food = self.food.saturating_sub(EXPANSION_COST);
                ActionOutcome::Expanded { to: pos }
            }
            _ => ActionOutcome::NoRoom,
        }
    }

    fn negotiate<R: Rng + ?Sized>(
        &mut self,
        nearby: &[Contact],
        rng: &mut R,
        chronicle: &mut dyn Chronicle,
        year: u64,
    ) -> ActionOutcome {
        let Some(other) = nearby.iter().find(|other| !self.has_met(&other.name)) else {
            self.state = CivState::Idle;
            return ActionOutcome::NoContact;
        };

        let score = initial_relation(self.personality, other.personality, rng);
        self.establish_relation(&other.name, score);

        if score > FRIENDLY_THRESHOLD {
            chronicle.log_event(
                year,
                &format!("{} and {} establish friendly relations!", self.name, other.name),
            );
        } else if score < HOSTILE_THRESHOLD {
            chronicle.log_event(
                year,
                &format!("Tensions rise between {} and {}!", self.name, other.name),
            );
        }

        ActionOutcome::FirstContact {
            index: other.index,
            name: other.name.clone(),
            score,
        }
    }
}
