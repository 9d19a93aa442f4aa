//! Autonomous civilizations driven by a finite state machine.

mod diplomacy;
mod fsm;

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chronicle::Chronicle;
use crate::spatial::GridPos;
use crate::world::World;

pub use diplomacy::{compatibility, initial_relation, FRIENDLY_THRESHOLD, HOSTILE_THRESHOLD};
pub use fsm::{ActionOutcome, Contact};

/// Food per capita below which a civilization hunts.
pub const FOOD_STARVING: f64 = 20.0;
/// Food per capita below which a civilization gathers. Idle morale recovery
/// compares the absolute stockpile against the same value.
pub const FOOD_LOW: f64 = 50.0;
/// Food per capita above which a civilization considers expanding.
pub const FOOD_EXCESS: f64 = 150.0;
pub const MORALE_CRITICAL: u32 = 10;
pub const MORALE_MAX: u32 = 100;
pub const POPULATION_MIN: u32 = 10;
/// Territory size at which expansion stops being considered.
pub const TERRITORY_CAP: usize = 30;

const STARVATION_FPC: f64 = 0.3;
const BIRTH_FPC: f64 = 2.0;
const BIRTH_MORALE: u32 = 50;
const NATURAL_DEATH_CHANCE: f64 = 0.1;
const UNREST_COLLAPSE_CHANCE: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CivState {
    Idle,
    Hunting,
    Gathering,
    Expanding,
    Diplomacy,
    /// Never chosen by the transition rules; only entered when set from
    /// outside.
    Defending,
    Collapsed,
}

impl CivState {
    pub fn as_str(self) -> &'static str {
        match self {
            CivState::Idle => "idle",
            CivState::Hunting => "hunting",
            CivState::Gathering => "gathering",
            CivState::Expanding => "expanding",
            CivState::Diplomacy => "diplomacy",
            CivState::Defending => "defending",
            CivState::Collapsed => "collapsed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Aggressive,
    Peaceful,
    Isolationist,
    Expansionist,
    Trading,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Aggressive,
        Personality::Peaceful,
        Personality::Isolationist,
        Personality::Expansionist,
        Personality::Trading,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Personality::Aggressive => "aggressive",
            Personality::Peaceful => "peaceful",
            Personality::Isolationist => "isolationist",
            Personality::Expansionist => "expansionist",
            Personality::Trading => "trading",
        }
    }

    /// Expands whenever food is plentiful instead of only sometimes.
    pub fn always_expands(self) -> bool {
        matches!(self, Personality::Expansionist | Personality::Aggressive)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    #[serde(rename = "population collapse")]
    PopulationCollapse,
    #[serde(rename = "civil unrest")]
    CivilUnrest,
}

impl DeathCause {
    pub fn as_str(self) -> &'static str {
        match self {
            DeathCause::PopulationCollapse => "population collapse",
            DeathCause::CivilUnrest => "civil unrest",
        }
    }
}

/// Request to found a civilization. Every attribute left unset is rolled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Founding {
    pub name: String,
    #[serde(default)]
    pub position: Option<GridPos>,
    #[serde(default)]
    pub population: Option<u32>,
    #[serde(default)]
    pub food: Option<u32>,
    #[serde(default)]
    pub morale: Option<u32>,
    #[serde(default)]
    pub tech_level: Option<u32>,
    #[serde(default)]
    pub personality: Option<Personality>,
}

impl Founding {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = Some(GridPos::new(x, y));
        self
    }

    pub fn with_population(mut self, population: u32) -> Self {
        self.population = Some(population);
        self
    }

    pub fn with_food(mut self, food: u32) -> Self {
        self.food = Some(food);
        self
    }

    pub fn with_morale(mut self, morale: u32) -> Self {
        self.morale = Some(morale);
        self
    }

    pub fn with_tech_level(mut self, tech_level: u32) -> Self {
        self.tech_level = Some(tech_level);
        self
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = Some(personality);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Civilization {
    name: String,
    pub population: u32,
    pub food: u32,
    pub morale: u32,
    pub tech_level: u32,
    pub state: CivState,
    personality: Personality,
    capital: GridPos,
    territory: Vec<GridPos>,
    relations: BTreeMap<String, u8>,
    alive: bool,
    death_cause: Option<DeathCause>,
}

impl Civilization {
    /// Settles at `capital` and claims every free passable cell of the 3x3
    /// block around it. The caller has already validated the position.
    pub fn found<R: Rng + ?Sized>(
        founding: &Founding,
        capital: GridPos,
        world: &mut World,
        rng: &mut R,
    ) -> Self {
        let population = founding
            .population
            .unwrap_or_else(|| rng.gen_range(30..=60));
        let morale = founding
            .morale
            .unwrap_or_else(|| rng.gen_range(70..=90))
            .min(MORALE_MAX);
        let personality = founding.personality.unwrap_or_else(|| {
            *Personality::ALL
                .choose(&mut *rng)
                .unwrap_or(&Personality::Peaceful)
        });

        let mut civ = Self {
            name: founding.name.clone(),
            population,
            food: founding.food.unwrap_or(200),
            morale,
            tech_level: founding.tech_level.unwrap_or(1),
            state: CivState::Idle,
            personality,
            capital,
            territory: Vec::new(),
            relations: BTreeMap::new(),
            alive: true,
            death_cause: None,
        };
        for pos in capital.square(1) {
            civ.claim(world, pos);
        }
        civ
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn capital(&self) -> GridPos {
        self.capital
    }

    pub fn territory(&self) -> &[GridPos] {
        &self.territory
    }

    pub fn relations(&self) -> &BTreeMap<String, u8> {
        &self.relations
    }

    pub fn relation_with(&self, other: &str) -> Option<u8> {
        self.relations.get(other).copied()
    }

    pub fn has_met(&self, other: &str) -> bool {
        self.relations.contains_key(other)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death_cause
    }

    pub fn food_per_capita(&self) -> f64 {
        if self.population == 0 {
            return 0.0;
        }
        self.food as f64 / self.population as f64
    }

    /// Takes ownership of the cell at `pos` if it exists and is claimable.
    /// Territory and cell ownership change together or not at all.
    fn claim(&mut self, world: &mut World, pos: GridPos) -> bool {
        match world.cell_mut(pos) {
            Some(cell) if cell.is_claimable() => {
                cell.owner = Some(self.name.clone());
                self.territory.push(pos);
                true
            }
            _ => false,
        }
    }

    /// Records a first-contact score. Scores are fixed once set; a second
    /// call for the same name is ignored and returns false.
    pub(crate) fn establish_relation(&mut self, other: &str, score: u8) -> bool {
        if self.relations.contains_key(other) {
            return false;
        }
        self.relations.insert(other.to_string(), score);
        true
    }

    fn raise_morale(&mut self, amount: u32) {
        self.morale = (self.morale + amount).min(MORALE_MAX);
    }

    fn lower_morale(&mut self, amount: u32) {
        self.morale = self.morale.saturating_sub(amount);
    }

    /// Applied by events: loses a share of the population, never below the
    /// collapse floor, and morale.
    pub(crate) fn suffer_plague(&mut self, deaths: u32) {
        self.population = self.population.saturating_sub(deaths).max(POPULATION_MIN);
        self.lower_morale(20);
    }

    pub(crate) fn make_discovery(&mut self) {
        self.tech_level += 1;
        self.raise_morale(10);
    }

    pub(crate) fn suffer_crisis(&mut self, morale_loss: u32) {
        self.lower_morale(morale_loss);
    }

    fn collapse(&mut self, cause: DeathCause, chronicle: &mut dyn Chronicle, year: u64) {
        self.alive = false;
        self.state = CivState::Collapsed;
        self.death_cause = Some(cause);
        tracing::info!(civ = %self.name, cause = cause.as_str(), year, "civilization collapsed");
        chronicle.log_major_event(
            year,
            &format!(
                "The civilization of {} has COLLAPSED due to {}!",
                self.name,
                cause.as_str()
            ),
        );
    }

    /// Births, starvation and natural deaths for one day, then the collapse
    /// check.
    pub fn process_population_changes<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        chronicle: &mut dyn Chronicle,
        year: u64,
    ) {
        if !self.alive {
            return;
        }

        let fpc = self.food_per_capita();
        if fpc < STARVATION_FPC {
            let deaths = (self.population as f64 * 0.02) as u32;
            self.population = self.population.saturating_sub(deaths);
            self.lower_morale(3);
            if deaths > 0 {
                chronicle.log_event(
                    year,
                    &format!("{deaths} of {}'s people starve to death.", self.name),
                );
            }
        } else if fpc > BIRTH_FPC && self.morale > BIRTH_MORALE {
            let births = (self.population as f64 * 0.01) as u32;
            self.population = self.population.saturating_add(births.max(1));
        }

        if rng.gen::<f64>() < NATURAL_DEATH_CHANCE {
            let deaths = (self.population as f64 * 0.002) as u32;
            self.population = self.population.saturating_sub(deaths);
        }

        if self.population < POPULATION_MIN {
            self.collapse(DeathCause::PopulationCollapse, chronicle, year);
            return;
        }

        if self.morale < MORALE_CRITICAL && rng.gen::<f64>() < UNREST_COLLAPSE_CHANCE {
            self.collapse(DeathCause::CivilUnrest, chronicle, year);
        }
    }

    pub fn status_line(&self) -> String {
        match (self.alive, self.death_cause) {
            (false, Some(cause)) => format!("{} [COLLAPSED - {}]", self.name, cause.as_str()),
            (false, None) => format!("{} [COLLAPSED]", self.name),
            (true, _) => format!(
                "{} | Pop: {} | Food: {} | Morale: {}% | Tech: {} | Territory: {} | State: {} | Trait: {}",
                self.name,
                self.population,
                self.food,
                self.morale,
                self.tech_level,
                self.territory.len(),
                self.state.as_str(),
                self.personality.as_str()
            ),
        }
    }
}
