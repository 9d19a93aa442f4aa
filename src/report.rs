//! Point-in-time status of the realm for display and JSON export.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::civilization::{CivState, Civilization, DeathCause, Personality};
use crate::render::render_ascii;
use crate::world::{Season, World};

#[derive(Debug, Clone, Serialize)]
pub struct CivilizationStatus {
    pub name: String,
    pub alive: bool,
    pub population: u32,
    pub food: u32,
    pub morale: u32,
    pub tech_level: u32,
    pub territory: usize,
    pub state: CivState,
    pub personality: Personality,
    pub death_cause: Option<DeathCause>,
    pub relations: BTreeMap<String, u8>,
    pub summary: String,
}

impl CivilizationStatus {
    pub fn of(civ: &Civilization) -> Self {
        Self {
            name: civ.name().to_string(),
            alive: civ.is_alive(),
            population: civ.population,
            food: civ.food,
            morale: civ.morale,
            tech_level: civ.tech_level,
            territory: civ.territory().len(),
            state: civ.state,
            personality: civ.personality(),
            death_cause: civ.death_cause(),
            relations: civ.relations().clone(),
            summary: civ.status_line(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub year: u64,
    /// Days elapsed since the world began.
    pub day: u64,
    pub day_of_year: u64,
    pub season: Season,
    pub map: String,
    pub civilizations: Vec<CivilizationStatus>,
}

impl StatusReport {
    pub fn capture(world: &World, civilizations: &[Civilization]) -> Self {
        let names: Vec<&str> = civilizations.iter().map(Civilization::name).collect();
        Self {
            year: world.year(),
            day: world.day(),
            day_of_year: world.day_of_year(),
            season: world.season(),
            map: render_ascii(world, &names),
            civilizations: civilizations.iter().map(CivilizationStatus::of).collect(),
        }
    }

    /// Map followed by one status line per civilization.
    pub fn render(&self, heading: &str) -> String {
        let mut out = self.map.clone();
        out.push_str(&format!("\n\n{heading}:\n"));
        for civ in &self.civilizations {
            out.push_str(&format!("  {}\n", civ.summary));
        }
        out
    }
}

/// How a run ended for the civilizations in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    SoleSurvivor { name: String },
    /// Largest territory among several survivors; ties go to the earliest
    /// founded.
    Dominant { name: String, territory: usize },
    Desolate,
}

impl Verdict {
    pub fn of(civilizations: &[Civilization]) -> Self {
        let living: Vec<&Civilization> = civilizations.iter().filter(|c| c.is_alive()).collect();
        match living.as_slice() {
            [] => Verdict::Desolate,
            [only] => Verdict::SoleSurvivor {
                name: only.name().to_string(),
            },
            several => {
                let mut leader = several[0];
                for &civ in &several[1..] {
                    if civ.territory().len() > leader.territory().len() {
                        leader = civ;
                    }
                }
                Verdict::Dominant {
                    name: leader.name().to_string(),
                    territory: leader.territory().len(),
                }
            }
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::SoleSurvivor { name } => {
                write!(f, "*** {name} is the sole surviving civilization! ***")
            }
            Verdict::Dominant { name, territory } => {
                write!(f, "*** {name} dominates with {territory} territories! ***")
            }
            Verdict::Desolate => {
                write!(f, "*** No civilizations survived. The world is empty. ***")
            }
        }
    }
}
