//! Random events that perturb the world and its civilizations.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chronicle::Chronicle;
use crate::civilization::Civilization;
use crate::spatial::GridPos;
use crate::world::World;

const DROUGHT_RADIUS: i32 = 3;
const DROUGHT_LOSS: u32 = 30;
const HARVEST_RADIUS: i32 = 2;
const HARVEST_GAIN: u32 = 50;

const DISCOVERIES: [&str; 5] = [
    "improved farming techniques",
    "better hunting tools",
    "advanced construction methods",
    "new preservation methods",
    "improved irrigation",
];

const CRISES: [&str; 4] = [
    "religious schism",
    "political scandal",
    "failed harvest celebration",
    "disputed succession",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Drought,
    BountifulHarvest,
    Plague,
    TechnologicalDiscovery,
    MoraleCrisis,
}

impl EventKind {
    /// Roll order within a tick.
    pub const ROSTER: [EventKind; 5] = [
        EventKind::Drought,
        EventKind::BountifulHarvest,
        EventKind::Plague,
        EventKind::TechnologicalDiscovery,
        EventKind::MoraleCrisis,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Drought => "Drought",
            EventKind::BountifulHarvest => "Bountiful Harvest",
            EventKind::Plague => "Plague",
            EventKind::TechnologicalDiscovery => "Technological Discovery",
            EventKind::MoraleCrisis => "Morale Crisis",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_drought() -> f64 {
    0.001
}

fn default_bountiful_harvest() -> f64 {
    0.002
}

fn default_plague() -> f64 {
    0.0005
}

fn default_technological_discovery() -> f64 {
    0.001
}

fn default_morale_crisis() -> f64 {
    0.0003
}

/// Per-tick trigger probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_drought")]
    pub drought: f64,
    #[serde(default = "default_bountiful_harvest")]
    pub bountiful_harvest: f64,
    #[serde(default = "default_plague")]
    pub plague: f64,
    #[serde(default = "default_technological_discovery")]
    pub technological_discovery: f64,
    #[serde(default = "default_morale_crisis")]
    pub morale_crisis: f64,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            drought: default_drought(),
            bountiful_harvest: default_bountiful_harvest(),
            plague: default_plague(),
            technological_discovery: default_technological_discovery(),
            morale_crisis: default_morale_crisis(),
        }
    }
}

impl EventSettings {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn probability(&self, kind: EventKind) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        match kind {
            EventKind::Drought => self.drought,
            EventKind::BountifulHarvest => self.bountiful_harvest,
            EventKind::Plague => self.plague,
            EventKind::TechnologicalDiscovery => self.technological_discovery,
            EventKind::MoraleCrisis => self.morale_crisis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Drought { center: GridPos, cells: usize },
    BountifulHarvest { center: GridPos, cells: usize },
    Plague { target: String, deaths: u32 },
    Discovery { target: String, tech_level: u32 },
    MoraleCrisis { target: String, loss: u32 },
    /// A civilization-targeted event fired with nobody alive to hit.
    NoTarget(EventKind),
}

/// Every cell in the 7x7 block around `center` loses up to 30 food.
/// Returns how many in-grid cells were touched.
pub fn apply_drought(world: &mut World, center: GridPos) -> usize {
    let mut cells = 0;
    for pos in center.square(DROUGHT_RADIUS) {
        if let Some(cell) = world.cell_mut(pos) {
            cell.deplete_food(DROUGHT_LOSS);
            cells += 1;
        }
    }
    cells
}

/// Every cell in the 5x5 block around `center` gains up to 50 food, capped
/// at twice its ceiling.
pub fn apply_bountiful_harvest(world: &mut World, center: GridPos) -> usize {
    let mut cells = 0;
    for pos in center.square(HARVEST_RADIUS) {
        if let Some(cell) = world.cell_mut(pos) {
            cell.enrich_food(HARVEST_GAIN);
            cells += 1;
        }
    }
    cells
}

/// Fixed roster of events, each rolled independently every tick.
pub struct EventManager {
    settings: EventSettings,
}

impl EventManager {
    pub fn new(settings: EventSettings) -> Self {
        Self { settings }
    }

    pub fn process<R: Rng + ?Sized>(
        &self,
        world: &mut World,
        civilizations: &mut [Civilization],
        rng: &mut R,
        chronicle: &mut dyn Chronicle,
    ) -> Vec<EventOutcome> {
        let mut fired = Vec::new();
        for kind in EventKind::ROSTER {
            if rng.gen::<f64>() < self.settings.probability(kind) {
                fired.push(trigger(kind, world, civilizations, rng, chronicle));
            }
        }
        fired
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new(EventSettings::default())
    }
}

fn random_cell<R: Rng + ?Sized>(world: &World, rng: &mut R) -> GridPos {
    let x = rng.gen_range(0..world.width().max(1)) as i32;
    let y = rng.gen_range(0..world.height().max(1)) as i32;
    GridPos::new(x, y)
}

/// Uniform draw over the live civilizations, in list order.
fn random_living<R: Rng + ?Sized>(civilizations: &[Civilization], rng: &mut R) -> Option<usize> {
    let living: Vec<usize> = civilizations
        .iter()
        .enumerate()
        .filter(|(_, civ)| civ.is_alive())
        .map(|(index, _)| index)
        .collect();
    living.choose(rng).copied()
}

/// Applies one event immediately, choosing its target with `rng`.
pub fn trigger<R: Rng + ?Sized>(
    kind: EventKind,
    world: &mut World,
    civilizations: &mut [Civilization],
    rng: &mut R,
    chronicle: &mut dyn Chronicle,
) -> EventOutcome {
    let year = world.year();
    match kind {
        EventKind::Drought => {
            let center = random_cell(world, rng);
            let cells = apply_drought(world, center);
            chronicle.log_event(
                year,
                &format!("A terrible drought strikes the region around {center}!"),
            );
            EventOutcome::Drought { center, cells }
        }
        EventKind::BountifulHarvest => {
            let center = random_cell(world, rng);
            let cells = apply_bountiful_harvest(world, center);
            chronicle.log_event(
                year,
                &format!("The lands around {center} enjoy a bountiful harvest!"),
            );
            EventOutcome::BountifulHarvest { center, cells }
        }
        EventKind::Plague => {
            let Some(index) = random_living(civilizations, rng) else {
                return EventOutcome::NoTarget(kind);
            };
            let target = &mut civilizations[index];
            let deaths = (target.population as f64 * rng.gen_range(0.1..0.3)) as u32;
            target.suffer_plague(deaths);
            chronicle.log_major_event(
                year,
                &format!("A plague devastates {}, killing {deaths} people!", target.name()),
            );
            EventOutcome::Plague {
                target: target.name().to_string(),
                deaths,
            }
        }
        EventKind::TechnologicalDiscovery => {
            let Some(index) = random_living(civilizations, rng) else {
                return EventOutcome::NoTarget(kind);
            };
            let target = &mut civilizations[index];
            target.make_discovery();
            let discovery = DISCOVERIES.choose(rng).copied().unwrap_or(DISCOVERIES[0]);
            chronicle.log_event(
                year,
                &format!(
                    "{} discovers {discovery}! (Tech Level: {})",
                    target.name(),
                    target.tech_level
                ),
            );
            EventOutcome::Discovery {
                target: target.name().to_string(),
                tech_level: target.tech_level,
            }
        }
        EventKind::MoraleCrisis => {
            let Some(index) = random_living(civilizations, rng) else {
                return EventOutcome::NoTarget(kind);
            };
            let target = &mut civilizations[index];
            let loss = rng.gen_range(5..=15);
            target.suffer_crisis(loss);
            let crisis = CRISES.choose(rng).copied().unwrap_or(CRISES[0]);
            chronicle.log_event(
                year,
                &format!(
                    "A {crisis} causes unrest in {}. Morale drops by {loss}.",
                    target.name()
                ),
            );
            EventOutcome::MoraleCrisis {
                target: target.name().to_string(),
                loss,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::cell::{Cell, Terrain};
    use crate::chronicle::ChronicleLog;
    use crate::civilization::{Founding, POPULATION_MIN};

    fn plains(width: u32, height: u32, food: u32) -> World {
        World::from_fn(width, height, |pos| Cell::new(pos, Terrain::Plains, food))
    }

    fn settle(world: &mut World, founding: Founding) -> Civilization {
        let capital = founding.position.unwrap_or(GridPos::new(2, 2));
        Civilization::found(&founding, capital, world, &mut ChaCha8Rng::seed_from_u64(4))
    }

    #[test]
    fn drought_is_clipped_at_the_border() {
        let mut world = plains(10, 10, 100);
        assert_eq!(apply_drought(&mut world, GridPos::new(0, 0)), 16);
        assert_eq!(apply_drought(&mut world, GridPos::new(5, 5)), 49);
    }

    #[test]
    fn harvest_respects_double_ceiling() {
        let mut world = plains(10, 10, 30);
        assert_eq!(apply_bountiful_harvest(&mut world, GridPos::new(5, 5)), 25);
        let cell = world.cell(GridPos::new(5, 5)).unwrap();
        assert_eq!(cell.food(), 60);
        let outside = world.cell(GridPos::new(8, 8)).unwrap();
        assert_eq!(outside.food(), 30);
    }

    #[test]
    fn disabled_settings_never_fire() {
        let mut world = plains(10, 10, 100);
        let mut civs = vec![settle(&mut world, Founding::named("Elves").at(5, 5))];
        let manager = EventManager::new(EventSettings::disabled());
        let mut log = ChronicleLog::new(false);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..1_000 {
            assert!(manager
                .process(&mut world, &mut civs, &mut rng, &mut log)
                .is_empty());
        }
        assert!(log.events().is_empty());
    }

    #[test]
    fn certain_events_all_fire_in_roster_order() {
        let mut world = plains(10, 10, 100);
        let mut civs = vec![settle(&mut world, Founding::named("Elves").at(5, 5))];
        let settings = EventSettings {
            enabled: true,
            drought: 1.0,
            bountiful_harvest: 1.0,
            plague: 1.0,
            technological_discovery: 1.0,
            morale_crisis: 1.0,
        };
        let manager = EventManager::new(settings);
        let mut log = ChronicleLog::new(false);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let fired = manager.process(&mut world, &mut civs, &mut rng, &mut log);
        assert_eq!(fired.len(), 5);
        assert!(matches!(fired[0], EventOutcome::Drought { .. }));
        assert!(matches!(fired[1], EventOutcome::BountifulHarvest { .. }));
        assert!(matches!(fired[2], EventOutcome::Plague { .. }));
        assert!(matches!(fired[3], EventOutcome::Discovery { tech_level: 2, .. }));
        assert!(matches!(fired[4], EventOutcome::MoraleCrisis { .. }));
        assert_eq!(log.major_events().len(), 1);
        assert_eq!(log.events().len(), 4);
    }

    #[test]
    fn plague_never_drops_below_floor() {
        let mut world = plains(10, 10, 100);
        let mut civs = vec![settle(
            &mut world,
            Founding::named("Orcs").at(5, 5).with_population(12).with_morale(15),
        )];
        let mut log = ChronicleLog::new(false);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..10 {
            trigger(EventKind::Plague, &mut world, &mut civs, &mut rng, &mut log);
            assert!(civs[0].population >= POPULATION_MIN);
        }
        assert_eq!(civs[0].morale, 0);
    }

    #[test]
    fn plague_kills_a_tenth_to_under_a_third() {
        let mut world = plains(10, 10, 100);
        let mut civs = vec![settle(
            &mut world,
            Founding::named("Humans").at(5, 5).with_population(1_000).with_morale(90),
        )];
        let mut log = ChronicleLog::new(false);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let outcome = trigger(EventKind::Plague, &mut world, &mut civs, &mut rng, &mut log);
        let EventOutcome::Plague { deaths, .. } = outcome else {
            panic!("expected plague");
        };
        assert!((100..300).contains(&deaths));
        assert_eq!(civs[0].population, 1_000 - deaths);
        assert_eq!(civs[0].morale, 70);
    }

    #[test]
    fn discovery_caps_morale() {
        let mut world = plains(10, 10, 100);
        let mut civs = vec![settle(
            &mut world,
            Founding::named("Gnomes").at(5, 5).with_morale(95),
        )];
        let mut log = ChronicleLog::new(false);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        trigger(EventKind::TechnologicalDiscovery, &mut world, &mut civs, &mut rng, &mut log);
        assert_eq!(civs[0].tech_level, 2);
        assert_eq!(civs[0].morale, 100);
        assert!(log.events()[0].message.contains("(Tech Level: 2)"));
    }

    #[test]
    fn crisis_loses_five_to_fifteen() {
        let mut world = plains(10, 10, 100);
        let mut civs = vec![settle(
            &mut world,
            Founding::named("Goblins").at(5, 5).with_morale(50),
        )];
        let mut log = ChronicleLog::new(false);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        trigger(EventKind::MoraleCrisis, &mut world, &mut civs, &mut rng, &mut log);
        assert!((35..=45).contains(&civs[0].morale));
    }

    #[test]
    fn civilization_events_without_survivors_are_noops() {
        let mut world = plains(10, 10, 100);
        let mut civs: Vec<Civilization> = Vec::new();
        let mut log = ChronicleLog::new(false);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for kind in [
            EventKind::Plague,
            EventKind::TechnologicalDiscovery,
            EventKind::MoraleCrisis,
        ] {
            let outcome = trigger(kind, &mut world, &mut civs, &mut rng, &mut log);
            assert_eq!(outcome, EventOutcome::NoTarget(kind));
        }
        assert!(log.events().is_empty());
        assert!(log.major_events().is_empty());
    }
}
