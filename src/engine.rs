use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::Rng;

use crate::{
    chronicle::{Chronicle, ChronicleLog},
    civilization::{Civilization, Contact, Founding},
    error::{FoundingError, PlacementRejection},
    events::EventSettings,
    report::{StatusReport, Verdict},
    rng::{RngManager, SystemRng, FOUNDING_STREAM, TERRAIN_STREAM},
    spatial::GridPos,
    systems::{
        BookkeepingSystem, CivilizationSystem, EnvironmentSystem, EventSystem, PopulationSystem,
    },
    world::{World, DAYS_PER_YEAR},
};

/// Minimum Manhattan distance between two capitals.
pub const MIN_CAPITAL_DISTANCE: u32 = 6;
/// Random candidates tried before giving up on a start position.
pub const PLACEMENT_ATTEMPTS: u32 = 100;
const PLACEMENT_MARGIN: i32 = 2;

const EXTINCTION_MESSAGE: &str = "All civilizations have perished. The world falls silent.";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    /// Days between status reports handed to the run hook. Zero disables
    /// reporting.
    pub display_interval_days: u64,
    /// Pause after each tick. Pacing only; never affects outcomes.
    pub tick_delay: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            scenario_name: "realm".to_string(),
            seed: 0,
            width: 20,
            height: 20,
            display_interval_days: DAYS_PER_YEAR,
            tick_delay: Duration::ZERO,
        }
    }
}

pub struct EngineBuilder<C: Chronicle = ChronicleLog> {
    settings: EngineSettings,
    world: Option<World>,
    systems: Vec<Box<dyn System>>,
    chronicle: C,
}

impl EngineBuilder<ChronicleLog> {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            world: None,
            systems: Vec::new(),
            chronicle: ChronicleLog::new(false),
        }
    }
}

impl<C: Chronicle> EngineBuilder<C> {
    pub fn with_chronicle<D: Chronicle>(self, chronicle: D) -> EngineBuilder<D> {
        EngineBuilder {
            settings: self.settings,
            world: self.world,
            systems: self.systems,
            chronicle,
        }
    }

    /// Uses a prepared grid instead of generating one from the seed.
    pub fn with_world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Environment, civilizations, events, population, then bookkeeping.
    pub fn with_standard_systems(self, events: EventSettings) -> Self {
        self.with_system(EnvironmentSystem::new())
            .with_system(CivilizationSystem::new())
            .with_system(EventSystem::new(events))
            .with_system(PopulationSystem::new())
            .with_system(BookkeepingSystem::new())
    }

    pub fn build(self) -> Engine<C> {
        let mut rng = RngManager::new(self.settings.seed);
        let world = match self.world {
            Some(world) => world,
            None => World::generate(
                self.settings.width,
                self.settings.height,
                &mut rng.stream(TERRAIN_STREAM),
            ),
        };
        tracing::info!(
            scenario = %self.settings.scenario_name,
            seed = self.settings.seed,
            width = world.width(),
            height = world.height(),
            systems = self.systems.len(),
            "engine built"
        );
        Engine {
            rng,
            systems: self.systems,
            realm: Realm::new(world),
            chronicle: self.chronicle,
            settings: self.settings,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Everything the systems mutate: the grid and the civilizations in
/// founding order.
pub struct Realm {
    pub world: World,
    pub civilizations: Vec<Civilization>,
}

impl Realm {
    pub fn new(world: World) -> Self {
        Self {
            world,
            civilizations: Vec::new(),
        }
    }

    pub fn any_alive(&self) -> bool {
        self.civilizations.iter().any(Civilization::is_alive)
    }

    pub fn alive_count(&self) -> usize {
        self.civilizations.iter().filter(|civ| civ.is_alive()).count()
    }

    pub fn civilization(&self, name: &str) -> Option<&Civilization> {
        self.civilizations.iter().find(|civ| civ.name() == name)
    }

    /// Live civilizations owning a cell adjacent to any cell of the
    /// civilization at `index`, in founding order.
    pub fn nearby(&self, index: usize) -> Vec<Contact> {
        let Some(me) = self.civilizations.get(index) else {
            return Vec::new();
        };
        let mut bordering: HashSet<&str> = HashSet::new();
        for pos in me.territory() {
            for cell in self.world.get_neighbors(pos.x, pos.y) {
                if let Some(owner) = cell.owner.as_deref() {
                    bordering.insert(owner);
                }
            }
        }

        self.civilizations
            .iter()
            .enumerate()
            .filter(|(other, civ)| {
                *other != index && civ.is_alive() && bordering.contains(civ.name())
            })
            .map(|(other, civ)| Contact {
                index: other,
                name: civ.name().to_string(),
                personality: civ.personality(),
            })
            .collect()
    }

    /// In bounds, passable, unowned and far enough from every capital,
    /// including those of collapsed civilizations.
    pub fn check_site(&self, pos: GridPos) -> Result<(), PlacementRejection> {
        let cell = self
            .world
            .cell(pos)
            .ok_or(PlacementRejection::OutOfBounds)?;
        if !cell.is_passable() {
            return Err(PlacementRejection::Impassable);
        }
        if cell.owner.is_some() {
            return Err(PlacementRejection::Owned);
        }
        match self
            .civilizations
            .iter()
            .map(|civ| civ.capital().manhattan(pos))
            .find(|&distance| distance < MIN_CAPITAL_DISTANCE)
        {
            Some(distance) => Err(PlacementRejection::TooClose { distance }),
            None => Ok(()),
        }
    }

    /// Draws candidates away from the border until one passes
    /// [`Realm::check_site`].
    pub fn find_site<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GridPos> {
        let max_x = self.world.width() as i32 - 1 - PLACEMENT_MARGIN;
        let max_y = self.world.height() as i32 - 1 - PLACEMENT_MARGIN;
        if max_x < PLACEMENT_MARGIN || max_y < PLACEMENT_MARGIN {
            return None;
        }
        (0..PLACEMENT_ATTEMPTS)
            .map(|_| {
                GridPos::new(
                    rng.gen_range(PLACEMENT_MARGIN..=max_x),
                    rng.gen_range(PLACEMENT_MARGIN..=max_y),
                )
            })
            .find(|&pos| self.check_site(pos).is_ok())
    }
}

/// Cooperative cancellation for [`Engine::run`]. Checked once before every
/// tick.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    Completed,
    Extinct,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub ticks: u64,
    pub end: RunEnd,
}

#[derive(Clone, Debug)]
pub struct SystemRunReport {
    pub name: String,
    pub duration_ms: f64,
}

#[derive(Clone, Debug)]
pub struct TickSummary {
    pub day: u64,
    pub year: u64,
    pub alive: usize,
    pub system_reports: Vec<SystemRunReport>,
}

pub struct Engine<C: Chronicle = ChronicleLog> {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    realm: Realm,
    chronicle: C,
    settings: EngineSettings,
    running: Arc<AtomicBool>,
}

impl<C: Chronicle> Engine<C> {
    /// Validates or searches a start position, then founds the civilization
    /// and records it as a major event.
    pub fn add_civilization(&mut self, founding: Founding) -> Result<&Civilization, FoundingError> {
        if self.realm.civilization(&founding.name).is_some() {
            return Err(FoundingError::DuplicateName(founding.name));
        }

        let mut rng = self.rng.stream(FOUNDING_STREAM);
        let capital = match founding.position {
            Some(pos) => {
                self.realm
                    .check_site(pos)
                    .map_err(|reason| FoundingError::InvalidPosition {
                        name: founding.name.clone(),
                        pos,
                        reason,
                    })?;
                pos
            }
            None => self
                .realm
                .find_site(&mut rng)
                .ok_or_else(|| FoundingError::NoValidPosition {
                    name: founding.name.clone(),
                    attempts: PLACEMENT_ATTEMPTS,
                })?,
        };

        let civ = Civilization::found(&founding, capital, &mut self.realm.world, &mut rng);
        let year = self.realm.world.year();
        tracing::info!(
            civ = %civ.name(),
            x = capital.x,
            y = capital.y,
            population = civ.population,
            personality = civ.personality().as_str(),
            "civilization founded"
        );
        self.chronicle.log_major_event(
            year,
            &format!(
                "The civilization of {} is founded at {capital}! Population: {}, Trait: {}",
                civ.name(),
                civ.population,
                civ.personality().as_str()
            ),
        );
        self.realm.civilizations.push(civ);
        let index = self.realm.civilizations.len() - 1;
        Ok(&self.realm.civilizations[index])
    }

    /// Runs every system once in order, then advances the calendar.
    pub fn tick(&mut self) -> Result<TickSummary> {
        let day = self.realm.world.day();
        let year = self.realm.world.year();
        let mut system_reports = Vec::with_capacity(self.systems.len());
        for system in self.systems.iter_mut() {
            let started = Instant::now();
            let mut rng_stream = self.rng.stream(system.name());
            let mut ctx = SystemContext {
                day,
                year,
                chronicle: &mut self.chronicle,
            };
            system
                .run(&mut ctx, &mut self.realm, &mut rng_stream)
                .with_context(|| format!("system {} failed on day {day}", system.name()))?;
            system_reports.push(SystemRunReport {
                name: system.name().to_string(),
                duration_ms: started.elapsed().as_secs_f64() * 1_000.0,
            });
        }
        self.realm.world.advance_day();

        let alive = self.realm.alive_count();
        tracing::debug!(day, year, alive, "tick complete");
        Ok(TickSummary {
            day,
            year,
            alive,
            system_reports,
        })
    }

    pub fn run(&mut self, days: u64) -> Result<RunOutcome> {
        self.run_with_hook(days, |_| {})
    }

    /// Runs up to `days` ticks. Stops early once a tick leaves no
    /// civilization alive or a [`StopHandle`] clears the running flag. `hook` receives
    /// a status report every `display_interval_days` days.
    pub fn run_with_hook<F>(&mut self, days: u64, mut hook: F) -> Result<RunOutcome>
    where
        F: FnMut(&StatusReport),
    {
        self.running.store(true, Ordering::SeqCst);
        let start = self.realm.world.day();
        let interval = self.settings.display_interval_days;
        let mut ticks = 0;
        let mut end = RunEnd::Completed;
        tracing::info!(days, start_day = start, "run started");

        while ticks < days {
            if !self.running.load(Ordering::SeqCst) {
                end = RunEnd::Stopped;
                break;
            }

            self.tick()?;
            ticks += 1;

            if !self.realm.any_alive() {
                self.chronicle
                    .log_major_event(self.realm.world.year(), EXTINCTION_MESSAGE);
                end = RunEnd::Extinct;
                break;
            }

            if interval > 0 && (self.realm.world.day() - start) % interval == 0 {
                hook(&self.status_report());
            }
            if !self.settings.tick_delay.is_zero() {
                thread::sleep(self.settings.tick_delay);
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!(ticks, end = ?end, "run finished");
        Ok(RunOutcome { ticks, end })
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn status_report(&self) -> StatusReport {
        StatusReport::capture(&self.realm.world, &self.realm.civilizations)
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::of(&self.realm.civilizations)
    }

    /// Hands out a named random stream derived from the run's seed.
    pub fn rng_stream(&mut self, name: &str) -> SystemRng<'_> {
        self.rng.stream(name)
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    pub fn world(&self) -> &World {
        &self.realm.world
    }

    pub fn civilizations(&self) -> &[Civilization] {
        &self.realm.civilizations
    }

    pub fn civilization(&self, name: &str) -> Option<&Civilization> {
        self.realm.civilization(name)
    }

    pub fn chronicle(&self) -> &C {
        &self.chronicle
    }
}

pub struct SystemContext<'a> {
    pub day: u64,
    pub year: u64,
    pub chronicle: &'a mut dyn Chronicle,
}

pub trait System: Send {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &mut SystemContext<'_>,
        realm: &mut Realm,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
