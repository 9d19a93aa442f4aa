pub mod cell;
pub mod chronicle;
pub mod civilization;
pub mod engine;
pub mod error;
pub mod events;
pub mod names;
pub mod render;
pub mod report;
pub mod rng;
pub mod scenario;
pub mod spatial;
pub mod systems;
pub mod world;

pub use chronicle::{Chronicle, ChronicleLog};
pub use civilization::{Civilization, Founding};
pub use engine::{Engine, EngineBuilder, EngineSettings, RunEnd, RunOutcome, TickSummary};
pub use error::FoundingError;
pub use scenario::{Scenario, ScenarioLoader};
