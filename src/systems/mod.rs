mod bookkeeping;
mod civilizations;
mod environment;
mod events;
mod population;

pub use bookkeeping::{audit, BookkeepingSystem, Violation};
pub use civilizations::CivilizationSystem;
pub use environment::EnvironmentSystem;
pub use events::EventSystem;
pub use population::PopulationSystem;
