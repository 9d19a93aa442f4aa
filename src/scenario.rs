use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    civilization::Founding,
    engine::EngineSettings,
    events::EventSettings,
    names,
    world::DAYS_PER_YEAR,
};

fn default_name() -> String {
    "realm".to_string()
}

fn default_map_size() -> u32 {
    20
}

fn default_years() -> u64 {
    10
}

fn default_display_interval_days() -> u64 {
    DAYS_PER_YEAR
}

fn default_random_civilizations() -> usize {
    2
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Drawn from entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_map_size")]
    pub width: u32,
    #[serde(default = "default_map_size")]
    pub height: u32,
    #[serde(default = "default_years")]
    pub years: u64,
    #[serde(default = "default_display_interval_days")]
    pub display_interval_days: u64,
    #[serde(default)]
    pub tick_delay_ms: u64,
    /// Explicit foundings. When empty, `random_civilizations` names are
    /// generated instead.
    #[serde(default)]
    pub civilizations: Vec<Founding>,
    #[serde(default = "default_random_civilizations")]
    pub random_civilizations: usize,
    #[serde(default)]
    pub events: EventSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: None,
            seed: None,
            width: default_map_size(),
            height: default_map_size(),
            years: default_years(),
            display_interval_days: default_display_interval_days(),
            tick_delay_ms: 0,
            civilizations: Vec::new(),
            random_civilizations: default_random_civilizations(),
            events: EventSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0 && self.height > 0,
            "world must be at least 1x1, got {}x{}",
            self.width,
            self.height
        );
        ensure!(
            !self.civilizations.is_empty() || self.random_civilizations <= names::MAX_NAMES,
            "at most {} civilizations can be named at random, got {}",
            names::MAX_NAMES,
            self.random_civilizations
        );
        for (label, p) in [
            ("drought", self.events.drought),
            ("bountiful_harvest", self.events.bountiful_harvest),
            ("plague", self.events.plague),
            ("technological_discovery", self.events.technological_discovery),
            ("morale_crisis", self.events.morale_crisis),
        ] {
            ensure!(
                (0.0..=1.0).contains(&p),
                "{label} probability must lie in [0, 1], got {p}"
            );
        }
        Ok(())
    }

    pub fn engine_settings(&self, seed: u64) -> EngineSettings {
        EngineSettings {
            scenario_name: self.name.clone(),
            seed,
            width: self.width,
            height: self.height,
            display_interval_days: self.display_interval_days,
            tick_delay: Duration::from_millis(self.tick_delay_ms),
        }
    }

    pub fn days(&self, override_years: Option<u64>) -> u64 {
        override_years.unwrap_or(self.years) * DAYS_PER_YEAR
    }

    /// The listed foundings, or freshly named ones when none are listed.
    pub fn foundings<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Founding> {
        if !self.civilizations.is_empty() {
            return self.civilizations.clone();
        }
        names::generate(rng, self.random_civilizations)
            .into_iter()
            .map(Founding::named)
            .collect()
    }
}
