use anyhow::Result;

use crate::{
    engine::{Realm, System, SystemContext},
    rng::SystemRng,
};

/// Births, deaths and collapse checks, after every civilization has acted.
pub struct PopulationSystem;

impl PopulationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PopulationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for PopulationSystem {
    fn name(&self) -> &str {
        "population"
    }

    fn run(
        &mut self,
        ctx: &mut SystemContext<'_>,
        realm: &mut Realm,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for civ in realm.civilizations.iter_mut().filter(|civ| civ.is_alive()) {
            civ.process_population_changes(rng, &mut *ctx.chronicle, ctx.year);
        }
        Ok(())
    }
}
