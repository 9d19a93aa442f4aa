use anyhow::Result;

use crate::{
    civilization::ActionOutcome,
    engine::{Realm, System, SystemContext},
    rng::SystemRng,
};

/// Lets every live civilization pick a state and act on it, one at a time in
/// founding order. Contacts are recomputed per civilization so earlier
/// expansions this tick are visible to later ones.
pub struct CivilizationSystem;

impl CivilizationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CivilizationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CivilizationSystem {
    fn name(&self) -> &str {
        "civilizations"
    }

    fn run(
        &mut self,
        ctx: &mut SystemContext<'_>,
        realm: &mut Realm,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for index in 0..realm.civilizations.len() {
            if !realm.civilizations[index].is_alive() {
                continue;
            }
            let nearby = realm.nearby(index);
            let Realm {
                world,
                civilizations,
            } = realm;

            let civ = &mut civilizations[index];
            civ.update_state(&nearby, rng);
            let outcome = civ.execute_action(world, &nearby, rng, &mut *ctx.chronicle, ctx.year);
            tracing::debug!(
                day = ctx.day,
                civ = %civ.name(),
                state = civ.state.as_str(),
                ?outcome,
                "civilization acted"
            );

            // Relations are symmetric: the met civilization records the same
            // score.
            if let ActionOutcome::FirstContact { index: other, score, .. } = outcome {
                let name = civilizations[index].name().to_string();
                civilizations[other].establish_relation(&name, score);
            }
        }
        Ok(())
    }
}
