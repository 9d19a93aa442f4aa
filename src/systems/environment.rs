use anyhow::Result;

use crate::{
    engine::{Realm, System, SystemContext},
    rng::SystemRng,
};

/// Seasonal climate, then food regeneration, for every cell.
pub struct EnvironmentSystem;

impl EnvironmentSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvironmentSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EnvironmentSystem {
    fn name(&self) -> &str {
        "environment"
    }

    fn run(
        &mut self,
        _ctx: &mut SystemContext<'_>,
        realm: &mut Realm,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        realm.world.update_climate();
        realm.world.update_resources();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, Terrain};
    use crate::chronicle::ChronicleLog;
    use crate::rng::RngManager;
    use crate::spatial::GridPos;
    use crate::world::World;

    #[test]
    fn regrows_depleted_cells() {
        let world = World::from_fn(3, 3, |pos| {
            let terrain = if pos.x == 0 { Terrain::Water } else { Terrain::Plains };
            Cell::new(pos, terrain, 100)
        });
        let mut realm = Realm::new(world);
        for pos in GridPos::new(1, 1).square(1) {
            realm.world.cell_mut(pos).unwrap().deplete_food(100);
        }
        let mut log = ChronicleLog::new(false);
        let mut ctx = SystemContext {
            day: 0,
            year: 0,
            chronicle: &mut log,
        };
        let mut rng = RngManager::new(1);
        EnvironmentSystem::new()
            .run(&mut ctx, &mut realm, &mut rng.stream("environment"))
            .unwrap();

        // Day 0 is deep winter, so the harsh rate applies.
        assert_eq!(realm.world.cell(GridPos::new(1, 1)).unwrap().food(), 2);
        assert_eq!(realm.world.cell(GridPos::new(0, 1)).unwrap().food(), 0);
    }
}
