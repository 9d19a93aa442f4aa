use std::collections::HashSet;

use anyhow::Result;
use thiserror::Error;

use crate::{
    engine::{Realm, System, SystemContext},
    rng::SystemRng,
    spatial::GridPos,
};

/// A broken consistency rule between civilizations and the grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{civ} lists {pos} as territory but the cell is owned by {owner:?}")]
    UnownedTerritory {
        civ: String,
        pos: GridPos,
        owner: Option<String>,
    },
    #[error("cell {pos} is owned by {owner} but missing from its territory")]
    StrayOwnership { owner: String, pos: GridPos },
    #[error("{civ} lists {pos} more than once")]
    DuplicateTerritory { civ: String, pos: GridPos },
    #[error("cell {pos} holds {food} food, above twice its ceiling of {max_food}")]
    FoodOverflow { pos: GridPos, food: u32, max_food: u32 },
    #[error("{a} and {b} disagree about their relation")]
    AsymmetricRelation { a: String, b: String },
}

/// Scans the realm for ownership, food and relation inconsistencies.
pub fn audit(realm: &Realm) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut listed: HashSet<(&str, GridPos)> = HashSet::new();

    for civ in &realm.civilizations {
        for &pos in civ.territory() {
            if !listed.insert((civ.name(), pos)) {
                violations.push(Violation::DuplicateTerritory {
                    civ: civ.name().to_string(),
                    pos,
                });
            }
            let owner = realm.world.cell(pos).and_then(|cell| cell.owner.clone());
            if owner.as_deref() != Some(civ.name()) {
                violations.push(Violation::UnownedTerritory {
                    civ: civ.name().to_string(),
                    pos,
                    owner,
                });
            }
        }
        for (other, score) in civ.relations() {
            let mirrored = realm
                .civilization(other)
                .and_then(|peer| peer.relation_with(civ.name()));
            if mirrored != Some(*score) {
                violations.push(Violation::AsymmetricRelation {
                    a: civ.name().to_string(),
                    b: other.clone(),
                });
            }
        }
    }

    for cell in realm.world.cells() {
        if let Some(owner) = cell.owner.as_deref() {
            if !listed.contains(&(owner, cell.pos())) {
                violations.push(Violation::StrayOwnership {
                    owner: owner.to_string(),
                    pos: cell.pos(),
                });
            }
        }
        if cell.food() > cell.max_food().saturating_mul(2) {
            violations.push(Violation::FoodOverflow {
                pos: cell.pos(),
                food: cell.food(),
                max_food: cell.max_food(),
            });
        }
    }
    violations
}

/// Runs last each tick and reports anything [`audit`] finds.
pub struct BookkeepingSystem {
    violations_seen: usize,
}

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self { violations_seen: 0 }
    }

    pub fn violations_seen(&self) -> usize {
        self.violations_seen
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(
        &mut self,
        ctx: &mut SystemContext<'_>,
        realm: &mut Realm,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let violations = audit(realm);
        for violation in &violations {
            tracing::error!(day = ctx.day, %violation, "bookkeeping violation");
        }
        self.violations_seen += violations.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::cell::{Cell, Terrain};
    use crate::chronicle::ChronicleLog;
    use crate::civilization::{Civilization, Founding};
    use crate::rng::RngManager;
    use crate::world::World;

    fn realm_with_elves() -> Realm {
        let world = World::from_fn(10, 10, |pos| Cell::new(pos, Terrain::Plains, 50));
        let mut realm = Realm::new(world);
        let civ = Civilization::found(
            &Founding::named("Elves"),
            GridPos::new(5, 5),
            &mut realm.world,
            &mut ChaCha8Rng::seed_from_u64(1),
        );
        realm.civilizations.push(civ);
        realm
    }

    #[test]
    fn fresh_realm_is_clean() {
        assert!(audit(&realm_with_elves()).is_empty());
    }

    #[test]
    fn detects_ownership_drift() {
        let mut realm = realm_with_elves();
        realm.world.cell_mut(GridPos::new(5, 5)).unwrap().owner = Some("Orcs".into());
        realm.world.cell_mut(GridPos::new(0, 0)).unwrap().owner = Some("Elves".into());

        let violations = audit(&realm);
        assert_eq!(violations.len(), 3);
        assert!(violations.contains(&Violation::UnownedTerritory {
            civ: "Elves".into(),
            pos: GridPos::new(5, 5),
            owner: Some("Orcs".into()),
        }));
        assert!(violations.contains(&Violation::StrayOwnership {
            owner: "Orcs".into(),
            pos: GridPos::new(5, 5),
        }));
        assert!(violations.contains(&Violation::StrayOwnership {
            owner: "Elves".into(),
            pos: GridPos::new(0, 0),
        }));
    }

    #[test]
    fn detects_one_sided_relations() {
        let mut realm = realm_with_elves();
        realm.civilizations[0].establish_relation("Orcs", 40);
        assert_eq!(
            audit(&realm),
            vec![Violation::AsymmetricRelation {
                a: "Elves".into(),
                b: "Orcs".into(),
            }]
        );
    }

    #[test]
    fn system_counts_violations_across_ticks() {
        let mut realm = realm_with_elves();
        let mut system = BookkeepingSystem::new();
        let mut log = ChronicleLog::new(false);
        let mut rng = RngManager::new(1);
        let mut run = |system: &mut BookkeepingSystem, realm: &mut Realm| {
            let mut ctx = SystemContext {
                day: 0,
                year: 0,
                chronicle: &mut log,
            };
            system
                .run(&mut ctx, realm, &mut rng.stream("bookkeeping"))
                .unwrap();
        };

        run(&mut system, &mut realm);
        assert_eq!(system.violations_seen(), 0);

        realm.civilizations[0].establish_relation("Orcs", 40);
        run(&mut system, &mut realm);
        run(&mut system, &mut realm);
        assert_eq!(system.violations_seen(), 2);
        assert!(log.events().is_empty(), "audits never touch the chronicle");
    }
}
