use anyhow::Result;

use crate::{
    engine::{Realm, System, SystemContext},
    events::{EventManager, EventSettings},
    rng::SystemRng,
};

pub struct EventSystem {
    manager: EventManager,
}

impl EventSystem {
    pub fn new(settings: EventSettings) -> Self {
        Self {
            manager: EventManager::new(settings),
        }
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new(EventSettings::default())
    }
}

impl System for EventSystem {
    fn name(&self) -> &str {
        "events"
    }

    fn run(
        &mut self,
        ctx: &mut SystemContext<'_>,
        realm: &mut Realm,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let fired = self.manager.process(
            &mut realm.world,
            &mut realm.civilizations,
            rng,
            &mut *ctx.chronicle,
        );
        for outcome in &fired {
            tracing::debug!(day = ctx.day, ?outcome, "event fired");
        }
        Ok(())
    }
}
