use realmsim::{
    cell::{Cell, Terrain},
    civilization::{CivState, Founding},
    engine::{Engine, EngineBuilder, EngineSettings, MIN_CAPITAL_DISTANCE},
    error::{FoundingError, PlacementRejection},
    events::{apply_drought, EventSettings},
    rng::NAMES_STREAM,
    scenario::ScenarioLoader,
    spatial::GridPos,
    world::{World, DAYS_PER_YEAR},
};

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn build_engine(seed: u64, world: Option<World>) -> Engine {
    let settings = EngineSettings {
        scenario_name: "scenarios".into(),
        seed,
        ..EngineSettings::default()
    };
    let mut builder = EngineBuilder::new(settings);
    if let Some(world) = world {
        builder = builder.with_world(world);
    }
    builder
        .with_standard_systems(EventSettings::disabled())
        .build()
}

fn plains(width: u32, height: u32, food: u32) -> World {
    World::from_fn(width, height, |pos| Cell::new(pos, Terrain::Plains, food))
}

fn settlers() -> Founding {
    Founding::named("Settlers")
        .at(10, 10)
        .with_population(40)
        .with_food(200)
        .with_morale(80)
        .with_tech_level(0)
}

#[test]
fn well_fed_content_civilization_grows_over_a_year() {
    let mut engine = build_engine(3, Some(plains(20, 20, 100)));
    engine.add_civilization(settlers()).unwrap();

    let mut always_thriving = true;
    for _ in 0..DAYS_PER_YEAR {
        engine.tick().unwrap();
        let civ = engine.civilization("Settlers").unwrap();
        assert!(civ.is_alive());
        always_thriving &= civ.food_per_capita() > 2.0 && civ.morale > 50;
    }
    assert!(always_thriving);
    assert!(engine.civilization("Settlers").unwrap().population > 40);
}

#[test]
fn thriving_on_generated_terrain_means_growth() {
    for seed in [1, 2, 3] {
        let mut engine = build_engine(seed, None);
        let founding = Founding::named("Settlers")
            .with_population(40)
            .with_food(200)
            .with_morale(80)
            .with_tech_level(0);
        engine.add_civilization(founding).unwrap();

        let mut always_thriving = true;
        for _ in 0..DAYS_PER_YEAR {
            engine.tick().unwrap();
            let civ = engine.civilization("Settlers").unwrap();
            always_thriving &= civ.food_per_capita() > 2.0 && civ.morale > 50;
        }
        let civ = engine.civilization("Settlers").unwrap();
        if always_thriving {
            assert!(civ.population > 40, "seed {seed}: {}", civ.status_line());
        }
    }
}

#[test]
fn drought_removes_up_to_thirty_from_a_seven_by_seven_block() {
    let food_at = |pos: GridPos| ((pos.x * 7 + pos.y * 3) % 60) as u32;
    let mut world = World::from_fn(20, 20, |pos| Cell::new(pos, Terrain::Plains, food_at(pos)));
    let center = GridPos::new(10, 10);

    assert_eq!(apply_drought(&mut world, center), 49);

    for cell in world.cells() {
        let before = food_at(cell.pos());
        let dx = (cell.x() - center.x).abs();
        let dy = (cell.y() - center.y).abs();
        if dx <= 3 && dy <= 3 {
            assert_eq!(cell.food(), before - before.min(30), "at {}", cell.pos());
        } else {
            assert_eq!(cell.food(), before, "untouched at {}", cell.pos());
        }
    }
}

#[test]
fn capitals_five_apart_are_rejected_six_apart_accepted() {
    let mut engine = build_engine(8, Some(plains(20, 20, 80)));
    engine.add_civilization(Founding::named("Elves").at(5, 5)).unwrap();

    let err = engine
        .add_civilization(Founding::named("Orcs").at(8, 7))
        .unwrap_err();
    assert_eq!(
        err,
        FoundingError::InvalidPosition {
            name: "Orcs".into(),
            pos: GridPos::new(8, 7),
            reason: PlacementRejection::TooClose { distance: 5 },
        }
    );

    let orcs = engine
        .add_civilization(Founding::named("Orcs").at(8, 8))
        .unwrap();
    assert_eq!(orcs.capital().manhattan(GridPos::new(5, 5)), MIN_CAPITAL_DISTANCE);
}

#[test]
fn random_placement_fails_when_the_world_is_crowded() {
    let mut engine = build_engine(8, Some(plains(9, 9, 80)));
    engine.add_civilization(Founding::named("Elves").at(4, 4)).unwrap();
    let err = engine.add_civilization(Founding::named("Orcs")).unwrap_err();
    assert_eq!(
        err,
        FoundingError::NoValidPosition {
            name: "Orcs".into(),
            attempts: 100,
        }
    );
    assert_eq!(engine.civilizations().len(), 1);
}

#[test]
fn neighbours_meet_and_agree_on_their_relation() {
    let mut engine = build_engine(13, Some(plains(20, 20, 80)));
    for (name, x, y) in [("Elves", 5, 5), ("Orcs", 8, 8)] {
        engine
            .add_civilization(Founding::named(name).at(x, y).with_food(5_000).with_population(40))
            .unwrap();
    }
    engine.tick().unwrap();

    let elves = engine.civilization("Elves").unwrap();
    let orcs = engine.civilization("Orcs").unwrap();
    assert_eq!(elves.state, CivState::Diplomacy);
    let score = elves.relation_with("Orcs").unwrap();
    assert_eq!(orcs.relation_with("Elves"), Some(score));
}

#[test]
fn bundled_scenario_loads_and_runs() {
    let scenario = scenario_loader().load("scenarios/two_realms.yaml").unwrap();
    assert_eq!(scenario.name, "two_realms");
    assert_eq!(scenario.seed, Some(42));
    assert_eq!((scenario.width, scenario.height), (24, 24));
    assert_eq!(scenario.logging.level, "info");

    let mut engine = EngineBuilder::new(scenario.engine_settings(42))
        .with_standard_systems(scenario.events.clone())
        .build();
    let foundings = scenario.foundings(&mut engine.rng_stream(NAMES_STREAM));
    assert_eq!(foundings.len(), 2);
    for founding in foundings {
        engine.add_civilization(founding).unwrap();
    }
    let orcs = engine.civilization("Clan Orcs").unwrap();
    assert_eq!(orcs.population, 50);

    let outcome = engine.run(DAYS_PER_YEAR).unwrap();
    assert!(outcome.ticks > 0);
}
