//! End-to-end scenarios driven through the public simulation API.

use ecosim_core::{
    DeathCause, FieldConfig, Kind, Location, PopulationConfig, SimulationConfig,
};
use ecosim_world::{Field, NullView, RecordingView, Simulation, SimulatorView};

fn empty_config(depth: i32, width: i32) -> SimulationConfig {
    SimulationConfig {
        field: FieldConfig { depth, width },
        population: PopulationConfig {
            predator_creation_probability: 0.0,
            prey_creation_probability: 0.0,
            random_initial_age: false,
        },
        ..Default::default()
    }
}

/// Keeps stepping regardless of who is left
struct AlwaysViable;

impl SimulatorView for AlwaysViable {
    fn show_status(&mut self, _tick: u64, _field: &Field) {}

    fn is_viable(&self, _field: &Field) -> bool {
        true
    }
}

#[test]
fn surrounded_prey_dies_of_overcrowding() {
    let mut config = empty_config(3, 3);
    config.prey.life_cycle.breeding_probability = 0.0;
    let mut sim = Simulation::new(config, NullView).unwrap();

    let centre = Location::new(1, 1);
    let centre_id = sim.add_prey(centre, 0).unwrap();
    let neighbours = sim.field().adjacent_locations(centre);
    let ring: Vec<_> = neighbours
        .into_iter()
        .map(|loc| sim.add_prey(loc, 0).unwrap())
        .collect();
    assert_eq!(sim.field().occupied_count(), 9);

    let report = sim.step().unwrap();

    // Only overcrowding can have removed the centre animal.
    assert!(sim.animal(centre_id).is_none());
    assert_eq!(report.deaths.get(DeathCause::OldAge), 0);
    assert_eq!(report.deaths.get(DeathCause::Starvation), 0);
    assert_eq!(report.deaths.get(DeathCause::Eaten), 0);
    assert!(report.deaths.get(DeathCause::Overcrowding) >= 1);
    assert_eq!(report.births, 0);

    // The first neighbour to act had exactly one free cell: the centre.
    let occupant = sim.field().get(centre).unwrap().unwrap();
    assert_eq!(occupant.id, ring[0]);

    assert_eq!(sim.field().occupied_count(), sim.population().len());
    assert_eq!(sim.population().len() as u64, 9 - report.deaths.total());
    sim.check_consistency().unwrap();
}

#[test]
fn lone_predator_starves_on_first_tick() {
    let mut config = empty_config(1, 2);
    config.predator.hunger_per_step = 1;
    let mut sim = Simulation::new(config, AlwaysViable).unwrap();
    let id = sim.add_predator(Location::new(0, 0), 0, 1).unwrap();

    let report = sim.step().unwrap();

    assert_eq!(report.deaths.get(DeathCause::Starvation), 1);
    assert!(sim.animal(id).is_none());
    assert!(sim.population().is_empty());
    assert_eq!(sim.field().occupied_count(), 0);
}

#[test]
fn full_prey_seeding() {
    let mut config = SimulationConfig::default();
    config.population.predator_creation_probability = 0.0;
    config.population.prey_creation_probability = 1.0;
    let sim = Simulation::new(config, NullView).unwrap();

    assert_eq!(sim.field().depth(), 50);
    assert_eq!(sim.field().width(), 50);
    assert_eq!(sim.counts().prey, 2500);
    assert_eq!(sim.counts().predators, 0);
    assert_eq!(sim.population().len(), 2500);
    assert!(sim.population().iter().all(|a| a.is_alive() && a.kind() == Kind::Prey));
    sim.check_consistency().unwrap();
}

#[test]
fn old_prey_dies_on_the_threshold_tick() {
    let mut config = empty_config(5, 5);
    config.prey.life_cycle.breeding_probability = 0.0;
    let mut sim = Simulation::new(config, AlwaysViable).unwrap();
    let max_age = sim.config().prey.life_cycle.max_age;
    let elder = sim.add_prey(Location::new(0, 0), max_age - 1).unwrap();

    let report = sim.step().unwrap();
    assert_eq!(report.deaths.total(), 0);
    assert_eq!(sim.animal(elder).unwrap().age(), max_age);

    let report = sim.step().unwrap();
    assert_eq!(report.deaths.get(DeathCause::OldAge), 1);
    assert!(sim.animal(elder).is_none());
    assert_eq!(sim.field().occupied_count(), 0);
}

#[test]
fn well_fed_predator_outlives_hunger_budget() {
    let mut config = empty_config(1, 4);
    config.predator.food_value = 3;
    config.prey.life_cycle.breeding_probability = 0.0;
    config.predator.life_cycle.breeding_probability = 0.0;
    let mut sim = Simulation::new(config, AlwaysViable).unwrap();

    let predator = sim.add_predator(Location::new(0, 0), 0, 2).unwrap();
    sim.add_prey(Location::new(0, 1), 0).unwrap();

    // Eats on the first tick, which resets hunger to the food value.
    let report = sim.step().unwrap();
    assert_eq!(report.deaths.get(DeathCause::Eaten), 1);
    let hunter = sim.animal(predator).unwrap();
    assert_eq!(hunter.hunger(), Some(3));
    assert_eq!(hunter.location(), Some(Location::new(0, 1)));

    // Three more ticks without food: 2, 1, then starvation at 0.
    sim.step().unwrap();
    sim.step().unwrap();
    assert!(sim.animal(predator).is_some());
    let report = sim.step().unwrap();
    assert_eq!(report.deaths.get(DeathCause::Starvation), 1);
    assert!(sim.population().is_empty());
}

#[test]
fn identical_seeds_give_identical_runs() {
    let run = |seed: u64| {
        let config = SimulationConfig {
            seed,
            field: FieldConfig { depth: 30, width: 40 },
            ..Default::default()
        };
        let mut sim = Simulation::new(config, RecordingView::new()).unwrap();
        for _ in 0..40 {
            sim.step().unwrap();
        }
        sim.into_view()
    };

    let a = run(1111);
    let b = run(1111);
    assert_eq!(a.history().len(), 41);
    assert_eq!(a.history(), b.history());

    let json_a = serde_json::to_string(a.history()).unwrap();
    let json_b = serde_json::to_string(b.history()).unwrap();
    assert_eq!(json_a, json_b);

    let c = run(2222);
    assert_ne!(a.history(), c.history());
}

#[test]
fn reseed_and_reset_replay_the_same_run() {
    let config = SimulationConfig {
        field: FieldConfig { depth: 20, width: 20 },
        ..Default::default()
    };
    let mut sim = Simulation::new(config, RecordingView::new()).unwrap();
    sim.simulate(10).unwrap();
    let first = sim.view().history().to_vec();

    sim.reseed(1111);
    sim.reset().unwrap();
    sim.simulate(10).unwrap();
    let second = &sim.view().history()[first.len()..];

    assert_eq!(second, first.as_slice());
}

#[test]
fn long_simulation_honours_step_budget() {
    let config = SimulationConfig {
        num_steps: 25,
        field: FieldConfig { depth: 40, width: 40 },
        ..Default::default()
    };
    let mut sim = Simulation::new(config, AlwaysViable).unwrap();
    let summary = sim.run_long_simulation().unwrap();

    assert_eq!(summary.steps_run, 25);
    assert_eq!(summary.final_tick, 25);
    assert!(!summary.stopped_early);
    assert_eq!(summary.counts, sim.counts());
    sim.check_consistency().unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["steps_run"], 25);
}

#[test]
fn extinction_stops_the_run() {
    let mut config = empty_config(1, 3);
    config.predator.hunger_per_step = 1;
    let mut sim = Simulation::new(config, RecordingView::new()).unwrap();
    sim.add_predator(Location::new(0, 0), 0, 1).unwrap();
    sim.add_prey(Location::new(0, 2), 0).unwrap();

    let summary = sim.simulate(100).unwrap();

    // The predator starves on tick 1; with one kind left the run ends.
    assert!(summary.stopped_early);
    assert_eq!(summary.steps_run, 1);
    assert_eq!(summary.counts.predators, 0);
    assert_eq!(sim.view().history().len(), 2);
}
