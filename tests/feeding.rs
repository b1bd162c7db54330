mod common;
use common::{run_ticks, tweak, view, RunBuilder};
use oxyworld_core::vision::Sensed;

/// Agent 1 just east of the food facing west, agent 2 just north facing south.
/// Neither can see the other.
fn shared_table(bonds: &str) -> RunBuilder {
    RunBuilder::new(2)
        .with_bonds(bonds)
        .with_food(9.0, 9.0)
        .with_agent(1, 9.8, 9.0, 270.0)
        .with_agent(2, 9.0, 9.8, 180.0)
}

#[test]
fn test_bite_every_sixth_tick() {
    let mut sched = RunBuilder::new(1)
        .with_food(9.0, 9.0)
        .with_agent(1, 10.0, 9.0, 270.0)
        .with_energy(1, 0.5)
        .build();

    run_ticks(&mut sched, 5);
    let waiting = view(&sched, 1);
    assert_eq!(waiting.food_time_waiting, 5);
    assert!(waiting.just_ate);
    assert_eq!(sched.roster().food(1).unwrap().resource(), 4.0);

    run_ticks(&mut sched, 1);
    let fed = view(&sched, 1);
    assert_eq!(fed.food_time_waiting, 0);
    assert!(fed.energy > waiting.energy + 0.009);
    let resource = sched.roster().food(1).unwrap().resource();
    assert!(resource < 4.0 && resource > 3.989, "resource {resource}");
    // Eating agents stay put.
    assert_eq!((fed.x, fed.y), (10.0, 9.0));
}

#[test]
fn test_agent_next_to_food_recovers_energy() {
    let mut sched = RunBuilder::new(1)
        .with_food(9.0, 9.0)
        .with_agent(1, 9.5, 9.0, 270.0)
        .with_energy(1, 0.9)
        .build();

    run_ticks(&mut sched, 48);

    // Eight bites against 48 ticks of metabolism at the resting step size.
    let agent = view(&sched, 1);
    assert!((agent.energy - (0.9 + 0.08 - 48.0 * 0.0003)).abs() < 1e-9, "energy {}", agent.energy);
    assert!(agent.just_ate);
    assert_eq!((agent.x, agent.y), (9.5, 9.0));
}

#[test]
fn test_agent_standing_on_food_point_cannot_see_it() {
    let mut sched = RunBuilder::new(1)
        .with_food(9.0, 9.0)
        .with_agent(1, 9.0, 9.0, 0.0)
        .build();

    run_ticks(&mut sched, 1);

    assert!(!sched
        .world()
        .sight(1)
        .iter()
        .any(|s| matches!(s, Sensed::Food { .. })));
    let agent = view(&sched, 1);
    assert!(!agent.just_ate);
    assert_eq!(agent.food_time_waiting, 0);
    assert_eq!(agent.meals, 0);
    assert!(agent.energy < 1.0);
    assert_eq!(sched.roster().food(1).unwrap().resource(), 4.0);
}

#[test]
fn test_full_agent_walks_away() {
    let mut sched = RunBuilder::new(1)
        .with_food(9.0, 9.0)
        .with_agent(1, 10.0, 9.0, 270.0)
        .with_energy(1, 0.995)
        .build();

    run_ticks(&mut sched, 6);

    let agent = view(&sched, 1);
    assert_eq!(agent.meals, 1);
    assert!(!agent.just_ate);
    assert!(agent.energy < 1.0 && agent.energy > 0.999);
    assert!(agent.direction == 0.0 || agent.direction == 180.0, "dir {}", agent.direction);
    assert_eq!(sched.metrics().meals(), 1);
}

#[test]
fn test_shared_meal_tops_up_oxytocin() {
    let mut sched = shared_table("[1,2]")
        .with_energy(1, 0.995)
        .with_energy(2, 0.995)
        .build();
    tweak(&sched, 1, |s| s.oxytocin = 0.5);
    tweak(&sched, 2, |s| s.oxytocin = 0.5);

    run_ticks(&mut sched, 1);
    assert_eq!(sched.roster().food(1).unwrap().eating_agents(), vec![1, 2]);

    run_ticks(&mut sched, 5);
    for id in [1, 2] {
        let agent = view(&sched, id);
        assert_eq!(agent.meals, 1);
        assert!((agent.oxytocin - 0.9995).abs() < 1e-9, "oxytocin {}", agent.oxytocin);
    }
}

#[test]
fn test_meal_among_strangers_is_plain() {
    let mut sched = shared_table("[]")
        .with_energy(1, 0.995)
        .with_energy(2, 0.995)
        .build();
    tweak(&sched, 1, |s| s.oxytocin = 0.5);

    run_ticks(&mut sched, 6);

    let agent = view(&sched, 1);
    assert_eq!(agent.meals, 1);
    assert!((agent.oxytocin - (0.5 - 6.0 * 0.0005)).abs() < 1e-9);
}

#[test]
fn test_food_owner_is_highest_rank_nearby() {
    let mut sched = shared_table("[]").build();
    run_ticks(&mut sched, 1);
    assert_eq!(sched.roster().food(1).unwrap().owner(), Some(2));
}

#[test]
fn test_depleted_food_leaves_the_grid() {
    let mut sched = RunBuilder::new(1)
        .with_food(9.0, 9.0)
        .with_agent(1, 50.0, 50.0, 0.0)
        .build();
    let food = sched.roster().food(1).unwrap();
    food.consume(3.995, sched.world());
    assert!(food.is_alive());

    food.consume(0.01, sched.world());
    assert!(!food.is_alive());
    assert_eq!(food.resource(), 0.0);
    assert!(sched.world().occupant_at(9.0, 9.0).is_none());

    run_ticks(&mut sched, 3);
    let food = sched.roster().food(1).unwrap();
    assert_eq!(food.resource(), 0.0, "dead food never regenerates");
    assert_eq!(sched.roster().live_foods(), 0);
}
