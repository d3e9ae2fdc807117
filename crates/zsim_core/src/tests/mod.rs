use super::*;
use crate::listener::{ListenerSignal, SignalLog};
use crate::test_fixtures::{base_content, ScriptedApl};

mod admission;

// --- Shared test helpers ------------------------------------------------

/// World over the base team with a signal log registered first.
fn test_world() -> BattleWorld {
    let mut world = BattleWorld::new(&base_content());
    world.listeners.register(SignalLog::new("log"));
    world
}

fn test_data(world: &BattleWorld) -> PreloadData {
    PreloadData::new(&world.roster, &world.constants)
}

fn node(world: &BattleWorld, tag: &str, tick: u64, active: bool) -> SharedNode {
    spawn_node(&SkillTag::from(tag), tick, &world.roster, active, None, None).unwrap()
}

/// Pushes `tag` at `tick` and materialises its mission, the way the load
/// stage would.
fn admit(data: &mut PreloadData, world: &mut BattleWorld, tag: &str, tick: u64) -> SharedNode {
    let n = node(world, tag, tick, true);
    data.push_node(n.clone(), tick, world).unwrap();
    world.missions.insert(LoadingMission::from_node(&n));
    n
}

fn signal_log(world: &BattleWorld) -> &SignalLog {
    world.listeners.signal_log().unwrap()
}

fn scripted_battle(steps: &[(u64, &str)]) -> Battle {
    Battle::new(test_world(), Box::new(ScriptedApl::new(steps)))
}

/// Runs ticks up to and including `last`, returning `(tick, tag)` for every
/// admitted node.
fn run_until(battle: &mut Battle, last: u64) -> Vec<(u64, String)> {
    let mut admitted = Vec::new();
    while battle.current_tick() <= last {
        let tick = battle.current_tick();
        for n in battle.tick().unwrap() {
            admitted.push((tick, n.skill_tag().to_string()));
        }
    }
    admitted
}

fn first_admission(admitted: &[(u64, String)], tag: &str) -> Option<u64> {
    admitted.iter().find(|(_, t)| t == tag).map(|(tick, _)| *tick)
}
