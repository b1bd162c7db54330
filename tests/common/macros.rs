/// Asserts that the agent with the given id is alive and on the grid.
#[macro_export]
macro_rules! assert_agent_alive {
    ($sched:expr, $id:expr) => {
        let agent = $sched.roster().agent($id).expect("Agent not found in roster");
        let (x, y) = agent.position();
        assert!(agent.is_alive(), "Agent {} should be alive", $id);
        assert!(
            $sched.world().contains(agent.resident(), x, y),
            "Agent {} is alive but missing from its cell",
            $id
        );
    };
}

/// Asserts that the agent is dead, off the grid, and still listed in the roster.
#[macro_export]
macro_rules! assert_agent_dead {
    ($sched:expr, $id:expr) => {
        let agent = $sched.roster().agent($id).expect("Dead agents stay in the roster");
        let (x, y) = agent.position();
        assert!(!agent.is_alive(), "Agent {} should be dead", $id);
        assert!(
            !$sched.world().contains(agent.resident(), x, y),
            "Agent {} is dead but still occupies its cell",
            $id
        );
    };
}

/// Asserts the number of live agents.
#[macro_export]
macro_rules! assert_live_agents {
    ($sched:expr, $count:expr) => {
        assert_eq!(
            $sched.roster().live_agents(),
            $count,
            "Live agent count mismatch"
        );
    };
}
