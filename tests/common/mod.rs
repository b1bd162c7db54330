pub mod macros;

use oxyworld_core::config::SimConfig;
use oxyworld_core::setup::{RunParameters, SimulationBuilder};
use oxyworld_core::{AgentView, Scheduler};
use oxyworld_data::{BondGroups, DsiMode, WorldDynamics};

/// Scenario builder: an empty world (no food) with agents at exact poses.
#[allow(dead_code)]
pub struct RunBuilder {
    config: SimConfig,
    population: u32,
    dynamics: WorldDynamics,
    bonds: BondGroups,
    dsi_mode: DsiMode,
    seed: u64,
    iterations: Option<u64>,
    agents: Vec<(u32, f64, f64, f64)>,
    energies: Vec<(u32, f64)>,
    foods: Vec<(f64, f64)>,
}

#[allow(dead_code)]
impl RunBuilder {
    pub fn new(population: u32) -> Self {
        Self {
            config: SimConfig::default(),
            population,
            dynamics: WorldDynamics::Static,
            bonds: BondGroups::none(),
            dsi_mode: DsiMode::Fixed,
            seed: 42,
            iterations: None,
            agents: Vec::new(),
            energies: Vec::new(),
            foods: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_dynamics(mut self, dynamics: WorldDynamics) -> Self {
        self.dynamics = dynamics;
        self
    }

    pub fn with_bonds(mut self, bonds: &str) -> Self {
        self.bonds = bonds.parse().expect("bond groups");
        self
    }

    pub fn variable_dsi(mut self) -> Self {
        self.dsi_mode = DsiMode::Variable;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_agent(mut self, id: u32, x: f64, y: f64, direction: f64) -> Self {
        self.agents.push((id, x, y, direction));
        self
    }

    pub fn with_energy(mut self, id: u32, energy: f64) -> Self {
        self.energies.push((id, energy));
        self
    }

    pub fn with_food(mut self, x: f64, y: f64) -> Self {
        self.foods.push((x, y));
        self
    }

    /// Keeps the configured corner food sources instead of an empty world.
    pub fn with_default_foods(mut self) -> Self {
        self.foods = self.config.food.positions.clone();
        self
    }

    pub fn iterations(mut self, iterations: u64) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn builder(self) -> SimulationBuilder {
        let params = RunParameters::new(self.population, self.dynamics, self.bonds, self.dsi_mode);
        let mut builder = SimulationBuilder::new(self.config, params)
            .seed(self.seed)
            .foods(self.foods);
        for (id, x, y, dir) in self.agents {
            builder = builder.place_agent(id, x, y, dir);
        }
        for (id, energy) in self.energies {
            builder = builder.agent_energy(id, energy);
        }
        if let Some(iterations) = self.iterations {
            builder = builder.iterations(iterations);
        }
        builder
    }

    pub fn build(self) -> Scheduler {
        self.builder().build().expect("Failed to build scenario")
    }
}

#[allow(dead_code)]
pub fn view(sched: &Scheduler, id: u32) -> AgentView {
    sched.roster().agent(id).expect("agent exists").view()
}

#[allow(dead_code)]
pub fn tweak<F>(sched: &Scheduler, id: u32, f: F)
where
    F: FnOnce(&mut oxyworld_core::agent::AgentState),
{
    sched.roster().agent(id).expect("agent exists").with_state(f);
}

#[allow(dead_code)]
pub fn run_ticks(sched: &mut Scheduler, ticks: u64) {
    for _ in 0..ticks {
        sched.tick().expect("tick failed");
    }
}
