//! Fluent builder for [`TrafficSimulation`].

use log::{debug, info};

use ct_agent::Agent;
use ct_core::{AgentId, AgentRng, SimClock, SimRng, Vec2};
use ct_road::RoadGraph;
use ct_signal::SignalCoordinator;

use crate::{SimConfig, SimError, SimResult, TrafficSimulation};

/// Fluent builder for [`TrafficSimulation`].
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = TrafficSimBuilder::new(SimConfig::default())
///     .agent_count(60)
///     .build()?;
/// let frames = sim.tick(1.0 / 60.0, None);
/// ```
pub struct TrafficSimBuilder {
    config:     SimConfig,
    graph:      Option<RoadGraph>,
    placements: Vec<(Vec2, f32)>,
}

impl TrafficSimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config, graph: None, placements: Vec::new() }
    }

    /// Use a prebuilt road graph instead of generating the city layout.
    pub fn graph(mut self, graph: RoadGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Override the number of randomly spawned agents.
    pub fn agent_count(mut self, n: usize) -> Self {
        self.config.agent_count = n;
        self
    }

    /// Spawn one extra agent at an explicit position and heading.  Placed
    /// agents start unbound and bind to the nearest segment on their first
    /// tick.  They take ids after the randomly spawned ones.
    pub fn place(mut self, position: Vec2, heading: f32) -> Self {
        self.placements.push((position, heading));
        self
    }

    /// Validate the configuration, build the graph and the signals, and
    /// spawn every agent.
    pub fn build(self) -> SimResult<TrafficSimulation> {
        let TrafficSimBuilder { config, graph, placements } = self;
        config.validate()?;

        let graph = match graph {
            Some(g) => g,
            None    => RoadGraph::city(&config.layout)?,
        };
        let signals = SignalCoordinator::new(&graph, &config.timing, config.wave_speed)?;

        let mut rng = SimRng::new(config.seed);
        let mut agents = Vec::with_capacity(config.agent_count + placements.len());

        for _ in 0..config.agent_count {
            let id = next_id(agents.len())?;
            let spawn = graph.random_spawn_point(rng.inner()).ok_or(SimError::NoSpawnPoint)?;
            let mut agent = Agent::spawn(
                id,
                spawn.position,
                spawn.heading,
                config.driver.clone(),
                AgentRng::new(config.seed, id),
            );

            // Spawn points sit on a waypoint; start the traversal there.
            let along = graph
                .waypoint(spawn.waypoint)
                .zip(graph.lane(spawn.lane))
                .filter(|(_, lane)| lane.waypoints.len() >= 2)
                .map(|(wp, lane)| wp.key.index as f32 / (lane.waypoints.len() - 1) as f32)
                .unwrap_or(0.0);
            agent.bind_lane(&graph, spawn.lane, spawn.direction.geometric_t(along));

            debug!("{id}: spawned on {} at {}", spawn.lane, spawn.position);
            agents.push(agent);
        }

        for (position, heading) in placements {
            let id = next_id(agents.len())?;
            agents.push(Agent::spawn(id, position, heading, config.driver.clone(), AgentRng::new(config.seed, id)));
        }

        info!(
            "traffic simulation ready: {} agents, {} signals, {} segments",
            agents.len(),
            signals.len(),
            graph.segments().len()
        );

        Ok(TrafficSimulation {
            clock: SimClock::new(config.max_dt),
            boundary_radius: config.boundary_radius(),
            frames: Vec::with_capacity(agents.len()),
            config,
            graph,
            signals,
            agents,
        })
    }
}

fn next_id(n: usize) -> SimResult<AgentId> {
    AgentId::try_from(n).map_err(|_| SimError::Config(format!("too many agents: {n}")))
}
