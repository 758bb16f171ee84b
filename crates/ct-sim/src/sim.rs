//! The `TrafficSimulation` struct and its per-frame tick.

use log::{debug, info, trace};
use rustc_hash::FxHashMap;

use ct_agent::{Agent, DriveState, SenseContext, Sensed, TurnSignal};
use ct_core::{AgentId, SimClock, Tick, Vec2, Vehicle, VehicleState};
use ct_road::RoadGraph;
use ct_signal::{SignalCoordinator, SignalQuery, StopRequest};

use crate::{NoopObserver, SimConfig, SimObserver};

// ── AgentFrame ────────────────────────────────────────────────────────────────

/// What the host needs to draw one agent after a tick.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentFrame {
    pub id:          AgentId,
    pub position:    Vec2,
    pub heading:     f32,
    pub speed:       f32,
    pub state:       DriveState,
    pub turn_signal: TurnSignal,
    pub blinker_lit: bool,
}

impl AgentFrame {
    fn of(agent: &Agent) -> Self {
        Self {
            id:          agent.id(),
            position:    agent.position(),
            heading:     agent.heading(),
            speed:       agent.speed(),
            state:       agent.state(),
            turn_signal: agent.turn_signal(),
            blinker_lit: agent.blinker_lit(),
        }
    }
}

/// Counts reported by [`TrafficSimulation::teardown`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TeardownSummary {
    pub agents:  usize,
    pub signals: usize,
    pub ticks:   u64,
}

// ── TrafficSimulation ─────────────────────────────────────────────────────────

/// Owns the road graph, every signal, and every agent, and advances them
/// once per host frame.
///
/// Each [`tick`][Self::tick]:
///
/// 1. **Clamp** the frame delta to `[0, max_dt]`.
/// 2. **Signals** advance by the clamped delta.
/// 3. **Snapshot** every agent (plus the player, if any) as it stands now.
/// 4. **Agents** update in id order, sensing only the snapshot
///    (optionally parallel with the `parallel` feature).
/// 5. **Collisions**: every agent within `collision_radius` of another
///    turns around and reverts to its snapshot position.
pub struct TrafficSimulation {
    pub(crate) config:          SimConfig,
    pub(crate) clock:           SimClock,
    pub(crate) graph:           RoadGraph,
    pub(crate) signals:         SignalCoordinator,
    pub(crate) agents:          Vec<Agent>,
    pub(crate) boundary_radius: f32,
    pub(crate) frames:          Vec<AgentFrame>,
}

impl TrafficSimulation {
    // ── Public API ────────────────────────────────────────────────────────

    /// Advance one frame without observation.
    pub fn tick(&mut self, dt: f32, player: Option<&dyn Vehicle>) -> &[AgentFrame] {
        self.tick_observed(dt, player, &mut NoopObserver)
    }

    /// Advance one frame, reporting to `observer`.
    pub fn tick_observed<O: SimObserver>(
        &mut self,
        dt:       f32,
        player:   Option<&dyn Vehicle>,
        observer: &mut O,
    ) -> &[AgentFrame] {
        let dt  = self.clock.clamp_dt(dt);
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        self.signals.update(dt);

        let snapshot: Vec<Sensed> = self
            .agents
            .iter()
            .map(|a| Sensed { agent: Some(a.id()), state: a.snapshot() })
            .chain(player.map(|p| Sensed { agent: None, state: VehicleState::of(p) }))
            .collect();

        self.update_agents(dt, &snapshot);

        for (a, b) in self.resolve_collisions(&snapshot) {
            observer.on_collision(now, a, b);
        }

        self.frames.clear();
        self.frames.extend(self.agents.iter().map(AgentFrame::of));
        self.clock.advance(dt);
        trace!("{}: {} agents", self.clock, self.agents.len());

        observer.on_tick_end(now, &self.frames);
        &self.frames
    }

    /// Run `n` frames of `dt` seconds each with no player vehicle.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, dt: f32, observer: &mut O) {
        for _ in 0..n {
            self.tick_observed(dt, None, observer);
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Release every agent and signal controller.
    pub fn teardown(mut self) -> TeardownSummary {
        let agents = self.agents.len();
        self.agents.clear();
        self.frames.clear();
        let signals = self.signals.release();
        let ticks = self.clock.current_tick.0;
        info!("traffic simulation torn down after {ticks} ticks: released {agents} agents, {signals} signals");
        TeardownSummary { agents, signals, ticks }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn signals(&self) -> &SignalCoordinator {
        &self.signals
    }

    pub fn signals_mut(&mut self) -> &mut SignalCoordinator {
        &mut self.signals
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    /// Frames committed by the most recent tick.
    pub fn frames(&self) -> &[AgentFrame] {
        &self.frames
    }

    pub fn boundary_radius(&self) -> f32 {
        self.boundary_radius
    }

    /// Signal query for any vehicle, e.g. the player.
    pub fn should_stop(&self, position: Vec2, heading: f32, lookahead: f32) -> Option<StopRequest> {
        self.signals.should_stop(position, heading, lookahead)
    }

    pub fn is_pedestrian_walk_signal(&self, position: Vec2) -> bool {
        self.signals.is_pedestrian_walk_signal(position)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    /// Update every agent against the shared snapshot.
    ///
    /// With the `parallel` Cargo feature agents run on Rayon's thread pool.
    /// Each agent mutates only itself and reads only shared data, so the
    /// result matches the sequential order.
    fn update_agents(&mut self, dt: f32, snapshot: &[Sensed]) {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let ctx = SenseContext {
            graph:           &self.graph,
            signals:         &self.signals,
            others:          snapshot,
            boundary_radius: self.boundary_radius,
        };
        let agents = &mut self.agents;

        #[cfg(not(feature = "parallel"))]
        {
            for agent in agents.iter_mut() {
                agent.update(dt, &ctx);
            }
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            agents.par_iter_mut().for_each(|agent| agent.update(dt, &ctx));
        }
    }

    /// Turn around every agent that ended the frame within
    /// `collision_radius` of another.  Returns the colliding pairs in
    /// ascending id order.
    fn resolve_collisions(&mut self, snapshot: &[Sensed]) -> Vec<(AgentId, AgentId)> {
        let radius = self.config.collision_radius;
        let positions: Vec<Vec2> = self.agents.iter().map(|a| a.position()).collect();
        let pairs = contact_pairs(&positions, radius);
        if pairs.is_empty() {
            return Vec::new();
        }

        let mut involved = vec![false; self.agents.len()];
        for &(i, j) in &pairs {
            involved[i] = true;
            involved[j] = true;
        }

        for (i, agent) in self.agents.iter_mut().enumerate() {
            if !involved[i] {
                continue;
            }
            // Snapshot entries for agents come first, in agent order.
            let Some(before) = snapshot.get(i) else { continue };
            agent.reverse_travel(&self.graph, before.state.heading, before.state.position);
        }

        debug!("{}: {} collisions", self.clock.current_tick, pairs.len());
        pairs
            .into_iter()
            .map(|(i, j)| (self.agents[i].id(), self.agents[j].id()))
            .collect()
    }
}

// ── Contact index helpers ─────────────────────────────────────────────────────

fn cell_of(p: Vec2, cell: f32) -> (i32, i32) {
    ((p.x / cell).floor() as i32, (p.z / cell).floor() as i32)
}

/// All index pairs `(i, j)` with `i < j` whose positions are closer than
/// `radius`, sorted ascending.
///
/// Positions are bucketed into a uniform grid with cell size `radius`, so
/// each position only needs to be compared with its own and the eight
/// neighbouring cells.  O(n) for evenly spread agents.
pub(crate) fn contact_pairs(positions: &[Vec2], radius: f32) -> Vec<(usize, usize)> {
    let mut grid: FxHashMap<(i32, i32), Vec<usize>> = FxHashMap::default();
    for (i, &p) in positions.iter().enumerate() {
        grid.entry(cell_of(p, radius)).or_default().push(i);
    }

    let mut pairs = Vec::new();
    for (i, &p) in positions.iter().enumerate() {
        let (cx, cz) = cell_of(p, radius);
        for dx in -1..=1 {
            for dz in -1..=1 {
                let Some(bucket) = grid.get(&(cx + dx, cz + dz)) else { continue };
                pairs.extend(
                    bucket
                        .iter()
                        .filter(|&&j| j > i && positions[j].distance(p) < radius)
                        .map(|&j| (i, j)),
                );
            }
        }
    }
    pairs.sort_unstable();
    pairs
}
