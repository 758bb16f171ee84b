//! city: headless run of the traffic core on the default city layout.
//!
//! Builds the grid, highway ring, and ramps, spawns the configured number
//! of NPC vehicles, and drives a synthetic player around a circle through
//! the grid at 60 frames per second.  Progress is logged every ten seconds
//! of simulated time; a table of final agent states is printed at the end.
//!
//! ```text
//! cargo run -p city --release -- [config.json]
//! RUST_LOG=debug cargo run -p city
//! ```

mod player;

use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use ct_agent::DriveState;
use ct_core::{AgentId, Tick, Vehicle};
use ct_sim::{AgentFrame, SimConfig, SimObserver, TrafficSimBuilder};

use player::CirclingPlayer;

// ── Constants ─────────────────────────────────────────────────────────────────

const FRAME_DT:        f32 = 1.0 / 60.0;
const SIM_SECONDS:     u64 = 120;
const FRAMES:          u64 = SIM_SECONDS * 60;
const LOG_EVERY:       u64 = 600; // frames
const PLAYER_RADIUS:   f32 = 60.0;
const PLAYER_SPEED:    f32 = 20.0;
const TABLE_ROWS:      usize = 12;

// ── Observer ──────────────────────────────────────────────────────────────────

/// Counts collisions and how many agent-frames were spent in each state.
#[derive(Default)]
struct SummaryObserver {
    collisions: u64,
    occupancy:  [u64; DriveState::ALL.len()],
    frames:     u64,
}

impl SimObserver for SummaryObserver {
    fn on_collision(&mut self, tick: Tick, a: AgentId, b: AgentId) {
        self.collisions += 1;
        log::debug!("{tick}: {a} and {b} collided");
    }

    fn on_tick_end(&mut self, tick: Tick, frames: &[AgentFrame]) {
        self.frames += 1;
        for frame in frames {
            if let Some(i) = DriveState::ALL.iter().position(|&s| s == frame.state) {
                self.occupancy[i] += 1;
            }
        }
        if (tick.0 + 1) % LOG_EVERY == 0 {
            let moving = frames.iter().filter(|f| f.speed > 0.5).count();
            info!("{tick}: {moving}/{} agents moving, {} collisions so far", frames.len(), self.collisions);
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        info!("run finished at {final_tick}");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config() -> Result<SimConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    println!("=== city: traffic core demo ===");
    println!(
        "Agents: {}  |  Seconds: {SIM_SECONDS}  |  Seed: {}",
        config.agent_count, config.seed
    );
    println!();

    let mut sim = TrafficSimBuilder::new(config).build()?;
    println!(
        "Road graph: {} segments, {} lanes, {} waypoints, {} intersections ({} signaled)",
        sim.graph().segments().len(),
        sim.graph().lanes().len(),
        sim.graph().waypoints().len(),
        sim.graph().intersections().len(),
        sim.signals().len(),
    );

    let mut player = CirclingPlayer::new(PLAYER_RADIUS, PLAYER_SPEED);
    let mut obs = SummaryObserver::default();
    let mut walk_frames = 0u64;

    let t0 = Instant::now();
    for _ in 0..FRAMES {
        player.advance(FRAME_DT);
        sim.tick_observed(FRAME_DT, Some(&player as &dyn Vehicle), &mut obs);
        if sim.is_pedestrian_walk_signal(player.position()) {
            walk_frames += 1;
        }
    }
    obs.on_sim_end(sim.current_tick());
    let elapsed = t0.elapsed();

    println!();
    println!("Simulated {SIM_SECONDS} s in {:.3} s wall time", elapsed.as_secs_f64());
    println!("  collisions           : {}", obs.collisions);
    println!("  walk signal at player: {:.1} % of frames", 100.0 * walk_frames as f64 / FRAMES as f64);
    println!();

    println!("{:<14} {:>10}", "State", "Share");
    println!("{}", "-".repeat(25));
    let total = obs.occupancy.iter().sum::<u64>().max(1);
    for (state, count) in DriveState::ALL.iter().zip(obs.occupancy) {
        println!("{:<14} {:>9.1}%", state.as_str(), 100.0 * count as f64 / total as f64);
    }
    println!();

    println!("{:<8} {:<14} {:>8} {:>9} {:<6} {:>18}", "Agent", "State", "Speed", "Heading", "Blink", "Position");
    println!("{}", "-".repeat(68));
    for frame in sim.frames().iter().take(TABLE_ROWS) {
        println!(
            "{:<8} {:<14} {:>8.2} {:>9.2} {:<6} {:>18}",
            frame.id.0,
            frame.state.as_str(),
            frame.speed,
            frame.heading,
            format!("{:?}", frame.turn_signal),
            frame.position.to_string(),
        );
    }

    let summary = sim.teardown();
    println!();
    println!(
        "Released {} agents and {} signals after {} frames",
        summary.agents, summary.signals, summary.ticks
    );

    Ok(())
}
