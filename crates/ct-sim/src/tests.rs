//! Unit tests for ct-sim.

#[cfg(test)]
mod helpers {
    use ct_core::{AgentId, Tick, Vec2};
    use ct_road::{Geometry, RoadGraph, RoadGraphBuilder, SegmentKind};

    use crate::{AgentFrame, SimConfig, SimObserver};

    pub fn config(agent_count: usize) -> SimConfig {
        SimConfig { agent_count, ..SimConfig::default() }
    }

    /// One 4-lane main from (−120, 0) to (120, 0) with no intersections.
    /// Lane 2 runs east at z = 1.75; its mirror is lane 1.
    pub fn single_main() -> RoadGraph {
        let mut b = RoadGraphBuilder::new(8.0, 3.5).unwrap();
        let geometry = Geometry::Straight { start: Vec2::new(-120.0, 0.0), end: Vec2::new(120.0, 0.0) };
        b.add_segment(SegmentKind::Main, geometry, 4, 30.0).unwrap();
        b.build()
    }

    pub fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    /// Records every callback.
    #[derive(Default)]
    pub struct Recorder {
        pub starts:     Vec<Tick>,
        pub ends:       Vec<(Tick, usize)>,
        pub collisions: Vec<(Tick, AgentId, AgentId)>,
        pub finished:   Option<Tick>,
    }

    impl SimObserver for Recorder {
        fn on_tick_start(&mut self, tick: Tick) {
            self.starts.push(tick);
        }

        fn on_collision(&mut self, tick: Tick, a: AgentId, b: AgentId) {
            self.collisions.push((tick, a, b));
        }

        fn on_tick_end(&mut self, tick: Tick, frames: &[AgentFrame]) {
            self.ends.push((tick, frames.len()));
        }

        fn on_sim_end(&mut self, final_tick: Tick) {
            self.finished = Some(final_tick);
        }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use ct_core::{AgentId, Vec2};
    use ct_road::{Geometry, RoadGraphBuilder, SegmentKind};

    use super::helpers::*;
    use crate::{SimConfig, SimError, TrafficSimBuilder};

    #[test]
    fn default_city_spawns_bound_agents() {
        let sim = TrafficSimBuilder::new(config(40)).build().unwrap();
        assert_eq!(sim.agents().len(), 40);
        assert_eq!(sim.signals().len(), 21);

        for (i, agent) in sim.agents().iter().enumerate() {
            assert_eq!(agent.id(), AgentId(i as u32));
            let track = agent.track().expect("spawned agents start on a lane");
            let kind = sim.graph().segment(track.segment).unwrap().kind;
            assert!(matches!(kind, SegmentKind::Main | SegmentKind::Highway), "{kind:?}");
            assert!((0.0..1.0).contains(&track.progress), "progress {}", track.progress);
        }
    }

    #[test]
    fn spawn_progress_matches_spawn_position() {
        let sim = TrafficSimBuilder::new(config(20)).build().unwrap();
        for agent in sim.agents() {
            let track = agent.track().unwrap();
            let seg = sim.graph().segment(track.segment).unwrap();
            let on_lane = seg.point_at(track.direction.geometric_t(track.progress), track.lateral);
            assert!(on_lane.distance(agent.snapshot().position) < 1e-2, "{} vs {}", on_lane, agent.snapshot().position);
        }
    }

    #[test]
    fn same_seed_same_spawns() {
        let a = TrafficSimBuilder::new(config(30)).build().unwrap();
        let b = TrafficSimBuilder::new(config(30)).build().unwrap();
        let c = TrafficSimBuilder::new(SimConfig { seed: 7, ..config(30) }).build().unwrap();

        let spawns = |s: &crate::TrafficSimulation| s.agents().iter().map(|a| a.snapshot()).collect::<Vec<_>>();
        assert_eq!(spawns(&a), spawns(&b));
        assert_ne!(spawns(&a), spawns(&c));
    }

    #[test]
    fn placed_agents_follow_random_ones() {
        let sim = TrafficSimBuilder::new(config(2))
            .place(Vec2::new(0.0, 60.0), 0.0)
            .build()
            .unwrap();
        assert_eq!(sim.agents().len(), 3);
        assert_eq!(sim.agents()[2].id(), AgentId(2));
        assert!(sim.agents()[2].track().is_none());
        assert_eq!(sim.agents()[2].snapshot().position, Vec2::new(0.0, 60.0));
    }

    #[test]
    fn agent_count_override() {
        let sim = TrafficSimBuilder::new(config(40)).agent_count(5).build().unwrap();
        assert_eq!(sim.agents().len(), 5);
        assert_eq!(sim.config().agent_count, 5);
    }

    #[test]
    fn prebuilt_graph_is_used() {
        let sim = TrafficSimBuilder::new(config(3)).graph(single_main()).build().unwrap();
        assert_eq!(sim.graph().segments().len(), 1);
        assert!(sim.signals().is_empty());
        assert_eq!(sim.boundary_radius(), 220.0);
    }

    #[test]
    fn invalid_frame_settings_rejected() {
        for cfg in [
            SimConfig { max_dt: 0.0, ..config(1) },
            SimConfig { max_dt: f32::NAN, ..config(1) },
            SimConfig { collision_radius: 0.0, ..config(1) },
            SimConfig { boundary_margin: -1.0, ..config(1) },
        ] {
            let result = TrafficSimBuilder::new(cfg).build();
            assert!(matches!(result, Err(SimError::Config(_))));
        }
    }

    #[test]
    fn road_and_signal_errors_propagate() {
        let mut cfg = config(1);
        cfg.layout.highway_radius = 100.0;
        assert!(matches!(TrafficSimBuilder::new(cfg).build(), Err(SimError::Road(_))));

        let cfg = SimConfig { wave_speed: 0.0, ..config(1) };
        assert!(matches!(TrafficSimBuilder::new(cfg).build(), Err(SimError::Signal(_))));
    }

    #[test]
    fn side_roads_only_cannot_spawn() {
        let mut b = RoadGraphBuilder::new(8.0, 3.5).unwrap();
        let geometry = Geometry::Straight { start: Vec2::new(-50.0, 0.0), end: Vec2::new(50.0, 0.0) };
        b.add_segment(SegmentKind::Side, geometry, 2, 20.0).unwrap();

        let result = TrafficSimBuilder::new(config(1)).graph(b.build()).build();
        assert!(matches!(result, Err(SimError::NoSpawnPoint)));

        // Zero random agents need no spawn point.
        let mut b = RoadGraphBuilder::new(8.0, 3.5).unwrap();
        let geometry = Geometry::Straight { start: Vec2::new(-50.0, 0.0), end: Vec2::new(50.0, 0.0) };
        b.add_segment(SegmentKind::Side, geometry, 2, 20.0).unwrap();
        assert!(TrafficSimBuilder::new(config(0)).graph(b.build()).build().is_ok());
    }
}

// ── Tick ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tick {
    use std::f32::consts::FRAC_PI_2;

    use ct_core::{AgentId, Tick, Vec2, Vehicle, VehicleState};
    use ct_signal::SignalQuery;

    use super::helpers::*;
    use crate::{NoopObserver, TrafficSimBuilder};

    #[test]
    fn frame_delta_is_clamped() {
        let mut sim = TrafficSimBuilder::new(config(0)).build().unwrap();

        sim.tick(5.0, None);
        assert!(close(sim.clock().elapsed_secs as f32, 0.1));

        sim.tick(f32::NAN, None);
        sim.tick(-1.0, None);
        assert!(close(sim.clock().elapsed_secs as f32, 0.1));
        assert_eq!(sim.current_tick(), Tick(3));
    }

    #[test]
    fn signals_advance_by_clamped_delta() {
        let mut sim = TrafficSimBuilder::new(config(0)).build().unwrap();
        let expected: Vec<_> = sim
            .signals()
            .iter()
            .map(|(id, _, c)| {
                let mut c = c.clone();
                c.update(0.1);
                (id, c)
            })
            .collect();

        sim.tick(1.0, None);

        for (id, want) in expected {
            let got = sim.signals().signal(id).unwrap();
            assert_eq!(got.current_phase_index(), want.current_phase_index());
            assert!(close(got.time_in_phase(), want.time_in_phase()));
        }
    }

    #[test]
    fn frames_mirror_agents() {
        let mut sim = TrafficSimBuilder::new(config(25)).build().unwrap();
        let frames = sim.tick(0.05, None).to_vec();

        assert_eq!(frames.len(), 25);
        for (frame, agent) in frames.iter().zip(sim.agents()) {
            assert_eq!(frame.id, agent.id());
            assert_eq!(frame.position, agent.position());
            assert_eq!(frame.heading, agent.heading());
            assert_eq!(frame.speed, agent.speed());
            assert_eq!(frame.state, agent.state());
            assert_eq!(frame.turn_signal, agent.turn_signal());
        }
        assert_eq!(sim.frames(), frames.as_slice());
    }

    #[test]
    fn agents_get_moving() {
        let mut sim = TrafficSimBuilder::new(config(20)).build().unwrap();
        let start: Vec<Vec2> = sim.agents().iter().map(|a| a.position()).collect();

        sim.run_ticks(100, 0.1, &mut NoopObserver);

        let moved = sim.agents().iter().zip(&start).filter(|&(a, &p)| a.position().distance(p) > 1.0).count();
        assert!(moved > 0);
        assert!(sim.agents().iter().all(|a| a.speed() >= 0.0 && a.speed() <= a.params().max_speed));
    }

    #[test]
    fn runs_are_deterministic() {
        let run = || {
            let mut sim = TrafficSimBuilder::new(config(40)).build().unwrap();
            for _ in 0..300 {
                sim.tick(1.0 / 60.0, None);
            }
            sim.frames().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn agents_sense_top_of_frame_snapshot() {
        // Agent 0 updates first and moves; agent 1 must still see it where
        // it stood at the top of the frame.
        let mut sim = TrafficSimBuilder::new(config(0))
            .graph(single_main())
            .place(Vec2::new(10.0, 1.75), FRAC_PI_2)
            .place(Vec2::new(0.0, 1.75), FRAC_PI_2)
            .build()
            .unwrap();

        sim.tick(0.1, None);

        assert!(sim.agents()[0].position().distance(Vec2::new(10.0, 1.75)) > 0.0);
        let lead = sim.agents()[1].lead().copied().unwrap();
        assert_eq!(lead.agent, Some(AgentId(0)));
        assert_eq!(lead.distance, 10.0);
    }

    #[test]
    fn player_is_sensed_as_lead() {
        let mut sim = TrafficSimBuilder::new(config(0))
            .graph(single_main())
            .place(Vec2::new(0.0, 1.75), FRAC_PI_2)
            .build()
            .unwrap();
        let player = VehicleState::new(Vec2::new(10.0, 1.75), FRAC_PI_2, 5.0);

        sim.tick(0.1, Some(&player as &dyn Vehicle));

        let agent = &sim.agents()[0];
        let lead = agent.lead().copied().unwrap();
        assert_eq!(lead.agent, None);
        assert!(close(lead.distance, 10.0));
        assert_eq!(lead.speed, 5.0);
        assert_eq!(agent.target_speed(), 5.0);
    }

    #[test]
    fn signal_queries_pass_through() {
        let sim = TrafficSimBuilder::new(config(0)).build().unwrap();
        let (position, heading) = (Vec2::new(-8.0, 0.0), FRAC_PI_2);

        assert_eq!(
            sim.should_stop(position, heading, 25.0),
            sim.signals().should_stop(position, heading, 25.0)
        );
        assert!(sim.is_pedestrian_walk_signal(Vec2::new(0.0, 500.0)));
    }
}

// ── Collision response ────────────────────────────────────────────────────────

#[cfg(test)]
mod collisions {
    use std::f32::consts::{FRAC_PI_2, PI};

    use ct_core::{AgentId, LaneId, Tick, Vec2, Vehicle, wrap_angle};
    use ct_road::Direction;

    use super::helpers::*;
    use crate::TrafficSimBuilder;
    use crate::sim::contact_pairs;

    #[test]
    fn idle_agents_two_apart_turn_around_and_revert() {
        let mut sim = TrafficSimBuilder::new(config(0))
            .graph(single_main())
            .place(Vec2::new(0.0, 60.0), 0.0)
            .place(Vec2::new(2.0, 60.0), 0.0)
            .build()
            .unwrap();
        let mut rec = Recorder::default();

        let frames = sim.tick_observed(0.1, None, &mut rec).to_vec();

        assert_eq!(rec.collisions, vec![(Tick(0), AgentId(0), AgentId(1))]);
        assert_eq!(frames[0].position, Vec2::new(0.0, 60.0));
        assert_eq!(frames[1].position, Vec2::new(2.0, 60.0));
        for frame in &frames {
            assert_eq!(frame.heading, wrap_angle(0.0 + PI));
        }
    }

    #[test]
    fn bound_agents_reverse_onto_mirrored_lane() {
        let lookup = single_main();
        let mut sim = TrafficSimBuilder::new(config(0))
            .graph(single_main())
            .place(Vec2::new(0.0, 1.75), FRAC_PI_2)
            .place(Vec2::new(2.0, 1.75), FRAC_PI_2)
            .build()
            .unwrap();
        assert!(sim.agent_mut(AgentId(0)).unwrap().bind_lane(&lookup, LaneId(2), 0.5));
        assert!(sim.agent_mut(AgentId(1)).unwrap().bind_lane(&lookup, LaneId(2), 0.5 + 2.0 / 240.0));

        sim.tick(0.1, None);

        for agent in sim.agents() {
            let track = agent.track().unwrap();
            assert_eq!(track.lane, LaneId(1));
            assert_eq!(track.direction, Direction::Backward);
            assert!(close(track.lateral, -1.75));
            assert!(close(agent.heading(), wrap_angle(FRAC_PI_2 + PI)));
        }
        assert_eq!(sim.agents()[0].position(), Vec2::new(0.0, 1.75));
        assert!(close(sim.agents()[0].track().unwrap().progress, 0.5));
    }

    #[test]
    fn distant_agents_do_not_collide() {
        let mut sim = TrafficSimBuilder::new(config(0))
            .graph(single_main())
            .place(Vec2::new(0.0, 60.0), 0.0)
            .place(Vec2::new(10.0, 60.0), 0.0)
            .build()
            .unwrap();
        let mut rec = Recorder::default();

        sim.tick_observed(0.1, None, &mut rec);

        assert!(rec.collisions.is_empty());
        assert!(sim.agents().iter().all(|a| a.heading() == 0.0));
    }

    #[test]
    fn contact_pairs_cross_cell_boundaries() {
        let positions = [Vec2::new(2.9, 0.0), Vec2::new(3.1, 0.0), Vec2::new(0.5, -0.1)];
        assert_eq!(contact_pairs(&positions, 3.0), vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn contact_pairs_exclude_exact_radius() {
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0)];
        assert!(contact_pairs(&positions, 3.0).is_empty());
    }

    #[test]
    fn contact_pairs_cluster_sorted() {
        let positions = [
            Vec2::new(50.0, 50.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        assert_eq!(contact_pairs(&positions, 3.0), vec![(1, 2), (1, 3), (2, 3)]);
    }
}

// ── Observer & teardown ───────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use ct_core::Tick;

    use super::helpers::*;
    use crate::TrafficSimBuilder;

    #[test]
    fn observer_sees_every_tick() {
        let mut sim = TrafficSimBuilder::new(config(12)).build().unwrap();
        let mut rec = Recorder::default();

        sim.run_ticks(5, 0.1, &mut rec);

        assert_eq!(rec.starts, (0..5).map(Tick).collect::<Vec<_>>());
        assert_eq!(rec.ends, (0..5).map(|t| (Tick(t), 12)).collect::<Vec<_>>());
        assert_eq!(rec.finished, Some(Tick(5)));
    }

    #[test]
    fn teardown_releases_everything() {
        let mut sim = TrafficSimBuilder::new(config(40)).build().unwrap();
        for _ in 0..4 {
            sim.tick(0.1, None);
        }

        let summary = sim.teardown();
        assert_eq!(summary.agents, 40);
        assert_eq!(summary.signals, 21);
        assert_eq!(summary.ticks, 4);
    }
}
