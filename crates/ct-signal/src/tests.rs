//! Unit tests for ct-signal.

#[cfg(test)]
mod helpers {
    use ct_core::Vec2;
    use ct_road::{Geometry, RoadGraph, RoadGraphBuilder, SegmentKind};

    fn road(b: &mut RoadGraphBuilder, kind: SegmentKind, start: (f32, f32), end: (f32, f32)) {
        let lanes = if kind == SegmentKind::Main { 4 } else { 2 };
        let geometry = Geometry::Straight {
            start: Vec2::new(start.0, start.1),
            end:   Vec2::new(end.0, end.1),
        };
        b.add_segment(kind, geometry, lanes, 30.0).unwrap();
    }

    /// Horizontal main along z = 0 crossed by side roads at x = −60, 0, 60.
    /// Intersection ids 0, 1, 2 in that order.
    pub fn horizontal_wave() -> RoadGraph {
        let mut b = RoadGraphBuilder::new(8.0, 3.5).unwrap();
        road(&mut b, SegmentKind::Main, (-100.0, 0.0), (100.0, 0.0));
        for x in [-60.0, 0.0, 60.0] {
            road(&mut b, SegmentKind::Side, (x, -50.0), (x, 50.0));
        }
        b.build()
    }

    /// Vertical main along x = 0 crossed by side roads at z = −60, 0, 60.
    pub fn vertical_wave() -> RoadGraph {
        let mut b = RoadGraphBuilder::new(8.0, 3.5).unwrap();
        road(&mut b, SegmentKind::Main, (0.0, -100.0), (0.0, 100.0));
        for z in [-60.0, 0.0, 60.0] {
            road(&mut b, SegmentKind::Side, (-50.0, z), (50.0, z));
        }
        b.build()
    }

    /// Two mains crossing at the origin: one signaled intersection.
    pub fn single_crossing() -> RoadGraph {
        let mut b = RoadGraphBuilder::new(8.0, 3.5).unwrap();
        road(&mut b, SegmentKind::Main, (-100.0, 0.0), (100.0, 0.0));
        road(&mut b, SegmentKind::Main, (0.0, -100.0), (0.0, 100.0));
        b.build()
    }

    pub fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod controller {
    use crate::{Aspect, Axis, CardinalDirection, Phase, SignalController, SignalError, SignalTiming};

    fn default_controller() -> SignalController {
        SignalController::from_timing(&SignalTiming::default()).unwrap()
    }

    #[test]
    fn default_cycle_is_26_seconds() {
        let c = default_controller();
        assert_eq!(c.phases().len(), 6);
        assert_eq!(c.cycle_length(), 26.0);
        let durations: Vec<f32> = c.phases().iter().map(|p| p.duration).collect();
        assert_eq!(durations, vec![10.0, 2.0, 1.0, 10.0, 2.0, 1.0]);
    }

    #[test]
    fn never_green_on_both_axes() {
        let mut c = default_controller();
        for _ in 0..2_000 {
            c.update(0.05);
            let ns = c.current_phase().aspect(Axis::NorthSouth);
            let ew = c.current_phase().aspect(Axis::EastWest);
            assert!(!(ns == Aspect::Green && ew == Aspect::Green));
            assert!(ns == Aspect::Red || ew == Aspect::Red, "both axes non-red");
        }
    }

    #[test]
    fn update_carries_overflow() {
        let mut c = default_controller();
        c.update(10.5);
        assert_eq!(c.current_phase_index(), 1);
        assert!((c.time_in_phase() - 0.5).abs() < 1e-5);

        c.update(3.0);
        assert_eq!(c.current_phase_index(), 3);
    }

    #[test]
    fn phase_index_wraps_after_last_phase() {
        let mut c = default_controller();
        c.set_phase(5);
        c.update(1.25);
        assert_eq!(c.current_phase_index(), 0);
        assert!((c.time_in_phase() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn whole_cycles_and_bad_deltas_are_no_ops() {
        let mut c = default_controller();
        c.update(3.0);
        c.update(26.0);
        c.update(-1.0);
        c.update(f32::NAN);
        assert_eq!(c.current_phase_index(), 0);
        assert!((c.time_in_phase() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn infinite_deltas_leave_phase_intact() {
        let mut c = default_controller();
        c.update(4.0);
        c.update(f32::INFINITY);
        c.update(f32::NEG_INFINITY);
        assert_eq!(c.current_phase_index(), 0);
        assert!((c.time_in_phase() - 4.0).abs() < 1e-5);

        c.update(6.5);
        assert_eq!(c.current_phase_index(), 1);
        assert!((c.time_in_phase() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn get_state_maps_directions_to_axes() {
        let mut c = default_controller();
        assert_eq!(c.get_state(CardinalDirection::North), Aspect::Green);
        assert_eq!(c.get_state(CardinalDirection::South), Aspect::Green);
        assert_eq!(c.get_state(CardinalDirection::East), Aspect::Red);
        c.set_phase(4);
        assert_eq!(c.get_state(CardinalDirection::West), Aspect::Yellow);
        assert_eq!(c.get_state(CardinalDirection::North), Aspect::Red);
        c.set_phase(2);
        assert!(c.is_all_red());
    }

    #[test]
    fn offset_matches_replay_from_zero() {
        for offset in [0.0_f32, 5.0, 10.0, 12.5, 13.0, 25.9, 40.0, 77.3, -3.0] {
            let mut seeded = default_controller();
            seeded.update(7.0);
            seeded.set_phase_offset(offset);

            let mut replayed = default_controller();
            replayed.update(offset.rem_euclid(26.0));

            assert_eq!(seeded.current_phase_index(), replayed.current_phase_index(), "offset {offset}");
            assert_eq!(seeded.time_in_phase(), replayed.time_in_phase(), "offset {offset}");
        }
    }

    #[test]
    fn offset_lands_in_expected_phase() {
        let mut c = default_controller();
        c.set_phase_offset(14.5);
        assert_eq!(c.current_phase_index(), 3);
        assert!((c.time_in_phase() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn invalid_phase_lists_are_rejected() {
        assert!(matches!(SignalController::new(vec![]), Err(SignalError::EmptyPhases)));

        let timing = SignalTiming { green: 0.0, ..SignalTiming::default() };
        assert!(matches!(
            SignalController::from_timing(&timing),
            Err(SignalError::InvalidPhaseDuration { index: 0, .. })
        ));

        let phase = Phase { duration: f32::NAN, north_south: Aspect::Red, east_west: Aspect::Red };
        assert!(SignalController::new(vec![phase]).is_err());
    }
}

// ── Coordinator ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod coordinator {
    use std::f32::consts::{FRAC_PI_2, PI};

    use ct_core::{IntersectionId, Vec2};
    use ct_road::{CityLayout, RoadGraph};
    use crate::{
        Aspect, Axis, CardinalDirection, SignalCoordinator, SignalError, SignalQuery, SignalTiming,
    };
    use super::helpers::{close, horizontal_wave, single_crossing, vertical_wave};

    fn coordinator(graph: &RoadGraph) -> SignalCoordinator {
        SignalCoordinator::new(graph, &SignalTiming::default(), 30.0).unwrap()
    }

    #[test]
    fn one_controller_per_signaled_intersection() {
        let graph = RoadGraph::city(&CityLayout::default()).unwrap();
        let c = coordinator(&graph);
        assert_eq!(c.len(), 21);
        for x in graph.intersections() {
            assert_eq!(c.signal(x.id).is_some(), x.signaled, "{}", x.id);
        }
    }

    #[test]
    fn horizontal_wave_increases_by_spacing_over_speed() {
        let c = coordinator(&horizontal_wave());
        let offsets: Vec<f32> = (0..3).map(|i| c.offset_of(IntersectionId(i)).unwrap()).collect();
        assert!(close(offsets[0], 0.0));
        assert!(offsets[0] < offsets[1] && offsets[1] < offsets[2]);
        assert!(close(offsets[1] - offsets[0], 60.0 / 30.0));
        assert!(close(offsets[2] - offsets[1], 60.0 / 30.0));
    }

    #[test]
    fn vertical_wave_starts_half_a_cycle_later() {
        let c = coordinator(&vertical_wave());
        let offsets: Vec<f32> = (0..3).map(|i| c.offset_of(IntersectionId(i)).unwrap()).collect();
        assert!(close(offsets[0], 13.0));
        assert!(close(offsets[1], 15.0));
        assert!(close(offsets[2], 17.0));
    }

    #[test]
    fn shared_intersection_takes_horizontal_offset() {
        let c = coordinator(&single_crossing());
        assert_eq!(c.offset_of(IntersectionId(0)), Some(0.0));
    }

    #[test]
    fn offsets_seed_controllers() {
        let c = coordinator(&horizontal_wave());
        let light = c.signal(IntersectionId(2)).unwrap();
        assert_eq!(light.current_phase_index(), 0);
        assert!(close(light.time_in_phase(), 4.0));
    }

    #[test]
    fn wave_wraps_modulo_cycle() {
        // 60 units at 2 u/s = 30 s per hop, past the 26 s cycle.
        let c = SignalCoordinator::new(&horizontal_wave(), &SignalTiming::default(), 2.0).unwrap();
        assert!(close(c.offset_of(IntersectionId(1)).unwrap(), 4.0));
        assert!(close(c.offset_of(IntersectionId(2)).unwrap(), 8.0));
    }

    #[test]
    fn non_positive_wave_speed_is_rejected() {
        let err = SignalCoordinator::new(&single_crossing(), &SignalTiming::default(), 0.0);
        assert!(matches!(err, Err(SignalError::InvalidWaveSpeed(_))));
    }

    #[test]
    fn stop_at_red_from_stop_line() {
        // Offset 0: north-south green, east-west red.
        let c = coordinator(&single_crossing());
        let stop = c.should_stop(Vec2::new(-8.0, 0.0), FRAC_PI_2, 25.0).unwrap();
        assert_eq!(stop.intersection, IntersectionId(0));
        assert_eq!(stop.approach, CardinalDirection::East);
        assert_eq!(stop.aspect, Aspect::Red);
        assert!(close(stop.distance, 8.0));
        assert_eq!(stop.stop_position, Vec2::new(-8.0, 0.0));
    }

    #[test]
    fn stop_point_is_on_the_approach_side() {
        let c = coordinator(&single_crossing());
        let stop = c.should_stop(Vec2::new(20.0, 0.0), -FRAC_PI_2, 25.0).unwrap();
        assert_eq!(stop.approach, CardinalDirection::West);
        assert_eq!(stop.stop_position, Vec2::new(8.0, 0.0));
    }

    #[test]
    fn green_approach_needs_no_stop() {
        let c = coordinator(&single_crossing());
        // Heading 0 faces +z: southbound through a north-south green.
        assert_eq!(c.should_stop(Vec2::new(0.0, -12.0), 0.0, 25.0), None);
    }

    #[test]
    fn yellow_requires_stop() {
        let mut c = coordinator(&single_crossing());
        c.signal_mut(IntersectionId(0)).unwrap().set_phase(1);
        let stop = c.should_stop(Vec2::new(0.0, 12.0), PI, 25.0).unwrap();
        assert_eq!(stop.approach, CardinalDirection::North);
        assert_eq!(stop.aspect, Aspect::Yellow);
        assert_eq!(stop.stop_position, Vec2::new(0.0, 8.0));
    }

    #[test]
    fn lights_behind_too_close_or_too_far_are_ignored() {
        let c = coordinator(&single_crossing());
        assert_eq!(c.should_stop(Vec2::new(8.0, 0.0), FRAC_PI_2, 25.0), None, "behind");
        assert_eq!(c.should_stop(Vec2::new(-1.5, 0.0), FRAC_PI_2, 25.0), None, "passed");
        assert_eq!(c.should_stop(Vec2::new(-30.0, 0.0), FRAC_PI_2, 25.0), None, "too far");
    }

    #[test]
    fn nearest_red_wins() {
        let mut c = coordinator(&horizontal_wave());
        for i in 0..3 {
            c.signal_mut(IntersectionId(i)).unwrap().set_phase(0);
        }
        let stop = c.should_stop(Vec2::new(-70.0, 0.0), FRAC_PI_2, 200.0).unwrap();
        assert_eq!(stop.intersection, IntersectionId(0));
        assert!(close(stop.distance, 10.0));
    }

    #[test]
    fn pedestrian_walk_only_in_all_red_near_a_light() {
        let mut c = coordinator(&single_crossing());
        assert!(c.is_pedestrian_walk_signal(Vec2::new(60.0, 60.0)));
        assert!(!c.is_pedestrian_walk_signal(Vec2::new(5.0, 5.0)));
        c.signal_mut(IntersectionId(0)).unwrap().set_phase(2);
        assert!(c.is_pedestrian_walk_signal(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn city_lights_never_show_conflicting_greens() {
        let graph = RoadGraph::city(&CityLayout::default()).unwrap();
        let mut c = coordinator(&graph);
        for _ in 0..1_000 {
            c.update(0.1);
            for (id, _, light) in c.iter() {
                let ns = light.current_phase().aspect(Axis::NorthSouth);
                let ew = light.current_phase().aspect(Axis::EastWest);
                assert!(ns == Aspect::Red || ew == Aspect::Red, "{id}");
            }
        }
    }

    #[test]
    fn release_drops_every_controller() {
        let mut c = coordinator(&horizontal_wave());
        assert_eq!(c.release(), 3);
        assert!(c.is_empty());
        assert!(c.signal(IntersectionId(0)).is_none());
    }
}
