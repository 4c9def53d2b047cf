// Pipeline and drag processor behaviour over plain state values.

use glam::Vec2;
use rand::prelude::*;
use sonar_core::*;

fn run(state: SimulationState, action: Action) -> SimulationState {
    Pipeline::standard().run(Context { state, action }).state
}

fn with_sources(n: usize) -> SimulationState {
    (0..n).fold(SimulationState::default(), |s, _| run(s, Action::AddSource))
}

#[test]
fn three_adds_then_remove() {
    let s = with_sources(3);
    let colors: Vec<&str> = s.sources.iter().map(|src| src.color).collect();
    let freqs: Vec<f32> = s.sources.iter().map(|src| src.base_frequency).collect();
    let timbres: Vec<Timbre> = s.sources.iter().map(|src| src.timbre).collect();
    assert_eq!(colors, vec!["#60A5FA", "#34D399", "#A78BFA"]);
    assert_eq!(freqs, vec![220.0, 261.63, 293.66]);
    assert_eq!(timbres, vec![Timbre::Sine, Timbre::Triangle, Timbre::Sine]);
    for src in &s.sources {
        assert_eq!(src.position, Vec2::new(0.5, 0.5));
        assert_eq!(src.normalized_distance, 0.0);
    }

    let after = run(s.clone(), Action::RemoveLastSource);
    assert_eq!(after.sources.len(), 2);
    assert_eq!(after.sources[..], s.sources[..2]);
}

#[test]
fn adds_cycle_every_palette() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let n = rng.gen_range(0..20);
        let s = with_sources(n);
        assert_eq!(s.sources.len(), n);
        for (i, src) in s.sources.iter().enumerate() {
            assert_eq!(src.color, SOURCE_COLORS[i % SOURCE_COLORS.len()]);
            assert_eq!(src.base_frequency, SOURCE_FREQUENCIES_HZ[i % 6]);
            assert_eq!(src.timbre, SOURCE_TIMBRES[i % 6]);
        }
    }
}

#[test]
fn ids_are_unique() {
    let s = with_sources(12);
    let mut ids: Vec<SourceId> = s.sources.iter().map(|src| src.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 12);
}

#[test]
fn remove_drops_most_recent() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let n = rng.gen_range(1..15);
        let s = with_sources(n);
        let newest = s.sources[n - 1].id;
        let after = run(s, Action::RemoveLastSource);
        assert_eq!(after.sources.len(), n - 1);
        assert!(after.source(newest).is_none());
    }
}

#[test]
fn remove_on_empty_is_stable() {
    let mut s = SimulationState::default();
    for _ in 0..5 {
        s = run(s, Action::RemoveLastSource);
        assert_eq!(s, SimulationState::default());
    }
}

#[test]
fn move_touches_only_the_target_position() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let s = with_sources(rng.gen_range(1..8));
        let pick = rng.gen_range(0..s.sources.len());
        let id = s.sources[pick].id;
        let p = Vec2::new(rng.gen::<f32>(), rng.gen::<f32>());
        let after = run(s.clone(), Action::move_source(id, p));

        assert_eq!(after.sources.len(), s.sources.len());
        for (before, now) in s.sources.iter().zip(after.sources.iter()) {
            assert_eq!(before.id, now.id);
            assert_eq!(before.color, now.color);
            assert_eq!(before.base_frequency, now.base_frequency);
            assert_eq!(before.timbre, now.timbre);
            if now.id == id {
                assert_eq!(now.position, p);
                assert_eq!(now.normalized_distance, distance_from_center(p));
            } else {
                assert_eq!(before, now);
            }
        }
    }
}

#[test]
fn move_with_unknown_id_is_a_no_op() {
    let s = with_sources(3);
    let after = run(s.clone(), Action::move_source(SourceId(999), Vec2::new(0.1, 0.9)));
    assert_eq!(after, s);
}

#[test]
fn move_clamps_out_of_range_positions() {
    let s = with_sources(2);
    let id = s.sources[0].id;
    let after = run(s, Action::move_source(id, Vec2::new(1.5, -0.3)));
    assert_eq!(after.sources[0].position, Vec2::new(1.0, 0.0));
    assert_eq!(after.sources[0].normalized_distance, 1.0);
    // Clamping is the same on every axis and sign.
    let after = run(after, Action::move_source(id, Vec2::new(-4.0, 7.0)));
    assert_eq!(after.sources[0].position, Vec2::new(0.0, 1.0));
}

#[test]
fn drag_processor_leaves_input_untouched() {
    let s = with_sources(2);
    let copy = s.sources.clone();
    let event = DragEvent {
        source_id: s.sources[1].id,
        position: Vec2::new(0.2, 0.2),
    };
    let moved = apply_drag(&s.sources, &event);
    assert_eq!(s.sources, copy);
    assert_ne!(moved, copy);
}

#[test]
fn nearest_object_update_replaces_signal() {
    let s = with_sources(1);
    let obj = NearestObject::new(0.8, Vec2::new(0.3, 0.6)).with_kind("door");
    let after = run(s.clone(), Action::UpdateNearestObject(Some(obj.clone())));
    assert_eq!(after.nearest_object, Some(obj));
    assert_eq!(after.sources, s.sources);
    let cleared = run(after, Action::UpdateNearestObject(None));
    assert_eq!(cleared.nearest_object, None);
}

#[test]
fn custom_stage_extends_without_touching_others() {
    // Re-centre every source when a nearest object disappears.
    fn recenter_on_clear(mut ctx: Context) -> Context {
        if ctx.action != Action::UpdateNearestObject(None) {
            return ctx;
        }
        for src in &mut ctx.state.sources {
            src.position = SoundSource::listener_position();
            src.normalized_distance = 0.0;
        }
        ctx
    }
    let pipeline = Pipeline::standard().with_stage(recenter_on_clear);
    assert_eq!(pipeline.len(), 5);

    let s = with_sources(1);
    let id = s.sources[0].id;
    let s = pipeline
        .run(Context {
            state: s,
            action: Action::move_source(id, Vec2::new(0.9, 0.9)),
        })
        .state;
    assert_eq!(s.sources[0].position, Vec2::new(0.9, 0.9));
    let s = pipeline
        .run(Context {
            state: s,
            action: Action::UpdateNearestObject(None),
        })
        .state;
    assert_eq!(s.sources[0].position, Vec2::new(0.5, 0.5));
}

#[test]
fn drag_session_emits_moves_for_its_source() {
    let session = DragSession::begin(SourceId(4), 1);
    assert!(session.owns(1));
    assert!(!session.owns(2));
    let ev = session.move_to(Vec2::new(0.25, 0.75));
    assert_eq!(ev.source_id, SourceId(4));
    assert_eq!(ev.position, Vec2::new(0.25, 0.75));
}

#[test]
fn surface_uv_clamps_to_the_rect() {
    let rect = SurfaceRect {
        left: 100.0,
        top: 50.0,
        width: 200.0,
        height: 100.0,
    };
    assert_eq!(surface_uv(200.0, 100.0, rect), Vec2::new(0.5, 0.5));
    assert_eq!(surface_uv(0.0, 500.0, rect), Vec2::new(0.0, 1.0));
    let empty = SurfaceRect {
        width: 0.0,
        ..rect
    };
    assert_eq!(surface_uv(150.0, 60.0, empty), Vec2::new(0.5, 0.5));
}
