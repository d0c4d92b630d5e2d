mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{EngineEvent, FakeEngine, FakeStage, ScriptRandom};
use kakera_core::{
    AnimationEngine, Easing, Keyframe, PieceFx, PieceOptions, PieceSet, Property, RandomSource,
    RevealDirection, Stage, SweepDirection, TargetId, TrackValue,
};

struct Rig {
    engine: Rc<FakeEngine>,
    stage: Rc<FakeStage>,
    random: Rc<ScriptRandom>,
    fx: Rc<PieceFx>,
}

// A 2x4 grid with the random source pinned at 0.5: per-piece delays are 0,
// sweep magnitude 75, sweep excursion -900, reveal offsets (-300, 50),
// shimmer keyframe delays 1000 and 1100.
fn rig() -> Rig {
    let random = ScriptRandom::new(0.5);
    let pieces = Rc::new(PieceSet::build(
        &PieceOptions {
            rows: 2,
            columns: 4,
        },
        random.as_ref(),
    ));
    let engine = FakeEngine::new();
    let stage = FakeStage::new();
    let fx = PieceFx::new(
        pieces,
        Rc::clone(&engine) as Rc<dyn AnimationEngine>,
        Rc::clone(&stage) as Rc<dyn Stage>,
        Rc::clone(&random) as Rc<dyn RandomSource>,
    );
    Rig {
        engine,
        stage,
        random,
        fx,
    }
}

fn noop() -> Box<dyn FnOnce()> {
    Box::new(|| {})
}

#[test]
fn sweep_out_cancels_then_animates_every_piece() {
    let rig = rig();
    rig.fx.animate_pieces(SweepDirection::Out, noop());

    let events = rig.engine.events.borrow();
    assert_eq!(events.len(), 2);
    match &events[0] {
        EngineEvent::Cancel(targets) => assert_eq!(targets.len(), 8),
        other => panic!("expected cancel first, got {other:?}"),
    }
    let request = match &events[1] {
        EngineEvent::Animate(request) => request,
        other => panic!("expected animate second, got {other:?}"),
    };

    assert_eq!(request.duration_ms, 600);
    assert_eq!(request.easing, Easing::Bezier(0.2, 1.0, 0.3, 1.0));
    assert_eq!(
        request.delays_ms,
        vec![0, 6, 12, 18, 24, 30, 36, 42],
        "index stagger at 6ms per piece"
    );

    // Left-half columns push right, right-half columns push left.
    let x = &request.tracks[0];
    assert_eq!(x.property, Property::TranslateX);
    assert_eq!(x.values[0], TrackValue::To(75.0));
    assert_eq!(x.values[1], TrackValue::To(75.0));
    assert_eq!(x.values[2], TrackValue::To(-75.0));
    assert_eq!(x.values[3], TrackValue::To(-75.0));
    assert_eq!(x.values[4], TrackValue::To(75.0));

    let y = &request.tracks[1];
    assert_eq!(y.property, Property::TranslateY);
    assert_eq!(y.values[0], TrackValue::FromTo(0.0, -900.0));

    let opacity = &request.tracks[2];
    assert_eq!(opacity.property, Property::Opacity);
    assert_eq!(opacity.values[0], TrackValue::To(0.0));
    assert_eq!(opacity.duration_ms, Some(600));
    assert_eq!(opacity.easing, Some(Easing::Linear));
}

#[test]
fn sweep_in_returns_to_rest() {
    let rig = rig();
    rig.fx.animate_pieces(SweepDirection::In, noop());

    let request = rig.engine.last_request();
    assert_eq!(request.duration_ms, 500);
    assert_eq!(request.easing, Easing::Bezier(0.8, 1.0, 0.3, 1.0));
    assert_eq!(request.tracks[0].values[0], TrackValue::FromTo(75.0, 0.0));
    assert_eq!(
        request.tracks[1].values[0],
        TrackValue::FromTo(-900.0, 0.0)
    );
    assert_eq!(request.tracks[2].values[0], TrackValue::To(1.0));
    assert_eq!(request.tracks[2].duration_ms, Some(300));
}

#[test]
fn sweep_completion_fires_exactly_once() {
    let rig = rig();
    let fired = Rc::new(Cell::new(0u32));
    let flag = Rc::clone(&fired);
    rig.fx
        .animate_pieces(SweepDirection::Out, Box::new(move || flag.set(flag.get() + 1)));

    rig.engine.complete_all_once();
    rig.engine.complete_all_once();
    assert_eq!(fired.get(), 1);
}

#[test]
fn a_second_sweep_supersedes_the_first() {
    let rig = rig();
    let first = Rc::new(Cell::new(false));
    let second = Rc::new(Cell::new(false));
    let flag = Rc::clone(&first);
    rig.fx
        .animate_pieces(SweepDirection::Out, Box::new(move || flag.set(true)));
    let flag = Rc::clone(&second);
    rig.fx
        .animate_pieces(SweepDirection::In, Box::new(move || flag.set(true)));

    // The out-sweep was cancelled before the in-sweep started.
    assert_eq!(rig.engine.pending_count(), 1);
    rig.engine.complete_all_once();
    assert!(!first.get());
    assert!(second.get());
}

#[test]
fn shimmer_loop_rearms_until_stopped() {
    let rig = rig();
    rig.fx.start_loop();
    assert!(rig.fx.is_loop_active());
    assert!(rig.stage.backdrop_alt.get());

    let request = rig.engine.last_request();
    assert_eq!(request.duration_ms, 50);
    assert_eq!(request.easing, Easing::Linear);
    assert_eq!(request.tracks.len(), 1);
    assert_eq!(
        request.tracks[0].values[0],
        TrackValue::Steps(vec![
            Keyframe {
                value: 1.0,
                delay_ms: 1000,
            },
            Keyframe {
                value: 1.0,
                delay_ms: 1100,
            },
        ])
    );

    // Completion schedules the next pass.
    assert!(rig.engine.complete_oldest());
    assert_eq!(rig.engine.requests().len(), 2);

    rig.fx.stop_loop();
    assert!(!rig.fx.is_loop_active());
    assert!(!rig.stage.backdrop_alt.get());
    assert_eq!(rig.engine.pending_count(), 0);
    assert_eq!(rig.stage.opacity_of(TargetId::Piece(0)), Some(1.0));
    assert_eq!(rig.stage.opacity_of(TargetId::Piece(7)), Some(1.0));

    // Nothing left to complete, so the loop stays dead.
    assert!(!rig.engine.complete_oldest());
    assert_eq!(rig.engine.requests().len(), 2);
}

#[test]
fn blank_pieces_start_their_schedule_dark() {
    let rig = rig();
    // First piece draws 0.0 for the blank check, the rest stay on the
    // fallback.
    rig.random.push(&[0.0]);
    rig.fx.start_loop();

    let request = rig.engine.last_request();
    match &request.tracks[0].values[0] {
        TrackValue::Steps(steps) => assert_eq!(steps[0].value, 0.0),
        other => panic!("expected steps, got {other:?}"),
    }
    match &request.tracks[0].values[1] {
        TrackValue::Steps(steps) => assert_eq!(steps[0].value, 1.0),
        other => panic!("expected steps, got {other:?}"),
    }
}

#[test]
fn reveal_scatters_the_left_half_only() {
    let rig = rig();
    rig.fx.fx_custom(RevealDirection::Left);
    assert!(rig.fx.custom_triggered());

    let request = rig.engine.last_request();
    assert_eq!(
        request.targets,
        vec![
            TargetId::Piece(0),
            TargetId::Piece(1),
            TargetId::Piece(4),
            TargetId::Piece(5),
        ]
    );
    assert_eq!(request.duration_ms, 400);
    assert_eq!(request.easing, Easing::Bezier(0.2, 1.0, 0.3, 1.0));
    assert_eq!(request.delays_ms, vec![0, 5, 10, 15]);
    assert_eq!(request.tracks[0].values[0], TrackValue::To(-300.0));
    assert_eq!(request.tracks[1].values[0], TrackValue::To(50.0));
    assert_eq!(request.tracks[2].values[0], TrackValue::To(0.0));
    assert_eq!(request.tracks[2].duration_ms, Some(200));
    assert_eq!(request.tracks[2].easing, Some(Easing::Linear));
}

#[test]
fn reveal_snaps_back_from_the_right() {
    let rig = rig();
    rig.fx.fx_custom(RevealDirection::Right);

    let request = rig.engine.last_request();
    assert_eq!(request.duration_ms, 200);
    assert_eq!(request.easing, Easing::Bezier(0.8, 0.0, 0.7, 0.0));
    // Reversed stagger at 2ms per piece.
    assert_eq!(request.delays_ms, vec![6, 4, 2, 0]);
    assert_eq!(
        request.tracks[0].values[0],
        TrackValue::FromTo(-300.0, 0.0)
    );
    assert_eq!(request.tracks[1].values[0], TrackValue::FromTo(50.0, 0.0));
    assert_eq!(request.tracks[2].values[0], TrackValue::FromTo(0.0, 1.0));
}

#[test]
fn reveal_reset_returns_to_rest_and_reports() {
    let rig = rig();
    rig.fx.fx_custom(RevealDirection::Left);

    let fired = Rc::new(Cell::new(false));
    let flag = Rc::clone(&fired);
    rig.fx
        .fx_custom_reset(RevealDirection::Left, Box::new(move || flag.set(true)));
    assert!(!rig.fx.custom_triggered());

    let request = rig.engine.last_request();
    assert_eq!(request.duration_ms, 200);
    assert_eq!(request.delays_ms, vec![6, 4, 2, 0]);
    assert_eq!(request.tracks[0].values[0], TrackValue::To(0.0));
    assert_eq!(request.tracks[2].values[0], TrackValue::To(1.0));
    assert_eq!(
        request.tracks[2].easing,
        Some(Easing::Bezier(0.8, 0.0, 0.7, 0.0))
    );

    // The reveal animation itself was superseded, only the reset completes.
    assert_eq!(rig.engine.pending_count(), 1);
    rig.engine.complete_all_once();
    assert!(fired.get());
}

#[test]
fn reveal_reset_from_code_mode_scatters_out() {
    let rig = rig();
    rig.fx.fx_custom(RevealDirection::Right);
    rig.fx.fx_custom_reset(RevealDirection::Right, noop());

    let request = rig.engine.last_request();
    assert_eq!(request.duration_ms, 400);
    assert_eq!(request.delays_ms, vec![0, 5, 10, 15]);
    assert_eq!(request.tracks[0].values[0], TrackValue::To(-300.0));
    assert_eq!(
        request.tracks[2].values[0],
        TrackValue::FromTo(1.0, 0.0)
    );
}
