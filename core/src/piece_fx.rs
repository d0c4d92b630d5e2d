use std::cell::Cell;
use std::rc::Rc;

use crate::animation::{
    AnimationEngine, AnimationRequest, CompleteFn, Easing, Keyframe, Property, Stage, TargetId,
    Track, TrackValue,
};
use crate::grid::PieceSet;
use crate::random::RandomSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepDirection {
    In,
    Out,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealDirection {
    Left,
    Right,
}

/// Shimmer keyframes tween over short linear steps.
const LOOP_STEP_MS: u32 = 50;
const LOOP_FIRST_DELAY: (i32, i32) = (0, 2000);
const LOOP_SECOND_DELAY: (i32, i32) = (200, 2000);

const SWEEP_X_MAGNITUDE: (i32, i32) = (50, 100);
const SWEEP_Y_EXCURSION: (i32, i32) = (-1000, -800);
const SWEEP_STAGGER_STEP: i32 = 6;

const REVEAL_X_OFFSET: (i32, i32) = (-500, -100);
const REVEAL_Y_OFFSET: (i32, i32) = (0, 100);

struct SweepParams {
    duration_ms: u32,
    easing: Easing,
    opacity: f64,
    opacity_duration_ms: u32,
}

const SWEEP_OUT: SweepParams = SweepParams {
    duration_ms: 600,
    easing: Easing::Bezier(0.2, 1.0, 0.3, 1.0),
    opacity: 0.0,
    opacity_duration_ms: 600,
};

const SWEEP_IN: SweepParams = SweepParams {
    duration_ms: 500,
    easing: Easing::Bezier(0.8, 1.0, 0.3, 1.0),
    opacity: 1.0,
    opacity_duration_ms: 300,
};

/// Motion profile shared by the partial-reveal verbs: pieces either depart
/// off the left edge or return to rest, with mirrored stagger ordering.
struct RevealParams {
    duration_ms: u32,
    easing: Easing,
    stagger_step_ms: i32,
    reversed_stagger: bool,
    opacity_easing: Easing,
}

const REVEAL_DEPART: RevealParams = RevealParams {
    duration_ms: 400,
    easing: Easing::Bezier(0.2, 1.0, 0.3, 1.0),
    stagger_step_ms: 5,
    reversed_stagger: false,
    opacity_easing: Easing::Linear,
};

const REVEAL_RETURN: RevealParams = RevealParams {
    duration_ms: 200,
    easing: Easing::Bezier(0.8, 0.0, 0.7, 0.0),
    stagger_step_ms: 2,
    reversed_stagger: true,
    opacity_easing: Easing::Bezier(0.8, 0.0, 0.7, 0.0),
};

const REVEAL_OPACITY_DURATION_MS: u32 = 200;

/// The tile-level animation verbs: continuous shimmer, directional sweep,
/// and the half-grid partial reveal. Every verb cancels the in-flight
/// animation on its target set before starting, so at most one animation
/// owns a piece at a time.
pub struct PieceFx {
    pieces: Rc<PieceSet>,
    engine: Rc<dyn AnimationEngine>,
    stage: Rc<dyn Stage>,
    random: Rc<dyn RandomSource>,
    loop_active: Cell<bool>,
    loop_generation: Cell<u64>,
    custom_triggered: Cell<bool>,
}

impl PieceFx {
    pub fn new(
        pieces: Rc<PieceSet>,
        engine: Rc<dyn AnimationEngine>,
        stage: Rc<dyn Stage>,
        random: Rc<dyn RandomSource>,
    ) -> Rc<Self> {
        Rc::new(Self {
            pieces,
            engine,
            stage,
            random,
            loop_active: Cell::new(false),
            loop_generation: Cell::new(0),
            custom_triggered: Cell::new(false),
        })
    }

    pub fn is_loop_active(&self) -> bool {
        self.loop_active.get()
    }

    pub fn custom_triggered(&self) -> bool {
        self.custom_triggered.get()
    }

    fn all_targets(&self) -> Vec<TargetId> {
        (0..self.pieces.len()).map(TargetId::Piece).collect()
    }

    /// Starts the shimmer loop: backdrop swaps to the alternate image and
    /// every piece gets a randomized two-keyframe opacity schedule that
    /// re-arms itself on completion.
    pub fn start_loop(self: &Rc<Self>) {
        self.loop_active.set(true);
        let generation = self.loop_generation.get().wrapping_add(1);
        self.loop_generation.set(generation);
        self.stage.set_backdrop_alt(true);
        self.run_loop(generation);
    }

    fn run_loop(self: &Rc<Self>, generation: u64) {
        let targets = self.all_targets();
        self.engine.cancel(&targets);
        let values = targets
            .iter()
            .map(|_| {
                let blank = self.random.int_in(0, 5) == 0;
                TrackValue::Steps(vec![
                    Keyframe {
                        value: if blank { 0.0 } else { 1.0 },
                        delay_ms: self.random.pick(LOOP_FIRST_DELAY) as u32,
                    },
                    Keyframe {
                        value: 1.0,
                        delay_ms: self.random.pick(LOOP_SECOND_DELAY) as u32,
                    },
                ])
            })
            .collect();
        let request = AnimationRequest {
            delays_ms: vec![0; targets.len()],
            targets,
            duration_ms: LOOP_STEP_MS,
            easing: Easing::Linear,
            tracks: vec![Track {
                property: Property::Opacity,
                values,
                duration_ms: None,
                easing: None,
            }],
        };
        let fx = Rc::clone(self);
        self.engine.animate(
            request,
            Some(Box::new(move || {
                // The generation check keeps a stale completion from
                // restarting a loop that was stopped and restarted.
                if fx.loop_active.get() && fx.loop_generation.get() == generation {
                    fx.run_loop(generation);
                }
            })),
        );
    }

    /// Stops the shimmer loop, restores the idle backdrop and forces every
    /// piece fully opaque.
    pub fn stop_loop(&self) {
        self.loop_active.set(false);
        self.loop_generation
            .set(self.loop_generation.get().wrapping_add(1));
        self.stage.set_backdrop_alt(false);
        let targets = self.all_targets();
        self.engine.cancel(&targets);
        for target in targets {
            self.stage.set_opacity(target, 1.0);
        }
    }

    /// Full-grid enter/exit sweep. Left-half pieces push toward positive X,
    /// right-half toward negative, all through a large Y excursion.
    /// `on_complete` fires exactly once when every piece finished.
    pub fn animate_pieces(&self, direction: SweepDirection, on_complete: CompleteFn) {
        let params = match direction {
            SweepDirection::In => &SWEEP_IN,
            SweepDirection::Out => &SWEEP_OUT,
        };
        let targets = self.all_targets();
        self.engine.cancel(&targets);
        let delays_ms = (0..targets.len())
            .map(|i| {
                (i as i32 * SWEEP_STAGGER_STEP + self.pieces.delay_of(i)).max(0) as u32
            })
            .collect();
        let mut x_values = Vec::with_capacity(targets.len());
        let mut y_values = Vec::with_capacity(targets.len());
        for i in 0..targets.len() {
            let magnitude = if self.pieces.in_left_half(i) {
                self.random.pick(SWEEP_X_MAGNITUDE)
            } else {
                -self.random.pick(SWEEP_X_MAGNITUDE)
            } as f64;
            let excursion = self.random.pick(SWEEP_Y_EXCURSION) as f64;
            match direction {
                SweepDirection::Out => {
                    x_values.push(TrackValue::To(magnitude));
                    y_values.push(TrackValue::FromTo(0.0, excursion));
                }
                SweepDirection::In => {
                    x_values.push(TrackValue::FromTo(magnitude, 0.0));
                    y_values.push(TrackValue::FromTo(excursion, 0.0));
                }
            }
        }
        let opacity = vec![TrackValue::To(params.opacity); targets.len()];
        let request = AnimationRequest {
            duration_ms: params.duration_ms,
            easing: params.easing,
            delays_ms,
            tracks: vec![
                Track {
                    property: Property::TranslateX,
                    values: x_values,
                    duration_ms: None,
                    easing: None,
                },
                Track {
                    property: Property::TranslateY,
                    values: y_values,
                    duration_ms: None,
                    easing: None,
                },
                Track {
                    property: Property::Opacity,
                    values: opacity,
                    duration_ms: Some(params.opacity_duration_ms),
                    easing: Some(Easing::Linear),
                },
            ],
            targets,
        };
        self.engine.animate(request, Some(on_complete));
    }

    /// Partial reveal over the left half of the grid. `Left` scatters the
    /// pieces further left and fades them out; `Right` is the mirrored
    /// snap-back with a fade-in.
    pub fn fx_custom(&self, direction: RevealDirection) {
        self.custom_triggered.set(true);
        let (params, snap_back) = match direction {
            RevealDirection::Left => (&REVEAL_DEPART, false),
            RevealDirection::Right => (&REVEAL_RETURN, true),
        };
        let indices = self.pieces.left_half_indices();
        let mut x_values = Vec::with_capacity(indices.len());
        let mut y_values = Vec::with_capacity(indices.len());
        let mut opacity = Vec::with_capacity(indices.len());
        for _ in &indices {
            let x = self.random.pick(REVEAL_X_OFFSET) as f64;
            let y = self.random.pick(REVEAL_Y_OFFSET) as f64;
            if snap_back {
                x_values.push(TrackValue::FromTo(x, 0.0));
                y_values.push(TrackValue::FromTo(y, 0.0));
                opacity.push(TrackValue::FromTo(0.0, 1.0));
            } else {
                x_values.push(TrackValue::To(x));
                y_values.push(TrackValue::To(y));
                opacity.push(TrackValue::To(0.0));
            }
        }
        self.animate_left_half(params, indices, x_values, y_values, opacity, None);
    }

    /// Reverses `fx_custom`, returning the left-half pieces to rest (`Left`)
    /// or scattering them back off-screen (`Right`), then clears the
    /// triggered flag and reports completion.
    pub fn fx_custom_reset(&self, direction: RevealDirection, on_complete: CompleteFn) {
        self.custom_triggered.set(false);
        let params = match direction {
            RevealDirection::Left => &REVEAL_RETURN,
            RevealDirection::Right => &REVEAL_DEPART,
        };
        let indices = self.pieces.left_half_indices();
        let mut x_values = Vec::with_capacity(indices.len());
        let mut y_values = Vec::with_capacity(indices.len());
        let mut opacity = Vec::with_capacity(indices.len());
        for _ in &indices {
            match direction {
                RevealDirection::Left => {
                    x_values.push(TrackValue::To(0.0));
                    y_values.push(TrackValue::To(0.0));
                    opacity.push(TrackValue::To(1.0));
                }
                RevealDirection::Right => {
                    x_values.push(TrackValue::To(self.random.pick(REVEAL_X_OFFSET) as f64));
                    y_values.push(TrackValue::To(self.random.pick(REVEAL_Y_OFFSET) as f64));
                    opacity.push(TrackValue::FromTo(1.0, 0.0));
                }
            }
        }
        self.animate_left_half(
            params,
            indices,
            x_values,
            y_values,
            opacity,
            Some(on_complete),
        );
    }

    fn animate_left_half(
        &self,
        params: &RevealParams,
        indices: Vec<usize>,
        x_values: Vec<TrackValue>,
        y_values: Vec<TrackValue>,
        opacity: Vec<TrackValue>,
        on_complete: Option<CompleteFn>,
    ) {
        let count = indices.len();
        let targets: Vec<TargetId> = indices.iter().copied().map(TargetId::Piece).collect();
        self.engine.cancel(&targets);
        let delays_ms = indices
            .iter()
            .enumerate()
            .map(|(ordinal, &index)| {
                let position = if params.reversed_stagger {
                    count - 1 - ordinal
                } else {
                    ordinal
                };
                (position as i32 * params.stagger_step_ms + self.pieces.delay_of(index)).max(0)
                    as u32
            })
            .collect();
        let opacity_easing = params.opacity_easing;
        let request = AnimationRequest {
            duration_ms: params.duration_ms,
            easing: params.easing,
            delays_ms,
            tracks: vec![
                Track {
                    property: Property::TranslateX,
                    values: x_values,
                    duration_ms: None,
                    easing: None,
                },
                Track {
                    property: Property::TranslateY,
                    values: y_values,
                    duration_ms: None,
                    easing: None,
                },
                Track {
                    property: Property::Opacity,
                    values: opacity,
                    duration_ms: Some(REVEAL_OPACITY_DURATION_MS),
                    easing: Some(opacity_easing),
                },
            ],
            targets,
        };
        self.engine.animate(request, on_complete);
    }
}
