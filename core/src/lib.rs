pub mod animation;
pub mod config;
pub mod glitch;
pub mod grid;
pub mod mode_switch;
pub mod piece_fx;
pub mod random;
pub mod tilt;

pub use animation::{
    AnimationEngine, AnimationRequest, CompleteFn, Easing, Keyframe, Mode, Property, Scheduler,
    Stage, TargetId, TimeoutGuard, Track, TrackValue,
};
pub use config::{GlitchOptions, Options, PieceOptions, TiltOptions};
pub use glitch::{GlitchFx, GlitchSurface};
pub use grid::{GridLayout, PieceSet};
pub use mode_switch::{ContentMap, ModeSwitch};
pub use piece_fx::{PieceFx, RevealDirection, SweepDirection};
pub use random::RandomSource;
pub use tilt::{Tilt, TiltUpdate};
