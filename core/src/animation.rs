use std::any::Any;

/// One of the two page presentations. The whole effect is a choreography
/// around crossing between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Design,
    Code,
}

impl Mode {
    pub fn other(self) -> Self {
        match self {
            Mode::Design => Mode::Code,
            Mode::Code => Mode::Design,
        }
    }
}

/// Everything the engine can animate: grid pieces, the page overlay, the
/// satellite elements and their pre-split letter spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetId {
    Piece(usize),
    Overlay,
    Title,
    Contact,
    MenuCtrl,
    TitleLetter(usize),
    ContactLetter(usize),
    /// Design-mode menu link, by item index.
    MenuItem(usize),
    /// Code-mode menu letter span, by (item, letter).
    MenuCodeLetter(usize, usize),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    Linear,
    Bezier(f32, f32, f32, f32),
    InQuad,
    InQuint,
    OutQuint,
    OutExpo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Property {
    Opacity,
    /// Horizontal offset in pixels.
    TranslateX,
    /// Vertical offset in pixels.
    TranslateY,
    /// Vertical offset as a percentage of the element's own height.
    TranslateYPercent,
    Scale,
}

/// A timed step inside a `TrackValue::Steps` schedule. Delays are relative to
/// the end of the previous step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub value: f64,
    pub delay_ms: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TrackValue {
    /// Animate from the current value to this one.
    To(f64),
    /// Snap to the first value, then animate to the second.
    FromTo(f64, f64),
    /// Run the steps in order, each over the track duration.
    Steps(Vec<Keyframe>),
}

/// One animated property across every target of a request. Entries in
/// `values` line up with the request's target list. Duration and easing fall
/// back to the request-level ones when unset.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub property: Property,
    pub values: Vec<TrackValue>,
    pub duration_ms: Option<u32>,
    pub easing: Option<Easing>,
}

/// Input to the external animation capability. The core builds these; the
/// engine owns their execution lifetime.
#[derive(Clone, Debug)]
pub struct AnimationRequest {
    pub targets: Vec<TargetId>,
    pub duration_ms: u32,
    pub easing: Easing,
    /// Per-target start delay, already clamped to >= 0.
    pub delays_ms: Vec<u32>,
    pub tracks: Vec<Track>,
}

pub type CompleteFn = Box<dyn FnOnce()>;

/// The animation capability the core consumes. `animate` must invoke the
/// completion exactly once after every target finished; `cancel` removes the
/// running animations on the given targets and drops their completions.
pub trait AnimationEngine {
    fn animate(&self, request: AnimationRequest, on_complete: Option<CompleteFn>);
    fn cancel(&self, targets: &[TargetId]);
}

/// Cancels the underlying timer when dropped, matching gloo's `Timeout`.
pub struct TimeoutGuard {
    _inner: Box<dyn Any>,
}

impl TimeoutGuard {
    pub fn new<T: 'static>(inner: T) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

/// One-shot timer capability backing the glitch cycle and debounces.
pub trait Scheduler {
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimeoutGuard;
}

/// Instant, non-animated pokes at the page. These complement the engine: the
/// choreography occasionally forces a style or class state between
/// animations instead of tweening to it.
pub trait Stage {
    /// Swap the grid container backdrop between the idle image and the
    /// alternate one shown behind the shimmer loop.
    fn set_backdrop_alt(&self, alt: bool);
    fn set_opacity(&self, target: TargetId, value: f64);
    fn clear_transform(&self, target: TargetId);
    /// Swap `mode--design`/`mode--code` on a satellite element.
    fn set_mode_class(&self, target: TargetId, mode: Mode);
    /// Move the current-mode indicator and mode class on the switch controls.
    fn set_switch_mode(&self, mode: Mode);
    fn set_menu_visible(&self, mode: Mode, visible: bool);
}
