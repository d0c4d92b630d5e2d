#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use kakera_core::{
    AnimationEngine, AnimationRequest, CompleteFn, GlitchSurface, Mode, RandomSource, Scheduler,
    Stage, TargetId, TimeoutGuard,
};

/// Manual-clock scheduler. Timers fire in due order when the clock is
/// advanced; dropping a `TimeoutGuard` cancels the entry, like gloo.
pub struct FakeScheduler {
    now: Cell<u64>,
    next_id: Cell<u64>,
    queue: RefCell<Vec<Entry>>,
}

struct Entry {
    id: u64,
    due: u64,
    alive: Rc<Cell<bool>>,
    callback: Option<Box<dyn FnOnce()>>,
}

struct CancelOnDrop {
    alive: Rc<Cell<bool>>,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.alive.set(false);
    }
}

impl FakeScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            now: Cell::new(0),
            next_id: Cell::new(0),
            queue: RefCell::new(Vec::new()),
        })
    }

    pub fn pending(&self) -> usize {
        self.queue
            .borrow()
            .iter()
            .filter(|entry| entry.alive.get())
            .count()
    }

    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        loop {
            let entry = {
                let mut queue = self.queue.borrow_mut();
                queue.retain(|entry| entry.alive.get());
                let position = queue
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.due <= target)
                    .min_by_key(|&(_, entry)| (entry.due, entry.id))
                    .map(|(position, _)| position);
                position.map(|position| queue.remove(position))
            };
            let Some(mut entry) = entry else {
                break;
            };
            self.now.set(entry.due);
            if let Some(callback) = entry.callback.take() {
                callback();
            }
        }
        self.now.set(target);
    }
}

impl Scheduler for FakeScheduler {
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimeoutGuard {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let alive = Rc::new(Cell::new(true));
        self.queue.borrow_mut().push(Entry {
            id,
            due: self.now.get() + delay_ms as u64,
            alive: Rc::clone(&alive),
            callback: Some(callback),
        });
        TimeoutGuard::new(CancelOnDrop { alive })
    }
}

/// Scripted random source: pops queued unit samples, falls back to a fixed
/// value once the script runs dry.
pub struct ScriptRandom {
    script: RefCell<VecDeque<f64>>,
    fallback: Cell<f64>,
}

impl ScriptRandom {
    pub fn new(fallback: f64) -> Rc<Self> {
        Rc::new(Self {
            script: RefCell::new(VecDeque::new()),
            fallback: Cell::new(fallback),
        })
    }

    pub fn push(&self, values: &[f64]) {
        self.script.borrow_mut().extend(values.iter().copied());
    }
}

impl RandomSource for ScriptRandom {
    fn unit(&self) -> f64 {
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or(self.fallback.get())
    }
}

#[derive(Debug, Clone)]
pub enum EngineEvent {
    Animate(AnimationRequest),
    Cancel(Vec<TargetId>),
}

struct PendingAnimation {
    targets: Vec<TargetId>,
    on_complete: Option<CompleteFn>,
}

/// Records every engine call and holds completions until a test fires them.
/// Cancel drops the pending completion of any animation sharing a target,
/// mirroring the at-most-one-animation-per-target contract.
pub struct FakeEngine {
    pub events: RefCell<Vec<EngineEvent>>,
    pending: RefCell<Vec<PendingAnimation>>,
}

impl FakeEngine {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            events: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
        })
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn requests(&self) -> Vec<AnimationRequest> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Animate(request) => Some(request.clone()),
                EngineEvent::Cancel(_) => None,
            })
            .collect()
    }

    pub fn last_request(&self) -> AnimationRequest {
        self.requests().last().cloned().expect("no animate calls")
    }

    pub fn events_len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Completes the oldest pending animation, if any.
    pub fn complete_oldest(&self) -> bool {
        let entry = {
            let mut pending = self.pending.borrow_mut();
            if pending.is_empty() {
                None
            } else {
                Some(pending.remove(0))
            }
        };
        match entry {
            Some(entry) => {
                if let Some(on_complete) = entry.on_complete {
                    on_complete();
                }
                true
            }
            None => false,
        }
    }

    /// Completes everything pending right now; animations spawned by those
    /// completions stay pending.
    pub fn complete_all_once(&self) {
        let drained: Vec<PendingAnimation> = self.pending.borrow_mut().drain(..).collect();
        for entry in drained {
            if let Some(on_complete) = entry.on_complete {
                on_complete();
            }
        }
    }
}

impl AnimationEngine for FakeEngine {
    fn animate(&self, request: AnimationRequest, on_complete: Option<CompleteFn>) {
        self.events
            .borrow_mut()
            .push(EngineEvent::Animate(request.clone()));
        self.pending.borrow_mut().push(PendingAnimation {
            targets: request.targets,
            on_complete,
        });
    }

    fn cancel(&self, targets: &[TargetId]) {
        self.events
            .borrow_mut()
            .push(EngineEvent::Cancel(targets.to_vec()));
        self.pending
            .borrow_mut()
            .retain(|entry| !entry.targets.iter().any(|target| targets.contains(target)));
    }
}

/// Records the instant pokes the choreography makes between animations.
#[derive(Default)]
pub struct FakeStage {
    pub backdrop_alt: Cell<bool>,
    pub opacities: RefCell<HashMap<TargetId, f64>>,
    pub cleared_transforms: RefCell<Vec<TargetId>>,
    pub mode_classes: RefCell<HashMap<TargetId, Mode>>,
    pub switch_mode: Cell<Option<Mode>>,
    pub design_menu_visible: Cell<Option<bool>>,
    pub code_menu_visible: Cell<Option<bool>>,
}

impl FakeStage {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn opacity_of(&self, target: TargetId) -> Option<f64> {
        self.opacities.borrow().get(&target).copied()
    }

    pub fn mode_class_of(&self, target: TargetId) -> Option<Mode> {
        self.mode_classes.borrow().get(&target).copied()
    }
}

impl Stage for FakeStage {
    fn set_backdrop_alt(&self, alt: bool) {
        self.backdrop_alt.set(alt);
    }

    fn set_opacity(&self, target: TargetId, value: f64) {
        self.opacities.borrow_mut().insert(target, value);
    }

    fn clear_transform(&self, target: TargetId) {
        self.cleared_transforms.borrow_mut().push(target);
    }

    fn set_mode_class(&self, target: TargetId, mode: Mode) {
        self.mode_classes.borrow_mut().insert(target, mode);
    }

    fn set_switch_mode(&self, mode: Mode) {
        self.switch_mode.set(Some(mode));
    }

    fn set_menu_visible(&self, mode: Mode, visible: bool) {
        match mode {
            Mode::Design => self.design_menu_visible.set(Some(visible)),
            Mode::Code => self.code_menu_visible.set(Some(visible)),
        }
    }
}

/// Glitch-bound elements with observable class state and jitter.
pub struct FakeGlitchSurface {
    pub modes: RefCell<Vec<Mode>>,
    pub jitters: RefCell<Vec<Option<(i32, i32)>>>,
    pub toggles: Cell<usize>,
}

impl FakeGlitchSurface {
    pub fn new(count: usize) -> Rc<Self> {
        Rc::new(Self {
            modes: RefCell::new(vec![Mode::Design; count]),
            jitters: RefCell::new(vec![None; count]),
            toggles: Cell::new(0),
        })
    }

    pub fn mode_at(&self, index: usize) -> Mode {
        self.modes.borrow()[index]
    }

    pub fn jitter_at(&self, index: usize) -> Option<(i32, i32)> {
        self.jitters.borrow()[index]
    }
}

impl GlitchSurface for FakeGlitchSurface {
    fn len(&self) -> usize {
        self.modes.borrow().len()
    }

    fn mode_of(&self, index: usize) -> Mode {
        self.modes.borrow()[index]
    }

    fn set_mode(&self, index: usize, mode: Mode) {
        self.modes.borrow_mut()[index] = mode;
        self.toggles.set(self.toggles.get() + 1);
    }

    fn set_jitter(&self, index: usize, dx: i32, dy: i32) {
        self.jitters.borrow_mut()[index] = Some((dx, dy));
    }

    fn clear_jitter(&self, index: usize) {
        self.jitters.borrow_mut()[index] = None;
    }
}
