use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::animation::{Mode, Scheduler, TimeoutGuard};
use crate::config::GlitchOptions;
use crate::random::RandomSource;

/// The elements the glitch cycle flickers. Each one carries a binary mode
/// class plus an optional jitter translation.
pub trait GlitchSurface {
    fn len(&self) -> usize;
    fn mode_of(&self, index: usize) -> Mode;
    fn set_mode(&self, index: usize, mode: Mode);
    fn set_jitter(&self, index: usize, dx: i32, dy: i32);
    fn clear_jitter(&self, index: usize);
}

const JITTER_RANGE: (i32, i32) = (-5, 5);

#[derive(Default)]
struct GlitchTimers {
    cycle: Option<TimeoutGuard>,
    state: Option<TimeoutGuard>,
}

/// Self-rescheduling randomized flicker: an outer timer starts a cycle, an
/// inner timer runs a fixed number of class/transform toggles, then the
/// cycle re-arms itself. Two nested random intervals keep the flicker
/// non-periodic.
///
/// Liveness is double-checked before every reschedule: timer guards are
/// dropped on `stop()`, and each in-flight callback carries the generation it
/// was scheduled under, so a stale callback can never revive a stopped cycle.
pub struct GlitchFx {
    options: GlitchOptions,
    surface: Rc<dyn GlitchSurface>,
    scheduler: Rc<dyn Scheduler>,
    random: Rc<dyn RandomSource>,
    active: Cell<bool>,
    iteration: Cell<u32>,
    generation: Cell<u64>,
    timers: RefCell<GlitchTimers>,
}

impl GlitchFx {
    pub fn new(
        options: GlitchOptions,
        surface: Rc<dyn GlitchSurface>,
        scheduler: Rc<dyn Scheduler>,
        random: Rc<dyn RandomSource>,
    ) -> Rc<Self> {
        Rc::new(Self {
            options,
            surface,
            scheduler,
            random,
            active: Cell::new(false),
            iteration: Cell::new(0),
            generation: Cell::new(0),
            timers: RefCell::new(GlitchTimers::default()),
        })
    }

    pub fn is_inactive(&self) -> bool {
        !self.active.get()
    }

    /// Arms the cycle-start timer. Safe to call repeatedly: pending timers
    /// are replaced, never doubled.
    pub fn start(self: &Rc<Self>) {
        self.active.set(true);
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        let delay = self.random.int_in(
            self.options.start_min_ms as i32,
            self.options.start_max_ms as i32,
        ) as u32;
        let fx = Rc::clone(self);
        let guard = self.scheduler.schedule(
            delay,
            Box::new(move || {
                if !fx.live(generation) {
                    return;
                }
                fx.iteration.set(0);
                fx.schedule_iteration(generation);
            }),
        );
        let mut timers = self.timers.borrow_mut();
        timers.cycle = Some(guard);
        timers.state = None;
    }

    /// Halts both timers and restores the default visual state. Idempotent.
    pub fn stop(&self) {
        self.active.set(false);
        self.generation.set(self.generation.get().wrapping_add(1));
        {
            let mut timers = self.timers.borrow_mut();
            timers.cycle = None;
            timers.state = None;
        }
        for index in 0..self.surface.len() {
            if self.surface.mode_of(index) == Mode::Code {
                self.surface.set_mode(index, Mode::Design);
                self.surface.clear_jitter(index);
            }
        }
    }

    fn live(&self, generation: u64) -> bool {
        self.active.get() && self.generation.get() == generation
    }

    fn schedule_iteration(self: &Rc<Self>, generation: u64) {
        if self.iteration.get() >= self.options.total_iterations {
            // Cycle complete; loop while still active.
            if self.active.get() {
                self.start();
            }
            return;
        }
        let delay = self.random.int_in(
            self.options.state_min_ms as i32,
            self.options.state_max_ms as i32,
        ) as u32;
        let fx = Rc::clone(self);
        let guard = self.scheduler.schedule(
            delay,
            Box::new(move || {
                if !fx.live(generation) {
                    return;
                }
                fx.apply_iteration();
                if fx.active.get() {
                    fx.schedule_iteration(generation);
                }
            }),
        );
        self.timers.borrow_mut().state = Some(guard);
    }

    fn apply_iteration(&self) {
        let jitter = self.iteration.get() % 2 == 0;
        for index in 0..self.surface.len() {
            self.surface
                .set_mode(index, self.surface.mode_of(index).other());
            if jitter {
                self.surface.set_jitter(
                    index,
                    self.random.pick(JITTER_RANGE),
                    self.random.pick(JITTER_RANGE),
                );
            } else {
                self.surface.clear_jitter(index);
            }
        }
        self.iteration.set(self.iteration.get() + 1);
    }
}
