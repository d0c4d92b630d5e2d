use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use web_sys::HtmlElement;

use kakera_core::{
    AnimationEngine, AnimationRequest, CompleteFn, Easing, Property, RandomSource, Scheduler,
    TargetId, TimeoutGuard, TrackValue,
};

use crate::stage::{set_style, TargetMap, Transforms};

pub(crate) struct GlooScheduler;

impl Scheduler for GlooScheduler {
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimeoutGuard {
        TimeoutGuard::new(Timeout::new(delay_ms, callback))
    }
}

pub(crate) struct MathRandom;

impl RandomSource for MathRandom {
    fn unit(&self) -> f64 {
        js_sys::Math::random()
    }
}

fn css_property(property: Property) -> &'static str {
    match property {
        Property::Opacity => "opacity",
        Property::TranslateX
        | Property::TranslateY
        | Property::TranslateYPercent
        | Property::Scale => "transform",
    }
}

fn css_easing(easing: Easing) -> String {
    match easing {
        Easing::Linear => "linear".to_string(),
        Easing::Bezier(a, b, c, d) => format!("cubic-bezier({a},{b},{c},{d})"),
        Easing::InQuad => "cubic-bezier(0.55,0.085,0.68,0.53)".to_string(),
        Easing::InQuint => "cubic-bezier(0.755,0.05,0.855,0.06)".to_string(),
        Easing::OutQuint => "cubic-bezier(0.23,1,0.32,1)".to_string(),
        Easing::OutExpo => "cubic-bezier(0.19,1,0.22,1)".to_string(),
    }
}

fn write_value(
    transforms: &Transforms,
    element: &HtmlElement,
    target: TargetId,
    property: Property,
    value: f64,
) {
    match property {
        Property::Opacity => set_style(element, "opacity", &value.to_string()),
        Property::TranslateX => {
            let css = transforms.update(target, |parts| parts.x_px = value);
            set_style(element, "transform", &css);
        }
        Property::TranslateY => {
            let css = transforms.update(target, |parts| parts.y_px = value);
            set_style(element, "transform", &css);
        }
        Property::TranslateYPercent => {
            let css = transforms.update(target, |parts| parts.y_pct = value);
            set_style(element, "transform", &css);
        }
        Property::Scale => {
            let css = transforms.update(target, |parts| parts.scale = value);
            set_style(element, "transform", &css);
        }
    }
}

/// One in-flight request. Dropping the timers cancels the pending keyframes
/// and the completion.
struct Run {
    targets: Vec<TargetId>,
    timers: RefCell<Vec<Timeout>>,
    completion: RefCell<Option<Timeout>>,
    done: Rc<Cell<bool>>,
}

/// Executes animation requests through CSS transitions. `FromTo` values are
/// committed with transitions off, the element is reflowed, then the
/// transition arms and the end values land. `Steps` schedules run on one
/// timer per keyframe. A single timer at the latest per-target end time
/// fires the completion.
pub(crate) struct CssEngine {
    window: web_sys::Window,
    targets: Rc<TargetMap>,
    transforms: Rc<Transforms>,
    runs: RefCell<Vec<Rc<Run>>>,
}

impl CssEngine {
    pub(crate) fn new(
        window: web_sys::Window,
        targets: Rc<TargetMap>,
        transforms: Rc<Transforms>,
    ) -> Rc<Self> {
        Rc::new(Self {
            window,
            targets,
            transforms,
            runs: RefCell::new(Vec::new()),
        })
    }

    fn apply_to_target(
        &self,
        element: &HtmlElement,
        target: TargetId,
        request: &AnimationRequest,
        index: usize,
        delay_ms: u32,
        run: &Run,
    ) -> u32 {
        // Commit explicit start values before the transition arms.
        set_style(element, "transition", "none");
        for track in &request.tracks {
            if let Some(TrackValue::FromTo(from, _)) = track.values.get(index) {
                write_value(&self.transforms, element, target, track.property, *from);
            }
        }
        let _ = element.offset_width();

        let mut transitions: Vec<String> = Vec::new();
        let mut ends: Vec<(Property, f64)> = Vec::new();
        let mut end_ms = 0u32;
        for track in &request.tracks {
            let value = match track.values.get(index) {
                Some(TrackValue::To(value)) => *value,
                Some(TrackValue::FromTo(_, value)) => *value,
                _ => continue,
            };
            let duration = track.duration_ms.unwrap_or(request.duration_ms);
            let easing = track.easing.unwrap_or(request.easing);
            let name = css_property(track.property);
            if !transitions.iter().any(|entry| entry.starts_with(name)) {
                transitions.push(format!(
                    "{name} {duration}ms {} {delay_ms}ms",
                    css_easing(easing)
                ));
            }
            end_ms = end_ms.max(delay_ms + duration);
            ends.push((track.property, value));
        }
        if !transitions.is_empty() {
            set_style(element, "transition", &transitions.join(", "));
            for (property, value) in ends {
                write_value(&self.transforms, element, target, property, value);
            }
        }

        for track in &request.tracks {
            let Some(TrackValue::Steps(steps)) = track.values.get(index) else {
                continue;
            };
            let duration = track.duration_ms.unwrap_or(request.duration_ms);
            let easing = track.easing.unwrap_or(request.easing);
            let transition = format!("{} {duration}ms {}", css_property(track.property), css_easing(easing));
            let mut at = delay_ms;
            for step in steps {
                at = at.saturating_add(step.delay_ms);
                let element = element.clone();
                let transforms = Rc::clone(&self.transforms);
                let transition = transition.clone();
                let property = track.property;
                let value = step.value;
                let timer = Timeout::new(at, move || {
                    set_style(&element, "transition", &transition);
                    write_value(&transforms, &element, target, property, value);
                });
                run.timers.borrow_mut().push(timer);
                at = at.saturating_add(duration);
            }
            end_ms = end_ms.max(at);
        }

        end_ms
    }

    /// Pin the interrupted values before stripping the transition, so the
    /// element does not snap to its animation end state.
    fn freeze(&self, element: &HtmlElement) {
        if let Ok(Some(style)) = self.window.get_computed_style(element) {
            if let Ok(opacity) = style.get_property_value("opacity") {
                set_style(element, "opacity", &opacity);
            }
            if let Ok(transform) = style.get_property_value("transform") {
                set_style(element, "transform", &transform);
            }
        }
        set_style(element, "transition", "none");
    }
}

impl AnimationEngine for CssEngine {
    fn animate(&self, request: AnimationRequest, on_complete: Option<CompleteFn>) {
        self.runs.borrow_mut().retain(|run| !run.done.get());

        let run = Rc::new(Run {
            targets: request.targets.clone(),
            timers: RefCell::new(Vec::new()),
            completion: RefCell::new(None),
            done: Rc::new(Cell::new(false)),
        });

        let mut end_ms = 0u32;
        for (index, target) in request.targets.iter().enumerate() {
            let Some(element) = self.targets.get(*target) else {
                continue;
            };
            let delay = request.delays_ms.get(index).copied().unwrap_or(0);
            let element = element.clone();
            end_ms = end_ms.max(self.apply_to_target(&element, *target, &request, index, delay, &run));
        }

        let done = Rc::clone(&run.done);
        let timer = Timeout::new(end_ms, move || {
            done.set(true);
            if let Some(on_complete) = on_complete {
                on_complete();
            }
        });
        *run.completion.borrow_mut() = Some(timer);
        self.runs.borrow_mut().push(run);
    }

    fn cancel(&self, targets: &[TargetId]) {
        let mut cancelled = Vec::new();
        self.runs.borrow_mut().retain(|run| {
            if run.done.get() {
                return false;
            }
            if run.targets.iter().any(|target| targets.contains(target)) {
                cancelled.push(Rc::clone(run));
                return false;
            }
            true
        });
        for run in cancelled {
            run.timers.borrow_mut().clear();
            run.completion.borrow_mut().take();
            for target in &run.targets {
                if !targets.contains(target) {
                    continue;
                }
                if let Some(element) = self.targets.get(*target) {
                    self.freeze(element);
                }
            }
        }
    }
}
