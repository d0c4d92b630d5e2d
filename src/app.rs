use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlElement, MouseEvent, Window};

use kakera_core::{Mode, ModeSwitch, Tilt, TiltUpdate};

use crate::pieces::PieceMaker;

const RESIZE_DEBOUNCE_MS: u32 = 10;

/// Wires the DOM events into the choreography. Pointer samples are coalesced
/// to one tilt update per animation frame; resizes are debounced before the
/// grid relayouts.
pub(crate) struct App {
    window: Window,
    switcher: Rc<ModeSwitch>,
    tilt: Rc<Tilt>,
    maker: Rc<PieceMaker>,
    pointer: Cell<Option<(f64, f64)>>,
    frame: RefCell<Option<AnimationFrame>>,
    resize_timer: RefCell<Option<Timeout>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl App {
    pub(crate) fn new(
        window: Window,
        switcher: Rc<ModeSwitch>,
        tilt: Rc<Tilt>,
        maker: Rc<PieceMaker>,
    ) -> Rc<Self> {
        Rc::new(Self {
            window,
            switcher,
            tilt,
            maker,
            pointer: Cell::new(None),
            frame: RefCell::new(None),
            resize_timer: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub(crate) fn install_listeners(
        self: &Rc<Self>,
        document: &Document,
        switch_ctrls: &HtmlElement,
        switch_design: &HtmlElement,
        switch_code: &HtmlElement,
        contact: &HtmlElement,
    ) {
        let mut listeners = Vec::new();

        let app = Rc::clone(self);
        listeners.push(EventListener::new(
            document,
            "mousemove",
            move |event: &Event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                app.pointer
                    .set(Some((event.client_x() as f64, event.client_y() as f64)));
                app.queue_tilt_frame();
            },
        ));

        let app = Rc::clone(self);
        listeners.push(EventListener::new(&self.window, "resize", move |_| {
            let inner = Rc::clone(&app);
            let timer = Timeout::new(RESIZE_DEBOUNCE_MS, move || {
                let (width, height) = inner.viewport();
                inner.tilt.set_viewport(width, height);
                inner.maker.relayout();
            });
            *app.resize_timer.borrow_mut() = Some(timer);
        }));

        for (ctrl, mode) in [(switch_design, Mode::Design), (switch_code, Mode::Code)] {
            let switcher = Rc::clone(&self.switcher);
            listeners.push(EventListener::new(ctrl, "click", move |event: &Event| {
                event.prevent_default();
                switcher.switch_to(mode);
            }));
        }

        let switcher = Rc::clone(&self.switcher);
        listeners.push(EventListener::new(switch_ctrls, "mouseenter", move |_| {
            switcher.on_switch_hover(true);
        }));
        let switcher = Rc::clone(&self.switcher);
        listeners.push(EventListener::new(switch_ctrls, "mouseleave", move |_| {
            switcher.on_switch_hover(false);
        }));

        let switcher = Rc::clone(&self.switcher);
        listeners.push(EventListener::new(contact, "mouseenter", move |_| {
            switcher.on_contact_enter();
        }));
        let switcher = Rc::clone(&self.switcher);
        listeners.push(EventListener::new(contact, "mouseleave", move |_| {
            switcher.on_contact_leave();
        }));

        *self.listeners.borrow_mut() = listeners;
    }

    fn viewport(&self) -> (f64, f64) {
        let width = self
            .window
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        (width, height)
    }

    fn queue_tilt_frame(self: &Rc<Self>) {
        if self.frame.borrow().is_some() {
            return;
        }
        let app = Rc::clone(self);
        let handle = request_animation_frame(move |_| {
            app.frame.borrow_mut().take();
            let Some((x, y)) = app.pointer.get() else {
                return;
            };
            match app.tilt.update_for(x, y) {
                TiltUpdate::Apply(transform) => app.maker.set_container_transform(&transform),
                TiltUpdate::Clear => app.maker.set_container_transform("none"),
                TiltUpdate::Skip => {}
            }
        });
        *self.frame.borrow_mut() = Some(handle);
    }
}
