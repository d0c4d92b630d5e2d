use std::cell::Cell;
use std::rc::Rc;

use crate::animation::{
    AnimationEngine, AnimationRequest, CompleteFn, Easing, Mode, Property, Stage, TargetId, Track,
    TrackValue,
};
use crate::glitch::GlitchFx;
use crate::piece_fx::{PieceFx, RevealDirection, SweepDirection};
use crate::tilt::Tilt;

const OVERLAY_FADE_MS: u32 = 800;

const LETTER_FADE_MS: u32 = 50;
const LETTER_STAGGER_MS: u32 = 50;

const ELEMENT_FADE_MS: u32 = 400;
const ELEMENT_HIDDEN_SCALE: f64 = 0.3;

const MENU_ITEM_HIDE_MS: u32 = 100;
const MENU_ITEM_SHOW_MS: u32 = 600;
const MENU_ITEM_STAGGER_MS: u32 = 100;
const MENU_ITEM_LIFT_PCT: f64 = -75.0;

const CODE_LETTER_IN_STAGGER_MS: u32 = 30;
const CODE_LETTER_OUT_MS: u32 = 20;
const CODE_LETTER_OUT_STAGGER_MS: u32 = 10;

#[derive(Clone, Copy, PartialEq, Eq)]
enum LetterFade {
    In,
    Out,
}

/// Letter-span counts for the satellite elements, collected by the page
/// bootstrap after the text has been split.
#[derive(Clone, Debug, Default)]
pub struct ContentMap {
    pub title_letters: usize,
    pub contact_letters: usize,
    /// Design-mode menu links.
    pub menu_items: usize,
    /// Letters per code-mode menu item.
    pub menu_code_letters: Vec<usize>,
}

impl ContentMap {
    fn title(&self) -> Vec<TargetId> {
        (0..self.title_letters).map(TargetId::TitleLetter).collect()
    }

    fn contact(&self) -> Vec<TargetId> {
        (0..self.contact_letters)
            .map(TargetId::ContactLetter)
            .collect()
    }

    fn menu_items(&self) -> Vec<TargetId> {
        (0..self.menu_items).map(TargetId::MenuItem).collect()
    }

    fn code_letters(&self) -> Vec<TargetId> {
        self.menu_code_letters
            .iter()
            .enumerate()
            .flat_map(|(item, &count)| {
                (0..count).map(move |letter| TargetId::MenuCodeLetter(item, letter))
            })
            .collect()
    }

    fn letters_of(&self, target: TargetId) -> Option<Vec<TargetId>> {
        match target {
            TargetId::Title if self.title_letters > 0 => Some(self.title()),
            TargetId::Contact if self.contact_letters > 0 => Some(self.contact()),
            _ => None,
        }
    }
}

/// Top-level mode state machine. Owns the current mode, the re-entrancy
/// lock, and the sequencing of pieces, tilt, glitch and the satellite
/// letter choreography during a transition.
///
/// The lock clears in the sweep's completion callback; the overlay fade and
/// the content switch run concurrently and are not joined, matching the
/// page's observed behavior.
pub struct ModeSwitch {
    engine: Rc<dyn AnimationEngine>,
    stage: Rc<dyn Stage>,
    pieces: Rc<PieceFx>,
    glitch: Rc<GlitchFx>,
    tilt: Rc<Tilt>,
    content: ContentMap,
    mode: Cell<Mode>,
    is_animating: Cell<bool>,
    disable_page_fx: Cell<bool>,
}

impl ModeSwitch {
    pub fn new(
        engine: Rc<dyn AnimationEngine>,
        stage: Rc<dyn Stage>,
        pieces: Rc<PieceFx>,
        glitch: Rc<GlitchFx>,
        tilt: Rc<Tilt>,
        content: ContentMap,
    ) -> Rc<Self> {
        Rc::new(Self {
            engine,
            stage,
            pieces,
            glitch,
            tilt,
            content,
            mode: Cell::new(Mode::Design),
            is_animating: Cell::new(false),
            disable_page_fx: Cell::new(false),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating.get()
    }

    pub fn page_fx_disabled(&self) -> bool {
        self.disable_page_fx.get()
    }

    /// Runs the full transition. Silently dropped while another transition
    /// is in flight.
    pub fn switch_to(self: &Rc<Self>, mode: Mode) {
        if self.is_animating.get() {
            return;
        }
        self.is_animating.set(true);
        self.mode.set(mode);

        self.fade_overlay(mode);

        if mode == Mode::Code {
            // Pre-emptive: hover handlers must not race the transition.
            self.disable_page_fx.set(true);
            self.tilt.disable();
            self.pieces.stop_loop();
            self.glitch.stop();
        }

        self.stage.set_switch_mode(mode);

        match mode {
            Mode::Code => self.enter_code(),
            Mode::Design => self.enter_design(),
        }

        let direction = match mode {
            Mode::Code => SweepDirection::Out,
            Mode::Design => SweepDirection::In,
        };
        let this = Rc::clone(self);
        self.pieces.animate_pieces(
            direction,
            Box::new(move || {
                this.is_animating.set(false);
                if this.mode.get() == Mode::Design {
                    this.tilt.enable();
                    this.pieces.start_loop();
                    this.glitch.start();
                    this.disable_page_fx.set(false);
                }
            }),
        );
    }

    /// Pauses the ambient effects (shimmer, glitch, tilt).
    pub fn pause_page_fx(&self) {
        self.pieces.stop_loop();
        self.glitch.stop();
        self.tilt.disable();
    }

    /// Resumes the ambient effects; a glitch cycle already running keeps its
    /// current timers.
    pub fn play_page_fx(&self) {
        self.pieces.start_loop();
        if self.glitch.is_inactive() {
            self.glitch.start();
        }
        self.tilt.enable();
    }

    /// Hover on the mode-switch controls pauses/resumes the ambient
    /// effects, unless a transition is running or has disabled them.
    pub fn on_switch_hover(&self, entered: bool) {
        if self.disable_page_fx.get() || self.is_animating.get() {
            return;
        }
        if entered {
            self.pause_page_fx();
        } else {
            self.play_page_fx();
        }
    }

    pub fn on_contact_enter(&self) {
        if self.is_animating.get() {
            return;
        }
        if self.mode.get() == Mode::Design {
            self.pause_page_fx();
        }
        self.pieces.fx_custom(self.reveal_direction());
    }

    pub fn on_contact_leave(self: &Rc<Self>) {
        if self.is_animating.get() || !self.pieces.custom_triggered() {
            return;
        }
        let this = Rc::clone(self);
        self.pieces.fx_custom_reset(
            self.reveal_direction(),
            Box::new(move || {
                if !this.disable_page_fx.get() {
                    this.play_page_fx();
                }
            }),
        );
    }

    fn reveal_direction(&self) -> RevealDirection {
        match self.mode.get() {
            Mode::Design => RevealDirection::Left,
            Mode::Code => RevealDirection::Right,
        }
    }

    fn fade_overlay(&self, mode: Mode) {
        let targets = vec![TargetId::Overlay];
        self.engine.cancel(&targets);
        let opacity = match mode {
            Mode::Code => 1.0,
            Mode::Design => 0.0,
        };
        self.engine.animate(
            AnimationRequest {
                targets,
                duration_ms: OVERLAY_FADE_MS,
                easing: Easing::Linear,
                delays_ms: vec![0],
                tracks: vec![Track {
                    property: Property::Opacity,
                    values: vec![TrackValue::To(opacity)],
                    duration_ms: None,
                    easing: None,
                }],
            },
            None,
        );
    }

    // Entering code: each satellite element scales/fades away, swaps its
    // mode class in the completion and comes straight back with its code
    // content; the design menu collapses and the code menu types itself in.
    fn enter_code(self: &Rc<Self>) {
        for target in [TargetId::Title, TargetId::Contact, TargetId::MenuCtrl] {
            let this = Rc::clone(self);
            self.hide_element(target, Box::new(move || this.show_code(target)));
        }

        let items = self.content.menu_items();
        let delays = (0..items.len())
            .map(|i| i as u32 * MENU_ITEM_STAGGER_MS)
            .collect();
        let this = Rc::clone(self);
        self.animate_menu_items(
            items,
            delays,
            MENU_ITEM_HIDE_MS,
            Easing::InQuad,
            TrackValue::To(MENU_ITEM_LIFT_PCT),
            TrackValue::To(0.0),
            Some(Box::new(move || {
                this.stage.set_menu_visible(Mode::Design, false);
                this.stage.set_menu_visible(Mode::Code, true);
                let letters = this.content.code_letters();
                let delays = (0..letters.len())
                    .map(|i| i as u32 * CODE_LETTER_IN_STAGGER_MS)
                    .collect();
                this.fade_letters(
                    letters,
                    LetterFade::In,
                    delays,
                    LETTER_FADE_MS,
                    Easing::InQuint,
                    None,
                );
            })),
        );
    }

    // Entering design: letters fade out back-to-front, the completion swaps
    // the class and scales the element back up; the menus swap visibility
    // once the code letters are gone.
    fn enter_design(self: &Rc<Self>) {
        for (target, letters) in [
            (TargetId::Title, self.content.title()),
            (TargetId::Contact, self.content.contact()),
        ] {
            let count = letters.len();
            let delays = (0..count)
                .map(|i| (count - 1 - i) as u32 * LETTER_STAGGER_MS)
                .collect();
            let this = Rc::clone(self);
            self.fade_letters(
                letters,
                LetterFade::Out,
                delays,
                LETTER_FADE_MS,
                Easing::OutQuint,
                Some(Box::new(move || this.show_design(target))),
            );
        }

        self.stage.set_opacity(TargetId::MenuCtrl, 0.0);
        self.show_design(TargetId::MenuCtrl);

        let letters = self.content.code_letters();
        let count = letters.len();
        let delays = (0..count)
            .map(|i| (count - 1 - i) as u32 * CODE_LETTER_OUT_STAGGER_MS)
            .collect();
        let this = Rc::clone(self);
        self.fade_letters(
            letters,
            LetterFade::Out,
            delays,
            CODE_LETTER_OUT_MS,
            Easing::OutQuint,
            Some(Box::new(move || {
                this.stage.set_menu_visible(Mode::Code, false);
                this.stage.set_menu_visible(Mode::Design, true);
                let items = this.content.menu_items();
                let count = items.len();
                let delays = (0..count)
                    .map(|i| (count - 1 - i) as u32 * MENU_ITEM_STAGGER_MS)
                    .collect();
                this.animate_menu_items(
                    items,
                    delays,
                    MENU_ITEM_SHOW_MS,
                    Easing::OutExpo,
                    TrackValue::FromTo(MENU_ITEM_LIFT_PCT, 0.0),
                    TrackValue::FromTo(0.0, 1.0),
                    None,
                );
            })),
        );
    }

    fn hide_element(&self, target: TargetId, on_complete: CompleteFn) {
        let targets = vec![target];
        self.engine.cancel(&targets);
        self.engine.animate(
            AnimationRequest {
                delays_ms: vec![0; targets.len()],
                targets,
                duration_ms: ELEMENT_FADE_MS,
                easing: Easing::InQuint,
                tracks: vec![
                    Track {
                        property: Property::Scale,
                        values: vec![TrackValue::To(ELEMENT_HIDDEN_SCALE)],
                        duration_ms: None,
                        easing: None,
                    },
                    Track {
                        property: Property::Opacity,
                        values: vec![TrackValue::To(0.0)],
                        duration_ms: None,
                        easing: Some(Easing::Linear),
                    },
                ],
            },
            Some(on_complete),
        );
    }

    fn show_code(self: &Rc<Self>, target: TargetId) {
        self.stage.set_mode_class(target, Mode::Code);
        match self.content.letters_of(target) {
            Some(letters) => {
                self.stage.set_opacity(target, 1.0);
                self.stage.clear_transform(target);
                let delays = (0..letters.len())
                    .map(|i| i as u32 * LETTER_STAGGER_MS)
                    .collect();
                self.fade_letters(
                    letters,
                    LetterFade::In,
                    delays,
                    LETTER_FADE_MS,
                    Easing::InQuint,
                    None,
                );
            }
            None => {
                self.stage.set_opacity(target, 1.0);
                self.stage.clear_transform(target);
            }
        }
    }

    fn show_design(&self, target: TargetId) {
        self.stage.set_mode_class(target, Mode::Design);
        if let Some(letters) = self.content.letters_of(target) {
            for letter in letters {
                self.stage.set_opacity(letter, 1.0);
            }
        }
        let targets = vec![target];
        self.engine.cancel(&targets);
        self.engine.animate(
            AnimationRequest {
                delays_ms: vec![0; targets.len()],
                targets,
                duration_ms: ELEMENT_FADE_MS,
                easing: Easing::OutQuint,
                tracks: vec![
                    Track {
                        property: Property::Scale,
                        values: vec![TrackValue::FromTo(ELEMENT_HIDDEN_SCALE, 1.0)],
                        duration_ms: None,
                        easing: None,
                    },
                    Track {
                        property: Property::Opacity,
                        values: vec![TrackValue::FromTo(0.0, 1.0)],
                        duration_ms: None,
                        easing: Some(Easing::Linear),
                    },
                ],
            },
            None,
        );
    }

    fn fade_letters(
        &self,
        targets: Vec<TargetId>,
        fade: LetterFade,
        delays_ms: Vec<u32>,
        duration_ms: u32,
        easing: Easing,
        on_complete: Option<CompleteFn>,
    ) {
        if targets.is_empty() {
            if let Some(on_complete) = on_complete {
                on_complete();
            }
            return;
        }
        self.engine.cancel(&targets);
        let value = match fade {
            LetterFade::In => TrackValue::FromTo(0.0, 1.0),
            LetterFade::Out => TrackValue::FromTo(1.0, 0.0),
        };
        let values = vec![value; targets.len()];
        self.engine.animate(
            AnimationRequest {
                duration_ms,
                easing,
                delays_ms,
                tracks: vec![Track {
                    property: Property::Opacity,
                    values,
                    duration_ms: None,
                    easing: None,
                }],
                targets,
            },
            on_complete,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn animate_menu_items(
        &self,
        targets: Vec<TargetId>,
        delays_ms: Vec<u32>,
        duration_ms: u32,
        easing: Easing,
        lift: TrackValue,
        opacity: TrackValue,
        on_complete: Option<CompleteFn>,
    ) {
        if targets.is_empty() {
            if let Some(on_complete) = on_complete {
                on_complete();
            }
            return;
        }
        self.engine.cancel(&targets);
        let count = targets.len();
        self.engine.animate(
            AnimationRequest {
                duration_ms,
                easing,
                delays_ms,
                tracks: vec![
                    Track {
                        property: Property::TranslateYPercent,
                        values: vec![lift; count],
                        duration_ms: None,
                        easing: None,
                    },
                    Track {
                        property: Property::Opacity,
                        values: vec![opacity; count],
                        duration_ms: None,
                        easing: Some(Easing::Linear),
                    },
                ],
                targets,
            },
            on_complete,
        );
    }
}
