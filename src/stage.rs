use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use web_sys::HtmlElement;

use kakera_core::{GlitchSurface, Mode, Stage, TargetId};

pub(crate) fn set_style(element: &HtmlElement, property: &str, value: &str) {
    let _ = element.style().set_property(property, value);
}

pub(crate) fn clear_style(element: &HtmlElement, property: &str) {
    let _ = element.style().remove_property(property);
}

fn mode_class(mode: Mode) -> &'static str {
    match mode {
        Mode::Design => "mode--design",
        Mode::Code => "mode--code",
    }
}

fn swap_mode_class(element: &HtmlElement, mode: Mode) {
    let classes = element.class_list();
    let _ = classes.remove_1(mode_class(mode.other()));
    let _ = classes.add_1(mode_class(mode));
}

/// Resolves animation targets to their DOM elements. Built once at boot;
/// the letter spans are pre-split in the markup.
pub(crate) struct TargetMap {
    pub pieces: Vec<HtmlElement>,
    pub overlay: HtmlElement,
    pub title: HtmlElement,
    pub contact: HtmlElement,
    pub menu_ctrl: HtmlElement,
    pub title_letters: Vec<HtmlElement>,
    pub contact_letters: Vec<HtmlElement>,
    pub menu_items: Vec<HtmlElement>,
    pub menu_code_letters: Vec<Vec<HtmlElement>>,
}

impl TargetMap {
    pub(crate) fn get(&self, target: TargetId) -> Option<&HtmlElement> {
        match target {
            TargetId::Piece(index) => self.pieces.get(index),
            TargetId::Overlay => Some(&self.overlay),
            TargetId::Title => Some(&self.title),
            TargetId::Contact => Some(&self.contact),
            TargetId::MenuCtrl => Some(&self.menu_ctrl),
            TargetId::TitleLetter(index) => self.title_letters.get(index),
            TargetId::ContactLetter(index) => self.contact_letters.get(index),
            TargetId::MenuItem(index) => self.menu_items.get(index),
            TargetId::MenuCodeLetter(item, letter) => self
                .menu_code_letters
                .get(item)
                .and_then(|letters| letters.get(letter)),
        }
    }
}

/// Transform components of one target. Translation and scale tracks can run
/// on the same element, so the full `transform` string is recomposed on
/// every write.
#[derive(Clone, Copy)]
pub(crate) struct TransformParts {
    pub x_px: f64,
    pub y_px: f64,
    pub y_pct: f64,
    pub scale: f64,
}

impl Default for TransformParts {
    fn default() -> Self {
        Self {
            x_px: 0.0,
            y_px: 0.0,
            y_pct: 0.0,
            scale: 1.0,
        }
    }
}

impl TransformParts {
    pub(crate) fn css(&self) -> String {
        format!(
            "translate({}px,{}px) translateY({}%) scale({})",
            self.x_px, self.y_px, self.y_pct, self.scale
        )
    }
}

#[derive(Default)]
pub(crate) struct Transforms {
    parts: RefCell<HashMap<TargetId, TransformParts>>,
}

impl Transforms {
    pub(crate) fn update(
        &self,
        target: TargetId,
        apply: impl FnOnce(&mut TransformParts),
    ) -> String {
        let mut parts = self.parts.borrow_mut();
        let entry = parts.entry(target).or_default();
        apply(entry);
        entry.css()
    }

    pub(crate) fn clear(&self, target: TargetId) {
        self.parts.borrow_mut().remove(&target);
    }
}

/// The DOM side of the instant style pokes: backdrop swaps, forced
/// opacities, class state on the satellite elements and the menus.
pub(crate) struct DomStage {
    targets: Rc<TargetMap>,
    transforms: Rc<Transforms>,
    container: HtmlElement,
    switch_ctrls: HtmlElement,
    switch_design: HtmlElement,
    switch_code: HtmlElement,
    menu_design: HtmlElement,
    menu_code: HtmlElement,
    glitch_elements: Vec<HtmlElement>,
}

impl DomStage {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        targets: Rc<TargetMap>,
        transforms: Rc<Transforms>,
        container: HtmlElement,
        switch_ctrls: HtmlElement,
        switch_design: HtmlElement,
        switch_code: HtmlElement,
        menu_design: HtmlElement,
        menu_code: HtmlElement,
        glitch_elements: Vec<HtmlElement>,
    ) -> Rc<Self> {
        Rc::new(Self {
            targets,
            transforms,
            container,
            switch_ctrls,
            switch_design,
            switch_code,
            menu_design,
            menu_code,
            glitch_elements,
        })
    }
}

impl Stage for DomStage {
    fn set_backdrop_alt(&self, alt: bool) {
        let attr = if alt { "data-img-alt" } else { "data-img-code" };
        if let Some(image) = self.container.get_attribute(attr) {
            set_style(&self.container, "background-image", &image);
        }
    }

    fn set_opacity(&self, target: TargetId, value: f64) {
        if let Some(element) = self.targets.get(target) {
            set_style(element, "opacity", &value.to_string());
        }
    }

    fn clear_transform(&self, target: TargetId) {
        self.transforms.clear(target);
        if let Some(element) = self.targets.get(target) {
            set_style(element, "transform", "none");
        }
    }

    fn set_mode_class(&self, target: TargetId, mode: Mode) {
        if let Some(element) = self.targets.get(target) {
            swap_mode_class(element, mode);
        }
    }

    fn set_switch_mode(&self, mode: Mode) {
        swap_mode_class(&self.switch_ctrls, mode);
        let (current, other) = match mode {
            Mode::Design => (&self.switch_design, &self.switch_code),
            Mode::Code => (&self.switch_code, &self.switch_design),
        };
        let _ = other.class_list().remove_1("switch__item--current");
        let _ = current.class_list().add_1("switch__item--current");
    }

    fn set_menu_visible(&self, mode: Mode, visible: bool) {
        let wrapper = match mode {
            Mode::Design => &self.menu_design,
            Mode::Code => &self.menu_code,
        };
        set_style(wrapper, "display", if visible { "block" } else { "none" });
    }
}

impl GlitchSurface for DomStage {
    fn len(&self) -> usize {
        self.glitch_elements.len()
    }

    fn mode_of(&self, index: usize) -> Mode {
        match self.glitch_elements.get(index) {
            Some(element) if element.class_list().contains("mode--code") => Mode::Code,
            _ => Mode::Design,
        }
    }

    fn set_mode(&self, index: usize, mode: Mode) {
        if let Some(element) = self.glitch_elements.get(index) {
            swap_mode_class(element, mode);
        }
    }

    fn set_jitter(&self, index: usize, dx: i32, dy: i32) {
        if let Some(element) = self.glitch_elements.get(index) {
            set_style(element, "transform", &format!("translate({dx}px,{dy}px)"));
        }
    }

    fn clear_jitter(&self, index: usize) {
        if let Some(element) = self.glitch_elements.get(index) {
            set_style(element, "transform", "none");
        }
    }
}
