use std::cell::RefCell;
use std::rc::Rc;

use gloo::console;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, NodeList, Window};

use kakera_core::{
    AnimationEngine, ContentMap, GlitchFx, GlitchSurface, ModeSwitch, Options, PieceFx, PieceSet,
    RandomSource, Stage, Tilt,
};

use crate::app::App;
use crate::engine::{CssEngine, GlooScheduler, MathRandom};
use crate::pieces::PieceMaker;
use crate::stage::{DomStage, TargetMap, Transforms};

#[derive(Debug, Error)]
pub(crate) enum BootError {
    #[error("window unavailable")]
    NoWindow,
    #[error("missing element: {0}")]
    MissingElement(&'static str),
    #[error("grid container has no inline background image")]
    MissingBackdrop,
    #[error("invalid data-config: {0}")]
    BadConfig(#[from] serde_json::Error),
}

thread_local! {
    static APP: RefCell<Option<Rc<App>>> = RefCell::new(None);
}

pub(crate) fn start() {
    if let Err(error) = boot() {
        console::error!(format!("boot failed: {error}"));
    }
}

fn query(document: &Document, selector: &'static str) -> Result<HtmlElement, BootError> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        .ok_or(BootError::MissingElement(selector))
}

fn collect(list: Result<NodeList, JsValue>) -> Vec<HtmlElement> {
    let mut out = Vec::new();
    if let Ok(list) = list {
        for index in 0..list.length() {
            if let Some(element) = list
                .get(index)
                .and_then(|node| node.dyn_into::<HtmlElement>().ok())
            {
                out.push(element);
            }
        }
    }
    out
}

fn child_ctrl(parent: &HtmlElement, first: bool) -> Result<HtmlElement, BootError> {
    let child = if first {
        parent.first_element_child()
    } else {
        parent.last_element_child()
    };
    child
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        .ok_or(BootError::MissingElement(".switch children"))
}

fn parse_options(container: &HtmlElement) -> Result<Options, BootError> {
    match container.get_attribute("data-config") {
        Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
        _ => Ok(Options::default()),
    }
}

/// 3D transforms glitch on Firefox here; tilt is forced off there.
fn is_3d_buggy(window: &Window) -> bool {
    window
        .navigator()
        .user_agent()
        .map(|agent| agent.contains("Firefox"))
        .unwrap_or(false)
}

fn boot() -> Result<(), BootError> {
    let window = web_sys::window().ok_or(BootError::NoWindow)?;
    let document = window.document().ok_or(BootError::NoWindow)?;

    let container = query(&document, ".pieces")?;
    let options = parse_options(&container)?;
    let buggy_3d = is_3d_buggy(&window);

    let random: Rc<dyn RandomSource> = Rc::new(MathRandom);
    let piece_set = Rc::new(PieceSet::build(&options.pieces, &*random));
    let maker = Rc::new(PieceMaker::build(
        &document,
        container.clone(),
        options.pieces,
        &piece_set,
    )?);

    let switch_ctrls = query(&document, ".switch")?;
    let switch_design = child_ctrl(&switch_ctrls, true)?;
    let switch_code = child_ctrl(&switch_ctrls, false)?;
    let glitch_elements = collect(document.query_selector_all("[data-glitch]"));
    let contact = query(&document, ".contact-link")?;
    let title = query(&document, ".title > .title__inner")?;
    let menu_ctrl = query(&document, ".btn--menu")?;
    let menu_design = query(&document, ".menu")?;
    let menu_code = query(&document, ".menu--code")?;
    let overlay = query(&document, ".overlay")?;

    let title_letters = collect(title.query_selector_all("span"));
    let contact_letters = collect(contact.query_selector_all("span"));
    let menu_items = collect(menu_design.query_selector_all(".menu__inner a"));
    let menu_code_items = collect(menu_code.query_selector_all(".menu__inner a"));
    let menu_code_letters: Vec<Vec<HtmlElement>> = menu_code_items
        .iter()
        .map(|item| collect(item.query_selector_all("span")))
        .collect();

    let content = ContentMap {
        title_letters: title_letters.len(),
        contact_letters: contact_letters.len(),
        menu_items: menu_items.len(),
        menu_code_letters: menu_code_letters.iter().map(Vec::len).collect(),
    };

    let targets = Rc::new(TargetMap {
        pieces: maker.pieces().to_vec(),
        overlay,
        title,
        contact: contact.clone(),
        menu_ctrl,
        title_letters,
        contact_letters,
        menu_items,
        menu_code_letters,
    });
    let transforms = Rc::new(Transforms::default());
    let stage = DomStage::new(
        Rc::clone(&targets),
        Rc::clone(&transforms),
        container,
        switch_ctrls.clone(),
        switch_design.clone(),
        switch_code.clone(),
        menu_design,
        menu_code,
        glitch_elements,
    );

    let engine: Rc<dyn AnimationEngine> = CssEngine::new(window.clone(), targets, transforms);
    let scheduler = Rc::new(GlooScheduler);

    let viewport = (
        window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
        window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
    );
    let tilt = Rc::new(Tilt::new(options.tilt, buggy_3d, viewport));

    let pieces_fx = PieceFx::new(
        Rc::clone(&piece_set),
        Rc::clone(&engine),
        Rc::clone(&stage) as Rc<dyn Stage>,
        Rc::clone(&random),
    );
    let glitch = GlitchFx::new(
        options.glitch,
        Rc::clone(&stage) as Rc<dyn GlitchSurface>,
        scheduler,
        Rc::clone(&random),
    );
    let switcher = ModeSwitch::new(
        Rc::clone(&engine),
        Rc::clone(&stage) as Rc<dyn Stage>,
        Rc::clone(&pieces_fx),
        Rc::clone(&glitch),
        Rc::clone(&tilt),
        content,
    );

    let app = App::new(window, switcher, Rc::clone(&tilt), Rc::clone(&maker));
    app.install_listeners(
        &document,
        &switch_ctrls,
        &switch_design,
        &switch_code,
        &contact,
    );

    // Design-mode boot: ambient effects on, loading veil off.
    if !buggy_3d {
        maker.enable_tilt_transition();
    }
    tilt.enable();
    pieces_fx.start_loop();
    glitch.start();
    if let Ok(Some(loading)) = document.query_selector(".loading") {
        let _ = loading.class_list().add_1("loading--hide");
    }

    APP.with(|slot| {
        *slot.borrow_mut() = Some(app);
    });
    Ok(())
}
