use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use kakera_core::{GridLayout, PieceOptions, PieceSet};

use crate::app_builder::BootError;
use crate::stage::{clear_style, set_style};

/// Builds the piece grid inside the container and keeps it sized to the
/// container box. The container's inline background image is the source the
/// pieces slice up; the container itself then shows the dimmed code-mode
/// variant behind them.
pub(crate) struct PieceMaker {
    container: HtmlElement,
    options: PieceOptions,
    pieces: Vec<HtmlElement>,
}

impl PieceMaker {
    pub(crate) fn build(
        document: &Document,
        container: HtmlElement,
        options: PieceOptions,
        set: &PieceSet,
    ) -> Result<Self, BootError> {
        let raw = container
            .style()
            .get_property_value("background-image")
            .unwrap_or_default();
        let imgsrc = strip_url(&raw);
        if imgsrc.is_empty() {
            return Err(BootError::MissingBackdrop);
        }

        if let Some(code) = container.get_attribute("data-img-code") {
            set_style(&container, "background-image", &code);
        }

        let mut pieces = Vec::with_capacity(set.len());
        for index in 0..set.len() {
            let piece = document
                .create_element("div")
                .ok()
                .and_then(|element| element.dyn_into::<HtmlElement>().ok())
                .ok_or(BootError::MissingElement("piece"))?;
            piece.set_class_name("piece");
            set_style(&piece, "background-image", &format!("url({imgsrc})"));
            set_style(
                &piece,
                "background-position",
                &GridLayout::background_position(set.row_of(index), set.column_of(index)),
            );
            let _ = container.append_child(&piece);
            pieces.push(piece);
        }

        let maker = Self {
            container,
            options,
            pieces,
        };
        let layout = GridLayout::compute(
            &maker.options,
            maker.container.offset_width() as f64,
            maker.container.offset_height() as f64,
        );
        maker.apply_layout(layout);
        Ok(maker)
    }

    fn apply_layout(&self, layout: GridLayout) {
        let size = layout.background_size();
        for piece in &self.pieces {
            set_style(piece, "width", &format!("{}px", layout.piece_width));
            set_style(piece, "height", &format!("{}px", layout.piece_height));
            set_style(piece, "background-size", &size);
        }
        set_style(
            &self.container,
            "width",
            &format!("{}px", layout.container_width()),
        );
        set_style(
            &self.container,
            "height",
            &format!("{}px", layout.container_height()),
        );
    }

    /// Clears the snapped container size, measures the fresh box and resizes
    /// the pieces. Piece identity and delays are untouched.
    pub(crate) fn relayout(&self) {
        clear_style(&self.container, "width");
        clear_style(&self.container, "height");
        let rect = self.container.get_bounding_client_rect();
        let layout = GridLayout::compute(&self.options, rect.width(), rect.height());
        self.apply_layout(layout);
    }

    pub(crate) fn pieces(&self) -> &[HtmlElement] {
        &self.pieces
    }

    pub(crate) fn enable_tilt_transition(&self) {
        set_style(&self.container, "transition", "transform 0.2s ease-out");
    }

    pub(crate) fn set_container_transform(&self, transform: &str) {
        set_style(&self.container, "transform", transform);
    }
}

fn strip_url(raw: &str) -> String {
    raw.trim()
        .trim_start_matches("url(")
        .trim_end_matches(')')
        .trim_matches('"')
        .trim_matches('\'')
        .to_string()
}
