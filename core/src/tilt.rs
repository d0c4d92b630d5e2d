use std::cell::Cell;

use crate::config::TiltOptions;

/// What the pointer handler should do with the container transform.
#[derive(Clone, Debug, PartialEq)]
pub enum TiltUpdate {
    Apply(String),
    /// 3D transforms are unreliable here; force the identity transform.
    Clear,
    Skip,
}

/// Pointer-driven 3D tilt of the grid container. Rotation and translation
/// scale linearly with the cursor position normalized by the viewport, so the
/// effect is centered when the cursor is centered.
pub struct Tilt {
    options: TiltOptions,
    enabled: Cell<bool>,
    buggy_3d: bool,
    viewport: Cell<(f64, f64)>,
}

impl Tilt {
    pub fn new(options: TiltOptions, buggy_3d: bool, viewport: (f64, f64)) -> Self {
        Self {
            options,
            enabled: Cell::new(false),
            buggy_3d,
            viewport: Cell::new(viewport),
        }
    }

    /// No-op on buggy-3D platforms; tilt stays force-disabled there.
    pub fn enable(&self) {
        if self.buggy_3d {
            return;
        }
        self.enabled.set(true);
    }

    pub fn disable(&self) {
        self.enabled.set(false);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Refreshed from the resize handler, not per pointer event.
    pub fn set_viewport(&self, width: f64, height: f64) {
        self.viewport.set((width, height));
    }

    pub fn update_for(&self, x: f64, y: f64) -> TiltUpdate {
        if !self.enabled.get() {
            return if self.buggy_3d {
                TiltUpdate::Clear
            } else {
                TiltUpdate::Skip
            };
        }
        let (win_w, win_h) = self.viewport.get();
        if win_w <= 0.0 || win_h <= 0.0 {
            return TiltUpdate::Skip;
        }
        let o = &self.options;
        let rot_x = 2.0 * o.max_rotation_x / win_h * y - o.max_rotation_x;
        let rot_y = 2.0 * o.max_rotation_y / win_w * x - o.max_rotation_y;
        let trans_x = 2.0 * o.max_translation_x / win_w * x - o.max_translation_x;
        let trans_y = 2.0 * o.max_translation_y / win_h * y - o.max_translation_y;
        TiltUpdate::Apply(format!(
            "perspective(1000px) translate3d({trans_x}px,{trans_y}px,0) \
             rotate3d(1,0,0,{rot_x}deg) rotate3d(0,1,0,{rot_y}deg)"
        ))
    }
}
