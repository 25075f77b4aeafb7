use crate::geometry::ZoomTransform;

/// Mutable state of an open viewer. Owned by the controller; the gesture
/// classifier only reads it.
///
/// When `is_zoomed` is false the transform is always the identity.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub current_index: usize,
    pub is_zoomed: bool,
    pub is_panning: bool,
    /// Set by any pan movement; a release after movement is not a tap.
    pub has_panned: bool,
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::opened_at(0)
    }
}

impl SessionState {
    pub fn opened_at(index: usize) -> Self {
        Self {
            current_index: index,
            is_zoomed: false,
            is_panning: false,
            has_panned: false,
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }

    pub fn transform(&self) -> ZoomTransform {
        ZoomTransform {
            scale: self.scale,
            translate_x: self.translate_x,
            translate_y: self.translate_y,
        }
    }

    pub fn zoom_to(&mut self, t: ZoomTransform) {
        self.is_zoomed = true;
        self.scale = t.scale;
        self.translate_x = t.translate_x;
        self.translate_y = t.translate_y;
    }

    pub fn reset_zoom(&mut self) {
        self.is_zoomed = false;
        self.is_panning = false;
        self.has_panned = false;
        self.scale = 1.0;
        self.translate_x = 0.0;
        self.translate_y = 0.0;
    }
}
