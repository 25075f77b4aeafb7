//! Zoom and pan geometry for the current slide image.
//!
//! The image is transformed with `translate(tx, ty) scale(s)` and a
//! transform origin at its own top-left corner. Before zoom the element
//! occupies `(base_offset, base_size)` in client coordinates; afterwards its
//! top-left sits at `base_offset + t` and it spans `base_size * s`.
//! Panning keeps the scaled content covering the original base box.

/// Axis-aligned rectangle in client (CSS pixel) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self { scale: 1.0, translate_x: 0.0, translate_y: 0.0 };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// CSS `transform` value; identity renders as `none`.
    pub fn to_css(&self) -> String {
        if self.is_identity() {
            return "none".to_string();
        }
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

/// 1:1 pixel zoom around a pointer position.
///
/// `scale = natural_width / image_rect.width`, floored at 1 so a slide that
/// is already shown at (or above) native size does not shrink. The
/// translation keeps the image point under the pointer where it was:
/// `t = p - p * scale` with `p` the pointer offset inside the image.
/// The result is unclamped.
pub fn compute_zoom_transform(
    pointer_x: f64,
    pointer_y: f64,
    image_rect: Rect,
    natural_width: f64,
) -> ZoomTransform {
    if image_rect.is_empty() || natural_width <= 0.0 {
        return ZoomTransform::IDENTITY;
    }
    let scale = (natural_width / image_rect.width).max(1.0);
    let px = pointer_x - image_rect.left;
    let py = pointer_y - image_rect.top;
    ZoomTransform {
        scale,
        translate_x: px - px * scale,
        translate_y: py - py * scale,
    }
}

/// Clamp one axis of a pan translation.
///
/// Content larger than the frame may move within `[base - scaled, 0]`.
/// Content that fits is centred, whatever was proposed.
pub fn clamp_axis(proposed: f64, base: f64, scaled: f64) -> f64 {
    if scaled > base {
        proposed.clamp(base - scaled, 0.0)
    } else {
        (base - scaled) / 2.0
    }
}

pub fn clamp_pan(
    proposed_x: f64,
    proposed_y: f64,
    base_width: f64,
    base_height: f64,
    scaled_width: f64,
    scaled_height: f64,
) -> (f64, f64) {
    (
        clamp_axis(proposed_x, base_width, scaled_width),
        clamp_axis(proposed_y, base_height, scaled_height),
    )
}

/// Measured layout the pan limits are derived from. Taken fresh at every
/// zoom start and pan start; layout may have shifted in between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometrySnapshot {
    pub container: Rect,
    pub base_width: f64,
    pub base_height: f64,
    pub base_offset_x: f64,
    pub base_offset_y: f64,
    pub scaled_width: f64,
    pub scaled_height: f64,
}

impl GeometrySnapshot {
    /// Snapshot from an untransformed image rect (zoom start).
    pub fn at_zoom_start(container: Rect, image_rect: Rect, scale: f64) -> Self {
        Self {
            container,
            base_width: image_rect.width,
            base_height: image_rect.height,
            base_offset_x: image_rect.left,
            base_offset_y: image_rect.top,
            scaled_width: image_rect.width * scale,
            scaled_height: image_rect.height * scale,
        }
    }

    /// Snapshot at pan start from a fresh measurement of the image's layout
    /// box. `base_rect` must exclude the zoom transform: a rendered rect taken
    /// while the zoom animation is still running would shrink the pan range.
    pub fn at_pan_start(container: Rect, base_rect: Rect, current: &ZoomTransform) -> Self {
        let scale = if current.scale > 0.0 { current.scale } else { 1.0 };
        Self::at_zoom_start(container, base_rect, scale)
    }

    pub fn clamp(&self, proposed_x: f64, proposed_y: f64) -> (f64, f64) {
        clamp_pan(
            proposed_x,
            proposed_y,
            self.base_width,
            self.base_height,
            self.scaled_width,
            self.scaled_height,
        )
    }

    /// Client position of an untransformed image-local point under `t`.
    pub fn to_client(&self, t: &ZoomTransform, local_x: f64, local_y: f64) -> (f64, f64) {
        (
            self.base_offset_x + t.translate_x + local_x * t.scale,
            self.base_offset_y + t.translate_y + local_y * t.scale,
        )
    }
}
