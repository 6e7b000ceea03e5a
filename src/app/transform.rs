use eframe::egui::{Pos2, Rect, Vec2, pos2};

pub const MIN_SCALE: f32 = 0.2;
pub const MAX_SCALE: f32 = 4.0;
pub const ZOOM_IN_FACTOR: f32 = 1.3;
pub const ZOOM_OUT_FACTOR: f32 = 0.7;
/// Margin added around the node bounding box when fitting.
pub const FIT_MARGIN: f32 = 50.0;
const FIT_MAX_SCALE: f32 = 2.0;
const FIT_SHRINK: f32 = 0.9;

/// Pan/zoom mapping from layout space to viewport space:
/// `screen = translate + world * scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn apply(&self, world: Pos2) -> Pos2 {
        (world.to_vec2() * self.scale + self.translate).to_pos2()
    }

    pub fn invert(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.translate) / self.scale).to_pos2()
    }

    /// Multiplies the scale by `factor`, keeping the world point under
    /// `anchor` fixed on screen.
    pub fn scale_about(&mut self, anchor: Pos2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let world = self.invert(anchor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.translate = anchor.to_vec2() - world.to_vec2() * self.scale;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.translate += delta;
    }

    pub fn zoom_in(&mut self, viewport: Vec2) {
        self.scale_about(viewport_center(viewport), ZOOM_IN_FACTOR);
    }

    pub fn zoom_out(&mut self, viewport: Vec2) {
        self.scale_about(viewport_center(viewport), ZOOM_OUT_FACTOR);
    }

    /// Transform that shows `bounds` (plus margin) centred in `viewport`.
    /// Returns `None` for an unmeasured viewport or empty bounds.
    pub fn fit(bounds: Rect, viewport: Vec2) -> Option<Self> {
        if !bounds.is_finite() || bounds.is_negative() || viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }

        let box_width = bounds.width() + FIT_MARGIN * 2.0;
        let box_height = bounds.height() + FIT_MARGIN * 2.0;
        let scale = ((viewport.x / box_width).min(viewport.y / box_height).min(FIT_MAX_SCALE)
            * FIT_SHRINK)
            .clamp(MIN_SCALE, MAX_SCALE);

        Some(Self {
            translate: viewport_center(viewport).to_vec2() - bounds.center().to_vec2() * scale,
            scale,
        })
    }
}

fn viewport_center(viewport: Vec2) -> Pos2 {
    pos2(viewport.x * 0.5, viewport.y * 0.5)
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    fn assert_close(actual: Pos2, expected: Pos2) {
        assert!(
            actual.distance(expected) < 1e-3,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn apply_and_invert_agree() {
        let transform = ViewTransform {
            translate: vec2(30.0, -12.0),
            scale: 1.7,
        };
        let world = pos2(123.0, 45.0);
        assert_close(transform.invert(transform.apply(world)), world);
    }

    #[test]
    fn zoom_steps_keep_the_viewport_centre_fixed() {
        let viewport = vec2(800.0, 600.0);
        let center = pos2(400.0, 300.0);

        let mut transform = ViewTransform::IDENTITY;
        transform.zoom_in(viewport);
        assert!((transform.scale - 1.3).abs() < 1e-6);
        assert_close(transform.apply(center), center);

        transform.zoom_out(viewport);
        assert!((transform.scale - 0.91).abs() < 1e-6);
        assert_close(transform.apply(center), center);
    }

    #[test]
    fn scale_is_clamped() {
        let viewport = vec2(800.0, 600.0);
        let mut transform = ViewTransform::IDENTITY;
        for _ in 0..20 {
            transform.zoom_in(viewport);
        }
        assert_eq!(transform.scale, MAX_SCALE);
        for _ in 0..40 {
            transform.zoom_out(viewport);
        }
        assert_eq!(transform.scale, MIN_SCALE);
    }

    #[test]
    fn fit_centres_bounds_with_margin() {
        let bounds = Rect::from_min_max(pos2(100.0, 100.0), pos2(300.0, 200.0));
        let viewport = vec2(800.0, 600.0);
        let transform = ViewTransform::fit(bounds, viewport).expect("fit");

        // 300x200 box with margin: min(800/300, 600/200, 2) * 0.9
        assert!((transform.scale - 1.8).abs() < 1e-5);
        assert_close(transform.apply(bounds.center()), pos2(400.0, 300.0));
    }

    #[test]
    fn fit_of_a_single_point_uses_the_margin_box() {
        let point = pos2(40.0, 70.0);
        let bounds = Rect::from_min_max(point, point);
        let transform = ViewTransform::fit(bounds, vec2(1000.0, 1000.0)).expect("fit");
        assert!((transform.scale - 1.8).abs() < 1e-5);
        assert_close(transform.apply(point), pos2(500.0, 500.0));
    }

    #[test]
    fn fit_rejects_unmeasured_viewport() {
        let bounds = Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 10.0));
        assert_eq!(ViewTransform::fit(bounds, vec2(0.0, 600.0)), None);
        assert_eq!(ViewTransform::fit(Rect::NOTHING, vec2(800.0, 600.0)), None);
    }
}
