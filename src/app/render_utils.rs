use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, vec2};

use crate::concept::{Category, RelationKind};

use super::transform::ViewTransform;

/// Opacity of edges not touching the hovered node.
pub(super) const DIMMED_EDGE_OPACITY: f32 = 0.1;

pub(super) fn category_color(category: Category) -> Color32 {
    match category {
        Category::Persona => Color32::from_rgb(168, 120, 245),
        Category::Task => Color32::from_rgb(79, 156, 249),
        Category::Constraints => Color32::from_rgb(240, 98, 98),
        Category::Context => Color32::from_rgb(72, 199, 142),
        Category::Output => Color32::from_rgb(246, 178, 72),
        Category::Examples => Color32::from_rgb(236, 110, 182),
        Category::Metadata => Color32::from_rgb(140, 150, 165),
    }
}

pub(super) fn relation_color(kind: RelationKind) -> Color32 {
    match kind {
        RelationKind::Influences => Color32::from_rgb(120, 160, 210),
        RelationKind::Requires => Color32::from_rgb(108, 208, 160),
        RelationKind::Conflicts => Color32::from_rgb(236, 104, 104),
    }
}

pub(super) fn relation_opacity(kind: RelationKind) -> f32 {
    match kind {
        RelationKind::Influences => 0.6,
        RelationKind::Requires => 0.8,
        RelationKind::Conflicts => 0.7,
    }
}

pub(super) fn relation_style_name(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Influences => "solid",
        RelationKind::Requires => "dashed",
        RelationKind::Conflicts => "dotted",
    }
}

pub(super) fn edge_width(strength: f32) -> f32 {
    (strength * 3.0).max(1.5)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Draws a relationship as a straight segment in its type's line style,
/// with a small arrowhead stopping at the target's rim.
pub(super) fn paint_edge(
    painter: &Painter,
    start: Pos2,
    end: Pos2,
    target_radius: f32,
    kind: RelationKind,
    stroke: Stroke,
) {
    let delta = end - start;
    let length = delta.length();
    if length <= target_radius {
        return;
    }
    let direction = delta / length;
    let tip = end - direction * target_radius;

    match kind {
        RelationKind::Influences => {
            painter.line_segment([start, tip], stroke);
        }
        RelationKind::Requires => {
            painter.extend(Shape::dashed_line(&[start, tip], stroke, 8.0, 4.0));
        }
        RelationKind::Conflicts => {
            painter.extend(Shape::dotted_line(
                &[start, tip],
                stroke.color,
                stroke.width * 2.0,
                stroke.width * 0.6,
            ));
        }
    }

    let head = 4.0 + stroke.width * 2.0;
    let normal = vec2(-direction.y, direction.x);
    let base = tip - direction * head;
    painter.add(Shape::convex_polygon(
        vec![tip, base + normal * head * 0.5, base - normal * head * 0.5],
        stroke.color,
        Stroke::NONE,
    ));
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: ViewTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (48.0 * transform.scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + transform.translate;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Layout space to absolute screen space inside `rect`.
pub(super) fn to_screen(rect: Rect, transform: ViewTransform, world: Pos2) -> Pos2 {
    rect.min + transform.apply(world).to_vec2()
}

/// Absolute screen position to the viewport space the scene works in.
pub(super) fn to_viewport(rect: Rect, screen: Pos2) -> Pos2 {
    (screen - rect.min).to_pos2()
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn edge_width_has_a_floor() {
        assert_eq!(edge_width(0.1), 1.5);
        assert_eq!(edge_width(1.0), 3.0);
    }

    #[test]
    fn screen_and_viewport_space_differ_by_rect_origin() {
        let rect = Rect::from_min_max(pos2(200.0, 40.0), pos2(1000.0, 640.0));
        let transform = ViewTransform {
            translate: vec2(10.0, 20.0),
            scale: 2.0,
        };
        let screen = to_screen(rect, transform, pos2(5.0, 5.0));
        assert_eq!(screen, pos2(220.0, 70.0));
        assert_eq!(to_viewport(rect, screen), pos2(20.0, 30.0));
    }

    #[test]
    fn relation_kinds_have_distinct_styles() {
        let styles = RelationKind::ALL.map(relation_style_name);
        assert_eq!(styles, ["solid", "dashed", "dotted"]);
    }
}
