use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use skill_constellation::engine::Category;

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

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Fill color per category; level buckets share a grey ramp.
pub(super) fn category_color(category: Category) -> Color32 {
    match category {
        Category::Frontend => Color32::from_rgb(97, 175, 239),
        Category::Backend => Color32::from_rgb(152, 195, 121),
        Category::Database => Color32::from_rgb(229, 192, 123),
        Category::DevOps => Color32::from_rgb(224, 108, 117),
        Category::Mobile => Color32::from_rgb(198, 120, 221),
        Category::DataAi => Color32::from_rgb(86, 182, 194),
        Category::Design => Color32::from_rgb(240, 150, 190),
        Category::Advanced => Color32::from_gray(210),
        Category::Intermediate => Color32::from_gray(165),
        Category::Beginner => Color32::from_gray(120),
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 50));
    let origin = rect.center() + pan;

    for ring in 1..=4 {
        painter.circle_stroke(origin, ring as f32 * 125.0 * zoom, stroke);
    }
    painter.line_segment(
        [Pos2::new(origin.x, rect.top()), Pos2::new(origin.x, rect.bottom())],
        stroke,
    );
    painter.line_segment(
        [Pos2::new(rect.left(), origin.y), Pos2::new(rect.right(), origin.y)],
        stroke,
    );
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}
