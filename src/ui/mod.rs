pub mod panels;
pub mod plot;
pub mod shapes;

use eframe::egui::Color32;

/// Convert a colour-scale sample to an egui colour.
pub fn color32([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Readable text colour on top of `fill`.
pub fn text_on([r, g, b]: [u8; 3]) -> Color32 {
    let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    if luma < 140.0 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}
