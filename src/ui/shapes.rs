//! Charts drawn directly with the egui painter: the country tile map, the
//! season sunburst and the faceted composition heatmap.

use std::collections::BTreeSet;
use std::f32::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2, pos2, vec2};
use serde_json::Value;

use hotel_dash::chart::ChartSpec;
use hotel_dash::chart::spec::{field_f64, field_text};

use super::{color32, text_on};

const EMPTY_CELL: Color32 = Color32::from_gray(60);

fn rate_text(row: &Value, field: &str) -> String {
    field_f64(row, field)
        .map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_default()
}

/// Tooltip listing every labelled field of a row.
fn hover_text(spec: &ChartSpec, row: &Value) -> String {
    spec.labels
        .iter()
        .filter_map(|(field, label)| {
            let value = match row.get(field)? {
                Value::Number(n) if n.is_f64() => format!("{:.2}", n.as_f64()?),
                _ => field_text(row, field)?,
            };
            Some(format!("{label}: {value}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Country tile map
// ---------------------------------------------------------------------------

/// One tile per country, largest booking volume first, coloured by rate.
pub fn tile_map(ui: &mut Ui, spec: &ChartSpec, height: f32) {
    let loc_field = spec.dimensions.x.as_deref().unwrap_or("country");
    let color_field = spec.dimensions.color.as_deref().unwrap_or_default();

    let mut rows: Vec<&Value> = spec.data.iter().collect();
    rows.sort_by(|a, b| {
        let ka = field_f64(a, "total_bookings").unwrap_or(0.0);
        let kb = field_f64(b, "total_bookings").unwrap_or(0.0);
        kb.total_cmp(&ka)
    });

    let tile = vec2(58.0, 38.0);
    let gap = 4.0;
    let width = ui.available_width().max(tile.x);
    let per_row = ((width + gap) / (tile.x + gap)).floor().max(1.0) as usize;
    let n_rows = rows.len().div_ceil(per_row);
    let needed = n_rows as f32 * (tile.y + gap);

    egui::ScrollArea::vertical()
        .id_salt("tile_map")
        .max_height(height)
        .show(ui, |ui: &mut Ui| {
            let (response, painter) = ui.allocate_painter(vec2(width, needed), Sense::hover());
            let origin = response.rect.min;
            let mut hovered = None;

            for (i, row) in rows.iter().enumerate() {
                let (r, c) = (i / per_row, i % per_row);
                let min = origin + vec2(c as f32 * (tile.x + gap), r as f32 * (tile.y + gap));
                let rect = Rect::from_min_size(min, tile);
                let fill = spec.color_of(row);

                painter.rect_filled(rect, 3.0, color32(fill));
                let code = field_text(row, loc_field).unwrap_or_default();
                painter.text(
                    rect.center() - vec2(0.0, 7.0),
                    Align2::CENTER_CENTER,
                    code,
                    FontId::proportional(13.0),
                    text_on(fill),
                );
                painter.text(
                    rect.center() + vec2(0.0, 8.0),
                    Align2::CENTER_CENTER,
                    rate_text(row, color_field),
                    FontId::proportional(10.0),
                    text_on(fill),
                );

                if response.hover_pos().is_some_and(|p| rect.contains(p)) {
                    hovered = Some(*row);
                }
            }

            if let Some(row) = hovered {
                response.on_hover_text(hover_text(spec, row));
            }
        });
}

// ---------------------------------------------------------------------------
// Sunburst
// ---------------------------------------------------------------------------

/// A ring segment: `[a0, a1)` radians between two radii.
struct Segment<'a> {
    label: String,
    a0: f32,
    a1: f32,
    r0: f32,
    r1: f32,
    fill: [u8; 3],
    row: Option<&'a Value>,
}

impl Segment<'_> {
    fn contains(&self, center: Pos2, p: Pos2) -> bool {
        let d = p - center;
        let r = d.length();
        let mut a = d.y.atan2(d.x) + TAU / 4.0;
        if a < 0.0 {
            a += TAU;
        }
        r >= self.r0 && r < self.r1 && a >= self.a0 && a < self.a1
    }
}

/// Point at angle `a` (clockwise from 12 o'clock) and radius `r`.
fn polar(center: Pos2, r: f32, a: f32) -> Pos2 {
    let a = a - TAU / 4.0;
    pos2(center.x + r * a.cos(), center.y + r * a.sin())
}

fn paint_segment(painter: &egui::Painter, center: Pos2, seg: &Segment<'_>) {
    let steps = (((seg.a1 - seg.a0) / 0.04).ceil() as usize).max(2);
    let step = (seg.a1 - seg.a0) / steps as f32;
    let fill = color32(seg.fill);
    for i in 0..steps {
        let a = seg.a0 + step * i as f32;
        let b = a + step;
        let quad = vec![
            polar(center, seg.r0, a),
            polar(center, seg.r1, a),
            polar(center, seg.r1, b),
            polar(center, seg.r0, b),
        ];
        painter.add(Shape::convex_polygon(quad, fill, Stroke::NONE));
    }
    let edge = Stroke::new(1.0, Color32::WHITE);
    painter.line_segment([polar(center, seg.r0, seg.a0), polar(center, seg.r1, seg.a0)], edge);

    let mid = polar(center, (seg.r0 + seg.r1) / 2.0, (seg.a0 + seg.a1) / 2.0);
    painter.text(mid, Align2::CENTER_CENTER, &seg.label, FontId::proportional(11.0), text_on(seg.fill));
}

/// Two-ring sunburst along `dimensions.path`. Every leaf row gets an equal
/// share of the circle; rows stay in the order given.
pub fn sunburst(ui: &mut Ui, spec: &ChartSpec, height: f32) {
    let [parent_field, leaf_field] = match spec.dimensions.path.as_slice() {
        [p, l] => [p.as_str(), l.as_str()],
        _ => return,
    };
    let color_field = spec.dimensions.color.as_deref().unwrap_or_default();
    let domain = spec.color_domain().unwrap_or((0.0, 1.0));

    let size = vec2(ui.available_width(), height);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let center = response.rect.center();
    let radius = size.x.min(size.y) / 2.0 - 4.0;
    let (r_hole, r_mid) = (radius * 0.15, radius * 0.55);

    let share = TAU / spec.data.len() as f32;
    let mut segments = Vec::new();

    // Parents span runs of consecutive leaves with the same label.
    let mut parents: Vec<(String, usize, usize, Vec<f64>)> = Vec::new();

    for (i, row) in spec.data.iter().enumerate() {
        let a0 = share * i as f32;
        let p_label = field_text(row, parent_field).unwrap_or_default();
        let rate = field_f64(row, color_field).unwrap_or(0.0);

        match parents.last_mut() {
            Some((label, _, end, rates)) if *label == p_label => {
                *end = i + 1;
                rates.push(rate);
            }
            Some(_) | None => parents.push((p_label, i, i + 1, vec![rate])),
        }

        segments.push(Segment {
            label: field_text(row, leaf_field).unwrap_or_default(),
            a0,
            a1: a0 + share,
            r0: r_mid,
            r1: radius,
            fill: spec.color_of(row),
            row: Some(row),
        });
    }

    for (label, start, end, rates) in parents {
        let mean = rates.iter().sum::<f64>() / rates.len().max(1) as f64;
        segments.push(Segment {
            label,
            a0: share * start as f32,
            a1: share * end as f32,
            r0: r_hole,
            r1: r_mid,
            fill: spec.color_scale.sample_in(mean, domain),
            row: None,
        });
    }

    for seg in &segments {
        paint_segment(&painter, center, seg);
    }

    let hovered = response
        .hover_pos()
        .and_then(|p| segments.iter().find(|s| s.contains(center, p)));
    if let Some(seg) = hovered {
        let text = match seg.row {
            Some(row) => hover_text(spec, row),
            None => format!("{}: {}", spec.label(parent_field), seg.label),
        };
        response.on_hover_text(text);
    }
}

// ---------------------------------------------------------------------------
// Faceted heatmap
// ---------------------------------------------------------------------------

/// One `x` by `y` grid per facet value, sharing axes across facets.
pub fn heatmap(ui: &mut Ui, spec: &ChartSpec, height: f32) {
    let x_field = spec.dimensions.x.as_deref().unwrap_or_default();
    let y_field = spec.dimensions.y.as_deref().unwrap_or_default();
    let z_field = spec.dimensions.z.as_deref().unwrap_or_default();
    let facet_field = spec.dimensions.facet.as_deref().unwrap_or_default();

    let values = |field: &str| -> Vec<i64> {
        let set: BTreeSet<i64> = spec
            .data
            .iter()
            .filter_map(|row| row.get(field)?.as_i64())
            .collect();
        set.into_iter().collect()
    };
    let xs = values(x_field);
    let ys = values(y_field);
    let facets = values(facet_field);
    if xs.is_empty() || ys.is_empty() {
        return;
    }

    let z_domain = spec
        .data
        .iter()
        .filter_map(|row| field_f64(row, z_field))
        .fold(None, |acc: Option<(f64, f64)>, v| {
            Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
        })
        .unwrap_or((0.0, 1.0));

    let size = vec2(ui.available_width(), height);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let area = response.rect;

    let margin = Vec2::new(26.0, 34.0);
    let n_facets = facets.len().max(1) as f32;
    let facet_w = area.width() / n_facets;
    let cell = vec2(
        ((facet_w - margin.x - 8.0) / xs.len() as f32).max(4.0),
        ((area.height() - margin.y - 18.0) / ys.len() as f32).max(4.0),
    );
    let label_color = ui.visuals().text_color();
    let mut hovered = None;

    for (fi, &facet) in facets.iter().enumerate() {
        let left = area.left() + fi as f32 * facet_w + margin.x;
        let top = area.top() + 18.0;
        painter.text(
            pos2(left + cell.x * xs.len() as f32 / 2.0, area.top() + 2.0),
            Align2::CENTER_TOP,
            format!("{}={facet}", spec.label(facet_field)),
            FontId::proportional(12.0),
            label_color,
        );

        for (xi, &x) in xs.iter().enumerate() {
            for (yi, &y) in ys.iter().enumerate() {
                // Children grow upwards.
                let min = pos2(
                    left + xi as f32 * cell.x,
                    top + (ys.len() - 1 - yi) as f32 * cell.y,
                );
                let rect = Rect::from_min_size(min, cell).shrink(0.5);
                let row = spec.data.iter().find(|row| {
                    row.get(x_field).and_then(Value::as_i64) == Some(x)
                        && row.get(y_field).and_then(Value::as_i64) == Some(y)
                        && row.get(facet_field).and_then(Value::as_i64) == Some(facet)
                });
                let fill = match row.and_then(|r| field_f64(r, z_field)) {
                    Some(z) => color32(spec.color_scale.sample_in(z, z_domain)),
                    None => EMPTY_CELL,
                };
                painter.rect_filled(rect, 0.0, fill);

                if let Some(row) = row {
                    if response.hover_pos().is_some_and(|p| rect.contains(p)) {
                        hovered = Some(row);
                    }
                }
            }
        }

        for (xi, &x) in xs.iter().enumerate() {
            painter.text(
                pos2(left + (xi as f32 + 0.5) * cell.x, top + ys.len() as f32 * cell.y + 2.0),
                Align2::CENTER_TOP,
                x.to_string(),
                FontId::proportional(10.0),
                label_color,
            );
        }
        for (yi, &y) in ys.iter().enumerate() {
            painter.text(
                pos2(left - 4.0, top + (ys.len() - 1 - yi) as f32 * cell.y + cell.y / 2.0),
                Align2::RIGHT_CENTER,
                y.to_string(),
                FontId::proportional(10.0),
                label_color,
            );
        }
    }

    painter.text(
        pos2(area.center().x, area.bottom() - 2.0),
        Align2::CENTER_BOTTOM,
        spec.label(x_field),
        FontId::proportional(11.0),
        label_color,
    );

    if let Some(row) = hovered {
        response.on_hover_text(hover_text(spec, row));
    }
}
