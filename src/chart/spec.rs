use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::color::ColorScale;

/// Which view of the dashboard a spec feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    Country,
    SeasonMonth,
    Price,
    Composition,
    CompositionHeatmap,
}

/// How the renderer should draw the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Regions located by ISO-3 code in `dimensions.x`.
    Choropleth,
    /// Rings along `dimensions.path`, innermost first.
    Sunburst,
    /// Flat bars over `dimensions.x`.
    Histogram,
    Bar,
    Scatter3d,
    /// Grid of `x` by `y` cells valued `z`, one grid per `facet` value.
    Heatmap,
}

/// Field names of the data rows bound to each visual channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dimensions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

/// A renderer-agnostic chart description: data rows plus the channel
/// bindings and display names needed to draw them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: ChartId,
    pub kind: ChartKind,
    pub title: String,
    /// One JSON object per aggregated row.
    pub data: Vec<Value>,
    pub dimensions: Dimensions,
    /// Field name → display name.
    pub labels: BTreeMap<String, String>,
    pub color_scale: ColorScale,
}

impl ChartSpec {
    /// Display name of a field, falling back to the field name.
    pub fn label<'a>(&'a self, field: &'a str) -> &'a str {
        self.labels.get(field).map(String::as_str).unwrap_or(field)
    }

    /// `(min, max)` of the colour channel over all rows.
    pub fn color_domain(&self) -> Option<(f64, f64)> {
        let field = self.dimensions.color.as_deref()?;
        self.data
            .iter()
            .filter_map(|row| field_f64(row, field))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }

    /// Colour of a row according to the colour channel.
    pub fn color_of(&self, row: &Value) -> [u8; 3] {
        let value = self
            .dimensions
            .color
            .as_deref()
            .and_then(|f| field_f64(row, f))
            .unwrap_or(0.0);
        let domain = self.color_domain().unwrap_or((0.0, 1.0));
        self.color_scale.sample_in(value, domain)
    }
}

/// Numeric value of `field` in a data row.
pub fn field_f64(row: &Value, field: &str) -> Option<f64> {
    row.get(field)?.as_f64()
}

/// Text of `field` in a data row; numbers are formatted plainly.
pub fn field_text(row: &Value, field: &str) -> Option<String> {
    match row.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(data: Vec<Value>) -> ChartSpec {
        ChartSpec {
            id: ChartId::Price,
            kind: ChartKind::Bar,
            title: "t".into(),
            data,
            dimensions: Dimensions {
                x: Some("label".into()),
                color: Some("rate".into()),
                ..Default::default()
            },
            labels: BTreeMap::from([("rate".to_string(), "Rate".to_string())]),
            color_scale: ColorScale::Blues,
        }
    }

    #[test]
    fn color_domain_spans_rows() {
        let s = spec(vec![json!({"rate": 0.2}), json!({"rate": 0.7}), json!({"rate": 0.4})]);
        assert_eq!(s.color_domain(), Some((0.2, 0.7)));
        assert_eq!(s.color_of(&json!({"rate": 0.7})), ColorScale::Blues.sample(1.0));
        assert_eq!(spec(Vec::new()).color_domain(), None);
    }

    #[test]
    fn labels_fall_back_to_field_names() {
        let s = spec(Vec::new());
        assert_eq!(s.label("rate"), "Rate");
        assert_eq!(s.label("label"), "label");
    }

    #[test]
    fn field_access() {
        let row = json!({"country": "PRT", "total_bookings": 12});
        assert_eq!(field_text(&row, "country").as_deref(), Some("PRT"));
        assert_eq!(field_text(&row, "total_bookings").as_deref(), Some("12"));
        assert_eq!(field_f64(&row, "total_bookings"), Some(12.0));
        assert_eq!(field_f64(&row, "missing"), None);
    }
}
