use palette::{LinSrgb, Mix, Srgb};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Sequential colour scales
// ---------------------------------------------------------------------------

/// ColorBrewer "Blues", light to dark.
const BLUES: [[u8; 3]; 9] = [
    [247, 251, 255],
    [222, 235, 247],
    [198, 219, 239],
    [158, 202, 225],
    [107, 174, 214],
    [66, 146, 198],
    [33, 113, 181],
    [8, 81, 156],
    [8, 48, 107],
];

/// Continuous colour scale attached to a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScale {
    /// Light for low values, dark for high ones.
    Blues,
    /// Dark for low values, light for high ones.
    BluesReversed,
}

impl ColorScale {
    /// Colour at position `t` in `[0, 1]` (clamped), interpolated in linear RGB.
    pub fn sample(self, t: f64) -> [u8; 3] {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let t = match self {
            ColorScale::Blues => t,
            ColorScale::BluesReversed => 1.0 - t,
        };

        let last = BLUES.len() - 1;
        let pos = t * last as f64;
        let i = (pos.floor() as usize).min(last - 1);
        let frac = (pos - i as f64) as f32;

        let a = to_linear(BLUES[i]);
        let b = to_linear(BLUES[i + 1]);
        let mixed: Srgb = Srgb::from_linear(a.mix(b, frac));
        let out: Srgb<u8> = mixed.into_format();
        [out.red, out.green, out.blue]
    }

    /// Colour of `value` relative to the `(min, max)` domain of a chart.
    pub fn sample_in(self, value: f64, domain: (f64, f64)) -> [u8; 3] {
        self.sample(normalize(value, domain))
    }
}

/// Position of `value` within `(min, max)`; a degenerate domain maps to 1.
pub fn normalize(value: f64, (min, max): (f64, f64)) -> f64 {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        1.0
    } else {
        (value - min) / span
    }
}

fn to_linear([r, g, b]: [u8; 3]) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}
