//! Point color schemes and the paint expressions they compile to.
//!
//! Expressions are emitted in the map engine's JSON expression syntax
//! (`["interpolate", ["linear"], ["get", "Z"], ...]`). They can also be
//! evaluated locally against a single point, which the map engine never
//! exposes back to us.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Value, json};

/// Paint property every point layer is colored through.
pub const POINT_COLOR_PROPERTY: &str = "circle-color";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Per-channel linear blend, rounded to the nearest integer.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// Elevation ramp, meters above the vertical datum.
const DEEP_BLUE: Color = Color::rgb(0x08, 0x30, 0x6b);
const BLUE: Color = Color::rgb(0x21, 0x71, 0xb5);
const CYAN: Color = Color::rgb(0x00, 0xe5, 0xff);
const YELLOW: Color = Color::rgb(0xff, 0xeb, 0x3b);
const RED: Color = Color::rgb(0xd7, 0x19, 0x1c);

const ELEVATION_STOPS: [(f64, Color); 5] = [
    (0.0, DEEP_BLUE),
    (1.0, BLUE),
    (2.5, CYAN),
    (3.5, YELLOW),
    (5.0, RED),
];

const INTENSITY_STOPS: [(f64, Color); 2] = [
    (0.0, Color::rgb(0x11, 0x11, 0x11)),
    (255.0, Color::rgb(0xf5, 0xf5, 0xf5)),
];

// ASPRS LAS classification codes.
const CLASS_GROUND: i64 = 2;
const CLASS_NOISE: i64 = 7;
const CLASS_WATER: i64 = 9;
const CLASS_BRIDGE_DECK: i64 = 10;

const CLASSIFICATION_ARMS: [(i64, Color); 4] = [
    (CLASS_GROUND, Color::rgb(0x4c, 0xaf, 0x50)),
    (CLASS_NOISE, Color::rgb(0x21, 0x96, 0xf3)),
    (CLASS_WATER, Color::rgb(0xff, 0xc1, 0x07)),
    (CLASS_BRIDGE_DECK, Color::rgb(0xf4, 0x43, 0x36)),
];
const CLASSIFICATION_FALLBACK: Color = Color::rgb(0x9e, 0x9e, 0x9e);

/// Per-point attributes exposed by the LiDAR layers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PointAttribute {
    Z,
    Intensity,
    Classification,
    Red,
    Green,
    Blue,
}

impl PointAttribute {
    pub fn name(self) -> &'static str {
        match self {
            PointAttribute::Z => "Z",
            PointAttribute::Intensity => "Intensity",
            PointAttribute::Classification => "Classification",
            PointAttribute::Red => "Red",
            PointAttribute::Green => "Green",
            PointAttribute::Blue => "Blue",
        }
    }

    pub(crate) fn get_expr(self) -> Value {
        json!(["get", self.name()])
    }
}

/// Attribute values of a single point.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct PointAttributes {
    pub z: f64,
    pub intensity: f64,
    pub classification: i64,
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl PointAttributes {
    pub fn at_elevation(z: f64) -> Self {
        Self {
            z,
            ..Self::default()
        }
    }

    pub fn get(&self, attribute: PointAttribute) -> f64 {
        match attribute {
            PointAttribute::Z => self.z,
            PointAttribute::Intensity => self.intensity,
            PointAttribute::Classification => self.classification as f64,
            PointAttribute::Red => self.red,
            PointAttribute::Green => self.green,
            PointAttribute::Blue => self.blue,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintExpression {
    /// Piecewise-linear ramp; inputs outside the stops clamp to the end colors.
    Interpolate {
        input: PointAttribute,
        stops: Vec<(f64, Color)>,
    },
    /// Discrete lookup on an integer attribute.
    Match {
        input: PointAttribute,
        arms: Vec<(i64, Color)>,
        fallback: Color,
    },
    /// Color built directly from three channel attributes.
    Rgb {
        red: PointAttribute,
        green: PointAttribute,
        blue: PointAttribute,
    },
}

impl PaintExpression {
    pub fn to_value(&self) -> Value {
        match self {
            PaintExpression::Interpolate { input, stops } => {
                let mut out = vec![json!("interpolate"), json!(["linear"]), input.get_expr()];
                for (at, color) in stops {
                    out.push(json!(at));
                    out.push(json!(color.to_hex()));
                }
                Value::Array(out)
            }
            PaintExpression::Match {
                input,
                arms,
                fallback,
            } => {
                let mut out = vec![json!("match"), input.get_expr()];
                for (value, color) in arms {
                    out.push(json!(value));
                    out.push(json!(color.to_hex()));
                }
                out.push(json!(fallback.to_hex()));
                Value::Array(out)
            }
            PaintExpression::Rgb { red, green, blue } => {
                json!(["rgb", red.get_expr(), green.get_expr(), blue.get_expr()])
            }
        }
    }

    /// Color the map engine would assign to `point`.
    pub fn evaluate(&self, point: &PointAttributes) -> Color {
        match self {
            PaintExpression::Interpolate { input, stops } => {
                interpolate(stops, point.get(*input))
            }
            PaintExpression::Match {
                input,
                arms,
                fallback,
            } => {
                let v = point.get(*input);
                arms.iter()
                    .find(|(value, _)| *value as f64 == v)
                    .map(|(_, color)| *color)
                    .unwrap_or(*fallback)
            }
            PaintExpression::Rgb { red, green, blue } => {
                let channel = |a: PointAttribute| point.get(a).round().clamp(0.0, 255.0) as u8;
                Color::rgb(channel(*red), channel(*green), channel(*blue))
            }
        }
    }
}

impl Serialize for PaintExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn interpolate(stops: &[(f64, Color)], x: f64) -> Color {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return CLASSIFICATION_FALLBACK;
    };
    if x.is_nan() || x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }
    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if x <= hi.0 {
            let span = hi.0 - lo.0;
            let t = if span > 0.0 { (x - lo.0) / span } else { 1.0 };
            return lo.1.lerp(hi.1, t);
        }
    }
    last.1
}

/// User-selectable point coloring.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Elevation,
    Intensity,
    Classification,
    Rgb,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 4] = [
        ColorScheme::Elevation,
        ColorScheme::Intensity,
        ColorScheme::Classification,
        ColorScheme::Rgb,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorScheme::Elevation => "elevation",
            ColorScheme::Intensity => "intensity",
            ColorScheme::Classification => "classification",
            ColorScheme::Rgb => "rgb",
        }
    }

    pub fn paint_expression(self) -> PaintExpression {
        match self {
            ColorScheme::Elevation => PaintExpression::Interpolate {
                input: PointAttribute::Z,
                stops: ELEVATION_STOPS.to_vec(),
            },
            ColorScheme::Intensity => PaintExpression::Interpolate {
                input: PointAttribute::Intensity,
                stops: INTENSITY_STOPS.to_vec(),
            },
            ColorScheme::Classification => PaintExpression::Match {
                input: PointAttribute::Classification,
                arms: CLASSIFICATION_ARMS.to_vec(),
                fallback: CLASSIFICATION_FALLBACK,
            },
            ColorScheme::Rgb => PaintExpression::Rgb {
                red: PointAttribute::Red,
                green: PointAttribute::Green,
                blue: PointAttribute::Blue,
            },
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColorScheme(pub String);

impl fmt::Display for UnknownColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown color scheme: {:?}", self.0)
    }
}

impl std::error::Error for UnknownColorScheme {}

impl FromStr for ColorScheme {
    type Err = UnknownColorScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == s)
            .ok_or_else(|| UnknownColorScheme(s.to_string()))
    }
}
