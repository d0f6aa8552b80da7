//! Bar colour helpers for placed segments.

use once_cell::sync::Lazy;
use regex::Regex;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{6})$").expect("valid hex colour regex"));

/// Converts `#rrggbb` into `rgba(r, g, b, alpha)`; other inputs yield `None`.
pub fn alpha_from_hex(color: &str, alpha: f64) -> Option<String> {
    let hex = HEX_COLOR_RE.captures(color)?.get(1)?.as_str();
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    let (r, g, b) = (channel(0..2)?, channel(2..4)?, channel(4..6)?);
    Some(format!("rgba({r}, {g}, {b}, {alpha})"))
}

pub const BACKGROUND_ALPHA: f64 = 0.25;
pub const BORDER_ALPHA: f64 = 0.6;

/// Fill and outline colours of one bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarColors {
    pub background: String,
    pub border: String,
}

impl BarColors {
    /// Translucent variants of `color`; non-hex colours are used as is.
    pub fn from_color(color: &str) -> Self {
        let tint = |alpha| alpha_from_hex(color, alpha).unwrap_or_else(|| color.to_string());
        Self {
            background: tint(BACKGROUND_ALPHA),
            border: tint(BORDER_ALPHA),
        }
    }
}
