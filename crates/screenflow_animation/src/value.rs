// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animated value types and interpolation helpers.

use serde::{Deserialize, Serialize};

/// Scale vector (x, y, z)
pub type Scale = [f32; 3];

/// Unit scale
pub const UNIT_SCALE: Scale = [1.0, 1.0, 1.0];

/// RGBA color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black
    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Create a color from its components
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Which color components an interpolation writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorChannels {
    /// Red, green and blue
    pub rgb: bool,
    /// Alpha
    pub alpha: bool,
}

impl ColorChannels {
    /// Every channel
    pub const ALL: ColorChannels = ColorChannels { rgb: true, alpha: true };
    /// No channel
    pub const NONE: ColorChannels = ColorChannels { rgb: false, alpha: false };

    /// Whether any channel is written
    pub fn any(&self) -> bool {
        self.rgb || self.alpha
    }
}

impl Default for ColorChannels {
    fn default() -> Self {
        Self::ALL
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Interpolate a scale vector
    pub fn lerp_scale(a: Scale, b: Scale, t: f32) -> Scale {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
        ]
    }

    /// Interpolate the gated channels of a color, leaving the others at `a`
    pub fn lerp_color(a: Color, b: Color, t: f32, channels: ColorChannels) -> Color {
        let mut out = a;
        if channels.rgb {
            out.r = Self::lerp(a.r, b.r, t);
            out.g = Self::lerp(a.g, b.g, t);
            out.b = Self::lerp(a.b, b.b, t);
        }
        if channels.alpha {
            out.a = Self::lerp(a.a, b.a, t);
        }
        out
    }
}
