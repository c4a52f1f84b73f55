// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves.
//!
//! Every curve maps a normalized progress in `[0, 1]` to an eased progress.
//! The shapes follow the <https://easings.net/> catalogue. Progress is clamped
//! before evaluation and the endpoints are pinned, so every curve returns
//! exactly `0.0` at `0.0` and exactly `1.0` at `1.0` even where the closed-form
//! expression drifts by a few ulps (elastic, back, bounce).

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

/// Named easing curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Ease {
    /// No easing
    #[default]
    Linear,
    /// `p²`
    QuadraticIn,
    /// `1 - (1 - p)²`
    QuadraticOut,
    /// Quadratic, blended at `p = 0.5`
    QuadraticInOut,
    /// `p³`
    CubicIn,
    /// `(p - 1)³ + 1`
    CubicOut,
    /// Cubic, blended at `p = 0.5`
    CubicInOut,
    /// `p⁴`
    QuarticIn,
    /// `(p - 1)³ (1 - p) + 1`
    QuarticOut,
    /// Quartic, blended at `p = 0.5`
    QuarticInOut,
    /// `p⁵`
    QuinticIn,
    /// `(p - 1)⁵ + 1`
    QuinticOut,
    /// Quintic, blended at `p = 0.5`
    QuinticInOut,
    /// Quarter sine wave
    SineIn,
    /// Quarter sine wave
    SineOut,
    /// Half cosine wave
    SineInOut,
    /// Shifted quadrant of a unit circle
    CircularIn,
    /// Shifted quadrant of a unit circle
    CircularOut,
    /// Circular, blended at `p = 0.5`
    CircularInOut,
    /// `2^(10 (p - 1))`
    ExponentialIn,
    /// `1 - 2^(-10 p)`
    ExponentialOut,
    /// Exponential, blended at `p = 0.5`
    ExponentialInOut,
    /// Damped sine wave growing towards the end
    ElasticIn,
    /// Damped sine wave settling at the end
    ElasticOut,
    /// Elastic, blended at `p = 0.5`
    ElasticInOut,
    /// Pulls back before moving forward
    BackIn,
    /// Overshoots before settling
    BackOut,
    /// Back, blended at `p = 0.5`
    BackInOut,
    /// Bounces off the start
    BounceIn,
    /// Bounces into the end
    BounceOut,
    /// Bounce, blended at `p = 0.5`
    BounceInOut,
}

impl Ease {
    /// Every easing curve, in declaration order
    pub const ALL: [Ease; 31] = [
        Ease::Linear,
        Ease::QuadraticIn,
        Ease::QuadraticOut,
        Ease::QuadraticInOut,
        Ease::CubicIn,
        Ease::CubicOut,
        Ease::CubicInOut,
        Ease::QuarticIn,
        Ease::QuarticOut,
        Ease::QuarticInOut,
        Ease::QuinticIn,
        Ease::QuinticOut,
        Ease::QuinticInOut,
        Ease::SineIn,
        Ease::SineOut,
        Ease::SineInOut,
        Ease::CircularIn,
        Ease::CircularOut,
        Ease::CircularInOut,
        Ease::ExponentialIn,
        Ease::ExponentialOut,
        Ease::ExponentialInOut,
        Ease::ElasticIn,
        Ease::ElasticOut,
        Ease::ElasticInOut,
        Ease::BackIn,
        Ease::BackOut,
        Ease::BackInOut,
        Ease::BounceIn,
        Ease::BounceOut,
        Ease::BounceInOut,
    ];

    /// Whether the curve leaves `[0, 1]` between its endpoints
    pub fn overshoots(&self) -> bool {
        matches!(
            self,
            Self::ElasticIn
                | Self::ElasticOut
                | Self::ElasticInOut
                | Self::BackIn
                | Self::BackOut
                | Self::BackInOut
        )
    }

    /// Evaluate the curve at `progress`, clamped to `[0, 1]`
    pub fn evaluate(&self, progress: f32) -> f32 {
        // NaN clamps to NaN, so treat it as the start.
        let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        if p == 0.0 {
            return 0.0;
        }
        if p == 1.0 {
            return 1.0;
        }

        match self {
            Self::Linear => p,
            Self::QuadraticIn => p * p,
            Self::QuadraticOut => 1.0 - (1.0 - p) * (1.0 - p),
            Self::QuadraticInOut => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    (-2.0 * p * p) + (4.0 * p) - 1.0
                }
            }
            Self::CubicIn => p * p * p,
            Self::CubicOut => {
                let f = p - 1.0;
                f * f * f + 1.0
            }
            Self::CubicInOut => {
                if p < 0.5 {
                    4.0 * p * p * p
                } else {
                    let f = (2.0 * p) - 2.0;
                    0.5 * f * f * f + 1.0
                }
            }
            Self::QuarticIn => p * p * p * p,
            Self::QuarticOut => {
                let f = p - 1.0;
                f * f * f * (1.0 - p) + 1.0
            }
            Self::QuarticInOut => {
                if p < 0.5 {
                    8.0 * p * p * p * p
                } else {
                    let f = p - 1.0;
                    -8.0 * f * f * f * f + 1.0
                }
            }
            Self::QuinticIn => p * p * p * p * p,
            Self::QuinticOut => {
                let f = p - 1.0;
                f * f * f * f * f + 1.0
            }
            Self::QuinticInOut => {
                if p < 0.5 {
                    16.0 * p * p * p * p * p
                } else {
                    let f = (2.0 * p) - 2.0;
                    0.5 * f * f * f * f * f + 1.0
                }
            }
            Self::SineIn => ((p - 1.0) * FRAC_PI_2).sin() + 1.0,
            Self::SineOut => (p * FRAC_PI_2).sin(),
            Self::SineInOut => 0.5 * (1.0 - (p * PI).cos()),
            Self::CircularIn => 1.0 - (1.0 - (p * p)).sqrt(),
            Self::CircularOut => ((2.0 - p) * p).sqrt(),
            Self::CircularInOut => {
                if p < 0.5 {
                    0.5 * (1.0 - (1.0 - 4.0 * (p * p)).sqrt())
                } else {
                    0.5 * ((-((2.0 * p) - 3.0) * ((2.0 * p) - 1.0)).sqrt() + 1.0)
                }
            }
            Self::ExponentialIn => 2f32.powf(10.0 * (p - 1.0)),
            Self::ExponentialOut => 1.0 - 2f32.powf(-10.0 * p),
            Self::ExponentialInOut => {
                if p < 0.5 {
                    0.5 * 2f32.powf((20.0 * p) - 10.0)
                } else {
                    -0.5 * 2f32.powf((-20.0 * p) + 10.0) + 1.0
                }
            }
            Self::ElasticIn => elastic_in(p),
            Self::ElasticOut => elastic_out(p),
            Self::ElasticInOut => {
                if p < 0.5 {
                    0.5 * elastic_in(2.0 * p)
                } else {
                    0.5 * (elastic_out(2.0 * p - 1.0) + 1.0)
                }
            }
            Self::BackIn => back_in(p),
            Self::BackOut => 1.0 - back_in(1.0 - p),
            Self::BackInOut => {
                if p < 0.5 {
                    0.5 * back_in(2.0 * p)
                } else {
                    0.5 * (1.0 - back_in(1.0 - (2.0 * p - 1.0))) + 0.5
                }
            }
            Self::BounceIn => 1.0 - bounce_out(1.0 - p),
            Self::BounceOut => bounce_out(p),
            Self::BounceInOut => {
                if p < 0.5 {
                    0.5 * (1.0 - bounce_out(1.0 - p * 2.0))
                } else {
                    0.5 * bounce_out(p * 2.0 - 1.0) + 0.5
                }
            }
        }
    }
}

fn elastic_in(p: f32) -> f32 {
    (13.0 * FRAC_PI_2 * p).sin() * 2f32.powf(10.0 * (p - 1.0))
}

fn elastic_out(p: f32) -> f32 {
    (-13.0 * FRAC_PI_2 * (p + 1.0)).sin() * 2f32.powf(-10.0 * p) + 1.0
}

fn back_in(p: f32) -> f32 {
    p * p * p - p * (p * PI).sin()
}

fn bounce_out(p: f32) -> f32 {
    if p < 4.0 / 11.0 {
        (121.0 * p * p) / 16.0
    } else if p < 8.0 / 11.0 {
        (363.0 / 40.0 * p * p) - (99.0 / 10.0 * p) + 17.0 / 5.0
    } else if p < 9.0 / 10.0 {
        (4356.0 / 361.0 * p * p) - (35442.0 / 1805.0 * p) + 16061.0 / 1805.0
    } else {
        (54.0 / 5.0 * p * p) - (513.0 / 25.0 * p) + 268.0 / 25.0
    }
}

/// Eased progress from 0 to 1
pub fn lerp01(progress: f32, ease: Ease) -> f32 {
    lerp(0.0, 1.0, progress, ease)
}

/// Interpolate from `start` to `end` along `ease`
pub fn lerp(start: f32, end: f32, progress: f32, ease: Ease) -> f32 {
    start + (end - start) * ease.evaluate(progress)
}
