//! Timing functions for transform transitions.

use std::str::FromStr;

use crate::dom::style::StyleParseError;

/// CSS timing keyword.  The curves are cubic approximations of the
/// keyword curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

impl Easing {
    pub const ALL: &[Easing] = &[
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
    ];

    pub fn as_css(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
        }
    }

    /// Map linear progress `t` (clamped to `0..=1`) onto the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => {
                let t1 = t - 1.0;
                (t1 * t1).mul_add(t1, 1.0)
            }
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let t1 = 2.0f64.mul_add(t, -2.0);
                    (0.5 * t1 * t1).mul_add(t1, 1.0)
                }
            }
        }
    }
}

impl FromStr for Easing {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .iter()
            .copied()
            .find(|e| e.as_css() == s.trim())
            .ok_or_else(|| StyleParseError::Keyword(s.to_string()))
    }
}
