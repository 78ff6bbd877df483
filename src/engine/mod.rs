//! Animation engine: measurement, shadow layout, threshold tracking and
//! transform animation.
//!
//! Nothing in this module knows about the terminal.  It only reads and
//! writes the [`Document`](crate::dom::Document).

pub mod animator;
pub mod easing;
pub mod geometry;
pub mod shadow;
pub mod tracker;

use std::str::FromStr;
use std::time::Duration;

use crate::dom::style::{FlexDirection, StyleParseError, Transition};

use easing::Easing;

/// Default distance (px) from a resting position that counts as "at" it.
pub const DEFAULT_OFFSET_THRESHOLD: f64 = 10.0;
/// Default length of one item's slide.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(1300);
/// Slide durations are clamped to `MIN_TRANSITION..=MAX_TRANSITION`.
pub const MIN_TRANSITION: Duration = Duration::from_millis(1);
pub const MAX_TRANSITION: Duration = Duration::from_secs(60);

/// How the animator learns that a slide has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Completion {
    /// After the transition duration, on the document clock, whether or
    /// not the visual transition actually got there.
    #[default]
    Timer,
    /// When the document reports `transitionend` for the element.
    TransitionEnd,
}

impl Completion {
    pub fn label(self) -> &'static str {
        match self {
            Completion::Timer => "timer",
            Completion::TransitionEnd => "transitionend",
        }
    }
}

impl FromStr for Completion {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "timer" => Ok(Completion::Timer),
            "transitionend" | "transition-end" => Ok(Completion::TransitionEnd),
            other => Err(StyleParseError::Keyword(other.to_string())),
        }
    }
}

/// Tunables shared by the tracker and the animator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub offset_threshold: f64,
    pub duration: Duration,
    pub easing: Easing,
    /// Flow direction the menu items animate towards.
    pub alternate_direction: FlexDirection,
    pub completion: Completion,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            offset_threshold: DEFAULT_OFFSET_THRESHOLD,
            duration: DEFAULT_TRANSITION,
            easing: Easing::default(),
            alternate_direction: FlexDirection::Row,
            completion: Completion::default(),
        }
    }
}

impl EngineConfig {
    pub fn transition(&self) -> Transition {
        Transition {
            duration: self.duration,
            easing: self.easing,
        }
    }

    /// Set the threshold zone radius.  Negative and non-finite values are
    /// rejected and leave the current threshold in place.
    pub fn set_offset_threshold(&mut self, px: f64) -> bool {
        if !px.is_finite() || px < 0.0 {
            return false;
        }
        self.offset_threshold = px;
        true
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration.clamp(MIN_TRANSITION, MAX_TRANSITION);
    }

    /// Take duration and easing from a `transform <secs>s <easing>` value.
    pub fn set_transition(&mut self, transition: Transition) {
        self.set_duration(transition.duration);
        self.easing = transition.easing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_must_be_finite_and_non_negative() {
        let mut config = EngineConfig::default();
        assert!(!config.set_offset_threshold(f64::INFINITY));
        assert!(!config.set_offset_threshold(f64::NAN));
        assert!(!config.set_offset_threshold(-1.0));
        assert_eq!(config.offset_threshold, DEFAULT_OFFSET_THRESHOLD);
        assert!(config.set_offset_threshold(0.0));
        assert_eq!(config.offset_threshold, 0.0);
    }

    #[test]
    fn duration_is_clamped() {
        let mut config = EngineConfig::default();
        config.set_duration(Duration::from_secs(3600));
        assert_eq!(config.duration, MAX_TRANSITION);
        config.set_duration(Duration::ZERO);
        assert_eq!(config.duration, MIN_TRANSITION);

        config.set_transition("transform 0.25s ease-in".parse().unwrap());
        assert_eq!(config.duration, Duration::from_millis(250));
        assert_eq!(config.easing, Easing::EaseIn);
        assert_eq!(config.transition().to_string(), "transform 0.25s ease-in");
    }
}
