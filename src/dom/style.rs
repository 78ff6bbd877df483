//! Inline style model and its CSS wire format.
//!
//! Only the handful of properties the header animation reads or writes are
//! modelled.  Each one is typed; [`Style::css_text`] turns the declared ones
//! back into the `prop: value;` text a browser would show in `style=""`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::engine::easing::Easing;

/// Failure to parse a CSS value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleParseError {
    #[error("expected `transform <secs>s <easing>`, got `{0}`")]
    Transition(String),
    #[error("unknown keyword `{0}`")]
    Keyword(String),
}

// ───────────────────────────────────────── keywords ──────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Block,
    Flex,
    None,
}

/// Main axis of a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    Row,
    #[default]
    Column,
}

impl FlexDirection {
    pub fn as_css(self) -> &'static str {
        match self {
            FlexDirection::Row => "row",
            FlexDirection::Column => "column",
        }
    }
}

impl FromStr for FlexDirection {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "row" => Ok(FlexDirection::Row),
            "column" => Ok(FlexDirection::Column),
            other => Err(StyleParseError::Keyword(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Sticky,
}

impl Position {
    fn as_css(self) -> &'static str {
        match self {
            Position::Static => "static",
            Position::Relative => "relative",
            Position::Absolute => "absolute",
            Position::Sticky => "sticky",
        }
    }
}

// ───────────────────────────────────────── transform ─────────

/// A 2D translation: the only transform this crate ever writes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Translate {
    pub x: f64,
    pub y: f64,
}

impl Translate {
    pub const ZERO: Translate = Translate { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation, `t` in `0.0..=1.0`.
    pub fn lerp(self, to: Translate, t: f64) -> Translate {
        Translate {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

impl fmt::Display for Translate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({}px, {}px)", trim_px(self.x), trim_px(self.y))
    }
}

// ───────────────────────────────────────── transition ────────

/// `transition: transform <duration> <easing>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub duration: Duration,
    pub easing: Easing,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transform {}s {}",
            trim_px(self.duration.as_secs_f64()),
            self.easing.as_css()
        )
    }
}

impl FromStr for Transition {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || StyleParseError::Transition(s.to_string());
        let mut parts = s.split_whitespace();
        if parts.next() != Some("transform") {
            return Err(err());
        }
        let secs: f64 = parts
            .next()
            .and_then(|d| d.strip_suffix('s'))
            .and_then(|d| d.parse().ok())
            .ok_or_else(err)?;
        let duration = Duration::try_from_secs_f64(secs).map_err(|_| err())?;
        let easing = match parts.next() {
            Some(name) => name.parse()?,
            None => Easing::default(),
        };
        Ok(Transition { duration, easing })
    }
}

// ───────────────────────────────────────── style ─────────────

/// The inline style of one element.  `None` means "not declared".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub display: Display,
    pub flex_direction: FlexDirection,
    pub position: Position,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub gap: f64,
    pub padding: f64,
    pub transform: Option<Translate>,
    pub transition: Option<Transition>,
}

impl Style {
    /// Deep-merge a partial style on top of this one.  Fields the patch
    /// leaves unset keep their current value.
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(v) = patch.display {
            self.display = v;
        }
        if let Some(v) = patch.flex_direction {
            self.flex_direction = v;
        }
        if let Some(v) = patch.position {
            self.position = v;
        }
        if let Some(v) = patch.left {
            self.left = v;
        }
        if let Some(v) = patch.top {
            self.top = v;
        }
        if let Some(v) = patch.width {
            self.width = v;
        }
        if let Some(v) = patch.height {
            self.height = v;
        }
        if let Some(v) = patch.gap {
            self.gap = v;
        }
        if let Some(v) = patch.padding {
            self.padding = v;
        }
        if let Some(v) = patch.transform {
            self.transform = v;
        }
        if let Some(v) = patch.transition {
            self.transition = v;
        }
    }

    /// Render the non-default properties as CSS text.
    pub fn css_text(&self) -> String {
        let mut decls: Vec<String> = Vec::new();
        match self.display {
            Display::Block => {}
            Display::Flex => {
                decls.push("display: flex".into());
                decls.push(format!("flex-direction: {}", self.flex_direction.as_css()));
            }
            Display::None => decls.push("display: none".into()),
        }
        if self.position != Position::Static {
            decls.push(format!("position: {}", self.position.as_css()));
        }
        for (name, value) in [
            ("left", self.left),
            ("top", self.top),
            ("width", self.width),
            ("height", self.height),
        ] {
            if let Some(v) = value {
                decls.push(format!("{name}: {}px", trim_px(v)));
            }
        }
        if self.gap != 0.0 {
            decls.push(format!("gap: {}px", trim_px(self.gap)));
        }
        if self.padding != 0.0 {
            decls.push(format!("padding: {}px", trim_px(self.padding)));
        }
        if let Some(t) = self.transform {
            decls.push(format!("transform: {t}"));
        }
        if let Some(t) = self.transition {
            decls.push(format!("transition: {t}"));
        }
        decls.join("; ")
    }
}

/// A partial [`Style`].  The outer `Option` says "touch this field"; for
/// optional properties the inner one is the value (`Some(None)` clears it).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StylePatch {
    pub display: Option<Display>,
    pub flex_direction: Option<FlexDirection>,
    pub position: Option<Position>,
    pub left: Option<Option<f64>>,
    pub top: Option<Option<f64>>,
    pub width: Option<Option<f64>>,
    pub height: Option<Option<f64>>,
    pub gap: Option<f64>,
    pub padding: Option<f64>,
    pub transform: Option<Option<Translate>>,
    pub transition: Option<Option<Transition>>,
}

impl StylePatch {
    /// Flex container laid out along `direction`.
    pub fn flex(direction: FlexDirection) -> Self {
        Self {
            display: Some(Display::Flex),
            flex_direction: Some(direction),
            ..Self::default()
        }
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Format a number without a trailing `.0` (`12` rather than `12.0`).
fn trim_px(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_wire_format() {
        assert_eq!(Translate::new(12.0, -40.5).to_string(), "translate(12px, -40.5px)");
    }

    #[test]
    fn transition_wire_format() {
        let t = Transition {
            duration: Duration::from_millis(1300),
            easing: Easing::EaseInOut,
        };
        assert_eq!(t.to_string(), "transform 1.3s ease-in-out");
        assert_eq!("transform 1.3s ease-in-out".parse::<Transition>().unwrap(), t);
        assert!("opacity 1s linear".parse::<Transition>().is_err());
        assert!("transform 1e30s linear".parse::<Transition>().is_err());
        assert!("transform -1s linear".parse::<Transition>().is_err());
        assert!("transform NaNs linear".parse::<Transition>().is_err());
    }

    #[test]
    fn patch_leaves_unset_fields_alone() {
        let mut style = Style {
            width: Some(80.0),
            gap: 4.0,
            ..Style::default()
        };
        style.apply(&StylePatch::flex(FlexDirection::Row));
        assert_eq!(style.display, Display::Flex);
        assert_eq!(style.flex_direction, FlexDirection::Row);
        assert_eq!(style.width, Some(80.0));
        assert_eq!(style.gap, 4.0);
    }

    #[test]
    fn later_patch_wins() {
        let mut style = Style::default();
        style.apply(&StylePatch {
            width: Some(Some(10.0)),
            gap: Some(2.0),
            ..StylePatch::default()
        });
        style.apply(&StylePatch {
            width: Some(None),
            ..StylePatch::default()
        });
        assert_eq!(style.width, None);
        assert_eq!(style.gap, 2.0);
    }

    #[test]
    fn css_text_lists_declared_properties() {
        let style = Style {
            position: Position::Absolute,
            left: Some(0.0),
            top: Some(16.0),
            width: Some(96.0),
            height: Some(16.0),
            transform: Some(Translate::new(104.0, -16.0)),
            ..Style::default()
        };
        assert_eq!(
            style.css_text(),
            "position: absolute; left: 0px; top: 16px; width: 96px; height: 16px; \
             transform: translate(104px, -16px)"
        );
    }
}
