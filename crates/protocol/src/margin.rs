use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Rect;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarginParseError {
    #[error("root margin is empty")]
    Empty,
    #[error("root margin takes 1 to 4 lengths, got {0}")]
    TooManyComponents(usize),
    #[error("invalid length `{0}` (expected px or %)")]
    InvalidLength(String),
}

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    /// Percentage of the root's height (top/bottom) or width (left/right).
    Percent(f64),
}

impl Length {
    pub fn resolve(self, basis: f64) -> f64 {
        match self {
            Length::Px(px) => px,
            Length::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl FromStr for Length {
    type Err = MarginParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MarginParseError::InvalidLength(s.to_string());
        let (number, make): (&str, fn(f64) -> Length) = if let Some(n) = s.strip_suffix('%') {
            (n, Length::Percent)
        } else if let Some(n) = s.strip_suffix("px") {
            (n, Length::Px)
        } else {
            // CSS only allows a bare number when it is zero.
            (s, Length::Px)
        };
        let value: f64 = number.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        if number.len() == s.len() && value != 0.0 {
            return Err(invalid());
        }
        Ok(make(value))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{v}px"),
            Length::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// Offsets applied to the root bounds before intersecting, in CSS
/// `margin` order. Negative values shrink the root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin {
        top: Length::Px(0.0),
        right: Length::Px(0.0),
        bottom: Length::Px(0.0),
        left: Length::Px(0.0),
    };

    /// Grow (or shrink) `root` by the margin. Shrinking past zero collapses
    /// the axis to an empty strip at its midpoint rather than inverting it.
    pub fn apply(&self, root: &Rect) -> Rect {
        let top = self.top.resolve(root.h);
        let bottom = self.bottom.resolve(root.h);
        let left = self.left.resolve(root.w);
        let right = self.right.resolve(root.w);

        let mut x = root.x - left;
        let mut y = root.y - top;
        let mut w = root.w + left + right;
        let mut h = root.h + top + bottom;
        if w < 0.0 {
            x += w / 2.0;
            w = 0.0;
        }
        if h < 0.0 {
            y += h / 2.0;
            h = 0.0;
        }
        Rect::new(x, y, w, h)
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = MarginParseError;

    /// Parse CSS margin shorthand: `"a"`, `"a b"`, `"a b c"` or `"a b c d"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split_whitespace()
            .map(str::parse::<Length>)
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [] => Err(MarginParseError::Empty),
            [all] => Ok(Self {
                top: *all,
                right: *all,
                bottom: *all,
                left: *all,
            }),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            more => Err(MarginParseError::TooManyComponents(more.len())),
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

impl TryFrom<String> for RootMargin {
    type Error = MarginParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(value: RootMargin) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_component_band() {
        let m: RootMargin = "-45% 0px -45% 0px".parse().expect("valid margin");
        assert_eq!(m.top, Length::Percent(-45.0));
        assert_eq!(m.right, Length::Px(0.0));
        assert_eq!(m.bottom, Length::Percent(-45.0));
        assert_eq!(m.left, Length::Px(0.0));
    }

    #[test]
    fn shorthand_expands_like_css() {
        let m: RootMargin = "10px 5%".parse().expect("valid margin");
        assert_eq!(m.top, Length::Px(10.0));
        assert_eq!(m.bottom, Length::Px(10.0));
        assert_eq!(m.left, Length::Percent(5.0));
        assert_eq!(m.right, Length::Percent(5.0));

        let three: RootMargin = "1px 2px 3px".parse().expect("valid margin");
        assert_eq!(three.left, Length::Px(2.0));
        assert_eq!(three.bottom, Length::Px(3.0));
    }

    #[test]
    fn bare_zero_is_allowed_but_bare_numbers_are_not() {
        assert_eq!("0".parse::<Length>(), Ok(Length::Px(0.0)));
        assert!(matches!(
            "12".parse::<Length>(),
            Err(MarginParseError::InvalidLength(_))
        ));
        assert!(matches!(
            "1em".parse::<Length>(),
            Err(MarginParseError::InvalidLength(_))
        ));
    }

    #[test]
    fn rejects_bad_component_counts() {
        assert_eq!("".parse::<RootMargin>(), Err(MarginParseError::Empty));
        assert_eq!(
            "1px 1px 1px 1px 1px".parse::<RootMargin>(),
            Err(MarginParseError::TooManyComponents(5))
        );
    }

    #[test]
    fn band_margin_leaves_central_strip() {
        let m: RootMargin = "-45% 0px -45% 0px".parse().expect("valid margin");
        let band = m.apply(&Rect::new(0.0, 0.0, 1000.0, 1000.0));
        assert!((band.y - 450.0).abs() < 1e-9);
        assert!((band.h - 100.0).abs() < 1e-9);
        assert!((band.w - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn bottom_shrink_only_moves_bottom_edge() {
        let m: RootMargin = "0px 0px -10% 0px".parse().expect("valid margin");
        let root = m.apply(&Rect::new(0.0, 0.0, 400.0, 800.0));
        assert_eq!(root.y, 0.0);
        assert!((root.h - 720.0).abs() < 1e-9);
    }

    #[test]
    fn over_shrinking_collapses_instead_of_inverting() {
        let m: RootMargin = "-60% 0px -60% 0px".parse().expect("valid margin");
        let root = m.apply(&Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(root.h, 0.0);
        assert!((root.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn serializes_as_css_string() {
        let m: RootMargin = "0px 0px -10% 0px".parse().expect("valid margin");
        let json = serde_json::to_string(&m).expect("serializable");
        assert_eq!(json, "\"0px 0px -10% 0px\"");
        let back: Result<RootMargin, _> = serde_json::from_str("\"-45% 0px\"");
        assert!(back.is_ok());
        let bad: Result<RootMargin, _> = serde_json::from_str("\"oops\"");
        assert!(bad.is_err());
    }
}
