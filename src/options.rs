use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::{Bounds, RevealError};

/// Default root margin: the bottom tenth of the viewport does not count as visible.
pub const DEFAULT_ROOT_MARGIN: &str = "0px 0px -10% 0px";

/// Default fraction of a target's area that must be visible.
pub const DEFAULT_THRESHOLD: f64 = 0.15;

/// Caller-supplied overlay for [`ObserverOptions`].
///
/// Unset fields fall back to the defaults. The overlay is shallow: a set field replaces the
/// default value wholesale.
///
/// With `feature = "serde"`, this type deserializes from camelCase keys
/// (`{"rootMargin": "...", "threshold": 0.3}`).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct RevealInit {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub root_margin: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub threshold: Option<f64>,
}

impl RevealInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_margin(mut self, root_margin: impl Into<String>) -> Self {
        self.root_margin = Some(root_margin.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Resolved configuration handed to a visibility observer.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize` with camelCase keys.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ObserverOptions {
    /// CSS margin shorthand applied to the viewport before the visibility test.
    pub root_margin: String,
    /// Fraction of the target area, in `[0, 1]`, that must be visible.
    pub threshold: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root_margin: DEFAULT_ROOT_MARGIN.to_string(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ObserverOptions {
    /// Overlays `init` on top of these options. Fields set in `init` win.
    pub fn merged(&self, init: &RevealInit) -> Self {
        Self {
            root_margin: init
                .root_margin
                .clone()
                .unwrap_or_else(|| self.root_margin.clone()),
            threshold: init.threshold.unwrap_or(self.threshold),
        }
    }

    pub fn with_root_margin(mut self, root_margin: impl Into<String>) -> Self {
        self.root_margin = root_margin.into();
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn parsed_root_margin(&self) -> Result<RootMargin, RevealError> {
        RootMargin::parse(&self.root_margin)
    }

    pub fn validated_threshold(&self) -> Result<f64, RevealError> {
        validate_threshold(self.threshold)
    }
}

/// Checks that a threshold is a number in `[0, 1]`.
pub fn validate_threshold(threshold: f64) -> Result<f64, RevealError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(RevealError::InvalidThreshold(threshold))
    }
}

/// One side of a root margin.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarginLength {
    Px(f64),
    /// Percentage of the viewport height (top/bottom) or width (left/right).
    Percent(f64),
}

impl MarginLength {
    fn parse(token: &str) -> Option<Self> {
        if let Some(n) = token.strip_suffix("px") {
            return finite(n).map(Self::Px);
        }
        if let Some(n) = token.strip_suffix('%') {
            return finite(n).map(Self::Percent);
        }
        // Unitless zero is the only unitless length CSS accepts.
        match finite(token) {
            Some(n) if n == 0.0 => Some(Self::Px(0.0)),
            _ => None,
        }
    }

    /// Resolves to pixels against the viewport extent on the same axis.
    pub fn resolve(&self, extent: f64) -> f64 {
        match *self {
            Self::Px(px) => px,
            Self::Percent(pct) => extent * pct / 100.0,
        }
    }
}

// `f64::from_str` also accepts `NaN`, `inf` and overflows to infinity.
fn finite(number: &str) -> Option<f64> {
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl Default for MarginLength {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

/// A parsed root margin (CSS margin shorthand, 1 to 4 lengths).
///
/// Positive values grow the viewport used for the visibility test; negative values shrink it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    pub fn parse(input: &str) -> Result<Self, RevealError> {
        let err = |reason| RevealError::InvalidRootMargin {
            margin: input.to_string(),
            reason,
        };

        let mut lengths = Vec::with_capacity(4);
        for token in input.split_whitespace() {
            let length =
                MarginLength::parse(token).ok_or_else(|| err("lengths must be in px or %"))?;
            lengths.push(length);
        }

        match *lengths.as_slice() {
            [] => Err(err("expected 1 to 4 lengths")),
            [all] => Ok(Self {
                top: all,
                right: all,
                bottom: all,
                left: all,
            }),
            [vertical, horizontal] => Ok(Self {
                top: vertical,
                right: horizontal,
                bottom: vertical,
                left: horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top,
                right: horizontal,
                bottom,
                left: horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top,
                right,
                bottom,
                left,
            }),
            _ => Err(err("expected 1 to 4 lengths")),
        }
    }

    /// Applies the margin to a viewport rectangle.
    pub fn expand(&self, viewport: Bounds) -> Bounds {
        let top = self.top.resolve(viewport.height);
        let bottom = self.bottom.resolve(viewport.height);
        let left = self.left.resolve(viewport.width);
        let right = self.right.resolve(viewport.width);
        Bounds::new(
            viewport.x - left,
            viewport.y - top,
            viewport.width + left + right,
            viewport.height + top + bottom,
        )
    }
}
