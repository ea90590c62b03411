use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::margin::RootMargin;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),
}

/// Sorted, de-duplicated intersection ratios at which an engine reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Thresholds(Vec<f64>);

impl Thresholds {
    /// Validate and normalize. An empty list means `[0]`.
    pub fn new(mut values: Vec<f64>) -> Result<Self, PolicyError> {
        if let Some(&bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(PolicyError::ThresholdOutOfRange(bad));
        }
        if values.is_empty() {
            values.push(0.0);
        }
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of thresholds crossed by a target.
    ///
    /// A zero threshold counts as soon as the target touches the root, even
    /// with zero area; any other threshold needs `ratio >= t`.
    pub fn crossed(&self, intersecting: bool, ratio: f64) -> usize {
        if !intersecting {
            return 0;
        }
        self.0
            .iter()
            .filter(|&&t| t == 0.0 || ratio >= t)
            .count()
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self(vec![0.0])
    }
}

impl TryFrom<Vec<f64>> for Thresholds {
    type Error = PolicyError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Thresholds> for Vec<f64> {
    fn from(value: Thresholds) -> Self {
        value.0
    }
}

/// How an intersection engine decides what "in view" means.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationPolicy {
    #[serde(default)]
    pub root_margin: RootMargin,
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl ObservationPolicy {
    /// Central 10% strip of the viewport, reported at quarter steps.
    ///
    /// Only one section fits in the band at a time during normal scrolling,
    /// which keeps the navigation highlight from jumping between neighbours.
    pub fn section_band() -> Self {
        Self {
            root_margin: RootMargin {
                top: crate::Length::Percent(-45.0),
                right: crate::Length::Px(0.0),
                bottom: crate::Length::Percent(-45.0),
                left: crate::Length::Px(0.0),
            },
            thresholds: Thresholds(vec![0.0, 0.25, 0.5, 0.75, 1.0]),
        }
    }

    /// 10% visible, with the bottom tenth of the viewport excluded.
    pub fn reveal_entry() -> Self {
        Self {
            root_margin: RootMargin {
                top: crate::Length::Px(0.0),
                right: crate::Length::Px(0.0),
                bottom: crate::Length::Percent(-10.0),
                left: crate::Length::Px(0.0),
            },
            thresholds: Thresholds(vec![0.1]),
        }
    }

    /// Apply an override on top of this policy. Fields the override sets win.
    pub fn merged(mut self, overrides: Option<&PolicyOverride>) -> Self {
        if let Some(o) = overrides {
            if let Some(margin) = o.root_margin {
                self.root_margin = margin;
            }
            if let Some(thresholds) = &o.thresholds {
                self.thresholds = thresholds.clone();
            }
        }
        self
    }
}

/// Partial policy supplied by a consumer to adjust a preset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolicyOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_margin: Option<RootMargin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
}
