use serde::{Deserialize, Serialize};

use crate::ident::ElementId;
use crate::types::Rect;

/// Identity of one intersection engine instance.
///
/// Every event carries the id of the engine that produced it, so a consumer
/// that has torn down and rebuilt its engine can recognise stale batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId(pub u64);

/// A change in how much of a target is inside an engine's root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityEvent {
    pub observer: ObserverId,
    pub target: ElementId,
    /// At least one of the engine's thresholds is crossed.
    pub is_intersecting: bool,
    /// Visible fraction of the target's area, in `[0, 1]`.
    pub intersection_ratio: f64,
    pub bounding_client_rect: Rect,
    pub intersection_rect: Rect,
    /// The margin-adjusted root the target was tested against.
    pub root_bounds: Rect,
}
