pub mod geometry;

use std::sync::atomic::{AtomicU64, Ordering};

use scrollspy_protocol::{ElementId, ObservationPolicy, ObserverId, VisibilityEvent};

use crate::page::Page;

static NEXT_OBSERVER: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct Registration {
    target: ElementId,
    /// Thresholds crossed at the last computation; `None` until the first one,
    /// so every new registration reports its initial state.
    last_crossed: Option<usize>,
}

/// Viewport intersection engine.
///
/// Holds a set of observed targets and one [`ObservationPolicy`]. Each call
/// to [`compute`](Self::compute) measures every target against the page's
/// current viewport and returns the batch of targets whose crossed-threshold
/// count changed since the previous call. Targets are measured in
/// registration order, which is the order events appear in the batch.
#[derive(Debug)]
pub struct IntersectionEngine {
    id: ObserverId,
    policy: ObservationPolicy,
    registrations: Vec<Registration>,
}

impl IntersectionEngine {
    pub fn new(policy: ObservationPolicy) -> Self {
        Self {
            id: ObserverId(NEXT_OBSERVER.fetch_add(1, Ordering::Relaxed)),
            policy,
            registrations: Vec::new(),
        }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn policy(&self) -> &ObservationPolicy {
        &self.policy
    }

    /// Start observing `target`. Observing the same target twice is a no-op.
    pub fn observe(&mut self, target: ElementId) {
        if self.is_observing(&target) {
            return;
        }
        self.registrations.push(Registration {
            target,
            last_crossed: None,
        });
    }

    /// Stop observing `target`. Returns whether it was observed.
    ///
    /// The target is dropped from the registration list immediately, so no
    /// later batch from this engine can mention it.
    pub fn unobserve(&mut self, target: &ElementId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| &r.target != target);
        before != self.registrations.len()
    }

    /// Release every registration.
    pub fn disconnect(&mut self) {
        if !self.registrations.is_empty() {
            tracing::trace!(
                observer = self.id.0,
                released = self.registrations.len(),
                "disconnect"
            );
        }
        self.registrations.clear();
    }

    pub fn is_observing(&self, target: &ElementId) -> bool {
        self.registrations.iter().any(|r| &r.target == target)
    }

    pub fn targets(&self) -> impl Iterator<Item = &ElementId> {
        self.registrations.iter().map(|r| &r.target)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Measure all targets and return the batch of changes.
    pub fn compute<P: Page + ?Sized>(&mut self, page: &P) -> Vec<VisibilityEvent> {
        let viewport = page.viewport();
        let root = self.policy.root_margin.apply(&viewport.root_bounds());
        let thresholds = &self.policy.thresholds;

        let mut batch = Vec::new();
        for registration in &mut self.registrations {
            let rect = page.bounding_client_rect(&registration.target);
            let m = geometry::measure(rect, &root);
            let crossed = thresholds.crossed(m.is_intersecting(), m.ratio);
            if registration.last_crossed == Some(crossed) {
                continue;
            }
            registration.last_crossed = Some(crossed);
            batch.push(VisibilityEvent {
                observer: self.id,
                target: registration.target.clone(),
                is_intersecting: crossed > 0,
                intersection_ratio: m.ratio,
                bounding_client_rect: m.bounding,
                intersection_rect: m.intersection.unwrap_or_default(),
                root_bounds: root,
            });
        }

        if !batch.is_empty() {
            tracing::trace!(observer = self.id.0, events = batch.len(), "intersection batch");
        }
        batch
    }
}
