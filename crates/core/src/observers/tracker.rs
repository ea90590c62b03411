use std::sync::Arc;

use scrollspy_protocol::{ElementId, ObservationPolicy, PolicyOverride, VisibilityEvent};

use crate::engine::IntersectionEngine;
use crate::page::Page;

/// Ordered section identifiers, in navigation order.
///
/// Identity matters: the tracker rebuilds only when handed a *different*
/// list, compared by pointer, not by content. Clone a list to keep its
/// identity.
#[derive(Debug, Clone)]
pub struct SectionList(Arc<[ElementId]>);

impl SectionList {
    pub fn new<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ElementId>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn as_slice(&self) -> &[ElementId] {
        &self.0
    }

    pub fn first(&self) -> Option<&ElementId> {
        self.0.first()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same list instance (not merely equal contents).
    pub fn same_as(&self, other: &SectionList) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Into<ElementId>> FromIterator<T> for SectionList {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

fn same_override(a: Option<&Arc<PolicyOverride>>, b: Option<&Arc<PolicyOverride>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

/// Keeps exactly one section "active" for navigation highlighting.
///
/// Sections are observed through the central band of the viewport
/// ([`ObservationPolicy::section_band`]). Within a batch, every event that
/// reports a section as intersecting overwrites the active id, so the last
/// one in the batch wins even when an earlier one is still inside the band.
#[derive(Debug)]
pub struct SectionTracker {
    sections: SectionList,
    overrides: Option<Arc<PolicyOverride>>,
    engine: Option<IntersectionEngine>,
    active: Option<ElementId>,
}

impl SectionTracker {
    pub fn mount<P: Page + ?Sized>(
        sections: SectionList,
        overrides: Option<Arc<PolicyOverride>>,
        page: &P,
    ) -> Self {
        let active = sections.first().cloned();
        let mut tracker = Self {
            sections,
            overrides,
            engine: None,
            active,
        };
        tracker.observe_sections(page);
        tracker
    }

    fn observe_sections<P: Page + ?Sized>(&mut self, page: &P) {
        let resolved: Vec<ElementId> = self
            .sections
            .as_slice()
            .iter()
            .filter_map(|id| {
                let found = page.element_by_id(id);
                if found.is_none() {
                    tracing::debug!(section = %id, "section not mounted, skipping");
                }
                found
            })
            .collect();

        if resolved.is_empty() {
            tracing::debug!(requested = self.sections.len(), "no sections mounted");
            return;
        }

        let policy = ObservationPolicy::section_band().merged(self.overrides.as_deref());
        let mut engine = IntersectionEngine::new(policy);
        for id in resolved {
            engine.observe(id);
        }
        tracing::debug!(
            observer = engine.id().0,
            observed = engine.len(),
            requested = self.sections.len(),
            "section tracker mounted"
        );
        self.engine = Some(engine);
    }

    /// The active section. `None` only for an empty section list.
    pub fn active(&self) -> Option<&ElementId> {
        self.active.as_ref()
    }

    pub fn sections(&self) -> &SectionList {
        &self.sections
    }

    pub fn engine(&self) -> Option<&IntersectionEngine> {
        self.engine.as_ref()
    }

    pub fn is_observing(&self) -> bool {
        self.engine.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Compute a batch for the current viewport and apply it.
    /// Returns whether the active section changed.
    pub fn refresh<P: Page + ?Sized>(&mut self, page: &P) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        let batch = engine.compute(page);
        self.handle_batch(&batch)
    }

    /// Apply a batch of visibility events.
    ///
    /// Events not produced by the current engine (a torn-down or replaced
    /// one) are ignored.
    pub fn handle_batch(&mut self, events: &[VisibilityEvent]) -> bool {
        let Some(live) = self.engine.as_ref().map(IntersectionEngine::id) else {
            return false;
        };
        let before = self.active.clone();
        for event in events {
            if event.observer != live {
                tracing::trace!(target_id = %event.target, "stale section event ignored");
                continue;
            }
            if event.is_intersecting {
                self.active = Some(event.target.clone());
            }
        }
        let changed = before != self.active;
        if changed {
            tracing::debug!(
                from = before.as_deref().unwrap_or("-"),
                to = self.active.as_deref().unwrap_or("-"),
                "active section changed"
            );
        }
        changed
    }

    /// Rebuild against a new section list or policy override.
    ///
    /// Nothing happens when both are the same instances as before. Otherwise
    /// the current observation is released before the new one starts. The
    /// active id is kept if it is still in the new list, else it falls back
    /// to the new first id. Returns whether a rebuild happened.
    pub fn reconfigure<P: Page + ?Sized>(
        &mut self,
        sections: SectionList,
        overrides: Option<Arc<PolicyOverride>>,
        page: &P,
    ) -> bool {
        if self.sections.same_as(&sections)
            && same_override(self.overrides.as_ref(), overrides.as_ref())
        {
            return false;
        }
        self.teardown();
        if !self.active.as_ref().is_some_and(|a| sections.contains(a)) {
            self.active = sections.first().cloned();
        }
        self.sections = sections;
        self.overrides = overrides;
        self.observe_sections(page);
        true
    }

    /// Release all observation. Later batches, stale or not, are ignored.
    pub fn teardown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageElement, StaticPage};
    use scrollspy_protocol::{ObserverId, Rect, RootMargin, Viewport};

    fn page(ids: &[&str]) -> StaticPage {
        let mut page = StaticPage::new(Viewport::new(1000.0, 1000.0));
        for (i, id) in ids.iter().enumerate() {
            page.push(PageElement::new(
                *id,
                Rect::new(0.0, i as f64 * 1000.0, 1000.0, 1000.0),
            ));
        }
        page
    }

    fn entry(observer: ObserverId, target: &str, intersecting: bool) -> VisibilityEvent {
        VisibilityEvent {
            observer,
            target: target.into(),
            is_intersecting: intersecting,
            intersection_ratio: if intersecting { 0.5 } else { 0.0 },
            bounding_client_rect: Rect::ZERO,
            intersection_rect: Rect::ZERO,
            root_bounds: Rect::ZERO,
        }
    }

    #[test]
    fn defaults_to_first_section() {
        let page = page(&["home", "about"]);
        let tracker = SectionTracker::mount(SectionList::new(["home", "about"]), None, &page);
        assert_eq!(tracker.active().map(ElementId::as_str), Some("home"));
        assert_eq!(tracker.engine().map(IntersectionEngine::len), Some(2));
    }

    #[test]
    fn missing_sections_are_skipped() {
        let page = page(&["home"]);
        let tracker = SectionTracker::mount(SectionList::new(["home", "about"]), None, &page);
        let engine = tracker.engine();
        assert_eq!(engine.map(IntersectionEngine::len), Some(1));
        assert_eq!(
            engine.map(|e| e.is_observing(&"about".into())),
            Some(false)
        );
    }

    #[test]
    fn scrolling_moves_active_section() {
        let mut page = page(&["home", "about", "skills"]);
        let sections = SectionList::new(["home", "about", "skills"]);
        let mut tracker = SectionTracker::mount(sections, None, &page);
        tracker.refresh(&page);
        assert_eq!(tracker.active().map(ElementId::as_str), Some("home"));

        page.scroll_to(1000.0);
        assert!(tracker.refresh(&page));
        assert_eq!(tracker.active().map(ElementId::as_str), Some("about"));

        page.scroll_to(2000.0);
        tracker.refresh(&page);
        assert_eq!(tracker.active().map(ElementId::as_str), Some("skills"));
    }

    #[test]
    fn last_intersecting_event_in_batch_wins() {
        let page = page(&["home", "about"]);
        let mut tracker = SectionTracker::mount(SectionList::new(["home", "about"]), None, &page);
        let live = tracker
            .engine()
            .map(IntersectionEngine::id)
            .expect("tracker should observe");
        tracker.handle_batch(&[entry(live, "about", true), entry(live, "home", true)]);
        assert_eq!(tracker.active().map(ElementId::as_str), Some("home"));

        // A leaving event does not clear the active section.
        tracker.handle_batch(&[entry(live, "home", false)]);
        assert_eq!(tracker.active().map(ElementId::as_str), Some("home"));
    }

    #[test]
    fn stale_events_after_teardown_are_ignored() {
        let page = page(&["home", "about"]);
        let mut tracker = SectionTracker::mount(SectionList::new(["home", "about"]), None, &page);
        let live = tracker.engine().map(IntersectionEngine::id);
        tracker.teardown();
        assert!(!tracker.is_observing());
        if let Some(live) = live {
            assert!(!tracker.handle_batch(&[entry(live, "about", true)]));
        }
        assert_eq!(tracker.active().map(ElementId::as_str), Some("home"));
    }

    #[test]
    fn reconfigure_ignores_same_list_instance() {
        let page = page(&["home", "about"]);
        let sections = SectionList::new(["home", "about"]);
        let mut tracker = SectionTracker::mount(sections.clone(), None, &page);
        let before = tracker.engine().map(IntersectionEngine::id);
        assert!(!tracker.reconfigure(sections, None, &page));
        assert_eq!(tracker.engine().map(IntersectionEngine::id), before);

        // Equal contents, new instance: rebuild.
        assert!(tracker.reconfigure(SectionList::new(["home", "about"]), None, &page));
        assert_ne!(tracker.engine().map(IntersectionEngine::id), before);
    }

    #[test]
    fn reconfigure_drops_events_from_old_engine() {
        let page = page(&["home", "about", "contact"]);
        let mut tracker = SectionTracker::mount(SectionList::new(["home", "about"]), None, &page);
        let old = tracker.engine().map(IntersectionEngine::id);
        tracker.reconfigure(SectionList::new(["contact", "about"]), None, &page);
        // "home" is gone from the list, so active falls back to the new first.
        assert_eq!(tracker.active().map(ElementId::as_str), Some("contact"));
        if let Some(old) = old {
            tracker.handle_batch(&[entry(old, "about", true)]);
        }
        assert_eq!(tracker.active().map(ElementId::as_str), Some("contact"));
    }

    #[test]
    fn policy_override_changes_the_band() {
        let page = page(&["home", "about"]);
        let overrides = Arc::new(PolicyOverride {
            root_margin: Some("0px".parse().expect("valid margin")),
            thresholds: None,
        });
        let tracker =
            SectionTracker::mount(SectionList::new(["home", "about"]), Some(overrides), &page);
        let margin = tracker.engine().map(|e| e.policy().root_margin);
        assert_eq!(margin, Some(RootMargin::ZERO));
    }

    #[test]
    fn empty_list_has_no_active_section() {
        let page = page(&["home"]);
        let mut tracker = SectionTracker::mount(SectionList::new(Vec::<String>::new()), None, &page);
        assert!(tracker.active().is_none());
        assert!(tracker.engine().is_none());
        assert!(!tracker.refresh(&page));
    }
}
