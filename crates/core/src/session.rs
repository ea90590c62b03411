use std::sync::Arc;

use scrollspy_protocol::{DomCommand, ElementId, PolicyOverride, Viewport};
use serde::Serialize;

use crate::config::SpyConfig;
use crate::nav::{self, NavItem, NavLink};
use crate::observers::{RevealController, SectionList, SectionTracker};
use crate::page::{Page, PageMut};
use crate::styles::{REVEAL_STYLE_KEY, StyleScope, reveal_stylesheet};

/// What one frame changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub active: Option<ElementId>,
    pub active_changed: bool,
    /// Elements revealed during this frame, in document order.
    pub revealed: Vec<ElementId>,
    /// Commands already applied to the page.
    pub commands: Vec<DomCommand>,
}

/// A mounted view: one page, its reveal stylesheet, and both observers.
///
/// Mounting installs the stylesheet and starts observation; the host then
/// calls [`refresh`](Self::refresh) (or one of the scroll helpers) once per
/// frame. [`unmount`](Self::unmount) releases everything and hands the page
/// back.
#[derive(Debug)]
pub struct PageSession<P: PageMut> {
    page: P,
    nav: Vec<NavItem>,
    tracker: SectionTracker,
    reveal: RevealController,
    styles: StyleScope,
}

impl<P: PageMut> PageSession<P> {
    pub fn mount(mut page: P, config: &SpyConfig) -> Self {
        let styles = page.styles().install(
            REVEAL_STYLE_KEY,
            reveal_stylesheet(&config.styles, &config.reveal),
        );
        let reveal = RevealController::mount(&page, &config.reveal);
        for command in reveal.reset_commands(&page) {
            page.apply(&command);
        }
        let tracker = SectionTracker::mount(
            config.section_list(),
            config.tracker.policy.clone().map(Arc::new),
            &page,
        );
        tracing::debug!(
            sections = config.sections.len(),
            animated = reveal.len(),
            "page session mounted"
        );
        Self {
            page,
            nav: config.sections.clone(),
            tracker,
            reveal,
            styles,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn tracker(&self) -> &SectionTracker {
        &self.tracker
    }

    pub fn reveal(&self) -> &RevealController {
        &self.reveal
    }

    pub fn active(&self) -> Option<&ElementId> {
        self.tracker.active()
    }

    pub fn nav_links(&self) -> Vec<NavLink> {
        nav::nav_links(&self.nav, self.tracker.active())
    }

    pub fn stylesheet_key(&self) -> &str {
        self.styles.key()
    }

    /// Run both observers against the current viewport and apply the
    /// resulting commands to the page.
    pub fn refresh(&mut self) -> FrameReport {
        let commands = self.reveal.refresh(&self.page);
        for command in &commands {
            self.page.apply(command);
        }
        let active_changed = self.tracker.refresh(&self.page);

        let revealed = commands
            .iter()
            .filter_map(|c| match c {
                DomCommand::AddClass { target, .. } => Some(target.clone()),
                DomCommand::RemoveClass { .. } | DomCommand::ScrollIntoView { .. } => None,
            })
            .collect();

        FrameReport {
            active: self.tracker.active().cloned(),
            active_changed,
            revealed,
            commands,
        }
    }

    /// Report a scroll or resize and refresh.
    pub fn set_viewport(&mut self, viewport: Viewport) -> FrameReport {
        self.page.set_viewport(viewport);
        self.refresh()
    }

    pub fn scroll_to(&mut self, y: f64) -> FrameReport {
        let mut viewport = self.page.viewport();
        viewport.scroll_y = y;
        self.set_viewport(viewport)
    }

    pub fn scroll_by(&mut self, dy: f64) -> FrameReport {
        let y = self.page.viewport().scroll_y + dy;
        self.scroll_to(y)
    }

    /// Scroll a section into view. `None` when it is not on the page.
    pub fn navigate(&mut self, id: &str) -> Option<FrameReport> {
        let command = nav::navigate_to(&self.page, id)?;
        self.page.apply(&command);
        let mut report = self.refresh();
        report.commands.insert(0, command);
        Some(report)
    }

    /// Swap the tracked sections. The navigation bar follows the new list.
    pub fn set_sections(&mut self, sections: Vec<NavItem>, overrides: Option<Arc<PolicyOverride>>) {
        let list: SectionList = sections.iter().map(|s| s.id.clone()).collect();
        self.tracker.reconfigure(list, overrides, &self.page);
        self.nav = sections;
    }

    /// Stop observing, remove the stylesheet, and return the page.
    pub fn unmount(self) -> P {
        let Self {
            page,
            mut tracker,
            mut reveal,
            styles,
            ..
        } = self;
        tracker.teardown();
        reveal.teardown();
        drop(styles);
        tracing::debug!("page session unmounted");
        page
    }
}
