//! Integration tests: drive the tracker and the reveal controller through a
//! page the way a browser would, scroll by scroll.

use scrollspy_core::page::PageElement;
use scrollspy_core::{
    IntersectionEngine, Page, PageMut, PageSession, RevealConfig, RevealController, SectionList,
    SectionTracker, SpyConfig, StaticPage,
};
use std::sync::Arc;

use scrollspy_protocol::{
    DomCommand, ElementId, PolicyOverride, Rect, ScrollBlock, Viewport, VisibilityEvent,
};

const SECTIONS: [&str; 6] = ["home", "about", "skills", "projects", "experience", "contact"];

/// Six 900px sections, each with a heading and two staggered cards.
fn presentation_page() -> StaticPage {
    let mut page = StaticPage::new(Viewport::new(1280.0, 800.0));
    for (i, id) in SECTIONS.iter().enumerate() {
        let top = i as f64 * 900.0;
        page.push(PageElement::new(*id, Rect::new(0.0, top, 1280.0, 900.0)));
        page.push(
            PageElement::new(format!("{id}-title"), Rect::new(80.0, top + 80.0, 800.0, 60.0))
                .with_attribute("data-animate", "")
                .with_attribute("data-delay", "1"),
        );
        for card in 0..2 {
            page.push(
                PageElement::new(
                    format!("{id}-card-{card}"),
                    Rect::new(80.0 + card as f64 * 420.0, top + 300.0, 400.0, 400.0),
                )
                .with_attribute("data-animate", "")
                .with_attribute("data-delay", (card + 2).to_string()),
            );
        }
    }
    page
}

fn active(tracker: &SectionTracker) -> Option<&str> {
    tracker.active().map(ElementId::as_str)
}

#[test]
fn only_mounted_sections_are_observed() {
    let mut page = StaticPage::new(Viewport::new(1024.0, 768.0));
    page.push(PageElement::new("home", Rect::new(0.0, 0.0, 1024.0, 2000.0)));

    let tracker = SectionTracker::mount(SectionList::new(["home", "about"]), None, &page);
    assert_eq!(active(&tracker), Some("home"));
    let engine = tracker.engine().expect("home is mounted");
    assert_eq!(engine.targets().collect::<Vec<_>>(), vec![&ElementId::from("home")]);
}

#[test]
fn last_band_entry_in_a_batch_wins() {
    let page = presentation_page();
    let mut tracker = SectionTracker::mount(SectionList::new(SECTIONS), None, &page);
    let observer = tracker.engine().map(IntersectionEngine::id).expect("observing");

    let entering = |id: &str| VisibilityEvent {
        observer,
        target: id.into(),
        is_intersecting: true,
        intersection_ratio: 0.25,
        bounding_client_rect: Rect::ZERO,
        intersection_rect: Rect::ZERO,
        root_bounds: Rect::ZERO,
    };
    tracker.handle_batch(&[entering("about"), entering("home")]);
    assert_eq!(active(&tracker), Some("home"));
}

#[test]
fn reveal_fires_once_past_ten_percent() {
    let mut page = StaticPage::new(Viewport::new(1000.0, 1000.0));
    page.push(PageElement::new("spacer", Rect::new(0.0, 0.0, 1000.0, 3000.0)));
    page.push(
        PageElement::new("panel", Rect::new(0.0, 1000.0, 1000.0, 400.0))
            .with_attribute("data-animate", ""),
    );
    let mut controller = RevealController::mount(&page, &RevealConfig::default());

    // 0% visible.
    assert!(controller.refresh(&page).is_empty());
    assert!(!controller.is_revealed("panel"));

    // 15% of the panel inside the root (which ends at 900px).
    page.scroll_to(160.0);
    let commands = controller.refresh(&page);
    assert_eq!(commands.len(), 1);
    assert!(controller.is_revealed("panel"));
    assert_eq!(controller.watched(), 0);

    // Back out of view: nothing is delivered any more.
    page.scroll_to(0.0);
    assert!(controller.refresh(&page).is_empty());
    assert!(controller.is_revealed("panel"));
}

#[test]
fn empty_section_list_is_idle() {
    let page = presentation_page();
    let mut tracker = SectionTracker::mount(SectionList::new(Vec::<&str>::new()), None, &page);
    assert_eq!(active(&tracker), None);
    assert!(tracker.engine().is_none());
    assert!(!tracker.refresh(&page));
}

#[test]
fn active_section_is_always_one_of_the_requested_ids() {
    let mut page = presentation_page();
    let sections = SectionList::new(["about", "projects", "contact"]);
    let mut tracker = SectionTracker::mount(sections.clone(), None, &page);

    let max = page.max_scroll();
    let mut y = 0.0;
    while y <= max {
        page.scroll_to(y);
        tracker.refresh(&page);
        let current = tracker.active().expect("non-empty list");
        assert!(sections.contains(current), "{current} is not tracked");
        y += 37.0;
    }
}

#[test]
fn tracker_follows_a_full_scroll_down_and_back() {
    let mut page = presentation_page();
    let mut tracker = SectionTracker::mount(SectionList::new(SECTIONS), None, &page);
    tracker.refresh(&page);

    let mut visited = Vec::new();
    let mut y = 0.0;
    while y <= page.max_scroll() {
        page.scroll_to(y);
        if tracker.refresh(&page) {
            visited.push(active(&tracker).map(str::to_owned));
        }
        y += 50.0;
    }
    let visited: Vec<_> = visited.into_iter().flatten().collect();
    assert_eq!(visited, ["about", "skills", "projects", "experience", "contact"]);

    page.scroll_to(0.0);
    tracker.refresh(&page);
    assert_eq!(active(&tracker), Some("home"));
}

#[test]
fn revealed_set_only_grows() {
    let mut session = PageSession::mount(presentation_page(), &SpyConfig::default());
    let mut revealed_so_far = 0;
    let max = session.page().max_scroll();

    let jumps = [0.0, 400.0, 1200.0, 300.0, 2500.0, 0.0, max, 0.0];
    let sweep = (0..=46).map(|step| f64::from(step) * 100.0);
    for y in jumps.into_iter().chain(sweep) {
        session.scroll_to(y);
        let now = session.reveal().len() - session.reveal().pending();
        assert!(now >= revealed_so_far);
        assert_eq!(session.reveal().watched(), session.reveal().pending());
        revealed_so_far = now;
    }
    assert_eq!(session.reveal().pending(), 0);
}

#[test]
fn custom_policy_changes_when_sections_activate() {
    let mut page = presentation_page();
    // A thin strip along the top edge of the viewport.
    let overrides = Arc::new(PolicyOverride {
        root_margin: Some("0px 0px -99% 0px".parse().expect("valid margin")),
        thresholds: None,
    });
    let mut tracker = SectionTracker::mount(SectionList::new(SECTIONS), Some(overrides), &page);
    tracker.refresh(&page);

    // With the default band "about" would already be active here.
    page.scroll_to(890.0);
    tracker.refresh(&page);
    assert_eq!(active(&tracker), Some("home"));

    page.scroll_to(910.0);
    tracker.refresh(&page);
    assert_eq!(active(&tracker), Some("about"));
}

#[test]
fn remount_starts_unrevealed() {
    let mut session = PageSession::mount(presentation_page(), &SpyConfig::default());
    session.refresh();
    let page = session.unmount();
    assert!(page.styles().is_empty());
    assert!(page.has_class("home-title", "is-inview"));

    // A fresh mount starts from scratch: every element unrevealed again,
    // both in the controller and on the page.
    let mut remount = PageSession::mount(
        StaticPage::from_layout(page.layout()),
        &SpyConfig::default(),
    );
    assert_eq!(remount.reveal().pending(), remount.reveal().len());
    let leftover = remount
        .page()
        .elements()
        .iter()
        .filter(|e| e.classes.contains("is-inview"))
        .count();
    assert_eq!(leftover, 0);

    let report = remount.refresh();
    assert!(!report.revealed.is_empty());
    assert!(remount.page().has_class("home-title", "is-inview"));
    assert!(!remount.page().has_class("about-title", "is-inview"));
}

#[test]
fn navigation_lands_section_at_the_top() {
    let mut session = PageSession::mount(presentation_page(), &SpyConfig::default());
    session.refresh();
    let report = session.navigate("projects").expect("projects is mounted");
    assert_eq!(report.active.as_deref(), Some("projects"));
    assert_eq!(session.page().viewport().scroll_y, 2700.0);
    assert!(report.commands.iter().any(|c| matches!(
        c,
        DomCommand::ScrollIntoView {
            block: ScrollBlock::Start,
            ..
        }
    )));
}
