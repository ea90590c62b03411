use scrollspy_protocol::{DomCommand, ElementId, ScrollBehavior, ScrollBlock};
use serde::{Deserialize, Serialize};

use crate::page::Page;

/// One entry of the navigation bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: ElementId,
    pub label: String,
}

impl NavItem {
    pub fn new(id: impl Into<ElementId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// The sections of the presentation page, in navigation order.
pub fn default_sections() -> Vec<NavItem> {
    vec![
        NavItem::new("home", "Home"),
        NavItem::new("about", "About"),
        NavItem::new("skills", "Skills"),
        NavItem::new("projects", "Projects"),
        NavItem::new("experience", "Experience"),
        NavItem::new("contact", "Contact"),
    ]
}

/// A navigation link as rendered, with its highlight state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub id: ElementId,
    pub label: String,
    pub href: String,
    pub active: bool,
}

pub fn nav_links(items: &[NavItem], active: Option<&ElementId>) -> Vec<NavLink> {
    items
        .iter()
        .map(|item| NavLink {
            id: item.id.clone(),
            label: item.label.clone(),
            href: format!("#{}", item.id),
            active: active == Some(&item.id),
        })
        .collect()
}

/// Smooth-scroll command bringing section `id` to the top of the viewport.
/// `None` when the section is not on the page.
pub fn navigate_to<P: Page + ?Sized>(page: &P, id: &str) -> Option<DomCommand> {
    let target = page.element_by_id(id)?;
    Some(DomCommand::ScrollIntoView {
        target,
        behavior: ScrollBehavior::Smooth,
        block: ScrollBlock::Start,
    })
}
