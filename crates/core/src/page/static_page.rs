use std::collections::{BTreeMap, BTreeSet, HashMap};

use scrollspy_protocol::{DomCommand, ElementId, Rect, ScrollBlock, Viewport};
use serde::{Deserialize, Serialize};

use super::{Page, PageMut};
use crate::styles::StyleRegistry;

/// One element of a [`StaticPage`], positioned in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageElement {
    pub id: ElementId,
    pub rect: Rect,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub classes: BTreeSet<String>,
}

impl PageElement {
    pub fn new(id: impl Into<ElementId>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            rect,
            attributes: BTreeMap::new(),
            classes: BTreeSet::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }
}

/// Serialized form of a [`StaticPage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub viewport: Viewport,
    #[serde(default)]
    pub elements: Vec<PageElement>,
}

/// In-memory document: a list of positioned elements and a scrollable
/// viewport. Elements are kept in document order.
#[derive(Debug, Default)]
pub struct StaticPage {
    viewport: Option<Viewport>,
    elements: Vec<PageElement>,
    /// First element for each id, like `getElementById`.
    index: HashMap<ElementId, usize>,
    styles: StyleRegistry,
}

impl StaticPage {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Some(viewport),
            ..Self::default()
        }
    }

    pub fn from_layout(layout: PageLayout) -> Self {
        let mut page = Self::new(layout.viewport);
        for element in layout.elements {
            page.push(element);
        }
        page.clamp_scroll();
        page
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<PageLayout>(json).map(Self::from_layout)
    }

    pub fn layout(&self) -> PageLayout {
        PageLayout {
            viewport: self.viewport(),
            elements: self.elements.clone(),
        }
    }

    /// Append an element at the end of the document.
    pub fn push(&mut self, element: PageElement) {
        let idx = self.elements.len();
        self.index.entry(element.id.clone()).or_insert(idx);
        self.elements.push(element);
    }

    /// Unmount every element with `id`. Returns how many were removed.
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.elements.len();
        self.elements.retain(|e| e.id.as_str() != id);
        self.reindex();
        before - self.elements.len()
    }

    pub fn element(&self, id: &str) -> Option<&PageElement> {
        self.index.get(id).and_then(|&i| self.elements.get(i))
    }

    pub fn elements(&self) -> &[PageElement] {
        &self.elements
    }

    /// Bottom edge of the lowest element.
    pub fn document_height(&self) -> f64 {
        self.elements
            .iter()
            .map(|e| e.rect.bottom())
            .fold(0.0, f64::max)
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport().height).max(0.0)
    }

    /// Scroll vertically, clamped to the document.
    pub fn scroll_to(&mut self, y: f64) {
        let mut viewport = self.viewport();
        viewport.scroll_y = y;
        self.set_viewport(viewport);
    }

    pub fn scroll_by(&mut self, dy: f64) {
        let y = self.viewport().scroll_y + dy;
        self.scroll_to(y);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        let mut viewport = self.viewport();
        viewport.width = width;
        viewport.height = height;
        self.set_viewport(viewport);
    }

    fn clamp_scroll(&mut self) {
        let max = self.max_scroll();
        if let Some(vp) = self.viewport.as_mut() {
            if vp.scroll_y.is_nan() {
                vp.scroll_y = 0.0;
            }
            if !vp.scroll_x.is_finite() {
                vp.scroll_x = 0.0;
            }
            vp.scroll_y = vp.scroll_y.clamp(0.0, max);
            vp.scroll_x = vp.scroll_x.max(0.0);
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, element) in self.elements.iter().enumerate() {
            self.index.entry(element.id.clone()).or_insert(i);
        }
    }

    fn scroll_target(&self, rect: &Rect, block: ScrollBlock) -> Option<f64> {
        let vp = self.viewport();
        let y = match block {
            ScrollBlock::Start => rect.y,
            ScrollBlock::Center => rect.y + rect.h / 2.0 - vp.height / 2.0,
            ScrollBlock::End => rect.bottom() - vp.height,
            ScrollBlock::Nearest => {
                if rect.y < vp.scroll_y {
                    rect.y
                } else if rect.bottom() > vp.scroll_y + vp.height {
                    rect.bottom() - vp.height
                } else {
                    return None;
                }
            }
        };
        Some(y)
    }
}

impl Page for StaticPage {
    fn viewport(&self) -> Viewport {
        self.viewport.unwrap_or_else(|| Viewport::new(0.0, 0.0))
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.element(id).map(|e| e.id.clone())
    }

    fn query_marked(&self, attribute: &str) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|e| e.attributes.contains_key(attribute))
            .map(|e| e.id.clone())
            .collect()
    }

    fn bounding_client_rect(&self, id: &ElementId) -> Option<Rect> {
        let element = self.element(id)?;
        Some(self.viewport().to_client(&element.rect))
    }

    fn attribute(&self, id: &ElementId, name: &str) -> Option<&str> {
        self.element(id)?.attributes.get(name).map(String::as_str)
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.classes.contains(class))
    }
}

impl PageMut for StaticPage {
    fn apply(&mut self, command: &DomCommand) {
        match command {
            DomCommand::AddClass { target, class } => {
                if let Some(element) = self
                    .index
                    .get(target.as_str())
                    .copied()
                    .and_then(|i| self.elements.get_mut(i))
                {
                    element.classes.insert(class.clone());
                }
            }
            DomCommand::RemoveClass { target, class } => {
                if let Some(element) = self
                    .index
                    .get(target.as_str())
                    .copied()
                    .and_then(|i| self.elements.get_mut(i))
                {
                    element.classes.remove(class);
                }
            }
            DomCommand::ScrollIntoView { target, block, .. } => {
                let Some(rect) = self.element(target).map(|e| e.rect) else {
                    return;
                };
                if let Some(y) = self.scroll_target(&rect, *block) {
                    self.scroll_to(y);
                }
            }
        }
    }

    /// Fields that are not usable numbers keep their previous value: NaN
    /// for the scroll offsets, NaN, infinite or negative for the size.
    /// Infinite offsets are clamped to the document.
    fn set_viewport(&mut self, viewport: Viewport) {
        let previous = self.viewport();
        let offset = |new: f64, old: f64| if new.is_nan() { old } else { new };
        let extent = |new: f64, old: f64| {
            if new.is_finite() && new >= 0.0 {
                new
            } else {
                old
            }
        };
        let next = Viewport {
            scroll_x: offset(viewport.scroll_x, previous.scroll_x),
            scroll_y: offset(viewport.scroll_y, previous.scroll_y),
            width: extent(viewport.width, previous.width),
            height: extent(viewport.height, previous.height),
        };
        if next != viewport {
            tracing::debug!(?viewport, kept = ?next, "unusable viewport values ignored");
        }
        self.viewport = Some(next);
        self.clamp_scroll();
    }

    fn styles(&self) -> &StyleRegistry {
        &self.styles
    }
}
