mod static_page;

pub use static_page::{PageElement, PageLayout, StaticPage};

use scrollspy_protocol::{DomCommand, ElementId, Rect, Viewport};

use crate::styles::StyleRegistry;

/// Read access to the document the observers run against.
///
/// This is the only boundary between the core and its host: a wasm page
/// backs it with the real DOM, tests and the terminal host use
/// [`StaticPage`].
pub trait Page {
    fn viewport(&self) -> Viewport;

    /// Resolve a DOM id. `None` when no such element is mounted.
    fn element_by_id(&self, id: &str) -> Option<ElementId>;

    /// All mounted elements carrying `attribute`, in document order.
    fn query_marked(&self, attribute: &str) -> Vec<ElementId>;

    /// Element rectangle relative to the viewport.
    fn bounding_client_rect(&self, id: &ElementId) -> Option<Rect>;

    fn attribute(&self, id: &ElementId, name: &str) -> Option<&str>;

    /// Whether the element with DOM id `id` carries `class`.
    fn has_class(&self, id: &str, class: &str) -> bool;
}

/// A page that accepts side effects from the core.
pub trait PageMut: Page {
    fn apply(&mut self, command: &DomCommand);

    /// Report a scroll or resize.
    fn set_viewport(&mut self, viewport: Viewport);

    fn styles(&self) -> &StyleRegistry;
}
