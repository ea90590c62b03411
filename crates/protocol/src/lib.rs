pub mod commands;
pub mod event;
pub mod ident;
pub mod margin;
pub mod policy;
pub mod types;

pub use commands::{DomCommand, ScrollBehavior, ScrollBlock};
pub use event::{ObserverId, VisibilityEvent};
pub use ident::ElementId;
pub use margin::{Length, MarginParseError, RootMargin};
pub use policy::{ObservationPolicy, PolicyError, PolicyOverride, Thresholds};
pub use types::{Rect, Viewport};
