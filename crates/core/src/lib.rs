//! Headless scroll tracking for single-page sites.
//!
//! Two observers share one primitive, the [`IntersectionEngine`]:
//!
//! - [`SectionTracker`] keeps one navigation section active as the page
//!   scrolls, using a narrow band in the middle of the viewport.
//! - [`RevealController`] marks opted-in elements as revealed the first time
//!   they scroll into view, then forgets them.
//!
//! The core never touches a real document. It reads geometry through the
//! [`Page`] trait and asks for side effects with
//! [`DomCommand`](scrollspy_protocol::DomCommand)s. [`PageSession`] wires
//! both observers, the reveal stylesheet, and the navigation bar to a page.

pub mod config;
pub mod engine;
pub mod nav;
pub mod observers;
pub mod page;
pub mod session;
pub mod styles;

pub use config::{ConfigError, SpyConfig, TrackerConfig};
pub use engine::IntersectionEngine;
pub use nav::{NavItem, NavLink};
pub use observers::{RevealConfig, RevealController, SectionList, SectionTracker};
pub use page::{Page, PageMut, StaticPage};
pub use session::{FrameReport, PageSession};
pub use styles::{StyleConfig, StyleRegistry, StyleScope};
