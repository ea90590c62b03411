//! The two consumers of the intersection engine. Each owns its own engine
//! and shares nothing with the other.

pub mod reveal;
pub mod tracker;

pub use reveal::{AnimatedElement, DelaySlot, RevealConfig, RevealController};
pub use tracker::{SectionList, SectionTracker};
