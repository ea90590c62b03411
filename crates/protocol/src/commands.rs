use serde::{Deserialize, Serialize};

use crate::ident::ElementId;

/// A side effect the core asks its host page to perform.
///
/// The core never touches the page directly; consumers return a
/// `Vec<DomCommand>` and the host applies them in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomCommand {
    /// Add a presentation class to an element. Adding a class the element
    /// already has is a no-op.
    AddClass { target: ElementId, class: String },

    /// Remove a presentation class. Removing a class the element does not
    /// have is a no-op.
    RemoveClass { target: ElementId, class: String },

    /// Scroll the page so that `target` lands at `block` within the
    /// viewport.
    ScrollIntoView {
        target: ElementId,
        behavior: ScrollBehavior,
        block: ScrollBlock,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

/// Vertical alignment of a scrolled-to element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBlock {
    #[default]
    Start,
    Center,
    End,
    Nearest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_tagged_for_js_hosts() {
        let cmd = DomCommand::AddClass {
            target: ElementId::from("hero-title"),
            class: "is-inview".into(),
        };
        let json = serde_json::to_string(&cmd).expect("serializable");
        assert_eq!(
            json,
            r#"{"kind":"add_class","target":"hero-title","class":"is-inview"}"#
        );

        let cmd = DomCommand::RemoveClass {
            target: ElementId::from("hero-title"),
            class: "is-inview".into(),
        };
        let json = serde_json::to_string(&cmd).expect("serializable");
        assert!(json.starts_with(r#"{"kind":"remove_class","#));
    }
}
