use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::observers::{DelaySlot, RevealConfig};

/// Key under which the reveal transition rules are installed.
pub const REVEAL_STYLE_KEY: &str = "scrollspy-reveal";

#[derive(Debug, Default)]
struct StyleEntry {
    css: String,
    holders: usize,
}

/// Style blocks installed on a page, keyed by name.
///
/// Cloning shares the underlying map. Blocks are only ever added through
/// [`StyleRegistry::install`], which hands back a [`StyleScope`] that removes
/// the block again when dropped.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry(Rc<RefCell<BTreeMap<String, StyleEntry>>>);

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `css` under `key`. Installing an existing key replaces its
    /// text; the block stays until every scope holding it is dropped.
    #[must_use = "the style block is removed when the scope is dropped"]
    pub fn install(&self, key: impl Into<String>, css: impl Into<String>) -> StyleScope {
        let key = key.into();
        let mut map = self.0.borrow_mut();
        let entry = map.entry(key.clone()).or_default();
        entry.css = css.into();
        entry.holders += 1;
        tracing::trace!(key = %key, holders = entry.holders, "style installed");
        drop(map);
        StyleScope {
            registry: self.clone(),
            key,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).map(|e| e.css.clone())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn release(&self, key: &str) {
        let mut map = self.0.borrow_mut();
        if let Some(entry) = map.get_mut(key) {
            entry.holders = entry.holders.saturating_sub(1);
            if entry.holders == 0 {
                map.remove(key);
                tracing::trace!(key, "style removed");
            }
        }
    }
}

/// Guard for an installed style block.
#[derive(Debug)]
pub struct StyleScope {
    registry: StyleRegistry,
    key: String,
}

impl StyleScope {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for StyleScope {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

/// Transition settings for reveal animations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Class every animatable element carries.
    pub base_class: String,
    pub duration_ms: u32,
    /// Extra delay per delay slot.
    pub delay_step_ms: u32,
    /// Highest delay slot that gets a rule.
    pub delay_slots: u8,
    /// Vertical offset of the unrevealed state.
    pub offset_px: f64,
    /// Opacity of the unrevealed state. Kept above zero so content that
    /// never reaches the threshold is still readable.
    pub initial_opacity: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            base_class: "animate-on-scroll".into(),
            duration_ms: 800,
            delay_step_ms: 100,
            delay_slots: 4,
            offset_px: 16.0,
            initial_opacity: 0.35,
        }
    }
}

/// CSS for the unrevealed and revealed states plus one rule per delay slot.
pub fn reveal_stylesheet(styles: &StyleConfig, reveal: &RevealConfig) -> String {
    let base = &styles.base_class;
    let revealed = &reveal.revealed_class;
    let mut css = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        css,
        ".{base} {{ opacity: {}; transform: translateY({}px); transition: opacity {d}ms ease, transform {d}ms ease; }}",
        styles.initial_opacity.clamp(0.0, 1.0),
        styles.offset_px,
        d = styles.duration_ms,
    );
    for slot in 1..=styles.delay_slots {
        let _ = writeln!(
            css,
            ".{base}[{}='{slot}'] {{ transition-delay: {}ms; }}",
            reveal.delay_attribute,
            DelaySlot(slot).delay_ms(styles.delay_step_ms),
        );
    }
    let _ = writeln!(css, ".{base}.{revealed} {{ opacity: 1; transform: translateY(0); }}");
    let _ = writeln!(
        css,
        "@media (prefers-reduced-motion: reduce) {{ .{base} {{ opacity: 1; transform: none; transition: none; }} }}"
    );
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_removes_block_on_drop() {
        let registry = StyleRegistry::new();
        {
            let scope = registry.install("app", "body { color: red; }");
            assert_eq!(scope.key(), "app");
            assert!(registry.contains("app"));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn shared_key_survives_until_last_holder() {
        let registry = StyleRegistry::new();
        let first = registry.install("app", "a {}");
        let second = registry.install("app", "b {}");
        assert_eq!(registry.get("app").as_deref(), Some("b {}"));
        drop(first);
        assert!(registry.contains("app"));
        drop(second);
        assert!(!registry.contains("app"));
    }

    #[test]
    fn stylesheet_has_rule_per_delay_slot() {
        let css = reveal_stylesheet(&StyleConfig::default(), &RevealConfig::default());
        assert!(css.contains(".animate-on-scroll[data-delay='1'] { transition-delay: 100ms; }"));
        assert!(css.contains(".animate-on-scroll[data-delay='4'] { transition-delay: 400ms; }"));
        assert!(!css.contains("data-delay='5'"));
        assert!(css.contains(".animate-on-scroll.is-inview { opacity: 1;"));
    }

    #[test]
    fn unrevealed_state_stays_readable() {
        let css = reveal_stylesheet(&StyleConfig::default(), &RevealConfig::default());
        assert!(css.starts_with(".animate-on-scroll { opacity: 0.35;"));
        assert!(css.contains("prefers-reduced-motion"));
    }
}
