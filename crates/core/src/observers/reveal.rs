use std::collections::HashMap;

use scrollspy_protocol::{DomCommand, ElementId, ObservationPolicy, VisibilityEvent};
use serde::{Deserialize, Serialize};

use crate::engine::IntersectionEngine;
use crate::page::Page;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Attribute that opts an element into reveal-on-enter.
    pub marker: String,
    /// Attribute holding the element's delay slot.
    pub delay_attribute: String,
    /// Class added once the element is revealed.
    pub revealed_class: String,
    pub policy: ObservationPolicy,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            marker: "data-animate".into(),
            delay_attribute: "data-delay".into(),
            revealed_class: "is-inview".into(),
            policy: ObservationPolicy::reveal_entry(),
        }
    }
}

/// Presentation-only stagger position of an animatable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DelaySlot(pub u8);

impl DelaySlot {
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse().ok().map(Self)
    }

    pub fn delay_ms(self, step_ms: u32) -> u32 {
        u32::from(self.0) * step_ms
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedElement {
    pub id: ElementId,
    pub delay: Option<DelaySlot>,
    revealed: bool,
}

impl AnimatedElement {
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// Marks opted-in elements as revealed the first time they cross the entry
/// threshold, then stops watching them.
///
/// Discovery happens once, at mount. Revealing is one-way: an element that
/// has been revealed is unobserved in the same step, and any later event for
/// it is a no-op.
#[derive(Debug)]
pub struct RevealController {
    elements: Vec<AnimatedElement>,
    index: HashMap<ElementId, usize>,
    revealed_class: String,
    engine: Option<IntersectionEngine>,
}

impl RevealController {
    pub fn mount<P: Page + ?Sized>(page: &P, config: &RevealConfig) -> Self {
        let elements: Vec<AnimatedElement> = page
            .query_marked(&config.marker)
            .into_iter()
            .map(|id| {
                let delay = page
                    .attribute(&id, &config.delay_attribute)
                    .and_then(DelaySlot::parse);
                AnimatedElement {
                    id,
                    delay,
                    revealed: false,
                }
            })
            .collect();

        let index = elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();

        let engine = if elements.is_empty() {
            tracing::debug!(marker = %config.marker, "no animatable elements");
            None
        } else {
            let mut engine = IntersectionEngine::new(config.policy.clone());
            for element in &elements {
                engine.observe(element.id.clone());
            }
            tracing::debug!(
                observer = engine.id().0,
                elements = elements.len(),
                "reveal controller mounted"
            );
            Some(engine)
        };

        Self {
            elements,
            index,
            revealed_class: config.revealed_class.clone(),
            engine,
        }
    }

    pub fn elements(&self) -> &[AnimatedElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether `id` was discovered at mount.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.element(id).is_some_and(AnimatedElement::is_revealed)
    }

    pub fn delay_slot(&self, id: &str) -> Option<DelaySlot> {
        self.element(id).and_then(|e| e.delay)
    }

    /// Elements still waiting to be revealed.
    pub fn pending(&self) -> usize {
        self.elements.iter().filter(|e| !e.revealed).count()
    }

    /// Elements the engine is still watching.
    pub fn watched(&self) -> usize {
        self.engine.as_ref().map_or(0, IntersectionEngine::len)
    }

    pub fn engine(&self) -> Option<&IntersectionEngine> {
        self.engine.as_ref()
    }

    fn element(&self, id: &str) -> Option<&AnimatedElement> {
        self.index.get(id).and_then(|&i| self.elements.get(i))
    }

    /// `RemoveClass` for every discovered element that already carries the
    /// revealed class, so a fresh mount starts with everything unrevealed.
    pub fn reset_commands<P: Page + ?Sized>(&self, page: &P) -> Vec<DomCommand> {
        let commands: Vec<DomCommand> = self
            .elements
            .iter()
            .filter(|e| page.has_class(&e.id, &self.revealed_class))
            .map(|e| DomCommand::RemoveClass {
                target: e.id.clone(),
                class: self.revealed_class.clone(),
            })
            .collect();
        if !commands.is_empty() {
            tracing::debug!(stale = commands.len(), "clearing classes from an earlier mount");
        }
        commands
    }

    /// Compute a batch for the current viewport and apply it.
    pub fn refresh<P: Page + ?Sized>(&mut self, page: &P) -> Vec<DomCommand> {
        let Some(engine) = self.engine.as_mut() else {
            return Vec::new();
        };
        let batch = engine.compute(page);
        self.handle_batch(&batch)
    }

    /// Reveal every element the batch reports as intersecting. Returns one
    /// `AddClass` per element revealed by this call.
    pub fn handle_batch(&mut self, events: &[VisibilityEvent]) -> Vec<DomCommand> {
        let Some(engine) = self.engine.as_mut() else {
            return Vec::new();
        };
        let live = engine.id();

        let mut commands = Vec::new();
        for event in events {
            if event.observer != live || !event.is_intersecting {
                continue;
            }
            let Some(element) = self
                .index
                .get(&event.target)
                .and_then(|&i| self.elements.get_mut(i))
            else {
                continue;
            };
            if element.revealed {
                continue;
            }
            element.revealed = true;
            engine.unobserve(&element.id);
            tracing::debug!(
                element = %element.id,
                ratio = event.intersection_ratio,
                "revealed"
            );
            commands.push(DomCommand::AddClass {
                target: element.id.clone(),
                class: self.revealed_class.clone(),
            });
        }
        commands
    }

    /// Release observation of everything not yet revealed.
    pub fn teardown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.disconnect();
        }
    }
}
