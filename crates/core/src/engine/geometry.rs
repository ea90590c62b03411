use scrollspy_protocol::Rect;

/// Where a target sits relative to a (margin-adjusted) root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub bounding: Rect,
    pub intersection: Option<Rect>,
    pub ratio: f64,
}

impl Measurement {
    pub fn is_intersecting(&self) -> bool {
        self.intersection.is_some()
    }
}

/// Measure a target against `root`.
///
/// A detached target (`None`) never intersects. A zero-area target that
/// touches the root counts as fully visible.
pub fn measure(target: Option<Rect>, root: &Rect) -> Measurement {
    let Some(bounding) = target else {
        return Measurement {
            bounding: Rect::ZERO,
            intersection: None,
            ratio: 0.0,
        };
    };

    let intersection = bounding.intersection(root);
    let ratio = match intersection {
        None => 0.0,
        Some(hit) => {
            let area = bounding.area();
            if area > 0.0 {
                (hit.area() / area).clamp(0.0, 1.0)
            } else {
                1.0
            }
        }
    };

    Measurement {
        bounding,
        intersection,
        ratio,
    }
}
