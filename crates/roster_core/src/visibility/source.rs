use super::{NodeId, ScrollRoot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

/// Tuning passed to the visibility source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserveOptions {
    /// Extra layout units around the root that still count as visible.
    pub root_margin: u32,
    /// Fraction of the sentinel that must be inside the root, `0.0..=1.0`.
    pub threshold: f32,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            root_margin: 0,
            threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChange {
    pub observer: ObserverId,
    pub is_visible: bool,
}

/// Something that can report when a node enters or leaves its scroll root.
///
/// Sources report the current visibility once right after `observe`, then on
/// every change. After `disconnect` no further changes are reported for that
/// observer.
pub trait VisibilitySource {
    fn observe(&mut self, root: ScrollRoot, sentinel: NodeId, options: ObserveOptions)
        -> ObserverId;
    fn disconnect(&mut self, observer: ObserverId);
    fn drain_changes(&mut self) -> Vec<VisibilityChange>;
}
