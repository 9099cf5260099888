use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use super::{
    LayoutTree, NodeId, ObserveOptions, ObserverId, Overflow, ScrollRoot, VisibilityChange,
    VisibilitySource,
};

#[derive(Debug, Clone, Copy, Default)]
struct ManualNode {
    parent: Option<NodeId>,
    overflow: Overflow,
    scroll_height: u32,
    client_height: u32,
}

#[derive(Debug, Clone, Copy)]
struct Observation {
    root: ScrollRoot,
    sentinel: NodeId,
}

#[derive(Debug, Default)]
struct ManualInner {
    nodes: HashMap<NodeId, ManualNode>,
    viewport_height: u32,
    document_height: u32,
    visible: HashSet<NodeId>,
    observers: BTreeMap<ObserverId, Observation>,
    next_observer: u64,
    changes: Vec<VisibilityChange>,
}

/// A hand-driven layout and visibility source.
///
/// Clones share state, so a test can keep one handle while a
/// [`super::SentinelBinding`] owns another, then flip visibility with
/// [`ManualVisibilitySource::set_visible`] to simulate scrolling.
#[derive(Debug, Clone, Default)]
pub struct ManualVisibilitySource {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualVisibilitySource {
    pub fn new(viewport_height: u32, document_height: u32) -> Self {
        let source = Self::default();
        {
            let mut inner = source.inner.borrow_mut();
            inner.viewport_height = viewport_height;
            inner.document_height = document_height;
        }
        source
    }

    pub fn add_node(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        overflow: Overflow,
        scroll_height: u32,
        client_height: u32,
    ) {
        self.inner.borrow_mut().nodes.insert(
            id,
            ManualNode {
                parent,
                overflow,
                scroll_height,
                client_height,
            },
        );
    }

    pub fn set_scroll_height(&self, id: NodeId, scroll_height: u32) {
        if let Some(node) = self.inner.borrow_mut().nodes.get_mut(&id) {
            node.scroll_height = scroll_height;
        }
    }

    pub fn set_document_height(&self, height: u32) {
        self.inner.borrow_mut().document_height = height;
    }

    /// Marks `node` visible or hidden and notifies every observer watching it.
    pub fn set_visible(&self, node: NodeId, visible: bool) {
        let mut inner = self.inner.borrow_mut();
        let changed = if visible {
            inner.visible.insert(node)
        } else {
            inner.visible.remove(&node)
        };
        if !changed {
            return;
        }
        let watching: Vec<ObserverId> = inner
            .observers
            .iter()
            .filter(|(_, observation)| observation.sentinel == node)
            .map(|(id, _)| *id)
            .collect();
        inner
            .changes
            .extend(watching.into_iter().map(|observer| VisibilityChange {
                observer,
                is_visible: visible,
            }));
    }

    pub fn active_observers(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Root and sentinel of every live observer, in creation order.
    pub fn observations(&self) -> Vec<(ScrollRoot, NodeId)> {
        self.inner
            .borrow()
            .observers
            .values()
            .map(|observation| (observation.root, observation.sentinel))
            .collect()
    }

    fn node(&self, id: NodeId) -> ManualNode {
        self.inner
            .borrow()
            .nodes
            .get(&id)
            .copied()
            .unwrap_or_default()
    }
}

impl LayoutTree for ManualVisibilitySource {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    fn overflow_y(&self, node: NodeId) -> Overflow {
        self.node(node).overflow
    }

    fn scroll_height(&self, node: NodeId) -> u32 {
        self.node(node).scroll_height
    }

    fn client_height(&self, node: NodeId) -> u32 {
        self.node(node).client_height
    }

    fn viewport_height(&self) -> u32 {
        self.inner.borrow().viewport_height
    }

    fn document_height(&self) -> u32 {
        self.inner.borrow().document_height
    }
}

impl VisibilitySource for ManualVisibilitySource {
    fn observe(
        &mut self,
        root: ScrollRoot,
        sentinel: NodeId,
        _options: ObserveOptions,
    ) -> ObserverId {
        let mut inner = self.inner.borrow_mut();
        inner.next_observer += 1;
        let observer = ObserverId(inner.next_observer);
        inner.observers.insert(observer, Observation { root, sentinel });
        let is_visible = inner.visible.contains(&sentinel);
        inner.changes.push(VisibilityChange {
            observer,
            is_visible,
        });
        observer
    }

    fn disconnect(&mut self, observer: ObserverId) {
        let mut inner = self.inner.borrow_mut();
        inner.observers.remove(&observer);
        inner.changes.retain(|change| change.observer != observer);
    }

    fn drain_changes(&mut self) -> Vec<VisibilityChange> {
        std::mem::take(&mut self.inner.borrow_mut().changes)
    }
}
