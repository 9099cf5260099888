//! Terminal table as a layout tree and visibility source.
//!
//! The table is the only scrolling element: a window of `height` rows over
//! the loaded rows, moved by scroll commands.

use std::collections::BTreeMap;
use std::ops::Range;

use roster_core::visibility::{
    LayoutTree, NodeId, ObserveOptions, ObserverId, Overflow, ScrollRoot, VisibilityChange,
    VisibilitySource,
};

pub const DOCUMENT_NODE: NodeId = 1;
pub const TABLE_NODE: NodeId = 2;
const ROW_NODE_BASE: NodeId = 1_000;

#[derive(Debug, Clone, Copy)]
struct Watch {
    sentinel: NodeId,
    root_margin: usize,
    is_visible: bool,
}

#[derive(Debug)]
pub struct TerminalViewport {
    height: usize,
    row_count: usize,
    offset: usize,
    watches: BTreeMap<ObserverId, Watch>,
    next_observer: u64,
    changes: Vec<VisibilityChange>,
}

impl TerminalViewport {
    pub fn new(height: usize) -> Self {
        Self {
            height: height.max(1),
            row_count: 0,
            offset: 0,
            watches: BTreeMap::new(),
            next_observer: 0,
            changes: Vec::new(),
        }
    }

    pub fn row_node(index: usize) -> NodeId {
        ROW_NODE_BASE + index as NodeId
    }

    fn row_index(node: NodeId) -> Option<usize> {
        node.checked_sub(ROW_NODE_BASE).map(|index| index as usize)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows currently on screen.
    pub fn window(&self) -> Range<usize> {
        self.offset..(self.offset + self.height).min(self.row_count)
    }

    pub fn set_row_count(&mut self, row_count: usize) {
        if row_count == self.row_count {
            return;
        }
        self.row_count = row_count;
        self.offset = self.offset.min(self.max_offset());
        self.refresh();
    }

    pub fn scroll_by(&mut self, delta: i64) {
        let target = if delta.is_negative() {
            self.offset.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            self.offset.saturating_add(delta as usize)
        };
        self.scroll_to(target);
    }

    pub fn scroll_to(&mut self, offset: usize) {
        let offset = offset.min(self.max_offset());
        if offset != self.offset {
            self.offset = offset;
            self.refresh();
        }
    }

    fn max_offset(&self) -> usize {
        self.row_count.saturating_sub(self.height)
    }

    fn is_row_visible(&self, node: NodeId, root_margin: usize) -> bool {
        let Some(index) = Self::row_index(node) else {
            return false;
        };
        if index >= self.row_count {
            return false;
        }
        let start = self.offset.saturating_sub(root_margin);
        let end = self.offset + self.height + root_margin;
        (start..end).contains(&index)
    }

    fn refresh(&mut self) {
        let updates: Vec<(ObserverId, bool)> = self
            .watches
            .iter()
            .map(|(id, watch)| (*id, self.is_row_visible(watch.sentinel, watch.root_margin)))
            .filter(|(id, visible)| self.watches[id].is_visible != *visible)
            .collect();
        for (observer, is_visible) in updates {
            if let Some(watch) = self.watches.get_mut(&observer) {
                watch.is_visible = is_visible;
            }
            self.changes.push(VisibilityChange {
                observer,
                is_visible,
            });
        }
    }
}

impl LayoutTree for TerminalViewport {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        match node {
            DOCUMENT_NODE => None,
            TABLE_NODE => Some(DOCUMENT_NODE),
            _ => Self::row_index(node).map(|_| TABLE_NODE),
        }
    }

    fn overflow_y(&self, node: NodeId) -> Overflow {
        if node == TABLE_NODE {
            Overflow::Auto
        } else {
            Overflow::Visible
        }
    }

    fn scroll_height(&self, node: NodeId) -> u32 {
        match node {
            TABLE_NODE => self.row_count as u32,
            DOCUMENT_NODE => self.height as u32,
            _ => 1,
        }
    }

    fn client_height(&self, node: NodeId) -> u32 {
        match node {
            TABLE_NODE | DOCUMENT_NODE => self.height as u32,
            _ => 1,
        }
    }

    fn viewport_height(&self) -> u32 {
        self.height as u32
    }

    fn document_height(&self) -> u32 {
        self.height as u32
    }
}

impl VisibilitySource for TerminalViewport {
    fn observe(
        &mut self,
        _root: ScrollRoot,
        sentinel: NodeId,
        options: ObserveOptions,
    ) -> ObserverId {
        self.next_observer += 1;
        let observer = ObserverId(self.next_observer);
        let root_margin = options.root_margin as usize;
        let is_visible = self.is_row_visible(sentinel, root_margin);
        self.watches.insert(
            observer,
            Watch {
                sentinel,
                root_margin,
                is_visible,
            },
        );
        self.changes.push(VisibilityChange {
            observer,
            is_visible,
        });
        observer
    }

    fn disconnect(&mut self, observer: ObserverId) {
        self.watches.remove(&observer);
        self.changes.retain(|change| change.observer != observer);
    }

    fn drain_changes(&mut self) -> Vec<VisibilityChange> {
        std::mem::take(&mut self.changes)
    }
}
