pub type NodeId = u64;

/// Upper bound on ancestors visited while looking for a scroll root.
const MAX_ANCESTOR_DEPTH: usize = 256;

/// Computed vertical overflow of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Auto,
    Scroll,
}

impl Overflow {
    pub fn allows_scroll(self) -> bool {
        matches!(self, Overflow::Auto | Overflow::Scroll)
    }
}

/// Read-only view of the rendered layout the sentinel lives in.
pub trait LayoutTree {
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn overflow_y(&self, node: NodeId) -> Overflow;
    /// Full content height of `node`.
    fn scroll_height(&self, node: NodeId) -> u32;
    /// Visible height of `node`.
    fn client_height(&self, node: NodeId) -> u32;
    fn viewport_height(&self) -> u32;
    fn document_height(&self) -> u32;
}

/// What the sentinel's visibility is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRoot {
    Element(NodeId),
    Viewport,
}

pub fn is_scroll_container<L: LayoutTree + ?Sized>(tree: &L, node: NodeId) -> bool {
    tree.overflow_y(node).allows_scroll() && tree.scroll_height(node) > tree.client_height(node)
}

/// Finds the element that actually scrolls the sentinel.
///
/// Walks up from the sentinel's parent and takes the first ancestor that both
/// allows scrolling and has content taller than its visible height. A caller
/// supplied container is only used when no such ancestor exists; without one
/// the document viewport is the root.
pub fn resolve_scroll_root<L: LayoutTree + ?Sized>(
    tree: &L,
    container: Option<NodeId>,
    sentinel: NodeId,
) -> ScrollRoot {
    let mut current = tree.parent(sentinel);
    let mut depth = 0;
    while let Some(node) = current {
        if depth >= MAX_ANCESTOR_DEPTH {
            break;
        }
        if is_scroll_container(tree, node) {
            return ScrollRoot::Element(node);
        }
        current = tree.parent(node);
        depth += 1;
    }
    match container {
        Some(node) => ScrollRoot::Element(node),
        None => ScrollRoot::Viewport,
    }
}

/// True when the root's content is taller than what it shows.
pub fn content_overflows<L: LayoutTree + ?Sized>(tree: &L, root: ScrollRoot) -> bool {
    match root {
        ScrollRoot::Element(node) => tree.scroll_height(node) > tree.client_height(node),
        ScrollRoot::Viewport => tree.document_height() > tree.viewport_height(),
    }
}
