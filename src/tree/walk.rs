//! Traversal strategies over linked trees.
//!
//! A walker is a stateful cursor, single-use per traversal: `init` points it
//! before the start node, `next_node` advances. Re-initializing resets the
//! cursor. Traversal methods on [`Tree`] accept any walker plus an optional
//! filter; only nodes the filter accepts are yielded.

use std::collections::VecDeque;

use crate::error::Result;
use crate::tree::{Node, NodeId, Payload, Tree};

/// Predicate deciding whether a traversal yields a node.
pub type Filter<'f, P> = dyn Fn(&Node<P>) -> bool + 'f;

/// A resumable traversal cursor over one tree.
pub trait Walker<P> {
    /// Reset the cursor to "before `start`".
    fn init(&mut self, tree: &Tree<P>, start: NodeId);

    /// Advance and return the next node, or `None` when exhausted.
    fn next_node(&mut self, tree: &Tree<P>) -> Option<NodeId>;
}

/// Level-order traversal. The default strategy.
#[derive(Debug, Default)]
pub struct BreadthFirst {
    queue: VecDeque<NodeId>,
}

impl BreadthFirst {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: Payload> Walker<P> for BreadthFirst {
    fn init(&mut self, _tree: &Tree<P>, start: NodeId) {
        self.queue.clear();
        self.queue.push_back(start);
    }

    fn next_node(&mut self, tree: &Tree<P>) -> Option<NodeId> {
        let id = self.queue.pop_front()?;
        if let Some(node) = tree.node(id) {
            self.queue.extend(node.children().iter().copied());
        }
        Some(id)
    }
}

/// Pre-order depth-first traversal.
#[derive(Debug, Default)]
pub struct DepthFirst {
    stack: Vec<NodeId>,
}

impl DepthFirst {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: Payload> Walker<P> for DepthFirst {
    fn init(&mut self, _tree: &Tree<P>, start: NodeId) {
        self.stack.clear();
        self.stack.push(start);
    }

    fn next_node(&mut self, tree: &Tree<P>) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = tree.node(id) {
            // Push children in reverse so the first child pops first.
            self.stack.extend(node.children().iter().rev().copied());
        }
        Some(id)
    }
}

/// Depth-first traversal that yields only leaf nodes.
#[derive(Debug, Default)]
pub struct LeafOnly {
    inner: DepthFirst,
}

impl LeafOnly {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: Payload> Walker<P> for LeafOnly {
    fn init(&mut self, tree: &Tree<P>, start: NodeId) {
        Walker::<P>::init(&mut self.inner, tree, start);
    }

    fn next_node(&mut self, tree: &Tree<P>) -> Option<NodeId> {
        loop {
            let id = self.inner.next_node(tree)?;
            if tree.node(id).is_some_and(|n| n.is_leaf()) {
                return Some(id);
            }
        }
    }
}

/// Yields the mirror order of a base walker.
///
/// Children come out before their parents when wrapping [`BreadthFirst`],
/// which is what bottom-up aggregation wants.
#[derive(Debug)]
pub struct Reversed<W> {
    base: W,
    order: Vec<NodeId>,
    cursor: usize,
}

impl<W> Reversed<W> {
    pub fn new(base: W) -> Self {
        Self {
            base,
            order: Vec::new(),
            cursor: 0,
        }
    }
}

impl<P, W: Walker<P>> Walker<P> for Reversed<W> {
    fn init(&mut self, tree: &Tree<P>, start: NodeId) {
        self.base.init(tree, start);
        self.order.clear();
        while let Some(id) = self.base.next_node(tree) {
            self.order.push(id);
        }
        self.order.reverse();
        self.cursor = 0;
    }

    fn next_node(&mut self, _tree: &Tree<P>) -> Option<NodeId> {
        let id = self.order.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(id)
    }
}

impl<P: Payload> Tree<P> {
    /// `start` and everything below it, breadth-first.
    pub fn descendants_and_self(&self, start: NodeId) -> Result<Vec<NodeId>> {
        self.descendants_and_self_with(start, &mut BreadthFirst::new(), None)
    }

    /// `start` and everything below it, in the walker's order.
    pub fn descendants_and_self_with(
        &self,
        start: NodeId,
        walker: &mut dyn Walker<P>,
        filter: Option<&Filter<'_, P>>,
    ) -> Result<Vec<NodeId>> {
        self.root_id()?;
        self.require(start)?;
        walker.init(self, start);
        let mut out = Vec::new();
        while let Some(id) = walker.next_node(self) {
            if let Some(filter) = filter
                && !self.require(id).map(filter)?
            {
                continue;
            }
            out.push(id);
        }
        Ok(out)
    }

    /// Everything strictly below `start`, breadth-first.
    pub fn descendants(&self, start: NodeId) -> Result<Vec<NodeId>> {
        self.descendants_with(start, &mut BreadthFirst::new(), None)
    }

    /// Everything strictly below `start`, in the walker's order.
    pub fn descendants_with(
        &self,
        start: NodeId,
        walker: &mut dyn Walker<P>,
        filter: Option<&Filter<'_, P>>,
    ) -> Result<Vec<NodeId>> {
        let mut out = self.descendants_and_self_with(start, walker, filter)?;
        out.retain(|&id| id != start);
        Ok(out)
    }

    /// Leaf nodes under `start`, in document order.
    pub fn leaves(&self, start: NodeId) -> Result<Vec<NodeId>> {
        self.descendants_and_self_with(start, &mut LeafOnly::new(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::diff::Difference;

    struct Plain;

    impl Payload for Plain {
        fn kind_name() -> &'static str {
            "plain"
        }

        fn diff(&self, _other: &Self, _node: NodeId, _out: &mut Vec<Difference>) {}
    }

    /// 0 -> (1 -> (3, 4), 2)
    fn sample() -> Tree<Plain> {
        let mut tree = Tree::new();
        let links: &[(u32, Option<u32>, &[u32])] = &[
            (0, None, &[1, 2]),
            (1, Some(0), &[3, 4]),
            (2, Some(0), &[]),
            (3, Some(1), &[]),
            (4, Some(1), &[]),
        ];
        for &(id, parent, children) in links {
            let mut node = Node::new(NodeId(id), Plain);
            node.set_parent(parent.map(NodeId));
            for &c in children {
                node.push_child(NodeId(c));
            }
            tree.insert(node).unwrap();
        }
        tree.link().unwrap();
        tree
    }

    fn ids(v: Vec<NodeId>) -> Vec<u32> {
        v.into_iter().map(|id| id.0).collect()
    }

    #[test]
    fn test_breadth_first_order() {
        let tree = sample();
        assert_eq!(ids(tree.descendants_and_self(NodeId(0)).unwrap()), [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_depth_first_order() {
        let tree = sample();
        let order = tree
            .descendants_and_self_with(NodeId(0), &mut DepthFirst::new(), None)
            .unwrap();
        assert_eq!(ids(order), [0, 1, 3, 4, 2]);
    }

    #[test]
    fn test_leaves_in_document_order() {
        let tree = sample();
        assert_eq!(ids(tree.leaves(NodeId(0)).unwrap()), [3, 4, 2]);
    }

    #[test]
    fn test_reversed_mirrors_base() {
        let tree = sample();
        let order = tree
            .descendants_and_self_with(NodeId(0), &mut Reversed::new(BreadthFirst::new()), None)
            .unwrap();
        assert_eq!(ids(order), [4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_reinit_resets_cursor() {
        let tree = sample();
        let mut walker = DepthFirst::new();
        Walker::<Plain>::init(&mut walker, &tree, NodeId(0));
        assert_eq!(walker.next_node(&tree), Some(NodeId(0)));
        assert_eq!(walker.next_node(&tree), Some(NodeId(1)));
        Walker::<Plain>::init(&mut walker, &tree, NodeId(0));
        assert_eq!(walker.next_node(&tree), Some(NodeId(0)));
    }

    #[test]
    fn test_filter_restricts_yield() {
        let tree = sample();
        let filter = |n: &Node<Plain>| n.is_leaf();
        let order = tree
            .descendants_and_self_with(NodeId(0), &mut BreadthFirst::new(), Some(&filter))
            .unwrap();
        assert_eq!(ids(order), [2, 3, 4]);
    }

    #[test]
    fn test_descendants_excludes_start() {
        let tree = sample();
        assert_eq!(ids(tree.descendants(NodeId(1)).unwrap()), [3, 4]);
    }
}
