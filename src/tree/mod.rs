//! Generic tree core shared by element, zone, and column trees.
//!
//! Trees are id-indexed arenas built in two phases: nodes are inserted
//! holding raw parent/children ids in any order, then a single [`Tree::link`]
//! pass validates that every id resolves and that parent/child links agree.
//! Traversal is only available on a linked tree, so construction order never
//! has to respect parent-before-child.

pub mod diff;
pub mod feature;
pub mod visit;
pub mod walk;

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use self::diff::Difference;
use self::feature::FeatureMap;

/// Unique identifier for a node within one tree.
///
/// Element and zone trees have disjoint id spaces; a `NodeId` is only
/// meaningful together with the tree it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload carried by every node of a particular tree kind.
pub trait Payload {
    /// Singular noun used in diagnostics and XML tags ("element", "zone").
    fn kind_name() -> &'static str;

    /// Compare payload fields, appending one difference per mismatch.
    fn diff(&self, other: &Self, node: NodeId, out: &mut Vec<Difference>);
}

/// Deduplicated, trimmed classification labels attached to a node.
///
/// Insertion order is preserved but carries no meaning; comparisons are
/// order-insensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassSet {
    labels: Vec<String>,
}

impl ClassSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label. Whitespace is trimmed; duplicates are ignored.
    /// Returns whether the set changed.
    pub fn add(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.has(label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    /// Remove a label. Returns whether it was present.
    pub fn remove(&mut self, label: &str) -> bool {
        let label = label.trim();
        let before = self.labels.len();
        self.labels.retain(|l| l != label);
        self.labels.len() != before
    }

    pub fn has(&self, label: &str) -> bool {
        let label = label.trim();
        self.labels.iter().any(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Order-insensitive equality.
    pub fn same_labels(&self, other: &ClassSet) -> bool {
        self.labels.len() == other.labels.len() && self.labels.iter().all(|l| other.has(l))
    }
}

/// A single tree node: identity, links, classifications, features, and the
/// tree-kind payload.
///
/// `parent`/`children` hold raw ids until the owning tree is linked.
#[derive(Debug, Clone)]
pub struct Node<P> {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    display_order: Option<u32>,
    pub classes: ClassSet,
    pub features: FeatureMap,
    pub payload: P,
}

impl<P> Node<P> {
    pub fn new(id: NodeId, payload: P) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            display_order: None,
            classes: ClassSet::new(),
            features: FeatureMap::new(),
            payload,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Document-order position assigned after construction.
    pub fn display_order(&self) -> Option<u32> {
        self.display_order
    }

    pub fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub fn set_display_order(&mut self, order: Option<u32>) {
        self.display_order = order;
    }
}

/// Id-indexed arena holding one tree's nodes.
#[derive(Debug, Clone, Default)]
pub struct Tree<P> {
    nodes: Vec<Node<P>>,
    index: HashMap<NodeId, usize>,
    root: Option<NodeId>,
    linked: bool,
}

impl<P: Payload> Tree<P> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            root: None,
            linked: false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Add a node to the arena. Only allowed before [`Tree::link`].
    pub fn insert(&mut self, node: Node<P>) -> Result<NodeId> {
        if self.linked {
            return Err(Error::AlreadyLinked);
        }
        let id = node.id;
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateId(id));
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<P>> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<P>> {
        match self.index.get(&id) {
            Some(&i) => Some(&mut self.nodes[i]),
            None => None,
        }
    }

    /// Node lookup that treats absence as an error.
    pub fn require(&self, id: NodeId) -> Result<&Node<P>> {
        self.node(id).ok_or(Error::MissingNode(id))
    }

    pub fn require_mut(&mut self, id: NodeId) -> Result<&mut Node<P>> {
        match self.index.get(&id) {
            Some(&i) => Ok(&mut self.nodes[i]),
            None => Err(Error::MissingNode(id)),
        }
    }

    /// The root node id. Only available once the tree is linked.
    pub fn root_id(&self) -> Result<NodeId> {
        if !self.linked {
            return Err(Error::NotLinked);
        }
        self.root.ok_or(Error::MissingRoot)
    }

    /// All node ids in insertion order, regardless of link state.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// Resolve and validate all parent/children ids.
    ///
    /// Must be called exactly once, after every node of the tree has been
    /// inserted. Fails if a referenced id is absent, if parent and child
    /// links disagree, if the tree has no unique root, or if any node is
    /// unreachable from the root.
    pub fn link(&mut self) -> Result<()> {
        if self.linked {
            return Err(Error::AlreadyLinked);
        }
        if self.nodes.is_empty() {
            return Err(Error::MissingRoot);
        }

        // Every referenced id must resolve.
        for node in &self.nodes {
            if let Some(parent) = node.parent
                && !self.index.contains_key(&parent)
            {
                return Err(Error::MissingNode(parent));
            }
            for &child in &node.children {
                if !self.index.contains_key(&child) {
                    return Err(Error::MissingNode(child));
                }
            }
        }

        // Parent and child links must agree in both directions.
        for node in &self.nodes {
            for &child in &node.children {
                let child_node = &self.nodes[self.index[&child]];
                if child_node.parent != Some(node.id) {
                    return Err(Error::InvalidTree(format!(
                        "node {} lists child {} whose parent is {:?}",
                        node.id, child, child_node.parent
                    )));
                }
            }
            if let Some(parent) = node.parent {
                let parent_node = &self.nodes[self.index[&parent]];
                if !parent_node.children.contains(&node.id) {
                    return Err(Error::InvalidTree(format!(
                        "node {} claims parent {} which does not list it",
                        node.id, parent
                    )));
                }
            }
        }

        // Exactly one root.
        let mut roots = self.nodes.iter().filter(|n| n.parent.is_none());
        let root = roots.next().ok_or(Error::MissingRoot)?.id;
        if let Some(extra) = roots.next() {
            return Err(Error::InvalidTree(format!(
                "multiple roots: {} and {}",
                root, extra.id
            )));
        }

        // Everything must hang off the root (catches cycles and islands).
        let mut seen = 0usize;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            seen += 1;
            stack.extend(self.nodes[self.index[&id]].children.iter().copied());
        }
        if seen != self.nodes.len() {
            return Err(Error::InvalidTree(format!(
                "{} of {} nodes reachable from root {}",
                seen,
                self.nodes.len(),
                root
            )));
        }

        self.root = Some(root);
        self.linked = true;
        debug!(
            "linked {} tree: {} nodes, root {}",
            P::kind_name(),
            self.nodes.len(),
            root
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl Payload for Plain {
        fn kind_name() -> &'static str {
            "plain"
        }

        fn diff(&self, _other: &Self, _node: NodeId, _out: &mut Vec<Difference>) {}
    }

    fn two_node_tree() -> Tree<Plain> {
        let mut tree = Tree::new();
        let mut root = Node::new(NodeId(0), Plain);
        root.push_child(NodeId(1));
        tree.insert(root).unwrap();
        let mut child = Node::new(NodeId(1), Plain);
        child.set_parent(Some(NodeId(0)));
        tree.insert(child).unwrap();
        tree
    }

    #[test]
    fn test_link_resolves_out_of_order_insertion() {
        let mut tree = Tree::new();
        let mut child = Node::new(NodeId(1), Plain);
        child.set_parent(Some(NodeId(0)));
        tree.insert(child).unwrap();
        let mut root = Node::new(NodeId(0), Plain);
        root.push_child(NodeId(1));
        tree.insert(root).unwrap();
        tree.link().unwrap();
        assert_eq!(tree.root_id().unwrap(), NodeId(0));
    }

    #[test]
    fn test_link_rejects_absent_id() {
        let mut tree: Tree<Plain> = Tree::new();
        let mut root = Node::new(NodeId(0), Plain);
        root.push_child(NodeId(9));
        tree.insert(root).unwrap();
        assert!(matches!(tree.link(), Err(Error::MissingNode(NodeId(9)))));
    }

    #[test]
    fn test_link_rejects_one_sided_links() {
        let mut tree = Tree::new();
        let mut root = Node::new(NodeId(0), Plain);
        root.push_child(NodeId(1));
        tree.insert(root).unwrap();
        // Child never points back at the root.
        tree.insert(Node::new(NodeId(1), Plain)).unwrap();
        assert!(matches!(tree.link(), Err(Error::InvalidTree(_))));
    }

    #[test]
    fn test_link_exactly_once() {
        let mut tree = two_node_tree();
        tree.link().unwrap();
        assert!(matches!(tree.link(), Err(Error::AlreadyLinked)));
    }

    #[test]
    fn test_traversal_requires_link() {
        let tree = two_node_tree();
        assert!(matches!(tree.root_id(), Err(Error::NotLinked)));
    }

    #[test]
    fn test_class_set_trims_and_dedupes() {
        let mut classes = ClassSet::new();
        assert!(classes.add("  paragraph "));
        assert!(!classes.add("paragraph"));
        assert!(classes.has(" paragraph"));
        assert_eq!(classes.len(), 1);
        assert!(classes.remove("paragraph"));
        assert!(classes.is_empty());
    }
}
