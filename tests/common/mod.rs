//! Shared fixtures for building small classified pages.
#![allow(dead_code)] // each test binary uses its own slice of this module

use zonal::{ElementData, ElementTree, Node, NodeId, PageText, Rect, Span};

/// Incrementally assembles a classified element tree.
pub struct TreeFixture {
    tree: ElementTree,
    next: u32,
}

impl TreeFixture {
    pub fn new() -> Self {
        Self {
            tree: ElementTree::new(),
            next: 0,
        }
    }

    /// Add an element. Parent links are wired both ways immediately.
    pub fn add(
        &mut self,
        parent: Option<NodeId>,
        tag: &str,
        classes: &[&str],
        text: (u32, u32),
        bounds: Rect,
    ) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;

        let mut data = ElementData::new(tag);
        data.text = Span::new(text.0, text.1);
        data.bounds = bounds;
        let mut node = Node::new(id, data);
        node.set_parent(parent);
        for class in classes {
            node.classes.add(class);
        }
        self.tree.insert(node).expect("unique fixture id");

        if let Some(parent) = parent {
            self.tree
                .node_mut(parent)
                .expect("parent exists")
                .push_child(id);
        }
        id
    }

    pub fn finish(mut self) -> ElementTree {
        self.tree.link().expect("fixture tree links");
        self.tree
    }

    /// The tree without linking, for tests exercising failure paths.
    pub fn finish_unlinked(self) -> ElementTree {
        self.tree
    }
}

pub fn page(text: &str) -> PageText {
    PageText {
        html: String::new(),
        text: text.to_string(),
    }
}

/// A visible box; exact coordinates rarely matter in these tests.
pub fn visible() -> Rect {
    Rect::new(0, 0, 100, 20)
}

/// A zero-area box, i.e. an element that does not render.
pub fn collapsed() -> Rect {
    Rect::new(0, 0, 0, 0)
}
