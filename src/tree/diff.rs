//! Deep structural comparison of trees.
//!
//! Exists to validate serialization round trips: instead of a bare boolean,
//! comparison collects one named entry per mismatching field so a failing
//! round trip reports exactly what changed.

use std::fmt;

use crate::tree::{NodeId, Payload, Tree};

/// One field-level mismatch between two trees.
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    /// The node the mismatch was found on, if it concerns a node.
    pub node: Option<NodeId>,
    /// The field that differs ("parent", "feature 'word count'", ...).
    pub field: String,
    pub left: String,
    pub right: String,
}

impl Difference {
    pub fn new(node: Option<NodeId>, field: &str, left: String, right: String) -> Self {
        Self {
            node,
            field: field.to_string(),
            left,
            right,
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(id) => write!(
                f,
                "node {}: {} differs ({} vs {})",
                id, self.field, self.left, self.right
            ),
            None => write!(f, "{} differs ({} vs {})", self.field, self.left, self.right),
        }
    }
}

impl<P: Payload> Tree<P> {
    /// Compare two trees node by node, collecting every difference.
    ///
    /// An empty result means the trees are structurally equal. Not meant for
    /// hot paths; both trees are walked in full.
    pub fn structural_diff(&self, other: &Tree<P>) -> Vec<Difference> {
        let mut out = Vec::new();

        if self.len() != other.len() {
            out.push(Difference::new(
                None,
                "node count",
                self.len().to_string(),
                other.len().to_string(),
            ));
        }
        if self.is_linked() && other.is_linked() {
            let (a, b) = (self.root_id().ok(), other.root_id().ok());
            if a != b {
                out.push(Difference::new(
                    None,
                    "root",
                    format!("{a:?}"),
                    format!("{b:?}"),
                ));
            }
        }

        for id in self.ids() {
            let a = self.node(id).expect("id from own arena");
            let Some(b) = other.node(id) else {
                out.push(Difference::new(
                    Some(id),
                    "presence",
                    format!("{} present", P::kind_name()),
                    "absent".to_string(),
                ));
                continue;
            };

            if a.parent() != b.parent() {
                out.push(Difference::new(
                    Some(id),
                    "parent",
                    format!("{:?}", a.parent()),
                    format!("{:?}", b.parent()),
                ));
            }
            if a.children() != b.children() {
                out.push(Difference::new(
                    Some(id),
                    "children",
                    id_list(a.children()),
                    id_list(b.children()),
                ));
            }
            if a.display_order() != b.display_order() {
                out.push(Difference::new(
                    Some(id),
                    "display order",
                    format!("{:?}", a.display_order()),
                    format!("{:?}", b.display_order()),
                ));
            }
            if !a.classes.same_labels(&b.classes) {
                out.push(Difference::new(
                    Some(id),
                    "classifications",
                    label_list(&a.classes),
                    label_list(&b.classes),
                ));
            }
            diff_features(a, b, id, &mut out);
            a.payload.diff(&b.payload, id, &mut out);
        }

        for id in other.ids() {
            if self.node(id).is_none() {
                out.push(Difference::new(
                    Some(id),
                    "presence",
                    "absent".to_string(),
                    format!("{} present", P::kind_name()),
                ));
            }
        }

        out
    }
}

fn diff_features<P: Payload>(
    a: &crate::tree::Node<P>,
    b: &crate::tree::Node<P>,
    id: NodeId,
    out: &mut Vec<Difference>,
) {
    for (name, left) in a.features.iter() {
        match b.features.get(name) {
            None => out.push(Difference::new(
                Some(id),
                &format!("feature '{name}'"),
                format!("{left:?}"),
                "absent".to_string(),
            )),
            Some(right) if right != left => out.push(Difference::new(
                Some(id),
                &format!("feature '{name}'"),
                format!("{left:?}"),
                format!("{right:?}"),
            )),
            Some(_) => {}
        }
    }
    for (name, right) in b.features.iter() {
        if a.features.get(name).is_none() {
            out.push(Difference::new(
                Some(id),
                &format!("feature '{name}'"),
                "absent".to_string(),
                format!("{right:?}"),
            ));
        }
    }
}

fn id_list(ids: &[NodeId]) -> String {
    let parts: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("[{}]", parts.join(" "))
}

fn label_list(classes: &crate::tree::ClassSet) -> String {
    let parts: Vec<&str> = classes.iter().collect();
    format!("[{}]", parts.join(", "))
}
