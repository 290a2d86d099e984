//! Column grouping of zones.
//!
//! Columns group zones into layout columns. The grouping itself is built by
//! an external component; this crate defines the payload and consumes the
//! tree in the content labeler, where columns carry the same score-fraction
//! feature convention as zones.

use crate::tree::diff::Difference;
use crate::tree::{NodeId, Payload, Tree};

/// Payload of a column node: the zones the column covers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnData {
    pub zones: Vec<NodeId>,
}

impl ColumnData {
    pub fn new(zones: Vec<NodeId>) -> Self {
        Self { zones }
    }
}

impl Payload for ColumnData {
    fn kind_name() -> &'static str {
        "column"
    }

    fn diff(&self, other: &Self, node: NodeId, out: &mut Vec<Difference>) {
        if self.zones != other.zones {
            let fmt = |ids: &[NodeId]| {
                let parts: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                format!("[{}]", parts.join(" "))
            };
            out.push(Difference::new(
                Some(node),
                "covered zones",
                fmt(&self.zones),
                fmt(&other.zones),
            ));
        }
    }
}

/// A linked tree of layout columns.
pub type ColumnTree = Tree<ColumnData>;
