//! The zone model: merged runs of elements treated as one content unit.

pub mod builder;
mod text;

use crate::geom::Rect;
use crate::tree::diff::Difference;
use crate::tree::{NodeId, Payload, Tree};

/// Zone life-cycle type.
///
/// `Unknown` is provisional: grouping retypes or merges every Unknown zone
/// away, and only the root-level zone may still carry it when construction
/// returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneKind {
    #[default]
    Unknown,
    Inline,
    Linebreak,
}

impl ZoneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Unknown => "unknown",
            ZoneKind::Inline => "inline",
            ZoneKind::Linebreak => "linebreak",
        }
    }

    pub fn parse(s: &str) -> Option<ZoneKind> {
        match s {
            "unknown" => Some(ZoneKind::Unknown),
            "inline" => Some(ZoneKind::Inline),
            "linebreak" => Some(ZoneKind::Linebreak),
            _ => None,
        }
    }
}

/// Payload of a zone node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneData {
    pub kind: ZoneKind,
    /// Element ids this zone owns, contiguous in document order.
    pub elements: Vec<NodeId>,
    /// Raw page text covering the owned elements. Derived after grouping.
    pub text: String,
    /// `text` minus every range covered by a hidden or zero-area element.
    pub visible_text: String,
    /// Union of the positive-area leaf boxes under the owned elements.
    pub bounds: Rect,
}

impl ZoneData {
    pub fn new(kind: ZoneKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}

impl Payload for ZoneData {
    fn kind_name() -> &'static str {
        "zone"
    }

    // The text views are recomputable from element spans and are not
    // persisted, so they stay out of the structural comparison.
    fn diff(&self, other: &Self, node: NodeId, out: &mut Vec<Difference>) {
        if self.kind != other.kind {
            out.push(Difference::new(
                Some(node),
                "zone kind",
                self.kind.as_str().to_string(),
                other.kind.as_str().to_string(),
            ));
        }
        if self.elements != other.elements {
            let fmt = |ids: &[NodeId]| {
                let parts: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                format!("[{}]", parts.join(" "))
            };
            out.push(Difference::new(
                Some(node),
                "owned elements",
                fmt(&self.elements),
                fmt(&other.elements),
            ));
        }
        if self.bounds != other.bounds {
            out.push(Difference::new(
                Some(node),
                "bounds",
                format!("{:?}", self.bounds),
                format!("{:?}", other.bounds),
            ));
        }
    }
}

/// A linked tree of zones layered above an element tree.
pub type ZoneTree = Tree<ZoneData>;
