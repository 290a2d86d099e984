//! Visitor dispatch over trees.
//!
//! Post-processing passes (labelers, validators) implement [`Visitor`]; the
//! tree drives them over any walker order and stops early when asked.

use crate::error::Result;
use crate::tree::{NodeId, Payload, Tree};
use crate::tree::walk::Walker;

/// Whether a traversal should keep going after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// A pass over tree nodes. Visitors may mutate the node they are handed.
pub trait Visitor<P> {
    fn visit(&mut self, tree: &mut Tree<P>, id: NodeId) -> Flow;
}

impl<P: Payload> Tree<P> {
    /// Dispatch a single node to the visitor.
    pub fn accept_node(&mut self, visitor: &mut dyn Visitor<P>, id: NodeId) -> Result<Flow> {
        self.require(id)?;
        Ok(visitor.visit(self, id))
    }

    /// Drive the visitor over the whole tree in the walker's order,
    /// stopping early when it signals [`Flow::Stop`].
    pub fn accept(
        &mut self,
        visitor: &mut dyn Visitor<P>,
        walker: &mut dyn Walker<P>,
    ) -> Result<()> {
        let root = self.root_id()?;
        // Fix the order first so the visitor is free to mutate nodes.
        let order = self.descendants_and_self_with(root, walker, None)?;
        for id in order {
            if visitor.visit(self, id) == Flow::Stop {
                break;
            }
        }
        Ok(())
    }
}
