//! Recursive zone segmentation over a classified element tree.
//!
//! The builder starts from a single root zone owning the root element and
//! repeatedly breaks zones apart: each pass finds the first breakdown
//! element a zone owns and regroups that element's direct children into
//! child zones. Grouping decisions come from caller-supplied predicates over
//! element classification sets.

use log::debug;

use crate::error::{Error, Result};
use crate::page::{ElementTree, PageText, Vocabulary};
use crate::tree::visit::Visitor;
use crate::tree::walk::{BreadthFirst, DepthFirst};
use crate::tree::{ClassSet, Node, NodeId};
use crate::zone::{text, ZoneData, ZoneKind, ZoneTree};

/// Classification predicates driving segmentation.
///
/// `hidden` is not a grouping rule; the text-cropping pass uses it to decide
/// which ranges drop out of a zone's visible text.
pub trait ZoneRules {
    /// Marker elements that close the current zone without joining any.
    fn starts_new_zone(&self, classes: &ClassSet) -> bool;
    /// Elements whose children are regrouped into finer zones.
    fn breaks_down(&self, classes: &ClassSet) -> bool;
    fn significant_block(&self, classes: &ClassSet) -> bool;
    fn significant_inline(&self, classes: &ClassSet) -> bool;
    fn significant_invisible(&self, classes: &ClassSet) -> bool;
    fn hidden(&self, classes: &ClassSet) -> bool;
}

/// [`ZoneRules`] reading the configured [`Vocabulary`] names.
#[derive(Debug, Clone, Default)]
pub struct VocabularyRules {
    vocabulary: Vocabulary,
}

impl VocabularyRules {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }
}

impl ZoneRules for VocabularyRules {
    fn starts_new_zone(&self, classes: &ClassSet) -> bool {
        classes.has(&self.vocabulary.aname)
    }

    fn breaks_down(&self, classes: &ClassSet) -> bool {
        classes.has(&self.vocabulary.break_down)
    }

    // Explicit linebreak elements force a boundary exactly like blocks do,
    // and the zone they land in is Linebreak-typed either way.
    fn significant_block(&self, classes: &ClassSet) -> bool {
        classes.has(&self.vocabulary.significant_block)
            || classes.has(&self.vocabulary.significant_linebreak)
    }

    fn significant_inline(&self, classes: &ClassSet) -> bool {
        classes.has(&self.vocabulary.significant_inline)
    }

    fn significant_invisible(&self, classes: &ClassSet) -> bool {
        classes.has(&self.vocabulary.significant_invisible)
    }

    fn hidden(&self, classes: &ClassSet) -> bool {
        classes.has(&self.vocabulary.hidden)
    }
}

/// Builds a [`ZoneTree`] from a classified element tree.
pub struct ZoneTreeBuilder<'r> {
    rules: &'r dyn ZoneRules,
    post: Vec<Box<dyn Visitor<ZoneData>>>,
}

impl<'r> ZoneTreeBuilder<'r> {
    pub fn new(rules: &'r dyn ZoneRules) -> Self {
        Self {
            rules,
            post: Vec::new(),
        }
    }

    /// Register a visitor to run over the finished tree, in breadth-first
    /// order, after cropping and display-order assignment.
    pub fn with_visitor(mut self, visitor: Box<dyn Visitor<ZoneData>>) -> Self {
        self.post.push(visitor);
        self
    }

    /// Build the zone tree.
    ///
    /// Either the whole pipeline succeeds or a single construction error
    /// wrapping the original cause comes back; no partial tree is returned.
    pub fn build(&mut self, elements: &ElementTree, page: &PageText) -> Result<ZoneTree> {
        self.run(elements, page)
            .map_err(|e| Error::Construction(Box::new(e)))
    }

    fn run(&mut self, elements: &ElementTree, page: &PageText) -> Result<ZoneTree> {
        let root_element = elements.root_id()?;
        let mut zones = ZoneTree::new();
        let mut next_id = 0u32;

        let root_zone = alloc_id(&mut next_id);
        let mut root_data = ZoneData::new(ZoneKind::Unknown);
        root_data.elements.push(root_element);
        zones.insert(Node::new(root_zone, root_data))?;

        self.expand(&mut zones, root_zone, elements, &mut next_id)?;
        zones.link()?;
        debug!(
            "segmented {} elements into {} zones",
            elements.len(),
            zones.len()
        );

        text::finish_zones(&mut zones, elements, page, self.rules)?;
        assign_display_order(&mut zones)?;

        for visitor in &mut self.post {
            zones.accept(&mut **visitor, &mut BreadthFirst::new())?;
        }
        Ok(zones)
    }

    /// One breakdown step: regroup the children of the zone's first
    /// breakdown element into child zones, then recurse into each.
    fn expand(
        &self,
        zones: &mut ZoneTree,
        zone_id: NodeId,
        elements: &ElementTree,
        next_id: &mut u32,
    ) -> Result<()> {
        let owned = zones.require(zone_id)?.payload.elements.clone();
        let mut anchor = None;
        for eid in owned {
            if self.rules.breaks_down(&elements.require(eid)?.classes) {
                anchor = Some(eid);
                break;
            }
        }
        let Some(anchor) = anchor else {
            return Ok(());
        };

        let mut staged: Vec<Node<ZoneData>> = Vec::new();
        open_zone(&mut staged, next_id, ZoneKind::Unknown);

        for &child in elements.require(anchor)?.children() {
            let classes = &elements.require(child)?.classes;
            let cursor_kind = staged.last().expect("cursor zone always open").payload.kind;

            if self.rules.starts_new_zone(classes) {
                // Purely closes the current zone; the marker joins nothing.
                open_zone(&mut staged, next_id, ZoneKind::Unknown);
            } else if self.rules.breaks_down(classes) || self.rules.significant_block(classes) {
                if cursor_kind == ZoneKind::Unknown {
                    // Continue the provisional zone as the block's zone.
                    let cursor = staged.last_mut().expect("cursor zone always open");
                    cursor.payload.kind = ZoneKind::Linebreak;
                    cursor.payload.elements.push(child);
                } else {
                    let zone = open_zone(&mut staged, next_id, ZoneKind::Linebreak);
                    zone.payload.elements.push(child);
                }
            } else if self.rules.significant_inline(classes) {
                if cursor_kind == ZoneKind::Inline {
                    let cursor = staged.last_mut().expect("cursor zone always open");
                    cursor.payload.elements.push(child);
                } else {
                    let zone = open_zone(&mut staged, next_id, ZoneKind::Inline);
                    zone.payload.elements.push(child);
                }
            } else if self.rules.significant_invisible(classes) {
                let cursor = staged.last_mut().expect("cursor zone always open");
                cursor.payload.elements.push(child);
            }
            // Anything else is dropped from zoning; it stays reachable
            // through the element tree.
        }

        finalize_zone_list(&mut staged);

        let child_zones: Vec<NodeId> = staged.iter().map(|n| n.id()).collect();
        for mut node in staged {
            node.set_parent(Some(zone_id));
            zones.insert(node)?;
        }
        {
            let parent = zones.require_mut(zone_id)?;
            for &child in &child_zones {
                parent.push_child(child);
            }
        }
        for child in child_zones {
            self.expand(zones, child, elements, next_id)?;
        }
        Ok(())
    }
}

fn alloc_id(next_id: &mut u32) -> NodeId {
    let id = NodeId(*next_id);
    *next_id += 1;
    id
}

fn open_zone<'a>(
    staged: &'a mut Vec<Node<ZoneData>>,
    next_id: &mut u32,
    kind: ZoneKind,
) -> &'a mut Node<ZoneData> {
    let id = alloc_id(next_id);
    staged.push(Node::new(id, ZoneData::new(kind)));
    staged.last_mut().expect("just pushed")
}

/// Zone-list finalization. Idempotent.
///
/// Provisional (Unknown) zones merge into their predecessor; a leading one
/// merges forward instead, and a sole survivor is retyped. Empty zones are
/// dropped last.
pub(crate) fn finalize_zone_list(zones: &mut Vec<Node<ZoneData>>) {
    let mut i = 1;
    while i < zones.len() {
        if zones[i].payload.kind == ZoneKind::Unknown {
            let moved = std::mem::take(&mut zones[i].payload.elements);
            zones[i - 1].payload.elements.extend(moved);
            zones.remove(i);
        } else {
            i += 1;
        }
    }

    if let Some(first) = zones.first()
        && first.payload.kind == ZoneKind::Unknown
    {
        if zones.len() > 1 {
            let moved = std::mem::take(&mut zones[0].payload.elements);
            zones.remove(0);
            zones[0].payload.elements.splice(0..0, moved);
        } else if !zones[0].payload.elements.is_empty() {
            zones[0].payload.kind = ZoneKind::Linebreak;
        }
    }

    zones.retain(|z| !z.payload.elements.is_empty());
}

/// Pre-order depth-first numbering over the finished tree.
fn assign_display_order(zones: &mut ZoneTree) -> Result<()> {
    let root = zones.root_id()?;
    let order = zones.descendants_and_self_with(root, &mut DepthFirst::new(), None)?;
    for (position, id) in order.into_iter().enumerate() {
        zones
            .require_mut(id)?
            .set_display_order(Some(position as u32));
    }
    Ok(())
}
