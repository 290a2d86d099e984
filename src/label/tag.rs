//! Tag-based alternate labeler.
//!
//! A shortcut for pages with semantic markup: any zone owning an element
//! with the requested tag is article content, no scoring involved. Useful
//! as a fallback when the score-based pipeline fails or finds nothing.

use log::debug;

use crate::error::Result;
use crate::label::{propagate_label, ARTICLE_CONTENT};
use crate::page::ElementTree;
use crate::zone::ZoneTree;

/// Classify every zone owning an element with `tag` (matched without case),
/// then flow the label down the zone tree. Returns how many zones matched.
pub fn label_by_tag(zones: &mut ZoneTree, elements: &ElementTree, tag: &str) -> Result<usize> {
    let root = zones.root_id()?;
    let mut matched = 0;
    for id in zones.descendants_and_self(root)? {
        let mut hit = false;
        for &eid in &zones.require(id)?.payload.elements {
            if elements.require(eid)?.payload.tag.eq_ignore_ascii_case(tag) {
                hit = true;
                break;
            }
        }
        if hit {
            zones.require_mut(id)?.classes.add(ARTICLE_CONTENT);
            matched += 1;
        }
    }
    debug!("tag '{tag}' matched {matched} zones");
    propagate_label(zones, ARTICLE_CONTENT)?;
    Ok(matched)
}
