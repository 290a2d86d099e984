//! Post-construction pass: crop zone text views and derive bounds.
//!
//! Nothing is copied while grouping runs; once the tree is linked this pass
//! walks it once, slicing each zone's raw and visible text out of the shared
//! page text and unioning leaf boxes into zone bounds.

use crate::error::Result;
use crate::geom::Rect;
use crate::page::{ElementTree, PageText, Span};
use crate::tree::NodeId;
use crate::zone::builder::ZoneRules;
use crate::zone::ZoneTree;

pub(crate) fn finish_zones(
    zones: &mut ZoneTree,
    elements: &ElementTree,
    page: &PageText,
    rules: &dyn ZoneRules,
) -> Result<()> {
    // Ranges the visible text must not include, computed once for the whole
    // element tree and shared by every zone below.
    let hidden = hidden_ranges(elements, rules)?;

    let root = zones.root_id()?;
    for id in zones.descendants_and_self(root)? {
        let owned = zones.require(id)?.payload.elements.clone();
        let Some(span) = covering_span(elements, &owned)? else {
            continue;
        };
        let text = span.slice(&page.text)?.to_string();
        let visible_text = visible_slice(span, &hidden, &page.text)?;
        let bounds = leaf_bounds(elements, &owned)?;

        let zone = zones.require_mut(id)?;
        zone.payload.text = text;
        zone.payload.visible_text = visible_text;
        zone.payload.bounds = bounds;
    }
    Ok(())
}

/// Merged text ranges covered by hidden or zero-area elements.
fn hidden_ranges(elements: &ElementTree, rules: &dyn ZoneRules) -> Result<Vec<Span>> {
    let root = elements.root_id()?;
    let mut spans = Vec::new();
    for id in elements.descendants_and_self(root)? {
        let node = elements.require(id)?;
        if (!node.payload.bounds.has_area() || rules.hidden(&node.classes))
            && !node.payload.text.is_empty()
        {
            spans.push(node.payload.text);
        }
    }
    spans.sort_by_key(|s| (s.start, s.end));

    let mut merged: Vec<Span> = Vec::new();
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    Ok(merged)
}

/// Tightest span covering every owned element's text.
fn covering_span(elements: &ElementTree, owned: &[NodeId]) -> Result<Option<Span>> {
    let mut out: Option<Span> = None;
    for &eid in owned {
        let span = elements.require(eid)?.payload.text;
        out = Some(match out {
            None => span,
            Some(acc) => Span::new(acc.start.min(span.start), acc.end.max(span.end)),
        });
    }
    Ok(out)
}

/// `span` with every hidden range cut out.
fn visible_slice(span: Span, hidden: &[Span], text: &str) -> Result<String> {
    let mut out = String::new();
    let mut cursor = span.start;
    for h in hidden {
        if h.end <= cursor {
            continue;
        }
        if h.start >= span.end {
            break;
        }
        if h.start > cursor {
            out.push_str(Span::new(cursor, h.start.min(span.end)).slice(text)?);
        }
        cursor = cursor.max(h.end);
    }
    if cursor < span.end {
        out.push_str(Span::new(cursor, span.end).slice(text)?);
    }
    Ok(out)
}

/// Union of positive-area leaf boxes under the owned elements.
fn leaf_bounds(elements: &ElementTree, owned: &[NodeId]) -> Result<Rect> {
    let mut out: Option<Rect> = None;
    for &eid in owned {
        for leaf in elements.leaves(eid)? {
            let bounds = elements.require(leaf)?.payload.bounds;
            if !bounds.has_area() {
                continue;
            }
            out = Some(match out {
                None => bounds,
                Some(acc) => acc.union(&bounds),
            });
        }
    }
    Ok(out.unwrap_or_default())
}
