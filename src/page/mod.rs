//! The classified element tree a page capture delivers.
//!
//! Elements are read-only input: the rendering collaborator positions them,
//! the pre-classification collaborator tags them with vocabulary labels, and
//! everything downstream only ever looks at them. Element text is not stored
//! per node; every element carries byte-offset spans into the two shared
//! page strings.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::geom::Rect;
use crate::tree::diff::Difference;
use crate::tree::{NodeId, Payload, Tree};

/// Byte-offset range into one of the shared page strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Slice the shared string this span points into.
    pub fn slice<'a>(&self, text: &'a str) -> Result<&'a str> {
        text.get(self.start as usize..self.end as usize)
            .ok_or(Error::SpanOutOfRange(self.start, self.end))
    }
}

/// The two shared strings every element span points into.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    /// Serialized document markup.
    pub html: String,
    /// Rendered document text in document order.
    pub text: String,
}

/// One rendered element as delivered by the capture collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    /// Markup span covering the element and its subtree.
    pub outer_html: Span,
    /// Markup span covering only the element's contents.
    pub inner_html: Span,
    /// Rendered-text span covering the element's subtree.
    pub text: Span,
    pub bounds: Rect,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            outer_html: Span::default(),
            inner_html: Span::default(),
            text: Span::default(),
            bounds: Rect::default(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Look up a computed style. Unregistered names are a hard error.
    pub fn style(&self, name: &str) -> Result<&str> {
        self.styles
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownStyle(name.to_string()))
    }
}

impl Payload for ElementData {
    fn kind_name() -> &'static str {
        "element"
    }

    fn diff(&self, other: &Self, node: NodeId, out: &mut Vec<Difference>) {
        if self.tag != other.tag {
            out.push(Difference::new(
                Some(node),
                "tag",
                self.tag.clone(),
                other.tag.clone(),
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
        for (field, a, b) in [
            ("outer html span", self.outer_html, other.outer_html),
            ("inner html span", self.inner_html, other.inner_html),
            ("text span", self.text, other.text),
        ] {
            if a != b {
                out.push(Difference::new(
                    Some(node),
                    field,
                    format!("{}..{}", a.start, a.end),
                    format!("{}..{}", b.start, b.end),
                ));
            }
        }
        if self.attributes != other.attributes {
            out.push(Difference::new(
                Some(node),
                "attributes",
                format!("{:?}", self.attributes),
                format!("{:?}", other.attributes),
            ));
        }
        if self.styles != other.styles {
            out.push(Difference::new(
                Some(node),
                "styles",
                format!("{:?}", self.styles),
                format!("{:?}", other.styles),
            ));
        }
    }
}

/// A linked tree of classified elements.
pub type ElementTree = Tree<ElementData>;

/// The classification names the external pre-classifier assigns.
///
/// The exact strings are configuration; these defaults match the capture
/// pipeline's stock vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub significant_block: String,
    pub significant_inline: String,
    pub significant_linebreak: String,
    pub significant_invisible: String,
    pub break_down: String,
    pub aname: String,
    pub hidden: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            significant_block: "SignificantBlock".to_string(),
            significant_inline: "SignificantInline".to_string(),
            significant_linebreak: "SignificantLinebreak".to_string(),
            significant_invisible: "SignificantInvisible".to_string(),
            break_down: "BreakDown".to_string(),
            aname: "Aname".to_string(),
            hidden: "Hidden".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_slice_bounds_checked() {
        let text = "hello";
        assert_eq!(Span::new(1, 4).slice(text).unwrap(), "ell");
        assert!(matches!(
            Span::new(2, 9).slice(text),
            Err(Error::SpanOutOfRange(2, 9))
        ));
    }

    #[test]
    fn test_unknown_style_is_an_error() {
        let mut el = ElementData::new("div");
        el.styles.insert("display".to_string(), "block".to_string());
        assert_eq!(el.style("display").unwrap(), "block");
        assert!(matches!(el.style("color"), Err(Error::UnknownStyle(_))));
    }
}
