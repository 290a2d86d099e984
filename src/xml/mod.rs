//! XML persistence of element and zone trees.
//!
//! One document per tree, one XML element per node, recording identity,
//! links, display order, classifications, features, and the payload fields.
//! Reading is two-phase like every tree build here: nodes are staged with
//! raw ids in whatever order the document lists them, then linked once at
//! the end, which also validates the persisted links.

use std::collections::BTreeMap;
use std::str::FromStr;

use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::geom::Rect;
use crate::page::{ElementData, ElementTree, Span};
use crate::tree::feature::FeatureValue;
use crate::tree::{Node, NodeId, Tree};
use crate::zone::{ZoneData, ZoneKind, ZoneTree};

// ============================================================================
// Writing
// ============================================================================

/// Serialize an element tree.
pub fn write_element_tree(tree: &ElementTree) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<element-tree>\n");
    for id in tree.ids() {
        let Some(node) = tree.node(id) else { continue };
        let el = &node.payload;

        xml.push_str(&format!("  <element id=\"{}\"", node.id()));
        push_shared_attrs(&mut xml, node);
        xml.push_str(&format!(" tag=\"{}\">\n", escape_xml(&el.tag)));

        push_bounds(&mut xml, &el.bounds);
        for (name, span) in [
            ("outer-html", el.outer_html),
            ("inner-html", el.inner_html),
            ("text", el.text),
        ] {
            xml.push_str(&format!(
                "    <span of=\"{}\" start=\"{}\" end=\"{}\"/>\n",
                name, span.start, span.end
            ));
        }
        for (name, value) in &el.attributes {
            xml.push_str(&format!(
                "    <attribute name=\"{}\">{}</attribute>\n",
                escape_xml(name),
                escape_xml(value)
            ));
        }
        for (name, value) in &el.styles {
            xml.push_str(&format!(
                "    <style name=\"{}\">{}</style>\n",
                escape_xml(name),
                escape_xml(value)
            ));
        }
        push_classes_and_features(&mut xml, node);
        push_children(&mut xml, node);
        xml.push_str("  </element>\n");
    }
    xml.push_str("</element-tree>\n");
    xml
}

/// Serialize a zone tree.
///
/// The derived text views are not persisted; they are recomputed from the
/// element spans whenever needed.
pub fn write_zone_tree(tree: &ZoneTree) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<zone-tree>\n");
    for id in tree.ids() {
        let Some(node) = tree.node(id) else { continue };
        let zone = &node.payload;

        xml.push_str(&format!("  <zone id=\"{}\"", node.id()));
        push_shared_attrs(&mut xml, node);
        xml.push_str(&format!(" kind=\"{}\">\n", zone.kind.as_str()));

        push_bounds(&mut xml, &zone.bounds);
        if !zone.elements.is_empty() {
            xml.push_str(&format!(
                "    <elements>{}</elements>\n",
                id_list(&zone.elements)
            ));
        }
        push_classes_and_features(&mut xml, node);
        push_children(&mut xml, node);
        xml.push_str("  </zone>\n");
    }
    xml.push_str("</zone-tree>\n");
    xml
}

fn push_shared_attrs<P>(xml: &mut String, node: &Node<P>) {
    if let Some(order) = node.display_order() {
        xml.push_str(&format!(" order=\"{order}\""));
    }
    if let Some(parent) = node.parent() {
        xml.push_str(&format!(" parent=\"{parent}\""));
    }
}

fn push_bounds(xml: &mut String, bounds: &Rect) {
    xml.push_str(&format!(
        "    <bounds left=\"{}\" top=\"{}\" right=\"{}\" bottom=\"{}\"/>\n",
        bounds.left, bounds.top, bounds.right, bounds.bottom
    ));
}

fn push_classes_and_features<P>(xml: &mut String, node: &Node<P>) {
    for label in node.classes.iter() {
        xml.push_str(&format!("    <class>{}</class>\n", escape_xml(label)));
    }
    for (name, value) in node.features.iter() {
        let (kind, body) = match value {
            FeatureValue::Int(v) => ("int", v.to_string()),
            FeatureValue::Decimal(v) => ("decimal", v.to_string()),
            FeatureValue::Text(v) => ("text", escape_xml(v)),
            FeatureValue::Flag(v) => ("flag", v.to_string()),
        };
        xml.push_str(&format!(
            "    <feature name=\"{}\" type=\"{}\">{}</feature>\n",
            escape_xml(name),
            kind,
            body
        ));
    }
}

fn push_children<P>(xml: &mut String, node: &Node<P>) {
    if !node.children().is_empty() {
        xml.push_str(&format!(
            "    <children>{}</children>\n",
            id_list(node.children())
        ));
    }
}

fn id_list(ids: &[NodeId]) -> String {
    let parts: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    parts.join(" ")
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Reading
// ============================================================================

/// What text content the reader is currently collecting.
enum Capture {
    Attribute(String),
    Style(String),
    Class,
    Feature { name: String, kind: String },
    Children,
    Elements,
}

/// Deserialize an element tree.
pub fn read_element_tree(xml: &str) -> Result<ElementTree> {
    // Text is only captured inside leaf content tags, so the default
    // untrimmed config keeps values byte-exact; indentation between node
    // tags arrives while nothing is capturing and is ignored.
    let mut reader = Reader::from_str(xml);

    let mut tree: ElementTree = Tree::new();
    let mut current: Option<Node<ElementData>> = None;
    let mut capture: Option<Capture> = None;
    let mut buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                match e.name().as_ref() {
                    b"element" => {
                        let attrs = attr_map(&e)?;
                        let tag = required(&attrs, "tag", "element")?;
                        current = Some(node_shell(&attrs, ElementData::new(tag))?);
                    }
                    b"bounds" => {
                        if let Some(node) = current.as_mut() {
                            node.payload.bounds = parse_bounds(&e)?;
                        }
                    }
                    b"span" => {
                        if let Some(node) = current.as_mut() {
                            let attrs = attr_map(&e)?;
                            let span = Span::new(
                                parse_num(required(&attrs, "start", "span")?, "span start")?,
                                parse_num(required(&attrs, "end", "span")?, "span end")?,
                            );
                            match required(&attrs, "of", "span")? {
                                "outer-html" => node.payload.outer_html = span,
                                "inner-html" => node.payload.inner_html = span,
                                "text" => node.payload.text = span,
                                other => {
                                    return Err(Error::Deserialize(format!(
                                        "unknown span '{other}'"
                                    )));
                                }
                            }
                        }
                    }
                    b"attribute" => {
                        let attrs = attr_map(&e)?;
                        capture = Some(Capture::Attribute(
                            required(&attrs, "name", "attribute")?.to_string(),
                        ));
                        buf.clear();
                    }
                    b"style" => {
                        let attrs = attr_map(&e)?;
                        capture = Some(Capture::Style(
                            required(&attrs, "name", "style")?.to_string(),
                        ));
                        buf.clear();
                    }
                    _ => start_common_capture(&e, &mut capture, &mut buf)?,
                }
            }
            Ok(Event::Text(e)) => {
                if capture.is_some() {
                    buf.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if capture.is_some()
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    buf.push_str(&resolved);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"element" => {
                    let node = current
                        .take()
                        .ok_or_else(|| Error::Deserialize("stray </element>".to_string()))?;
                    tree.insert(node)?;
                }
                b"attribute" => {
                    if let (Some(Capture::Attribute(name)), Some(node)) =
                        (capture.take(), current.as_mut())
                    {
                        node.payload.attributes.insert(name, buf.clone());
                    }
                }
                b"style" => {
                    if let (Some(Capture::Style(name)), Some(node)) =
                        (capture.take(), current.as_mut())
                    {
                        node.payload.styles.insert(name, buf.clone());
                    }
                }
                _ => end_common_capture(&e, &mut current, &mut capture, &buf)?,
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    tree.link()?;
    Ok(tree)
}

/// Deserialize a zone tree.
pub fn read_zone_tree(xml: &str) -> Result<ZoneTree> {
    let mut reader = Reader::from_str(xml);

    let mut tree: ZoneTree = Tree::new();
    let mut current: Option<Node<ZoneData>> = None;
    let mut capture: Option<Capture> = None;
    let mut buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"zone" => {
                    let attrs = attr_map(&e)?;
                    let kind = required(&attrs, "kind", "zone")?;
                    let kind = ZoneKind::parse(kind).ok_or_else(|| {
                        Error::Deserialize(format!("unknown zone kind '{kind}'"))
                    })?;
                    current = Some(node_shell(&attrs, ZoneData::new(kind))?);
                }
                b"bounds" => {
                    if let Some(node) = current.as_mut() {
                        node.payload.bounds = parse_bounds(&e)?;
                    }
                }
                b"elements" => {
                    capture = Some(Capture::Elements);
                    buf.clear();
                }
                _ => start_common_capture(&e, &mut capture, &mut buf)?,
            },
            Ok(Event::Text(e)) => {
                if capture.is_some() {
                    buf.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if capture.is_some()
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    buf.push_str(&resolved);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"zone" => {
                    let node = current
                        .take()
                        .ok_or_else(|| Error::Deserialize("stray </zone>".to_string()))?;
                    tree.insert(node)?;
                }
                b"elements" => {
                    if let (Some(Capture::Elements), Some(node)) =
                        (capture.take(), current.as_mut())
                    {
                        node.payload.elements = parse_ids(&buf)?;
                    }
                }
                _ => end_common_capture(&e, &mut current, &mut capture, &buf)?,
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    tree.link()?;
    Ok(tree)
}

// ============================================================================
// Shared reader plumbing
// ============================================================================

/// Begin collecting text for the captures both tree kinds share.
fn start_common_capture(
    e: &BytesStart<'_>,
    capture: &mut Option<Capture>,
    buf: &mut String,
) -> Result<()> {
    match e.name().as_ref() {
        b"class" => {
            *capture = Some(Capture::Class);
            buf.clear();
        }
        b"feature" => {
            let attrs = attr_map(e)?;
            *capture = Some(Capture::Feature {
                name: required(&attrs, "name", "feature")?.to_string(),
                kind: required(&attrs, "type", "feature")?.to_string(),
            });
            buf.clear();
        }
        b"children" => {
            *capture = Some(Capture::Children);
            buf.clear();
        }
        _ => {}
    }
    Ok(())
}

/// Close out the captures both tree kinds share.
fn end_common_capture<P>(
    e: &quick_xml::events::BytesEnd<'_>,
    current: &mut Option<Node<P>>,
    capture: &mut Option<Capture>,
    buf: &str,
) -> Result<()> {
    match e.name().as_ref() {
        b"class" => {
            if let (Some(Capture::Class), Some(node)) = (capture.take(), current.as_mut()) {
                node.classes.add(buf);
            }
        }
        b"feature" => {
            if let (Some(Capture::Feature { name, kind }), Some(node)) =
                (capture.take(), current.as_mut())
            {
                let value = parse_feature(&kind, buf)?;
                node.features.set(&name, value);
            }
        }
        b"children" => {
            if let (Some(Capture::Children), Some(node)) = (capture.take(), current.as_mut()) {
                for id in parse_ids(buf)? {
                    node.push_child(id);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Build a node from the shared per-node attributes (id, order, parent).
fn node_shell<P>(attrs: &BTreeMap<String, String>, payload: P) -> Result<Node<P>> {
    let id = NodeId(parse_num(
        required(attrs, "id", "node")?,
        "node id",
    )?);
    let mut node = Node::new(id, payload);
    if let Some(order) = attrs.get("order") {
        node.set_display_order(Some(parse_num(order, "display order")?));
    }
    if let Some(parent) = attrs.get("parent") {
        node.set_parent(Some(NodeId(parse_num(parent, "parent id")?)));
    }
    Ok(node)
}

/// All attributes of a start tag, unescaped.
fn attr_map(e: &BytesStart<'_>) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Deserialize(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = unescape_xml(&String::from_utf8_lossy(&attr.value));
        out.insert(key, value);
    }
    Ok(out)
}

fn required<'a>(
    attrs: &'a BTreeMap<String, String>,
    name: &str,
    context: &str,
) -> Result<&'a str> {
    attrs
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| Error::Deserialize(format!("{context} missing required '{name}'")))
}

fn parse_bounds(e: &BytesStart<'_>) -> Result<Rect> {
    let attrs = attr_map(e)?;
    Ok(Rect::new(
        parse_num(required(&attrs, "left", "bounds")?, "bounds left")?,
        parse_num(required(&attrs, "top", "bounds")?, "bounds top")?,
        parse_num(required(&attrs, "right", "bounds")?, "bounds right")?,
        parse_num(required(&attrs, "bottom", "bounds")?, "bounds bottom")?,
    ))
}

fn parse_feature(kind: &str, body: &str) -> Result<FeatureValue> {
    match kind {
        "int" => Ok(FeatureValue::Int(parse_num(body, "int feature")?)),
        "decimal" => Ok(FeatureValue::Decimal(parse_num(body, "decimal feature")?)),
        "text" => Ok(FeatureValue::Text(body.to_string())),
        "flag" => Ok(FeatureValue::Flag(parse_num(body, "flag feature")?)),
        other => Err(Error::Deserialize(format!(
            "unknown feature type '{other}'"
        ))),
    }
}

fn parse_ids(s: &str) -> Result<Vec<NodeId>> {
    s.split_whitespace()
        .map(|part| Ok(NodeId(parse_num(part, "id list")?)))
        .collect()
}

fn parse_num<T: FromStr>(s: &str, what: &str) -> Result<T> {
    s.trim()
        .parse()
        .map_err(|_| Error::Deserialize(format!("invalid value '{s}' for {what}")))
}

fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "amp" => return Some("&".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "quot" => return Some("\"".to_string()),
        "apos" => return Some("'".to_string()),
        _ => {}
    }
    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }
    None
}

fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];
        match rest.find(';') {
            Some(end) => {
                match resolve_entity(&rest[..end]) {
                    Some(resolved) => out.push_str(&resolved),
                    None => {
                        out.push('&');
                        out.push_str(&rest[..=end]);
                    }
                }
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                out.push_str(rest);
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}
