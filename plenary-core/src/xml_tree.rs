//! Owned XML element tree
//!
//! Both transcript schemas are small enough to hold in memory, so documents are
//! read into a simple owned tree of elements and text nodes. Mixed content is
//! preserved in document order, which the modern schema needs for its nested
//! speech markup.

use crate::error::ParseError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Tag name as written in the document
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First direct child element with the given tag name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|element| element.name == name)
    }

    /// Follow a slash-separated path of direct children, e.g. `vorspann/kopfdaten`.
    ///
    /// Every sibling matching a segment is tried, depth-first; the first full
    /// match in document order wins.
    pub fn find(&self, path: &str) -> Option<&Element> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        find_path(self, &segments)
    }

    /// Text that precedes the first child element
    pub fn direct_text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Text(fragment) => text.push_str(fragment),
                Node::Element(_) => break,
            }
        }
        text
    }

    /// All text under this element, depth-first, in document order
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(self, &mut text);
        text
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text.to_string());
        self
    }

    fn push_text(&mut self, text: String) {
        // Adjacent text and CDATA runs collapse into one node
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(&text);
        } else {
            self.children.push(Node::Text(text));
        }
    }
}

fn find_path<'a>(element: &'a Element, segments: &[&str]) -> Option<&'a Element> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(element);
    };
    element
        .child_elements()
        .filter(|child| child.name == *first)
        .find_map(|child| find_path(child, rest))
}

fn collect_text(element: &Element, out: &mut String) {
    for node in &element.children {
        match node {
            Node::Text(fragment) => out.push_str(fragment),
            Node::Element(child) => collect_text(child, out),
        }
    }
}

/// Parse a complete document and return its root element
pub fn parse_document(xml: &str) -> Result<Element, ParseError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                ensure_single_root(&root, &stack)?;
                stack.push(element_from_start(e)?);
            }
            Event::Empty(ref e) => {
                ensure_single_root(&root, &stack)?;
                let element = element_from_start(e)?;
                attach(element, &mut stack, &mut root);
            }
            Event::End(ref e) => {
                let name = decode_name(e.name().as_ref())?;
                let element = stack.pop().ok_or_else(|| {
                    ParseError::Xml(format!("unexpected closing tag </{name}>"))
                })?;
                if element.name != name {
                    return Err(ParseError::Xml(format!(
                        "expected </{}>, found </{name}>",
                        element.name
                    )));
                }
                attach(element, &mut stack, &mut root);
            }
            Event::Text(e) => {
                let text = e.unescape()?.into_owned();
                push_text_or_reject(text, &mut stack)?;
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(&e.into_inner())
                    .map_err(|err| ParseError::Xml(format!("invalid UTF-8 in CDATA: {err}")))?
                    .to_string();
                push_text_or_reject(text, &mut stack)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and DTDs carry no content
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Xml(format!(
            "unexpected end of document, <{}> is not closed",
            open.name
        )));
    }

    root.ok_or_else(|| ParseError::Xml("document has no root element".to_string()))
}

fn ensure_single_root(root: &Option<Element>, stack: &[Element]) -> Result<(), ParseError> {
    if stack.is_empty() {
        if let Some(existing) = root {
            return Err(ParseError::Xml(format!(
                "multiple root elements, <{}> is already the root",
                existing.name
            )));
        }
    }
    Ok(())
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => *root = Some(element),
    }
}

fn push_text_or_reject(text: String, stack: &mut [Element]) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::Xml(
            "text content outside of the root element".to_string(),
        )),
    }
}

fn element_from_start(start: &BytesStart) -> Result<Element, ParseError> {
    let mut element = Element::new(&decode_name(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = decode_name(attr.key.as_ref())?;
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn decode_name(raw: &[u8]) -> Result<String, ParseError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|err| ParseError::Xml(format!("invalid UTF-8 in name: {err}")))
}
