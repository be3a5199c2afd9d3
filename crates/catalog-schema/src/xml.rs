//! Minimal XML element tree built on quick-xml
//!
//! Schema documents and message instances are small enough to hold in memory,
//! so both the tree-schema loader and the message validator work on this tree
//! rather than on the event stream.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Failure to read an XML document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("XML error: {0}")]
pub struct XmlError(pub String);

/// One element with its attributes, child elements and text content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Local name, without any namespace prefix
    pub name: String,
    /// Name as written in the document
    pub qualified_name: String,
    /// Attributes in document order, keyed by their written name
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Concatenated, trimmed text content
    pub text: String,
}

impl XmlNode {
    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> Result<XmlNode, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => stack.push(Self::from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let node = Self::from_start(e)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::End(_)) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| XmlError("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::Text(ref t)) => {
                    if let Some(top) = stack.last_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| XmlError(format!("invalid text content: {e}")))?;
                        top.text.push_str(&text);
                    }
                }
                Ok(Event::CData(ref c)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(c));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(XmlError(format!(
                        "parse failure at position {}: {}",
                        reader.error_position(),
                        e
                    )));
                }
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError(format!(
                "unexpected end of document, element '{}' is not closed",
                open.qualified_name
            )));
        }

        root.ok_or_else(|| XmlError("document has no root element".to_string()))
    }

    fn from_start(e: &BytesStart<'_>) -> Result<XmlNode, XmlError> {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
        let qualified_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| XmlError(format!("invalid attribute: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| XmlError(format!("invalid value for attribute '{key}': {e}")))?
                .to_string();
            attributes.push((key, value));
        }

        Ok(XmlNode {
            name,
            qualified_name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Value of the attribute written exactly as `key`
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child element with the given local name
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given local name, in document order
    pub fn children_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a XmlNode> + use<'a, 'n> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// `xmlns` declarations on this element as (prefix, uri); the default namespace has an empty prefix
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().filter_map(|(k, v)| {
            if k == "xmlns" {
                Some(("", v.as_str()))
            } else {
                k.strip_prefix("xmlns:").map(|prefix| (prefix, v.as_str()))
            }
        })
    }
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        Ok(())
    } else if root.is_none() {
        *root = Some(node);
        Ok(())
    } else {
        Err(XmlError(format!(
            "more than one root element, found '{}'",
            node.qualified_name
        )))
    }
}
