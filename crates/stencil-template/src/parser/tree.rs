//! Owned XML element tree built with `quick-xml`.
//!
//! Descriptors are small, so the whole document is materialized. A tag that
//! repeats under one parent is simply several children with the same name,
//! which covers the "single item or list" shape of both dialects.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use stencil_common::error::{Result, StencilError};

/// One XML element with its attributes, text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name, including any namespace prefix.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<Element>,
    text: String,
}

impl Element {
    /// Creates an element with only a tag name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns an attribute value, which may be empty.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns an attribute value, treating an empty value as absent.
    #[must_use]
    pub fn attr_non_empty(&self, key: &str) -> Option<&str> {
        self.attr(key).filter(|v| !v.is_empty())
    }

    /// Returns the trimmed text content, or `None` when blank.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Returns the first child with the given tag.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Iterates every child with the given tag.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the text of the first child with the given tag.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(Self::text)
    }

    /// Whether the element carries no attribute, text or child.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.text().is_none()
    }

    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

fn xml_err(err: impl std::fmt::Display) -> StencilError {
    StencilError::malformed(format!("invalid XML: {err}"))
}

fn open_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(xml_err)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(xml_err)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(StencilError::malformed(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

/// Parses a whole XML document and returns its root element.
///
/// # Errors
///
/// Returns [`StencilError::Malformed`] for syntax errors, unclosed or
/// mismatched tags, a missing root, or more than one root.
pub fn parse_document(input: &str) -> Result<Element> {
    // Text events are kept verbatim; trimming happens once in `Element::text`.
    let mut reader = Reader::from_str(input);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| StencilError::malformed("closing tag without opening tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&text.unescape().map_err(xml_err)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(StencilError::malformed(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| StencilError::malformed("document has no root element"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_attributes_text_and_children() {
        let doc = r#"<?xml version="1.0"?>
<Container version="2">
  <Name>Plex</Name>
  <Config Name="Web UI" Target="32400" Type="Port">32400</Config>
</Container>"#;
        let root = parse_document(doc).expect("should parse");
        assert_eq!(root.name, "Container");
        assert_eq!(root.attr("version"), Some("2"));
        assert_eq!(root.child_text("Name"), Some("Plex"));
        let config = root.child("Config").expect("config");
        assert_eq!(config.attr("Target"), Some("32400"));
        assert_eq!(config.text(), Some("32400"));
    }

    #[test]
    fn repeated_tags_become_siblings() {
        let doc = "<Root><Item>a</Item><Item>b</Item><Other/></Root>";
        let root = parse_document(doc).expect("should parse");
        let items: Vec<_> = root.children_named("Item").filter_map(Element::text).collect();
        assert_eq!(items, ["a", "b"]);
    }

    #[test]
    fn entities_and_cdata_are_decoded() {
        let doc = "<Root><A>Tom &amp; Jerry</A><B><![CDATA[<b>bold</b>]]></B></Root>";
        let root = parse_document(doc).expect("should parse");
        assert_eq!(root.child_text("A"), Some("Tom & Jerry"));
        assert_eq!(root.child_text("B"), Some("<b>bold</b>"));
    }

    #[test]
    fn mixed_text_and_cdata_keep_inner_spacing() {
        let doc = "<Root><Overview>  Intro <![CDATA[<b>x</b>]]> tail\n</Overview></Root>";
        let root = parse_document(doc).expect("should parse");
        assert_eq!(root.child_text("Overview"), Some("Intro <b>x</b> tail"));
    }

    #[test]
    fn blank_text_is_absent() {
        let root = parse_document("<Root><A>   </A><B/></Root>").expect("should parse");
        assert_eq!(root.child_text("A"), None);
        assert!(root.child("B").is_some_and(Element::is_empty));
    }

    #[test]
    fn multiline_text_keeps_inner_newlines() {
        let root = parse_document("<Root><O>\n  line one\n  line two\n</O></Root>")
            .expect("should parse");
        assert_eq!(root.child_text("O"), Some("line one\n  line two"));
    }

    #[test]
    fn empty_attribute_is_present_but_not_non_empty() {
        let root = parse_document(r#"<Config Name="" Target="/data"/>"#).expect("should parse");
        assert_eq!(root.attr("Name"), Some(""));
        assert_eq!(root.attr_non_empty("Name"), None);
        assert_eq!(root.attr_non_empty("Target"), Some("/data"));
    }

    #[test]
    fn unclosed_document_is_malformed() {
        let err = parse_document("<Container><Name>x</Name>").expect_err("should fail");
        assert!(matches!(err, StencilError::Malformed { .. }));
    }

    #[test]
    fn mismatched_tags_are_malformed() {
        assert!(parse_document("<A><B></A></B>").is_err());
    }

    #[test]
    fn empty_document_is_malformed() {
        assert!(parse_document("").is_err());
        assert!(parse_document("<?xml version=\"1.0\"?>").is_err());
    }

    #[test]
    fn two_roots_are_malformed() {
        assert!(parse_document("<A/><B/>").is_err());
    }
}
