//! Position-preserving XML edits
//!
//! Documents are parsed with `roxmltree` only to find nodes and their byte
//! ranges. Changes are recorded as range replacements against the original
//! text and spliced in by [`XmlEditor::finish`], so comments, whitespace,
//! attribute order and quoting outside the edited values survive unchanged.

use anyhow::{Context, Result};
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use roxmltree::{Document, Node, ParsingOptions};
use std::ops::Range;

pub const UTF8_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Parse a document, allowing a DOCTYPE (repository descriptors carry one)
pub fn parse(text: &str) -> Result<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options).context("Failed to parse XML document")
}

/// Strip a leading byte-order mark, if any
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Descendants of the root element (the root itself excluded), in document order
pub fn descendants_below_root<'a, 'input>(
    doc: &'a Document<'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.root_element()
        .descendants()
        .skip(1)
        .filter(|node| node.is_element())
}

/// Element children with the given local name
pub fn child_elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |child| child.has_tag_name(tag))
}

#[derive(Debug, Clone)]
struct Splice {
    range: Range<usize>,
    replacement: String,
}

/// Collects edits against one source text
#[derive(Debug)]
pub struct XmlEditor<'input> {
    source: &'input str,
    splices: Vec<Splice>,
}

impl<'input> XmlEditor<'input> {
    pub fn new(source: &'input str) -> Self {
        Self {
            source,
            splices: Vec::new(),
        }
    }

    /// Number of edits recorded so far
    pub fn len(&self) -> usize {
        self.splices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splices.is_empty()
    }

    /// Set an attribute's value, inserting the attribute after the tag name if absent
    pub fn set_attribute(&mut self, element: Node<'_, 'input>, name: &str, value: &str) {
        let escaped = escape(value).into_owned();
        match element
            .attributes()
            .find(|attr| attr.name() == name && attr.namespace().is_none())
        {
            Some(attr) => self.push(attr.range_value(), escaped),
            None => {
                let at = element.range().start + 1 + self.qname(element).len();
                self.push(at..at, format!(" {}=\"{}\"", name, escaped));
            }
        }
    }

    /// Replace the text that precedes an element's first child
    ///
    /// An existing leading text node is replaced wholesale; otherwise the text is
    /// inserted right after the start tag. Self-closing elements are expanded.
    ///
    /// `roxmltree` merges adjacent character data and CDATA sections into one
    /// text node whose range covers only the first segment, so the replaced run
    /// extends to the next sibling or the end tag.
    pub fn set_text(&mut self, element: Node<'_, 'input>, text: &str) {
        let escaped = partial_escape(text).into_owned();
        let range = element.range();

        if let Some(first) = element.first_child() {
            if first.is_text() {
                let end = match first.next_sibling() {
                    Some(next) => next.range().start,
                    None => self.end_tag_start(element),
                };
                self.push(first.range().start..end, escaped);
            } else {
                let at = first.range().start;
                self.push(at..at, escaped);
            }
            return;
        }

        let source: &'input str = self.source;
        let raw = &source[range.clone()];
        if raw.ends_with("/>") {
            let qname = self.qname(element);
            self.push(range.end - 2..range.end, format!(">{}</{}>", escaped, qname));
        } else {
            let at = self.end_tag_start(element);
            self.push(at..at, escaped);
        }
    }

    /// Apply all edits and make sure the result starts with a UTF-8 declaration
    pub fn finish(self) -> String {
        let mut splices = self.splices;
        splices.sort_by_key(|splice| std::cmp::Reverse(splice.range.start));

        let mut output = self.source.to_string();
        for splice in splices {
            output.replace_range(splice.range, &splice.replacement);
        }
        ensure_utf8_declaration(&output)
    }

    fn push(&mut self, range: Range<usize>, replacement: String) {
        self.splices.push(Splice { range, replacement });
    }

    /// Byte offset of an element's end tag (its end, if self-closing)
    fn end_tag_start(&self, element: Node<'_, 'input>) -> usize {
        let range = element.range();
        self.source[range.clone()]
            .rfind("</")
            .map_or(range.end, |offset| range.start + offset)
    }

    /// Prefixed tag name exactly as written in the source
    fn qname(&self, element: Node<'_, 'input>) -> &'input str {
        let source: &'input str = self.source;
        let start = &source[element.range().start + 1..];
        let end = start
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .unwrap_or(start.len());
        &start[..end]
    }
}

/// Keep a UTF-8 (or encoding-less) declaration, replace any other, add one if missing
pub fn ensure_utf8_declaration(text: &str) -> String {
    let mut reader = Reader::from_str(text);
    match reader.read_event() {
        Ok(Event::Decl(decl)) => {
            let is_utf8 = match decl.encoding() {
                None => true,
                Some(Ok(encoding)) => encoding.eq_ignore_ascii_case(b"utf-8"),
                Some(Err(_)) => false,
            };
            if is_utf8 {
                text.to_string()
            } else {
                let end = reader.buffer_position() as usize;
                log::debug!("Replacing non UTF-8 XML declaration");
                format!("{}{}", UTF8_DECLARATION, &text[end..])
            }
        }
        _ => format!("{}\n{}", UTF8_DECLARATION, text),
    }
}
