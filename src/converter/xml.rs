use super::Converter;
use crate::common::model::{RawContent, StructuredContent};
use crate::errors::{ConvertError, Error, Result};
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Tag names that always map to a JSON array, even with a single occurrence.
/// Keeps the output shape independent of input cardinality for elements that
/// are repeatable in the documents this service watches.
const DEFAULT_FORCE_LIST: &[&str] = &["HOP", "MISC", "FERMENTABLE", "MASH_STEP"];

/// Converter for XML documents.
///
/// Produces an element tree keyed by tag name: attributes become `@name`
/// keys, element text becomes a scalar (or a `#text` key when attributes are
/// present), repeated siblings become arrays. Empty or malformed input
/// resets the content to the empty mapping.
pub struct XmlConverter {
    content: StructuredContent,
    force_list: Vec<String>,
}

impl XmlConverter {
    pub fn new() -> Self {
        Self::with_force_list(DEFAULT_FORCE_LIST.iter().map(|t| t.to_string()))
    }

    pub fn with_force_list(force_list: impl IntoIterator<Item = String>) -> Self {
        Self {
            content: StructuredContent::empty(),
            force_list: force_list.into_iter().collect(),
        }
    }

    fn parse(&self, raw: &RawContent) -> Result<Value> {
        let mut reader = Reader::from_str(raw.as_str());
        let mut stack: Vec<ElementNode> = Vec::new();
        let mut root: Option<(String, Value)> = None;

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(start) => {
                    let mut node = ElementNode::new(tag_name(start.name().as_ref()));
                    for attr in start.attributes() {
                        let attr = attr.map_err(malformed)?;
                        let key = format!("@{}", tag_name(attr.key.as_ref()));
                        let value = attr.unescape_value().map_err(malformed)?;
                        node.children.insert(key, Value::String(value.into_owned()));
                    }
                    stack.push(node);
                }
                Event::Empty(empty) => {
                    let mut node = ElementNode::new(tag_name(empty.name().as_ref()));
                    for attr in empty.attributes() {
                        let attr = attr.map_err(malformed)?;
                        let key = format!("@{}", tag_name(attr.key.as_ref()));
                        let value = attr.unescape_value().map_err(malformed)?;
                        node.children.insert(key, Value::String(value.into_owned()));
                    }
                    self.close_element(node, &mut stack, &mut root)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(malformed)?;
                    let text = text.trim();
                    if !text.is_empty() {
                        match stack.last_mut() {
                            Some(node) => node.text.push_str(text),
                            None => {
                                return Err(malformed_msg("character data outside root element"))
                            }
                        }
                    }
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    match stack.last_mut() {
                        Some(node) => node.text.push_str(&text),
                        None => return Err(malformed_msg("character data outside root element")),
                    }
                }
                Event::End(_) => {
                    // Mismatched end tags are rejected by the reader itself.
                    let node = stack
                        .pop()
                        .ok_or_else(|| malformed_msg("unexpected end tag"))?;
                    self.close_element(node, &mut stack, &mut root)?;
                }
                Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(malformed_msg("unclosed element"));
        }
        match root {
            Some((tag, value)) => {
                let mut document = Map::new();
                document.insert(tag, value);
                Ok(Value::Object(document))
            }
            // A bare declaration header with no element content lands here.
            None => Err(malformed_msg("no element content")),
        }
    }

    /// Folds a finished element into its parent, or records it as the root.
    fn close_element(
        &self,
        node: ElementNode,
        stack: &mut Vec<ElementNode>,
        root: &mut Option<(String, Value)>,
    ) -> Result<()> {
        let tag = node.tag.clone();
        let value = node.into_value();
        match stack.last_mut() {
            Some(parent) => {
                let force_list = self.force_list.iter().any(|t| *t == tag);
                insert_child(&mut parent.children, tag, value, force_list);
                Ok(())
            }
            None if root.is_none() => {
                *root = Some((tag, value));
                Ok(())
            }
            None => Err(malformed_msg("multiple root elements")),
        }
    }
}

impl Default for XmlConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for XmlConverter {
    fn process(&mut self, raw: &RawContent) {
        if raw.is_empty() {
            self.content = StructuredContent::empty();
            return;
        }
        self.content = match self.parse(raw) {
            Ok(value) => StructuredContent::new(value),
            Err(err) => {
                debug!("xml parse failed, resetting content: {}", err);
                StructuredContent::empty()
            }
        };
    }

    fn content(&self) -> StructuredContent {
        self.content.clone()
    }
}

struct ElementNode {
    tag: String,
    children: Map<String, Value>,
    text: String,
}

impl ElementNode {
    fn new(tag: String) -> Self {
        Self {
            tag,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> Value {
        match (self.children.is_empty(), self.text.is_empty()) {
            (true, true) => Value::Null,
            (true, false) => Value::String(self.text),
            (false, true) => Value::Object(self.children),
            (false, false) => {
                let mut children = self.children;
                children.insert("#text".to_string(), Value::String(self.text));
                Value::Object(children)
            }
        }
    }
}

fn tag_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

/// Inserts a child under its tag, promoting repeated siblings to an array.
fn insert_child(map: &mut Map<String, Value>, key: String, value: Value, force_list: bool) {
    match map.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let prior = existing.take();
            *existing = Value::Array(vec![prior, value]);
        }
        None if force_list => {
            map.insert(key, Value::Array(vec![value]));
        }
        None => {
            map.insert(key, value);
        }
    }
}

fn malformed(err: impl Into<crate::errors::BoxError>) -> Error {
    Error::from(ConvertError::Malformed(err.into()))
}

fn malformed_msg(msg: &str) -> Error {
    Error::from(ConvertError::Malformed(msg.to_string().into()))
}
