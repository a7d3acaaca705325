//! Owned XML element tree.
//!
//! Compatibility manifests are small, so they are read completely into a
//! [`Document`], edited as plain Rust values and written back out. Parsing and
//! serialization are delegated to `quick-xml`; whitespace-only text is
//! dropped on read and output is re-indented with four spaces, so a
//! parse/serialize cycle normalizes formatting but keeps every element,
//! attribute (in order), text node and comment.
//!
//! Processing instructions other than the XML declaration, and DOCTYPE
//! declarations, are not retained.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Errors raised while reading or writing XML.
#[derive(thiserror::Error, Debug)]
pub enum XmlError {
    /// The tokenizer rejected the input.
    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    /// An attribute could not be decoded.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// A name, comment or CDATA section is not valid UTF-8.
    #[error("XML is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Serialization failed.
    #[error("XML write error: {0}")]
    Write(#[from] std::io::Error),

    /// The input tokenizes but is not a single well-formed document.
    #[error("Malformed XML document: {0}")]
    Structure(String),
}

/// The `<?xml ...?>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// `version` pseudo-attribute, normally `1.0`.
    pub version: String,
    /// `encoding` pseudo-attribute, if present.
    pub encoding: Option<String>,
    /// `standalone` pseudo-attribute, if present.
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("UTF-8".to_string()),
            standalone: None,
        }
    }
}

/// A child of an [`Element`] (or a top-level comment of a [`Document`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element.
    Element(Element),
    /// Unescaped character data.
    Text(String),
    /// Raw `<![CDATA[...]]>` content.
    CData(String),
    /// Raw comment content.
    Comment(String),
}

impl Node {
    /// Borrow the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style [`Element::set_attribute`].
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Builder-style push of a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Value of attribute `key`, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set attribute `key`, replacing an existing value in place.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Child elements with tag `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child_elements().filter(move |el| el.name == name)
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }
}

/// A complete XML document: optional declaration, top-level comments and
/// exactly one root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// `<?xml ...?>` declaration, if the source had one.
    pub declaration: Option<Declaration>,
    /// Comments preceding the root element.
    pub prolog: Vec<Node>,
    /// The root element.
    pub root: Element,
    /// Comments following the root element.
    pub epilog: Vec<Node>,
}

impl Document {
    /// Create a document with a default declaration around `root`.
    pub fn new(root: Element) -> Self {
        Self {
            declaration: Some(Declaration::default()),
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Parse a complete document.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] if the bytes are not a single well-formed
    /// document: syntax errors, mismatched or unclosed tags, text outside the
    /// root, more than one root, or no root at all.
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Decl(decl) => {
                    if declaration.is_some() || root.is_some() || !stack.is_empty() {
                        return Err(structure("misplaced XML declaration"));
                    }
                    declaration = Some(read_declaration(&decl)?);
                }
                Event::Start(start) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(structure("more than one root element"));
                    }
                    stack.push(Element::from_start(&start)?);
                }
                Event::Empty(start) => {
                    let el = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| structure("closing tag without opening tag"))?;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::Text(text) => {
                    let text = text.unescape()?.into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Text(text)),
                        None if text.trim().is_empty() => {}
                        None => return Err(structure("text outside the root element")),
                    }
                }
                Event::CData(data) => {
                    let data = std::str::from_utf8(&data)?.to_string();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::CData(data)),
                        None => return Err(structure("CDATA outside the root element")),
                    }
                }
                Event::Comment(comment) => {
                    let comment = Node::Comment(std::str::from_utf8(&comment)?.to_string());
                    match (stack.last_mut(), root.is_some()) {
                        (Some(parent), _) => parent.children.push(comment),
                        (None, false) => prolog.push(comment),
                        (None, true) => epilog.push(comment),
                    }
                }
                Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(structure(&format!("unclosed element <{}>", open.name)));
        }
        let root = root.ok_or_else(|| structure("no root element"))?;

        Ok(Self {
            declaration,
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize with four-space indentation and a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::Write`] if the writer fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

        if let Some(decl) = &self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
        }
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        let mut out = writer.into_inner();
        out.push(b'\n');
        Ok(out)
    }
}

fn structure(msg: &str) -> XmlError {
    XmlError::Structure(msg.to_string())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(el));
    } else if root.is_some() {
        return Err(structure("more than one root element"));
    } else {
        *root = Some(el);
    }
    Ok(())
}

fn read_declaration(decl: &BytesDecl<'_>) -> Result<Declaration, XmlError> {
    let lossy = |raw: &[u8]| String::from_utf8_lossy(raw).into_owned();
    Ok(Declaration {
        version: lossy(&decl.version()?),
        encoding: decl.encoding().transpose()?.map(|v| lossy(&v)),
        standalone: decl.standalone().transpose()?.map(|v| lossy(&v)),
    })
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), XmlError> {
    match node {
        Node::Element(el) => write_element(writer, el)?,
        Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
        Node::Comment(comment) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}
