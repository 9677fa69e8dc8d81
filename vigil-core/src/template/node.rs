//! Host node abstraction.
//!
//! The compiler never touches a concrete document. It needs to enumerate
//! children, read attributes, and replace text or markup, and that is all
//! [`HostNode`] asks for. [`DomNode`] is a small in-memory tree implementing
//! it, for headless rendering and tests.

use std::sync::Arc;

use parking_lot::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
}

/// Services the compiler needs from a host document node.
///
/// Handles are cheap to clone and refer to the same underlying node; bindings
/// keep a clone and write through it on every change.
pub trait HostNode: Clone + Send + Sync + 'static {
    fn kind(&self) -> NodeKind;

    fn child_nodes(&self) -> Vec<Self>;

    /// Attribute name/value pairs in document order. Empty for text nodes.
    fn attributes(&self) -> Vec<(String, String)>;

    fn text_content(&self) -> String;

    fn set_text_content(&self, text: &str);

    fn set_inner_html(&self, html: &str);
}

/// In-memory document node.
#[derive(Clone)]
pub struct DomNode {
    inner: Arc<RwLock<DomNodeInner>>,
}

struct DomNodeInner {
    kind: NodeKind,
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<DomNode>,
    /// Raw markup set through `set_inner_html`, replacing the children.
    markup: Option<String>,
}

impl DomNode {
    fn with_inner(inner: DomNodeInner) -> Self {
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Self::with_inner(DomNodeInner {
            kind: NodeKind::Element,
            tag: tag.into(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
            markup: None,
        })
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::with_inner(DomNodeInner {
            kind: NodeKind::Text,
            tag: String::new(),
            attributes: Vec::new(),
            text: content.into(),
            children: Vec::new(),
            markup: None,
        })
    }

    /// Builder: add an attribute.
    pub fn attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.write().attributes.push((name.into(), value.into()));
        self
    }

    /// Builder: append a child.
    pub fn child(self, child: DomNode) -> Self {
        self.append_child(child);
        self
    }

    pub fn append_child(&self, child: DomNode) {
        let mut inner = self.inner.write();
        inner.markup = None;
        inner.children.push(child);
    }

    pub fn tag(&self) -> String {
        self.inner.read().tag.clone()
    }

    /// Markup of this node's contents.
    pub fn inner_html(&self) -> String {
        let inner = self.inner.read();
        match inner.kind {
            NodeKind::Text => inner.text.clone(),
            NodeKind::Element => match &inner.markup {
                Some(markup) => markup.clone(),
                None => inner.children.iter().map(DomNode::outer_html).collect(),
            },
        }
    }

    /// Markup of this node including its own tag.
    pub fn outer_html(&self) -> String {
        let (kind, tag, attributes) = {
            let inner = self.inner.read();
            (inner.kind, inner.tag.clone(), inner.attributes.clone())
        };
        match kind {
            NodeKind::Text => self.inner_html(),
            NodeKind::Element => {
                let attrs: String = attributes
                    .iter()
                    .map(|(name, value)| format!(" {name}=\"{value}\""))
                    .collect();
                format!("<{tag}{attrs}>{}</{tag}>", self.inner_html())
            }
        }
    }
}

impl HostNode for DomNode {
    fn kind(&self) -> NodeKind {
        self.inner.read().kind
    }

    fn child_nodes(&self) -> Vec<Self> {
        self.inner.read().children.clone()
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.inner.read().attributes.clone()
    }

    fn text_content(&self) -> String {
        let (kind, text, markup, children) = {
            let inner = self.inner.read();
            (
                inner.kind,
                inner.text.clone(),
                inner.markup.clone(),
                inner.children.clone(),
            )
        };
        match kind {
            NodeKind::Text => text,
            NodeKind::Element => match markup {
                Some(markup) => markup,
                None => children.iter().map(HostNode::text_content).collect(),
            },
        }
    }

    fn set_text_content(&self, text: &str) {
        let mut inner = self.inner.write();
        let kind = inner.kind;
        match kind {
            NodeKind::Text => inner.text = text.to_string(),
            NodeKind::Element => {
                inner.markup = None;
                inner.children = vec![DomNode::text(text)];
            }
        }
    }

    fn set_inner_html(&self, html: &str) {
        let mut inner = self.inner.write();
        let kind = inner.kind;
        match kind {
            NodeKind::Text => inner.text = html.to_string(),
            NodeKind::Element => {
                inner.children.clear();
                inner.markup = Some(html.to_string());
            }
        }
    }
}

impl std::fmt::Debug for DomNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.outer_html())
    }
}
