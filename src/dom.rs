//! DOM Host Module for Bindery
//!
//! The bundled view-tree implementation: an HTML5 document parsed into an
//! `rcdom` tree, wrapped behind [`ViewNode`]. Nodes are reference-counted
//! handles with interior mutability, so every `DomNode` is a cheap alias
//! onto shared tree storage.

use std::cell::RefCell;
use std::rc::Rc;

use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::TendrilSink;
use html5ever::{
    local_name, namespace_url, ns, parse_document, parse_fragment, Attribute, LocalName,
    ParseOpts, QualName,
};
use log::warn;
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use serde::{Deserialize, Serialize};
use tendril::StrTendril;

use crate::error::BindError;
use crate::node::ViewNode;
use crate::table::Scope;

// ═══════════════════════════════════════════════════════════════════════════════
// HOST OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Host-tree naming conventions.
///
/// The binding engine itself has no opinion on how identifiers and repeat
/// markers are spelled in markup; these defaults match the common HTML
/// convention of `id` attributes and a `repeated` marker class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomOptions {
    /// Attribute carrying the binding identifier.
    pub identifier_attr: String,
    /// Class token marking a node as a repeatable template.
    pub repeat_class: String,
}

impl Default for DomOptions {
    fn default() -> Self {
        Self {
            identifier_attr: "id".to_string(),
            repeat_class: "repeated".to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOCUMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// A parsed HTML document owning the host view tree.
pub struct DomTree {
    dom: RcDom,
    options: Rc<DomOptions>,
}

impl DomTree {
    /// Parse a full HTML document with default options.
    pub fn parse(html: &str) -> Self {
        Self::parse_with_options(html, DomOptions::default())
    }

    pub fn parse_with_options(html: &str, options: DomOptions) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        Self {
            dom,
            options: Rc::new(options),
        }
    }

    pub fn document(&self) -> DomNode {
        DomNode {
            handle: self.dom.document.clone(),
            options: self.options.clone(),
        }
    }

    /// The `<body>` element, the root binding target. The HTML5 parser
    /// always synthesizes one.
    pub fn body(&self) -> DomNode {
        self.document()
            .descendant_element("body")
            .unwrap_or_else(|| self.document())
    }

    /// Build the root scope over `<body>`. The caller owns the returned
    /// scope; no ambient state is kept.
    pub fn bind_root(&self) -> Result<Scope<DomNode>, BindError> {
        Scope::root(self.body())
    }

    /// Look up a descendant by its binding identifier. Host-side query for
    /// callers and tests; discovery does not use it.
    pub fn node_by_identifier(&self, id: &str) -> Option<DomNode> {
        self.document()
            .descendants_with_identifier()
            .into_iter()
            .find(|n| n.identifier().as_deref() == Some(id))
    }

    /// Serialize the current tree back to HTML.
    pub fn to_html(&self) -> String {
        let mut bytes = Vec::new();
        let serializable: SerializableHandle = self.dom.document.clone().into();
        if let Err(e) = serialize(&mut bytes, &serializable, SerializeOpts::default()) {
            warn!("serialization failed: {}", e);
            return String::new();
        }
        String::from_utf8(bytes).unwrap_or_default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE HANDLE
// ═══════════════════════════════════════════════════════════════════════════════

/// A handle onto one node of a [`DomTree`].
#[derive(Clone)]
pub struct DomNode {
    handle: Handle,
    options: Rc<DomOptions>,
}

impl DomNode {
    /// Whether two handles alias the same underlying node.
    pub fn same_node(&self, other: &DomNode) -> bool {
        Rc::ptr_eq(&self.handle, &other.handle)
    }

    pub fn parent(&self) -> Option<DomNode> {
        parent_of(&self.handle).map(|handle| DomNode {
            handle,
            options: self.options.clone(),
        })
    }

    pub fn is_attached(&self) -> bool {
        self.parent().is_some()
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.handle, &mut out);
        out
    }

    pub fn tag_name(&self) -> Option<String> {
        match &self.handle.data {
            NodeData::Element { name, .. } => Some(name.local.to_string()),
            _ => None,
        }
    }

    fn wrap(&self, handle: Handle) -> DomNode {
        DomNode {
            handle,
            options: self.options.clone(),
        }
    }

    fn descendant_element(&self, tag: &str) -> Option<DomNode> {
        let mut handles = Vec::new();
        collect_descendants(&self.handle, &mut handles);
        handles
            .into_iter()
            .find(|h| match &h.data {
                NodeData::Element { name, .. } => name.local.to_string() == tag,
                _ => false,
            })
            .map(|h| self.wrap(h))
    }

    fn raw_attribute(&self, name: &str) -> Option<String> {
        match &self.handle.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|a| a.name.local.to_string() == name)
                .map(|a| a.value.to_string()),
            _ => None,
        }
    }

    fn remove_raw_attribute(&self, name: &str) {
        if let NodeData::Element { attrs, .. } = &self.handle.data {
            attrs.borrow_mut().retain(|a| a.name.local.to_string() != name);
        }
    }
}

impl ViewNode for DomNode {
    fn identifier(&self) -> Option<String> {
        self.raw_attribute(&self.options.identifier_attr)
    }

    fn clear_identifier(&self) {
        self.remove_raw_attribute(&self.options.identifier_attr);
    }

    fn is_repeat_template(&self) -> bool {
        match self.raw_attribute("class") {
            Some(class) => class
                .split_ascii_whitespace()
                .any(|token| token == self.options.repeat_class),
            None => false,
        }
    }

    fn descendants_with_identifier(&self) -> Vec<DomNode> {
        let mut handles = Vec::new();
        collect_descendants(&self.handle, &mut handles);
        handles
            .into_iter()
            .map(|h| self.wrap(h))
            .filter(|n| n.identifier().is_some())
            .collect()
    }

    fn set_text(&self, text: &str) {
        let text_node = Node::new(NodeData::Text {
            contents: RefCell::new(StrTendril::from(text)),
        });
        text_node.parent.set(Some(Rc::downgrade(&self.handle)));
        let mut children = self.handle.children.borrow_mut();
        children.clear();
        children.push(text_node);
    }

    fn set_markup(&self, markup: &str) {
        let fragment = parse_fragment(
            RcDom::default(),
            ParseOpts::default(),
            QualName::new(None, ns!(html), local_name!("div")),
            Vec::new(),
        )
        .one(markup);

        // Fragment parsing wraps the content in a synthetic <html> element.
        let parsed: Vec<Handle> = match fragment.document.children.borrow().first() {
            Some(root) => root.children.borrow().clone(),
            None => Vec::new(),
        };

        let mut children = self.handle.children.borrow_mut();
        children.clear();
        for child in parsed {
            child.parent.set(Some(Rc::downgrade(&self.handle)));
            children.push(child);
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.raw_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &self.handle.data {
            let mut attrs = attrs.borrow_mut();
            match attrs.iter_mut().find(|a| a.name.local.to_string() == name) {
                Some(attr) => attr.value = StrTendril::from(value),
                None => attrs.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(name)),
                    value: StrTendril::from(value),
                }),
            }
        }
    }

    fn clone_subtree(&self) -> DomNode {
        self.wrap(deep_clone(&self.handle))
    }

    fn insert_after(&self, anchor: &DomNode) {
        let parent = match parent_of(&anchor.handle) {
            Some(parent) => parent,
            None => return,
        };
        let mut children = parent.children.borrow_mut();
        let at = children
            .iter()
            .position(|c| Rc::ptr_eq(c, &anchor.handle))
            .map(|i| i + 1)
            .unwrap_or(children.len());
        self.handle.parent.set(Some(Rc::downgrade(&parent)));
        children.insert(at, self.handle.clone());
    }

    fn detach(&self) {
        let weak = self.handle.parent.take();
        if let Some(parent) = weak.as_ref().and_then(|w| w.upgrade()) {
            parent
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(c, &self.handle));
        }
    }

    fn show(&self) {
        // Templates are hidden with the `hidden` attribute (or by host
        // stylesheet, which is out of our hands).
        self.remove_raw_attribute("hidden");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn parent_of(handle: &Handle) -> Option<Handle> {
    let weak = handle.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    handle.parent.set(weak);
    parent
}

/// Pre-order descendant collection, excluding `handle` itself.
fn collect_descendants(handle: &Handle, out: &mut Vec<Handle>) {
    for child in handle.children.borrow().iter() {
        out.push(child.clone());
        collect_descendants(child, out);
    }
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

fn deep_clone(handle: &Handle) -> Handle {
    let data = match &handle.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element {
            name,
            attrs,
            mathml_annotation_xml_integration_point,
            ..
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(None),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        },
        NodeData::ProcessingInstruction { target, contents } => NodeData::ProcessingInstruction {
            target: target.clone(),
            contents: contents.clone(),
        },
    };

    let clone = Node::new(data);
    for child in handle.children.borrow().iter() {
        let child_clone = deep_clone(child);
        child_clone.parent.set(Some(Rc::downgrade(&clone)));
        clone.children.borrow_mut().push(child_clone);
    }
    clone
}
