//! Read-only DOM model for the mathcopy engine.
//!
//! A [`Document`] wraps a parsed HTML tree. Shadow roots are the declarative
//! kind: a `<template shadowrootmode="open|closed">` child of the host element.
//! Light-tree operations (text, descendants, selection) never look inside a
//! `<template>`; crossing into a shadow root is explicit, either through
//! [`Node::shadow_root`] or through the layered [`DeepWalk`].
//!
//! The only mutable state is the per-document set of processed markers.

mod error;
mod style;
mod walk;

pub use error::DomError;
pub use scraper::Selector;
pub use style::parse_em;
pub use walk::DeepWalk;

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node as HtmlNode};

/// Attribute a page may already carry to mark an element as handled.
pub const PROCESSED_ATTRIBUTE: &str = "data-math-processed";

/// Parse a CSS selector, mapping syntax errors to [`DomError::InvalidSelector`].
pub fn parse_selector(source: &str) -> Result<Selector, DomError> {
    Selector::parse(source).map_err(|e| DomError::InvalidSelector {
        selector: source.to_string(),
        message: format!("{:?}", e),
    })
}

// =============================================================================
// Document
// =============================================================================

/// A parsed page plus the processed markers written by discovery.
pub struct Document {
    html: Html,
    processed: RefCell<HashSet<NodeId>>,
}

impl Document {
    /// Parse a full HTML document.
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
            processed: RefCell::default(),
        }
    }

    /// Parse an HTML fragment. The fragment's elements hang off a synthetic
    /// `<html>` root and there is no `<body>`.
    pub fn parse_fragment(source: &str) -> Self {
        Self {
            html: Html::parse_fragment(source),
            processed: RefCell::default(),
        }
    }

    pub fn root(&self) -> Node<'_> {
        Node::new(self.html.root_element(), self)
    }

    pub fn body(&self) -> Option<Node<'_>> {
        self.root().children().into_iter().find(|n| n.tag() == "body")
    }

    /// The element scans start from: `<body>` when present, else the root.
    pub fn scan_root(&self) -> Node<'_> {
        self.body().unwrap_or_else(|| self.root())
    }

    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        self.html
            .tree
            .get(id)
            .and_then(ElementRef::wrap)
            .map(|el| Node::new(el, self))
    }

    /// Every element matching `selector`, crossing open shadow roots.
    pub fn query(&self, selector: &str) -> Result<Vec<Node<'_>>, DomError> {
        let selector = parse_selector(selector)?;
        Ok(DeepWalk::new(self.root())
            .including_root()
            .select(&selector))
    }

    pub fn query_first(&self, selector: &str) -> Result<Option<Node<'_>>, DomError> {
        Ok(self.query(selector)?.into_iter().next())
    }

    pub fn is_processed(&self, node: Node<'_>) -> bool {
        node.has_attr(PROCESSED_ATTRIBUTE) || self.processed.borrow().contains(&node.id())
    }

    /// Mark `node` as processed. Returns `false` if it already was.
    pub fn mark_processed(&self, node: Node<'_>) -> bool {
        if node.has_attr(PROCESSED_ATTRIBUTE) {
            return false;
        }
        self.processed.borrow_mut().insert(node.id())
    }

    pub fn processed_count(&self) -> usize {
        self.processed.borrow().len()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("processed", &self.processed_count())
            .finish()
    }
}

// =============================================================================
// Node
// =============================================================================

/// Handle to one element of a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
    doc: &'a Document,
}

impl<'a> Node<'a> {
    fn new(element: ElementRef<'a>, doc: &'a Document) -> Self {
        Self { element, doc }
    }

    pub fn id(&self) -> NodeId {
        self.element.id()
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Lowercase local name.
    pub fn tag(&self) -> &'a str {
        self.element.value().name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn classes(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.element.value().classes()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn class_name(&self) -> String {
        self.classes().collect::<Vec<_>>().join(" ")
    }

    /// `tag.class.class`, for log lines.
    pub fn describe(&self) -> String {
        let mut out = self.tag().to_string();
        for class in self.classes() {
            out.push('.');
            out.push_str(class);
        }
        out
    }

    /// Text content of the light tree, like `Node.textContent`: shadow roots
    /// and template contents are not included.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(*self.element, &mut out);
        out
    }

    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    pub fn matches(&self, selector: &Selector) -> bool {
        selector.matches(&self.element)
    }

    /// Element children in the light tree.
    pub fn children(&self) -> Vec<Node<'a>> {
        self.element
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| !is_shadow_template(el))
            .map(|el| Node::new(el, self.doc))
            .collect()
    }

    /// Parent element. `None` at the document root and at the top of a shadow
    /// tree.
    pub fn parent(&self) -> Option<Node<'a>> {
        let parent = self.element.parent().and_then(ElementRef::wrap)?;
        if is_shadow_template(&parent) {
            return None;
        }
        Some(Node::new(parent, self.doc))
    }

    /// Parent element, stepping from the top of a shadow tree to its host.
    pub fn composed_parent(&self) -> Option<Node<'a>> {
        let parent = self.element.parent().and_then(ElementRef::wrap)?;
        if is_shadow_template(&parent) {
            return parent
                .parent()
                .and_then(ElementRef::wrap)
                .map(|host| Node::new(host, self.doc));
        }
        Some(Node::new(parent, self.doc))
    }

    /// Ancestors, nearest first, within the same tree.
    pub fn ancestors(&self) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            out.push(node);
            current = node.parent();
        }
        out
    }

    pub fn previous_sibling(&self) -> Option<Node<'a>> {
        self.element
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| !is_shadow_template(el))
            .map(|el| Node::new(el, self.doc))
    }

    pub fn next_sibling(&self) -> Option<Node<'a>> {
        self.element
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| !is_shadow_template(el))
            .map(|el| Node::new(el, self.doc))
    }

    /// Light-tree descendants in document pre-order, excluding `self`.
    pub fn descendants(&self) -> Vec<Node<'a>> {
        light_descendants(self.element, self.doc)
    }

    /// Like `querySelectorAll` on this element.
    pub fn select(&self, selector: &Selector) -> Vec<Node<'a>> {
        self.descendants()
            .into_iter()
            .filter(|n| n.matches(selector))
            .collect()
    }

    pub fn select_first(&self, selector: &Selector) -> Option<Node<'a>> {
        self.descendants().into_iter().find(|n| n.matches(selector))
    }

    /// Like `Element.closest`: this element or its nearest matching ancestor.
    pub fn closest(&self, selector: &Selector) -> Option<Node<'a>> {
        if self.matches(selector) {
            return Some(*self);
        }
        self.ancestors().into_iter().find(|n| n.matches(selector))
    }

    /// The attached shadow root, if any. Closed roots are not accessible.
    pub fn shadow_root(&self) -> Result<Option<ShadowRoot<'a>>, DomError> {
        let Some(template) = self
            .element
            .children()
            .filter_map(ElementRef::wrap)
            .find(is_shadow_template)
        else {
            return Ok(None);
        };
        let mode = template
            .value()
            .attr("shadowrootmode")
            .or_else(|| template.value().attr("shadowroot"))
            .unwrap_or("open");
        if mode.eq_ignore_ascii_case("closed") {
            return Err(DomError::ClosedShadowRoot {
                host: self.describe(),
            });
        }
        Ok(Some(ShadowRoot {
            host: *self,
            template: Node::new(template, self.doc),
        }))
    }

    /// Value of an inline `style` property, lowercased.
    pub fn style(&self, property: &str) -> Option<String> {
        self.attr("style")
            .and_then(|style| style::inline_property(style, property))
    }

    /// Hidden by its own markup: `hidden`, `display:none` or
    /// `visibility:hidden`.
    pub fn is_hidden(&self) -> bool {
        self.has_attr("hidden")
            || self.style("display").as_deref() == Some("none")
            || self.style("visibility").as_deref() == Some("hidden")
    }

    /// Neither this element nor any composed ancestor is hidden.
    pub fn is_rendered(&self) -> bool {
        let mut current = Some(*self);
        while let Some(node) = current {
            if node.is_hidden() {
                return false;
            }
            current = node.composed_parent();
        }
        true
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id() && std::ptr::eq(self.doc, other.doc)
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node(<{}>)", self.describe())
    }
}

// =============================================================================
// Shadow roots
// =============================================================================

/// An open declarative shadow root.
#[derive(Clone, Copy, Debug)]
pub struct ShadowRoot<'a> {
    host: Node<'a>,
    template: Node<'a>,
}

impl<'a> ShadowRoot<'a> {
    pub fn host(&self) -> Node<'a> {
        self.host
    }

    /// Identity of the root (its template element).
    pub fn id(&self) -> NodeId {
        self.template.id()
    }

    pub fn children(&self) -> Vec<Node<'a>> {
        self.template.children()
    }

    pub fn descendants(&self) -> Vec<Node<'a>> {
        self.template.descendants()
    }

    pub fn text(&self) -> String {
        self.template.text()
    }

    pub fn select(&self, selector: &Selector) -> Vec<Node<'a>> {
        self.template.select(selector)
    }
}

// =============================================================================
// Tree helpers
// =============================================================================

fn is_shadow_template(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    value.name() == "template"
        && (value.attr("shadowrootmode").is_some() || value.attr("shadowroot").is_some())
}

fn collect_text(start: NodeRef<'_, HtmlNode>, out: &mut String) {
    let mut stack: Vec<NodeRef<'_, HtmlNode>> = start.children().rev().collect();
    while let Some(node) = stack.pop() {
        match node.value() {
            HtmlNode::Text(text) => out.push_str(&text.text),
            HtmlNode::Element(el) if el.name() == "template" => {}
            HtmlNode::Element(_) => stack.extend(node.children().rev()),
            _ => {}
        }
    }
}

fn light_descendants<'a>(start: ElementRef<'a>, doc: &'a Document) -> Vec<Node<'a>> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeRef<'a, HtmlNode>> = start.children().rev().collect();
    while let Some(node) = stack.pop() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        if is_shadow_template(&el) {
            continue;
        }
        out.push(Node::new(el, doc));
        if el.value().name() != "template" {
            stack.extend(node.children().rev());
        }
    }
    out
}
