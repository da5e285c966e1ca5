use std::collections::{HashMap, HashSet};
use std::error::Error as StdError;
use std::fmt;

mod html;
mod locator;
mod selector;
mod session;
mod xpath;

#[cfg(test)]
mod tests;

pub use crate::locator::clip_text;
pub use crate::session::{
    ClickRecord, Recorder, Request, Response, build_click_record, resolve_click_target,
};

use crate::selector::{
    NthChildSelector, SelectorAttrCondition, SelectorCombinator, SelectorPart,
    SelectorPseudoClass, SelectorStep, parse_selector_groups,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    UnsupportedSelector(String),
    UnsupportedXPath(String),
    Export(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::UnsupportedXPath(xpath) => write!(f, "unsupported xpath: {xpath}"),
            Self::Export(msg) => write!(f, "export error: {msg}"),
        }
    }
}

impl StdError for Error {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
}

/// An in-memory document tree. Nodes are addressed by [`NodeId`] handles,
/// which stay valid for the lifetime of the document.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) id_index: HashMap<String, NodeId>,
}

impl Document {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    /// Parses an HTML document or fragment into a tree.
    pub fn from_html(html: &str) -> Result<Self> {
        html::parse_html(html)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The root `<html>` element, when the document has one. Fragments
    /// parsed without it have no document element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.nodes[self.root.0]
            .children
            .iter()
            .copied()
            .find(|child| {
                self.tag_name(*child)
                    .is_some_and(|tag| tag.eq_ignore_ascii_case("html"))
            })
    }

    pub fn is_element(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some()
    }

    pub fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|element| element.tag_name.as_str())
    }

    pub fn attr(&self, node_id: NodeId, name: &str) -> Option<&str> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name))
            .map(String::as_str)
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0).and_then(|node| node.parent)
    }

    pub fn parent_element(&self, node_id: NodeId) -> Option<NodeId> {
        self.parent(node_id).filter(|parent| self.is_element(*parent))
    }

    pub fn element_children(&self, node_id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(node_id.0) else {
            return Vec::new();
        };
        node.children
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    /// Concatenated text of every descendant text node, in tree order.
    pub fn text_content(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node_id, &mut out);
        out
    }

    /// Every element in the document, in tree order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all(selector)?;
        Ok(all.into_iter().next())
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }

        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        Ok(self.filter_matches(ids, &groups))
    }

    /// Matches among the descendants of `root`, excluding `root` itself.
    pub fn query_selector_all_from(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        let mut ids = Vec::new();
        self.collect_elements_descendants_dfs(root, &mut ids);
        Ok(self.filter_matches(ids, &groups))
    }

    pub fn matches_selector(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        if self.element(node_id).is_none() {
            return Ok(false);
        }

        let groups = parse_selector_groups(selector)?;
        Ok(groups
            .iter()
            .any(|steps| self.matches_selector_chain(node_id, steps)))
    }

    fn filter_matches(&self, candidates: Vec<NodeId>, groups: &[Vec<SelectorPart>]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for candidate in candidates {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(candidate, steps))
                && seen.insert(candidate)
            {
                matched.push(candidate);
            }
        }
        matched
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match self.nodes.get(node_id.0).map(|node| &node.node_type) {
            Some(NodeType::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        self.create_node(Some(parent), NodeType::Element(Element { tag_name, attrs }))
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn rebuild_id_index(&mut self) {
        let mut next = HashMap::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            match &self.nodes[node.0].node_type {
                NodeType::Element(element) => {
                    if let Some(id) = element.attrs.get("id") {
                        if !id.is_empty() {
                            next.insert(id.clone(), node);
                        }
                    }
                }
                NodeType::Document | NodeType::Text(_) => {}
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        self.id_index = next;
    }

    fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        stacker::maybe_grow(64 * 1024, 4 * 1024 * 1024, || {
            if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
                out.push(node_id);
            }
            for child in &self.nodes[node_id.0].children {
                self.collect_elements_dfs(*child, out);
            }
        });
    }

    fn collect_elements_descendants_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(node_id.0) else {
            return;
        };
        for child in &node.children {
            self.collect_elements_dfs(*child, out);
        }
    }

    fn collect_text(&self, node_id: NodeId, out: &mut String) {
        stacker::maybe_grow(64 * 1024, 4 * 1024 * 1024, || {
            let Some(node) = self.nodes.get(node_id.0) else {
                return;
            };
            if let NodeType::Text(text) = &node.node_type {
                out.push_str(text);
            }
            for child in &node.children {
                self.collect_text(*child, out);
            }
        });
    }

    pub(crate) fn previous_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let mut previous = None;
        for child in &self.nodes[parent.0].children {
            if *child == node_id {
                return previous;
            }
            if self.element(*child).is_some() {
                previous = Some(*child);
            }
        }
        None
    }

    pub(crate) fn next_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let mut found = false;
        for child in &self.nodes[parent.0].children {
            if *child == node_id {
                found = true;
                continue;
            }
            if found && self.element(*child).is_some() {
                return Some(*child);
            }
        }
        None
    }

    /// 1-based position among the parent's element children.
    pub(crate) fn element_index(&self, node_id: NodeId) -> Option<usize> {
        let parent = self.parent(node_id)?;
        let mut index = 0usize;
        for child in &self.nodes[parent.0].children {
            if self.element(*child).is_none() {
                continue;
            }
            index += 1;
            if *child == node_id {
                return Some(index);
            }
        }
        None
    }

    fn matches_selector_chain(&self, node_id: NodeId, steps: &[SelectorPart]) -> bool {
        if steps.is_empty() {
            return false;
        }
        if !self.matches_step(node_id, &steps[steps.len() - 1].step) {
            return false;
        }

        let mut current = node_id;
        for idx in (1..steps.len()).rev() {
            let prev_step = &steps[idx - 1].step;
            let combinator = steps[idx]
                .combinator
                .unwrap_or(SelectorCombinator::Descendant);

            let matched = match combinator {
                SelectorCombinator::Child => {
                    self.parent_element(current)
                        .filter(|parent| self.matches_step(*parent, prev_step))
                }
                SelectorCombinator::Descendant => {
                    let mut cursor = self.parent_element(current);
                    let mut found = None;
                    while let Some(parent) = cursor {
                        if self.matches_step(parent, prev_step) {
                            found = Some(parent);
                            break;
                        }
                        cursor = self.parent_element(parent);
                    }
                    found
                }
                SelectorCombinator::AdjacentSibling => self
                    .previous_element_sibling(current)
                    .filter(|sibling| self.matches_step(*sibling, prev_step)),
                SelectorCombinator::GeneralSibling => {
                    let mut cursor = self.previous_element_sibling(current);
                    let mut found = None;
                    while let Some(sibling) = cursor {
                        if self.matches_step(sibling, prev_step) {
                            found = Some(sibling);
                            break;
                        }
                        cursor = self.previous_element_sibling(sibling);
                    }
                    found
                }
            };

            let Some(matched) = matched else {
                return false;
            };
            current = matched;
        }

        true
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if !step.universal {
            if let Some(tag) = &step.tag {
                if !element.tag_name.eq_ignore_ascii_case(tag) {
                    return false;
                }
            }
        } else if step.tag.is_some() {
            return false;
        }

        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        if step
            .classes
            .iter()
            .any(|class_name| !has_class(element, class_name))
        {
            return false;
        }

        for cond in &step.attrs {
            let matched = match cond {
                SelectorAttrCondition::Exists { key } => element.attrs.contains_key(key),
                SelectorAttrCondition::Eq { key, value } => element.attrs.get(key) == Some(value),
                SelectorAttrCondition::StartsWith { key, value } => {
                    !value.is_empty()
                        && element
                            .attrs
                            .get(key)
                            .is_some_and(|attr| attr.starts_with(value))
                }
                SelectorAttrCondition::EndsWith { key, value } => {
                    !value.is_empty()
                        && element
                            .attrs
                            .get(key)
                            .is_some_and(|attr| attr.ends_with(value))
                }
                SelectorAttrCondition::Contains { key, value } => {
                    !value.is_empty()
                        && element
                            .attrs
                            .get(key)
                            .is_some_and(|attr| attr.contains(value))
                }
                SelectorAttrCondition::Includes { key, value } => {
                    !value.is_empty()
                        && element.attrs.get(key).is_some_and(|attr| {
                            attr.split_ascii_whitespace().any(|token| token == value)
                        })
                }
                SelectorAttrCondition::DashMatch { key, value } => {
                    element.attrs.get(key).is_some_and(|attr| {
                        attr == value
                            || (attr.starts_with(value)
                                && attr.as_bytes().get(value.len()) == Some(&b'-'))
                    })
                }
            };
            if !matched {
                return false;
            }
        }

        for pseudo in &step.pseudo_classes {
            let matched = match pseudo {
                SelectorPseudoClass::FirstChild => self.previous_element_sibling(node_id).is_none(),
                SelectorPseudoClass::LastChild => self.next_element_sibling(node_id).is_none(),
                SelectorPseudoClass::OnlyChild => self
                    .parent(node_id)
                    .is_some_and(|parent| self.element_children(parent).len() == 1),
                SelectorPseudoClass::NthChild(selector) => self
                    .element_index(node_id)
                    .is_some_and(|index| nth_index_matches(index, selector)),
                SelectorPseudoClass::NthLastChild(selector) => {
                    let Some(parent) = self.parent(node_id) else {
                        return false;
                    };
                    let Some(index) = self.element_index(node_id) else {
                        return false;
                    };
                    let total = self.element_children(parent).len();
                    nth_index_matches((total + 1) - index, selector)
                }
                SelectorPseudoClass::Not(inners) => !inners
                    .iter()
                    .any(|inner| self.matches_selector_chain(node_id, inner)),
            };
            if !matched {
                return false;
            }
        }

        true
    }
}

pub(crate) fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| {
            value
                .split_ascii_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
}

pub(crate) fn has_class(element: &Element, class_name: &str) -> bool {
    element
        .attrs
        .get("class")
        .is_some_and(|value| value.split_ascii_whitespace().any(|token| token == class_name))
}

fn nth_index_matches(index: usize, selector: &NthChildSelector) -> bool {
    match selector {
        NthChildSelector::Exact(n) => index == *n,
        NthChildSelector::Odd => index % 2 == 1,
        NthChildSelector::Even => index % 2 == 0,
        NthChildSelector::AnPlusB(a, b) => {
            let index = index as i64;
            if *a == 0 {
                return index == *b;
            }
            let delta = index - *b;
            delta % *a == 0 && delta / *a >= 0
        }
    }
}
