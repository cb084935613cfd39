//! Arena-backed document tree with HTML serialization.

use std::borrow::Cow;
use std::fmt::Write;

use smol_str::SmolStr;

/// Handle to a node of a `HeadlessSurface` tree.
///
/// Carries the render generation of the tree it belongs to, so a handle from
/// a previous render can never alias a node of the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) tree: u64,
    pub(crate) index: usize,
}

/// Elements that never have children or a closing tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is raw text up to the matching close tag.
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub(crate) fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Document,
    Doctype(String),
    Element {
        tag: SmolStr,
        /// Decoded values, in source order.
        attrs: Vec<(SmolStr, String)>,
    },
    /// Raw (still escaped) source text.
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
}

/// One rendered document.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    id: u64,
    nodes: Vec<Node>,
}

impl Tree {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.handle(0)
    }

    pub(crate) fn handle(&self, index: usize) -> NodeId {
        NodeId {
            tree: self.id,
            index,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        if id.tree != self.id {
            return None;
        }
        self.nodes.get(id.index)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.tree != self.id {
            return None;
        }
        self.nodes.get_mut(id.index)
    }

    pub(crate) fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(Node {
            data,
            parent: Some(parent.index),
            children: Vec::new(),
        });
        if let Some(parent) = self.node_mut(parent) {
            parent.children.push(index);
        }
        self.handle(index)
    }

    /// Unlink `id` from its parent. The subtree stays in the arena, unreachable.
    pub(crate) fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return false;
        };
        self.nodes[parent].children.retain(|&c| c != id.index);
        self.nodes[id.index].parent = None;
        true
    }

    pub(crate) fn clear_children(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let children = std::mem::take(&mut node.children);
        for child in children {
            self.nodes[child].parent = None;
        }
    }

    /// Reachable from the document root.
    pub(crate) fn is_attached(&self, id: NodeId) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        let mut current = id.index;
        loop {
            if current == 0 {
                return true;
            }
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub(crate) fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        if self.node(ancestor).is_none() || self.node(id).is_none() {
            return false;
        }
        let mut current = Some(id.index);
        while let Some(index) = current {
            if index == ancestor.index {
                return true;
            }
            current = self.nodes[index].parent;
        }
        false
    }

    pub(crate) fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| n.children.iter().map(|&c| self.handle(c)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.data {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub(crate) fn is_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some()
    }

    pub(crate) fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub(crate) fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let Some(NodeData::Element { attrs, .. }) = self.node_mut(id).map(|n| &mut n.data) else {
            return false;
        };
        match attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((SmolStr::new(name.to_ascii_lowercase()), value.to_string())),
        }
        true
    }

    pub(crate) fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        let Some(NodeData::Element { attrs, .. }) = self.node_mut(id).map(|n| &mut n.data) else {
            return false;
        };
        attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        true
    }

    /// Every element in document order, paired with its depth below the root.
    pub(crate) fn elements_with_depth(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::new();
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            if matches!(self.nodes[index].data, NodeData::Element { .. }) {
                out.push((self.handle(index), depth));
            }
            for &child in self.nodes[index].children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    pub(crate) fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(raw) => out.push_str(&decode_entities(raw)),
            NodeData::Comment(_) | NodeData::Doctype(_) => {}
            NodeData::Document | NodeData::Element { .. } => {
                for &child in &node.children {
                    self.collect_text(self.handle(child), out);
                }
            }
        }
    }

    pub(crate) fn serialize_children(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.node(id) {
            for &child in &node.children {
                self.write_node(child, &mut out);
            }
        }
        out
    }

    pub(crate) fn serialize_node(&self, id: NodeId) -> String {
        let mut out = String::new();
        if self.node(id).is_some() {
            self.write_node(id.index, &mut out);
        }
        out
    }

    fn write_node(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        match &node.data {
            NodeData::Document => {
                for &child in &node.children {
                    self.write_node(child, out);
                }
            }
            NodeData::Doctype(name) => {
                let _ = write!(out, "<!DOCTYPE {name}>");
            }
            NodeData::Text(raw) => out.push_str(raw),
            NodeData::Comment(body) => {
                let _ = write!(out, "<!--{body}-->");
            }
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
                }
                out.push('>');
                if is_void(tag) {
                    return;
                }
                for &child in &node.children {
                    self.write_node(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

pub(crate) fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '\u{a0}']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

pub(crate) fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '"', '\u{a0}']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Decode the named and numeric character references the serializer emits,
/// plus `&apos;` and numeric forms. Unknown references are left as written.
pub(crate) fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').filter(|&semi| semi <= 10) {
            Some(semi) => {
                let entity = &tail[1..semi];
                match decode_entity(entity) {
                    Some(c) => {
                        out.push(c);
                        rest = &tail[semi + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &tail[1..];
                    }
                }
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = entity.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;p&gt;"), "<p>");
        assert_eq!(decode_entities("&#39;&#x41;"), "'A");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_escape_round_trip() {
        let text = "1 < 2 & 3 > 2";
        assert_eq!(decode_entities(&escape_text(text)), text);
        let attr = "say \"hi\" & go";
        assert_eq!(decode_entities(&escape_attr(attr)), attr);
    }
}
