//! In-memory [`Platform`] with an operation log.
//!
//! Used by tests and benches to observe exactly which physical mutations a
//! pass performed. Nodes are never freed; detached nodes simply lose their
//! parent, the way a garbage collected host behaves.

use indexmap::IndexMap;

use crate::platform::{AttrOutcome, AttrPatch, Platform};
use crate::vnode::AttrValue;
use crate::HostId;

/// Attribute that replaces an element's children with a single text node.
pub const TEXT_CONTENT_ATTR: &str = "text-content";

#[derive(Debug, Clone, PartialEq)]
pub enum HostKind {
    Element { tag: String, svg: bool },
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformOp {
    CreateElement { node: HostId, tag: String },
    CreateText { node: HostId, value: String },
    SetText { node: HostId, value: String },
    Insert {
        parent: HostId,
        child: HostId,
        before: Option<HostId>,
        /// The child was attached somewhere before this insert.
        moved: bool,
    },
    Remove { parent: HostId, child: HostId },
    Clear { parent: HostId },
    SetAttr { node: HostId, name: String },
    RemoveAttr { node: HostId, name: String },
}

#[derive(Debug)]
struct HostNode {
    kind: HostKind,
    attrs: IndexMap<String, AttrValue>,
    children: Vec<HostId>,
    parent: Option<HostId>,
}

#[derive(Debug, Default)]
pub struct MemoryPlatform {
    nodes: Vec<HostNode>,
    ops: Vec<PlatformOp>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached container element, not recorded in the op log.
    pub fn create_root(&mut self, tag: &str) -> HostId {
        let id = self.alloc(HostKind::Element {
            tag: tag.to_string(),
            svg: false,
        });
        id
    }

    fn alloc(&mut self, kind: HostKind) -> HostId {
        let id = HostId(self.nodes.len());
        self.nodes.push(HostNode {
            kind,
            attrs: IndexMap::new(),
            children: Vec::new(),
            parent: None,
        });
        id
    }

    fn node(&self, id: HostId) -> Option<&HostNode> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: HostId) -> Option<&mut HostNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn kind(&self, id: HostId) -> Option<&HostKind> {
        self.node(id).map(|node| &node.kind)
    }

    pub fn children(&self, id: HostId) -> &[HostId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn attr(&self, id: HostId, name: &str) -> Option<&AttrValue> {
        self.node(id).and_then(|node| node.attrs.get(name))
    }

    pub fn text(&self, id: HostId) -> Option<&str> {
        match self.kind(id) {
            Some(HostKind::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Number of host nodes ever created, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ops(&self) -> &[PlatformOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<PlatformOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn move_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, PlatformOp::Insert { moved: true, .. }))
            .count()
    }

    pub fn create_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| {
                matches!(
                    op,
                    PlatformOp::CreateElement { .. } | PlatformOp::CreateText { .. }
                )
            })
            .count()
    }

    /// Markup of `id` and its subtree. Callback attributes are omitted.
    pub fn serialize(&self, id: HostId) -> String {
        let mut output = String::new();
        self.serialize_into(&mut output, id);
        output
    }

    /// Markup of the children of `id`, without the container itself.
    pub fn inner(&self, id: HostId) -> String {
        let mut output = String::new();
        for child in self.children(id) {
            self.serialize_into(&mut output, *child);
        }
        output
    }

    fn serialize_into(&self, output: &mut String, id: HostId) {
        let Some(node) = self.node(id) else {
            output.push_str("<?>");
            return;
        };
        match &node.kind {
            HostKind::Text(value) => output.push_str(value),
            HostKind::Element { tag, .. } => {
                output.push('<');
                output.push_str(tag);
                for (name, value) in &node.attrs {
                    let rendered = match value {
                        AttrValue::Str(value) => format!("{value:?}"),
                        AttrValue::Int(value) => format!("\"{value}\""),
                        AttrValue::Float(value) => format!("\"{value}\""),
                        AttrValue::Bool(value) => format!("\"{value}\""),
                        AttrValue::Listener(_) | AttrValue::Hook(_) => continue,
                    };
                    output.push(' ');
                    output.push_str(name);
                    output.push('=');
                    output.push_str(&rendered);
                }
                output.push('>');
                for child in &node.children {
                    self.serialize_into(output, *child);
                }
                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
        }
    }

    pub fn dump_tree(&self, root: HostId) -> String {
        let mut output = String::new();
        self.dump_node(&mut output, root, 0);
        output
    }

    fn dump_node(&self, output: &mut String, id: HostId, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.node(id) {
            Some(node) => {
                match &node.kind {
                    HostKind::Element { tag, svg } => {
                        let svg = if *svg { " svg" } else { "" };
                        output.push_str(&format!("{indent}[{}] <{tag}>{svg}\n", id.0));
                    }
                    HostKind::Text(value) => {
                        output.push_str(&format!("{indent}[{}] {value:?}\n", id.0));
                    }
                }
                for child in &node.children {
                    self.dump_node(output, *child, depth + 1);
                }
            }
            None => output.push_str(&format!("{indent}[{}] (missing)\n", id.0)),
        }
    }

    fn detach(&mut self, child: HostId) -> bool {
        let Some(parent) = self.node(child).and_then(|node| node.parent) else {
            return false;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|id| *id != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
        true
    }

    fn attach(&mut self, parent: HostId, child: HostId, before: Option<HostId>) {
        let moved = self.detach(child);
        let Some(parent_node) = self.node_mut(parent) else {
            log::warn!("insert into unknown host node {parent}");
            return;
        };
        let index = before
            .and_then(|reference| parent_node.children.iter().position(|id| *id == reference))
            .unwrap_or(parent_node.children.len());
        parent_node.children.insert(index, child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        self.ops.push(PlatformOp::Insert {
            parent,
            child,
            before,
            moved,
        });
    }
}

impl Platform for MemoryPlatform {
    fn create_element(&mut self, tag: &str, svg: bool) -> HostId {
        let node = self.alloc(HostKind::Element {
            tag: tag.to_string(),
            svg,
        });
        self.ops.push(PlatformOp::CreateElement {
            node,
            tag: tag.to_string(),
        });
        node
    }

    fn create_text(&mut self, value: &str) -> HostId {
        let node = self.alloc(HostKind::Text(value.to_string()));
        self.ops.push(PlatformOp::CreateText {
            node,
            value: value.to_string(),
        });
        node
    }

    fn set_text(&mut self, node: HostId, value: &str) {
        if let Some(HostNode {
            kind: HostKind::Text(text),
            ..
        }) = self.node_mut(node)
        {
            *text = value.to_string();
            self.ops.push(PlatformOp::SetText {
                node,
                value: value.to_string(),
            });
        }
    }

    fn append_child(&mut self, parent: HostId, child: HostId) {
        self.attach(parent, child, None);
    }

    fn insert_before(&mut self, parent: HostId, child: HostId, reference: HostId) {
        self.attach(parent, child, Some(reference));
    }

    fn remove_child(&mut self, parent: HostId, child: HostId) {
        if self.node(child).and_then(|node| node.parent) != Some(parent) {
            log::warn!("remove of {child} which is not a child of {parent}");
            return;
        }
        self.detach(child);
        self.ops.push(PlatformOp::Remove { parent, child });
    }

    fn clear_content(&mut self, parent: HostId) {
        let children = match self.node_mut(parent) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            if let Some(node) = self.node_mut(child) {
                node.parent = None;
            }
        }
        self.ops.push(PlatformOp::Clear { parent });
    }

    fn parent_of(&self, node: HostId) -> Option<HostId> {
        self.node(node).and_then(|node| node.parent)
    }

    fn next_sibling_of(&self, node: HostId) -> Option<HostId> {
        let parent = self.parent_of(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|id| *id == node)?;
        siblings.get(index + 1).copied()
    }

    fn query_selector(&self, selector: &str) -> Option<HostId> {
        let matches = |node: &HostNode| match selector.strip_prefix('#') {
            Some(id) => matches!(node.attrs.get("id"), Some(AttrValue::Str(value)) if &**value == id),
            None => matches!(&node.kind, HostKind::Element { tag, .. } if tag == selector),
        };
        self.nodes
            .iter()
            .position(matches)
            .map(HostId)
    }

    fn patch_attr(&mut self, patch: AttrPatch<'_>) -> AttrOutcome {
        let AttrPatch { node, name, next, .. } = patch;
        if name == TEXT_CONTENT_ATTR {
            let value = match next {
                Some(AttrValue::Str(value)) => value.to_string(),
                Some(other) => format!("{other:?}"),
                None => String::new(),
            };
            self.clear_content(node);
            let text = self.create_text(&value);
            self.append_child(node, text);
            return AttrOutcome::ContentReplaced;
        }
        let Some(host) = self.node_mut(node) else {
            return AttrOutcome::Applied;
        };
        match next {
            Some(value) => {
                host.attrs.insert(name.to_string(), value.clone());
                self.ops.push(PlatformOp::SetAttr {
                    node,
                    name: name.to_string(),
                });
            }
            None => {
                host.attrs.shift_remove(name);
                self.ops.push(PlatformOp::RemoveAttr {
                    node,
                    name: name.to_string(),
                });
            }
        }
        AttrOutcome::Applied
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
