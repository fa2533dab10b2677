//! Immutable virtual tree descriptions.
//!
//! A [`VNode`] is produced fresh on every render pass. It is cheap to clone
//! (reference counted) and never mutated once shared: the builder methods
//! copy-on-write when the description is already referenced elsewhere, so a
//! description handed to the renderer keeps its shape for its whole life.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use indexmap::IndexMap;

use crate::component::{FunctionalComponent, StatefulComponent};
use crate::error::ComponentError;
use crate::{hash_key, HostId, Key};

/// Ordered attribute and event bindings of a node.
pub type Attributes = IndexMap<Rc<str>, AttrValue>;

/// Callback receiving the realized handle on mount and `None` on unmount.
#[derive(Clone)]
pub struct NodeRef(Rc<dyn Fn(Option<HostId>)>);

impl NodeRef {
    pub fn new(f: impl Fn(Option<HostId>) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, host: Option<HostId>) {
        (self.0)(host)
    }

    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeRef(..)")
    }
}

/// Event listener bound as an attribute. The payload type is platform defined.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&dyn std::any::Any)>);

impl Listener {
    pub fn new(f: impl Fn(&dyn std::any::Any) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &dyn std::any::Any) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &Listener) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Callback attached under one of the reserved [`HookName`]s.
#[derive(Clone)]
pub struct LifecycleHook(Rc<dyn Fn(Option<HostId>) -> Result<(), ComponentError>>);

impl LifecycleHook {
    pub fn new(f: impl Fn(Option<HostId>) -> Result<(), ComponentError> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, host: Option<HostId>) -> Result<(), ComponentError> {
        (self.0)(host)
    }

    pub fn ptr_eq(&self, other: &LifecycleHook) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Reserved attribute names intercepted by the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HookName {
    BeforeMount,
    Mounted,
    BeforeUpdate,
    Updated,
    BeforeUnmount,
    Unmounted,
}

impl HookName {
    pub const ALL: [HookName; 6] = [
        HookName::BeforeMount,
        HookName::Mounted,
        HookName::BeforeUpdate,
        HookName::Updated,
        HookName::BeforeUnmount,
        HookName::Unmounted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookName::BeforeMount => "before-mount",
            HookName::Mounted => "mounted",
            HookName::BeforeUpdate => "before-update",
            HookName::Updated => "updated",
            HookName::BeforeUnmount => "before-unmount",
            HookName::Unmounted => "unmounted",
        }
    }

    pub fn from_attr(name: &str) -> Option<HookName> {
        HookName::ALL.into_iter().find(|hook| hook.as_str() == name)
    }
}

/// Attribute value. Callbacks compare by reference, scalars by value.
#[derive(Clone)]
pub enum AttrValue {
    Str(Rc<str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Listener(Listener),
    Hook(LifecycleHook),
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Str(a), AttrValue::Str(b)) => a == b,
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (AttrValue::Float(a), AttrValue::Float(b)) => a == b,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Listener(a), AttrValue::Listener(b)) => a.ptr_eq(b),
            (AttrValue::Hook(a), AttrValue::Hook(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(value) => write!(f, "{value:?}"),
            AttrValue::Int(value) => write!(f, "{value}"),
            AttrValue::Float(value) => write!(f, "{value}"),
            AttrValue::Bool(value) => write!(f, "{value}"),
            AttrValue::Listener(_) => f.write_str("<listener>"),
            AttrValue::Hook(_) => f.write_str("<hook>"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(Rc::from(value))
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(Rc::from(value))
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Listener> for AttrValue {
    fn from(value: Listener) -> Self {
        AttrValue::Listener(value)
    }
}

/// Identifies one keep-alive cache. Components marked with the same scope
/// and key are retained across removal and reactivated on the next mount.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeepAliveScope(u32);

static NEXT_KEEP_ALIVE_SCOPE: AtomicU32 = AtomicU32::new(1);

impl KeepAliveScope {
    pub fn new() -> Self {
        Self(NEXT_KEEP_ALIVE_SCOPE.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for KeepAliveScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference to a component definition; identity is the `Rc` allocation.
#[derive(Clone)]
pub enum ComponentDef {
    Stateful(Rc<dyn StatefulComponent>),
    Functional(Rc<dyn FunctionalComponent>),
}

impl ComponentDef {
    pub fn name(&self) -> &str {
        match self {
            ComponentDef::Stateful(def) => def.name(),
            ComponentDef::Functional(def) => def.name(),
        }
    }

    fn addr(&self) -> *const () {
        match self {
            ComponentDef::Stateful(def) => Rc::as_ptr(def) as *const (),
            ComponentDef::Functional(def) => Rc::as_ptr(def) as *const (),
        }
    }

    /// Whether both refer to the same definition allocation.
    pub fn same_definition(&self, other: &ComponentDef) -> bool {
        matches!(
            (self, other),
            (ComponentDef::Stateful(_), ComponentDef::Stateful(_))
                | (ComponentDef::Functional(_), ComponentDef::Functional(_))
        ) && self.addr() == other.addr()
    }
}

impl fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentDef::Stateful(_) => write!(f, "Stateful({})", self.name()),
            ComponentDef::Functional(_) => write!(f, "Functional({})", self.name()),
        }
    }
}

#[derive(Clone, Debug)]
pub enum VNodeKind {
    Element { tag: Rc<str> },
    Text { value: Rc<str> },
    Fragment,
    /// Children are attached to the node matched by `target`.
    Portal { target: Rc<str> },
    Component(ComponentDef),
}

impl VNodeKind {
    /// Whether two kinds can be patched into one another without replacement.
    pub fn same_kind(&self, other: &VNodeKind) -> bool {
        match (self, other) {
            (VNodeKind::Component(a), VNodeKind::Component(b)) => matches!(
                (a, b),
                (ComponentDef::Stateful(_), ComponentDef::Stateful(_))
                    | (ComponentDef::Functional(_), ComponentDef::Functional(_))
            ),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

/// Children of a description. The shape picks the diff algorithm.
#[derive(Clone, Debug, Default)]
pub enum Children {
    #[default]
    None,
    Single(VNode),
    /// Positional identity.
    List(Vec<VNode>),
    /// Identity from each child's key.
    Keyed(Vec<VNode>),
}

impl Children {
    pub fn list(children: impl IntoIterator<Item = VNode>) -> Self {
        Children::List(children.into_iter().collect())
    }

    pub fn keyed(children: impl IntoIterator<Item = VNode>) -> Self {
        Children::Keyed(children.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Children::None => true,
            Children::Single(_) => false,
            Children::List(items) | Children::Keyed(items) => items.is_empty(),
        }
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self, Children::Keyed(_))
    }

    pub fn as_slice(&self) -> &[VNode] {
        match self {
            Children::None => &[],
            Children::Single(node) => std::slice::from_ref(node),
            Children::List(items) | Children::Keyed(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }
}

impl From<VNode> for Children {
    fn from(node: VNode) -> Self {
        Children::Single(node)
    }
}

impl From<Vec<VNode>> for Children {
    fn from(nodes: Vec<VNode>) -> Self {
        Children::List(nodes)
    }
}

#[derive(Clone)]
pub struct VNodeData {
    kind: VNodeKind,
    key: Option<Key>,
    attrs: Option<Attributes>,
    children: Children,
    node_ref: Option<NodeRef>,
    keep_alive: Option<KeepAliveScope>,
}

/// Shared, immutable description of one subtree node.
#[derive(Clone)]
pub struct VNode(Rc<VNodeData>);

impl VNode {
    fn from_kind(kind: VNodeKind) -> Self {
        Self(Rc::new(VNodeData {
            kind,
            key: None,
            attrs: None,
            children: Children::None,
            node_ref: None,
            keep_alive: None,
        }))
    }

    pub fn element(tag: impl Into<Rc<str>>) -> Self {
        Self::from_kind(VNodeKind::Element { tag: tag.into() })
    }

    pub fn text(value: impl Into<Rc<str>>) -> Self {
        Self::from_kind(VNodeKind::Text {
            value: value.into(),
        })
    }

    pub fn fragment(children: impl Into<Children>) -> Self {
        Self::from_kind(VNodeKind::Fragment).with_children(children)
    }

    pub fn portal(target: impl Into<Rc<str>>, children: impl Into<Children>) -> Self {
        Self::from_kind(VNodeKind::Portal {
            target: target.into(),
        })
        .with_children(children)
    }

    pub fn stateful(def: Rc<dyn StatefulComponent>) -> Self {
        Self::from_kind(VNodeKind::Component(ComponentDef::Stateful(def)))
    }

    pub fn functional(def: Rc<dyn FunctionalComponent>) -> Self {
        Self::from_kind(VNodeKind::Component(ComponentDef::Functional(def)))
    }

    fn edit(mut self, f: impl FnOnce(&mut VNodeData)) -> Self {
        f(Rc::make_mut(&mut self.0));
        self
    }

    pub fn key(self, key: Key) -> Self {
        self.edit(|data| data.key = Some(key))
    }

    /// Uses the hash of `key` as the sibling identity.
    ///
    /// Only the 64-bit hash is kept, so two distinct keys whose hashes
    /// collide are treated as the same sibling. Use [`VNode::key`] with
    /// caller-assigned integers where that matters.
    pub fn key_of<K: std::hash::Hash + ?Sized>(self, key: &K) -> Self {
        self.key(hash_key(key))
    }

    pub fn attr(self, name: impl Into<Rc<str>>, value: impl Into<AttrValue>) -> Self {
        let name = name.into();
        let value = value.into();
        self.edit(|data| {
            data.attrs.get_or_insert_with(Attributes::default).insert(name, value);
        })
    }

    pub fn on(self, event: impl Into<Rc<str>>, listener: impl Fn(&dyn std::any::Any) + 'static) -> Self {
        self.attr(event, AttrValue::Listener(Listener::new(listener)))
    }

    pub fn hook(
        self,
        name: HookName,
        f: impl Fn(Option<HostId>) -> Result<(), ComponentError> + 'static,
    ) -> Self {
        self.attr(name.as_str(), AttrValue::Hook(LifecycleHook::new(f)))
    }

    pub fn with_children(self, children: impl Into<Children>) -> Self {
        let children = children.into();
        self.edit(|data| data.children = children)
    }

    pub fn child(self, child: VNode) -> Self {
        self.with_children(Children::Single(child))
    }

    pub fn with_ref(self, node_ref: NodeRef) -> Self {
        self.edit(|data| data.node_ref = Some(node_ref))
    }

    pub fn keep_alive(self, scope: KeepAliveScope) -> Self {
        self.edit(|data| data.keep_alive = Some(scope))
    }

    pub fn kind(&self) -> &VNodeKind {
        &self.0.kind
    }

    pub fn key_value(&self) -> Option<Key> {
        self.0.key
    }

    pub fn attrs(&self) -> Option<&Attributes> {
        self.0.attrs.as_ref()
    }

    pub fn attr_value(&self, name: &str) -> Option<&AttrValue> {
        self.0.attrs.as_ref().and_then(|attrs| attrs.get(name))
    }

    pub fn children(&self) -> &Children {
        &self.0.children
    }

    pub fn node_ref(&self) -> Option<&NodeRef> {
        self.0.node_ref.as_ref()
    }

    pub fn keep_alive_scope(&self) -> Option<KeepAliveScope> {
        self.0.keep_alive
    }

    pub fn lifecycle_hook(&self, name: HookName) -> Option<&LifecycleHook> {
        match self.attr_value(name.as_str()) {
            Some(AttrValue::Hook(hook)) => Some(hook),
            _ => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.0.kind {
            VNodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    pub fn component(&self) -> Option<&ComponentDef> {
        match &self.0.kind {
            VNodeKind::Component(def) => Some(def),
            _ => None,
        }
    }

    /// Whether both values are the very same description.
    pub fn ptr_eq(&self, other: &VNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("VNode");
        out.field("kind", &self.0.kind);
        if let Some(key) = self.0.key {
            out.field("key", &key);
        }
        if let Some(attrs) = &self.0.attrs {
            out.field("attrs", attrs);
        }
        if !self.0.children.is_empty() {
            out.field("children", &self.0.children);
        }
        out.finish()
    }
}
