#![doc = r"Core reconciliation engine for Arbor retained trees."]

pub mod arena;
pub mod collections;
pub mod component;
pub mod error;
pub mod hooks;
pub mod lis;
pub mod memory;
pub mod options;
pub mod platform;
pub mod reconciler;
pub mod runtime;
pub mod vnode;

pub use arena::MountId;
pub use component::{
    props_changed, ComponentContext, ComponentInstance, FunctionalComponent, LifecycleState,
    StatefulComponent, Activity,
};
pub use error::{CapturedError, ComponentError, ErrorHandler, ErrorOrigin, LogErrors, NodeError};
pub use lis::longest_increasing_subsequence;
pub use memory::{HostKind, MemoryPlatform, PlatformOp};
pub use options::RendererOptions;
pub use platform::{AttrOutcome, AttrPatch, Platform, Scheduler};
pub use reconciler::{PassStats, Renderer};
pub use runtime::{JobQueue, UpdateHandle, UpdateJob};
pub use vnode::{
    AttrValue, Attributes, Children, ComponentDef, HookName, KeepAliveScope, LifecycleHook,
    Listener, NodeRef, VNode, VNodeKind,
};

use std::hash::{Hash, Hasher};

/// Sibling identity token used by the keyed children algorithm.
pub type Key = u64;

/// Opaque handle of a node realized by a [`Platform`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(pub usize);

impl std::fmt::Display for HostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hashes an arbitrary value into a [`Key`]. Equal values always map to the
/// same key; distinct values may collide.
pub fn hash_key<K: Hash + ?Sized>(key: &K) -> Key {
    let mut hasher = collections::hasher();
    key.hash(&mut hasher);
    hasher.finish()
}
