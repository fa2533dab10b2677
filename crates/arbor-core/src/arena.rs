//! Generational storage for mounted nodes.
//!
//! Every mounted node lives in one slot of [`MountArena`]. Parents own their
//! children through the id lists stored in [`MountedChildren`]; the `parent`
//! field is a plain id used for lookups and never frees anything.

use std::fmt;

use crate::component::ComponentSlot;
use crate::error::NodeError;
use crate::vnode::VNode;
use crate::HostId;

/// Stable identity of a mounted node. Stale ids never alias a newer node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountId {
    index: u32,
    generation: u32,
}

impl MountId {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Children as they were realized, mirroring the shape of the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum MountedChildren {
    #[default]
    None,
    Single(MountId),
    List(Vec<MountId>),
}

impl MountedChildren {
    pub(crate) fn ids(&self) -> &[MountId] {
        match self {
            MountedChildren::None => &[],
            MountedChildren::Single(id) => std::slice::from_ref(id),
            MountedChildren::List(ids) => ids,
        }
    }
}

pub(crate) struct Mounted {
    pub(crate) vnode: VNode,
    pub(crate) parent: Option<MountId>,
    /// Element, text and portal placeholder handle.
    pub(crate) host: Option<HostId>,
    pub(crate) svg: bool,
    pub(crate) children: MountedChildren,
    pub(crate) portal_target: Option<HostId>,
    pub(crate) component: Option<ComponentSlot>,
}

impl Mounted {
    pub(crate) fn new(vnode: VNode, parent: Option<MountId>, svg: bool) -> Self {
        Self {
            vnode,
            parent,
            host: None,
            svg,
            children: MountedChildren::None,
            portal_target: None,
            component: None,
        }
    }

    pub(crate) fn with_host(mut self, host: HostId) -> Self {
        self.host = Some(host);
        self
    }
}

struct Entry {
    generation: u32,
    node: Option<Mounted>,
}

#[derive(Default)]
pub(crate) struct MountArena {
    entries: Vec<Entry>,
    free: Vec<u32>,
    live: usize,
}

impl MountArena {
    pub(crate) fn insert(&mut self, node: Mounted) -> MountId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.generation = entry.generation.wrapping_add(1);
            entry.node = Some(node);
            return MountId {
                index,
                generation: entry.generation,
            };
        }
        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            node: Some(node),
        });
        MountId {
            index,
            generation: 0,
        }
    }

    pub(crate) fn contains(&self, id: MountId) -> bool {
        self.get(id).is_ok()
    }

    pub(crate) fn get(&self, id: MountId) -> Result<&Mounted, NodeError> {
        self.entries
            .get(id.index())
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_ref())
            .ok_or(NodeError::Missing { id })
    }

    pub(crate) fn get_mut(&mut self, id: MountId) -> Result<&mut Mounted, NodeError> {
        self.entries
            .get_mut(id.index())
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_mut())
            .ok_or(NodeError::Missing { id })
    }

    pub(crate) fn remove(&mut self, id: MountId) -> Result<Mounted, NodeError> {
        let entry = self
            .entries
            .get_mut(id.index())
            .filter(|entry| entry.generation == id.generation)
            .ok_or(NodeError::Missing { id })?;
        let node = entry.node.take().ok_or(NodeError::Missing { id })?;
        self.free.push(id.index);
        self.live -= 1;
        Ok(node)
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }
}
