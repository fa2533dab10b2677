//! Deferred lifecycle callbacks.
//!
//! Mutation runs parent before children, but `mounted` and `updated`
//! callbacks must observe children first. Mount callbacks are pushed at the
//! tail once a subtree is complete; update callbacks are pushed at the head
//! before recursing, so anything queued by the children lands in front.

use std::collections::VecDeque;

use crate::vnode::{LifecycleHook, NodeRef};
use crate::{HostId, MountId};

pub(crate) enum Deferred {
    Hook {
        owner: MountId,
        hook: LifecycleHook,
        host: Option<HostId>,
    },
    Ref {
        node_ref: NodeRef,
        host: Option<HostId>,
    },
    ComponentMounted(MountId),
    ComponentUpdated(MountId),
}

#[derive(Default)]
pub(crate) struct HookQueue {
    pending: VecDeque<Deferred>,
}

impl HookQueue {
    pub(crate) fn push_mounted(&mut self, deferred: Deferred) {
        self.pending.push_back(deferred);
    }

    pub(crate) fn push_updated(&mut self, deferred: Deferred) {
        self.pending.push_front(deferred);
    }

    pub(crate) fn pop(&mut self) -> Option<Deferred> {
        self.pending.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{MountArena, Mounted};
    use crate::vnode::VNode;

    fn ids(count: usize) -> Vec<MountId> {
        let mut arena = MountArena::default();
        (0..count)
            .map(|_| arena.insert(Mounted::new(VNode::text(""), None, false)))
            .collect()
    }

    fn label(deferred: &Deferred) -> String {
        match deferred {
            Deferred::ComponentMounted(id) => format!("mounted {}", id.index()),
            Deferred::ComponentUpdated(id) => format!("updated {}", id.index()),
            Deferred::Hook { .. } => "hook".to_string(),
            Deferred::Ref { .. } => "ref".to_string(),
        }
    }

    #[test]
    fn mount_callbacks_keep_queue_order() {
        let ids = ids(3);
        let mut queue = HookQueue::default();
        for id in &ids {
            queue.push_mounted(Deferred::ComponentMounted(*id));
        }
        let order: Vec<String> = std::iter::from_fn(|| queue.pop()).map(|d| label(&d)).collect();
        assert_eq!(order, ["mounted 0", "mounted 1", "mounted 2"]);
    }

    #[test]
    fn update_callbacks_queued_before_children_run_after_them() {
        let ids = ids(3);
        let mut queue = HookQueue::default();
        // parent queues before recursing, then child, then grandchild
        for id in &ids {
            queue.push_updated(Deferred::ComponentUpdated(*id));
        }
        queue.push_mounted(Deferred::ComponentMounted(ids[0]));
        assert_eq!(queue.len(), 4);
        let order: Vec<String> = std::iter::from_fn(|| queue.pop()).map(|d| label(&d)).collect();
        assert_eq!(order, ["updated 2", "updated 1", "updated 0", "mounted 0"]);
    }
}
