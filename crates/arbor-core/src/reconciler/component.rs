//! Component nodes: first render, updates, keep-alive activation.

use crate::arena::{Mounted, MountedChildren};
use crate::component::{Activity, ComponentContext, ComponentInstance, ComponentSlot, LifecycleState};
use crate::error::{ComponentError, ErrorOrigin, NodeError};
use crate::hash_key;
use crate::hooks::Deferred;
use crate::platform::Platform;
use crate::runtime::UpdateHandle;
use crate::vnode::{ComponentDef, HookName, KeepAliveScope, VNode};
use crate::{Key, MountId};

use super::{Renderer, Slot};

/// Cache key of a kept-alive component: its own key, else its definition name.
fn keep_alive_key(vnode: &VNode, def: &ComponentDef) -> Key {
    vnode.key_value().unwrap_or_else(|| hash_key(def.name()))
}

impl<P: Platform> Renderer<P> {
    pub(super) fn mount_component(&mut self, vnode: &VNode, def: &ComponentDef, slot: Slot) -> Result<MountId, NodeError> {
        if let Some(id) = self.take_cached(vnode, def) {
            self.stats.mounted -= 1;
            return self.activate(id, vnode, slot);
        }

        let mut record = Mounted::new(vnode.clone(), slot.parent, slot.svg);
        record.component = Some(ComponentSlot::new());
        let id = self.arena.insert(record);

        let cx = ComponentContext::new(vnode, UpdateHandle::new(&self.scheduler, id));
        let rendered = match def {
            ComponentDef::Stateful(def) => match def.create_instance(&cx) {
                Ok(mut instance) => {
                    let rendered = instance.render();
                    if let Some(slot) = self.arena.get_mut(id)?.component.as_mut() {
                        slot.instance = Some(instance);
                    }
                    rendered
                }
                Err(error) => Err(error),
            },
            ComponentDef::Functional(def) => def.render(&cx),
        };
        let tree = rendered.unwrap_or_else(|error| {
            self.capture(id, ErrorOrigin::Mount, error);
            VNode::text("")
        });

        let root = self.mount(&tree, Slot { parent: Some(id), ..slot })?;
        let record = self.arena.get_mut(id)?;
        record.children = MountedChildren::Single(root);
        let stateful = match record.component.as_mut() {
            Some(component) => {
                component.transition(LifecycleState::Mounted);
                component.instance.is_some()
            }
            None => false,
        };

        if stateful {
            self.hooks.push_mounted(Deferred::ComponentMounted(id));
        }
        let host = self.first_host(id)?;
        if let Some(node_ref) = vnode.node_ref() {
            self.hooks.push_mounted(Deferred::Ref {
                node_ref: node_ref.clone(),
                host,
            });
        }
        self.defer_hook(id, vnode, HookName::Mounted, host, false);
        Ok(id)
    }

    pub(super) fn patch_component(&mut self, id: MountId, prev: &VNode, next: &VNode, slot: Slot) -> Result<(), NodeError> {
        let Some(def) = next.component() else {
            return Err(NodeError::KindMismatch { id, expected: "component" });
        };
        let update = match def {
            ComponentDef::Stateful(_) => {
                let instance = self.instance_mut(id)?;
                match instance {
                    Some(instance) => {
                        instance.set_props(next);
                        instance.should_update(prev, next)
                    }
                    // first render failed; nothing to update until remounted
                    None => false,
                }
            }
            ComponentDef::Functional(def) => def.should_update(prev, next),
        };
        self.finish_patch(id, next, slot)?;

        if update {
            self.scheduler.invalidate_job(id);
            self.rendered.insert(id);
            self.rerender(id, ErrorOrigin::Update, slot)?;
        }
        Ok(())
    }

    fn instance_mut(&mut self, id: MountId) -> Result<Option<&mut Box<dyn ComponentInstance>>, NodeError> {
        Ok(self
            .arena
            .get_mut(id)?
            .component
            .as_mut()
            .and_then(|slot| slot.instance.as_mut()))
    }

    /// Renders the component again and patches its rendered root. A failed
    /// render is reported and leaves the previous subtree in place.
    pub(super) fn rerender(&mut self, id: MountId, origin: ErrorOrigin, slot: Slot) -> Result<(), NodeError> {
        let record = self.arena.get(id)?;
        let vnode = record.vnode.clone();
        let Some(def) = vnode.component().cloned() else {
            return Err(NodeError::KindMismatch { id, expected: "component" });
        };
        let MountedChildren::Single(root) = record.children else {
            return Err(NodeError::KindMismatch { id, expected: "rendered component" });
        };
        self.set_state(id, LifecycleState::Updating)?;

        let rendered = match &def {
            ComponentDef::Stateful(_) => match self.instance_mut(id)? {
                Some(instance) => instance.render(),
                None => Err(ComponentError::new("component instance missing")),
            },
            ComponentDef::Functional(def) => {
                let cx = ComponentContext::new(&vnode, UpdateHandle::new(&self.scheduler, id));
                def.render(&cx)
            }
        };
        let tree = match rendered {
            Ok(tree) => tree,
            Err(error) => {
                self.set_state(id, LifecycleState::Mounted)?;
                self.capture(id, origin, error);
                return Ok(());
            }
        };

        let host = self.first_host(id)?;
        self.fire_hook(id, &vnode, HookName::BeforeUpdate, host);
        self.defer_hook(id, &vnode, HookName::Updated, None, true);
        if matches!(def, ComponentDef::Stateful(_)) {
            self.hooks.push_updated(Deferred::ComponentUpdated(id));
        }

        let container = host
            .and_then(|host| self.platform.parent_of(host))
            .unwrap_or(slot.container);
        let root_slot = Slot {
            container,
            anchor: None,
            parent: Some(id),
            svg: slot.svg,
        };
        let root = self.patch(root, &tree, root_slot)?;
        self.arena.get_mut(id)?.children = MountedChildren::Single(root);
        self.set_state(id, LifecycleState::Mounted)
    }

    fn set_state(&mut self, id: MountId, state: LifecycleState) -> Result<(), NodeError> {
        if let Some(slot) = self.arena.get_mut(id)?.component.as_mut() {
            slot.transition(state);
        }
        Ok(())
    }

    fn take_cached(&mut self, vnode: &VNode, def: &ComponentDef) -> Option<MountId> {
        let entry = (vnode.keep_alive_scope()?, keep_alive_key(vnode, def));
        let id = *self.kept_alive.get(&entry)?;
        let same = self
            .arena
            .get(id)
            .ok()?
            .vnode
            .component()
            .is_some_and(|cached| cached.same_definition(def));
        if !same {
            return None;
        }
        self.kept_alive.remove(&entry);
        Some(id)
    }

    /// Reattaches a cached subtree at `slot` and patches it towards `vnode`.
    fn activate(&mut self, id: MountId, vnode: &VNode, slot: Slot) -> Result<MountId, NodeError> {
        log::debug!("reactivating kept-alive {id}");
        for host in self.collect_hosts(id)? {
            self.platform.insert(slot.container, host, slot.anchor);
        }
        if let Some(component) = self.arena.get_mut(id)?.component.as_mut() {
            component.cached = false;
        }
        self.propagate_activity(id, Activity::Active)?;
        self.patch(id, vnode, slot)
    }

    /// Detaches the subtree and parks it in the keep-alive cache.
    pub(super) fn deactivate(&mut self, id: MountId) -> Result<(), NodeError> {
        let record = self.arena.get(id)?;
        let (Some(scope), Some(def)) = (record.vnode.keep_alive_scope(), record.vnode.component()) else {
            return Err(NodeError::KindMismatch { id, expected: "kept-alive component" });
        };
        let entry: (KeepAliveScope, Key) = (scope, keep_alive_key(&record.vnode, def));
        log::debug!("deactivating kept-alive {id}");

        for host in self.collect_hosts(id)? {
            if let Some(parent) = self.platform.parent_of(host) {
                self.platform.remove_child(parent, host);
            }
        }
        self.propagate_activity(id, Activity::Inactive)?;
        let record = self.arena.get_mut(id)?;
        record.parent = None;
        if let Some(component) = record.component.as_mut() {
            component.cached = true;
        }
        self.scheduler.invalidate_job(id);

        if let Some(previous) = self.kept_alive.insert(entry, id) {
            if previous != id {
                self.teardown(previous, false, true)?;
            }
        }
        Ok(())
    }

    /// Sets `activity` on every component below `id`, children first,
    /// stopping at subtrees that are cached on their own.
    fn propagate_activity(&mut self, id: MountId, activity: Activity) -> Result<(), NodeError> {
        let children = self.arena.get(id)?.children.ids().to_vec();
        for child in children {
            let independent = self
                .arena
                .get(child)?
                .component
                .as_ref()
                .is_some_and(|slot| slot.cached);
            if !independent {
                self.propagate_activity(child, activity)?;
            }
        }

        let changed = match self.arena.get_mut(id)?.component.as_mut() {
            Some(slot) if slot.activity != activity => {
                slot.activity = activity;
                true
            }
            _ => false,
        };
        if changed {
            self.call_instance(id, |instance| match activity {
                Activity::Active => instance.activated(),
                Activity::Inactive => instance.deactivated(),
            });
        }
        Ok(())
    }

    /// Runs a callback on the live instance, reporting its failure.
    pub(super) fn call_instance(
        &mut self,
        id: MountId,
        f: impl FnOnce(&mut dyn ComponentInstance) -> Result<(), ComponentError>,
    ) {
        let Ok(Some(instance)) = self.instance_mut(id) else {
            return;
        };
        if let Err(error) = f(instance.as_mut()) {
            self.capture(id, ErrorOrigin::LifecycleHook, error);
        }
    }
}
