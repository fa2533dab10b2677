//! Mount, patch and teardown over the mount arena.
//!
//! A [`Renderer`] owns the platform, the arena of mounted records and the
//! deferred hook queue. Every public entry point runs one synchronous pass
//! and flushes the hook queue before returning.

mod children;
mod component;

use std::rc::Rc;

use crate::arena::{MountArena, Mounted};
use crate::collections::map::{HashMap, HashSet};
use crate::component::{Activity, LifecycleState};
use crate::error::{CapturedError, ComponentError, ErrorHandler, ErrorOrigin, LogErrors, NodeError};
use crate::hooks::{Deferred, HookQueue};
use crate::options::RendererOptions;
use crate::platform::{AttrOutcome, AttrPatch, Platform, Scheduler};
use crate::runtime::JobQueue;
use crate::vnode::{Attributes, Children, HookName, KeepAliveScope, VNode, VNodeKind};
use crate::{HostId, Key, MountId};

/// Counters for the most recent pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    /// Records created, including every descendant.
    pub mounted: usize,
    /// Records patched in place. Identical descriptions are not counted.
    pub patched: usize,
    /// Records released, including every descendant.
    pub removed: usize,
    /// Keyed children physically moved.
    pub moved: usize,
    /// Nodes replaced because their kind, tag or definition changed.
    pub replaced: usize,
}

/// Where a node is realized: the physical container, the node to insert
/// before, the owning record and whether we are inside an `svg` subtree.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Slot {
    pub(crate) container: HostId,
    pub(crate) anchor: Option<HostId>,
    pub(crate) parent: Option<MountId>,
    pub(crate) svg: bool,
}

impl Slot {
    fn root(container: HostId) -> Self {
        Self {
            container,
            anchor: None,
            parent: None,
            svg: false,
        }
    }

    fn at(self, anchor: Option<HostId>) -> Self {
        Self { anchor, ..self }
    }
}

/// Whether `next` can be patched into the record holding `prev`. Keys do
/// not take part; the keyed diff pairs siblings by key before patching.
pub(crate) fn same_type(prev: &VNode, next: &VNode) -> bool {
    match (prev.kind(), next.kind()) {
        (VNodeKind::Element { tag: a }, VNodeKind::Element { tag: b }) => a == b,
        (VNodeKind::Component(a), VNodeKind::Component(b)) => a.same_definition(b),
        (a, b) => a.same_kind(b),
    }
}

pub struct Renderer<P: Platform> {
    platform: P,
    arena: MountArena,
    hooks: HookQueue,
    scheduler: Rc<dyn Scheduler>,
    roots: HashMap<HostId, MountId>,
    kept_alive: HashMap<(KeepAliveScope, Key), MountId>,
    options: RendererOptions,
    errors: Box<dyn ErrorHandler>,
    stats: PassStats,
    /// Components already re-rendered in the current pass or flush round.
    rendered: HashSet<MountId>,
}

impl<P: Platform> Renderer<P> {
    pub fn new(platform: P) -> Self {
        Self::with_options(platform, RendererOptions::default())
    }

    pub fn with_options(platform: P, options: RendererOptions) -> Self {
        Self::with_scheduler(platform, options, Rc::new(JobQueue::new()))
    }

    pub fn with_scheduler(platform: P, options: RendererOptions, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            platform,
            arena: MountArena::default(),
            hooks: HookQueue::default(),
            scheduler,
            roots: HashMap::default(),
            kept_alive: HashMap::default(),
            options,
            errors: Box::new(LogErrors),
            stats: PassStats::default(),
            rendered: HashSet::default(),
        }
    }

    /// Replaces the sink receiving captured component and hook failures.
    pub fn set_error_handler(&mut self, handler: impl ErrorHandler + 'static) {
        self.errors = Box::new(handler);
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    pub fn last_stats(&self) -> PassStats {
        self.stats
    }

    /// Number of live records, kept-alive subtrees included.
    pub fn mounted_count(&self) -> usize {
        self.arena.len()
    }

    /// Root record currently rendered into `container`.
    pub fn root(&self, container: HostId) -> Option<MountId> {
        self.roots.get(&container).copied()
    }

    /// First physical node of the record's rendered output.
    pub fn host_of(&self, id: MountId) -> Option<HostId> {
        self.first_host(id).ok().flatten()
    }

    pub fn component_state(&self, id: MountId) -> Option<(LifecycleState, Activity)> {
        let record = self.arena.get(id).ok()?;
        record.component.as_ref().map(|slot| (slot.state, slot.activity))
    }

    pub fn is_cached(&self, scope: KeepAliveScope, key: Key) -> bool {
        self.kept_alive.contains_key(&(scope, key))
    }

    /// Brings `container` in line with `next`: mounts on the first call,
    /// patches on later calls and tears everything down on `None`.
    pub fn render(&mut self, next: Option<VNode>, container: HostId) -> Result<(), NodeError> {
        self.stats = PassStats::default();
        self.rendered.clear();
        let slot = Slot::root(container);
        match (self.roots.get(&container).copied(), next) {
            (None, None) => {}
            (None, Some(next)) => {
                let id = self.mount(&next, slot)?;
                self.roots.insert(container, id);
            }
            (Some(prev), Some(next)) => {
                let id = self.patch(prev, &next, slot)?;
                self.roots.insert(container, id);
            }
            (Some(prev), None) => {
                self.roots.remove(&container);
                self.teardown(prev, true, false)?;
            }
        }
        log::trace!("render into {container}: {:?}", self.stats);
        self.flush_hooks();
        Ok(())
    }

    /// Runs every queued component update. Returns how many re-renders ran.
    pub fn flush_jobs(&mut self) -> Result<usize, NodeError> {
        self.stats = PassStats::default();
        let mut ran = 0;
        let mut rounds = 0;
        while self.scheduler.has_jobs() {
            if rounds == self.options.max_flush_rounds {
                let dropped = self.scheduler.take_jobs().len();
                self.errors.handle(CapturedError {
                    origin: ErrorOrigin::Scheduler,
                    component: None,
                    error: ComponentError::new(format!(
                        "update loop: still {dropped} jobs after {rounds} flush rounds"
                    )),
                });
                break;
            }
            rounds += 1;
            self.rendered.clear();

            let mut jobs: Vec<(usize, MountId)> = self
                .scheduler
                .take_jobs()
                .into_iter()
                .filter(|job| self.arena.contains(job.target))
                .map(|job| (self.depth(job.target), job.target))
                .collect();
            jobs.sort_by_key(|(depth, _)| *depth);

            for (_, target) in jobs {
                if self.rendered.contains(&target) || !self.is_live_component(target) {
                    continue;
                }
                self.rendered.insert(target);
                let slot = self.slot_of(target)?;
                self.rerender(target, ErrorOrigin::Scheduler, slot)?;
                ran += 1;
            }
            self.flush_hooks();
        }
        log::trace!("flushed {ran} jobs in {rounds} rounds: {:?}", self.stats);
        Ok(ran)
    }

    /// Destroys a kept-alive subtree. Returns whether an entry existed.
    pub fn evict(&mut self, scope: KeepAliveScope, key: Key) -> Result<bool, NodeError> {
        let Some(id) = self.kept_alive.remove(&(scope, key)) else {
            return Ok(false);
        };
        self.teardown(id, false, true)?;
        self.flush_hooks();
        Ok(true)
    }

    /// Destroys every kept-alive subtree cached under `scope`.
    pub fn clear_keep_alive(&mut self, scope: KeepAliveScope) -> Result<usize, NodeError> {
        let cached: Vec<(KeepAliveScope, Key)> = self
            .kept_alive
            .keys()
            .filter(|(entry_scope, _)| *entry_scope == scope)
            .copied()
            .collect();
        for entry in &cached {
            if let Some(id) = self.kept_alive.remove(entry) {
                self.teardown(id, false, true)?;
            }
        }
        self.flush_hooks();
        Ok(cached.len())
    }

    fn is_live_component(&self, id: MountId) -> bool {
        self.arena
            .get(id)
            .ok()
            .and_then(|record| record.component.as_ref())
            .is_some_and(|slot| slot.state == LifecycleState::Mounted && slot.activity == Activity::Active)
    }

    fn depth(&self, id: MountId) -> usize {
        let mut depth = 0;
        let mut cursor = self.arena.get(id).ok().and_then(|record| record.parent);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.arena.get(parent).ok().and_then(|record| record.parent);
        }
        depth
    }

    /// Slot a mounted record currently lives in, rebuilt from the tree.
    fn slot_of(&self, id: MountId) -> Result<Slot, NodeError> {
        let record = self.arena.get(id)?;
        let container = self
            .first_host(id)?
            .and_then(|host| self.platform.parent_of(host))
            .ok_or(NodeError::KindMismatch {
                id,
                expected: "attached node",
            })?;
        Ok(Slot {
            container,
            anchor: None,
            parent: record.parent,
            svg: record.svg,
        })
    }

    pub(crate) fn mount(&mut self, vnode: &VNode, slot: Slot) -> Result<MountId, NodeError> {
        self.stats.mounted += 1;
        match vnode.kind() {
            VNodeKind::Element { tag } => self.mount_element(vnode, tag, slot),
            VNodeKind::Text { value } => {
                let host = self.platform.create_text(value);
                self.platform.insert(slot.container, host, slot.anchor);
                let id = self
                    .arena
                    .insert(Mounted::new(vnode.clone(), slot.parent, slot.svg).with_host(host));
                if let Some(node_ref) = vnode.node_ref() {
                    self.hooks.push_mounted(Deferred::Ref {
                        node_ref: node_ref.clone(),
                        host: Some(host),
                    });
                }
                Ok(id)
            }
            VNodeKind::Fragment => {
                let id = self
                    .arena
                    .insert(Mounted::new(vnode.clone(), slot.parent, slot.svg));
                let placeholder;
                let children = match vnode.children() {
                    children if children.is_empty() => {
                        placeholder = Children::Single(VNode::text(""));
                        &placeholder
                    }
                    children => children,
                };
                let mounted = self.mount_children(children, Slot { parent: Some(id), ..slot })?;
                self.arena.get_mut(id)?.children = mounted;
                Ok(id)
            }
            VNodeKind::Portal { target } => {
                let target = self.resolve_portal(target, slot.container);
                let placeholder = self.platform.create_text("");
                self.platform.insert(slot.container, placeholder, slot.anchor);
                let mut record = Mounted::new(vnode.clone(), slot.parent, slot.svg).with_host(placeholder);
                record.portal_target = Some(target);
                let id = self.arena.insert(record);
                let child_slot = Slot {
                    container: target,
                    anchor: None,
                    parent: Some(id),
                    svg: slot.svg,
                };
                let mounted = self.mount_children(vnode.children(), child_slot)?;
                self.arena.get_mut(id)?.children = mounted;
                Ok(id)
            }
            VNodeKind::Component(def) => self.mount_component(vnode, def, slot),
        }
    }

    fn mount_element(&mut self, vnode: &VNode, tag: &str, slot: Slot) -> Result<MountId, NodeError> {
        let svg = slot.svg || tag == "svg";
        let host = self.platform.create_element(tag, svg);
        let id = self
            .arena
            .insert(Mounted::new(vnode.clone(), slot.parent, svg).with_host(host));

        let child_slot = Slot {
            container: host,
            anchor: None,
            parent: Some(id),
            svg: svg && tag != "foreignObject",
        };
        let mounted = self.mount_children(vnode.children(), child_slot)?;
        self.arena.get_mut(id)?.children = mounted;

        if self.patch_attrs(host, None, vnode.attrs(), svg) {
            self.drop_children(id)?;
        }
        self.fire_hook(id, vnode, HookName::BeforeMount, Some(host));
        self.platform.insert(slot.container, host, slot.anchor);

        if let Some(node_ref) = vnode.node_ref() {
            self.hooks.push_mounted(Deferred::Ref {
                node_ref: node_ref.clone(),
                host: Some(host),
            });
        }
        self.defer_hook(id, vnode, HookName::Mounted, Some(host), false);
        Ok(id)
    }

    fn resolve_portal(&mut self, target: &str, fallback: HostId) -> HostId {
        match self.platform.query_selector(target) {
            Some(host) => host,
            None => {
                if self.options.dev_mode {
                    log::warn!("portal target {target:?} not found; rendering into {fallback}");
                }
                fallback
            }
        }
    }

    /// Patches the record `id` towards `next` and returns the record now
    /// holding `next`, which differs from `id` after a replacement.
    pub(crate) fn patch(&mut self, id: MountId, next: &VNode, slot: Slot) -> Result<MountId, NodeError> {
        let prev = self.arena.get(id)?.vnode.clone();
        if prev.ptr_eq(next) {
            self.arena.get_mut(id)?.parent = slot.parent;
            return Ok(id);
        }
        if !same_type(&prev, next) {
            return self.replace(id, next, slot);
        }
        self.stats.patched += 1;
        match next.kind() {
            VNodeKind::Element { .. } => self.patch_element(id, &prev, next, slot)?,
            VNodeKind::Text { value } => {
                let host = self.own_host(id, "text")?;
                if !matches!(prev.kind(), VNodeKind::Text { value: old } if old == value) {
                    self.platform.set_text(host, value);
                }
                self.finish_patch(id, next, slot)?;
            }
            VNodeKind::Fragment => self.patch_fragment(id, &prev, next, slot)?,
            VNodeKind::Portal { target } => self.patch_portal(id, &prev, next, target, slot)?,
            VNodeKind::Component(_) => self.patch_component(id, &prev, next, slot)?,
        }
        Ok(id)
    }

    fn finish_patch(&mut self, id: MountId, next: &VNode, slot: Slot) -> Result<(), NodeError> {
        let record = self.arena.get_mut(id)?;
        record.vnode = next.clone();
        record.parent = slot.parent;
        Ok(())
    }

    fn replace(&mut self, id: MountId, next: &VNode, slot: Slot) -> Result<MountId, NodeError> {
        let anchor = match self.last_host(id)? {
            Some(host) => self.platform.next_sibling_of(host),
            None => slot.anchor,
        };
        log::debug!("replacing {id} before {anchor:?}");
        self.teardown(id, true, false)?;
        self.stats.replaced += 1;
        self.mount(next, slot.at(anchor))
    }

    fn patch_element(&mut self, id: MountId, prev: &VNode, next: &VNode, slot: Slot) -> Result<(), NodeError> {
        let host = self.own_host(id, "element")?;
        let svg = self.arena.get(id)?.svg;

        self.fire_hook(id, next, HookName::BeforeUpdate, Some(host));
        self.defer_hook(id, next, HookName::Updated, Some(host), true);

        let replaced = self.patch_attrs(host, prev.attrs(), next.attrs(), svg);
        if replaced {
            self.drop_children(id)?;
        }

        match (prev.node_ref(), next.node_ref()) {
            (Some(old), Some(new)) if old.ptr_eq(new) => {}
            (old, new) => {
                if let Some(old) = old {
                    self.hooks.push_mounted(Deferred::Ref {
                        node_ref: old.clone(),
                        host: None,
                    });
                }
                if let Some(new) = new {
                    self.hooks.push_mounted(Deferred::Ref {
                        node_ref: new.clone(),
                        host: Some(host),
                    });
                }
            }
        }

        let tag = next.tag().unwrap_or_default();
        let child_slot = Slot {
            container: host,
            anchor: None,
            parent: Some(id),
            svg: svg && tag != "foreignObject",
        };
        let prev_children = std::mem::take(&mut self.arena.get_mut(id)?.children);
        let children = self.patch_children(
            prev_children,
            prev.children().is_keyed(),
            next.children(),
            child_slot,
            true,
        )?;
        self.arena.get_mut(id)?.children = children;
        self.finish_patch(id, next, slot)
    }

    fn patch_fragment(&mut self, id: MountId, prev: &VNode, next: &VNode, slot: Slot) -> Result<(), NodeError> {
        let anchor = match self.last_host(id)? {
            Some(host) => self.platform.next_sibling_of(host),
            None => slot.anchor,
        };
        let placeholder;
        let children = match next.children() {
            children if children.is_empty() => {
                placeholder = Children::Single(VNode::text(""));
                &placeholder
            }
            children => children,
        };
        let child_slot = Slot {
            anchor,
            parent: Some(id),
            ..slot
        };
        let prev_children = std::mem::take(&mut self.arena.get_mut(id)?.children);
        let mounted = self.patch_children(
            prev_children,
            prev.children().is_keyed(),
            children,
            child_slot,
            false,
        )?;
        self.arena.get_mut(id)?.children = mounted;
        self.finish_patch(id, next, slot)
    }

    fn patch_portal(
        &mut self,
        id: MountId,
        prev: &VNode,
        next: &VNode,
        target: &str,
        slot: Slot,
    ) -> Result<(), NodeError> {
        let current = self.arena.get(id)?.portal_target.unwrap_or(slot.container);
        let moved_to = match prev.kind() {
            VNodeKind::Portal { target: old } if &**old == target => None,
            _ => Some(self.resolve_portal(target, slot.container)),
        };

        let child_slot = Slot {
            container: current,
            anchor: None,
            parent: Some(id),
            svg: slot.svg,
        };
        let prev_children = std::mem::take(&mut self.arena.get_mut(id)?.children);
        let mounted = self.patch_children(
            prev_children,
            prev.children().is_keyed(),
            next.children(),
            child_slot,
            false,
        )?;

        if let Some(target) = moved_to.filter(|target| *target != current) {
            log::debug!("portal {id} moving from {current} to {target}");
            for child in mounted.ids() {
                for host in self.collect_hosts(*child)? {
                    self.platform.append_child(target, host);
                }
            }
            self.arena.get_mut(id)?.portal_target = Some(target);
        }
        self.arena.get_mut(id)?.children = mounted;
        self.finish_patch(id, next, slot)
    }

    /// Diffs attributes, forwarding everything but lifecycle hooks. Returns
    /// whether the platform replaced the element's content.
    fn patch_attrs(
        &mut self,
        node: HostId,
        prev: Option<&Attributes>,
        next: Option<&Attributes>,
        svg: bool,
    ) -> bool {
        let mut replaced = false;
        if let Some(next) = next {
            for (name, value) in next {
                if HookName::from_attr(name).is_some() {
                    continue;
                }
                let old = prev.and_then(|prev| prev.get(&**name));
                if old == Some(value) {
                    continue;
                }
                let outcome = self.platform.patch_attr(AttrPatch {
                    node,
                    name,
                    prev: old,
                    next: Some(value),
                    svg,
                });
                replaced |= outcome == AttrOutcome::ContentReplaced;
            }
        }
        if let Some(prev) = prev {
            for (name, value) in prev {
                if HookName::from_attr(name).is_some() || next.is_some_and(|next| next.contains_key(&**name)) {
                    continue;
                }
                let outcome = self.platform.patch_attr(AttrPatch {
                    node,
                    name,
                    prev: Some(value),
                    next: None,
                    svg,
                });
                replaced |= outcome == AttrOutcome::ContentReplaced;
            }
        }
        replaced
    }

    /// Releases the mounted children of an element whose content the
    /// platform already replaced.
    fn drop_children(&mut self, id: MountId) -> Result<(), NodeError> {
        let children = std::mem::take(&mut self.arena.get_mut(id)?.children);
        for child in children.ids() {
            self.teardown(*child, false, false)?;
        }
        Ok(())
    }

    /// Releases `id` and everything below it. With `detach`, the record's
    /// own physical nodes are removed from wherever they are attached.
    /// `destroy` bypasses keep-alive caching for the whole subtree.
    pub(crate) fn teardown(&mut self, id: MountId, detach: bool, destroy: bool) -> Result<(), NodeError> {
        let record = self.arena.get(id)?;
        let vnode = record.vnode.clone();
        let keep = vnode.keep_alive_scope().is_some()
            && record
                .component
                .as_ref()
                .is_some_and(|slot| slot.activity == Activity::Active);
        if keep && !destroy {
            return self.deactivate(id);
        }

        let own_host = record.host;
        let host = match vnode.kind() {
            VNodeKind::Fragment | VNodeKind::Component(_) => self.first_host(id)?,
            _ => own_host,
        };
        self.fire_hook(id, &vnode, HookName::BeforeUnmount, host);

        let child_detach = match vnode.kind() {
            VNodeKind::Portal { .. } => true,
            VNodeKind::Fragment | VNodeKind::Component(_) => detach,
            VNodeKind::Element { .. } | VNodeKind::Text { .. } => false,
        };
        let children = std::mem::take(&mut self.arena.get_mut(id)?.children);
        for child in children.ids() {
            self.teardown(*child, child_detach, destroy)?;
        }

        if let Some(mut slot) = self.arena.get_mut(id)?.component.take() {
            slot.transition(LifecycleState::Unmounted);
            if let Some(mut instance) = slot.instance.take() {
                instance.teardown();
            }
            self.scheduler.invalidate_job(id);
        }

        self.defer_hook(id, &vnode, HookName::Unmounted, host, false);
        if let Some(node_ref) = vnode.node_ref() {
            self.hooks.push_mounted(Deferred::Ref {
                node_ref: node_ref.clone(),
                host: None,
            });
        }

        if detach {
            if let Some(host) = own_host {
                if let Some(parent) = self.platform.parent_of(host) {
                    self.platform.remove_child(parent, host);
                }
            }
        }
        self.arena.remove(id)?;
        self.stats.removed += 1;
        Ok(())
    }

    fn own_host(&self, id: MountId, expected: &'static str) -> Result<HostId, NodeError> {
        self.arena
            .get(id)?
            .host
            .ok_or(NodeError::KindMismatch { id, expected })
    }

    pub(crate) fn first_host(&self, id: MountId) -> Result<Option<HostId>, NodeError> {
        let record = self.arena.get(id)?;
        match record.vnode.kind() {
            VNodeKind::Fragment | VNodeKind::Component(_) => {
                for child in record.children.ids() {
                    if let Some(host) = self.first_host(*child)? {
                        return Ok(Some(host));
                    }
                }
                Ok(None)
            }
            _ => Ok(record.host),
        }
    }

    pub(crate) fn last_host(&self, id: MountId) -> Result<Option<HostId>, NodeError> {
        let record = self.arena.get(id)?;
        match record.vnode.kind() {
            VNodeKind::Fragment | VNodeKind::Component(_) => {
                for child in record.children.ids().iter().rev() {
                    if let Some(host) = self.last_host(*child)? {
                        return Ok(Some(host));
                    }
                }
                Ok(None)
            }
            _ => Ok(record.host),
        }
    }

    /// Physical nodes making up the record's output in container order.
    /// Portal children are not included; they live in the target.
    pub(crate) fn collect_hosts(&self, id: MountId) -> Result<Vec<HostId>, NodeError> {
        let mut hosts = Vec::new();
        self.collect_hosts_into(id, &mut hosts)?;
        Ok(hosts)
    }

    fn collect_hosts_into(&self, id: MountId, hosts: &mut Vec<HostId>) -> Result<(), NodeError> {
        let record = self.arena.get(id)?;
        match record.vnode.kind() {
            VNodeKind::Fragment | VNodeKind::Component(_) => {
                for child in record.children.ids() {
                    self.collect_hosts_into(*child, hosts)?;
                }
            }
            _ => hosts.extend(record.host),
        }
        Ok(())
    }

    /// Runs a hook attribute synchronously.
    fn fire_hook(&mut self, owner: MountId, vnode: &VNode, name: HookName, host: Option<HostId>) {
        if let Some(hook) = vnode.lifecycle_hook(name) {
            if let Err(error) = hook.call(host) {
                self.capture(owner, ErrorOrigin::LifecycleHook, error);
            }
        }
    }

    /// Queues a hook attribute for the end of the pass. Update hooks go to
    /// the front so hooks queued by descendants afterwards run first.
    fn defer_hook(&mut self, owner: MountId, vnode: &VNode, name: HookName, host: Option<HostId>, update: bool) {
        let Some(hook) = vnode.lifecycle_hook(name) else {
            return;
        };
        let deferred = Deferred::Hook {
            owner,
            hook: hook.clone(),
            host,
        };
        if update {
            self.hooks.push_updated(deferred);
        } else {
            self.hooks.push_mounted(deferred);
        }
    }

    fn flush_hooks(&mut self) {
        while let Some(deferred) = self.hooks.pop() {
            match deferred {
                Deferred::Hook { owner, hook, host } => {
                    let host = host.or_else(|| self.host_of(owner));
                    if let Err(error) = hook.call(host) {
                        self.capture(owner, ErrorOrigin::LifecycleHook, error);
                    }
                }
                Deferred::Ref { node_ref, host } => node_ref.call(host),
                Deferred::ComponentMounted(id) => self.call_instance(id, |instance| instance.mounted()),
                Deferred::ComponentUpdated(id) => self.call_instance(id, |instance| instance.updated()),
            }
        }
    }

    /// Hands a user-code failure to the error sink, attributed to the
    /// nearest enclosing component.
    pub(crate) fn capture(&mut self, id: MountId, origin: ErrorOrigin, error: ComponentError) {
        let mut component = None;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Ok(record) = self.arena.get(current) else {
                break;
            };
            if let Some(def) = record.vnode.component() {
                component = Some(def.name().to_string());
                break;
            }
            cursor = record.parent;
        }
        self.errors.handle(CapturedError {
            origin,
            component,
            error,
        });
    }
}

impl<P: Platform> std::fmt::Debug for Renderer<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("mounted", &self.arena.len())
            .field("roots", &self.roots.len())
            .field("kept_alive", &self.kept_alive.len())
            .field("pending_hooks", &self.hooks.len())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/reconciler_tests.rs"]
mod tests;
