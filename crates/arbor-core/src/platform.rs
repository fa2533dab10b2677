//! Host abstraction traits consumed by the reconciler.
//!
//! The engine never touches a real surface. Node creation, insertion and
//! attribute writes go through [`Platform`]; deferred component updates go
//! through [`Scheduler`]. Hosts provide both.

use crate::runtime::UpdateJob;
use crate::vnode::AttrValue;
use crate::{HostId, MountId};

/// A single attribute write requested by the reconciler.
#[derive(Debug, Clone, Copy)]
pub struct AttrPatch<'a> {
    pub node: HostId,
    pub name: &'a str,
    pub prev: Option<&'a AttrValue>,
    /// `None` removes the attribute.
    pub next: Option<&'a AttrValue>,
    pub svg: bool,
}

/// Result of an attribute write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOutcome {
    Applied,
    /// The write replaced the element's content wholesale (raw markup and
    /// similar). The engine tears down the element's mounted children.
    ContentReplaced,
}

/// Primitive operations over the retained tree.
///
/// Inserting a node that already has a parent moves it.
pub trait Platform {
    fn create_element(&mut self, tag: &str, svg: bool) -> HostId;

    fn create_text(&mut self, value: &str) -> HostId;

    fn set_text(&mut self, node: HostId, value: &str);

    fn append_child(&mut self, parent: HostId, child: HostId);

    fn insert_before(&mut self, parent: HostId, child: HostId, reference: HostId);

    fn remove_child(&mut self, parent: HostId, child: HostId);

    fn clear_content(&mut self, parent: HostId);

    fn parent_of(&self, node: HostId) -> Option<HostId>;

    fn next_sibling_of(&self, node: HostId) -> Option<HostId>;

    fn query_selector(&self, selector: &str) -> Option<HostId>;

    fn patch_attr(&mut self, patch: AttrPatch<'_>) -> AttrOutcome;

    /// Inserts before `anchor`, appending when there is none.
    fn insert(&mut self, parent: HostId, child: HostId, anchor: Option<HostId>) {
        match anchor {
            Some(reference) => self.insert_before(parent, child, reference),
            None => self.append_child(parent, child),
        }
    }
}

/// Queue of deferred component re-renders.
///
/// Implementations deduplicate by target. The renderer drains the queue in
/// [`crate::Renderer::flush_jobs`]; it never runs a job synchronously.
/// Jobs carry no completion callbacks: hooks queued by a job run when the
/// flush round ends, and render failures reach the renderer's
/// [`crate::ErrorHandler`] tagged [`crate::ErrorOrigin::Scheduler`].
pub trait Scheduler {
    fn queue_job(&self, job: UpdateJob);

    /// Drops a pending job, used when a parent update already re-rendered it.
    fn invalidate_job(&self, target: MountId);

    fn take_jobs(&self) -> Vec<UpdateJob>;

    fn has_jobs(&self) -> bool;

    /// Asks the host to call `flush_jobs` soon.
    fn schedule_flush(&self) {}
}
