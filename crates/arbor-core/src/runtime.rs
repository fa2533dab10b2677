use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexSet;

use crate::platform::Scheduler;
use crate::MountId;

/// Request to re-render the component mounted at `target`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UpdateJob {
    pub target: MountId,
}

/// Default single-threaded [`Scheduler`]: insertion ordered, one job per target.
#[derive(Default)]
pub struct JobQueue {
    jobs: RefCell<IndexSet<MountId>>,
    flush_requested: Cell<bool>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a flush has been requested since the last call.
    pub fn take_flush_request(&self) -> bool {
        self.flush_requested.replace(false)
    }

    pub fn len(&self) -> usize {
        self.jobs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.borrow().is_empty()
    }
}

impl Scheduler for JobQueue {
    fn queue_job(&self, job: UpdateJob) {
        self.jobs.borrow_mut().insert(job.target);
    }

    fn invalidate_job(&self, target: MountId) {
        self.jobs.borrow_mut().shift_remove(&target);
    }

    fn take_jobs(&self) -> Vec<UpdateJob> {
        self.jobs
            .borrow_mut()
            .drain(..)
            .map(|target| UpdateJob { target })
            .collect()
    }

    fn has_jobs(&self) -> bool {
        !self.jobs.borrow().is_empty()
    }

    fn schedule_flush(&self) {
        self.flush_requested.set(true);
    }
}

/// Lets component code request a re-render of its own node.
///
/// The handle holds the scheduler weakly and targets a generational id, so it
/// goes inert once the renderer is dropped or the component unmounts.
#[derive(Clone)]
pub struct UpdateHandle {
    scheduler: Weak<dyn Scheduler>,
    target: MountId,
}

impl UpdateHandle {
    pub(crate) fn new(scheduler: &Rc<dyn Scheduler>, target: MountId) -> Self {
        Self {
            scheduler: Rc::downgrade(scheduler),
            target,
        }
    }

    pub fn target(&self) -> MountId {
        self.target
    }

    pub fn request_update(&self) {
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.queue_job(UpdateJob {
                target: self.target,
            });
            scheduler.schedule_flush();
        }
    }
}

impl std::fmt::Debug for UpdateHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateHandle")
            .field("target", &self.target)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
