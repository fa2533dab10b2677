//! Standard runtime services backed by Rust's `std` library.
//!
//! [`StdScheduler`] is a [`Scheduler`] whose queue can be fed from any
//! thread. The renderer stays on its own thread and drains the queue in
//! [`Renderer::flush_jobs`]; other threads hold a clone of the scheduler and
//! call [`StdScheduler::request_update`] with the id of a mounted component.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use arbor_core::{MountId, Platform, Renderer, RendererOptions, Scheduler, UpdateJob};
use indexmap::IndexSet;

type Waker = Arc<dyn Fn() + Send + Sync + 'static>;

struct Shared {
    jobs: Mutex<IndexSet<MountId>>,
    flush_requested: AtomicBool,
    flush_waker: RwLock<Option<Waker>>,
}

/// Thread-safe job queue. Clones share the same queue.
#[derive(Clone)]
pub struct StdScheduler {
    shared: Arc<Shared>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                jobs: Mutex::new(IndexSet::new()),
                flush_requested: AtomicBool::new(false),
                flush_waker: RwLock::new(None),
            }),
        }
    }

    /// Queues a re-render of the component mounted at `target` and asks the
    /// host for a flush.
    pub fn request_update(&self, target: MountId) {
        self.queue_job(UpdateJob { target });
        self.schedule_flush();
    }

    /// Returns whether a flush has been requested since the last call.
    pub fn take_flush_request(&self) -> bool {
        self.shared.flush_requested.swap(false, Ordering::SeqCst)
    }

    /// Registers a waker invoked whenever a flush is requested.
    pub fn set_flush_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self
            .shared
            .flush_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(waker));
    }

    /// Clears any registered flush waker.
    pub fn clear_flush_waker(&self) {
        *self
            .shared
            .flush_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn pending(&self) -> usize {
        self.jobs().len()
    }

    fn jobs(&self) -> MutexGuard<'_, IndexSet<MountId>> {
        // a panicking producer cannot leave the set half-updated
        self.shared
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn wake(&self) {
        let waker = self
            .shared
            .flush_waker
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field("pending", &self.pending())
            .field(
                "flush_requested",
                &self.shared.flush_requested.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl Scheduler for StdScheduler {
    fn queue_job(&self, job: UpdateJob) {
        let inserted = self.jobs().insert(job.target);
        if inserted {
            log::trace!("queued update for {}", job.target);
        }
    }

    fn invalidate_job(&self, target: MountId) {
        self.jobs().shift_remove(&target);
    }

    fn take_jobs(&self) -> Vec<UpdateJob> {
        self.jobs()
            .drain(..)
            .map(|target| UpdateJob { target })
            .collect()
    }

    fn has_jobs(&self) -> bool {
        !self.jobs().is_empty()
    }

    fn schedule_flush(&self) {
        self.shared.flush_requested.store(true, Ordering::SeqCst);
        self.wake();
    }
}

/// Builds a renderer driven by a shared [`StdScheduler`].
pub fn renderer<P: Platform>(
    platform: P,
    options: RendererOptions,
    scheduler: &StdScheduler,
) -> Renderer<P> {
    Renderer::with_scheduler(platform, options, Rc::new(scheduler.clone()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use arbor_core::{MemoryPlatform, VNode};
    use arbor_testing::{Recorder, StatefulFn};

    use super::*;

    #[test]
    fn jobs_are_deduplicated_and_invalidated() {
        let scheduler = StdScheduler::new();
        let mut platform = MemoryPlatform::new();
        let root = platform.create_root("root");
        let mut renderer = renderer(platform, RendererOptions::default(), &scheduler);
        let recorder = Recorder::new();
        let a = StatefulFn::new("A", &recorder, |_| Ok(VNode::text("a")));
        renderer
            .render(Some(VNode::stateful(a)), root)
            .expect("mount");
        let target = renderer.root(root).expect("root record");

        scheduler.request_update(target);
        scheduler.request_update(target);
        assert_eq!(scheduler.pending(), 1);

        scheduler.invalidate_job(target);
        assert!(!scheduler.has_jobs());
    }

    #[test]
    fn updates_requested_from_another_thread_are_flushed() {
        let scheduler = StdScheduler::new();
        let mut platform = MemoryPlatform::new();
        let root = platform.create_root("root");
        let mut renderer = renderer(platform, RendererOptions::default(), &scheduler);
        let recorder = Recorder::new();
        let counter = StatefulFn::new("Counter", &recorder, |_| Ok(VNode::text("n")));
        renderer
            .render(Some(VNode::stateful(counter)), root)
            .expect("mount");
        let target = renderer.root(root).expect("root record");
        recorder.take();

        let remote = scheduler.clone();
        thread::spawn(move || remote.request_update(target))
            .join()
            .expect("producer thread");

        assert!(scheduler.take_flush_request());
        assert!(!scheduler.take_flush_request());
        assert_eq!(renderer.flush_jobs().expect("flush"), 1);
        assert_eq!(recorder.take(), ["Counter:render", "Counter:updated"]);
    }

    #[test]
    fn waker_runs_on_every_flush_request() {
        let scheduler = StdScheduler::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        scheduler.set_flush_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.schedule_flush();
        scheduler.schedule_flush();
        assert_eq!(wakes.load(Ordering::SeqCst), 2);

        scheduler.clear_flush_waker();
        scheduler.schedule_flush();
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }
}
