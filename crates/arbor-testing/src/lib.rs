//! Test harness for Arbor.
//!
//! [`TestRenderer`] owns a [`Renderer`] over a [`MemoryPlatform`] with a
//! detached root container, records captured errors, and exposes the
//! platform's markup and operation log. [`Recorder`] collects lifecycle
//! events in order; [`FnComponent`] and [`StatefulFn`] build components from
//! closures.

use std::cell::RefCell;
use std::rc::Rc;

use arbor_core::{
    CapturedError, Children, ComponentContext, ComponentError, ComponentInstance, FunctionalComponent,
    HostId, MemoryPlatform, NodeError, PlatformOp, Renderer, RendererOptions, StatefulComponent,
    UpdateHandle, VNode,
};

/// Headless renderer bound to one root container.
pub struct TestRenderer {
    renderer: Renderer<MemoryPlatform>,
    root: HostId,
    errors: Rc<RefCell<Vec<CapturedError>>>,
}

impl TestRenderer {
    /// Development diagnostics enabled, default thresholds.
    pub fn new() -> Self {
        Self::with_options(RendererOptions::default().dev_mode(true))
    }

    pub fn with_options(options: RendererOptions) -> Self {
        let mut platform = MemoryPlatform::new();
        let root = platform.create_root("root");
        let mut renderer = Renderer::with_options(platform, options);
        let errors: Rc<RefCell<Vec<CapturedError>>> = Rc::default();
        let sink = Rc::clone(&errors);
        renderer.set_error_handler(move |error: CapturedError| sink.borrow_mut().push(error));
        Self { renderer, root, errors }
    }

    pub fn render(&mut self, tree: VNode) -> Result<(), NodeError> {
        self.renderer.render(Some(tree), self.root)
    }

    pub fn unmount(&mut self) -> Result<(), NodeError> {
        self.renderer.render(None, self.root)
    }

    /// Runs queued component updates until the queue is idle.
    pub fn flush(&mut self) -> Result<usize, NodeError> {
        self.renderer.flush_jobs()
    }

    pub fn root(&self) -> HostId {
        self.root
    }

    /// Markup currently inside the root container.
    pub fn html(&self) -> String {
        self.renderer.platform().inner(self.root)
    }

    pub fn platform(&self) -> &MemoryPlatform {
        self.renderer.platform()
    }

    pub fn platform_mut(&mut self) -> &mut MemoryPlatform {
        self.renderer.platform_mut()
    }

    pub fn renderer(&self) -> &Renderer<MemoryPlatform> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<MemoryPlatform> {
        &mut self.renderer
    }

    /// Platform operations since the last call.
    pub fn take_ops(&mut self) -> Vec<PlatformOp> {
        self.renderer.platform_mut().take_ops()
    }

    /// Captured errors since the last call.
    pub fn take_errors(&self) -> Vec<CapturedError> {
        std::mem::take(&mut *self.errors.borrow_mut())
    }

    /// Host nodes directly under the root container.
    pub fn root_children(&self) -> Vec<HostId> {
        self.renderer.platform().children(self.root).to_vec()
    }
}

impl Default for TestRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, ordered event log.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.events.borrow_mut().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Lifecycle hook recording `label` each time it runs.
    pub fn hook(&self, label: &str) -> impl Fn(Option<HostId>) -> Result<(), ComponentError> + 'static {
        let recorder = self.clone();
        let label = label.to_string();
        move |_| {
            recorder.record(label.clone());
            Ok(())
        }
    }

    /// Lifecycle hook recording `label` and the handle it received.
    pub fn hook_with_host(&self, label: &str) -> impl Fn(Option<HostId>) -> Result<(), ComponentError> + 'static {
        let recorder = self.clone();
        let label = label.to_string();
        move |host| {
            match host {
                Some(host) => recorder.record(format!("{label} {host}")),
                None => recorder.record(format!("{label} -")),
            }
            Ok(())
        }
    }
}

type RenderFn = dyn Fn(&ComponentContext<'_>) -> Result<VNode, ComponentError>;
type UpdateFn = dyn Fn(&VNode, &VNode) -> bool;

/// Functional component backed by a closure.
pub struct FnComponent {
    name: String,
    render: Box<RenderFn>,
    should_update: Option<Box<UpdateFn>>,
}

impl FnComponent {
    pub fn new(
        name: &str,
        render: impl Fn(&ComponentContext<'_>) -> Result<VNode, ComponentError> + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            render: Box::new(render),
            should_update: None,
        })
    }

    /// Same as [`FnComponent::new`] with a custom update check.
    pub fn with_update_check(
        name: &str,
        render: impl Fn(&ComponentContext<'_>) -> Result<VNode, ComponentError> + 'static,
        should_update: impl Fn(&VNode, &VNode) -> bool + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            render: Box::new(render),
            should_update: Some(Box::new(should_update)),
        })
    }
}

impl FunctionalComponent for FnComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, cx: &ComponentContext<'_>) -> Result<VNode, ComponentError> {
        (self.render)(cx)
    }

    fn should_update(&self, prev: &VNode, next: &VNode) -> bool {
        match &self.should_update {
            Some(check) => check(prev, next),
            None => arbor_core::props_changed(prev, next),
        }
    }
}

type StatefulRenderFn = dyn Fn(&VNode) -> Result<VNode, ComponentError>;

/// Stateful component whose instances render through a shared closure and
/// record every lifecycle callback as `"{name}:{event}"`.
pub struct StatefulFn {
    name: String,
    recorder: Recorder,
    render: Rc<StatefulRenderFn>,
    handle: Rc<RefCell<Option<UpdateHandle>>>,
}

impl StatefulFn {
    pub fn new(
        name: &str,
        recorder: &Recorder,
        render: impl Fn(&VNode) -> Result<VNode, ComponentError> + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            recorder: recorder.clone(),
            render: Rc::new(render),
            handle: Rc::default(),
        })
    }

    /// Update handle of the most recently created instance.
    pub fn handle(&self) -> Option<UpdateHandle> {
        self.handle.borrow().clone()
    }
}

impl StatefulComponent for StatefulFn {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_instance(&self, cx: &ComponentContext<'_>) -> Result<Box<dyn ComponentInstance>, ComponentError> {
        self.recorder.record(format!("{}:create", self.name));
        *self.handle.borrow_mut() = Some(cx.update_handle());
        Ok(Box::new(RecordingInstance {
            name: self.name.clone(),
            recorder: self.recorder.clone(),
            props: cx.props().clone(),
            render: Rc::clone(&self.render),
        }))
    }
}

struct RecordingInstance {
    name: String,
    recorder: Recorder,
    props: VNode,
    render: Rc<StatefulRenderFn>,
}

impl RecordingInstance {
    fn record(&self, event: &str) {
        self.recorder.record(format!("{}:{event}", self.name));
    }
}

impl ComponentInstance for RecordingInstance {
    fn set_props(&mut self, props: &VNode) {
        self.props = props.clone();
    }

    fn render(&mut self) -> Result<VNode, ComponentError> {
        self.record("render");
        (self.render)(&self.props)
    }

    fn mounted(&mut self) -> Result<(), ComponentError> {
        self.record("mounted");
        Ok(())
    }

    fn updated(&mut self) -> Result<(), ComponentError> {
        self.record("updated");
        Ok(())
    }

    fn activated(&mut self) -> Result<(), ComponentError> {
        self.record("activated");
        Ok(())
    }

    fn deactivated(&mut self) -> Result<(), ComponentError> {
        self.record("deactivated");
        Ok(())
    }

    fn teardown(&mut self) {
        self.record("teardown");
    }
}

pub fn el(tag: &str) -> VNode {
    VNode::element(tag)
}

pub fn text(value: &str) -> VNode {
    VNode::text(value)
}

/// `<li>` items keyed by their own label, each holding the label as text.
pub fn keyed_items(keys: &[&str]) -> Vec<VNode> {
    keys.iter()
        .map(|key| VNode::element("li").key_of(*key).child(VNode::text(*key)))
        .collect()
}

/// `<ul>` with keyed `<li>` children.
pub fn keyed_list(keys: &[&str]) -> VNode {
    VNode::element("ul").with_children(Children::keyed(keyed_items(keys)))
}

/// `<ul>` with positional `<li>` children.
pub fn unkeyed_list(labels: &[&str]) -> VNode {
    let items = labels
        .iter()
        .map(|label| VNode::element("li").child(VNode::text(*label)));
    VNode::element("ul").with_children(Children::list(items))
}

/// Markup of a `<ul>` holding `<li>` items with the given labels.
pub fn list_html(labels: &[&str]) -> String {
    let items: String = labels.iter().map(|label| format!("<li>{label}</li>")).collect();
    format!("<ul>{items}</ul>")
}
