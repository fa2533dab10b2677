//! Component adapter boundary.
//!
//! The engine treats a component node as an opaque subtree root: it asks the
//! definition for an instance (stateful) or a render (functional), mounts the
//! returned tree, and from then on only patches that tree.

use crate::error::ComponentError;
use crate::runtime::UpdateHandle;
use crate::vnode::{Children, VNode};

/// Data handed to component code while it renders.
pub struct ComponentContext<'a> {
    props: &'a VNode,
    updater: UpdateHandle,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(props: &'a VNode, updater: UpdateHandle) -> Self {
        Self { props, updater }
    }

    /// The component's own description: attributes are props, children are slots.
    pub fn props(&self) -> &'a VNode {
        self.props
    }

    /// Handle used to request a scheduled re-render of this component.
    pub fn update_handle(&self) -> UpdateHandle {
        self.updater.clone()
    }
}

/// Definition of a component that keeps an instance across renders.
pub trait StatefulComponent {
    fn name(&self) -> &str;

    fn create_instance(
        &self,
        cx: &ComponentContext<'_>,
    ) -> Result<Box<dyn ComponentInstance>, ComponentError>;
}

/// Live instance of a [`StatefulComponent`].
pub trait ComponentInstance {
    /// Receives the latest description before an update decision is made.
    fn set_props(&mut self, _props: &VNode) {}

    fn should_update(&self, prev: &VNode, next: &VNode) -> bool {
        props_changed(prev, next)
    }

    fn render(&mut self) -> Result<VNode, ComponentError>;

    fn mounted(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    fn updated(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    fn activated(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    fn deactivated(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Releases the instance. Called exactly once.
    fn teardown(&mut self) {}
}

/// Stateless component: a render function over its description.
pub trait FunctionalComponent {
    fn name(&self) -> &str;

    fn render(&self, cx: &ComponentContext<'_>) -> Result<VNode, ComponentError>;

    fn should_update(&self, prev: &VNode, next: &VNode) -> bool {
        props_changed(prev, next)
    }
}

/// Default update check: shallow attribute comparison plus slot identity.
pub fn props_changed(prev: &VNode, next: &VNode) -> bool {
    if prev.ptr_eq(next) {
        return false;
    }
    let attrs_equal = match (prev.attrs(), next.attrs()) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(name, value)| b.get(name).is_some_and(|other| other == value))
        }
        (Some(a), None) | (None, Some(a)) => a.is_empty(),
    };
    !attrs_equal || !same_slots(prev.children(), next.children())
}

fn same_slots(prev: &Children, next: &Children) -> bool {
    let (a, b) = (prev.as_slice(), next.as_slice());
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.ptr_eq(y))
}

/// Mount lifecycle of a component node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Unmounted,
    Mounting,
    Mounted,
    Updating,
}

/// Orthogonal state of kept-alive components.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Activity {
    Active,
    Inactive,
}

pub(crate) struct ComponentSlot {
    /// `None` for functional components and while the instance is borrowed.
    pub(crate) instance: Option<Box<dyn ComponentInstance>>,
    pub(crate) state: LifecycleState,
    pub(crate) activity: Activity,
    /// Set only on the root of a cached, deactivated subtree.
    pub(crate) cached: bool,
}

impl ComponentSlot {
    pub(crate) fn new() -> Self {
        Self {
            instance: None,
            state: LifecycleState::Mounting,
            activity: Activity::Active,
            cached: false,
        }
    }

    pub(crate) fn transition(&mut self, next: LifecycleState) {
        debug_assert!(
            matches!(
                (self.state, next),
                (LifecycleState::Mounting, LifecycleState::Mounted)
                    | (LifecycleState::Mounted, LifecycleState::Updating)
                    | (LifecycleState::Updating, LifecycleState::Mounted)
                    | (_, LifecycleState::Unmounted)
            ),
            "invalid component transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_descriptions_are_unchanged() {
        let node = VNode::element("x").attr("a", 1i64);
        assert!(!props_changed(&node, &node.clone()));
    }

    #[test]
    fn attribute_changes_are_detected() {
        let prev = VNode::element("x").attr("a", 1i64);
        assert!(!props_changed(&prev, &VNode::element("x").attr("a", 1i64)));
        assert!(props_changed(&prev, &VNode::element("x").attr("a", 2i64)));
        assert!(props_changed(&prev, &VNode::element("x")));
    }

    #[test]
    fn slot_identity_drives_updates() {
        let slot = VNode::text("slot");
        let prev = VNode::element("x").child(slot.clone());
        assert!(!props_changed(&prev, &VNode::element("x").child(slot)));
        assert!(props_changed(&prev, &VNode::element("x").child(VNode::text("slot"))));
    }

    #[test]
    fn lifecycle_transitions_follow_the_state_machine() {
        let mut slot = ComponentSlot::new();
        slot.transition(LifecycleState::Mounted);
        slot.transition(LifecycleState::Updating);
        slot.transition(LifecycleState::Mounted);
        slot.transition(LifecycleState::Unmounted);
        assert_eq!(slot.state, LifecycleState::Unmounted);
    }
}
