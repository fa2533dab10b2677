//! Sibling-level diffing.

use crate::arena::MountedChildren;
use crate::collections::map::HashSet;
use crate::collections::map_with_capacity;
use crate::error::NodeError;
use crate::lis::longest_increasing_subsequence;
use crate::platform::Platform;
use crate::vnode::{Children, VNode};
use crate::{HostId, Key, MountId};

use super::{same_type, Renderer, Slot};

impl<P: Platform> Renderer<P> {
    pub(crate) fn mount_children(&mut self, children: &Children, slot: Slot) -> Result<MountedChildren, NodeError> {
        match children {
            Children::None => Ok(MountedChildren::None),
            Children::Single(node) => Ok(MountedChildren::Single(self.mount(node, slot)?)),
            Children::List(nodes) | Children::Keyed(nodes) => {
                if children.is_keyed() {
                    self.check_keys(nodes);
                }
                let mut ids = Vec::with_capacity(nodes.len());
                for node in nodes {
                    ids.push(self.mount(node, slot)?);
                }
                Ok(MountedChildren::List(ids))
            }
        }
    }

    /// Brings the mounted children `prev` in line with `next`.
    ///
    /// `clearable` says the children are the whole content of
    /// `slot.container`, so a full removal may clear it in one operation.
    pub(crate) fn patch_children(
        &mut self,
        prev: MountedChildren,
        prev_keyed: bool,
        next: &Children,
        slot: Slot,
        clearable: bool,
    ) -> Result<MountedChildren, NodeError> {
        match (prev, next) {
            (MountedChildren::None, next) => self.mount_children(next, slot),
            (MountedChildren::Single(id), Children::None) => {
                self.teardown(id, true, false)?;
                Ok(MountedChildren::None)
            }
            (MountedChildren::Single(id), Children::Single(node)) => {
                Ok(MountedChildren::Single(self.patch(id, node, slot)?))
            }
            (MountedChildren::Single(id), Children::List(_) | Children::Keyed(_)) => {
                self.teardown(id, true, false)?;
                self.mount_children(next, slot)
            }
            (MountedChildren::List(ids), Children::None | Children::Single(_)) => {
                self.remove_all(&ids, slot, clearable)?;
                self.mount_children(next, slot)
            }
            (MountedChildren::List(ids), Children::Keyed(nodes)) if prev_keyed => {
                Ok(MountedChildren::List(self.patch_keyed(ids, nodes, slot, clearable)?))
            }
            (MountedChildren::List(ids), Children::List(nodes) | Children::Keyed(nodes)) => {
                Ok(MountedChildren::List(self.patch_unkeyed(ids, nodes, slot, clearable)?))
            }
        }
    }

    fn remove_all(&mut self, ids: &[MountId], slot: Slot, clearable: bool) -> Result<(), NodeError> {
        if clearable && !ids.is_empty() {
            log::debug!("clearing {} children of {}", ids.len(), slot.container);
            for id in ids {
                self.teardown(*id, false, false)?;
            }
            self.platform.clear_content(slot.container);
        } else {
            for id in ids {
                self.teardown(*id, true, false)?;
            }
        }
        Ok(())
    }

    fn patch_unkeyed(
        &mut self,
        prev: Vec<MountId>,
        next: &[VNode],
        slot: Slot,
        clearable: bool,
    ) -> Result<Vec<MountId>, NodeError> {
        let common = prev.len().min(next.len());
        let mut result = Vec::with_capacity(next.len());
        for (id, node) in prev.iter().zip(next) {
            result.push(self.patch(*id, node, slot)?);
        }
        if prev.len() > next.len() {
            self.remove_all(&prev[common..], slot, clearable && common == 0)?;
        } else {
            for node in &next[common..] {
                result.push(self.mount(node, slot)?);
            }
        }
        Ok(result)
    }

    fn key_of(&self, id: MountId) -> Result<Option<Key>, NodeError> {
        Ok(self.arena.get(id)?.vnode.key_value())
    }

    /// Insertion point in front of `result[position]`, or the list's own
    /// anchor when that slot is past the end.
    fn anchor_before(&self, result: &[Option<MountId>], position: usize, slot: Slot) -> Result<Option<HostId>, NodeError> {
        match result.get(position).copied().flatten() {
            Some(id) => Ok(self.first_host(id)?.or(slot.anchor)),
            None => Ok(slot.anchor),
        }
    }

    fn patch_keyed(
        &mut self,
        prev: Vec<MountId>,
        next: &[VNode],
        slot: Slot,
        clearable: bool,
    ) -> Result<Vec<MountId>, NodeError> {
        self.check_keys(next);
        let mut result: Vec<Option<MountId>> = vec![None; next.len()];

        // common prefix
        let mut start = 0;
        let mut prev_end = prev.len();
        let mut next_end = next.len();
        while start < prev_end && start < next_end && self.key_of(prev[start])? == next[start].key_value() {
            result[start] = Some(self.patch(prev[start], &next[start], slot)?);
            start += 1;
        }

        // common suffix
        while start < prev_end
            && start < next_end
            && self.key_of(prev[prev_end - 1])? == next[next_end - 1].key_value()
        {
            result[next_end - 1] = Some(self.patch(prev[prev_end - 1], &next[next_end - 1], slot)?);
            prev_end -= 1;
            next_end -= 1;
        }

        if start >= prev_end {
            let anchor = self.anchor_before(&result, next_end, slot)?;
            for index in start..next_end {
                result[index] = Some(self.mount(&next[index], slot.at(anchor))?);
            }
        } else if start >= next_end {
            let whole = clearable && start == 0 && prev_end == prev.len();
            self.remove_all(&prev[start..prev_end], slot, whole)?;
        } else {
            self.patch_keyed_window(&prev, next, start, prev_end, next_end, &mut result, slot, clearable)?;
        }

        debug_assert!(result.iter().all(Option::is_some), "unfilled keyed slot");
        Ok(result.into_iter().flatten().collect())
    }

    /// Matches the unequal middle `prev[start..prev_end]` against
    /// `next[start..next_end]` and moves as few nodes as possible.
    #[allow(clippy::too_many_arguments)]
    fn patch_keyed_window(
        &mut self,
        prev: &[MountId],
        next: &[VNode],
        start: usize,
        prev_end: usize,
        next_end: usize,
        result: &mut [Option<MountId>],
        slot: Slot,
        clearable: bool,
    ) -> Result<(), NodeError> {
        let prev_window = prev_end - start;
        let window = next_end - start;

        // sources[offset] is the matched prev index + 1, or 0
        let mut sources = vec![0usize; window];
        let mut matches: Vec<Option<usize>> = Vec::with_capacity(prev_window);
        let mut matched = 0;
        let mut moved = false;
        let mut max_seen = 0;

        let linear = prev_window < 4 || prev_window + window < self.options.linear_scan_threshold;
        let table = if linear {
            None
        } else {
            let mut table = map_with_capacity::<Key, usize>(window);
            for (index, node) in next.iter().enumerate().take(next_end).skip(start) {
                if let Some(key) = node.key_value() {
                    table.insert(key, index);
                }
            }
            Some(table)
        };

        for prev_index in start..prev_end {
            if matched == window {
                matches.push(None);
                continue;
            }
            let record = self.arena.get(prev[prev_index])?;
            let found = match record.vnode.key_value() {
                Some(key) => match &table {
                    Some(table) => table.get(&key).copied(),
                    None => (start..next_end)
                        .rev()
                        .find(|index| next[*index].key_value() == Some(key)),
                },
                None => (start..next_end).find(|index| {
                    sources[index - start] == 0
                        && next[*index].key_value().is_none()
                        && same_type(&record.vnode, &next[*index])
                }),
            };
            match found.filter(|index| sources[index - start] == 0) {
                Some(index) => {
                    sources[index - start] = prev_index + 1;
                    if index >= max_seen {
                        max_seen = index;
                    } else {
                        moved = true;
                    }
                    matched += 1;
                    matches.push(Some(index));
                }
                None => matches.push(None),
            }
        }

        if matched == 0 {
            let whole = clearable && start == 0 && prev_end == prev.len();
            self.remove_all(&prev[start..prev_end], slot, whole)?;
            let anchor = self.anchor_before(result, next_end, slot)?;
            for index in start..next_end {
                result[index] = Some(self.mount(&next[index], slot.at(anchor))?);
            }
            return Ok(());
        }

        for (offset, found) in matches.into_iter().enumerate() {
            let id = prev[start + offset];
            match found {
                Some(index) => result[index] = Some(self.patch(id, &next[index], slot)?),
                None => self.teardown(id, true, false)?,
            }
        }

        let stable = if moved {
            longest_increasing_subsequence(&sources)
        } else {
            Vec::new()
        };
        let mut stable_cursor = stable.len();
        for offset in (0..window).rev() {
            let index = start + offset;
            let anchor = self.anchor_before(result, index + 1, slot)?;
            if sources[offset] == 0 {
                result[index] = Some(self.mount(&next[index], slot.at(anchor))?);
            } else if moved {
                if stable_cursor > 0 && stable[stable_cursor - 1] == offset {
                    stable_cursor -= 1;
                } else if let Some(id) = result[index] {
                    self.move_before(id, slot.container, anchor)?;
                }
            }
        }
        Ok(())
    }

    fn move_before(&mut self, id: MountId, container: HostId, anchor: Option<HostId>) -> Result<(), NodeError> {
        for host in self.collect_hosts(id)? {
            self.platform.insert(container, host, anchor);
        }
        self.stats.moved += 1;
        Ok(())
    }

    /// Development diagnostics for keyed lists. Never changes the outcome.
    fn check_keys(&self, nodes: &[VNode]) {
        if !self.options.dev_mode {
            return;
        }
        let mut seen: HashSet<Key> = HashSet::default();
        let mut missing = 0;
        for node in nodes {
            match node.key_value() {
                Some(key) => {
                    if !seen.insert(key) {
                        log::warn!("duplicate key {key:#x} among keyed children; the last occurrence wins");
                    }
                }
                None => missing += 1,
            }
        }
        if missing > 0 {
            log::warn!("{missing} of {} keyed children have no key", nodes.len());
        }
    }
}
