use arbor_core::{Children, HostId, Platform, PlatformOp, RendererOptions, VNode};
use arbor_testing::{keyed_list, list_html, unkeyed_list, TestRenderer};

/// Label and handle of every `<li>` in the rendered `<ul>`, in order.
fn items(test: &TestRenderer) -> Vec<(String, HostId)> {
    let platform = test.platform();
    let ul = test.root_children()[0];
    platform
        .children(ul)
        .iter()
        .map(|li| {
            let label = platform
                .children(*li)
                .first()
                .and_then(|text| platform.text(*text))
                .unwrap_or_default()
                .to_string();
            (label, *li)
        })
        .collect()
}

fn handle_of(items: &[(String, HostId)], label: &str) -> HostId {
    items
        .iter()
        .find(|(item, _)| item == label)
        .map(|(_, host)| *host)
        .unwrap_or_else(|| panic!("no item {label}"))
}

fn moves_for(from: &[&str], to: &[&str]) -> usize {
    let mut test = TestRenderer::new();
    test.render(keyed_list(from)).expect("mount");
    test.take_ops();
    test.render(keyed_list(to)).expect("patch");
    assert_eq!(test.html(), list_html(to));
    test.platform().move_count()
}

#[test]
fn rotate_right_moves_one_node() {
    let mut test = TestRenderer::new();
    test.render(keyed_list(&["a", "b", "c", "d"])).expect("mount");
    let before = items(&test);
    test.take_ops();

    test.render(keyed_list(&["d", "a", "b", "c"])).expect("patch");

    let ops = test.take_ops();
    let moves: Vec<&PlatformOp> = ops
        .iter()
        .filter(|op| matches!(op, PlatformOp::Insert { moved: true, .. }))
        .collect();
    assert_eq!(moves.len(), 1);
    assert!(matches!(
        moves[0],
        PlatformOp::Insert { child, before: Some(anchor), .. }
            if *child == handle_of(&before, "d") && *anchor == handle_of(&before, "a")
    ));
    assert!(!ops.iter().any(|op| matches!(
        op,
        PlatformOp::CreateElement { .. } | PlatformOp::CreateText { .. } | PlatformOp::Remove { .. }
    )));
    assert_eq!(test.html(), list_html(&["d", "a", "b", "c"]));
}

#[test]
fn moves_equal_matched_minus_stable_run() {
    // reverse: 5 matched, longest stable run 1
    assert_eq!(moves_for(&["a", "b", "c", "d", "e"], &["e", "d", "c", "b", "a"]), 4);
    // rotate left
    assert_eq!(moves_for(&["a", "b", "c", "d"], &["b", "c", "d", "a"]), 1);
    // shuffle: sources [3, 1, 6, 2, 5, 4], stable run of 3
    assert_eq!(
        moves_for(&["a", "b", "c", "d", "e", "f"], &["c", "a", "f", "b", "e", "d"]),
        3
    );
    // swap ends around a stable middle
    assert_eq!(moves_for(&["a", "b", "c", "d", "e"], &["e", "b", "c", "d", "a"]), 2);
}

#[test]
fn common_keys_keep_their_handles() {
    let mut test = TestRenderer::new();
    test.render(keyed_list(&["a", "b", "c", "d", "e"])).expect("mount");
    let before = items(&test);

    test.render(keyed_list(&["e", "b", "x", "a", "d"])).expect("patch");

    let after = items(&test);
    assert_eq!(test.html(), list_html(&["e", "b", "x", "a", "d"]));
    for key in ["a", "b", "d", "e"] {
        assert_eq!(handle_of(&before, key), handle_of(&after, key), "handle of {key}");
    }
    let c = handle_of(&before, "c");
    assert_eq!(test.platform().parent_of(c), None);
}

#[test]
fn growing_and_truncating_around_a_stable_middle_never_moves() {
    let mut test = TestRenderer::new();
    test.render(keyed_list(&["b", "c"])).expect("mount");
    test.take_ops();

    test.render(keyed_list(&["a", "b", "c", "d"])).expect("grow");
    assert_eq!(test.html(), list_html(&["a", "b", "c", "d"]));
    assert_eq!(test.platform().move_count(), 0);
    assert_eq!(test.renderer().last_stats().mounted, 4);
    test.take_ops();

    test.render(keyed_list(&["b", "c"])).expect("truncate");
    assert_eq!(test.html(), list_html(&["b", "c"]));
    let removes = test
        .take_ops()
        .into_iter()
        .filter(|op| matches!(op, PlatformOp::Remove { .. }))
        .count();
    assert_eq!(removes, 2);
}

#[test]
fn emptying_a_list_clears_the_parent_in_one_operation() {
    let mut test = TestRenderer::new();
    test.render(keyed_list(&["a", "b"])).expect("mount");
    let ul = test.root_children()[0];
    test.take_ops();

    test.render(keyed_list(&[])).expect("clear");

    assert_eq!(test.take_ops(), vec![PlatformOp::Clear { parent: ul }]);
    assert_eq!(test.html(), "<ul></ul>");
    assert_eq!(test.renderer().last_stats().removed, 4);
}

#[test]
fn disjoint_lists_replace_the_whole_window() {
    let mut test = TestRenderer::new();
    test.render(keyed_list(&["a", "b", "c"])).expect("mount");
    let ul = test.root_children()[0];
    test.take_ops();

    test.render(keyed_list(&["x", "y"])).expect("replace all");

    let ops = test.take_ops();
    assert!(ops.contains(&PlatformOp::Clear { parent: ul }));
    assert!(!ops.iter().any(|op| matches!(op, PlatformOp::Remove { .. })));
    assert_eq!(test.html(), list_html(&["x", "y"]));
}

#[test]
fn large_windows_use_the_key_table() {
    let keys: Vec<String> = (0..40).map(|index| format!("k{index}")).collect();
    let from: Vec<&str> = keys.iter().map(String::as_str).collect();
    let mut to = from.clone();
    to.rotate_left(1);
    to.swap(10, 20);

    let mut test = TestRenderer::new();
    test.render(keyed_list(&from)).expect("mount");
    let before = items(&test);
    test.take_ops();

    test.render(keyed_list(&to)).expect("patch");

    assert_eq!(test.html(), list_html(&to));
    let after = items(&test);
    for key in &from {
        assert_eq!(handle_of(&before, key), handle_of(&after, key));
    }
    // the rotated head plus the two swapped entries
    assert_eq!(test.platform().move_count(), 3);
}

/// Duplicate keys: the last next-side occurrence claims the previous node,
/// the earlier one is mounted fresh. Both lookup strategies agree.
#[test]
fn duplicate_keys_resolve_to_the_last_occurrence() {
    let prev = |label: &str| VNode::element("li").key_of(label).child(VNode::text(label));
    let list = |nodes: Vec<VNode>| VNode::element("ul").with_children(Children::keyed(nodes));
    let next = || {
        list(vec![
            VNode::element("li").key_of("a").child(VNode::text("a1")),
            prev("c"),
            prev("d"),
            prev("b"),
            VNode::element("li").key_of("a").child(VNode::text("a2")),
            prev("e"),
        ])
    };

    for threshold in [0, 100] {
        let mut test = TestRenderer::with_options(
            RendererOptions::default()
                .dev_mode(true)
                .linear_scan_threshold(threshold),
        );
        test.render(list(vec![prev("b"), prev("a"), prev("c"), prev("d")]))
            .expect("mount");
        let before = items(&test);
        test.take_ops();

        test.render(next()).expect("patch");

        assert_eq!(test.html(), list_html(&["a1", "c", "d", "b", "a2", "e"]));
        let after = items(&test);
        assert_eq!(after[4].1, handle_of(&before, "a"), "threshold {threshold}");
        assert_eq!(test.platform().move_count(), 2, "threshold {threshold}");
    }
}

#[test]
fn duplicate_previous_keys_release_the_extra_node() {
    let node = |key: &str, label: &str| VNode::element("li").key_of(key).child(VNode::text(label));
    let list = |nodes: Vec<VNode>| VNode::element("ul").with_children(Children::keyed(nodes));

    let mut test = TestRenderer::new();
    test.render(list(vec![node("x", "x"), node("a", "a1"), node("a", "a2"), node("y", "y")]))
        .expect("mount");
    let before = items(&test);

    test.render(list(vec![node("x", "x"), node("a", "a"), node("y", "y")]))
        .expect("patch");

    assert_eq!(test.html(), list_html(&["x", "a", "y"]));
    let after = items(&test);
    assert_eq!(after[1].1, handle_of(&before, "a1"));
    assert_eq!(test.platform().parent_of(handle_of(&before, "a2")), None);
}

#[test]
fn unkeyed_lists_patch_by_position() {
    let mut test = TestRenderer::new();
    test.render(unkeyed_list(&["a", "b", "c"])).expect("mount");
    let before = items(&test);
    test.take_ops();

    test.render(unkeyed_list(&["c", "b"])).expect("shrink");

    assert_eq!(test.html(), list_html(&["c", "b"]));
    let after = items(&test);
    assert_eq!(after[0].1, before[0].1);
    assert_eq!(after[1].1, before[1].1);
    assert_eq!(test.platform().move_count(), 0);

    test.render(unkeyed_list(&["c", "b", "z", "w"])).expect("grow");
    assert_eq!(test.html(), list_html(&["c", "b", "z", "w"]));
}

#[test]
fn keyed_to_unkeyed_falls_back_to_positions() {
    let mut test = TestRenderer::new();
    test.render(keyed_list(&["a", "b"])).expect("mount");
    let before = items(&test);

    test.render(unkeyed_list(&["b", "a"])).expect("patch");

    // positional diff: same tags are patched in place whatever their keys
    assert_eq!(test.html(), list_html(&["b", "a"]));
    let after = items(&test);
    assert_eq!(after[0].1, before[0].1);
    assert_eq!(after[1].1, before[1].1);
    assert_eq!(test.renderer().last_stats().replaced, 0);
}

#[test]
fn single_child_key_change_patches_in_place() {
    let mut test = TestRenderer::new();
    let tree = |key: u64, label: &str| {
        VNode::element("div").child(VNode::element("span").key(key).child(VNode::text(label)))
    };
    test.render(tree(1, "one")).expect("mount");
    let div = test.root_children()[0];
    let span = test.platform().children(div)[0];

    test.render(tree(2, "two")).expect("patch");

    assert_eq!(test.platform().children(div), &[span]);
    assert_eq!(test.html(), "<div><span>two</span></div>");
    let stats = test.renderer().last_stats();
    assert_eq!(stats.replaced, 0);
    assert_eq!(stats.mounted, 0);
}

#[test]
fn keyed_nodes_in_a_positional_list_are_patched_by_index() {
    let list = |keys: [u64; 2]| {
        VNode::element("ul").with_children(Children::list(
            keys.iter()
                .map(|key| VNode::element("li").key(*key).child(VNode::text(key.to_string()))),
        ))
    };
    let mut test = TestRenderer::new();
    test.render(list([1, 2])).expect("mount");
    let ul = test.root_children()[0];
    let before = test.platform().children(ul).to_vec();

    test.render(list([3, 4])).expect("patch");

    assert_eq!(test.platform().children(ul), before.as_slice());
    assert_eq!(test.html(), list_html(&["3", "4"]));
    assert_eq!(test.platform().move_count(), 0);
}

/// In a keyed window an unkeyed previous node only pairs with an unkeyed
/// next node, never with a keyed one of the same tag.
#[test]
fn unkeyed_entries_in_keyed_lists_do_not_claim_keyed_slots() {
    let list = |nodes: Vec<VNode>| VNode::element("ul").with_children(Children::keyed(nodes));
    let li = |label: &str| VNode::element("li").child(VNode::text(label));
    let mut test = TestRenderer::new();
    test.render(list(vec![li("loose"), li("x").key_of("x")])).expect("mount");
    let before = items(&test);

    test.render(list(vec![li("y").key_of("y"), li("x").key_of("x"), li("loose")]))
        .expect("patch");

    let after = items(&test);
    assert_eq!(test.html(), list_html(&["y", "x", "loose"]));
    assert_eq!(handle_of(&after, "loose"), handle_of(&before, "loose"));
    assert_eq!(handle_of(&after, "x"), handle_of(&before, "x"));
}

#[test]
fn shape_changes_remove_then_mount() {
    let mut test = TestRenderer::new();
    test.render(keyed_list(&["a", "b"])).expect("mount");

    test.render(VNode::element("ul").child(VNode::text("only"))).expect("to single");
    assert_eq!(test.html(), "<ul>only</ul>");

    test.render(keyed_list(&["c"])).expect("to list");
    assert_eq!(test.html(), list_html(&["c"]));

    test.render(VNode::element("ul")).expect("to none");
    assert_eq!(test.html(), "<ul></ul>");
}
