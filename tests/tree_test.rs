//! Tests for structural mutations and the inline create session

use rstest::{fixture, rstest};

use ranktree::domain::{
    add_inline_create_placeholder, begin_inline_create, cancel_inline_create, confirm_inline_create,
    indent_node, move_node, outdent_node, reduce, reparent_node, BeginInlineCreate, ConfirmInlineCreate,
    Direction, DomainError, InlinePlaceholder, Node, NodeStatus, RankAllocator, TreeAction, TreeState,
};
use ranktree::util::testing;

fn node(id: &str, parent: Option<&str>, rank: f64) -> Node {
    Node::new(id, parent, format!("node {}", id), rank)
}

#[fixture]
fn ranks() -> RankAllocator {
    testing::init_test_setup();
    RankAllocator::default()
}

#[fixture]
fn three_roots() -> TreeState {
    TreeState::new(vec![
        node("1", None, 100.0),
        node("2", None, 200.0),
        node("3", None, 300.0),
    ])
}

fn order(state: &TreeState, parent: Option<&str>) -> Vec<String> {
    state.children_of(parent).iter().map(|n| n.id.clone()).collect()
}

// ============================================================
// Indent / Outdent
// ============================================================

#[rstest]
fn given_three_roots_when_indent_second_then_parent_is_first(three_roots: TreeState, ranks: RankAllocator) {
    let next = indent_node(&three_roots, "2", &ranks).unwrap();

    assert_eq!(next.node("2").unwrap().parent_id.as_deref(), Some("1"));
    assert_eq!(order(&next, None), vec!["1", "3"]);
    assert!(next.is_expanded("1"), "new parent should be expanded");
    assert_eq!(next.tree.len(), 2);
    assert_eq!(next.tree[0].children[0].id(), "2");
}

#[rstest]
fn given_first_sibling_when_indent_then_rejected(three_roots: TreeState, ranks: RankAllocator) {
    let err = indent_node(&three_roots, "1", &ranks).unwrap_err();
    assert_eq!(err, DomainError::AlreadyFirst("1".into()));
}

#[rstest]
fn given_previous_sibling_with_children_when_indent_then_appended_last(ranks: RankAllocator) {
    let state = TreeState::new(vec![
        node("1", None, 100.0),
        node("1.1", Some("1"), 100.0),
        node("1.2", Some("1"), 200.0),
        node("2", None, 200.0),
    ]);
    let next = indent_node(&state, "2", &ranks).unwrap();
    assert_eq!(order(&next, Some("1")), vec!["1.1", "1.2", "2"]);
    assert_eq!(next.node("2").unwrap().rank, 300.0);
}

#[rstest]
fn given_childless_previous_sibling_when_indent_then_base_rank(three_roots: TreeState, ranks: RankAllocator) {
    let next = indent_node(&three_roots, "3", &ranks).unwrap();
    assert_eq!(next.node("3").unwrap().rank, ranks.base_rank);
}

#[rstest]
fn given_child_when_outdent_then_becomes_root(ranks: RankAllocator) {
    let state = TreeState::new(vec![node("1", None, 100.0), node("2", Some("1"), 200.0)]);
    let next = outdent_node(&state, "2", &ranks).unwrap();

    assert_eq!(next.node("2").unwrap().parent_id, None);
    assert_eq!(order(&next, None), vec!["1", "2"]);
}

#[rstest]
fn given_parent_with_following_sibling_when_outdent_then_placed_directly_after_parent(
    ranks: RankAllocator,
) {
    let state = TreeState::new(vec![
        node("1", None, 100.0),
        node("1.1", Some("1"), 100.0),
        node("2", None, 200.0),
    ]);
    let next = outdent_node(&state, "1.1", &ranks).unwrap();
    assert_eq!(order(&next, None), vec!["1", "1.1", "2"]);
    assert_eq!(next.node("1.1").unwrap().rank, 150.0);
}

#[rstest]
fn given_root_when_outdent_then_rejected(three_roots: TreeState, ranks: RankAllocator) {
    let err = outdent_node(&three_roots, "2", &ranks).unwrap_err();
    assert_eq!(err, DomainError::AlreadyRoot("2".into()));
}

#[rstest]
#[case("2")]
#[case("3")]
fn given_node_when_indent_then_outdent_then_parent_restored(
    three_roots: TreeState,
    ranks: RankAllocator,
    #[case] id: &str,
) {
    let original = three_roots.node(id).unwrap().parent_id.clone();
    let indented = indent_node(&three_roots, id, &ranks).unwrap();
    let restored = outdent_node(&indented, id, &ranks).unwrap();
    assert_eq!(restored.node(id).unwrap().parent_id, original);
}

// ============================================================
// Move / Reorder
// ============================================================

#[rstest]
fn given_three_roots_when_move_first_down_then_no_longer_first(three_roots: TreeState, ranks: RankAllocator) {
    let next = move_node(&three_roots, "1", Direction::Down, &ranks).unwrap();
    assert_eq!(order(&next, None), vec!["2", "1", "3"]);
    assert_eq!(next.node("1").unwrap().rank, 250.0);
    assert_eq!(next.node("2").unwrap().rank, 200.0, "neighbours keep their ranks");
}

#[rstest]
fn given_last_sibling_when_move_up_twice_then_first(three_roots: TreeState, ranks: RankAllocator) {
    let once = move_node(&three_roots, "3", Direction::Up, &ranks).unwrap();
    let twice = move_node(&once, "3", Direction::Up, &ranks).unwrap();
    assert_eq!(order(&twice, None), vec!["3", "1", "2"]);
    assert_eq!(twice.node("3").unwrap().rank, 0.0);
}

#[rstest]
#[case("1", Direction::Up)]
#[case("3", Direction::Down)]
fn given_boundary_when_move_then_rejected_and_unchanged(
    three_roots: TreeState,
    ranks: RankAllocator,
    #[case] id: &str,
    #[case] direction: Direction,
) {
    let err = move_node(&three_roots, id, direction, &ranks).unwrap_err();
    assert!(matches!(err, DomainError::AtBoundary { .. }));

    let via_reducer = reduce(
        &three_roots,
        &TreeAction::Move {
            id: id.to_string(),
            direction,
        },
        &ranks,
    );
    assert_eq!(via_reducer, three_roots);
}

#[rstest]
fn given_sixty_insertions_between_neighbours_when_moving_then_order_stays_strict(ranks: RankAllocator) {
    // Repeatedly move the last node up into the slot between the first two.
    let mut nodes = vec![node("a", None, 100.0), node("b", None, 200.0)];
    for i in 0..60 {
        nodes.push(node(&format!("n{}", i), None, 1000.0 + i as f64));
    }
    let mut state = TreeState::new(nodes);
    for i in 0..60 {
        let id = format!("n{}", i);
        while order(&state, None).iter().position(|x| *x == id) != Some(1) {
            state = move_node(&state, &id, Direction::Up, &ranks).unwrap();
        }
        let ranks_in_order: Vec<f64> = state.children_of(None).iter().map(|n| n.rank).collect();
        assert!(
            ranks_in_order.windows(2).all(|w| w[0] < w[1]),
            "ranks must stay strictly increasing: {:?}",
            ranks_in_order
        );
    }
    assert_eq!(order(&state, None)[0], "a");
    assert_eq!(order(&state, None).last().unwrap(), "b");
}

// ============================================================
// Reparent / cycle safety
// ============================================================

#[rstest]
fn given_descendant_as_new_parent_when_reparent_then_cycle_rejected(ranks: RankAllocator) {
    let state = TreeState::new(vec![
        node("1", None, 100.0),
        node("1.1", Some("1"), 100.0),
        node("1.1.1", Some("1.1"), 100.0),
    ]);
    let err = reparent_node(&state, "1", Some("1.1.1"), &ranks).unwrap_err();
    assert!(matches!(err, DomainError::CycleDetected { .. }));

    let self_err = reparent_node(&state, "1", Some("1"), &ranks).unwrap_err();
    assert!(matches!(self_err, DomainError::CycleDetected { .. }));
}

#[rstest]
fn given_other_branch_when_reparent_then_appended(ranks: RankAllocator) {
    let state = TreeState::new(vec![
        node("1", None, 100.0),
        node("1.1", Some("1"), 100.0),
        node("2", None, 200.0),
        node("2.1", Some("2"), 100.0),
    ]);
    let next = reparent_node(&state, "1.1", Some("2"), &ranks).unwrap();
    assert_eq!(order(&next, Some("2")), vec!["2.1", "1.1"]);
    assert!(next.children_of(Some("1")).is_empty());
}

// ============================================================
// Inline creation
// ============================================================

fn begin(state: &TreeState, temp_id: &str, source: Option<&str>) -> TreeState {
    begin_inline_create(
        state,
        &BeginInlineCreate {
            temp_id: temp_id.into(),
            source_id: source.map(str::to_string),
        },
    )
    .unwrap()
}

fn placeholder(after: Option<&str>, parent: Option<&str>) -> InlinePlaceholder {
    InlinePlaceholder {
        after_id: after.map(str::to_string),
        node: Node::new("ignored", parent, "draft", 0.0).with_field("color", "red"),
    }
}

#[rstest]
fn given_placeholder_when_confirm_then_selection_follows_permanent_id(ranks: RankAllocator) {
    let state = TreeState::new(vec![node("1", None, 100.0)]);
    let opened = begin(&state, "temp-one", Some("1"));
    assert!(opened.node("temp-one").is_none(), "begin adds no node");

    let with_placeholder =
        add_inline_create_placeholder(&opened, &placeholder(None, Some("1")), &ranks).unwrap();
    assert_eq!(with_placeholder.selected_id.as_deref(), Some("temp-one"));
    let pending = with_placeholder.node("temp-one").unwrap();
    assert_eq!(pending.status, NodeStatus::Pending);
    assert_eq!(pending.parent_id.as_deref(), Some("1"));

    let confirmed = confirm_inline_create(
        &with_placeholder,
        &ConfirmInlineCreate {
            temp_id: "temp-one".into(),
            node_id: "1.1".into(),
        },
    )
    .unwrap();
    assert_eq!(confirmed.selected_id.as_deref(), Some("1.1"));
    assert_eq!(confirmed.inline_create, None);

    let promoted = confirmed.node("1.1").unwrap();
    assert_eq!(promoted.status, NodeStatus::Confirmed);
    assert_eq!(promoted.parent_id, pending.parent_id);
    assert_eq!(promoted.rank, pending.rank);
    assert_eq!(promoted.extra.get("color").and_then(|v| v.as_str()), Some("red"));
    assert!(confirmed.node("temp-one").is_none());
}

#[rstest]
fn given_after_id_with_next_sibling_when_add_placeholder_then_between(three_roots: TreeState, ranks: RankAllocator) {
    let opened = begin(&three_roots, "temp", Some("1"));
    let next = add_inline_create_placeholder(&opened, &placeholder(Some("1"), None), &ranks).unwrap();
    assert_eq!(order(&next, None), vec!["1", "temp", "2", "3"]);
    assert_eq!(next.inline_create.unwrap().after_id.as_deref(), Some("1"));
}

#[rstest]
fn given_open_session_when_begin_again_then_rejected(three_roots: TreeState) {
    let opened = begin(&three_roots, "temp-a", None);
    let err = begin_inline_create(
        &opened,
        &BeginInlineCreate {
            temp_id: "temp-b".into(),
            source_id: None,
        },
    )
    .unwrap_err();
    assert_eq!(err, DomainError::SessionAlreadyOpen("temp-a".into()));
}

#[rstest]
fn given_no_session_when_placeholder_or_confirm_then_rejected(three_roots: TreeState, ranks: RankAllocator) {
    assert_eq!(
        add_inline_create_placeholder(&three_roots, &placeholder(None, None), &ranks).unwrap_err(),
        DomainError::NoOpenSession
    );
    let confirm = ConfirmInlineCreate {
        temp_id: "temp".into(),
        node_id: "9".into(),
    };
    assert_eq!(
        confirm_inline_create(&three_roots, &confirm).unwrap_err(),
        DomainError::NoOpenSession
    );
}

#[rstest]
fn given_other_temp_id_when_confirm_then_mismatch(three_roots: TreeState) {
    let opened = begin(&three_roots, "temp-a", None);
    let err = confirm_inline_create(
        &opened,
        &ConfirmInlineCreate {
            temp_id: "temp-b".into(),
            node_id: "9".into(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, DomainError::SessionMismatch { .. }));
}

#[rstest]
fn given_placeholder_when_cancel_then_removed_and_selection_restored(three_roots: TreeState, ranks: RankAllocator) {
    let opened = begin(&three_roots, "temp", Some("2"));
    let added = add_inline_create_placeholder(&opened, &placeholder(Some("2"), None), &ranks).unwrap();
    assert_eq!(added.nodes.len(), 4);

    let cancelled = cancel_inline_create(&added).unwrap();
    assert_eq!(cancelled.nodes, three_roots.nodes);
    assert_eq!(cancelled.inline_create, None);
    assert_eq!(cancelled.selected_id.as_deref(), Some("2"));
    assert_eq!(cancel_inline_create(&cancelled).unwrap_err(), DomainError::NoOpenSession);
}

#[rstest]
fn given_refresh_already_loaded_node_when_confirm_then_placeholder_dropped(
    three_roots: TreeState,
    ranks: RankAllocator,
) {
    let opened = begin(&three_roots, "temp", None);
    let added = add_inline_create_placeholder(&opened, &placeholder(Some("3"), None), &ranks).unwrap();
    let mut refreshed_nodes = added.nodes.clone();
    refreshed_nodes.push(node("4", None, 400.0));
    let refreshed = reduce(&added, &TreeAction::SetNodes { nodes: refreshed_nodes }, &ranks);

    let confirmed = confirm_inline_create(
        &refreshed,
        &ConfirmInlineCreate {
            temp_id: "temp".into(),
            node_id: "4".into(),
        },
    )
    .unwrap();
    assert_eq!(confirmed.nodes.iter().filter(|n| n.id == "4").count(), 1);
    assert!(confirmed.node("temp").is_none());
    assert_eq!(confirmed.selected_id.as_deref(), Some("4"));
}

// ============================================================
// Reducer cursors
// ============================================================

#[rstest]
fn given_set_nodes_when_reduce_then_cursors_preserved(three_roots: TreeState, ranks: RankAllocator) {
    let selected = reduce(&three_roots, &TreeAction::Select { id: Some("3".into()) }, &ranks);
    let expanded = reduce(&selected, &TreeAction::Expand { id: "3".into() }, &ranks);
    let replaced = reduce(
        &expanded,
        &TreeAction::SetNodes {
            nodes: vec![node("9", None, 1.0)],
        },
        &ranks,
    );
    assert_eq!(replaced.selected_id.as_deref(), Some("3"), "stale selection is kept");
    assert!(replaced.is_expanded("3"));
    assert_eq!(replaced.tree.len(), 1);
    assert_eq!(replaced.selected(), None);
}

#[rstest]
fn given_unloaded_id_when_select_then_allowed(three_roots: TreeState, ranks: RankAllocator) {
    let next = reduce(&three_roots, &TreeAction::Select { id: Some("later".into()) }, &ranks);
    assert_eq!(next.selected_id.as_deref(), Some("later"));
}

// ============================================================
// Inline creation: id safety
// ============================================================

#[rstest]
fn given_temp_id_of_existing_node_when_begin_then_rejected(ranks: RankAllocator) {
    let state = TreeState::new(vec![node("1", None, 100.0), node("1.1", Some("1"), 100.0)]);
    let err = begin_inline_create(
        &state,
        &BeginInlineCreate {
            temp_id: "1".into(),
            source_id: None,
        },
    )
    .unwrap_err();
    assert_eq!(err, DomainError::DuplicateId("1".into()));

    // Even via the reducer the confirmed node and its child survive a full session.
    let mut next = reduce(
        &state,
        &TreeAction::BeginInlineCreate(BeginInlineCreate {
            temp_id: "1".into(),
            source_id: None,
        }),
        &ranks,
    );
    next = reduce(&next, &TreeAction::AddInlineCreatePlaceholder(placeholder(None, None)), &ranks);
    next = reduce(&next, &TreeAction::CancelInlineCreate, &ranks);
    assert_eq!(next, state);
    assert_eq!(next.node("1").unwrap().status, NodeStatus::Confirmed);
    assert_eq!(next.node("1.1").unwrap().parent_id.as_deref(), Some("1"));
}

#[rstest]
fn given_confirmed_node_loaded_under_temp_id_when_add_placeholder_then_rejected(ranks: RankAllocator) {
    let opened = begin(&TreeState::new(vec![node("1", None, 100.0)]), "temp", None);
    let refreshed = reduce(
        &opened,
        &TreeAction::SetNodes {
            nodes: vec![node("1", None, 100.0), node("temp", None, 200.0)],
        },
        &ranks,
    );

    let err = add_inline_create_placeholder(&refreshed, &placeholder(None, None), &ranks).unwrap_err();
    assert_eq!(err, DomainError::DuplicateId("temp".into()));

    let cancelled = cancel_inline_create(&refreshed).unwrap();
    assert!(cancelled.node("temp").is_some(), "confirmed node must survive cancel");
}

#[rstest]
fn given_placeholder_when_replaced_under_itself_then_cycle_rejected(ranks: RankAllocator) {
    let opened = begin(&TreeState::new(vec![node("1", None, 100.0)]), "t", None);
    let first = add_inline_create_placeholder(&opened, &placeholder(None, None), &ranks).unwrap();

    let err = add_inline_create_placeholder(&first, &placeholder(None, Some("t")), &ranks).unwrap_err();
    assert!(matches!(err, DomainError::CycleDetected { .. }));
    assert_eq!(first.node("t").unwrap().parent_id, None);
}

#[rstest]
fn given_placeholder_with_child_when_replaced_under_child_then_cycle_rejected(ranks: RankAllocator) {
    let opened = begin(&TreeState::new(vec![node("1", None, 100.0)]), "t", None);
    let first = add_inline_create_placeholder(&opened, &placeholder(Some("1"), None), &ranks).unwrap();
    let reparented = reparent_node(&first, "1", Some("t"), &ranks).unwrap();

    let via_parent = add_inline_create_placeholder(&reparented, &placeholder(None, Some("1")), &ranks);
    assert!(matches!(via_parent, Err(DomainError::CycleDetected { .. })));
    let via_anchor = add_inline_create_placeholder(&reparented, &placeholder(Some("1"), None), &ranks);
    assert!(matches!(via_anchor, Err(DomainError::CycleDetected { .. })));
}

#[rstest]
fn given_placeholder_when_anchored_on_itself_then_rejected(three_roots: TreeState, ranks: RankAllocator) {
    let opened = begin(&three_roots, "t", None);
    let first = add_inline_create_placeholder(&opened, &placeholder(Some("2"), None), &ranks).unwrap();

    let err = add_inline_create_placeholder(&first, &placeholder(Some("t"), None), &ranks).unwrap_err();
    assert_eq!(err, DomainError::InvalidAnchor("t".into()));
    assert_eq!(order(&first, None), vec!["1", "2", "t", "3"]);
}

#[rstest]
fn given_loaded_node_under_placeholder_when_confirmed_as_that_node_then_no_self_parent(ranks: RankAllocator) {
    let opened = begin(&TreeState::new(vec![node("1", None, 100.0), node("2", None, 200.0)]), "t", None);
    let first = add_inline_create_placeholder(&opened, &placeholder(Some("1"), None), &ranks).unwrap();
    let reparented = reparent_node(&first, "2", Some("t"), &ranks).unwrap();

    let confirmed = confirm_inline_create(
        &reparented,
        &ConfirmInlineCreate {
            temp_id: "t".into(),
            node_id: "2".into(),
        },
    )
    .unwrap();

    assert!(confirmed.node("t").is_none());
    assert_eq!(confirmed.node("2").unwrap().parent_id, None);
    let mut roots = order(&confirmed, None);
    roots.sort();
    assert_eq!(roots, vec!["1", "2"]);
}
