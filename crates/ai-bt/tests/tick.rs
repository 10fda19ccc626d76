use ai_bt::{
    build_flat, Behaviour, BehaviourNode, BehaviourTree, NodeContext, NodeFactory, NodeResult,
    NodeStatus, TreeBuilder,
};
use ai_tools::{TraceLog, TRACE_LOG};

fn flat(entries: &[(&str, u32)]) -> BehaviourTree {
    let factory = NodeFactory::with_default_nodes();
    build_flat(&factory, "test", entries.iter().copied())
}

fn root_result(tree: &BehaviourTree) -> NodeResult {
    tree.root_node().unwrap().result()
}

/// Counts how often each hook fires and succeeds on the first update.
#[derive(Debug, Clone, Default)]
struct Counting {
    entered: u32,
}

impl Behaviour for Counting {
    fn on_enter(&mut self, node: &mut NodeContext<'_>) {
        self.entered += 1;
        let entered = self.entered;
        node.blackboard_mut().set("entered", entered);
        node.leaf_enter();
    }

    fn on_update(&mut self, node: &mut NodeContext<'_>, _dt: f32) {
        node.success();
    }
}

#[test]
fn immediate_success_restarts_the_root_within_one_update() {
    let mut builder = TreeBuilder::named("restart");
    builder
        .add_node(None, BehaviourNode::new("L_Counting", Counting::default()), 0)
        .unwrap();
    let mut tree = builder.finish();

    assert_eq!(tree.root_node().unwrap().status(), NodeStatus::Ready);

    tree.update(0.016);
    let root = tree.root_node().unwrap();
    assert_eq!(root.status(), NodeStatus::Ready);
    assert!(root.has_succeeded());
    assert_eq!(tree.blackboard().get::<u32>("entered"), Some(&1));

    tree.update(0.016);
    assert_eq!(tree.blackboard().get::<u32>("entered"), Some(&2));
    assert_eq!(tree.ticks(), 2);
}

#[test]
fn sequence_ticks_one_child_per_update() {
    let mut tree = flat(&[("C_Sequence", 0), ("L_Succeed", 1), ("L_Succeed", 1)]);
    let root = tree.root_id().unwrap();
    let children = tree.children_of(root).to_vec();

    tree.update(0.1);
    assert!(tree.root_node().unwrap().is_running());
    assert!(tree.node(children[0]).unwrap().is_suspended());
    assert!(tree.node(children[0]).unwrap().has_succeeded());
    assert!(tree.node(children[1]).unwrap().is_ready());

    tree.update(0.1);
    assert!(tree.root_node().unwrap().is_ready());
    assert_eq!(root_result(&tree), NodeResult::Success);
}

#[test]
fn sequence_stops_at_first_failure() {
    let mut tree = flat(&[("C_Sequence", 0), ("L_Fail", 1), ("L_Succeed", 1)]);
    let root = tree.root_id().unwrap();
    let second = tree.children_of(root)[1];

    tree.update(0.1);
    assert_eq!(root_result(&tree), NodeResult::Failure);
    assert!(tree.node(second).unwrap().is_ready());
    assert_eq!(tree.node(second).unwrap().result(), NodeResult::InProgress);
}

#[test]
fn selector_moves_past_failures() {
    let mut tree = flat(&[("C_Selector", 0), ("L_Fail", 1), ("L_Succeed", 1)]);

    tree.update(0.1);
    assert!(tree.root_node().unwrap().is_running());

    tree.update(0.1);
    assert_eq!(root_result(&tree), NodeResult::Success);
    assert!(tree.root_node().unwrap().is_ready());
}

#[test]
fn selector_fails_when_every_child_fails() {
    let mut tree = flat(&[("C_Selector", 0), ("L_Fail", 1)]);
    tree.update(0.1);
    assert_eq!(root_result(&tree), NodeResult::Failure);
}

#[test]
fn empty_composites_finish_immediately() {
    let mut sequence = flat(&[("C_Sequence", 0)]);
    sequence.update(0.1);
    assert_eq!(root_result(&sequence), NodeResult::Success);

    let mut selector = flat(&[("C_Selector", 0)]);
    selector.update(0.1);
    assert_eq!(root_result(&selector), NodeResult::Failure);
}

#[test]
fn decorators_rewrite_child_results() {
    let mut invert = flat(&[("D_Invert", 0), ("L_Succeed", 1)]);
    invert.update(0.1);
    assert_eq!(root_result(&invert), NodeResult::Failure);

    let mut invert = flat(&[("D_Invert", 0), ("L_Fail", 1)]);
    invert.update(0.1);
    assert_eq!(root_result(&invert), NodeResult::Success);

    let mut forced = flat(&[("D_AlwaysSucceed", 0), ("L_Fail", 1)]);
    forced.update(0.1);
    assert_eq!(root_result(&forced), NodeResult::Success);

    let mut forced = flat(&[("D_AlwaysFail", 0), ("L_Succeed", 1)]);
    forced.update(0.1);
    assert_eq!(root_result(&forced), NodeResult::Failure);
}

#[test]
fn decorator_waits_for_running_child() {
    let mut tree = flat(&[("D_AlwaysFail", 0), ("L_Wait", 1)]);
    for _ in 0..2 {
        tree.update(0.5);
        assert!(tree.root_node().unwrap().is_running());
    }
    tree.update(0.5);
    assert_eq!(root_result(&tree), NodeResult::Failure);
}

#[test]
fn wait_counts_down_frame_time() {
    let mut tree = flat(&[("L_Wait", 0)]);

    tree.update(0.5);
    assert!(tree.root_node().unwrap().is_running());

    // Exactly the duration is not enough, it has to be exceeded.
    tree.update(0.5);
    assert!(tree.root_node().unwrap().is_running());

    tree.update(0.5);
    assert!(tree.root_node().unwrap().is_ready());
    assert_eq!(root_result(&tree), NodeResult::Success);

    // Re-entered from scratch after the restart.
    tree.update(0.5);
    assert!(tree.root_node().unwrap().is_running());
}

#[test]
fn idle_lasts_more_than_three_seconds() {
    let mut tree = flat(&[("L_Idle", 0)]);
    for _ in 0..6 {
        tree.update(0.5);
        assert!(tree.root_node().unwrap().is_running());
    }
    tree.update(0.5);
    assert_eq!(root_result(&tree), NodeResult::Success);
}

#[test]
fn wait_spanning_frames_finishes_on_the_frame_that_crosses() {
    let mut tree = flat(&[("L_Wait", 0)]);
    for _ in 0..3 {
        tree.update(0.3);
        assert!(tree.root_node().unwrap().is_running());
    }
    tree.update(0.3);
    assert_eq!(root_result(&tree), NodeResult::Success);
}

#[test]
fn check_signal_reads_the_blackboard() {
    let mut tree = flat(&[("L_CheckSignal", 0)]);

    tree.update(0.1);
    assert_eq!(root_result(&tree), NodeResult::Failure);

    tree.blackboard_mut().set("signal", true);
    tree.update(0.1);
    assert_eq!(root_result(&tree), NodeResult::Success);

    // Wrong type reads as "not raised".
    tree.blackboard_mut().set("signal", 1u8);
    tree.update(0.1);
    assert_eq!(root_result(&tree), NodeResult::Failure);
}

#[test]
fn trace_log_records_transitions_in_order() {
    let mut tree = flat(&[("C_Sequence", 0), ("L_Succeed", 1)]);
    tree.blackboard_mut().set(TRACE_LOG, TraceLog::default());

    tree.update(0.1);

    let log = tree.blackboard().get::<TraceLog>(TRACE_LOG).unwrap();
    let seen: Vec<_> = log
        .events
        .iter()
        .map(|e| (&*e.tag, e.node, e.detail))
        .collect();
    assert_eq!(
        seen,
        [
            ("bt.node.enter", 0, 0),
            ("bt.node.enter", 1, 0),
            ("bt.node.exit", 1, NodeResult::Success.code()),
            ("bt.node.exit", 0, NodeResult::Success.code()),
            ("bt.tree.restart", 0, 0),
        ]
    );
    assert!(log.events.iter().all(|e| e.tick == 0));
}

#[test]
fn set_status_all_reaches_every_descendant() {
    let mut tree = flat(&[
        ("C_Sequence", 0),
        ("C_Selector", 1),
        ("D_Invert", 2),
        ("L_Wait", 3),
        ("L_Fail", 1),
    ]);
    let root = tree.root_id().unwrap();
    tree.set_status_all(root, NodeStatus::Running);
    assert!(tree
        .pre_order()
        .into_iter()
        .all(|id| tree.node(id).unwrap().is_running()));
}
