use ai_bt::{
    build_flat, update_components, BehaviourTree, BehaviourTreeComponent, BtError,
    ComponentDocument, NodeFactory, NodeResult,
};

fn waiting(factory: &NodeFactory, name: &str) -> BehaviourTree {
    build_flat(factory, name, [("L_Wait", 0)])
}

#[test]
fn component_updates_every_tree() {
    let factory = NodeFactory::with_default_nodes();
    let mut component = BehaviourTreeComponent::new();
    component.add_tree(waiting(&factory, "a")).unwrap();
    component
        .add_tree(build_flat(&factory, "b", [("L_Succeed", 0)]))
        .unwrap();

    component.update(0.25);

    assert!(component.tree("a").unwrap().root_node().unwrap().is_running());
    let b = component.tree("b").unwrap().root_node().unwrap();
    assert!(b.is_ready());
    assert_eq!(b.result(), NodeResult::Success);
    assert!(component.trees().iter().all(|t| t.ticks() == 1));
}

#[test]
fn incomplete_trees_are_refused() {
    let factory = NodeFactory::with_default_nodes();
    let mut component = BehaviourTreeComponent::new();

    // Unknown root name leaves the tree empty.
    let broken = build_flat(&factory, "broken", [("C_Nothing", 0), ("L_Wait", 1)]);
    let err = component.add_tree(broken).unwrap_err();
    assert!(matches!(err, BtError::IncompleteTree(name) if name == "broken"));
    assert!(component.is_empty());
}

#[test]
fn update_components_drives_each_component_once() {
    let factory = NodeFactory::with_default_nodes();
    let mut entities: Vec<BehaviourTreeComponent> = (0..3)
        .map(|i| {
            let mut component = BehaviourTreeComponent::new();
            component
                .add_tree(waiting(&factory, &format!("entity-{i}")))
                .unwrap();
            component
        })
        .collect();

    update_components(&mut entities, 0.5);
    update_components(entities.iter_mut(), 0.5);
    update_components(&mut entities, 0.5);

    for component in &entities {
        let tree = &component.trees()[0];
        assert_eq!(tree.ticks(), 3);
        assert_eq!(tree.root_node().unwrap().result(), NodeResult::Success);
    }
}

#[test]
fn component_document_rebuilds_attached_trees() {
    let factory = NodeFactory::with_default_nodes();
    let mut component = BehaviourTreeComponent::new();
    component.add_tree(waiting(&factory, "first")).unwrap();
    component
        .add_tree(build_flat(&factory, "second", [("C_Sequence", 0), ("L_Idle", 1)]))
        .unwrap();

    let doc = ComponentDocument::from_component(&component).unwrap();
    assert_eq!(doc.trees.len(), 2);

    let rebuilt = doc.build(&factory);
    assert_eq!(rebuilt.len(), 2);
    assert_eq!(rebuilt.trees()[1].name(), "second");
    assert_eq!(ComponentDocument::from_component(&rebuilt).unwrap(), doc);
}

#[cfg(feature = "serde")]
#[test]
fn component_yaml_lists_trees_under_one_key() {
    let factory = NodeFactory::with_default_nodes();
    let mut component = BehaviourTreeComponent::new();
    component.add_tree(waiting(&factory, "only")).unwrap();

    let yaml = ComponentDocument::from_component(&component)
        .unwrap()
        .to_yaml_string()
        .unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(value["Behaviour Trees"][0]["Tree Name"].as_str(), Some("only"));

    let doc = ComponentDocument::from_yaml_str(&yaml).unwrap();
    assert_eq!(doc.build(&factory).len(), 1);
}
