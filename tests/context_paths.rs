use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value as Json};
use structural_equivalency::{path, ComparisonContext, Configuration, MemberInfo, Value};

fn root(data: &Json) -> ComparisonContext {
    ComparisonContext::new(Arc::new(Configuration::default()), Value::from_json(data), Value::from_json(data))
}

fn descend(ctx: &ComparisonContext, name: &str) -> ComparisonContext {
    let member = ctx
        .selected_members()
        .unwrap()
        .into_iter()
        .find(|m| m.name() == name)
        .unwrap();
    ctx.create_for_nested_member(&member).unwrap().unwrap()
}

#[test]
fn root_is_root_and_children_are_not() {
    let data = json!({"a": {"b": [1, 2]}});
    let ctx = root(&data);
    assert!(ctx.is_root());
    assert_eq!(ctx.description(), "");

    let a = descend(&ctx, "a");
    let b = descend(&a, "b");
    let item = b.create_for_collection_item(0, Value::Int(1), Value::Int(1));
    for child in [&a, &b, &item] {
        assert!(!child.is_root());
        assert!(!child.description().is_empty());
    }
}

#[test]
fn chain_of_properties_reads_dotted() {
    let data = json!({"a": {"b": {"c": true}}});
    let c = descend(&descend(&descend(&root(&data), "a"), "b"), "c");
    assert_eq!(c.description(), "property a.b.c");
    assert_eq!(c.path(), "a.b.c");
}

#[test]
fn item_under_a_property_keeps_the_property_member() {
    let data = json!({"Address": {"Lines": ["1 Main St", "Apt 2", "Springfield"]}});
    let lines = descend(&descend(&root(&data), "Address"), "Lines");
    let item = lines.create_for_collection_item(2, Value::from("Springfield"), Value::from("Springfield"));

    assert_eq!(item.description(), format!("{}[2]", lines.description()));
    assert_eq!(item.description(), "property Address.Lines[2]");
    assert_eq!(item.path(), "Address.Lines[2]");
    assert_eq!(item.subject_member().map(MemberInfo::name), lines.subject_member().map(MemberInfo::name));
}

#[test]
fn members_below_items_continue_with_a_dot() {
    let data = json!({"Orders": [{"Id": 7}]});
    let orders = descend(&root(&data), "Orders");
    let first = orders.subject().as_list().unwrap()[0].clone();
    let item = orders.create_for_collection_item(0, first.clone(), first);
    let id = descend(&item, "Id");
    assert_eq!(id.description(), "property Orders[0].Id");
    assert_eq!(id.path(), "Orders[0].Id");
}

fn nested(names: &[String]) -> Json {
    names.iter().rev().fold(json!(1), |inner, name| {
        let mut map = serde_json::Map::new();
        map.insert(name.clone(), inner);
        Json::Object(map)
    })
}

proptest! {
    #[test]
    fn incremental_description_matches_one_pass(names in prop::collection::vec("[A-Za-z][A-Za-z0-9_]{0,6}", 1..6)) {
        let data = nested(&names);
        let leaf = names.iter().fold(root(&data), |ctx, name| descend(&ctx, name));

        let one_pass = names.join(".");
        prop_assert_eq!(leaf.description(), format!("property {one_pass}"));
        prop_assert_eq!(leaf.path(), one_pass.as_str());
        prop_assert_eq!(names.iter().fold(String::new(), |p, n| path::combine(&p, n)), one_pass);
        prop_assert_eq!(leaf.depth(), names.len());
    }
}
