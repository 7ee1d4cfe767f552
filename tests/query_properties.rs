//! Property tests for directive application and patch merging.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use aeroresource::query::{
    apply_to_collection, FilterExpr, IgnoredCategories, OrderBy, QueryDirectives, QuerySettings,
};
use aeroresource::resource::{Delta, Document};

fn rows(groups: &[u8]) -> Vec<Value> {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| json!({"id": format!("{:05}", i), "group": g}))
        .collect()
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn fields() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-e]", scalar(), 0..5)
        .prop_map(|m| m.into_iter().collect::<Map<String, Value>>())
}

proptest! {
    #[test]
    fn prop_page_never_exceeds_page_size(
        groups in prop::collection::vec(0u8..4, 0..300),
        page_size in 1usize..150,
        top in prop::option::of(0usize..2000),
        skip in prop::option::of(0usize..400),
    ) {
        let mut directives = QueryDirectives::new();
        directives.top = top;
        directives.skip = skip;

        let settings = QuerySettings::with_page_size(page_size);
        let page = apply_to_collection(
            rows(&groups),
            Some(&directives),
            &settings,
            IgnoredCategories::none(),
            "id",
        );

        prop_assert!(page.len() <= page_size);
        if let Some(top) = top {
            prop_assert!(page.len() <= top);
        }
    }

    #[test]
    fn prop_count_is_total_filtered(
        groups in prop::collection::vec(0u8..4, 0..200),
        wanted in 0u8..4,
    ) {
        let directives = QueryDirectives::new()
            .filter(FilterExpr::eq("group", json!(wanted)))
            .top(1)
            .with_count();
        let page = apply_to_collection(
            rows(&groups),
            Some(&directives),
            &QuerySettings::default(),
            IgnoredCategories::none(),
            "id",
        );

        let expected = groups.iter().filter(|g| **g == wanted).count();
        prop_assert_eq!(page.count, Some(expected));
    }

    #[test]
    fn prop_stable_ordering_ignores_source_order(
        groups in prop::collection::vec(0u8..3, 0..100),
    ) {
        let directives = QueryDirectives::new().order_by(OrderBy::desc("group"));
        let forward = rows(&groups);
        let mut backward = forward.clone();
        backward.reverse();

        let settings = QuerySettings::default();
        let a = apply_to_collection(forward, Some(&directives), &settings, IgnoredCategories::none(), "id");
        let b = apply_to_collection(backward, Some(&directives), &settings, IgnoredCategories::none(), "id");
        prop_assert_eq!(a.items, b.items);
    }

    #[test]
    fn prop_order_over_mixed_values_is_total(
        values in prop::collection::vec(
            prop_oneof![any::<i32>().prop_map(Value::from), "[a-z]{0,4}".prop_map(Value::from)],
            0..64,
        ),
    ) {
        let rows: Vec<Value> = values
            .iter()
            .enumerate()
            .map(|(i, v)| json!({"id": format!("{:05}", i), "v": v}))
            .collect();
        let directives = QueryDirectives::new().order_by(OrderBy::asc("v"));
        let page = apply_to_collection(
            rows,
            Some(&directives),
            &QuerySettings::default(),
            IgnoredCategories::none(),
            "id",
        );

        prop_assert_eq!(page.len(), values.len());
        let numbers = values.iter().filter(|v| v.is_number()).count();
        prop_assert!(page.items[..numbers].iter().all(|r| r["v"].is_number()));
        prop_assert!(page.items[numbers..].iter().all(|r| r["v"].is_string()));
    }

    #[test]
    fn prop_patch_merges_and_is_idempotent(
        original in fields(),
        changes in fields(),
    ) {
        let entity = Document::with_id("k", Value::Object(original.clone()));
        let delta: Delta<Document> = Delta::from_changes(changes.clone());

        let once = delta.apply(entity).unwrap();
        let twice = delta.apply(once.clone()).unwrap();
        prop_assert_eq!(&once, &twice);

        for (name, value) in &changes {
            prop_assert_eq!(once.get(name), Some(value));
        }
        for (name, value) in original.iter().filter(|(n, _)| !changes.contains_key(*n)) {
            prop_assert_eq!(once.get(name), Some(value));
        }
        prop_assert_eq!(once.id.as_deref(), Some("k"));
    }
}
