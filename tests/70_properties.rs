use proptest::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use workspace_api::crypto::PayloadCipher;
use workspace_api::database::models::Tab;
use workspace_api::hierarchy::{self, Ordered};
use workspace_api::merge::deep_merge;
use workspace_api::types::JsonMap;

#[derive(Debug, Clone)]
enum Op {
    Insert(Option<i32>),
    Delete(usize),
    Reverse,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::option::of(-2i32..12).prop_map(Op::Insert),
        (0usize..16).prop_map(Op::Delete),
        Just(Op::Reverse),
    ]
}

fn apply(tabs: &mut Vec<Tab>, page_id: Uuid, op: &Op) {
    match op {
        Op::Insert(position) => {
            let placement = hierarchy::insert_at(tabs, *position);
            let name = format!("tab-{}", tabs.len());
            tabs.push(Tab::new(page_id, name, "snow_load", placement.order));
        }
        Op::Delete(index) => {
            if !tabs.is_empty() {
                tabs.remove(index % tabs.len());
                hierarchy::compact(tabs);
            }
        }
        Op::Reverse => {
            tabs.sort_by_key(|t| t.display_order);
            let ids: Vec<Uuid> = tabs.iter().rev().map(|t| t.id).collect();
            hierarchy::apply_order(tabs, &ids).expect("full permutation");
        }
    }
}

fn json_map() -> impl Strategy<Value = JsonMap> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(Value::from),
        "[a-z ]{0,12}".prop_map(Value::String),
    ];
    let value = leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
            .prop_map(|entries| Value::Object(entries.into_iter().collect()))
    });
    prop::collection::btree_map("[a-z]{1,6}", value, 0..6).prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #[test]
    fn orders_stay_dense_under_any_edit_sequence(ops in prop::collection::vec(op(), 1..40)) {
        let page_id = Uuid::new_v4();
        let mut tabs = Vec::new();
        for op in &ops {
            apply(&mut tabs, page_id, op);
            prop_assert!(hierarchy::is_dense(&tabs), "not dense after {:?}", op);
        }
    }

    #[test]
    fn activation_leaves_exactly_one_active(count in 1usize..10, pick in 0usize..10) {
        let page_id = Uuid::new_v4();
        let mut tabs: Vec<Tab> = (0..count)
            .map(|i| Tab::new(page_id, format!("t{i}"), "snow_load", i as i32))
            .collect();
        let first = tabs[count / 2].id;
        hierarchy::activate(&mut tabs, first);

        let target = tabs[pick % count].id;
        hierarchy::activate(&mut tabs, target);
        let active: Vec<Uuid> = tabs.iter().filter(|t| t.is_active()).map(|t| t.id).collect();
        prop_assert_eq!(active, vec![target]);
    }

    #[test]
    fn sealed_payloads_open_with_the_same_inputs(data in json_map(), password in "[ -~]{1,24}") {
        let cipher = PayloadCipher::new("property-test-secret");
        let salt = PayloadCipher::generate_salt();
        match cipher.encrypt(&data, &password, &salt).unwrap() {
            Some(blob) => prop_assert_eq!(cipher.decrypt(&blob, &password, &salt).unwrap(), data),
            None => prop_assert!(data.is_empty()),
        }
    }

    #[test]
    fn floats_survive_sealing_bit_for_bit(value in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let cipher = PayloadCipher::new("property-test-secret");
        let salt = PayloadCipher::generate_salt();
        let mut data = JsonMap::new();
        data.insert("load".to_string(), Value::from(value));

        let blob = cipher.encrypt(&data, "pw", &salt).unwrap().expect("non-empty payload");
        let opened = cipher.decrypt(&blob, "pw", &salt).unwrap();
        let back = opened["load"].as_f64().expect("float");
        prop_assert_eq!(back.to_bits(), value.to_bits());
    }

    #[test]
    fn merging_with_itself_or_nothing_is_identity(data in json_map()) {
        prop_assert_eq!(deep_merge(&data, &JsonMap::new()), data.clone());
        prop_assert_eq!(deep_merge(&JsonMap::new(), &data), data.clone());
        prop_assert_eq!(deep_merge(&data, &data), data);
    }
}
