use dynyaml::{CodecContext, DecodeOptions, Error, Value, from_str, load};
use indoc::indoc;

fn keys(value: &Value) -> Vec<&str> {
    value.as_map().unwrap().keys().filter_map(Value::as_str).collect()
}

#[test]
fn explicit_key_overrides_merged_key() {
    let value = from_str("{<<: {a: 1}, a: 2}").unwrap();
    assert_eq!(value.get("a"), Some(&Value::int(2)));
    assert_eq!(value.as_map().unwrap().len(), 1);

    // Regardless of whether the explicit key comes first.
    let value = from_str("{a: 2, <<: {a: 1, b: 3}}").unwrap();
    assert_eq!(value.get("a"), Some(&Value::int(2)));
    assert_eq!(value.get("b"), Some(&Value::int(3)));
}

#[test]
fn earliest_merge_source_wins() {
    let value = from_str("{<<: [{a: 1}, {a: 2}], b: 3}").unwrap();
    assert_eq!(value.get("a"), Some(&Value::int(1)));
    assert_eq!(value.get("b"), Some(&Value::int(3)));
}

#[test]
fn merge_through_aliases() {
    let yaml = indoc! {"
        base1: &B1 { a: 1, b: 2 }
        base2: &B2
          <<: { c: 3 }
          d: 4
        target:
          <<: [*B1, *B2]
          e: 5
    "};
    let value = from_str(yaml).unwrap();
    let target = value.get("target").unwrap();
    assert_eq!(keys(target), ["a", "b", "c", "d", "e"]);
    assert_eq!(target.get("c"), Some(&Value::int(3)));
}

#[test]
fn merged_pairs_sit_where_the_merge_key_was() {
    let yaml = indoc! {"
        defaults: &d { x: 1, y: 2 }
        item:
          name: first
          <<: *d
          z: 3
    "};
    let value = from_str(yaml).unwrap();
    assert_eq!(keys(value.get("item").unwrap()), ["name", "x", "y", "z"]);
}

#[test]
fn explicit_duplicates_still_fail_next_to_a_merge() {
    let err = from_str("{<<: {a: 1}, b: 1, b: 2}").unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { .. }), "{err}");
}

#[test]
fn illegal_merge_values() {
    for yaml in ["{<<: 1}", "{<<: [{a: 1}, 2]}", "{<<: text}"] {
        let err = from_str(yaml).unwrap_err();
        assert!(matches!(err, Error::IllegalMerge { .. }), "{yaml}: {err}");
        assert!(
            err.to_string()
                .contains("value must be a map or a sequence of maps"),
            "{err}"
        );
    }
}

#[test]
fn merge_of_empty_list_is_a_no_op() {
    let value = from_str("{<<: [], a: 1}").unwrap();
    assert_eq!(keys(&value), ["a"]);
}

#[test]
fn quoted_merge_marker_is_a_plain_key() {
    let value = from_str("{'<<': {a: 1}}").unwrap();
    assert_eq!(keys(&value), ["<<"]);
}

#[test]
fn merge_keys_count_against_the_budget() {
    let options = dynyaml::decode_options! {
        budget: Some(dynyaml::budget! { max_merge_keys: 1 }),
    };
    let yaml = "a: &a {x: 1}\nb: {<<: *a}\nc: {<<: *a}\n";
    let err = load(yaml, &options, &CodecContext::default()).unwrap_err();
    assert!(matches!(err, Error::Budget { .. }), "{err}");
    assert!(load(yaml, &DecodeOptions::default(), &CodecContext::default()).is_ok());
}
