// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn store() -> Parameters {
    let mut store = Parameters::with_defaults([
        ("root.hoa", "(:root:)"),
        ("root.application", "(:cwd:h:)"),
        ("root.data", "(:%root.application:h:)/Data"),
        ("protocol.Data", "(:%root.data:)/"),
        ("protocol.Data/Etc", "Etc/"),
    ])
    .expect("Should build store");
    store.set_keyword("root", "/opt/vendor");
    store.set_keyword("cwd", "/srv/project/app/public");
    store
}

#[rstest]
fn test_formatted_chain(store: Parameters) {
    assert_eq!(
        store.get_formatted_parameter("root.application").unwrap(),
        "/srv/project/app"
    );
    assert_eq!(
        store.get_formatted_parameter("root.data").unwrap(),
        "/srv/project/Data"
    );
    assert_eq!(
        store.get_formatted_parameter("protocol.Data").unwrap(),
        "/srv/project/Data/"
    );
    assert_eq!(store.get_formatted_parameter("root.hoa").unwrap(), "/opt/vendor");
}

#[rstest]
fn test_head_transform() {
    let mut store = Parameters::new();
    store.set_parameter("x", "/a/b/c").unwrap();
    assert_eq!(store.format("(:%x:h:)").unwrap(), "/a/b");
}

#[rstest]
fn test_formatted_has_no_residual_markers(store: Parameters) {
    for (key, _) in store.parameters() {
        let value = store.get_formatted_parameter(key).unwrap();
        assert!(!value.contains("(:"), "{key} -> {value}");
        assert!(!value.contains(":)"), "{key} -> {value}");
    }
}

#[rstest]
fn test_raw_value_is_unchanged(store: Parameters) {
    assert_eq!(
        store.get_parameter("root.data").unwrap(),
        "(:%root.application:h:)/Data"
    );
}

#[rstest]
fn test_unknown_key(store: Parameters) {
    match store.get_formatted_parameter("root.missing") {
        Err(Error::UnknownKey(key)) => assert_eq!(key, "root.missing"),
        other => panic!("Expected UnknownKey, got: {:?}", other),
    }

    match store.format("(:%nowhere:)") {
        Err(Error::UnknownKey(key)) => assert_eq!(key, "nowhere"),
        other => panic!("Expected UnknownKey, got: {:?}", other),
    }
}

#[rstest]
fn test_cyclic_reference() {
    let mut store = Parameters::new();
    store
        .set_parameters([("a", "(:%b:)"), ("b", "x/(:%a:)")])
        .unwrap();

    match store.get_formatted_parameter("a") {
        Err(Error::CyclicReference { key, chain }) => {
            assert_eq!(key, "a");
            assert_eq!(chain, vec!["a", "b", "a"]);
        }
        other => panic!("Expected CyclicReference, got: {:?}", other),
    }
}

#[rstest]
fn test_self_reference() {
    let mut store = Parameters::new();
    store.set_parameter("a", "(:%a:)").unwrap();
    assert!(matches!(
        store.get_formatted_parameter("a"),
        Err(Error::CyclicReference { .. })
    ));
}

#[rstest]
fn test_depth_bound() {
    let mut store = Parameters::new();
    let chain_length = MAX_EXPANSION_DEPTH + 4;
    for i in 0..chain_length {
        store
            .set_parameter(format!("k{i}"), format!("(:%k{}:)", i + 1))
            .unwrap();
    }
    store.set_parameter(format!("k{chain_length}"), "end").unwrap();

    assert!(matches!(
        store.get_formatted_parameter("k0"),
        Err(Error::CyclicReference { .. })
    ));
    // A short acyclic chain formats fine.
    assert_eq!(store.get_formatted_parameter("k30").unwrap(), "end");
}

#[rstest]
fn test_diamond_is_not_a_cycle() {
    let mut store = Parameters::new();
    store
        .set_parameters([("base", "/b"), ("left", "(:%base:)/l"), ("top", "(:%left:)+(:%base:)")])
        .unwrap();
    assert_eq!(store.get_formatted_parameter("top").unwrap(), "/b/l+/b");
}

#[rstest]
fn test_keyword_and_parameter_precedence() {
    let mut store = Parameters::new();
    store.set_keyword("name", "from-keyword");
    store.set_parameter("name", "from-parameter").unwrap();
    store.set_parameter("only", "parameter-only").unwrap();
    store.set_keyword("solo", "keyword-only");

    assert_eq!(store.format("(:name:)").unwrap(), "from-keyword");
    assert_eq!(store.format("(:%name:)").unwrap(), "from-parameter");
    // Each form falls back to the other namespace.
    assert_eq!(store.format("(:only:)").unwrap(), "parameter-only");
    assert_eq!(store.format("(:%solo:)").unwrap(), "keyword-only");
}

#[rstest]
fn test_keyword_overwrite_and_reset(mut store: Parameters) {
    store.set_keyword("cwd", "/elsewhere/bin");
    assert_eq!(
        store.get_formatted_parameter("root.application").unwrap(),
        "/elsewhere"
    );

    store.reset_keywords();
    assert!(store.get_keyword("cwd").is_none());
    assert!(matches!(
        store.get_formatted_parameter("root.application"),
        Err(Error::UnknownKey(_))
    ));
}

#[rstest]
fn test_unknown_transform_surfaces() {
    let mut store = Parameters::new();
    store.set_parameter("x", "/a").unwrap();
    store.set_parameter("y", "(:%x:q:)").unwrap();
    assert!(matches!(
        store.get_formatted_parameter("y"),
        Err(Error::UnknownTransform { transform: 'q', .. })
    ));
}

#[rstest]
fn test_set_parameters_idempotent(mut store: Parameters) {
    let overrides = [("root.data", "/data"), ("protocol.Library", "Lib/")];

    store.set_parameters(overrides).unwrap();
    let once = store.clone();
    store.set_parameters(overrides).unwrap();

    assert_eq!(store, once);
    assert_eq!(store.get_formatted_parameter("root.data").unwrap(), "/data");
    // Keys absent from the override are kept.
    assert!(store.contains("protocol.Data/Etc"));
}

#[rstest]
fn test_key_conflict_is_atomic(mut store: Parameters) {
    let before = store.clone();

    let result = store.set_parameters([("root.cache", "/cache"), ("root.data.sub", "x")]);
    match result {
        Err(Error::KeyConflict { key, existing }) => {
            assert_eq!(key, "root.data.sub");
            assert_eq!(existing, "root.data");
        }
        other => panic!("Expected KeyConflict, got: {:?}", other),
    }
    assert_eq!(store, before);

    // A leaf cannot replace an existing branch either.
    assert!(matches!(
        store.set_parameter("root", "/"),
        Err(Error::KeyConflict { .. })
    ));
}

#[rstest]
fn test_reset_parameters(mut store: Parameters) {
    store.set_parameter("root.data", "/data").unwrap();
    store.set_parameter("extra", "1").unwrap();
    store.reset_parameters();

    assert_eq!(
        store.get_parameter("root.data").unwrap(),
        "(:%root.application:h:)/Data"
    );
    assert!(!store.contains("extra"));
    // Keywords are not parameters and survive.
    assert_eq!(store.get_keyword("root"), Some("/opt/vendor"));
}

#[rstest]
fn test_unlinearize_branche_formats_and_strips(store: Parameters) {
    let protocol = store.unlinearize_branche("protocol").unwrap();
    assert_eq!(
        protocol.get("Data").and_then(Branch::as_value),
        Some("/srv/project/Data/")
    );
    assert_eq!(protocol.get("Data/Etc").and_then(Branch::as_value), Some("Etc/"));
    assert!(protocol.get("root.data").is_none());

    let raw = store.raw_branche("protocol");
    assert_eq!(
        raw.get("Data").and_then(Branch::as_value),
        Some("(:%root.data:)/")
    );
}

#[rstest]
fn test_unlinearize_is_segment_aware() {
    let mut store = Parameters::new();
    store
        .set_parameters([("protocol.Data", "d"), ("protocolish.Data", "x")])
        .unwrap();
    let branch = store.raw_branche("protocol");
    assert_eq!(branch.as_node().map(|n| n.len()), Some(1));
}

#[rstest]
fn test_branch_round_trip() {
    let original: Branch = serde_yaml::from_str(
        r#"
protocol:
  Data:
    Etc: "Etc/"
"#,
    )
    .unwrap();

    let mut store = Parameters::new();
    store.set_branche("", &original).unwrap();
    assert_eq!(store.get_parameter("protocol.Data.Etc").unwrap(), "Etc/");

    let rebuilt = store.unlinearize_branche("protocol").unwrap();
    assert_eq!(Some(&rebuilt), original.get("protocol"));
}

#[rstest]
fn test_unlinearize_missing_prefix_is_empty(store: Parameters) {
    assert!(store.unlinearize_branche("nothing").unwrap().is_empty());
}
