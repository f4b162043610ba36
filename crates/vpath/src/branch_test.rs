// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

fn node<const N: usize>(children: [(&str, Branch); N]) -> Branch {
    children.into_iter().collect()
}

#[rstest]
fn test_linearize_nested() {
    let branch = node([
        ("Data", node([("Etc", "Etc/".into()), ("Temporary", "Temporary/".into())])),
        ("Library", "Library/".into()),
    ]);

    let pairs = branch.linearize();
    assert_eq!(
        pairs,
        vec![
            ("Data.Etc".to_string(), "Etc/".to_string()),
            ("Data.Temporary".to_string(), "Temporary/".to_string()),
            ("Library".to_string(), "Library/".to_string()),
        ]
    );
}

#[rstest]
fn test_linearize_under_prefix() {
    let branch = node([("Data", node([("Etc", "Etc/".into())]))]);
    let pairs = branch.linearize_under("protocol");
    assert_eq!(
        pairs,
        vec![("protocol.Data.Etc".to_string(), "Etc/".to_string())]
    );

    let value = Branch::from("x");
    assert_eq!(
        value.linearize_under("a.b"),
        vec![("a.b".to_string(), "x".to_string())]
    );
}

#[rstest]
fn test_unlinearize_round_trip() {
    let original = node([("Data", node([("Etc", "Etc/".into())]))]);
    let rebuilt = Branch::unlinearize(original.linearize());
    assert_eq!(rebuilt, original);
}

#[rstest]
fn test_escaped_dots_survive() {
    let original = node([("www.example.com", node([("port", "80".into())]))]);
    let pairs = original.linearize();
    assert_eq!(pairs[0].0, "www\\.example\\.com.port");
    assert_eq!(Branch::unlinearize(pairs), original);
}

#[rstest]
fn test_unlinearize_later_wins() {
    let branch = Branch::unlinearize([("a", "1"), ("a.b", "2")]);
    assert_eq!(branch, node([("a", node([("b", "2".into())]))]));
}

#[rstest]
#[case("a.b.c", vec!["a", "b", "c"])]
#[case("a\\.b.c", vec!["a.b", "c"])]
#[case("single", vec!["single"])]
#[case("", vec![])]
#[case("protocol.Data/Etc", vec!["protocol", "Data/Etc"])]
fn test_split_key(#[case] key: &str, #[case] expected: Vec<&str>) {
    assert_eq!(split_key(key), expected);
}

#[rstest]
fn test_key_prefixes() {
    assert_eq!(key_prefixes("a.b.c"), vec!["a", "a.b"]);
    assert_eq!(key_prefixes("a\\.b.c"), vec!["a\\.b"]);
    assert!(key_prefixes("a").is_empty());
}

#[rstest]
#[case("protocol.Data", "protocol", Some("Data"))]
#[case("protocol", "protocol", Some(""))]
#[case("protocolX.Data", "protocol", None)]
#[case("root.data", "protocol", None)]
#[case("anything", "", Some("anything"))]
fn test_relative_key(#[case] key: &str, #[case] prefix: &str, #[case] expected: Option<&str>) {
    assert_eq!(relative_key(key, prefix), expected);
    assert_eq!(is_under(key, prefix), expected.is_some());
}

#[rstest]
fn test_deserialize_scalars_and_maps() {
    let yaml = r#"
root:
  data: /srv/data
port: 8080
enabled: true
empty:
"#;
    let branch: Branch = serde_yaml::from_str(yaml).expect("Should deserialize branch");
    assert_eq!(branch.get("port").and_then(Branch::as_value), Some("8080"));
    assert_eq!(branch.get("enabled").and_then(Branch::as_value), Some("true"));
    assert_eq!(branch.get("empty").and_then(Branch::as_value), Some(""));
    assert_eq!(
        branch
            .get("root")
            .and_then(|root| root.get("data"))
            .and_then(Branch::as_value),
        Some("/srv/data")
    );
}

#[rstest]
fn test_default_is_empty_node() {
    assert!(Branch::default().is_empty());
    assert!(!Branch::from("").is_empty());
}
