// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

fn create_config_file(dir: &Path, content: &str) {
    let path = dir.join(VPATH_FILENAME);
    std::fs::write(path, content).expect("Failed to write config file");
}

fn descriptions(configs: &[ConfigFile]) -> Vec<&str> {
    configs
        .iter()
        .map(|config| config.description.as_deref().unwrap_or_default())
        .collect()
}

/// A parent directory with a file and a child directory with another.
fn nested(child_inherit: bool) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let child = tmp.path().join("child");
    std::fs::create_dir(&child).unwrap();

    create_config_file(
        tmp.path(),
        r#"
api: vpath/v0
description: parent
"#,
    );
    create_config_file(
        &child,
        &format!("api: vpath/v0\ndescription: child\ninherit: {child_inherit}\n"),
    );
    (tmp, child)
}

#[rstest]
fn test_discover_single_config() {
    let tmp = TempDir::new().unwrap();
    create_config_file(
        tmp.path(),
        r#"
api: vpath/v0
keywords:
  site: /srv/site
"#,
    );

    let options = DiscoveryOptions::default();
    let configs = discover_configs(tmp.path(), &options).expect("Should discover config");

    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].keywords["site"], "/srv/site");
    assert_eq!(
        configs[0].source_path,
        Some(tmp.path().join(VPATH_FILENAME))
    );
}

#[rstest]
fn test_inherit_false_stops_discovery() {
    let (_tmp, child) = nested(false);

    let configs = discover_configs(&child, &DiscoveryOptions::default()).unwrap();

    // Should only find child file since inherit defaults to false
    assert_eq!(descriptions(&configs), vec!["child"]);
}

#[rstest]
fn test_inherit_true_walks_up() {
    let (_tmp, child) = nested(true);

    let configs = discover_configs(&child, &DiscoveryOptions::default()).unwrap();

    // Parent comes first in composition order
    assert_eq!(descriptions(&configs), vec!["parent", "child"]);
}

#[rstest]
fn test_force_inherit_option() {
    let (_tmp, child) = nested(false);

    let options = DiscoveryOptions {
        force_inherit: true,
        ..Default::default()
    };
    let configs = discover_configs(&child, &options).unwrap();

    assert_eq!(descriptions(&configs), vec!["parent", "child"]);
}

#[rstest]
fn test_no_inherit_option() {
    let (_tmp, child) = nested(true);

    let options = DiscoveryOptions {
        no_inherit: true,
        ..Default::default()
    };
    let configs = discover_configs(&child, &options).unwrap();

    assert_eq!(descriptions(&configs), vec!["child"]);
}

#[rstest]
fn test_walks_up_from_directory_without_file() {
    let (tmp, _child) = nested(false);
    let empty = tmp.path().join("empty");
    std::fs::create_dir(&empty).unwrap();

    let configs = discover_configs(&empty, &DiscoveryOptions::default()).unwrap();
    assert_eq!(descriptions(&configs), vec!["parent"]);

    let options = DiscoveryOptions {
        no_inherit: true,
        ..Default::default()
    };
    assert!(discover_configs(&empty, &options).unwrap().is_empty());
}

#[rstest]
fn test_nothing_found_is_empty() {
    let tmp = TempDir::new().unwrap();

    let configs = discover_configs(tmp.path(), &DiscoveryOptions::default()).unwrap();
    assert!(configs.is_empty());
}

#[rstest]
fn test_local_override() {
    let tmp = TempDir::new().unwrap();
    create_config_file(
        tmp.path(),
        r#"
api: vpath/v0
description: main
"#,
    );

    let local_path = tmp.path().join(VPATH_LOCAL_FILENAME);
    std::fs::write(
        local_path,
        r#"
api: vpath/v0
description: local
"#,
    )
    .unwrap();

    let configs = discover_configs(tmp.path(), &DiscoveryOptions::default()).unwrap();

    // Local override comes last
    assert_eq!(descriptions(&configs), vec!["main", "local"]);
}

#[rstest]
fn test_user_and_explicit_files_come_first() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("project");
    std::fs::create_dir(&project).unwrap();
    create_config_file(&project, "api: vpath/v0\ndescription: project\n");

    let user = tmp.path().join("user.yaml");
    std::fs::write(&user, "api: vpath/v0\ndescription: user\n").unwrap();
    let explicit = tmp.path().join("explicit.yaml");
    std::fs::write(&explicit, "api: vpath/v0\ndescription: explicit\n").unwrap();

    let options = DiscoveryOptions {
        user_config: Some(user),
        config_files: vec![explicit],
        ..Default::default()
    };
    let configs = discover_configs(&project, &options).unwrap();

    assert_eq!(descriptions(&configs), vec!["user", "explicit", "project"]);
}

#[rstest]
fn test_missing_user_config_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let options = DiscoveryOptions {
        user_config: Some(tmp.path().join("absent.yaml")),
        ..Default::default()
    };
    assert!(discover_configs(tmp.path(), &options).unwrap().is_empty());
}

#[rstest]
fn test_missing_explicit_file() {
    let tmp = TempDir::new().unwrap();
    let options = DiscoveryOptions {
        config_files: vec![tmp.path().join("absent.yaml")],
        ..Default::default()
    };

    match discover_configs(tmp.path(), &options) {
        Err(crate::Error::ConfigNotFound { path, .. }) => {
            assert_eq!(path, tmp.path().join("absent.yaml"));
        }
        other => panic!("Expected ConfigNotFound, got: {:?}", other),
    }
}

#[rstest]
fn test_includes_load_before_includer() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("base.yaml"),
        "api: vpath/v0\ndescription: base\n",
    )
    .unwrap();
    create_config_file(
        tmp.path(),
        r#"
api: vpath/v0
description: main
includes:
  - base.yaml
"#,
    );

    let configs = discover_configs(tmp.path(), &DiscoveryOptions::default()).unwrap();
    assert_eq!(descriptions(&configs), vec!["base", "main"]);
}

#[rstest]
fn test_circular_include() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("a.yaml"),
        "api: vpath/v0\nincludes:\n  - b.yaml\n",
    )
    .unwrap();
    std::fs::write(
        tmp.path().join("b.yaml"),
        "api: vpath/v0\nincludes:\n  - a.yaml\n",
    )
    .unwrap();
    create_config_file(tmp.path(), "api: vpath/v0\nincludes:\n  - a.yaml\n");

    match discover_configs(tmp.path(), &DiscoveryOptions::default()) {
        Err(crate::Error::CircularInclude(path)) => {
            assert!(path.ends_with("a.yaml"));
        }
        other => panic!("Expected CircularInclude, got: {:?}", other),
    }
}

#[rstest]
fn test_shared_include_is_loaded_once() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("common.yaml"),
        "api: vpath/v0\ndescription: common\n",
    )
    .unwrap();
    std::fs::write(
        tmp.path().join("a.yaml"),
        "api: vpath/v0\ndescription: a\nincludes:\n  - common.yaml\n",
    )
    .unwrap();
    std::fs::write(
        tmp.path().join("b.yaml"),
        "api: vpath/v0\ndescription: b\nincludes:\n  - common.yaml\n",
    )
    .unwrap();
    create_config_file(
        tmp.path(),
        r#"
api: vpath/v0
description: main
includes:
  - a.yaml
  - b.yaml
"#,
    );

    let configs = discover_configs(tmp.path(), &DiscoveryOptions::default())
        .expect("A shared include is not a cycle");
    assert_eq!(descriptions(&configs), vec!["common", "a", "b", "main"]);
}

#[rstest]
fn test_parent_named_in_child_includes() {
    let (tmp, child) = nested(true);
    create_config_file(
        &child,
        r#"
api: vpath/v0
description: child
inherit: true
includes:
  - ../.vpath.yaml
"#,
    );

    let configs = discover_configs(&child, &DiscoveryOptions::default())
        .expect("An already loaded parent is not a cycle");
    assert_eq!(descriptions(&configs), vec!["parent", "child"]);
    drop(tmp);
}

#[rstest]
fn test_self_include() {
    let tmp = TempDir::new().unwrap();
    create_config_file(
        tmp.path(),
        "api: vpath/v0\nincludes:\n  - .vpath.yaml\n",
    );

    assert!(matches!(
        discover_configs(tmp.path(), &DiscoveryOptions::default()),
        Err(crate::Error::CircularInclude(_))
    ));
}
