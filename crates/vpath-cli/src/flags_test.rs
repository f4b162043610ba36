// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[derive(Parser)]
struct TestOpt {
    #[clap(flatten)]
    flags: ContextFlags,
}

fn flags(args: &[&str]) -> ContextFlags {
    let mut argv = vec!["vpath"];
    argv.extend_from_slice(args);
    TestOpt::parse_from(argv).flags
}

#[rstest]
#[case("root.data=/srv/Data", ("root.data", "/srv/Data"))]
#[case("empty=", ("empty", ""))]
#[case("url=a=b", ("url", "a=b"))]
fn test_parse_assignment(#[case] text: &str, #[case] expected: (&str, &str)) {
    let (name, value) = parse_assignment(text).unwrap();
    assert_eq!((name.as_str(), value.as_str()), expected);
}

#[rstest]
#[case("no-equals")]
#[case("=value")]
fn test_parse_assignment_invalid(#[case] text: &str) {
    assert!(parse_assignment(text).is_err());
}

#[rstest]
fn test_load_layers_command_line_on_top() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join(vpath::VPATH_FILENAME),
        r#"
api: vpath/v0
keywords:
  site: /from/file
parameters:
  root:
    data: "(:site:)/Data"
"#,
    )
    .unwrap();

    let start = tmp.path().display().to_string();
    let flags = flags(&[
        "-f",
        &start,
        "--no-user-config",
        "--root",
        "/opt/vendor",
        "--keyword",
        "site=/from/cli",
        "--set",
        "protocol.Data/Etc=Configuration/",
    ]);

    let mut loaded = flags.load().unwrap();
    assert_eq!(loaded.configs.len(), 1);
    assert_eq!(
        loaded.context.resolve("vpath://Data/Etc").unwrap(),
        "/from/cli/Data/Configuration/"
    );
}

#[rstest]
fn test_strict_flag() {
    let tmp = TempDir::new().unwrap();
    let start = tmp.path().display().to_string();
    let flags = flags(&["-f", &start, "--no-user-config", "--strict"]);

    let loaded = flags.load().unwrap();
    assert!(loaded.context.settings().strict);
}

#[rstest]
fn test_qualify() {
    let tmp = TempDir::new().unwrap();
    let start = tmp.path().display().to_string();
    let loaded = flags(&["-f", &start, "--no-user-config"]).load().unwrap();

    assert_eq!(qualify(&loaded.context, "Data/Etc"), "vpath://Data/Etc");
    assert_eq!(qualify(&loaded.context, "vpath://Data"), "vpath://Data");
    assert_eq!(qualify(&loaded.context, "/etc/hosts"), "/etc/hosts");
}
