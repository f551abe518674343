// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::fixture;

use anyhow::Result;
use ncf::hook::{get_hooks, Phase};
use simple_test_case::test_case;

#[test_case(
    Phase::Pre,
    "delete_technique",
    &["pre.delete_technique.commit.rpmsave.sh", "pre.delete_technique.commit.sh"];
    "pre hooks of exact action"
)]
#[test_case(
    Phase::Post,
    "(write|create)_technique",
    &["post.create_technique.commit.exe", "post.write_technique.commit.sh"];
    "post hooks of alternated actions"
)]
#[test_case(Phase::Post, "rename_technique", &[]; "no hooks of unknown action")]
#[test]
fn get_hooks_from_fixture(phase: Phase, action_pattern: &str, expect: &[&str]) {
    let result = get_hooks(phase, action_pattern, fixture("hooks.d")).unwrap();
    pretty_assertions::assert_eq!(result, expect);
}

#[test]
fn get_hooks_without_hooks_dir() -> Result<()> {
    let result = get_hooks(Phase::Pre, "delete_technique", fixture("no-hooks.d"))?;
    assert!(result.is_empty());

    Ok(())
}
