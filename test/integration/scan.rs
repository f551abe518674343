// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{alt_fixture, sorted, tree_fixture};

use anyhow::Result;
use ncf::{scan::Scanner, MetadataRecord};
use pretty_assertions::assert_eq;

fn bundle_names(records: &[MetadataRecord]) -> Vec<&str> {
    let mut names = records
        .iter()
        .filter_map(|record| record.text("bundle_name"))
        .collect::<Vec<_>>();
    names.sort();
    names
}

#[test]
fn list_generic_method_files() -> Result<()> {
    let scanner = Scanner::new(tree_fixture());

    let result = sorted(scanner.get_all_generic_methods_filenames(None)?);
    let expect = vec![
        tree_fixture().join("30_generic_methods/package_install_version.cf"),
        tree_fixture().join("30_generic_methods/service_start.cf"),
    ];
    assert_eq!(result, expect);

    let result = sorted(scanner.get_all_generic_methods_filenames(Some(alt_fixture().as_path()))?);
    let expect = sorted(vec![
        tree_fixture().join("30_generic_methods/package_install_version.cf"),
        tree_fixture().join("30_generic_methods/service_start.cf"),
        alt_fixture().join("30_generic_methods/file_create.cf"),
    ]);
    assert_eq!(result, expect);

    Ok(())
}

#[test]
fn list_technique_files() -> Result<()> {
    let scanner = Scanner::new(tree_fixture());

    let result = scanner.get_all_techniques_filenames(None)?;
    assert_eq!(result, vec![tree_fixture().join("50_techniques/bla/bla.cf")]);

    let result = sorted(scanner.get_all_techniques_filenames(Some(alt_fixture().as_path()))?);
    let expect = sorted(vec![
        tree_fixture().join("50_techniques/bla/bla.cf"),
        alt_fixture().join("50_techniques/ntp/ntp.cf"),
    ]);
    assert_eq!(result, expect);

    Ok(())
}

#[test]
fn list_generic_method_metadata() -> Result<()> {
    let scanner = Scanner::new(tree_fixture());

    let result = scanner.get_all_generic_methods_metadata(None)?;
    assert_eq!(
        bundle_names(&result),
        vec!["package_install_version", "service_start"]
    );

    let result = scanner.get_all_generic_methods_metadata(Some(alt_fixture().as_path()))?;
    assert_eq!(
        bundle_names(&result),
        vec!["file_create", "package_install_version", "service_start"]
    );

    Ok(())
}

#[test]
fn list_technique_metadata_with_method_calls() -> Result<()> {
    let scanner = Scanner::new(tree_fixture());

    let result = scanner.get_all_techniques_metadata(Some(alt_fixture().as_path()))?;
    assert_eq!(bundle_names(&result), vec!["bla", "ntp"]);

    let calls = result
        .iter()
        .map(|record| record.method_calls().map_or(0, |calls| calls.len()))
        .sum::<usize>();
    assert_eq!(calls, 6);

    let ntp = result
        .iter()
        .find(|record| record.text("bundle_name") == Some("ntp"))
        .and_then(|record| record.method_calls())
        .unwrap_or_default();
    assert_eq!(ntp[1].class_context.as_deref(), Some("linux"));

    Ok(())
}
