// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{fixture, tree_fixture};

use anyhow::Result;
use indoc::indoc;
use ncf::{
    generate::generate_technique_content,
    metadata::{parse_generic_method_metadata, parse_technique_metadata},
    method_call::{parse_technique_methods, MethodCallError},
    tags::TagContext,
    validate::add_default_values_technique_metadata,
    MethodCall, Parameter,
};
use pretty_assertions::assert_eq;
use std::{fs::read_to_string, path::PathBuf};

fn technique_file() -> PathBuf {
    tree_fixture().join("50_techniques/bla/bla.cf")
}

fn generic_method_file() -> PathBuf {
    tree_fixture().join("30_generic_methods/package_install_version.cf")
}

fn sorted_keys<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut keys = keys.collect::<Vec<_>>();
    keys.sort();
    keys
}

#[test]
fn parse_technique_fixture() -> Result<()> {
    let content = read_to_string(technique_file())?;
    let record = parse_technique_metadata(&content)?;

    let mut expect = TagContext::Technique.expected_tags();
    expect.sort();
    assert_eq!(sorted_keys(record.keys()), expect);
    assert_eq!(
        record.text("name"),
        Some("Bla Technique for evaluation of parsingness")
    );
    assert_eq!(
        record.text("description"),
        Some("This meta-Technique is a sample only, allowing for testing.")
    );
    assert_eq!(record.text("version"), Some("0.1"));
    assert_eq!(record.text("bundle_name"), Some("bla"));
    assert_eq!(record.list("bundle_args"), Some(&[][..]));

    Ok(())
}

#[test]
fn parse_generic_method_fixture() -> Result<()> {
    let content = read_to_string(generic_method_file())?;
    let record = parse_generic_method_metadata(&content)?;

    let mut expect = TagContext::GenericMethod.expected_tags();
    expect.sort();
    assert_eq!(sorted_keys(record.keys()), expect);
    assert_eq!(record.text("name"), Some("Package install"));
    assert_eq!(
        record.text("description"),
        Some("Install a package by name from the default system package manager")
    );
    assert_eq!(record.text("bundle_name"), Some("package_install_version"));
    assert_eq!(
        record.list("bundle_args"),
        Some(&["package_name".to_string(), "package_version".to_string()][..])
    );
    assert_eq!(
        record.parameters(),
        Some(
            &[
                Parameter::new("package_name", Some("Name of the package to install")),
                Parameter::new("package_version", Some("Version of the package to install")),
            ][..]
        )
    );
    assert_eq!(record.text("class_prefix"), Some("package_install"));
    assert_eq!(record.text("class_parameter"), Some("package_name"));
    assert_eq!(record.integer("class_parameter_id"), Some(1));

    Ok(())
}

#[test]
fn parse_technique_method_calls_fixture() -> Result<()> {
    let result = parse_technique_methods(technique_file())?;
    let expect = vec![
        MethodCall::new(
            "package_install_version",
            ["${bla.apache_package_name}", "2.2.11"],
        ),
        MethodCall::new("service_start", ["${bla.apache_package_name}"])
            .with_class_context("cfengine"),
        MethodCall::new("package_install", ["openssh-server"]).with_class_context("cfengine"),
        MethodCall::new("_logger", ["NA", "NA"]).with_class_context("!cfengine"),
    ];
    assert_eq!(result, expect);

    Ok(())
}

#[test]
fn parse_method_calls_of_missing_file() {
    let result = parse_technique_methods(fixture("does/not/exist.cf"));
    assert!(matches!(result, Err(MethodCallError::ReadFile { .. })));
}

#[test]
fn generate_from_technique_fixture() -> Result<()> {
    let path = technique_file();
    let record = parse_technique_metadata(&read_to_string(&path)?)?
        .with("method_calls", parse_technique_methods(&path)?);
    let record = add_default_values_technique_metadata(record);

    let result = generate_technique_content(&record)?;
    let expect = indoc! {r#"
        # @name Bla Technique for evaluation of parsingness
        # @description This meta-Technique is a sample only, allowing for testing.
        # @version 0.1

        bundle agent bla
        {
          methods:
            "method_call" usebundle => package_install_version("${bla.apache_package_name}", "2.2.11"),
              ifvarclass => "any";

            "method_call" usebundle => service_start("${bla.apache_package_name}"),
              ifvarclass => "cfengine";

            "method_call" usebundle => package_install("openssh-server"),
              ifvarclass => "cfengine";

            "method_call" usebundle => _logger("NA", "NA"),
              ifvarclass => "!cfengine";
        }
    "#};
    assert_eq!(result, expect);

    Ok(())
}
