// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::tree_fixture;

use anyhow::Result;
use ncf::{
    hook::Hooks,
    metadata::parse_technique_metadata,
    method_call::parse_technique_methods,
    scan::Scanner,
    store::{StoreError, TechniqueStore},
    validate::add_default_values_technique_metadata,
};
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{fs::read_to_string, path::PathBuf};

#[sealed_test]
fn import_technique_into_new_tree() -> Result<()> {
    let source = tree_fixture().join("50_techniques/bla/bla.cf");
    let record = parse_technique_metadata(&read_to_string(&source)?)?
        .with("method_calls", parse_technique_methods(&source)?);

    let store = TechniqueStore::new("write_test", Hooks::disabled());
    let path = store.write_technique(&record)?;
    assert_eq!(path, PathBuf::from("write_test/50_techniques/bla/bla.cf"));

    let written = parse_technique_metadata(&read_to_string(&path)?)?
        .with("method_calls", parse_technique_methods(&path)?);
    assert_eq!(written, add_default_values_technique_metadata(record));

    let scanner = Scanner::new("write_test");
    assert_eq!(scanner.get_all_techniques_filenames(None)?, vec![path]);

    store.delete_technique("bla")?;
    assert!(!store.technique_dir("bla").exists());
    assert!(scanner.get_all_techniques_filenames(None)?.is_empty());

    Ok(())
}

#[sealed_test]
fn delete_technique_twice() -> Result<()> {
    let source = tree_fixture().join("50_techniques/bla/bla.cf");
    let record = parse_technique_metadata(&read_to_string(&source)?)?
        .with("method_calls", parse_technique_methods(&source)?);

    let store = TechniqueStore::new("write_test", Hooks::disabled());
    store.write_technique(&record)?;
    store.delete_technique("bla")?;

    let result = store.delete_technique("bla");
    assert!(matches!(result, Err(StoreError::NotFound { .. })));

    Ok(())
}
