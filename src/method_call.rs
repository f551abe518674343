// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Technique method call parsing.
//!
//! A technique is an ordered sequence of generic method invocations. Each
//! invocation is a promise inside the `methods:` section of the technique's
//! bundle body:
//!
//! ```text
//!   methods:
//!     "method_call" usebundle => package_install("openssh-server"),
//!       ifvarclass => "cfengine";
//! ```
//!
//! Only this fixed statement shape is understood. Arguments are kept exactly
//! as written, so `"literal"` and `${bundle.variable}` tokens come out as
//! plain text with no interpolation or unescaping.

use regex::Regex;
use serde::Serialize;
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use tracing::{debug, instrument};

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\w+):\s*$").unwrap());

static STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)^\s*"[^"]*"\s+usebundle\s*=>\s*([\w.:]+)\s*(?:\((.*)\))?\s*(?:,\s*ifvarclass\s*=>\s*"([^"]*)")?\s*$"#,
    )
    .unwrap()
});

/// Single generic method invocation of a technique.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MethodCall {
    /// Name of the generic method bundle being called.
    pub method_name: String,

    /// Arguments in call order, verbatim minus enclosing quotes.
    pub args: Vec<String>,

    /// Class expression guarding the call.
    ///
    /// Absent until explicitly given or defaulted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_context: Option<String>,
}

impl MethodCall {
    /// Construct new method call without class context.
    pub fn new(
        method_name: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            args: args.into_iter().map(Into::into).collect(),
            class_context: None,
        }
    }

    /// Consume method call and return it guarded by class expression.
    pub fn with_class_context(mut self, class_context: impl Into<String>) -> Self {
        self.class_context = Some(class_context.into());
        self
    }
}

/// Parse method calls of technique file at target path.
///
/// # Errors
///
/// - Return [`MethodCallError::ReadFile`] if file cannot be read.
/// - Return any error of [`parse_technique_methods_str`].
#[instrument(skip(path), level = "debug")]
pub fn parse_technique_methods(path: impl AsRef<Path>) -> Result<Vec<MethodCall>> {
    let path = path.as_ref();
    debug!("parse method calls of {:?}", path.display());
    let content = read_to_string(path).map_err(|err| MethodCallError::ReadFile {
        source: err,
        path: path.to_path_buf(),
    })?;

    parse_technique_methods_str(&content)
}

/// Parse method calls out of technique content.
///
/// Statements of every `methods:` section in the first bundle are returned in
/// source order. Content without a `methods:` section has no method calls.
///
/// # Errors
///
/// - Return [`MethodCallError::MalformedStatement`] if a statement in the
///   `methods:` section does not have the `usebundle` call shape.
/// - Return [`MethodCallError::Unterminated`] if the last statement of a
///   section lacks its closing `;`.
pub fn parse_technique_methods_str(content: &str) -> Result<Vec<MethodCall>> {
    let mut calls = Vec::new();
    let mut section = String::new();
    let mut in_methods = false;

    for line in content.lines() {
        if let Some(caps) = SECTION_HEADER.captures(line) {
            if in_methods {
                calls.extend(parse_section(&section)?);
                section.clear();
            }
            in_methods = &caps[1] == "methods";
            continue;
        }

        if !in_methods {
            continue;
        }

        // INVARIANT: Closing brace at line start ends the bundle body.
        if line.trim_start().starts_with('}') {
            break;
        }

        section.push_str(strip_comment(line));
        section.push('\n');
    }

    calls.extend(parse_section(&section)?);
    Ok(calls)
}

fn parse_section(section: &str) -> Result<Vec<MethodCall>> {
    let mut calls = Vec::new();
    let mut statement = String::new();
    let mut in_quote = false;
    let mut escaped = false;

    for ch in section.chars() {
        if in_quote {
            statement.push(ch);
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => {}
            }
            continue;
        }

        match ch {
            ';' => {
                calls.push(parse_statement(&statement)?);
                statement.clear();
            }
            '"' => {
                in_quote = true;
                statement.push(ch);
            }
            _ => statement.push(ch),
        }
    }

    if !statement.trim().is_empty() {
        return Err(MethodCallError::Unterminated(statement.trim().to_string()));
    }

    Ok(calls)
}

fn parse_statement(statement: &str) -> Result<MethodCall> {
    let caps = STATEMENT
        .captures(statement)
        .ok_or_else(|| MethodCallError::MalformedStatement(statement.trim().to_string()))?;

    Ok(MethodCall {
        method_name: caps[1].to_string(),
        args: caps.get(2).map(|args| split_args(args.as_str())).unwrap_or_default(),
        class_context: caps.get(3).map(|class| class.as_str().to_string()),
    })
}

fn split_args(args: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut token = String::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;

    if args.trim().is_empty() {
        return tokens;
    }

    for ch in args.chars() {
        if in_quote {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => {}
            }
            token.push(ch);
            continue;
        }

        match ch {
            '"' => in_quote = true,
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                tokens.push(unquote(&token));
                token.clear();
                continue;
            }
            _ => {}
        }
        token.push(ch);
    }
    tokens.push(unquote(&token));

    tokens
}

fn unquote(token: &str) -> String {
    let token = token.trim();
    token
        .strip_prefix('"')
        .and_then(|token| token.strip_suffix('"'))
        .unwrap_or(token)
        .to_string()
}

fn strip_comment(line: &str) -> &str {
    let mut in_quote = false;
    let mut escaped = false;

    for (index, ch) in line.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_quote => escaped = true,
            '"' => in_quote = !in_quote,
            '#' if !in_quote => return &line[..index],
            _ => {}
        }
    }

    line
}

/// Method call parsing error types.
#[derive(Debug, thiserror::Error)]
pub enum MethodCallError {
    /// Technique file cannot be read.
    #[error("failed to read technique file at {:?}", path.display())]
    ReadFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Statement does not have the method call shape.
    #[error("malformed method call statement: {0}")]
    MalformedStatement(String),

    /// Statement is missing its terminating semicolon.
    #[error("unterminated method call statement: {0}")]
    Unterminated(String),
}

/// Friendly result alias :3
pub type Result<T, E = MethodCallError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use simple_test_case::test_case;

    const TECHNIQUE: &str = indoc! {r#"
        # @name Bla Technique for evaluation of parsingness
        # @description This meta-Technique is a sample only, allowing for testing.
        # @version 0.1

        bundle agent bla
        {
          vars:
              "apache_package_name" string => "apache2";

          methods:
              # Install the web server first.
              "install apache" usebundle => package_install_version("${bla.apache_package_name}", "2.2.11");

              "start apache"
                usebundle => service_start(${bla.apache_package_name}),
                ifvarclass => "cfengine";

              "ssh" usebundle => package_install("openssh-server"),  # keep sshd around
                ifvarclass => "cfengine";

              "log" usebundle => _logger("NA", "NA"),
                ifvarclass => "!cfengine";
        }
    "#};

    #[test]
    fn parse_methods_in_source_order() {
        let result = parse_technique_methods_str(TECHNIQUE).unwrap();
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
        pretty_assertions::assert_eq!(result, expect);
    }

    #[test]
    fn parse_methods_without_section() {
        let content = indoc! {r#"
            bundle agent empty
            {
              vars:
                  "x" string => "y";
            }
        "#};
        pretty_assertions::assert_eq!(parse_technique_methods_str(content).unwrap(), vec![]);
    }

    #[test]
    fn parse_methods_keeps_duplicates() {
        let content = indoc! {r#"
            bundle agent twice
            {
              methods:
                "a" usebundle => noop();
                "a" usebundle => noop();
            }
        "#};
        let result = parse_technique_methods_str(content).unwrap();
        pretty_assertions::assert_eq!(
            result,
            vec![MethodCall::new("noop", Vec::<String>::new()); 2]
        );
    }

    #[test_case(r#"f("a", "b")"#, &["a", "b"]; "quoted literals")]
    #[test_case(r#"f(${x.y}, "z")"#, &["${x.y}", "z"]; "bare variable reference")]
    #[test_case(r#"f("a,b", "${c[1,2]}")"#, &["a,b", "${c[1,2]}"]; "commas inside tokens")]
    #[test_case(r#"f("say \"hi\"")"#, &[r#"say \"hi\""#]; "escapes kept verbatim")]
    #[test_case("f()", &[]; "no arguments")]
    #[test]
    fn parse_method_arguments(call: &str, expect: &[&str]) {
        let content = format!("bundle agent t\n{{\n  methods:\n    \"x\" usebundle => {call};\n}}\n");
        let result = parse_technique_methods_str(&content).unwrap();
        let expect = expect.iter().map(ToString::to_string).collect::<Vec<_>>();
        pretty_assertions::assert_eq!(result[0].args, expect);
    }

    #[test]
    fn parse_methods_rejects_malformed_statement() {
        let content = indoc! {r#"
            bundle agent broken
            {
              methods:
                "a" usebundle => noop(),
                  ifvarclass => unquoted;
            }
        "#};
        let result = parse_technique_methods_str(content);
        assert!(matches!(result, Err(MethodCallError::MalformedStatement(_))));
    }

    #[test]
    fn parse_methods_rejects_unterminated_statement() {
        let content = indoc! {r#"
            bundle agent broken
            {
              methods:
                "a" usebundle => noop()
            }
        "#};
        let result = parse_technique_methods_str(content);
        assert!(matches!(result, Err(MethodCallError::Unterminated(_))));
    }

    #[test]
    fn parse_methods_from_nonexistent_file() {
        let result = parse_technique_methods("/dev/nonexistent");
        assert!(matches!(result, Err(MethodCallError::ReadFile { .. })));
    }
}
