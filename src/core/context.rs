// src/core/context.rs

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

lazy_static! {
    /// `${NAME}` or `${NAME:-DEFAULT}`. NAME excludes `:` and `}`,
    /// DEFAULT excludes `}`.
    static ref VAR_PATTERN: Regex =
        Regex::new(r"\$\{(?P<name>[^:}]+)(?::-(?P<default>[^}]+))?\}")
            .expect("variable pattern is valid");
}

/// Errors raised while resolving names: variables, components, templates,
/// dependencies. Fatal to the invocation; the offending name is carried.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("variable {0} is not set")]
    UnsetVariable(String),
    #[error("component '{0}' not found")]
    UnknownComponent(String),
    #[error("template '{0}' is not found")]
    UnknownTemplate(String),
    #[error("dependency cycle detected: {0}")]
    DependencyCycle(String),
    #[error("you are not in a component folder")]
    NotInComponentFolder,
    #[error("components with tag '{0}' not found")]
    NoComponentsWithTag(String),
    #[error("repository of component '{0}' is not defined, check workspace.yaml")]
    MissingRepository(String),
}

/// An ordered mapping from variable name to value.
///
/// Name uniqueness is enforced by `add` (remove-then-append), so the last
/// write wins *and moves to the end*. Insertion order is visible in rendered
/// environments and in `vars` output, and is part of the contract.
#[derive(Debug, Clone, Default)]
pub struct VarContext {
    pairs: Vec<(String, String)>,
}

impl VarContext {
    pub fn new() -> VarContext {
        VarContext { pairs: Vec::new() }
    }

    pub fn find(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Removes any existing entry with this name and appends the pair at the
    /// end.
    pub fn add(&mut self, name: &str, value: &str) {
        self.pairs.retain(|(key, _)| key != name);
        self.pairs.push((name.to_string(), value.to_string()));
    }

    /// Substitutes `${NAME}` / `${NAME:-DEFAULT}` occurrences in `template`.
    ///
    /// One replacement value is resolved per **distinct** variable name, then
    /// every occurrence of that name's pattern (with or without a default
    /// clause) is replaced in one pass. A default starting with `$` is a
    /// single level of indirection: the remainder is looked up as a variable
    /// name, without further fallback. Rendering is single-pass: `${...}`
    /// syntax inside a resolved value is left untouched; multi-stage
    /// resolution is achieved by callers rendering definitions in order
    /// against the context as built so far.
    pub fn render(&self, template: &str) -> Result<String, ResolutionError> {
        let mut result = template.to_string();
        let mut resolved = HashSet::new();

        for captures in VAR_PATTERN.captures_iter(template) {
            let name = captures
                .name("name")
                .map(|m| m.as_str())
                .unwrap_or_default();

            // One resolution per distinct name; the first occurrence (and its
            // default clause, if any) decides the value for all of them.
            if !resolved.insert(name) {
                continue;
            }

            let value = match self.find(name) {
                Some(value) => value.to_string(),
                None => {
                    let default = captures
                        .name("default")
                        .map(|m| m.as_str())
                        .ok_or_else(|| ResolutionError::UnsetVariable(name.to_string()))?;

                    if let Some(stripped) = default.strip_prefix('$') {
                        let referenced = stripped.trim_start_matches('$');
                        self.find(referenced)
                            .ok_or_else(|| {
                                ResolutionError::UnsetVariable(referenced.to_string())
                            })?
                            .to_string()
                    } else {
                        default.to_string()
                    }
                }
            };

            let occurrence = Regex::new(&format!(
                r"\$\{{{}(?::-[^}}]+)?\}}",
                regex::escape(name)
            ))
            .expect("escaped occurrence pattern is valid");
            result = occurrence
                .replace_all(&result, regex::NoExpand(value.as_str()))
                .into_owned();
        }

        Ok(result)
    }

    /// The context as `NAME=VALUE` lines, in context order. Used both for
    /// child process environments and for `vars` output.
    pub fn to_env_list(&self) -> Vec<String> {
        self.pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}
