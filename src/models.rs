// src/models.rs

use serde::{Deserialize, Deserializer, de};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::constants::DEFAULT_MODE;

/// Errors produced while loading or merging workspace configuration.
/// These are never recovered from; they surface verbatim at the CLI boundary.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("workspace config '{0}' has no top-level 'name'")]
    MissingName(String),
    #[error("component '{0}' is declared in more than one collection")]
    DuplicateComponent(String),
    #[error("workspace config not found: '{0}'")]
    NotFound(String),
    #[error("invalid version string '{0}'")]
    InvalidVersion(String),
    #[error("this workspace requires stax version > {required}, current is {current}")]
    VersionTooOld { required: String, current: String },
}

// --- RUNTIME OPTIONS ---

/// Options shared by every lifecycle action, assembled from the global CLI
/// flags plus the per-command ones.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub workspace: Option<PathBuf>,
    pub component: Option<String>,
    pub tag: Option<String>,
    /// Dependency activation mode for `start`.
    pub mode: String,
    /// Re-activate dependencies even when the component is already running.
    pub force: bool,
    /// Echo every external command before running it.
    pub debug: bool,
    /// Compute commands but do not execute anything.
    pub dry_run: bool,
    /// Explicit uid for `exec`/`run`; falls back to context USER_ID/GROUP_ID.
    pub uid: Option<u32>,
    pub working_dir: Option<String>,
    pub no_tty: bool,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            workspace: None,
            component: None,
            tag: None,
            mode: DEFAULT_MODE.to_string(),
            force: false,
            debug: false,
            dry_run: false,
            uid: None,
            working_dir: None,
            no_tty: false,
        }
    }
}

// --- `workspace.yaml` MODELS ---

/// The set of activation modes declared on a dependency edge.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ModeList(pub Vec<String>);

impl ModeList {
    /// The single mode-matching policy: a dependency is selected for a
    /// requested mode iff that mode is declared on the edge. An edge with no
    /// declared modes never matches, including the default mode.
    pub fn matches(&self, mode: &str) -> bool {
        self.0.iter().any(|m| m == mode)
    }

    fn union_from(&mut self, other: &ModeList) {
        for mode in &other.0 {
            if !self.matches(mode) {
                self.0.push(mode.clone());
            }
        }
    }
}

/// An insertion-ordered list of `(name, template)` variable definitions.
///
/// YAML mappings lose their order in a regular map type; variable definitions
/// may reference earlier ones, so declaration order is semantically
/// significant and preserved here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarList(pub Vec<(String, String)>);

impl<'de> Deserialize<'de> for VarList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VarListVisitor;

        impl<'de> de::Visitor<'de> for VarListVisitor {
            type Value = VarList;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a mapping of variable names to scalar values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut pairs = Vec::new();
                while let Some((key, value)) =
                    access.next_entry::<String, serde_yaml::Value>()?
                {
                    let rendered = match value {
                        serde_yaml::Value::String(s) => s,
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        serde_yaml::Value::Null => String::new(),
                        other => {
                            return Err(de::Error::custom(format!(
                                "variable '{}' must be a scalar, got {:?}",
                                key, other
                            )));
                        }
                    };
                    pairs.push((key, rendered));
                }
                Ok(VarList(pairs))
            }
        }

        deserializer.deserialize_map(VarListVisitor)
    }
}

/// The static, declarative description of one component.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentDefinition {
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub compose_file: Option<String>,
    #[serde(default)]
    pub extends: Option<String>,
    /// Name of the component whose container hosts this one; exec/wrap are
    /// redirected there.
    #[serde(default)]
    pub hosted_in: Option<String>,
    #[serde(default)]
    pub exec_path: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub after_clone_hook: Option<String>,
    /// Templates provide shared defaults via `extends` and are excluded from
    /// "all components" enumeration.
    #[serde(default)]
    pub is_template: bool,
    /// In an overlay document: wholly supersede the base entry instead of
    /// merging field-by-field.
    #[serde(default)]
    pub replace: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, ModeList>,
    #[serde(default)]
    pub variables: VarList,
}

impl ComponentDefinition {
    /// Merges an overlay entry onto this one. Override wins where it is
    /// non-empty; `replace: true` on the overlay discards the base entirely.
    pub fn merge(mut self, other: ComponentDefinition) -> ComponentDefinition {
        if other.replace {
            return other;
        }

        if !other.path.is_empty() {
            self.path = other.path;
        }
        if other.compose_file.is_some() {
            self.compose_file = other.compose_file;
        }
        if other.extends.is_some() {
            self.extends = other.extends;
        }
        if other.hosted_in.is_some() {
            self.hosted_in = other.hosted_in;
        }
        if other.exec_path.is_some() {
            self.exec_path = other.exec_path;
        }
        if other.repository.is_some() {
            self.repository = other.repository;
        }
        if other.after_clone_hook.is_some() {
            self.after_clone_hook = other.after_clone_hook;
        }
        if other.alias.is_some() {
            self.alias = other.alias;
        }
        if !other.tags.is_empty() {
            self.tags = other.tags;
        }

        // Later definitions win through ordered rendering, so overlay
        // variables go after the base ones.
        self.variables.0.extend(other.variables.0);

        for (dep, modes) in other.dependencies {
            self.dependencies.entry(dep).or_default().union_from(&modes);
        }

        self
    }

    /// Names of the dependencies activated for the given mode, in declaration
    /// order (the map is sorted, so the order is deterministic).
    pub fn deps_for_mode(&self, mode: &str) -> Vec<&str> {
        self.dependencies
            .iter()
            .filter(|(_, modes)| modes.matches(mode))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// The top-level workspace document, before and after normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub elc_min_version: Option<String>,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentDefinition>,
    #[serde(default)]
    pub variables: VarList,
    #[serde(default)]
    pub aliases: HashMap<String, String>,

    // Legacy three-collection schema, folded into `components` by normalize().
    #[serde(default)]
    templates: BTreeMap<String, ComponentDefinition>,
    #[serde(default)]
    services: BTreeMap<String, ComponentDefinition>,
    #[serde(default)]
    modules: BTreeMap<String, ComponentDefinition>,
}

impl WorkspaceConfig {
    /// Parses one YAML document and normalizes the legacy schema.
    /// `label` only identifies the source in error messages.
    pub fn from_yaml(text: &str, label: &str) -> Result<WorkspaceConfig, ConfigError> {
        let mut config: WorkspaceConfig =
            serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
                path: label.to_string(),
                source,
            })?;
        config.normalize(label)?;
        Ok(config)
    }

    /// Migrates the legacy `templates`/`services`/`modules` collections into
    /// the unified component map, tagging template-origin entries. A name
    /// declared in more than one collection is a hard error; the legacy
    /// behavior on collisions was undefined.
    fn normalize(&mut self, label: &str) -> Result<(), ConfigError> {
        for (name, mut definition) in std::mem::take(&mut self.templates) {
            definition.is_template = true;
            if self.components.insert(name.clone(), definition).is_some() {
                return Err(ConfigError::DuplicateComponent(name));
            }
        }
        for collection in [
            std::mem::take(&mut self.services),
            std::mem::take(&mut self.modules),
        ] {
            for (name, definition) in collection {
                if self.components.insert(name.clone(), definition).is_some() {
                    return Err(ConfigError::DuplicateComponent(name));
                }
            }
        }

        log::debug!(
            "normalized '{}': {} component(s)",
            label,
            self.components.len()
        );
        Ok(())
    }

    /// Merges an overlay document (`env.yaml`) onto this base document.
    pub fn merge(mut self, overlay: WorkspaceConfig) -> WorkspaceConfig {
        for (name, definition) in overlay.components {
            let merged = match self.components.remove(&name) {
                Some(base) => base.merge(definition),
                None => definition,
            };
            self.components.insert(name, merged);
        }

        for (alias, target) in overlay.aliases {
            self.aliases.insert(alias, target);
        }

        // Overlay variables go first so base definitions can reference them
        // by name under ordered sequential rendering.
        let mut variables = overlay.variables;
        variables.0.extend(std::mem::take(&mut self.variables).0);
        self.variables = variables;

        self
    }
}
