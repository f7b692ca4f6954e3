// src/core/workspace.rs

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use crate::constants::{ENV_CONFIG_FILENAME, WORKSPACE_CONFIG_FILENAME};
use crate::core::component::Component;
use crate::core::context::{ResolutionError, VarContext};
use crate::models::{ConfigError, WorkspaceConfig};
use crate::system::Platform;

/// A minimal `MAJOR.MINOR.PATCH` version, enough to enforce the
/// `elc_min_version` gate. Pre-release/build suffixes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Version([u64; 3]);

impl FromStr for Version {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let numeric = s
            .split(['-', '+'])
            .next()
            .unwrap_or_default();
        let mut fields = [0u64; 3];
        let mut parts = numeric.split('.');
        for field in &mut fields {
            match parts.next() {
                Some(part) => {
                    *field = part
                        .parse()
                        .map_err(|_| ConfigError::InvalidVersion(s.to_string()))?;
                }
                None => break,
            }
        }
        if parts.next().is_some() {
            return Err(ConfigError::InvalidVersion(s.to_string()));
        }
        Ok(Version(fields))
    }
}

/// Rejects the workspace when the running binary is not strictly newer than
/// the required minimum.
fn check_version(required: &str, current: &str) -> Result<(), ConfigError> {
    let required_version: Version = required.parse()?;
    let current_version: Version = current.parse()?;

    if current_version <= required_version {
        return Err(ConfigError::VersionTooOld {
            required: required.to_string(),
            current: current.to_string(),
        });
    }
    Ok(())
}

/// Finds the workspace root for a working directory: the nearest ancestor
/// (including `cwd` itself) containing `workspace.yaml`.
pub fn find_workspace_root(cwd: &Path, platform: &dyn Platform) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| platform.file_exists(&dir.join(WORKSPACE_CONFIG_FILENAME)))
        .map(|dir| dunce::simplified(dir).to_path_buf())
}

/// The root scope of one CLI invocation: the merged configuration document,
/// the root variable context and one runtime component per definition.
/// Built once, read-only afterwards.
#[derive(Debug)]
pub struct Workspace {
    pub root: PathBuf,
    pub cwd: PathBuf,
    pub config: WorkspaceConfig,
    pub context: VarContext,
    pub components: BTreeMap<String, Component>,
    aliases: HashMap<String, String>,
    pub platform: Rc<dyn Platform>,
}

impl Workspace {
    /// Loads `workspace.yaml` (mandatory) and `env.yaml` (optional overlay)
    /// from `root`, merges and freezes them into a workspace.
    pub fn load(
        root: &Path,
        cwd: &Path,
        platform: Rc<dyn Platform>,
    ) -> anyhow::Result<Workspace> {
        let base_path = root.join(WORKSPACE_CONFIG_FILENAME);
        let base_text =
            platform
                .read_file(&base_path)
                .map_err(|source| match source.kind() {
                    std::io::ErrorKind::NotFound => {
                        ConfigError::NotFound(base_path.display().to_string())
                    }
                    _ => ConfigError::Read {
                        path: base_path.display().to_string(),
                        source,
                    },
                })?;
        let base = WorkspaceConfig::from_yaml(&base_text, &base_path.display().to_string())?;
        if base.name.is_empty() {
            return Err(ConfigError::MissingName(base_path.display().to_string()).into());
        }

        let env_path = root.join(ENV_CONFIG_FILENAME);
        let config = if platform.file_exists(&env_path) {
            let env_text = platform.read_file(&env_path).map_err(|source| {
                ConfigError::Read {
                    path: env_path.display().to_string(),
                    source,
                }
            })?;
            let overlay =
                WorkspaceConfig::from_yaml(&env_text, &env_path.display().to_string())?;
            base.merge(overlay)
        } else {
            base
        };

        Workspace::from_config(config, root, cwd, platform)
    }

    /// Builds the workspace from an already merged document: version gate,
    /// root context, component instantiation, alias registration.
    pub fn from_config(
        config: WorkspaceConfig,
        root: &Path,
        cwd: &Path,
        platform: Rc<dyn Platform>,
    ) -> anyhow::Result<Workspace> {
        if let Some(required) = &config.elc_min_version {
            check_version(required, crate::VERSION)?;
        }

        let context = Workspace::create_context(&config, root)?;

        let mut components = BTreeMap::new();
        for name in config.components.keys() {
            let component = Component::resolve(name, &config, &context)?;
            components.insert(name.clone(), component);
        }

        let mut aliases = HashMap::new();
        for (alias, target) in &config.aliases {
            aliases.insert(alias.clone(), target.clone());
        }
        for (name, definition) in &config.components {
            if let Some(alias) = &definition.alias {
                aliases.insert(alias.clone(), name.clone());
            }
        }

        log::debug!(
            "workspace '{}' loaded: {} component(s), {} alias(es)",
            config.name,
            components.len(),
            aliases.len()
        );

        Ok(Workspace {
            root: root.to_path_buf(),
            cwd: cwd.to_path_buf(),
            config,
            context,
            components,
            aliases,
            platform,
        })
    }

    /// The root context: `WORKSPACE_PATH`, `WORKSPACE_NAME`, then every
    /// global variable rendered in declared order against the context as
    /// built so far.
    fn create_context(
        config: &WorkspaceConfig,
        root: &Path,
    ) -> Result<VarContext, ResolutionError> {
        let mut context = VarContext::new();
        let root_str = root.to_string_lossy();
        context.add("WORKSPACE_PATH", root_str.trim_end_matches('/'));
        context.add("WORKSPACE_NAME", &config.name);

        for (name, template) in &config.variables.0 {
            let value = context.render(template)?;
            context.add(name, &value);
        }

        Ok(context)
    }

    /// Looks a component up by name or registered alias.
    pub fn component_by_name(&self, name: &str) -> Result<&Component, ResolutionError> {
        let canonical = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.components
            .get(canonical)
            .ok_or_else(|| ResolutionError::UnknownComponent(name.to_string()))
    }

    /// The component whose resolved path contains the current working
    /// directory.
    pub fn component_by_path(&self) -> Result<&Component, ResolutionError> {
        self.components
            .values()
            .find(|component| {
                component
                    .context
                    .find("SVC_PATH")
                    .is_some_and(|svc_path| self.cwd.starts_with(svc_path))
            })
            .ok_or(ResolutionError::NotInComponentFolder)
    }

    pub fn component_name_by_path(&self) -> Result<&str, ResolutionError> {
        self.component_by_path().map(|component| component.name.as_str())
    }

    /// Every startable component: templates and hosted components are
    /// excluded.
    pub fn component_names(&self) -> Vec<String> {
        self.components
            .values()
            .filter(|c| !c.definition.is_template && c.definition.hosted_in.is_none())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn component_names_by_tag(&self, tag: &str) -> Vec<String> {
        self.components
            .values()
            .filter(|c| !c.definition.is_template && c.definition.tags.iter().any(|t| t == tag))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Resolves `hosted_in` redirection: the component whose container
    /// actually hosts the given one, or the component itself.
    pub fn host_component<'a>(
        &'a self,
        component: &'a Component,
    ) -> Result<&'a Component, ResolutionError> {
        match &component.definition.hosted_in {
            Some(host) => self.component_by_name(host),
            None => Ok(component),
        }
    }
}
