// src/constants.rs

/// The name of the mandatory workspace configuration file.
pub const WORKSPACE_CONFIG_FILENAME: &str = "workspace.yaml";

/// The name of the optional per-developer overlay, merged onto the base document.
pub const ENV_CONFIG_FILENAME: &str = "env.yaml";

/// Environment variable that overrides workspace discovery.
pub const WORKSPACE_ENV_VAR: &str = "STAX_WORKSPACE";

/// The dependency activation mode used when none is requested explicitly.
pub const DEFAULT_MODE: &str = "default";

/// The compose service every `exec`/`run` command targets inside a component.
pub const COMPOSE_SERVICE: &str = "app";

/// Compose file name appended to a component (or template) path when no
/// `compose_file` is declared.
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";
