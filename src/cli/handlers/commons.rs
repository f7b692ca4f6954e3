// src/cli/handlers/commons.rs

// Shared plumbing used by every command handler: workspace location and
// component selection.

use std::env;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};

use crate::cli::Cli;
use crate::constants::WORKSPACE_ENV_VAR;
use crate::core::component::Component;
use crate::core::context::ResolutionError;
use crate::core::workspace::{Workspace, find_workspace_root};
use crate::models::GlobalOptions;
use crate::system::{Platform, RealPlatform};

/// Maps the top-level CLI flags onto runtime options. Command handlers fill
/// in their own fields (mode, force, uid, ...) afterwards.
pub fn global_options(cli: &Cli) -> GlobalOptions {
    GlobalOptions {
        workspace: cli.workspace.clone(),
        component: cli.component.clone(),
        tag: cli.tag.clone(),
        debug: cli.debug,
        dry_run: cli.dry_run,
        ..Default::default()
    }
}

/// Locates the workspace root and loads it: the explicit `--workspace` flag,
/// else the `STAX_WORKSPACE` environment variable, else the nearest ancestor
/// of the current directory containing `workspace.yaml`.
pub fn load_workspace(options: &GlobalOptions) -> Result<Workspace> {
    let platform: Rc<dyn Platform> = Rc::new(RealPlatform);
    let cwd = env::current_dir().context("could not determine the current directory")?;

    let root = if let Some(root) = &options.workspace {
        root.clone()
    } else if let Ok(root) = env::var(WORKSPACE_ENV_VAR) {
        PathBuf::from(root)
    } else {
        find_workspace_root(&cwd, platform.as_ref()).ok_or_else(|| {
            anyhow!(
                "no workspace.yaml found here or in any parent directory; \
                 pass --workspace or set {}",
                WORKSPACE_ENV_VAR
            )
        })?
    };

    log::debug!("using workspace root {}", root.display());
    Workspace::load(&root, &cwd, platform)
}

/// Resolves which components a command acts on, in precedence order:
/// `--tag` (every match, error when none), `-c NAME`, positional names, the
/// component containing the current directory. Returned names are canonical
/// (aliases resolved).
pub fn resolve_component_names(
    ws: &Workspace,
    options: &GlobalOptions,
    positional: &[String],
) -> Result<Vec<String>> {
    if let Some(tag) = &options.tag {
        let names = ws.component_names_by_tag(tag);
        if names.is_empty() {
            return Err(ResolutionError::NoComponentsWithTag(tag.clone()).into());
        }
        return Ok(names);
    }

    if let Some(name) = &options.component {
        return Ok(vec![ws.component_by_name(name)?.name.clone()]);
    }

    if !positional.is_empty() {
        return positional
            .iter()
            .map(|name| Ok(ws.component_by_name(name)?.name.clone()))
            .collect();
    }

    Ok(vec![ws.component_name_by_path()?.to_string()])
}

/// Selection for commands that address exactly one container; a broader
/// selection is an error rather than a guess.
pub fn single_component<'a>(
    ws: &'a Workspace,
    options: &GlobalOptions,
    positional: &[String],
) -> Result<&'a Component> {
    let names = resolve_component_names(ws, options, positional)?;
    match names.as_slice() {
        [name] => Ok(ws.component_by_name(name)?),
        _ => Err(anyhow!(
            "this command acts on exactly one component, but {} are selected",
            names.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkspaceConfig;
    use std::path::Path;

    fn workspace(cwd: &str) -> Workspace {
        let config = WorkspaceConfig::from_yaml(
            "name: ensi\n\
             aliases:\n\
             \x20 gw: api\n\
             services:\n\
             \x20 api:\n\
             \x20\x20  path: /ws/apps/api\n\
             \x20\x20  tags: [backend]\n\
             \x20 db:\n\
             \x20\x20  path: /ws/apps/db\n",
            "test.yaml",
        )
        .unwrap();
        Workspace::from_config(config, Path::new("/ws"), Path::new(cwd), Rc::new(RealPlatform))
            .unwrap()
    }

    #[test]
    fn test_tag_selection_wins_over_everything() {
        let ws = workspace("/ws/apps/db");
        let options = GlobalOptions {
            tag: Some("backend".to_string()),
            component: Some("db".to_string()),
            ..Default::default()
        };
        let names = resolve_component_names(&ws, &options, &["db".to_string()]).unwrap();
        assert_eq!(names, vec!["api"]);
    }

    #[test]
    fn test_unmatched_tag_is_an_error() {
        let ws = workspace("/ws");
        let options = GlobalOptions {
            tag: Some("frontend".to_string()),
            ..Default::default()
        };
        let err = resolve_component_names(&ws, &options, &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolutionError>(),
            Some(ResolutionError::NoComponentsWithTag(tag)) if tag == "frontend"
        ));
    }

    #[test]
    fn test_component_flag_resolves_aliases() {
        let ws = workspace("/ws");
        let options = GlobalOptions {
            component: Some("gw".to_string()),
            ..Default::default()
        };
        let names = resolve_component_names(&ws, &options, &[]).unwrap();
        assert_eq!(names, vec!["api"]);
    }

    #[test]
    fn test_positional_names_then_cwd_fallback() {
        let ws = workspace("/ws/apps/db/src");
        let options = GlobalOptions::default();

        let names =
            resolve_component_names(&ws, &options, &["api".to_string(), "db".to_string()])
                .unwrap();
        assert_eq!(names, vec!["api", "db"]);

        let by_path = resolve_component_names(&ws, &options, &[]).unwrap();
        assert_eq!(by_path, vec!["db"]);
    }

    #[test]
    fn test_single_component_rejects_broad_selection() {
        let ws = workspace("/ws");
        let options = GlobalOptions::default();
        assert!(
            single_component(&ws, &options, &["api".to_string(), "db".to_string()]).is_err()
        );
        let api = single_component(&ws, &options, &["api".to_string()]).unwrap();
        assert_eq!(api.name, "api");
    }
}
