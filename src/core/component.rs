// src/core/component.rs

use std::collections::HashSet;

use anyhow::Result;
use colored::Colorize;

use crate::constants::{COMPOSE_SERVICE, DEFAULT_COMPOSE_FILE};
use crate::core::context::{ResolutionError, VarContext};
use crate::core::workspace::Workspace;
use crate::models::{ComponentDefinition, GlobalOptions, WorkspaceConfig};
use crate::system::ExecutionError;

/// Per-invocation activation state threaded through the recursive `start`:
/// `started` gives once-per-invocation idempotence, `visiting` detects
/// dependency cycles.
#[derive(Debug, Default)]
pub struct Activation {
    started: HashSet<String>,
    visiting: Vec<String>,
}

impl Activation {
    pub fn new() -> Activation {
        Activation::default()
    }
}

/// One runtime component: a definition bound to its fully resolved variable
/// context. Immutable once constructed; lifecycle state (cloned, running) is
/// observed through the external tool, never cached.
#[derive(Debug)]
pub struct Component {
    pub name: String,
    pub definition: ComponentDefinition,
    /// Owned copy of the extended template definition, resolved at
    /// construction time.
    pub template: Option<ComponentDefinition>,
    pub context: VarContext,
}

impl Component {
    /// Binds the named definition to its resolved context.
    ///
    /// Context resolution order is fixed: the workspace root context, then
    /// `APP_NAME`, `COMPOSE_PROJECT_NAME`, the rendered `path` as `SVC_PATH`;
    /// for extended components `TPL_PATH`, the template compose file as
    /// `COMPOSE_FILE` and the template variables; then the component's own
    /// compose file, the `${SVC_PATH}/docker-compose.yml` fallback, and the
    /// component's own variables. Each addition is rendered against the
    /// context as it stands, which is what lets later variables reference
    /// earlier ones but never the reverse.
    pub fn resolve(
        name: &str,
        config: &WorkspaceConfig,
        root: &VarContext,
    ) -> Result<Component, ResolutionError> {
        let definition = config
            .components
            .get(name)
            .ok_or_else(|| ResolutionError::UnknownComponent(name.to_string()))?
            .clone();

        let mut context = root.clone();
        context.add("APP_NAME", name);
        context.add(
            "COMPOSE_PROJECT_NAME",
            &format!("{}-{}", config.name, name),
        );
        let svc_path = context.render(&definition.path)?;
        context.add("SVC_PATH", &svc_path);

        let mut template = None;
        if let Some(extends) = &definition.extends {
            let tpl = config
                .components
                .get(extends)
                .filter(|t| t.is_template)
                .ok_or_else(|| ResolutionError::UnknownTemplate(extends.clone()))?
                .clone();

            let tpl_path = context.render(&tpl.path)?;
            context.add("TPL_PATH", &tpl_path);

            let tpl_compose = tpl
                .compose_file
                .clone()
                .unwrap_or_else(|| format!("${{TPL_PATH}}/{}", DEFAULT_COMPOSE_FILE));
            let compose_file = context.render(&tpl_compose)?;
            context.add("COMPOSE_FILE", &compose_file);

            for (var_name, var_template) in &tpl.variables.0 {
                let value = context.render(var_template)?;
                context.add(var_name, &value);
            }
            template = Some(tpl);
        }

        if let Some(compose_file) = &definition.compose_file {
            let value = context.render(compose_file)?;
            context.add("COMPOSE_FILE", &value);
        }
        if context.find("COMPOSE_FILE").is_none_or(str::is_empty) {
            let value = context.render(&format!("${{SVC_PATH}}/{}", DEFAULT_COMPOSE_FILE))?;
            context.add("COMPOSE_FILE", &value);
        }

        for (var_name, var_template) in &definition.variables.0 {
            let value = context.render(var_template)?;
            context.add(var_name, &value);
        }

        Ok(Component {
            name: name.to_string(),
            definition,
            template,
            context,
        })
    }

    fn compose_file(&self) -> String {
        self.context.find("COMPOSE_FILE").unwrap_or_default().to_string()
    }

    fn svc_path(&self) -> String {
        self.context.find("SVC_PATH").unwrap_or_default().to_string()
    }

    fn echo(&self, options: &GlobalOptions, command: &[String]) {
        if options.debug {
            println!("{}", format!(">> {}", command.join(" ")).dimmed());
        }
    }

    /// Runs `docker compose -f $COMPOSE_FILE <tail>` interactively with the
    /// component environment, returning the exit code.
    fn exec_compose_interactive(
        &self,
        ws: &Workspace,
        tail: &[String],
        options: &GlobalOptions,
    ) -> Result<i32, ExecutionError> {
        let mut command = vec![
            "docker".to_string(),
            "compose".to_string(),
            "-f".to_string(),
            self.compose_file(),
        ];
        command.extend_from_slice(tail);

        self.echo(options, &command);
        if options.dry_run {
            return Ok(0);
        }
        ws.platform.exec_interactive(&command, self.context.pairs())
    }

    /// Runs a compose subcommand capturing stdout; the command is expected to
    /// succeed.
    fn exec_compose_capture(
        &self,
        ws: &Workspace,
        tail: &[String],
        options: &GlobalOptions,
    ) -> Result<String, ExecutionError> {
        let mut command = vec![
            "docker".to_string(),
            "compose".to_string(),
            "-f".to_string(),
            self.compose_file(),
        ];
        command.extend_from_slice(tail);

        self.echo(options, &command);
        if options.dry_run {
            return Ok(String::new());
        }

        let (code, output) = ws.platform.exec_capture(&command, self.context.pairs())?;
        if code != 0 {
            return Err(ExecutionError::NonZeroExit {
                command: command.join(" "),
                code,
            });
        }
        Ok(output)
    }

    /// Runs an arbitrary host command with the component environment.
    fn exec_host_interactive(
        &self,
        ws: &Workspace,
        command: &[String],
        options: &GlobalOptions,
    ) -> Result<i32, ExecutionError> {
        self.echo(options, command);
        if options.dry_run {
            return Ok(0);
        }
        ws.platform.exec_interactive(command, self.context.pairs())
    }

    fn require_success(command: &str, code: i32) -> Result<(), ExecutionError> {
        if code != 0 {
            return Err(ExecutionError::NonZeroExit {
                command: command.to_string(),
                code,
            });
        }
        Ok(())
    }

    /// Whether the component's working copy exists on disk.
    pub fn is_cloned(&self, ws: &Workspace) -> bool {
        ws.platform.file_exists(std::path::Path::new(&self.svc_path()))
    }

    /// Whether any of the component's containers are running, observed via
    /// `docker compose ps`.
    pub fn is_running(&self, ws: &Workspace, options: &GlobalOptions) -> Result<bool, ExecutionError> {
        let tail = ["ps", "--status=running", "-q"].map(String::from);
        let output = self.exec_compose_capture(ws, &tail, options)?;
        Ok(!output.is_empty())
    }

    /// Brings the component up, activating its mode-matched dependencies
    /// first, depth-first. A component already activated in this invocation
    /// is a no-op; a dependency cycle is a hard error.
    pub fn start(
        &self,
        ws: &Workspace,
        options: &GlobalOptions,
        activation: &mut Activation,
    ) -> Result<()> {
        if activation.started.contains(&self.name) {
            return Ok(());
        }
        if activation.visiting.iter().any(|n| n == &self.name) {
            let mut path = activation.visiting.clone();
            path.push(self.name.clone());
            return Err(ResolutionError::DependencyCycle(path.join(" -> ")).into());
        }

        if !self.is_cloned(ws) {
            println!("component {} is not cloned", self.name.yellow());
            return Ok(());
        }

        activation.visiting.push(self.name.clone());
        let result = self.start_inner(ws, options, activation);
        activation.visiting.pop();
        result?;

        activation.started.insert(self.name.clone());
        Ok(())
    }

    fn start_inner(
        &self,
        ws: &Workspace,
        options: &GlobalOptions,
        activation: &mut Activation,
    ) -> Result<()> {
        let running = self.is_running(ws, options)?;

        if !running || options.force {
            for dep_name in self.definition.deps_for_mode(&options.mode) {
                let dep = ws.component_by_name(dep_name)?;
                dep.start(ws, options, activation)?;
            }
        }

        if !running {
            let tail = ["up", "-d"].map(String::from);
            let code = self.exec_compose_interactive(ws, &tail, options)?;
            Self::require_success("docker compose up -d", code)?;
        }

        Ok(())
    }

    /// Stops running containers; a stopped or uncloned component is a no-op.
    pub fn stop(&self, ws: &Workspace, options: &GlobalOptions) -> Result<()> {
        if !self.is_cloned(ws) {
            println!("component {} is not cloned", self.name.yellow());
            return Ok(());
        }
        if self.is_running(ws, options)? {
            let tail = ["stop"].map(String::from);
            let code = self.exec_compose_interactive(ws, &tail, options)?;
            Self::require_success("docker compose stop", code)?;
        }
        Ok(())
    }

    /// Removes the component's containers; no-op when nothing is running.
    pub fn destroy(&self, ws: &Workspace, options: &GlobalOptions) -> Result<()> {
        if !self.is_cloned(ws) {
            println!("component {} is not cloned", self.name.yellow());
            return Ok(());
        }
        if self.is_running(ws, options)? {
            let tail = ["down"].map(String::from);
            let code = self.exec_compose_interactive(ws, &tail, options)?;
            Self::require_success("docker compose down", code)?;
        }
        Ok(())
    }

    /// Stop-then-start, or destroy-then-start when `hard`. The subsequent
    /// start runs with the default mode and without force, so dependencies
    /// are not restarted.
    pub fn restart(
        &self,
        ws: &Workspace,
        hard: bool,
        options: &GlobalOptions,
        activation: &mut Activation,
    ) -> Result<()> {
        if hard {
            self.destroy(ws, options)?;
        } else {
            self.stop(ws, options)?;
        }

        let start_options = GlobalOptions {
            mode: GlobalOptions::default().mode,
            force: false,
            ..options.clone()
        };
        self.start(ws, &start_options, activation)
    }

    /// Passes a raw compose subcommand through against the resolved compose
    /// file and environment.
    pub fn compose(
        &self,
        ws: &Workspace,
        args: &[String],
        options: &GlobalOptions,
    ) -> Result<i32> {
        if !self.is_cloned(ws) {
            println!("component {} is not cloned", self.name.yellow());
            return Ok(1);
        }
        Ok(self.exec_compose_interactive(ws, args, options)?)
    }

    /// `-u` argument for exec/run: the explicit uid when given, else the
    /// context-provided USER_ID/GROUP_ID pair.
    fn user_args(&self, options: &GlobalOptions) -> Result<Vec<String>, ResolutionError> {
        if let Some(uid) = options.uid {
            return Ok(vec!["-u".to_string(), uid.to_string()]);
        }

        let user_id = self
            .context
            .find("USER_ID")
            .ok_or_else(|| ResolutionError::UnsetVariable("USER_ID".to_string()))?;
        let group_id = self
            .context
            .find("GROUP_ID")
            .ok_or_else(|| ResolutionError::UnsetVariable("GROUP_ID".to_string()))?;

        Ok(vec!["-u".to_string(), format!("{}:{}", user_id, group_id)])
    }

    fn tty_args(&self, ws: &Workspace, options: &GlobalOptions) -> Vec<String> {
        if options.no_tty || !ws.platform.is_terminal() {
            vec!["-T".to_string()]
        } else {
            Vec::new()
        }
    }

    /// Executes a command inside the running `app` container, starting the
    /// component first if needed.
    pub fn exec(
        &self,
        ws: &Workspace,
        args: &[String],
        options: &GlobalOptions,
        activation: &mut Activation,
    ) -> Result<i32> {
        self.start(ws, options, activation)?;

        let mut tail = vec!["exec".to_string()];
        if let Some(working_dir) = &options.working_dir {
            tail.push("-w".to_string());
            tail.push(working_dir.clone());
        }
        tail.extend(self.user_args(options)?);
        tail.extend(self.tty_args(ws, options));
        tail.push(COMPOSE_SERVICE.to_string());
        tail.extend_from_slice(args);

        Ok(self.exec_compose_interactive(ws, &tail, options)?)
    }

    /// Executes a command in a fresh one-off container
    /// (`compose run --rm`), bypassing the image entrypoint.
    pub fn run(
        &self,
        ws: &Workspace,
        args: &[String],
        options: &GlobalOptions,
    ) -> Result<i32> {
        if !self.is_cloned(ws) {
            println!("component {} is not cloned", self.name.yellow());
            return Ok(1);
        }

        let mut tail = ["run", "--rm", "--entrypoint="].map(String::from).to_vec();
        if let Some(working_dir) = &options.working_dir {
            tail.push("-w".to_string());
            tail.push(working_dir.clone());
        }
        tail.extend(self.user_args(options)?);
        tail.extend(self.tty_args(ws, options));
        tail.push(COMPOSE_SERVICE.to_string());
        tail.extend_from_slice(args);

        Ok(self.exec_compose_interactive(ws, &tail, options)?)
    }

    /// Runs an arbitrary host command with the component's environment.
    pub fn wrap(
        &self,
        ws: &Workspace,
        command: &[String],
        options: &GlobalOptions,
    ) -> Result<i32> {
        Ok(self.exec_host_interactive(ws, command, options)?)
    }

    fn after_clone_hook(&self) -> Option<&str> {
        self.definition
            .after_clone_hook
            .as_deref()
            .or_else(|| self.template.as_ref()?.after_clone_hook.as_deref())
    }

    /// Clones the component's repository into its path; afterwards runs the
    /// rendered after-clone hook unless suppressed. A failing clone aborts
    /// the hook.
    pub fn clone_repo(
        &self,
        ws: &Workspace,
        options: &GlobalOptions,
        no_hook: bool,
    ) -> Result<()> {
        if self.is_cloned(ws) {
            println!("component {} is already cloned", self.name.yellow());
            return Ok(());
        }

        let repository = self
            .definition
            .repository
            .as_ref()
            .ok_or_else(|| ResolutionError::MissingRepository(self.name.clone()))?;

        let command = vec![
            "git".to_string(),
            "clone".to_string(),
            repository.clone(),
            self.svc_path(),
        ];
        let code = self.exec_host_interactive(ws, &command, options)?;
        Self::require_success("git clone", code)?;

        if no_hook {
            return Ok(());
        }
        if let Some(hook) = self.after_clone_hook() {
            let rendered = self.context.render(hook)?;
            if let Some(hook_command) = shlex::split(&rendered).filter(|c| !c.is_empty()) {
                let code = self.exec_host_interactive(ws, &hook_command, options)?;
                Self::require_success(&rendered, code)?;
            }
        }
        Ok(())
    }

    /// The resolved context as `NAME=VALUE` lines, in context order.
    pub fn vars(&self) -> Vec<String> {
        self.context.to_env_list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::Platform;
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    /// A scripted `Platform`: records every command, tracks which compose
    /// files are "running", and reflects `up`/`stop`/`down` back into that
    /// state.
    #[derive(Debug, Default)]
    struct FakePlatform {
        calls: RefCell<Vec<Vec<String>>>,
        running: RefCell<HashSet<String>>,
        missing_paths: RefCell<HashSet<String>>,
        terminal: bool,
    }

    impl FakePlatform {
        fn commands_containing(&self, verb: &str) -> Vec<Vec<String>> {
            self.calls
                .borrow()
                .iter()
                .filter(|c| c.iter().any(|a| a == verb))
                .cloned()
                .collect()
        }

        fn set_running(&self, compose_file: &str) {
            self.running.borrow_mut().insert(compose_file.to_string());
        }
    }

    impl Platform for FakePlatform {
        fn exec_interactive(
            &self,
            command: &[String],
            _env: &[(String, String)],
        ) -> Result<i32, ExecutionError> {
            self.calls.borrow_mut().push(command.to_vec());
            let compose_file = command.get(3).cloned().unwrap_or_default();
            if command.iter().any(|a| a == "up") {
                self.running.borrow_mut().insert(compose_file);
            } else if command.iter().any(|a| a == "stop" || a == "down") {
                self.running.borrow_mut().remove(&compose_file);
            }
            Ok(0)
        }

        fn exec_capture(
            &self,
            command: &[String],
            _env: &[(String, String)],
        ) -> Result<(i32, String), ExecutionError> {
            self.calls.borrow_mut().push(command.to_vec());
            if command.iter().any(|a| a == "ps") {
                let compose_file = command.get(3).cloned().unwrap_or_default();
                if self.running.borrow().contains(&compose_file) {
                    return Ok((0, "abc123\n".to_string()));
                }
            }
            Ok((0, String::new()))
        }

        fn is_terminal(&self) -> bool {
            self.terminal
        }

        fn file_exists(&self, path: &Path) -> bool {
            !self
                .missing_paths
                .borrow()
                .contains(path.to_string_lossy().as_ref())
        }

        fn read_file(&self, path: &Path) -> std::io::Result<String> {
            Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                format!("no file access in tests: {}", path.display()),
            ))
        }
    }

    fn fixture(yaml: &str) -> (Rc<FakePlatform>, Workspace) {
        let config = WorkspaceConfig::from_yaml(yaml, "test.yaml").unwrap();
        let platform = Rc::new(FakePlatform::default());
        let ws = Workspace::from_config(
            config,
            Path::new("/ws"),
            Path::new("/ws"),
            platform.clone(),
        )
        .unwrap();
        (platform, ws)
    }

    fn compose_file_of(command: &[String]) -> &str {
        command.get(3).map(String::as_str).unwrap_or_default()
    }

    #[test]
    fn test_start_issues_single_up_against_resolved_compose_file() {
        // Scenario: one service, no dependencies.
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 test:\n\
             \x20\x20  path: ${WORKSPACE_PATH}/apps/test\n",
        );
        let comp = ws.component_by_name("test").unwrap();
        comp.start(&ws, &GlobalOptions::default(), &mut Activation::new())
            .unwrap();

        let calls = platform.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            [
                "docker",
                "compose",
                "-f",
                "/ws/apps/test/docker-compose.yml",
                "ps",
                "--status=running",
                "-q"
            ]
            .map(String::from)
        );
        assert_eq!(
            calls[1],
            [
                "docker",
                "compose",
                "-f",
                "/ws/apps/test/docker-compose.yml",
                "up",
                "-d"
            ]
            .map(String::from)
        );
    }

    #[test]
    fn test_start_skips_up_when_already_running() {
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 test:\n\
             \x20\x20  path: /apps/test\n",
        );
        platform.set_running("/apps/test/docker-compose.yml");

        let comp = ws.component_by_name("test").unwrap();
        comp.start(&ws, &GlobalOptions::default(), &mut Activation::new())
            .unwrap();

        assert!(platform.commands_containing("up").is_empty());
    }

    #[test]
    fn test_start_filters_dependencies_by_mode() {
        // Scenario: dep1 declares [default], dep2 [default, hook], dep3 [].
        // Starting with mode "hook" must bring up dep2 then test only.
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 dep1: {path: /apps/dep1}\n\
             \x20 dep2: {path: /apps/dep2}\n\
             \x20 dep3: {path: /apps/dep3}\n\
             \x20 test:\n\
             \x20\x20  path: /apps/test\n\
             \x20\x20  dependencies:\n\
             \x20\x20\x20   dep1: [default]\n\
             \x20\x20\x20   dep2: [default, hook]\n\
             \x20\x20\x20   dep3: []\n",
        );
        let options = GlobalOptions {
            mode: "hook".to_string(),
            ..Default::default()
        };

        let comp = ws.component_by_name("test").unwrap();
        comp.start(&ws, &options, &mut Activation::new()).unwrap();

        let ups: Vec<String> = platform
            .commands_containing("up")
            .iter()
            .map(|c| compose_file_of(c).to_string())
            .collect();
        assert_eq!(
            ups,
            vec![
                "/apps/dep2/docker-compose.yml",
                "/apps/test/docker-compose.yml"
            ]
        );
    }

    #[test]
    fn test_start_activates_shared_dependency_once() {
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 shared: {path: /apps/shared}\n\
             \x20 mid:\n\
             \x20\x20  path: /apps/mid\n\
             \x20\x20  dependencies: {shared: [default]}\n\
             \x20 top:\n\
             \x20\x20  path: /apps/top\n\
             \x20\x20  dependencies:\n\
             \x20\x20\x20   mid: [default]\n\
             \x20\x20\x20   shared: [default]\n",
        );
        let comp = ws.component_by_name("top").unwrap();
        comp.start(&ws, &GlobalOptions::default(), &mut Activation::new())
            .unwrap();

        let shared_ups = platform
            .commands_containing("up")
            .iter()
            .filter(|c| compose_file_of(c) == "/apps/shared/docker-compose.yml")
            .count();
        assert_eq!(shared_ups, 1);
    }

    #[test]
    fn test_start_detects_dependency_cycles() {
        let (_platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 a:\n\
             \x20\x20  path: /apps/a\n\
             \x20\x20  dependencies: {b: [default]}\n\
             \x20 b:\n\
             \x20\x20  path: /apps/b\n\
             \x20\x20  dependencies: {a: [default]}\n",
        );
        let comp = ws.component_by_name("a").unwrap();
        let err = comp
            .start(&ws, &GlobalOptions::default(), &mut Activation::new())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolutionError>(),
            Some(ResolutionError::DependencyCycle(path)) if path == "a -> b -> a"
        ));
    }

    #[test]
    fn test_start_unknown_dependency_is_resolution_error() {
        let (_platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 test:\n\
             \x20\x20  path: /apps/test\n\
             \x20\x20  dependencies: {ghost: [default]}\n",
        );
        let comp = ws.component_by_name("test").unwrap();
        let err = comp
            .start(&ws, &GlobalOptions::default(), &mut Activation::new())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolutionError>(),
            Some(ResolutionError::UnknownComponent(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_start_uncloned_component_is_a_noop() {
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 test: {path: /apps/test}\n",
        );
        platform
            .missing_paths
            .borrow_mut()
            .insert("/apps/test".to_string());

        let comp = ws.component_by_name("test").unwrap();
        comp.start(&ws, &GlobalOptions::default(), &mut Activation::new())
            .unwrap();
        assert!(platform.calls.borrow().is_empty());
    }

    #[test]
    fn test_dry_run_issues_no_commands() {
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 test: {path: /apps/test}\n",
        );
        let options = GlobalOptions {
            dry_run: true,
            ..Default::default()
        };
        let comp = ws.component_by_name("test").unwrap();
        comp.start(&ws, &options, &mut Activation::new()).unwrap();
        assert!(platform.calls.borrow().is_empty());
    }

    #[test]
    fn test_stop_and_destroy_only_act_on_running_components() {
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 test: {path: /apps/test}\n",
        );
        let options = GlobalOptions::default();
        let comp = ws.component_by_name("test").unwrap();

        comp.stop(&ws, &options).unwrap();
        assert!(platform.commands_containing("stop").is_empty());

        platform.set_running("/apps/test/docker-compose.yml");
        comp.stop(&ws, &options).unwrap();
        assert_eq!(platform.commands_containing("stop").len(), 1);

        platform.set_running("/apps/test/docker-compose.yml");
        comp.destroy(&ws, &options).unwrap();
        assert_eq!(platform.commands_containing("down").len(), 1);
    }

    #[test]
    fn test_hard_restart_is_down_then_up() {
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 test: {path: /apps/test}\n",
        );
        platform.set_running("/apps/test/docker-compose.yml");

        let comp = ws.component_by_name("test").unwrap();
        comp.restart(&ws, true, &GlobalOptions::default(), &mut Activation::new())
            .unwrap();

        let verbs: Vec<String> = platform
            .calls
            .borrow()
            .iter()
            .filter_map(|c| c.get(4).cloned())
            .filter(|v| v == "down" || v == "up")
            .collect();
        assert_eq!(verbs, vec!["down", "up"]);
    }

    #[test]
    fn test_exec_builds_user_and_tty_arguments() {
        let (platform, ws) = fixture(
            "name: ensi\n\
             variables:\n\
             \x20 USER_ID: 1000\n\
             \x20 GROUP_ID: 1000\n\
             services:\n\
             \x20 test: {path: /apps/test}\n",
        );
        platform.set_running("/apps/test/docker-compose.yml");

        let comp = ws.component_by_name("test").unwrap();
        let args = ["composer".to_string(), "install".to_string()];
        let code = comp
            .exec(&ws, &args, &GlobalOptions::default(), &mut Activation::new())
            .unwrap();
        assert_eq!(code, 0);

        let execs = platform.commands_containing("exec");
        assert_eq!(execs.len(), 1);
        assert_eq!(
            execs[0][4..],
            ["exec", "-u", "1000:1000", "-T", "app", "composer", "install"]
                .map(String::from)
        );
    }

    #[test]
    fn test_exec_explicit_uid_and_working_dir() {
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 test: {path: /apps/test}\n",
        );
        platform.set_running("/apps/test/docker-compose.yml");

        let options = GlobalOptions {
            uid: Some(0),
            working_dir: Some("/var/www".to_string()),
            ..Default::default()
        };
        let comp = ws.component_by_name("test").unwrap();
        comp.exec(&ws, &["sh".to_string()], &options, &mut Activation::new())
            .unwrap();

        let execs = platform.commands_containing("exec");
        assert_eq!(
            execs[0][4..],
            ["exec", "-w", "/var/www", "-u", "0", "-T", "app", "sh"].map(String::from)
        );
    }

    #[test]
    fn test_exec_without_user_id_fails_naming_the_variable() {
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 test: {path: /apps/test}\n",
        );
        platform.set_running("/apps/test/docker-compose.yml");

        let comp = ws.component_by_name("test").unwrap();
        let err = comp
            .exec(
                &ws,
                &["sh".to_string()],
                &GlobalOptions::default(),
                &mut Activation::new(),
            )
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolutionError>(),
            Some(ResolutionError::UnsetVariable(name)) if name == "USER_ID"
        ));
    }

    #[test]
    fn test_template_inheritance_resolves_compose_file_and_variables() {
        let (_platform, ws) = fixture(
            "name: ensi\n\
             templates:\n\
             \x20 php:\n\
             \x20\x20  path: ${WORKSPACE_PATH}/templates/php\n\
             \x20\x20  variables:\n\
             \x20\x20\x20   PHP_VERSION: '8.3'\n\
             services:\n\
             \x20 api:\n\
             \x20\x20  path: ${WORKSPACE_PATH}/apps/api\n\
             \x20\x20  extends: php\n\
             \x20\x20  variables:\n\
             \x20\x20\x20   APP_KEY: key-${PHP_VERSION}\n",
        );
        let api = ws.component_by_name("api").unwrap();

        assert_eq!(api.context.find("TPL_PATH"), Some("/ws/templates/php"));
        assert_eq!(
            api.context.find("COMPOSE_FILE"),
            Some("/ws/templates/php/docker-compose.yml")
        );
        assert_eq!(api.context.find("PHP_VERSION"), Some("8.3"));
        // Component variables render against the inherited context.
        assert_eq!(api.context.find("APP_KEY"), Some("key-8.3"));
        assert_eq!(api.context.find("COMPOSE_PROJECT_NAME"), Some("ensi-api"));
    }

    #[test]
    fn test_component_compose_file_overrides_template() {
        let (_platform, ws) = fixture(
            "name: ensi\n\
             templates:\n\
             \x20 php: {path: /tpl/php}\n\
             services:\n\
             \x20 api:\n\
             \x20\x20  path: /apps/api\n\
             \x20\x20  extends: php\n\
             \x20\x20  compose_file: ${SVC_PATH}/compose.override.yml\n",
        );
        let api = ws.component_by_name("api").unwrap();
        assert_eq!(
            api.context.find("COMPOSE_FILE"),
            Some("/apps/api/compose.override.yml")
        );
    }

    #[test]
    fn test_extends_must_reference_a_template() {
        let err = WorkspaceConfig::from_yaml(
            "name: ensi\n\
             services:\n\
             \x20 plain: {path: /apps/plain}\n\
             \x20 api:\n\
             \x20\x20  path: /apps/api\n\
             \x20\x20  extends: plain\n",
            "test.yaml",
        )
        .map(|config| {
            Workspace::from_config(
                config,
                Path::new("/ws"),
                Path::new("/ws"),
                Rc::new(FakePlatform::default()),
            )
        })
        .unwrap()
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolutionError>(),
            Some(ResolutionError::UnknownTemplate(name)) if name == "plain"
        ));
    }

    #[test]
    fn test_vars_lists_context_in_order() {
        // Scenario: a global chain followed by the standard variables.
        let (_platform, ws) = fixture(
            "name: ensi\n\
             variables:\n\
             \x20 V_GL: vglobal\n\
             \x20 V_GL_SIMPLE_VAR: ${V_GL}-a\n\
             services:\n\
             \x20 test: {path: /apps/test}\n",
        );
        let vars = ws.component_by_name("test").unwrap().vars();

        let gl = vars.iter().position(|v| v == "V_GL=vglobal").unwrap();
        let simple = vars
            .iter()
            .position(|v| v == "V_GL_SIMPLE_VAR=vglobal-a")
            .unwrap();
        assert!(gl < simple);
        assert!(vars.contains(&"APP_NAME=test".to_string()));
        assert!(vars.contains(&"COMPOSE_FILE=/apps/test/docker-compose.yml".to_string()));
    }

    #[test]
    fn test_clone_repo_runs_git_and_hook() {
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 test:\n\
             \x20\x20  path: /apps/test\n\
             \x20\x20  repository: git@example.com:ensi/test.git\n\
             \x20\x20  after_clone_hook: composer install --working-dir ${SVC_PATH}\n",
        );
        platform
            .missing_paths
            .borrow_mut()
            .insert("/apps/test".to_string());

        let comp = ws.component_by_name("test").unwrap();
        comp.clone_repo(&ws, &GlobalOptions::default(), false).unwrap();

        let calls = platform.calls.borrow();
        assert_eq!(
            calls[0],
            ["git", "clone", "git@example.com:ensi/test.git", "/apps/test"].map(String::from)
        );
        assert_eq!(
            calls[1],
            ["composer", "install", "--working-dir", "/apps/test"].map(String::from)
        );
    }

    #[test]
    fn test_clone_repo_without_repository_fails() {
        let (platform, ws) = fixture(
            "name: ensi\n\
             services:\n\
             \x20 test: {path: /apps/test}\n",
        );
        platform
            .missing_paths
            .borrow_mut()
            .insert("/apps/test".to_string());

        let comp = ws.component_by_name("test").unwrap();
        let err = comp
            .clone_repo(&ws, &GlobalOptions::default(), false)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolutionError>(),
            Some(ResolutionError::MissingRepository(name)) if name == "test"
        ));
    }
}
