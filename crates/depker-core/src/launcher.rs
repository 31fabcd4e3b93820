//! One invocation, start to finish: locate the runtime, pick the entry
//! script, delegate.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::{Invocation, LauncherConfig};
use crate::delegate::{self, GlueScript};
use crate::error::{LauncherError, SpawnError};
use crate::locator::{RuntimeLocation, RuntimeLocator};
use crate::reference::{ReferenceResolver, RuntimeReference};
use crate::reporter::Reporter;
use crate::version::{RedirectProbe, VersionResolver};

/// Name of the container CLI looked up for `depker docker`.
const DOCKER: &str = "docker";

/// Drives the launcher pipeline for a single invocation.
#[derive(Debug)]
pub struct Launcher<'r> {
    config: LauncherConfig,
    invocation: Invocation,
    reporter: &'r dyn Reporter,
}

impl<'r> Launcher<'r> {
    /// Create a launcher for one invocation.
    pub fn new(config: LauncherConfig, invocation: Invocation, reporter: &'r dyn Reporter) -> Self {
        Self {
            config,
            invocation,
            reporter,
        }
    }

    /// Process state in effect.
    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// Default command: run the entry script with the user's arguments.
    pub fn run(&self, args: &[OsString]) -> Result<i32, LauncherError> {
        let runtime = self.runtime()?;
        let reference = self.reference()?;
        let glue = GlueScript::write(&reference)?;
        let code = delegate::run(&runtime.path, &delegate::run_args(glue.path(), args))?;
        Ok(code)
    }

    /// Re-fetch the entry script and its dependencies.
    pub fn reload(&self) -> Result<i32, LauncherError> {
        let runtime = self.runtime()?;
        self.reload_with(&runtime)
    }

    /// Reinstall the managed runtime, then reload the entry script.
    ///
    /// A runtime on the search path is left alone and keeps winning.
    pub fn update(&self) -> Result<i32, LauncherError> {
        let locator = RuntimeLocator::from_config(&self.config, self.reporter)?;
        if locator.purge()? {
            self.reporter.info("Removed managed deno runtime");
        }
        let runtime = locator.locate(&self.invocation)?;
        if !runtime.managed {
            self.reporter.warning(&format!(
                "Using deno from PATH ({}); it is not updated by depker",
                runtime.path.display()
            ));
        }
        self.reload_with(&runtime)
    }

    /// Pass `args` straight to the runtime.
    pub fn deno(&self, args: &[OsString]) -> Result<i32, LauncherError> {
        let runtime = self.runtime()?;
        Ok(delegate::run(&runtime.path, args)?)
    }

    /// Pass `args` straight to `docker` from the search path.
    pub fn docker(&self, args: &[OsString]) -> Result<i32, LauncherError> {
        let program = self
            .invocation
            .search_path
            .as_ref()
            .and_then(|path| which::which_in(DOCKER, Some(path), &self.invocation.cwd).ok())
            .ok_or_else(|| SpawnError::Spawn {
                program: PathBuf::from(DOCKER),
                source: io::Error::new(io::ErrorKind::NotFound, "not found on PATH"),
            })?;
        Ok(delegate::run(&program, args)?)
    }

    /// A usable runtime, installed on demand.
    pub fn runtime(&self) -> Result<RuntimeLocation, LauncherError> {
        let locator = RuntimeLocator::from_config(&self.config, self.reporter)?;
        Ok(locator.locate(&self.invocation)?)
    }

    /// Entry script for this invocation: explicit override, local candidate
    /// or the published module.
    pub fn reference(&self) -> Result<RuntimeReference, LauncherError> {
        if let Some(value) = &self.config.config_override {
            debug!(%value, "using explicit entry script");
            return Ok(ReferenceResolver::explicit(value, &self.invocation.cwd)?);
        }
        ReferenceResolver::from_config(&self.config)
            .resolve(&self.invocation.cwd, || self.script_ref())
    }

    /// The published module at the configured version.
    pub fn remote_reference(&self) -> Result<RuntimeReference, LauncherError> {
        let version = self.script_ref()?;
        Ok(ReferenceResolver::from_config(&self.config).remote(&version))
    }

    fn reload_with(&self, runtime: &RuntimeLocation) -> Result<i32, LauncherError> {
        let reference = self.reference()?;
        info!(%reference, "reloading entry script");
        Ok(delegate::run(&runtime.path, &delegate::reload_args(&reference))?)
    }

    fn script_ref(&self) -> Result<String, LauncherError> {
        let resolver = VersionResolver::new(RedirectProbe::new(&self.config.releases)?);
        let version = resolver.resolve_ref(&self.config.script_version)?;
        debug!(%version, "entry script version");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;

    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::reporter::NullReporter;
    use crate::version::VersionToken;

    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            fs::create_dir_all(dir.path().join("project")).unwrap();
            fs::create_dir_all(dir.path().join("tools")).unwrap();
            Self { dir }
        }

        fn project(&self) -> PathBuf {
            self.dir.path().join("project")
        }

        fn tools(&self) -> PathBuf {
            self.dir.path().join("tools")
        }

        fn config(&self) -> LauncherConfig {
            let home = self.dir.path().join("home");
            LauncherConfig::from_env(move |key| match key {
                "DEPKER_HOME" => Some(home.to_string_lossy().into_owned()),
                // Unroutable; any network access fails the test.
                "DEPKER_RELEASES" | "DEPKER_DENO_RELEASES" => Some("http://127.0.0.1:9".into()),
                _ => None,
            })
        }

        fn invocation(&self) -> Invocation {
            Invocation::new(self.project(), Some(self.tools().into_os_string()))
        }

        #[cfg(unix)]
        fn fake_tool(&self, name: &str, exit: i32) {
            use std::os::unix::fs::PermissionsExt;

            let path = self.tools().join(name);
            let log = self.dir.path().join(format!("{name}.args"));
            let script = format!(
                "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nexit {exit}\n",
                log.display()
            );
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        fn logged_args(&self, name: &str) -> Vec<String> {
            fs::read_to_string(self.dir.path().join(format!("{name}.args")))
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    #[derive(Debug, Default)]
    struct Recorder {
        warnings: RefCell<Vec<String>>,
    }

    impl Reporter for Recorder {
        fn section(&self, _: &str) {}
        fn downloading(&self, _: &str) {}
        fn extracting(&self, _: &Path) {}
        fn info(&self, _: &str) {}
        fn success(&self, _: &str) {}
        fn warning(&self, msg: &str) {
            self.warnings.borrow_mut().push(msg.to_string());
        }
        fn error(&self, _: &str) {}
    }

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_local_script_needs_no_network() {
        let sandbox = Sandbox::new();
        fs::write(sandbox.project().join("depker.config.ts"), "").unwrap();
        let launcher = Launcher::new(sandbox.config(), sandbox.invocation(), &NullReporter);

        let reference = launcher.reference().unwrap();
        assert!(reference.is_local());
    }

    #[test]
    fn test_default_reference_is_master_module() {
        let sandbox = Sandbox::new();
        let launcher = Launcher::new(sandbox.config(), sandbox.invocation(), &NullReporter);

        assert_eq!(
            launcher.reference().unwrap().as_str(),
            "https://raw.githubusercontent.com/syfxlin/depker/master/mod.ts"
        );
    }

    #[test]
    fn test_pinned_script_version() {
        let sandbox = Sandbox::new();
        let mut config = sandbox.config();
        config.script_version = VersionToken::Tag("v5.0.1".into());
        let launcher = Launcher::new(config, sandbox.invocation(), &NullReporter);

        assert_eq!(
            launcher.remote_reference().unwrap().as_str(),
            "https://raw.githubusercontent.com/syfxlin/depker/v5.0.1/mod.ts"
        );
    }

    #[test]
    fn test_latest_script_version_probes_releases() {
        let mut server = mockito::Server::new();
        let probe = server
            .mock("HEAD", "/latest")
            .with_status(302)
            .with_header("location", "/syfxlin/depker/releases/tag/v5.2.0")
            .expect(1)
            .create();

        let sandbox = Sandbox::new();
        let mut config = sandbox.config();
        config.script_version = VersionToken::Latest;
        config.releases = server.url();
        let launcher = Launcher::new(config, sandbox.invocation(), &NullReporter);

        assert_eq!(
            launcher.reference().unwrap().as_str(),
            "https://raw.githubusercontent.com/syfxlin/depker/v5.2.0/mod.ts"
        );
        probe.assert();
    }

    #[test]
    fn test_override_beats_candidates() {
        let sandbox = Sandbox::new();
        fs::write(sandbox.project().join("depker.config.ts"), "").unwrap();
        let config = sandbox
            .config()
            .with_config_override(Some("https://example.test/deploy.ts".into()));
        let launcher = Launcher::new(config, sandbox.invocation(), &NullReporter);

        assert_eq!(
            launcher.reference().unwrap(),
            RuntimeReference::Remote("https://example.test/deploy.ts".into())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_delegates_through_glue_script() {
        let sandbox = Sandbox::new();
        sandbox.fake_tool("deno", 4);
        let launcher = Launcher::new(sandbox.config(), sandbox.invocation(), &NullReporter);

        let code = launcher.run(&os(&["deploy", "--all"])).unwrap();
        assert_eq!(code, 4);

        let args = sandbox.logged_args("deno");
        assert_eq!(&args[..3], ["run", "-q", "-A"]);
        assert!(Path::new(&args[3]).extension().is_some_and(|ext| ext == "ts"));
        assert!(!Path::new(&args[3]).exists());
        assert_eq!(&args[4..], ["deploy", "--all"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_reload_and_passthrough() {
        let sandbox = Sandbox::new();
        sandbox.fake_tool("deno", 0);
        sandbox.fake_tool("docker", 9);
        let launcher = Launcher::new(sandbox.config(), sandbox.invocation(), &NullReporter);

        assert_eq!(launcher.reload().unwrap(), 0);
        assert_eq!(
            sandbox.logged_args("deno"),
            [
                "cache",
                "--reload",
                "https://raw.githubusercontent.com/syfxlin/depker/master/mod.ts"
            ]
        );

        assert_eq!(launcher.deno(&os(&["--version"])).unwrap(), 0);
        assert_eq!(sandbox.logged_args("deno"), ["--version"]);

        assert_eq!(launcher.docker(&os(&["ps", "-a"])).unwrap(), 9);
        assert_eq!(sandbox.logged_args("docker"), ["ps", "-a"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_update_reinstalls_managed_runtime() {
        use std::io::{Cursor, Write};

        use zip::write::SimpleFileOptions;

        use crate::paths::InstallLocation;
        use crate::platform::PlatformTarget;

        let sandbox = Sandbox::new();
        let target = PlatformTarget::current();
        let location = InstallLocation::new(sandbox.dir.path().join("home"));
        location.ensure().unwrap();
        let managed = location.executable(target);
        fs::write(&managed, "#!/bin/sh\nexit 1\n").unwrap();

        let log = sandbox.dir.path().join("deno.args");
        let fresh = format!("#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nexit 5\n", log.display());
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(
                target.executable_name(),
                SimpleFileOptions::default().unix_permissions(0o755),
            )
            .unwrap();
        writer.write_all(fresh.as_bytes()).unwrap();
        let archive_body = writer.finish().unwrap().into_inner();

        let mut server = mockito::Server::new();
        let latest = server
            .mock("HEAD", "/latest")
            .with_status(302)
            .with_header("location", "/denoland/deno/releases/tag/v2.0.0")
            .expect(1)
            .create();
        let archive = server
            .mock("GET", format!("/download/v2.0.0/{}", target.asset_name()).as_str())
            .with_status(200)
            .with_body(archive_body)
            .expect(1)
            .create();

        let mut config = sandbox.config();
        config.runtime_releases = server.url();
        let launcher = Launcher::new(config, sandbox.invocation(), &NullReporter);

        assert_eq!(launcher.update().unwrap(), 5);
        assert_eq!(fs::read_to_string(&managed).unwrap(), fresh);
        assert_eq!(
            sandbox.logged_args("deno"),
            [
                "cache",
                "--reload",
                "https://raw.githubusercontent.com/syfxlin/depker/master/mod.ts"
            ]
        );
        latest.assert();
        archive.assert();
    }

    #[cfg(unix)]
    #[test]
    fn test_update_leaves_path_runtime_alone() {
        let sandbox = Sandbox::new();
        sandbox.fake_tool("deno", 0);
        let recorder = Recorder::default();
        let launcher = Launcher::new(sandbox.config(), sandbox.invocation(), &recorder);

        assert_eq!(launcher.update().unwrap(), 0);
        assert!(sandbox.tools().join("deno").exists());
        assert_eq!(sandbox.logged_args("deno")[..2], ["cache", "--reload"]);

        let warnings = recorder.warnings.borrow();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("from PATH"), "{warnings:?}");
    }

    #[test]
    fn test_missing_docker_is_127() {
        let sandbox = Sandbox::new();
        let launcher = Launcher::new(
            sandbox.config(),
            Invocation::new(sandbox.project(), None),
            &NullReporter,
        );

        let err = launcher.docker(&[]).unwrap_err();
        assert_eq!(err.exit_code(), 127);
    }

    #[test]
    fn test_install_failure_is_exit_code_2() {
        let sandbox = Sandbox::new();
        let launcher = Launcher::new(
            sandbox.config(),
            Invocation::new(sandbox.project(), None),
            &NullReporter,
        );

        let err = launcher.run(&[]).unwrap_err();
        assert!(matches!(err, LauncherError::Install(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
