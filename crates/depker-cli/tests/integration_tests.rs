//! End-to-end tests driving the `depker` binary with a fake runtime on PATH.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Unroutable; a test that reaches it fails instead of hitting the internet.
const OFFLINE: &str = "http://127.0.0.1:9";

/// Sandbox with a project directory, a launcher home and a PATH directory.
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        for dir in ["project", "home", "tools"] {
            fs::create_dir_all(temp_dir.path().join(dir)).expect("failed to create sandbox dir");
        }
        Self { temp_dir }
    }

    fn project(&self) -> PathBuf {
        self.temp_dir.path().join("project")
    }

    fn home(&self) -> PathBuf {
        self.temp_dir.path().join("home")
    }

    fn tools(&self) -> PathBuf {
        self.temp_dir.path().join("tools")
    }

    /// Install a fake `deno` that records its arguments (and the glue
    /// module for `run`) and exits with `code`.
    fn fake_deno(&self, code: i32) {
        let root = self.temp_dir.path().display();
        let script = format!(
            r#"#!/bin/sh
printf '%s\n' "$@" > '{root}/deno.args'
if [ "$1" = "run" ]; then
  while IFS= read -r line; do printf '%s\n' "$line"; done < "$4" > '{root}/glue.ts'
fi
exit {code}
"#
        );
        let path = self.tools().join("deno");
        fs::write(&path, script).expect("failed to write fake deno");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("failed to chmod fake deno");
    }

    fn deno_args(&self) -> Vec<String> {
        fs::read_to_string(self.temp_dir.path().join("deno.args"))
            .expect("fake deno was not run")
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn glue(&self) -> String {
        fs::read_to_string(self.temp_dir.path().join("glue.ts")).expect("no glue module captured")
    }

    fn depker_cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_depker");
        let mut cmd = Command::new(bin_path);
        cmd.env_clear()
            .current_dir(self.project())
            .env("PATH", self.tools())
            .env("DEPKER_HOME", self.home())
            .env("DEPKER_RELEASES", OFFLINE)
            .env("DEPKER_DENO_RELEASES", OFFLINE);
        cmd
    }

    fn run(&self, cmd: &mut Command) -> Output {
        cmd.output().expect("failed to run depker")
    }
}

#[test]
fn test_update_reloads_latest_release() {
    let mut server = mockito::Server::new();
    let probe = server
        .mock("HEAD", "/latest")
        .with_status(302)
        .with_header("location", "/syfxlin/depker/releases/tag/v2.0.0")
        .expect(1)
        .create();

    let ctx = TestContext::new();
    ctx.fake_deno(7);
    let output = ctx.run(
        ctx.depker_cmd()
            .env("DEPKER_VERSION", "latest")
            .env("DEPKER_RELEASES", server.url())
            .arg("update"),
    );

    assert_eq!(output.status.code(), Some(7));
    assert_eq!(
        ctx.deno_args(),
        [
            "cache",
            "--reload",
            "https://raw.githubusercontent.com/syfxlin/depker/v2.0.0/mod.ts"
        ]
    );
    probe.assert();
}

#[test]
fn test_default_run_uses_local_config() {
    let ctx = TestContext::new();
    ctx.fake_deno(0);
    fs::write(ctx.project().join("depker.config.ts"), "export default {};\n").unwrap();

    let output = ctx.run(ctx.depker_cmd().args(["deploy", "--prod"]));

    assert!(output.status.success(), "{output:?}");
    let args = ctx.deno_args();
    assert_eq!(&args[..3], ["run", "-q", "-A"]);
    assert_eq!(&args[4..], ["deploy", "--prod"]);

    let glue = ctx.glue();
    assert!(glue.contains("await import(\"file://"));
    assert!(glue.contains("/project/depker.config.ts\")"));
    assert!(glue.contains("await depker.execute();"));
    assert!(!PathBuf::from(&args[3]).exists(), "glue module left behind");
}

#[test]
fn test_help_is_forwarded_to_script() {
    let ctx = TestContext::new();
    ctx.fake_deno(0);

    let output = ctx.run(ctx.depker_cmd().arg("--help"));

    assert!(output.status.success(), "{output:?}");
    let args = ctx.deno_args();
    assert_eq!(args.last().map(String::as_str), Some("--help"));
    assert!(
        ctx.glue()
            .contains("https://raw.githubusercontent.com/syfxlin/depker/master/mod.ts")
    );
}

#[test]
fn test_config_flag_overrides_discovery() {
    let ctx = TestContext::new();
    ctx.fake_deno(0);
    fs::write(ctx.project().join("depker.config.ts"), "").unwrap();

    let output = ctx.run(
        ctx.depker_cmd()
            .args(["--config", "https://example.test/ops.ts", "reload"]),
    );

    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        ctx.deno_args(),
        ["cache", "--reload", "https://example.test/ops.ts"]
    );
}

#[test]
fn test_deno_passthrough() {
    let ctx = TestContext::new();
    ctx.fake_deno(3);

    let output = ctx.run(ctx.depker_cmd().args(["deno", "fmt", "--check"]));

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(ctx.deno_args(), ["fmt", "--check"]);
}

#[test]
fn test_create_scaffolds_once() {
    let ctx = TestContext::new();

    let output = ctx.run(ctx.depker_cmd().env("DEPKER_VERSION", "v5.1.0").arg("create"));
    assert!(output.status.success(), "{output:?}");

    let source = fs::read_to_string(ctx.project().join("depker.config.ts")).unwrap();
    assert!(source.contains("https://raw.githubusercontent.com/syfxlin/depker/v5.1.0/mod.ts"));

    let output = ctx.run(ctx.depker_cmd().arg("create"));
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
}

#[test]
fn test_install_failure_exits_non_zero() {
    let ctx = TestContext::new();

    let output = ctx.run(ctx.depker_cmd().arg("deploy"));

    assert_eq!(output.status.code(), Some(2));
    assert!(!output.stderr.is_empty());
    assert!(output.stdout.is_empty());
    assert!(!ctx.home().join("bin").join("deno").exists());
}

#[test]
fn test_missing_docker() {
    let ctx = TestContext::new();

    let output = ctx.run(ctx.depker_cmd().args(["docker", "ps"]));

    assert_eq!(output.status.code(), Some(127));
}
