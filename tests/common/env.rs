//! Isolated environment for driving the `pystrano` binary.
//!
//! `ssh` and `scp` are replaced (through `PYSTRANO_SSH`/`PYSTRANO_SCP`) by
//! shell scripts that append their arguments to a shared log. The fake
//! `ssh` can be steered with environment variables:
//!
//! - `FAKE_SSH_FAIL`: remote commands containing this text exit 1
//! - `FAKE_SSH_DOWN`: the control master for this host fails to connect
//! - `FAKE_SSH_RELEASES`: names printed for any directory listing

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Result of running the CLI
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}

pub struct TestEnv {
    pub root: TempDir,
    bin: PathBuf,
    log: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let log = root.path().join("remote.log");
        let bin_dir = root.path().join("bin");
        std::fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");

        write_script(&bin_dir.join("ssh"), &fake_ssh(&log));
        write_script(&bin_dir.join("scp"), &fake_scp(&log));

        Self {
            root,
            bin: PathBuf::from(env!("CARGO_BIN_EXE_pystrano")),
            log,
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Write `deploy/<app>/<environment>/deployment.yml`
    pub fn write_manifest(&self, app: &str, environment: &str, content: &str) -> PathBuf {
        self.write_file(
            &format!("deploy/{}/{}/deployment.yml", app, environment),
            content,
        )
    }

    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Every ssh/scp invocation, in order
    pub fn remote_calls(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Remote commands that were actually executed (not master control)
    pub fn remote_commands(&self) -> Vec<String> {
        self.remote_calls()
            .into_iter()
            .filter(|c| c.starts_with("ssh ") && !c.contains(" -M ") && !c.contains(" -O exit "))
            .collect()
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.root.path())
            .args(args)
            .env("PYSTRANO_SSH", self.path("bin/ssh"))
            .env("PYSTRANO_SCP", self.path("bin/scp"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("FAKE_SSH_FAIL")
            .env_remove("FAKE_SSH_DOWN")
            .env_remove("FAKE_SSH_RELEASES");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute pystrano");
        to_result(output)
    }
}

fn to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

fn write_script(path: &Path, content: &str) {
    std::fs::write(path, content).expect("Failed to write script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod script");
}

fn fake_ssh(log: &Path) -> String {
    format!(
        r#"#!/bin/sh
for last; do :; done
printf 'ssh %s\n' "$*" >> '{log}'
case " $* " in
  *" -M "*)
    if [ -n "$FAKE_SSH_DOWN" ]; then
      case "$last" in
        *"@$FAKE_SSH_DOWN") echo "ssh: connect to host $FAKE_SSH_DOWN port 22: Connection refused" >&2; exit 255 ;;
      esac
    fi
    exit 0 ;;
  *" -O exit "*) exit 0 ;;
esac
case "$last" in
  "if [ -d "*)
    if [ -n "$FAKE_SSH_RELEASES" ]; then printf '%s\n' $FAKE_SSH_RELEASES; fi
    exit 0 ;;
esac
if [ -n "$FAKE_SSH_FAIL" ]; then
  case "$last" in
    *"$FAKE_SSH_FAIL"*) echo "fatal: simulated failure" >&2; exit 1 ;;
  esac
fi
exit 0
"#,
        log = log.display()
    )
}

fn fake_scp(log: &Path) -> String {
    format!(
        "#!/bin/sh\nprintf 'scp %s\\n' \"$*\" >> '{log}'\nexit 0\n",
        log = log.display()
    )
}
