//! Dry run: connect and read, never mutate.

use crate::common::*;

#[test]
fn dry_run_deploy_issues_no_mutating_commands() {
    let env = TestEnv::new();
    env.write_manifest("shop", "production", &manifest(&["web1"], ""));

    let result = env.run_with_env(
        &["deploy", "production", "shop", "--dry-run"],
        &[("FAKE_SSH_RELEASES", "20240101000000 20240102000000")],
    );

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);

    // only the read-only release listing reaches the server
    let commands = env.remote_commands();
    assert_eq!(commands.len(), 1, "commands: {commands:#?}");
    assert!(commands[0].contains("ls -1A /srv/shop/releases"));
    assert!(!env.remote_calls().iter().any(|c| c.starts_with("scp ")));

    // but every step is still logged
    assert!(result.stderr.contains("[dry-run] run: git clone"), "stderr: {}", result.stderr);
    assert!(result.stderr.contains("[dry-run] run: ln -sfn"));
    assert!(result.stderr.contains("[dry-run] run: rm -rf /srv/shop/releases/20240101000000"));
    assert!(result.stdout.contains("Deploy Dry Run Complete"), "stdout: {}", result.stdout);
}

#[test]
fn dry_run_setup_issues_no_commands_at_all() {
    let env = TestEnv::new();
    env.write_manifest("shop", "production", &manifest(&["web1"], "system_packages: nginx"));

    let result = env.run(&["setup", "production", "shop", "--dry-run", "--json"]);

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    assert!(env.remote_commands().is_empty());

    let json = result.json();
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["servers"][0]["steps_completed"], 6);
    assert!(result.stderr.contains("[dry-run] run: sudo apt-get update"));
}
