//! Deploying a release against a (fake) server.

use crate::common::*;

fn position(commands: &[String], needle: &str) -> usize {
    commands
        .iter()
        .position(|c| c.contains(needle))
        .unwrap_or_else(|| panic!("no command containing {needle:?} in {commands:#?}"))
}

#[test]
fn deploy_runs_every_step_in_order() {
    let env = TestEnv::new();
    let env_file = env.write_file("shop.env", ENV_FILE);
    env.write_manifest(
        "shop",
        "production",
        &manifest(&["web1"], &format!("env_file: {}", env_file.display())),
    );

    let result = env.run(&["deploy", "production", "shop", "--json"]);

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    let json = result.json();
    let server = &json["servers"][0];
    assert_eq!(server["outcome"], "succeeded");
    assert_eq!(server["steps_completed"], 9);
    let release = server["release_id"].as_str().unwrap().to_string();

    let commands = env.remote_commands();
    let listing = position(&commands, "ls -1A");
    let mkdir = position(&commands, &format!("mkdir -p /srv/shop/releases/{release}"));
    let clone = position(&commands, "git clone");
    let pip = position(&commands, "pip install");
    let migrate = position(&commands, "manage.py migrate");
    let activate = position(&commands, "mv -Tf");
    let restart = position(&commands, "systemctl restart shop.service");
    assert!(listing < mkdir && mkdir < clone && clone < pip);
    assert!(pip < migrate && migrate < activate && activate < restart);

    assert!(commands[clone].contains("--depth 1"));
    assert!(commands[activate].contains(&format!(
        "ln -sfn /srv/shop/releases/{release} /srv/shop/.current-{release}"
    )));

    // env file goes up with scp under the release-specific name
    let calls = env.remote_calls();
    assert!(calls
        .iter()
        .any(|c| c.starts_with("scp ") && c.contains(&format!("/srv/shop/shared/.env.{release}"))));
}

#[test]
fn failed_fetch_leaves_current_release_untouched() {
    let env = TestEnv::new();
    env.write_manifest("shop", "production", &manifest(&["web1"], ""));

    let result = env.run_with_env(
        &["deploy", "production", "shop", "--json"],
        &[("FAKE_SSH_FAIL", "git clone")],
    );

    assert_eq!(result.exit_code, 1);
    let server = &result.json()["servers"][0];
    assert_eq!(server["outcome"], "failed");
    assert_eq!(server["failed_step"], "Fetch source");
    assert!(server["error"].as_str().unwrap().contains("simulated failure"));

    let commands = env.remote_commands();
    assert!(!commands.iter().any(|c| c.contains("mv -Tf")));
    assert!(!commands.iter().any(|c| c.contains("systemctl restart")));
    // abandoned release directory is cleaned up
    assert!(commands.last().unwrap().contains("rm -rf /srv/shop/releases/"));
    assert!(result.stderr.contains("Fetch source failed"), "stderr: {}", result.stderr);
}

#[test]
fn restart_failure_after_cutover_is_partial() {
    let env = TestEnv::new();
    env.write_manifest("shop", "production", &manifest(&["web1"], ""));

    let result = env.run_with_env(
        &["deploy", "production", "shop"],
        &[("FAKE_SSH_FAIL", "systemctl restart")],
    );

    assert_eq!(result.exit_code, 1);
    assert!(env.remote_commands().iter().any(|c| c.contains("mv -Tf")));
    assert!(result.stdout.contains("live, but Restart service failed"), "stdout: {}", result.stdout);
}

#[test]
fn old_releases_beyond_keep_are_pruned() {
    let env = TestEnv::new();
    env.write_manifest("shop", "production", &manifest(&["web1"], ""));

    let result = env.run_with_env(
        &["deploy", "production", "shop"],
        &[(
            "FAKE_SSH_RELEASES",
            "20240101000000 20240102000000 20240103000000",
        )],
    );

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    let commands = env.remote_commands();
    // keep_releases: 2 -> one old release survives next to the new one
    assert!(commands.iter().any(|c| c.contains("rm -rf /srv/shop/releases/20240101000000")));
    assert!(commands.iter().any(|c| c.contains("rm -rf /srv/shop/releases/20240102000000")));
    assert!(!commands.iter().any(|c| c.contains("rm -rf /srv/shop/releases/20240103000000")));
}
