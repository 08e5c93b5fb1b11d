//! Fan-out over several servers.

use crate::common::*;

#[test]
fn unreachable_server_does_not_stop_the_others() {
    let env = TestEnv::new();
    env.write_manifest("shop", "production", &manifest(&["web1", "web2", "web3"], ""));

    let result = env.run_with_env(
        &["deploy", "production", "shop", "--json"],
        &[("FAKE_SSH_DOWN", "web2")],
    );

    assert_eq!(result.exit_code, 1);
    let json = result.json();
    let servers = json["servers"].as_array().unwrap();
    let outcomes: Vec<(&str, &str)> = servers
        .iter()
        .map(|s| (s["host"].as_str().unwrap(), s["outcome"].as_str().unwrap()))
        .collect();
    assert_eq!(
        outcomes,
        vec![("web1", "succeeded"), ("web2", "failed"), ("web3", "succeeded")]
    );
    assert_eq!(servers[1]["failed_step"], "Connect");
    assert!(servers[1]["error"].as_str().unwrap().contains("Connection refused"));
}

#[test]
fn parallel_run_reports_servers_in_manifest_order() {
    let env = TestEnv::new();
    let hosts = ["web1", "web2", "web3", "web4"];
    env.write_manifest("shop", "production", &manifest(&hosts, ""));

    let result = env.run(&["deploy", "production", "shop", "--parallel", "3", "--json"]);

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    let json = result.json();
    let reported: Vec<&str> = json["servers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["host"].as_str().unwrap())
        .collect();
    assert_eq!(reported, hosts);

    let activations = env
        .remote_commands()
        .iter()
        .filter(|c| c.contains("mv -Tf"))
        .count();
    assert_eq!(activations, hosts.len());
}

#[test]
fn per_server_override_wins_over_common() {
    let env = TestEnv::new();
    env.write_manifest(
        "shop",
        "production",
        &format!(
            "{}    branch: hotfix\n    port: 2222\n",
            manifest(&["web1", "web2"], "")
        ),
    );

    let result = env.run(&["deploy", "production", "shop", "--dry-run", "--json"]);

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    assert!(result.stderr.contains("--branch main"));
    assert!(result.stderr.contains("--branch hotfix"));
    assert!(env
        .remote_calls()
        .iter()
        .any(|c| c.contains("-p 2222") && c.ends_with("deploy@web2")));
}
