//! Provisioning a server.

use crate::common::*;

#[test]
fn setup_installs_packages_and_uploads_files() {
    let env = TestEnv::new();
    let secret = env.write_file("secrets/credentials.json", "{}");
    let service = env.write_file("shop.service", "[Service]\n");
    env.write_manifest(
        "shop",
        "production",
        &format!(
            "common:\n  source_code_url: https://git.example.com/shop.git\n  branch: main\n  \
             project_root: /srv/shop\n  project_user: deploy\n  venv_dir: /srv/venvs/shop\n  \
             system_packages: nginx;redis-server\n  ssh_known_hosts: github.com\n  \
             secrets: {}\n  service_file: {}\nservers:\n  - host: web1\n",
            secret.display(),
            service.display()
        ),
    );

    let result = env.run(&["setup", "production", "shop"]);

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    let commands = env.remote_commands();
    assert!(commands[0].contains("sudo mkdir -p /srv/shop/releases /srv/shop/shared"));
    assert!(commands.iter().any(|c| c.contains("dpkg -s nginx")));
    assert!(commands.iter().any(|c| c.contains("dpkg -s redis-server")));
    assert!(commands.iter().any(|c| c.contains("ssh-keyscan github.com")));
    assert!(commands.iter().any(|c| c.contains("python3 -m venv /srv/venvs/shop")));
    assert!(commands.iter().any(|c| c.contains("systemctl daemon-reload")));

    let uploads: Vec<String> = env
        .remote_calls()
        .into_iter()
        .filter(|c| c.starts_with("scp "))
        .collect();
    assert_eq!(uploads.len(), 2, "uploads: {uploads:#?}");
    assert!(uploads[0].ends_with("deploy@web1:/srv/shop/shared/credentials.json"));
    assert!(uploads[1].ends_with("deploy@web1:/tmp/shop.service"));
}

#[test]
fn setup_stops_at_first_failing_step() {
    let env = TestEnv::new();
    env.write_manifest("shop", "production", &manifest(&["web1"], ""));

    let result = env.run_with_env(
        &["setup", "production", "shop", "--json"],
        &[("FAKE_SSH_FAIL", "apt-get update")],
    );

    assert_eq!(result.exit_code, 1);
    let server = &result.json()["servers"][0];
    assert_eq!(server["failed_step"], "Install system packages");
    assert_eq!(server["steps_completed"], 1);
    assert!(!env.remote_commands().iter().any(|c| c.contains("python3 -m venv")));
}
