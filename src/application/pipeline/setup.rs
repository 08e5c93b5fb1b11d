//! Provisioning steps
//!
//! Every step is safe to re-run: each command checks before it changes
//! anything, or overwrites with the same content.

use crate::config::ServerConfig;
use crate::domain::ports::{PipelineEvent, PipelineKind};
use crate::shell::{quote, quote_all};

use super::{PipelineRun, PipelineStep, RemoteAction, SetupContext, StepRunner};

/// Always installed before the configured packages.
const BASE_PACKAGES: &[&str] = &["python3", "python3-venv", "python3-pip", "git"];

const KNOWN_HOSTS: &str = "~/.ssh/known_hosts";

/// Always registered ahead of `ssh_known_hosts`, so clones over SSH from
/// GitHub pass host-key checking under BatchMode.
const DEFAULT_KNOWN_HOSTS: &[&str] = &["github.com"];

pub fn setup_steps<'a>() -> Vec<PipelineStep<SetupContext<'a>>> {
    vec![
        PipelineStep::fatal("Create directory structure", create_directories),
        PipelineStep::fatal("Install system packages", install_packages),
        PipelineStep::fatal("Register known hosts", register_known_hosts),
        PipelineStep::fatal("Create virtual environment", create_venv),
        PipelineStep::fatal("Upload secrets", upload_secrets),
        PipelineStep::fatal("Install service file", install_service_file),
    ]
}

/// Provision one server.
pub fn run_setup(runner: &mut StepRunner<'_>, config: &ServerConfig) -> PipelineRun {
    let steps = setup_steps();
    let mut run = PipelineRun::new(steps.len());

    runner.emit(PipelineEvent::ServerStarted {
        host: runner.host().to_string(),
        kind: PipelineKind::Setup,
        step_count: steps.len(),
    });

    let ctx = SetupContext {
        config,
        mode: runner.mode(),
    };
    runner.run_steps(&steps, &ctx, &mut run);
    run
}

fn create_directories(ctx: &SetupContext<'_>) -> Vec<RemoteAction> {
    let config = ctx.config;
    let shared = config.shared_dir();
    let owner = format!("{0}:{0}", config.project_user);

    vec![RemoteAction::run(format!(
        "sudo mkdir -p {} && sudo chown -R {} {}",
        quote_all([config.releases_dir(), shared.clone(), format!("{}/media", shared)]),
        quote(&owner),
        quote(&config.project_root),
    ))]
}

fn install_packages(ctx: &SetupContext<'_>) -> Vec<RemoteAction> {
    let quiet = if ctx.mode.verbose { "" } else { " -qq" };
    let packages = BASE_PACKAGES
        .iter()
        .map(|p| p.to_string())
        .chain(ctx.config.system_packages.iter().cloned());

    std::iter::once(RemoteAction::run(format!("sudo apt-get update{}", quiet)))
        .chain(packages.map(|package| {
            let package = quote(&package);
            RemoteAction::run(format!(
                "dpkg -s {0} >/dev/null 2>&1 || sudo apt-get install -y{1} {0}",
                package, quiet
            ))
        }))
        .collect()
}

fn register_known_hosts(ctx: &SetupContext<'_>) -> Vec<RemoteAction> {
    let mut hosts: Vec<&str> = DEFAULT_KNOWN_HOSTS.to_vec();
    for host in &ctx.config.ssh_known_hosts {
        if !hosts.contains(&host.as_str()) {
            hosts.push(host.as_str());
        }
    }

    std::iter::once(RemoteAction::run("mkdir -p ~/.ssh && chmod 700 ~/.ssh"))
        .chain(hosts.into_iter().map(|host| {
            let host = quote(host);
            RemoteAction::run(format!(
                "ssh-keygen -F {0} -f {1} >/dev/null 2>&1 || ssh-keyscan {0} >> {1}",
                host, KNOWN_HOSTS
            ))
        }))
        .collect()
}

fn create_venv(ctx: &SetupContext<'_>) -> Vec<RemoteAction> {
    let venv = quote(&ctx.config.venv_dir);
    vec![RemoteAction::run(format!(
        "test -x {0}/bin/python || python3 -m venv {0}",
        venv
    ))]
}

fn upload_secrets(ctx: &SetupContext<'_>) -> Vec<RemoteAction> {
    let shared = ctx.config.shared_dir();
    ctx.config
        .secrets
        .iter()
        .map(|secret| {
            RemoteAction::upload(
                secret.clone(),
                format!("{}/{}", shared, super::deploy::secret_name(secret)),
            )
        })
        .collect()
}

fn install_service_file(ctx: &SetupContext<'_>) -> Vec<RemoteAction> {
    let (Some(local), Some(name)) = (&ctx.config.service_file, ctx.config.service_name()) else {
        return Vec::new();
    };
    let staged = format!("/tmp/{}", name);

    vec![
        RemoteAction::upload(local.clone(), staged.clone()),
        RemoteAction::run(format!(
            "sudo mv {} {} && sudo systemctl daemon-reload",
            quote(&staged),
            quote(&format!("/etc/systemd/system/{}", name)),
        )),
    ]
}
