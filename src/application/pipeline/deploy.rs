//! Release deployment steps
//!
//! Each deploy builds a fresh directory under `releases/`. Nothing touches
//! the live release until "Activate release", which swaps the `current`
//! symlink with a single `ln` + `mv -T` command (rename is atomic on POSIX
//! filesystems, so `current` never dangles).

use std::path::Path;
use std::time::Instant;

use crate::config::{render_env, ServerConfig};
use crate::domain::ports::{PipelineEvent, PipelineKind};
use crate::domain::services::ReleasePlanner;
use crate::error::PipelineError;
use crate::shell::quote;

use super::{DeployContext, PipelineRun, PipelineStep, RemoteAction, StepRunner};

/// Label reported when the releases listing itself fails
pub const PLAN_LABEL: &str = "Plan release";

pub fn deploy_steps<'a>() -> Vec<PipelineStep<DeployContext<'a>>> {
    vec![
        PipelineStep::fatal("Create release directory", create_release_dir),
        PipelineStep::fatal("Fetch source", fetch_source),
        PipelineStep::fatal("Link shared resources", link_shared),
        PipelineStep::fatal("Install dependencies", install_dependencies),
        PipelineStep::fatal("Run migrations", run_migrations),
        PipelineStep::fatal("Collect static files", collect_static),
        PipelineStep::fatal("Activate release", activate_release).commits(),
        PipelineStep::fatal("Restart service", restart_service),
        PipelineStep::fatal("Prune old releases", prune_releases),
    ]
}

/// Deploy a new release to one server.
///
/// The releases listing is read first (also in dry-run) so the plan is
/// accurate. A failure before activation removes the half-built release on
/// a best-effort basis; the previous release stays live either way.
pub fn run_deploy(
    runner: &mut StepRunner<'_>,
    config: &ServerConfig,
    planner: &ReleasePlanner,
) -> PipelineRun {
    let steps = deploy_steps();
    let mut run = PipelineRun::new(steps.len());

    runner.emit(PipelineEvent::ServerStarted {
        host: runner.host().to_string(),
        kind: PipelineKind::Deploy,
        step_count: steps.len(),
    });

    let started = Instant::now();
    let existing = match runner.list_directory(&config.releases_dir()) {
        Ok(existing) => existing,
        Err(err) => {
            let elapsed = started.elapsed();
            runner.emit(PipelineEvent::StepFailed {
                host: runner.host().to_string(),
                label: PLAN_LABEL,
                elapsed,
                error: err.to_string(),
            });
            run.error = Some(PipelineError {
                step: PLAN_LABEL,
                host: runner.host().to_string(),
                elapsed,
                cause: err.into(),
            });
            return run;
        }
    };

    let release = planner.plan(config.keep_releases, &existing);
    runner.emit(PipelineEvent::ReleasePlanned {
        host: runner.host().to_string(),
        release_id: release.release_id.to_string(),
        first_release: release.is_first_release,
        prune: release.releases_to_prune.clone(),
    });

    let ctx = DeployContext {
        config,
        release: &release,
        mode: runner.mode(),
    };
    runner.run_steps(&steps, &ctx, &mut run);

    // A failed swap may still have moved `current`; keep its target.
    let failed_at_cutover = run.error.as_ref().is_some_and(|err| {
        steps
            .iter()
            .any(|step| step.point_of_no_return && step.label == err.step)
    });
    if run.error.is_some() && !run.committed && !failed_at_cutover && run.steps_completed > 0 {
        runner.best_effort(&discard_command(&ctx));
    }

    run.release = Some(release);
    run
}

/// Name a secret gets in `shared/` and in each release
pub(super) fn secret_name(path: &Path) -> String {
    crate::config::file_name(path).unwrap_or_else(|| path.display().to_string().replace('/', "_"))
}

fn env_link(ctx: &DeployContext<'_>) -> String {
    format!("{}/.env.{}", ctx.config.shared_dir(), ctx.release_id())
}

fn temp_link(ctx: &DeployContext<'_>) -> String {
    format!("{}/.current-{}", ctx.config.project_root, ctx.release_id())
}

/// Prefix that exports the release's `.env` into a command's environment
fn env_prefix(ctx: &DeployContext<'_>) -> &'static str {
    if ctx.config.env_file.is_some() {
        "set -a && . ./.env && set +a && "
    } else {
        ""
    }
}

fn discard_command(ctx: &DeployContext<'_>) -> String {
    format!(
        "rm -rf {} && rm -f {} {}",
        quote(&ctx.release_dir()),
        quote(&env_link(ctx)),
        quote(&temp_link(ctx)),
    )
}

fn create_release_dir(ctx: &DeployContext<'_>) -> Vec<RemoteAction> {
    vec![RemoteAction::run(format!(
        "mkdir -p {}",
        quote(&ctx.release_dir())
    ))]
}

fn fetch_source(ctx: &DeployContext<'_>) -> Vec<RemoteAction> {
    let config = ctx.config;
    let dir = quote(&ctx.release_dir());

    let mut clone = String::from("git clone");
    if !ctx.mode.verbose {
        clone.push_str(" --quiet");
    }
    clone.push_str(" --single-branch");
    if let Some(depth) = config.effective_clone_depth() {
        clone.push_str(&format!(" --depth {}", depth));
    }
    clone.push_str(&format!(
        " --branch {} {} {}",
        quote(&config.branch),
        quote(&config.source_code_url),
        dir
    ));

    let mut actions = vec![RemoteAction::run(clone)];
    if let Some(revision) = &config.revision {
        actions.push(RemoteAction::run(format!(
            "cd {} && git fetch --tags --force && git checkout {}",
            dir,
            quote(revision)
        )));
    }
    actions
}

fn link_shared(ctx: &DeployContext<'_>) -> Vec<RemoteAction> {
    let config = ctx.config;
    let shared = config.shared_dir();
    let dir = ctx.release_dir();
    let mut actions = Vec::new();

    if config.env_file.is_some() {
        let env_path = env_link(ctx);
        actions.push(RemoteAction::UploadContent {
            content: render_env(&config.env_vars),
            remote: env_path.clone(),
        });
        actions.push(RemoteAction::run(format!(
            "chmod 600 {0} && ln -sfn {0} {1}",
            quote(&env_path),
            quote(&format!("{}/.env", dir))
        )));
    }

    actions.push(RemoteAction::run(format!(
        "mkdir -p {0} && ln -sfn {0} {1}",
        quote(&format!("{}/media", shared)),
        quote(&format!("{}/media", dir))
    )));

    for secret in &config.secrets {
        let name = secret_name(secret);
        actions.push(RemoteAction::run(format!(
            "ln -sfn {} {}",
            quote(&format!("{}/{}", shared, name)),
            quote(&format!("{}/{}", dir, name))
        )));
    }
    actions
}

fn install_dependencies(ctx: &DeployContext<'_>) -> Vec<RemoteAction> {
    let quiet = if ctx.mode.verbose { "" } else { " --quiet" };
    vec![RemoteAction::run(format!(
        "cd {} && {} install{} -r requirements.txt",
        quote(&ctx.release_dir()),
        quote(&ctx.config.pip_path()),
        quiet
    ))]
}

fn manage_py(ctx: &DeployContext<'_>, args: &str) -> RemoteAction {
    RemoteAction::run(format!(
        "cd {} && {}{} manage.py {}",
        quote(&ctx.release_dir()),
        env_prefix(ctx),
        quote(&ctx.config.python_path()),
        args
    ))
}

fn run_migrations(ctx: &DeployContext<'_>) -> Vec<RemoteAction> {
    if !ctx.config.run_migrations {
        return Vec::new();
    }
    vec![manage_py(ctx, "migrate --noinput")]
}

fn collect_static(ctx: &DeployContext<'_>) -> Vec<RemoteAction> {
    if !ctx.config.collect_static_files {
        return Vec::new();
    }
    vec![manage_py(ctx, "collectstatic --noinput")]
}

/// One command, so the swap is never split by cancellation.
fn activate_release(ctx: &DeployContext<'_>) -> Vec<RemoteAction> {
    let temp = quote(&temp_link(ctx));
    vec![RemoteAction::run(format!(
        "ln -sfn {0} {1} && mv -Tf {1} {2}",
        quote(&ctx.release_dir()),
        temp,
        quote(&ctx.config.current_dir())
    ))]
}

fn restart_service(ctx: &DeployContext<'_>) -> Vec<RemoteAction> {
    match ctx.config.service_name() {
        Some(name) => vec![RemoteAction::run(format!(
            "sudo systemctl restart {}",
            quote(&name)
        ))],
        None => Vec::new(),
    }
}

fn prune_releases(ctx: &DeployContext<'_>) -> Vec<RemoteAction> {
    let config = ctx.config;
    ctx.release
        .releases_to_prune
        .iter()
        .map(|name| {
            RemoteAction::run(format!(
                "rm -rf {} && rm -f {}",
                quote(&format!("{}/{}", config.releases_dir(), name)),
                quote(&format!("{}/.env.{}", config.shared_dir(), name))
            ))
        })
        .collect()
}
