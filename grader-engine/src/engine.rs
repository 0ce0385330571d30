use crate::config::Config;
use crate::lang::{self, Toolchain};
use crate::verdict::{classify, Stage};
use crate::workspace::{Workspace, WorkspaceManager};

use grader_protocol::{Submission, Verdict};
use grader_sandbox::SandboxArgs;

use std::future::{self, Future};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};

type Cancel<'a> = Shared<BoxFuture<'a, ()>>;

/// Runs submissions in fresh workspaces, one compile per submission.
pub struct Engine {
    config: Arc<Config>,
    workspaces: WorkspaceManager,
}

/// Source code written into a workspace and compiled if the language needs it.
struct Build {
    workspace: Workspace,
    toolchain: Box<dyn Toolchain>,
    compile: Option<Stage>,
}

enum Prepared {
    Ready(Build),
    Rejected(Verdict),
}

impl Build {
    async fn close(self) {
        self.workspace.close().await
    }
}

impl Engine {
    pub fn new(config: Config) -> Result<Self> {
        let workspaces = WorkspaceManager::new(&config.executor.workspace_root)?;
        Ok(Self {
            config: Arc::new(config),
            workspaces,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn execute(&self, submission: &Submission) -> Verdict {
        self.execute_until(submission, future::pending()).await
    }

    /// Like [`Engine::execute`], but any running child is killed once `cancel`
    /// resolves, and the verdict is `TimeLimitExceeded`.
    #[tracing::instrument(
        skip(self, submission, cancel),
        fields(lang = %submission.language, problem_id = ?submission.problem_id)
    )]
    pub async fn execute_until<C>(&self, submission: &Submission, cancel: C) -> Verdict
    where
        C: Future<Output = ()> + Send,
    {
        let cancel = cancel.boxed().shared();
        let verdict = match self.prepare(submission, cancel.clone()).await {
            Prepared::Ready(build) => {
                let verdict = self.run(&build, &submission.stdin, cancel).await;
                build.close().await;
                verdict
            }
            Prepared::Rejected(verdict) => verdict,
        };
        log_verdict(&verdict);
        verdict
    }

    /// Compiles `submission` once and runs it on every input, returning the
    /// verdicts in input order.
    ///
    /// At most `executor.parallelism` runs are alive at the same time. A
    /// rejected build yields the same verdict for every input.
    #[tracing::instrument(
        skip(self, submission, inputs),
        fields(
            lang = %submission.language,
            problem_id = ?submission.problem_id,
            inputs = inputs.len()
        )
    )]
    pub async fn execute_each(&self, submission: &Submission, inputs: &[String]) -> Vec<Verdict> {
        if inputs.is_empty() {
            return Vec::new();
        }

        let cancel = future::pending::<()>().boxed().shared();
        let build = match self.prepare(submission, cancel.clone()).await {
            Prepared::Ready(build) => build,
            Prepared::Rejected(verdict) => {
                log_verdict(&verdict);
                return vec![verdict; inputs.len()];
            }
        };

        let runs: Vec<_> = inputs
            .iter()
            .map(|input| {
                let build = &build;
                let cancel = cancel.clone();
                async move {
                    let verdict = self.run(build, input, cancel).await;
                    log_verdict(&verdict);
                    verdict
                }
            })
            .collect();
        let verdicts: Vec<Verdict> = stream::iter(runs)
            .buffered(self.config.executor.parallelism)
            .collect()
            .await;

        build.close().await;
        verdicts
    }

    async fn prepare(&self, submission: &Submission, cancel: Cancel<'_>) -> Prepared {
        match self.try_prepare(submission, cancel).await {
            Ok(prepared) => prepared,
            Err(err) => Prepared::Rejected(Verdict::internal_error(format!("{:#}", err))),
        }
    }

    async fn try_prepare(&self, submission: &Submission, cancel: Cancel<'_>) -> Result<Prepared> {
        let toolchain = match lang::toolchain_for(&self.config.toolchains, submission.language) {
            Some(tc) => tc,
            None => {
                return Ok(Prepared::Rejected(Verdict::internal_error(format!(
                    "no toolchain is configured for {}",
                    submission.language
                ))))
            }
        };

        let source_limit = self.config.source_limit();
        if submission.source_code.len() > source_limit {
            return Ok(Prepared::Rejected(Verdict::compile_error(format!(
                "Source code is too long: {} bytes, at most {} bytes are allowed",
                submission.source_code.len(),
                source_limit
            ))));
        }

        let workspace = self
            .workspaces
            .allocate()
            .context("failed to allocate workspace")?;
        debug!(workspace = workspace.id(), "workspace ready");

        workspace.write_source(toolchain.src_name(), &submission.source_code)?;

        let limit = &self.config.executor.limit;
        let compile = match toolchain.build_command(workspace.path()) {
            Some(cmd) => {
                let args = SandboxArgs {
                    cmd,
                    workdir: workspace.path().to_owned(),
                    stdin: Vec::new(),
                    real_time_limit: Duration::from_millis(limit.compile_time),
                    stdout_limit: self.config.diagnostics_limit(),
                    stderr_limit: self.config.diagnostics_limit(),
                };
                let stage = supervise("compile", &args, cancel).await;
                if !stage.is_success() {
                    workspace.close().await;
                    return Ok(Prepared::Rejected(classify(Some(&stage), None)));
                }
                Some(stage)
            }
            None => None,
        };

        Ok(Prepared::Ready(Build {
            workspace,
            toolchain,
            compile,
        }))
    }

    async fn run(&self, build: &Build, stdin: &str, cancel: Cancel<'_>) -> Verdict {
        let workdir = build.workspace.path();
        let args = SandboxArgs {
            cmd: build.toolchain.run_command(workdir),
            workdir: workdir.to_owned(),
            stdin: stdin.as_bytes().to_vec(),
            real_time_limit: Duration::from_millis(self.config.executor.limit.run_time),
            stdout_limit: self.config.output_limit(),
            stderr_limit: self.config.diagnostics_limit(),
        };
        let run = supervise("run", &args, cancel).await;
        classify(build.compile.as_ref(), Some(&run))
    }
}

fn log_verdict(verdict: &Verdict) {
    if verdict.kind.is_user_caused() {
        info!(verdict = %verdict.kind, time = verdict.time, "judged");
    } else {
        error!(verdict = %verdict.kind, diagnostics = %verdict.stderr, "judge failed");
    }
}

#[tracing::instrument(skip(args, cancel), fields(cmd = %args.cmd))]
async fn supervise(
    stage: &'static str,
    args: &SandboxArgs,
    cancel: impl Future<Output = ()>,
) -> Stage {
    match grader_sandbox::run_until(args, cancel).await {
        Ok(outcome) => {
            debug!(
                status = ?outcome.status,
                real_time = ?outcome.real_time,
                timed_out = outcome.timed_out,
                stdout_truncated = outcome.stdout.truncated,
                "finished"
            );
            Stage::Finished(outcome)
        }
        Err(err) => {
            error!(%err, "failed to supervise");
            Stage::Failed(err.to_string())
        }
    }
}
