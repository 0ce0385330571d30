use grader_engine::{Config, Engine};
use grader_protocol::{Language, Submission, TestCase};
use grader_utils::tracing::setup_tracing;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dotenv::dotenv;
use serde::de::DeserializeOwned;
use serde::Serialize;
use structopt::StructOpt;
use tracing::info;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "grader",
    about = "Runs untrusted submissions and reports verdicts"
)]
struct Opt {
    #[structopt(long, default_value = "grader.toml")]
    config: PathBuf,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Executes one source file and prints its verdict.
    Run {
        #[structopt(long)]
        lang: Language,

        #[structopt(long)]
        source: PathBuf,

        #[structopt(long)]
        stdin: Option<PathBuf>,
    },

    /// Grades a submission against a list of test cases.
    Grade {
        #[structopt(long)]
        submission: PathBuf,

        #[structopt(long)]
        cases: PathBuf,
    },
}

#[tracing::instrument(err)]
fn load_config(path: &Path) -> Result<Config> {
    info!("loading config from {}", path.display());
    let config = Config::from_file(path)?;
    info!("config is loaded:\n{:#?}", config);
    Ok(config)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_text(path)?;
    serde_json::from_str(&content).with_context(|| format!("invalid json: {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    setup_tracing();

    let opt = Opt::from_args();
    let config = load_config(&opt.config)?;
    let engine = Engine::new(config)?;

    match opt.cmd {
        Command::Run {
            lang,
            source,
            stdin,
        } => {
            let mut submission = Submission::new(lang, read_text(&source)?);
            if let Some(ref path) = stdin {
                submission = submission.with_stdin(read_text(path)?);
            }
            let verdict = engine.execute(&submission).await;
            print_json(&verdict)
        }
        Command::Grade { submission, cases } => {
            let submission: Submission = read_json(&submission)?;
            let cases: Vec<TestCase> = read_json(&cases)?;
            let report = grader_engine::grade(&engine, &submission, &cases).await;
            print_json(&report)
        }
    }
}
