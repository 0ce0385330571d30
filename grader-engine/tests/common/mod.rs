use grader_engine::{Config, Engine};

use std::env;
use std::sync::Once;

use anyhow::Result;
use tempfile::TempDir;

pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        grader_utils::tracing::setup_test_tracing();
    });
}

/// Whether `bin` can be found on `PATH`.
pub fn has_binary(bin: &str) -> bool {
    let path = match env::var_os("PATH") {
        Some(p) => p,
        None => return false,
    };
    env::split_paths(&path).any(|dir| dir.join(bin).is_file())
}

/// An engine over a temporary workspace root, with every toolchain found on
/// `PATH` configured.
pub fn engine(run_time: u64) -> Result<(TempDir, Engine)> {
    init();
    let root = TempDir::new()?;

    let mut toml = format!(
        r#"
        [executor]
        workspace_root = "{root}"
        source_limit = "64 KiB"

        [executor.limit]
        compile_time = 20000
        run_time = {run_time}
        output = "1 MiB"
        diagnostics = "64 KiB"
        "#,
        root = root.path().join("ws").display(),
        run_time = run_time,
    );
    if has_binary("javac") && has_binary("java") {
        toml.push_str("[toolchains.java]\njavac = \"javac\"\njava = \"java\"\n");
    }
    if has_binary("g++") {
        toml.push_str("[toolchains.cpp]\ncompiler = \"g++\"\nstd = \"gnu++17\"\no2 = true\n");
    }
    if has_binary("python3") {
        toml.push_str("[toolchains.python]\ninterpreter = \"python3\"\n");
    }

    let config: Config = toml.parse()?;
    let engine = Engine::new(config)?;
    Ok((root, engine))
}

/// An engine with the budgets of the shipped `grader.toml`, rooted in a
/// temporary directory. Toolchains missing from `PATH` are dropped.
pub fn shipped_engine() -> Result<(TempDir, Engine)> {
    init();
    let root = TempDir::new()?;

    let mut config: Config = include_str!("../../grader.toml").parse()?;
    config.executor.workspace_root = root.path().join("ws");

    let toolchains = &mut config.toolchains;
    if !(has_binary("javac") && has_binary("java")) {
        toolchains.java = None;
    }
    if !has_binary("g++") {
        toolchains.cpp = None;
    }
    if !has_binary("python3") {
        toolchains.python = None;
    }

    let engine = Engine::new(config)?;
    Ok((root, engine))
}

macro_rules! require_toolchain {
    ($engine:expr, $lang:expr) => {
        if grader_engine::lang::toolchain_for(&$engine.config().toolchains, $lang).is_none() {
            eprintln!("skipped: no toolchain for {}", $lang);
            return Ok(());
        }
    };
}
