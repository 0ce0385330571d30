use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use ubyte::ByteUnit;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct Config {
    #[validate]
    pub executor: Executor,

    #[serde(default)]
    pub toolchains: Toolchains,
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct Executor {
    #[validate(custom = "non_empty_path")]
    pub workspace_root: PathBuf,

    #[validate(custom = "at_least_1kib")]
    pub source_limit: ByteUnit,

    /// Runs of one submission alive at the same time when grading.
    #[serde(default = "default_parallelism")]
    #[validate(range(min = 1, max = 64))]
    pub parallelism: usize,

    #[validate]
    pub limit: Limit,
}

fn default_parallelism() -> usize {
    4
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct Limit {
    #[validate(range(min = 100, max = 60000))]
    pub compile_time: u64, // milliseconds

    #[validate(range(min = 100, max = 60000))]
    pub run_time: u64, // milliseconds

    #[validate(custom = "at_least_1kib")]
    pub output: ByteUnit,

    #[validate(custom = "at_least_1kib")]
    pub diagnostics: ByteUnit,
}

/// A language without a section here is unsupported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Toolchains {
    pub java: Option<JavaToolchain>,
    pub cpp: Option<CppToolchain>,
    pub python: Option<PythonToolchain>,
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct JavaToolchain {
    #[validate(custom = "non_empty_path")]
    pub javac: PathBuf,

    #[validate(custom = "non_empty_path")]
    pub java: PathBuf,
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct CppToolchain {
    #[validate(custom = "non_empty_path")]
    pub compiler: PathBuf,

    #[validate(length(min = 1))]
    pub std: String,

    #[serde(default)]
    pub o2: bool,
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct PythonToolchain {
    #[validate(custom = "non_empty_path")]
    pub interpreter: PathBuf,
}

#[allow(clippy::ptr_arg)]
fn non_empty_path(path: &PathBuf) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::new("empty_path"));
    }
    Ok(())
}

fn at_least_1kib(size: &ByteUnit) -> Result<(), ValidationError> {
    if size.as_u64() < 1024 {
        return Err(ValidationError::new("below_1kib"));
    }
    Ok(())
}

impl Toolchains {
    fn check(&self) -> Result<()> {
        if let Some(ref java) = self.java {
            java.validate().context("invalid [toolchains.java]")?;
        }
        if let Some(ref cpp) = self.cpp {
            cpp.validate().context("invalid [toolchains.cpp]")?;
        }
        if let Some(ref python) = self.python {
            python.validate().context("invalid [toolchains.python]")?;
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        config.toolchains.check()?;
        Ok(config)
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: path = {}", path.display()))?;
        content.parse()
    }

    pub fn source_limit(&self) -> usize {
        self.executor.source_limit.as_u64() as usize
    }

    pub fn output_limit(&self) -> usize {
        self.executor.limit.output.as_u64() as usize
    }

    pub fn diagnostics_limit(&self) -> usize {
        self.executor.limit.diagnostics.as_u64() as usize
    }
}
