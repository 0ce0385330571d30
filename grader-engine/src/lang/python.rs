use super::*;

use crate::config::PythonToolchain;

use std::path::PathBuf;

pub struct Python {
    interpreter: PathBuf,
}

impl Python {
    pub fn new(cfg: &PythonToolchain) -> Self {
        Self {
            interpreter: cfg.interpreter.clone(),
        }
    }
}

impl Toolchain for Python {
    fn language(&self) -> Language {
        Language::Python
    }

    fn src_name(&self) -> &str {
        "main.py"
    }

    fn build_command(&self, _: &Path) -> Option<OsCmd> {
        None
    }

    fn run_command(&self, _: &Path) -> OsCmd {
        let mut cmd = base_cmd(&self.interpreter);
        cmd.add_env("PYTHONDONTWRITEBYTECODE", "1");
        cmd.arg(self.src_name());
        cmd
    }
}
