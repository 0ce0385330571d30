use super::*;

use crate::config::CppToolchain;

use std::path::PathBuf;

pub struct Cpp {
    compiler: PathBuf,
    std: String,
    o2: bool,
}

impl Cpp {
    pub fn new(cfg: &CppToolchain) -> Self {
        Self {
            compiler: cfg.compiler.clone(),
            std: cfg.std.clone(),
            o2: cfg.o2,
        }
    }

    fn exe_name(&self) -> &str {
        "main"
    }
}

impl Toolchain for Cpp {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn src_name(&self) -> &str {
        "main.cpp"
    }

    fn build_command(&self, _: &Path) -> Option<OsCmd> {
        let mut cmd = base_cmd(&self.compiler);
        cmd.arg(format!("--std={}", self.std));
        cmd.arg_if(self.o2, "-O2");
        cmd.arg("-o").arg(self.exe_name());
        cmd.arg(self.src_name());
        Some(cmd)
    }

    fn run_command(&self, workspace: &Path) -> OsCmd {
        OsCmd::new(workspace.join(self.exe_name()))
    }
}
