use super::*;

use crate::config::JavaToolchain;

use std::path::PathBuf;

pub struct Java {
    javac: PathBuf,
    java: PathBuf,
}

impl Java {
    pub fn new(cfg: &JavaToolchain) -> Self {
        Self {
            javac: cfg.javac.clone(),
            java: cfg.java.clone(),
        }
    }

    fn with_java_home(mut cmd: OsCmd) -> OsCmd {
        cmd.inherit_env("JAVA_HOME");
        cmd
    }
}

impl Toolchain for Java {
    fn language(&self) -> Language {
        Language::Java
    }

    // the public class must live in a file of the same name
    fn src_name(&self) -> &str {
        "Main.java"
    }

    fn build_command(&self, _: &Path) -> Option<OsCmd> {
        let mut cmd = base_cmd(&self.javac);
        cmd.arg("-J-Xms64m");
        cmd.arg("-J-Xmx512m");
        cmd.arg("-encoding").arg("UTF-8");
        cmd.arg("-sourcepath").arg(".");
        cmd.arg(self.src_name());
        Some(Self::with_java_home(cmd))
    }

    fn run_command(&self, _: &Path) -> OsCmd {
        let mut cmd = base_cmd(&self.java);
        cmd.arg("-cp").arg(".");
        cmd.arg("-Xms64m");
        cmd.arg("-Xmx512m");
        cmd.arg("Main");
        Self::with_java_home(cmd)
    }
}
