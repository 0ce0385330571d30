pub mod cpp;
pub mod java;
pub mod python;

use crate::config::Toolchains;

use grader_protocol::Language;
use grader_utils::os_cmd::OsCmd;

use std::path::Path;

/// Build and run commands of one language.
///
/// Implementations are pure mappings: nothing is spawned or touched on disk.
pub trait Toolchain: Send + Sync {
    fn language(&self) -> Language;

    /// File name the source code must be written to.
    fn src_name(&self) -> &str;

    /// `None` for interpreted languages.
    fn build_command(&self, workspace: &Path) -> Option<OsCmd>;

    fn run_command(&self, workspace: &Path) -> OsCmd;
}

/// Returns `None` when the language has no configured toolchain.
pub fn toolchain_for(toolchains: &Toolchains, language: Language) -> Option<Box<dyn Toolchain>> {
    match language {
        Language::Java => toolchains
            .java
            .as_ref()
            .map(|cfg| Box::new(java::Java::new(cfg)) as Box<dyn Toolchain>),
        Language::Cpp => toolchains
            .cpp
            .as_ref()
            .map(|cfg| Box::new(cpp::Cpp::new(cfg)) as Box<dyn Toolchain>),
        Language::Python => toolchains
            .python
            .as_ref()
            .map(|cfg| Box::new(python::Python::new(cfg)) as Box<dyn Toolchain>),
    }
}

/// A command whose environment only carries what toolchains need to locate
/// themselves.
fn base_cmd(bin: &Path) -> OsCmd {
    let mut cmd = OsCmd::new(bin);
    cmd.inherit_env("PATH");
    cmd.inherit_env("LANG");
    cmd
}
