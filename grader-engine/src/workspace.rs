use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use chrono::Local;
use tokio::task;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root).with_context(|| {
                format!("failed to create workspace root: path = {}", root.display())
            })?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates a fresh directory that no other caller will ever be handed.
    pub fn allocate(&self) -> Result<Workspace> {
        let id = format!(
            "{}-{}",
            Local::now().format("%Y%m%d%H%M%S%3f"),
            Uuid::new_v4().to_simple()
        );
        let path = self.root.join(&id);

        // create_dir fails if the path exists, so an id is never shared
        fs::create_dir(&path)
            .with_context(|| format!("failed to create workspace: path = {}", path.display()))?;

        debug!(workspace = %id, "allocated");
        Ok(Workspace {
            id,
            path,
            released: false,
        })
    }
}

/// An exclusively owned scratch directory, deleted when dropped.
#[derive(Debug)]
pub struct Workspace {
    id: String,
    path: PathBuf,
    released: bool,
}

impl Workspace {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_source(&self, name: &str, code: &str) -> Result<PathBuf> {
        ensure!(
            !name.is_empty() && !name.contains('/') && name != "." && name != "..",
            "invalid source file name: {:?}",
            name
        );
        let path = self.path.join(name);
        fs::write(&path, code)
            .with_context(|| format!("failed to write source: path = {}", path.display()))?;
        Ok(path)
    }

    /// Deletes the directory now. Dropping afterwards does nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(workspace = %self.id, "released"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(
                workspace = %self.id,
                path = %self.path.display(),
                %err,
                "failed to remove workspace"
            ),
        }
    }

    /// Like [`Workspace::release`], but the tree is deleted on the blocking
    /// thread pool.
    pub async fn close(self) {
        let id = self.id.clone();
        if let Err(err) = task::spawn_blocking(move || drop(self)).await {
            warn!(workspace = %id, %err, "workspace cleanup task failed");
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}
