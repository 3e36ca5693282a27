//! Scratch workspaces for single executions
//!
//! A [`Workspace`] owns a uniquely named directory holding exactly the source
//! file and the stdin file. The directory is removed by [`Workspace::close`],
//! or by `Drop` if the handle is abandoned on an error or panic path. Directory
//! creation and `close` run on the blocking pool; the `Drop` fallback removes
//! in place.

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tempfile::TempDir;
use tokio::fs;

use crate::constants::{INPUT_FILE_NAME, SANDBOX_NAME_PREFIX};

use super::{
    languages::{ExecutionProfile, ResolvedSource, SourceNaming},
    SandboxError,
};

/// `public class Foo` starting a line, possibly with `final`/`abstract` around `public`
static PUBLIC_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:(?:final|abstract)\s+)*public\s+(?:(?:final|abstract)\s+)*class\s+([A-Za-z_$][A-Za-z0-9_$]*)",
    )
    .unwrap()
});

/// A class declaration that starts a line (not nested inside another body)
static TOP_LEVEL_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:(?:final|abstract)\s+)*class\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap()
});

/// Creates scratch workspaces under a common root
#[derive(Debug, Clone)]
pub struct WorkspaceBuilder {
    scratch_root: PathBuf,
}

impl WorkspaceBuilder {
    /// Create a builder placing workspaces under `scratch_root`
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
        }
    }

    /// Stage the source and stdin files for one execution
    pub async fn stage(
        &self,
        profile: &ExecutionProfile,
        source_text: &str,
        stdin_text: &str,
    ) -> Result<Workspace, SandboxError> {
        let (source, contents) = resolve_source(profile, source_text);

        fs::create_dir_all(&self.scratch_root).await?;
        let scratch_root = self.scratch_root.clone();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(&format!("{}-", SANDBOX_NAME_PREFIX))
                .tempdir_in(scratch_root)
        })
        .await
        .map_err(io::Error::other)??;

        // Bind mounts need an absolute host path
        let root = fs::canonicalize(dir.path()).await?;
        let workspace = Workspace {
            dir: Some(dir),
            root,
            source,
        };

        fs::write(workspace.source_path(), contents.as_bytes()).await?;
        fs::write(workspace.input_path(), stdin_text.as_bytes()).await?;

        tracing::debug!(
            workspace = %workspace.root.display(),
            source_file = %workspace.source.file_name,
            "Staged execution workspace"
        );

        Ok(workspace)
    }
}

/// Exclusively owned scratch directory for one execution
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    root: PathBuf,
    source: ResolvedSource,
}

impl Workspace {
    /// Absolute path of the workspace directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolved source file name and entry point
    pub fn source(&self) -> &ResolvedSource {
        &self.source
    }

    pub fn source_path(&self) -> PathBuf {
        self.root.join(&self.source.file_name)
    }

    pub fn input_path(&self) -> PathBuf {
        self.root.join(INPUT_FILE_NAME)
    }

    /// Remove the workspace directory and everything in it
    pub async fn close(mut self) -> io::Result<()> {
        match self.dir.take() {
            Some(dir) => tokio::task::spawn_blocking(move || dir.close())
                .await
                .map_err(io::Error::other)?,
            None => Ok(()),
        }
    }
}

/// Work out the source file name and the text to write into it
fn resolve_source<'a>(profile: &ExecutionProfile, source_text: &'a str) -> (ResolvedSource, Cow<'a, str>) {
    match profile.source_naming {
        SourceNaming::Fixed(file_name) => {
            (ResolvedSource::fixed(file_name), Cow::Borrowed(source_text))
        }
        SourceNaming::EntryClass {
            extension,
            default_entry,
        } => match infer_entry_class(source_text) {
            Some(entry) => (
                ResolvedSource::entry_class(entry, extension),
                Cow::Borrowed(source_text),
            ),
            None => (
                ResolvedSource::entry_class(default_entry, extension),
                Cow::Owned(wrap_in_class(source_text, default_entry)),
            ),
        },
    }
}

/// Best-effort scan for the class the source should be compiled as
///
/// A public class wins; otherwise the first class declared at the start of a
/// line. Returns `None` when nothing usable is found.
pub fn infer_entry_class(source_text: &str) -> Option<&str> {
    PUBLIC_CLASS
        .captures(source_text)
        .or_else(|| TOP_LEVEL_CLASS.captures(source_text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Wrap loose members in `public class <name>`, keeping imports at the top
fn wrap_in_class(source_text: &str, class_name: &str) -> String {
    let mut header = String::new();
    let mut body = String::new();
    let mut in_header = true;

    for line in source_text.lines() {
        let trimmed = line.trim_start();
        if in_header && (trimmed.starts_with("import ") || trimmed.starts_with("package ")) {
            header.push_str(line);
            header.push('\n');
            continue;
        }
        if !trimmed.is_empty() {
            in_header = false;
        }
        body.push_str(line);
        body.push('\n');
    }

    format!("{}public class {} {{\n{}}}\n", header, class_name, body)
}
