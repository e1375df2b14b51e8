//! Discovering conflicted files through Jujutsu or Git.
//!
//! Both tools are driven through their command-line interfaces with
//! `tokio::process`; nothing here links against a VCS library.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use crate::config::VcsPreference;
use crate::errors::VcsError;

/// A concrete version control tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsBackend {
    Jujutsu,
    Git,
}

impl VcsBackend {
    pub fn program(self) -> &'static str {
        match self {
            VcsBackend::Jujutsu => "jj",
            VcsBackend::Git => "git",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VcsBackend::Jujutsu => "jujutsu",
            VcsBackend::Git => "git",
        }
    }

    fn root_args(self) -> &'static [&'static str] {
        match self {
            VcsBackend::Jujutsu => &["root"],
            VcsBackend::Git => &["rev-parse", "--show-toplevel"],
        }
    }
}

/// Lists conflicted files in a detected repository.
#[derive(Debug, Clone)]
pub struct VcsClient {
    backend: VcsBackend,
    workdir: PathBuf,
}

impl VcsClient {
    /// Find the repository containing `dir`.
    ///
    /// With [`VcsPreference::Auto`] Jujutsu is tried before Git, so a
    /// colocated repository is handled by `jj`.
    #[instrument(skip_all, fields(dir = %dir.display(), preference = ?preference))]
    pub async fn detect(dir: &Path, preference: VcsPreference) -> Result<Self, VcsError> {
        let candidates: &[VcsBackend] = match preference {
            VcsPreference::Auto => &[VcsBackend::Jujutsu, VcsBackend::Git],
            VcsPreference::Jujutsu => &[VcsBackend::Jujutsu],
            VcsPreference::Git => &[VcsBackend::Git],
        };

        let mut last_err = None;
        for &backend in candidates {
            match run(backend, dir, backend.root_args()).await {
                Ok(stdout) => {
                    let root = stdout.trim();
                    if root.is_empty() {
                        continue;
                    }
                    let client = Self {
                        backend,
                        workdir: PathBuf::from(root),
                    };
                    info!(
                        backend = backend.name(),
                        root = %client.workdir.display(),
                        "detected repository"
                    );
                    return Ok(client);
                }
                Err(VcsError::CommandFailed { .. }) => {
                    debug!(backend = backend.name(), "not a repository");
                }
                Err(e) => {
                    debug!(backend = backend.name(), error = %e, "backend unavailable");
                    last_err = Some(e);
                }
            }
        }

        match (preference, last_err) {
            // An explicitly requested tool that is missing is reported as such.
            (VcsPreference::Jujutsu | VcsPreference::Git, Some(e)) => Err(e),
            _ => Err(VcsError::NotARepository {
                backend: match preference {
                    VcsPreference::Auto => "jujutsu or git".to_string(),
                    VcsPreference::Jujutsu => VcsBackend::Jujutsu.name().to_string(),
                    VcsPreference::Git => VcsBackend::Git.name().to_string(),
                },
                path: dir.to_path_buf(),
            }),
        }
    }

    pub fn backend(&self) -> VcsBackend {
        self.backend
    }

    /// Repository root; returned paths are joined onto it.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Files the VCS reports as conflicted, in the order it lists them.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn conflicted_files(&self) -> Result<Vec<PathBuf>, VcsError> {
        let files: Vec<PathBuf> = match self.backend {
            VcsBackend::Jujutsu => {
                let stdout = run(self.backend, &self.workdir, &["status"]).await?;
                parse_jj_status(&stdout)
                    .into_iter()
                    .map(|rel| self.workdir.join(rel))
                    .filter(|path| path.is_file())
                    .collect()
            }
            VcsBackend::Git => {
                let stdout = run(
                    self.backend,
                    &self.workdir,
                    &["diff", "--name-only", "--diff-filter=U"],
                )
                .await?;
                parse_git_names(&stdout)
                    .into_iter()
                    .map(|rel| self.workdir.join(rel))
                    .collect()
            }
        };
        debug!(count = files.len(), "listed conflicted files");
        Ok(files)
    }
}

async fn run(backend: VcsBackend, dir: &Path, args: &[&str]) -> Result<String, VcsError> {
    let program = backend.program();
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(cmd = %format!("{} {}", program, args.join(" ")), "running vcs command");
    let output = cmd.output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            VcsError::BinaryNotFound(program.into())
        } else {
            VcsError::IoError(e)
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let exit_code = output.status.code().unwrap_or(-1);
        warn!(program, exit_code, %stderr, "vcs command failed");
        return Err(VcsError::CommandFailed {
            program: program.into(),
            exit_code,
            stderr,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Paths named on `jj status` lines that mention a conflict.
fn parse_jj_status(stdout: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for line in stdout.lines().filter(|l| l.contains("conflict")) {
        if let Some(token) = line.split_whitespace().next() {
            if !paths.iter().any(|p| p == token) {
                paths.push(token.to_string());
            }
        }
    }
    paths
}

fn parse_git_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
