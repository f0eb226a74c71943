//! Opening local repositories and cloning remote ones.

use std::path::Path;

use git2::build::RepoBuilder;
use git2::{BranchType, ErrorCode, Oid, Repository};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::RepositoryError;

/// An opened repository, plus the temporary directory backing it when cloned.
///
/// The clone directory is removed when the handle is dropped.
pub struct RepoHandle {
    pub repo: Repository,
    clone_dir: Option<TempDir>,
}

impl std::fmt::Debug for RepoHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoHandle")
            .field("path", &self.repo.path())
            .field("cloned", &self.clone_dir.is_some())
            .finish()
    }
}

impl RepoHandle {
    /// Whether this repository was cloned into a temporary directory.
    pub fn is_clone(&self) -> bool {
        self.clone_dir.is_some()
    }
}

/// Open `location` in place, or clone it when it is a remote URL.
///
/// Local repositories are never checked out or otherwise modified. Remote
/// repositories are cloned bare, restricted to `branch` when one is given.
pub fn open_or_clone(location: &str, branch: Option<&str>) -> Result<RepoHandle, RepositoryError> {
    if Path::new(location).is_dir() {
        debug!(location, "Opening local repository");
        let repo = Repository::open(location).map_err(|source| RepositoryError::OpenFailed {
            location: location.to_string(),
            source,
        })?;
        return Ok(RepoHandle {
            repo,
            clone_dir: None,
        });
    }

    if !looks_like_url(location) {
        return Err(RepositoryError::UnknownLocation(location.to_string()));
    }

    let dir = tempfile::Builder::new()
        .prefix("difflog-")
        .tempdir()
        .map_err(RepositoryError::CloneDirFailed)?;

    info!(url = location, dest = %dir.path().display(), "Cloning repository");

    let mut builder = RepoBuilder::new();
    builder.bare(true);
    if let Some(branch) = branch {
        builder.branch(branch);
    }

    let repo = builder.clone(location, dir.path()).map_err(|source| {
        if let Some(branch) = branch
            && source.code() == ErrorCode::NotFound
        {
            RepositoryError::BranchNotFound {
                branch: branch.to_string(),
                source,
            }
        } else {
            RepositoryError::CloneFailed {
                url: location.to_string(),
                source,
            }
        }
    })?;

    Ok(RepoHandle {
        repo,
        clone_dir: Some(dir),
    })
}

/// Heuristic for remote locations: `scheme://...` or scp-like `user@host:path`.
pub fn looks_like_url(location: &str) -> bool {
    if location.contains("://") {
        return true;
    }
    match location.split_once(':') {
        Some((user_host, path)) => user_host.contains('@') && !path.is_empty(),
        None => false,
    }
}

/// Resolve a branch name (or any revspec) to the commit it points at.
///
/// Tries a local branch, then `origin/<branch>`, then a generic revspec.
/// `None` resolves `HEAD`.
pub fn resolve_branch(repo: &Repository, branch: Option<&str>) -> Result<Oid, RepositoryError> {
    let name = branch.unwrap_or("HEAD");

    if name != "HEAD" {
        if let Ok(local) = repo.find_branch(name, BranchType::Local)
            && let Ok(commit) = local.get().peel_to_commit()
        {
            return Ok(commit.id());
        }

        let remote_name = format!("origin/{name}");
        if let Ok(remote) = repo.find_branch(&remote_name, BranchType::Remote)
            && let Ok(commit) = remote.get().peel_to_commit()
        {
            return Ok(commit.id());
        }
    }

    let obj = repo
        .revparse_single(name)
        .map_err(|source| RepositoryError::BranchNotFound {
            branch: name.to_string(),
            source,
        })?;

    obj.peel_to_commit()
        .map(|c| c.id())
        .map_err(|source| RepositoryError::BranchNotFound {
            branch: name.to_string(),
            source,
        })
}
