//! Per-commit diff extraction using git2.

use git2::{DiffFindOptions, DiffFormat, DiffOptions, Oid, Repository};
use tracing::{debug, warn};

use crate::error::RepositoryError;

use super::commits::CommitInfo;

/// Options controlling how a commit's diff is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffSettings {
    /// Ignore whitespace-only changes.
    pub ignore_whitespace: bool,
    /// Collapse delete + add pairs into renames.
    pub detect_renames: bool,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            ignore_whitespace: true,
            detect_renames: true,
        }
    }
}

/// Unified diff of a commit against its primary parent.
#[derive(Debug, Clone, Default)]
pub struct CommitDiff {
    /// Patch text oriented parent -> commit (`+` lines were added by the commit).
    pub text: String,
    /// Changed paths, sorted and deduplicated.
    pub files: Vec<String>,
}

impl CommitDiff {
    /// True when the commit changes nothing visible.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.text.trim().is_empty()
    }
}

/// Compute the diff of `commit` against its first parent.
///
/// Root commits are diffed against the empty tree. Merge commits are diffed
/// against their first parent only.
pub fn extract_diff(
    repo: &Repository,
    commit: &CommitInfo,
    settings: DiffSettings,
) -> Result<CommitDiff, RepositoryError> {
    let diff_err = |source| RepositoryError::DiffFailed {
        hash: commit.hash.clone(),
        source,
    };

    let oid = Oid::from_str(&commit.hash).map_err(RepositoryError::ParseCommit)?;
    let git_commit = repo.find_commit(oid).map_err(RepositoryError::ParseCommit)?;
    let tree = git_commit.tree().map_err(diff_err)?;

    let parent_tree = if git_commit.parent_count() > 0 {
        Some(
            git_commit
                .parent(0)
                .and_then(|p| p.tree())
                .map_err(diff_err)?,
        )
    } else {
        None
    };

    let mut opts = DiffOptions::new();
    opts.ignore_whitespace(settings.ignore_whitespace);

    let mut diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))
        .map_err(diff_err)?;

    if settings.detect_renames {
        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find)).map_err(diff_err)?;
    }

    let mut files: Vec<String> = diff
        .deltas()
        .filter_map(|delta| {
            delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().to_string())
        })
        .collect();
    files.sort();
    files.dedup();

    let mut text = String::new();
    if let Err(e) = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    }) {
        warn!(hash = %commit.short_hash(), "Failed to render diff text: {e}");
        return Err(diff_err(e));
    }

    debug!(
        hash = %commit.short_hash(),
        files = files.len(),
        chars = text.chars().count(),
        "Extracted diff"
    );

    Ok(CommitDiff { text, files })
}

#[cfg(test)]
mod tests {
    use super::*;

    use git2::Signature;

    fn commit_file(repo: &Repository, dir: &std::path::Path, name: &str, content: &str) -> Oid {
        std::fs::write(dir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, "change", &tree, &parents)
            .unwrap()
    }

    fn info(repo: &Repository, oid: Oid) -> CommitInfo {
        CommitInfo::from_git2_commit(&repo.find_commit(oid).unwrap()).unwrap()
    }

    #[test]
    fn test_root_commit_diffs_against_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let root = commit_file(&repo, dir.path(), "hello.txt", "hello\n");

        let diff = extract_diff(&repo, &info(&repo, root), DiffSettings::default()).unwrap();

        assert_eq!(diff.files, vec!["hello.txt".to_string()]);
        assert!(diff.text.contains("diff --git a/hello.txt b/hello.txt"));
        assert!(diff.text.contains("+hello"));
    }

    #[test]
    fn test_diff_is_oriented_parent_to_commit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, dir.path(), "file.txt", "old line\n");
        let second = commit_file(&repo, dir.path(), "file.txt", "new line\n");

        let diff = extract_diff(&repo, &info(&repo, second), DiffSettings::default()).unwrap();

        assert!(diff.text.contains("-old line"));
        assert!(diff.text.contains("+new line"));
    }

    #[test]
    fn test_whitespace_only_change_is_ignored_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, dir.path(), "file.txt", "a b\n");
        let second = commit_file(&repo, dir.path(), "file.txt", "a  b\n");

        let trimmed = extract_diff(&repo, &info(&repo, second), DiffSettings::default()).unwrap();
        assert!(!trimmed.text.contains("+a  b"));

        let raw = extract_diff(
            &repo,
            &info(&repo, second),
            DiffSettings {
                ignore_whitespace: false,
                detect_renames: true,
            },
        )
        .unwrap();
        assert!(raw.text.contains("+a  b"));
    }
}
