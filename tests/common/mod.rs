//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use git2::{Commit, Oid, Repository, Signature, Time};

/// Seconds for 2024-01-01T12:00:00Z, a fixed base for dated commits.
pub const BASE_TIME: i64 = 1_704_110_400;

pub const DAY: i64 = 86_400;

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn signature_at(&self, seconds: i64) -> Signature<'static> {
        Signature::new("Test User", "test@example.com", &Time::new(seconds, 0))
            .expect("Failed to create signature")
    }

    /// Write `content` to `name` and commit it on HEAD, timestamped `BASE_TIME`.
    pub fn commit_file(&self, name: &str, content: &str) -> Oid {
        self.commit_file_at(name, content, BASE_TIME)
    }

    /// Write `content` to `name` and commit it on HEAD at `seconds` since the epoch.
    pub fn commit_file_at(&self, name: &str, content: &str, seconds: i64) -> Oid {
        let tree = self.stage(name, content);
        let parent = self.head_commit();
        let parents: Vec<&Commit> = parent.iter().collect();
        let sig = self.signature_at(seconds);

        self.repo
            .commit(Some("HEAD"), &sig, &sig, &format!("update {name}"), &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Commit `content` to `name` with explicit parents, without moving HEAD.
    pub fn commit_with_parents(&self, name: &str, content: &str, parents: &[Oid], seconds: i64) -> Oid {
        let tree = self.stage(name, content);
        let parent_commits: Vec<Commit> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).expect("Failed to find parent"))
            .collect();
        let parent_refs: Vec<&Commit> = parent_commits.iter().collect();
        let sig = self.signature_at(seconds);

        self.repo
            .commit(None, &sig, &sig, &format!("update {name}"), &tree, &parent_refs)
            .expect("Failed to create commit")
    }

    /// Create a merge commit on HEAD with the current index tree and `parents`.
    pub fn merge_commit(&self, parents: &[Oid], seconds: i64) -> Oid {
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let parent_commits: Vec<Commit> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).expect("Failed to find parent"))
            .collect();
        let parent_refs: Vec<&Commit> = parent_commits.iter().collect();
        let sig = self.signature_at(seconds);

        self.repo
            .commit(Some("HEAD"), &sig, &sig, "merge", &tree, &parent_refs)
            .expect("Failed to create merge commit")
    }

    /// Create a branch pointing to the given OID.
    pub fn branch(&self, name: &str, oid: Oid) {
        let commit = self.repo.find_commit(oid).expect("Failed to find commit");
        self.repo.branch(name, &commit, false).expect("Failed to create branch");
    }

    fn head_commit(&self) -> Option<Commit<'_>> {
        self.repo.head().ok().and_then(|h| h.peel_to_commit().ok())
    }

    fn stage(&self, name: &str, content: &str) -> git2::Tree<'_> {
        let file_path = self.dir.path().join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        self.repo.find_tree(tree_id).expect("Failed to find tree")
    }
}
