//! Write the rendered changelog to a file or stdout.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::ChangelogError;

use super::format::Changelog;

/// Where the changelog goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    /// `-` means stdout; anything else is a file path.
    pub fn from_arg(arg: &Path) -> Self {
        if arg == Path::new("-") {
            Destination::Stdout
        } else {
            Destination::File(arg.to_path_buf())
        }
    }
}

/// Write `changelog` to `destination`.
///
/// Files are replaced atomically: content goes to a temporary file in the
/// same directory which is then renamed over the target.
pub fn write_changelog(changelog: &Changelog, destination: &Destination) -> Result<(), ChangelogError> {
    let content = changelog.render();

    match destination {
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(ChangelogError::WriteFailed)
        }
        Destination::File(path) => write_atomic(path, &content),
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), ChangelogError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(ChangelogError::WriteFailed)?;
    file.write_all(content.as_bytes())
        .map_err(ChangelogError::WriteFailed)?;
    file.as_file().sync_all().map_err(ChangelogError::WriteFailed)?;
    file.persist(path).map_err(ChangelogError::PersistFailed)?;

    Ok(())
}

/// One-line summary for the user.
pub fn generate_summary(changelog: &Changelog, destination: &Destination) -> String {
    let total = changelog.entries.len();
    let entry_word = if total == 1 { "entry" } else { "entries" };
    let target = match destination {
        Destination::Stdout => "stdout".to_string(),
        Destination::File(path) => path.display().to_string(),
    };

    let failed = changelog.failed_count();
    if failed > 0 {
        format!("Wrote {total} {entry_word} to {target} ({failed} failed)")
    } else {
        format!("Wrote {total} {entry_word} to {target}")
    }
}
