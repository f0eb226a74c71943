//! Changelog types and markdown rendering.

/// Title line of every generated changelog.
pub const CHANGELOG_TITLE: &str = "# Changelog";

/// Generated description of one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub short_hash: String,
    pub author: String,
    /// Commit date, `YYYY-MM-DD` in UTC.
    pub date: String,
    pub text: String,
    /// Set when the text records a summarization failure.
    pub failed: bool,
}

/// Order of entries in the rendered changelog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EntryOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Summaries in chronological (oldest-first) order, plus rendering options.
#[derive(Debug, Clone, Default)]
pub struct Changelog {
    pub entries: Vec<Summary>,
    pub order: EntryOrder,
    pub group_by_date: bool,
}

impl Changelog {
    /// Build a changelog from summaries listed oldest first.
    pub fn new(entries: Vec<Summary>, order: EntryOrder, group_by_date: bool) -> Self {
        Self {
            entries,
            order,
            group_by_date,
        }
    }

    /// Entries in the configured display order.
    pub fn ordered(&self) -> Vec<&Summary> {
        match self.order {
            EntryOrder::OldestFirst => self.entries.iter().collect(),
            EntryOrder::NewestFirst => self.entries.iter().rev().collect(),
        }
    }

    /// Group consecutive entries (in display order) that share a date.
    pub fn entries_by_date(&self) -> Vec<(&str, Vec<&Summary>)> {
        let mut groups: Vec<(&str, Vec<&Summary>)> = Vec::new();
        for entry in self.ordered() {
            match groups.last_mut() {
                Some((date, items)) if *date == entry.date => items.push(entry),
                _ => groups.push((entry.date.as_str(), vec![entry])),
            }
        }
        groups
    }

    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.failed).count()
    }

    /// Render the changelog as markdown.
    pub fn render(&self) -> String {
        let mut out = format!("{CHANGELOG_TITLE}\n\n");

        if self.group_by_date {
            for (date, entries) in self.entries_by_date() {
                out.push_str(&format!("## {date}\n\n"));
                for entry in entries {
                    out.push_str(&format!(
                        "### `{}` by {}\n{}\n\n",
                        entry.short_hash,
                        entry.author,
                        entry.text.trim_end()
                    ));
                }
            }
        } else {
            for entry in self.ordered() {
                out.push_str(&format!(
                    "## {} – `{}` by {}\n{}\n\n",
                    entry.date,
                    entry.short_hash,
                    entry.author,
                    entry.text.trim_end()
                ));
            }
        }

        out
    }
}
