//! Per-commit diff budget.
//!
//! Diffs are cut to a character budget before they are sent to the model.
//! File headers (`diff --git`, `index`, `---`, `+++`) are kept so the model
//! still sees every touched path; hunk bodies share whatever budget remains.

use tracing::debug;

/// Default per-commit character budget.
pub const DEFAULT_BUDGET: usize = 8_000;

/// Room kept for the marker appended to a cut body.
const MARKER_RESERVE: usize = 64;

/// Result of fitting a diff into a budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncation {
    pub text: String,
    pub original_chars: usize,
    pub truncated: bool,
}

/// One `diff --git` section of a patch.
#[derive(Debug)]
struct FileSection<'a> {
    header: &'a str,
    body: &'a str,
}

/// Fit `diff` into `budget` characters.
///
/// The result never exceeds the budget, is deterministic, and is left
/// unchanged by a second call with the same budget.
pub fn truncate_diff(diff: &str, budget: usize) -> Truncation {
    let original_chars = diff.chars().count();
    if original_chars <= budget {
        return Truncation {
            text: diff.to_string(),
            original_chars,
            truncated: false,
        };
    }

    let sections = split_sections(diff);
    let header_chars: usize = sections.iter().map(|s| char_len(s.header)).sum();

    let mut text = if header_chars >= budget {
        sections.iter().map(|s| s.header).collect::<String>()
    } else {
        let allotments = share_budget(&sections, budget - header_chars);
        let mut out = String::with_capacity(budget);
        for (section, allotment) in sections.iter().zip(allotments) {
            out.push_str(section.header);
            out.push_str(&cut_body(section.body, allotment));
        }
        out
    };

    if char_len(&text) > budget {
        text = text.chars().take(budget).collect();
    }

    debug!(
        original_chars,
        budget,
        kept = char_len(&text),
        sections = sections.len(),
        "Truncated diff"
    );

    Truncation {
        text,
        original_chars,
        truncated: true,
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split a patch at `diff --git` lines. Text before the first one is a
/// header-only section.
fn split_sections(diff: &str) -> Vec<FileSection<'_>> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in diff.split_inclusive('\n') {
        if line.starts_with("diff --git ") {
            starts.push(offset);
        }
        offset += line.len();
    }

    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    let mut sections = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(diff.len());
        let chunk = &diff[start..end];
        let split_at = hunk_start(chunk).unwrap_or(chunk.len());
        sections.push(FileSection {
            header: &chunk[..split_at],
            body: &chunk[split_at..],
        });
    }
    sections
}

/// Byte offset of the first `@@` line in a section.
fn hunk_start(chunk: &str) -> Option<usize> {
    let mut offset = 0;
    for line in chunk.split_inclusive('\n') {
        if line.starts_with("@@") {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Water-fill `available` characters across section bodies.
///
/// Bodies are served shortest first; each gets at most an equal share of
/// what is left, so unused share flows to longer bodies.
fn share_budget(sections: &[FileSection<'_>], available: usize) -> Vec<usize> {
    let lengths: Vec<usize> = sections.iter().map(|s| char_len(s.body)).collect();

    let mut order: Vec<usize> = (0..lengths.len()).filter(|&i| lengths[i] > 0).collect();
    order.sort_by_key(|&i| (lengths[i], i));

    let mut allotments = vec![0; lengths.len()];
    let mut remaining = available;
    let count = order.len();

    for (served, &i) in order.iter().enumerate() {
        let share = remaining / (count - served);
        let given = lengths[i].min(share);
        allotments[i] = given;
        remaining -= given;
    }

    allotments
}

/// Keep whole leading lines of `body` within `allotment`, then a marker.
fn cut_body(body: &str, allotment: usize) -> String {
    let total = char_len(body);
    if total <= allotment {
        return body.to_string();
    }

    let content_cap = allotment.saturating_sub(MARKER_RESERVE);
    let mut kept = String::new();
    let mut kept_chars = 0;
    let mut kept_lines = 0;

    for line in body.split_inclusive('\n') {
        let len = char_len(line);
        if kept_chars + len > content_cap {
            break;
        }
        kept.push_str(line);
        kept_chars += len;
        kept_lines += 1;
    }

    let omitted = body.split_inclusive('\n').count() - kept_lines;
    let marker = format!("[... {omitted} more lines truncated ...]\n");
    if kept_chars + char_len(&marker) <= allotment {
        kept.push_str(&marker);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_diff(name: &str, lines: usize) -> String {
        let mut s = format!(
            "diff --git a/{name} b/{name}\nindex 0000000..1111111 100644\n--- a/{name}\n+++ b/{name}\n@@ -1,{lines} +1,{lines} @@\n"
        );
        for i in 0..lines {
            s.push_str(&format!("+line {i} of {name}\n"));
        }
        s
    }

    #[test]
    fn test_small_diff_is_unchanged() {
        let diff = file_diff("a.rs", 3);
        let result = truncate_diff(&diff, 10_000);
        assert_eq!(result.text, diff);
        assert!(!result.truncated);
    }

    #[test]
    fn test_output_never_exceeds_budget() {
        let diff = format!("{}{}", file_diff("a.rs", 500), file_diff("b.rs", 20));
        for budget in [0, 1, 50, 100, 300, 1_000, 4_000] {
            let result = truncate_diff(&diff, budget);
            assert!(
                result.text.chars().count() <= budget,
                "budget {budget} exceeded: {}",
                result.text.chars().count()
            );
        }
    }

    #[test]
    fn test_truncation_is_idempotent() {
        let diff = format!("{}{}", file_diff("a.rs", 500), file_diff("b.rs", 200));
        for budget in [10, 200, 1_000, 5_000] {
            let once = truncate_diff(&diff, budget);
            let twice = truncate_diff(&once.text, budget);
            assert_eq!(once.text, twice.text);
        }
    }

    #[test]
    fn test_headers_of_every_file_are_kept() {
        let diff = format!(
            "{}{}{}",
            file_diff("big.rs", 1_000),
            file_diff("small.rs", 2),
            file_diff("other.rs", 300)
        );
        let result = truncate_diff(&diff, 2_000);

        assert!(result.truncated);
        assert!(result.text.contains("diff --git a/big.rs b/big.rs"));
        assert!(result.text.contains("diff --git a/small.rs b/small.rs"));
        assert!(result.text.contains("diff --git a/other.rs b/other.rs"));
        // The small file fits its share completely.
        assert!(result.text.contains("+line 1 of small.rs"));
        assert!(result.text.contains("more lines truncated"));
    }

    #[test]
    fn test_cut_keeps_whole_lines() {
        let diff = file_diff("a.rs", 400);
        let result = truncate_diff(&diff, 1_000);
        for line in result.text.lines() {
            assert!(
                line.starts_with("+line ")
                    || line.starts_with("[... ")
                    || line.starts_with("diff --git")
                    || line.starts_with("index ")
                    || line.starts_with("--- ")
                    || line.starts_with("+++ ")
                    || line.starts_with("@@"),
                "unexpected partial line: {line}"
            );
        }
    }

    #[test]
    fn test_multibyte_characters_count_as_one() {
        let diff = "é".repeat(100);
        let result = truncate_diff(&diff, 40);
        assert_eq!(result.text.chars().count(), 40);
        assert_eq!(result.original_chars, 100);
    }

    #[test]
    fn test_truncation_is_deterministic() {
        let diff = format!("{}{}", file_diff("x.rs", 300), file_diff("y.rs", 300));
        assert_eq!(truncate_diff(&diff, 900), truncate_diff(&diff, 900));
    }

    #[test]
    fn test_share_budget_redistributes_leftover() {
        let diff = format!("{}{}", file_diff("short.rs", 1), file_diff("long.rs", 100));
        let sections = split_sections(&diff);
        let short_len = char_len(sections[0].body);
        let allotments = share_budget(&sections, 1_000);

        assert_eq!(allotments[0], short_len);
        assert_eq!(allotments[1], 1_000 - short_len);
    }
}
