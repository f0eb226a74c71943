//! Prompt construction for per-commit summaries.

/// System prompt sent with every summary request.
pub const SYSTEM_PROMPT: &str = "\
You turn Git changes into a concise, human-readable CHANGELOG entry.
- The input is a unified diff from PARENT to COMMIT: lines starting with '+' were ADDED by the commit, lines starting with '-' were REMOVED.
- Write 3 to 6 action-style bullet points, grouped by area when that is clear.
- Mention important files or paths and any breaking changes.
- Prefer terse, technical phrasing with no filler.
";

/// Maximum number of file names listed in the prompt.
const MAX_LISTED_FILES: usize = 30;

/// Everything the model sees about one commit.
///
/// The commit message is deliberately absent: summaries describe what the
/// diff does, not what the author said it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub short_hash: String,
    pub author: String,
    /// Commit date, `YYYY-MM-DD` in UTC.
    pub date: String,
    pub files: Vec<String>,
    /// Diff text, already cut to the per-commit budget.
    pub diff: String,
}

/// Build the user prompt for one commit.
pub fn build_user_prompt(request: &SummaryRequest) -> String {
    let files = if request.files.is_empty() {
        "(none)".to_string()
    } else {
        let mut listed = request
            .files
            .iter()
            .take(MAX_LISTED_FILES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if request.files.len() > MAX_LISTED_FILES {
            listed.push_str(", …");
        }
        listed
    };

    format!(
        "Commit: {hash}\nAuthor: {author}\nDate (UTC): {date}\nChanged files ({count}): {files}\n\nDiff (may be truncated):\n```\n{diff}\n```\n",
        hash = request.short_hash,
        author = sanitize_for_prompt(&request.author),
        date = request.date,
        count = request.files.len(),
        diff = neutralize_fences(&request.diff),
    )
}

/// Strip line breaks and fences from short metadata fields.
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("```", "'''")
        .lines()
        .next()
        .unwrap_or("")
        .to_string()
}

/// Replace triple backticks so diff content cannot close the prompt's fence.
///
/// The replacement has the same length, so budgets still hold.
fn neutralize_fences(diff: &str) -> String {
    diff.replace("```", "'''")
}
