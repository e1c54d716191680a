use similar::{ChangeTag, TextDiff};
use std::fmt::Write;
use std::path::Path;

/// Renders a unified diff (`diff -u` compatible) between two versions of a file.
pub fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    let mut out = String::new();
    if old == new {
        return out;
    }

    let diff = TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();

    let _ = writeln!(out, "--- a/{}", path_str);
    let _ = writeln!(out, "+++ b/{}", path_str);

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        let _ = writeln!(out, "{}", hunk.header());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            let _ = write!(out, "{}{}", sign, change);
            if change.missing_newline() {
                out.push('\n');
            }
        }
    }

    out
}
