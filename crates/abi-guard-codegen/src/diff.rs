//! Unified-diff rendering for drift detection: renders the difference
//! between an existing artifact and the freshly-rendered replacement the
//! same way a `diff -u` / `git diff` would.

const CONTEXT: usize = 3;

#[must_use]
pub fn normalized_lines(value: &str) -> Vec<String> {
    value.replace("\r\n", "\n").split('\n').map(str::to_string).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

/// Longest-common-subsequence line diff, walked back into a flat op list.
fn diff_ops(old: &[String], new: &[String]) -> Vec<(Op, usize, usize)> {
    let n = old.len();
    let m = new.len();
    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push((Op::Equal, i, j));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            ops.push((Op::Delete, i, j));
            i += 1;
        } else {
            ops.push((Op::Insert, i, j));
            j += 1;
        }
    }
    while i < n {
        ops.push((Op::Delete, i, j));
        i += 1;
    }
    while j < m {
        ops.push((Op::Insert, i, j));
        j += 1;
    }
    ops
}

/// Renders a `difflib.unified_diff`-equivalent patch: empty when the two
/// texts are identical, otherwise hunks with `CONTEXT` lines of surrounding
/// context per change.
#[must_use]
pub fn compute_unified_diff(old_content: &str, new_content: &str, old_label: &str, new_label: &str) -> String {
    let old_lines = normalized_lines(old_content);
    let new_lines = normalized_lines(new_content);
    if old_lines == new_lines {
        return String::new();
    }

    let ops = diff_ops(&old_lines, &new_lines);

    let mut groups: Vec<Vec<(Op, usize, usize)>> = Vec::new();
    let mut current: Vec<(Op, usize, usize)> = Vec::new();
    let mut last_change_idx: Option<usize> = None;

    for (idx, op) in ops.iter().enumerate() {
        if op.0 == Op::Equal {
            if let Some(last) = last_change_idx {
                if idx - last > CONTEXT * 2 && !current.is_empty() {
                    groups.push(std::mem::take(&mut current));
                }
            }
            current.push(*op);
        } else {
            current.push(*op);
            last_change_idx = Some(idx);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    let mut out = Vec::new();
    out.push(format!("--- {old_label}"));
    out.push(format!("+++ {new_label}"));

    for group in groups {
        // trim leading/trailing pure-equal runs down to CONTEXT lines
        let first_change = group.iter().position(|op| op.0 != Op::Equal);
        let last_change = group.iter().rposition(|op| op.0 != Op::Equal);
        let (Some(first_change), Some(last_change)) = (first_change, last_change) else {
            continue;
        };
        let start = first_change.saturating_sub(CONTEXT);
        let end = (last_change + 1 + CONTEXT).min(group.len());
        let slice = &group[start..end];

        let old_start = slice.iter().find(|op| op.0 != Op::Insert).map(|op| op.1);
        let new_start = slice.iter().find(|op| op.0 != Op::Delete).map(|op| op.2);
        let old_count = slice.iter().filter(|op| op.0 != Op::Insert).count();
        let new_count = slice.iter().filter(|op| op.0 != Op::Delete).count();

        out.push(format!(
            "@@ -{},{} +{},{} @@",
            old_start.unwrap_or(0) + 1,
            old_count,
            new_start.unwrap_or(0) + 1,
            new_count
        ));

        for (op, i, j) in slice {
            match op {
                Op::Equal => out.push(format!(" {}", old_lines[*i])),
                Op::Delete => out.push(format!("-{}", old_lines[*i])),
                Op::Insert => out.push(format!("+{}", new_lines[*j])),
            }
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_produces_empty_diff() {
        assert_eq!(compute_unified_diff("a\nb\n", "a\nb\n", "a/x", "b/x"), "");
    }

    #[test]
    fn single_line_change_is_reflected_as_delete_and_insert() {
        let diff = compute_unified_diff("a\nb\nc\n", "a\nB\nc\n", "a/x", "b/x");
        assert!(diff.contains("-b"));
        assert!(diff.contains("+B"));
        assert!(diff.starts_with("--- a/x\n+++ b/x"));
    }

    #[test]
    fn appended_line_shows_as_pure_insert() {
        let diff = compute_unified_diff("a\n", "a\nb\n", "a/x", "b/x");
        assert!(diff.contains("+b"));
        assert!(!diff.contains("-a"));
    }
}
