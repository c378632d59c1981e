//! Plain-text rendering of comparison reports.

use std::fmt::Write;

use colored::{ColoredString, Colorize};
use dirdelta_diff::{DiffLine, InlineSpan};
use dirdelta_engine::{BatchOutcome, BatchReport, ComparisonResult, FileRecord};
use dirdelta_types::{Category, DiffSpanKind};

/// Every non-identical record with its hunks, then the summary line.
pub fn comparison(result: &ComparisonResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "---".red(), result.root1().display());
    let _ = writeln!(out, "{} {}", "+++".green(), result.root2().display());

    for record in result.differences() {
        write_record(&mut out, record);
    }

    let _ = writeln!(out, "{}", result.summary().to_string().bold());
    out
}

pub fn batch(report: &BatchReport) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        let _ = writeln!(out, "{} {}", "==".bold(), entry.job.name.bold());
        match &entry.outcome {
            BatchOutcome::Completed { result } => out.push_str(&comparison(result)),
            BatchOutcome::Failed { error } => {
                let _ = writeln!(out, "{} {}", "error:".red().bold(), error);
            }
        }
    }
    let _ = writeln!(
        out,
        "{} succeeded, {} failed",
        report.succeeded().count(),
        report.failed().count()
    );
    out
}

fn write_record(out: &mut String, record: &FileRecord) {
    let _ = write!(out, "{:>10} {}", category_label(record.category), record.path);
    if !record.tags.is_empty() {
        let tags: Vec<&str> = record.tags.iter().map(String::as_str).collect();
        let _ = write!(out, " [{}]", tags.join(", ").cyan());
    }
    if record.decode_fallback {
        let _ = write!(out, " {}", "(not UTF-8)".dimmed());
    }
    out.push('\n');

    if record.category == Category::HashOnly {
        if let (Some(old), Some(new)) = (&record.old_meta, &record.new_meta) {
            if let (Some(a), Some(b)) = (old.hash, new.hash) {
                let _ = writeln!(out, "    {} -> {}", a.short_hex(), b.short_hex());
            }
        }
    }

    for hunk in &record.hunks {
        let _ = writeln!(out, "    {}", hunk.header().cyan());
        for line in &hunk.lines {
            let _ = writeln!(out, "    {}", render_line(line));
        }
    }
}

fn category_label(category: Category) -> ColoredString {
    let label = category.as_str();
    match category {
        Category::Identical => label.normal(),
        Category::Changed => label.yellow(),
        Category::Added => label.green(),
        Category::Removed => label.red(),
        Category::HashOnly => label.magenta(),
        Category::Incomplete => label.dimmed(),
    }
}

fn render_line(line: &DiffLine) -> String {
    let prefix = line.prefix().to_string();
    let body = match &line.inline {
        Some(spans) => render_spans(spans, line.kind),
        None => line.content().to_string(),
    };
    match line.kind {
        DiffSpanKind::Delete => format!("{}{}", prefix.red(), body),
        DiffSpanKind::Insert => format!("{}{}", prefix.green(), body),
        _ => format!("{prefix}{body}"),
    }
}

/// Changed characters are highlighted; unchanged ones take the line color.
fn render_spans(spans: &[InlineSpan], line_kind: DiffSpanKind) -> String {
    spans
        .iter()
        .map(|span| {
            let text = span.text.trim_end_matches(['\n', '\r']);
            let styled = match (span.kind, line_kind) {
                (DiffSpanKind::Equal, DiffSpanKind::Delete) => text.red(),
                (DiffSpanKind::Equal, _) => text.green(),
                (_, DiffSpanKind::Delete) => text.white().on_red(),
                _ => text.black().on_green(),
            };
            styled.to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use dirdelta_engine::{classify, BatchEntry, BatchJob, CompareConfig};

    use super::*;

    fn tree(root: &Path, files: &[(&str, &str)]) {
        std::fs::create_dir_all(root).unwrap();
        for (rel, content) in files {
            std::fs::write(root.join(rel), content).unwrap();
        }
    }

    #[test]
    fn text_report_lists_differences() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = (dir.path().join("a"), dir.path().join("b"));
        tree(&a, &[("same.txt", "x\n"), ("f.txt", "one\ntwo\nthree\n"), ("gone.txt", "g\n")]);
        tree(&b, &[("same.txt", "x\n"), ("f.txt", "one\ntoo\nthree\n")]);

        let result = classify(&a, &b, &CompareConfig::default()).unwrap();
        let text = comparison(&result);

        assert!(text.contains("   changed f.txt"));
        assert!(text.contains("   removed gone.txt"));
        assert!(!text.contains("same.txt"));
        assert!(text.contains("@@ -1,3 +1,3 @@"));
        assert!(text.contains("-two"));
        assert!(text.contains("+too"));
        assert!(text.contains(" one"));
        assert!(text.contains("3 files: 1 identical, 1 changed, 0 added, 1 removed, 0 hash-only"));
    }

    #[test]
    fn batch_report_shows_failures() {
        colored::control::set_override(false);
        let report = BatchReport {
            entries: vec![BatchEntry {
                job: BatchJob::new("broken", "/a", "/b"),
                outcome: BatchOutcome::Failed {
                    error: "configuration error: root /a does not exist".into(),
                },
            }],
        };
        let text = batch(&report);
        assert!(text.contains("== broken"));
        assert!(text.contains("error: configuration error"));
        assert!(text.ends_with("0 succeeded, 1 failed\n"));
    }
}
