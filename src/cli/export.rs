//! Markdown export of research results

use crate::types::ResearchResult;
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name used when exporting into a directory.
pub fn export_file_name(timestamp: DateTime<Local>) -> String {
    format!("wikipedia_research_{}.md", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Render a result as a markdown document.
pub fn to_markdown(result: &ResearchResult) -> String {
    let mut doc = format!(
        "# Research Query: {}\n\n## Answer:\n{}\n\n## Sources:\n",
        result.query,
        result.answer.trim()
    );

    if result.sources.is_empty() {
        doc.push_str("_No sources._\n");
    }
    for (i, article) in result.sources.iter().enumerate() {
        doc.push_str(&format!("{}. {} - {}\n", i + 1, article.identifier, article.url));
    }

    if !result.warnings.is_empty() {
        doc.push_str("\n## Warnings:\n");
        for warning in &result.warnings {
            doc.push_str(&format!("- {}\n", warning));
        }
    }
    doc
}

/// Write `result` to `path`, or to a timestamped file when `path` is a directory.
///
/// Returns the path actually written.
pub fn export_markdown(result: &ResearchResult, path: &Path) -> io::Result<PathBuf> {
    let target = if path.is_dir() {
        path.join(export_file_name(Local::now()))
    } else {
        path.to_path_buf()
    };
    fs::write(&target, to_markdown(result))?;
    Ok(target)
}
