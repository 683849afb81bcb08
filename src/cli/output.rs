//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for wikiresearch.

use crate::types::{ArticleStatus, ResearchResult};
use owo_colors::OwoColorize;

/// Summaries longer than this are shortened in the source list.
const SUMMARY_PREVIEW_CHARS: usize = 200;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a block of text indented under a header
    pub fn paragraph(&self, text: &str) {
        for line in text.lines() {
            println!("    {}", line);
        }
    }

    /// Print one cited source
    pub fn source(&self, index: usize, title: &str, url: &str, summary: &str, truncated: bool) {
        let preview = preview(summary, SUMMARY_PREVIEW_CHARS);
        if self.colored {
            let marker = if truncated { " (excerpt)" } else { "" };
            println!(
                "    {} {}{}",
                format!("{}.", index).bright_cyan().bold(),
                title.bright_white().bold(),
                marker.dimmed()
            );
            if !url.is_empty() {
                println!("       {}", url.blue().underline());
            }
            if !preview.is_empty() {
                println!("       {}", preview.dimmed());
            }
        } else {
            let marker = if truncated { " (excerpt)" } else { "" };
            println!("    {}. {}{}", index, title, marker);
            if !url.is_empty() {
                println!("       {}", url);
            }
            if !preview.is_empty() {
                println!("       {}", preview);
            }
        }
    }

    /// Render a complete research result
    pub fn research_result(&self, result: &ResearchResult) {
        let heading = if !result.is_completed() {
            "Research Aborted"
        } else if result.synthesized {
            "Answer"
        } else {
            "Answer (article summaries)"
        };
        self.header(heading);
        self.paragraph(&result.answer);

        if !result.sources.is_empty() {
            self.header(&format!("Sources ({})", result.sources.len()));
            for (i, article) in result.sources.iter().enumerate() {
                self.source(
                    i + 1,
                    &article.identifier,
                    &article.url,
                    &article.summary,
                    article.status == ArticleStatus::Truncated,
                );
            }
        }

        if !result.warnings.is_empty() {
            self.header("Warnings");
            for warning in &result.warnings {
                self.warning(warning);
            }
        }

        println!();
        self.kv("Completed in", &format!("{} ms", result.duration_ms));
    }
}

/// Shorten `text` to `max_chars`, appending an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
