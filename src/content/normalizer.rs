use crate::types::{Article, NormalizedExcerpt};

/// Appended when text had to be cut mid-sentence.
pub const TRUNCATION_MARKER: &str = " [...]";

const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Produce the model-ready excerpt of an article.
///
/// The article's full text (or its summary when the full text is empty) is
/// cleaned up and then bounded to `max_length` characters, cutting at the last
/// sentence end that fits. Without such a boundary the text is hard-cut and
/// [`TRUNCATION_MARKER`] appended, still within `max_length`.
///
/// Pure and idempotent: normalizing an excerpt's text again with the same
/// bound returns it unchanged.
pub fn normalize(article: &Article, max_length: usize) -> NormalizedExcerpt {
    normalize_with_outcome(article, max_length).0
}

/// Like [`normalize`], also reporting whether any content was dropped.
pub fn normalize_with_outcome(article: &Article, max_length: usize) -> (NormalizedExcerpt, bool) {
    let source = if article.full_text.trim().is_empty() {
        &article.summary
    } else {
        &article.full_text
    };

    let (text, truncated) = truncate_text(&clean_text(source), max_length);

    (
        NormalizedExcerpt {
            identifier: article.identifier.clone(),
            text,
        },
        truncated,
    )
}

/// Tidy plain-text article content.
///
/// Normalises line endings, strips trailing whitespace, reduces MediaWiki
/// `== Heading ==` lines to their text and collapses runs of blank lines.
pub fn clean_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    let mut pending_newlines = 0usize;

    for line in unified.split('\n') {
        let mut line = line.trim_end();
        while let Some(inner) = heading_text(line) {
            line = inner;
        }

        if line.is_empty() {
            pending_newlines += 1;
            continue;
        }

        if !out.is_empty() {
            // One line break, or a single blank line at most.
            out.push_str(if pending_newlines > 0 { "\n\n" } else { "\n" });
        }
        pending_newlines = 0;
        out.push_str(line);
    }

    // Leading indentation of the very first line is not meaningful.
    out.trim_start().to_string()
}

fn heading_text(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.len() >= 4 && trimmed.starts_with("==") && trimmed.ends_with("==") {
        Some(trimmed.trim_matches('=').trim())
    } else {
        None
    }
}

/// Bound `text` to `max_length` characters, preferring a sentence boundary.
///
/// Returns the bounded text and whether anything was removed.
pub fn truncate_text(text: &str, max_length: usize) -> (String, bool) {
    let limit = match text.char_indices().nth(max_length) {
        Some((byte_idx, _)) => byte_idx,
        None => return (text.to_string(), false),
    };

    if let Some(end) = last_sentence_end(text, limit) {
        return (text[..end].to_string(), true);
    }

    // No room for the marker: keep the bare prefix, tidied again since the
    // cut can leave trailing whitespace or turn its last line into a heading.
    let marker_len = TRUNCATION_MARKER.chars().count();
    if max_length <= marker_len {
        return (clean_text(&text[..limit]), true);
    }

    let keep = max_length - marker_len;
    let keep_idx = text
        .char_indices()
        .nth(keep)
        .map(|(idx, _)| idx)
        .unwrap_or(limit);

    let mut cut = text[..keep_idx].trim_end().to_string();
    cut.push_str(TRUNCATION_MARKER);
    (cut, true)
}

/// Byte offset just past the last sentence terminator that ends within
/// `limit` and is followed by whitespace or the end of the text.
fn last_sentence_end(text: &str, limit: usize) -> Option<usize> {
    let mut best = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let end = idx + c.len_utf8();
        if end > limit {
            break;
        }
        if !SENTENCE_TERMINATORS.contains(&c) {
            continue;
        }
        let followed_by_break = match chars.peek() {
            Some((_, next)) => next.is_whitespace(),
            None => true,
        };
        if followed_by_break {
            best = Some(end);
        }
    }

    best
}
