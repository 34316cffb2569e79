use std::sync::OnceLock;

use regex::Regex;

pub const HEADING: &str = "## Response";

const MARKERS: [&str; 3] = ["##", "- ", "**"];

fn sentence_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.?!]\s+").expect("sentence pattern is valid"))
}

/// Turns unformatted prose into a bulleted list under [`HEADING`].
///
/// Text that already carries a markdown marker is returned as-is. Splitting
/// is purely lexical: abbreviations like "e.g. this" or "v1. 2" are broken
/// into separate bullets, and code blocks or tables get no special treatment.
pub fn enforce(text: &str) -> String {
    if MARKERS.iter().any(|marker| text.contains(marker)) {
        return text.to_string();
    }

    let fragments = split_sentences(text);
    if fragments.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + HEADING.len() + fragments.len() * 3);
    out.push_str(HEADING);
    out.push_str("\n\n");
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str("- ");
        out.push_str(fragment);
    }
    out
}

// Punctuation stays with the sentence it ends.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;
    for m in sentence_break().find_iter(text) {
        fragments.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    fragments.push(&text[start..]);

    fragments
        .into_iter()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}
