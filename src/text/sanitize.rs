use std::sync::OnceLock;

use regex::Regex;

fn script_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script pattern is valid")
    })
}

/// Best-effort cleanup of free text.
///
/// Script blocks are removed whole, then every remaining `<` and `>` is
/// dropped, then the result is trimmed. Other tags are not removed as
/// blocks: `<b>hi</b>` becomes `bhi/b`. This is not an injection defence.
pub fn sanitize(text: &str) -> String {
    let without_scripts = script_block().replace_all(text, "");
    without_scripts
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect::<String>()
        .trim()
        .to_string()
}
