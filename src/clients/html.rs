//! HTML-to-text reduction for wiki storage bodies

use regex::Regex;
use std::sync::OnceLock;

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

fn whitespace_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Entities decoded after tag removal; `&amp;` first, matching storage order
const ENTITIES: [(&str, &str); 6] = [
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", " "),
];

/// Strip tags, decode the common entities and collapse whitespace
pub fn strip_html(html: &str) -> String {
    let mut text = tag_pattern().replace_all(html, " ").into_owned();
    for (entity, replacement) in ENTITIES {
        text = text.replace(entity, replacement);
    }
    whitespace_pattern()
        .replace_all(&text, " ")
        .trim()
        .to_string()
}
