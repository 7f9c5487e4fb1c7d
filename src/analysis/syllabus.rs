//! Syllabus HTML parsing.
//!
//! The test syllabus ships as a small HTML fragment: every `<h2>` names a
//! subject and the first `<ul>` after it lists that subject's topics.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h2\b[^>]*>(.*?)</h2\s*>").expect("valid heading regex"))
}

fn list_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<ul\b[^>]*>(.*?)</ul\s*>").expect("valid list regex"))
}

fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<li\b[^>]*>(.*?)(?:</li\s*>|$)").expect("valid item regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"))
}

/// Parse a syllabus fragment into subject name -> ordered topics.
///
/// A heading with no list before the next heading gets an empty topic
/// list; a later heading's list is never borrowed, unlike a plain
/// document-order "first following list" lookup. Malformed markup never
/// fails; unmatched pieces are skipped.
pub fn parse_syllabus(html: &str) -> BTreeMap<String, Vec<String>> {
    let mut syllabus = BTreeMap::new();
    let headings: Vec<_> = heading_re().captures_iter(html).collect();

    for (i, caps) in headings.iter().enumerate() {
        let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let subject = element_text(title.as_str());
        if subject.is_empty() {
            continue;
        }

        let scope_end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(html.len(), |m| m.start());
        let scope = &html[whole.end()..scope_end];

        let topics = match list_re().captures(scope).and_then(|c| c.get(1)) {
            Some(list) => item_re()
                .captures_iter(list.as_str())
                .filter_map(|c| c.get(1))
                .map(|m| element_text(m.as_str()))
                .filter(|t| !t.is_empty())
                .collect(),
            None => {
                debug!("Syllabus heading '{}' has no topic list", subject);
                Vec::new()
            }
        };

        syllabus.insert(subject, topics);
    }

    syllabus
}

/// Visible text of an HTML fragment: tags dropped, entities decoded,
/// whitespace collapsed.
fn element_text(fragment: &str) -> String {
    let stripped = tag_re().replace_all(fragment, " ");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match tail.find(';').filter(|&end| end <= 10) {
            Some(end) => match decode_entity(&tail[1..end]) {
                Some(ch) => {
                    out.push(ch);
                    rest = &tail[end + 1..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            },
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
