//! Parser for the narrative markup dialect.
//!
//! The dialect is line oriented: `**Heading**` lines are section headers,
//! lines opening with `*` are bullets, anything else is a body paragraph.
//! Within a line, `**span**` is bold. Inside bullets a lone `*` is drawn as
//! a bullet glyph. An unterminated `**` is kept as literal text.

/// Classification of a single trimmed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Header,
    Bullet,
    Body,
}

impl LineKind {
    pub fn classify(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            LineKind::Blank
        } else if line.len() >= 4 && line.starts_with("**") && line.ends_with("**") {
            LineKind::Header
        } else if line.starts_with('*') {
            LineKind::Bullet
        } else {
            LineKind::Body
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Bold(&'a str),
    Literal(String),
    Glyph,
}

/// Split a line into bold spans, literal runs and (in bullet mode) glyphs.
fn tokenize(line: &str, bullet_mode: bool) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = line;

    while let Some(ch) = rest.chars().next() {
        if rest.starts_with("**") {
            if let Some(end) = rest[2..].find("**") {
                flush(&mut literal, &mut tokens);
                tokens.push(Token::Bold(&rest[2..2 + end]));
                rest = &rest[2 + end + 2..];
                continue;
            }
            // Unterminated marker.
            literal.push_str("**");
            rest = &rest[2..];
            continue;
        }

        if ch == '*' && bullet_mode {
            flush(&mut literal, &mut tokens);
            tokens.push(Token::Glyph);
        } else {
            literal.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }

    flush(&mut literal, &mut tokens);
    tokens
}

fn flush(literal: &mut String, tokens: &mut Vec<Token<'_>>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

/// One styled run inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Glyph,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Spacer,
    Header(String),
    Bullet(Vec<Inline>),
    Body(Vec<Inline>),
}

/// Parsed narrative, ready for layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Narrative {
    pub blocks: Vec<Block>,
    /// Last header seen while parsing.
    pub current_section: Option<String>,
}

pub fn parse_narrative(text: &str) -> Narrative {
    let mut narrative = Narrative::default();

    for raw in text.lines() {
        let line = raw.trim();
        let block = match LineKind::classify(line) {
            LineKind::Blank => Block::Spacer,
            LineKind::Header => {
                let title = line[2..line.len() - 2].trim().to_string();
                narrative.current_section = Some(title.clone());
                Block::Header(title)
            }
            LineKind::Bullet => Block::Bullet(inlines(tokenize(line, true))),
            LineKind::Body => Block::Body(inlines(tokenize(line, false))),
        };
        narrative.blocks.push(block);
    }

    narrative
}

// Surrounding whitespace is dropped; the layout joins runs with single spaces.
fn inlines(tokens: Vec<Token<'_>>) -> Vec<Inline> {
    tokens
        .into_iter()
        .filter_map(|token| match token {
            Token::Glyph => Some(Inline::Glyph),
            Token::Bold(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| Inline::Bold(text.to_string()))
            }
            Token::Literal(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| Inline::Text(text.to_string()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(LineKind::classify("   "), LineKind::Blank);
        assert_eq!(LineKind::classify("  **Key Strengths**  "), LineKind::Header);
        assert_eq!(LineKind::classify("* point"), LineKind::Bullet);
        assert_eq!(LineKind::classify("**"), LineKind::Bullet);
        assert_eq!(LineKind::classify("Plain text"), LineKind::Body);
    }

    #[test]
    fn test_header_is_not_a_paragraph() {
        let narrative = parse_narrative("**Overall Performance**\nYou did well.");
        assert_eq!(
            narrative.blocks,
            vec![
                Block::Header("Overall Performance".to_string()),
                Block::Body(vec![Inline::Text("You did well.".to_string())]),
            ]
        );
        assert_eq!(
            narrative.current_section.as_deref(),
            Some("Overall Performance")
        );
    }

    #[test]
    fn test_bullet_with_bold_run() {
        let narrative = parse_narrative("* **Bold** point");
        assert_eq!(
            narrative.blocks,
            vec![Block::Bullet(vec![
                Inline::Glyph,
                Inline::Bold("Bold".to_string()),
                Inline::Text("point".to_string()),
            ])]
        );
    }

    #[test]
    fn test_odd_marker_count_stays_literal() {
        let narrative = parse_narrative("Accuracy **improved in physics");
        assert_eq!(
            narrative.blocks,
            vec![Block::Body(vec![Inline::Text(
                "Accuracy **improved in physics".to_string()
            )])]
        );

        let narrative = parse_narrative("Try **Focus** on **speed");
        assert_eq!(
            narrative.blocks,
            vec![Block::Body(vec![
                Inline::Text("Try".to_string()),
                Inline::Bold("Focus".to_string()),
                Inline::Text("on **speed".to_string()),
            ])]
        );
    }

    #[test]
    fn test_single_asterisk_in_body_is_literal() {
        let narrative = parse_narrative("Score = 3 * 4");
        assert_eq!(
            narrative.blocks,
            vec![Block::Body(vec![Inline::Text("Score = 3 * 4".to_string())])]
        );
    }

    #[test]
    fn test_blank_lines_become_spacers() {
        let narrative = parse_narrative("First\n\n   \nSecond");
        assert_eq!(narrative.blocks.len(), 4);
        assert_eq!(narrative.blocks[1], Block::Spacer);
        assert_eq!(narrative.blocks[2], Block::Spacer);
        assert!(narrative.current_section.is_none());
    }

    #[test]
    fn test_glyphs_inside_bullet() {
        let narrative = parse_narrative("* Revise * Practice");
        assert_eq!(
            narrative.blocks,
            vec![Block::Bullet(vec![
                Inline::Glyph,
                Inline::Text("Revise".to_string()),
                Inline::Glyph,
                Inline::Text("Practice".to_string()),
            ])]
        );
    }
}
