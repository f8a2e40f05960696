//! Minimal rich-text handling for OSD strings
//!
//! Only line structure matters on screen: `<br>` and newlines break lines,
//! opening or closing `p` / `div` tags start a new block, every other tag is
//! dropped and a handful of entities are decoded.

const ENTITIES: [(&str, char); 6] = [
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("#39", '\''),
    ("nbsp", '\u{a0}'),
];

enum Tag {
    LineBreak,
    Block,
    Other,
}

fn classify(tag: &str) -> Tag {
    let tag = tag.trim().trim_end_matches('/').trim().to_ascii_lowercase();
    let name = tag.split_whitespace().next().unwrap_or_default();
    match name {
        "br" => Tag::LineBreak,
        "p" | "/p" | "div" | "/div" => Tag::Block,
        _ => Tag::Other,
    }
}

fn decode_entity(rest: &str) -> Option<(char, usize)> {
    let end = rest.char_indices().take(8).find(|&(_, c)| c == ';')?.0;
    let name = &rest[1..end];
    ENTITIES
        .iter()
        .find(|(entity, _)| *entity == name)
        .map(|&(_, c)| (c, end + 1))
}

/// Split OSD markup into display lines
pub fn to_lines(markup: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    // Whether `current` must be emitted even when empty
    let mut open = false;
    let mut i = 0;

    while i < markup.len() {
        let rest = &markup[i..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        match c {
            '<' => {
                if let Some(close) = rest.find('>') {
                    match classify(&rest[1..close]) {
                        Tag::LineBreak => {
                            lines.push(std::mem::take(&mut current));
                            open = true;
                        }
                        // Adjacent block tags share one boundary
                        Tag::Block => {
                            if !current.is_empty() {
                                lines.push(std::mem::take(&mut current));
                            }
                            open = false;
                        }
                        Tag::Other => {}
                    }
                    i += close + 1;
                    continue;
                }
                current.push('<');
            }
            '&' => {
                if let Some((decoded, consumed)) = decode_entity(rest) {
                    current.push(decoded);
                    open = true;
                    i += consumed;
                    continue;
                }
                current.push('&');
            }
            '\n' => lines.push(std::mem::take(&mut current)),
            '\r' => {}
            _ => current.push(c),
        }

        if c != '\r' {
            open = true;
        }
        i += c.len_utf8();
    }

    if open || !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_text_lines() {
        let lines = to_lines("OSD by @trystan4861<br><br>[run OSD -h]");
        assert_eq!(lines, vec!["OSD by @trystan4861", "", "[run OSD -h]"]);
    }

    #[test]
    fn test_break_variants_and_newlines() {
        assert_eq!(to_lines("a<BR/>b<br />c\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(to_lines("a\r\nb"), vec!["a", "b"]);
    }

    #[test]
    fn test_other_tags_are_stripped() {
        assert_eq!(to_lines("<b>bold</b> and <i>italic</i>"), vec!["bold and italic"]);
        assert_eq!(to_lines("<p>one</p><p>two</p>"), vec!["one", "two"]);
    }

    #[test]
    fn test_paragraphs_and_divs_start_lines() {
        assert_eq!(to_lines("one<p>two"), vec!["one", "two"]);
        assert_eq!(to_lines("one<div>two</div>"), vec!["one", "two"]);
        assert_eq!(to_lines("<div><p>one</p></div><P class=\"x\">two"), vec!["one", "two"]);
        assert_eq!(to_lines("one</p>"), vec!["one"]);
    }

    #[test]
    fn test_trailing_break_keeps_empty_line() {
        assert_eq!(to_lines("one<br>"), vec!["one", ""]);
        assert_eq!(to_lines("one\n"), vec!["one", ""]);
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(to_lines("a &lt;b&gt; &amp; c"), vec!["a <b> & c"]);
        assert_eq!(to_lines("fish &chips;"), vec!["fish &chips;"]);
    }

    #[test]
    fn test_unclosed_angle_bracket_is_literal() {
        assert_eq!(to_lines("1 < 2"), vec!["1 < 2"]);
    }

    #[test]
    fn test_empty_text_is_one_empty_line() {
        assert_eq!(to_lines(""), vec![""]);
    }
}
