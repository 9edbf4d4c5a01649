//! Acrostic poem layout.
//!
//! The first two lines of a poem are its title and subtitle. Every later line
//! is either a blank spacer or a verse whose first character is pulled out so
//! the client can draw it as a large initial.

use serde::Serialize;

/// One body line of a rendered poem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineItem {
    /// Fixed vertical space. Does not consume a verse slot.
    Blank,
    Verse { initial: char, rest: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedPoem {
    pub title: String,
    pub subtitle: String,
    pub lines: Vec<LineItem>,
}

impl RenderedPoem {
    /// The acrostic word spelled by the verse initials.
    pub fn acrostic(&self) -> String {
        self.lines
            .iter()
            .filter_map(|l| match l {
                LineItem::Verse { initial, .. } => Some(*initial),
                LineItem::Blank => None,
            })
            .collect()
    }
}

/// Lays out raw poem text. Never fails: missing title or subtitle lines come
/// back as empty strings.
pub fn layout(poem_text: &str) -> RenderedPoem {
    let mut lines = poem_text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l));

    let title = lines.next().unwrap_or_default().to_string();
    let subtitle = lines.next().unwrap_or_default().to_string();
    let lines = lines.map(layout_line).collect();

    RenderedPoem {
        title,
        subtitle,
        lines,
    }
}

fn layout_line(line: &str) -> LineItem {
    if line.trim().is_empty() {
        return LineItem::Blank;
    }

    // Non-blank, so there is at least one char. Split on its UTF-8 width.
    let mut chars = line.chars();
    match chars.next() {
        Some(initial) => LineItem::Verse {
            initial,
            rest: chars.as_str().to_string(),
        },
        None => LineItem::Blank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::content::POEM;

    fn verse(initial: char, rest: &str) -> LineItem {
        LineItem::Verse {
            initial,
            rest: rest.to_string(),
        }
    }

    #[test]
    fn test_empty_input_yields_empty_poem() {
        assert_eq!(layout(""), RenderedPoem::default());
    }

    #[test]
    fn test_single_line_has_empty_subtitle() {
        let poem = layout("Only a title");
        assert_eq!(poem.title, "Only a title");
        assert_eq!(poem.subtitle, "");
        assert!(poem.lines.is_empty());
    }

    #[test]
    fn test_title_and_subtitle_are_taken_verbatim() {
        let poem = layout("\n   \nSun");
        assert_eq!(poem.title, "");
        assert_eq!(poem.subtitle, "   ");
        assert_eq!(poem.lines, vec![verse('S', "un")]);
    }

    #[test]
    fn test_body_line_count_is_total_minus_two() {
        let text = "T\nS\nA\n\nB\n   \nC\n";
        let total = text.split('\n').count();
        let poem = layout(text);
        assert_eq!(poem.lines.len(), total - 2);
        assert_eq!(
            poem.lines,
            vec![
                verse('A', ""),
                LineItem::Blank,
                verse('B', ""),
                LineItem::Blank,
                verse('C', ""),
                LineItem::Blank,
            ]
        );
    }

    #[test]
    fn test_whitespace_only_lines_are_blank() {
        let poem = layout("t\ns\n\t \n \u{3000}");
        assert_eq!(poem.lines, vec![LineItem::Blank, LineItem::Blank]);
    }

    #[test]
    fn test_multibyte_initial_is_not_split() {
        let poem = layout("t\ns\n🌸 bloom\nÉté\n");
        assert_eq!(poem.lines[0], verse('🌸', " bloom"));
        assert_eq!(poem.lines[1], verse('É', "té"));
    }

    #[test]
    fn test_initial_plus_rest_reconstructs_line() {
        let poem = layout(POEM);
        let body: Vec<&str> = POEM.split('\n').skip(2).collect();
        assert_eq!(poem.lines.len(), body.len());
        for (item, raw) in poem.lines.iter().zip(body) {
            match item {
                LineItem::Verse { initial, rest } => {
                    assert_eq!(format!("{initial}{rest}"), raw);
                }
                LineItem::Blank => assert!(raw.trim().is_empty()),
            }
        }
    }

    #[test]
    fn test_leading_space_is_kept_as_initial() {
        let poem = layout("t\ns\n  indented");
        assert_eq!(poem.lines, vec![verse(' ', " indented")]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let poem = layout("Title\r\nSub\r\nAbc\r\n\r\nDef");
        assert_eq!(poem.title, "Title");
        assert_eq!(poem.subtitle, "Sub");
        assert_eq!(
            poem.lines,
            vec![verse('A', "bc"), LineItem::Blank, verse('D', "ef")]
        );
    }

    #[test]
    fn test_canned_poem_spells_the_full_name() {
        let poem = layout(POEM);
        assert_eq!(poem.acrostic(), "SRIYAREDDY");
        assert_eq!(poem.lines.len(), 12);
    }

    #[test]
    fn test_layout_is_deterministic() {
        assert_eq!(layout(POEM), layout(POEM));
    }
}
