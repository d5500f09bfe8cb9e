//! Word wrapping and SVG text layout for fixed certificate regions.
//!
//! Widths are estimates: every character counts as one unit at the
//! reference font size, scaled by font size and weight. No font metrics
//! are involved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Marks an intentional double line break; rendered as one empty line.
pub const PARAGRAPH_BREAK: &str = "\n\n";

const REFERENCE_FONT_SIZE: f64 = 10.0;
const BOLD_WIDTH_FACTOR: f64 = 1.1;
const LINE_HEIGHT_RATIO: f64 = 1.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "bold" | "bolder" | "600" | "700" | "800" | "900" => FontWeight::Bold,
            _ => FontWeight::Normal,
        }
    }
}

/// Boundary and font settings for one wrapped block.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Maximum line width in character units.
    pub max_width: f64,
    pub font_size: f64,
    pub font_weight: FontWeight,
    /// Vertical advance per line.
    pub line_height: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_width: 80.0,
            font_size: REFERENCE_FONT_SIZE,
            font_weight: FontWeight::Normal,
            line_height: REFERENCE_FONT_SIZE * LINE_HEIGHT_RATIO,
        }
    }
}

impl LayoutOptions {
    pub fn new(max_width: f64, font_size: f64, font_weight: FontWeight) -> Self {
        Self {
            max_width,
            font_size,
            font_weight,
            line_height: font_size * LINE_HEIGHT_RATIO,
        }
    }

    /// Read `maxWidth`, `fontSize`, `fontWeight` and `lineHeight` from
    /// template hash arguments, keeping defaults for anything missing.
    pub fn from_hash(hash: &Map<String, Value>) -> Self {
        let font_size = number_arg(hash, "fontSize").unwrap_or(REFERENCE_FONT_SIZE);
        let font_weight = hash
            .get("fontWeight")
            .map(|v| match v {
                Value::String(s) => FontWeight::parse(s),
                other => FontWeight::parse(&other.to_string()),
            })
            .unwrap_or_default();
        let mut options = Self::new(
            number_arg(hash, "maxWidth").unwrap_or(Self::default().max_width),
            font_size,
            font_weight,
        );
        if let Some(line_height) = number_arg(hash, "lineHeight") {
            options.line_height = line_height;
        }
        options
    }

    pub fn letter_scale(&self) -> f64 {
        let weight = match self.font_weight {
            FontWeight::Bold => BOLD_WIDTH_FACTOR,
            FontWeight::Normal => 1.0,
        };
        self.font_size / REFERENCE_FONT_SIZE * weight
    }

    pub fn estimate_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.letter_scale()
    }
}

/// Numeric template argument; numbers may arrive as strings.
pub(crate) fn number_arg(hash: &Map<String, Value>, key: &str) -> Option<f64> {
    match hash.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Position shared by the layout calls of one wrap group.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutCursor {
    pub x: f64,
    pub y: f64,
    pub line_length: f64,
}

impl LayoutCursor {
    pub fn new(x: f64, y: f64, line_length: f64) -> Self {
        Self { x, y, line_length }
    }

    pub fn from_hash(hash: &Map<String, Value>) -> Self {
        Self {
            x: number_arg(hash, "x").unwrap_or(0.0),
            y: number_arg(hash, "y").unwrap_or(0.0),
            line_length: number_arg(hash, "lineLength")
                .or_else(|| number_arg(hash, "maxWidth"))
                .unwrap_or(LayoutOptions::default().max_width),
        }
    }
}

thread_local! {
    // Open wrap groups on this thread, innermost last. Template rendering is
    // synchronous, so a group never outlives the call that opened it.
    static OPEN_GROUPS: RefCell<Vec<LayoutCursor>> = const { RefCell::new(Vec::new()) };
}

struct GroupGuard;

impl Drop for GroupGuard {
    fn drop(&mut self) {
        OPEN_GROUPS.with(|groups| {
            groups.borrow_mut().pop();
        });
    }
}

/// Run `block` with `cursor` as the innermost group cursor.
///
/// Layout calls anywhere inside `block`, however deeply nested, share the
/// cursor through [`with_group_cursor`]. The cursor is discarded when
/// `block` returns or unwinds, so nothing leaks into the next group.
pub fn with_wrap_group<R>(cursor: LayoutCursor, block: impl FnOnce() -> R) -> R {
    OPEN_GROUPS.with(|groups| groups.borrow_mut().push(cursor));
    let _guard = GroupGuard;
    block()
}

/// Apply `f` to the innermost open group cursor. `None` outside any group.
pub fn with_group_cursor<R>(f: impl FnOnce(&mut LayoutCursor) -> R) -> Option<R> {
    OPEN_GROUPS.with(|groups| groups.borrow_mut().last_mut().map(f))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Break,
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '«' | '»' | '…' | '–' | '—')
}

fn ends_with_punctuation(word: &str) -> bool {
    word.chars().last().is_some_and(is_punctuation)
}

fn tokenize(text: &str) -> VecDeque<Token> {
    let mut tokens = VecDeque::new();
    for (index, paragraph) in text.split(PARAGRAPH_BREAK).enumerate() {
        if index > 0 {
            tokens.push_back(Token::Break);
        }
        for raw in paragraph.split_whitespace() {
            let punctuation_only = raw.chars().all(is_punctuation);
            match tokens.back_mut() {
                Some(Token::Word(previous)) if punctuation_only => {
                    previous.push(' ');
                    previous.push_str(raw);
                }
                _ => tokens.push_back(Token::Word(raw.to_string())),
            }
        }
    }
    tokens
}

/// Lazily wrapped lines of one text block.
pub struct WrappedLines<'a> {
    options: &'a LayoutOptions,
    tokens: VecDeque<Token>,
}

impl Iterator for WrappedLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut line = String::new();
        // Set once a punctuation-terminated word has crossed the boundary.
        let mut overflowing = false;

        while let Some(token) = self.tokens.pop_front() {
            let word = match token {
                Token::Break if line.is_empty() => return Some(String::new()),
                Token::Break => {
                    self.tokens.push_front(Token::Break);
                    return Some(line);
                }
                Token::Word(word) => word,
            };

            let candidate = if line.is_empty() {
                word.clone()
            } else {
                format!("{line} {word}")
            };
            let too_wide = self.options.estimate_width(&candidate) > self.options.max_width;
            let punctuated = ends_with_punctuation(&word);

            if too_wide && !line.is_empty() && !overflowing && !punctuated {
                self.tokens.push_front(Token::Word(word));
                return Some(line);
            }

            line = candidate;
            if too_wide {
                if punctuated {
                    overflowing = true;
                } else {
                    return Some(line);
                }
            }
        }

        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }
}

/// Wrap `text` at word boundaries within `options.max_width`.
///
/// A word ending in punctuation never forces a break: when such a word
/// crosses the boundary it stays on the line and the break falls after the
/// next word instead.
pub fn wrap_lines<'a>(text: &str, options: &'a LayoutOptions) -> WrappedLines<'a> {
    WrappedLines {
        options,
        tokens: tokenize(text),
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render wrapped `text` as `<tspan>` fragments starting at the cursor.
///
/// The cursor's `y` advances by one line height per emitted line, empty
/// lines included, so the next call continues below.
pub fn render_tspans(text: &str, options: &LayoutOptions, cursor: &mut LayoutCursor) -> String {
    let mut fragment = String::new();
    for line in wrap_lines(text, options) {
        if !line.is_empty() {
            fragment.push_str(&format!(
                r#"<tspan x="{}" y="{}">{}</tspan>"#,
                cursor.x,
                cursor.y,
                escape_xml(&line)
            ));
        }
        cursor.y += options.line_height;
    }
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str, max_width: f64) -> Vec<String> {
        let options = LayoutOptions::new(max_width, 10.0, FontWeight::Normal);
        wrap_lines(text, &options).collect()
    }

    #[test]
    fn test_greedy_wrap_keeps_lines_within_boundary() {
        assert_eq!(lines("un deux trois quatre", 8.0), vec!["un deux", "trois", "quatre"]);
        for line in lines("ny zaza dia teraka tao amin'ny hopitaly", 12.0) {
            assert!(line.chars().count() <= 12 || !line.contains(' '));
        }
    }

    #[test]
    fn test_punctuation_does_not_force_break() {
        assert_eq!(
            lines("aaaa bbbbb, cccc dddd", 10.0),
            vec!["aaaa bbbbb, cccc", "dddd"]
        );
    }

    #[test]
    fn test_punctuation_token_attaches_to_previous_word() {
        assert_eq!(lines("Rakoto : mpamboly", 8.0), vec!["Rakoto :", "mpamboly"]);
    }

    #[test]
    fn test_paragraph_break_is_empty_line() {
        assert_eq!(lines("voalohany\n\nfaharoa", 40.0), vec!["voalohany", "", "faharoa"]);
    }

    #[test]
    fn test_bold_and_size_scale_widths() {
        let bold = LayoutOptions::new(10.0, 10.0, FontWeight::Bold);
        assert!((bold.estimate_width("abcde") - 5.5).abs() < 1e-9);
        let large = LayoutOptions::new(10.0, 20.0, FontWeight::Normal);
        assert_eq!(large.estimate_width("abcde"), 10.0);
        assert_eq!(FontWeight::parse("700"), FontWeight::Bold);
    }

    #[test]
    fn test_render_tspans_advances_cursor() {
        let mut options = LayoutOptions::new(8.0, 10.0, FontWeight::Normal);
        options.line_height = 12.0;
        let mut cursor = LayoutCursor::new(5.0, 100.0, 8.0);
        let svg = render_tspans("un deux\n\n<trois>", &options, &mut cursor);
        assert_eq!(
            svg,
            r#"<tspan x="5" y="100">un deux</tspan><tspan x="5" y="124">&lt;trois&gt;</tspan>"#
        );
        assert_eq!(cursor.y, 136.0);
    }

    #[test]
    fn test_wrap_group_scopes_cursor() {
        let mut options = LayoutOptions::new(40.0, 10.0, FontWeight::Normal);
        options.line_height = 14.0;
        let (first, second) = with_wrap_group(LayoutCursor::new(0.0, 10.0, 40.0), || {
            let first = with_group_cursor(|c| render_tspans("andalana voalohany", &options, c));
            let second = with_group_cursor(|c| render_tspans("andalana faharoa", &options, c));
            (first.unwrap(), second.unwrap())
        });
        assert!(first.contains(r#"y="10""#));
        assert!(second.contains(r#"y="24""#));
        assert!(with_group_cursor(|c| c.y).is_none());
    }

    #[test]
    fn test_nested_groups_restore_outer_cursor() {
        with_wrap_group(LayoutCursor::new(0.0, 10.0, 40.0), || {
            with_group_cursor(|c| c.y += 5.0);
            with_wrap_group(LayoutCursor::new(0.0, 300.0, 40.0), || {
                assert_eq!(with_group_cursor(|c| c.y), Some(300.0));
            });
            assert_eq!(with_group_cursor(|c| c.y), Some(15.0));
        });
    }

    #[test]
    fn test_group_closed_after_panic() {
        let result = std::panic::catch_unwind(|| {
            with_wrap_group(LayoutCursor::new(0.0, 10.0, 40.0), || panic!("render failed"))
        });
        assert!(result.is_err());
        assert!(with_group_cursor(|c| c.y).is_none());
    }

    #[test]
    fn test_options_from_hash() {
        let hash = serde_json::json!({ "maxWidth": "50", "fontSize": 12, "fontWeight": "bold" });
        let options = LayoutOptions::from_hash(hash.as_object().unwrap());
        assert_eq!(options.max_width, 50.0);
        assert_eq!(options.font_weight, FontWeight::Bold);
        assert!((options.line_height - 16.8).abs() < 1e-9);
    }
}
