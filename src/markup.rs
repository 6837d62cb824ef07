//! Minimal markup used by every write: `<red>failed</>`, `<bold>title</bold>`.
//!
//! Tags nest, `</>` closes the innermost one and `<<` is a literal `<`. Tags
//! that are not known are kept as text, so rendering never fails.

use colored::{Color, ColoredString, Colorize};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Styled with ANSI escapes, for terminals.
    Ansi,
    /// Text only.
    Plain,
    /// The markup itself, for consumers that do their own styling.
    Structured,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum number of visible chars.
    pub width: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Style {
    Bold,
    Dim,
    Italic,
    Underline,
    Fg(Color),
}

enum Tag {
    Open(Style),
    Close,
}

struct Segment {
    text: String,
    styles: Vec<Style>,
}

fn parse_style(name: &str) -> Option<Style> {
    let style = match name {
        "bold" => Style::Bold,
        "dim" => Style::Dim,
        "italic" => Style::Italic,
        "underline" => Style::Underline,
        "red" => Style::Fg(Color::Red),
        "green" => Style::Fg(Color::Green),
        "yellow" => Style::Fg(Color::Yellow),
        "blue" => Style::Fg(Color::Blue),
        "magenta" => Style::Fg(Color::Magenta),
        "cyan" => Style::Fg(Color::Cyan),
        "white" => Style::Fg(Color::White),
        "black" => Style::Fg(Color::Black),
        _ => return None,
    };
    Some(style)
}

fn parse_tag(name: &str) -> Option<Tag> {
    match name.strip_prefix('/') {
        Some("") => Some(Tag::Close),
        Some(closing) => parse_style(closing).map(|_| Tag::Close),
        None => parse_style(name).map(Tag::Open),
    }
}

fn flush(segments: &mut Vec<Segment>, current: &mut String, stack: &[Style]) {
    if !current.is_empty() {
        segments.push(Segment {
            text: std::mem::take(current),
            styles: stack.to_vec(),
        });
    }
}

fn parse(text: &str) -> Vec<Segment> {
    let mut segments = vec![];
    let mut stack: Vec<Style> = vec![];
    let mut current = String::new();
    let mut rest = text;

    while let Some(pos) = rest.find('<') {
        current.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('<') {
            current.push('<');
            rest = tail;
            continue;
        }

        let tag = after
            .find('>')
            .and_then(|end| parse_tag(&after[..end]).map(|tag| (tag, &after[end + 1..])));

        match tag {
            Some((Tag::Open(style), tail)) => {
                flush(&mut segments, &mut current, &stack);
                stack.push(style);
                rest = tail;
            }
            Some((Tag::Close, tail)) => {
                flush(&mut segments, &mut current, &stack);
                stack.pop();
                rest = tail;
            }
            None => {
                current.push('<');
                rest = after;
            }
        }
    }

    current.push_str(rest);
    flush(&mut segments, &mut current, &stack);
    segments
}

fn styled(text: &str, styles: &[Style]) -> ColoredString {
    styles.iter().fold(text.normal(), |s, style| match style {
        Style::Bold => s.bold(),
        Style::Dim => s.dimmed(),
        Style::Italic => s.italic(),
        Style::Underline => s.underline(),
        Style::Fg(color) => s.color(*color),
    })
}

/// Renders markup for one sink. Pure and total.
pub fn render(text: &str, mode: RenderMode, options: &RenderOptions) -> String {
    if mode == RenderMode::Structured {
        return text.to_string();
    }

    let mut remaining = options.width.unwrap_or(usize::MAX);
    let mut result = String::new();
    for segment in parse(text) {
        if remaining == 0 {
            break;
        }
        let visible: String = segment.text.chars().take(remaining).collect();
        remaining -= visible.chars().count();

        match mode {
            RenderMode::Ansi => result.push_str(&styled(&visible, &segment.styles).to_string()),
            _ => result.push_str(&visible),
        }
    }

    if mode == RenderMode::Plain {
        result = strip_ansi(&result);
    }
    result
}

/// Makes arbitrary text safe to embed into markup.
pub fn escape(text: &str) -> String {
    text.replace('<', "<<")
}

pub fn strip_ansi(s: &str) -> String {
    match strip_ansi_escapes::strip(s) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => s.to_string(),
    }
}
