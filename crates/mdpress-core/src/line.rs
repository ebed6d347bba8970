//! Line classification for the block parser.

use once_cell::sync::Lazy;
use regex::Regex;

static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```(\w*)").expect("BUG: fence regex is statically valid"));
static TABLE_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|(.+)\|$").expect("BUG: table row regex is statically valid"));
static RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\*{3,}|-{3,}|_{3,})$").expect("BUG: rule regex is statically valid")
});
static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#{1,6})\s+(.*)$").expect("BUG: heading regex is statically valid")
});
static ORDERED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d+\.|[一二三四五六七八九十百]+[、.．]|[\x{2460}-\x{2473}][.、．]?|[IVXivx]+\.|[a-zA-Z]\.|[(（]\d+[)）]|第[一二三四五六七八九十百\d]+[章节条])\s+(.*)$",
    )
    .expect("BUG: ordered list regex is statically valid")
});
static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([-*•])\s+(.*)$").expect("BUG: bullet regex is statically valid"));
static QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^>\s+(.*)$").expect("BUG: quote regex is statically valid"));
static NUMBERING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\d+\.|[一二三四五六七八九十]+[、.]|[\x{2460}-\x{2473}]|[a-zA-Z]\.|[(（]\d+[)）]|第[一二三四五六七八九十]+[条节章]",
    )
    .expect("BUG: numbering regex is statically valid")
});
static DASH_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-—–]\s*$").expect("BUG: dash regex is statically valid"));

/// What a single source line starts, continues or is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineKind<'a> {
    Blank,
    Fence { lang: Option<&'a str> },
    /// Starts with `$$`; whether it also closes is decided by the parser.
    Math,
    TableRow,
    Rule,
    Heading { level: usize, text: &'a str },
    Ordered { marker: &'a str, rest: &'a str },
    Unordered { bullet: char, rest: &'a str },
    Quote { text: &'a str },
    Paragraph,
}

pub struct LineRule {
    pub name: &'static str,
    matches: for<'a> fn(&'a str) -> Option<LineKind<'a>>,
}

/// Classification order; the first rule that matches wins.
pub const LINE_RULES: &[LineRule] = &[
    LineRule {
        name: "fence",
        matches: fence,
    },
    LineRule {
        name: "math",
        matches: math,
    },
    LineRule {
        name: "table-row",
        matches: table_row,
    },
    LineRule {
        name: "rule",
        matches: rule,
    },
    LineRule {
        name: "blank",
        matches: blank,
    },
    LineRule {
        name: "heading",
        matches: heading,
    },
    LineRule {
        name: "ordered",
        matches: ordered,
    },
    LineRule {
        name: "unordered",
        matches: unordered,
    },
    LineRule {
        name: "quote",
        matches: quote,
    },
];

/// Classifies one raw source line.
///
/// Structural checks (fence, math, table, rule) look at the trimmed line; prefix checks
/// (heading, list, quote) only drop leading whitespace so that `"- "` still counts as a
/// bullet with nothing after it.
pub fn classify(raw: &str) -> LineKind<'_> {
    LINE_RULES
        .iter()
        .find_map(|rule| (rule.matches)(raw))
        .unwrap_or(LineKind::Paragraph)
}

/// Whether a paragraph contains text that looks like a numbering scheme.
pub fn has_numbering(text: &str) -> bool {
    NUMBERING.is_match(text)
}

/// A `-` bullet whose remainder is empty or only a dash is a typographic dash, not a list
/// marker. Other bullets are always real.
pub fn is_dash_only(bullet: char, rest: &str) -> bool {
    bullet == '-' && (rest.is_empty() || DASH_ONLY.is_match(rest))
}

fn fence(raw: &str) -> Option<LineKind<'_>> {
    let caps = FENCE.captures(raw.trim())?;
    let lang = caps.get(1).map(|m| m.as_str()).filter(|lang| !lang.is_empty());
    Some(LineKind::Fence { lang })
}

fn math(raw: &str) -> Option<LineKind<'_>> {
    raw.trim().starts_with("$$").then_some(LineKind::Math)
}

fn table_row(raw: &str) -> Option<LineKind<'_>> {
    TABLE_ROW.is_match(raw.trim()).then_some(LineKind::TableRow)
}

fn rule(raw: &str) -> Option<LineKind<'_>> {
    RULE.is_match(raw.trim()).then_some(LineKind::Rule)
}

fn blank(raw: &str) -> Option<LineKind<'_>> {
    raw.trim().is_empty().then_some(LineKind::Blank)
}

fn heading(raw: &str) -> Option<LineKind<'_>> {
    let caps = HEADING.captures(raw.trim_start())?;
    let (marks, text) = (caps.get(1)?, caps.get(2)?);
    Some(LineKind::Heading {
        level: marks.as_str().len(),
        text: text.as_str().trim(),
    })
}

fn ordered(raw: &str) -> Option<LineKind<'_>> {
    let caps = ORDERED.captures(raw.trim_start())?;
    let (marker, rest) = (caps.get(1)?, caps.get(2)?);
    Some(LineKind::Ordered {
        marker: marker.as_str(),
        rest: rest.as_str().trim(),
    })
}

fn unordered(raw: &str) -> Option<LineKind<'_>> {
    let caps = BULLET.captures(raw.trim_start())?;
    let (bullet, rest) = (caps.get(1)?, caps.get(2)?);
    Some(LineKind::Unordered {
        bullet: bullet.as_str().chars().next()?,
        rest: rest.as_str().trim(),
    })
}

fn quote(raw: &str) -> Option<LineKind<'_>> {
    let caps = QUOTE.captures(raw.trim_start())?;
    Some(LineKind::Quote {
        text: caps.get(1)?.as_str().trim(),
    })
}
