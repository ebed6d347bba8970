//! Plain-text projection of the preview for the `text/plain` clipboard flavor.

use mdpress_core::{protect_all, restore};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html};

const LIST_MARKER: &str = "list-marker";
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "blockquote", "pre",
    "table", "thead", "tbody", "tr", "hr",
];

static RULE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\*{3,}|-{3,}|_{3,})$").expect("BUG: rule line regex is statically valid")
});
static HEADING_MARKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#+\s+").expect("BUG: heading regex is statically valid"));
static BULLET_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-*•·▪▫‣⁃]\s+").expect("BUG: bullet prefix regex is statically valid")
});
static DOTTED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+").expect("BUG: dotted number regex is statically valid"));
static OTHER_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+[.)、]\s+").expect("BUG: number prefix regex is statically valid")
});
static STARS3: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*\*([^*\n]+?)\*\*\*").expect("BUG: triple star regex is statically valid")
});
static UNDERSCORES3: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"___([^_\n]+?)___").expect("BUG: triple underscore regex is statically valid"));
// Guard tokens come first in the alternation so their underscores never open a match.
static STAR_ITALIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"⟦[^⟧]*⟧|\*((?:⟦[^⟧]*⟧|[^*\n⟦])+?)\*")
        .expect("BUG: star italic regex is statically valid")
});
static UNDERSCORE_ITALIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"⟦[^⟧]*⟧|_((?:⟦[^⟧]*⟧|[^_\n⟦])+?)_")
        .expect("BUG: underscore italic regex is statically valid")
});
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[(.*?)\]\(.*?\)").expect("BUG: image regex is statically valid"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.*?)\]\(.*?\)").expect("BUG: link regex is statically valid"));

/// One line per block, markers and leftover Markdown syntax removed, math untouched.
pub fn plain_text(preview_html: &str) -> String {
    let document = Html::parse_fragment(preview_html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);

    let protected = protect_all(&raw);
    let lines: Vec<String> = protected
        .text
        .split('\n')
        .filter_map(clean_line)
        .collect();
    restore(&lines.join("\n"), &protected.placeholders)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child.value().name();
        if name == "br" {
            out.push('\n');
            continue;
        }
        if child.value().classes().any(|class| class == LIST_MARKER) {
            if in_ordered_list(&child) {
                out.extend(child.text());
                out.push(' ');
            }
            continue;
        }
        let block = BLOCK_TAGS.contains(&name);
        if block {
            out.push('\n');
        }
        collect_text(child, out);
        if block {
            out.push('\n');
        }
        if matches!(name, "td" | "th") {
            out.push('\t');
        }
    }
}

fn in_ordered_list(marker: &ElementRef<'_>) -> bool {
    marker.ancestors().filter_map(ElementRef::wrap).any(|el| {
        el.value().name() == "ol" || el.value().attr("data-list-type") == Some("ordered")
    })
}

fn clean_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || RULE_LINE.is_match(line) {
        return None;
    }
    let line = HEADING_MARKS.replace(line, "");
    let line = BULLET_PREFIX.replace(line.trim(), "").trim().to_string();
    let line = if DOTTED_NUMBER.is_match(&line) {
        line
    } else {
        OTHER_NUMBER.replace(&line, "").trim().to_string()
    };

    let line = STARS3.replace_all(&line, "$1");
    let line = UNDERSCORES3.replace_all(&line, "$1");
    let line = strip_italic(&line, &STAR_ITALIC);
    let line = strip_italic(&line, &UNDERSCORE_ITALIC);
    let line = IMAGE.replace_all(&line, "$1");
    let line = LINK.replace_all(&line, "$1");

    let line = line.trim();
    (!line.is_empty()).then(|| line.to_string())
}

/// Drops italic markers whose opener follows a boundary character; others stay literal.
fn strip_italic(line: &str, pattern: &Regex) -> String {
    pattern
        .replace_all(line, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let Some(body) = caps.get(1) else {
                return whole.to_string();
            };
            let start = caps.get(0).map_or(0, |m| m.start());
            let boundary = line[..start].chars().next_back().is_none_or(|prev| {
                prev.is_whitespace() || "([{>.,'\"!?;:-".contains(prev)
            });
            if boundary {
                body.as_str().to_string()
            } else {
                whole.to_string()
            }
        })
        .into_owned()
}
