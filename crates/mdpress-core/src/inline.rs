//! Inline Markdown for a single line.
//!
//! The conversion is a fixed, ordered list of named rules. Each rule sees the output of the
//! previous one; spans that must not be rewritten (math, literal tags, code) are parked in a
//! per-call [`PlaceholderArena`] until the rule that restores them.

use crate::html::{escape_attr, escape_html};
use crate::placeholder::PlaceholderArena;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const MATH: &str = "INLINE_MATH";
const TAG: &str = "HTML_TAG";
const CODE: &str = "CODE_SPAN";

static INLINE_MATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$.*?\$|⟦MATH_[A-Z]+_[0-9a-z]+_\d+⟧")
        .expect("BUG: inline math regex is statically valid")
});
static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("BUG: html tag regex is statically valid"));
static CODE_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\n]+?)`").expect("BUG: code span regex is statically valid"));

/// A run of text between emphasis markers; placeholder tokens count as a single atom.
fn emphasis(open: &str, close: &str, marker: char) -> Regex {
    let pattern = format!(
        r"{}((?:⟦[^⟧]*⟧|[^{}\n⟦])+?){}",
        open,
        regex::escape(&marker.to_string()),
        close
    );
    Regex::new(&pattern).expect("BUG: emphasis regex is statically valid")
}

static STAR_BOLD_ITALIC: Lazy<Regex> = Lazy::new(|| emphasis(r"\*\*\*", r"\*\*\*", '*'));
static UNDERSCORE_BOLD_ITALIC: Lazy<Regex> = Lazy::new(|| emphasis("___", "___", '_'));
static STAR_BOLD: Lazy<Regex> = Lazy::new(|| emphasis(r"\*\*", r"\*\*", '*'));
static UNDERSCORE_BOLD: Lazy<Regex> = Lazy::new(|| emphasis("__", "__", '_'));
static STAR_ITALIC: Lazy<Regex> = Lazy::new(|| emphasis(r"\*", r"\*", '*'));
static UNDERSCORE_ITALIC: Lazy<Regex> = Lazy::new(|| emphasis("_", "_", '_'));
static IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("BUG: image regex is statically valid")
});
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").expect("BUG: link regex is statically valid"));
static STRIKETHROUGH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"~~([^~\n]+?)~~").expect("BUG: strikethrough regex is statically valid")
});

/// A named step of the inline conversion.
pub struct InlineRule {
    pub name: &'static str,
    apply: fn(&mut InlineContext, &str) -> String,
}

/// The conversion, in the order it runs.
pub const RULES: &[InlineRule] = &[
    InlineRule {
        name: "protect-math",
        apply: protect_math,
    },
    InlineRule {
        name: "protect-html-tags",
        apply: protect_html_tags,
    },
    InlineRule {
        name: "protect-code-spans",
        apply: protect_code_spans,
    },
    InlineRule {
        name: "bold-italic",
        apply: bold_italic,
    },
    InlineRule {
        name: "bold",
        apply: bold,
    },
    InlineRule {
        name: "italic",
        apply: italic,
    },
    InlineRule {
        name: "render-code-spans",
        apply: render_code_spans,
    },
    InlineRule {
        name: "restore-math",
        apply: restore_math,
    },
    InlineRule {
        name: "images",
        apply: images,
    },
    InlineRule {
        name: "links",
        apply: links,
    },
    InlineRule {
        name: "strikethrough",
        apply: strikethrough,
    },
    InlineRule {
        name: "restore-html-tags",
        apply: restore_html_tags,
    },
];

pub(crate) struct InlineContext {
    arena: PlaceholderArena,
}

impl InlineContext {
    fn new(line: &str) -> Self {
        Self {
            arena: PlaceholderArena::new(line),
        }
    }
}

/// Converts the inline Markdown of one line to HTML.
///
/// Never fails: syntax that does not match a rule is kept as literal text. The result is
/// meant for a sanitizer; literal tags in the input are passed through unchanged.
pub fn render_inline(line: &str) -> String {
    let mut ctx = InlineContext::new(line);
    RULES
        .iter()
        .fold(line.to_string(), |text, rule| (rule.apply)(&mut ctx, &text))
}

fn protect_math(ctx: &mut InlineContext, text: &str) -> String {
    INLINE_MATH
        .replace_all(text, |caps: &Captures| ctx.arena.push(MATH, &caps[0]))
        .into_owned()
}

fn protect_html_tags(ctx: &mut InlineContext, text: &str) -> String {
    let arena = &mut ctx.arena;
    HTML_TAG
        .replace_all(text, |caps: &Captures| {
            let tag = arena.expand(&caps[0], MATH, |entry| entry.original.clone());
            arena.push(TAG, tag)
        })
        .into_owned()
}

fn protect_code_spans(ctx: &mut InlineContext, text: &str) -> String {
    let arena = &mut ctx.arena;
    CODE_SPAN
        .replace_all(text, |caps: &Captures| {
            let literal = arena.expand(&caps[1], MATH, |entry| entry.original.clone());
            let literal = arena.expand(&literal, TAG, |entry| entry.original.clone());
            arena.push(CODE, literal)
        })
        .into_owned()
}

fn bold_italic(_: &mut InlineContext, text: &str) -> String {
    let text = STAR_BOLD_ITALIC.replace_all(text, "<strong><em>${1}</em></strong>");
    UNDERSCORE_BOLD_ITALIC
        .replace_all(&text, "<strong><em>${1}</em></strong>")
        .into_owned()
}

fn bold(_: &mut InlineContext, text: &str) -> String {
    let text = STAR_BOLD.replace_all(text, "<strong>${1}</strong>");
    UNDERSCORE_BOLD
        .replace_all(&text, "<strong>${1}</strong>")
        .into_owned()
}

fn italic(_: &mut InlineContext, text: &str) -> String {
    let text = replace_bounded(&STAR_ITALIC, text, |inner| format!("<em>{}</em>", inner));
    replace_bounded(&UNDERSCORE_ITALIC, &text, |inner| format!("<em>{}</em>", inner))
}

// Rendered spans go back in as literal markup, out of reach of the link and strikethrough rules.
fn render_code_spans(ctx: &mut InlineContext, text: &str) -> String {
    ctx.arena.reissue(text, CODE, TAG, |entry| {
        format!("<code>{}</code>", escape_html(&entry.original))
    })
}

fn restore_math(ctx: &mut InlineContext, text: &str) -> String {
    ctx.arena.expand(text, MATH, |entry| entry.original.clone())
}

fn images(_: &mut InlineContext, text: &str) -> String {
    IMAGE
        .replace_all(text, |caps: &Captures| {
            format!(
                "<img src=\"{}\" alt=\"{}\" style=\"max-width:100%;\">",
                escape_attr(&caps[2]),
                escape_attr(&caps[1])
            )
        })
        .into_owned()
}

fn links(_: &mut InlineContext, text: &str) -> String {
    LINK.replace_all(text, |caps: &Captures| {
        format!(
            "<a href=\"{}\" target=\"_blank\">{}</a>",
            escape_attr(&caps[2]),
            &caps[1]
        )
    })
    .into_owned()
}

fn strikethrough(_: &mut InlineContext, text: &str) -> String {
    STRIKETHROUGH
        .replace_all(text, "<del>${1}</del>")
        .into_owned()
}

fn restore_html_tags(ctx: &mut InlineContext, text: &str) -> String {
    ctx.arena.expand(text, TAG, |entry| entry.original.clone())
}

/// Characters accepted directly before an emphasis opener.
fn is_open_boundary(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            '(' | '[' | '{' | '>' | '.' | ',' | '\'' | '"' | '!' | '?' | ';' | ':' | '-'
        )
}

/// Characters accepted directly after an emphasis closer.
fn is_close_boundary(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            ')' | ']' | '}' | '.' | ',' | '\'' | '"' | '!' | '?' | ';' | ':' | '-'
        )
}

/// Rewrites matches of a single-marker emphasis pattern whose surroundings are boundary
/// characters. A rejected match is retried one character further on, so its closing marker
/// can still open the next span.
fn replace_bounded<F>(re: &Regex, text: &str, render: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;
    while let Some(caps) = re.captures_at(text, pos) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        if before.is_none_or(is_open_boundary) && after.is_none_or(is_close_boundary) {
            out.push_str(&text[copied..whole.start()]);
            out.push_str(&render(inner.as_str()));
            copied = whole.end();
            pos = whole.end();
        } else {
            pos = whole.start() + whole.as_str().chars().next().map_or(1, char::len_utf8);
        }
    }
    out.push_str(&text[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::{RULES, render_inline};

    #[test]
    fn rules_run_in_documented_order() {
        let names: Vec<&str> = RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(
            names,
            [
                "protect-math",
                "protect-html-tags",
                "protect-code-spans",
                "bold-italic",
                "bold",
                "italic",
                "render-code-spans",
                "restore-math",
                "images",
                "links",
                "strikethrough",
                "restore-html-tags",
            ]
        );
    }

    #[test]
    fn protect_math() {
        assert_eq!(
            render_inline("the $a*b*c$ value"),
            "the $a*b*c$ value"
        );
        assert_eq!(render_inline("$x_1$ and $y_2$"), "$x_1$ and $y_2$");
    }

    #[test]
    fn protect_html_tags() {
        assert_eq!(
            render_inline("<span title=\"a*b*c\">x</span>"),
            "<span title=\"a*b*c\">x</span>"
        );
        assert_eq!(
            render_inline("<a href=\"/snake_case_name_\">ok</a>"),
            "<a href=\"/snake_case_name_\">ok</a>"
        );
    }

    #[test]
    fn protect_code_spans() {
        assert_eq!(
            render_inline("use `**not bold**` here"),
            "use <code>**not bold**</code> here"
        );
    }

    #[test]
    fn bold_italic() {
        assert_eq!(
            render_inline("***both*** and ___both___"),
            "<strong><em>both</em></strong> and <strong><em>both</em></strong>"
        );
    }

    #[test]
    fn bold() {
        assert_eq!(
            render_inline("**strong** and __strong__"),
            "<strong>strong</strong> and <strong>strong</strong>"
        );
    }

    #[test]
    fn italic() {
        assert_eq!(render_inline("an *emphasis* word"), "an <em>emphasis</em> word");
        assert_eq!(render_inline("(_note_)"), "(<em>note</em>)");
        assert_eq!(render_inline("*start* of line"), "<em>start</em> of line");
    }

    #[test]
    fn italic_requires_boundaries() {
        assert_eq!(render_inline("2*3*4"), "2*3*4");
        assert_eq!(render_inline("snake_case_name"), "snake_case_name");
        assert_eq!(render_inline("a *b*c"), "a *b*c");
    }

    #[test]
    fn render_code_spans() {
        assert_eq!(
            render_inline("`<div>` & `a < b`"),
            "<code>&lt;div&gt;</code> & <code>a &lt; b</code>"
        );
        assert_eq!(
            render_inline("`[text](url)`"),
            "<code>[text](url)</code>"
        );
        assert_eq!(render_inline("`$x$`"), "<code>$x$</code>");
    }

    #[test]
    fn restore_math() {
        assert_eq!(render_inline("**$E=mc^2$**"), "<strong>$E=mc^2$</strong>");
    }

    #[test]
    fn images() {
        assert_eq!(
            render_inline("![logo](img/logo.png)"),
            "<img src=\"img/logo.png\" alt=\"logo\" style=\"max-width:100%;\">"
        );
    }

    #[test]
    fn links() {
        assert_eq!(
            render_inline("see [docs](https://example.com/a_b_c)"),
            "see <a href=\"https://example.com/a_b_c\" target=\"_blank\">docs</a>"
        );
        assert_eq!(
            render_inline("[x](say \"hi\")"),
            "<a href=\"say &quot;hi&quot;\" target=\"_blank\">x</a>"
        );
    }

    #[test]
    fn strikethrough() {
        assert_eq!(render_inline("~~gone~~ kept"), "<del>gone</del> kept");
    }

    #[test]
    fn restore_html_tags() {
        assert_eq!(
            render_inline("<b>**x**</b>"),
            "<b><strong>x</strong></b>"
        );
    }

    #[test]
    fn guard_tokens_are_opaque() {
        let token = "⟦MATH_INLINE_abc123_0⟧";
        let line = format!("_a {} b_", token);
        assert_eq!(render_inline(&line), format!("<em>a {} b</em>", token));
        let line = format!("x{}_y_", token);
        assert_eq!(render_inline(&line), line);
    }

    #[test]
    fn unmatched_syntax_is_literal() {
        assert_eq!(render_inline("**open and [link](x"), "**open and [link](x");
        assert_eq!(render_inline("~~ ~ `"), "~~ ~ `");
    }
}
