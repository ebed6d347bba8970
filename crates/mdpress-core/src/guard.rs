//! Math placeholder guard.
//!
//! Math spans are swapped for opaque tokens before Markdown processing and swapped back
//! afterwards, so emphasis and heading rules never see `*`, `_` or `#` inside a formula.

use crate::html::escape_html;
use crate::placeholder::{Placeholder, PlaceholderArena};
use log::trace;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

pub const DISPLAY_KIND: &str = "MATH_DISPLAY";
pub const INLINE_KIND: &str = "MATH_INLINE";

static BRACKET_DISPLAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\\\[.*?\\\]").expect("BUG: display math regex is statically valid")
});
static PAREN_INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\\\(.*?\\\)").expect("BUG: inline math regex is statically valid")
});
static DOLLAR_DISPLAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\$\$.*?\$\$").expect("BUG: dollar display regex is statically valid")
});
static DOLLAR_INLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$.*?\$").expect("BUG: dollar inline regex is statically valid"));

/// Output of [`protect`]: the rewritten text and the table needed to undo it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Protected {
    pub text: String,
    pub placeholders: Vec<Placeholder>,
}

/// Replaces `\[...\]` and then `\(...\)` spans with tokens.
///
/// Unterminated delimiters are not matched and stay in the text as written.
pub fn protect(text: &str) -> Protected {
    protect_with(text, &[(&BRACKET_DISPLAY, DISPLAY_KIND), (&PAREN_INLINE, INLINE_KIND)])
}

/// Like [`protect`], but also covers the dollar forms `$$...$$` and `$...$`.
///
/// Used when walking rendered output back to text, where the dollar forms survive verbatim.
pub fn protect_all(text: &str) -> Protected {
    protect_with(
        text,
        &[
            (&BRACKET_DISPLAY, DISPLAY_KIND),
            (&DOLLAR_DISPLAY, DISPLAY_KIND),
            (&PAREN_INLINE, INLINE_KIND),
            (&DOLLAR_INLINE, INLINE_KIND),
        ],
    )
}

fn protect_with(text: &str, passes: &[(&Lazy<Regex>, &str)]) -> Protected {
    if !passes.iter().any(|(re, _)| re.is_match(text)) {
        return Protected {
            text: text.to_string(),
            placeholders: Vec::new(),
        };
    }

    let mut arena = PlaceholderArena::new(text);
    let mut current = text.to_string();
    for (re, kind) in passes {
        current = re
            .replace_all(&current, |caps: &regex::Captures| arena.push(kind, &caps[0]))
            .into_owned();
    }
    trace!("protected {} math span(s)", arena.len());
    Protected {
        text: current,
        placeholders: arena.into_entries(),
    }
}

/// Puts the original spans back, newest token first.
pub fn restore(text: &str, placeholders: &[Placeholder]) -> String {
    restore_with(text, placeholders, |original| original.to_string())
}

/// Like [`restore`], for tokens that sit in rendered HTML.
///
/// A token can end up in element text, inside `<pre><code>`, or in an attribute value, so
/// the original span is escaped for all of them.
pub fn restore_html(text: &str, placeholders: &[Placeholder]) -> String {
    restore_with(text, placeholders, escape_html)
}

fn restore_with<F>(text: &str, placeholders: &[Placeholder], render: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut out = text.to_string();
    for placeholder in placeholders.iter().rev() {
        let replacement = render(&placeholder.original);
        out = match Regex::new(&regex::escape(&placeholder.token)) {
            Ok(re) => re.replace_all(&out, NoExpand(&replacement)).into_owned(),
            Err(_) => out.replace(&placeholder.token, &replacement),
        };
    }
    out
}
