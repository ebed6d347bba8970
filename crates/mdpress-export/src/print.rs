use log::debug;
use mdpress_core::escape_html;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const PRINT_CSS: &str = include_str!("../assets/print.css");
const CODE_OPEN: &str = "<pre><code";
const CODE_CLOSE: &str = "</code></pre>";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Auto,
    #[default]
    Light,
    Dark,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
    pub title: String,
    /// CSS `@page` size, e.g. `A4` or `21cm 29.7cm`.
    pub page_size: String,
    pub margin: String,
    pub highlight_code: bool,
    pub theme: Theme,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            title: "内容预览".to_string(),
            page_size: "A4".to_string(),
            margin: "2cm".to_string(),
            highlight_code: false,
            theme: Theme::Light,
        }
    }
}

/// Standalone page for printing or capturing the preview as a long image.
pub fn print_document(preview_html: &str, options: &PrintOptions) -> String {
    let printer = Printer::new(options.clone());
    let body = if options.highlight_code {
        printer.highlight_html(preview_html)
    } else {
        preview_html.to_string()
    };
    let out = printer.embed_html(&body);
    debug!("print document: {} bytes", out.len());
    out
}

#[derive(Debug, Clone)]
pub struct Printer {
    options: PrintOptions,
}

impl Printer {
    pub fn new(options: PrintOptions) -> Self {
        Self { options }
    }

    pub fn stylesheet(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "@page {{\n  size: {};\n  margin: {};\n}}\n",
            self.options.page_size, self.options.margin
        ));

        let (light_vars, dark_vars) = default_theme_vars();
        match self.options.theme {
            Theme::Auto => {
                out.push_str(&root_block(&light_vars, ""));
                out.push_str("@media (prefers-color-scheme: dark) {\n");
                out.push_str(&root_block(&dark_vars, "  "));
                out.push_str("}\n");
            }
            Theme::Light => out.push_str(&root_block(&light_vars, "")),
            Theme::Dark => out.push_str(&root_block(&dark_vars, "")),
        }

        out.push_str(PRINT_CSS);
        out
    }

    pub fn embed_html(&self, html: &str) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str("<html lang=\"zh-CN\">\n");
        out.push_str("<head>\n");
        out.push_str("  <meta charset=\"utf-8\" />\n");
        out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
        out.push_str(&format!(
            "  <title>{}</title>\n",
            escape_html(&self.options.title)
        ));
        out.push_str("  <style>\n");
        out.push_str(&self.stylesheet());
        out.push_str("\n  </style>\n");
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        out.push_str("<div class=\"content\">\n");
        out.push_str(html);
        if !html.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("</div>\n");
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }

    /// Colors every `<pre><code>` block; unknown languages fall back to plain text.
    pub fn highlight_html(&self, html: &str) -> String {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        match pick_theme(self.options.theme, &theme_set) {
            Some(theme) => highlight_blocks(html, &syntax_set, theme),
            None => html.to_string(),
        }
    }
}

fn default_theme_vars() -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let light = BTreeMap::from([
        ("--mdpress-bg".to_string(), "#ffffff".to_string()),
        ("--mdpress-fg".to_string(), "#333333".to_string()),
        ("--mdpress-heading".to_string(), "#2d4a2d".to_string()),
        ("--mdpress-muted".to_string(), "#4a6a4a".to_string()),
        ("--mdpress-accent".to_string(), "#4a7c59".to_string()),
        ("--mdpress-border".to_string(), "#e0e0e0".to_string()),
        ("--mdpress-soft-bg".to_string(), "#f8fdf8".to_string()),
        ("--mdpress-code-bg".to_string(), "#f0f8f0".to_string()),
    ]);

    let dark = BTreeMap::from([
        ("--mdpress-bg".to_string(), "#111612".to_string()),
        ("--mdpress-fg".to_string(), "#e2e8e2".to_string()),
        ("--mdpress-heading".to_string(), "#cfe8cf".to_string()),
        ("--mdpress-muted".to_string(), "#a3b8a3".to_string()),
        ("--mdpress-accent".to_string(), "#7fb98f".to_string()),
        ("--mdpress-border".to_string(), "#2c3a2f".to_string()),
        ("--mdpress-soft-bg".to_string(), "#18211a".to_string()),
        ("--mdpress-code-bg".to_string(), "#1d281f".to_string()),
    ]);

    (light, dark)
}

fn root_block(vars: &BTreeMap<String, String>, indent: &str) -> String {
    let mut out = String::new();
    out.push_str(indent);
    out.push_str(":root {\n");
    for (key, value) in vars {
        out.push_str(&format!("{}  {}: {};\n", indent, key, value));
    }
    out.push_str(indent);
    out.push_str("}\n");
    out
}

fn pick_theme(theme: Theme, theme_set: &ThemeSet) -> Option<&SyntectTheme> {
    let candidates = match theme {
        Theme::Dark => ["Monokai Extended Bright", "Monokai Extended", "base16-ocean.dark"],
        Theme::Light | Theme::Auto => ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"],
    };
    candidates
        .iter()
        .find_map(|name| theme_set.themes.get(*name))
        .or_else(|| theme_set.themes.values().next())
}

fn highlight_blocks(html: &str, syntax_set: &SyntaxSet, theme: &SyntectTheme) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(CODE_OPEN) {
        out.push_str(&rest[..start]);
        let block = &rest[start..];
        let Some(tag_end) = block[CODE_OPEN.len()..]
            .find('>')
            .map(|index| CODE_OPEN.len() + index)
        else {
            out.push_str(block);
            return out;
        };
        let Some(close) = block.find(CODE_CLOSE) else {
            out.push_str(block);
            return out;
        };
        if close < tag_end {
            out.push_str(&block[..close + CODE_CLOSE.len()]);
            rest = &block[close + CODE_CLOSE.len()..];
            continue;
        }

        let code_tag = &block["<pre>".len()..=tag_end];
        let syntax = extract_language(code_tag)
            .as_deref()
            .and_then(|token| syntax_set.find_syntax_by_token(token))
            .unwrap_or_else(|| syntax_set.find_syntax_plain_text());
        let code = unescape_html_code(&block[tag_end + 1..close]);

        out.push_str(&block[..=tag_end]);
        out.push_str(&highlight_code(&code, syntax_set, syntax, theme));
        out.push_str(CODE_CLOSE);
        rest = &block[close + CODE_CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

fn highlight_code(
    code: &str,
    syntax_set: &SyntaxSet,
    syntax: &SyntaxReference,
    theme: &SyntectTheme,
) -> String {
    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut out = String::with_capacity(code.len() * 2);
    for line in LinesWithEndings::from(code) {
        let html = highlighter
            .highlight_line(line, syntax_set)
            .ok()
            .and_then(|ranges| styled_line_to_highlighted_html(&ranges, IncludeBackground::No).ok());
        match html {
            Some(html) => out.push_str(&strip_font_weight(&html)),
            None => out.push_str(&escape_html(line)),
        }
    }
    out
}

fn extract_language(code_tag: &str) -> Option<String> {
    let class_attr = extract_attr(code_tag, "class")?;
    class_attr
        .split_whitespace()
        .filter_map(|class_name| class_name.strip_prefix("language-"))
        .find(|lang| !lang.is_empty())
        .map(str::to_string)
}

fn extract_attr(tag: &str, name: &str) -> Option<String> {
    let needle = format!("{}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')?;
    Some(tag[start..start + end].to_string())
}

fn unescape_html_code(text: &str) -> String {
    const ENTITIES: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#039;", '\''),
        ("&#39;", '\''),
        ("&nbsp;", '\u{a0}'),
    ];
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match ENTITIES
            .iter()
            .find(|(entity, _)| tail.starts_with(entity))
        {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Bold tokens shift glyph widths in print; color alone marks them.
fn strip_font_weight(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(pos) = rest.find("font-weight:") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + "font-weight:".len()..];
        match tail.find(';') {
            Some(index) => rest = &tail[index + 1..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::{PrintOptions, Printer, Theme, print_document, unescape_html_code};

    #[test]
    fn document_wraps_body_with_page_css() {
        let doc = print_document("<p>Hi</p>", &PrintOptions::default());
        assert!(doc.starts_with("<!DOCTYPE html>\n<html lang=\"zh-CN\">"));
        assert!(doc.contains("size: A4;"));
        assert!(doc.contains("margin: 2cm;"));
        assert!(doc.contains("--mdpress-accent: #4a7c59;"));
        assert!(doc.contains("<div class=\"content\">\n<p>Hi</p>\n</div>"));
        assert!(doc.contains(".math-block"));
    }

    #[test]
    fn page_options_reach_the_stylesheet() {
        let options = PrintOptions {
            page_size: "21cm 29.7cm".to_string(),
            margin: "1in".to_string(),
            theme: Theme::Auto,
            ..PrintOptions::default()
        };
        let css = Printer::new(options).stylesheet();
        assert!(css.contains("size: 21cm 29.7cm;"));
        assert!(css.contains("margin: 1in;"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
        assert!(css.contains("--mdpress-accent: #4a7c59;"));
    }

    #[test]
    fn highlight_colors_code_blocks() {
        let options = PrintOptions {
            highlight_code: true,
            ..PrintOptions::default()
        };
        let html = "<p>x</p><pre><code class=\"language-rust\">let x = &quot;a&quot;;\n</code></pre>";
        let doc = print_document(html, &options);
        assert!(doc.contains("<pre><code class=\"language-rust\"><span style=\""));
        assert!(doc.contains("</code></pre>"));
        assert!(!doc.contains("font-weight:"));
    }

    #[test]
    fn highlight_is_off_by_default() {
        let html = "<pre><code class=\"language-rust\">let x = 1;\n</code></pre>";
        let doc = print_document(html, &PrintOptions::default());
        assert!(doc.contains(html));
    }

    #[test]
    fn unknown_language_keeps_text_escaped() {
        let printer = Printer::new(PrintOptions::default());
        let html = "<pre><code class=\"language-nope\">a &lt; b\n</code></pre>";
        let highlighted = printer.highlight_html(html);
        assert!(highlighted.contains("&lt;"));
        assert!(!highlighted.contains("a < b"));
    }

    #[test]
    fn title_is_escaped() {
        let options = PrintOptions {
            title: "<x>".to_string(),
            ..PrintOptions::default()
        };
        let doc = print_document("", &options);
        assert!(doc.contains("<title>&lt;x&gt;</title>"));
    }

    #[test]
    fn unescape_handles_known_entities_only() {
        assert_eq!(unescape_html_code("&lt;a&gt; &amp; &#039;b&#039; &x;"), "<a> & 'b' &x;");
    }
}
