use ammonia::Builder;
use log::debug;
use std::collections::{HashMap, HashSet};

/// Cleans rendered HTML against the preview allow-list.
///
/// Any `data-*` attribute survives, so list markers and numbering flags reach the exporters.
/// Links keep `target` and get `rel="noopener noreferrer"` from the sanitizer.
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&'static str> = [
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "p",
        "strong",
        "em",
        "b",
        "i",
        "u",
        "del",
        "a",
        "img",
        "ul",
        "ol",
        "li",
        "blockquote",
        "pre",
        "code",
        "table",
        "thead",
        "tbody",
        "tr",
        "th",
        "td",
        "hr",
        "br",
        "span",
        "div",
        "sub",
        "sup",
    ]
    .iter()
    .copied()
    .collect();

    let generic_attributes: HashSet<&'static str> =
        ["class", "style", "title"].iter().copied().collect();

    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", ["href", "target"].iter().copied().collect());
    tag_attributes.insert("img", ["src", "alt"].iter().copied().collect());

    let mut generic_attribute_prefixes = HashSet::new();
    generic_attribute_prefixes.insert("data-");

    let clean = Builder::new()
        .tags(tags)
        .generic_attributes(generic_attributes)
        .tag_attributes(tag_attributes)
        .generic_attribute_prefixes(generic_attribute_prefixes)
        .clean(html)
        .to_string();
    debug!("sanitized {} bytes of html into {} bytes", html.len(), clean.len());
    clean
}

#[cfg(test)]
mod tests {
    use super::sanitize_html;

    #[test]
    fn keeps_preview_markup() {
        let html = "<ol style=\"list-style-type:none;\" data-list-type=\"ordered\">\
                    <li data-original-number=\"3.\"><span class=\"list-marker\">3.</span>x</li></ol>";
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn keeps_strikethrough_and_math_blocks() {
        let html = "<p><del>gone</del></p><div class=\"math-block\">$$a*b$$</div>";
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn strips_scripts_and_handlers() {
        let clean = sanitize_html("<p onclick=\"evil()\">hi</p><script>alert(1)</script>");
        assert_eq!(clean, "<p>hi</p>");
    }

    #[test]
    fn drops_javascript_urls() {
        let clean = sanitize_html("<a href=\"javascript:alert(1)\" target=\"_blank\">x</a>");
        assert!(!clean.contains("javascript:"));
        assert!(clean.contains("target=\"_blank\""));
    }

    #[test]
    fn unknown_tags_are_unwrapped() {
        assert_eq!(sanitize_html("<article><p>x</p></article>"), "<p>x</p>");
    }
}
