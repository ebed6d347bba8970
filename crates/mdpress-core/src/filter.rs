use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

/// Patterns scrubbed from raw editor text before parsing, in order.
static SCRUB: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("script", r"(?is)<script\b.*?</script\s*>"),
        ("iframe", r"(?is)<iframe\b.*?</iframe\s*>"),
        ("object", r"(?is)<object\b.*?</object\s*>"),
        ("embed", r"(?is)<embed\b.*?</embed\s*>"),
        ("link", r"(?i)<link\b[^<]*>"),
        ("meta", r"(?i)<meta\b[^<]*>"),
        ("handler", r#"(?i)\bon\w+\s*=\s*(?:"[^"]*"|'[^']*')"#),
        ("javascript-url", r"(?i)javascript:"),
        ("vbscript-url", r"(?i)vbscript:"),
        ("html-data-url", r"(?i)data:text/html"),
    ]
    .into_iter()
    .map(|(name, pattern)| {
        (
            name,
            Regex::new(pattern).expect("BUG: input filter regex is statically valid"),
        )
    })
    .collect()
});

/// Removes active content from raw editor text.
///
/// This is a pre-parse scrub, not a substitute for [`crate::sanitize::sanitize_html`] on the
/// rendered output.
pub fn filter_input(text: &str) -> String {
    let mut out = text.to_string();
    for (name, re) in SCRUB.iter() {
        if re.is_match(&out) {
            trace!("filter removed {} content", name);
            out = re.replace_all(&out, "").into_owned();
        }
    }
    out
}
