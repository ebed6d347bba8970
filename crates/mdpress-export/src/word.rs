//! Word-compatible HTML document.
//!
//! Word opens HTML with the Office namespaces as a native document. Positioned list labels
//! and bullet lists do not survive that import, so markers are dropped and unordered items
//! become plain paragraphs.

use log::debug;
use mdpress_core::{escape_attr, escape_html, sanitize_html};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

const WORD_CSS: &str = include_str!("../assets/word.css");
const LIST_MARKER: &str = "list-marker";
const FLAT_ITEM_OPEN: &str = "<p style=\"margin:0 0 5pt 0;padding:0\">";
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "col", "wbr"];

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WordOptions {
    pub title: String,
    pub font_family: String,
}

impl Default for WordOptions {
    fn default() -> Self {
        Self {
            title: "导出文档".to_string(),
            font_family: "\"Microsoft YaHei\", \"SimSun\", \"宋体\", serif".to_string(),
        }
    }
}

/// Builds a `.doc` body from preview HTML.
pub fn word_document(preview_html: &str, options: &WordOptions) -> String {
    let body = word_body(preview_html);
    let mut out = String::with_capacity(body.len() + WORD_CSS.len() + 1024);
    out.push_str("<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" ");
    out.push_str("xmlns:w=\"urn:schemas-microsoft-com:office:word\" ");
    out.push_str("xmlns:m=\"http://schemas.microsoft.com/office/2004/12/omml\" ");
    out.push_str("xmlns=\"http://www.w3.org/TR/REC-html40\">\n");
    out.push_str("<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(&options.title)));
    out.push_str("<!--[if gte mso 9]>\n<xml>\n<w:WordDocument>\n");
    out.push_str("<w:View>Print</w:View>\n<w:Zoom>100</w:Zoom>\n<w:DoNotOptimizeForBrowser/>\n");
    out.push_str("<w:Compatibility>\n<w:BreakWrappedTables/>\n<w:SnapToGridInCell/>\n");
    out.push_str("<w:WrapTextWithPunct/>\n<w:UseAsianBreakRules/>\n<w:DontGrowAutofit/>\n");
    out.push_str("</w:Compatibility>\n</w:WordDocument>\n</xml>\n<![endif]-->\n");
    out.push_str("<style>\n");
    out.push_str(&format!("body {{ font-family: {}; }}\n", options.font_family));
    out.push_str(WORD_CSS);
    out.push_str("</style>\n");
    out.push_str("</head>\n<body>\n");
    out.push_str(&body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("</body>\n</html>\n");
    debug!("word document: {} bytes", out.len());
    out
}

/// Sanitized preview HTML with list markers removed and bullet lists flattened.
pub fn word_body(preview_html: &str) -> String {
    let document = Html::parse_fragment(&sanitize_html(preview_html));
    let mut out = String::new();
    write_children(document.root_element(), &mut out);
    out
}

fn write_children(parent: ElementRef<'_>, out: &mut String) {
    for child in parent.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(&escape_html(text));
        } else if let Some(element) = ElementRef::wrap(child) {
            write_element(element, out);
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let value = element.value();
    if value.classes().any(|class| class == LIST_MARKER) {
        return;
    }
    let name = value.name();
    if name == "ul" {
        for item in element
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
        {
            out.push_str(FLAT_ITEM_OPEN);
            write_children(item, out);
            out.push_str("</p>\n");
        }
        return;
    }

    out.push('<');
    out.push_str(name);
    for (attr, attr_value) in value.attrs() {
        out.push_str(&format!(" {}=\"{}\"", attr, escape_attr(attr_value)));
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&name) {
        return;
    }
    write_children(element, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}
