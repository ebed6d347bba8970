use crate::html::{escape_attr, escape_html};
use serde::{Deserialize, Serialize};

const LIST_STYLE: &str = "list-style-type:none; margin-left:0; padding-left:0;";
const ORDERED_ITEM_STYLE: &str = "position:relative; padding-left:30px; margin-bottom:5px;";
const UNORDERED_ITEM_STYLE: &str =
    "position:relative; padding-left:0; margin-bottom:8px; line-height:1.6;";
const MARKER_STYLE: &str = "position:absolute; left:0; top:0;";

/// Glyph recorded for a real (non-dash) unordered bullet.
pub const BULLET_GLYPH: &str = "•";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Ordered => "ol",
            ListKind::Unordered => "ul",
        }
    }

    fn data_type(self) -> &'static str {
        match self {
            ListKind::Ordered => "ordered",
            ListKind::Unordered => "unordered",
        }
    }
}

/// One collected list entry.
///
/// For ordered items `marker` is the numbering exactly as written in the source. For
/// unordered items it is [`BULLET_GLYPH`] for a real bullet and `None` for a suppressed dash.
/// `content` is already-rendered inline HTML.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub marker: Option<String>,
    pub content: String,
    pub kind: ListKind,
}

impl ListItem {
    pub fn ordered(marker: &str, content: String) -> Self {
        Self {
            marker: Some(marker.to_string()),
            content,
            kind: ListKind::Ordered,
        }
    }

    pub fn unordered(marker: Option<&str>, content: String) -> Self {
        Self {
            marker: marker.map(str::to_string),
            content,
            kind: ListKind::Unordered,
        }
    }
}

/// Renders a flat list.
///
/// Ordered items carry their source marker as a positioned `list-marker` label and in
/// `data-original-number`; numbers are never recomputed. Unordered items never print a glyph.
pub fn render_list(kind: ListKind, items: &[ListItem]) -> String {
    let mut html = format!(
        "<{} style=\"{}\" data-list-type=\"{}\">",
        kind.tag(),
        LIST_STYLE,
        kind.data_type()
    );
    for item in items {
        html.push('\n');
        match kind {
            ListKind::Ordered => push_ordered(&mut html, item),
            ListKind::Unordered => push_unordered(&mut html, item),
        }
    }
    html.push('\n');
    html.push_str(&format!("</{}>", kind.tag()));
    html
}

fn push_ordered(html: &mut String, item: &ListItem) {
    let marker = item.marker.as_deref().unwrap_or("");
    html.push_str(&format!(
        "<li style=\"{}\" data-list-type=\"ordered\" data-original-number=\"{}\">",
        ORDERED_ITEM_STYLE,
        escape_attr(marker)
    ));
    if !marker.is_empty() {
        html.push_str(&format!(
            "<span style=\"{}\" class=\"list-marker\">{}</span>",
            MARKER_STYLE,
            escape_html(marker)
        ));
    }
    html.push_str(&item.content);
    html.push_str("</li>");
}

fn push_unordered(html: &mut String, item: &ListItem) {
    html.push_str(&format!(
        "<li style=\"{}\" data-list-type=\"unordered\"",
        UNORDERED_ITEM_STYLE
    ));
    if let Some(marker) = item.marker.as_deref() {
        html.push_str(&format!(" data-marker=\"{}\"", escape_attr(marker)));
    }
    html.push('>');
    html.push_str(&item.content);
    html.push_str("</li>");
}

#[cfg(test)]
mod tests {
    use super::{BULLET_GLYPH, ListItem, ListKind, render_list};

    #[test]
    fn ordered_list_keeps_source_markers() {
        let items = [
            ListItem::ordered("3.", "Skip ahead".to_string()),
            ListItem::ordered("①.", "Next".to_string()),
        ];
        let html = render_list(ListKind::Ordered, &items);
        assert!(html.starts_with(
            "<ol style=\"list-style-type:none; margin-left:0; padding-left:0;\" data-list-type=\"ordered\">"
        ));
        assert!(html.contains("data-original-number=\"3.\""));
        assert!(html.contains("data-original-number=\"①.\""));
        assert!(html.contains(
            "<span style=\"position:absolute; left:0; top:0;\" class=\"list-marker\">3.</span>Skip ahead</li>"
        ));
        assert!(!html.contains("1."));
        assert!(html.ends_with("</ol>"));
    }

    #[test]
    fn unordered_list_never_prints_a_glyph() {
        let items = [
            ListItem::unordered(Some(BULLET_GLYPH), "Buy milk".to_string()),
            ListItem::unordered(None, String::new()),
        ];
        let html = render_list(ListKind::Unordered, &items);
        assert_eq!(
            html,
            "<ul style=\"list-style-type:none; margin-left:0; padding-left:0;\" data-list-type=\"unordered\">\n\
             <li style=\"position:relative; padding-left:0; margin-bottom:8px; line-height:1.6;\" data-list-type=\"unordered\" data-marker=\"•\">Buy milk</li>\n\
             <li style=\"position:relative; padding-left:0; margin-bottom:8px; line-height:1.6;\" data-list-type=\"unordered\"></li>\n\
             </ul>"
        );
        assert_eq!(html.matches('•').count(), 1);
    }

    #[test]
    fn marker_text_is_escaped() {
        let items = [ListItem::ordered("(<1>)", "x".to_string())];
        let html = render_list(ListKind::Ordered, &items);
        assert!(html.contains("data-original-number=\"(&lt;1&gt;)\""));
        assert!(html.contains("class=\"list-marker\">(&lt;1&gt;)</span>"));
    }
}
