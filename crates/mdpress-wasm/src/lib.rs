use mdpress_core::{PreviewOptions, Table};
use mdpress_export::{PrintOptions, SheetOptions, WordOptions};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn render_preview(source: &str) -> String {
    mdpress_core::render_preview_default(source)
}

#[wasm_bindgen]
pub fn render_preview_with_options(source: &str, options: JsValue) -> Result<String, JsValue> {
    let options: PreviewOptions = options_from_js(options)?;
    Ok(mdpress_core::render_preview(source, &options))
}

/// Tables as `[[{text, originalHtml, isBold, isItalic}]]`.
#[wasm_bindgen]
pub fn extract_tables(html: &str) -> Result<JsValue, JsValue> {
    let tables: Vec<Table> = mdpress_core::extract_tables(html);
    to_js(&tables)
}

#[wasm_bindgen]
pub fn sheet_layout(html: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let options: SheetOptions = options_from_js(options)?;
    let layout = mdpress_export::sheet_layout(html, &options)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    to_js(&layout)
}

#[wasm_bindgen]
pub fn word_document(html: &str, options: JsValue) -> Result<String, JsValue> {
    let options: WordOptions = options_from_js(options)?;
    Ok(mdpress_export::word_document(html, &options))
}

#[wasm_bindgen]
pub fn print_document(html: &str, options: JsValue) -> Result<String, JsValue> {
    let options: PrintOptions = options_from_js(options)?;
    Ok(mdpress_export::print_document(html, &options))
}

#[wasm_bindgen]
pub fn plain_text(html: &str) -> String {
    mdpress_export::plain_text(html)
}

/// Missing options mean defaults; every options struct fills absent fields the same way.
fn options_from_js<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{plain_text, render_preview};

    #[test]
    fn preview_and_text_match_the_native_api() {
        let html = render_preview("# Title\n\n- one");
        assert_eq!(html, mdpress_core::render_preview_default("# Title\n\n- one"));
        assert_eq!(plain_text(&html), "Title\none");
    }
}
