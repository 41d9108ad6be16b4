use serde_json::json;
use serde_json::Value;

/// The MIME type that marks a Jupyter widget view. The bridge never ships
/// interactive widgets (see spec Non-goals), so any bundle carrying this
/// key is rewritten before it reaches the wire.
pub const WIDGET_VIEW_MIME: &str = "application/vnd.jupyter.widget-view+json";

const PLACEHOLDER_HTML: &str = "<p><em>Widgets are not supported in this mode.</em></p>";
const PLACEHOLDER_TEXT: &str = "<widget not supported>";

/// Removes the widget-view entry from `data`, if present, replacing it
/// with a static HTML placeholder and (when absent) a `text/plain`
/// fallback.
///
/// `data` is never mutated in place: when the widget key is present a
/// shallow copy is made and returned; when it's absent the input is
/// returned unchanged, so callers can't observe a clone cost they didn't
/// need.
pub fn rewrite_widget_data(data: &Value) -> Value {
    let Some(map) = data.as_object() else {
        return data.clone();
    };
    if !map.contains_key(WIDGET_VIEW_MIME) {
        return data.clone();
    }

    let mut rewritten = map.clone();
    rewritten.remove(WIDGET_VIEW_MIME);
    rewritten.insert("text/html".to_string(), json!(PLACEHOLDER_HTML));
    rewritten
        .entry("text/plain")
        .or_insert_with(|| json!(PLACEHOLDER_TEXT));

    Value::Object(rewritten)
}
