use serde::Deserialize;
use serde::Serialize;

/// Describes the language the host interpreter runs, so a frontend can
/// pick the right syntax highlighting and file associations.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LanguageInfo {
    pub name: String,
    pub version: String,
    pub mimetype: String,
    pub file_extension: String,

    /// Pygments lexer, if different than `name`.
    pub pygments_lexer: Option<String>,

    /// Codemirror mode, if different than `name`.
    pub codemirror_mode: Option<CodeMirrorMode>,

    /// Nbconvert exporter, if not the default `"script"` exporter.
    pub nbconvert_exporter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CodeMirrorMode {
    pub name: String,
    pub version: u32,
}

impl LanguageInfo {
    /// The `language_info` block for a Python host, matching the reference
    /// bridge's `kernel_info_reply` (see `original_source`'s
    /// `_handle_kernel_info`).
    pub fn python(version: &str) -> Self {
        Self {
            name: "python".to_string(),
            version: version.to_string(),
            mimetype: "text/x-python".to_string(),
            file_extension: ".py".to_string(),
            pygments_lexer: Some("ipython3".to_string()),
            codemirror_mode: Some(CodeMirrorMode {
                name: "ipython".to_string(),
                version: 3,
            }),
            nbconvert_exporter: Some("python".to_string()),
        }
    }
}
