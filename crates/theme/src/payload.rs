use serde::{Deserialize, Serialize};

/// Theme name used when none survives sanitation.
pub const FALLBACK_THEME: &str = "Foundation";

/// Text substituted when the theme source cannot be reached.
pub const FALLBACK_TEXT: &str = "The page tears. The text won't hold.";

/// Text substituted when the source answered with an empty summary.
pub const EMPTY_SUMMARY_TEXT: &str = "No summary available. The signal resists description.";

pub const MAX_THEME_NAME_CHARS: usize = 42;

/// `{ themeName, text, images }` as delivered by a theme collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePayload {
    pub theme_name: String,
    #[serde(default)]
    pub text: String,
    /// Image URLs. Opaque to the core; passed through to presentation.
    #[serde(default)]
    pub images: Vec<String>,
}

impl ThemePayload {
    pub fn new(theme_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            theme_name: theme_name.into(),
            text: text.into(),
            images: Vec::new(),
        }
    }

    /// Payload used when no source answered.
    pub fn fallback(requested: Option<&str>) -> Self {
        Self::new(
            sanitize_theme_name(requested.unwrap_or(FALLBACK_THEME)),
            FALLBACK_TEXT,
        )
    }

    /// Sanitize name and text in place of the raw values.
    pub fn sanitized(self) -> Self {
        Self {
            theme_name: sanitize_theme_name(&self.theme_name),
            text: sanitize_text(&self.text),
            images: self
                .images
                .into_iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.text == FALLBACK_TEXT
    }
}

/// Keep word characters, whitespace, `-` and `'`; cap the length.
pub fn sanitize_theme_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace() || *c == '-' || *c == '\'')
        .take(MAX_THEME_NAME_CHARS)
        .collect();
    if name.is_empty() {
        FALLBACK_THEME.to_string()
    } else {
        name
    }
}

/// Cache key for a theme name: sanitized and lower-cased, so requests that
/// differ only in case share an entry.
pub fn theme_id(name: &str) -> String {
    sanitize_theme_name(name).to_lowercase()
}

/// Collapse whitespace runs to single spaces and trim.
pub fn sanitize_text(raw: &str) -> String {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        EMPTY_SUMMARY_TEXT.to_string()
    } else {
        text
    }
}
