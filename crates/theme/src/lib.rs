//! Theme content: the one opaque payload a run consumes before gameplay starts.
//!
//! # Invariants
//! - Resolution never fails; a failed source yields the fixed fallback text.
//! - Every payload handed out is sanitized.
//! - Cache entries that fail their hash check are misses, never payloads.

pub mod cache;
pub mod payload;
pub mod source;

pub use cache::{CacheError, ThemeCache};
pub use payload::{
    EMPTY_SUMMARY_TEXT, FALLBACK_TEXT, FALLBACK_THEME, MAX_THEME_NAME_CHARS, ThemePayload,
    sanitize_text, sanitize_theme_name, theme_id,
};
pub use source::{
    FileThemeSource, OfflineSource, ResolvedTheme, StaticSource, ThemeError, ThemeOrigin,
    ThemeSource, resolve_theme,
};
