use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cache::ThemeCache;
use crate::payload::{ThemePayload, theme_id};

/// Errors a theme source can report. None of them are fatal to a run.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed theme payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("theme not found: {0}")]
    NotFound(String),
    #[error("theme source unavailable: {0}")]
    Unavailable(String),
}

/// Something that can produce a theme payload, once, before gameplay.
pub trait ThemeSource {
    /// Fetch `requested`, or any theme the source likes when `None`.
    fn fetch(&self, requested: Option<&str>) -> Result<ThemePayload, ThemeError>;
}

/// A source that is never reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl ThemeSource for OfflineSource {
    fn fetch(&self, _requested: Option<&str>) -> Result<ThemePayload, ThemeError> {
        Err(ThemeError::Unavailable("offline".into()))
    }
}

/// A source that always answers with one payload.
#[derive(Debug, Clone)]
pub struct StaticSource(pub ThemePayload);

impl ThemeSource for StaticSource {
    fn fetch(&self, _requested: Option<&str>) -> Result<ThemePayload, ThemeError> {
        Ok(self.0.clone())
    }
}

/// JSON file holding one payload or a list of payloads.
#[derive(Debug, Clone)]
pub struct FileThemeSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PayloadFile {
    One(ThemePayload),
    Many(Vec<ThemePayload>),
}

impl FileThemeSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<ThemePayload>, ThemeError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| ThemeError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(match serde_json::from_str(&text)? {
            PayloadFile::One(p) => vec![p],
            PayloadFile::Many(ps) => ps,
        })
    }
}

impl ThemeSource for FileThemeSource {
    /// With no request, the first payload in the file; otherwise the one whose
    /// sanitized name matches, ignoring case.
    fn fetch(&self, requested: Option<&str>) -> Result<ThemePayload, ThemeError> {
        let payloads = self.read_all()?;
        match requested {
            None => payloads
                .into_iter()
                .next()
                .ok_or_else(|| ThemeError::NotFound(self.path.display().to_string())),
            Some(name) => {
                let wanted = theme_id(name);
                payloads
                    .into_iter()
                    .find(|p| theme_id(&p.theme_name) == wanted)
                    .ok_or_else(|| ThemeError::NotFound(name.to_string()))
            }
        }
    }
}

/// Where a resolved payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeOrigin {
    Cached,
    Fetched,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTheme {
    pub payload: ThemePayload,
    pub origin: ThemeOrigin,
}

/// Cache first (for a named request), then the source, then the fallback.
///
/// Never fails. Fetched payloads are written back to the cache when one is
/// given; a failed write is logged and otherwise ignored.
pub fn resolve_theme(
    source: &dyn ThemeSource,
    cache: Option<&ThemeCache>,
    requested: Option<&str>,
) -> ResolvedTheme {
    let _span = tracing::info_span!("resolve_theme", requested).entered();

    if let (Some(cache), Some(name)) = (cache, requested) {
        if let Some(payload) = cache.get(name) {
            tracing::debug!(theme = %payload.theme_name, "theme served from cache");
            return ResolvedTheme {
                payload: payload.sanitized(),
                origin: ThemeOrigin::Cached,
            };
        }
    }

    match source.fetch(requested) {
        Ok(payload) => {
            let payload = payload.sanitized();
            if let Some(cache) = cache {
                // Keyed by the request so the next identical request finds it.
                let key = requested.unwrap_or(payload.theme_name.as_str());
                if let Err(err) = cache.store_as(key, &payload) {
                    tracing::warn!(%err, theme = %payload.theme_name, "could not cache theme");
                }
            }
            tracing::info!(theme = %payload.theme_name, images = payload.images.len(), "theme fetched");
            ResolvedTheme {
                payload,
                origin: ThemeOrigin::Fetched,
            }
        }
        Err(err) => {
            let payload = ThemePayload::fallback(requested);
            tracing::warn!(%err, theme = %payload.theme_name, "theme fetch failed, using fallback text");
            ResolvedTheme {
                payload,
                origin: ThemeOrigin::Fallback,
            }
        }
    }
}
