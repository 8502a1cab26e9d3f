use ashfield_theme::{
    FALLBACK_TEXT, FileThemeSource, OfflineSource, ThemeCache, ThemeOrigin, resolve_theme,
};

const THEMES: &str = r#"[
    {"themeName": "Lighthouse", "text": "The lamp  turns\nover the rocks.", "images": [" https://img/1.png "]},
    {"themeName": "Foundation", "text": "Ash on the foundation."}
]"#;

#[test]
fn fetched_theme_is_cached_and_survives_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("themes.json");
    std::fs::write(&file, THEMES).unwrap();
    let cache = ThemeCache::open(dir.path().join("cache")).unwrap();

    let first = resolve_theme(&FileThemeSource::new(&file), Some(&cache), Some("Lighthouse"));
    assert_eq!(first.origin, ThemeOrigin::Fetched);
    assert_eq!(first.payload.text, "The lamp turns over the rocks.");
    assert_eq!(first.payload.images, ["https://img/1.png"]);
    assert!(cache.contains("Lighthouse"));

    // Source gone: the cached copy still answers.
    std::fs::remove_file(&file).unwrap();
    let second = resolve_theme(&FileThemeSource::new(&file), Some(&cache), Some("Lighthouse"));
    assert_eq!(second.origin, ThemeOrigin::Cached);
    assert_eq!(second.payload, first.payload);
}

#[test]
fn lower_case_request_is_cached_for_the_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("themes.json");
    std::fs::write(&file, THEMES).unwrap();
    let cache_dir = dir.path().join("cache");

    let first = {
        let cache = ThemeCache::open(&cache_dir).unwrap();
        resolve_theme(&FileThemeSource::new(&file), Some(&cache), Some("lighthouse"))
    };
    assert_eq!(first.origin, ThemeOrigin::Fetched);
    assert_eq!(first.payload.theme_name, "Lighthouse");

    let cache = ThemeCache::open(&cache_dir).unwrap();
    let second = resolve_theme(&FileThemeSource::new(&file), Some(&cache), Some("lighthouse"));
    assert_eq!(second.origin, ThemeOrigin::Cached);
    assert_eq!(second.payload, first.payload);
}

#[test]
fn unknown_theme_falls_back_under_the_requested_name() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("themes.json");
    std::fs::write(&file, THEMES).unwrap();

    let resolved = resolve_theme(&FileThemeSource::new(&file), None, Some("Harbor!!"));
    assert_eq!(resolved.origin, ThemeOrigin::Fallback);
    assert_eq!(resolved.payload.theme_name, "Harbor");
    assert_eq!(resolved.payload.text, FALLBACK_TEXT);
}

#[test]
fn unrequested_fetch_takes_the_first_payload() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("themes.json");
    std::fs::write(&file, THEMES).unwrap();

    let resolved = resolve_theme(&FileThemeSource::new(&file), None, None);
    assert_eq!(resolved.origin, ThemeOrigin::Fetched);
    assert_eq!(resolved.payload.theme_name, "Lighthouse");
}

#[test]
fn fallback_is_never_cached() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ThemeCache::open(dir.path()).unwrap();
    let resolved = resolve_theme(&OfflineSource, Some(&cache), Some("Foundation"));
    assert!(resolved.payload.is_fallback());
    assert!(!cache.contains("Foundation"));
}
