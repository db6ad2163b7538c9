//! Weather icons and their `<symbol>` definitions.
//!
//! The widget references icons with `<use href="#id">`. The definitions are
//! prebuilt fragments injected after rendering, in place of a placeholder
//! comment, so each response only carries the symbols it uses.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use weathersvg_markup::{attrs, h, Node, COMMENT_TAG};

const FALLBACK_ICON: &str = "i-meteocons-clear-day-fill";

/// Comment body marking where symbol definitions go.
pub const ICON_SYMBOLS_PLACEHOLDER: &str = "__ICON_SYMBOLS_PLACEHOLDER__";

fn wmo_icon(code: i32) -> Option<&'static str> {
    let icon = match code {
        // Clear sky
        0 => "i-meteocons-clear-day-fill",
        // Mainly clear, partly cloudy
        1 | 2 => "i-meteocons-partly-cloudy-day-fill",
        3 => "i-meteocons-overcast-fill",
        // Fog and depositing rime fog
        45 | 48 => "i-meteocons-fog-fill",
        // Drizzle, freezing drizzle
        51 | 53 | 56 => "i-meteocons-drizzle-fill",
        55 | 57 => "i-meteocons-extreme-drizzle-fill",
        // Rain, freezing rain
        61 | 63 | 66 => "i-meteocons-rain-fill",
        65 | 67 => "i-meteocons-extreme-rain-fill",
        // Snow fall, snow grains
        71 | 73 | 77 => "i-meteocons-snow-fill",
        75 => "i-meteocons-extreme-snow-fill",
        // Showers
        80..=82 => "i-meteocons-extreme-rain-fill",
        85 | 86 => "i-meteocons-extreme-snow-fill",
        // Thunderstorm, with or without hail
        95 | 96 | 97 | 99 => "i-meteocons-thunderstorms-fill",
        _ => return None,
    };
    Some(icon)
}

/// Symbol id for a WMO weather code, in its night variant after dark.
pub fn get_weather_icon(code: i32, is_day: bool) -> String {
    let icon = wmo_icon(code).unwrap_or(FALLBACK_ICON);
    if is_day {
        return icon.to_string();
    }
    icon.replacen("-day-", "-night-", 1)
}

/// The node the injected symbols replace.
pub fn icon_symbols_defs() -> Node {
    h(COMMENT_TAG, attrs! { "content" => ICON_SYMBOLS_PLACEHOLDER }, vec![])
}

/// Prebuilt `<symbol>` fragments by id.
#[derive(Debug, Clone, Default)]
pub struct IconSet {
    symbols: BTreeMap<String, String>,
}

impl IconSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.svg` in `dir`; the file stem is the symbol id.
    ///
    /// # Errors
    ///
    /// Fails when the directory or one of its SVG files cannot be read.
    pub fn load_dir(dir: &Path) -> std::io::Result<Self> {
        let mut set = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("svg") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let markup = std::fs::read_to_string(&path)?;
            set.insert(id, markup.trim());
        }

        tracing::info!("Loaded {} icon symbols from {}", set.len(), dir.display());
        Ok(set)
    }

    pub fn insert(&mut self, id: impl Into<String>, markup: impl Into<String>) {
        self.symbols.insert(id.into(), markup.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.symbols.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Replace the placeholder in `svg` with the symbols it references.
    pub fn inject(&self, svg: &str) -> String {
        let placeholder = format!("<!--{}-->", ICON_SYMBOLS_PLACEHOLDER);

        let mut definitions = Vec::new();
        for id in referenced_ids(svg) {
            match self.get(id) {
                Some(markup) => definitions.push(markup),
                None => tracing::debug!("No symbol for referenced icon {}", id),
            }
        }

        svg.replacen(&placeholder, &definitions.join("\n"), 1)
    }
}

/// Ids referenced as `href="#id"`, sorted and deduplicated.
fn referenced_ids(svg: &str) -> BTreeSet<&str> {
    const MARKER: &str = "href=\"#";

    let mut ids = BTreeSet::new();
    let mut rest = svg;
    while let Some(start) = rest.find(MARKER) {
        rest = &rest[start + MARKER.len()..];
        let Some(end) = rest.find('"') else {
            break;
        };
        ids.insert(&rest[..end]);
        rest = &rest[end..];
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use weathersvg_markup::render;

    #[test]
    fn test_weather_icons() {
        assert_eq!(get_weather_icon(0, true), "i-meteocons-clear-day-fill");
        assert_eq!(get_weather_icon(0, false), "i-meteocons-clear-night-fill");
        assert_eq!(get_weather_icon(2, false), "i-meteocons-partly-cloudy-night-fill");
        assert_eq!(get_weather_icon(3, false), "i-meteocons-overcast-fill");
        assert_eq!(get_weather_icon(81, true), "i-meteocons-extreme-rain-fill");
        assert_eq!(get_weather_icon(42, true), "i-meteocons-clear-day-fill");
        assert_eq!(get_weather_icon(42, false), "i-meteocons-clear-night-fill");
    }

    #[test]
    fn test_placeholder_renders_as_comment() {
        assert_eq!(
            render(&icon_symbols_defs()),
            "<!--__ICON_SYMBOLS_PLACEHOLDER__-->"
        );
    }

    #[test]
    fn test_referenced_ids() {
        let svg = r##"<use href="#b" /><use href="#a" /><a href="https://x" /><use href="#b" />"##;
        let ids: Vec<_> = referenced_ids(svg).into_iter().collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_inject_only_used_symbols() {
        let mut set = IconSet::new();
        set.insert("i-a", r#"<symbol id="i-a" />"#);
        set.insert("i-b", r#"<symbol id="i-b" />"#);
        set.insert("i-unused", r#"<symbol id="i-unused" />"#);

        let svg = r##"<svg><!--__ICON_SYMBOLS_PLACEHOLDER__--><use href="#i-b" /><use href="#i-a" /><use href="#i-missing" /></svg>"##;
        assert_eq!(
            set.inject(svg),
            r##"<svg><symbol id="i-a" />
<symbol id="i-b" /><use href="#i-b" /><use href="#i-a" /><use href="#i-missing" /></svg>"##
        );
    }

    #[test]
    fn test_inject_without_symbols_removes_placeholder() {
        let svg = "<svg><!--__ICON_SYMBOLS_PLACEHOLDER--></svg>";
        assert_eq!(IconSet::new().inject(svg), svg);
        let svg = "<svg><!--__ICON_SYMBOLS_PLACEHOLDER__--></svg>";
        assert_eq!(IconSet::new().inject(svg), "<svg></svg>");
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("i-meteocons-fog-fill.svg"),
            "<symbol id=\"i-meteocons-fog-fill\" viewBox=\"0 0 512 512\"></symbol>\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("README.txt"), "not an icon").unwrap();

        let set = IconSet::load_dir(dir.path()).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set
            .get("i-meteocons-fog-fill")
            .unwrap()
            .ends_with("</symbol>"));
    }

    #[test]
    fn test_load_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(IconSet::load_dir(&dir.path().join("absent")).is_err());
    }
}
