//! Profile color specification parsing.
//!
//! A profile stores its theme as a loosely-typed string: empty, a sentinel
//! name meaning "use the built-in default", a bare theme name, or a
//! JSON-array-shaped list of `#RRGGBB` tokens. Nothing here ever fails;
//! malformed input resolves to the default palette.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Sentinel written when the user has never picked a theme.
pub const THEME_DEFAULT_SENTINEL: &str = "theme_default";

/// Name of the built-in theme, also treated as a sentinel.
pub const CLASSIC_PURPLE: &str = "Classic Purple";

/// Fallback stop when a palette resolves to nothing.
pub const WHITE: &str = "#FFFFFF";

/// Colors of the built-in theme.
pub const DEFAULT_THEME_COLORS: &[&str] = &["#6A3DE8", "#B28DFF"];

/// Minimum number of stops a display gradient needs.
pub const MIN_DISPLAY_COLORS: usize = 2;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Whether the raw spec means "apply the built-in default".
pub fn is_default_spec(raw: Option<&str>) -> bool {
    match raw.map(str::trim) {
        None => true,
        Some(s) => s.is_empty() || s == "[]" || s == THEME_DEFAULT_SENTINEL || s == CLASSIC_PURPLE,
    }
}

/// Parse a stored color spec into an explicit palette.
///
/// Returns `None` when the caller should fall back to a default or to a
/// named-theme lookup: absent, blank, `"[]"`, sentinels, bare names, and
/// bracketed lists with fewer than two `#` tokens.
pub fn parse_colors(raw: Option<&str>) -> Option<Vec<String>> {
    if is_default_spec(raw) {
        return None;
    }
    let spec = raw?.trim();
    if !spec.starts_with('[') {
        return None;
    }

    let colors: Vec<String> = spec
        .trim_start_matches('[')
        .trim_end_matches(']')
        .replace(['"', '\''], "")
        .split(',')
        .map(str::trim)
        .filter(|token| token.starts_with('#'))
        .map(str::to_string)
        .collect();

    (colors.len() >= MIN_DISPLAY_COLORS).then_some(colors)
}

/// Pad a palette so a two-stop gradient can always be drawn.
///
/// Empty becomes two white stops, a single color is duplicated, anything
/// longer passes through.
pub fn display_colors(palette: &[String]) -> Vec<String> {
    match palette {
        [] => vec![WHITE.to_string(), WHITE.to_string()],
        [only] => vec![only.clone(), only.clone()],
        _ => palette.to_vec(),
    }
}

// ---------------------------------------------------------------------------
// Named themes
// ---------------------------------------------------------------------------

/// Name-to-palette lookup for themes stored by name rather than by colors.
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    themes: HashMap<String, Vec<String>>,
}

impl ThemeCatalog {
    pub fn new() -> Self {
        Self {
            themes: HashMap::new(),
        }
    }

    /// Register (or replace) a named theme.
    pub fn with_theme(mut self, name: impl Into<String>, colors: &[&str]) -> Self {
        self.themes
            .insert(name.into(), colors.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&[String]> {
        self.themes.get(name.trim()).map(Vec::as_slice)
    }

    /// Resolve a raw spec to a palette: explicit colors first, then a named
    /// theme, then the built-in default.
    pub fn resolve(&self, raw: Option<&str>) -> Vec<String> {
        if let Some(colors) = parse_colors(raw) {
            return colors;
        }
        if !is_default_spec(raw) {
            if let Some(colors) = raw.and_then(|name| self.lookup(name)) {
                return colors.to_vec();
            }
        }
        DEFAULT_THEME_COLORS.iter().map(|c| c.to_string()).collect()
    }

    /// [`resolve`](Self::resolve) padded for gradient display.
    pub fn display_colors(&self, raw: Option<&str>) -> Vec<String> {
        display_colors(&self.resolve(raw))
    }
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        Self::new()
            .with_theme(CLASSIC_PURPLE, DEFAULT_THEME_COLORS)
            .with_theme("Ocean Breeze", &["#0077B6", "#90E0EF"])
            .with_theme("Volcano", &["#D00000", "#FFBA08"])
            .with_theme("Forest", &["#2D6A4F", "#95D5B2"])
            .with_theme("Midnight", &["#0B132B"])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(colors: &[&str]) -> Vec<String> {
        colors.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn parses_json_array_of_hex_tokens() {
        assert_eq!(
            parse_colors(Some(r##"["#AA0000","#00BB00"]"##)),
            Some(owned(&["#AA0000", "#00BB00"]))
        );
    }

    #[test]
    fn tolerates_whitespace_and_single_quotes() {
        assert_eq!(
            parse_colors(Some(" [ '#112233' ,  \"#445566\", \"#778899\" ] ")),
            Some(owned(&["#112233", "#445566", "#778899"]))
        );
    }

    #[test]
    fn defaults_and_blanks_are_none() {
        assert_eq!(parse_colors(None), None);
        assert_eq!(parse_colors(Some("")), None);
        assert_eq!(parse_colors(Some("   ")), None);
        assert_eq!(parse_colors(Some("[]")), None);
        assert_eq!(parse_colors(Some("theme_default")), None);
        assert_eq!(parse_colors(Some("Classic Purple")), None);
    }

    #[test]
    fn bare_name_is_none() {
        assert_eq!(parse_colors(Some("SomeThemeName")), None);
    }

    #[test]
    fn fewer_than_two_hex_tokens_is_none() {
        assert_eq!(parse_colors(Some(r##"["#AA0000"]"##)), None);
        assert_eq!(parse_colors(Some(r#"["red","blue"]"#)), None);
        assert_eq!(parse_colors(Some("[,,,]")), None);
    }

    #[test]
    fn non_hex_tokens_are_dropped() {
        assert_eq!(
            parse_colors(Some(r##"["#AA0000","nope","#00BB00"]"##)),
            Some(owned(&["#AA0000", "#00BB00"]))
        );
    }

    #[test]
    fn display_colors_always_has_two_stops() {
        assert_eq!(display_colors(&[]), owned(&[WHITE, WHITE]));
        assert_eq!(
            display_colors(&owned(&["#112233"])),
            owned(&["#112233", "#112233"])
        );
        assert_eq!(
            display_colors(&owned(&["#1", "#2", "#3"])),
            owned(&["#1", "#2", "#3"])
        );
    }

    #[test]
    fn catalog_resolves_names_then_default() {
        let catalog = ThemeCatalog::default();

        assert_eq!(catalog.resolve(Some("Volcano")), owned(&["#D00000", "#FFBA08"]));
        assert_eq!(catalog.resolve(Some("Unknown")), owned(DEFAULT_THEME_COLORS));
        assert_eq!(catalog.resolve(None), owned(DEFAULT_THEME_COLORS));
        assert_eq!(
            catalog.resolve(Some(r##"["#010101","#020202"]"##)),
            owned(&["#010101", "#020202"])
        );
        assert_eq!(
            catalog.display_colors(Some("Midnight")),
            owned(&["#0B132B", "#0B132B"])
        );
    }
}
