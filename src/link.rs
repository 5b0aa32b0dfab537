//! Presentation link handling.
//!
//! Users copy the URL of whatever slide their browser shows, e.g.
//! `https://host/bigbluebutton/presentation/<meeting>/<pres>/<pres>/svg/17`.
//! Jobs work on the *base link* (`…/svg/`), to which slide numbers are
//! appended directly: slide `i` lives at `format!("{base}{i}")`.

use crate::error::SlidesError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

/// Path ending in an `svg` segment with an optional slide number.
static SVG_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<root>.*/svg)(?:/(?P<slide>[0-9]*))?/?$").expect("valid regex"));

/// A presentation link somewhere inside free text.
static LINK_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<link>https?://[^\s<>"']+?/svg(?:/[0-9]*)?)(?:[\s<>"'),]|$)"#)
        .expect("valid regex")
});

/// Normalise a user-supplied slide link to its base link.
///
/// ```rust
/// use slides2pdf::normalize_link;
///
/// let base = normalize_link("https://bbb.example.org/presentation/abc/svg/12").unwrap();
/// assert_eq!(base, "https://bbb.example.org/presentation/abc/svg/");
/// ```
pub fn normalize_link(input: &str) -> Result<String, SlidesError> {
    let invalid = || SlidesError::InvalidLink {
        input: input.to_string(),
    };

    let mut url = Url::parse(input.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }

    let caps = SVG_PATH.captures(url.path()).ok_or_else(invalid)?;
    let root = caps.name("root").map(|m| m.as_str()).ok_or_else(invalid)?;
    let path = format!("{root}/");

    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

/// Find the first presentation link in `text` and normalise it.
///
/// Returns `None` when the text contains no `…/svg` link.
pub fn find_link(text: &str) -> Option<String> {
    LINK_IN_TEXT
        .captures_iter(text)
        .filter_map(|caps| caps.name("link"))
        .find_map(|m| normalize_link(m.as_str()).ok())
}

/// URL of slide `index` under `base_link`.
pub fn slide_url(base_link: &str, index: usize) -> String {
    format!("{base_link}{index}")
}
