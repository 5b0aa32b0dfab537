//! Page size resolution.
//!
//! Each page gets the physical size its slide declares on the root `<svg>`
//! element. Point values win; pixel values are converted with
//! [`PX_TO_PT`]. An axis the slide does not size (or sizes with something
//! non-positive) inherits the previous sized slide's value, starting from
//! [`DEFAULT_PAGE`]. Holes get [`HOLE_PAGE`] and leave the inherited size
//! alone.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pixel → point factor used by the slide exporter.
pub const PX_TO_PT: f32 = 0.752_928_57;

/// Size inherited by the first slide when it declares nothing.
pub const DEFAULT_PAGE: PageSpec = PageSpec {
    width: 1000.0,
    height: 800.0,
};

/// Size of the blank page standing in for a missing slide.
pub const HOLE_PAGE: PageSpec = PageSpec {
    width: 500.0,
    height: 500.0,
};

/// Physical page size in points. Both sides are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    pub width: f32,
    pub height: f32,
}

static ROOT_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<svg\b[^>]*>").expect("valid regex"));

static SIZE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[\s<])(?P<axis>width|height)\s*=\s*["']\s*(?P<value>[0-9]*\.?[0-9]+)\s*(?P<unit>pt|px)\s*["']"#)
        .expect("valid regex")
});

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Axis {
    pt: Option<f32>,
    px: Option<f32>,
}

impl Axis {
    fn resolve(self) -> Option<f32> {
        let positive = |v: f32| (v.is_finite() && v > 0.0).then_some(v);
        self.pt
            .and_then(positive)
            .or_else(|| self.px.map(|px| px * PX_TO_PT).and_then(positive))
    }
}

/// Sizes a slide declares, per axis, already converted to points.
///
/// Only the root `<svg>` tag is read so nested `width="…"` attributes of
/// shapes do not leak into the page size.
pub fn declared_size(svg: &str) -> (Option<f32>, Option<f32>) {
    let scope = ROOT_TAG.find(svg).map(|m| m.as_str()).unwrap_or(svg);
    let (mut width, mut height) = (Axis::default(), Axis::default());

    for caps in SIZE_ATTR.captures_iter(scope) {
        let Ok(value) = caps["value"].parse::<f32>() else {
            continue;
        };
        let axis = if &caps["axis"] == "width" {
            &mut width
        } else {
            &mut height
        };
        let slot = if &caps["unit"] == "pt" {
            &mut axis.pt
        } else {
            &mut axis.px
        };
        slot.get_or_insert(value);
    }

    (width.resolve(), height.resolve())
}

/// Carries the last resolved size from slide to slide.
#[derive(Debug, Clone)]
pub struct SizeResolver {
    last: PageSpec,
}

impl Default for SizeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeResolver {
    pub fn new() -> Self {
        Self { last: DEFAULT_PAGE }
    }

    /// Page size for the next slide; `None` is a hole.
    pub fn resolve(&mut self, content: Option<&str>) -> PageSpec {
        let Some(svg) = content else {
            return HOLE_PAGE;
        };
        let (width, height) = declared_size(svg);
        let spec = PageSpec {
            width: width.unwrap_or(self.last.width),
            height: height.unwrap_or(self.last.height),
        };
        self.last = spec;
        spec
    }
}
