//! Scripted in-memory [`SlideSource`] for unit tests.

use super::source::SlideSource;
use crate::error::SlideError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A presentation held in memory.
///
/// * `slides`: present indices and their markup
/// * `flaky`: index → number of transport failures to inject before the
///   index behaves normally (`u32::MAX` fails forever)
#[derive(Default)]
pub struct FakeSource {
    slides: HashMap<usize, String>,
    flaky: Mutex<HashMap<usize, u32>>,
    probes: Mutex<Vec<usize>>,
    fetches: Mutex<HashMap<usize, u32>>,
}

impl FakeSource {
    /// Slides `1..=n`, each a small square SVG.
    pub fn with_length(n: usize) -> Self {
        let mut src = Self::default();
        for i in 1..=n {
            src.slides.insert(i, square_svg(100));
        }
        src
    }

    /// Slides `1..=contents.len()` with the given markup.
    pub fn from_contents(contents: &[&str]) -> Self {
        let mut src = Self::default();
        for (i, c) in contents.iter().enumerate() {
            src.slides.insert(i + 1, c.to_string());
        }
        src
    }

    /// Mark an arbitrary index present.
    pub fn insert(mut self, index: usize, content: &str) -> Self {
        self.slides.insert(index, content.to_string());
        self
    }

    /// Fail the next `times` requests for `index` with a transport error.
    pub fn flaky(self, index: usize, times: u32) -> Self {
        lock(&self.flaky).insert(index, times);
        self
    }

    /// Every index ever probed, in order.
    pub fn probed(&self) -> Vec<usize> {
        lock(&self.probes).clone()
    }

    /// Fetch attempts for `index`.
    pub fn fetch_attempts(&self, index: usize) -> u32 {
        lock(&self.fetches).get(&index).copied().unwrap_or(0)
    }

    fn inject_failure(&self, index: usize) -> Result<(), SlideError> {
        let mut flaky = lock(&self.flaky);
        match flaky.get_mut(&index) {
            Some(0) | None => Ok(()),
            Some(remaining) => {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                Err(SlideError::Transport {
                    index,
                    detail: "connection reset".into(),
                })
            }
        }
    }
}

#[async_trait]
impl SlideSource for FakeSource {
    async fn probe(&self, index: usize) -> Result<bool, SlideError> {
        lock(&self.probes).push(index);
        self.inject_failure(index)?;
        Ok(self.slides.contains_key(&index))
    }

    async fn fetch(&self, index: usize) -> Result<String, SlideError> {
        *lock(&self.fetches).entry(index).or_insert(0) += 1;
        self.inject_failure(index)?;
        self.slides
            .get(&index)
            .cloned()
            .ok_or(SlideError::Status { index, status: 404 })
    }
}

/// A `size`×`size` pt SVG with one filled rectangle.
pub fn square_svg(size: u32) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{size}pt" height="{size}pt" viewBox="0 0 {size} {size}"><rect x="0" y="0" width="{size}" height="{size}" fill="#336699"/></svg>"##
    )
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// `(width, height)` of every page's MediaBox, in page order.
pub fn media_boxes(pdf: &[u8]) -> Vec<(f32, f32)> {
    let doc = lopdf::Document::load_mem(pdf).expect("valid PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).expect("page dictionary");
            let mb = page
                .get(b"MediaBox")
                .and_then(|o| o.as_array())
                .expect("MediaBox");
            (
                mb[2].as_float().expect("number"),
                mb[3].as_float().expect("number"),
            )
        })
        .collect()
}
