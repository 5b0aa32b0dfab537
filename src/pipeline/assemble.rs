//! Document assembly: turn the ordered slide results into one PDF.
//!
//! Every result becomes exactly one page, in input order. A present slide is
//! parsed with usvg, converted to a Form XObject by svg2pdf and stretched to
//! fill a page of its resolved [`PageSpec`]. A hole becomes a blank
//! [`HOLE_PAGE`](super::size::HOLE_PAGE). Markup that cannot be parsed gets a
//! blank page of its resolved size.
//!
//! The output depends only on the input sequence: same slides, same bytes.
//!
//! Parsing and conversion are CPU-bound; [`assemble_blocking`] runs them on
//! the blocking pool so the runtime's workers stay free.

use super::size::{PageSpec, SizeResolver};
use crate::error::SlidesError;
use crate::output::SlideResult;
use pdf_writer::{Chunk, Content, Finish, Name, Pdf, Rect, Ref};
use std::collections::HashMap;
use svg2pdf::usvg;
use tracing::{debug, warn};

const SLIDE_XOBJECT: &[u8] = b"Slide";

/// An assembled PDF plus what went into it.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub bytes: Vec<u8>,
    /// One entry per page, in order.
    pub pages: Vec<PageSpec>,
    /// Indices rendered as hole pages.
    pub missing: Vec<usize>,
    /// Indices whose markup could not be rendered.
    pub unrenderable: Vec<usize>,
}

impl AssembledDocument {
    /// No holes.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Build the PDF synchronously.
pub fn assemble(slides: &[SlideResult], load_system_fonts: bool) -> AssembledDocument {
    let mut options = usvg::Options::default();
    if load_system_fonts {
        options.fontdb_mut().load_system_fonts();
    }

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();

    let mut pdf = Pdf::new();
    let mut sizes = SizeResolver::new();
    let mut page_ids = Vec::with_capacity(slides.len());
    let mut pages = Vec::with_capacity(slides.len());
    let mut missing = Vec::new();
    let mut unrenderable = Vec::new();

    for slide in slides {
        let spec = sizes.resolve(slide.content.as_deref());

        let graphic = match slide.content.as_deref() {
            None => {
                missing.push(slide.index);
                None
            }
            Some(svg) => match convert_slide(svg, &options) {
                Ok(converted) => Some(converted),
                Err(e) => {
                    warn!("Slide {}: cannot render markup, emitting blank page: {}", slide.index, e);
                    unrenderable.push(slide.index);
                    None
                }
            },
        };

        // Link the converted chunk into our id space and draw it over the page.
        let placed = graphic.and_then(|(chunk, root)| {
            let mut map = HashMap::new();
            let chunk = chunk.renumber(|old| *map.entry(old).or_insert_with(|| alloc.bump()));
            let xobject_id = map.get(&root).copied()?;
            pdf.extend(&chunk);

            let content_id = alloc.bump();
            let mut content = Content::new();
            content
                .save_state()
                .transform([spec.width, 0.0, 0.0, spec.height, 0.0, 0.0])
                .x_object(Name(SLIDE_XOBJECT))
                .restore_state();
            pdf.stream(content_id, &content.finish());
            Some((content_id, xobject_id))
        });

        let page_id = alloc.bump();
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, spec.width, spec.height))
            .parent(page_tree_id);
        if let Some((content_id, xobject_id)) = placed {
            page.contents(content_id);
            page.resources()
                .x_objects()
                .pair(Name(SLIDE_XOBJECT), xobject_id);
        }
        page.finish();

        debug!(
            "Slide {}: page {:.2}×{:.2} pt",
            slide.index, spec.width, spec.height
        );
        page_ids.push(page_id);
        pages.push(spec);
    }

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    AssembledDocument {
        bytes: pdf.finish(),
        pages,
        missing,
        unrenderable,
    }
}

/// [`assemble`] on tokio's blocking pool.
pub async fn assemble_blocking(
    slides: Vec<SlideResult>,
    load_system_fonts: bool,
) -> Result<AssembledDocument, SlidesError> {
    tokio::task::spawn_blocking(move || assemble(&slides, load_system_fonts))
        .await
        .map_err(|e| SlidesError::Internal(format!("Assembly task panicked: {}", e)))
}

fn convert_slide(svg: &str, options: &usvg::Options) -> Result<(Chunk, Ref), String> {
    let tree = usvg::Tree::from_str(svg, options).map_err(|e| e.to_string())?;
    svg2pdf::to_chunk(&tree, svg2pdf::ConversionOptions::default()).map_err(|e| e.to_string())
}
