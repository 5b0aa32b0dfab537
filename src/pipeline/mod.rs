//! Pipeline stages for slide acquisition and PDF assembly.
//!
//! Each submodule implements exactly one step and is testable on its own
//! against an in-memory [`source::SlideSource`].
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ length ──▶ fetch ──▶ size ──▶ assemble
//! (HTTP)    (bisect)   (fan-out)  (pt/px)  (svg2pdf)
//! ```
//!
//! 1. [`source`]  : presence probe and body fetch for one slide index
//! 2. [`retry`]   : fixed-backoff strike loop used by both network stages
//! 3. [`length`]  : binary search for the number of contiguous slides
//! 4. [`fetch`]   : concurrent, order-preserving fetch of every slide
//! 5. [`size`]    : page size from the slide's declared width/height
//! 6. [`assemble`]: one PDF page per slide; runs on the blocking pool

pub mod assemble;
pub mod fetch;
pub mod length;
pub mod retry;
pub mod size;
pub mod source;

#[cfg(test)]
pub(crate) mod test_support;
