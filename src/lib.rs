mod error;
mod fonts;
pub mod model;
mod pdf;

pub use error::Error;
pub use pdf::{ListKind, ListOutcome, PageExtent, Position};

use std::path::Path;
use std::time::Instant;

use model::Document;

/// Render a document to PDF bytes. The document is taken mutably because
/// rendering records layout results (section start pages) back into the
/// tree and may insert or remove generated list sections.
pub fn render_document(doc: &mut Document) -> Result<Vec<u8>, Error> {
    pdf::render(doc)
}

pub fn render_document_to_file(doc: &mut Document, output: &Path) -> Result<(), Error> {
    let t0 = Instant::now();

    let bytes = pdf::render(doc)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}
