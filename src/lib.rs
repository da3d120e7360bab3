mod error;
pub mod fonts;
pub mod model;
pub mod pdf;

pub use error::Error;
pub use fonts::FontSource;
pub use model::HealthRecord;
pub use pdf::sections::{CATALOGUE, SectionDescriptor, SectionKind};
pub use pdf::{BlockKind, Document, DrawOp, Page, PageSize, PlacedBlock, RenderOptions};

use std::path::Path;
use std::time::Instant;

/// MIME type of the rendered document.
pub const CONTENT_TYPE: &str = "application/pdf";

/// Download name for a record's profile: `health_profile_<id>.pdf`.
pub fn suggested_filename(id: Option<&str>) -> String {
    let id: String = id
        .unwrap_or("unknown")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    let id = if id.is_empty() { "unknown" } else { id.as_str() };
    format!("health_profile_{id}.pdf")
}

/// Lay out `record` and return the finished PDF.
pub fn render_health_profile(record: &HealthRecord, options: &RenderOptions) -> Result<Vec<u8>, Error> {
    pdf::render(record, options)
}

/// Render an already decoded record to `output`.
pub fn write_health_profile(
    record: &HealthRecord,
    output: &Path,
    options: &RenderOptions,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let bytes = pdf::render(record, options)?;
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

pub fn convert_record_to_pdf(input: &Path, output: &Path, options: &RenderOptions) -> Result<(), Error> {
    let bytes = std::fs::read(input).map_err(Error::Io)?;
    convert_record_bytes_to_pdf(&bytes, output, options)
}

pub fn convert_record_bytes_to_pdf(
    input: &[u8],
    output: &Path,
    options: &RenderOptions,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let record = HealthRecord::from_json_bytes(input)?;
    let t_parse = t0.elapsed();

    write_health_profile(&record, output, options)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, total={:.1}ms",
        t_parse.as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
    );

    Ok(())
}
