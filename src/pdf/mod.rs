pub mod blocks;
pub mod card;
pub mod cursor;
pub mod footer;
pub mod sections;
pub mod serialize;
pub mod surface;
pub mod table;
pub mod text;

use chrono::NaiveDate;

use crate::error::Error;
use crate::fonts::{FontSet, FontSource};
use crate::model::HealthRecord;

pub use cursor::{BlockKind, Document, Layout, PlacedBlock};
pub use surface::{DrawOp, Page, PageSize};

pub const DEFAULT_TITLE: &str = "Health Profile";

const FONT_ENV: &str = "HEALTH_PROFILE_FONT";
const BOLD_FONT_ENV: &str = "HEALTH_PROFILE_BOLD_FONT";

/// Knobs for one render. `Default` gives an A4 document with the standard
/// fonts, dated today.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    pub page_size: PageSize,
    /// Date stamped into the footer and the document info. `None` means today.
    pub generated_on: Option<NaiveDate>,
    pub fonts: FontSource,
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            page_size: PageSize::A4,
            generated_on: None,
            fonts: FontSource::Standard,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl RenderOptions {
    /// Defaults, switched to custom fonts when both font variables are set.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        match (std::env::var_os(FONT_ENV), std::env::var_os(BOLD_FONT_ENV)) {
            (Some(regular), Some(bold)) => {
                options.fonts = FontSource::Custom {
                    regular: regular.into(),
                    bold: bold.into(),
                };
            }
            (Some(_), None) | (None, Some(_)) => {
                log::warn!("{FONT_ENV} and {BOLD_FONT_ENV} must be set together; using standard fonts");
            }
            (None, None) => {}
        }
        options
    }

    pub fn generation_date(&self) -> NaiveDate {
        self.generated_on
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Lay out every section and stamp the footers. The returned document is
/// frozen; only [`serialize::serialize`] reads it afterwards.
pub fn layout(record: &HealthRecord, options: &RenderOptions) -> Result<Document, Error> {
    let t0 = std::time::Instant::now();

    let fonts = FontSet::load(&options.fonts)?;
    let t_fonts = t0.elapsed();

    let mut layout = Layout::new(options.page_size, fonts, options.title.as_str());
    blocks::title_banner(&mut layout);
    sections::assemble(&mut layout, record)?;
    let mut doc = layout.finish();
    let t_layout = t0.elapsed();

    footer::stamp(&mut doc, options.generation_date());
    let t_footer = t0.elapsed();

    log::info!(
        "Layout phases: fonts={:.1}ms, sections={:.1}ms, footer={:.1}ms ({} pages)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_layout - t_fonts).as_secs_f64() * 1000.0,
        (t_footer - t_layout).as_secs_f64() * 1000.0,
        doc.page_count(),
    );

    Ok(doc)
}

/// Record in, PDF bytes out.
pub fn render(record: &HealthRecord, options: &RenderOptions) -> Result<Vec<u8>, Error> {
    let doc = layout(record, options)?;
    serialize::serialize(&doc, options.generation_date())
}
