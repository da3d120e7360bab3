use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use pdf_writer::{Content, Date, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Error;
use crate::fonts::{EmbeddedFont, FontId};

use super::cursor::Document;
use super::surface::{Color, DrawOp, RectSpec, Surface, TextStyle};

const PRODUCER: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));
/// Bezier control distance for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// Fill and stroke alpha in thousandths, used to share graphics states.
type AlphaKey = (u16, u16);

fn alpha_key(fill: f32, stroke: f32) -> AlphaKey {
    let q = |a: f32| (a.clamp(0.0, 1.0) * 1000.0).round() as u16;
    (q(fill), q(stroke))
}

fn rect_alpha(rect: &RectSpec) -> AlphaKey {
    let stroke = rect.border.map(|b| b.opacity).unwrap_or(1.0);
    alpha_key(rect.opacity, stroke)
}

const OPAQUE: AlphaKey = (1000, 1000);

fn rgb(color: Color) -> (f32, f32, f32) {
    (
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
    )
}

/// Writes draw operations into one PDF content stream.
struct ContentSurface<'a> {
    content: Content,
    fonts: &'a HashMap<FontId, &'a EmbeddedFont>,
    states: &'a BTreeMap<AlphaKey, String>,
}

impl ContentSurface<'_> {
    fn apply_alpha(&mut self, key: AlphaKey) {
        if key == OPAQUE {
            return;
        }
        if let Some(name) = self.states.get(&key) {
            self.content.set_parameters(Name(name.as_bytes()));
        }
    }
}

impl Surface for ContentSurface<'_> {
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        let Some(font) = self.fonts.get(&style.font) else {
            return;
        };
        let encoded = font.encode(text);
        if encoded.is_empty() {
            return;
        }
        let (r, g, b) = rgb(style.color);
        self.content.set_fill_rgb(r, g, b);
        self.content
            .begin_text()
            .set_font(Name(font.pdf_name.as_bytes()), style.size)
            .next_line(x, y)
            .show(Str(&encoded))
            .end_text();
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Color) {
        let (r, g, b) = rgb(color);
        self.content
            .save_state()
            .set_stroke_rgb(r, g, b)
            .set_line_width(thickness)
            .move_to(from.0, from.1)
            .line_to(to.0, to.1)
            .stroke()
            .restore_state();
    }

    fn draw_rect(&mut self, rect: RectSpec) {
        self.content.save_state();
        self.apply_alpha(rect_alpha(&rect));
        if let Some(fill) = rect.fill {
            let (r, g, b) = rgb(fill);
            self.content.set_fill_rgb(r, g, b);
        }
        if let Some(border) = rect.border {
            let (r, g, b) = rgb(border.color);
            self.content
                .set_stroke_rgb(r, g, b)
                .set_line_width(border.width);
        }
        self.content.rect(rect.x, rect.y, rect.width, rect.height);
        match (rect.fill.is_some(), rect.border.is_some()) {
            (true, true) => self.content.fill_nonzero_and_stroke(),
            (true, false) => self.content.fill_nonzero(),
            (false, true) => self.content.stroke(),
            (false, false) => self.content.end_path(),
        };
        self.content.restore_state();
    }

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color, opacity: f32) {
        let k = KAPPA * radius;
        let (r, g, b) = rgb(color);
        self.content.save_state();
        self.apply_alpha(alpha_key(opacity, opacity));
        self.content
            .set_fill_rgb(r, g, b)
            .move_to(cx + radius, cy)
            .cubic_to(cx + radius, cy + k, cx + k, cy + radius, cx, cy + radius)
            .cubic_to(cx - k, cy + radius, cx - radius, cy + k, cx - radius, cy)
            .cubic_to(cx - radius, cy - k, cx - k, cy - radius, cx, cy - radius)
            .cubic_to(cx + k, cy - radius, cx + radius, cy - k, cx + radius, cy)
            .close_path()
            .fill_nonzero()
            .restore_state();
    }
}

/// Characters drawn with each font, for subsetting.
fn used_chars(doc: &Document) -> HashMap<FontId, BTreeSet<char>> {
    let mut used: HashMap<FontId, BTreeSet<char>> = HashMap::new();
    for op in doc.pages().iter().flat_map(|p| p.ops()) {
        if let DrawOp::Text { text, style, .. } = op {
            used.entry(style.font).or_default().extend(text.chars());
        }
    }
    used
}

/// Distinct translucent states drawn anywhere in the document.
fn alpha_states(doc: &Document) -> BTreeSet<AlphaKey> {
    doc.pages()
        .iter()
        .flat_map(|p| p.ops())
        .filter_map(|op| match op {
            DrawOp::Rect(rect) => Some(rect_alpha(rect)),
            DrawOp::Circle { opacity, .. } => Some(alpha_key(*opacity, *opacity)),
            _ => None,
        })
        .filter(|key| *key != OPAQUE)
        .collect()
}

/// Write the frozen, footer-stamped document as PDF bytes.
pub fn serialize(doc: &Document, generated_on: NaiveDate) -> Result<Vec<u8>, Error> {
    if doc.page_count() == 0 {
        return Err(Error::Serialize("document has no pages".into()));
    }

    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    // Phase 1: fonts, subset to the characters actually drawn
    let embedded = doc.fonts().embed(&mut pdf, &mut alloc, &used_chars(doc))?;
    let by_font: HashMap<FontId, &EmbeddedFont> = embedded.iter().map(|f| (f.id, f)).collect();
    let mut font_pairs: Vec<(&str, Ref)> = Vec::new();
    for font in &embedded {
        if !font_pairs.iter().any(|(name, _)| *name == font.pdf_name) {
            font_pairs.push((font.pdf_name.as_str(), font.font_ref));
        }
    }
    let t_fonts = t0.elapsed();

    // Phase 2: shared graphics states for opacity
    let mut states: BTreeMap<AlphaKey, String> = BTreeMap::new();
    let mut state_refs: Vec<(String, Ref)> = Vec::new();
    for (i, key) in alpha_states(doc).into_iter().enumerate() {
        let name = format!("GS{}", i + 1);
        let r = alloc();
        pdf.ext_graphics(r)
            .non_stroking_alpha(key.0 as f32 / 1000.0)
            .stroking_alpha(key.1 as f32 / 1000.0);
        states.insert(key, name.clone());
        state_refs.push((name, r));
    }

    // Phase 3: content streams
    let n = doc.page_count();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, page) in doc.pages().iter().enumerate() {
        let mut surface = ContentSurface {
            content: Content::new(),
            fonts: &by_font,
            states: &states,
        };
        page.replay(&mut surface);
        let raw = surface.content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }
    let t_content = t0.elapsed();

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for (i, page) in doc.pages().iter().enumerate() {
        let size = page.size();
        let mut pdf_page = pdf.page(page_ids[i]);
        pdf_page
            .media_box(Rect::new(0.0, 0.0, size.width, size.height))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = pdf_page.resources();
        {
            let mut fonts = resources.fonts();
            for (name, font_ref) in &font_pairs {
                fonts.pair(Name(name.as_bytes()), *font_ref);
            }
        }
        if !state_refs.is_empty() {
            let mut gs = resources.ext_g_states();
            for (name, r) in &state_refs {
                gs.pair(Name(name.as_bytes()), *r);
            }
        }
    }

    pdf.document_info(info_id)
        .title(TextStr(doc.title()))
        .producer(TextStr(PRODUCER))
        .creation_date(
            Date::new(generated_on.year().clamp(0, 9999) as u16)
                .month(generated_on.month() as u8)
                .day(generated_on.day() as u8),
        );

    let t_assembly = t0.elapsed();
    log::info!(
        "Serialize phases: fonts={:.1}ms, content={:.1}ms, assembly={:.1}ms ({} pages)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_content - t_fonts).as_secs_f64() * 1000.0,
        (t_assembly - t_content).as_secs_f64() * 1000.0,
        n,
    );

    Ok(pdf.finish())
}
