use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::error::Error;

/// The four faces the layout draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontId {
    Regular,
    Bold,
    Serif,
    SerifBold,
}

impl FontId {
    pub const ALL: [FontId; 4] = [
        FontId::Regular,
        FontId::Bold,
        FontId::Serif,
        FontId::SerifBold,
    ];

    fn standard_name(self) -> &'static str {
        match self {
            FontId::Regular => "Helvetica",
            FontId::Bold => "Helvetica-Bold",
            FontId::Serif => "Times-Roman",
            FontId::SerifBold => "Times-Bold",
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, FontId::Bold | FontId::SerifBold)
    }
}

/// Where the document's fonts come from.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FontSource {
    /// The base-14 PDF fonts; nothing is embedded and loading cannot fail.
    #[default]
    Standard,
    /// TrueType/OpenType files embedded as subsetted CIDFonts. Serif slots
    /// reuse the regular and bold faces.
    Custom { regular: PathBuf, bold: PathBuf },
}

struct TrueTypeFace {
    path: PathBuf,
    name: String,
    data: Mmap,
}

enum FaceData {
    Standard { widths_1000: Vec<f32> },
    TrueType(TrueTypeFace),
}

/// Font resources shared by every page of one document.
pub struct FontSet {
    faces: HashMap<FontId, FaceData>,
}

impl FontSet {
    pub fn standard() -> Self {
        let faces = FontId::ALL
            .into_iter()
            .map(|id| {
                let widths_1000 = if matches!(id, FontId::Serif | FontId::SerifBold) {
                    times_widths(id.is_bold())
                } else {
                    helvetica_widths(id.is_bold())
                };
                (id, FaceData::Standard { widths_1000 })
            })
            .collect();
        FontSet { faces }
    }

    pub fn load(source: &FontSource) -> Result<Self, Error> {
        match source {
            FontSource::Standard => Ok(Self::standard()),
            FontSource::Custom { regular, bold } => {
                let t0 = std::time::Instant::now();
                let regular = load_truetype(regular)?;
                let bold = load_truetype(bold)?;
                log::debug!(
                    "Loaded fonts {} / {} in {:.1}ms",
                    regular.name,
                    bold.name,
                    t0.elapsed().as_secs_f64() * 1000.0
                );
                let mut faces = HashMap::new();
                faces.insert(FontId::Regular, FaceData::TrueType(regular));
                faces.insert(FontId::Bold, FaceData::TrueType(bold));
                Ok(FontSet { faces })
            }
        }
    }

    fn face(&self, font: FontId) -> Option<&FaceData> {
        self.faces.get(&self.resolve(font))
    }

    /// Slot that actually backs `font` (serif slots fall back for custom sets).
    fn resolve(&self, font: FontId) -> FontId {
        if self.faces.contains_key(&font) {
            return font;
        }
        if font.is_bold() { FontId::Bold } else { FontId::Regular }
    }

    /// Advance width of `text` in points.
    pub fn text_width(&self, font: FontId, text: &str, size: f32) -> f32 {
        match self.face(font) {
            Some(FaceData::Standard { widths_1000 }) => to_winansi_bytes(text)
                .iter()
                .filter(|&&b| b >= 32)
                .map(|&b| widths_1000[(b - 32) as usize] * size / 1000.0)
                .sum(),
            Some(FaceData::TrueType(tt)) => {
                let Ok(face) = Face::parse(&tt.data, 0) else {
                    return 0.0;
                };
                let units = face.units_per_em() as f32;
                text.chars()
                    .filter_map(|ch| face.glyph_index(ch))
                    .filter_map(|gid| face.glyph_hor_advance(gid))
                    .map(|adv| adv as f32 / units * size)
                    .sum()
            }
            None => 0.0,
        }
    }

    /// Write every font used by the document and return the per-font
    /// encoders the content streams need.
    pub(crate) fn embed(
        &self,
        pdf: &mut Pdf,
        alloc: &mut impl FnMut() -> Ref,
        used_chars: &HashMap<FontId, BTreeSet<char>>,
    ) -> Result<Vec<EmbeddedFont>, Error> {
        let mut out = Vec::new();
        // Slots backed by the same face share one PDF font object.
        let mut by_slot: HashMap<FontId, usize> = HashMap::new();

        for id in FontId::ALL {
            let slot = self.resolve(id);
            if let Some(&idx) = by_slot.get(&slot) {
                let shared: &EmbeddedFont = &out[idx];
                let alias = EmbeddedFont {
                    id,
                    pdf_name: shared.pdf_name.clone(),
                    font_ref: shared.font_ref,
                    char_to_gid: shared.char_to_gid.clone(),
                };
                out.push(alias);
                continue;
            }

            let pdf_name = format!("F{}", by_slot.len() + 1);
            let font_ref = alloc();
            let char_to_gid = match self.face(id) {
                Some(FaceData::TrueType(tt)) => {
                    let mut chars: BTreeSet<char> = BTreeSet::new();
                    for (font, set) in used_chars {
                        if self.resolve(*font) == slot {
                            chars.extend(set.iter().copied());
                        }
                    }
                    chars.insert(' ');
                    Some(embed_truetype(pdf, font_ref, tt, &chars, alloc)?)
                }
                _ => {
                    let dropped = unencodable(used_chars.get(&id).into_iter().flatten());
                    if !dropped.is_empty() {
                        log::warn!(
                            "{} cannot encode {} character(s) ({}); they are left out. \
                             Pass a custom TrueType font to keep them",
                            id.standard_name(),
                            dropped.len(),
                            dropped.iter().collect::<String>()
                        );
                    }
                    pdf.type1_font(font_ref)
                        .base_font(Name(id.standard_name().as_bytes()))
                        .encoding_predefined(Name(b"WinAnsiEncoding"));
                    None
                }
            };

            by_slot.insert(slot, out.len());
            out.push(EmbeddedFont {
                id,
                pdf_name,
                font_ref,
                char_to_gid,
            });
        }

        Ok(out)
    }
}

/// A font object written into the PDF, with the encoder for its strings.
pub(crate) struct EmbeddedFont {
    pub(crate) id: FontId,
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    char_to_gid: Option<HashMap<char, u16>>,
}

impl EmbeddedFont {
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

fn load_truetype(path: &Path) -> Result<TrueTypeFace, Error> {
    let font_err = |reason: String| Error::Font {
        path: path.to_path_buf(),
        reason,
    };
    let file = std::fs::File::open(path).map_err(|e| font_err(e.to_string()))?;
    // The mapping lives as long as the FontSet; font files are not rewritten
    // while a document renders.
    let data = unsafe { Mmap::map(&file) }.map_err(|e| font_err(e.to_string()))?;
    let face = Face::parse(&data, 0).map_err(|e| font_err(e.to_string()))?;
    let name = font_family_name(&face).unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "EmbeddedFont".to_string())
    });
    drop(face);
    Ok(TrueTypeFace {
        path: path.to_path_buf(),
        name,
        data,
    })
}

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes. Characters the
/// encoding cannot represent are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .filter_map(|c| match char_to_winansi(c) {
            0 => None,
            b => Some(b),
        })
        .collect()
}

/// Distinct characters WinAnsi has no byte for.
fn unencodable<'a>(chars: impl IntoIterator<Item = &'a char>) -> BTreeSet<char> {
    chars
        .into_iter()
        .copied()
        .filter(|&c| char_to_winansi(c) == 0)
        .collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths(bold: bool) -> Vec<f32> {
    let widths = (32u8..=255u8).map(|b| match b {
        32 => 278.0,                          // space
        33..=47 => 333.0,                     // punctuation
        48..=57 => 556.0,                     // digits
        58..=64 => 333.0,                     // more punctuation
        73 | 74 => 278.0,                     // I J
        77 => 833.0,                          // M
        65..=90 => 667.0,                     // uppercase A-Z
        91..=96 => 333.0,                     // brackets etc.
        102 | 105 | 106 | 108 | 116 => 278.0, // f i j l t
        109 | 119 => 833.0,                   // m w
        97..=122 => 556.0,                    // lowercase a-z
        0x95 => 350.0,                        // bullet
        0x97 => 1000.0,                       // em dash
        _ => 556.0,
    });
    if bold {
        widths.map(|w| if w < 300.0 { w } else { w * 1.05 }).collect()
    } else {
        widths.collect()
    }
}

/// Approximate Times widths at 1000 units/em for WinAnsi chars 32..=255.
fn times_widths(bold: bool) -> Vec<f32> {
    let widths = (32u8..=255u8).map(|b| match b {
        32 => 250.0,
        33..=47 => 333.0,
        48..=57 => 500.0,
        58..=64 => 278.0,
        73 => 333.0,
        74 => 389.0,
        77 => 889.0,
        65..=90 => 667.0,
        91..=96 => 333.0,
        102 | 105 | 106 | 108 | 116 => 278.0,
        109 => 778.0,
        119 => 722.0,
        97..=122 => 472.0,
        0x95 => 350.0,
        0x97 => 1000.0,
        _ => 500.0,
    });
    if bold {
        widths.map(|w| w * 1.04).collect()
    } else {
        widths.collect()
    }
}

/// Embed a TrueType/OpenType face as a CIDFont (Type0 composite) with
/// Identity-H encoding, subset to `used_chars`.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    tt: &TrueTypeFace,
    used_chars: &BTreeSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<HashMap<char, u16>, Error> {
    let face = Face::parse(&tt.data, 0).map_err(|e| Error::Font {
        path: tt.path.clone(),
        reason: e.to_string(),
    })?;
    let descriptor_ref = alloc();
    let data_ref = alloc();

    let units = face.units_per_em() as f32;
    let to_1000 = |v: f32| v / units * 1000.0;
    let ascent = to_1000(face.ascender() as f32);
    let descent = to_1000(face.descender() as f32);
    let cap_height = face
        .capital_height()
        .map(|h| to_1000(h as f32))
        .unwrap_or(700.0);
    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        to_1000(bb.x_min as f32),
        to_1000(bb.y_min as f32),
        to_1000(bb.x_max as f32),
        to_1000(bb.y_max as f32),
    );

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut glyphs: Vec<(char, u16, u16, f32)> = Vec::new();
    for &ch in used_chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| to_1000(adv as f32))
                .unwrap_or(0.0);
            glyphs.push((ch, gid.0, new_gid, w));
        }
    }

    // A full-font fallback keeps the original glyph ids.
    let (subset_data, subsetted) = match subsetter::subset(&tt.data, 0, &remapper) {
        Ok(data) => (data, true),
        Err(e) => {
            log::warn!("Font subsetting failed for {}: {e}; embedding full font", tt.name);
            (tt.data.to_vec(), false)
        }
    };
    let gid_of = |old: u16, new: u16| if subsetted { new } else { old };
    let char_to_gid: HashMap<char, u16> = glyphs
        .iter()
        .map(|&(ch, old, new, _)| (ch, gid_of(old, new)))
        .collect();
    let mut gid_widths: Vec<(u16, f32)> = glyphs
        .iter()
        .map(|&(_, old, new, w)| (gid_of(old, new), w))
        .collect();
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let data_len = i32::try_from(subset_data.len()).map_err(|_| Error::Font {
        path: tt.path.clone(),
        reason: "font program too large".into(),
    })?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = tt.name.replace(' ', "");

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };

    let cid_font_ref = alloc();
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = pdf_writer::types::UnicodeCmap::new(Name(cmap_name.as_bytes()), system_info);
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Ok(char_to_gid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winansi_keeps_em_dash_and_bullet() {
        assert_eq!(to_winansi_bytes("a\u{2014}b"), vec![b'a', 0x97, b'b']);
        assert_eq!(to_winansi_bytes("\u{2022} x"), vec![0x95, b' ', b'x']);
    }

    #[test]
    fn winansi_drops_unmappable() {
        assert_eq!(to_winansi_bytes("Rs\u{20B9}"), b"Rs".to_vec());
    }

    #[test]
    fn devanagari_is_reported_as_unencodable() {
        let used: BTreeSet<char> = "Asha \u{0906}\u{0936}\u{093E}".chars().collect();
        let dropped = unencodable(&used);
        assert_eq!(
            dropped.into_iter().collect::<String>(),
            "\u{0906}\u{0936}\u{093E}"
        );
        assert!(unencodable(&"Rs. 1,200 \u{2014} ok".chars().collect::<BTreeSet<_>>()).is_empty());
    }

    #[test]
    fn standard_widths_scale_with_size() {
        let fonts = FontSet::standard();
        let w10 = fonts.text_width(FontId::Regular, "Page 1 of 2", 10.0);
        let w20 = fonts.text_width(FontId::Regular, "Page 1 of 2", 20.0);
        assert!(w10 > 0.0);
        assert!((w20 - 2.0 * w10).abs() < 1e-3);
    }

    #[test]
    fn missing_custom_font_is_fatal() {
        let source = FontSource::Custom {
            regular: PathBuf::from("/definitely/not/here.ttf"),
            bold: PathBuf::from("/definitely/not/here-bold.ttf"),
        };
        assert!(matches!(FontSet::load(&source), Err(Error::Font { .. })));
    }
}
