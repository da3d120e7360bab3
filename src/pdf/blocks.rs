use crate::fonts::FontId;

use super::cursor::{BlockKind, FIRST_PAGE_CONTENT_OFFSET, Layout, headroom};
use super::surface::{RectSpec, Surface, TextStyle, palette};

pub const SUBTITLE: &str = "Comprehensive Medical Record";
/// Label used by every "no data" row.
pub const NOTICE_LABEL: &str = "Note";
/// Gap left after the last block of a section.
pub const SECTION_GAP: f32 = 10.0;

const SECTION_BAND_HEIGHT: f32 = 30.0;
const SECTION_ADVANCE: f32 = 40.0;
const ROW_BAND_HEIGHT: f32 = 20.0;
const ROW_ADVANCE: f32 = 25.0;
const BULLET_ADVANCE: f32 = 20.0;
/// x offset of values in key-value rows and bullet lines.
const VALUE_COLUMN: f32 = 150.0;

/// Full-width banner at the top of page one. Moves the cursor below it.
pub fn title_banner(layout: &mut Layout) -> f32 {
    let size = layout.size();
    let (width, height) = (size.width, size.height);
    let margin = layout.content_left();

    let title_style = TextStyle::new(FontId::SerifBold, 36.0, palette::WHITE);
    let subtitle_style = TextStyle::new(FontId::Serif, 16.0, palette::WHITE);
    let title = layout.title().to_string();
    let title_w = layout.fonts().text_width(title_style.font, &title, title_style.size);
    let subtitle_w = layout
        .fonts()
        .text_width(subtitle_style.font, SUBTITLE, subtitle_style.size);

    let page = layout.page();
    page.draw_rect(RectSpec::filled(0.0, height - 150.0, width, 150.0, palette::PRIMARY_BLUE));
    for i in 0..5 {
        page.draw_circle(margin + i as f32 * 20.0, height - 30.0, 8.0, palette::TEAL, 1.0);
    }
    page.draw_text(&title, (width - title_w) / 2.0, height - 80.0, title_style);
    page.draw_line(
        (width / 2.0 - 100.0, height - 90.0),
        (width / 2.0 + 100.0, height - 90.0),
        2.0,
        palette::WHITE,
    );
    page.draw_text(SUBTITLE, (width - subtitle_w) / 2.0, height - 110.0, subtitle_style);

    layout.record(BlockKind::TitleBanner);
    layout.set_y(height - FIRST_PAGE_CONTENT_OFFSET);
    layout.y()
}

/// Layered band with an accent bar and the section title.
///
/// The previous section is closed before checking for room, so a break
/// triggered here carries the document-level continuation banner.
pub fn section_header(layout: &mut Layout, title: &'static str) -> f32 {
    layout.end_section();
    let y = layout.ensure_space(headroom::SECTION_HEADER);
    layout.begin_section(title);

    let margin = layout.content_left();
    let width = layout.size().width;
    let band_w = layout.content_width() + 20.0;

    let page = layout.page();
    for i in 0..5 {
        let i = i as f32;
        let opacity = (0.8 - i * 0.15).max(0.1);
        page.draw_rect(
            RectSpec::filled(
                margin - 10.0 + i,
                y - 5.0 - i,
                band_w - i * 2.0,
                SECTION_BAND_HEIGHT,
                palette::PRIMARY_BLUE,
            )
            .with_opacity(opacity),
        );
    }
    page.draw_rect(RectSpec::filled(
        margin - 15.0,
        y - 5.0,
        5.0,
        SECTION_BAND_HEIGHT,
        palette::ORANGE,
    ));
    page.draw_text(title, margin, y, TextStyle::new(FontId::Bold, 16.0, palette::WHITE));
    page.draw_circle(width - margin - 15.0, y + 10.0, 6.0, palette::ORANGE, 1.0);

    layout.record(BlockKind::SectionHeader);
    layout.set_y(y - SECTION_ADVANCE);
    layout.y()
}

/// Striped label/value row.
pub fn key_value_row(layout: &mut Layout, label: &str, value: &str, row_index: usize) -> f32 {
    striped_row(layout, label, value, row_index, BlockKind::KeyValueRow)
}

/// The single row that stands in for a section without data.
pub fn notice(layout: &mut Layout, message: &str) -> f32 {
    striped_row(layout, NOTICE_LABEL, message, 0, BlockKind::Notice)
}

fn striped_row(
    layout: &mut Layout,
    label: &str,
    value: &str,
    row_index: usize,
    kind: BlockKind,
) -> f32 {
    let y = layout.ensure_space(headroom::KEY_VALUE_ROW);
    let margin = layout.content_left();
    let row_w = layout.content_width() + 10.0;
    let background = stripe_color(row_index);

    let page = layout.page();
    page.draw_rect(
        RectSpec::filled(margin - 5.0, y - 5.0, row_w, ROW_BAND_HEIGHT, background)
            .with_border(palette::MEDIUM_GRAY, 0.5),
    );
    page.draw_circle(margin, y + 5.0, 3.0, palette::TEAL, 1.0);
    page.draw_text(
        &format!("{label}:"),
        margin + 10.0,
        y,
        TextStyle::new(FontId::Bold, 11.0, palette::BLACK),
    );
    page.draw_text(
        value,
        margin + VALUE_COLUMN,
        y,
        TextStyle::new(FontId::Regular, 11.0, palette::PRIMARY_BLUE),
    );

    layout.record(kind);
    layout.set_y(y - ROW_ADVANCE);
    layout.y()
}

/// Bulleted line aligned with the value column of the row above it.
pub fn bullet_line(layout: &mut Layout, text: &str) -> f32 {
    let y = layout.ensure_space(headroom::BULLET_LINE);
    let x = layout.content_left() + VALUE_COLUMN;
    layout.page().draw_text(
        &format!("\u{2022} {text}"),
        x,
        y,
        TextStyle::new(FontId::Regular, 11.0, palette::PRIMARY_BLUE),
    );
    layout.record(BlockKind::Bullet);
    layout.set_y(y - BULLET_ADVANCE);
    layout.y()
}

pub fn section_gap(layout: &mut Layout) -> f32 {
    layout.advance(SECTION_GAP)
}

/// Alternating row background: even rows shaded, odd rows white.
pub fn stripe_color(row_index: usize) -> super::surface::Color {
    if row_index % 2 == 0 {
        palette::LIGHT_GRAY
    } else {
        palette::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontSet;
    use crate::pdf::cursor::CONTINUATION_CONTENT_OFFSET;
    use crate::pdf::surface::{DrawOp, PageSize};

    fn layout() -> Layout {
        Layout::new(PageSize::A4, FontSet::standard(), "Health Profile")
    }

    #[test]
    fn banner_moves_cursor_below_it() {
        let mut l = layout();
        let y = title_banner(&mut l);
        assert_eq!(y, PageSize::A4.height - FIRST_PAGE_CONTENT_OFFSET);
    }

    #[test]
    fn section_header_advances_by_band_and_spacing() {
        let mut l = layout();
        l.set_y(500.0);
        assert_eq!(section_header(&mut l, "Allergies"), 460.0);
        assert_eq!(l.section(), Some("Allergies"));
    }

    #[test]
    fn section_header_near_bottom_breaks_with_title_banner() {
        let mut l = layout();
        l.begin_section("Allergies");
        l.set_y(90.0);
        let y = section_header(&mut l, "Current Medications");
        let expected_top = PageSize::A4.height - CONTINUATION_CONTENT_OFFSET;
        assert_eq!(y, expected_top - 40.0);

        let doc = l.finish();
        let texts: Vec<&str> = doc.pages()[1].texts().collect();
        assert_eq!(texts, vec!["Health Profile \u{2014} Continued", "Current Medications"]);
    }

    #[test]
    fn notice_is_a_single_note_row() {
        let mut l = layout();
        l.set_y(300.0);
        assert_eq!(notice(&mut l, "No allergies recorded."), 275.0);
        let doc = l.finish();
        let texts: Vec<&str> = doc.pages()[0].texts().collect();
        assert_eq!(texts, vec!["Note:", "No allergies recorded."]);
        assert_eq!(doc.trace()[0].kind, BlockKind::Notice);
    }

    #[test]
    fn row_stripes_alternate() {
        let mut l = layout();
        l.set_y(400.0);
        for i in 0..4 {
            key_value_row(&mut l, "K", "V", i);
        }
        let doc = l.finish();
        let fills: Vec<_> = doc.pages()[0]
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect(r) => r.fill,
                _ => None,
            })
            .collect();
        assert_eq!(fills[0], fills[2]);
        assert_eq!(fills[1], fills[3]);
        assert_ne!(fills[0], fills[1]);
    }
}
