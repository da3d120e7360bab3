use chrono::NaiveDate;

use crate::fonts::FontId;

use super::cursor::{Document, FOOTER_HEIGHT, MARGIN};
use super::surface::{RectSpec, Surface, TextStyle, palette};
use super::text::format_naive_date;

const DOT_SPACING: f32 = 15.0;

pub fn page_label(index: usize, total: usize) -> String {
    format!("Page {} of {}", index + 1, total)
}

/// Second pass over the frozen page list: the total page count is only
/// known once layout is done, so every footer is stamped here.
pub fn stamp(doc: &mut Document, generated_on: NaiveDate) {
    let total = doc.page_count();
    let generated = format!("{} Generated on {}", doc.title(), format_naive_date(generated_on));
    let style = TextStyle::new(FontId::Regular, 10.0, palette::WHITE);

    let labels: Vec<(String, f32)> = (0..total)
        .map(|i| {
            let label = page_label(i, total);
            let w = doc.fonts().text_width(style.font, &label, style.size);
            (label, w)
        })
        .collect();

    for (page, (label, label_w)) in doc.pages_mut().iter_mut().zip(labels) {
        let width = page.size().width;
        page.draw_rect(RectSpec::filled(0.0, 0.0, width, FOOTER_HEIGHT, palette::PRIMARY_BLUE));
        page.draw_text(&generated, MARGIN, 10.0, style);
        page.draw_text(&label, width - MARGIN - label_w, 10.0, style);
        for i in 0..3 {
            let cx = width / 2.0 - DOT_SPACING + i as f32 * DOT_SPACING;
            page.draw_circle(cx, 15.0, 5.0, palette::TEAL, 1.0);
        }
    }
    log::debug!("stamped footers on {total} pages");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontSet;
    use crate::pdf::cursor::Layout;
    use crate::pdf::surface::PageSize;

    #[test]
    fn every_page_gets_its_number_and_total() {
        let mut l = Layout::new(PageSize::A4, FontSet::standard(), "Health Profile");
        l.set_y(10.0);
        l.ensure_space(50.0);
        l.set_y(10.0);
        l.ensure_space(50.0);
        let mut doc = l.finish();
        assert_eq!(doc.page_count(), 3);

        let date = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        stamp(&mut doc, date);
        for (i, page) in doc.pages().iter().enumerate() {
            let texts: Vec<&str> = page.texts().collect();
            assert!(texts.contains(&"Health Profile Generated on 6/9/2024"));
            assert!(texts.contains(&page_label(i, 3).as_str()));
        }
        assert_eq!(doc.pages()[2].texts().last(), Some("Page 3 of 3"));
    }
}
