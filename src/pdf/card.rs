use crate::fonts::FontId;

use super::cursor::{BlockKind, Layout, headroom};
use super::surface::{Color, RectSpec, Surface, TextStyle, palette};

const TITLE_BAND: f32 = 25.0;
const LINE_ADVANCE: f32 = 15.0;
const METER_ADVANCE: f32 = 20.0;
const BOTTOM_PADDING: f32 = 10.0;
/// Distance of the panel top above the cursor baseline.
const TOP_ABOVE_BASELINE: f32 = 20.0;
/// Gap between the panel bottom and the next baseline.
const GAP_AFTER: f32 = 15.0;
const METER_WIDTH: f32 = 200.0;

/// Dot + label shown at the right end of the title band.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBadge {
    pub label: String,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CardLine {
    Field {
        label: &'static str,
        value: String,
        bold: bool,
    },
    /// Horizontal bar filled to `fraction` (clamped to 0..=1).
    Meter {
        label: &'static str,
        fraction: f32,
        color: Color,
    },
}

impl CardLine {
    pub fn field(label: &'static str, value: impl Into<String>) -> Self {
        CardLine::Field {
            label,
            value: value.into(),
            bold: false,
        }
    }

    pub fn bold_field(label: &'static str, value: impl Into<String>) -> Self {
        CardLine::Field {
            label,
            value: value.into(),
            bold: true,
        }
    }

    fn advance(&self) -> f32 {
        match self {
            CardLine::Field { .. } => LINE_ADVANCE,
            CardLine::Meter { .. } => METER_ADVANCE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BulletList {
    pub heading: &'static str,
    pub items: Vec<String>,
}

/// Bordered panel for one composite entity (a medicine package, an
/// insurance policy). Never split across pages.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub title: String,
    pub status: Option<StatusBadge>,
    pub lines: Vec<CardLine>,
    pub list: Option<BulletList>,
    pub border_opacity: f32,
}

impl Card {
    pub fn new(title: impl Into<String>) -> Self {
        Card {
            title: title.into(),
            status: None,
            lines: Vec::new(),
            list: None,
            border_opacity: 1.0,
        }
    }

    /// Panel height implied by the card's fields.
    pub fn height(&self) -> f32 {
        let lines: f32 = self.lines.iter().map(CardLine::advance).sum();
        let list = self
            .list
            .as_ref()
            .filter(|l| !l.items.is_empty())
            .map(|l| LINE_ADVANCE * (l.items.len() + 1) as f32)
            .unwrap_or(0.0);
        TITLE_BAND + LINE_ADVANCE + lines + list + BOTTOM_PADDING
    }

    /// A copy whose bullet list is cut so the card needs at most `capacity`,
    /// ending in a "+N more" item. `None` when no cut is needed or none helps.
    fn clamped(&self, capacity: f32) -> Option<Card> {
        let list = self.list.as_ref()?;
        let total = list.items.len();
        let listless = Card {
            list: None,
            ..self.clone()
        };
        // heading, kept items and the "+N more" line
        let room = capacity - headroom::card(listless.height());
        let keep = ((room / LINE_ADVANCE).floor() - 2.0).max(0.0) as usize;
        if keep >= total {
            return None;
        }
        let mut items: Vec<String> = list.items[..keep].to_vec();
        items.push(format!("+{} more", total - keep));
        Some(Card {
            list: Some(BulletList {
                heading: list.heading,
                items,
            }),
            ..listless
        })
    }
}

/// Reserve room for the whole card, then draw it.
pub fn render_card(layout: &mut Layout, card: &Card) -> f32 {
    let capacity = layout.page_capacity();
    let clamped;
    let mut card = card;
    if headroom::card(card.height()) > capacity {
        if let Some(short) = card.clamped(capacity) {
            log::warn!(
                "card '{}' is taller than a page; its list is cut to {} lines",
                card.title,
                short.list.as_ref().map_or(0, |l| l.items.len())
            );
            clamped = short;
            card = &clamped;
        }
    }
    let height = card.height();
    let required = headroom::card(height);
    if required > capacity {
        log::warn!(
            "card '{}' needs {:.0}pt but a page holds {:.0}pt; it will overrun the footer",
            card.title,
            required,
            capacity
        );
    }
    let y = layout.ensure_space(required);

    let left = layout.content_left();
    let width = layout.content_width();
    let top = y + TOP_ABOVE_BASELINE;
    let bottom = top - height;
    let status_w = card
        .status
        .as_ref()
        .map(|s| layout.fonts().text_width(FontId::Regular, &s.label, 12.0));

    let page = layout.page();
    let mut panel = RectSpec::filled(left, bottom, width, height, palette::LIGHT_BLUE)
        .with_border(palette::PRIMARY_BLUE, 1.0);
    if let Some(border) = panel.border.as_mut() {
        border.opacity = card.border_opacity;
    }
    page.draw_rect(panel);
    page.draw_rect(RectSpec::filled(
        left,
        top - TITLE_BAND,
        width,
        TITLE_BAND,
        palette::PRIMARY_BLUE,
    ));
    page.draw_text(
        &card.title,
        left + 10.0,
        top - 18.0,
        TextStyle::new(FontId::Bold, 14.0, palette::WHITE),
    );

    if let (Some(status), Some(status_w)) = (&card.status, status_w) {
        let dot_x = left + width - 20.0;
        page.draw_circle(dot_x, top - TITLE_BAND / 2.0, 8.0, status.color, 1.0);
        page.draw_text(
            &status.label,
            dot_x - 14.0 - status_w,
            top - 18.0,
            TextStyle::new(FontId::Regular, 12.0, status.color),
        );
    }

    let mut line_y = top - TITLE_BAND - LINE_ADVANCE;
    let regular = TextStyle::new(FontId::Regular, 12.0, palette::BLACK);
    let bold = TextStyle::new(FontId::Bold, 12.0, palette::BLACK);
    for line in &card.lines {
        match line {
            CardLine::Field {
                label,
                value,
                bold: is_bold,
            } => {
                let style = if *is_bold { bold } else { regular };
                page.draw_text(&format!("{label}: {value}"), left + 20.0, line_y, style);
            }
            CardLine::Meter {
                label,
                fraction,
                color,
            } => {
                let fraction = fraction.clamp(0.0, 1.0);
                page.draw_text(&format!("{label}:"), left + 20.0, line_y, regular);
                page.draw_rect(
                    RectSpec::filled(left + 100.0, line_y - 1.0, METER_WIDTH, 10.0, palette::LIGHT_GRAY)
                        .with_border(palette::MEDIUM_GRAY, 0.5),
                );
                if fraction > 0.0 {
                    page.draw_rect(RectSpec::filled(
                        left + 100.0,
                        line_y - 1.0,
                        METER_WIDTH * fraction,
                        10.0,
                        *color,
                    ));
                }
            }
        }
        line_y -= line.advance();
    }

    if let Some(list) = card.list.as_ref().filter(|l| !l.items.is_empty()) {
        page.draw_text(&format!("{}:", list.heading), left + 20.0, line_y, bold);
        line_y -= LINE_ADVANCE;
        let item_style = TextStyle::new(FontId::Regular, 11.0, palette::BLACK);
        for item in &list.items {
            page.draw_text(&format!("\u{2022} {item}"), left + 40.0, line_y, item_style);
            line_y -= LINE_ADVANCE;
        }
    }

    layout.record(BlockKind::Card);
    layout.set_y(bottom - GAP_AFTER);
    layout.y()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontSet;
    use crate::pdf::surface::PageSize;

    fn package(meds: usize) -> Card {
        let mut card = Card::new("Diabetes Care");
        card.status = Some(StatusBadge {
            label: "Active".into(),
            color: palette::TEAL,
        });
        card.lines = vec![
            CardLine::field("Monthly Cost", "Rs. 1,200"),
            CardLine::field("Next Delivery", "6/1/2024"),
            CardLine::field("Supply Remaining", "12 days"),
        ];
        card.list = Some(BulletList {
            heading: "Medications",
            items: (0..meds).map(|i| format!("Med {i}")).collect(),
        });
        card
    }

    #[test]
    fn oversized_list_is_cut_with_a_remainder_line() {
        let mut l = Layout::new(PageSize::A4, FontSet::standard(), "Health Profile");
        l.set_y(600.0);
        render_card(&mut l, &package(80));
        let doc = l.finish();

        let texts: Vec<&str> = doc.pages().iter().flat_map(|p| p.texts()).collect();
        let more = texts
            .iter()
            .find(|t| t.ends_with(" more"))
            .expect("remainder line");
        let kept = texts.iter().filter(|t| t.starts_with("\u{2022} Med ")).count();
        assert_eq!(*more, format!("\u{2022} +{} more", 80 - kept));
        assert!(kept > 0);
        for page in doc.pages() {
            for op in page.ops() {
                if let crate::pdf::surface::DrawOp::Text { text, y, .. } = op {
                    assert!(*y >= 0.0, "{text:?} drawn at {y}");
                }
            }
        }
    }

    #[test]
    fn list_that_fits_is_not_cut() {
        assert!(package(3).clamped(700.0).is_none());
    }

    #[test]
    fn height_grows_with_list() {
        let short = package(1).height();
        let long = package(4).height();
        assert_eq!(long - short, 3.0 * LINE_ADVANCE);
    }

    #[test]
    fn text_stays_inside_panel() {
        let mut l = Layout::new(PageSize::A4, FontSet::standard(), "Health Profile");
        l.set_y(600.0);
        let card = package(3);
        let after = render_card(&mut l, &card);
        let top = 600.0 + TOP_ABOVE_BASELINE;
        let bottom = top - card.height();
        assert_eq!(after, bottom - GAP_AFTER);

        let doc = l.finish();
        for op in doc.pages()[0].ops() {
            if let crate::pdf::surface::DrawOp::Text { y, .. } = op {
                assert!(*y > bottom && *y < top, "text at {y} outside {bottom}..{top}");
            }
        }
    }

    #[test]
    fn card_that_does_not_fit_moves_whole() {
        let mut l = Layout::new(PageSize::A4, FontSet::standard(), "Health Profile");
        l.begin_section("Medicine Packages");
        l.set_y(100.0);
        render_card(&mut l, &package(2));
        let doc = l.finish();
        assert_eq!(doc.page_count(), 2);
        assert!(doc.pages()[0].ops().is_empty());
        assert!(doc.pages()[1].texts().any(|t| t == "Diabetes Care"));
    }
}
