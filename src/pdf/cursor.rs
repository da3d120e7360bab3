use crate::fonts::{FontId, FontSet};

use super::surface::{Page, PageSize, RectSpec, Surface, TextStyle, palette};

/// Left/right page margin and the x origin of all content.
pub const MARGIN: f32 = 50.0;
/// Height of the footer band reserved at the bottom of every page.
pub const FOOTER_HEIGHT: f32 = 30.0;
/// Distance from the page top to the first baseline on page one, below the title banner.
pub const FIRST_PAGE_CONTENT_OFFSET: f32 = 170.0;
/// Height of the continuation banner on every later page.
pub const CONTINUATION_BAND_HEIGHT: f32 = 50.0;
/// Distance from the page top to the first baseline on a continuation page.
pub const CONTINUATION_CONTENT_OFFSET: f32 = 70.0;

/// Vertical space each block type needs below the cursor before it may be
/// drawn on the current page. A block whose requirement exceeds the cursor
/// height starts a new page.
pub mod headroom {
    pub const SECTION_HEADER: f32 = 100.0;
    pub const KEY_VALUE_ROW: f32 = 30.0;
    pub const BULLET_LINE: f32 = 30.0;
    pub const TABLE_ROW: f32 = 40.0;

    /// Space a card of `panel_height` needs: the whole panel plus the band
    /// above the baseline, so the card is never split.
    pub fn card(panel_height: f32) -> f32 {
        panel_height + 20.0
    }
}

/// Vertical write position on the active page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    /// Distance of the current baseline from the page bottom.
    pub y: f32,
    pub margin: f32,
    /// Index of the active page in the document.
    pub page: usize,
}

impl Cursor {
    pub fn has_room(&self, required: f32) -> bool {
        self.y - required >= 0.0
    }

    pub fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }
}

/// What a placed block was, for the layout trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    TitleBanner,
    ContinuationHeader,
    SectionHeader,
    TableHeader,
    TableRow { index: usize },
    KeyValueRow,
    Notice,
    Bullet,
    Card,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedBlock {
    pub page: usize,
    pub section: Option<&'static str>,
    pub kind: BlockKind,
}

/// A document under construction: owns the pages, the font resources and
/// the cursor. Block renderers take `&mut Layout`; once content is complete
/// `finish` freezes it into a [`Document`].
pub struct Layout {
    size: PageSize,
    title: String,
    fonts: FontSet,
    pages: Vec<Page>,
    cursor: Cursor,
    section: Option<&'static str>,
    trace: Vec<PlacedBlock>,
}

impl Layout {
    pub fn new(size: PageSize, fonts: FontSet, title: impl Into<String>) -> Self {
        Layout {
            size,
            title: title.into(),
            fonts,
            pages: vec![Page::new(size)],
            cursor: Cursor {
                y: size.height - MARGIN,
                margin: MARGIN,
                page: 0,
            },
            section: None,
            trace: Vec::new(),
        }
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn y(&self) -> f32 {
        self.cursor.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.cursor.y = y;
    }

    pub fn advance(&mut self, dy: f32) -> f32 {
        self.cursor.advance(dy);
        self.cursor.y
    }

    pub fn content_left(&self) -> f32 {
        self.cursor.margin
    }

    pub fn content_width(&self) -> f32 {
        self.size.width - 2.0 * self.cursor.margin
    }

    /// Height available to a block on a fresh continuation page.
    pub fn page_capacity(&self) -> f32 {
        self.size.height - CONTINUATION_CONTENT_OFFSET
    }

    pub fn page(&mut self) -> &mut Page {
        let idx = self.cursor.page;
        &mut self.pages[idx]
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Name the section whose content follows. Continuation banners use it.
    pub fn begin_section(&mut self, title: &'static str) {
        self.section = Some(title);
    }

    pub fn end_section(&mut self) {
        self.section = None;
    }

    pub fn section(&self) -> Option<&'static str> {
        self.section
    }

    pub fn record(&mut self, kind: BlockKind) {
        self.trace.push(PlacedBlock {
            page: self.cursor.page,
            section: self.section,
            kind,
        });
    }

    /// Make sure `required` units fit below the cursor, breaking to a new
    /// page when they do not. Returns the cursor y to draw at.
    pub fn ensure_space(&mut self, required: f32) -> f32 {
        if self.cursor.has_room(required) {
            return self.cursor.y;
        }
        log::debug!(
            "page break after page {}: need {:.1}, cursor at {:.1}",
            self.cursor.page + 1,
            required,
            self.cursor.y
        );
        self.start_continuation_page();
        self.cursor.y
    }

    fn start_continuation_page(&mut self) {
        self.pages.push(Page::new(self.size));
        self.cursor.page = self.pages.len() - 1;

        let label = match self.section {
            Some(section) => format!("{section} \u{2014} Continued"),
            None => format!("{} \u{2014} Continued", self.title),
        };
        let (width, height) = (self.size.width, self.size.height);
        let style = TextStyle::new(FontId::Bold, 18.0, palette::WHITE);
        let label_w = self.fonts.text_width(style.font, &label, style.size);

        let page = self.page();
        page.draw_rect(RectSpec::filled(
            0.0,
            height - CONTINUATION_BAND_HEIGHT,
            width,
            CONTINUATION_BAND_HEIGHT,
            palette::PRIMARY_BLUE,
        ));
        page.draw_text(&label, (width - label_w) / 2.0, height - 30.0, style);

        self.cursor.y = height - CONTINUATION_CONTENT_OFFSET;
        self.record(BlockKind::ContinuationHeader);
    }

    /// Freeze the page list. No content renderer can run after this.
    pub fn finish(self) -> Document {
        Document {
            title: self.title,
            fonts: self.fonts,
            pages: self.pages,
            trace: self.trace,
        }
    }
}

/// A fully laid-out document: the frozen page list plus its resources.
/// Only the footer pass and the serializer touch it.
pub struct Document {
    title: String,
    fonts: FontSet,
    pages: Vec<Page>,
    trace: Vec<PlacedBlock>,
}

impl Document {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub(crate) fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every placed block in drawing order.
    pub fn trace(&self) -> &[PlacedBlock] {
        &self.trace
    }

    /// Section titles in the order their headers were placed.
    pub fn section_order(&self) -> Vec<&'static str> {
        self.trace
            .iter()
            .filter(|b| b.kind == BlockKind::SectionHeader)
            .filter_map(|b| b.section)
            .collect()
    }

    /// Blocks placed while `section` was active.
    pub fn blocks_in(&self, section: &str) -> impl Iterator<Item = &PlacedBlock> {
        self.trace
            .iter()
            .filter(move |b| b.section == Some(section))
    }
}
