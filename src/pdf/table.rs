use crate::fonts::FontId;

use super::blocks::stripe_color;
use super::cursor::{BlockKind, Layout, headroom};
use super::surface::{Color, RectSpec, Surface, TextStyle, palette};
use super::text::truncate;

/// Band height of header and body rows.
pub const ROW_HEIGHT: f32 = 25.0;
/// Cursor advance per header or body row.
pub const ROW_ADVANCE: f32 = 30.0;
const CELL_PADDING: f32 = 5.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub header: &'static str,
    /// Truncation threshold for this column's values, in characters.
    pub max_chars: Option<usize>,
}

impl Column {
    pub const fn new(header: &'static str) -> Self {
        Column {
            header,
            max_chars: None,
        }
    }

    pub const fn truncated(header: &'static str, max_chars: usize) -> Self {
        Column {
            header,
            max_chars: Some(max_chars),
        }
    }
}

/// Coloured dot drawn over the leading bullet of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMarker {
    pub column: usize,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub values: Vec<String>,
    pub marker: Option<CellMarker>,
}

/// Column headers plus rows; every row carries one value per column.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<TableRow>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, values: Vec<String>) -> &mut TableRow {
        debug_assert_eq!(
            values.len(),
            self.columns.len(),
            "table row width must match its header"
        );
        self.rows.push(TableRow {
            values,
            marker: None,
        });
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// x positions of the interior cell boundaries of a table spanning
/// `width` from `left`, split evenly into `columns` cells.
pub fn divider_positions(left: f32, width: f32, columns: usize) -> Vec<f32> {
    if columns == 0 {
        return Vec::new();
    }
    let cell_w = width / columns as f32;
    (1..columns).map(|i| left + i as f32 * cell_w).collect()
}

/// Header band with one label per column and white dividers between cells.
pub fn draw_header(layout: &mut Layout, columns: &[Column]) -> f32 {
    let y = layout.y();
    let left = layout.content_left();
    let width = layout.content_width();
    let cell_w = width / columns.len().max(1) as f32;
    let style = TextStyle::new(FontId::Bold, 12.0, palette::WHITE);

    let page = layout.page();
    page.draw_rect(RectSpec::filled(
        left - CELL_PADDING,
        y - 5.0,
        width + 2.0 * CELL_PADDING,
        ROW_HEIGHT,
        palette::TEAL,
    ));
    for (i, column) in columns.iter().enumerate() {
        page.draw_text(column.header, left + i as f32 * cell_w + CELL_PADDING, y, style);
    }
    for x in divider_positions(left, width, columns.len()) {
        page.draw_line((x, y - 5.0), (x, y + 20.0), 1.0, palette::WHITE);
    }

    layout.record(BlockKind::TableHeader);
    layout.set_y(y - ROW_ADVANCE);
    layout.y()
}

/// One striped body row. Checks for room first; a row that does not fit
/// moves to a continuation page without repeating the column headers.
pub fn draw_row(layout: &mut Layout, columns: &[Column], row: &TableRow, row_index: usize) -> f32 {
    let y = layout.ensure_space(headroom::TABLE_ROW);
    let left = layout.content_left();
    let width = layout.content_width();
    let cell_w = width / columns.len().max(1) as f32;
    let style = TextStyle::new(FontId::Regular, 10.0, palette::BLACK);

    log::debug!(
        "TABLE row={} page={} y={:.2}",
        row_index,
        layout.cursor().page + 1,
        y
    );

    let page = layout.page();
    page.draw_rect(RectSpec::filled(
        left - CELL_PADDING,
        y - 5.0,
        width + 2.0 * CELL_PADDING,
        ROW_HEIGHT,
        stripe_color(row_index),
    ));
    for (i, (value, column)) in row.values.iter().zip(columns).enumerate() {
        let text = match column.max_chars {
            Some(max) => truncate(value, max),
            None => value.as_str().into(),
        };
        page.draw_text(&text, left + i as f32 * cell_w + CELL_PADDING, y, style);
    }
    for x in divider_positions(left, width, columns.len()) {
        page.draw_line((x, y - 5.0), (x, y + 20.0), 0.5, palette::MEDIUM_GRAY);
    }
    if let Some(marker) = row.marker {
        let cx = left + marker.column as f32 * cell_w + CELL_PADDING + 2.0;
        page.draw_circle(cx, y + 3.5, 3.5, marker.color, 1.0);
    }

    layout.record(BlockKind::TableRow { index: row_index });
    layout.set_y(y - ROW_ADVANCE);
    layout.y()
}

/// Header followed by every row; stripe parity restarts at zero.
pub fn render_table(layout: &mut Layout, table: &Table) -> f32 {
    draw_header(layout, &table.columns);
    for (ri, row) in table.rows.iter().enumerate() {
        draw_row(layout, &table.columns, row, ri);
    }
    layout.y()
}
