use crate::fonts::FontId;

/// RGB colour, 0-255 per channel.
pub type Color = [u8; 3];

/// The document palette.
pub mod palette {
    use super::Color;

    pub const PRIMARY_BLUE: Color = [0, 112, 243];
    pub const TEAL: Color = [67, 198, 184];
    pub const ORANGE: Color = [249, 115, 22];
    pub const RED: Color = [230, 51, 51];
    pub const GREEN: Color = [51, 179, 51];
    pub const WHITE: Color = [255, 255, 255];
    pub const BLACK: Color = [0, 0, 0];
    pub const LIGHT_GRAY: Color = [242, 242, 242];
    pub const MEDIUM_GRAY: Color = [217, 217, 217];
    pub const MUTED_GRAY: Color = [179, 179, 179];
    pub const LIGHT_BLUE: Color = [230, 242, 255];
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font: FontId,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub const fn new(font: FontId, size: f32, color: Color) -> Self {
        TextStyle { font, size, color }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Border {
    pub color: Color,
    pub width: f32,
    pub opacity: f32,
}

/// Axis-aligned box. `y` is the bottom edge, measured from the page bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectSpec {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: Option<Color>,
    pub border: Option<Border>,
    pub opacity: f32,
}

impl RectSpec {
    pub fn filled(x: f32, y: f32, width: f32, height: f32, fill: Color) -> Self {
        RectSpec {
            x,
            y,
            width,
            height,
            fill: Some(fill),
            border: None,
            opacity: 1.0,
        }
    }

    pub fn with_border(mut self, color: Color, width: f32) -> Self {
        self.border = Some(Border {
            color,
            width,
            opacity: 1.0,
        });
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// One recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        style: TextStyle,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
        color: Color,
    },
    Rect(RectSpec),
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
        opacity: f32,
    },
}

/// The drawing capability renderers and the serializer depend on.
pub trait Surface {
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle);
    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Color);
    fn draw_rect(&mut self, rect: RectSpec);
    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color, opacity: f32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
}

/// A fixed-size page holding an append-only list of draw operations.
#[derive(Clone, Debug)]
pub struct Page {
    size: PageSize,
    ops: Vec<DrawOp>,
}

impl Page {
    pub(crate) fn new(size: PageSize) -> Self {
        Page {
            size,
            ops: Vec::new(),
        }
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text of every text operation, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Play the recorded operations onto another surface.
    pub fn replay(&self, target: &mut dyn Surface) {
        for op in &self.ops {
            match op {
                DrawOp::Text { text, x, y, style } => target.draw_text(text, *x, *y, *style),
                DrawOp::Line {
                    from,
                    to,
                    thickness,
                    color,
                } => target.draw_line(*from, *to, *thickness, *color),
                DrawOp::Rect(rect) => target.draw_rect(*rect),
                DrawOp::Circle {
                    cx,
                    cy,
                    radius,
                    color,
                    opacity,
                } => target.draw_circle(*cx, *cy, *radius, *color, *opacity),
            }
        }
    }
}

impl Surface for Page {
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style,
        });
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Color) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            thickness,
            color,
        });
    }

    fn draw_rect(&mut self, rect: RectSpec) {
        self.ops.push(DrawOp::Rect(rect));
    }

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color, opacity: f32) {
        self.ops.push(DrawOp::Circle {
            cx,
            cy,
            radius,
            color,
            opacity,
        });
    }
}
