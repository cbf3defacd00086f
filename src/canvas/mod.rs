//! # Page Canvas
//!
//! The drawing surface the composers paint on. Coordinates are PDF user
//! space: origin at the bottom-left corner, y growing upwards, units in
//! points.
//!
//! A canvas starts with no page open. The first draw call opens one, and
//! [`PageCanvas::show_page`] closes it. Composers that stack content down
//! the page track their position with the canvas's vertical cursor, which
//! starts at the page top and is reset there whenever a page closes.
//!
//! Images are registered once with [`PageCanvas::add_image`] and drawn by
//! handle, so the writer embeds each raster a single time no matter how
//! often it is placed.

use crate::font::{FontRole, FontSet};
use crate::image_loader::LoadedImage;
use crate::model::Color;

/// Refers to an image registered on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(usize);

impl ImageHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text with its baseline starting at (x, y).
    Text {
        x: f64,
        y: f64,
        text: String,
        role: FontRole,
        size: f64,
        color: Color,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
        /// Dash and gap lengths, or solid.
        dash: Option<(f64, f64)>,
    },
    /// An image scaled into the box with bottom-left corner (x, y).
    Image {
        handle: ImageHandle,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// A finished page.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasPage {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

/// Everything a canvas produced, ready for the PDF writer.
#[derive(Debug, Clone)]
pub struct CanvasDocument {
    pub pages: Vec<CanvasPage>,
    pub images: Vec<LoadedImage>,
}

#[derive(Debug)]
enum PageState {
    NoPageOpen,
    PageOpen(CanvasPage),
}

pub struct PageCanvas<'f> {
    fonts: &'f FontSet,
    width: f64,
    height: f64,
    state: PageState,
    finished: Vec<CanvasPage>,
    images: Vec<LoadedImage>,
    cursor_y: f64,
    font_role: FontRole,
    font_size: f64,
    fill_color: Color,
    stroke_color: Color,
    line_width: f64,
    dash: Option<(f64, f64)>,
}

impl<'f> PageCanvas<'f> {
    pub fn new(fonts: &'f FontSet, (width, height): (f64, f64)) -> Self {
        Self {
            fonts,
            width,
            height,
            state: PageState::NoPageOpen,
            finished: Vec::new(),
            images: Vec::new(),
            cursor_y: height,
            font_role: FontRole::Regular,
            font_size: 12.0,
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: 1.0,
            dash: None,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Distance of the stacking cursor from the page bottom.
    pub fn cursor_y(&self) -> f64 {
        self.cursor_y
    }

    /// Move the stacking cursor down by `dy` points.
    pub fn advance_cursor(&mut self, dy: f64) {
        self.cursor_y -= dy;
    }

    /// True while the open page, if any, has nothing drawn on it.
    pub fn page_is_empty(&self) -> bool {
        match &self.state {
            PageState::NoPageOpen => true,
            PageState::PageOpen(page) => page.ops.is_empty(),
        }
    }

    /// Pages closed so far plus the open one.
    pub fn page_count(&self) -> usize {
        self.finished.len() + usize::from(matches!(self.state, PageState::PageOpen(_)))
    }

    pub fn set_font(&mut self, role: FontRole, size: f64) {
        self.font_role = role;
        self.font_size = size;
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    /// Dash pattern for subsequent lines. `None` draws solid.
    pub fn set_dash(&mut self, dash: Option<(f64, f64)>) {
        self.dash = dash;
    }

    /// Width of `text` in the current font.
    pub fn string_width(&self, text: &str) -> f64 {
        self.fonts.measure(self.font_role, text, self.font_size)
    }

    pub fn draw_string(&mut self, x: f64, y: f64, text: &str) {
        if text.is_empty() {
            return;
        }
        let op = DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            role: self.font_role,
            size: self.font_size,
            color: self.fill_color,
        };
        self.push(op);
    }

    /// Draw `text` so that it ends at `x`.
    pub fn draw_right_string(&mut self, x: f64, y: f64, text: &str) {
        let width = self.string_width(text);
        self.draw_string(x - width, y, text);
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let op = DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width: self.line_width,
            color: self.stroke_color,
            dash: self.dash,
        };
        self.push(op);
    }

    /// Register an image for drawing. Each registered image is embedded once.
    pub fn add_image(&mut self, image: LoadedImage) -> ImageHandle {
        self.images.push(image);
        ImageHandle(self.images.len() - 1)
    }

    pub fn draw_image(&mut self, handle: ImageHandle, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawOp::Image {
            handle,
            x,
            y,
            width,
            height,
        });
    }

    /// Close the current page and reset the cursor to the top. Closing with
    /// no page open emits a blank page.
    pub fn show_page(&mut self) {
        let page = match std::mem::replace(&mut self.state, PageState::NoPageOpen) {
            PageState::PageOpen(page) => page,
            PageState::NoPageOpen => self.blank_page(),
        };
        self.finished.push(page);
        self.cursor_y = self.height;
    }

    /// Close any open page and hand back the pages and images. A canvas
    /// that never drew anything still yields one blank page.
    pub fn finish(mut self) -> CanvasDocument {
        if let PageState::PageOpen(page) = std::mem::replace(&mut self.state, PageState::NoPageOpen) {
            self.finished.push(page);
        }
        if self.finished.is_empty() {
            let blank = self.blank_page();
            self.finished.push(blank);
        }
        CanvasDocument {
            pages: self.finished,
            images: self.images,
        }
    }

    fn blank_page(&self) -> CanvasPage {
        CanvasPage {
            width: self.width,
            height: self.height,
            ops: Vec::new(),
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let PageState::NoPageOpen = self.state {
            self.state = PageState::PageOpen(self.blank_page());
        }
        if let PageState::PageOpen(page) = &mut self.state {
            page.ops.push(op);
        }
    }
}
