//! Canvas 2D backend

use glam::Vec2;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::Surface;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        ctx.set_line_width(1.0);
        Self { canvas, ctx }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        // Resizing resets the context state
        self.ctx.set_line_width(1.0);
    }

    fn trace(&self, points: &[Vec2]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f32, f32) {
        (self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn clear(&mut self, color: &str) {
        let (w, h) = self.size();
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: &str) {
        if points.len() < 2 {
            return;
        }
        self.trace(points);
        if closed {
            self.ctx.close_path();
        }
        self.ctx.set_stroke_style_str(color);
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[Vec2], fill: &str, stroke: &str) {
        if points.len() < 3 {
            return;
        }
        self.trace(points);
        self.ctx.close_path();
        self.ctx.set_fill_style_str(fill);
        self.ctx.fill();
        self.ctx.set_stroke_style_str(stroke);
        self.ctx.stroke();
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: &str) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(
                center.x as f64,
                center.y as f64,
                radius as f64,
                0.0,
                std::f64::consts::TAU,
            )
            .is_err()
        {
            return;
        }
        self.ctx.set_stroke_style_str(color);
        self.ctx.stroke();
    }
}
