/*
 * Renderer Module
 *
 * The world describes each frame through the `Renderer` trait: clear, draw
 * trails and bodies, present. Every point it passes is already in window
 * coordinates, with the origin at the top-left corner and y growing downward.
 *
 * `DisplayList` is the renderer the windowed frontend uses: it records the
 * commands of the frame being built and, on `present`, swaps them in as the
 * frame to show. The frontend replays the presented list onto its canvas.
 */

use glam::DVec2;

use crate::color::Rgb8;

pub trait Renderer {
    fn clear(&mut self, color: Rgb8);
    fn draw_line_strip(&mut self, points: &[DVec2], color: Rgb8);
    fn draw_marker(&mut self, point: DVec2, color: Rgb8, radius: f64);
    fn present(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb8),
    LineStrip { points: Vec<DVec2>, color: Rgb8 },
    Marker { center: DVec2, color: Rgb8, radius: f64 },
}

#[derive(Debug, Default)]
pub struct DisplayList {
    pending: Vec<DrawCommand>,
    presented: Vec<DrawCommand>,
    frames: u64,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    // The last frame handed to `present`
    pub fn presented(&self) -> &[DrawCommand] {
        &self.presented
    }

    // Commands recorded since the last `present`
    pub fn pending(&self) -> &[DrawCommand] {
        &self.pending
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DisplayList {
    fn clear(&mut self, color: Rgb8) {
        self.pending.clear();
        self.pending.push(DrawCommand::Clear(color));
    }

    fn draw_line_strip(&mut self, points: &[DVec2], color: Rgb8) {
        self.pending.push(DrawCommand::LineStrip {
            points: points.to_vec(),
            color,
        });
    }

    fn draw_marker(&mut self, point: DVec2, color: Rgb8, radius: f64) {
        self.pending.push(DrawCommand::Marker {
            center: point,
            color,
            radius,
        });
    }

    fn present(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.presented);
        self.pending.clear();
        self.frames += 1;
    }
}
