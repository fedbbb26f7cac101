use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;

use crate::engine::confetti::{Piece, Shape, Viewport};
use crate::ui::theme::ThemeColors;

/// Simulation units per terminal column.
pub const UNITS_PER_COL: f32 = 8.0;
/// Simulation units per terminal row. Cells are about twice as tall as wide.
pub const UNITS_PER_ROW: f32 = 16.0;

pub fn viewport_for(cols: u16) -> Viewport {
    Viewport {
        width: f32::from(cols) * UNITS_PER_COL,
    }
}

/// Draws particles over whatever is already in the buffer. Only the glyph
/// and foreground change, so the screen underneath stays readable.
pub struct ConfettiLayer<'a> {
    pieces: &'a [Piece],
}

impl<'a> ConfettiLayer<'a> {
    pub fn new(pieces: &'a [Piece]) -> Self {
        Self { pieces }
    }
}

fn glyph(piece: &Piece) -> char {
    match piece.shape {
        Shape::Circle => '●',
        Shape::Square => '■',
        Shape::Star => '★',
        Shape::Ribbon => match (piece.rotation.rem_euclid(180.0) / 45.0) as u32 {
            0 => '━',
            1 => '╲',
            2 => '┃',
            _ => '╱',
        },
    }
}

/// Cell for a piece, or None when it is outside `area` or fully faded.
fn cell_for(piece: &Piece, area: Rect) -> Option<(u16, u16)> {
    if piece.opacity <= 0.0 || piece.x < 0.0 || piece.y < 0.0 {
        return None;
    }
    let col = (piece.x / UNITS_PER_COL) as u16;
    let row = (piece.y / UNITS_PER_ROW) as u16;
    (col < area.width && row < area.height).then(|| (area.x + col, area.y + row))
}

impl Widget for ConfettiLayer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for piece in self.pieces {
            let Some((x, y)) = cell_for(piece, area) else {
                continue;
            };
            let mut style = Style::default().fg(ThemeColors::parse_color(piece.color));
            if piece.opacity < 0.5 {
                style = style.add_modifier(Modifier::DIM);
            } else if piece.size >= 16.0 {
                style = style.add_modifier(Modifier::BOLD);
            }
            buf[(x, y)].set_char(glyph(piece)).set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(x: f32, y: f32) -> Piece {
        Piece {
            id: 0,
            x,
            y,
            color: "#FF6B6B",
            size: 10.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            shape: Shape::Circle,
            opacity: 1.0,
        }
    }

    #[test]
    fn test_cell_mapping() {
        let area = Rect::new(2, 1, 10, 5);
        assert_eq!(cell_for(&piece(0.0, 0.0), area), Some((2, 1)));
        assert_eq!(cell_for(&piece(17.0, 33.0), area), Some((4, 3)));
        // Not yet on screen, or already below it
        assert_eq!(cell_for(&piece(8.0, -5.0), area), None);
        assert_eq!(cell_for(&piece(8.0, 80.0), area), None);
        assert_eq!(cell_for(&piece(80.0, 8.0), area), None);
    }

    #[test]
    fn test_faded_piece_is_hidden() {
        let mut p = piece(8.0, 8.0);
        p.opacity = 0.0;
        assert_eq!(cell_for(&p, Rect::new(0, 0, 10, 10)), None);
    }

    #[test]
    fn test_ribbon_glyph_follows_rotation() {
        let mut p = piece(0.0, 0.0);
        p.shape = Shape::Ribbon;
        p.rotation = 100.0;
        assert_eq!(glyph(&p), '┃');
        p.rotation = -30.0;
        assert_eq!(glyph(&p), '╱');
    }

    #[test]
    fn test_render_draws_colored_glyph() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        let pieces = [piece(9.0, 17.0)];
        ConfettiLayer::new(&pieces).render(area, &mut buf);
        assert_eq!(buf[(1, 1)].symbol(), "●");
        assert_eq!(buf[(1, 1)].fg, ratatui::style::Color::Rgb(255, 107, 107));
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }

    #[test]
    fn test_viewport_for() {
        assert_eq!(viewport_for(10).width, 80.0);
    }
}
