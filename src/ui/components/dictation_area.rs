use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::dictation::{CellView, Correctness, DictationState};
use crate::ui::theme::{Theme, ThemeColors};

/// The fill-in-the-blank line: typed characters colored by correctness,
/// open blanks as slot markers, the next blank highlighted.
pub struct DictationArea<'a> {
    dictation: &'a DictationState,
    theme: &'a Theme,
}

impl<'a> DictationArea<'a> {
    pub fn new(dictation: &'a DictationState, theme: &'a Theme) -> Self {
        Self { dictation, theme }
    }
}

fn cell_style(cell: &CellView, colors: &ThemeColors) -> Style {
    if cell.is_active {
        return Style::default()
            .fg(colors.text_cursor_fg())
            .bg(colors.text_cursor_bg());
    }
    match (cell.filled, cell.correctness) {
        (true, Correctness::Correct) => Style::default().fg(colors.text_correct()),
        (true, Correctness::Incorrect) => Style::default()
            .fg(colors.text_incorrect())
            .bg(colors.text_incorrect_bg())
            .add_modifier(Modifier::UNDERLINED),
        (false, _) if cell.fillable => Style::default().fg(colors.text_pending()),
        _ => Style::default().fg(colors.fg()),
    }
}

fn build_spans<'s>(cells: &[CellView], colors: &ThemeColors) -> Vec<Span<'s>> {
    cells
        .iter()
        .map(|cell| Span::styled(cell.character.to_string(), cell_style(cell, colors)))
        .collect()
}

impl Widget for DictationArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border = if self.dictation.is_complete() {
            colors.border()
        } else {
            colors.border_focused()
        };

        let block = Block::bordered()
            .title(" Listen and type ")
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        let cells = self.dictation.cells();
        let line = Line::from(build_spans(&cells, colors));

        Paragraph::new(vec![Line::default(), line])
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::input::process_char;

    fn colors() -> ThemeColors {
        ThemeColors::default()
    }

    #[test]
    fn test_spans_show_markers_and_literals() {
        let state = DictationState::new("Hi, you!");
        let spans = build_spans(&state.cells(), &colors());
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "__, ___!");
    }

    #[test]
    fn test_active_blank_uses_cursor_style() {
        let mut state = DictationState::new("ab cd");
        process_char(&mut state, 'a');
        let c = colors();
        let spans = build_spans(&state.cells(), &c);
        assert_eq!(spans[0].style.fg, Some(c.text_correct()));
        assert_eq!(spans[1].style.bg, Some(c.text_cursor_bg()));
        assert_eq!(spans[3].style.fg, Some(c.text_pending()));
    }

    #[test]
    fn test_literal_underscore_is_not_styled_as_blank() {
        let state = DictationState::new("a_b c");
        let c = colors();
        let spans = build_spans(&state.cells(), &c);
        assert_eq!(spans[1].content, "_");
        assert_eq!(spans[1].style.fg, Some(c.fg()));
        assert_eq!(spans[2].content, "_");
        assert_eq!(spans[2].style.fg, Some(c.text_pending()));
    }

    #[test]
    fn test_wrong_char_is_marked() {
        let mut state = DictationState::new("ab");
        process_char(&mut state, 'x');
        let c = colors();
        let spans = build_spans(&state.cells(), &c);
        assert_eq!(spans[0].content, "x");
        assert_eq!(spans[0].style.fg, Some(c.text_incorrect()));
        assert!(spans[0].style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_renders_into_buffer() {
        let state = DictationState::new("Go.");
        let theme = Theme::default();
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        DictationArea::new(&state, &theme).render(area, &mut buf);

        let row: String = (0..area.width)
            .map(|x| buf[(x, 2)].symbol().to_string())
            .collect();
        assert!(row.contains("__."), "row was {row:?}");
    }
}
