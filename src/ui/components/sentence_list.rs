use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::deck::{SentenceDeck, SentenceSource};
use crate::ui::theme::Theme;

/// Numbered sentence list. Marks the sentence being practiced with `>` and
/// favorites with `*`; keeps the selected row in view.
pub struct SentenceList<'a> {
    deck: &'a SentenceDeck,
    selected: usize,
    title: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> SentenceList<'a> {
    pub fn new(deck: &'a SentenceDeck, selected: usize, theme: &'a Theme) -> Self {
        Self {
            deck,
            selected,
            title: " Sentences ",
            focused: true,
            theme,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

/// First row to draw so that `selected` is inside `visible` rows.
fn scroll_offset(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    selected.saturating_sub(visible - 1)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

impl Widget for SentenceList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(self.title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let sentences = self.deck.sentences();
        if sentences.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                " No sentences yet",
                Style::default().fg(colors.text_pending()),
            )))
            .render(inner, buf);
            return;
        }

        let visible = inner.height as usize;
        let offset = scroll_offset(self.selected, visible);
        let number_width = sentences.len().to_string().len();
        // marker + star + number + ". "
        let prefix_width = 2 + number_width + 2;
        let text_width = (inner.width as usize).saturating_sub(prefix_width + 1);

        let lines: Vec<Line> = sentences
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, sentence)| {
                let is_current = i == self.deck.current_index();
                let is_selected = i == self.selected;
                let marker = if is_current { '>' } else { ' ' };
                let star = if self.deck.is_favorite(sentence) { '*' } else { ' ' };

                let mut style = Style::default().fg(if is_current {
                    colors.accent()
                } else {
                    colors.fg()
                });
                if is_selected && self.focused {
                    style = style.bg(colors.accent_dim()).add_modifier(Modifier::BOLD);
                }

                Line::from(vec![
                    Span::styled(marker.to_string(), style),
                    Span::styled(star.to_string(), style.fg(colors.favorite())),
                    Span::styled(format!("{:>number_width$}. ", i + 1), style),
                    Span::styled(truncate(sentence, text_width), style),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}
