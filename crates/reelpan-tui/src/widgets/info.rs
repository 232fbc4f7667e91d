use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::truncate_to_width;
use crate::app::{info_line_of, App};

/// Project list beside the gallery, scrolled by the smooth scroller
pub struct InfoWidget;

impl InfoWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let position = app
            .controller
            .smooth_scroll()
            .map(|s| s.position())
            .unwrap_or(0.0);
        let scroll_lines = (position / app.layout.cell_height()).round().max(0.0) as u16;

        let block = Block::default()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(theme.border))
            .style(Style::default().bg(theme.background).fg(theme.foreground));
        let width = block.inner(area).width.saturating_sub(1) as usize;

        let selected_line = app.selected.map(info_line_of);
        let lines: Vec<Line> = app
            .info_lines()
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let text = format!(" {}", truncate_to_width(&text, width));
                let style = if i == 0 {
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
                } else if Some(i) == selected_line {
                    Style::default().fg(theme.background).bg(theme.accent)
                } else if i > 2 && i % 2 == 0 {
                    Style::default().fg(theme.muted)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(text, style))
            })
            .collect();

        frame.render_widget(
            Paragraph::new(lines).block(block).scroll((scroll_lines, 0)),
            area,
        );
    }
}
