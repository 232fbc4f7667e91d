use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let state = app.controller.state();

        let status_text = match &app.status_message {
            Some(msg) => format!(" {}", msg),
            None => {
                let momentum = if state.momentum_active { " | momentum" } else { "" };
                format!(
                    " {} | {} | {} | x {:.0} y {:.0} | v {:.1}{}",
                    app.controller.phase().to_string().to_uppercase(),
                    app.controller.device_class(),
                    app.controller.settings().policy.label(),
                    state.displayed.x,
                    state.displayed.y,
                    state.velocity.length(),
                    momentum,
                )
            }
        };
        let status_style = if app.status_message.is_some() {
            Style::default().fg(theme.warning).bg(theme.tile)
        } else {
            Style::default().fg(theme.foreground).bg(theme.tile)
        };

        let help_hint = " q:quit wasd:move r:reset ?:help ";
        let padding_len = (area.width as usize)
            .saturating_sub(status_text.width() + help_hint.width());

        let line = Line::from(vec![
            Span::styled(status_text, status_style),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.tile)),
            Span::styled(help_hint, Style::default().fg(theme.muted).bg(theme.tile)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
