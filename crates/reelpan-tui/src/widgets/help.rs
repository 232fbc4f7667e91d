use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

pub struct HelpWidget;

impl HelpWidget {
    pub fn render(frame: &mut Frame, app: &App) {
        let theme = &app.theme;
        let keys = &app.config.keymap;
        let rows: [(&str, String); 11] = [
            ("Pan", format!("{} {} {} {} / arrows", keys.up, keys.left, keys.down, keys.right)),
            ("Drag", "left mouse button".to_string()),
            ("Scroll", "mouse wheel, Shift for horizontal".to_string()),
            ("Back to centre", keys.reset.clone()),
            ("Reset position", keys.reset_position.clone()),
            ("Switch profile", keys.toggle_profile.clone()),
            ("Info: top", keys.info_top.clone()),
            ("Info: page", "<PageUp> <PageDown>".to_string()),
            ("Select project", "click a tile".to_string()),
            ("Help", keys.help.clone()),
            ("Quit", format!("{} / <C-c>", keys.quit)),
        ];

        let mut lines: Vec<Line> = rows
            .iter()
            .map(|(label, key)| {
                Line::from(vec![
                    Span::styled(format!("{:>16}  ", label), Style::default().fg(theme.muted)),
                    Span::styled(
                        key.clone(),
                        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                    ),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled("press any key to close", Style::default().fg(theme.muted)))
                .alignment(Alignment::Center),
        );

        let area = frame.area();
        let width = 56u16.min(area.width.saturating_sub(2));
        let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
        let popup_area = centered_rect(width, height, area);

        frame.render_widget(Clear, popup_area);
        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.tile).fg(theme.foreground));
        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
