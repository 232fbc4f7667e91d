use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use reelpan_core::effects::ItemStyle;

use super::truncate_to_width;
use crate::app::App;

/// Below this opacity a tile is not drawn at all
const HIDDEN_OPACITY: f64 = 0.15;
/// Below this opacity a tile is drawn in muted colors
const FADED_OPACITY: f64 = 0.6;

pub struct GalleryWidget;

impl GalleryWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        frame.render_widget(
            Block::default().style(Style::default().bg(theme.background)),
            area,
        );

        let container = app.controller.container_style();
        if container.opacity < HIDDEN_OPACITY {
            return;
        }
        let offset = app.controller.state().displayed;

        // Lifted tiles are drawn last so they sit above their neighbours.
        let mut order: Vec<(usize, ItemStyle)> = (0..app.projects.len())
            .map(|i| (i, app.controller.item_style(i)))
            .collect();
        order.sort_by(|a, b| a.1.z.total_cmp(&b.1.z));

        for (index, style) in order {
            let opacity = style.opacity * container.opacity;
            if opacity < HIDDEN_OPACITY {
                continue;
            }
            let placed = app.layout.placed_rect(index, offset, &style, &container);
            let Some(rect) = app.layout.to_screen(placed, area) else {
                continue;
            };

            if style.shadow > 0.2 {
                let shadow = Rect::new(rect.x + 1, rect.y + 1, rect.width, rect.height).intersection(area);
                frame.render_widget(Block::default().style(Style::default().bg(Color::Black)), shadow);
            }
            render_tile(frame, rect, app, index, &style, opacity);
        }
    }
}

fn render_tile(frame: &mut Frame, rect: Rect, app: &App, index: usize, style: &ItemStyle, opacity: f64) {
    let theme = &app.theme;
    let project = &app.projects[index];
    let lifted = style.is_lifted();
    let selected = app.selected == Some(index);
    let faded = opacity < FADED_OPACITY;

    let (fg, bg) = if faded {
        (theme.muted, theme.background)
    } else if lifted {
        (theme.foreground, theme.tile_hover)
    } else {
        (theme.foreground, theme.tile)
    };
    let border = if selected || lifted { theme.accent } else { theme.border };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if lifted { BorderType::Thick } else { BorderType::Rounded })
        .border_style(Style::default().fg(if faded { theme.muted } else { border }))
        .title(format!(" {:02} ", index + 1))
        .style(Style::default().bg(bg).fg(fg));

    let inner = block.inner(rect);
    let width = inner.width as usize;
    let mut title_style = Style::default().fg(fg);
    if !faded {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }
    // The card content grows with the hover effect; an extra blank line reads as zoom.
    let mut lines = Vec::new();
    if style.content_scale > 1.05 && inner.height > 3 {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(truncate_to_width(&project.title, width), title_style)));
    lines.push(Line::from(Span::styled(
        truncate_to_width(project.client, width),
        Style::default().fg(theme.muted),
    )));
    lines.push(Line::from(Span::styled(
        truncate_to_width(&format!("{} · {}", project.category, project.year), width),
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}
