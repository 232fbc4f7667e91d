use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use reelpan_core::smooth_scroll::SmoothScroll;
use reelpan_core::{
    AppConfig, DeviceClass, FrameQueue, GalleryController, NavKey, RawInput, Timeline, Viewport,
};
use tracing::{debug, info};

use crate::gallery::{catalog, GalleryLayout, Project};
use crate::input::{handle_key_event, mouse_to_input, Action, CellMetrics};
use crate::keymap::Keymap;
use crate::theme::{load_theme, Theme};

/// Width of the project info panel in columns
const INFO_PANEL_WIDTH: u16 = 38;
/// Below this terminal width the info panel is hidden
const INFO_PANEL_MIN_TOTAL: u16 = 90;
/// A press and release closer than this many cells counts as a click
const CLICK_SLOP: u16 = 1;

/// Terminal gallery state
pub struct App {
    pub config: AppConfig,
    pub controller: GalleryController,
    pub keymap: Keymap,
    pub theme: Theme,
    pub projects: Vec<Project>,
    pub layout: GalleryLayout,
    /// Tile currently under the pointer
    pub hovered: Option<usize>,
    /// Project whose details the info panel is focused on
    pub selected: Option<usize>,
    pub show_help: bool,
    pub status_message: Option<String>,
    pub should_quit: bool,
    pub gallery_area: Rect,
    pub info_area: Option<Rect>,
    visible: Vec<bool>,
    press: Option<(u16, u16)>,
    device_override: Option<DeviceClass>,
    started: Instant,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        Self::with_size(config, 120, 40)
    }

    /// Build for a known terminal size
    pub fn with_size(config: AppConfig, width: u16, height: u16) -> Result<Self> {
        let count = config.gallery.item_count;
        let layout = GalleryLayout::new(&config.ui, count);
        let (gallery_area, info_area) = split_screen(Rect::new(0, 0, width, height));
        let (vw, vh) = layout.viewport_px(gallery_area.width, gallery_area.height);

        let mut controller = GalleryController::mount(
            config.controller_settings(),
            Viewport::new(vw, vh),
            FrameQueue::new(),
            Timeline::new(),
        )
        .context("Failed to mount viewport controller")?;
        controller.set_item_count(count);

        let visible = (0..count)
            .map(|i| layout.is_visible(i, controller.state().displayed, gallery_area))
            .collect();

        info!(
            items = count,
            device = %controller.device_class(),
            "Gallery ready"
        );

        Ok(Self {
            keymap: Keymap::from_config(&config.keymap),
            theme: load_theme(&config.ui.theme),
            projects: catalog(count),
            layout,
            controller,
            config,
            hovered: None,
            selected: None,
            show_help: false,
            status_message: None,
            should_quit: false,
            gallery_area,
            info_area,
            visible,
            press: None,
            device_override: None,
            started: Instant::now(),
        })
    }

    /// Start the info panel's smooth scroller and play the page entrance
    pub async fn start(&mut self) {
        let scroll = SmoothScroll::start(&self.config.smooth_scroll, self.info_limit()).await;
        if scroll.is_degraded() {
            self.status_message = Some("Smooth scrolling unavailable".to_string());
        }
        self.controller.attach_smooth_scroll(scroll);
        let now = self.now();
        self.controller.page_enter(now);
    }

    /// Monotonic time since the app started
    pub fn now(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether the loop should poll at the animation frame rate
    pub fn needs_fast_update(&self) -> bool {
        self.controller.is_animating()
            || self.controller.next_deadline().is_some()
            || self.controller.smooth_scroll().is_some_and(|s| s.is_animating())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = handle_key_event(key, self);
        let now = self.now();
        self.apply_action(action, now);
    }

    pub fn apply_action(&mut self, action: Action, now: Duration) {
        if action != Action::None {
            self.status_message = None;
        }
        match action {
            Action::Quit => self.should_quit = true,
            Action::NavUp => self.nav(NavKey::Up, now),
            Action::NavDown => self.nav(NavKey::Down, now),
            Action::NavLeft => self.nav(NavKey::Left, now),
            Action::NavRight => self.nav(NavKey::Right, now),
            Action::NavReset => self.nav(NavKey::Reset, now),
            Action::ResetPosition => self.controller.reset_position(now),
            Action::ToggleProfile => self.toggle_profile(),
            Action::InfoTop => {
                if let Some(scroll) = self.controller.smooth_scroll_mut() {
                    scroll.scroll_to_top(now);
                }
            }
            Action::InfoPageDown => self.page_info(1.0, now),
            Action::InfoPageUp => self.page_info(-1.0, now),
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Dismiss => self.show_help = false,
            Action::None => {}
        }
    }

    fn nav(&mut self, key: NavKey, now: Duration) {
        self.controller.handle_input(RawInput::Key { key, timestamp: now });
    }

    fn page_info(&mut self, direction: f64, now: Duration) {
        let Some(area) = self.info_area else {
            return;
        };
        let page = area.height.saturating_sub(3) as f64 * self.layout.cell_height();
        if let Some(scroll) = self.controller.smooth_scroll_mut() {
            scroll.on_wheel(direction * page, now);
        }
    }

    /// Cycle follow-viewport → pinned to the other class → follow-viewport
    fn toggle_profile(&mut self) {
        self.device_override = match self.device_override {
            None => Some(self.controller.device_class().toggled()),
            Some(_) => None,
        };
        self.controller.override_device(self.device_override);
        let device = self.controller.device_class();
        self.status_message = Some(match self.device_override {
            Some(_) => format!("Profile pinned: {}", device),
            None => format!("Profile follows viewport: {}", device),
        });
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let now = self.now();
        self.handle_mouse_at(mouse, now);
    }

    pub fn handle_mouse_at(&mut self, mouse: MouseEvent, now: Duration) {
        if self.show_help {
            return;
        }
        let in_info = self
            .info_area
            .is_some_and(|a| a.contains((mouse.column, mouse.row).into()));

        if in_info && self.press.is_none() {
            self.handle_info_mouse(mouse, now);
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.press = Some((mouse.column, mouse.row)),
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some((col, row)) = self.press.take() {
                    if mouse.column.abs_diff(col) <= CLICK_SLOP && mouse.row.abs_diff(row) <= CLICK_SLOP {
                        self.click(mouse.column, mouse.row, now);
                    }
                }
            }
            MouseEventKind::Moved => self.update_hover(mouse.column, mouse.row, now),
            _ => {}
        }

        let cell = CellMetrics {
            width: self.config.ui.cell_width_px,
            height: self.config.ui.cell_height_px,
        };
        if let Some(input) = mouse_to_input(mouse, cell, now) {
            self.controller.handle_input(input);
        }
    }

    fn handle_info_mouse(&mut self, mouse: MouseEvent, now: Duration) {
        let notch = crate::input::WHEEL_LINES * self.layout.cell_height();
        let delta = match mouse.kind {
            MouseEventKind::ScrollDown => notch,
            MouseEventKind::ScrollUp => -notch,
            _ => return,
        };
        if let Some(scroll) = self.controller.smooth_scroll_mut() {
            scroll.on_wheel(delta, now);
        }
    }

    fn update_hover(&mut self, column: u16, row: u16, now: Duration) {
        let hit = self
            .layout
            .hit_test(column, row, self.controller.state().displayed, self.gallery_area);
        if hit == self.hovered {
            return;
        }
        if let Some(old) = self.hovered.take() {
            self.controller.leave_item(old, now);
        }
        if let Some(index) = hit {
            self.controller.hover_item(index, now);
        }
        self.hovered = hit;
    }

    fn click(&mut self, column: u16, row: u16, now: Duration) {
        let Some(index) = self
            .layout
            .hit_test(column, row, self.controller.state().displayed, self.gallery_area)
        else {
            return;
        };
        debug!(index, "Project selected");
        self.selected = Some(index);
        let top = info_line_of(index) as f64 * self.layout.cell_height();
        let offset = -self.layout.cell_height();
        if let Some(scroll) = self.controller.smooth_scroll_mut() {
            scroll.scroll_to_element(top, offset, now);
        }
    }

    /// Pointer left the terminal window
    pub fn focus_lost(&mut self) {
        let now = self.now();
        self.press = None;
        if let Some(old) = self.hovered.take() {
            self.controller.leave_item(old, now);
        }
        self.controller.handle_input(RawInput::PointerLeave { timestamp: now });
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let (gallery_area, info_area) = split_screen(Rect::new(0, 0, width, height));
        self.gallery_area = gallery_area;
        self.info_area = info_area;
        let (vw, vh) = self.layout.viewport_px(gallery_area.width, gallery_area.height);
        self.controller.set_viewport(Viewport::new(vw, vh));
        let limit = self.info_limit();
        if let Some(scroll) = self.controller.smooth_scroll_mut() {
            scroll.set_limit(limit);
        }
    }

    pub fn tick(&mut self) {
        let now = self.now();
        self.tick_at(now);
    }

    /// Run the pending controller frame, the info scroller and reveal bookkeeping
    pub fn tick_at(&mut self, now: Duration) {
        self.controller.pump(now);
        if let Some(scroll) = self.controller.smooth_scroll_mut() {
            scroll.tick(now);
        }
        self.update_visibility(now);
    }

    fn update_visibility(&mut self, now: Duration) {
        let offset = self.controller.state().displayed;
        for index in 0..self.visible.len() {
            let visible = self.layout.is_visible(index, offset, self.gallery_area);
            if visible != self.visible[index] {
                self.visible[index] = visible;
                self.controller.reveal_item(index, visible, now);
            }
        }
    }

    pub fn is_tile_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    /// Lines of the info panel body
    pub fn info_lines(&self) -> Vec<String> {
        let mut lines = vec![
            "Reelpan Studio".to_string(),
            "Selected work".to_string(),
            String::new(),
        ];
        for (i, p) in self.projects.iter().enumerate() {
            lines.push(format!("{:02}  {}", i + 1, p.title));
            lines.push(format!("    {} · {} · {}", p.client, p.category, p.year));
        }
        lines
    }

    /// Scrollable height of the info panel in pixels
    fn info_limit(&self) -> f64 {
        let Some(area) = self.info_area else {
            return 0.0;
        };
        let body = area.height.saturating_sub(2) as usize;
        let total = info_line_of(self.projects.len());
        total.saturating_sub(body) as f64 * self.layout.cell_height()
    }

    /// Tear down the controller before the terminal is restored
    pub fn shutdown(&mut self) {
        self.controller.unmount();
    }
}

/// First info-panel line of project `index`
pub fn info_line_of(index: usize) -> usize {
    3 + index * 2
}

/// Gallery on the left, info panel on the right when there is room, status bar below
pub fn split_screen(area: Rect) -> (Rect, Option<Rect>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    if area.width < INFO_PANEL_MIN_TOTAL {
        return (rows[0], None);
    }
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(INFO_PANEL_WIDTH)])
        .split(rows[0]);
    (cols[0], Some(cols[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use reelpan_core::Phase;

    fn app() -> App {
        App::with_size(AppConfig::default(), 160, 48).expect("default config mounts")
    }

    fn run_until_idle(app: &mut App, start: Duration) -> Duration {
        let mut now = start;
        for _ in 0..2_000 {
            now += Duration::from_millis(16);
            app.tick_at(now);
            if !app.needs_fast_update() {
                break;
            }
        }
        now
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_screen_split() {
        let app = app();
        let info = app.info_area.expect("wide terminal shows the info panel");
        assert_eq!(info.width, INFO_PANEL_WIDTH);
        assert_eq!(app.gallery_area.width, 160 - INFO_PANEL_WIDTH);
        assert_eq!(app.gallery_area.height, 47);

        let narrow = App::with_size(AppConfig::default(), 80, 24).expect("mounts");
        assert!(narrow.info_area.is_none());
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut app = app();
        app.apply_action(Action::ToggleHelp, Duration::ZERO);
        assert!(app.show_help);
        app.handle_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE));
        assert!(!app.show_help);
        assert!(!app.controller.is_animating());
    }

    #[test]
    fn test_keyboard_step_moves_gallery() {
        let mut app = app();
        app.apply_action(Action::NavLeft, Duration::ZERO);
        assert!(app.needs_fast_update());
        run_until_idle(&mut app, Duration::ZERO);
        assert!(app.controller.state().displayed.x > 0.0);
        assert_eq!(app.controller.phase(), Phase::Idle);
    }

    #[test]
    fn test_drag_pans_gallery() {
        let mut app = app();
        let t = Duration::from_millis;
        app.handle_mouse_at(mouse(MouseEventKind::Down(MouseButton::Left), 40, 20), t(0));
        app.handle_mouse_at(mouse(MouseEventKind::Drag(MouseButton::Left), 45, 20), t(16));
        app.handle_mouse_at(mouse(MouseEventKind::Drag(MouseButton::Left), 50, 20), t(32));
        app.handle_mouse_at(mouse(MouseEventKind::Up(MouseButton::Left), 50, 20), t(48));
        assert!(app.controller.state().target.x > 0.0);
        assert!(app.selected.is_none());
    }

    #[test]
    fn test_hover_lifts_tile() {
        let mut app = app();
        let center = (
            app.gallery_area.x + app.gallery_area.width / 2,
            app.gallery_area.y + app.gallery_area.height / 2,
        );
        let index = app
            .layout
            .hit_test(center.0, center.1, app.controller.state().displayed, app.gallery_area);
        app.handle_mouse_at(mouse(MouseEventKind::Moved, center.0, center.1), Duration::ZERO);
        assert_eq!(app.hovered, index);
        run_until_idle(&mut app, Duration::ZERO);
        if let Some(index) = index {
            assert!(app.controller.item_style(index).is_lifted());
        }
    }

    #[test]
    fn test_toggle_profile_cycles() {
        let mut app = app();
        assert_eq!(app.controller.device_class(), DeviceClass::Desktop);
        app.apply_action(Action::ToggleProfile, Duration::ZERO);
        assert_eq!(app.controller.device_class(), DeviceClass::Mobile);
        app.apply_action(Action::ToggleProfile, Duration::ZERO);
        assert_eq!(app.controller.device_class(), DeviceClass::Desktop);
    }

    #[test]
    fn test_panning_reveals_and_hides_tiles() {
        let mut app = app();
        let before: Vec<bool> = (0..app.projects.len()).map(|i| app.is_tile_visible(i)).collect();
        let mut now = Duration::ZERO;
        for _ in 0..6 {
            app.apply_action(Action::NavRight, now);
            now = run_until_idle(&mut app, now);
        }
        let after: Vec<bool> = (0..app.projects.len()).map(|i| app.is_tile_visible(i)).collect();
        assert_ne!(before, after);
    }

    #[tokio::test]
    async fn test_info_panel_scrolls_to_clicked_project() {
        let mut app = app();
        app.start().await;
        let offset = app.controller.state().displayed;
        let index = (0..app.projects.len())
            .rev()
            .find(|&i| app.layout.is_visible(i, offset, app.gallery_area))
            .expect("some tile is on screen");
        let rect = app
            .layout
            .to_screen(app.layout.world_rect(index), app.gallery_area)
            .expect("visible");
        let (col, row) = (rect.x + rect.width / 2, rect.y + rect.height / 2);

        app.handle_mouse_at(mouse(MouseEventKind::Down(MouseButton::Left), col, row), Duration::ZERO);
        app.handle_mouse_at(mouse(MouseEventKind::Up(MouseButton::Left), col, row), Duration::from_millis(30));
        assert_eq!(app.selected, Some(index));
        run_until_idle(&mut app, Duration::from_millis(30));

        let scroll = app.controller.smooth_scroll().expect("attached");
        assert!(scroll.position() > 0.0);
        assert!(scroll.position() <= scroll.limit());
    }

    #[test]
    fn test_shutdown_unmounts() {
        let mut app = app();
        app.shutdown();
        assert!(!app.controller.is_mounted());
        app.apply_action(Action::NavUp, Duration::ZERO);
        assert!(!app.needs_fast_update());
    }
}
