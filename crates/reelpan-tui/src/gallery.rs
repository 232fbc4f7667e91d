//! Project catalog and the grid geometry that places tiles on the pannable plane.
//!
//! World coordinates are in pixels with the grid centred on the origin. The
//! controller's displayed offset is added to every tile before it is mapped
//! onto terminal cells, so panning right (positive x) slides the grid right.

use ratatui::layout::Rect;
use reelpan_core::config::UiConfig;
use reelpan_core::effects::{ContainerStyle, ItemStyle};
use reelpan_core::Vector2;

const CLIENTS: [&str; 8] = [
    "Northwind",
    "Halcyon Air",
    "Oda Records",
    "Brightline",
    "Mercer & Vale",
    "Kestrel",
    "Sundial Foods",
    "Atlas Mobility",
];

const CATEGORIES: [&str; 5] = ["Commercial", "Music Video", "Documentary", "Brand Film", "Short"];

const TITLES: [&str; 12] = [
    "Low Tide",
    "Paper Moons",
    "Static Bloom",
    "Night Shift",
    "Glasshouse",
    "Slow Burn",
    "Northbound",
    "Afterglow",
    "Salt Roads",
    "Quiet Engines",
    "First Light",
    "Long Exposure",
];

/// One gallery entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub title: String,
    pub client: &'static str,
    pub category: &'static str,
    pub year: u16,
}

/// Deterministic sample catalog of `count` projects
pub fn catalog(count: usize) -> Vec<Project> {
    (0..count)
        .map(|i| {
            let title = if i < TITLES.len() {
                TITLES[i].to_string()
            } else {
                format!("{} {}", TITLES[i % TITLES.len()], i / TITLES.len() + 1)
            };
            Project {
                title,
                client: CLIENTS[(i * 3) % CLIENTS.len()],
                category: CATEGORIES[i % CATEGORIES.len()],
                year: 2024 - (i % 6) as u16,
            }
        })
        .collect()
}

/// Tile rectangle in world pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WorldRect {
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Grid geometry for a fixed number of tiles
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryLayout {
    count: usize,
    columns: usize,
    tile_width: f64,
    tile_height: f64,
    gap_x: f64,
    gap_y: f64,
    cell_width: f64,
    cell_height: f64,
}

impl GalleryLayout {
    pub fn new(ui: &UiConfig, count: usize) -> Self {
        let columns = ((count as f64).sqrt().ceil() as usize).max(1);
        Self {
            count,
            columns,
            tile_width: ui.tile_cols as f64 * ui.cell_width_px,
            tile_height: ui.tile_rows as f64 * ui.cell_height_px,
            gap_x: 2.0 * ui.cell_width_px,
            gap_y: ui.cell_height_px,
            cell_width: ui.cell_width_px,
            cell_height: ui.cell_height_px,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn rows(&self) -> usize {
        self.count.div_ceil(self.columns)
    }

    /// Viewport size in pixels for a terminal area
    pub fn viewport_px(&self, width: u16, height: u16) -> (f64, f64) {
        (width as f64 * self.cell_width, height as f64 * self.cell_height)
    }

    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Position of tile `index` before any offset or effect
    pub fn world_rect(&self, index: usize) -> WorldRect {
        let pitch_x = self.tile_width + self.gap_x;
        let pitch_y = self.tile_height + self.gap_y;
        let grid_width = self.columns as f64 * pitch_x - self.gap_x;
        let grid_height = self.rows() as f64 * pitch_y - self.gap_y;
        let col = index % self.columns;
        let row = index / self.columns;
        WorldRect {
            x: col as f64 * pitch_x - grid_width / 2.0,
            y: row as f64 * pitch_y - grid_height / 2.0,
            width: self.tile_width,
            height: self.tile_height,
        }
    }

    /// World rect of tile `index` after applying its style, the container style and the pan offset
    pub fn placed_rect(
        &self,
        index: usize,
        offset: Vector2,
        item: &ItemStyle,
        container: &ContainerStyle,
    ) -> WorldRect {
        let base = self.world_rect(index);
        let center = base.center();
        let width = base.width * item.scale;
        let height = base.height * item.scale;
        // Hover z pulls the tile up a little so lifted tiles read as raised.
        let lift = item.z / 50.0 * self.cell_height * 0.5;
        WorldRect {
            x: center.x - width / 2.0 + offset.x,
            y: center.y - height / 2.0 + offset.y + item.offset_y + container.offset_y - lift,
            width,
            height,
        }
    }

    /// Map a world rect onto the terminal, clipped to `area`
    pub fn to_screen(&self, rect: WorldRect, area: Rect) -> Option<Rect> {
        let (vw, vh) = self.viewport_px(area.width, area.height);
        let left = ((rect.x + vw / 2.0) / self.cell_width).round();
        let top = ((rect.y + vh / 2.0) / self.cell_height).round();
        let right = ((rect.x + rect.width + vw / 2.0) / self.cell_width).round();
        let bottom = ((rect.y + rect.height + vh / 2.0) / self.cell_height).round();

        let left = left.max(0.0);
        let top = top.max(0.0);
        let right = right.min(area.width as f64);
        let bottom = bottom.min(area.height as f64);
        if !(right > left && bottom > top) {
            return None;
        }
        Some(Rect::new(
            area.x + left as u16,
            area.y + top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }

    /// Whether the unstyled tile intersects the visible area at `offset`
    pub fn is_visible(&self, index: usize, offset: Vector2, area: Rect) -> bool {
        let mut rect = self.world_rect(index);
        rect.x += offset.x;
        rect.y += offset.y;
        self.to_screen(rect, area).is_some()
    }

    /// Tile under terminal cell (`column`, `row`), topmost (highest index) first
    pub fn hit_test(&self, column: u16, row: u16, offset: Vector2, area: Rect) -> Option<usize> {
        (0..self.count).rev().find(|&index| {
            let mut rect = self.world_rect(index);
            rect.x += offset.x;
            rect.y += offset.y;
            self.to_screen(rect, area).is_some_and(|r| {
                column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
            })
        })
    }
}
