pub mod app;
pub mod event;
pub mod gallery;
pub mod input;
pub mod keymap;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use theme::Theme;
