//! UI state types for the TUI layer.
//!
//! Pure data types with no IO and no ratatui dependency.
//! Used by both the engine (state ownership) and tui (rendering/input).

mod camera;
mod slice;
mod view_state;

pub use camera::{Camera, CameraPreset};
pub use slice::{SliceInputError, SliceRange, format_slice_value, parse_slice_text};
pub use view_state::{InputMode, SurfaceKind, UiOptions};
