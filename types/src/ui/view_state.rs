//! View-level enums shared by the session state machine and the renderer.

/// Which of the two precomputed surfaces is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceKind {
    #[default]
    V,
    Vdot,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 2] = [SurfaceKind::V, SurfaceKind::Vdot];

    /// Selector label, also used as the plot title.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            SurfaceKind::V => "V(x)",
            SurfaceKind::Vdot => "Vdot(x)",
        }
    }

    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            SurfaceKind::V => SurfaceKind::Vdot,
            SurfaceKind::Vdot => SurfaceKind::V,
        }
    }
}

/// Keyboard focus of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Keys drive the slider, selector and camera buttons.
    #[default]
    Normal,
    /// Keys edit the slice text field.
    SliceEntry,
}

/// UI configuration options derived from config/environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
}

#[cfg(test)]
mod tests {
    use super::SurfaceKind;

    #[test]
    fn toggle_round_trips() {
        assert_eq!(SurfaceKind::V.toggle(), SurfaceKind::Vdot);
        assert_eq!(SurfaceKind::V.toggle().toggle(), SurfaceKind::V);
    }
}
