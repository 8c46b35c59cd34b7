//! Interactive visualization state.
//!
//! A [`Session`] owns both evaluated surfaces and the [`VisualState`] the
//! renderer draws from. Every transition completes synchronously and keeps the
//! slice value inside the active surface's `[min, max]`.

use lyapviz_symbolic::{Expr, StateVars};
use lyapviz_types::ui::{
    Camera, CameraPreset, InputMode, SliceInputError, SliceRange, SurfaceKind, UiOptions,
    format_slice_value, parse_slice_text,
};

use crate::grid::GridSpec;
use crate::surface::{SurfaceGrid, Surfaces};

/// Longest draft accepted by the slice text field.
const MAX_DRAFT_LEN: usize = 32;

/// What the renderer needs to know about the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    pub surface: SurfaceKind,
    pub slice: f64,
    pub camera: Camera,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SliceEntry {
    Idle,
    Editing { draft: String },
}

#[derive(Debug, Clone)]
pub struct Session {
    surfaces: Surfaces,
    vars: StateVars,
    state: VisualState,
    entry: SliceEntry,
    status: String,
    options: UiOptions,
    should_quit: bool,
}

impl Session {
    /// Evaluate both surfaces over `spec` and start on `V` at its minimum.
    #[must_use]
    pub fn new(v: &Expr, vdot: &Expr, vars: StateVars, spec: GridSpec) -> Self {
        Self::from_surfaces(Surfaces::evaluate(v, vdot, spec), vars)
    }

    #[must_use]
    pub fn from_surfaces(surfaces: Surfaces, vars: StateVars) -> Self {
        let slice = surfaces.get(SurfaceKind::V).range().min();
        Self {
            surfaces,
            vars,
            state: VisualState {
                surface: SurfaceKind::V,
                slice,
                camera: Camera::default(),
            },
            entry: SliceEntry::Idle,
            status: String::new(),
            options: UiOptions::default(),
            should_quit: false,
        }
    }

    /// Text for the status line, usually the verdict summary.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_options(mut self, options: UiOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn state(&self) -> VisualState {
        self.state
    }

    #[must_use]
    pub fn vars(&self) -> &StateVars {
        &self.vars
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[must_use]
    pub fn options(&self) -> UiOptions {
        self.options
    }

    #[must_use]
    pub fn surfaces(&self) -> &Surfaces {
        &self.surfaces
    }

    /// The surface currently displayed.
    #[must_use]
    pub fn surface(&self) -> &SurfaceGrid {
        self.surfaces.get(self.state.surface)
    }

    /// Bounds of the slice control for the active surface.
    #[must_use]
    pub fn range(&self) -> SliceRange {
        self.surface().range()
    }

    #[must_use]
    pub fn slice_value(&self) -> f64 {
        self.state.slice
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.state.camera
    }

    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        match self.entry {
            SliceEntry::Idle => InputMode::Normal,
            SliceEntry::Editing { .. } => InputMode::SliceEntry,
        }
    }

    /// Contents of the `Z value` field: the draft while editing, otherwise the
    /// committed slice value with three decimals.
    #[must_use]
    pub fn slice_text(&self) -> String {
        match &self.entry {
            SliceEntry::Idle => format_slice_value(self.state.slice),
            SliceEntry::Editing { draft } => draft.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Surface
    // ------------------------------------------------------------------------

    /// Switch surfaces; the slice is clamped into the new range.
    pub fn select_surface(&mut self, kind: SurfaceKind) {
        if self.state.surface == kind {
            return;
        }
        self.state.surface = kind;
        self.state.slice = self.range().clamp(self.state.slice);
        tracing::debug!(surface = kind.label(), slice = self.state.slice, "surface selected");
    }

    pub fn toggle_surface(&mut self) {
        self.select_surface(self.state.surface.toggle());
    }

    // ------------------------------------------------------------------------
    // Slice
    // ------------------------------------------------------------------------

    /// Set the slice, clamped to the active range. NaN is ignored.
    ///
    /// Returns the value now in effect.
    pub fn set_slice_value(&mut self, value: f64) -> f64 {
        if !value.is_nan() {
            self.state.slice = self.range().clamp(value);
        }
        self.state.slice
    }

    /// Move the slice by `fraction` of the range's span (negative moves down).
    pub fn step_slice(&mut self, fraction: f64) -> f64 {
        let span = self.range().span();
        self.set_slice_value(self.state.slice + span * fraction)
    }

    pub fn slice_to_min(&mut self) -> f64 {
        self.set_slice_value(self.range().min())
    }

    pub fn slice_to_max(&mut self) -> f64 {
        self.set_slice_value(self.range().max())
    }

    /// Parse and apply typed text. On error the state is left unchanged.
    pub fn submit_slice_text(&mut self, text: &str) -> Result<f64, SliceInputError> {
        let value = parse_slice_text(text)?;
        Ok(self.set_slice_value(value))
    }

    // ------------------------------------------------------------------------
    // Camera
    // ------------------------------------------------------------------------

    pub fn set_camera(&mut self, preset: CameraPreset) {
        self.state.camera = Camera::from_preset(preset);
    }

    pub fn rotate(&mut self, d_azimuth: f64, d_elevation: f64) {
        self.state.camera = self.state.camera.rotated(d_azimuth, d_elevation);
    }

    pub fn reset_camera(&mut self) {
        self.state.camera = Camera::default();
    }

    // ------------------------------------------------------------------------
    // Slice text entry
    // ------------------------------------------------------------------------

    /// Start editing the slice field, seeded with the current text.
    pub fn begin_slice_entry(&mut self) {
        if self.entry == SliceEntry::Idle {
            self.entry = SliceEntry::Editing {
                draft: format_slice_value(self.state.slice),
            };
        }
    }

    /// Borrow-scoped access to slice-entry operations.
    ///
    /// Returns `None` unless the field is being edited.
    pub fn slice_entry_mut(&mut self) -> Option<SliceEntryMode<'_>> {
        match self.entry {
            SliceEntry::Editing { .. } => Some(SliceEntryMode { session: self }),
            SliceEntry::Idle => None,
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// Proof that the slice field is being edited.
pub struct SliceEntryMode<'a> {
    session: &'a mut Session,
}

impl SliceEntryMode<'_> {
    fn draft_mut(&mut self) -> Option<&mut String> {
        match &mut self.session.entry {
            SliceEntry::Editing { draft } => Some(draft),
            SliceEntry::Idle => None,
        }
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        match &self.session.entry {
            SliceEntry::Editing { draft } => draft,
            SliceEntry::Idle => "",
        }
    }

    pub fn push_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        if let Some(draft) = self.draft_mut()
            && draft.chars().count() < MAX_DRAFT_LEN
        {
            draft.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(draft) = self.draft_mut() {
            draft.pop();
        }
    }

    pub fn clear(&mut self) {
        if let Some(draft) = self.draft_mut() {
            draft.clear();
        }
    }

    /// Leave the field without applying the draft.
    pub fn cancel(self) {
        self.session.entry = SliceEntry::Idle;
    }

    /// Apply the draft and leave the field. The field always ends up showing
    /// the committed value, whether or not the draft parsed.
    pub fn submit(self) -> Result<f64, SliceInputError> {
        let entry = std::mem::replace(&mut self.session.entry, SliceEntry::Idle);
        let SliceEntry::Editing { draft } = entry else {
            return Ok(self.session.state.slice);
        };
        let result = self.session.submit_slice_text(&draft);
        if let Err(err) = &result {
            tracing::debug!(%err, "ignored slice text");
        }
        result
    }
}
