//! Core engine for lyapviz: the Lyapunov verifier and the visualization
//! session state machine.
//!
//! This crate has no terminal or rendering dependencies. The verifier runs
//! once and produces a [`Verdict`]; the [`Session`] then owns the evaluated
//! surfaces for the interactive view.

mod grid;
mod session;
mod surface;
mod verifier;

pub use grid::{GridError, GridSpec, ORIGIN_EPSILON, SampleGrid, linspace};
pub use session::{Session, SliceEntryMode, VisualState};
pub use surface::{SurfaceGrid, Surfaces};
pub use verifier::{
    ConditionResult, ExprRole, LyapunovProblem, SampleStats, Stability, VDOT_TOLERANCE, Verdict,
    VerifyError, verify,
};

pub use lyapviz_symbolic::{Expr, StateVars};
pub use lyapviz_types::ui::{
    Camera, CameraPreset, InputMode, SliceInputError, SliceRange, SurfaceKind, UiOptions,
};
