//! Camera orientation for the 3D surface view.
//!
//! Angles follow the usual elevation/azimuth convention in degrees:
//! elevation 90 looks straight down the value axis, azimuth -90 looks along
//! the second state axis.

use crate::StateVars;

/// The three canonical viewing planes offered as buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraPreset {
    /// Both state axes visible, value axis hidden.
    TopDown,
    /// First state variable against the value axis.
    X1Side,
    /// Second state variable against the value axis.
    X2Side,
}

impl CameraPreset {
    pub const ALL: [CameraPreset; 3] = [
        CameraPreset::TopDown,
        CameraPreset::X1Side,
        CameraPreset::X2Side,
    ];

    #[must_use]
    pub fn label(self, vars: &StateVars) -> String {
        let [first, second] = vars.names();
        match self {
            CameraPreset::TopDown => format!("{first}-{second} plane"),
            CameraPreset::X1Side => format!("{first}-z plane"),
            CameraPreset::X2Side => format!("{second}-z plane"),
        }
    }

    #[must_use]
    pub const fn angles(self) -> (f64, f64) {
        match self {
            CameraPreset::TopDown => (90.0, -90.0),
            CameraPreset::X1Side => (0.0, -90.0),
            CameraPreset::X2Side => (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    elevation: f64,
    azimuth: f64,
}

impl Camera {
    pub const DEFAULT_ELEVATION: f64 = 30.0;
    pub const DEFAULT_AZIMUTH: f64 = -60.0;

    /// Elevation is clamped to [-90, 90]; azimuth is wrapped to (-180, 180].
    #[must_use]
    pub fn new(elevation: f64, azimuth: f64) -> Self {
        Self {
            elevation: elevation.clamp(-90.0, 90.0),
            azimuth: wrap_degrees(azimuth),
        }
    }

    #[must_use]
    pub fn from_preset(preset: CameraPreset) -> Self {
        let (elevation, azimuth) = preset.angles();
        Self::new(elevation, azimuth)
    }

    #[must_use]
    pub fn rotated(self, d_azimuth: f64, d_elevation: f64) -> Self {
        Self::new(self.elevation + d_elevation, self.azimuth + d_azimuth)
    }

    #[must_use]
    pub fn elevation(self) -> f64 {
        self.elevation
    }

    #[must_use]
    pub fn azimuth(self) -> f64 {
        self.azimuth
    }

    /// The preset this orientation currently matches, if any.
    #[must_use]
    pub fn preset(self) -> Option<CameraPreset> {
        CameraPreset::ALL
            .into_iter()
            .find(|preset| Self::from_preset(*preset) == self)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ELEVATION, Self::DEFAULT_AZIMUTH)
    }
}

fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}
