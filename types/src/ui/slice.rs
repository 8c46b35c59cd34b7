//! Iso-value slice bounds and text-entry validation.

use thiserror::Error;

/// Closed interval `[min, max]` the slice control may take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceRange {
    min: f64,
    max: f64,
}

impl SliceRange {
    /// Bounds are reordered if given backwards. Non-finite bounds collapse to 0.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        let a = if a.is_finite() { a } else { 0.0 };
        let b = if b.is_finite() { b } else { 0.0 };
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Position of `value` inside the range as a fraction in [0, 1].
    #[must_use]
    pub fn fraction(self, value: f64) -> f64 {
        if self.span() <= 0.0 {
            0.0
        } else {
            ((self.clamp(value) - self.min) / self.span()).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SliceInputError {
    #[error("slice value must not be empty")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("slice value must not be NaN")]
    NaN,
}

/// Parse text typed into the slice field.
///
/// Infinite values are accepted; they clamp to the range bounds like any other
/// out-of-range value.
pub fn parse_slice_text(text: &str) -> Result<f64, SliceInputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SliceInputError::Empty);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| SliceInputError::NotANumber(trimmed.to_string()))?;
    if value.is_nan() {
        return Err(SliceInputError::NaN);
    }
    Ok(value)
}

/// Text shown in the slice field for a committed value.
#[must_use]
pub fn format_slice_value(value: f64) -> String {
    let formatted = format!("{value:.3}");
    if formatted == "-0.000" {
        "0.000".to_string()
    } else {
        formatted
    }
}
