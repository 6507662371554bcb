#![warn(missing_docs)]
//! Slab optics specific error structures
use std::{error::Error, fmt::Display};

/// Application specific Result type
pub type SlabResult<T> = std::result::Result<T, SlabError>;

/// Errors that can be returned by the calculation engines and their surroundings.
///
/// The first four variants are user-facing validation states. They are recoverable: a caller
/// shows the message (see [`Display`]) and suppresses any visualization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlabError {
    /// at least one numeric input is not a (finite) number
    InvalidInput,
    /// the refractive index of the slab is < 1.0
    InvalidRefractiveIndex,
    /// the slab thickness is negative
    InvalidThickness,
    /// the angle of incidence is not within the open interval (-90°, 90°)
    InvalidAngle,
    /// errors during console io
    Console(String),
    /// errors while reading or writing a canvas layout
    Layout(String),
    /// errors from the plotting backend
    Render(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl SlabError {
    /// Returns `true` if this error is one of the input validation states.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput
                | Self::InvalidRefractiveIndex
                | Self::InvalidThickness
                | Self::InvalidAngle
        )
    }
}

impl Display for SlabError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "Invalid Input"),
            Self::InvalidRefractiveIndex => write!(f, "n must be >= 1"),
            Self::InvalidThickness => write!(f, "Thickness must be >= 0"),
            Self::InvalidAngle => write!(f, "Angle must be between -90 & 90°"),
            Self::Console(m) => {
                write!(f, "Console:{m}")
            }
            Self::Layout(m) => {
                write!(f, "Layout:{m}")
            }
            Self::Render(m) => {
                write!(f, "Render:{m}")
            }
            Self::Other(m) => write!(f, "Slab Error:Other:{m}"),
        }
    }
}
impl Error for SlabError {}

impl std::convert::From<String> for SlabError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
