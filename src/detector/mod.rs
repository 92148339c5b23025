//! Marker localization
//!
//! Two strategies turn a frame into at most one candidate region:
//! - Gradient texture, for linear barcodes
//! - Polygon approximation, for rectangular frames and QR borders
//!
//! Both trace borders with the contour module.

/// Border following with hierarchy
pub mod contour;
/// Sobel/blur/Otsu/morphology pipeline for 1-D barcodes
pub mod gradient;
/// Adaptive threshold and quadrilateral fitting
pub mod rectangle;

pub use gradient::{GradientLocalizer, GradientParams, GradientStages};
pub use rectangle::{RectangleLocalizer, RectangleParams};

use crate::models::{CandidateRegion, Frame};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which localizer to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Gradient,
    Rectangle,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Gradient => write!(f, "gradient"),
            Strategy::Rectangle => write!(f, "rectangle"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gradient" | "barcode" => Ok(Strategy::Gradient),
            "rectangle" | "rect" | "qr" => Ok(Strategy::Rectangle),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

/// Run one strategy with its parameters
pub fn locate(
    strategy: Strategy,
    frame: &Frame,
    gradient: &GradientParams,
    rectangle: &RectangleParams,
) -> Option<CandidateRegion> {
    match strategy {
        Strategy::Gradient => GradientLocalizer::new(gradient.clone()).locate(frame),
        Strategy::Rectangle => RectangleLocalizer::new(rectangle.clone()).locate(frame),
    }
}
