//! Image-processing building blocks
//!
//! - Grayscale conversion (BGR to luminance)
//! - Linear filters (Sobel gradient, Gaussian blur)
//! - Binarization (Otsu, fixed and local-mean thresholds)
//! - Morphology (rectangular erode/dilate/close)
//! - Geometry (polygon measures) and polygon fitting
//! - Lens distortion correction

pub mod binarization;
pub mod filter;
pub mod geometry;
pub mod grayscale;
pub mod lens;
pub mod morphology;
pub mod polygon;
