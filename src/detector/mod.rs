//! Strip detection stages
//!
//! Everything between the quality gate and the normalized output image:
//! - Edge maps (Sobel and adaptive threshold)
//! - Field localisation by reference colour
//! - Fiducial classification and tilt
//! - Rotation, cropping and PNG output

/// Fiducial roles and rotation angle
pub mod alignment;
/// Edge detector trait, gap filling and pruning
pub mod edges;
/// Colour-keyed field search bounded by edges
pub mod finder;
/// Sobel gradient detector
pub mod sobel;
/// Contrast-scaled neighbour difference detector
pub mod threshold;
/// Rotation, crop and encode
pub mod transform;
