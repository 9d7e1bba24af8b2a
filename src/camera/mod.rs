//! The pinhole camera data model.
//!
//! This module provides the [`PinholeModel`] struct holding the intrinsic
//! parameters (focal lengths, principal point), the image resolution and the
//! radial/tangential lens-distortion coefficients consumed by the rest of the
//! mapping pipeline. Models are constructed once by the loaders in
//! [`crate::import`] and are immutable afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum CameraModelError {
    #[error("Focal length must be positive")]
    FocalLengthMustBePositive,
    #[error("Principal point must be finite")]
    PrincipalPointMustBeFinite,
    #[error("Resolution must be positive")]
    ResolutionMustBePositive,
    #[error("Invalid camera parameters: {0}")]
    InvalidParams(String),
}

/// Represents a pinhole camera with radial/tangential lens distortion.
///
/// Distortion is always present once a model is constructed; an undistorted
/// camera simply carries an all-zero coefficient vector. The YAML loader fixes
/// the third radial coefficient `k3` at `0.0`.
#[derive(Clone, Serialize, Deserialize)]
pub struct PinholeModel {
    /// The intrinsic parameters of the camera, [`Intrinsics`] (fx, fy, cx, cy).
    pub intrinsics: Intrinsics,
    /// The resolution of the camera image, [`Resolution`] (width, height).
    pub resolution: Resolution,
    /// The 5 distortion coefficients: `[k1, k2, p1, p2, k3]`.
    /// * `k1`, `k2`, `k3`: Radial distortion coefficients.
    /// * `p1`, `p2`: Tangential distortion coefficients.
    pub distortions: [f64; 5],
}

impl PinholeModel {
    /// Creates a new [`PinholeModel`] and validates its parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`CameraModelError`] if the focal lengths are not positive,
    /// the principal point is not finite or the resolution is zero in either
    /// dimension.
    pub fn new(
        intrinsics: Intrinsics,
        resolution: Resolution,
        distortions: [f64; 5],
    ) -> Result<Self, CameraModelError> {
        let model = PinholeModel {
            intrinsics,
            resolution,
            distortions,
        };

        model.validate_params()?;
        Ok(model)
    }

    /// Validates the intrinsic parameters and the resolution.
    pub fn validate_params(&self) -> Result<(), CameraModelError> {
        validation::validate_intrinsics(&self.intrinsics)?;
        validation::validate_resolution(&self.resolution)?;
        Ok(())
    }

    pub fn get_intrinsics(&self) -> Intrinsics {
        self.intrinsics.clone()
    }

    pub fn get_resolution(&self) -> Resolution {
        self.resolution.clone()
    }

    /// Returns the distortion coefficients in the order `[k1, k2, p1, p2, k3]`.
    pub fn get_distortion(&self) -> [f64; 5] {
        self.distortions
    }
}

/// Provides a debug string representation for [`PinholeModel`].
impl fmt::Debug for PinholeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PinholeModel [fx: {} fy: {} cx: {} cy: {} width: {} height: {} distortions: {:?}]",
            self.intrinsics.fx,
            self.intrinsics.fy,
            self.intrinsics.cx,
            self.intrinsics.cy,
            self.resolution.width,
            self.resolution.height,
            self.distortions,
        )
    }
}

/// Common validation functions for camera parameters
pub mod validation {
    use super::*;

    pub fn validate_intrinsics(intrinsics: &Intrinsics) -> Result<(), CameraModelError> {
        if intrinsics.fx <= 0.0 || intrinsics.fy <= 0.0 {
            return Err(CameraModelError::FocalLengthMustBePositive);
        }
        if !intrinsics.cx.is_finite() || !intrinsics.cy.is_finite() {
            return Err(CameraModelError::PrincipalPointMustBeFinite);
        }
        Ok(())
    }

    pub fn validate_resolution(resolution: &Resolution) -> Result<(), CameraModelError> {
        if resolution.width == 0 || resolution.height == 0 {
            return Err(CameraModelError::ResolutionMustBePositive);
        }
        Ok(())
    }
}
