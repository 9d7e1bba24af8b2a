//! Mapping IO Library
//!
//! Loaders converting the loosely-structured text/config formats of a visual
//! mapping pipeline into strongly-typed geometric structures:
//! - Pinhole camera models (intrinsics + lens distortion) from YAML settings
//! - TUM-format trajectories as a map from timestamp to 3x4 pose matrix
//! - Raw surface point clouds as an ordered point collection
//!
//! All loaders are synchronous and blocking: each call opens one file, reads
//! it to completion and either returns a fully assembled structure or fails
//! with a descriptive [`ImportError`]. No partial results are ever returned.

pub mod camera;
pub mod geometry;
pub mod import;
pub mod settings;

// Re-export commonly used types
pub use camera::{CameraModelError, Intrinsics, PinholeModel, Resolution};

pub use geometry::{rotation_from_quaternion, Pose};

pub use import::{
    camera_from_settings, load_camera_from_yaml, load_camera_from_yaml_dir,
    load_surface_points_from_txt, load_surface_points_from_txt_dir, load_trajectory_from_txt_tum,
    load_trajectory_from_txt_tum_dir, split, ImportError, SurfacePoints, Trajectory,
};

pub use settings::{CameraSettings, SettingsError, YamlCameraSettings};
