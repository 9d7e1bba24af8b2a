//! Import routines for the external formats consumed by the mapping pipeline.
//!
//! Three independent loaders share the same read/tokenize/validate/convert
//! structure:
//! - [`load_camera_from_yaml`] reads a camera settings file into a
//!   [`PinholeModel`],
//! - [`load_trajectory_from_txt_tum`] reads a TUM-format trajectory file into
//!   a timestamp-keyed map of 3x4 poses,
//! - [`load_surface_points_from_txt`] reads a raw point file into an ordered
//!   point collection.
//!
//! Every loader consumes its input to completion and either returns a fully
//! assembled structure or fails with an [`ImportError`]; no partial results
//! are exposed. Each `*_dir` companion joins a directory and a filename
//! before delegating.

use crate::camera::{CameraModelError, Intrinsics, PinholeModel, Resolution};
use crate::geometry::{rotation_from_quaternion, Pose};
use crate::settings::{CameraSettings, SettingsError, YamlCameraSettings};
use log::debug;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// One pose per timestamp. File order is authoritative: a repeated timestamp
/// overwrites the earlier entry.
pub type Trajectory = HashMap<u64, Pose>;

/// An ordered 3D point collection; insertion order equals file line order.
pub type SurfacePoints = Vec<Point3<f64>>;

/// Number of tokens on a trajectory line: `timestamp x y z qx qy qz qw`.
const TRAJECTORY_LINE_TOKENS: usize = 8;

/// Number of tokens on a surface point line: `x y z`.
const SURFACE_POINT_LINE_TOKENS: usize = 3;

#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    #[error("Could not open '{path}': {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not load camera settings from '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },
    #[error("Camera settings field '{0}' is missing or has the wrong type")]
    FieldMissingOrInvalid(String),
    #[error("Unsupported camera type '{0}'")]
    UnsupportedCameraType(String),
    #[error("Line {line}: expected {expected} fields, found {found}")]
    InsufficientFields {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: malformed value in '{raw}'")]
    MalformedLine { line: usize, raw: String },
    #[error("Invalid camera parameters: {0}")]
    InvalidCamera(#[from] CameraModelError),
}

impl From<SettingsError> for ImportError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Load { path, reason } => ImportError::ConfigLoad { path, reason },
            SettingsError::Field(key) => ImportError::FieldMissingOrInvalid(key),
        }
    }
}

/// Splits a line into the non-empty substrings separated by `delimiter`.
///
/// Runs of the delimiter collapse and leading/trailing delimiters produce no
/// empty tokens, matching whitespace-split semantics. An empty line yields an
/// empty vector.
pub fn split(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter)
        .filter(|token| !token.is_empty())
        .collect()
}

fn parse_token<T: FromStr>(token: &str, line_number: usize, raw: &str) -> Result<T, ImportError> {
    token.trim().parse::<T>().map_err(|_| ImportError::MalformedLine {
        line: line_number,
        raw: raw.to_string(),
    })
}

fn open_lines(path: &Path) -> Result<BufReader<File>, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::FileOpen {
        path: path.display().to_string(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Builds a [`PinholeModel`] from any [`CameraSettings`] source.
///
/// The declared `type` field selects the model. Only `"pinhole"` is
/// implemented; any other declared type fails with
/// [`ImportError::UnsupportedCameraType`] naming the offending string. The
/// third radial distortion coefficient `k3` is always set to `0.0`.
pub fn camera_from_settings(settings: &impl CameraSettings) -> Result<PinholeModel, ImportError> {
    let camera_type = settings.get_str("type")?;
    match camera_type.as_str() {
        "pinhole" => {
            let intrinsics = Intrinsics {
                fx: settings.get_f64("fx")?,
                fy: settings.get_f64("fy")?,
                cx: settings.get_f64("cx")?,
                cy: settings.get_f64("cy")?,
            };
            let resolution = Resolution {
                width: settings.get_u32("width")?,
                height: settings.get_u32("height")?,
            };
            let distortions = [
                settings.get_f64("k1")?,
                settings.get_f64("k2")?,
                settings.get_f64("p1")?,
                settings.get_f64("p2")?,
                0.0, // k3 is not part of the settings format
            ];
            Ok(PinholeModel::new(intrinsics, resolution, distortions)?)
        }
        other => Err(ImportError::UnsupportedCameraType(other.to_string())),
    }
}

/// Loads a pinhole camera model from a YAML settings file.
pub fn load_camera_from_yaml(filepath: impl AsRef<Path>) -> Result<PinholeModel, ImportError> {
    let path = filepath.as_ref();
    let settings = YamlCameraSettings::from_file(path)?;
    let model = camera_from_settings(&settings)?;
    debug!("Loaded camera model from '{}': {:?}", path.display(), model);
    Ok(model)
}

/// Loads a pinhole camera model from `directory/filename`.
pub fn load_camera_from_yaml_dir(
    directory: impl AsRef<Path>,
    filename: &str,
) -> Result<PinholeModel, ImportError> {
    load_camera_from_yaml(directory.as_ref().join(filename))
}

/// Loads a TUM-format trajectory file.
///
/// Each non-empty line holds `timestamp x y z qx qy qz qw`, space separated.
/// The timestamp parses as `u64`, all other tokens as `f64`. The quaternion
/// `(qw, qx, qy, qz)` converts to a rotation matrix without normalization (see
/// [`rotation_from_quaternion`]); together with the translation it forms the
/// 3x4 pose keyed by the timestamp. A repeated timestamp overwrites the
/// earlier pose.
///
/// # Errors
///
/// - [`ImportError::FileOpen`] if the file is missing or unreadable,
/// - [`ImportError::InsufficientFields`] for a line with fewer than 8 tokens,
/// - [`ImportError::MalformedLine`] for a non-numeric token.
pub fn load_trajectory_from_txt_tum(filepath: impl AsRef<Path>) -> Result<Trajectory, ImportError> {
    let path = filepath.as_ref();
    let reader = open_lines(path)?;

    let mut result = Trajectory::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ImportError::FileOpen {
            path: path.display().to_string(),
            source,
        })?;
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let tokens = split(&line, ' ');
        if tokens.len() < TRAJECTORY_LINE_TOKENS {
            return Err(ImportError::InsufficientFields {
                line: line_number,
                expected: TRAJECTORY_LINE_TOKENS,
                found: tokens.len(),
            });
        }

        let timestamp: u64 = parse_token(tokens[0], line_number, &line)?;
        let x: f64 = parse_token(tokens[1], line_number, &line)?;
        let y: f64 = parse_token(tokens[2], line_number, &line)?;
        let z: f64 = parse_token(tokens[3], line_number, &line)?;
        let qx: f64 = parse_token(tokens[4], line_number, &line)?;
        let qy: f64 = parse_token(tokens[5], line_number, &line)?;
        let qz: f64 = parse_token(tokens[6], line_number, &line)?;
        let qw: f64 = parse_token(tokens[7], line_number, &line)?;

        let rotation = rotation_from_quaternion(qw, qx, qy, qz);
        let pose = Pose::from_rotation_translation(&rotation, &Vector3::new(x, y, z));
        result.insert(timestamp, pose);
    }

    debug!("Loaded {} poses from '{}'", result.len(), path.display());
    Ok(result)
}

/// Loads a TUM-format trajectory from `directory/filename`.
pub fn load_trajectory_from_txt_tum_dir(
    directory: impl AsRef<Path>,
    filename: &str,
) -> Result<Trajectory, ImportError> {
    load_trajectory_from_txt_tum(directory.as_ref().join(filename))
}

/// Loads a raw surface point file.
///
/// Each non-empty line holds `x y z`, space separated, parsed as `f64` and
/// appended in file order. An empty file yields an empty collection.
///
/// # Errors
///
/// - [`ImportError::FileOpen`] if the file is missing or unreadable,
/// - [`ImportError::InsufficientFields`] for a line with fewer than 3 tokens,
/// - [`ImportError::MalformedLine`] for a non-numeric token.
pub fn load_surface_points_from_txt(
    filepath: impl AsRef<Path>,
) -> Result<SurfacePoints, ImportError> {
    let path = filepath.as_ref();
    let reader = open_lines(path)?;

    let mut points = SurfacePoints::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ImportError::FileOpen {
            path: path.display().to_string(),
            source,
        })?;
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let tokens = split(&line, ' ');
        if tokens.len() < SURFACE_POINT_LINE_TOKENS {
            return Err(ImportError::InsufficientFields {
                line: line_number,
                expected: SURFACE_POINT_LINE_TOKENS,
                found: tokens.len(),
            });
        }

        let x: f64 = parse_token(tokens[0], line_number, &line)?;
        let y: f64 = parse_token(tokens[1], line_number, &line)?;
        let z: f64 = parse_token(tokens[2], line_number, &line)?;
        points.push(Point3::new(x, y, z));
    }

    debug!(
        "Loaded {} surface points from '{}'",
        points.len(),
        path.display()
    );
    Ok(points)
}

/// Loads a raw surface point file from `directory/filename`.
pub fn load_surface_points_from_txt_dir(
    directory: impl AsRef<Path>,
    filename: &str,
) -> Result<SurfacePoints, ImportError> {
    load_surface_points_from_txt(directory.as_ref().join(filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    #[test]
    fn test_split_collapses_delimiter_runs() {
        assert_eq!(split("a  b   c", ' '), vec!["a", "b", "c"]);
        assert_eq!(split("  lead and trail  ", ' '), vec!["lead", "and", "trail"]);
        assert_eq!(split("", ' '), Vec::<&str>::new());
        assert_eq!(split("1.0,2.0,,3.0", ','), vec!["1.0", "2.0", "3.0"]);
    }

    #[test]
    fn test_load_camera_from_yaml() {
        let model = load_camera_from_yaml("samples/pinhole.yaml").unwrap();

        assert_eq!(model.intrinsics.fx, 461.629);
        assert_eq!(model.intrinsics.fy, 460.152);
        assert_eq!(model.intrinsics.cx, 362.68);
        assert_eq!(model.intrinsics.cy, 246.049);
        assert_eq!(model.resolution.width, 752);
        assert_eq!(model.resolution.height, 480);
        assert_eq!(model.distortions[0], -0.28340811);
        assert_eq!(model.distortions[1], 0.07395907);
        assert_eq!(model.distortions[2], 0.00019359);
        assert_eq!(model.distortions[3], 0.0000176187114);
        // k3 is never read from the file
        assert_eq!(model.distortions[4], 0.0);
    }

    #[test]
    fn test_load_camera_from_yaml_dir_joins_path() {
        let model = load_camera_from_yaml_dir("samples", "pinhole.yaml").unwrap();
        assert_eq!(model.resolution.width, 752);
    }

    #[test]
    fn test_unsupported_camera_type_is_an_error() {
        let result = load_camera_from_yaml("samples/spherical.yaml");
        assert!(matches!(
            result,
            Err(ImportError::UnsupportedCameraType(ref t)) if t == "spherical"
        ));
    }

    #[test]
    fn test_missing_camera_field() {
        let result = load_camera_from_yaml("samples/pinhole_missing_fy.yaml");
        assert!(matches!(
            result,
            Err(ImportError::FieldMissingOrInvalid(ref key)) if key == "fy"
        ));
    }

    #[test]
    fn test_missing_camera_file_names_path() {
        let result = load_camera_from_yaml("samples/no_such_camera.yaml");
        match result {
            Err(ImportError::ConfigLoad { path, .. }) => {
                assert!(path.contains("no_such_camera.yaml"))
            }
            other => panic!("expected ConfigLoad, got {other:?}"),
        }
    }

    #[test]
    fn test_load_trajectory() {
        let trajectory = load_trajectory_from_txt_tum("samples/trajectory.txt").unwrap();
        assert_eq!(trajectory.len(), 3);

        // Identity quaternion line
        let pose = &trajectory[&1000];
        assert_relative_eq!(pose.rotation(), Matrix3::identity(), epsilon = 1e-12);
        assert_relative_eq!(pose.translation(), Vector3::new(0.0, 0.0, 0.0));

        // Quarter turn about z
        let pose = &trajectory[&2000];
        let expected = Matrix3::new(
            0.0, -1.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0,
        );
        assert_relative_eq!(pose.rotation(), expected, epsilon = 1e-12);
        assert_relative_eq!(pose.translation(), Vector3::new(1.5, -2.0, 3.0));
    }

    #[test]
    fn test_duplicate_timestamp_last_line_wins() {
        let trajectory = load_trajectory_from_txt_tum("samples/trajectory_duplicate.txt").unwrap();
        assert_eq!(trajectory.len(), 1);
        assert_relative_eq!(
            trajectory[&1000].translation(),
            Vector3::new(5.0, 6.0, 7.0)
        );
    }

    #[test]
    fn test_trajectory_rejects_seven_token_line() {
        // qw is the eighth token; a seven-token line must fail the length
        // check instead of reaching the numeric conversion.
        let result = load_trajectory_from_txt_tum("samples/trajectory_short.txt");
        assert!(matches!(
            result,
            Err(ImportError::InsufficientFields {
                line: 1,
                expected: 8,
                found: 7,
            })
        ));
    }

    #[test]
    fn test_trajectory_malformed_token_reports_line() {
        let result = load_trajectory_from_txt_tum("samples/trajectory_malformed.txt");
        match result {
            Err(ImportError::MalformedLine { line, raw }) => {
                assert_eq!(line, 2);
                assert!(raw.contains("abc"));
            }
            other => panic!("expected MalformedLine, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_trajectory_file_names_path() {
        let result = load_trajectory_from_txt_tum("samples/no_such_trajectory.txt");
        match result {
            Err(ImportError::FileOpen { path, .. }) => {
                assert!(path.contains("no_such_trajectory.txt"))
            }
            other => panic!("expected FileOpen, got {other:?}"),
        }
    }

    #[test]
    fn test_load_surface_points_preserves_order() {
        let points = load_surface_points_from_txt("samples/surface_points.txt").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], Point3::new(1.0, 2.0, 3.0));
        assert_eq!(points[1], Point3::new(-4.25, 5.5, -6.75));
        assert_eq!(points[2], Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_load_surface_points_dir_joins_path() {
        let points = load_surface_points_from_txt_dir("samples", "surface_points.txt").unwrap();
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_empty_point_file_yields_empty_collection() {
        let points = load_surface_points_from_txt("samples/empty.txt").unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_surface_points_reject_two_token_line() {
        // z is the third token; a two-token line must fail the length check
        // instead of reaching the numeric conversion.
        let result = load_surface_points_from_txt("samples/surface_points_short.txt");
        assert!(matches!(
            result,
            Err(ImportError::InsufficientFields {
                line: 1,
                expected: 3,
                found: 2,
            })
        ));
    }
}
