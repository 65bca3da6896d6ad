use std::{collections::BTreeMap, fmt, str::FromStr};

use rand::{rngs::StdRng, seq::index::sample, SeedableRng as _};
use thiserror::Error;

use crate::pointcloud::point::{Color, Point};

#[derive(Debug, Error, PartialEq)]
pub enum DecimationError {
    #[error("voxel size must be a positive finite number, got {0}")]
    InvalidVoxelSize(f64),
    #[error("uniform stride must be at least 1, got {0}")]
    InvalidStride(f64),
    #[error("random sampling ratio must be in (0, 1], got {0}")]
    InvalidRatio(f64),
    #[error("downsampling method {0} unknown, should be random, voxel or uniform")]
    UnknownMethod(String),
    #[error("random sampling at ratio {ratio} keeps none of the {points} points")]
    NothingKept { points: usize, ratio: f64 },
}

pub trait PointCloudDecimator {
    fn decimate(&self, points: &[Point]) -> Result<Vec<Point>, DecimationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimationMethod {
    Voxel,
    Uniform,
    Random,
}

impl DecimationMethod {
    pub const ALL: [DecimationMethod; 3] = [Self::Voxel, Self::Uniform, Self::Random];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voxel => "voxel",
            Self::Uniform => "uniform",
            Self::Random => "random",
        }
    }

    /// Range check of the method parameter, shared by the decimators.
    pub fn validate_parameter(&self, parameter: f64) -> Result<(), DecimationError> {
        match self {
            Self::Voxel if !(parameter.is_finite() && parameter > 0.0) => {
                Err(DecimationError::InvalidVoxelSize(parameter))
            }
            Self::Uniform if !(parameter.is_finite() && parameter >= 1.0) => {
                Err(DecimationError::InvalidStride(parameter))
            }
            Self::Random if !(parameter > 0.0 && parameter <= 1.0) => {
                Err(DecimationError::InvalidRatio(parameter))
            }
            _ => Ok(()),
        }
    }

    /// `parameter` is the voxel size, the stride or the kept ratio depending on the method.
    pub fn decimator(&self, parameter: f64, seed: Option<u64>) -> Box<dyn PointCloudDecimator> {
        match self {
            Self::Voxel => Box::new(VoxelDecimator {
                voxel_size: parameter,
            }),
            Self::Uniform => Box::new(UniformDecimator { stride: parameter }),
            Self::Random => Box::new(RandomDecimator {
                ratio: parameter,
                seed,
            }),
        }
    }
}

impl fmt::Display for DecimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecimationMethod {
    type Err = DecimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| DecimationError::UnknownMethod(s.to_string()))
    }
}

/// Replaces all points falling in the same cubic cell by their average.
pub struct VoxelDecimator {
    pub voxel_size: f64,
}

#[derive(Default)]
struct VoxelAccumulator {
    position: [f64; 3],
    color: [f64; 3],
    count: usize,
}

impl VoxelAccumulator {
    fn add(&mut self, point: &Point) {
        self.position[0] += point.x;
        self.position[1] += point.y;
        self.position[2] += point.z;
        self.color[0] += point.color.r;
        self.color[1] += point.color.g;
        self.color[2] += point.color.b;
        self.count += 1;
    }

    fn average(&self) -> Point {
        let n = self.count as f64;
        Point {
            x: self.position[0] / n,
            y: self.position[1] / n,
            z: self.position[2] / n,
            color: Color {
                r: self.color[0] / n,
                g: self.color[1] / n,
                b: self.color[2] / n,
            },
        }
    }
}

impl PointCloudDecimator for VoxelDecimator {
    fn decimate(&self, points: &[Point]) -> Result<Vec<Point>, DecimationError> {
        let voxel_size = self.voxel_size;
        DecimationMethod::Voxel.validate_parameter(voxel_size)?;

        // BTreeMap keeps the output order stable between runs
        let mut cells: BTreeMap<(i64, i64, i64), VoxelAccumulator> = BTreeMap::new();
        for point in points {
            let index = self.get_voxel_index(point, voxel_size);
            cells.entry(index).or_default().add(point);
        }

        log::debug!("  Number of cells: {}", cells.len());

        Ok(cells.values().map(VoxelAccumulator::average).collect())
    }
}

impl VoxelDecimator {
    fn get_voxel_index(&self, point: &Point, voxel_size: f64) -> (i64, i64, i64) {
        let x_idx = (point.x / voxel_size).floor() as i64;
        let y_idx = (point.y / voxel_size).floor() as i64;
        let z_idx = (point.z / voxel_size).floor() as i64;
        (x_idx, y_idx, z_idx)
    }
}

/// Keeps every `stride`-th point starting with the first one.
pub struct UniformDecimator {
    pub stride: f64,
}

impl PointCloudDecimator for UniformDecimator {
    fn decimate(&self, points: &[Point]) -> Result<Vec<Point>, DecimationError> {
        DecimationMethod::Uniform.validate_parameter(self.stride)?;
        let every_k_points = self.stride.trunc() as usize;

        Ok(points.iter().step_by(every_k_points).cloned().collect())
    }
}

/// Keeps `floor(n * ratio)` points drawn without replacement, in input order.
pub struct RandomDecimator {
    pub ratio: f64,
    pub seed: Option<u64>,
}

impl PointCloudDecimator for RandomDecimator {
    fn decimate(&self, points: &[Point]) -> Result<Vec<Point>, DecimationError> {
        DecimationMethod::Random.validate_parameter(self.ratio)?;

        let amount = (points.len() as f64 * self.ratio).floor() as usize;
        if amount == 0 && !points.is_empty() {
            return Err(DecimationError::NothingKept {
                points: points.len(),
                ratio: self.ratio,
            });
        }
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut indices = sample(&mut rng, points.len(), amount).into_vec();
        indices.sort_unstable();

        Ok(indices.into_iter().map(|i| points[i].clone()).collect())
    }
}
