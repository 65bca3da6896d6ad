use std::{io, path::PathBuf};

use thiserror::Error;

use pcd_core::pointcloud::decimation::DecimationError;
use pcd_parser::parsers::ParseError;
use pcd_segmenter::{SegmentError, UnknownModelType};

/// Problems found while validating options, before anything touches the result folder.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidModelType(#[from] UnknownModelType),
    #[error("the path to the model {0:?} does not exist")]
    ModelNotFound(PathBuf),
    #[error(
        "model type has not been found in {0:?}, please add the argument --model-type \
         with the corresponding model (vit_h, vit_b, vit_l)"
    )]
    ModelTypeNotFound(PathBuf),
    #[error("subsampling method {0} is not valid, should be random, voxel or uniform")]
    InvalidSubsamplingMethod(String),
    #[error("invalid subsampling parameter: {0}")]
    InvalidSubsamplingParameter(#[source] DecimationError),
    #[error("resolution must be a positive number, got {0}")]
    InvalidResolution(f64),
    #[error("color tolerance must be a finite non-negative number, got {0}")]
    InvalidColorTolerance(f64),
    #[error("invalid file pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("point cloud folder {0:?} does not exist")]
    PointcloudsFolderNotFound(PathBuf),
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to prepare result folder {path:?}: {source}")]
    ResultDir { path: PathBuf, source: io::Error },
    #[error("failed to list point clouds in {path:?}: {source}")]
    Enumerate { path: PathBuf, source: io::Error },
    #[error("failed to load {path:?}: {source}")]
    Load { path: PathBuf, source: ParseError },
    #[error("exception raised when downsampling {path:?}: {source}")]
    Decimation {
        path: PathBuf,
        source: DecimationError,
    },
    #[error("segmentation of {path:?} failed: {source}")]
    Segmentation { path: PathBuf, source: SegmentError },
    #[error("cannot recover previous results for {path:?}: {source}")]
    Recover { path: PathBuf, source: SegmentError },
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Config(_) => 2,
            RunError::ResultDir { .. } | RunError::Enumerate { .. } => 3,
            RunError::Load { .. } => 4,
            RunError::Decimation { .. } => 5,
            RunError::Segmentation { .. } => 6,
            RunError::Recover { .. } => 7,
        }
    }

    /// Errors caused by one bad input file, which the continue policy may skip.
    pub fn is_input_error(&self) -> bool {
        matches!(self, RunError::Load { .. } | RunError::Decimation { .. })
    }
}
