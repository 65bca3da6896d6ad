use std::path::PathBuf;

use glob::Pattern;

use pcd_core::pointcloud::decimation::DecimationMethod;
use pcd_segmenter::{ModelCheckpoint, ModelType};

use crate::error::ConfigError;

/// What to do when the result folder already holds files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearPolicy {
    /// Delete existing outputs and recompute everything.
    ForceClear,
    /// Keep existing outputs and read them back instead of recomputing.
    ForceSkip,
    /// Ask the operator, `y` clears.
    Interactive,
}

/// What to do when one input file cannot be loaded or downsampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    Abort,
    Continue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subsampling {
    pub method: DecimationMethod,
    pub parameter: f64,
    pub seed: Option<u64>,
}

/// Raw, unvalidated options as given on the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pointclouds_folder: PathBuf,
    pub result_folder: PathBuf,
    pub result_name: String,
    pub model_path: Option<PathBuf>,
    pub model_type: Option<String>,
    pub resolution: f64,
    pub color_tolerance: f64,
    /// Disabled when not positive.
    pub subsampling: f64,
    pub subsampling_method: String,
    pub seed: Option<u64>,
    pub pattern: String,
    pub clear_policy: ClearPolicy,
    pub failure_policy: FailurePolicy,
}

impl RunOptions {
    pub fn new(pointclouds_folder: impl Into<PathBuf>, result_folder: impl Into<PathBuf>) -> Self {
        Self {
            pointclouds_folder: pointclouds_folder.into(),
            result_folder: result_folder.into(),
            result_name: "results".to_string(),
            model_path: None,
            model_type: None,
            resolution: 0.25,
            color_tolerance: 0.1,
            subsampling: -1.0,
            subsampling_method: DecimationMethod::Voxel.to_string(),
            seed: None,
            pattern: "*".to_string(),
            clear_policy: ClearPolicy::Interactive,
            failure_policy: FailurePolicy::Abort,
        }
    }

    /// Checks every option without touching the result folder.
    pub fn validate(self) -> Result<RunConfig, ConfigError> {
        let model_type = self
            .model_type
            .as_deref()
            .map(str::parse::<ModelType>)
            .transpose()?;

        let checkpoint = match self.model_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::ModelNotFound(path));
                }
                let model_type = match model_type {
                    Some(model_type) => model_type,
                    None => {
                        log::debug!("model type not given, inferring it from the checkpoint path");
                        let inferred = ModelType::infer_from_path(&path)
                            .ok_or_else(|| ConfigError::ModelTypeNotFound(path.clone()))?;
                        log::info!("model type found is {}", inferred);
                        inferred
                    }
                };
                Some(ModelCheckpoint { path, model_type })
            }
            None => {
                if let Some(model_type) = model_type {
                    log::warn!("model type {} given without --model-path, ignored", model_type);
                }
                None
            }
        };

        let method: DecimationMethod = self
            .subsampling_method
            .parse()
            .map_err(|_| ConfigError::InvalidSubsamplingMethod(self.subsampling_method.clone()))?;

        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(ConfigError::InvalidResolution(self.resolution));
        }

        if !(self.color_tolerance.is_finite() && self.color_tolerance >= 0.0) {
            return Err(ConfigError::InvalidColorTolerance(self.color_tolerance));
        }

        if self.subsampling > 0.0 {
            method
                .validate_parameter(self.subsampling)
                .map_err(ConfigError::InvalidSubsamplingParameter)?;
        }

        let pattern = Pattern::new(&self.pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: self.pattern.clone(),
            source,
        })?;

        if !self.pointclouds_folder.is_dir() {
            return Err(ConfigError::PointcloudsFolderNotFound(
                self.pointclouds_folder,
            ));
        }

        let subsampling = (self.subsampling > 0.0).then_some(Subsampling {
            method,
            parameter: self.subsampling,
            seed: self.seed,
        });

        Ok(RunConfig {
            result_dir: self.result_folder.join(&self.result_name),
            pointclouds_folder: self.pointclouds_folder,
            checkpoint,
            resolution: self.resolution,
            color_tolerance: self.color_tolerance,
            subsampling,
            pattern,
            clear_policy: self.clear_policy,
            failure_policy: self.failure_policy,
        })
    }
}

/// Validated configuration of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pointclouds_folder: PathBuf,
    /// `<result_folder>/<result_name>`
    pub result_dir: PathBuf,
    pub checkpoint: Option<ModelCheckpoint>,
    pub resolution: f64,
    pub color_tolerance: f64,
    pub subsampling: Option<Subsampling>,
    pub pattern: Pattern,
    pub clear_policy: ClearPolicy,
    pub failure_policy: FailurePolicy,
}
