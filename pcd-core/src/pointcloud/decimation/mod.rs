pub mod decimator;

pub use decimator::{
    DecimationError, DecimationMethod, PointCloudDecimator, RandomDecimator, UniformDecimator,
    VoxelDecimator,
};
