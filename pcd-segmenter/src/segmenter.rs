use std::path::PathBuf;

use thiserror::Error;

use crate::{
    raster::{ColorRaster, LabelRaster},
    view::View,
};

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("cannot segment an empty point cloud")]
    EmptyPointCloud,
    #[error("point cloud extent gives a {width:.0}x{height:.0} raster, resolution is too fine")]
    RasterTooLarge { width: f64, height: f64 },
    #[error("raster buffer does not match {width}x{height}")]
    RasterShape { width: u32, height: u32 },
    #[error("label image {0:?} is not single-channel unsigned integer")]
    LabelFormat(PathBuf),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("tiff error: {0}")]
    Tiff(#[from] tiff::TiffError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Files a segmenter writes for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub raster: PathBuf,
    pub labels: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Segmentation {
    pub labels: LabelRaster,
    /// Channel-first, as produced by the segmenter.
    pub colors: ColorRaster,
}

pub trait Segmenter {
    /// Segments `[x, y, z, r, g, b]` rows seen through `view` and writes both
    /// rasters to `outputs`.
    fn segment(
        &self,
        points: &[[f64; 6]],
        view: &View,
        outputs: &OutputPaths,
    ) -> Result<Segmentation, SegmentError>;
}
