use std::path::Path;

use pcd_core::pointcloud::{decimation::PointCloudDecimator, point::PointCloud};
use pcd_parser::parsers::ParserProvider;
use pcd_segmenter::{
    io::{read_color_raster, read_label_raster},
    ColorRaster, LabelRaster, OutputPaths, Segmenter, View,
};

use crate::{
    config::{RunConfig, Subsampling},
    error::RunError,
    queue::WorkItem,
    result_dir::RunMode,
};

/// Path separators replaced by underscores, so an input path becomes a flat file name.
pub fn sanitize(path: &Path) -> String {
    path.to_string_lossy().replace(['/', '\\'], "_")
}

pub fn output_paths(result_dir: &Path, input: &Path) -> OutputPaths {
    let name = sanitize(input);
    OutputPaths {
        raster: result_dir.join(format!("raster_{}.tif", name)),
        labels: result_dir.join(format!("label_{}.tif", name)),
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub labels: LabelRaster,
    /// Channel-last.
    pub colors: ColorRaster,
}

impl ProcessedFile {
    pub fn segment_count(&self) -> u32 {
        self.labels.max_label()
    }
}

pub struct FileProcessor<'a> {
    parsers: &'a dyn ParserProvider,
    segmenter: &'a dyn Segmenter,
    result_dir: &'a Path,
    decimation: Option<(&'a Subsampling, Box<dyn PointCloudDecimator>)>,
    view: View,
}

impl<'a> FileProcessor<'a> {
    pub fn new(
        config: &'a RunConfig,
        parsers: &'a dyn ParserProvider,
        segmenter: &'a dyn Segmenter,
    ) -> Self {
        let decimation = config.subsampling.as_ref().map(|subsampling| {
            let decimator = subsampling
                .method
                .decimator(subsampling.parameter, subsampling.seed);
            (subsampling, decimator)
        });

        Self {
            parsers,
            segmenter,
            result_dir: &config.result_dir,
            decimation,
            view: View::Top,
        }
    }

    pub fn process(&self, item: &WorkItem, mode: RunMode) -> Result<ProcessedFile, RunError> {
        match mode {
            RunMode::Compute => self.compute(item),
            RunMode::Recover => self.recover(item),
        }
    }

    fn compute(&self, item: &WorkItem) -> Result<ProcessedFile, RunError> {
        let path = &item.path;
        let load_error = |source| RunError::Load {
            path: path.clone(),
            source,
        };

        let start = std::time::Instant::now();
        let parser = self.parsers.get_parser(path).map_err(load_error)?;
        let mut point_cloud = parser.parse().map_err(load_error)?;
        log::debug!(
            "loaded {} points from {:?} in {:?}",
            point_cloud.len(),
            path,
            start.elapsed()
        );

        if let Some((subsampling, decimator)) = &self.decimation {
            log::info!(
                "downsampling to {} (method: {})",
                subsampling.parameter,
                subsampling.method
            );
            let points =
                decimator
                    .decimate(&point_cloud.points)
                    .map_err(|source| RunError::Decimation {
                        path: path.clone(),
                        source,
                    })?;
            log::debug!(
                "downsampled {} -> {} points",
                point_cloud.len(),
                points.len()
            );
            point_cloud = PointCloud::new(points);
        }

        let outputs = output_paths(self.result_dir, path);
        let start = std::time::Instant::now();
        let segmentation = self
            .segmenter
            .segment(&point_cloud.to_numeric(), &self.view, &outputs)
            .map_err(|source| RunError::Segmentation {
                path: path.clone(),
                source,
            })?;
        log::debug!("segmented {:?} in {:?}", path, start.elapsed());

        Ok(ProcessedFile {
            labels: segmentation.labels,
            colors: segmentation.colors.to_channel_last(),
        })
    }

    fn recover(&self, item: &WorkItem) -> Result<ProcessedFile, RunError> {
        let outputs = output_paths(self.result_dir, &item.path);
        let recover_error = |source| RunError::Recover {
            path: item.path.clone(),
            source,
        };

        log::debug!("reading previous results {:?}", outputs.labels);
        let labels = read_label_raster(&outputs.labels).map_err(recover_error)?;
        let colors = read_color_raster(&outputs.raster).map_err(recover_error)?;

        Ok(ProcessedFile { labels, colors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn output_names_flatten_the_input_path() {
        let paths = output_paths(Path::new("out/results"), Path::new("data/clouds/a.las"));
        assert_eq!(
            paths.raster,
            PathBuf::from("out/results/raster_data_clouds_a.las.tif")
        );
        assert_eq!(
            paths.labels,
            PathBuf::from("out/results/label_data_clouds_a.las.tif")
        );
    }

    #[test]
    fn sanitize_handles_both_separators() {
        assert_eq!(sanitize(Path::new("a\\b/c.las")), "a_b_c.las");
    }
}
