use pcd_parser::parsers::ParserProvider;
use pcd_segmenter::Segmenter;

use crate::{
    config::{FailurePolicy, RunConfig},
    error::RunError,
    processor::FileProcessor,
    queue::{build_queue, list_pointcloud_files},
    result_dir::{prepare_result_dir, Prompt},
    summary::RunSummary,
};

/// Drives one batch: prepares the result folder, then loads, segments and
/// counts every queued point cloud in order.
pub struct SegmentationRunner<'a> {
    parsers: &'a dyn ParserProvider,
    segmenter: &'a dyn Segmenter,
}

impl<'a> SegmentationRunner<'a> {
    pub fn new(parsers: &'a dyn ParserProvider, segmenter: &'a dyn Segmenter) -> Self {
        Self { parsers, segmenter }
    }

    pub fn execute(
        &self,
        config: &RunConfig,
        prompt: &mut dyn Prompt,
    ) -> Result<RunSummary, RunError> {
        let mode = prepare_result_dir(&config.result_dir, config.clear_policy, prompt).map_err(
            |source| RunError::ResultDir {
                path: config.result_dir.clone(),
                source,
            },
        )?;
        log::debug!("run mode: {:?}", mode);

        let files = list_pointcloud_files(&config.pointclouds_folder, &config.pattern).map_err(
            |source| RunError::Enumerate {
                path: config.pointclouds_folder.clone(),
                source,
            },
        )?;
        log::info!("find {} pointclouds files", files.len());
        let mut queue = build_queue(files);

        let processor = FileProcessor::new(config, self.parsers, self.segmenter);
        let mut summary = RunSummary::default();

        while let Some(item) = queue.pop_front() {
            log::info!("processing {:?}...", item.path);
            match processor.process(&item, mode) {
                Ok(processed) => {
                    log::debug!(
                        "{:?}: {}x{} raster",
                        item.path,
                        processed.colors.width,
                        processed.colors.height
                    );
                    summary.insert(item.path, processed.segment_count());
                }
                Err(err)
                    if err.is_input_error() && config.failure_policy == FailurePolicy::Continue =>
                {
                    log::error!("{}, skipping", err);
                    summary.record_failure(item.path, err.to_string());
                }
                Err(err) => return Err(err),
            }
        }

        log::info!(
            "All files have been processed in {:?}",
            config.result_dir
        );
        Ok(summary)
    }
}
