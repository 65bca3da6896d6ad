use std::io::{self, BufRead as _, Write};
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;
use thiserror::Error;

use pcd_parser::parsers::las::LasParserProvider;
use pcd_pipeline::{
    ClearPolicy, FailurePolicy, Prompt, RunError, RunOptions, RunSummary, SegmentationRunner,
};
use pcd_segmenter::RegionGrowingSegmenter;

#[derive(Parser, Debug)]
#[command(
    name = "LiSAM",
    about = "Generate segmentation from point clouds",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    /// Folder containing the LAS/LAZ files
    #[arg(value_name = "POINTCLOUDS_FOLDER")]
    pointclouds_folder: PathBuf,

    /// Folder receiving the result folder
    #[arg(value_name = "RESULT_FOLDER")]
    result_folder: PathBuf,

    #[arg(short = 'n', long, visible_alias = "name", default_value = "results")]
    result_name: String,

    #[arg(long, visible_alias = "debug", default_value = "info")]
    log_level: LevelFilter,

    /// Reuse existing results without asking
    #[arg(long, conflicts_with = "confirm")]
    no_confirm: bool,

    /// Delete existing results without asking
    #[arg(long)]
    confirm: bool,

    #[arg(long, visible_alias = "model", value_name = "FILE")]
    model_path: Option<PathBuf>,

    /// vit_b, vit_h or vit_l, guessed from --model-path when omitted
    #[arg(long)]
    model_type: Option<String>,

    /// Raster cell size, in point cloud units
    #[arg(long, default_value_t = 0.25)]
    resolution: f64,

    /// Voxel size, stride or kept ratio depending on the method; disabled when not positive
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    subsampling: f64,

    /// voxel, uniform or random
    #[arg(long, default_value = "voxel")]
    subsampling_method: String,

    #[arg(long)]
    seed: Option<u64>,

    /// Maximum color distance between cells of one segment
    #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
    color_tolerance: f64,

    /// Only process files whose name matches this glob
    #[arg(long, default_value = "*")]
    pattern: String,

    #[arg(long, value_enum, default_value_t = OnError::Abort)]
    on_error: OnError,

    #[arg(long, value_name = "FILE")]
    summary_json: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OnError {
    Abort,
    Continue,
}

impl Cli {
    fn clear_policy(&self) -> ClearPolicy {
        if self.confirm {
            ClearPolicy::ForceClear
        } else if self.no_confirm {
            ClearPolicy::ForceSkip
        } else {
            ClearPolicy::Interactive
        }
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            pointclouds_folder: self.pointclouds_folder.clone(),
            result_folder: self.result_folder.clone(),
            result_name: self.result_name.clone(),
            model_path: self.model_path.clone(),
            model_type: self.model_type.clone(),
            resolution: self.resolution,
            color_tolerance: self.color_tolerance,
            subsampling: self.subsampling,
            subsampling_method: self.subsampling_method.clone(),
            seed: self.seed,
            pattern: self.pattern.clone(),
            clear_policy: self.clear_policy(),
            failure_policy: match self.on_error {
                OnError::Abort => FailurePolicy::Abort,
                OnError::Continue => FailurePolicy::Continue,
            },
        }
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("failed to write summary {path:?}: {source}")]
    Summary { path: PathBuf, source: io::Error },
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Run(err) => err.exit_code(),
            AppError::Summary { .. } => 8,
        }
    }
}

struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        log::warn!("{}", question);
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer)
    }
}

fn log_summary(summary: &RunSummary) {
    log::info!("Masks count by PCL file");
    for (path, count) in summary.iter() {
        log::info!("|> {} => {} masks found", path.display(), count);
    }
    for failure in &summary.failures {
        log::warn!("|> {} skipped: {}", failure.path.display(), failure.error);
    }
}

fn run(args: &Cli) -> Result<(), AppError> {
    let config = args.run_options().validate().map_err(RunError::from)?;

    let segmenter = RegionGrowingSegmenter::new(
        config.resolution,
        config.color_tolerance,
        config.checkpoint.as_ref(),
    );
    let runner = SegmentationRunner::new(&LasParserProvider, &segmenter);

    log::info!("start processing...");
    let start_local = std::time::Instant::now();
    let summary = runner.execute(&config, &mut StdinPrompt)?;
    log::info!("finish processing in {:?}", start_local.elapsed());

    log_summary(&summary);

    if let Some(path) = &args.summary_json {
        log::info!("write summary: {:?}", path);
        summary
            .write_json(path)
            .map_err(|source| AppError::Summary {
                path: path.clone(),
                source,
            })?;
    }

    Ok(())
}

fn main() {
    let args = Cli::parse();

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, args.log_level)
        .init();

    log::info!("input folder: {:?}", args.pointclouds_folder);
    log::info!(
        "result folder: {:?}",
        args.result_folder.join(&args.result_name)
    );
    log::info!("resolution: {}", args.resolution);

    let start = std::time::Instant::now();
    if let Err(err) = run(&args) {
        log::error!("{}", err);
        std::process::exit(err.exit_code());
    }
    log::info!("Elapsed: {:?}", start.elapsed());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("lisam").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let cli = parse(&["clouds", "out"]).unwrap();
        let options = cli.run_options();

        assert_eq!(options.result_name, "results");
        assert_eq!(options.resolution, 0.25);
        assert_eq!(options.color_tolerance, 0.1);
        assert_eq!(options.subsampling, -1.0);
        assert_eq!(options.subsampling_method, "voxel");
        assert_eq!(options.clear_policy, ClearPolicy::Interactive);
        assert_eq!(options.failure_policy, FailurePolicy::Abort);
        assert_eq!(cli.log_level, LevelFilter::Info);
    }

    #[test]
    fn confirm_flags_select_policy() {
        let cli = parse(&["clouds", "out", "--confirm"]).unwrap();
        assert_eq!(cli.clear_policy(), ClearPolicy::ForceClear);

        let cli = parse(&["clouds", "out", "--no-confirm"]).unwrap();
        assert_eq!(cli.clear_policy(), ClearPolicy::ForceSkip);

        assert!(parse(&["clouds", "out", "--confirm", "--no-confirm"]).is_err());
    }

    #[test]
    fn aliases_and_negative_subsampling() {
        let cli = parse(&[
            "clouds",
            "out",
            "--name",
            "run1",
            "--model",
            "sam_vit_b.pth",
            "--subsampling",
            "-2",
            "--on-error",
            "continue",
            "--debug",
            "debug",
        ])
        .unwrap();
        let options = cli.run_options();

        assert_eq!(options.result_name, "run1");
        assert_eq!(options.model_path, Some(PathBuf::from("sam_vit_b.pth")));
        assert_eq!(options.subsampling, -2.0);
        assert_eq!(options.failure_policy, FailurePolicy::Continue);
        assert_eq!(cli.log_level, LevelFilter::Debug);
    }
}
