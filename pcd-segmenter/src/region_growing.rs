use std::collections::VecDeque;

use crate::{
    io::{write_color_raster, write_label_raster},
    model::ModelCheckpoint,
    raster::{ChannelLayout, ColorRaster, LabelRaster, COLOR_CHANNELS},
    segmenter::{OutputPaths, SegmentError, Segmentation, Segmenter},
    view::View,
};

/// Upper bound on raster cells.
pub const MAX_CELLS: u64 = 1 << 25;

// 4-connected neighbours
const NEIGHBORS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Rasterizes the view into square cells, then grows 4-connected regions of
/// cells whose mean color stays within `color_tolerance` of the region seed.
pub struct RegionGrowingSegmenter {
    pub resolution: f64,
    pub color_tolerance: f64,
}

impl RegionGrowingSegmenter {
    pub fn new(
        resolution: f64,
        color_tolerance: f64,
        checkpoint: Option<&ModelCheckpoint>,
    ) -> Self {
        if let Some(checkpoint) = checkpoint {
            log::warn!(
                "checkpoint {:?} ({}) is not loaded by the region-growing segmenter",
                checkpoint.path,
                checkpoint.model_type
            );
        }
        Self {
            resolution,
            color_tolerance,
        }
    }
}

/// Per-cell mean colors of a projected point cloud.
struct Grid {
    width: usize,
    height: usize,
    colors: Vec<Option<[f64; 3]>>,
}

impl Grid {
    fn project(points: &[[f64; 6]], view: &View, resolution: f64) -> Result<Self, SegmentError> {
        if points.is_empty() {
            return Err(SegmentError::EmptyPointCloud);
        }

        let projected: Vec<(f64, f64)> = points.iter().map(|p| view.project(p)).collect();
        let (mut min_u, mut max_u) = (f64::MAX, f64::MIN);
        let (mut min_v, mut max_v) = (f64::MAX, f64::MIN);
        for &(u, v) in &projected {
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        // checked in f64, before any integer cast
        let width = ((max_u - min_u) / resolution).floor() + 1.0;
        let height = ((max_v - min_v) / resolution).floor() + 1.0;
        if !(width.is_finite() && height.is_finite()) || width * height > MAX_CELLS as f64 {
            return Err(SegmentError::RasterTooLarge { width, height });
        }
        let (width, height) = (width as usize, height as usize);

        let mut sums = vec![[0.0f64; 3]; width * height];
        let mut counts = vec![0usize; width * height];
        for (point, &(u, v)) in points.iter().zip(&projected) {
            let col = (((u - min_u) / resolution).floor() as usize).min(width - 1);
            let row = (((max_v - v) / resolution).floor() as usize).min(height - 1);
            let idx = row * width + col;
            sums[idx][0] += point[3];
            sums[idx][1] += point[4];
            sums[idx][2] += point[5];
            counts[idx] += 1;
        }

        let colors = sums
            .into_iter()
            .zip(counts)
            .map(|(sum, count)| {
                (count > 0).then(|| {
                    let n = count as f64;
                    [sum[0] / n, sum[1] / n, sum[2] / n]
                })
            })
            .collect();

        Ok(Self {
            width,
            height,
            colors,
        })
    }

    fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let row = (idx / self.width) as i64;
        let col = (idx % self.width) as i64;
        NEIGHBORS.iter().filter_map(move |&(dr, dc)| {
            let (nr, nc) = (row + dr, col + dc);
            if nr < 0 || nc < 0 || nr >= self.height as i64 || nc >= self.width as i64 {
                return None;
            }
            Some(nr as usize * self.width + nc as usize)
        })
    }

    fn grow_regions(&self, color_tolerance: f64) -> Vec<u32> {
        let mut labels = vec![0u32; self.colors.len()];
        let mut next_label = 1u32;
        let mut queue = VecDeque::new();

        for seed in 0..self.colors.len() {
            let Some(seed_color) = self.colors[seed] else {
                continue;
            };
            if labels[seed] != 0 {
                continue;
            }

            labels[seed] = next_label;
            queue.push_back(seed);
            while let Some(idx) = queue.pop_front() {
                for neighbor in self.neighbors(idx) {
                    if labels[neighbor] != 0 {
                        continue;
                    }
                    let Some(color) = self.colors[neighbor] else {
                        continue;
                    };
                    if color_distance(&seed_color, &color) <= color_tolerance {
                        labels[neighbor] = next_label;
                        queue.push_back(neighbor);
                    }
                }
            }
            next_label += 1;
        }

        labels
    }

    /// Planar RGB render, empty cells black.
    fn render(&self) -> Vec<u8> {
        let plane = self.width * self.height;
        let mut data = vec![0u8; plane * COLOR_CHANNELS];
        for (idx, color) in self.colors.iter().enumerate() {
            if let Some(color) = color {
                for (channel, value) in color.iter().enumerate() {
                    data[channel * plane + idx] = (value * 255.0).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        data
    }
}

fn color_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

impl Segmenter for RegionGrowingSegmenter {
    fn segment(
        &self,
        points: &[[f64; 6]],
        view: &View,
        outputs: &OutputPaths,
    ) -> Result<Segmentation, SegmentError> {
        let grid = Grid::project(points, view, self.resolution)?;
        log::debug!(
            "projected {} points into a {}x{} raster",
            points.len(),
            grid.width,
            grid.height
        );

        let (width, height) = (grid.width as u32, grid.height as u32);
        let labels = LabelRaster::new(width, height, grid.grow_regions(self.color_tolerance));
        let colors = ColorRaster::new(width, height, ChannelLayout::First, grid.render());

        write_color_raster(&outputs.raster, &colors)?;
        write_label_raster(&outputs.labels, &labels)?;

        Ok(Segmentation { labels, colors })
    }
}
