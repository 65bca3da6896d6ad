use std::path::{Path, PathBuf};

use las::Reader;
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};

use pcd_core::pointcloud::point::{Color, Point, PointCloud};

use super::{get_extension, ParseError, Parser, ParserProvider};

/// Largest raw channel value still read as 8-bit color.
pub static EIGHT_BIT_MAX: u16 = 255;

pub struct LasParserProvider;

impl ParserProvider for LasParserProvider {
    fn get_parser(&self, path: &Path) -> Result<Box<dyn Parser>, ParseError> {
        get_extension(path)?;
        Ok(Box::new(LasParser {
            filename: path.to_path_buf(),
        }))
    }
}

pub struct LasParser {
    pub filename: PathBuf,
}

impl Parser for LasParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        let start = std::time::Instant::now();
        let mut reader = Reader::from_path(&self.filename)?;
        let las_points = reader.points().collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "read {} LAS points from {:?} in {:?}",
            las_points.len(),
            self.filename,
            start.elapsed()
        );

        let color_max = color_scale(&las_points);

        let start = std::time::Instant::now();
        let points: Vec<Point> = las_points
            .par_iter()
            .map(|las_point| convert_las_point(las_point, color_max))
            .collect();
        log::debug!("build PointCloud in {:?}", start.elapsed());

        Ok(PointCloud::new(points))
    }
}

/// Divisor normalizing this file's colors: 16-bit files use the full range,
/// files whose channels never exceed 255 are treated as 8-bit.
fn color_scale(las_points: &[las::Point]) -> f64 {
    let max_channel = las_points
        .iter()
        .filter_map(|p| p.color)
        .map(|c| c.red.max(c.green).max(c.blue))
        .max()
        .unwrap_or(0);

    if max_channel > EIGHT_BIT_MAX {
        u16::MAX as f64
    } else {
        EIGHT_BIT_MAX as f64
    }
}

fn convert_las_point(las_point: &las::Point, color_max: f64) -> Point {
    let color = las_point
        .color
        .map(|c| Color::from_raw(c.red, c.green, c.blue, color_max))
        .unwrap_or(Color::WHITE);

    Point {
        x: las_point.x,
        y: las_point.y,
        z: las_point.z,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_las(path: &Path, points: &[(f64, f64, f64, Option<[u16; 3]>)]) {
        let mut builder = las::Builder::from((1, 2));
        builder.point_format = las::point::Format::new(2).unwrap();
        builder.point_format.is_compressed = path.extension().is_some_and(|ext| ext == "laz");
        let header = builder.into_header().unwrap();
        let mut writer = las::Writer::from_path(path, header).unwrap();
        for &(x, y, z, color) in points {
            let point = las::Point {
                x,
                y,
                z,
                color: Some(
                    color
                        .map(|[red, green, blue]| las::Color { red, green, blue })
                        .unwrap_or_default(),
                ),
                ..Default::default()
            };
            writer.write_point(point).unwrap();
        }
        writer.close().unwrap();
    }

    #[test]
    fn parse_eight_bit_colors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cloud.las");
        write_las(
            &path,
            &[
                (1.0, 2.0, 3.0, Some([255, 0, 51])),
                (4.5, 5.5, 6.5, Some([0, 255, 0])),
            ],
        );

        let parser = LasParserProvider.get_parser(&path).unwrap();
        let pc = parser.parse().unwrap();

        assert_eq!(pc.len(), 2);
        assert_eq!(pc.points[0].x, 1.0);
        assert_eq!(pc.points[1].z, 6.5);
        assert_eq!(pc.points[0].color.r, 1.0);
        assert!((pc.points[0].color.b - 0.2).abs() < 1e-9);
        assert_eq!(pc.points[1].color.g, 1.0);
        assert_eq!(pc.metadata.bounding_volume.max, [4.5, 5.5, 6.5]);
    }

    #[test]
    fn parse_sixteen_bit_colors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cloud.las");
        write_las(&path, &[(0.0, 0.0, 0.0, Some([65535, 0, 32768]))]);

        let pc = LasParserProvider.get_parser(&path).unwrap().parse().unwrap();

        assert_eq!(pc.points[0].color.r, 1.0);
        assert_eq!(pc.points[0].color.g, 0.0);
        assert!((pc.points[0].color.b - 0.5).abs() < 1e-4);
    }

    #[test]
    fn parse_compressed_laz() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cloud.laz");
        let points: Vec<_> = (0..50)
            .map(|i| (i as f64, 2.0 * i as f64, 0.5, Some([0, 128, 255])))
            .collect();
        write_las(&path, &points);

        let pc = LasParserProvider.get_parser(&path).unwrap().parse().unwrap();

        assert_eq!(pc.len(), 50);
        assert_eq!(pc.points[49].x, 49.0);
        assert_eq!(pc.points[49].y, 98.0);
        assert_eq!(pc.points[0].color.b, 1.0);
        assert_eq!(pc.metadata.bounding_volume.max, [49.0, 98.0, 0.5]);
    }

    #[test]
    fn provider_rejects_other_extensions() {
        let result = LasParserProvider.get_parser(Path::new("points.csv"));
        assert!(matches!(
            result,
            Err(ParseError::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let parser = LasParserProvider
            .get_parser(&dir.path().join("missing.las"))
            .unwrap();
        assert!(parser.parse().is_err());
    }
}
