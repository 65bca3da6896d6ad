/// RGB color with every channel normalized to `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Builds a color from raw LAS channels divided by `max_value`.
    pub fn from_raw(r: u16, g: u16, b: u16, max_value: f64) -> Self {
        Self {
            r: (r as f64 / max_value).clamp(0.0, 1.0),
            g: (g as f64 / max_value).clamp(0.0, 1.0),
            b: (b as f64 / max_value).clamp(0.0, 1.0),
        }
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.r * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.g * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.b * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub color: Color,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64, color: Color) -> Self {
        Self { x, y, z, color }
    }

    /// Positions followed by colors, one row of the numeric array handed to a segmenter.
    pub fn to_numeric(&self) -> [f64; 6] {
        [
            self.x,
            self.y,
            self.z,
            self.color.r,
            self.color.g,
            self.color.b,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub points: Vec<Point>,
    pub metadata: Metadata,
}

impl PointCloud {
    pub fn new(points: Vec<Point>) -> Self {
        let mut bounding_volume = BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        };

        for point in &points {
            bounding_volume.max[0] = bounding_volume.max[0].max(point.x);
            bounding_volume.max[1] = bounding_volume.max[1].max(point.y);
            bounding_volume.max[2] = bounding_volume.max[2].max(point.z);
            bounding_volume.min[0] = bounding_volume.min[0].min(point.x);
            bounding_volume.min[1] = bounding_volume.min[1].min(point.y);
            bounding_volume.min[2] = bounding_volume.min[2].min(point.z);
        }

        let metadata = Metadata {
            point_count: points.len(),
            bounding_volume,
        };

        PointCloud { points, metadata }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64, &Point)> {
        self.points
            .iter()
            .map(|point| (point.x, point.y, point.z, point))
    }

    /// One `[x, y, z, r, g, b]` row per point, in point order.
    pub fn to_numeric(&self) -> Vec<[f64; 6]> {
        self.points.iter().map(Point::to_numeric).collect()
    }
}

// Stays at the f64::MAX / f64::MIN sentinels for an empty cloud.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
    pub point_count: usize,
    pub bounding_volume: BoundingVolume,
}
