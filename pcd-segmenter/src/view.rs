/// Camera used to flatten a point cloud into a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Looking straight down the z axis, north (max y) at the top.
    #[default]
    Top,
}

impl View {
    /// Image-plane coordinates of a `[x, y, z, r, g, b]` row.
    pub fn project(&self, point: &[f64; 6]) -> (f64, f64) {
        match self {
            View::Top => (point[0], point[1]),
        }
    }
}
