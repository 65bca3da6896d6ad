pub mod io;
pub mod model;
pub mod raster;
pub mod region_growing;
pub mod segmenter;
pub mod view;

pub use model::{ModelCheckpoint, ModelType, UnknownModelType};
pub use raster::{ChannelLayout, ColorRaster, LabelRaster};
pub use region_growing::RegionGrowingSegmenter;
pub use segmenter::{OutputPaths, SegmentError, Segmentation, Segmenter};
pub use view::View;
