//! TIFF persistence of segmentation rasters.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use image::{ImageFormat, RgbImage};
use tiff::{
    decoder::{Decoder, DecodingResult},
    encoder::{colortype::Gray32, TiffEncoder},
};

use crate::{
    raster::{ChannelLayout, ColorRaster, LabelRaster},
    segmenter::SegmentError,
};

pub fn write_color_raster(path: &Path, raster: &ColorRaster) -> Result<(), SegmentError> {
    let raster = raster.to_channel_last();
    let image = RgbImage::from_raw(raster.width, raster.height, raster.data).ok_or(
        SegmentError::RasterShape {
            width: raster.width,
            height: raster.height,
        },
    )?;
    image.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Labels are stored as 32-bit grayscale.
pub fn write_label_raster(path: &Path, raster: &LabelRaster) -> Result<(), SegmentError> {
    if raster.data.len() != raster.width as usize * raster.height as usize {
        return Err(SegmentError::RasterShape {
            width: raster.width,
            height: raster.height,
        });
    }

    let mut encoder = TiffEncoder::new(BufWriter::new(File::create(path)?))?;
    encoder.write_image::<Gray32>(raster.width, raster.height, &raster.data)?;
    Ok(())
}

pub fn read_color_raster(path: &Path) -> Result<ColorRaster, SegmentError> {
    let image = image::open(path)?.into_rgb8();
    Ok(ColorRaster::new(
        image.width(),
        image.height(),
        ChannelLayout::Last,
        image.into_raw(),
    ))
}

/// Also accepts 8 and 16-bit label images.
pub fn read_label_raster(path: &Path) -> Result<LabelRaster, SegmentError> {
    let mut decoder = Decoder::new(BufReader::new(File::open(path)?))?;
    let (width, height) = decoder.dimensions()?;
    let data = match decoder.read_image()? {
        DecodingResult::U32(data) => data,
        DecodingResult::U16(data) => data.into_iter().map(u32::from).collect(),
        DecodingResult::U8(data) => data.into_iter().map(u32::from).collect(),
        _ => return Err(SegmentError::LabelFormat(path.to_path_buf())),
    };
    if data.len() != width as usize * height as usize {
        return Err(SegmentError::LabelFormat(path.to_path_buf()));
    }
    Ok(LabelRaster::new(width, height, data))
}
