use std::path::{Path, PathBuf};

use thiserror::Error;

use pcd_core::pointcloud::point::PointCloud;

pub mod las;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported extension {extension:?} for {path}")]
    UnsupportedExtension { path: PathBuf, extension: String },
    #[error("LAS error: {0}")]
    Las(#[from] ::las::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait ParserProvider {
    fn get_parser(&self, path: &Path) -> Result<Box<dyn Parser>, ParseError>;
}

pub trait Parser {
    fn parse(&self) -> Result<PointCloud, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Las,
    Laz,
}

pub fn get_extension(path: &Path) -> Result<Extension, ParseError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "las" => Ok(Extension::Las),
        "laz" => Ok(Extension::Laz),
        _ => Err(ParseError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension,
        }),
    }
}
