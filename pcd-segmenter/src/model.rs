use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("model type {0} is not valid, should be vit_b, vit_h or vit_l")]
pub struct UnknownModelType(pub String);

/// Backbone size of a Segment Anything checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    VitB,
    VitH,
    VitL,
}

impl ModelType {
    /// Order in which inference tries the names against a checkpoint path.
    pub const ALL: [ModelType; 3] = [Self::VitB, Self::VitH, Self::VitL];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VitB => "vit_b",
            Self::VitH => "vit_h",
            Self::VitL => "vit_l",
        }
    }

    /// Guesses the type from the checkpoint file path, e.g. `sam_vit_h_4b8939.pth`.
    pub fn infer_from_path(path: &Path) -> Option<ModelType> {
        let path = path.to_string_lossy();
        Self::ALL
            .into_iter()
            .find(|model_type| path.contains(model_type.as_str()))
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = UnknownModelType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model_type| model_type.as_str() == s)
            .ok_or_else(|| UnknownModelType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCheckpoint {
    pub path: PathBuf,
    pub model_type: ModelType,
}
