use crate::model::advice::{AdviceError, AdviceRequest, AdviceTarget};
use crate::model::catalog::Region;

pub enum EngineCommand {
    GenerateAdvice(AdviceRequest),
    LoadMapImage { region: Region, source: String },
    Shutdown,
}

/// RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

pub enum EngineResponse {
    AdviceReady {
        target: AdviceTarget,
        outcome: Result<String, AdviceError>,
    },
    MapImageLoaded {
        region: Region,
        source: String,
        image: Result<DecodedImage, String>,
    },
}
