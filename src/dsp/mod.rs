pub mod pipeline;
pub mod scale;
pub mod window;

pub use pipeline::{DspPipeline, SpectrumRow, HALF};
pub use scale::TransformMode;
