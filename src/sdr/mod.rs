pub mod device;
pub mod reader;

pub use device::{open_default, NullSdr, ReadOutcome, SdrDevice, SyntheticSdr};
pub use reader::{Counters, Reader};
