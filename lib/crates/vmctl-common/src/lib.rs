pub mod requests;
pub mod types;

pub use requests::{ErrorBody, NewVm, UpdateCpuRam, UpdateStorage};
pub use types::*;
