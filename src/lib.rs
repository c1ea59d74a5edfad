pub mod error;
pub mod metrics;
pub mod model;
pub mod parsing;

pub use error::{ElmError, Result};
pub use model::elm::{Elm, ElmConfig, DEFAULT_HIDDEN_LAYER_SIZE};
pub use model::Model;
pub use parsing::Dataset;
