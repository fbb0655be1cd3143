//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod llm;
pub mod storage;
pub mod transcoder;
pub mod tts;

mod openai_error;

pub use llm::*;
pub use storage::*;
pub use transcoder::*;
pub use tts::*;
