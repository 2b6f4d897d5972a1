//! State module for pipeline outcomes
//!
//! # Components
//!
//! - `ErrorKind`: the error taxonomy every stage reports failures with
//! - `PipelineStatus`, `ScrapingStatus`, `CurationStatus`: lifecycle of a run and its stages
//! - `StrategyUsed`, `CurationMode`: how content and metadata were obtained
//! - `Category`: the fixed categories curation files a URL under

mod category;
mod error_kind;
mod status;

pub use category::Category;
pub use error_kind::ErrorKind;
pub use status::{CurationMode, CurationStatus, PipelineStatus, ScrapingStatus, StrategyUsed};
