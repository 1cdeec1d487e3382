pub mod pipelines;

pub use pipelines::{CreateError, PipelineRepository};
