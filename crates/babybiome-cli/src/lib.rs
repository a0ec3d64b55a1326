//! Library side of the babybiome CLI: logging, pipeline stages and outputs.

pub mod logging;
pub mod output;
pub mod pipeline;
pub mod report;
