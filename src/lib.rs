pub mod chart;
pub mod config;
pub mod error;
pub mod metas;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod records;
pub mod source;
