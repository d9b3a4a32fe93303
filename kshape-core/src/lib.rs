//! K-Shape Core: economic series retrieval and the K-shaped economy index pipeline.
//!
//! This crate contains:
//! - Series providers (FRED fredgraph CSV, local CSV directory, in-memory)
//! - An explicit series cache with `reset()`
//! - A date-indexed wide table with `NaN` as the missing marker
//! - Pipeline stages: merge, month-end alignment, derived series, rebasing,
//!   composite indices (`K_UPPER`, `K_LOWER`)
//! - Best-effort `Outcome` results carrying `PipelineWarning`s
//! - CSV/Parquet export and run fingerprints

pub mod config;
pub mod data;
pub mod export;
pub mod fingerprint;
pub mod outcome;
pub mod pipeline;
pub mod table;

pub use config::{PipelineConfig, ScheduleStep, SeriesSpec};
pub use outcome::{Outcome, PipelineWarning};
pub use pipeline::{run_pipeline, PipelineOutput};
pub use table::Table;
