pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, dialect::Dialect, CliConfig};
pub use core::{etl::EtlEngine, pipeline::ExportPipeline, uuid_map::UuidMap};
pub use utils::error::{ExportError, Result};
