pub mod etl;
pub mod mapper;
pub mod pipeline;
pub mod uuid_map;

pub use crate::domain::model::{
    DuplicateIdPolicy, Epd, MissingColumnPolicy, SourceRow, SourceTable, TransformResult,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
