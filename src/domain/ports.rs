use crate::domain::model::{DuplicateIdPolicy, MissingColumnPolicy, SourceTable, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Output sink for exported declarations, one file per record.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn uuid_map_path(&self) -> Option<&str>;
    fn duplicate_id_policy(&self) -> DuplicateIdPolicy;
    fn missing_column_policy(&self) -> MissingColumnPolicy;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceTable>;
    async fn transform(&self, table: SourceTable) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
