use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        println!("Starting export...");

        // Extract
        println!("Reading source export...");
        let table = self.pipeline.extract().await?;
        println!("Extracted {} rows", table.rows.len());

        // Transform
        println!("Mapping rows to declarations...");
        let result = self.pipeline.transform(table).await?;
        println!(
            "Mapped {} declarations ({} rows skipped)",
            result.declarations.len(),
            result.skipped_rows
        );

        // Load
        println!("Writing declaration files...");
        let output_path = self.pipeline.load(result).await?;
        println!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SourceRow, SourceTable, TransformResult};
    use crate::utils::error::ExportError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubPipeline {
        rows: usize,
        fail_on_transform: bool,
        load_calls: AtomicUsize,
    }

    impl StubPipeline {
        fn new(rows: usize) -> Self {
            Self {
                rows,
                fail_on_transform: false,
                load_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<SourceTable> {
            Ok(SourceTable {
                header: Vec::new(),
                rows: (0..self.rows)
                    .map(|_| SourceRow::new(HashMap::new()))
                    .collect(),
            })
        }

        async fn transform(&self, table: SourceTable) -> Result<TransformResult> {
            if self.fail_on_transform {
                return Err(ExportError::MissingColumnsError {
                    columns: "Bezug".to_string(),
                });
            }
            Ok(TransformResult {
                declarations: Vec::new(),
                skipped_rows: table.rows.len(),
            })
        }

        async fn load(&self, _result: TransformResult) -> Result<String> {
            self.load_calls.fetch_add(1, Ordering::SeqCst);
            Ok("out".to_string())
        }
    }

    #[tokio::test]
    async fn test_engine_runs_all_stages_in_order() {
        let engine = EtlEngine::new(StubPipeline::new(3));
        let output = engine.run().await.unwrap();

        assert_eq!(output, "out");
        assert_eq!(engine.pipeline.load_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_engine_stops_at_first_failing_stage() {
        let mut pipeline = StubPipeline::new(1);
        pipeline.fail_on_transform = true;
        let engine = EtlEngine::new(pipeline);

        assert!(engine.run().await.is_err());
        assert_eq!(engine.pipeline.load_calls.load(Ordering::SeqCst), 0);
    }
}
