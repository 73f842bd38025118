use crate::config::dialect::Dialect;
use crate::core::mapper::RowMapper;
use crate::core::uuid_map::UuidMap;
use crate::core::{
    ConfigProvider, DuplicateIdPolicy, MissingColumnPolicy, Pipeline, SourceRow, SourceTable,
    Storage, TransformResult,
};
use crate::utils::error::{ExportError, Result};
use std::collections::{HashMap, HashSet};

pub struct ExportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    dialect: Dialect,
    uuid_map: Option<UuidMap>,
}

impl<S: Storage, C: ConfigProvider> ExportPipeline<S, C> {
    pub fn new(storage: S, config: C, dialect: Dialect, uuid_map: Option<UuidMap>) -> Self {
        Self {
            storage,
            config,
            dialect,
            uuid_map,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ExportPipeline<S, C> {
    async fn extract(&self) -> Result<SourceTable> {
        let path = self.config.source_path();
        tracing::debug!("Reading source export from: {}", path);

        let raw = std::fs::read_to_string(path)?;
        // Spreadsheet exports frequently start with a UTF-8 BOM, which would
        // otherwise end up glued to the first header name.
        let content = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.dialect.delimiter_byte())
            .from_reader(content.as_bytes());

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.deserialize::<HashMap<String, String>>() {
            rows.push(SourceRow::new(record?));
        }

        tracing::debug!("Extracted {} rows from source export", rows.len());
        Ok(SourceTable { header, rows })
    }

    async fn transform(&self, table: SourceTable) -> Result<TransformResult> {
        // The header exists even when the export carries no data rows, so
        // the fail policy is checked against it unconditionally.
        if self.config.missing_column_policy() == MissingColumnPolicy::Fail {
            let available: HashSet<&str> = table.header.iter().map(String::as_str).collect();
            let missing = self.dialect.missing_columns(&available);
            if !missing.is_empty() {
                return Err(ExportError::MissingColumnsError {
                    columns: missing.join(", "),
                });
            }
        }

        let mapper = RowMapper::new(&self.dialect, self.uuid_map.as_ref());

        let mut declarations = Vec::new();
        let mut skipped_rows = 0;

        for row in &table.rows {
            if mapper.should_skip(row) {
                tracing::debug!("Skipping section header row");
                skipped_rows += 1;
                continue;
            }
            declarations.push(mapper.map(row));
        }

        tracing::debug!(
            "Mapped {} declarations ({} section rows skipped)",
            declarations.len(),
            skipped_rows
        );

        Ok(TransformResult {
            declarations,
            skipped_rows,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let policy = self.config.duplicate_id_policy();
        let mut seen: HashSet<String> = HashSet::new();

        for declaration in &result.declarations {
            if !seen.insert(declaration.id.clone()) {
                match policy {
                    DuplicateIdPolicy::Error => {
                        return Err(ExportError::DuplicateIdError {
                            id: declaration.id.clone(),
                        });
                    }
                    DuplicateIdPolicy::Overwrite => {
                        tracing::warn!(
                            "Duplicate declaration id '{}', overwriting earlier file",
                            declaration.id
                        );
                    }
                }
            }

            let json = serde_json::to_string_pretty(declaration)?;
            let file_name = format!("{}.json", declaration.id);
            self.storage.write_file(&file_name, json.as_bytes()).await?;
        }

        tracing::debug!("Wrote {} declaration files", result.declarations.len());
        Ok(self.config.output_path().to_string())
    }
}
