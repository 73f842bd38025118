pub mod cli;
pub mod dialect;

use crate::core::{ConfigProvider, DuplicateIdPolicy, MissingColumnPolicy};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "kbob2epd")]
#[command(about = "Exports the KBOB eco-inventory CSV as one EPD JSON document per material")]
pub struct CliConfig {
    #[arg(long, help = "Path to the source CSV export")]
    pub source: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "basic", help = "Built-in source dialect")]
    pub dialect: String,

    #[arg(long, help = "TOML file with a custom source dialect, overrides --dialect")]
    pub dialect_file: Option<String>,

    #[arg(long, help = "JSON table mapping source UUIDs to foreign dataset ids")]
    pub uuid_map: Option<String>,

    #[arg(long, default_value = "overwrite", help = "Duplicate id policy: overwrite or error")]
    pub on_duplicate: DuplicateIdPolicy,

    #[arg(long, default_value = "fail", help = "Missing column policy: fail or ignore")]
    pub on_missing_column: MissingColumnPolicy,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn validate_args(&self) -> crate::utils::error::Result<()> {
        validation::validate_path("source", &self.source)?;
        validation::validate_path("output_path", &self.output_path)?;

        if self.dialect_file.is_none() {
            validation::validate_one_of("dialect", &self.dialect, &dialect::BUILTIN_DIALECTS)?;
        }

        if let Some(dialect_file) = &self.dialect_file {
            validation::validate_file_extensions(
                "dialect_file",
                std::slice::from_ref(dialect_file),
                &["toml"],
            )?;
        }

        if let Some(uuid_map) = &self.uuid_map {
            validation::validate_file_extensions(
                "uuid_map",
                std::slice::from_ref(uuid_map),
                &["json"],
            )?;
        }

        Ok(())
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        self.validate_args()
    }
}

impl ConfigProvider for CliConfig {
    fn source_path(&self) -> &str {
        &self.source
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn uuid_map_path(&self) -> Option<&str> {
        self.uuid_map.as_deref()
    }

    fn duplicate_id_policy(&self) -> DuplicateIdPolicy {
        self.on_duplicate
    }

    fn missing_column_policy(&self) -> MissingColumnPolicy {
        self.on_missing_column
    }
}
