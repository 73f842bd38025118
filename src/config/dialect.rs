use crate::domain::model::{Indicator, LifeCycleStage, Standard, SubType};
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Exact header names of the KBOB CSV exports, per layout generation.
pub mod columns {
    // Legacy sheet (comma separated).
    pub const UUID: &str = "UUID-Nummer";
    pub const NAME: &str = "BAUMATERIALIEN";
    pub const UNIT: &str = "Bezug";
    pub const GWP_LEGACY: &str = "Treibhausgasemissionen (kg CO2-eq)";

    // 2009/1:2022 sheet (semicolon separated).
    pub const SORT_ID: &str = "ID-Nummer";
    pub const DENSITY: &str = "Rohdichte/ Flächenmasse";
    pub const GWP_PRODUCTION: &str = "Treibhausgasemissionen, Herstellung [kg CO2-eq]";
    pub const GWP_DISPOSAL: &str = "Treibhausgasemissionen, Entsorgung [kg CO2-eq]";
    pub const PENRE_PRODUCTION: &str =
        "Primärenergie nicht erneuerbar, Herstellung total [kWh oil-eq]";
    pub const PENRE_DISPOSAL: &str = "Primärenergie nicht erneuerbar, Entsorgung [kWh oil-eq]";
    pub const PERE_PRODUCTION: &str = "Primärenergie erneuerbar, Herstellung total [kWh oil-eq]";
    pub const PERE_DISPOSAL: &str = "Primärenergie erneuerbar, Entsorgung [kWh oil-eq]";
    pub const PERT_PRODUCTION: &str = "Primärenergie gesamt, Herstellung total [kWh oil-eq]";
    pub const PERT_DISPOSAL: &str = "Primärenergie gesamt, Entsorgung [kWh oil-eq]";
}

pub const BUILTIN_DIALECTS: [&str; 4] = ["basic", "indicators", "full", "oekobaudat"];

/// One source column feeding one stage of one indicator table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorColumn {
    pub column: String,
    pub indicator: Indicator,
    pub stage: LifeCycleStage,
}

/// Constants stamped into every record produced under a dialect: the data
/// release the sheet belongs to and the declaration framing of the target
/// schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationDefaults {
    pub data_version: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_standard")]
    pub standard: Standard,
    #[serde(default = "default_subtype")]
    pub subtype: SubType,
    pub published: NaiveDate,
    pub valid_until: NaiveDate,
    #[serde(default = "default_source_name")]
    pub source_name: String,
}

/// A source dialect: the full column-mapping table for one KBOB export
/// layout. The four shipped layouts are built in; a custom table can be
/// loaded from a TOML file with the same shape, e.g.:
///
/// ```toml
/// name = "custom"
/// delimiter = ";"
/// name_column = "BAUMATERIALIEN"
/// unit_column = "Bezug"
/// id_column = "UUID-Nummer"
///
/// [[indicators]]
/// column = "Treibhausgasemissionen, Herstellung [kg CO2-eq]"
/// indicator = "gwp"
/// stage = "a1a3"
///
/// [declaration]
/// data_version = "2009/1:2022"
/// published = "2022-07-19"
/// valid_until = "2026-12-31"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dialect {
    pub name: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Divisor applied to every parsed indicator value (declared-unit
    /// normalization). Must be finite and non-zero.
    #[serde(default = "default_factor")]
    pub declared_factor: f64,
    #[serde(default)]
    pub id_column: Option<String>,
    /// Resolve the record id through the external UUID-remapping table
    /// instead of using the source id verbatim.
    #[serde(default)]
    pub id_lookup: bool,
    pub name_column: String,
    pub unit_column: String,
    #[serde(default)]
    pub sort_column: Option<String>,
    /// Rows whose sort identifier starts with this prefix are section
    /// headers embedded in the spreadsheet and are skipped before mapping.
    #[serde(default)]
    pub skip_prefix: Option<String>,
    #[serde(default)]
    pub comment_column: Option<String>,
    #[serde(default)]
    pub standard_column: Option<String>,
    #[serde(default)]
    pub subtype_column: Option<String>,
    /// Bulk density / area mass column, mapped to a mass conversion entry.
    #[serde(default)]
    pub density_column: Option<String>,
    /// Copy every source column the mapping does not consume into the
    /// record's meta_data block, verbatim.
    #[serde(default)]
    pub meta_passthrough: bool,
    #[serde(default)]
    pub indicators: Vec<IndicatorColumn>,
    pub declaration: DeclarationDefaults,
}

fn default_delimiter() -> char {
    ','
}

fn default_factor() -> f64 {
    1.0
}

fn default_location() -> String {
    "CH".to_string()
}

fn default_standard() -> Standard {
    Standard::EN15804A1
}

fn default_subtype() -> SubType {
    SubType::Generic
}

fn default_source_name() -> String {
    "KBOB".to_string()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

impl Dialect {
    /// The legacy single-indicator sheet: global warming potential only.
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            delimiter: ',',
            declared_factor: 1.0,
            id_column: Some(columns::UUID.to_string()),
            id_lookup: false,
            name_column: columns::NAME.to_string(),
            unit_column: columns::UNIT.to_string(),
            sort_column: None,
            skip_prefix: None,
            comment_column: None,
            standard_column: None,
            subtype_column: None,
            density_column: None,
            meta_passthrough: false,
            indicators: vec![IndicatorColumn {
                column: columns::GWP_LEGACY.to_string(),
                indicator: Indicator::Gwp,
                stage: LifeCycleStage::A1A3,
            }],
            declaration: DeclarationDefaults {
                data_version: "version 4 - 2024".to_string(),
                location: "CH".to_string(),
                standard: Standard::EN15804A1,
                subtype: SubType::Generic,
                published: date(2024, 11, 25),
                valid_until: date(2025, 12, 22),
                source_name: "KBOB".to_string(),
            },
        }
    }

    /// The 2009/1:2022 sheet: GWP plus the primary-energy indicators,
    /// production and disposal stages.
    pub fn indicators() -> Self {
        let stage_columns = [
            (columns::GWP_PRODUCTION, Indicator::Gwp, LifeCycleStage::A1A3),
            (columns::GWP_DISPOSAL, Indicator::Gwp, LifeCycleStage::C4),
            (
                columns::PENRE_PRODUCTION,
                Indicator::Penre,
                LifeCycleStage::A1A3,
            ),
            (columns::PENRE_DISPOSAL, Indicator::Penre, LifeCycleStage::C4),
            (
                columns::PERE_PRODUCTION,
                Indicator::Pere,
                LifeCycleStage::A1A3,
            ),
            (columns::PERE_DISPOSAL, Indicator::Pere, LifeCycleStage::C4),
            (
                columns::PERT_PRODUCTION,
                Indicator::Pert,
                LifeCycleStage::A1A3,
            ),
            (columns::PERT_DISPOSAL, Indicator::Pert, LifeCycleStage::C4),
        ];

        Self {
            name: "indicators".to_string(),
            delimiter: ';',
            declared_factor: 1.0,
            id_column: Some(columns::UUID.to_string()),
            id_lookup: false,
            name_column: columns::NAME.to_string(),
            unit_column: columns::UNIT.to_string(),
            sort_column: Some(columns::SORT_ID.to_string()),
            skip_prefix: None,
            comment_column: None,
            standard_column: None,
            subtype_column: None,
            density_column: None,
            meta_passthrough: false,
            indicators: stage_columns
                .into_iter()
                .map(|(column, indicator, stage)| IndicatorColumn {
                    column: column.to_string(),
                    indicator,
                    stage,
                })
                .collect(),
            declaration: DeclarationDefaults {
                data_version: "2009/1:2022".to_string(),
                location: "CH".to_string(),
                standard: Standard::EN15804A1,
                subtype: SubType::Generic,
                published: date(2022, 7, 19),
                valid_until: date(2026, 12, 31),
                source_name: "KBOB".to_string(),
            },
        }
    }

    /// The 2022 sheet with full metadata passthrough: unconsumed columns are
    /// kept verbatim and the density column becomes a mass conversion.
    pub fn full() -> Self {
        let mut dialect = Self::indicators();
        dialect.name = "full".to_string();
        dialect.density_column = Some(columns::DENSITY.to_string());
        dialect.meta_passthrough = true;
        dialect
    }

    /// The ÖKOBAUDAT-flavored export: record ids are resolved through the
    /// external UUID-remapping table, spreadsheet section rows are dropped,
    /// and records are stamped with the EN 15804+A2 standard of the target
    /// schema dialect.
    pub fn oekobaudat() -> Self {
        let mut dialect = Self::indicators();
        dialect.name = "oekobaudat".to_string();
        dialect.id_lookup = true;
        dialect.skip_prefix = Some("#".to_string());
        dialect.declaration.standard = Standard::EN15804A2;
        dialect
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "basic" => Some(Self::basic()),
            "indicators" => Some(Self::indicators()),
            "full" => Some(Self::full()),
            "oekobaudat" => Some(Self::oekobaudat()),
            _ => None,
        }
    }

    /// Loads a custom dialect table from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses a dialect table from a TOML string, substituting `${VAR}`
    /// environment references first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ExportError::ConfigValidationError {
            field: "dialect_toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    /// Every source column this dialect reads, in declaration order.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut referenced = Vec::new();
        let optional = [
            self.id_column.as_deref(),
            self.sort_column.as_deref(),
            self.comment_column.as_deref(),
            self.standard_column.as_deref(),
            self.subtype_column.as_deref(),
            self.density_column.as_deref(),
        ];

        referenced.push(self.name_column.as_str());
        referenced.push(self.unit_column.as_str());
        referenced.extend(optional.into_iter().flatten());
        referenced.extend(self.indicators.iter().map(|m| m.column.as_str()));
        referenced
    }

    /// The columns consumed by the mapping; everything else is "remaining"
    /// for the meta_data passthrough.
    pub fn consumed_columns(&self) -> HashSet<&str> {
        self.referenced_columns().into_iter().collect()
    }

    /// Referenced columns absent from the given header set, deduplicated,
    /// in declaration order.
    pub fn missing_columns(&self, available: &HashSet<&str>) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for column in self.referenced_columns() {
            if !available.contains(column) && !missing.iter().any(|m| m == column) {
                missing.push(column.to_string());
            }
        }
        missing
    }

    pub fn validate_table(&self) -> Result<()> {
        validation::validate_non_empty_string("dialect.name", &self.name)?;
        validation::validate_non_empty_string("dialect.name_column", &self.name_column)?;
        validation::validate_non_empty_string("dialect.unit_column", &self.unit_column)?;

        if !self.delimiter.is_ascii() {
            return Err(ExportError::InvalidConfigValueError {
                field: "dialect.delimiter".to_string(),
                value: self.delimiter.to_string(),
                reason: "Delimiter must be a single ASCII character".to_string(),
            });
        }

        if !self.declared_factor.is_finite() || self.declared_factor == 0.0 {
            return Err(ExportError::InvalidConfigValueError {
                field: "dialect.declared_factor".to_string(),
                value: self.declared_factor.to_string(),
                reason: "Normalization factor must be finite and non-zero".to_string(),
            });
        }

        for mapping in &self.indicators {
            validation::validate_non_empty_string("dialect.indicators.column", &mapping.column)?;
        }

        if self.id_lookup && self.id_column.is_none() {
            return Err(ExportError::ConfigValidationError {
                field: "dialect.id_lookup".to_string(),
                message: "id_lookup requires an id_column to read the source identifier from"
                    .to_string(),
            });
        }

        if self.skip_prefix.is_some() && self.sort_column.is_none() {
            return Err(ExportError::ConfigValidationError {
                field: "dialect.skip_prefix".to_string(),
                message: "skip_prefix requires a sort_column to match against".to_string(),
            });
        }

        Ok(())
    }
}

impl Validate for Dialect {
    fn validate(&self) -> Result<()> {
        self.validate_table()
    }
}
