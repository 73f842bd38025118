use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Version of the EPD document layout stamped into every exported record.
pub const FORMAT_VERSION: &str = "1.2.0";

/// Declared physical unit of an EPD. Source unit codes outside the closed set
/// map to `Unknown`, never to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pcs,
    M,
    M2,
    M3,
    Kg,
    L,
    Unknown,
}

impl Unit {
    /// Maps a KBOB unit code ("Bezug" column) to a declared unit.
    pub fn from_code(code: &str) -> Self {
        match code {
            "STK" => Unit::Pcs,
            "M" => Unit::M,
            "M2" => Unit::M2,
            "M3" => Unit::M3,
            "KG" => Unit::Kg,
            "L" => Unit::L,
            _ => Unit::Unknown,
        }
    }
}

/// Declaration standard of the target schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Standard {
    EN15804A1,
    EN15804A2,
    Unknown,
}

impl Standard {
    /// Lenient label parsing for source columns ("EN 15804+A1" and friends).
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "EN15804A1" | "EN15804+A1" => Standard::EN15804A1,
            "EN15804A2" | "EN15804+A2" => Standard::EN15804A2,
            _ => Standard::Unknown,
        }
    }
}

/// Declaration subtype of the target schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubType {
    Generic,
    Specific,
    Industry,
    Representative,
}

impl SubType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "generic" => Some(SubType::Generic),
            "specific" => Some(SubType::Specific),
            "industry" => Some(SubType::Industry),
            "representative" => Some(SubType::Representative),
            _ => None,
        }
    }
}

/// Provenance of a declaration. `uuid` keeps the raw source identifier even
/// when the record id itself is remapped or generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub uuid: Option<String>,
}

/// Unit conversion attached to a declaration, e.g. bulk density to mass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    pub value: f64,
    pub to: Unit,
}

/// Life-cycle stages of EN 15804. Every indicator table carries all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeCycleStage {
    A1A3,
    A4,
    A5,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    C1,
    C2,
    C3,
    C4,
    D,
}

impl LifeCycleStage {
    pub const ALL: [LifeCycleStage; 15] = [
        LifeCycleStage::A1A3,
        LifeCycleStage::A4,
        LifeCycleStage::A5,
        LifeCycleStage::B1,
        LifeCycleStage::B2,
        LifeCycleStage::B3,
        LifeCycleStage::B4,
        LifeCycleStage::B5,
        LifeCycleStage::B6,
        LifeCycleStage::B7,
        LifeCycleStage::C1,
        LifeCycleStage::C2,
        LifeCycleStage::C3,
        LifeCycleStage::C4,
        LifeCycleStage::D,
    ];
}

/// The impact indicators this exporter knows how to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Gwp,
    Penre,
    Pere,
    Pert,
}

/// One indicator table. Every stage key is declared and serialized even when
/// the value is absent: `null` in the JSON output, never a missing key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImpactCategory {
    pub a1a3: Option<f64>,
    pub a4: Option<f64>,
    pub a5: Option<f64>,
    pub b1: Option<f64>,
    pub b2: Option<f64>,
    pub b3: Option<f64>,
    pub b4: Option<f64>,
    pub b5: Option<f64>,
    pub b6: Option<f64>,
    pub b7: Option<f64>,
    pub c1: Option<f64>,
    pub c2: Option<f64>,
    pub c3: Option<f64>,
    pub c4: Option<f64>,
    pub d: Option<f64>,
}

impl ImpactCategory {
    pub fn set(&mut self, stage: LifeCycleStage, value: Option<f64>) {
        match stage {
            LifeCycleStage::A1A3 => self.a1a3 = value,
            LifeCycleStage::A4 => self.a4 = value,
            LifeCycleStage::A5 => self.a5 = value,
            LifeCycleStage::B1 => self.b1 = value,
            LifeCycleStage::B2 => self.b2 = value,
            LifeCycleStage::B3 => self.b3 = value,
            LifeCycleStage::B4 => self.b4 = value,
            LifeCycleStage::B5 => self.b5 = value,
            LifeCycleStage::B6 => self.b6 = value,
            LifeCycleStage::B7 => self.b7 = value,
            LifeCycleStage::C1 => self.c1 = value,
            LifeCycleStage::C2 => self.c2 = value,
            LifeCycleStage::C3 => self.c3 = value,
            LifeCycleStage::C4 => self.c4 = value,
            LifeCycleStage::D => self.d = value,
        }
    }

    pub fn get(&self, stage: LifeCycleStage) -> Option<f64> {
        match stage {
            LifeCycleStage::A1A3 => self.a1a3,
            LifeCycleStage::A4 => self.a4,
            LifeCycleStage::A5 => self.a5,
            LifeCycleStage::B1 => self.b1,
            LifeCycleStage::B2 => self.b2,
            LifeCycleStage::B3 => self.b3,
            LifeCycleStage::B4 => self.b4,
            LifeCycleStage::B5 => self.b5,
            LifeCycleStage::B6 => self.b6,
            LifeCycleStage::B7 => self.b7,
            LifeCycleStage::C1 => self.c1,
            LifeCycleStage::C2 => self.c2,
            LifeCycleStage::C3 => self.c3,
            LifeCycleStage::C4 => self.c4,
            LifeCycleStage::D => self.d,
        }
    }
}

/// One environmental product declaration, built from one source row and
/// written to `<id>.json`. All four indicator tables are always present;
/// dialects that do not map an indicator leave its table fully absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Epd {
    pub id: String,
    pub format_version: String,
    pub name: String,
    pub version: String,
    pub declared_unit: Unit,
    pub valid_until: NaiveDate,
    pub published_date: NaiveDate,
    pub source: Option<Source>,
    pub standard: Standard,
    pub subtype: SubType,
    pub reference_service_life: Option<u32>,
    pub location: String,
    pub comment: Option<String>,
    pub conversions: Option<Vec<Conversion>>,
    pub gwp: ImpactCategory,
    pub penre: ImpactCategory,
    pub pere: ImpactCategory,
    pub pert: ImpactCategory,
    pub meta_data: Option<BTreeMap<String, String>>,
}

/// What to do when two rows map to the same declaration id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateIdPolicy {
    /// Last write wins, the earlier file is replaced (original behavior).
    Overwrite,
    /// Abort the batch on the first duplicate.
    Error,
}

impl FromStr for DuplicateIdPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "overwrite" => Ok(DuplicateIdPolicy::Overwrite),
            "error" => Ok(DuplicateIdPolicy::Error),
            other => Err(format!("unknown duplicate-id policy: {}", other)),
        }
    }
}

/// What to do when a column the dialect references is missing from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingColumnPolicy {
    /// Abort the batch before any row is mapped (original behavior).
    Fail,
    /// Map every affected field to "value absent".
    Ignore,
}

impl FromStr for MissingColumnPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fail" => Ok(MissingColumnPolicy::Fail),
            "ignore" => Ok(MissingColumnPolicy::Ignore),
            other => Err(format!("unknown missing-column policy: {}", other)),
        }
    }
}

/// One raw source row: column name to untrimmed string value, as exported.
#[derive(Debug, Clone)]
pub struct SourceRow {
    pub columns: HashMap<String, String>,
}

impl SourceRow {
    pub fn new(columns: HashMap<String, String>) -> Self {
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }
}

/// The extracted source export: the header record plus one row per data
/// line. The header is kept so the missing-column check also covers
/// exports with no data rows.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub header: Vec<String>,
    pub rows: Vec<SourceRow>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub declarations: Vec<Epd>,
    pub skipped_rows: usize,
}
