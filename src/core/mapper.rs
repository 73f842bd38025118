use crate::config::dialect::Dialect;
use crate::core::uuid_map::UuidMap;
use crate::domain::model::{
    Conversion, Epd, ImpactCategory, Indicator, Source, SourceRow, Standard, SubType, Unit,
    FORMAT_VERSION,
};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Parses a raw indicator field and normalizes it by the declared factor.
///
/// Contract (deliberate leniency, not a validation gate): surrounding
/// whitespace is trimmed first; the sentinels `""` and `"-"` mean "not
/// reported" and map to `None`; any other unparseable string maps to `None`
/// as well, silently; a parseable float is divided by the declared factor.
/// A missing column behaves like the empty sentinel.
pub fn parse_or_absent(raw: Option<&str>, declared_factor: f64) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() || raw == "-" {
        return None;
    }
    raw.parse::<f64>().ok().map(|value| value / declared_factor)
}

/// Maps one source row to one declaration, per the dialect's column table.
/// All mapping is total: malformed numerics become absent values, unknown
/// unit codes become `Unit::Unknown`, and a missing or unmatched identifier
/// becomes a fresh random UUID.
pub struct RowMapper<'a> {
    dialect: &'a Dialect,
    uuid_map: Option<&'a UuidMap>,
}

impl<'a> RowMapper<'a> {
    pub fn new(dialect: &'a Dialect, uuid_map: Option<&'a UuidMap>) -> Self {
        Self { dialect, uuid_map }
    }

    /// True for spreadsheet section-header rows the dialect filters out.
    pub fn should_skip(&self, row: &SourceRow) -> bool {
        match (&self.dialect.sort_column, &self.dialect.skip_prefix) {
            (Some(column), Some(prefix)) => row
                .get(column)
                .map(|value| value.starts_with(prefix.as_str()))
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn map(&self, row: &SourceRow) -> Epd {
        let dialect = self.dialect;
        let factor = dialect.declared_factor;

        let source_uuid = dialect
            .id_column
            .as_deref()
            .and_then(|column| row.get(column))
            .filter(|value| !value.is_empty());

        let id = self.resolve_id(source_uuid);

        let name = row
            .get(&dialect.name_column)
            .unwrap_or_default()
            .to_string();

        let declared_unit = row
            .get(&dialect.unit_column)
            .map(Unit::from_code)
            .unwrap_or(Unit::Unknown);

        let mut gwp = ImpactCategory::default();
        let mut penre = ImpactCategory::default();
        let mut pere = ImpactCategory::default();
        let mut pert = ImpactCategory::default();

        for mapping in &dialect.indicators {
            let value = parse_or_absent(row.get(&mapping.column), factor);
            let table = match mapping.indicator {
                Indicator::Gwp => &mut gwp,
                Indicator::Penre => &mut penre,
                Indicator::Pere => &mut pere,
                Indicator::Pert => &mut pert,
            };
            table.set(mapping.stage, value);
        }

        let standard = dialect
            .standard_column
            .as_deref()
            .and_then(|column| row.get(column))
            .filter(|value| !value.is_empty())
            .map(Standard::from_label)
            .unwrap_or(dialect.declaration.standard);

        let subtype = dialect
            .subtype_column
            .as_deref()
            .and_then(|column| row.get(column))
            .and_then(SubType::from_label)
            .unwrap_or(dialect.declaration.subtype);

        let comment = dialect
            .comment_column
            .as_deref()
            .and_then(|column| row.get(column))
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        // Density is its own quantity, not an indicator: no normalization.
        let conversions = dialect
            .density_column
            .as_deref()
            .and_then(|column| parse_or_absent(row.get(column), 1.0))
            .map(|value| vec![Conversion { value, to: Unit::Kg }]);

        let meta_data = if dialect.meta_passthrough {
            let consumed = dialect.consumed_columns();
            let remaining: BTreeMap<String, String> = row
                .columns
                .iter()
                .filter(|(column, _)| !consumed.contains(column.as_str()))
                .map(|(column, value)| (column.clone(), value.clone()))
                .collect();
            Some(remaining)
        } else {
            None
        };

        Epd {
            id,
            format_version: FORMAT_VERSION.to_string(),
            name,
            version: dialect.declaration.data_version.clone(),
            declared_unit,
            valid_until: dialect.declaration.valid_until,
            published_date: dialect.declaration.published,
            source: Some(Source {
                name: dialect.declaration.source_name.clone(),
                uuid: source_uuid.map(str::to_string),
            }),
            standard,
            subtype,
            reference_service_life: None,
            location: dialect.declaration.location.clone(),
            comment,
            conversions,
            gwp,
            penre,
            pere,
            pert,
            meta_data,
        }
    }

    fn resolve_id(&self, source_uuid: Option<&str>) -> String {
        let resolved = if self.dialect.id_lookup {
            source_uuid
                .and_then(|uuid| self.uuid_map.and_then(|map| map.resolve(uuid)))
                .map(str::to_string)
        } else {
            source_uuid.map(str::to_string)
        };

        resolved.unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}
