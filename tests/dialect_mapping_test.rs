use anyhow::Result;
use kbob2epd::config::dialect::{columns, Dialect};
use kbob2epd::core::{DuplicateIdPolicy, MissingColumnPolicy};
use kbob2epd::{CliConfig, EtlEngine, ExportPipeline, LocalStorage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_source(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn config(source: &str, output_path: &str, dialect: &str) -> CliConfig {
    CliConfig {
        source: source.to_string(),
        output_path: output_path.to_string(),
        dialect: dialect.to_string(),
        dialect_file: None,
        uuid_map: None,
        on_duplicate: DuplicateIdPolicy::Overwrite,
        on_missing_column: MissingColumnPolicy::Fail,
        verbose: false,
        log_json: false,
    }
}

async fn run(config: CliConfig, dialect: Dialect) -> kbob2epd::Result<String> {
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = ExportPipeline::new(storage, config, dialect, None);
    EtlEngine::new(pipeline).run().await
}

fn read_declaration(output_path: &str, file_name: &str) -> Result<serde_json::Value> {
    let content = fs::read_to_string(Path::new(output_path).join(file_name))?;
    Ok(serde_json::from_str(&content)?)
}

/// Header of the semicolon separated 2009/1:2022 sheet, in export order.
fn indicators_header(extra: &[&str]) -> String {
    let mut header = vec![
        columns::UUID,
        columns::SORT_ID,
        columns::NAME,
        columns::UNIT,
        columns::GWP_PRODUCTION,
        columns::GWP_DISPOSAL,
        columns::PENRE_PRODUCTION,
        columns::PENRE_DISPOSAL,
        columns::PERE_PRODUCTION,
        columns::PERE_DISPOSAL,
        columns::PERT_PRODUCTION,
        columns::PERT_DISPOSAL,
    ];
    header.extend_from_slice(extra);
    header.join(";")
}

#[tokio::test]
async fn test_indicators_dialect_maps_production_and_disposal_stages() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let source = write_source(
        &temp_dir,
        "export.csv",
        &format!(
            "{}\n\
             abc-123;01.002;Beton, vorfabriziert;KG;120.5;8.1;300;-;45.7;;345.7;2\n",
            indicators_header(&[])
        ),
    );
    let output_path = temp_dir.path().join("out").to_str().unwrap().to_string();

    run(
        config(&source, &output_path, "indicators"),
        Dialect::indicators(),
    )
    .await?;

    let declaration = read_declaration(&output_path, "abc-123.json")?;

    // The delimiter is the semicolon, so the comma in the name is data.
    assert_eq!(declaration["name"], "Beton, vorfabriziert");
    assert_eq!(declaration["version"], "2009/1:2022");
    assert_eq!(declaration["published_date"], "2022-07-19");
    assert_eq!(declaration["valid_until"], "2026-12-31");
    assert_eq!(declaration["gwp"]["a1a3"], 120.5);
    assert_eq!(declaration["gwp"]["c4"], 8.1);
    assert_eq!(declaration["penre"]["a1a3"], 300.0);
    assert!(declaration["penre"]["c4"].is_null());
    assert_eq!(declaration["pere"]["a1a3"], 45.7);
    assert!(declaration["pere"]["c4"].is_null());
    assert_eq!(declaration["pert"]["a1a3"], 345.7);
    assert_eq!(declaration["pert"]["c4"], 2.0);
    // The indicators sheet does not pass metadata through.
    assert!(declaration["meta_data"].is_null());
    assert!(declaration["conversions"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_full_dialect_meta_passthrough_and_density_conversion() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let header = {
        let mut header = indicators_header(&["UBP (Total)", "Bezugsgrösse"]);
        header.push_str(&format!(";{}", columns::DENSITY));
        header
    };
    let source = write_source(
        &temp_dir,
        "export.csv",
        &format!(
            "{}\n\
             abc-123;03.001;Dämmstoff;KG;3.2;0.1;12;1;4;0.5;16;1.5;4120;1 kg;55\n",
            header
        ),
    );
    let output_path = temp_dir.path().join("out").to_str().unwrap().to_string();

    run(config(&source, &output_path, "full"), Dialect::full()).await?;

    let declaration = read_declaration(&output_path, "abc-123.json")?;

    let meta = declaration["meta_data"].as_object().unwrap();
    assert_eq!(meta.len(), 2);
    assert_eq!(meta["UBP (Total)"], "4120");
    assert_eq!(meta["Bezugsgrösse"], "1 kg");

    let conversions = declaration["conversions"].as_array().unwrap();
    assert_eq!(conversions.len(), 1);
    assert_eq!(conversions[0]["value"], 55.0);
    assert_eq!(conversions[0]["to"], "kg");

    Ok(())
}

#[tokio::test]
async fn test_full_dialect_with_no_leftover_columns_emits_empty_meta() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let header = format!("{};{}", indicators_header(&[]), columns::DENSITY);
    let source = write_source(
        &temp_dir,
        "export.csv",
        &format!(
            "{}\n\
             abc-123;01.002;Beton;KG;120.5;8.1;300;2;45.7;1;345.7;3;-\n",
            header
        ),
    );
    let output_path = temp_dir.path().join("out").to_str().unwrap().to_string();

    run(config(&source, &output_path, "full"), Dialect::full()).await?;

    let declaration = read_declaration(&output_path, "abc-123.json")?;

    // Passthrough stays on: the block is present and empty, not null.
    assert!(declaration["meta_data"].is_object());
    assert_eq!(declaration["meta_data"].as_object().unwrap().len(), 0);
    // Unparseable density means no conversion entry.
    assert!(declaration["conversions"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_custom_dialect_from_toml_file() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let dialect_path = temp_dir.path().join("custom.toml");
    fs::write(
        &dialect_path,
        r#"
name = "kwh-sheet"
delimiter = ";"
declared_factor = 1000.0
id_column = "Id"
name_column = "Material"
unit_column = "Einheit"

[[indicators]]
column = "GWP total [g CO2-eq]"
indicator = "gwp"
stage = "a1a3"

[declaration]
data_version = "2024/custom"
published = "2024-01-15"
valid_until = "2027-12-31"
"#,
    )?;

    let source = write_source(
        &temp_dir,
        "export.csv",
        "Id;Material;Einheit;GWP total [g CO2-eq]\n\
         mat-9;Ziegel;KG;250\n",
    );
    let output_path = temp_dir.path().join("out").to_str().unwrap().to_string();

    let dialect = Dialect::from_file(&dialect_path)?;
    let mut config = config(&source, &output_path, "basic");
    config.dialect_file = Some(dialect_path.to_str().unwrap().to_string());

    run(config, dialect).await?;

    let declaration = read_declaration(&output_path, "mat-9.json")?;
    assert_eq!(declaration["name"], "Ziegel");
    assert_eq!(declaration["version"], "2024/custom");
    assert_eq!(declaration["published_date"], "2024-01-15");
    // The factor rescales grams to the declared kilogram basis.
    assert_eq!(declaration["gwp"]["a1a3"], 0.25);

    Ok(())
}
