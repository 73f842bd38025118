use clap::Parser;
use kbob2epd::config::dialect::Dialect;
use kbob2epd::utils::{logger, validation, validation::Validate};
use kbob2epd::{CliConfig, EtlEngine, ExportPipeline, LocalStorage, UuidMap};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting kbob2epd CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let dialect = match resolve_dialect(&config) {
        Ok(dialect) => dialect,
        Err(e) => {
            tracing::error!("❌ Dialect resolution failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    tracing::info!("🗂️ Using dialect '{}'", dialect.name);

    let uuid_map = match load_uuid_map(&config, &dialect) {
        Ok(uuid_map) => uuid_map,
        Err(e) => {
            tracing::error!("❌ UUID map loading failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = ExportPipeline::new(storage, config, dialect, uuid_map);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Export completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Export completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("❌ Export failed: {}", e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(1);
        }
    }

    Ok(())
}

/// A dialect file wins over the builtin name; both are validated before use.
fn resolve_dialect(config: &CliConfig) -> kbob2epd::Result<Dialect> {
    let dialect = match &config.dialect_file {
        Some(path) => Dialect::from_file(path)?,
        None => Dialect::builtin(&config.dialect).ok_or_else(|| {
            kbob2epd::ExportError::InvalidConfigValueError {
                field: "dialect".to_string(),
                value: config.dialect.clone(),
                reason: format!(
                    "Unknown builtin dialect. Allowed values: {}",
                    kbob2epd::config::dialect::BUILTIN_DIALECTS.join(", ")
                ),
            }
        })?,
    };

    dialect.validate()?;
    Ok(dialect)
}

fn load_uuid_map(config: &CliConfig, dialect: &Dialect) -> kbob2epd::Result<Option<UuidMap>> {
    if dialect.id_lookup {
        let path = validation::validate_required_field("uuid_map", &config.uuid_map)?;
        return Ok(Some(UuidMap::from_file(path)?));
    }

    if config.uuid_map.is_some() {
        tracing::warn!(
            "⚠️ --uuid-map ignored: dialect '{}' does not use id lookup",
            dialect.name
        );
    }
    Ok(None)
}
