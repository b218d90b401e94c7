use anyhow::Context;
use clap::Parser;
use passive_record::utils::{logger, validation::Validate};
use passive_record::{CliConfig, RecordDocument, SchemaConfig};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting passive-record CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Invalid arguments: {}", e);
        std::process::exit(2);
    }

    let schema = SchemaConfig::from_file(&config.schema)
        .with_context(|| format!("reading schema {}", config.schema.display()))?;
    schema.validate()?;
    let registry = schema.registry()?;

    let record = RecordDocument::from_file(&config.input)
        .with_context(|| format!("reading record {}", config.input.display()))?
        .into_record(&registry)?;

    let xml = schema.serializer().to_xml(&record, config.render_options())?;

    match &config.output {
        Some(path) => {
            std::fs::write(path, &xml)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("📁 Output saved to: {}", path.display());
        }
        None => print!("{}", xml),
    }

    Ok(())
}
