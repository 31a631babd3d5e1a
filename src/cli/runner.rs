//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::database::{DestinationSink, DuckDbSink, NullSink, RowSource};
use crate::engine::{IngestConfig, IngestEngine, IngestReport};
use crate::error::Result;
use crate::http::HttpTransport;
use crate::loader::{load_definition, IngestDefinition};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                definition,
                dry_run,
                max_requests,
                timeout_secs,
            } => {
                let mut config = IngestConfig::new()
                    .with_dry_run(*dry_run)
                    .with_max_requests(*max_requests);
                if let Some(secs) = timeout_secs {
                    config = config.with_deadline(Duration::from_secs(*secs));
                }
                self.ingest(definition, config).await
            }
            Commands::Validate { definition } => self.validate(definition),
        }
    }

    async fn ingest(&self, path: &Path, config: IngestConfig) -> Result<()> {
        let definition = load_definition(path)?;
        info!("Starting ingestion '{}'", definition.name);

        let mut engine = build_engine(&definition, config)?;
        let report = engine.run().await?;

        self.output_message(&report_message(&definition.name, &report));
        Ok(())
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let definition = load_definition(path)?;

        // Directives are verified when the engine is built
        let mut engine = build_engine(&definition, IngestConfig::new().with_dry_run(true))?;
        let first_url = engine.first_url()?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Definition '{}' is valid, loading into '{}'",
                    definition.name, definition.destination.table
                ),
                "first_url": first_url,
            }
        }));
        Ok(())
    }

    /// Output a message in the configured format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Build an engine for a definition
///
/// Dry runs get [`NullSink`] backends so nothing is opened or written.
/// The auxiliary database shares the destination's connection when both
/// name the same database.
pub fn build_engine(definition: &IngestDefinition, config: IngestConfig) -> Result<IngestEngine> {
    let request = definition.request()?;
    let response = definition.response()?;
    let table = definition.destination.table.as_str();

    let transport = HttpTransport::with_config(definition.source.transport_config())?;
    let config = config.with_request_delay(definition.source.request_delay());

    let (destination, utility): (Box<dyn DestinationSink>, Option<Box<dyn RowSource>>) =
        if config.dry_run {
            let utility = definition
                .source_query
                .as_ref()
                .map(|_| Box::new(NullSink::new(table)) as Box<dyn RowSource>);
            (Box::new(NullSink::new(table)), utility)
        } else {
            let sink = DuckDbSink::open(&definition.destination.database, table)?;
            let utility = match &definition.source_query {
                Some(_) if definition.utility_database() == sink.database() => {
                    Some(Box::new(sink.try_clone()?) as Box<dyn RowSource>)
                }
                Some(_) => Some(
                    Box::new(DuckDbSink::open(definition.utility_database(), table)?)
                        as Box<dyn RowSource>,
                ),
                None => None,
            };
            (Box::new(sink), utility)
        };

    let mut engine = IngestEngine::new(
        definition.source.base_url.clone(),
        request,
        response,
        Box::new(transport),
        destination,
    )?
    .with_variables(definition.variables.clone())
    .with_config(config);

    if let (Some(source), Some(query)) = (utility, &definition.source_query) {
        engine = engine.with_row_source(source, query.clone());
    }

    Ok(engine)
}

fn report_message(name: &str, report: &IngestReport) -> Value {
    let stats = &report.stats;
    json!({
        "type": "REPORT",
        "report": {
            "name": name,
            "dry_run": report.dry_run,
            "first_url": report.first_url,
            "phase": report.phase().to_string(),
            "records_processed": stats.records_processed,
            "requests_made": stats.requests_made,
            "empty_pages": stats.empty_pages,
            "upstream_errors": stats.upstream_errors,
            "column_mismatches": stats.column_mismatches,
            "field_directive_failures": stats.field_directive_failures,
            "rows_skipped": stats.rows_skipped,
            "duration_ms": stats.duration_ms,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_definition_from_str;

    const DEFINITION: &str = r#"
name: awards
source:
  base_url: https://api.example.org/awards
  sleep_ms: 100
destination:
  table: awards
source_query: "SELECT id FROM ${UTILITY_SCHEMA}.ids"
variables:
  AGENCY: NSF
rest_request:
  parameters:
    agency: "${AGENCY}"
rest_response: {}
"#;

    #[test]
    fn test_build_engine_dry_run_first_url() {
        let definition = load_definition_from_str(DEFINITION).unwrap();
        let mut engine = build_engine(&definition, IngestConfig::new().with_dry_run(true)).unwrap();
        assert_eq!(
            engine.first_url().unwrap().as_deref(),
            Some("https://api.example.org/awards?agency=NSF")
        );
    }

    #[test]
    fn test_build_engine_opens_duckdb() {
        let definition = load_definition_from_str(DEFINITION).unwrap();
        assert!(build_engine(&definition, IngestConfig::new()).is_ok());
    }

    #[test]
    fn test_build_engine_rejects_bad_directive() {
        let yaml = DEFINITION.replace(
            "    agency: \"${AGENCY}\"\n",
            "    agency:\n      value: x\n      verify: { type: sprintf, format: \"%s\" }\n",
        );
        let definition = load_definition_from_str(&yaml).unwrap();
        let result = build_engine(&definition, IngestConfig::new().with_dry_run(true));
        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_report_message_shape() {
        let report = IngestReport {
            stats: crate::engine::IngestStats {
                records_processed: 5,
                requests_made: 2,
                ..Default::default()
            },
            state: crate::pagination::PaginationState::default(),
            first_url: Some("https://api.example.org/awards".into()),
            dry_run: false,
        };
        let msg = report_message("awards", &report);
        assert_eq!(msg["type"], "REPORT");
        assert_eq!(msg["report"]["records_processed"], 5);
        assert_eq!(msg["report"]["phase"], "fetching");
    }
}
