//! Execution engine module
//!
//! Main fetch/advance loop for a single ingestion.
//!
//! # Overview
//!
//! The engine module provides:
//! - `IngestEngine` - Walks pages and writes their records to the destination
//! - `IngestConfig` - Dry run, delays, safety caps and deadline
//! - `IngestStats` / `IngestReport` - What a run did
//!
//! Every page goes through Fetching, Unwrapping, then Collecting, Skipping or
//! Erroring, then Advancing, until the run is Exhausted. Pages are strictly
//! sequential because the next request depends on the current response or
//! on the row-source cursor.

mod types;

pub use types::{IngestConfig, IngestReport, IngestStats};

use crate::batch::{BatchBuilder, FieldMapping};
use crate::config::{RestRequestConfig, RestResponseConfig};
use crate::database::{DestinationSink, RowSource};
use crate::directive::{compile_table, DirectiveTable};
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::pagination::{NextPage, PageAdvancer, PaginationState, Phase, RowSourceIterator};
use crate::request::RequestBuilder;
use crate::response::{unwrap_response, ResponseLayout, UnwrapOutcome};
use crate::template::substitute;
use crate::types::JsonValue;
use indexmap::IndexMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Macro naming the auxiliary database's schema
pub const UTILITY_SCHEMA: &str = "UTILITY_SCHEMA";

/// Ingestion engine for one REST endpoint and one destination table
pub struct IngestEngine {
    transport: Box<dyn Transport>,
    destination: Box<dyn DestinationSink>,
    row_source: Option<Box<dyn RowSource>>,
    source_query: Option<String>,
    builder: RequestBuilder,
    layout: ResponseLayout,
    field_map: Option<IndexMap<String, String>>,
    response_directives: DirectiveTable,
    variables: IndexMap<String, String>,
    config: IngestConfig,
    stats: IngestStats,
    state: PaginationState,
}

impl IngestEngine {
    /// Create an engine
    ///
    /// Splits directives out of both configuration sections and verifies
    /// them; any malformed or unsupported directive fails here, before I/O.
    pub fn new(
        base_url: impl Into<String>,
        request: &RestRequestConfig,
        response: &RestResponseConfig,
        transport: Box<dyn Transport>,
        destination: Box<dyn DestinationSink>,
    ) -> Result<Self> {
        let (parameters, parameter_rules) = request.split()?;
        let parameter_directives = compile_table(&parameter_rules)?;

        let (field_map, field_rules) = response.split();
        let response_directives = compile_table(&field_rules)?;

        debug!(
            "Verified directives for {} parameters and {} response fields",
            parameter_directives.len(),
            response_directives.len()
        );

        let builder = RequestBuilder::new(base_url)
            .with_format(request.format.clone())
            .with_parameters(parameters)
            .with_directives(parameter_directives);

        Ok(Self {
            transport,
            destination,
            row_source: None,
            source_query: None,
            builder,
            layout: response.layout(),
            field_map,
            response_directives,
            variables: IndexMap::new(),
            config: IngestConfig::default(),
            stats: IngestStats::default(),
            state: PaginationState::default(),
        })
    }

    /// Set ingest configuration
    #[must_use]
    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    /// Drive requests from the rows of `query` against `source`
    #[must_use]
    pub fn with_row_source(mut self, source: Box<dyn RowSource>, query: impl Into<String>) -> Self {
        self.row_source = Some(source);
        self.source_query = Some(query.into());
        self
    }

    /// Set macro variables for parameter values and the source query
    #[must_use]
    pub fn with_variables(mut self, variables: IndexMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    /// Get statistics
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Get the live pagination state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Get the request builder
    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Build the first request URL without any I/O
    pub fn first_url(&mut self) -> Result<Option<String>> {
        self.apply_variables();
        Ok(self.builder.build()?.url().map(str::to_string))
    }

    /// Run the ingestion
    ///
    /// Fatal errors after the first fetch come back as [`Error::Aborted`]
    /// carrying the progress made so far.
    pub async fn run(&mut self) -> Result<IngestReport> {
        let start = Instant::now();

        let result = self.run_inner().await;

        self.stats.set_duration(start.elapsed().as_millis() as u64);

        match result {
            Ok(first_url) => {
                info!(
                    "Processed {} records in {} REST requests ({}ms)",
                    self.stats.records_processed, self.stats.requests_made, self.stats.duration_ms
                );
                Ok(IngestReport {
                    stats: self.stats.clone(),
                    state: self.state.clone(),
                    first_url,
                    dry_run: self.config.dry_run,
                })
            }
            Err(err) if self.stats.requests_made > 0 => {
                error!("Ingestion failed at {}: {err}", self.state.phase);
                Err(err.aborted(self.stats.records_processed, self.stats.requests_made))
            }
            Err(err) => Err(err),
        }
    }

    async fn run_inner(&mut self) -> Result<Option<String>> {
        self.apply_variables();

        if self.config.dry_run {
            let first_url = self.builder.build()?.url().map(str::to_string);
            match &first_url {
                Some(url) => info!("Dry run, first request would be {url}"),
                None => warn!("Dry run, first request could not be built"),
            }
            self.state.mark_exhausted();
            return Ok(first_url);
        }

        // A configured field map is checked against the table up front
        let mapping = match &self.field_map {
            Some(field_map) => Some(FieldMapping::configured(
                field_map.clone(),
                &self.destination.column_names()?,
            )?),
            None => None,
        };

        let row_source = match (&mut self.row_source, &self.source_query) {
            (Some(source), Some(query)) => {
                debug!("Source query: {query}");
                Some(RowSourceIterator::new(source.query(query)?))
            }
            _ => None,
        };
        let mut advancer = PageAdvancer::select(row_source, self.layout.next.as_deref());

        let fast_load = self.destination.storage_engine().eq_ignore_ascii_case("myisam");
        if fast_load {
            self.set_keys(false)?;
        }

        // The deadline covers paging only, so the keys bracket always closes
        let result = match self.config.deadline {
            Some(deadline) => {
                match tokio::time::timeout(deadline, self.paginate(&mut advancer, mapping)).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::cancelled(format!(
                        "deadline of {}s reached",
                        deadline.as_secs_f64()
                    ))),
                }
            }
            None => self.paginate(&mut advancer, mapping).await,
        };

        if let Some(iterator) = advancer.row_source() {
            self.stats.rows_skipped = iterator.rows_skipped();
        }

        if fast_load {
            // Keys come back on even when the run failed
            let enabled = self.set_keys(true);
            if let Err(err) = &enabled {
                error!("Failed to re-enable keys on {}: {err}", self.destination.table_name());
            }
            return result.and_then(|first_url| enabled.map(|()| first_url));
        }

        result
    }

    async fn paginate(
        &mut self,
        advancer: &mut PageAdvancer,
        mut mapping: Option<FieldMapping>,
    ) -> Result<Option<String>> {
        let mut url = match advancer.first(&mut self.builder)? {
            NextPage::Continue { url } => url,
            NextPage::Done => {
                if advancer.row_source().is_none() {
                    error!("Initial request could not be built, nothing to ingest");
                }
                self.state.mark_exhausted();
                return Ok(None);
            }
        };
        let first_url = Some(url.clone());

        let mut block_start = Instant::now();
        let mut logged_blocks = 0;

        loop {
            if self.config.max_requests > 0 && self.stats.requests_made >= self.config.max_requests {
                warn!("Reached the limit of {} requests, stopping", self.config.max_requests);
                break;
            }

            // Fetching
            self.transport.set_target_url(&url)?;
            self.state.begin_fetch(url.clone());
            self.stats.add_request();
            let body = self.transport.fetch().await?;

            // Unwrapping
            self.state.enter(Phase::Unwrapping);
            let outcome = unwrap_response(&body, &self.layout)?;

            match &outcome {
                UnwrapOutcome::UpstreamError { payload, .. } => {
                    self.state.enter(Phase::Erroring);
                    self.stats.upstream_errors += 1;
                    warn!("Error response from {url}: {payload}");
                }
                UnwrapOutcome::Page(page) if page.is_empty() => {
                    self.state.enter(Phase::Skipping);
                    self.stats.empty_pages += 1;
                    info!("No results returned from {url}");
                }
                UnwrapOutcome::Page(page) => {
                    self.state.enter(Phase::Collecting);

                    if mapping.is_none() {
                        if let Some(count) = &page.count {
                            info!("Ingesting {count} records");
                        }
                        mapping = Some(self.discover_mapping(&page.results[0])?);
                    }
                    if let Some(mapping) = &mapping {
                        self.write_page(mapping, &page.results)?;
                    }
                    self.state.add_records(page.len());
                    self.stats.add_records(page.len());

                    let blocks = self.stats.records_processed / self.config.log_every.max(1);
                    if blocks > logged_blocks {
                        logged_blocks = blocks;
                        info!(
                            "Processed {} records ({:.2}s per {})",
                            self.stats.records_processed,
                            block_start.elapsed().as_secs_f64(),
                            self.config.log_every
                        );
                        block_start = Instant::now();
                    }
                }
            }

            // Advancing
            self.state.enter(Phase::Advancing);
            let current = self.transport.current_url().map(str::to_string);
            match advancer.advance(outcome.next(), current.as_deref(), &mut self.builder)? {
                NextPage::Continue { url: next } => url = next,
                NextPage::Done => break,
            }

            if let Some(delay) = self.config.request_delay {
                tokio::time::sleep(delay).await;
            }
        }

        self.state.mark_exhausted();
        Ok(first_url)
    }

    /// Identity mapping from the first record, checked against the table
    fn discover_mapping(&self, first: &JsonValue) -> Result<FieldMapping> {
        let columns = self.destination.column_names()?;
        let mapping = FieldMapping::discover(first, &columns)?;
        debug!("Discovered {} fields from first result", mapping.len());
        Ok(mapping)
    }

    fn write_page(&mut self, mapping: &FieldMapping, results: &[JsonValue]) -> Result<usize> {
        let statement = BatchBuilder::new(
            self.destination.table_name(),
            mapping,
            &self.response_directives,
        )
        .build(results)?;

        if statement.column_mismatches() > 0 {
            warn!(
                "{} records did not supply every mapped field. url = {}",
                statement.column_mismatches(),
                self.state.current_url.as_deref().unwrap_or_default()
            );
        }
        self.stats.column_mismatches += statement.column_mismatches();
        self.stats.field_directive_failures += statement.field_failures();

        let style = self.destination.placeholder_style();
        debug!("{}", statement.debug_sql(style));
        self.destination
            .execute_batch(&statement.sql(style), statement.params())
    }

    fn set_keys(&mut self, enable: bool) -> Result<()> {
        let sql = format!(
            "ALTER TABLE {} {} KEYS",
            self.destination.table_name(),
            if enable { "ENABLE" } else { "DISABLE" }
        );
        debug!("{sql}");
        self.destination.execute_sql(&sql)?;
        Ok(())
    }

    /// Substitute macro variables into parameters and the source query
    fn apply_variables(&mut self) {
        let mut variables = self.variables.clone();
        let schema = self
            .row_source
            .as_ref()
            .map_or("main", |source| source.schema_name())
            .to_string();
        variables.entry(UTILITY_SCHEMA.to_string()).or_insert(schema);

        self.builder.parameters_mut().substitute_variables(&variables);
        if let Some(query) = &self.source_query {
            self.source_query = Some(substitute(query, &variables).expanded);
        }
    }
}

impl std::fmt::Debug for IngestEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestEngine")
            .field("base_url", &self.builder.base_url())
            .field("table", &self.destination.table_name())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
