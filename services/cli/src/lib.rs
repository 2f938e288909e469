//! Command line front end of the shelf life simulation.

mod cli;
pub mod output;

use chrono::NaiveDate;
use clap::Args;
use output::{ConsoleView, JsonLinesView};
use shelf_life::config::{parse_date, AppConfig, OutputFormat};
use shelf_life::error::AppError;
use shelf_life::loaders::{
    CategoryLoaderRegistry, ItemLoaderRegistry, LoaderAlias, LoaderContext, SourceSpec,
};
use shelf_life::rules::RuleRegistry;
use shelf_life::simulation::{RunSummary, ShelfSimulation};
use shelf_life::telemetry;
use shelf_life::view::InventoryView;
use std::process::ExitCode;
use std::sync::Arc;

pub fn run() -> Result<ExitCode, AppError> {
    cli::run()
}

/// Overrides for the environment configuration of a run.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// First simulated day (YYYY-MM-DD or YYYYMMDD)
    #[arg(long, value_parser = date_arg)]
    pub start: Option<NaiveDate>,
    /// Last simulated day, inclusive
    #[arg(long, value_parser = date_arg)]
    pub end: Option<NaiveDate>,
    /// Category source as key:payload, e.g. CSVFile:./productTypes.csv
    #[arg(long, value_parser = source_arg)]
    pub categories: Option<SourceSpec>,
    /// Item source as key:payload, e.g. SQLite:./shop.db
    #[arg(long, value_parser = source_arg)]
    pub items: Option<SourceSpec>,
    /// Report format: console or json
    #[arg(long)]
    pub output: Option<OutputFormat>,
}

impl RunArgs {
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(start) = self.start {
            config.simulation.start = start;
        }
        if let Some(end) = self.end {
            config.simulation.end = end;
        }
        if let Some(categories) = self.categories {
            config.sources.categories = categories;
        }
        if let Some(items) = self.items {
            config.sources.items = items;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
    }
}

fn date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("'{raw}' is not a date as YYYY-MM-DD or YYYYMMDD"))
}

fn source_arg(raw: &str) -> Result<SourceSpec, String> {
    SourceSpec::parse(raw).ok_or_else(|| format!("'{raw}' must look like 'key:payload'"))
}

/// Everything that resolves configuration keys, populated once at startup.
#[derive(Debug)]
pub struct Registries {
    pub rules: Arc<RuleRegistry>,
    pub categories: CategoryLoaderRegistry,
    pub items: ItemLoaderRegistry,
}

impl Registries {
    pub fn builtin(aliases: &[LoaderAlias]) -> Self {
        let mut categories = CategoryLoaderRegistry::with_builtin();
        let mut items = ItemLoaderRegistry::with_builtin();
        categories.apply_aliases(aliases);
        items.apply_aliases(aliases);

        Self {
            rules: Arc::new(RuleRegistry::with_builtin()),
            categories,
            items,
        }
    }

    /// Resolves both sources of `config` against the registries. Fails before
    /// anything is loaded when a key is unknown.
    pub fn simulation<V>(&self, config: &AppConfig, view: Arc<V>) -> Result<ShelfSimulation, AppError>
    where
        V: InventoryView + 'static,
    {
        let context = LoaderContext::new(view.clone(), self.rules.clone());

        let categories = self
            .categories
            .build(&config.sources.categories, &context)
            .ok_or_else(|| AppError::LoaderNotFound {
                kind: self.categories.kind(),
                spec: config.sources.categories.clone(),
            })?;
        let items = self
            .items
            .build(&config.sources.items, &context)
            .ok_or_else(|| AppError::LoaderNotFound {
                kind: self.items.kind(),
                spec: config.sources.items.clone(),
            })?;

        Ok(ShelfSimulation::new(categories, items, view))
    }
}

/// Runs one simulation against `view`. The outer error stops the process
/// before loading; the inner one is a load failure already shown by the view.
pub fn simulate<V>(
    config: &AppConfig,
    view: Arc<V>,
) -> Result<Result<RunSummary, shelf_life::loaders::DataAccessError>, AppError>
where
    V: InventoryView + 'static,
{
    let registries = Registries::builtin(&config.loader_aliases);
    let simulation = registries.simulation(config, view)?;
    Ok(simulation.execute(config.simulation.start, config.simulation.end))
}

pub(crate) fn run_simulation(args: RunArgs) -> Result<ExitCode, AppError> {
    let mut config = AppConfig::load()?;
    args.apply(&mut config);
    telemetry::init(&config.telemetry)?;

    tracing::debug!(
        categories = %config.sources.categories,
        items = %config.sources.items,
        output = %config.output,
        "configuration resolved"
    );

    let outcome = match config.output {
        OutputFormat::Console => simulate(&config, Arc::new(ConsoleView::stdio()))?,
        OutputFormat::Json => simulate(&config, Arc::new(JsonLinesView::stdout()))?,
    };

    Ok(match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}

pub(crate) fn list_keys() -> Result<ExitCode, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let registries = Registries::builtin(&config.loader_aliases);

    println!("rules:            {}", registries.rules.keys().join(", "));
    println!("category loaders: {}", registries.categories.keys().join(", "));
    println!("item loaders:     {}", registries.items.keys().join(", "));
    Ok(ExitCode::SUCCESS)
}
