use crate::config;
use crate::domain::DomainLookup;
use crate::logging::ndjson;
use crate::logstore::store::{LogStore, open_snapshot};
use crate::lrs::{RemoteLrs, StatementStore};
use crate::pipeline::emit::EmitContext;
use crate::pipeline::{Enriched, SkipReason, StatementGenerator};
use crate::recipes::Recipe;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RunCommand {
    pub config: PathBuf,
    pub db: Option<PathBuf>,
    pub batch_size: Option<u64>,
    pub recipes: Vec<String>,
    pub log: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct RecipeStats {
    pub pages: usize,
    pub records: usize,
    pub statements: usize,
    pub skipped: usize,
    pub errors: usize,
}

pub fn execute_run(cmd: RunCommand) -> Result<()> {
    let cfg = config::load_config(&cmd.config)?;
    let recipes = selected_recipes(&cmd.recipes)?;
    let batch_size = cmd.batch_size.unwrap_or(cfg.batch_size);
    if batch_size == 0 {
        bail!("--batch-size must be at least 1");
    }
    let db = match cmd.db.or_else(|| cfg.platform.db.clone()) {
        Some(db) => db,
        None => bail!("no snapshot db given; set `[platform].db` in config or pass --db"),
    };

    let lrs = RemoteLrs::new(
        &cfg.lrs.endpoint,
        &cfg.lrs.xapi_version,
        &cfg.lrs.username,
        &cfg.lrs.password,
    )?;
    check_connectivity(&lrs)?;

    let conn = open_snapshot(&db)?;
    let cx = EmitContext {
        platform_url: cfg.platform.url.clone(),
        platform_name: cfg.platform.name.clone(),
    };
    let results = run_backfill(&conn, &lrs, cx, &recipes, batch_size, cmd.log.as_deref())?;

    for (recipe, stats) in &results {
        println!(
            "{}: {} records, {} statements, {} skipped, {} errors",
            recipe.display(),
            stats.records,
            stats.statements,
            stats.skipped,
            stats.errors
        );
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CheckCommand {
    pub config: PathBuf,
}

pub fn execute_check(cmd: CheckCommand) -> Result<()> {
    let cfg = config::load_config(&cmd.config)?;
    let lrs = RemoteLrs::new(
        &cfg.lrs.endpoint,
        &cfg.lrs.xapi_version,
        &cfg.lrs.username,
        &cfg.lrs.password,
    )?;
    check_connectivity(&lrs)
}

pub fn list_recipes() -> Result<()> {
    for recipe in Recipe::ALL {
        let filter = recipe.filter();
        let module = filter.module.unwrap_or("*");
        let actions = if filter.actions.is_empty() {
            "*".to_string()
        } else {
            filter.actions.join(" | ")
        };
        println!(
            "{:<22} key={:<22} module={module} action={actions}",
            recipe.display(),
            recipe.key()
        );
    }
    Ok(())
}

/// The handshake runs before any log processing; a store we cannot reach is a
/// hard stop.
fn check_connectivity(lrs: &dyn StatementStore) -> Result<()> {
    let about = lrs
        .about()
        .context("unable to connect to statement store")?;
    println!("xAPI versions: {}", about.versions.join(", "));
    Ok(())
}

pub fn selected_recipes(keys: &[String]) -> Result<Vec<Recipe>> {
    if keys.is_empty() {
        return Ok(Recipe::ALL.to_vec());
    }
    let mut recipes = Vec::new();
    for key in keys {
        let Some(recipe) = Recipe::from_key(key) else {
            let known = Recipe::ALL.map(|r| r.key()).join(", ");
            bail!("unknown recipe `{key}`; expected one of: {known}");
        };
        if !recipes.contains(&recipe) {
            recipes.push(recipe);
        }
    }
    Ok(recipes)
}

/// Runs the selected recipes strictly in order against one snapshot
/// connection and one statement store.
pub fn run_backfill(
    conn: &Connection,
    lrs: &dyn StatementStore,
    cx: EmitContext,
    recipes: &[Recipe],
    batch_size: u64,
    mirror: Option<&Path>,
) -> Result<Vec<(Recipe, RecipeStats)>> {
    let store = LogStore::new(conn);
    let lookup = DomainLookup::new(conn);
    let generator = StatementGenerator::new(cx);

    let mut results = Vec::with_capacity(recipes.len());
    for &recipe in recipes {
        let stats = run_recipe(recipe, &store, &lookup, &generator, lrs, batch_size, mirror)?;
        results.push((recipe, stats));
    }
    Ok(results)
}

/// Pages through the recipe's matching log records and submits one batch per
/// page. Per-record failures are logged and skipped; a failed submission
/// aborts the recipe with no retry.
pub fn run_recipe(
    recipe: Recipe,
    store: &LogStore,
    lookup: &DomainLookup,
    generator: &StatementGenerator,
    lrs: &dyn StatementStore,
    batch_size: u64,
    mirror: Option<&Path>,
) -> Result<RecipeStats> {
    println!("Processing {} events", recipe.display());
    let filter = recipe.filter();
    let mut stats = RecipeStats::default();
    let mut start: u64 = 0;

    loop {
        let page = store.select(&filter, start, batch_size)?;
        if page.is_empty() {
            break;
        }
        let page_len = page.len();

        let mut statements = Vec::new();
        for record in &page {
            stats.records += 1;
            let enriched = recipe.enrich(record, lookup)?;
            let event = match enriched {
                Enriched::Skip(SkipReason::NotApplicable(_)) => {
                    stats.skipped += 1;
                    continue;
                }
                Enriched::Skip(SkipReason::Missing(msg)) => {
                    eprintln!("MISSING: {msg}");
                    if let Some(path) = mirror {
                        ndjson::mirror_skip(path, recipe.key(), record.id, &msg)?;
                    }
                    stats.skipped += 1;
                    continue;
                }
                Enriched::Event(event) => event,
            };
            match generator.generate(event) {
                Ok(Some(statement)) => statements.push(statement),
                Ok(None) => stats.skipped += 1,
                Err(err) => {
                    eprintln!("ERROR: record {}: {err:#}", record.id);
                    if let Some(path) = mirror {
                        ndjson::mirror_record_error(
                            path,
                            recipe.key(),
                            record.id,
                            &format!("{err:#}"),
                        )?;
                    }
                    stats.errors += 1;
                }
            }
        }

        println!("Sending statements {}", format_page_range(start, page_len));
        println!("Statement count: {}", statements.len());
        lrs.save_statements(&statements).with_context(|| {
            format!(
                "submit {} batch at offset {start}",
                recipe.display()
            )
        })?;

        if let Some(path) = mirror {
            ndjson::mirror_page(
                path,
                recipe.key(),
                start,
                start + page_len as u64 - 1,
                statements.len(),
            )?;
        }
        stats.pages += 1;
        stats.statements += statements.len();
        start += page_len as u64;
        if (page_len as u64) < batch_size {
            break;
        }
    }

    Ok(stats)
}

pub fn format_page_range(start: u64, page_len: usize) -> String {
    format!("{start} to {}", start + page_len as u64 - 1)
}
