use anyhow::{Context, Result};
use caipu_recommend::cli::{parse_args, Cli};
use caipu_recommend::config::Config;
use caipu_recommend::presets::PRESETS;
use caipu_recommend::recommender::{RecommendRequest, Recommender};
use caipu_recommend::session::RequestContext;
use caipu_recommend::source::{embedded_catalog, CandidateSource, CatalogSource, FallbackCatalog, HttpRecipeSource};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn build_source(config: &Config) -> Result<Arc<dyn CandidateSource>> {
    if let Some(url) = &config.source_url {
        info!(url = %url, "using recipe backend");
        let source = HttpRecipeSource::new(url, config.request_timeout())
            .with_context(|| format!("Failed to set up recipe backend at '{}'", url))?;
        return Ok(Arc::new(source));
    }
    if let Some(path) = &config.catalog_path {
        let source = CatalogSource::from_path(path)
            .with_context(|| format!("Failed to load recipe catalog from {:?}", path))?;
        info!(recipes = source.len(), "using catalog file");
        return Ok(Arc::new(source));
    }
    info!("no recipe source configured, serving the embedded catalog");
    Ok(Arc::new(CatalogSource::new("embedded", embedded_catalog()?)))
}

fn print_presets() {
    for preset in PRESETS.iter() {
        println!("{}", preset.summary());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env();
    cli.apply_to(&mut config);

    let preferences = cli.preferences().map_err(|e| anyhow::anyhow!(e))?;
    let request = RecommendRequest {
        preferences,
        search_query: cli.query.clone(),
    };

    let mut context = match &config.session_path {
        Some(path) => RequestContext::load(path)?,
        None => RequestContext::default(),
    };
    if cli.clear_search {
        context.clear_search();
    }

    let source = build_source(&config)?;
    let recommender = match &config.fallback_path {
        Some(path) => Recommender::with_fallback(source, FallbackCatalog::from_file(path)?, config.recommender_settings()),
        None => Recommender::new(source, config.recommender_settings())?,
    };
    let settings = recommender.settings();
    info!(
        limit = settings.limit,
        search_alpha = settings.search_alpha,
        browse_alpha = settings.browse_alpha,
        proximity_prefilter = settings.proximity_prefilter,
        "recommender ready"
    );

    let response = match cli.seed {
        Some(seed) => recommender.recommend_seeded(&request, &context, seed).await,
        None => recommender.recommend(&request, &context).await,
    };

    if let Some(path) = &config.session_path {
        context.remember(request.search_query.as_deref(), request.preferences);
        context.save(path)?;
    }

    let output = serde_json::to_string_pretty(&response).context("Failed to serialize response")?;
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = parse_args();
    if cli.list_presets {
        print_presets();
        return Ok(());
    }
    run(cli).await
}
