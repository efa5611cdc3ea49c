use std::path::PathBuf;

use anyhow::Context;
use ap_core::config::{load_products_file, load_topics_file, parse_category_map, ScheduleConfig, StateConfig};
use ap_core::Config;
use ap_pipeline::logging::init_logging;
use ap_pipeline::{handle_command, Pipeline, PipelineCommands};
use clap::Parser;
use tracing::info;

mod duration;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Writes and publishes blog posts on a schedule", long_about = None)]
struct Cli {
    /// Where posts go: wordpress or memory
    #[arg(long, env = "AUTOPRESS_STORE", default_value = "wordpress")]
    store: String,
    /// Text model: openai or dummy
    #[arg(long, env = "AUTOPRESS_MODEL", default_value = "openai")]
    model: String,
    #[arg(long, env = "WP_BASE_URL")]
    wp_base_url: Option<String>,
    #[arg(long, env = "WP_USERNAME")]
    wp_username: Option<String>,
    #[arg(long, env = "WP_APP_PASSWORD", hide_env_values = true)]
    wp_app_password: Option<String>,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,
    #[arg(long, env = "OPENAI_MODEL")]
    openai_model: Option<String>,
    /// Any OpenAI-compatible chat completions endpoint
    #[arg(long, env = "OPENAI_BASE_URL")]
    openai_base_url: Option<String>,
    #[arg(long, env = "PEXELS_API_KEY", hide_env_values = true)]
    pexels_api_key: Option<String>,
    #[arg(long, env = "PIXABAY_API_KEY", hide_env_values = true)]
    pixabay_api_key: Option<String>,
    #[arg(long, env = "AFFILIATE_TAG")]
    affiliate_tag: Option<String>,
    /// JSON array of {name, url} used when no products are suggested
    #[arg(long, env = "PRODUCTS_FILE")]
    products_file: Option<PathBuf>,
    /// Category ids as name=id pairs, e.g. outdoors=1,hunting=2
    #[arg(long, env = "CATEGORY_MAP")]
    category_map: Option<String>,
    #[arg(long, env = "DEFAULT_CATEGORY")]
    default_category: Option<String>,
    /// JSON array of topics, as strings or {text, category}
    #[arg(long, env = "TOPICS_FILE")]
    topics_file: Option<PathBuf>,
    #[arg(long, env = "BLOG_NICHE")]
    niche: Option<String>,
    /// Let the model propose every topic
    #[arg(long)]
    generate_topics: bool,
    /// Shortest pause between cycles (e.g. 45m, 1h15m)
    #[arg(long, env = "MIN_INTERVAL", default_value = "45m")]
    min_interval: HumanDuration,
    #[arg(long, env = "MAX_INTERVAL", default_value = "75m")]
    max_interval: HumanDuration,
    /// Topic history, internal-links log and application log live here
    #[arg(long, env = "AUTOPRESS_STATE_DIR", default_value = "data")]
    state_dir: PathBuf,
    /// Timeout for WordPress requests
    #[arg(long, env = "HTTP_TIMEOUT", default_value = "30s")]
    http_timeout: HumanDuration,
    /// Related posts linked from each article
    #[arg(long, default_value_t = 3)]
    internal_links: usize,
    /// Log to stdout only
    #[arg(long)]
    no_log_file: bool,
    #[command(subcommand)]
    command: PipelineCommands,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::default();

    config.site.base_url = non_empty(&cli.wp_base_url).unwrap_or_default();
    config.site.username = non_empty(&cli.wp_username).unwrap_or_default();
    config.site.app_password = non_empty(&cli.wp_app_password).unwrap_or_default();
    config.site.timeout = cli.http_timeout.0;

    config.model.api_key = non_empty(&cli.openai_api_key);
    if let Some(model) = non_empty(&cli.openai_model) {
        config.model.model_name = model;
    }
    if let Some(base_url) = non_empty(&cli.openai_base_url) {
        config.model.base_url = base_url;
    }

    config.images.pexels_key = non_empty(&cli.pexels_api_key);
    config.images.pixabay_key = non_empty(&cli.pixabay_api_key);

    if let Some(tag) = non_empty(&cli.affiliate_tag) {
        config.affiliate.tag = tag;
    }
    if let Some(path) = &cli.products_file {
        config.affiliate.static_products = load_products_file(path)
            .with_context(|| format!("Failed to read products from {}", path.display()))?;
    }

    if let Some(map) = non_empty(&cli.category_map) {
        config.categories.ids = parse_category_map(&map)?;
    }
    if let Some(category) = non_empty(&cli.default_category) {
        config.categories.default_category = category.to_lowercase();
    }

    if let Some(path) = &cli.topics_file {
        config.topics = load_topics_file(path)
            .with_context(|| format!("Failed to read topics from {}", path.display()))?;
    }
    if let Some(niche) = non_empty(&cli.niche) {
        config.niche = niche;
    }

    config.schedule = ScheduleConfig {
        min_interval: cli.min_interval.0,
        max_interval: cli.max_interval.0,
    };
    config.state = StateConfig::in_dir(&cli.state_dir);
    config.internal_link_count = cli.internal_links;

    let uses_store = matches!(
        cli.command,
        PipelineCommands::Run { .. } | PipelineCommands::Once | PipelineCommands::Audit { .. }
    );
    config.validate(uses_store && cli.store.eq_ignore_ascii_case("wordpress"))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_file = if cli.no_log_file {
        None
    } else {
        StateConfig::in_dir(&cli.state_dir).app_log
    };
    let _log_guard = init_logging(log_file.as_deref());

    let config = build_config(&cli)?;
    info!(
        "🦗 autopress starting (store: {}, model: {}, every {} to {})",
        cli.store, cli.model, cli.min_interval, cli.max_interval
    );

    let pipeline = Pipeline {
        config,
        store_kind: cli.store,
        model_kind: cli.model,
        generate_topics: cli.generate_topics,
    };
    handle_command(cli.command, pipeline).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::time::Duration;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["autopress", "--store", "memory", "--model", "dummy"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_config_from_flags() {
        let cli = cli(&[
            "--min-interval",
            "10m",
            "--max-interval",
            "1h",
            "--category-map",
            "outdoors=1,hunting=9",
            "--state-dir",
            "/tmp/autopress-test",
            "--affiliate-tag",
            "mytag-20",
            "classify",
            "duck calls",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.schedule.min_interval, Duration::from_secs(600));
        assert_eq!(config.schedule.max_interval, Duration::from_secs(3600));
        assert_eq!(config.categories.id_of("hunting"), Some(9));
        assert_eq!(config.affiliate.tag, "mytag-20");
        assert_eq!(
            config.state.topics_history,
            PathBuf::from("/tmp/autopress-test/used_topics.json")
        );
    }

    #[test]
    fn test_inverted_intervals_rejected() {
        let cli = cli(&["--min-interval", "2h", "--max-interval", "1h", "once"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_subcommands_parse() {
        assert!(matches!(
            cli(&["run", "--max-cycles", "2"]).command,
            PipelineCommands::Run { max_cycles: Some(2) }
        ));
        assert!(matches!(
            cli(&["audit"]).command,
            PipelineCommands::Audit { limit: 10 }
        ));
        assert!(Cli::try_parse_from(["autopress", "--min-interval", "soon", "once"]).is_err());
    }
}
