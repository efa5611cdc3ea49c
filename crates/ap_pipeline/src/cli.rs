use std::sync::Arc;

use ap_content::topics::is_used;
use ap_content::CategoryResolver;
use ap_core::{Config, PostStore, Result};
use ap_images::ImageResolver;
use ap_inference::create_model;
use ap_storage::{create_store, TopicHistory};
use clap::{Args, Subcommand};

use crate::manager::PipelineManager;
use crate::publisher::HttpFetcher;
use crate::scheduler::Scheduler;

#[derive(Args, Debug)]
pub struct PipelineArgs {
    #[command(subcommand)]
    pub command: PipelineCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PipelineCommands {
    /// Publish on a schedule until interrupted
    Run {
        /// Stop after this many cycles
        #[arg(long)]
        max_cycles: Option<usize>,
    },
    /// Run a single cycle and exit
    Once,
    /// List the most recent published posts
    Audit {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List the topic pool, marking topics already used
    Topics,
    /// Show which category a topic would be filed under
    Classify {
        topic: String,
        /// Category name to try before keyword matching
        #[arg(long)]
        category: Option<String>,
    },
}

/// Validated configuration plus the backends chosen on the command line.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub config: Config,
    pub store_kind: String,
    pub model_kind: String,
    pub generate_topics: bool,
}

impl Pipeline {
    pub fn store(&self) -> Result<Arc<dyn PostStore>> {
        create_store(&self.store_kind, &self.config.site)
    }

    pub fn manager(&self) -> Result<PipelineManager> {
        let model = create_model(&self.model_kind, &self.config.model)?;
        let images = ImageResolver::from_config(&self.config.images)?;
        let fetcher = Arc::new(HttpFetcher::new(self.config.images.timeout)?);
        Ok(PipelineManager::new(&self.config, model, self.store()?, images, fetcher)?
            .with_generated_topics(self.generate_topics))
    }
}

pub async fn handle_command(command: PipelineCommands, pipeline: Pipeline) -> Result<()> {
    match command {
        PipelineCommands::Run { max_cycles } => {
            let mut manager = pipeline.manager()?;
            let mut scheduler = Scheduler::new(&pipeline.config.schedule);
            let finished = scheduler.run(&mut manager, max_cycles).await;
            println!("Finished {} cycles", finished);
        }
        PipelineCommands::Once => {
            let report = pipeline.manager()?.run_cycle().await?;
            println!("{}", report);
        }
        PipelineCommands::Audit { limit } => {
            let posts = pipeline.store()?.recent_posts(limit).await?;
            if posts.is_empty() {
                println!("No published posts");
            }
            for post in posts {
                let categories: Vec<String> = post.categories.iter().map(u64::to_string).collect();
                println!(
                    "#{}\t{}\t[{}]\t{}",
                    post.id,
                    post.slug,
                    categories.join(","),
                    post.link
                );
            }
        }
        PipelineCommands::Topics => {
            let used = TopicHistory::new(&pipeline.config.state.topics_history).load().await?;
            for entry in &pipeline.config.topics {
                let mark = if is_used(&entry.text, &used) { "✓" } else { " " };
                match &entry.category {
                    Some(category) => println!("[{}] {} ({})", mark, entry.text, category),
                    None => println!("[{}] {}", mark, entry.text),
                }
            }
            println!("{} topics, {} used", pipeline.config.topics.len(), used.len());
        }
        PipelineCommands::Classify { topic, category } => {
            let resolver = CategoryResolver::new(pipeline.config.categories.clone());
            let id = resolver.resolve_category(&topic, category.as_deref());
            println!("{} → {} ({})", topic, resolver.name_of(id).unwrap_or("unmapped"), id);
        }
    }
    Ok(())
}
