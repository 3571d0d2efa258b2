use clap::{Args, Subcommand};
use nibble_core::{CacheEntry, DomainCache};
use serde_json::Value;

use crate::app;
use crate::config::Config;

#[derive(Args)]
pub struct CacheCommand {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand)]
pub enum CacheSubcommand {
    /// Print the cached value stored under a key
    Show {
        /// Cache key (e.g., USER_PROFILE)
        key: String,
    },

    /// Remove all cached data (pending requests are kept)
    Clear,

    /// Show which data is cached
    Stats,
}

impl CacheCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let domain = DomainCache::new(app::open_cache(config).await?);

        match &self.command {
            CacheSubcommand::Show { key } => {
                let cache = domain.inner();
                match cache.get_entry::<Value>(key).await {
                    Some(entry) => {
                        println!("{}", describe(&entry));
                        println!("{}", serde_json::to_string_pretty(&entry.data)?);
                    }
                    None => println!("No cached data for {}", key),
                }
            }
            CacheSubcommand::Clear => {
                domain.inner().clear_all().await;
                println!("Cache cleared");
            }
            CacheSubcommand::Stats => {
                let stats = domain.cache_stats().await;
                for key in &stats.present {
                    println!("  ✓ {}", key);
                }
                for key in &stats.missing {
                    println!("  - {}", key);
                }
                println!();
                println!(
                    "{} of {} cached",
                    stats.present.len(),
                    stats.present.len() + stats.missing.len()
                );
            }
        }
        Ok(())
    }
}

fn describe(entry: &CacheEntry<Value>) -> String {
    format!(
        "stored {} (expires {})",
        entry.stored_at.format("%Y-%m-%d %H:%M:%S UTC"),
        entry.expires_at().format("%Y-%m-%d %H:%M:%S UTC")
    )
}
