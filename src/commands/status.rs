use clap::Args;
use nibble_core::SyncStatus;

use super::OutputFormat;
use crate::app;
use crate::config::Config;

/// Show connectivity and pending-sync state
#[derive(Args)]
pub struct StatusCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl StatusCommand {
    pub async fn run(
        &self,
        config: &Config,
        forced_offline: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let cache = app::open_cache(config).await?;
        let sync = app::connect(config, cache, forced_offline).await;
        let status = sync.status();

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
            OutputFormat::Text => print_status(&config.api_url.value, &status),
        }
        Ok(())
    }
}

fn print_status(api_url: &str, status: &SyncStatus) {
    println!("Server:    {}", api_url);

    let connection = if status.forced_offline {
        "offline (forced)"
    } else if status.online {
        "online"
    } else {
        "offline"
    };
    println!("Network:   {}", connection);

    match status.last_sync_at {
        Some(at) => println!("Last sync: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Last sync: never"),
    }
    println!("Pending:   {}", pending_label(status.queue_length));
}

fn pending_label(count: usize) -> String {
    match count {
        0 => "nothing to sync".to_string(),
        1 => "1 request".to_string(),
        n => format!("{} requests", n),
    }
}
