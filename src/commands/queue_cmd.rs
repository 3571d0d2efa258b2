use clap::{Args, Subcommand};
use nibble_core::{DeadLetter, OfflineQueue, QueueItem, WriteMethod};

use super::parse_data;
use crate::app;
use crate::config::Config;

#[derive(Args)]
pub struct QueueCommand {
    #[command(subcommand)]
    pub command: QueueSubcommand,
}

#[derive(Subcommand)]
pub enum QueueSubcommand {
    /// List pending requests, oldest first
    List,

    /// Queue a request for the next sync
    Add {
        /// POST, PUT or DELETE
        method: WriteMethod,

        /// Endpoint relative to the API URL (e.g., /diary)
        endpoint: String,

        /// JSON request body
        #[arg(long, short)]
        data: Option<String>,
    },

    /// Remove a pending request
    Remove {
        /// Queue item ID
        id: String,
    },

    /// Remove all pending requests
    Clear,

    /// Show requests dropped after exhausting their retries
    DeadLetters {
        /// Empty the dead-letter list
        #[arg(long)]
        clear: bool,
    },
}

impl QueueCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let queue = OfflineQueue::new(app::open_cache(config).await?);

        match &self.command {
            QueueSubcommand::List => {
                let items = queue.list().await;
                if items.is_empty() {
                    println!("No pending requests.");
                    return Ok(());
                }
                for item in &items {
                    println!("{}", format_item(item));
                }
                println!();
                println!("{} pending", items.len());
            }
            QueueSubcommand::Add {
                method,
                endpoint,
                data,
            } => {
                let payload = parse_data(data.as_deref())?;
                let item = queue.enqueue(endpoint.as_str(), *method, payload).await;
                println!("Queued {} {} ({})", item.method, item.endpoint, item.id);
            }
            QueueSubcommand::Remove { id } => {
                let before = queue.len().await;
                queue.dequeue(id).await;
                if queue.len().await < before {
                    println!("Removed {}", id);
                } else {
                    return Err(format!("No queued request with ID '{}'", id).into());
                }
            }
            QueueSubcommand::Clear => {
                let count = queue.len().await;
                queue.clear().await;
                println!("Cleared {} pending request(s)", count);
            }
            QueueSubcommand::DeadLetters { clear } => {
                if *clear {
                    queue.clear_dead_letters().await;
                    println!("Cleared dead letters");
                    return Ok(());
                }
                let letters = queue.dead_letters().await;
                if letters.is_empty() {
                    println!("No dead letters.");
                }
                for letter in &letters {
                    println!("{}", format_dead_letter(letter));
                }
            }
        }
        Ok(())
    }
}

fn format_item(item: &QueueItem) -> String {
    let mut line = format!(
        "{}  {:<6} {}  queued {}",
        item.id,
        item.method,
        item.endpoint,
        item.enqueued_at.format("%Y-%m-%d %H:%M")
    );
    if item.retry_count > 0 {
        line.push_str(&format!("  retries: {}", item.retry_count));
    }
    line
}

fn format_dead_letter(letter: &DeadLetter) -> String {
    format!(
        "{}  {:<6} {}  dropped {}: {}",
        letter.item.id,
        letter.item.method,
        letter.item.endpoint,
        letter.evicted_at.format("%Y-%m-%d %H:%M"),
        letter.reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    fn item(retry_count: u32) -> QueueItem {
        QueueItem {
            id: "1718000000000-abc123xyz".to_string(),
            endpoint: "/diary".to_string(),
            method: WriteMethod::Post,
            payload: Value::Null,
            enqueued_at: Utc.with_ymd_and_hms(2025, 6, 10, 8, 30, 0).unwrap(),
            retry_count,
            fingerprint: String::new(),
        }
    }

    #[test]
    fn test_format_item() {
        assert_eq!(
            format_item(&item(0)),
            "1718000000000-abc123xyz  POST   /diary  queued 2025-06-10 08:30"
        );
        assert!(format_item(&item(2)).ends_with("retries: 2"));
    }

    #[test]
    fn test_format_dead_letter() {
        let letter = DeadLetter {
            item: item(3),
            evicted_at: Utc.with_ymd_and_hms(2025, 6, 11, 9, 0, 0).unwrap(),
            reason: "server returned status 500".to_string(),
        };
        assert!(format_dead_letter(&letter).ends_with("dropped 2025-06-11 09:00: server returned status 500"));
    }
}
