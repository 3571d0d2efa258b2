//! Manual replay of the offline queue.

use clap::Args;
use nibble_core::{DrainOutcome, DrainReport, SkipReason};

use crate::app;
use crate::config::Config;

/// Send pending offline requests to the server
#[derive(Debug, Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn run(
        &self,
        config: &Config,
        forced_offline: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let cache = app::open_cache(config).await?;
        let sync = app::connect(config, cache, forced_offline).await;

        let pending = sync.status().queue_length;
        if pending == 0 {
            println!("Nothing to sync.");
            return Ok(());
        }

        println!("Syncing {} pending request(s)...", pending);
        match sync.drain().await {
            DrainOutcome::Completed(report) => {
                println!("{}", summary(&report));
                let remaining = sync.status().queue_length;
                if remaining > 0 {
                    println!("{} request(s) still pending.", remaining);
                }
            }
            DrainOutcome::Skipped(SkipReason::Offline) => {
                println!("Offline: requests will be sent when the server is reachable.");
            }
            DrainOutcome::Skipped(SkipReason::AlreadyRunning) => {
                println!("A sync is already in progress.");
            }
        }
        Ok(())
    }
}

fn summary(report: &DrainReport) -> String {
    let mut line = format!("{} synced, {} failed", report.succeeded, report.failed);
    if report.evicted > 0 {
        line.push_str(&format!(" ({} evicted)", report.evicted));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let report = DrainReport {
            succeeded: 3,
            failed: 1,
            evicted: 0,
        };
        assert_eq!(summary(&report), "3 synced, 1 failed");

        let report = DrainReport {
            succeeded: 0,
            failed: 2,
            evicted: 1,
        };
        assert_eq!(summary(&report), "0 synced, 2 failed (1 evicted)");
    }
}
