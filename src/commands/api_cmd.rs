//! One-off API calls routed through the offline layer.

use clap::Args;
use nibble_core::{ApiRequest, HttpMethod, RequestOptions, RequestOutcome};

use super::parse_data;
use crate::app;
use crate::config::Config;

/// Call the API, falling back to cache or the offline queue
#[derive(Args)]
pub struct ApiCommand {
    /// GET, POST, PUT or DELETE
    method: HttpMethod,

    /// Endpoint relative to the API URL (e.g., /children)
    endpoint: String,

    /// JSON request body
    #[arg(long, short)]
    data: Option<String>,

    /// Cache GET responses under this key and serve it when offline
    #[arg(long)]
    cache_key: Option<String>,

    /// Fail instead of queueing writes while offline
    #[arg(long)]
    no_queue: bool,
}

impl ApiCommand {
    pub async fn run(
        &self,
        config: &Config,
        forced_offline: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let request = self.request()?;
        let options = self.options();

        let cache = app::open_cache(config).await?;
        let sync = app::connect(config, cache, forced_offline).await;

        match sync.request(request, options).await? {
            RequestOutcome::Completed(body) => {
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            RequestOutcome::Cached(body) => {
                eprintln!("(offline: showing cached data)");
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            RequestOutcome::Queued(item) => {
                println!("Accepted, pending sync ({})", item.id);
            }
        }
        Ok(())
    }

    fn request(&self) -> Result<ApiRequest, serde_json::Error> {
        let request = ApiRequest::new(self.method, self.endpoint.as_str());
        Ok(match parse_data(self.data.as_deref())? {
            serde_json::Value::Null => request,
            body => request.with_body(body),
        })
    }

    fn options(&self) -> RequestOptions {
        let options = match &self.cache_key {
            Some(key) => RequestOptions::cached(key.as_str()),
            None => RequestOptions::default(),
        };
        if self.no_queue {
            options.no_queue()
        } else {
            options
        }
    }
}
