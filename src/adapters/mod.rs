// Adapters layer: concrete HTTP implementations of the domain ports.

pub mod google;
pub mod weather;

use crate::config::AppConfig;
use crate::utils::error::Result;
use reqwest::Client;

/// One client shared by every adapter, with the configured request timeout.
pub fn http_client(config: &AppConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("driving-forecast/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
