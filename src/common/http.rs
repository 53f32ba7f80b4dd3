use std::time::Duration;

use reqwest::{Client, Error};

const USER_AGENT: &str = concat!("nowplaying-live/", env!("CARGO_PKG_VERSION"));

pub struct HttpClient;

impl HttpClient {
    /// Builds the shared upstream client. Every request made through it is
    /// bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Client, Error> {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()
    }
}
