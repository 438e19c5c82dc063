use isahc::config::RedirectPolicy;
use isahc::prelude::*;
use isahc::HttpClient;
use std::sync::OnceLock;
use std::time::Duration;

// A hung server must not stall the poll loop. The timeout applies to the
// whole request, not just the connect phase.
const REQUEST_TIMEOUT_SECONDS: u64 = 5;

static CLIENT: OnceLock<HttpClient> = OnceLock::new();

pub fn client() -> &'static HttpClient {
    CLIENT.get_or_init(init_client)
}

fn init_client() -> HttpClient {
    HttpClient::builder()
        .redirect_policy(RedirectPolicy::Limit(10))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
        .build()
        .unwrap()
}
