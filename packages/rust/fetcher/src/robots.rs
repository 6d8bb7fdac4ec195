//! Basic robots.txt allow/disallow checking.
//!
//! robots.txt is fetched once per origin and cached for the lifetime of the
//! checker. Any failure to fetch or parse the file fails open: a source is
//! never silently dropped because its robots.txt was unreachable.

use std::collections::HashMap;

use reqwest::Client;
use texting_robots::Robot;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

/// Per-origin cached robots.txt gate.
pub struct RobotsChecker {
    client: Client,
    user_agent: String,
    /// Origin → robots.txt body (`None` when absent or unreachable).
    cache: Mutex<HashMap<String, Option<String>>>,
}

impl RobotsChecker {
    pub fn new(client: Client, user_agent: String) -> Self {
        Self {
            client,
            user_agent,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `url` may be fetched for our user agent. Fail-open.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let origin = url.origin().ascii_serialization();

        let body = {
            let mut cache = self.cache.lock().await;
            match cache.get(&origin) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.fetch_robots(&origin).await;
                    cache.insert(origin.clone(), fetched.clone());
                    fetched
                }
            }
        };

        let Some(body) = body else {
            return true;
        };

        match Robot::new(&self.user_agent, body.as_bytes()) {
            Ok(robot) => robot.allowed(url.as_str()),
            Err(e) => {
                debug!(%origin, error = %e, "robots.txt unparseable, allowing");
                true
            }
        }
    }

    async fn fetch_robots(&self, origin: &str) -> Option<String> {
        let robots_url = format!("{origin}/robots.txt");
        match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => response.text().await.ok(),
            Ok(response) => {
                debug!(%robots_url, status = %response.status(), "no robots.txt");
                None
            }
            Err(e) => {
                debug!(%robots_url, error = %e, "robots.txt fetch failed, allowing");
                None
            }
        }
    }
}
