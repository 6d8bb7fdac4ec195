//! Batch retrieval pipeline: fetch, classify, extract, dedup.
//!
//! [`Pipeline::retrieve_batch`] drives the whole flow for a set of source
//! URLs. Each URL is fetched under a shared concurrency bound, classified by
//! content type, and then routed:
//!
//! - feeds are parsed and each entry becomes a candidate item,
//! - blog index pages are expanded one level into their post links,
//! - everything else is extracted as a single content page.
//!
//! Every candidate passes through the dedup gate before being reported:
//! the store is asked whether the (url, hash) pair is new, and new content
//! is recorded before the item is returned. Per-URL failures never abort the
//! batch; they are collected as diagnostics alongside the successes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use freshwire_extract::index;
use freshwire_fetcher::Fetcher;
use freshwire_shared::{
    BatchOutcome, ContentKind, FetchConfig, FetchFailure, FreshwireError, ItemMetadata,
    ProcessedItem, Result,
};
use freshwire_storage::ContentStore;

pub mod dedup;

/// Orchestrates batch retrieval over a fetcher and a content store.
///
/// Cheap to clone via the inner `Arc`; a single instance is shared for the
/// life of the process so the rate gate and robots cache span all batches.
pub struct Pipeline<S> {
    worker: Arc<Worker<S>>,
}

impl<S> Clone for Pipeline<S> {
    fn clone(&self) -> Self {
        Self {
            worker: Arc::clone(&self.worker),
        }
    }
}

impl<S: ContentStore + 'static> Pipeline<S> {
    /// Build a pipeline from a validated fetch configuration and a store.
    pub fn new(config: FetchConfig, store: Arc<S>) -> Result<Self> {
        let fetcher = Fetcher::new(config)?;
        Ok(Self::with_fetcher(fetcher, store))
    }

    /// Build a pipeline around an existing fetcher, sharing its rate gate.
    pub fn with_fetcher(fetcher: Arc<Fetcher>, store: Arc<S>) -> Self {
        let semaphore = Semaphore::new(fetcher.config().max_concurrent);
        Self {
            worker: Arc::new(Worker {
                fetcher,
                store,
                semaphore,
            }),
        }
    }

    /// Retrieve, extract, and dedup-gate a batch of source URLs.
    ///
    /// Runs in two phases: the seed URLs first, then one level of post links
    /// discovered from index pages. The batch keeps one `seen` set covering
    /// seeds, feed-entry links, and index links, so every URL gets at most
    /// one fetch and one dedup check per batch no matter how many paths
    /// (duplicate seed, feed entry, index link) lead to it.
    ///
    /// Cancelling the token stops new fetches from being dispatched;
    /// in-flight requests run to completion and their results are kept.
    /// Individual failures land in [`BatchOutcome::failures`] rather than
    /// aborting the batch.
    pub async fn retrieve_batch(&self, urls: Vec<Url>, cancel: CancellationToken) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        let mut seed_set = HashSet::new();
        let seeds: Vec<Url> = urls
            .into_iter()
            .filter(|url| seed_set.insert(url.to_string()))
            .collect();
        let seen = Arc::new(Mutex::new(seed_set));

        info!(urls = seeds.len(), "starting batch retrieval");

        // Phase 1: seed URLs, with index expansion allowed.
        let mut children: Vec<Url> = Vec::new();
        let mut tasks = JoinSet::new();
        for url in seeds {
            let worker = Arc::clone(&self.worker);
            let cancel = cancel.clone();
            let seen = Arc::clone(&seen);
            tasks.spawn(async move { worker.process_url(url, &cancel, true, &seen).await });
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(UrlOutput::Items { items, failures }) => {
                    outcome.items.extend(items);
                    outcome.failures.extend(failures);
                }
                Ok(UrlOutput::Expand(links)) => {
                    let mut seen = seen.lock().expect("lock poisoned");
                    for link in links {
                        if seen.insert(link.to_string()) {
                            children.push(link);
                        }
                    }
                }
                Ok(UrlOutput::Failed(failure)) => outcome.failures.push(failure),
                Ok(UrlOutput::Skipped) => {}
                Err(err) => warn!(error = %err, "retrieval task panicked"),
            }
        }

        // Phase 2: post links from index pages. Exactly one level deep, so
        // expansion is disabled here.
        let mut tasks = JoinSet::new();
        for url in children {
            let worker = Arc::clone(&self.worker);
            let cancel = cancel.clone();
            let seen = Arc::clone(&seen);
            tasks.spawn(async move { worker.process_url(url, &cancel, false, &seen).await });
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(UrlOutput::Items { items, failures }) => {
                    outcome.items.extend(items);
                    outcome.failures.extend(failures);
                }
                Ok(UrlOutput::Expand(_)) => unreachable!("expansion disabled in phase 2"),
                Ok(UrlOutput::Failed(failure)) => outcome.failures.push(failure),
                Ok(UrlOutput::Skipped) => {}
                Err(err) => warn!(error = %err, "retrieval task panicked"),
            }
        }

        info!(
            items = outcome.items.len(),
            failures = outcome.failures.len(),
            "batch retrieval finished"
        );
        outcome
    }
}

/// What processing one URL produced.
enum UrlOutput {
    /// Zero or more items plus any per-entry failures.
    Items {
        items: Vec<ProcessedItem>,
        failures: Vec<FetchFailure>,
    },
    /// The URL was an index page; these are its post links.
    Expand(Vec<Url>),
    /// The URL failed outright.
    Failed(FetchFailure),
    /// Cancelled before dispatch; not an error.
    Skipped,
}

/// Shared state for spawned retrieval tasks.
struct Worker<S> {
    fetcher: Arc<Fetcher>,
    store: Arc<S>,
    semaphore: Semaphore,
}

impl<S: ContentStore> Worker<S> {
    fn config(&self) -> &FetchConfig {
        self.fetcher.config()
    }

    /// Fetch one URL under the concurrency bound and route it by kind.
    async fn process_url(
        &self,
        url: Url,
        cancel: &CancellationToken,
        allow_expand: bool,
        seen: &Mutex<HashSet<String>>,
    ) -> UrlOutput {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%url, "cancelled before dispatch");
                return UrlOutput::Skipped;
            }
            permit = self.semaphore.acquire() => match permit {
                Ok(permit) => permit,
                Err(_) => return UrlOutput::Skipped,
            },
        };
        if cancel.is_cancelled() {
            debug!(%url, "cancelled before dispatch");
            return UrlOutput::Skipped;
        }

        let fetched = match self.fetcher.fetch(&url).await {
            Ok(outcome) => outcome,
            Err(error) => {
                return UrlOutput::Failed(FetchFailure {
                    url: url.to_string(),
                    error,
                });
            }
        };
        // Fetch is done; extraction and store calls run outside the bound.
        drop(permit);

        match fetched.kind {
            ContentKind::Feed => {
                let (items, failures) = self.process_feed(&url, &fetched.body, seen).await;
                UrlOutput::Items { items, failures }
            }
            ContentKind::Html => {
                if allow_expand {
                    if let Some(links) =
                        index::expand_index(&fetched.body, &url, self.config().max_blog_posts)
                    {
                        info!(%url, links = links.len(), "index page expanded");
                        return UrlOutput::Expand(links);
                    }
                }
                match self.process_page(&url, &fetched.body).await {
                    Ok(item) => UrlOutput::Items {
                        items: vec![item],
                        failures: Vec::new(),
                    },
                    Err(error) => UrlOutput::Failed(FetchFailure {
                        url: url.to_string(),
                        error,
                    }),
                }
            }
        }
    }

    /// Extract a content page and pass it through the dedup gate.
    async fn process_page(&self, url: &Url, body: &str) -> Result<ProcessedItem> {
        let content = freshwire_extract::extract(body, url)?;
        let hash = dedup::content_hash(&content.cleaned_text);
        let is_new = self.dedup_gate(url.as_str(), &hash, &content.title, &content.cleaned_text).await?;

        debug!(%url, is_new, words = content.cleaned_text.split_whitespace().count(), "page processed");

        Ok(ProcessedItem {
            url: url.to_string(),
            title: content.title,
            description: content.description,
            word_count: content.cleaned_text.split_whitespace().count(),
            cleaned_text: content.cleaned_text,
            content_hash: hash,
            metadata: content.metadata,
            is_new,
            source_feed_url: None,
            timestamp: chrono::Utc::now(),
        })
    }

    /// Parse a feed and turn each entry into a dedup-gated item.
    ///
    /// Entries are never fetched; items are built from the feed's own
    /// title/description/summary text. Entries without a resolvable link
    /// are dropped with a warning, and entries whose link was already
    /// processed this batch (as a seed, index link, or earlier feed entry)
    /// are skipped so each URL gets at most one dedup check per batch.
    async fn process_feed(
        &self,
        feed_url: &Url,
        body: &str,
        seen: &Mutex<HashSet<String>>,
    ) -> (Vec<ProcessedItem>, Vec<FetchFailure>) {
        let parsed =
            match freshwire_feed::parse_feed(body.as_bytes(), self.config().max_feed_entries) {
                Ok(parsed) => parsed,
                Err(error) => {
                    return (
                        Vec::new(),
                        vec![FetchFailure {
                            url: feed_url.to_string(),
                            error,
                        }],
                    );
                }
            };

        let mut items = Vec::new();
        let mut failures = Vec::new();
        for entry in parsed.entries {
            if entry.link.trim().is_empty() {
                warn!(feed = %feed_url, title = %entry.title, "dropping feed entry without link");
                continue;
            }
            let link = match feed_url.join(&entry.link) {
                Ok(link) => link,
                Err(_) => {
                    warn!(feed = %feed_url, link = %entry.link, "dropping feed entry with unresolvable link");
                    continue;
                }
            };

            if !seen
                .lock()
                .expect("lock poisoned")
                .insert(link.to_string())
            {
                debug!(feed = %feed_url, link = %link, "feed entry already processed this batch");
                continue;
            }

            let combined = [
                entry.title.as_str(),
                entry.description.as_str(),
                entry.summary.as_str(),
            ]
            .join("\n");
            let cleaned_text = freshwire_extract::clean_text(&combined);
            let hash = dedup::content_hash(&cleaned_text);

            let is_new = match self
                .dedup_gate(link.as_str(), &hash, &entry.title, &cleaned_text)
                .await
            {
                Ok(is_new) => is_new,
                Err(error) => {
                    failures.push(FetchFailure {
                        url: link.to_string(),
                        error,
                    });
                    continue;
                }
            };

            let mut metadata = ItemMetadata {
                domain: link.host_str().unwrap_or_default().to_string(),
                path: link.path().to_string(),
                ..ItemMetadata::default()
            };
            if !entry.published.is_empty() {
                metadata.published_date = Some(entry.published.clone());
            }

            items.push(ProcessedItem {
                url: link.to_string(),
                title: entry.title,
                description: entry.description,
                word_count: cleaned_text.split_whitespace().count(),
                cleaned_text,
                content_hash: hash,
                metadata,
                is_new,
                source_feed_url: Some(feed_url.to_string()),
                timestamp: chrono::Utc::now(),
            });
        }
        (items, failures)
    }

    /// Ask the store whether the pair is new and record it if so.
    ///
    /// Store failures are surfaced as `StoreUnavailable` so callers can tell
    /// infrastructure trouble apart from fetch or extraction errors.
    async fn dedup_gate(
        &self,
        url: &str,
        content_hash: &str,
        title: &str,
        content: &str,
    ) -> Result<bool> {
        let is_new = self
            .store
            .is_content_new(url, content_hash)
            .await
            .map_err(|e| FreshwireError::StoreUnavailable(e.to_string()))?;
        if is_new {
            self.store
                .record_content(url, content_hash, title, content)
                .await
                .map_err(|e| FreshwireError::StoreUnavailable(e.to_string()))?;
        }
        Ok(is_new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::{Duration, Instant};

    use freshwire_storage::MemoryStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ARTICLE_HTML: &str = r#"<html><head><title>Ownership in Practice</title></head><body>
        <article><p>Rust gives systems programmers memory safety without garbage
        collection, and its ownership model catches entire classes of bugs at
        compile time rather than in production. Borrowing rules take a while to
        internalize, but once they click the compiler becomes a collaborator
        instead of an obstacle.</p></article>
        </body></html>"#;

    fn test_config() -> FetchConfig {
        FetchConfig {
            request_delay_ms: 0,
            respect_robots_txt: false,
            max_retries: 1,
            ..FetchConfig::default()
        }
    }

    fn pipeline(config: FetchConfig) -> (Pipeline<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(config, Arc::clone(&store)).unwrap();
        (pipeline, store)
    }

    async fn mount_article(server: &MockServer, at: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE_HTML, "text/html"))
            .mount(server)
            .await;
    }

    fn rss_with_entries(base: &str, count: usize) -> String {
        let mut items = String::new();
        for i in 0..count {
            items.push_str(&format!(
                "<item><title>Post {i}</title><link>{base}/posts/{i}</link>\
                 <description>Summary of post number {i} with enough words.</description></item>"
            ));
        }
        format!(
            "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel>\
             <title>Engineering Notes</title><description>Posts</description>{items}\
             </channel></rss>"
        )
    }

    #[tokio::test]
    async fn article_page_is_new_then_duplicate() {
        let server = MockServer::start().await;
        mount_article(&server, "/blog/ownership").await;
        let (pipeline, _) = pipeline(test_config());
        let url: Url = format!("{}/blog/ownership", server.uri()).parse().unwrap();

        let first = pipeline
            .retrieve_batch(vec![url.clone()], CancellationToken::new())
            .await;
        assert_eq!(first.items.len(), 1);
        assert!(first.failures.is_empty());
        assert!(first.items[0].is_new);
        assert_eq!(first.items[0].title, "Ownership in Practice");
        assert!(first.items[0].word_count > 20);

        let second = pipeline
            .retrieve_batch(vec![url], CancellationToken::new())
            .await;
        assert_eq!(second.items.len(), 1);
        assert!(!second.items[0].is_new);
        assert_eq!(second.items[0].content_hash, first.items[0].content_hash);
    }

    #[tokio::test]
    async fn feed_entries_are_capped_and_tagged_with_source() {
        let server = MockServer::start().await;
        let rss = rss_with_entries(&server.uri(), 15);
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(rss, "application/rss+xml"))
            .mount(&server)
            .await;
        let (pipeline, _) = pipeline(test_config());
        let feed_url: Url = format!("{}/feed.xml", server.uri()).parse().unwrap();

        let outcome = pipeline
            .retrieve_batch(vec![feed_url.clone()], CancellationToken::new())
            .await;

        assert_eq!(outcome.items.len(), 10);
        assert!(outcome.failures.is_empty());
        for item in &outcome.items {
            assert!(item.is_new);
            assert_eq!(item.source_feed_url.as_deref(), Some(feed_url.as_str()));
            assert!(item.url.contains("/posts/"));
        }
    }

    #[tokio::test]
    async fn duplicate_seed_urls_collapse_to_one_item() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blog/once"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE_HTML, "text/html"))
            .expect(1)
            .mount(&server)
            .await;
        let (pipeline, _) = pipeline(test_config());
        let url: Url = format!("{}/blog/once", server.uri()).parse().unwrap();

        let outcome = pipeline
            .retrieve_batch(
                vec![url.clone(), url.clone(), url],
                CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome.items.len(), 1);
        assert!(outcome.items[0].is_new);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn page_listed_in_feed_is_ingested_once_per_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blog/shared"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE_HTML, "text/html"))
            .expect(1)
            .mount(&server)
            .await;
        let base = server.uri();
        let rss = format!(
            "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel>\
             <title>Notes</title><description>Posts</description>\
             <item><title>Shared</title><link>{base}/blog/shared</link>\
             <description>The same page the batch already covers.</description></item>\
             <item><title>Other</title><link>{base}/posts/other</link>\
             <description>A different post.</description></item>\
             </channel></rss>"
        );
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(rss, "application/rss+xml"))
            .mount(&server)
            .await;
        let (pipeline, _) = pipeline(test_config());
        let page_url: Url = format!("{base}/blog/shared").parse().unwrap();
        let feed_url: Url = format!("{base}/feed.xml").parse().unwrap();

        let outcome = pipeline
            .retrieve_batch(vec![page_url.clone(), feed_url], CancellationToken::new())
            .await;

        // The shared URL yields exactly one item (the fetched page); the feed
        // contributes only the entry the batch has not covered.
        assert_eq!(outcome.items.len(), 2);
        assert!(outcome.failures.is_empty());
        let shared: Vec<_> = outcome
            .items
            .iter()
            .filter(|i| i.url == page_url.as_str())
            .collect();
        assert_eq!(shared.len(), 1);
        assert!(shared[0].is_new);
        assert!(shared[0].source_feed_url.is_none());
        assert!(outcome.items.iter().any(|i| i.url.ends_with("/posts/other")));
    }

    #[tokio::test]
    async fn feed_entry_without_link_is_dropped_without_diagnostic() {
        let server = MockServer::start().await;
        let rss = format!(
            "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel>\
             <title>Notes</title><description>Posts</description>\
             <item><title>Linked</title><link>{}/posts/linked</link>\
             <description>Has a link.</description></item>\
             <item><title>Orphan</title>\
             <description>No link element at all.</description></item>\
             </channel></rss>",
            server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(rss, "application/rss+xml"))
            .mount(&server)
            .await;
        let (pipeline, _) = pipeline(test_config());
        let feed_url: Url = format!("{}/feed.xml", server.uri()).parse().unwrap();

        let outcome = pipeline
            .retrieve_batch(vec![feed_url], CancellationToken::new())
            .await;

        assert_eq!(outcome.items.len(), 1);
        assert!(outcome.items[0].url.ends_with("/posts/linked"));
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn index_page_expands_one_level_into_posts() {
        let server = MockServer::start().await;
        let mut anchors = String::new();
        for slug in ["alpha", "beta", "gamma", "delta", "epsilon"] {
            anchors.push_str(&format!("<a href=\"/blog/{slug}\">{slug} post</a>"));
            mount_article(&server, &format!("/blog/{slug}")).await;
        }
        let index_html = format!("<html><body><main>{anchors}</main></body></html>");
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(index_html, "text/html"))
            .mount(&server)
            .await;
        let (pipeline, _) = pipeline(test_config());
        let root: Url = server.uri().parse().unwrap();

        let outcome = pipeline
            .retrieve_batch(vec![root.clone()], CancellationToken::new())
            .await;

        // The index page itself is not an item; its five posts are.
        assert_eq!(outcome.items.len(), 5);
        assert!(outcome.failures.is_empty());
        for item in &outcome.items {
            assert!(item.url.contains("/blog/"));
            assert_ne!(item.url, root.as_str());
        }
    }

    #[tokio::test]
    async fn failed_url_becomes_diagnostic_not_abort() {
        let server = MockServer::start().await;
        mount_article(&server, "/ok").await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let (pipeline, _) = pipeline(test_config());
        let ok: Url = format!("{}/ok", server.uri()).parse().unwrap();
        let broken: Url = format!("{}/broken", server.uri()).parse().unwrap();

        let outcome = pipeline
            .retrieve_batch(vec![ok, broken.clone()], CancellationToken::new())
            .await;

        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].url, broken.as_str());
        assert!(matches!(
            outcome.failures[0].error,
            FreshwireError::FetchExhausted { .. }
        ));
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_store_unavailable() {
        let server = MockServer::start().await;
        mount_article(&server, "/post").await;
        let (pipeline, store) = pipeline(test_config());
        store.set_unavailable(true);
        let url: Url = format!("{}/post", server.uri()).parse().unwrap();

        let outcome = pipeline
            .retrieve_batch(vec![url], CancellationToken::new())
            .await;

        assert!(outcome.items.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0].error,
            FreshwireError::StoreUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn cancelled_batch_dispatches_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE_HTML, "text/html"))
            .expect(0)
            .mount(&server)
            .await;
        let (pipeline, _) = pipeline(test_config());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let url: Url = format!("{}/post", server.uri()).parse().unwrap();

        let outcome = pipeline.retrieve_batch(vec![url], cancel).await;

        assert!(outcome.items.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn concurrency_stays_within_bound() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(ARTICLE_HTML, "text/html")
                    .set_delay(Duration::from_millis(150)),
            )
            .mount(&server)
            .await;
        let config = FetchConfig {
            max_concurrent: 2,
            ..test_config()
        };
        let (pipeline, _) = pipeline(config);
        let urls: Vec<Url> = (0..4)
            .map(|i| format!("{}/post-{i}", server.uri()).parse().unwrap())
            .collect();

        let started = Instant::now();
        let outcome = pipeline.retrieve_batch(urls, CancellationToken::new()).await;

        assert_eq!(outcome.items.len(), 4);
        // Four 150ms responses through two permits take at least two rounds.
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn duplicate_index_links_are_fetched_once() {
        let server = MockServer::start().await;
        let anchors = "<a href=\"/blog/only\">one</a><a href=\"/blog/only\">again</a>\
                       <a href=\"/blog/only#top\">fragment</a><a href=\"/posts/extra\">extra</a>\
                       <a href=\"/blog/third\">third</a>";
        let index_html = format!("<html><body>{anchors}</body></html>");
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(index_html, "text/html"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/blog/only"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE_HTML, "text/html"))
            .expect(1)
            .mount(&server)
            .await;
        mount_article(&server, "/posts/extra").await;
        mount_article(&server, "/blog/third").await;
        let (pipeline, _) = pipeline(test_config());
        let root: Url = server.uri().parse().unwrap();

        let outcome = pipeline
            .retrieve_batch(vec![root], CancellationToken::new())
            .await;

        assert_eq!(outcome.items.len(), 3);
    }
}
