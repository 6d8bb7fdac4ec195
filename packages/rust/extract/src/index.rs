//! Blog-index detection and post-link extraction.
//!
//! An index page is a listing (e.g. a blog home page) that links out to
//! individual posts rather than carrying primary content itself. Detection
//! is purely structural: site-root path plus either repeated article-like
//! elements or enough candidate post links. Link extraction keeps only
//! same-origin anchors that look like posts, capped to bound fan-out.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose presence (≥ [`MIN_ARTICLE_ELEMENTS`]) marks a listing page.
const ARTICLE_PATTERN_SELECTOR: &str =
    "article, [class*='post'], [class*='entry'], [class*='article']";

/// How many article-like elements or candidate links make a page an index.
const MIN_ARTICLE_ELEMENTS: usize = 3;

/// URL path shapes that identify individual posts.
static POST_PATH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^/\d{4}/\d{1,2}(/\d{1,2})?/.+",  // date-segmented archives
        r"^/blog/[^/]+/?$",
        r"^/posts?/[^/]+/?$",
        r"^/article/[^/]+/?$",
        r"^/\d{4}/[^/]+/?$",               // /<year>/<slug>
        r"^/[^/]+\.html$",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

/// Classify a page as a blog index.
///
/// Only site roots qualify (empty or `/` path); deeper pages are always
/// treated as content. A root is an index when it carries at least
/// [`MIN_ARTICLE_ELEMENTS`] article-patterned elements, or when link
/// extraction finds that many candidate posts.
pub fn is_index_page(doc: &Html, url: &Url) -> bool {
    let path = url.path();
    if !path.is_empty() && path != "/" {
        return false;
    }

    let sel = Selector::parse(ARTICLE_PATTERN_SELECTOR).expect("static selector");
    if doc.select(&sel).count() >= MIN_ARTICLE_ELEMENTS {
        return true;
    }

    extract_post_links(doc, url, MIN_ARTICLE_ELEMENTS).len() >= MIN_ARTICLE_ELEMENTS
}

/// Extract candidate post links from an index page, in document order.
///
/// A candidate must resolve to the same origin as `base_url`, be unseen
/// within the page, and either match a post path pattern or sit inside a
/// heading element (a strong positional signal of a title link). At most
/// `cap` candidates are returned; the cap is what keeps fan-out from a
/// large index page bounded.
pub fn extract_post_links(doc: &Html, base_url: &Url, cap: usize) -> Vec<Url> {
    let a_sel = Selector::parse("a[href]").expect("static selector");
    let mut seen: HashSet<String> = HashSet::new();
    let mut links = Vec::new();

    for el in doc.select(&a_sel) {
        if links.len() >= cap {
            break;
        }

        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if href.starts_with('#') || href.starts_with("javascript:") || href.starts_with("mailto:")
        {
            continue;
        }

        let Ok(mut resolved) = base_url.join(href) else {
            continue;
        };
        resolved.set_fragment(None);

        if resolved.origin() != base_url.origin() {
            continue;
        }
        if &resolved == base_url {
            continue;
        }
        if !seen.insert(resolved.to_string()) {
            continue;
        }

        if matches_post_pattern(resolved.path()) || inside_heading(&el) {
            links.push(resolved);
        }
    }

    links
}

/// Parse-and-classify convenience for callers that only have raw HTML:
/// `Some(links)` when the page is an index, `None` when it is content.
///
/// Owns the parsed document internally so callers never hold a non-`Send`
/// DOM across an await point.
pub fn expand_index(html: &str, base_url: &Url, cap: usize) -> Option<Vec<Url>> {
    let doc = Html::parse_document(html);
    if is_index_page(&doc, base_url) {
        Some(extract_post_links(&doc, base_url, cap))
    } else {
        None
    }
}

fn matches_post_pattern(path: &str) -> bool {
    POST_PATH_PATTERNS.iter().any(|re| re.is_match(path))
}

/// Whether an anchor is nested inside an `h1`/`h2`/`h3` element.
fn inside_heading(el: &ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| matches!(ancestor.value().name(), "h1" | "h2" | "h3"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn site_root_with_blog_links_is_an_index() {
        let html = r#"<html><body>
            <a href="/blog/first">First</a>
            <a href="/blog/second">Second</a>
            <a href="/blog/third">Third</a>
            <a href="/blog/fourth">Fourth</a>
            <a href="/blog/fifth">Fifth</a>
        </body></html>"#;
        let doc = Html::parse_document(html);

        assert!(is_index_page(&doc, &root()));
        let links = extract_post_links(&doc, &root(), 10);
        assert_eq!(links.len(), 5);
        assert_eq!(links[0].path(), "/blog/first");
        assert_eq!(links[4].path(), "/blog/fifth");
    }

    #[test]
    fn non_root_pages_are_never_indexes() {
        let html = r#"<html><body>
            <article>a</article><article>b</article><article>c</article>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let deep = Url::parse("https://example.com/blog/some-post").unwrap();
        assert!(!is_index_page(&doc, &deep));
    }

    #[test]
    fn article_elements_mark_an_index() {
        let html = r#"<html><body>
            <div class="post-card">one</div>
            <div class="post-card">two</div>
            <div class="post-card">three</div>
        </body></html>"#;
        let doc = Html::parse_document(html);
        assert!(is_index_page(&doc, &root()));
    }

    #[test]
    fn sparse_root_is_not_an_index() {
        let html = r#"<html><body><p>Welcome</p><a href="/about">About</a></body></html>"#;
        let doc = Html::parse_document(html);
        assert!(!is_index_page(&doc, &root()));
    }

    #[test]
    fn cap_bounds_fanout() {
        let anchors: String = (0..25)
            .map(|i| format!(r#"<a href="/blog/post-{i}">Post {i}</a>"#))
            .collect();
        let html = format!("<html><body>{anchors}</body></html>");
        let doc = Html::parse_document(&html);

        let links = extract_post_links(&doc, &root(), 10);
        assert_eq!(links.len(), 10);
        // First-seen document order is preserved
        assert_eq!(links[0].path(), "/blog/post-0");
        assert_eq!(links[9].path(), "/blog/post-9");
    }

    #[test]
    fn cross_origin_links_are_dropped() {
        let html = r#"<html><body>
            <a href="https://other.example.net/blog/elsewhere">Elsewhere</a>
            <a href="/blog/local">Local</a>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let links = extract_post_links(&doc, &root(), 10);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].host_str(), Some("example.com"));
    }

    #[test]
    fn heading_anchors_count_without_pattern_match() {
        let html = r#"<html><body>
            <h2><a href="/announcing-the-thing">Announcing the Thing</a></h2>
            <a href="/unrelated-page">Unrelated</a>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let links = extract_post_links(&doc, &root(), 10);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].path(), "/announcing-the-thing");
    }

    #[test]
    fn duplicate_links_are_deduplicated() {
        let html = r#"<html><body>
            <a href="/blog/once">A</a>
            <a href="/blog/once#comments">B</a>
            <a href="/blog/once">C</a>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let links = extract_post_links(&doc, &root(), 10);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn date_and_year_paths_match() {
        assert!(matches_post_pattern("/2024/05/02/launch-day"));
        assert!(matches_post_pattern("/2024/launch-day"));
        assert!(matches_post_pattern("/posts/hello-world"));
        assert!(matches_post_pattern("/post/hello-world"));
        assert!(matches_post_pattern("/article/deep-dive"));
        assert!(matches_post_pattern("/hello-world.html"));
        assert!(!matches_post_pattern("/about"));
        assert!(!matches_post_pattern("/"));
    }
}
