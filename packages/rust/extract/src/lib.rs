//! Main-content extraction from HTML pages.
//!
//! Extraction proceeds in escalating tiers, stopping at the first tier that
//! produces enough cleaned text:
//! 1. readability-style densest-block scoring ([`readability`]), ≥ 100 chars
//! 2. a cascade of common content-container selectors, ≥ 200 chars
//! 3. aggregation of all paragraph text, ≥ 200 chars
//! 4. body text, then whole-document text as the last resort
//!
//! Non-content elements (script/style/nav/chrome and ad/sidebar/comment
//! containers) are excluded from every tier's text walk.

pub mod index;
pub mod readability;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use freshwire_shared::{FreshwireError, ItemMetadata, Result};

/// Minimum cleaned-text length for the readability tier to win.
const MIN_READABILITY_LEN: usize = 100;

/// Minimum cleaned-text length for the selector and paragraph tiers.
const MIN_SELECTOR_LEN: usize = 200;

/// Title is truncated to this many characters.
const MAX_TITLE_LEN: usize = 200;

/// Description is truncated to this many characters.
const MAX_DESCRIPTION_LEN: usize = 500;

/// Content-container selectors tried in order by the cascade tier.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    ".content",
    ".post-content",
    ".entry-content",
    ".article-content",
    "#content",
    ".main-content",
];

/// Tags whose subtrees never contribute text.
const STRIP_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

/// Class tokens marking ad/navigation/comment containers to exclude.
const STRIP_CLASSES: &[&str] = &[
    "advertisement",
    "ads",
    "sidebar",
    "menu",
    "navigation",
    "social-share",
    "comments",
    "related-posts",
];

/// Everything a page yields: title, description, cleaned body text, and
/// URL/byline metadata.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub title: String,
    pub description: String,
    pub cleaned_text: String,
    pub metadata: ItemMetadata,
}

/// Extract title, description, cleaned main text, and metadata from a page.
///
/// Returns `ExtractionFailed` only when every tier, including the
/// whole-document fallback, produces empty cleaned text.
pub fn extract(html: &str, url: &Url) -> Result<ExtractedContent> {
    let doc = Html::parse_document(html);

    let title = extract_title(&doc);
    let description = extract_description(&doc);
    let cleaned_text = extract_main_text(&doc);

    if cleaned_text.is_empty() {
        return Err(FreshwireError::extraction(format!(
            "no usable text in {url}"
        )));
    }

    let metadata = extract_metadata(&doc, url);

    Ok(ExtractedContent {
        title,
        description,
        cleaned_text,
        metadata,
    })
}

/// Run the tier cascade and return cleaned text (possibly empty).
fn extract_main_text(doc: &Html) -> String {
    // Tier 1: readability-style densest block
    if let Some(text) = readability::densest_block_text(doc) {
        let cleaned = clean_text(&text);
        if cleaned.len() >= MIN_READABILITY_LEN {
            debug!(len = cleaned.len(), "readability tier won");
            return cleaned;
        }
    }

    // Tier 2: content-container selector cascade
    for sel_str in CONTENT_SELECTORS {
        let sel = Selector::parse(sel_str).expect("static selector");
        if let Some(el) = doc.select(&sel).next() {
            let cleaned = clean_text(&element_text(el));
            if cleaned.len() >= MIN_SELECTOR_LEN {
                debug!(selector = sel_str, len = cleaned.len(), "selector tier won");
                return cleaned;
            }
        }
    }

    // Tier 3: paragraph aggregation
    let p_sel = Selector::parse("p").expect("static selector");
    let paragraphs: Vec<String> = doc.select(&p_sel).map(element_text).collect();
    let cleaned = clean_text(&paragraphs.join(" "));
    if cleaned.len() >= MIN_SELECTOR_LEN {
        debug!(len = cleaned.len(), "paragraph tier won");
        return cleaned;
    }

    // Tier 4: body text, then full document
    let body_sel = Selector::parse("body").expect("static selector");
    if let Some(body) = doc.select(&body_sel).next() {
        let cleaned = clean_text(&element_text(body));
        if !cleaned.is_empty() {
            return cleaned;
        }
    }

    clean_text(&element_text(doc.root_element()))
}

// ---------------------------------------------------------------------------
// Text collection
// ---------------------------------------------------------------------------

/// Whether an element's entire subtree should be excluded from text.
pub(crate) fn is_noncontent(el: &ElementRef) -> bool {
    if STRIP_TAGS.contains(&el.value().name()) {
        return true;
    }
    el.value()
        .classes()
        .any(|class| STRIP_CLASSES.contains(&class))
}

/// Collect the visible text of an element, skipping non-content subtrees.
pub(crate) fn element_text(el: ElementRef) -> String {
    let mut out = String::new();
    push_text(el, &mut out);
    out
}

fn push_text(el: ElementRef, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !is_noncontent(&child_el) {
                push_text(child_el, out);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Characters outside the allow-list (word chars, whitespace, and a
/// conservative punctuation set) become spaces.
static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,!?;:\-()]").unwrap());

/// Collapse whitespace runs and strip characters outside the allow-list.
pub fn clean_text(text: &str) -> String {
    let text = DISALLOWED_CHARS.replace_all(text, " ");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

// ---------------------------------------------------------------------------
// Title / description
// ---------------------------------------------------------------------------

fn extract_title(doc: &Html) -> String {
    let element_sources = ["title", "h1"];
    for sel_str in element_sources {
        let sel = Selector::parse(sel_str).expect("static selector");
        if let Some(el) = doc.select(&sel).next() {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return truncate_chars(&text, MAX_TITLE_LEN);
            }
        }
    }

    let meta_sources = [
        r#"meta[property="og:title"]"#,
        r#"meta[name="twitter:title"]"#,
    ];
    for sel_str in meta_sources {
        if let Some(content) = meta_content(doc, sel_str) {
            return truncate_chars(&content, MAX_TITLE_LEN);
        }
    }

    String::new()
}

fn extract_description(doc: &Html) -> String {
    let sources = [
        r#"meta[name="description"]"#,
        r#"meta[property="og:description"]"#,
        r#"meta[name="twitter:description"]"#,
    ];
    for sel_str in sources {
        if let Some(content) = meta_content(doc, sel_str) {
            return truncate_chars(&content, MAX_DESCRIPTION_LEN);
        }
    }
    String::new()
}

/// First non-empty `content` attribute matching a meta selector.
fn meta_content(doc: &Html, sel_str: &str) -> Option<String> {
    let sel = Selector::parse(sel_str).expect("static selector");
    doc.select(&sel)
        .filter_map(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty())
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

const AUTHOR_SELECTORS: &[&str] = &[
    r#"meta[name="author"]"#,
    r#"meta[property="article:author"]"#,
    ".author",
    ".byline",
];

const DATE_SELECTORS: &[&str] = &[
    r#"meta[property="article:published_time"]"#,
    r#"meta[name="date"]"#,
    "time[datetime]",
    ".date",
    ".published",
];

fn extract_metadata(doc: &Html, url: &Url) -> ItemMetadata {
    let author = first_selector_value(doc, AUTHOR_SELECTORS);
    let published_date = first_selector_value(doc, DATE_SELECTORS);

    let keywords = meta_content(doc, r#"meta[name="keywords"]"#)
        .map(|content| {
            content
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect()
        })
        .unwrap_or_default();

    ItemMetadata {
        domain: url.host_str().unwrap_or("").to_string(),
        path: url.path().to_string(),
        author,
        published_date,
        keywords,
    }
}

/// First non-empty value from a selector cascade: `content` for meta tags,
/// `datetime` for time elements, element text otherwise.
fn first_selector_value(doc: &Html, selectors: &[&str]) -> Option<String> {
    for sel_str in selectors {
        let sel = Selector::parse(sel_str).expect("static selector");
        for el in doc.select(&sel) {
            let value = match el.value().name() {
                "meta" => el.value().attr("content").unwrap_or("").to_string(),
                "time" => el.value().attr("datetime").unwrap_or("").to_string(),
                _ => el.text().collect::<String>(),
            };
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.com/blog/first-post").unwrap()
    }

    #[test]
    fn article_page_extracts_through_cascade() {
        let body = "This article body has plenty of substance to clear the minimum \
                    content threshold for the selector cascade tier. "
            .repeat(4);
        let html = format!(
            r#"<html><head>
                 <title>First Post</title>
                 <meta name="description" content="A post about things.">
                 <meta name="keywords" content="rust, crawling , pipelines">
                 <meta name="author" content="Jordan Smith">
                 <meta property="article:published_time" content="2024-05-01T09:00:00Z">
               </head><body>
                 <nav>Home About Contact</nav>
                 <article><p>{body}</p></article>
                 <footer>Copyright</footer>
               </body></html>"#
        );

        let content = extract(&html, &page_url()).unwrap();
        assert_eq!(content.title, "First Post");
        assert_eq!(content.description, "A post about things.");
        assert!(content.cleaned_text.contains("plenty of substance"));
        assert!(!content.cleaned_text.contains("Copyright"));
        assert!(!content.cleaned_text.contains("About Contact"));
        assert_eq!(content.metadata.domain, "example.com");
        assert_eq!(content.metadata.path, "/blog/first-post");
        assert_eq!(content.metadata.author.as_deref(), Some("Jordan Smith"));
        assert_eq!(
            content.metadata.published_date.as_deref(),
            Some("2024-05-01T09:00:00Z")
        );
        assert_eq!(content.metadata.keywords, vec!["rust", "crawling", "pipelines"]);
    }

    #[test]
    fn falls_back_to_paragraphs_without_containers() {
        let para = "Paragraph content that contributes to the aggregate total. ".repeat(6);
        let html = format!(
            "<html><body><div><p>{para}</p><p>{para}</p></div></body></html>"
        );
        let content = extract(&html, &page_url()).unwrap();
        assert!(content.cleaned_text.contains("aggregate total"));
    }

    #[test]
    fn body_fallback_for_sparse_pages() {
        let html = "<html><head><title>Tiny</title></head><body>Just a few words here.</body></html>";
        let content = extract(html, &page_url()).unwrap();
        assert_eq!(content.title, "Tiny");
        assert_eq!(content.cleaned_text, "Just a few words here.");
    }

    #[test]
    fn empty_page_is_extraction_failure() {
        let err = extract("<html><body></body></html>", &page_url()).unwrap_err();
        assert!(matches!(err, FreshwireError::ExtractionFailed { .. }));
    }

    #[test]
    fn title_prefers_title_tag_then_h1_then_meta() {
        let with_h1 = Html::parse_document("<html><body><h1>Heading Title</h1></body></html>");
        assert_eq!(extract_title(&with_h1), "Heading Title");

        let with_og = Html::parse_document(
            r#"<html><head><meta property="og:title" content="OG Title"></head><body></body></html>"#,
        );
        assert_eq!(extract_title(&with_og), "OG Title");
    }

    #[test]
    fn title_is_truncated() {
        let long = "t".repeat(300);
        let html = format!("<html><head><title>{long}</title></head></html>");
        let doc = Html::parse_document(&html);
        assert_eq!(extract_title(&doc).chars().count(), 200);
    }

    #[test]
    fn clean_text_collapses_and_strips() {
        assert_eq!(
            clean_text("Hello,\n\n  world!  (yes)  \t@#$%"),
            "Hello, world! (yes)"
        );
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn ad_and_comment_containers_are_skipped() {
        let body = "Real article prose that should survive stripping of the junk around it. "
            .repeat(4);
        let html = format!(
            r#"<html><body><article>
                 <div class="ads">Buy now!</div>
                 <p>{body}</p>
                 <div class="comments">First!</div>
               </article></body></html>"#
        );
        let content = extract(&html, &page_url()).unwrap();
        assert!(!content.cleaned_text.contains("Buy now"));
        assert!(!content.cleaned_text.contains("First!"));
        assert!(content.cleaned_text.contains("Real article prose"));
    }
}
