//! Readability-style scoring: find the single most content-dense block.
//!
//! Candidate blocks are scored by text length discounted by link density
//! (navigation-heavy blocks are mostly anchor text) and nudged by class/id
//! naming hints. The best-scoring block's text wins tier 1 of the cascade.

use scraper::{ElementRef, Html, Selector};

use crate::{element_text, is_noncontent};

/// Tags considered as candidate content blocks.
const CANDIDATE_SELECTOR: &str = "article, main, section, div, td";

/// Class/id fragments suggesting primary content.
const POSITIVE_HINTS: &[&str] = &["content", "article", "post", "entry", "main", "body", "text"];

/// Class/id fragments suggesting chrome; candidates carrying one are skipped.
const NEGATIVE_HINTS: &[&str] = &[
    "comment", "sidebar", "footer", "nav", "promo", "widget", "share", "related",
];

/// Candidates shorter than this never win.
const MIN_CANDIDATE_LEN: usize = 25;

/// Return the text of the most content-dense block, if any candidate scores.
pub fn densest_block_text(doc: &Html) -> Option<String> {
    let sel = Selector::parse(CANDIDATE_SELECTOR).expect("static selector");

    let mut best: Option<(f64, String)> = None;

    for el in doc.select(&sel) {
        if is_noncontent(&el) || has_negative_hint(&el) {
            continue;
        }

        let text = element_text(el);
        let text_len = text.trim().len();
        if text_len < MIN_CANDIDATE_LEN {
            continue;
        }

        let density = link_density(&el, text_len);
        let mut score = text_len as f64 * (1.0 - density);
        if has_positive_hint(&el) {
            score *= 1.25;
        }

        if best.as_ref().is_none_or(|(top, _)| score > *top) {
            best = Some((score, text));
        }
    }

    best.map(|(_, text)| text)
}

/// Fraction of a block's text that lives inside anchor elements.
fn link_density(el: &ElementRef, total_len: usize) -> f64 {
    if total_len == 0 {
        return 0.0;
    }
    let a_sel = Selector::parse("a").expect("static selector");
    let link_len: usize = el
        .select(&a_sel)
        .map(|a| a.text().map(str::len).sum::<usize>())
        .sum();
    (link_len as f64 / total_len as f64).min(1.0)
}

fn hint_attr(el: &ElementRef) -> String {
    let classes = el.value().classes().collect::<Vec<_>>().join(" ");
    let id = el.value().id().unwrap_or("");
    format!("{classes} {id}").to_ascii_lowercase()
}

fn has_positive_hint(el: &ElementRef) -> bool {
    let attrs = hint_attr(el);
    POSITIVE_HINTS.iter().any(|hint| attrs.contains(hint))
}

fn has_negative_hint(el: &ElementRef) -> bool {
    let attrs = hint_attr(el);
    NEGATIVE_HINTS.iter().any(|hint| attrs.contains(hint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_article_beats_link_list() {
        let prose = "A long run of article prose with real sentences and no links at all. "
            .repeat(5);
        let html = format!(
            r#"<html><body>
                 <div class="nav-links">
                   <a href="/a">One</a><a href="/b">Two</a><a href="/c">Three</a>
                   <a href="/d">Four</a><a href="/e">Five</a><a href="/f">Six</a>
                 </div>
                 <div class="post-body">{prose}</div>
               </body></html>"#
        );
        let doc = Html::parse_document(&html);
        let text = densest_block_text(&doc).unwrap();
        assert!(text.contains("article prose"));
        assert!(!text.contains("Four"));
    }

    #[test]
    fn negative_hinted_blocks_are_skipped() {
        let chatter = "Comment thread chatter that is long enough to be a candidate block. "
            .repeat(5);
        let html = format!(
            r#"<html><body><div class="comment-thread">{chatter}</div></body></html>"#
        );
        let doc = Html::parse_document(&html);
        // The comment div is skipped; only enclosing candidates (none) remain.
        assert!(densest_block_text(&doc).is_none());
    }

    #[test]
    fn short_fragments_never_win() {
        let doc = Html::parse_document("<html><body><div>tiny</div></body></html>");
        assert!(densest_block_text(&doc).is_none());
    }

    #[test]
    fn link_density_is_bounded() {
        let html = r#"<div><a href="/x">all link text</a></div>"#;
        let doc = Html::parse_document(html);
        let sel = Selector::parse("div").unwrap();
        let el = doc.select(&sel).next().unwrap();
        let len = element_text(el).trim().len();
        let density = link_density(&el, len);
        assert!(density > 0.9 && density <= 1.0);
    }
}
