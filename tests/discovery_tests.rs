//! Discovery tests: candidate selection, filters and the processed marker

use std::time::{Duration, Instant};

use mathcopy::{Discovery, Document, ExtractorConfig, Node, Platform, ScanContext};
use pretty_assertions::assert_eq;

fn discovery(host: &str) -> Discovery {
    let config = ExtractorConfig::for_host(host);
    Discovery::new(Platform::detect(host), &config)
}

fn ids(nodes: &[Node<'_>]) -> Vec<String> {
    nodes
        .iter()
        .map(|n| n.attr("id").unwrap_or("?").to_string())
        .collect()
}

#[test]
fn already_processed_nodes_are_skipped() {
    let doc = Document::parse(
        r#"<body>
        <span id="old" class="katex" data-latex="x^2">x2</span>
        <span id="new" class="katex" data-latex="y^2">y2</span>
        </body>"#,
    );
    let old = doc.query_first("#old").unwrap().unwrap();
    assert!(doc.mark_processed(old));

    let found = discovery("example.com").discover(&doc, doc.scan_root());
    assert_eq!(ids(&found), vec!["new"]);
}

#[test]
fn page_marker_counts_as_processed() {
    let doc = Document::parse(
        r#"<span id="a" class="katex" data-latex="a" data-math-processed="true">ab</span><span id="b" class="katex" data-latex="b">bc</span>"#,
    );
    let found = discovery("example.com").discover(&doc, doc.scan_root());
    assert_eq!(ids(&found), vec!["b"]);
}

#[test]
fn second_scan_returns_nothing() {
    let doc = Document::parse(
        r#"<span id="a" class="katex" data-latex="a+b">a+b</span><div id="b" class="math" data-latex="c">cd</div>"#,
    );
    let d = discovery("example.com");
    assert_eq!(d.discover(&doc, doc.scan_root()).len(), 2);
    assert_eq!(d.discover(&doc, doc.scan_root()).len(), 0);
    assert_eq!(doc.processed_count(), 2);
}

#[test]
fn invalid_selectors_are_ignored() {
    let doc = Document::parse(r#"<span id="a" class="katex" data-latex="a">ab</span>"#);
    let found = discovery("example.com")
        .with_selectors(["[[broken", ".katex", "::nope("])
        .discover(&doc, doc.scan_root());
    assert_eq!(ids(&found), vec!["a"]);
}

#[test]
fn hidden_skipped_and_too_long_candidates_are_filtered() {
    let long = "x".repeat(1001);
    let html = format!(
        r#"<body>
        <span id="hidden" class="katex" data-latex="a" style="display: none">ab</span>
        <div hidden><span id="inside" class="katex" data-latex="a">ab</span></div>
        <span id="invisible" class="katex" data-latex="a" style="visibility:hidden">ab</span>
        <span id="short" class="katex" data-latex="a">a</span>
        <span id="long" class="katex" data-latex="a">{}</span>
        <template class="katex" data-latex="a">ab</template>
        <span id="ok" class="katex" data-latex="a">ab</span>
        </body>"#,
        long
    );
    let doc = Document::parse(&html);
    let found = discovery("example.com").discover(&doc, doc.scan_root());
    assert_eq!(ids(&found), vec!["ok"]);
}

#[test]
fn open_shadow_roots_are_searched() {
    let doc = Document::parse(
        r#"<body>
        <span id="light" class="katex" data-latex="a">ab</span>
        <div id="host"><template shadowrootmode="open"><span id="shadow" class="katex" data-latex="b">bc</span></template></div>
        <div id="sealed"><template shadowrootmode="closed"><span id="closed" class="katex" data-latex="c">cd</span></template></div>
        </body>"#,
    );
    let found = discovery("example.com").discover(&doc, doc.scan_root());
    assert_eq!(ids(&found), vec!["light", "shadow"]);
}

#[test]
fn gemini_takes_layout_without_source() {
    let doc = Document::parse(
        r#"<body><span id="m" class="math-inline"><span id="k" class="katex"><span id="h" class="katex-html">x2</span></span></span><span id="p" class="plain">x2</span></body>"#,
    );
    let found = discovery("gemini.google.com").discover(&doc, doc.scan_root());
    assert_eq!(ids(&found), vec!["m", "k", "h"]);
}

#[test]
fn generic_requires_source_markers() {
    let doc = Document::parse(
        r#"<body><span id="bare" class="katex">x2</span><span id="src" class="katex"><annotation>x^2</annotation>x2</span></body>"#,
    );
    let found = discovery("example.com").discover(&doc, doc.scan_root());
    assert_eq!(ids(&found), vec!["src"]);
}

#[test]
fn falls_back_to_innermost_source_elements() {
    let doc = Document::parse(
        r#"<body><section id="outer"><p id="inner">\frac{1}{2} of it</p></section></body>"#,
    );
    let found = discovery("chatgpt.com").discover(&doc, doc.scan_root());
    assert_eq!(ids(&found), vec!["inner"]);
}

#[test]
fn scan_context_drives_discovery() {
    let t0 = Instant::now();
    let mut ctx = ScanContext::new(ExtractorConfig::for_host("example.com"), t0);
    let doc = Document::parse(r#"<span class="katex" data-latex="a^2">a2</span>"#);

    assert!(ctx.due(t0));
    let found = ctx.scan(&doc);
    assert_eq!(found.len(), 1);
    assert_eq!(
        ctx.extractor().extract(found[0]).as_deref(),
        Some("a^2")
    );

    ctx.on_mutation(1, t0 + Duration::from_millis(10));
    assert!(ctx.due(t0 + Duration::from_millis(400)));
    assert!(ctx.scan(&doc).is_empty());
    assert_eq!(ctx.scans(), 2);
}
