use mathcopy_dom::{parse_selector, DeepWalk, Document};
use pretty_assertions::assert_eq;

const PAGE: &str = r#"<body>
<div id="a">
  <span id="a1"></span>
  <div id="host1">
    <template shadowrootmode="open">
      <span id="s1"></span>
      <div id="host2">
        <template shadowrootmode="open"><span id="s2"></span></template>
      </div>
    </template>
    <span id="a2"></span>
  </div>
  <div id="host3">
    <template shadowrootmode="open"><span id="s3"></span></template>
  </div>
  <div id="sealed">
    <template shadowrootmode="closed"><span id="hidden"></span></template>
  </div>
</div>
</body>"#;

fn ids(nodes: &[mathcopy_dom::Node<'_>]) -> Vec<String> {
    nodes
        .iter()
        .filter_map(|n| n.attr("id").map(str::to_string))
        .collect()
}

#[test]
fn layers_are_visited_before_nested_roots() {
    let doc = Document::parse(PAGE);
    let a = doc.query_first("#a").unwrap().unwrap();
    let order = ids(&DeepWalk::new(a).elements());
    assert_eq!(
        order,
        vec!["a1", "host1", "a2", "host3", "sealed", "s1", "host2", "s2", "s3"]
    );
}

#[test]
fn root_is_optional() {
    let doc = Document::parse(PAGE);
    let a = doc.query_first("#a").unwrap().unwrap();
    let with_root = DeepWalk::new(a).including_root().elements();
    assert_eq!(with_root.first().and_then(|n| n.attr("id")), Some("a"));
}

#[test]
fn closed_roots_are_skipped() {
    let doc = Document::parse(PAGE);
    assert!(doc.query_first("#hidden").unwrap().is_none());
    assert!(doc.query_first("#s3").unwrap().is_some());
}

#[test]
fn light_selection_does_not_cross_boundaries() {
    let doc = Document::parse(PAGE);
    let host1 = doc.query_first("#host1").unwrap().unwrap();
    let span = parse_selector("span").unwrap();
    assert_eq!(ids(&host1.select(&span)), vec!["a2"]);

    let shadow = host1.shadow_root().unwrap().unwrap();
    assert_eq!(shadow.host(), host1);
    assert_eq!(ids(&shadow.select(&span)), vec!["s1"]);
}

#[test]
fn shadow_children_reach_host_through_composed_parent() {
    let doc = Document::parse(PAGE);
    let s1 = doc.query_first("#s1").unwrap().unwrap();
    assert!(s1.parent().is_none());
    assert_eq!(
        s1.composed_parent().and_then(|n| n.attr("id")),
        Some("host1")
    );
}

#[test]
fn select_any_yields_each_element_once() {
    let doc = Document::parse(r#"<p class="katex" data-latex="x">x</p>"#);
    let selectors = vec![
        parse_selector(".katex").unwrap(),
        parse_selector("[data-latex]").unwrap(),
    ];
    let found = DeepWalk::new(doc.scan_root()).select_any(&selectors);
    assert_eq!(found.len(), 1);
}
