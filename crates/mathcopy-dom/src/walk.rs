//! Layered traversal across shadow boundaries.

use std::collections::HashSet;

use log::debug;

use crate::{Node, Selector, ShadowRoot};

enum Layer<'a> {
    Light(Node<'a>),
    Shadow(ShadowRoot<'a>),
}

/// Walks a subtree and every open shadow root reachable from it.
///
/// Order is a fixed contract: all elements of one layer in document
/// pre-order, then each shadow root found in that layer, depth first, in the
/// order their hosts appear. Each root is entered at most once. Closed roots
/// are skipped.
pub struct DeepWalk<'a> {
    root: Node<'a>,
    include_root: bool,
}

impl<'a> DeepWalk<'a> {
    pub fn new(root: Node<'a>) -> Self {
        Self {
            root,
            include_root: false,
        }
    }

    /// Also yield the starting element itself.
    pub fn including_root(mut self) -> Self {
        self.include_root = true;
        self
    }

    pub fn elements(&self) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![Layer::Light(self.root)];

        while let Some(layer) = pending.pop() {
            let (members, hosts) = match layer {
                Layer::Light(root) => {
                    let descendants = root.descendants();
                    let mut hosts = Vec::with_capacity(descendants.len() + 1);
                    hosts.push(root);
                    hosts.extend(descendants.iter().copied());
                    let mut members = Vec::with_capacity(descendants.len() + 1);
                    if self.include_root {
                        members.push(root);
                    }
                    members.extend(descendants);
                    (members, hosts)
                }
                Layer::Shadow(shadow) => {
                    let descendants = shadow.descendants();
                    (descendants.clone(), descendants)
                }
            };
            out.extend(members);

            let mut nested = Vec::new();
            for host in hosts {
                match host.shadow_root() {
                    Ok(Some(shadow)) if visited.insert(shadow.id()) => {
                        nested.push(Layer::Shadow(shadow));
                    }
                    Ok(_) => {}
                    Err(e) => debug!("skipping shadow root: {}", e),
                }
            }
            pending.extend(nested.into_iter().rev());
        }

        out
    }

    pub fn select(&self, selector: &Selector) -> Vec<Node<'a>> {
        self.elements()
            .into_iter()
            .filter(|n| n.matches(selector))
            .collect()
    }

    /// Elements matching any of `selectors`, each element once.
    pub fn select_any(&self, selectors: &[Selector]) -> Vec<Node<'a>> {
        self.elements()
            .into_iter()
            .filter(|n| selectors.iter().any(|s| n.matches(s)))
            .collect()
    }
}
