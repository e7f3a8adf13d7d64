//! Radix tree for route matching.
//!
//! Each node is one path segment. Static segments match exactly, `:name`
//! segments match any single segment. Terminal nodes keep one route per HTTP
//! method. Lookup tries static children before placeholders and backtracks,
//! so `/song/top` can coexist with `/song/:id`.

use http::Method;
use std::collections::HashMap;
use std::sync::Arc;

use super::core::{ParamVec, RouteEntry};

#[derive(Clone, Default)]
struct RadixNode {
    segment: String,
    routes: HashMap<Method, Arc<RouteEntry>>,
    param_name: Option<Arc<str>>,
    children: Vec<RadixNode>,
    param_children: Vec<RadixNode>,
}

impl RadixNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            ..Self::default()
        }
    }

    fn new_param(name: &str) -> Self {
        Self {
            param_name: Some(Arc::from(name)),
            ..Self::default()
        }
    }

    /// Insert `entry`; returns the already-registered entry on a clash.
    fn insert(
        &mut self,
        segments: &[&str],
        entry: Arc<RouteEntry>,
    ) -> Result<(), Arc<RouteEntry>> {
        let Some((segment, remaining)) = segments.split_first() else {
            if let Some(existing) = self.routes.get(&entry.method) {
                return Err(Arc::clone(existing));
            }
            self.routes.insert(entry.method.clone(), entry);
            return Ok(());
        };

        if let Some(name) = segment.strip_prefix(':') {
            // Placeholder names are documentation only; any two placeholders at the
            // same depth are the same edge.
            if let Some(child) = self.param_children.first_mut() {
                return child.insert(remaining, entry);
            }
            let mut child = RadixNode::new_param(name);
            let inserted = child.insert(remaining, entry);
            self.param_children.push(child);
            return inserted;
        }

        if let Some(child) = self.children.iter_mut().find(|c| c.segment == *segment) {
            return child.insert(remaining, entry);
        }
        let mut child = RadixNode::new(segment);
        let inserted = child.insert(remaining, entry);
        self.children.push(child);
        inserted
    }

    fn search(
        &self,
        segments: &[&str],
        method: &Method,
        params: &mut ParamVec,
    ) -> Option<Arc<RouteEntry>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.routes.get(method).cloned();
        };

        for child in &self.children {
            if child.segment == *segment {
                if let Some(entry) = child.search(remaining, method, params) {
                    return Some(entry);
                }
            }
        }

        for child in &self.param_children {
            if let Some(name) = &child.param_name {
                params.push((Arc::clone(name), decode_segment(segment)));
                if let Some(entry) = child.search(remaining, method, params) {
                    return Some(entry);
                }
                params.pop();
            }
        }

        None
    }
}

fn decode_segment(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

pub(crate) fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Method-aware radix tree over versioned path templates.
#[derive(Clone, Default)]
pub(crate) struct RadixTree {
    root: RadixNode,
}

impl RadixTree {
    pub(crate) fn insert(&mut self, entry: Arc<RouteEntry>) -> Result<(), Arc<RouteEntry>> {
        let path = entry.path.clone();
        self.root.insert(&split_path(&path), entry)
    }

    pub(crate) fn search(&self, method: &Method, path: &str) -> Option<(Arc<RouteEntry>, ParamVec)> {
        let mut params = ParamVec::new();
        let entry = self.root.search(&split_path(path), method, &mut params)?;
        Some((entry, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::error_json;
    use crate::operation::Operation;

    fn entry(method: Method, path: &str, name: &str) -> Arc<RouteEntry> {
        let op = Operation::get(name, path).handler(|_| Ok(error_json("unused").into()));
        Arc::new(RouteEntry {
            method,
            path: path.to_string(),
            operation: Arc::new(op),
        })
    }

    fn tree(routes: &[(Method, &str, &str)]) -> RadixTree {
        let mut tree = RadixTree::default();
        for (method, path, name) in routes {
            assert!(tree.insert(entry(method.clone(), path, name)).is_ok());
        }
        tree
    }

    #[test]
    fn test_static_route() {
        let tree = tree(&[(Method::GET, "/api/v1/validate", "validate")]);
        let (hit, params) = tree.search(&Method::GET, "/api/v1/validate").unwrap();
        assert_eq!(hit.operation.name, "validate");
        assert!(params.is_empty());
    }

    #[test]
    fn test_placeholders_are_positional() {
        let tree = tree(&[(Method::GET, "/a/:x/b/:y", "pair")]);
        let (_, params) = tree.search(&Method::GET, "/a/1/b/2").unwrap();
        let values: Vec<_> = params.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, ["1", "2"]);
    }

    #[test]
    fn test_static_beats_placeholder_and_backtracks() {
        let tree = tree(&[
            (Method::GET, "/song/top", "top"),
            (Method::GET, "/song/:id", "song"),
            (Method::GET, "/song/:id/lyrics", "lyrics"),
        ]);
        assert_eq!(tree.search(&Method::GET, "/song/top").unwrap().0.operation.name, "top");
        assert_eq!(tree.search(&Method::GET, "/song/7").unwrap().0.operation.name, "song");
        let (hit, params) = tree.search(&Method::GET, "/song/top/lyrics").unwrap();
        assert_eq!(hit.operation.name, "lyrics");
        assert_eq!(params[0].1, "top");
    }

    #[test]
    fn test_method_is_part_of_the_key() {
        let tree = tree(&[
            (Method::GET, "/items", "list"),
            (Method::POST, "/items", "create"),
        ]);
        assert_eq!(tree.search(&Method::POST, "/items").unwrap().0.operation.name, "create");
        assert!(tree.search(&Method::PUT, "/items").is_none());
    }

    #[test]
    fn test_duplicate_returns_existing_entry() {
        let mut tree = tree(&[(Method::GET, "/song/:id", "song")]);
        let clash = tree.insert(entry(Method::GET, "/song/:track", "track"));
        assert_eq!(clash.unwrap_err().operation.name, "song");
    }

    #[test]
    fn test_segments_are_percent_decoded() {
        let tree = tree(&[(Method::GET, "/search/:q", "search")]);
        let (_, params) = tree.search(&Method::GET, "/search/daft%20punk").unwrap();
        assert_eq!(params[0].1, "daft punk");
    }

    #[test]
    fn test_no_match() {
        let tree = tree(&[(Method::GET, "/song/:id", "song")]);
        assert!(tree.search(&Method::GET, "/song").is_none());
        assert!(tree.search(&Method::GET, "/song/1/2").is_none());
    }
}
