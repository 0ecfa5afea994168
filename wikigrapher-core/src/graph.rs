use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Projection of a visited page for external consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    pub label: String,
    pub depth: usize,
}

impl NodeView {
    pub fn new(id: impl Into<String>, depth: usize) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            depth,
        }
    }
}

/// A directed link between two visited pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
}

/// The complete graph document produced by the batch variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlGraph {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<Edge>,
    pub stats: GraphStats,
}

/// What one processed page contributed: its outbound links and the depth it
/// was reached at. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRecord {
    pub links: Vec<String>,
    pub depth: usize,
}

/// Insertion-ordered record of every page processed during one session.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    records: HashMap<String, VisitRecord>,
    order: Vec<String>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, page: &str) -> bool {
        self.records.contains_key(page)
    }

    pub fn get(&self, page: &str) -> Option<&VisitRecord> {
        self.records.get(page)
    }

    /// Record a page visit. The scheduler guarantees each page is inserted
    /// at most once; a repeated insert leaves the first record in place.
    pub fn insert(&mut self, page: String, record: VisitRecord) {
        if !self.records.contains_key(&page) {
            self.order.push(page.clone());
            self.records.insert(page, record);
        }
    }

    /// Iterate pages in visit order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VisitRecord)> {
        self.order.iter().map(|page| {
            let record = &self.records[page];
            (page.as_str(), record)
        })
    }

    pub fn node_views(&self) -> Vec<NodeView> {
        self.iter()
            .map(|(page, record)| NodeView::new(page, record.depth))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_preserves_insertion_order() {
        let mut registry = VisitedRegistry::new();
        for page in ["C", "A", "B"] {
            registry.insert(
                page.to_string(),
                VisitRecord {
                    links: vec![],
                    depth: 0,
                },
            );
        }
        let order: Vec<&str> = registry.iter().map(|(page, _)| page).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_registry_first_insert_wins() {
        let mut registry = VisitedRegistry::new();
        registry.insert(
            "A".to_string(),
            VisitRecord {
                links: vec!["B".to_string()],
                depth: 0,
            },
        );
        registry.insert(
            "A".to_string(),
            VisitRecord {
                links: vec![],
                depth: 5,
            },
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("A").map(|r| r.depth), Some(0));
    }

    #[test]
    fn test_node_view_label_matches_id() {
        let node = NodeView::new("Fergana_(moth)", 2);
        assert_eq!(node.id, node.label);
        assert_eq!(node.depth, 2);
    }
}
