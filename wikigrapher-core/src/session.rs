use crate::error::{CrawlError, Result};
use crate::event::{CrawlEvent, EventSender};
use crate::graph::{CrawlGraph, Edge, GraphStats, NodeView, VisitRecord, VisitedRegistry};
use crate::manager::CancelToken;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info};
use wikigrapher_scraper::LinkFetcher;

/// Hard limits on one crawl session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlBudgets {
    pub max_pages: usize,
    /// `None` means unbounded depth.
    pub max_depth: Option<usize>,
}

impl Default for CrawlBudgets {
    fn default() -> Self {
        Self {
            max_pages: 50,
            max_depth: Some(2),
        }
    }
}

/// How a session stopped producing node events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Completed(GraphStats),
    Cancelled,
}

pub(crate) fn validate_request(seed: &str, budgets: CrawlBudgets) -> Result<()> {
    if seed.trim().is_empty() {
        return Err(CrawlError::MissingSeed);
    }
    if budgets.max_pages == 0 {
        return Err(CrawlError::ZeroPageBudget);
    }
    Ok(())
}

/// One breadth-first crawl: owns the frontier, the visited registry, and
/// the backlink index for exactly one run.
///
/// Edge policy: an edge is included iff both of its endpoints are visited,
/// and it is emitted exactly once, on the step that processes its second
/// endpoint. Forward edges (current page to an already-visited target) come
/// before backward edges (an earlier page that linked to the current one).
pub struct CrawlSession<'a, F> {
    fetcher: &'a F,
    seed: String,
    budgets: CrawlBudgets,
    cancel: CancelToken,
    visited: VisitedRegistry,
    frontier: VecDeque<(String, usize)>,
    pending: HashSet<String>,
    /// Unvisited target -> pages already visited that link to it, in visit
    /// order. Resolved (and removed) when the target itself is processed.
    backlinks: HashMap<String, Vec<String>>,
    total_edges: usize,
}

impl<'a, F: LinkFetcher> CrawlSession<'a, F> {
    pub fn new(
        fetcher: &'a F,
        seed: impl Into<String>,
        budgets: CrawlBudgets,
        cancel: CancelToken,
    ) -> Result<Self> {
        let seed = seed.into();
        validate_request(&seed, budgets)?;

        // Every session starts from a clean cancellation state.
        cancel.reset();

        let mut frontier = VecDeque::new();
        frontier.push_back((seed.clone(), 0));
        let mut pending = HashSet::new();
        pending.insert(seed.clone());

        Ok(Self {
            fetcher,
            seed,
            budgets,
            cancel,
            visited: VisitedRegistry::new(),
            frontier,
            pending,
            backlinks: HashMap::new(),
            total_edges: 0,
        })
    }

    /// Drive the session to its end, pushing an event after every processed
    /// page when a sender is given. A cancelled run emits no `complete`
    /// event; whatever was already emitted stays valid.
    pub async fn run(&mut self, events: Option<&EventSender>) -> Result<SessionEnd> {
        info!(
            "Starting BFS crawl from {} (max_pages {}, max_depth {:?})",
            self.seed, self.budgets.max_pages, self.budgets.max_depth
        );

        while self.visited.len() < self.budgets.max_pages {
            // Cancellation is polled once per step, before the next fetch.
            if self.cancel.is_cancelled() {
                info!("Crawl cancelled after {} pages", self.visited.len());
                return Ok(SessionEnd::Cancelled);
            }

            let Some((page, depth)) = self.frontier.pop_front() else {
                break;
            };
            self.pending.remove(&page);

            if self.visited.contains(&page) {
                continue;
            }
            if let Some(max_depth) = self.budgets.max_depth
                && depth > max_depth
            {
                continue;
            }

            debug!(
                "Visiting ({}/{}): {} (depth {})",
                self.visited.len() + 1,
                self.budgets.max_pages,
                page,
                depth
            );

            // A fetch fault shows up here as an empty list; the page still
            // counts as visited.
            let links: Vec<String> = self
                .fetcher
                .fetch_links(&page)
                .await
                .into_iter()
                .filter(|target| !target.eq_ignore_ascii_case(&page))
                .collect();

            let edges = self.edges_for_step(&page, &links);
            self.total_edges += edges.len();

            let node = NodeView::new(page.clone(), depth);
            self.visited
                .insert(page.clone(), VisitRecord { links: links.clone(), depth });

            if let Some(events) = events {
                events
                    .send(CrawlEvent::Node {
                        node,
                        edges,
                        progress: self.visited.len(),
                        total: self.budgets.max_pages,
                    })
                    .map_err(|_| CrawlError::StreamClosed)?;
            }

            self.enqueue_links(&page, depth, links);
        }

        let stats = GraphStats {
            total_nodes: self.visited.len(),
            total_edges: self.total_edges,
        };
        if let Some(events) = events {
            events
                .send(CrawlEvent::Complete { stats })
                .map_err(|_| CrawlError::StreamClosed)?;
        }
        info!(
            "Crawl complete: {} nodes, {} edges",
            stats.total_nodes, stats.total_edges
        );
        Ok(SessionEnd::Completed(stats))
    }

    /// Edges whose second endpoint just became visited: forward edges into
    /// already-visited targets, then edges discovered retroactively from
    /// pages that referenced this one before it existed in the registry.
    fn edges_for_step(&mut self, page: &str, links: &[String]) -> Vec<Edge> {
        let mut edges = Vec::new();
        for target in links {
            if self.visited.contains(target) {
                edges.push(Edge::new(page, target.clone()));
            }
        }
        if let Some(sources) = self.backlinks.remove(page) {
            for source in sources {
                edges.push(Edge::new(source, page));
            }
        }
        edges
    }

    fn enqueue_links(&mut self, page: &str, depth: usize, links: Vec<String>) {
        let within_depth = self.budgets.max_depth.is_none_or(|d| depth < d);
        for target in links {
            if self.visited.contains(&target) {
                continue;
            }
            // Tracked even when the depth budget stops the enqueue: the
            // target stays discoverable as a backward-edge endpoint if some
            // other path reaches it.
            self.backlinks
                .entry(target.clone())
                .or_default()
                .push(page.to_string());

            if within_depth && !self.pending.contains(&target) {
                self.pending.insert(target.clone());
                self.frontier.push_back((target, depth + 1));
            }
        }
    }

    /// The batch-variant document: node list in visit order and the edge
    /// set re-derived from the final registry under the same edge policy
    /// the streaming path uses.
    pub fn snapshot(&self) -> CrawlGraph {
        let nodes = self.visited.node_views();
        let mut edges = Vec::new();
        for (source, record) in self.visited.iter() {
            for target in &record.links {
                if self.visited.contains(target) {
                    edges.push(Edge::new(source, target.clone()));
                }
            }
        }
        let stats = GraphStats {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
        };
        CrawlGraph {
            nodes,
            edges,
            stats,
        }
    }
}
