use crate::graph::{Edge, GraphStats, NodeView};
use serde_json::json;
use tokio::sync::mpsc;

/// Incremental crawl event, in the order the transport layer will see them:
/// zero or more `Node` events, then at most one `Complete`; or a single
/// `Busy` up front; or one `Error` if the session dies mid-run.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    Node {
        node: NodeView,
        /// Only the edges this step created, not the accumulated list.
        edges: Vec<Edge>,
        progress: usize,
        total: usize,
    },
    Complete {
        stats: GraphStats,
    },
    Busy {
        message: String,
    },
    Error {
        message: String,
    },
}

impl CrawlEvent {
    /// The JSON record the transport layer ships for this event.
    pub fn to_wire_json(&self) -> serde_json::Value {
        match self {
            CrawlEvent::Node {
                node,
                edges,
                progress,
                total,
            } => json!({
                "type": "node",
                "node": node,
                "edges": edges,
                "progress": progress,
                "total": total,
            }),
            CrawlEvent::Complete { stats } => json!({
                "type": "complete",
                "stats": stats,
            }),
            CrawlEvent::Busy { message } => json!({
                "type": "busy",
                "message": message,
            }),
            CrawlEvent::Error { message } => json!({
                "error": message,
            }),
        }
    }

    /// One `data:`-prefixed line followed by a blank line, as in
    /// `text/event-stream`.
    pub fn to_sse_frame(&self) -> String {
        format!("data: {}\n\n", self.to_wire_json())
    }
}

pub type EventSender = mpsc::UnboundedSender<CrawlEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<CrawlEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
