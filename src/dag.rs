use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::time::Duration;
use std::time::Instant;

use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;

use crate::grid::Grid;
use crate::library::Library;
use crate::library::TransformId;
use crate::state::State;

pub type DagNodeId = NodeIndex;

/// Caps governing one DAG build. Mirrors the resource-cap table in
/// SPEC_FULL.md §5; every field silently prunes rather than erroring.
#[derive(Debug, Clone, Copy)]
pub struct DagConfig {
    pub max_depth: u16,
    pub max_nodes: usize,
    pub max_total_pixels: usize,
    pub max_side: usize,
    pub time_limit: Duration,
}

impl Default for DagConfig {
    fn default() -> Self {
        Self {
            max_depth: 20,
            max_nodes: 100_000,
            max_total_pixels: crate::state::MAX_TOTAL_PIXELS,
            max_side: 40,
            time_limit: Duration::from_secs(60),
        }
    }
}

/// One DAG node: its State payload, the generating function and parent
/// (both `None` for roots), a child-function cache, and whether it is
/// piece-eligible.
pub struct DagNode {
    state: State,
    parent: Option<DagNodeId>,
    via: Option<TransformId>,
    children: BTreeMap<TransformId, DagNodeId>,
    is_piece: bool,
}

impl DagNode {
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn image(&self) -> &Grid {
        self.state.first_image()
    }

    pub fn parent(&self) -> Option<DagNodeId> {
        self.parent
    }

    pub fn via(&self) -> Option<TransformId> {
        self.via
    }

    pub fn children(&self) -> &BTreeMap<TransformId, DagNodeId> {
        &self.children
    }

    pub fn is_piece(&self) -> bool {
        self.is_piece
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// An interned directed graph of States reached from a fixed set of root
/// States by chaining library transforms, up to the caps in [`DagConfig`].
/// Nodes are deduplicated by content hash (resolved by structural equality
/// on collision); edges are a pure cache of "applying transform f to the
/// parent yields this child", never stale.
pub struct Dag {
    graph: DiGraph<DagNode, TransformId>,
    by_hash: HashMap<u64, Vec<DagNodeId>>,
    roots: Vec<DagNodeId>,
    config: DagConfig,
}

impl Dag {
    pub fn new(config: DagConfig) -> Self {
        Self {
            graph: DiGraph::new(),
            by_hash: HashMap::new(),
            roots: Vec::new(),
            config,
        }
    }

    pub fn roots(&self) -> &[DagNodeId] {
        &self.roots
    }

    pub fn node(&self, id: DagNodeId) -> &DagNode {
        &self.graph[id]
    }

    pub fn node_image(&self, id: DagNodeId) -> &Grid {
        self.graph[id].image()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Finds an existing node with equal State, or inserts a new one.
    /// Returns the node id either way — this is the hash-cons the
    /// dedup-completeness invariant depends on.
    fn intern(&mut self, state: State, parent: Option<DagNodeId>, via: Option<TransformId>) -> DagNodeId {
        let hash = state.content_hash();
        if let Some(bucket) = self.by_hash.get(&hash) {
            for &candidate in bucket {
                if self.graph[candidate].state == state {
                    return candidate;
                }
            }
        }
        let max_side = self.config.max_side;
        let is_piece = parent.is_some() && state.every_image_within(max_side);
        let id = self.graph.add_node(DagNode {
            state,
            parent,
            via,
            children: BTreeMap::new(),
            is_piece,
        });
        self.by_hash.entry(hash).or_default().push(id);
        id
    }

    /// Inserts `state` as a root (no parent). Multiple roots are allowed;
    /// calling this with a State equal to an existing root (or any other
    /// node) returns the existing id rather than duplicating it.
    pub fn add_root(&mut self, state: State) -> DagNodeId {
        let id = self.intern(state, None, None);
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
        id
    }

    fn validate_child(&self, parent_depth: u16, cost: u8, child: &State) -> bool {
        if parent_depth as u32 + cost as u32 > self.config.max_depth as u32 {
            return false;
        }
        if child.total_pixels() > self.config.max_total_pixels {
            return false;
        }
        true
    }

    /// Breadth-first expansion from the current roots: at each frontier
    /// node, the library's listed function ids are tried in ascending
    /// order; valid, new children are inserted and queued. Terminates on
    /// an empty frontier, the node cap, or the time limit — whichever
    /// fires first — and never reports which one.
    pub fn build(&mut self, library: &Library) {
        let start = Instant::now();
        let mut frontier: VecDeque<DagNodeId> = self.roots.iter().copied().collect();
        let listed = library.listed_ids();
        while let Some(parent_id) = frontier.pop_front() {
            if self.graph.node_count() >= self.config.max_nodes {
                break;
            }
            if start.elapsed() >= self.config.time_limit {
                break;
            }
            let parent_state = self.graph[parent_id].state.clone();
            let parent_depth = parent_state.depth();
            for &fid in &listed {
                if self.graph.node_count() >= self.config.max_nodes {
                    break;
                }
                let transform = library.get(fid);
                let Some(child_state) = transform.apply(&parent_state) else {
                    continue;
                };
                if !self.validate_child(parent_depth, transform.cost(), &child_state) {
                    continue;
                }
                let before = self.graph.node_count();
                let child_id = self.intern(child_state, Some(parent_id), Some(fid));
                self.graph[parent_id].children.insert(fid, child_id);
                self.graph.update_edge(parent_id, child_id, fid);
                if self.graph.node_count() > before {
                    frontier.push_back(child_id);
                }
            }
        }
    }
}
