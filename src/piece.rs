use std::collections::BinaryHeap;
use std::collections::HashSet;
use std::cmp::Ordering;
use std::cmp::Reverse;

use crate::dag::Dag;
use crate::dag::DagNodeId;
use crate::library::Library;

#[derive(Debug, Clone, Copy)]
pub struct PieceConfig {
    pub max_pieces: usize,
}

impl Default for PieceConfig {
    fn default() -> Self {
        Self { max_pieces: 100_000 }
    }
}

/// One piece: `D` node ids (one per DAG), reachable from the DAGs'
/// corresponding roots by the same function sequence at the same total
/// cost, indexing into [`PieceCollection::memory`].
#[derive(Debug, Clone, Copy)]
pub struct PieceRecord {
    pub memory_index: usize,
    pub depth: u16,
}

/// The parallel DAGs plus every piece discovered across them: a flat
/// `[node_id; piece_count * d]` memory block and the records indexing into
/// it, matching the layout SPEC_FULL.md calls out for cache locality.
pub struct PieceCollection {
    d: usize,
    memory: Vec<DagNodeId>,
    pieces: Vec<PieceRecord>,
}

impl PieceCollection {
    pub fn dag_count(&self) -> usize {
        self.d
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn pieces(&self) -> &[PieceRecord] {
        &self.pieces
    }

    pub fn nodes(&self, record: &PieceRecord) -> &[DagNodeId] {
        &self.memory[record.memory_index..record.memory_index + self.d]
    }
}

/// Min-priority-queue entry ordered by `(depth, sequence)` ascending —
/// uniform-cost search over the product graph, FIFO among equal depths
/// (the BFS order determinism contract requires).
struct Entry {
    depth: u16,
    seq: u64,
    tuple: Vec<DagNodeId>,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth && self.seq == other.seq
    }
}
impl Eq for Entry {}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.depth, self.seq).cmp(&(other.depth, other.seq))
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Over `dags` (one per training pair plus the test input), extracts every
/// piece reachable by a shared function sequence from the DAGs' common
/// root indices — a lazy uniform-cost search in the product graph, capped
/// at `config.max_pieces` and stopping deterministically in BFS order when
/// the cap fires.
pub fn extract_pieces(dags: &[Dag], library: &Library, config: PieceConfig) -> PieceCollection {
    let d = dags.len();
    let mut memory = Vec::new();
    let mut pieces = Vec::new();
    if d == 0 {
        return PieceCollection { d, memory, pieces };
    }

    let shared_roots = dags.iter().map(|dag| dag.roots().len()).min().unwrap_or(0);
    let mut heap: BinaryHeap<Reverse<Entry>> = BinaryHeap::new();
    let mut seen: HashSet<Vec<DagNodeId>> = HashSet::new();
    let mut seq: u64 = 0;

    for r in 0..shared_roots {
        let tuple: Vec<DagNodeId> = dags.iter().map(|dag| dag.roots()[r]).collect();
        heap.push(Reverse(Entry {
            depth: 0,
            seq,
            tuple,
        }));
        seq += 1;
    }

    let listed = library.listed_ids();

    while let Some(Reverse(entry)) = heap.pop() {
        if !seen.insert(entry.tuple.clone()) {
            continue;
        }

        let all_eligible = entry
            .tuple
            .iter()
            .zip(dags.iter())
            .all(|(&id, dag)| dag.node(id).is_piece());
        if all_eligible {
            let memory_index = memory.len();
            memory.extend_from_slice(&entry.tuple);
            pieces.push(PieceRecord {
                memory_index,
                depth: entry.depth,
            });
            if pieces.len() >= config.max_pieces {
                break;
            }
        }

        for &fid in &listed {
            let mut child_tuple = Vec::with_capacity(d);
            let mut ok = true;
            for (&id, dag) in entry.tuple.iter().zip(dags.iter()) {
                match dag.node(id).children().get(&fid) {
                    Some(&child) => child_tuple.push(child),
                    None => {
                        ok = false;
                        break;
                    }
                }
            }
            if !ok {
                continue;
            }
            let cost = library.get(fid).cost();
            heap.push(Reverse(Entry {
                depth: entry.depth + cost as u16,
                seq,
                tuple: child_tuple,
            }));
            seq += 1;
        }
    }

    PieceCollection { d, memory, pieces }
}
