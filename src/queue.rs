/*
Min-priority queue over node indices with decrease-key.

Entries are ordered by cost, ties broken by the order in which the entry
(or its latest decrease) was made. Backed by the `priority-queue` crate's
indexed binary heap, so a node is never queued twice.
*/

use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;

pub type NodeIndex = usize;
pub type Cost = f64;

// Max-heap over (cost, sequence), reversed so the cheapest and oldest wins.
type Rank = Reverse<(OrderedFloat<Cost>, u64)>;

#[derive(Debug)]
pub struct MinQueue {
    pq: PriorityQueue<NodeIndex, Rank>,
    seq: u64,
}

impl MinQueue {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pq: PriorityQueue::with_capacity(capacity),
            seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.pq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pq.is_empty()
    }

    /// Queues `node` at `cost`, or lowers its cost if it is already queued higher.
    /// Returns false when the node is already queued at `cost` or lower.
    pub fn push_or_decrease(&mut self, node: NodeIndex, cost: Cost) -> bool {
        debug_assert!(!cost.is_nan(), "NaN cost for node {}", node);
        if let Some(Reverse((queued, _))) = self.pq.get_priority(&node) {
            if queued.into_inner() <= cost {
                return false;
            }
        }
        let rank = Reverse((OrderedFloat(cost), self.seq));
        self.seq += 1;
        self.pq.push(node, rank);
        true
    }

    pub fn peek(&self) -> Option<(NodeIndex, Cost)> {
        self.pq
            .peek()
            .map(|(&node, Reverse((cost, _)))| (node, cost.into_inner()))
    }

    pub fn pop(&mut self) -> Option<(NodeIndex, Cost)> {
        self.pq
            .pop()
            .map(|(node, Reverse((cost, _)))| (node, cost.into_inner()))
    }
}

impl Default for MinQueue {
    fn default() -> Self {
        Self::new()
    }
}
