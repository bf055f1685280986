//! Dependency Settling
//!
//! Second pass of the flush order build. The depth-first walk only follows
//! outgoing edges, so a node that holds a FK to a node it reaches later
//! through another path can land too early. This pass re-sorts the walk's
//! output with Kahn's algorithm over the dependency relation
//! (referenced side before owning side), using the walk position as the
//! tie-break:
//! - an order that already satisfies every edge is returned unchanged
//! - edges between different strongly connected components are always satisfied
//! - a true cycle is cut at its earliest-walked node once nothing outside
//!   the cycle still has to precede it
//!
//! O((V + E) log V).

use crate::domain::entities::FlushInstruction;
use crate::domain::graph::EntityGraph;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use tracing::debug;

/// Reorder `walked` so every referenced row precedes its owners wherever the
/// dependency relation allows it.
pub(crate) fn settle_dependencies(
    graph: &EntityGraph,
    walked: Vec<FlushInstruction>,
) -> Vec<FlushInstruction> {
    let n = walked.len();
    if n < 2 {
        return walked;
    }

    // 1. Dependency edges between walked positions (self references dropped)
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    {
        let position: HashMap<&str, usize> = walked
            .iter()
            .enumerate()
            .map(|(pos, i)| (i.entity_id.as_str(), pos))
            .collect();

        for instruction in &walked {
            let Some(node) = graph.get(&instruction.entity_id) else {
                continue;
            };
            for edge in node.edges() {
                let (Some(referenced), Some(owner)) = (edge.referenced_id(), edge.owner_id())
                else {
                    continue;
                };
                let (Some(&before), Some(&after)) =
                    (position.get(referenced.as_str()), position.get(owner.as_str()))
                else {
                    continue;
                };
                if before != after {
                    successors[before].push(after);
                    in_degree[after] += 1;
                }
            }
        }
    }

    // 2. Components, and how many edges from other components still block each one
    let component = strongly_connected(&successors);
    let component_count = component.iter().copied().max().map_or(0, |c| c + 1);
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); component_count];
    for (pos, &c) in component.iter().enumerate() {
        members[c].push(pos);
    }
    let mut external_in = vec![0usize; component_count];
    for (before, targets) in successors.iter().enumerate() {
        for &after in targets {
            if component[before] != component[after] {
                external_in[component[after]] += 1;
            }
        }
    }

    // 3. Kahn's algorithm, earliest walk position first
    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&pos| in_degree[pos] == 0)
        .map(Reverse)
        .collect();
    // Members of cyclic components that no longer wait on anything outside
    let mut unblocked_cycles: BinaryHeap<Reverse<usize>> = BinaryHeap::new();
    for (c, group) in members.iter().enumerate() {
        if group.len() > 1 && external_in[c] == 0 {
            unblocked_cycles.extend(group.iter().copied().map(Reverse));
        }
    }

    let mut placed = vec![false; n];
    let mut sequence = Vec::with_capacity(n);
    let mut cuts = 0usize;

    loop {
        let next = match pop_unplaced(&mut ready, &placed) {
            Some(pos) => pos,
            None => match pop_unplaced(&mut unblocked_cycles, &placed) {
                Some(pos) => {
                    cuts += 1;
                    pos
                }
                None => break,
            },
        };

        placed[next] = true;
        sequence.push(next);

        for &after in &successors[next] {
            in_degree[after] = in_degree[after].saturating_sub(1);
            if in_degree[after] == 0 && !placed[after] {
                ready.push(Reverse(after));
            }

            let c = component[after];
            if c != component[next] {
                external_in[c] = external_in[c].saturating_sub(1);
                if external_in[c] == 0 && members[c].len() > 1 {
                    unblocked_cycles.extend(members[c].iter().copied().map(Reverse));
                }
            }
        }
    }

    if cuts > 0 {
        debug!(cuts, "Cut dependency cycles while settling flush order");
    }

    let mut slots: Vec<Option<FlushInstruction>> = walked.into_iter().map(Some).collect();
    let mut settled: Vec<FlushInstruction> =
        sequence.into_iter().filter_map(|pos| slots[pos].take()).collect();
    // Anything left unplaced keeps its walk order
    settled.extend(slots.into_iter().flatten());
    settled
}

fn pop_unplaced(heap: &mut BinaryHeap<Reverse<usize>>, placed: &[bool]) -> Option<usize> {
    while let Some(Reverse(pos)) = heap.pop() {
        if !placed[pos] {
            return Some(pos);
        }
    }
    None
}

/// Tarjan's strongly connected components, iterative. Returns a component
/// id per position.
fn strongly_connected(successors: &[Vec<usize>]) -> Vec<usize> {
    const UNSEEN: usize = usize::MAX;

    let n = successors.len();
    let mut index = vec![UNSEEN; n];
    let mut low = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut component = vec![0usize; n];
    let mut next_index = 0;
    let mut next_component = 0;

    for root in 0..n {
        if index[root] != UNSEEN {
            continue;
        }

        index[root] = next_index;
        low[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        // (node, offset of the next successor to look at)
        let mut frames: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            if let Some(&w) = successors[v].get(frame.1) {
                frame.1 += 1;
                if index[w] == UNSEEN {
                    index[w] = next_index;
                    low[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    frames.push((w, 0));
                } else if on_stack[w] {
                    low[v] = low[v].min(index[w]);
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                low[parent] = low[parent].min(low[v]);
            }
            if low[v] == index[v] {
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component[w] = next_component;
                    if w == v {
                        break;
                    }
                }
                next_component += 1;
            }
        }
    }

    component
}
