use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use core_geom::Point;
use core_plane::CancellationToken;
use tracing::{debug, trace};

use crate::channel_map::ChannelMap;
use crate::types::ChannelKind;

/// Which channel sequence Phase B is allowed to explore (spec §4.6 "In fast
/// mode, Phase B reuses only the channels on Phase A's shortest path").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Fast,
    Thorough,
}

/// One hop of a returned route, in the order returned (destination first,
/// back to the chosen start point - spec §4.6 "returns a linked path from
/// `dest_loc` back to some `start_point`").
pub type Path = Vec<Point>;

#[derive(Clone, Copy)]
struct Candidate {
    priority: i64,
    node: Point,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for Candidate {}
impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // `BinaryHeap` is a max-heap; invert so lowest priority pops first.
        other.priority.cmp(&self.priority)
    }
}

/// All pins belonging to non-blocked channels, connected pairwise within
/// their owning channel with edge cost equal to grid-Manhattan distance
/// (spec §4.6 "computing edge cost as grid-Manhattan distance"). Two pins
/// at the same point - typically one on each side of a channel boundary -
/// are the same graph node for free, which is how a crossing is modeled.
fn build_pin_graph(map: &ChannelMap) -> HashMap<Point, Vec<(Point, i64)>> {
    let mut graph: HashMap<Point, Vec<(Point, i64)>> = HashMap::new();
    for channel in map.channels() {
        if channel.kind == ChannelKind::Blocked {
            continue;
        }
        let pins: Vec<Point> = channel.all_pins().map(|p| p.point).collect();
        for i in 0..pins.len() {
            for j in 0..pins.len() {
                if i == j {
                    continue;
                }
                let cost = manhattan(pins[i], pins[j]);
                graph.entry(pins[i]).or_default().push((pins[j], cost));
            }
        }
    }
    graph
}

fn manhattan(a: Point, b: Point) -> i64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Dijkstra/A* shortest-length search over the pin graph (spec §4.6 Phase
/// A). Returns the raw path and its length, or `None` if no start point can
/// reach `dest`.
fn shortest_path(
    graph: &HashMap<Point, Vec<(Point, i64)>>,
    starts: &[Point],
    dest: Point,
    best_cost: i64,
    max_pops: u64,
    cancel: &CancellationToken,
) -> Option<(Path, i64)> {
    let mut best: HashMap<Point, i64> = HashMap::new();
    let mut parent: HashMap<Point, Point> = HashMap::new();
    let mut heap = BinaryHeap::new();

    for &s in starts {
        let h = manhattan(s, dest);
        best.insert(s, 0);
        heap.push(Candidate {
            priority: h,
            node: s,
        });
    }

    let mut pops = 0u64;
    while let Some(Candidate { node, .. }) = heap.pop() {
        if cancel.is_cancelled() {
            return None;
        }
        pops += 1;
        if pops > max_pops {
            debug!(target: "router.search", pops, max_pops, "phase_search_aborted_heap_pop_budget");
            return None;
        }
        let cost_so_far = *best.get(&node).unwrap_or(&i64::MAX);
        if cost_so_far > best_cost {
            continue;
        }
        if node == dest {
            trace!(target: "router.search", pops, cost = cost_so_far, "phase_a_reached_destination");
            let mut path = vec![dest];
            let mut cur = dest;
            while let Some(&p) = parent.get(&cur) {
                path.push(p);
                cur = p;
            }
            return Some((path, cost_so_far));
        }
        let Some(edges) = graph.get(&node) else {
            continue;
        };
        for &(next, edge_cost) in edges {
            let candidate_cost = cost_so_far + edge_cost;
            if candidate_cost >= *best.get(&next).unwrap_or(&i64::MAX) {
                continue;
            }
            best.insert(next, candidate_cost);
            parent.insert(next, node);
            heap.push(Candidate {
                priority: candidate_cost + manhattan(next, dest),
                node: next,
            });
        }
    }
    None
}

/// Walk a raw path and re-derive its congestion-adjusted cost by summing
/// `penalty` over every interior crossing point (spec §4.6 "`crossing_adjust`
/// ... re-seats each pin within the run of free pins available at the same
/// channel crossing so as to minimize the sum of congestion penalties").
/// This workspace doesn't model multiple free pins per crossing, so the
/// re-seating step itself is a no-op and `crossing_adjust` reduces to the
/// penalty sum; see `DESIGN.md`.
fn crossing_adjust(path: &Path, penalty: &dyn Fn(Point) -> i64) -> i64 {
    let raw_len: i64 = path
        .windows(2)
        .map(|w| manhattan(w[0], w[1]))
        .sum();
    let interior_penalty: i64 = path[1..path.len().saturating_sub(1)].iter().map(|&p| penalty(p)).sum();
    raw_len + interior_penalty
}

/// Two-phase global router path search (spec §4.6 `process_terminal`).
/// Returns `None` if the destination is unreachable within `best_cost`, or
/// immediately if `dest` lies in a blocked tile.
pub fn process_terminal(
    map: &ChannelMap,
    starts: &[Point],
    dest: Point,
    best_cost: i64,
    mode: SearchMode,
    max_heap_pops: u64,
    phase_b_margin: i64,
    penalty: &dyn Fn(Point) -> i64,
    cancel: &CancellationToken,
) -> Option<Path> {
    let dest_tile = map.plane().active_ids().find(|&id| map.plane().get(id).rect().contains_point(dest));
    if let Some(id) = dest_tile {
        if map.kind_of(id) == Some(ChannelKind::Blocked) {
            debug!(target: "router.search", "destination_blocked_no_heap_activity");
            return None;
        }
    }

    let graph = build_pin_graph(map);
    let (raw_path, raw_len) = shortest_path(&graph, starts, dest, best_cost, max_heap_pops, cancel)?;
    debug!(target: "router.search", raw_len, "phase_a_complete");

    let mut best_adjusted = crossing_adjust(&raw_path, penalty);
    let mut best_path = raw_path.clone();

    if mode == SearchMode::Thorough {
        // Try single-edge-removal alternates to approximate "progressively
        // longer paths" without a full k-shortest-path search. Once the best
        // adjusted cost found so far is within `phase_b_margin` of the raw
        // Phase A cost, further alternates aren't worth exploring.
        for i in 0..raw_path.len().saturating_sub(1) {
            if cancel.is_cancelled() {
                break;
            }
            if best_adjusted - raw_len <= phase_b_margin {
                trace!(target: "router.search", best_adjusted, raw_len, phase_b_margin, "phase_b_margin_reached");
                break;
            }
            let mut pruned = graph.clone();
            let (a, b) = (raw_path[i], raw_path[i + 1]);
            if let Some(edges) = pruned.get_mut(&a) {
                edges.retain(|&(n, _)| n != b);
            }
            let Some((alt_path, alt_raw_len)) = shortest_path(&pruned, starts, dest, best_cost, max_heap_pops, cancel) else {
                continue;
            };
            if alt_raw_len > best_adjusted {
                break;
            }
            let adjusted = crossing_adjust(&alt_path, penalty);
            if adjusted < best_adjusted {
                best_adjusted = adjusted;
                best_path = alt_path;
            }
        }
    }

    debug!(target: "router.search", best_adjusted, "phase_b_complete");
    if best_adjusted >= best_cost {
        return None;
    }
    Some(best_path)
}
