// Hub-rank colors.
//
// Plain nodes score +1 per connection (tree parent or edge, each pair once),
// plus CROSS_GROUP_BONUS when the connection leaves the node's group. Groups score
// by member count. Scores map to colors through descending threshold tables.

use std::collections::BTreeMap;

use crate::graph::Graph;
use super::adjacency::dedup_pairs;

pub const CROSS_GROUP_BONUS: usize = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorTier {
    pub min_score: usize,
    pub color: &'static str,
}

pub const NODE_COLOR_TIERS: [ColorTier; 4] = [
    ColorTier { min_score: 10, color: "#ef4444" },
    ColorTier { min_score: 6, color: "#f97316" },
    ColorTier { min_score: 4, color: "#eab308" },
    ColorTier { min_score: 2, color: "#22c55e" },
];
pub const DEFAULT_NODE_COLOR: &str = "#94a3b8";

pub const GROUP_COLOR_TIERS: [ColorTier; 3] = [
    ColorTier { min_score: 8, color: "#8b5cf6" },
    ColorTier { min_score: 5, color: "#3b82f6" },
    ColorTier { min_score: 3, color: "#06b6d4" },
];
pub const DEFAULT_GROUP_COLOR: &str = "#cbd5e1";

/// Score per NodeId.
pub fn hub_scores(graph: &Graph) -> Vec<usize> {
    let mut scores = vec![0; graph.len()];
    for (a, b) in dedup_pairs(graph.relations()) {
        let crosses = graph.node(a).group != graph.node(b).group;
        let gain = 1 + if crosses { CROSS_GROUP_BONUS } else { 0 };
        scores[a.0] += gain;
        scores[b.0] += gain;
    }
    for g in graph.groups() {
        scores[g.nid.0] = g.members.len();
    }
    scores
}

/// First tier whose threshold the score reaches; `tiers` must be descending.
pub fn color_for(score: usize, tiers: &[ColorTier], default: &'static str) -> &'static str {
    tiers
        .iter()
        .find(|t| score >= t.min_score)
        .map_or(default, |t| t.color)
}

pub fn assign_colors(graph: &Graph) -> BTreeMap<String, String> {
    let scores = hub_scores(graph);
    graph
        .nodes
        .iter()
        .map(|n| {
            let color = if graph.is_group(n.nid) {
                color_for(scores[n.nid.0], &GROUP_COLOR_TIERS, DEFAULT_GROUP_COLOR)
            } else {
                color_for(scores[n.nid.0], &NODE_COLOR_TIERS, DEFAULT_NODE_COLOR)
            };
            (n.id.clone(), color.to_string())
        })
        .collect()
}
