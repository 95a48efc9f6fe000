// Force-directed relaxation shared by the top-level pass and group interiors.
//
// Per step:
// - repulsion between every pair (repulsion / d^2, optionally size-weighted)
// - springs along edges towards the ideal length
// - damped integration with a speed cap that anneals from 1.0 down to 0.05
// - collision resolution on padded boxes (velocities halved on contact)
// - recentering on the centroid
//
// Works on a dense local copy of the participants' centers; the caller's
// arena is only written back at the end.

use serde::{Deserialize, Deserializer, Serialize};

use crate::graph::{NodeId, Point, Size};
use super::separation;

const MIN_TEMPERATURE: f64 = 0.05;
/// Share of the larger overlap used as the collision push.
const COLLISION_PUSH: f64 = 0.6;
const COLLISION_MARGIN: f64 = 2.0;
/// Floor for repulsion distance.
const MIN_DISTANCE: f64 = 1.0;
/// Steps before the energy check may end the run.
const MIN_STEPS: usize = 50;
/// Per-participant kinetic energy under which the system counts as settled.
const SETTLED_ENERGY: f64 = 0.01;

/// Physics constants for one simulation run. Requests override them through
/// [`SimOverrides`], which fill gaps from the preset being overridden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimConfig {
    pub iterations: usize,
    pub repulsion: f64,
    pub spring_k: f64,
    pub ideal_len: f64,
    pub damping: f64,
    pub max_velocity: f64,
    pub collision_padding: f64,
    /// Large nodes push harder.
    pub size_weighted_repulsion: bool,
}

impl SimConfig {
    /// Sparse arrangement of groups and ungrouped nodes.
    pub fn top_level() -> Self {
        Self {
            iterations: 300,
            repulsion: 120_000.0,
            spring_k: 0.02,
            ideal_len: 320.0,
            damping: 0.85,
            max_velocity: 60.0,
            collision_padding: 40.0,
            size_weighted_repulsion: true,
        }
    }

    /// Tight arrangement of members inside a group.
    pub fn group() -> Self {
        Self {
            iterations: 200,
            repulsion: 30_000.0,
            spring_k: 0.04,
            ideal_len: 200.0,
            damping: 0.8,
            max_velocity: 30.0,
            collision_padding: 20.0,
            size_weighted_repulsion: false,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::top_level()
    }
}

/// A partial [`SimConfig`] as it arrives in a request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimOverrides {
    pub iterations: Option<usize>,
    pub repulsion: Option<f64>,
    pub spring_k: Option<f64>,
    pub ideal_len: Option<f64>,
    pub damping: Option<f64>,
    pub max_velocity: Option<f64>,
    pub collision_padding: Option<f64>,
    pub size_weighted_repulsion: Option<bool>,
}

impl SimOverrides {
    pub fn apply(self, base: SimConfig) -> SimConfig {
        SimConfig {
            iterations: self.iterations.unwrap_or(base.iterations),
            repulsion: self.repulsion.unwrap_or(base.repulsion),
            spring_k: self.spring_k.unwrap_or(base.spring_k),
            ideal_len: self.ideal_len.unwrap_or(base.ideal_len),
            damping: self.damping.unwrap_or(base.damping),
            max_velocity: self.max_velocity.unwrap_or(base.max_velocity),
            collision_padding: self.collision_padding.unwrap_or(base.collision_padding),
            size_weighted_repulsion: self.size_weighted_repulsion.unwrap_or(base.size_weighted_repulsion),
        }
    }
}

pub(crate) fn top_level_overrides<'de, D: Deserializer<'de>>(d: D) -> Result<SimConfig, D::Error> {
    SimOverrides::deserialize(d).map(|o| o.apply(SimConfig::top_level()))
}

pub(crate) fn group_overrides<'de, D: Deserializer<'de>>(d: D) -> Result<SimConfig, D::Error> {
    SimOverrides::deserialize(d).map(|o| o.apply(SimConfig::group()))
}

/// Relax `participants` in place. `centers` and `sizes` are indexed by NodeId.
/// Edges with an endpoint outside `participants` are ignored.
/// Returns the number of steps run.
pub fn simulate(
    participants: &[NodeId],
    centers: &mut [Point],
    edges: &[(NodeId, NodeId)],
    sizes: &[Size],
    cfg: &SimConfig,
) -> usize {
    let n = participants.len();
    if n < 2 || cfg.iterations == 0 {
        return 0;
    }

    let mut slot = vec![usize::MAX; centers.len()];
    for (i, nid) in participants.iter().enumerate() {
        slot[nid.0] = i;
    }
    let springs: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|(a, b)| {
            let (i, j) = (slot[a.0], slot[b.0]);
            (i != usize::MAX && j != usize::MAX).then_some((i, j))
        })
        .collect();

    let ids: Vec<usize> = participants.iter().map(|nid| nid.0).collect();
    let dims: Vec<Size> = ids.iter().map(|&i| sizes[i]).collect();
    let mut pos: Vec<Point> = ids.iter().map(|&i| centers[i]).collect();
    let mut vel = vec![Point::ZERO; n];
    let mut force = vec![Point::ZERO; n];

    let mut steps = 0;
    for step in 0..cfg.iterations {
        steps = step + 1;
        let temperature = (1.0 - step as f64 / cfg.iterations as f64).max(MIN_TEMPERATURE);
        force.fill(Point::ZERO);

        // Repulsion
        for i in 0..n {
            for j in (i + 1)..n {
                let (dir, dist) = separation(pos[i], pos[j], ids[i], ids[j]);
                let d = dist.max(MIN_DISTANCE);
                let mut magnitude = cfg.repulsion / (d * d);
                if cfg.size_weighted_repulsion {
                    magnitude *= 1.0 + (dims[i].max_side() + dims[j].max_side()) / 200.0;
                }
                force[i] += dir.scale(magnitude);
                force[j] -= dir.scale(magnitude);
            }
        }

        // Springs
        for &(a, b) in &springs {
            let (dir, dist) = separation(pos[b], pos[a], ids[b], ids[a]);
            let pull = cfg.spring_k * (dist - cfg.ideal_len);
            force[a] += dir.scale(pull);
            force[b] -= dir.scale(pull);
        }

        // Integration
        let cap = cfg.max_velocity * temperature;
        for i in 0..n {
            let mut v = (vel[i] + force[i]).scale(cfg.damping);
            let speed = v.length();
            if speed > cap {
                v = v.scale(cap / speed);
            }
            vel[i] = v;
            pos[i] += v;
        }

        resolve_collisions(&mut pos, &mut vel, &dims, &ids, cfg.collision_padding);

        // Recenter
        let mut centroid = Point::ZERO;
        for p in &pos {
            centroid += *p;
        }
        let centroid = centroid.scale(1.0 / n as f64);
        for p in pos.iter_mut() {
            *p -= centroid;
        }

        let energy: f64 = vel.iter().map(|v| v.x * v.x + v.y * v.y).sum();
        if step + 1 >= MIN_STEPS && energy < SETTLED_ENERGY * n as f64 {
            break;
        }
    }

    for (i, &id) in ids.iter().enumerate() {
        centers[id] = pos[i];
    }
    steps
}

fn resolve_collisions(pos: &mut [Point], vel: &mut [Point], dims: &[Size], ids: &[usize], padding: f64) {
    let n = pos.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let d = pos[j] - pos[i];
            let overlap_x = (dims[i].width + dims[j].width) / 2.0 + padding - d.x.abs();
            let overlap_y = (dims[i].height + dims[j].height) / 2.0 + padding - d.y.abs();
            if overlap_x <= 0.0 || overlap_y <= 0.0 {
                continue;
            }
            let (dir, _) = separation(pos[j], pos[i], ids[j], ids[i]);
            let push = (COLLISION_PUSH * overlap_x.max(overlap_y) + COLLISION_MARGIN) / 2.0;
            pos[i] -= dir.scale(push);
            pos[j] += dir.scale(push);
            vel[i] = vel[i].scale(0.5);
            vel[j] = vel[j].scale(0.5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(n: usize) -> Vec<Size> {
        vec![Size::new(180.0, 50.0); n]
    }

    #[test]
    fn test_single_participant_is_untouched() {
        let mut centers = vec![Point::new(5.0, 5.0)];
        let steps = simulate(&[NodeId(0)], &mut centers, &[], &sizes(1), &SimConfig::top_level());
        assert_eq!(steps, 0);
        assert_eq!(centers[0], Point::new(5.0, 5.0));
    }

    #[test]
    fn test_coincident_nodes_separate() {
        let ids = [NodeId(0), NodeId(1)];
        let mut centers = vec![Point::ZERO; 2];
        simulate(&ids, &mut centers, &[], &sizes(2), &SimConfig::top_level());

        let d = centers[1] - centers[0];
        assert!(d.x.is_finite() && d.y.is_finite());
        assert!(d.x.abs() >= 180.0 || d.y.abs() >= 50.0, "still overlapping: {:?}", d);
    }

    #[test]
    fn test_spring_pulls_far_pair_together() {
        let ids = [NodeId(0), NodeId(1)];
        let mut centers = vec![Point::new(-2000.0, 0.0), Point::new(2000.0, 0.0)];
        let edges = [(NodeId(0), NodeId(1))];
        simulate(&ids, &mut centers, &edges, &sizes(2), &SimConfig::top_level());

        let dist = (centers[1] - centers[0]).length();
        assert!(dist < 4000.0);
        assert!(dist > 180.0);
    }

    #[test]
    fn test_result_is_centered() {
        let ids = [NodeId(0), NodeId(1), NodeId(2)];
        let mut centers = vec![Point::new(900.0, 10.0), Point::new(1000.0, 400.0), Point::new(1300.0, 90.0)];
        let edges = [(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))];
        simulate(&ids, &mut centers, &edges, &sizes(3), &SimConfig::group());

        let c = (centers[0] + centers[1] + centers[2]).scale(1.0 / 3.0);
        assert!(c.length() < 1e-6);
    }

    #[test]
    fn test_overrides_fill_from_their_preset() {
        let o: SimOverrides = serde_json::from_str(r#"{"iterations": 50, "springK": 0.1}"#).unwrap();
        let cfg = o.apply(SimConfig::group());
        assert_eq!(cfg.iterations, 50);
        assert_eq!(cfg.spring_k, 0.1);
        assert_eq!(cfg.repulsion, SimConfig::group().repulsion);
        assert_eq!(cfg.ideal_len, SimConfig::group().ideal_len);
        assert!(!cfg.size_weighted_repulsion);
        assert_eq!(SimOverrides::default().apply(SimConfig::top_level()), SimConfig::top_level());
    }

    #[test]
    fn test_deterministic() {
        let ids = [NodeId(0), NodeId(1), NodeId(2), NodeId(3)];
        let edges = [(NodeId(0), NodeId(1)), (NodeId(0), NodeId(2)), (NodeId(0), NodeId(3))];
        let run = || {
            let mut centers = vec![Point::ZERO; 4];
            simulate(&ids, &mut centers, &edges, &sizes(4), &SimConfig::top_level());
            centers
        };
        assert_eq!(run(), run());
    }
}
