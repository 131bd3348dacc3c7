//! Enumeration of directed triangular cycles over the active pool edges.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use super::graph::PoolEdge;

/// A directed three-token cycle. The first token is the start token; the
/// cycle returns to it after three hops.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cycle {
    tokens: [String; 3],
}

impl Cycle {
    /// Build a cycle from its three tokens in hop order.
    pub fn new(a: &str, b: &str, c: &str) -> Self {
        Self {
            tokens: [a.to_string(), b.to_string(), c.to_string()],
        }
    }

    /// The token the cycle starts and ends with.
    pub fn start(&self) -> &str {
        &self.tokens[0]
    }

    /// The three tokens in hop order.
    pub fn tokens(&self) -> &[String; 3] {
        &self.tokens
    }

    /// Whether the cycle visits the given token.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// The same cycle rotated so that `start` is first, if it is a member.
    pub fn rotated_to(&self, start: &str) -> Option<Cycle> {
        let offset = self.tokens.iter().position(|t| t == start)?;
        let [a, b, c] = &self.tokens;
        Some(match offset {
            0 => self.clone(),
            1 => Cycle::new(b, c, a),
            _ => Cycle::new(c, a, b),
        })
    }

    /// All three rotations of the cycle, starting with this one.
    pub fn rotations(&self) -> [Cycle; 3] {
        let [a, b, c] = &self.tokens;
        [self.clone(), Cycle::new(b, c, a), Cycle::new(c, a, b)]
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = &self.tokens;
        write!(f, "{a}->{b}->{c}->{a}")
    }
}

/// Enumerate every directed 3-cycle closable over the active edges.
///
/// A triangle A/B/C yields all three rotations (A-start, B-start, C-start) so
/// the start-token filter downstream sees each entry point. Output order is
/// deterministic for a given edge set; duplicates are emitted once, keeping
/// first-seen order.
pub fn enumerate_cycles(edges: &[PoolEdge]) -> Vec<Cycle> {
    // Fee tiers don't matter for closure, only reachability.
    let mut adjacency: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for edge in edges {
        adjacency
            .entry(edge.token_in.as_str())
            .or_default()
            .insert(edge.token_out.as_str());
    }

    let reaches = |from: &str, to: &str| {
        adjacency
            .get(from)
            .map(|outs| outs.contains(to))
            .unwrap_or(false)
    };

    let mut seen: HashSet<Cycle> = HashSet::new();
    let mut cycles = Vec::new();

    for (&a, outs_a) in &adjacency {
        for &b in outs_a {
            if b == a {
                continue;
            }
            let Some(outs_b) = adjacency.get(b) else {
                continue;
            };
            for &c in outs_b {
                if c == a || c == b {
                    continue;
                }
                if !reaches(c, a) {
                    continue;
                }
                for rotation in Cycle::new(a, b, c).rotations() {
                    if seen.insert(rotation.clone()) {
                        cycles.push(rotation);
                    }
                }
            }
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn edge(token_in: &str, token_out: &str) -> PoolEdge {
        PoolEdge {
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            fee: 500,
        }
    }

    fn triangle() -> Vec<PoolEdge> {
        vec![
            edge("GUSDC", "GALA"),
            edge("GALA", "GWETH"),
            edge("GWETH", "GUSDC"),
        ]
    }

    #[test]
    fn closed_triangle_yields_all_rotations_once() {
        let cycles = enumerate_cycles(&triangle());
        assert_eq!(cycles.len(), 3);
        assert!(cycles.contains(&Cycle::new("GUSDC", "GALA", "GWETH")));
        assert!(cycles.contains(&Cycle::new("GALA", "GWETH", "GUSDC")));
        assert!(cycles.contains(&Cycle::new("GWETH", "GUSDC", "GALA")));
    }

    #[test]
    fn open_path_yields_nothing() {
        // Missing the closing GWETH -> GUSDC edge.
        let edges = vec![edge("GUSDC", "GALA"), edge("GALA", "GWETH")];
        assert!(enumerate_cycles(&edges).is_empty());
    }

    #[test]
    fn direction_matters_for_closure() {
        // The closing edge exists only in the wrong direction.
        let edges = vec![
            edge("GUSDC", "GALA"),
            edge("GALA", "GWETH"),
            edge("GUSDC", "GWETH"),
        ];
        assert!(enumerate_cycles(&edges).is_empty());
    }

    #[test]
    fn multiple_fee_tiers_do_not_duplicate_cycles() {
        let mut edges = triangle();
        edges.push(PoolEdge {
            token_in: "GUSDC".to_string(),
            token_out: "GALA".to_string(),
            fee: 3000,
        });
        assert_eq!(enumerate_cycles(&edges).len(), 3);
    }

    #[test]
    fn enumeration_is_deterministic() {
        let first = enumerate_cycles(&triangle());
        let second = enumerate_cycles(&triangle());
        assert_eq!(first, second);
    }

    #[test]
    fn empty_edges_yield_no_cycles() {
        assert!(enumerate_cycles(&[]).is_empty());
    }

    #[test]
    fn rotated_to_finds_member_token() {
        let cycle = Cycle::new("GALA", "GWETH", "GUSDC");
        let rotated = cycle.rotated_to("GUSDC").unwrap();
        assert_eq!(rotated, Cycle::new("GUSDC", "GALA", "GWETH"));
        assert!(cycle.rotated_to("DOGE").is_none());
    }

    #[test]
    fn display_shows_hop_order() {
        let cycle = Cycle::new("GUSDC", "GALA", "GWETH");
        assert_eq!(cycle.to_string(), "GUSDC->GALA->GWETH->GUSDC");
    }
}
