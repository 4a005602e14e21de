//! Resolution of textual taxi routes ("RW27-C3-C-F5-F") into vertex paths.
//!
//! Resolution runs in three steps:
//!
//! 1. the route string is split into upper-cased tokens,
//! 2. each token is normalized to an ident known to the network
//!    (runway prefixes stripped, "C3" reduced to "C"), consecutive repeats
//!    merged,
//! 3. the idents are walked in order, extending the path by the first
//!    adjacent edge of each ident, or by a breadth-first detour when no edge
//!    touches the current path end.
//!
//! Every step takes the first candidate that works rather than the best one.
//! The same route string therefore always produces the same path, which
//! keeps resolved routes comparable with the map-matched training paths.

use crate::error::{Result, RouteIssue, TaxiError};
use crate::graph::TaxiwayGraph;
use crate::models::VertexId;
use serde::{Deserialize, Serialize};

const RUNWAY_PREFIX: &str = "RW";

/// A route string resolved against the taxiway network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRoute {
    pub tokens: Vec<String>,
    pub normalized: Vec<String>,
    pub path: Vec<VertexId>,
    pub issues: Vec<RouteIssue>,
}

/// Split a route on `-` when it contains one, otherwise on `,`.
pub fn tokenize(route: &str) -> Vec<String> {
    let separator = if route.contains('-') { '-' } else { ',' };
    route
        .split(separator)
        .map(|token| token.trim().to_uppercase())
        .collect()
}

/// Canonical form of one token before the network is consulted.
///
/// Returns `None` for a bare runway designator such as `RW27`.
pub fn canonical_form(token: &str) -> Option<String> {
    if token.starts_with(RUNWAY_PREFIX) {
        let residue = token.replace(RUNWAY_PREFIX, "");
        let residue = residue.trim_start_matches(|c: char| c.is_ascii_digit());
        if residue.is_empty() {
            return None;
        }
        return Some(residue.to_string());
    }

    match token.chars().next() {
        Some(first) if first.is_ascii_uppercase() => Some(first.to_string()),
        _ => Some(token.to_string()),
    }
}

/// Resolves route strings against one network.
#[derive(Debug, Clone, Copy)]
pub struct RouteResolver<'a> {
    graph: &'a TaxiwayGraph,
}

impl<'a> RouteResolver<'a> {
    pub fn new(graph: &'a TaxiwayGraph) -> Self {
        Self { graph }
    }

    /// Map tokens to idents present in the network.
    ///
    /// The canonical form is preferred, then the token verbatim. A value equal
    /// to the previously kept ident is not repeated.
    pub fn normalize(&self, tokens: &[String], issues: &mut Vec<RouteIssue>) -> Vec<String> {
        let mut normalized: Vec<String> = Vec::new();

        for token in tokens {
            let Some(candidate) = canonical_form(token) else {
                tracing::debug!("Skipping runway designator {}", token);
                issues.push(RouteIssue::RunwayDesignator(token.clone()));
                continue;
            };

            let ident = if self.graph.has_ident(&candidate) {
                candidate
            } else if self.graph.has_ident(token) {
                token.clone()
            } else {
                tracing::warn!("Taxiway '{}' not found in network", token);
                issues.push(RouteIssue::UnresolvedIdent(token.clone()));
                continue;
            };

            if normalized.last() != Some(&ident) {
                normalized.push(ident);
            }
        }

        normalized
    }

    /// Walk normalized idents into a vertex path.
    ///
    /// The first ident contributes both ends of its first edge. Each later
    /// ident contributes the far end of its first edge touching the path end
    /// whose far end is not yet on the path. Failing that, for the ident's
    /// edges in order, an edge with one end already on the path is reached by
    /// a fewest-edges search from the path end to its other end; the first
    /// search that succeeds is appended. Idents that cannot be linked are
    /// reported and skipped.
    pub fn assemble(&self, idents: &[String], issues: &mut Vec<RouteIssue>) -> Vec<VertexId> {
        let mut path: Vec<VertexId> = Vec::new();

        for ident in idents {
            let Some(edges) = self.graph.ident_edges(ident) else {
                issues.push(RouteIssue::UnresolvedIdent(ident.clone()));
                continue;
            };

            let Some(&last) = path.last() else {
                if let Some(first) = edges.first() {
                    path.extend([first.from, first.to]);
                }
                continue;
            };

            let adjacent = edges.iter().find_map(|edge| {
                if edge.from == last && !path.contains(&edge.to) {
                    Some(edge.to)
                } else if edge.to == last && !path.contains(&edge.from) {
                    Some(edge.from)
                } else {
                    None
                }
            });
            if let Some(next) = adjacent {
                path.push(next);
                continue;
            }

            let detour = edges.iter().find_map(|edge| {
                let target = if path.contains(&edge.from) {
                    edge.to
                } else if path.contains(&edge.to) {
                    edge.from
                } else {
                    return None;
                };
                self.graph.shortest_path(last, target)
            });
            match detour {
                Some(detour) => path.extend(detour.into_iter().skip(1)),
                None => {
                    tracing::warn!("Could not connect '{}' to path", ident);
                    issues.push(RouteIssue::DisconnectedSegment(ident.clone()));
                }
            }
        }

        path
    }

    /// Resolve a route string end to end.
    ///
    /// Unknown tokens and unconnectable idents are recorded in
    /// [`ResolvedRoute::issues`]; only a path shorter than two vertices is an
    /// error.
    pub fn resolve(&self, route: &str) -> Result<ResolvedRoute> {
        let mut issues = Vec::new();
        let tokens = tokenize(route);
        let normalized = self.normalize(&tokens, &mut issues);
        tracing::debug!(
            "Route {} normalized to {}",
            tokens.join("-"),
            normalized.join("-")
        );
        let path = self.assemble(&normalized, &mut issues);

        if path.len() < 2 {
            return Err(TaxiError::InsufficientPath("route".to_string()));
        }

        Ok(ResolvedRoute {
            tokens,
            normalized,
            path,
            issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Segment, Vertex};

    fn seg(ident: &str, vertices: &[VertexId]) -> Segment {
        Segment {
            ident: ident.to_string(),
            vertices: vertices.to_vec(),
        }
    }

    /// Vertices 1..=12 laid out on a line of latitude.
    fn graph(segments: &[Segment]) -> TaxiwayGraph {
        let vertices = (1..=12)
            .map(|index| Vertex {
                index,
                lat: 40.85,
                lon: -74.06 + index as f64 * 0.001,
            })
            .collect();
        TaxiwayGraph::build(vertices, segments)
    }

    #[test]
    fn tokenize_prefers_dash() {
        assert_eq!(tokenize("l-c, h"), vec!["L", "C, H"]);
        assert_eq!(tokenize(" a , b,c"), vec!["A", "B", "C"]);
    }

    #[test]
    fn canonical_forms() {
        assert_eq!(canonical_form("RW27"), None);
        assert_eq!(canonical_form("RW06"), None);
        assert_eq!(canonical_form("RW24L"), Some("L".to_string()));
        assert_eq!(canonical_form("C3"), Some("C".to_string()));
        assert_eq!(canonical_form("TWY"), Some("T".to_string()));
        assert_eq!(canonical_form("9X"), Some("9X".to_string()));
        assert_eq!(canonical_form(""), Some(String::new()));
    }

    #[test]
    fn runway_and_numbered_tokens_normalize() {
        let graph = graph(&[seg("C", &[1, 2]), seg("F", &[2, 3])]);
        let resolver = RouteResolver::new(&graph);
        let resolved = resolver.resolve("RW27-C3-C-F5-F").unwrap();
        assert_eq!(resolved.normalized, vec!["C", "F"]);
        assert_eq!(resolved.path, vec![1, 2, 3]);
        assert_eq!(
            resolved.issues,
            vec![RouteIssue::RunwayDesignator("RW27".to_string())]
        );
    }

    #[test]
    fn verbatim_token_used_when_letter_is_unknown() {
        let graph = graph(&[seg("A", &[1, 2]), seg("K1", &[2, 3])]);
        let resolver = RouteResolver::new(&graph);
        let resolved = resolver.resolve("A,K1").unwrap();
        assert_eq!(resolved.normalized, vec!["A", "K1"]);
        assert_eq!(resolved.path, vec![1, 2, 3]);
    }

    #[test]
    fn connected_chain_resolves_without_issues() {
        let graph = graph(&[seg("L", &[1, 2]), seg("C", &[2, 3]), seg("H", &[3, 4])]);
        let resolved = RouteResolver::new(&graph).resolve("L-C-H").unwrap();
        assert_eq!(resolved.normalized, vec!["L", "C", "H"]);
        assert_eq!(resolved.path, vec![1, 2, 3, 4]);
        assert!(resolved.issues.is_empty());
    }

    #[test]
    fn unknown_ident_is_reported_and_skipped() {
        let graph = graph(&[seg("L", &[1, 2]), seg("C", &[2, 3])]);
        let resolved = RouteResolver::new(&graph).resolve("L-Z9-C").unwrap();
        assert_eq!(resolved.normalized, vec!["L", "C"]);
        assert_eq!(resolved.path, vec![1, 2, 3]);
        assert_eq!(
            resolved.issues,
            vec![RouteIssue::UnresolvedIdent("Z9".to_string())]
        );
    }

    #[test]
    fn first_adjacent_edge_wins() {
        // From 2, ident B offers 2-5 then 2-3; the first listed is taken.
        let graph = graph(&[seg("A", &[1, 2]), seg("B", &[2, 5]), seg("B", &[2, 3])]);
        let resolved = RouteResolver::new(&graph).resolve("A-B").unwrap();
        assert_eq!(resolved.path, vec![1, 2, 5]);
    }

    #[test]
    fn adjacent_edge_back_onto_path_is_ignored() {
        // B's first edge returns to 1, which is already on the path.
        let graph = graph(&[seg("A", &[1, 2]), seg("B", &[2, 1]), seg("B", &[3, 2])]);
        let resolved = RouteResolver::new(&graph).resolve("A-B").unwrap();
        assert_eq!(resolved.path, vec![1, 2, 3]);
    }

    #[test]
    fn fallback_search_bridges_gaps() {
        // After A-B the path ends at 3; C's edge 1-6 touches the path at 1,
        // so the search runs from 3 to 6 and finds the D connector first.
        let graph = graph(&[
            seg("A", &[1, 2]),
            seg("B", &[2, 3]),
            seg("C", &[1, 6]),
            seg("D", &[3, 4, 6]),
        ]);
        let resolved = RouteResolver::new(&graph).resolve("A-B-C").unwrap();
        assert_eq!(resolved.path, vec![1, 2, 3, 4, 6]);
        assert!(resolved.issues.is_empty());
    }

    #[test]
    fn fallback_can_walk_back_along_path() {
        // Y's usable edge hangs off vertex 1, behind the path end at 2.
        let graph = graph(&[seg("A", &[1, 2]), seg("Y", &[10, 11]), seg("Y", &[1, 12])]);
        let resolved = RouteResolver::new(&graph).resolve("A-Y").unwrap();
        assert_eq!(resolved.path, vec![1, 2, 1, 12]);
        assert!(resolved.issues.is_empty());
    }

    #[test]
    fn ident_not_touching_path_is_disconnected() {
        let graph = graph(&[seg("A", &[1, 2]), seg("B", &[2, 3]), seg("X", &[8, 9])]);
        let resolved = RouteResolver::new(&graph).resolve("A-X-B").unwrap();
        assert_eq!(resolved.normalized, vec!["A", "X", "B"]);
        assert_eq!(resolved.path, vec![1, 2, 3]);
        assert_eq!(
            resolved.issues,
            vec![RouteIssue::DisconnectedSegment("X".to_string())]
        );
    }

    #[test]
    fn single_vertex_route_is_insufficient() {
        let graph = graph(&[seg("A", &[1, 2])]);
        let err = RouteResolver::new(&graph).resolve("RW27-Q").unwrap_err();
        assert!(matches!(err, TaxiError::InsufficientPath(_)));
        assert_eq!(err.to_string(), "route must have at least two vertices");
    }
}
