//! Dependency graph for step execution ordering.
//!
//! Nodes are registration positions in a [`StepRegistry`], so every
//! traversal here is deterministic.

use std::collections::BTreeSet;

use crate::error::{GroundworkError, Result};
use crate::steps::StepRegistry;

/// Represents the dependency relationships between registered steps.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Step ids by registration position.
    ids: Vec<String>,
    /// Direct dependencies of each step.
    dependencies: Vec<Vec<usize>>,
    /// Steps that depend on each step.
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph for a registry.
    ///
    /// Returns an error if any dependency references a non-existent step.
    pub fn from_registry(registry: &StepRegistry) -> Result<Self> {
        registry.validate()?;

        let ids: Vec<String> = registry.all().map(|s| s.id().to_string()).collect();
        let mut dependencies = vec![Vec::new(); ids.len()];
        let mut dependents = vec![Vec::new(); ids.len()];

        for (node, step) in registry.all().enumerate() {
            for dep in step.depends_on() {
                let dep_node =
                    registry
                        .position(dep)
                        .ok_or_else(|| GroundworkError::UnknownDependency {
                            step: step.id().to_string(),
                            dependency: dep.clone(),
                        })?;
                // Tolerate the same dependency listed twice
                if !dependencies[node].contains(&dep_node) {
                    dependencies[node].push(dep_node);
                    dependents[dep_node].push(node);
                }
            }
        }

        Ok(Self {
            ids,
            dependencies,
            dependents,
        })
    }

    /// Get the number of steps in the graph.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns registration positions in topological order.
    ///
    /// Among steps whose dependencies are all satisfied, the one registered
    /// first goes first, so identical input always yields the same order.
    pub fn topological_order(&self) -> Result<Vec<usize>> {
        let mut in_degree: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(node, _)| node)
            .collect();

        let mut order = Vec::with_capacity(self.len());

        while let Some(node) = ready.pop_first() {
            order.push(node);

            for &dependent in &self.dependents[node] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        // If we haven't processed all nodes, there's a cycle
        if order.len() != self.len() {
            let identifiers = self.find_cycle().unwrap_or_else(|| {
                in_degree
                    .iter()
                    .enumerate()
                    .filter(|(_, &d)| d > 0)
                    .map(|(node, _)| self.ids[node].clone())
                    .collect()
            });
            return Err(GroundworkError::DependencyCycle { identifiers });
        }

        Ok(order)
    }

    /// Find a cycle in the graph, returning the path if one exists.
    ///
    /// The path starts and ends with the same id, e.g. `["a", "b", "a"]`.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs(
            node: usize,
            graph: &DependencyGraph,
            state: &mut [State],
            path: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            state[node] = State::Visiting;
            path.push(node);

            for &dep in &graph.dependencies[node] {
                match state[dep] {
                    State::Visiting => {
                        let cycle_start = path.iter().position(|&n| n == dep).unwrap_or(0);
                        let mut cycle: Vec<String> = path[cycle_start..]
                            .iter()
                            .map(|&n| graph.ids[n].clone())
                            .collect();
                        cycle.push(graph.ids[dep].clone());
                        return Some(cycle);
                    }
                    State::Unvisited => {
                        if let Some(cycle) = dfs(dep, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    State::Visited => {}
                }
            }

            path.pop();
            state[node] = State::Visited;
            None
        }

        let mut state = vec![State::Unvisited; self.len()];
        let mut path = Vec::new();

        for node in 0..self.len() {
            if state[node] == State::Unvisited {
                if let Some(cycle) = dfs(node, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::Step;

    fn registry(steps: &[(&str, &[&str])]) -> StepRegistry {
        let mut registry = StepRegistry::new();
        for (id, deps) in steps {
            registry
                .register(
                    Step::builder(*id)
                        .depends_on_all(deps.iter().copied())
                        .check_with("never", |_| Ok(false))
                        .apply_with("noop", |_| Ok(()))
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }
        registry
    }

    fn ordered_ids(graph: &DependencyGraph) -> Vec<String> {
        graph
            .topological_order()
            .unwrap()
            .into_iter()
            .map(|n| graph.ids[n].clone())
            .collect()
    }

    #[test]
    fn empty_graph() {
        let graph = DependencyGraph::from_registry(&StepRegistry::new()).unwrap();
        assert!(graph.is_empty());
        assert!(graph.topological_order().unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_dependency() {
        let result = DependencyGraph::from_registry(&registry(&[("a", &["nonexistent"])]));
        assert!(matches!(
            result,
            Err(GroundworkError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn topo_sort_linear_chain() {
        let graph = DependencyGraph::from_registry(&registry(&[
            ("third", &["second"]),
            ("second", &["first"]),
            ("first", &[]),
        ]))
        .unwrap();

        assert_eq!(ordered_ids(&graph), vec!["first", "second", "third"]);
    }

    #[test]
    fn topo_sort_diamond_dependency() {
        let graph = DependencyGraph::from_registry(&registry(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["a"]),
            ("d", &["b", "c"]),
        ]))
        .unwrap();

        assert_eq!(ordered_ids(&graph), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn ties_break_by_registration_order() {
        let graph = DependencyGraph::from_registry(&registry(&[
            ("zeta", &[]),
            ("alpha", &[]),
            ("mid", &["zeta"]),
            ("beta", &[]),
        ]))
        .unwrap();

        // mid becomes ready after zeta but was registered before beta
        assert_eq!(ordered_ids(&graph), vec!["zeta", "alpha", "mid", "beta"]);
    }

    #[test]
    fn duplicate_dependencies_are_tolerated() {
        let graph =
            DependencyGraph::from_registry(&registry(&[("a", &[]), ("b", &["a", "a"])])).unwrap();
        assert_eq!(ordered_ids(&graph), vec!["a", "b"]);
    }

    #[test]
    fn topo_sort_detects_simple_cycle() {
        let graph =
            DependencyGraph::from_registry(&registry(&[("a", &["b"]), ("b", &["a"])])).unwrap();

        match graph.topological_order() {
            Err(GroundworkError::DependencyCycle { identifiers }) => {
                assert!(identifiers.contains(&"a".to_string()));
                assert!(identifiers.contains(&"b".to_string()));
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn cycle_path_starts_and_ends_with_same_step() {
        let graph = DependencyGraph::from_registry(&registry(&[
            ("a", &["c"]),
            ("b", &["a"]),
            ("c", &["b"]),
        ]))
        .unwrap();

        let path = graph.find_cycle().unwrap();
        assert_eq!(path.first(), path.last());
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn self_cycle_detected() {
        let graph = DependencyGraph::from_registry(&registry(&[("a", &["a"])])).unwrap();
        assert_eq!(graph.find_cycle(), Some(vec!["a".to_string(), "a".to_string()]));
    }

    #[test]
    fn no_cycle_returns_none() {
        let graph =
            DependencyGraph::from_registry(&registry(&[("a", &[]), ("b", &["a"])])).unwrap();
        assert!(graph.find_cycle().is_none());
    }
}
