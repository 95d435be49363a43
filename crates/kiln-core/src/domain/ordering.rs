//! Dependency ordering of blueprint modules.
//!
//! Iterative depth-first traversal with three-colour marking. Roots are
//! taken in input order and each module's dependencies in declared order,
//! so modules with no relation to each other keep their input order and the
//! result is reproducible for identical input.

use std::collections::HashMap;

use crate::domain::{entities::blueprint::BlueprintModule, error::DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Visited,
}

/// Topological sorter for [`BlueprintModule`]s.
pub struct DependencyOrderer;

impl DependencyOrderer {
    /// Order `modules` so that every module follows all of its in-set
    /// dependencies.
    ///
    /// Dependencies naming modules outside the set are ignored. If two
    /// modules share a name the first one wins; `Blueprint::validate`
    /// rejects that case before generation.
    ///
    /// # Errors
    ///
    /// [`DomainError::CircularDependency`] if the graph has a cycle. No
    /// partial order is returned.
    pub fn order(modules: &[BlueprintModule]) -> Result<Vec<&BlueprintModule>, DomainError> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(modules.len());
        for (i, module) in modules.iter().enumerate() {
            index.entry(module.name.as_str()).or_insert(i);
        }

        let mut marks = vec![Mark::Unvisited; modules.len()];
        let mut order = Vec::with_capacity(modules.len());
        // (module index, next dependency to inspect)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..modules.len() {
            if marks[root] != Mark::Unvisited || index[modules[root].name.as_str()] != root {
                continue;
            }

            marks[root] = Mark::Visiting;
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let (current, cursor) = *frame;
                let deps = &modules[current].depends_on;

                if cursor == deps.len() {
                    marks[current] = Mark::Visited;
                    order.push(&modules[current]);
                    stack.pop();
                    continue;
                }
                frame.1 += 1;

                let Some(&dep) = index.get(deps[cursor].as_str()) else {
                    continue;
                };

                match marks[dep] {
                    Mark::Visited => {}
                    Mark::Unvisited => {
                        marks[dep] = Mark::Visiting;
                        stack.push((dep, 0));
                    }
                    Mark::Visiting => {
                        let start = stack.iter().position(|&(i, _)| i == dep).unwrap_or(0);
                        let mut cycle: Vec<String> = stack[start..]
                            .iter()
                            .map(|&(i, _)| modules[i].name.clone())
                            .collect();
                        cycle.push(modules[dep].name.clone());

                        return Err(DomainError::CircularDependency {
                            module: modules[dep].name.clone(),
                            cycle,
                        });
                    }
                }
            }
        }

        Ok(order)
    }
}
