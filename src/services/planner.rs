//! Chain build wave planning.
//!
//! Groups a set of packages into dependency-respecting waves: every package
//! lands in the first wave after all of its in-set dependencies. Dependencies
//! on packages outside the set are treated as already built.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{BuildEstimate, BuildGroup, ChainBuildPlanBuilder, PackageGraph, PlanError};

/// Dependency graph restricted to the packages of one chain build.
#[derive(Debug, Clone, Default)]
pub struct ChainBuildPlanner {
    /// Package -> packages it needs built first.
    edges: BTreeMap<String, BTreeSet<String>>,
    estimates: BTreeMap<String, BuildEstimate>,
}

impl ChainBuildPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Planner over every package of `graph`, using its direct relations.
    pub fn from_graph(graph: &PackageGraph) -> Self {
        let mut planner = Self::new();
        for name in graph.packages.keys() {
            planner.add_package(name, graph.dependencies_of(name, Some(1)));
        }
        planner
    }

    /// Adds `name` to the build set. Calling it again for the same package
    /// merges the dependency lists.
    pub fn add_package<I, S>(&mut self, name: &str, dependencies: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges
            .entry(name.to_string())
            .or_default()
            .extend(
                dependencies
                    .into_iter()
                    .map(Into::<String>::into)
                    .filter(|dep| dep != name),
            );
    }

    /// Attaches a duration estimate used for the group estimates.
    pub fn add_estimate(&mut self, estimate: BuildEstimate) {
        self.estimates
            .insert(estimate.package_name.clone(), estimate);
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Dependencies of `name` that are part of the build set.
    fn internal_dependencies<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a String> {
        self.edges
            .get(name)
            .into_iter()
            .flatten()
            .filter(|dep| self.edges.contains_key(dep.as_str()))
    }

    /// Packages grouped into waves, each wave sorted by name.
    pub fn waves(&self) -> Result<Vec<Vec<String>>, PlanError> {
        let mut remaining: BTreeSet<&str> = self.edges.keys().map(String::as_str).collect();
        let mut waves = Vec::new();

        while !remaining.is_empty() {
            let wave: Vec<&str> = remaining
                .iter()
                .copied()
                .filter(|name| {
                    self.internal_dependencies(name)
                        .all(|dep| !remaining.contains(dep.as_str()))
                })
                .collect();

            if wave.is_empty() {
                return Err(PlanError::DependencyCycle {
                    packages: remaining.iter().map(|s| s.to_string()).collect(),
                });
            }

            for name in &wave {
                remaining.remove(name);
            }
            waves.push(wave.into_iter().map(str::to_string).collect());
        }

        Ok(waves)
    }

    /// Longest dependency chain, from the first wave to the last.
    ///
    /// Ties are broken by package name so the result is deterministic.
    pub fn critical_path(&self) -> Result<Vec<String>, PlanError> {
        let waves = self.waves()?;
        let level: BTreeMap<&str, usize> = waves
            .iter()
            .enumerate()
            .flat_map(|(i, wave)| wave.iter().map(move |name| (name.as_str(), i)))
            .collect();

        let Some(mut current) = waves.last().and_then(|w| w.first()).map(String::as_str) else {
            return Ok(Vec::new());
        };

        let mut path = vec![current.to_string()];
        while level[current] > 0 {
            let wanted = level[current] - 1;
            // A package in wave n always has an in-set dependency in wave n-1.
            let Some(dep) = self
                .internal_dependencies(current)
                .find(|dep| level[dep.as_str()] == wanted)
            else {
                break;
            };
            current = dep.as_str();
            path.push(current.to_string());
        }
        path.reverse();
        Ok(path)
    }

    /// Plan builder with one group per wave.
    ///
    /// Group ids start at 1. A group's prerequisites are the in-set direct
    /// dependencies of its packages. Group duration is the longest package
    /// estimate in the group (packages of a wave build in parallel).
    pub fn plan(
        &self,
        plan_id: impl Into<String>,
        target_tag: impl Into<String>,
    ) -> Result<ChainBuildPlanBuilder, PlanError> {
        let waves = self.waves()?;
        let critical_path = self.critical_path()?;

        let groups = waves.into_iter().enumerate().map(|(index, wave)| {
            let dependencies: BTreeSet<String> = wave
                .iter()
                .flat_map(|name| self.internal_dependencies(name))
                .cloned()
                .collect();
            let duration = wave
                .iter()
                .filter_map(|name| self.estimates.get(name))
                .map(BuildEstimate::total_minutes)
                .max()
                .unwrap_or(0);
            let signing_required = wave
                .iter()
                .filter_map(|name| self.estimates.get(name))
                .any(|e| e.requires_signing);

            let mut group = BuildGroup::new(index as u32 + 1, wave)
                .with_dependencies(dependencies)
                .with_estimated_duration(duration);
            group.signing_required = signing_required;
            group
        });

        Ok(ChainBuildPlanBuilder::new(plan_id, target_tag)
            .groups(groups)
            .critical_path_packages(critical_path))
    }
}
