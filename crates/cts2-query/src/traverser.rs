//! Association traversal.
//!
//! This module provides the [`AssociationTraverser`] struct for walking
//! subject/predicate/target edges asserted by a set of code system versions,
//! one hop at a time or to transitive closure using BFS (Breadth-First Search).

use std::collections::{HashSet, VecDeque};

use cts2_model::{Association, AssociationDirection, EntityRef, ScopedEntityName};

use crate::config::{Orientation, QueryConfig};
use crate::error::CatalogResult;
use crate::traits::CatalogStore;

/// Walks association edges asserted by a fixed set of versions.
///
/// Only ACTIVE associations are followed unless
/// [`with_inactive`](Self::with_inactive) is set. Neighbours are returned in
/// edge insertion order (version by version), each entity at most once.
///
/// # Example
///
/// ```ignore
/// use cts2_query::AssociationTraverser;
///
/// let traverser = AssociationTraverser::new(&store, ["NCI_Thesaurus-19.05d"]);
///
/// // Everything that reaches C54453 through Concept_In_Subset edges
/// let direction = AssociationDirection::TargetToSource;
/// let members = traverser.closure(&subset, direction, Some(&in_subset))?;
/// ```
pub struct AssociationTraverser<'a> {
    store: &'a dyn CatalogStore,
    versions: Vec<String>,
    include_inactive: bool,
}

impl<'a> AssociationTraverser<'a> {
    /// Creates a traverser over the edges asserted by `versions`.
    pub fn new<I, S>(store: &'a dyn CatalogStore, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store,
            versions: versions.into_iter().map(Into::into).collect(),
            include_inactive: false,
        }
    }

    /// Follows INACTIVE associations too.
    pub fn with_inactive(mut self, include_inactive: bool) -> Self {
        self.include_inactive = include_inactive;
        self
    }

    /// Returns the edges anchored at `anchor`.
    ///
    /// `SourceToTarget` returns edges whose subject is `anchor`,
    /// `TargetToSource` those whose target is `anchor`.
    pub fn edges(
        &self,
        anchor: &ScopedEntityName,
        direction: AssociationDirection,
    ) -> CatalogResult<Vec<&'a Association>> {
        let mut edges = Vec::new();
        for version in &self.versions {
            let found = match direction {
                AssociationDirection::SourceToTarget => {
                    self.store.associations_with_subject(version, anchor)?
                }
                AssociationDirection::TargetToSource => {
                    self.store.associations_with_target(version, anchor)?
                }
            };
            edges.extend(
                found
                    .into_iter()
                    .filter(|a| self.include_inactive || a.entry_state.is_active()),
            );
        }
        Ok(edges)
    }

    /// Gets the direct neighbours of `anchor` along `direction`.
    ///
    /// Restricted to one predicate when `predicate` is given.
    pub fn neighbours(
        &self,
        anchor: &ScopedEntityName,
        direction: AssociationDirection,
        predicate: Option<&EntityRef>,
    ) -> CatalogResult<Vec<EntityRef>> {
        let mut seen = HashSet::new();
        let neighbours = self
            .edges(anchor, direction)?
            .into_iter()
            .filter(|a| predicate.map_or(true, |p| same_predicate(&a.predicate, p)))
            .map(|a| far_end(a, direction))
            .filter(|e| seen.insert(e.scoped_name()))
            .cloned()
            .collect();
        Ok(neighbours)
    }

    /// Gets every entity reachable from `anchor` along `direction` using BFS.
    ///
    /// Does NOT include the anchor itself, even when a cycle leads back to it.
    pub fn closure(
        &self,
        anchor: &ScopedEntityName,
        direction: AssociationDirection,
        predicate: Option<&EntityRef>,
    ) -> CatalogResult<Vec<EntityRef>> {
        let mut visited = HashSet::with_capacity(64);
        let mut queue = VecDeque::with_capacity(32);
        let mut reached = Vec::new();
        visited.insert(anchor.clone());

        for next in self.neighbours(anchor, direction, predicate)? {
            if visited.insert(next.scoped_name()) {
                queue.push_back(next.scoped_name());
                reached.push(next);
            }
        }

        while let Some(current) = queue.pop_front() {
            for next in self.neighbours(&current, direction, predicate)? {
                if visited.insert(next.scoped_name()) {
                    queue.push_back(next.scoped_name());
                    reached.push(next);
                }
            }
        }

        log::trace!(
            "closure of {} ({}) reached {} entities",
            anchor,
            direction,
            reached.len()
        );
        Ok(reached)
    }

    /// Gets the direct children of `anchor` under the configured hierarchy predicates.
    ///
    /// A child is the subject of a child-to-parent edge into `anchor`
    /// (`child subClassOf anchor`) or the target of a parent-to-child edge
    /// out of it (`anchor hasSubtype child`).
    pub fn children(
        &self,
        anchor: &ScopedEntityName,
        config: &QueryConfig,
    ) -> CatalogResult<Vec<EntityRef>> {
        let orientation = |a: &Association| config.hierarchy_orientation(&a.predicate.name);

        let upward = self
            .edges(anchor, AssociationDirection::TargetToSource)?
            .into_iter()
            .filter(|a| orientation(*a) == Some(Orientation::ChildToParent))
            .map(|a| &a.subject);
        let downward = self
            .edges(anchor, AssociationDirection::SourceToTarget)?
            .into_iter()
            .filter(|a| orientation(*a) == Some(Orientation::ParentToChild))
            .map(|a| &a.target);

        let mut seen = HashSet::new();
        Ok(upward
            .chain(downward)
            .filter(|e| seen.insert(e.scoped_name()))
            .cloned()
            .collect())
    }
}

fn far_end(association: &Association, direction: AssociationDirection) -> &EntityRef {
    match direction {
        AssociationDirection::SourceToTarget => &association.target,
        AssociationDirection::TargetToSource => &association.subject,
    }
}

fn same_predicate(actual: &EntityRef, wanted: &EntityRef) -> bool {
    (actual.namespace == wanted.namespace && actual.name == wanted.name)
        || (!wanted.uri.is_empty() && actual.uri == wanted.uri)
}
