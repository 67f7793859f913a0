//! Spatial partitioning for efficient neighbor queries.
//!
//! Provides O(1) cell lookup and O(k) neighbor queries where k is the number
//! of objects in nearby cells, rather than O(n) for brute force.
//!
//! The habitat keeps the grid in sync incrementally: every spawn, move and
//! destroy updates the matching entry, so queries made halfway through a
//! sweep already see the objects that moved earlier in that sweep.

use crate::components::Kind;
use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Grid-based spatial partitioning structure.
///
/// Divides the habitat into square cells and tracks which objects are in
/// each cell.
#[derive(Debug)]
pub struct SpatialGrid {
    /// Cell size in world units.
    pub cell_size: f64,
    /// Map from cell coordinates to list of objects in that cell.
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
    /// Reverse lookup: entity to cell.
    entity_cells: HashMap<Entity, (i32, i32)>,
}

/// Entry in a spatial cell.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub x: f64,
    pub y: f64,
    pub kind: Kind,
}

impl SpatialEntry {
    fn distance_sq(&self, x: f64, y: f64) -> f64 {
        (self.x - x).powi(2) + (self.y - y).powi(2)
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl SpatialGrid {
    /// Create a new spatial grid with the given cell size.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            entity_cells: HashMap::new(),
        }
    }

    /// Convert world coordinates to cell coordinates.
    #[inline]
    pub fn world_to_cell(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Insert an object at a position, or move it there if already present.
    pub fn insert(&mut self, entity: Entity, x: f64, y: f64, kind: Kind) {
        let cell = self.world_to_cell(x, y);

        if let Some(&old_cell) = self.entity_cells.get(&entity) {
            if let Some(entries) = self.cells.get_mut(&old_cell) {
                entries.retain(|e| e.entity != entity);
                if entries.is_empty() {
                    self.cells.remove(&old_cell);
                }
            }
        }

        let entry = SpatialEntry { entity, x, y, kind };
        self.cells.entry(cell).or_default().push(entry);
        self.entity_cells.insert(entity, cell);
    }

    /// Remove an object from the grid.
    pub fn remove(&mut self, entity: Entity) {
        if let Some(cell) = self.entity_cells.remove(&entity) {
            if let Some(entries) = self.cells.get_mut(&cell) {
                entries.retain(|e| e.entity != entity);
                if entries.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_cells.contains_key(&entity)
    }

    /// Query all objects within a radius of a point.
    /// Returns entries sorted by distance (closest first), ties by entity.
    ///
    /// Walks the surrounding cells while that block is smaller than the set
    /// of occupied cells, and scans every occupied cell otherwise, so huge or
    /// infinite radii stay bounded by the object count.
    pub fn query_radius(&self, x: f64, y: f64, radius: f64) -> Vec<SpatialEntry> {
        if !(radius >= 0.0) {
            return Vec::new();
        }
        let radius_sq = radius * radius;
        let span = (radius / self.cell_size).ceil() + 1.0;
        let block = (2.0 * span + 1.0).powi(2);

        let mut results: Vec<SpatialEntry> = if block <= self.cells.len() as f64 {
            let cells_to_check = span as i32;
            let center_cell = self.world_to_cell(x, y);
            let mut found = Vec::new();
            for dx in -cells_to_check..=cells_to_check {
                for dy in -cells_to_check..=cells_to_check {
                    let cell = (
                        center_cell.0.saturating_add(dx),
                        center_cell.1.saturating_add(dy),
                    );
                    if let Some(entries) = self.cells.get(&cell) {
                        found.extend(
                            entries
                                .iter()
                                .filter(|e| e.distance_sq(x, y) <= radius_sq)
                                .copied(),
                        );
                    }
                }
            }
            found
        } else {
            self.cells
                .values()
                .flatten()
                .filter(|e| e.distance_sq(x, y) <= radius_sq)
                .copied()
                .collect()
        };

        results.sort_by(|a, b| {
            a.distance_sq(x, y)
                .partial_cmp(&b.distance_sq(x, y))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.entity.cmp(&b.entity))
        });

        results
    }

    /// Query objects within radius whose kind satisfies `predicate`.
    pub fn query_kind(
        &self,
        x: f64,
        y: f64,
        radius: f64,
        predicate: impl Fn(Kind) -> bool,
    ) -> Vec<SpatialEntry> {
        let mut results = self.query_radius(x, y, radius);
        results.retain(|e| predicate(e.kind));
        results
    }

    /// Nearest object matching `predicate`, ignoring `exclude`.
    pub fn nearest(
        &self,
        x: f64,
        y: f64,
        max_radius: f64,
        exclude: Entity,
        predicate: impl Fn(Kind) -> bool,
    ) -> Option<SpatialEntry> {
        self.query_kind(x, y, max_radius, predicate)
            .into_iter()
            .find(|e| e.entity != exclude)
    }

    /// Get count of objects in a cell.
    pub fn cell_count(&self, cell: (i32, i32)) -> usize {
        self.cells.get(&cell).map(|v| v.len()).unwrap_or(0)
    }

    /// Get total object count.
    pub fn total_count(&self) -> usize {
        self.entity_cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::MeteorStage;

    #[test]
    fn test_spatial_grid_insert_query() {
        let mut grid = SpatialGrid::new(10.0);

        let e1 = Entity::from_raw(1);
        let e2 = Entity::from_raw(2);
        let e3 = Entity::from_raw(3);

        grid.insert(e1, 5.0, 5.0, Kind::Animal);
        grid.insert(e2, 15.0, 5.0, Kind::Feed);
        grid.insert(e3, 100.0, 100.0, Kind::Feed);

        let nearby = grid.query_radius(5.0, 5.0, 15.0);
        assert_eq!(nearby.len(), 2);
        assert_eq!(nearby[0].entity, e1);

        let nearby = grid.query_radius(5.0, 5.0, 5.0);
        assert_eq!(nearby.len(), 1);

        let nearby = grid.query_radius(100.0, 100.0, 10.0);
        assert_eq!(nearby.len(), 1);
    }

    #[test]
    fn test_kind_queries() {
        let mut grid = SpatialGrid::new(10.0);

        grid.insert(Entity::from_raw(1), 0.0, 0.0, Kind::Hunter);
        grid.insert(Entity::from_raw(2), 5.0, 0.0, Kind::Prey);
        grid.insert(Entity::from_raw(3), 10.0, 0.0, Kind::Meteor(MeteorStage::Primary));

        let ships = grid.query_kind(0.0, 0.0, 20.0, |k| k.is_ship());
        assert_eq!(ships.len(), 2);

        let meteors = grid.query_kind(0.0, 0.0, 20.0, |k| k.is_meteor());
        assert_eq!(meteors.len(), 1);
        assert_eq!(meteors[0].entity, Entity::from_raw(3));
    }

    #[test]
    fn test_nearest_skips_self() {
        let mut grid = SpatialGrid::new(10.0);

        let me = Entity::from_raw(1);
        let far = Entity::from_raw(2);
        let near = Entity::from_raw(3);

        grid.insert(me, 0.0, 0.0, Kind::Meteor(MeteorStage::Primary));
        grid.insert(far, 30.0, 0.0, Kind::Meteor(MeteorStage::Primary));
        grid.insert(near, 20.0, 0.0, Kind::Meteor(MeteorStage::Fragment));

        let nearest = grid.nearest(0.0, 0.0, 50.0, me, |k| k.is_meteor());
        assert_eq!(nearest.map(|e| e.entity), Some(near));

        assert!(grid.nearest(0.0, 0.0, 10.0, me, |k| k.is_meteor()).is_none());
    }

    #[test]
    fn test_moving_entity_changes_cell() {
        let mut grid = SpatialGrid::new(10.0);
        let e = Entity::from_raw(7);

        grid.insert(e, 1.0, 1.0, Kind::Blob);
        assert_eq!(grid.cell_count((0, 0)), 1);

        grid.insert(e, 25.0, -3.0, Kind::Blob);
        assert_eq!(grid.cell_count((0, 0)), 0);
        assert_eq!(grid.cell_count((2, -1)), 1);
        assert_eq!(grid.total_count(), 1);

        grid.remove(e);
        assert_eq!(grid.total_count(), 0);
        assert!(!grid.contains(e));
    }

    #[test]
    fn test_unbounded_radius_scans_everything() {
        let mut grid = SpatialGrid::new(10.0);
        let me = Entity::from_raw(1);
        let far = Entity::from_raw(2);

        grid.insert(me, 0.0, 0.0, Kind::Animal);
        grid.insert(far, 1.0e9, -1.0e9, Kind::Feed);

        let all = grid.query_radius(0.0, 0.0, f64::INFINITY);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].entity, me);

        let nearest = grid.nearest(0.0, 0.0, f64::INFINITY, me, |k| k == Kind::Feed);
        assert_eq!(nearest.map(|e| e.entity), Some(far));
        assert!(grid.query_radius(0.0, 0.0, f64::NAN).is_empty());
    }

    #[test]
    fn test_tiny_cells_fall_back_to_scan() {
        let mut grid = SpatialGrid::new(0.001);
        grid.insert(Entity::from_raw(1), 0.0, 0.0, Kind::Animal);
        grid.insert(Entity::from_raw(2), 300.0, 0.0, Kind::Feed);
        grid.insert(Entity::from_raw(3), 500.0, 0.0, Kind::Feed);

        let found = grid.query_radius(0.0, 0.0, 400.0);
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].entity, Entity::from_raw(2));
    }

    #[test]
    fn test_equal_distances_order_by_entity() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(Entity::from_raw(5), 10.0, 0.0, Kind::Feed);
        grid.insert(Entity::from_raw(4), -10.0, 0.0, Kind::Feed);
        grid.insert(Entity::from_raw(6), 0.0, 10.0, Kind::Feed);

        let found: Vec<Entity> = grid
            .query_radius(0.0, 0.0, 50.0)
            .into_iter()
            .map(|e| e.entity)
            .collect();
        assert_eq!(
            found,
            vec![Entity::from_raw(4), Entity::from_raw(5), Entity::from_raw(6)]
        );
    }
}
