//! Grid-bucketed index over level-baked walls and models.
//!
//! Each element is registered in every cell its bounding box touches, so a
//! query visits the union of the buckets it overlaps and deduplicates.
//! Dynamic walls and monsters move every tick and are not indexed.

use std::ops::ControlFlow;

use glam::{Vec2, Vec3};

use crate::env::{GameResources, IndexElement, LevelData, MAP_SIZE, cell_index};

/// Ray cast travel is capped to the grid diagonal.
const MAX_RAY_TRAVEL: f32 = MAP_SIZE as f32 * 2.0;
const BOX_MARGIN: f32 = 1.0 / 64.0;

#[derive(Clone, Debug)]
pub struct CollisionIndex {
    cells: Vec<Vec<IndexElement>>,
}

impl CollisionIndex {
    pub fn new(level: &LevelData, resources: &GameResources) -> Self {
        let mut index = Self {
            cells: vec![Vec::new(); MAP_SIZE * MAP_SIZE],
        };

        for (i, wall) in level.static_walls.iter().enumerate() {
            let min = wall.vert_pos[0].min(wall.vert_pos[1]);
            let max = wall.vert_pos[0].max(wall.vert_pos[1]);
            index.insert_box(min, max, IndexElement::StaticWall(i as u16));
        }

        for (i, model) in level.static_models.iter().enumerate() {
            let radius = resources
                .model(model.model_id)
                .map_or(0.0, |description| description.radius.max(0.0));
            let extent = Vec2::splat(radius);
            index.insert_box(
                model.pos - extent,
                model.pos + extent,
                IndexElement::StaticModel(i as u16),
            );
        }

        index
    }

    fn insert_box(&mut self, min: Vec2, max: Vec2, element: IndexElement) {
        let Some((x_range, y_range)) = cell_range(min - BOX_MARGIN, max + BOX_MARGIN) else {
            return;
        };
        for y in y_range {
            for x in x_range.clone() {
                self.cells[cell_index(x, y)].push(element);
            }
        }
    }

    /// Visits each element whose bucket overlaps the square around the disc.
    pub fn query_radius(&self, point: Vec2, radius: f32, mut visitor: impl FnMut(IndexElement)) {
        let Some((x_range, y_range)) = cell_range(point - radius, point + radius) else {
            return;
        };

        let mut found = Vec::new();
        for y in y_range {
            for x in x_range.clone() {
                found.extend_from_slice(&self.cells[cell_index(x, y)]);
            }
        }
        found.sort_unstable();
        found.dedup();

        for element in found {
            visitor(element);
        }
    }

    /// Visits elements in the cells crossed by a ray, nearest cells first.
    ///
    /// `dir` must be normalized. Traversal ends after `max_distance` along
    /// the ray, at the grid border, or when the visitor breaks.
    pub fn ray_cast(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_distance: f32,
        mut visitor: impl FnMut(IndexElement) -> ControlFlow<()>,
    ) {
        let mut seen: Vec<IndexElement> = Vec::new();
        let mut visit_cell = |x: usize, y: usize| -> ControlFlow<()> {
            for &element in &self.cells[cell_index(x, y)] {
                if seen.contains(&element) {
                    continue;
                }
                seen.push(element);
                if visitor(element).is_break() {
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        };

        let start = origin.truncate();
        let planar = dir.truncate();
        let planar_len = planar.length();
        if planar_len < 1.0e-6 {
            if let Some((x, y)) = cell_of(start) {
                let _ = visit_cell(x, y);
            }
            return;
        }

        let step_dir = planar / planar_len;
        let travel = (max_distance * planar_len).min(MAX_RAY_TRAVEL);
        let Some((t_enter, t_exit)) = clip_to_grid(start, step_dir, travel) else {
            return;
        };

        let entry = start + step_dir * t_enter;
        let mut cell = [
            (entry.x.floor() as i64).clamp(0, MAP_SIZE as i64 - 1),
            (entry.y.floor() as i64).clamp(0, MAP_SIZE as i64 - 1),
        ];
        let mut step = [0_i64; 2];
        let mut t_next = [f32::INFINITY; 2];
        let mut t_delta = [f32::INFINITY; 2];
        for axis in 0..2 {
            let d = step_dir[axis];
            if d > 0.0 {
                step[axis] = 1;
                t_delta[axis] = 1.0 / d;
                t_next[axis] = t_enter + ((cell[axis] + 1) as f32 - entry[axis]) / d;
            } else if d < 0.0 {
                step[axis] = -1;
                t_delta[axis] = -1.0 / d;
                t_next[axis] = t_enter + (cell[axis] as f32 - entry[axis]) / d;
            }
        }

        loop {
            if visit_cell(cell[0] as usize, cell[1] as usize).is_break() {
                return;
            }
            let axis = if t_next[0] < t_next[1] { 0 } else { 1 };
            if t_next[axis] > t_exit {
                return;
            }
            cell[axis] += step[axis];
            if cell[axis] < 0 || cell[axis] >= MAP_SIZE as i64 {
                return;
            }
            t_next[axis] += t_delta[axis];
        }
    }
}

fn cell_of(point: Vec2) -> Option<(usize, usize)> {
    if point.x < 0.0 || point.y < 0.0 {
        return None;
    }
    let (x, y) = (point.x as usize, point.y as usize);
    (x < MAP_SIZE && y < MAP_SIZE).then_some((x, y))
}

/// Cell ranges covered by an axis-aligned box, clamped to the grid.
fn cell_range(
    min: Vec2,
    max: Vec2,
) -> Option<(std::ops::RangeInclusive<usize>, std::ops::RangeInclusive<usize>)> {
    let size = MAP_SIZE as f32;
    if max.x < 0.0 || max.y < 0.0 || min.x >= size || min.y >= size {
        return None;
    }
    let lo = min.max(Vec2::ZERO);
    let hi = max.min(Vec2::splat(size - 1.0));
    Some((
        lo.x as usize..=hi.x as usize,
        lo.y as usize..=hi.y as usize,
    ))
}

/// Parametric interval of a planar segment inside the grid square.
fn clip_to_grid(start: Vec2, dir: Vec2, length: f32) -> Option<(f32, f32)> {
    let size = MAP_SIZE as f32;
    let (mut t0, mut t1) = (0.0_f32, length);
    for axis in 0..2 {
        let (p, d) = (start[axis], dir[axis]);
        if d.abs() < 1.0e-9 {
            if p < 0.0 || p >= size {
                return None;
            }
            continue;
        }
        let (a, b) = ((0.0 - p) / d, (size - p) / d);
        t0 = t0.max(a.min(b));
        t1 = t1.min(a.max(b));
    }
    (t0 <= t1).then_some((t0, t1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{LevelModel, LevelWall, ModelDescription};

    fn level_with_walls(walls: &[(Vec2, Vec2)]) -> LevelData {
        let mut level = LevelData::empty();
        for &(v0, v1) in walls {
            level.static_walls.push(LevelWall::new(v0, v1, 0));
        }
        level
    }

    #[test]
    fn radius_query_visits_each_element_once() {
        let level = level_with_walls(&[(Vec2::new(2.0, 2.5), Vec2::new(6.0, 2.5))]);
        let index = CollisionIndex::new(&level, &GameResources::default());

        let mut visited = Vec::new();
        index.query_radius(Vec2::new(4.0, 2.5), 2.0, |element| visited.push(element));
        assert_eq!(visited, vec![IndexElement::StaticWall(0)]);

        let mut far = Vec::new();
        index.query_radius(Vec2::new(30.0, 30.0), 1.0, |element| far.push(element));
        assert!(far.is_empty());
    }

    #[test]
    fn ray_cast_visits_nearer_cells_first_and_stops_on_break() {
        let level = level_with_walls(&[
            (Vec2::new(10.5, 4.0), Vec2::new(10.5, 6.0)),
            (Vec2::new(5.5, 4.0), Vec2::new(5.5, 6.0)),
        ]);
        let index = CollisionIndex::new(&level, &GameResources::default());

        let mut visited = Vec::new();
        index.ray_cast(Vec3::new(1.5, 5.2, 1.0), Vec3::X, 100.0, |element| {
            visited.push(element);
            ControlFlow::Break(())
        });
        assert_eq!(visited, vec![IndexElement::StaticWall(1)]);
    }

    #[test]
    fn ray_cast_respects_max_distance() {
        let level = level_with_walls(&[(Vec2::new(20.5, 4.0), Vec2::new(20.5, 6.0))]);
        let index = CollisionIndex::new(&level, &GameResources::default());

        let mut visited = Vec::new();
        index.ray_cast(Vec3::new(1.5, 5.2, 1.0), Vec3::X, 5.0, |element| {
            visited.push(element);
            ControlFlow::Continue(())
        });
        assert!(visited.is_empty());
    }

    #[test]
    fn ray_from_outside_grid_enters_it() {
        let level = level_with_walls(&[(Vec2::new(3.5, 0.0), Vec2::new(3.5, 2.0))]);
        let index = CollisionIndex::new(&level, &GameResources::default());

        let mut visited = Vec::new();
        index.ray_cast(Vec3::new(-5.0, 1.0, 1.0), Vec3::X, 100.0, |element| {
            visited.push(element);
            ControlFlow::Continue(())
        });
        assert_eq!(visited, vec![IndexElement::StaticWall(0)]);
    }

    #[test]
    fn models_are_indexed_by_descriptor_radius() {
        let mut level = LevelData::empty();
        level.static_models.push(LevelModel {
            pos: Vec2::new(8.5, 8.5),
            angle: 0.0,
            model_id: 0,
            is_dynamic: false,
        });
        level.static_models.push(LevelModel {
            pos: Vec2::new(8.5, 8.5),
            angle: 0.0,
            model_id: 9,
            is_dynamic: false,
        });
        let resources = GameResources {
            models: vec![ModelDescription {
                radius: 1.2,
                ..Default::default()
            }],
            ..Default::default()
        };
        let index = CollisionIndex::new(&level, &resources);

        let mut near_edge = Vec::new();
        index.query_radius(Vec2::new(9.6, 8.5), 0.05, |element| near_edge.push(element));
        assert_eq!(near_edge, vec![IndexElement::StaticModel(0)]);
    }
}
