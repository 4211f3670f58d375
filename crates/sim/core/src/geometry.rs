//! Pure intersection and collision-response helpers on the map plane.
//!
//! Rays are given as an origin and a normalized direction; every function
//! returns the intersection point nearest to the origin, if any.

use glam::{Vec2, Vec3};

/// Penetrations shallower than this are treated as resolved.
const COLLISION_EPSILON: f32 = 1.0e-5;
const PARALLEL_EPSILON: f32 = 1.0e-8;

/// Pushes a circle out of a wall segment.
///
/// Returns the corrected center, or `None` when the circle does not
/// penetrate the segment.
pub fn collide_circle_with_segment(v0: Vec2, v1: Vec2, center: Vec2, radius: f32) -> Option<Vec2> {
    let edge = v1 - v0;
    let edge_len_sq = edge.length_squared();
    let t = if edge_len_sq > 0.0 {
        ((center - v0).dot(edge) / edge_len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let nearest = v0 + edge * t;
    let to_center = center - nearest;
    let distance = to_center.length();
    if distance >= radius - COLLISION_EPSILON {
        return None;
    }

    let push_dir = if distance > 0.0 {
        to_center / distance
    } else if edge_len_sq > 0.0 {
        segment_normal(v0, v1)
    } else {
        Vec2::X
    };
    Some(nearest + push_dir * radius)
}

/// Unit normal of a wall segment, rotated counter-clockwise from its direction.
pub fn segment_normal(v0: Vec2, v1: Vec2) -> Vec2 {
    Vec2::new(v0.y - v1.y, v1.x - v0.x).normalize_or_zero()
}

/// Same as [`segment_normal`], lifted into 3D with zero height.
pub fn wall_normal(v0: Vec2, v1: Vec2) -> Vec3 {
    segment_normal(v0, v1).extend(0.0)
}

/// Intersects a ray with a vertical wall spanning `z_bottom..=z_top`.
pub fn ray_intersect_wall(
    v0: Vec2,
    v1: Vec2,
    z_bottom: f32,
    z_top: f32,
    origin: Vec3,
    dir: Vec3,
) -> Option<Vec3> {
    let edge = v1 - v0;
    let ray = dir.truncate();
    let denom = ray.perp_dot(edge);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let to_wall = v0 - origin.truncate();
    let t = to_wall.perp_dot(edge) / denom;
    let s = to_wall.perp_dot(ray) / denom;
    if t < 0.0 || !(0.0..=1.0).contains(&s) {
        return None;
    }

    let point = origin + dir * t;
    (z_bottom..=z_top).contains(&point.z).then_some(point)
}

/// Intersects a ray with a vertical cylinder, including its caps.
///
/// Origins inside the cylinder never hit it.
pub fn ray_intersect_cylinder(
    center: Vec2,
    radius: f32,
    z_min: f32,
    z_max: f32,
    origin: Vec3,
    dir: Vec3,
) -> Option<Vec3> {
    let mut nearest: Option<(f32, Vec3)> = None;
    let mut consider = |t: f32, point: Vec3| {
        if nearest.is_none_or(|(best, _)| t < best) {
            nearest = Some((t, point));
        }
    };

    let ray = dir.truncate();
    let rel = origin.truncate() - center;
    let a = ray.length_squared();
    if a > PARALLEL_EPSILON {
        let b = rel.dot(ray);
        let c = rel.length_squared() - radius * radius;
        let discriminant = b * b - a * c;
        if discriminant >= 0.0 {
            let t = (-b - discriminant.sqrt()) / a;
            if t >= 0.0 {
                let point = origin + dir * t;
                if (z_min..=z_max).contains(&point.z) {
                    consider(t, point);
                }
            }
        }
    }

    for cap_z in [z_min, z_max] {
        let Some(point) = ray_intersect_xy_plane(cap_z, origin, dir) else {
            continue;
        };
        if (point.truncate() - center).length_squared() <= radius * radius {
            consider(point.distance(origin), point);
        }
    }

    nearest.map(|(_, point)| point)
}

/// Intersects a ray with the horizontal plane at height `z`.
pub fn ray_intersect_xy_plane(z: f32, origin: Vec3, dir: Vec3) -> Option<Vec3> {
    if dir.z.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = (z - origin.z) / dir.z;
    (t >= 0.0).then(|| origin + dir * t)
}

/// Whether a circle overlaps the unit cell with lower corner `(x, y)`.
pub fn circle_intersects_cell(center: Vec2, radius: f32, x: usize, y: usize) -> bool {
    let min = Vec2::new(x as f32, y as f32);
    let nearest = center.clamp(min, min + Vec2::ONE);
    nearest.distance_squared(center) < radius * radius
}

/// Yaw and pitch of a direction vector, in radians.
pub fn direction_to_angles(dir: Vec3) -> [f32; 2] {
    let yaw = dir.y.atan2(dir.x);
    let pitch = dir.z.atan2(dir.truncate().length());
    [yaw, pitch]
}
