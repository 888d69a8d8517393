//! Tolerance-based comparison of segment directions.

use kurbo::Point;
use pathjuggler_geometry::{angle, compass, direction, Direction};

use crate::settings::Settings;

/// Whether either bucket is exactly east or west.
#[must_use]
pub fn is_horizontal(d1: Option<Direction>, d2: Option<Direction>) -> bool {
    d1.is_some_and(Direction::is_horizontal) || d2.is_some_and(Direction::is_horizontal)
}

/// Discrete comparison of two compass buckets: exact for horizontal pairs, two buckets of slack
/// otherwise, wrapping around north.
#[must_use]
pub fn is_similar_direction(d1: Direction, d2: Direction) -> bool {
    let tolerance = if is_horizontal(Some(d1), Some(d2)) { 0 } else { 2 };
    let (a, b) = (d1.index(), d2.index());
    (b - a).abs() <= tolerance
        || (b + 16 - a).abs() <= tolerance
        || (b - (a + 16)).abs() <= tolerance
}

/// Whether the segments `from1 -> to1` and `from2 -> to2` point the same way.
///
/// Without an explicit `tolerance` the horizontal tolerance applies when either segment runs
/// exactly east or west, the general tolerance otherwise. Two zero-length segments are similar;
/// a zero-length segment is never similar to a real one.
#[must_use]
pub fn is_similar_angle(
    from1: Point,
    to1: Point,
    from2: Point,
    to2: Point,
    tolerance: Option<f64>,
    settings: &Settings,
) -> bool {
    let d1 = direction(from1, to1);
    let d2 = direction(from2, to2);

    if tolerance.is_none() && settings.use_compass {
        return match (compass(from1, to1), compass(from2, to2)) {
            (Some(c1), Some(c2)) if is_horizontal(d1, d2) => c1 == c2,
            (Some(c1), Some(c2)) => is_similar_direction(c1, c2),
            (None, None) => true,
            _ => false,
        };
    }

    let tolerance = tolerance.unwrap_or(if is_horizontal(d1, d2) {
        settings.horizontal_tolerance
    } else {
        settings.tolerance
    });

    match (angle(from1, to1), angle(from2, to2)) {
        (Some(a1), Some(a2)) => {
            let diff = a2 - a1;
            diff.abs() <= tolerance
                || (diff + 360.0).abs() <= tolerance
                || (diff - 360.0).abs() <= tolerance
        }
        (None, None) => true,
        _ => false,
    }
}

/// Whether `current` turns consistently between `before` and `after` (both clockwise or both
/// counter-clockwise) by more than half a turn overall.
#[must_use]
pub fn is_corner(
    before: Option<Direction>,
    current: Option<Direction>,
    after: Option<Direction>,
) -> bool {
    let (Some(before), Some(current), Some(after)) = (before, current, after) else {
        return false;
    };
    let (b, c, a) = (before.index(), current.index(), after.index());
    let before_diff = (c - b).rem_euclid(16);
    let after_diff = (a - c).rem_euclid(16);

    let total = if before_diff <= 8 && after_diff <= 8 {
        (a - b).rem_euclid(16)
    } else if before_diff >= 8 && after_diff >= 8 {
        (b - a).rem_euclid(16)
    } else {
        return false;
    };
    total > 8 && total < 16
}
