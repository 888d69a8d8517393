use kurbo::Point;

/// Sixteen-way compass bucket, clockwise from north.
///
/// [`direction`] only ever yields the eight cardinal/intercardinal values; the in-between
/// buckets come from [`compass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

impl Direction {
    pub const ALL: [Direction; 16] = [
        Direction::N,
        Direction::Nne,
        Direction::Ne,
        Direction::Ene,
        Direction::E,
        Direction::Ese,
        Direction::Se,
        Direction::Sse,
        Direction::S,
        Direction::Ssw,
        Direction::Sw,
        Direction::Wsw,
        Direction::W,
        Direction::Wnw,
        Direction::Nw,
        Direction::Nnw,
    ];

    #[must_use]
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Bucket for `index`, wrapping modulo 16.
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(16) as usize]
    }

    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::E | Direction::W)
    }
}

/// Coarse direction of the segment `from -> to`.
///
/// Equal x or y picks the cardinal direction, anything else the intercardinal one. `None` for
/// zero-length segments.
#[must_use]
pub fn direction(from: Point, to: Point) -> Option<Direction> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dir = if dx == 0.0 {
        if dy > 0.0 {
            Direction::N
        } else if dy < 0.0 {
            Direction::S
        } else {
            return None;
        }
    } else if dx > 0.0 {
        if dy == 0.0 {
            Direction::E
        } else if dy > 0.0 {
            Direction::Ne
        } else {
            Direction::Se
        }
    } else if dy == 0.0 {
        Direction::W
    } else if dy > 0.0 {
        Direction::Nw
    } else {
        Direction::Sw
    };
    Some(dir)
}

/// Bearing of `from -> to` in degrees, `0` = north, increasing clockwise, in `[0, 360)`.
///
/// Zero-length segments have no bearing and yield `None`.
#[must_use]
pub fn angle(from: Point, to: Point) -> Option<f64> {
    let dir = direction(from, to)?;
    // Per quadrant: opposite/adjacent chosen so the adjacent side is never zero.
    let (base, opp, adj) = match dir.index() {
        0..=3 => (0.0, to.x - from.x, to.y - from.y),
        4..=7 => (90.0, from.y - to.y, to.x - from.x),
        8..=11 => (180.0, from.x - to.x, from.y - to.y),
        _ => (270.0, to.y - from.y, from.x - to.x),
    };
    Some(base + (opp / adj).atan().to_degrees())
}

/// Sixteen-way bucket of the bearing, each bucket spanning 22.5° centred on its heading.
#[must_use]
pub fn compass(from: Point, to: Point) -> Option<Direction> {
    let deg = angle(from, to)?;
    Some(Direction::from_index(((deg + 11.25) / 22.5).floor() as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn cardinal_directions_on_ties() {
        let o = p(0.0, 0.0);
        assert_eq!(direction(o, p(0.0, 5.0)), Some(Direction::N));
        assert_eq!(direction(o, p(5.0, 0.0)), Some(Direction::E));
        assert_eq!(direction(o, p(0.0, -5.0)), Some(Direction::S));
        assert_eq!(direction(o, p(-5.0, 0.0)), Some(Direction::W));
        assert_eq!(direction(o, p(1.0, 9.0)), Some(Direction::Ne));
        assert_eq!(direction(o, p(9.0, -1.0)), Some(Direction::Se));
        assert_eq!(direction(o, p(-1.0, -1.0)), Some(Direction::Sw));
        assert_eq!(direction(o, p(-9.0, 1.0)), Some(Direction::Nw));
        assert_eq!(direction(o, o), None);
    }

    #[test]
    fn angles_run_clockwise_from_north() {
        let o = p(0.0, 0.0);
        assert_abs_diff_eq!(angle(o, p(0.0, 1.0)).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(angle(o, p(1.0, 1.0)).unwrap(), 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(angle(o, p(1.0, 0.0)).unwrap(), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(angle(o, p(1.0, -1.0)).unwrap(), 135.0, epsilon = 1e-9);
        assert_abs_diff_eq!(angle(o, p(0.0, -1.0)).unwrap(), 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(angle(o, p(-1.0, -1.0)).unwrap(), 225.0, epsilon = 1e-9);
        assert_abs_diff_eq!(angle(o, p(-1.0, 0.0)).unwrap(), 270.0, epsilon = 1e-9);
        assert_abs_diff_eq!(angle(o, p(-1.0, 1.0)).unwrap(), 315.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            angle(o, p(1.0, 3.0_f64.sqrt())).unwrap(),
            30.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn zero_length_segment_has_no_angle() {
        assert_eq!(angle(p(3.0, 4.0), p(3.0, 4.0)), None);
        assert_eq!(compass(p(3.0, 4.0), p(3.0, 4.0)), None);
    }

    #[test]
    fn compass_buckets_are_even() {
        let o = p(0.0, 0.0);
        assert_eq!(compass(o, p(0.0, 1.0)), Some(Direction::N));
        assert_eq!(compass(o, p(1.0, 2.0)), Some(Direction::Nne));
        assert_eq!(compass(o, p(2.0, 1.0)), Some(Direction::Ene));
        assert_eq!(compass(o, p(-0.1, 1.0)), Some(Direction::N));
        assert_eq!(compass(o, p(-1.0, 2.0)), Some(Direction::Nnw));
        assert_eq!(Direction::from_index(-1), Direction::Nnw);
        assert_eq!(Direction::from_index(17), Direction::Nne);
    }
}
