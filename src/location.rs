use std::num::NonZero;

use strum::VariantArray;

type Coord = usize;
pub(crate) type Dimension = NonZero<Coord>;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
/// A location `(x, y)` on a board. The top left corner is `Location(0, 0)`.
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.1, self.0)
    }

    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }
}

/// A step between two grid-adjacent cells on a rectangular board.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Direction {
    /// Toward lower `y`.
    Up,
    /// Toward higher `y`.
    Down,
    /// Toward lower `x`.
    Left,
    /// Toward higher `x`.
    Right,
}

impl Direction {
    /// Directions which step toward a higher-indexed location in the row-major cell array.
    /// Stepping only these from every cell visits each undirected grid edge exactly once.
    pub(crate) const FORWARD: [Self; 2] = [Self::Right, Self::Down];

    /// Attempt the step from `location` in the direction specified by `self` and return the
    /// resultant [`Location`].
    ///
    /// Steps off the top or left edge wrap to a huge coordinate, so the result fails any
    /// subsequent bounds check just like a step off the bottom or right edge.
    pub fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((0, -1)),
            Self::Down => location.offset_by((0, 1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
        }
    }

    /// Invert the direction specified by `self`.
    pub fn invert(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::VariantArray;

    use super::{Direction, Location};

    #[test]
    fn step_and_invert_round_trip() {
        let origin = Location(3, 4);
        for direction in Direction::VARIANTS {
            let there = direction.attempt_from(origin);
            assert_ne!(there, origin);
            assert_eq!(direction.invert().attempt_from(there), origin);
        }
    }

    #[test]
    fn steps_off_the_board_fail_bounds_checks() {
        let corner = Location(0, 0);
        assert!(Direction::Up.attempt_from(corner).1 > 1000);
        assert!(Direction::Left.attempt_from(corner).0 > 1000);
    }
}
