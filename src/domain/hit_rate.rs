//! Directional hit-rate statistics.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `Up` only on a strict increase; ties count as `Down`.
    pub fn between(from: f64, to: f64) -> Self {
        if to > from { Direction::Up } else { Direction::Down }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
        }
    }
}

/// Correct / total counts over scored (prediction, realized move) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitRateStat {
    pub correct: usize,
    pub total: usize,
}

impl HitRateStat {
    pub fn new(correct: usize, total: usize) -> Self {
        debug_assert!(correct <= total);
        Self { correct, total }
    }

    pub fn record(&mut self, predicted: Direction, realized: Direction) {
        self.total += 1;
        if predicted == realized {
            self.correct += 1;
        }
    }

    /// `None` when nothing was scored.
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64 * 100.0)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl Serialize for HitRateStat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("HitRateStat", 3)?;
        s.serialize_field("correct", &self.correct)?;
        s.serialize_field("total", &self.total)?;
        s.serialize_field("percentage", &self.percentage())?;
        s.end()
    }
}

impl Add for HitRateStat {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            correct: self.correct + rhs.correct,
            total: self.total + rhs.total,
        }
    }
}

impl AddAssign for HitRateStat {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for HitRateStat {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Forward-looking horizons, in years.
pub const HORIZONS: [i32; 2] = [1, 2];

/// Separate 1-year and 2-year stats; `combined` sums both horizons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HorizonStats {
    pub one_year: HitRateStat,
    pub two_year: HitRateStat,
}

impl HorizonStats {
    pub fn record(&mut self, horizon: i32, predicted: Direction, realized: Direction) {
        match horizon {
            1 => self.one_year.record(predicted, realized),
            2 => self.two_year.record(predicted, realized),
            other => tracing::warn!(horizon = other, "ignoring unsupported horizon"),
        }
    }

    pub fn combined(&self) -> HitRateStat {
        self.one_year + self.two_year
    }
}

impl Serialize for HorizonStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("HorizonStats", 3)?;
        s.serialize_field("one_year", &self.one_year)?;
        s.serialize_field("two_year", &self.two_year)?;
        s.serialize_field("combined", &self.combined())?;
        s.end()
    }
}

impl Add for HorizonStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            one_year: self.one_year + rhs.one_year,
            two_year: self.two_year + rhs.two_year,
        }
    }
}

impl AddAssign for HorizonStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for HorizonStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn direction_ties_are_down() {
        assert_eq!(Direction::between(10.0, 11.0), Direction::Up);
        assert_eq!(Direction::between(10.0, 10.0), Direction::Down);
        assert_eq!(Direction::between(10.0, 9.0), Direction::Down);
    }

    #[test]
    fn empty_stat_has_no_percentage() {
        let stat = HitRateStat::default();
        assert!(stat.is_empty());
        assert_eq!(stat.percentage(), None);
    }

    #[test]
    fn record_counts_hits_and_misses() {
        let mut stat = HitRateStat::default();
        stat.record(Direction::Up, Direction::Up);
        stat.record(Direction::Up, Direction::Down);
        stat.record(Direction::Down, Direction::Down);
        assert_eq!(stat, HitRateStat::new(2, 3));
        assert_relative_eq!(stat.percentage().unwrap(), 200.0 / 3.0);
    }

    #[test]
    fn stats_sum() {
        let total: HitRateStat = [HitRateStat::new(1, 2), HitRateStat::new(3, 4)]
            .into_iter()
            .sum();
        assert_eq!(total, HitRateStat::new(4, 6));
    }

    #[test]
    fn horizon_stats_combined() {
        let mut h = HorizonStats::default();
        h.record(1, Direction::Up, Direction::Up);
        h.record(2, Direction::Up, Direction::Down);
        h.record(2, Direction::Down, Direction::Down);
        h.record(3, Direction::Down, Direction::Down);
        assert_eq!(h.one_year, HitRateStat::new(1, 1));
        assert_eq!(h.two_year, HitRateStat::new(1, 2));
        assert_eq!(h.combined(), HitRateStat::new(2, 3));
    }

    #[test]
    fn serializes_percentage() {
        let json = serde_json::to_value(HitRateStat::new(1, 4)).unwrap();
        assert_eq!(json["correct"], 1);
        assert_eq!(json["total"], 4);
        assert_eq!(json["percentage"], 25.0);
        let empty = serde_json::to_value(HitRateStat::default()).unwrap();
        assert!(empty["percentage"].is_null());
    }

    #[test]
    fn horizon_stats_serialize_combined() {
        let h = HorizonStats {
            one_year: HitRateStat::new(1, 2),
            two_year: HitRateStat::new(2, 2),
        };
        let json = serde_json::to_value(h).unwrap();
        assert_eq!(json["combined"]["correct"], 3);
        assert_eq!(json["combined"]["total"], 4);
    }

    proptest! {
        #[test]
        fn percentage_is_bounded(outcomes in proptest::collection::vec(any::<(bool, bool)>(), 0..100)) {
            let dir = |b: bool| if b { Direction::Up } else { Direction::Down };
            let mut stat = HitRateStat::default();
            for (p, r) in &outcomes {
                stat.record(dir(*p), dir(*r));
            }
            match stat.percentage() {
                Some(pct) => prop_assert!((0.0..=100.0).contains(&pct)),
                None => prop_assert_eq!(stat.total, 0),
            }
        }
    }
}
