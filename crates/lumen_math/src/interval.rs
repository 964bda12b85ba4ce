/// A closed interval `[min, max]` on the real line.
///
/// Used both for per-axis extents of [`crate::Bounds`] and for the valid
/// parameter range of a ray during intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// An empty interval (min > max, contains nothing). Identity for [`Interval::hull`].
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Returns true if x is within the interval [min, max] (inclusive).
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// True when `other` lies entirely inside this interval. The empty
    /// interval is contained in everything.
    pub fn contains_interval(&self, other: &Interval) -> bool {
        other.is_empty() || (self.min <= other.min && other.max <= self.max)
    }

    /// Grows the interval by `padding` on each side.
    pub fn pad(&self, padding: f32) -> Interval {
        if self.is_empty() {
            return *self;
        }
        Interval::new(self.min - padding, self.max + padding)
    }

    /// Smallest interval containing both inputs.
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Extends the interval so it includes `x`.
    pub fn include(&self, x: f32) -> Interval {
        Interval::new(self.min.min(x), self.max.max(x))
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::EMPTY
    }
}
