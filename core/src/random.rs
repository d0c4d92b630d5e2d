/// Bounded randomness used for every jitter and stagger in the effect.
///
/// Implementors provide a uniform unit sample; the browser binding maps this
/// to `Math.random()`, tests feed scripted or seeded values.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn unit(&self) -> f64;

    /// Uniform integer in `[min, max]`, both ends inclusive.
    fn int_in(&self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max);
        let span = (max as i64 - min as i64 + 1) as f64;
        min + (self.unit() * span) as i32
    }

    /// `int_in` over a `(min, max)` pair, handy with the parameter tables.
    fn pick(&self, range: (i32, i32)) -> i32 {
        self.int_in(range.0, range.1)
    }
}
