pub struct StatsHelper;

impl StatsHelper {
    /// Smallest strictly positive sample, if any.
    pub fn min_positive<I>(samples: I) -> Option<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        samples
            .into_iter()
            .filter(|&v| v > 0.0)
            .fold(None, |acc, v| match acc {
                Some(current) if current <= v => Some(current),
                _ => Some(v),
            })
    }
}
