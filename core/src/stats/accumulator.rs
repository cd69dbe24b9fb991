//! Statistics Accumulator

use crate::pbrt;
use num_traits::Num;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;
use std::sync::{Mutex, OnceLock};

/// Return the global statistics accumulator.
pub fn stats_accumulator() -> &'static Mutex<StatsAccumulator> {
    static DATA: OnceLock<Mutex<StatsAccumulator>> = OnceLock::new();
    DATA.get_or_init(|| Mutex::new(StatsAccumulator::default()))
}

/// Distribution statistic.
#[derive(Default, Clone, Debug)]
pub struct StatsDistribution<T> {
    /// Sum of all values.
    sum: T,

    /// Count of all values.
    count: u64,

    /// Minimum and maximum value.
    range: Option<(T, T)>,
}

impl<T> StatsDistribution<T>
where
    T: Num + PartialOrd + AddAssign + Copy,
{
    /// Report a sample value.
    ///
    /// * `val`  - Sample value.
    pub fn report(&mut self, val: T) {
        self.sum += val;
        self.count += 1;
        self.range = Some(match self.range {
            Some((lo, hi)) => (pbrt::min(lo, val), pbrt::max(hi, val)),
            None => (val, val),
        });
    }

    /// Merge another distribution into this one.
    ///
    /// * `other` - The distribution to merge.
    pub fn accumulate(&mut self, other: &Self) {
        self.sum += other.sum;
        self.count += other.count;
        self.range = match (self.range, other.range) {
            (Some((lo, hi)), Some((olo, ohi))) => Some((pbrt::min(lo, olo), pbrt::max(hi, ohi))),
            (a, b) => a.or(b),
        };
    }

    /// Returns the number of reported values.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the (min, max) range if any value was reported.
    pub fn range(&self) -> Option<(T, T)> {
        self.range
    }

    /// Clear stats.
    pub fn clear(&mut self) {
        self.sum = T::zero();
        self.count = 0;
        self.range = None;
    }
}

impl StatsDistribution<i64> {
    /// Returns the mean of the reported values.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

/// Aggregate different types of statistics.
#[derive(Default, Debug)]
pub struct StatsAccumulator {
    /// Counters.
    counters: BTreeMap<String, i64>,

    /// Integer distribution.
    int_distribution: BTreeMap<String, StatsDistribution<i64>>,

    /// Percentages.
    percentages: BTreeMap<String, (i64, i64)>,
}

impl StatsAccumulator {
    /// Accumulates a counter value.
    ///
    /// * `name` - Statistic name.
    /// * `val`  - Counter value.
    pub fn report_counter(&mut self, name: &str, val: i64) {
        *self.counters.entry(name.to_string()).or_insert(0) += val;
    }

    /// Accumulates integer distribution samples.
    ///
    /// * `name`    - Statistic name.
    /// * `distrib` - Distribution.
    pub fn report_int_distribution(&mut self, name: &str, distrib: &StatsDistribution<i64>) {
        self.int_distribution
            .entry(name.to_string())
            .or_default()
            .accumulate(distrib);
    }

    /// Accumulates a percentage value.
    ///
    /// * `name`  - Statistic name.
    /// * `num`   - Numerator (actual count).
    /// * `denom` - Denominator (total count).
    pub fn report_percentage(&mut self, name: &str, num: i64, denom: i64) {
        let v = self.percentages.entry(name.to_string()).or_insert((0, 0));
        v.0 += num;
        v.1 += denom;
    }

    /// Returns the accumulated counter value.
    ///
    /// * `name` - Statistic name.
    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Returns the accumulated percentage as a (numerator, denominator) pair.
    ///
    /// * `name` - Statistic name.
    pub fn percentage(&self, name: &str) -> (i64, i64) {
        self.percentages.get(name).copied().unwrap_or((0, 0))
    }

    /// Returns the accumulated integer distribution.
    ///
    /// * `name` - Statistic name.
    pub fn int_distribution(&self, name: &str) -> Option<&StatsDistribution<i64>> {
        self.int_distribution.get(name)
    }

    /// Prints the report to stdout.
    pub fn print(&self) {
        print!("{self}");
    }

    /// Lines of the report grouped by category.
    fn lines(&self) -> BTreeMap<String, Vec<String>> {
        let mut lines: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (k, &v) in self.counters.iter().filter(|(_, v)| **v != 0) {
            let (category, title) = category_and_title(k);
            lines
                .entry(category.to_string())
                .or_default()
                .push(format!("{title:<42}               {v:12}"));
        }

        for (k, v) in self.int_distribution.iter() {
            if let Some((mn, mx)) = v.range() {
                let (category, title) = category_and_title(k);
                let avg = v.average();
                lines
                    .entry(category.to_string())
                    .or_default()
                    .push(format!("{title:<42}                      {avg:.3} avg [range {mn} - {mx}]"));
            }
        }

        for (k, &(num, denom)) in self.percentages.iter().filter(|(_, v)| v.1 != 0) {
            let (category, title) = category_and_title(k);
            let pct = (100.0 * num as f64) / denom as f64;
            lines
                .entry(category.to_string())
                .or_default()
                .push(format!("{title:<42}{num:12} / {denom:12} ({pct:.2}%)"));
        }

        lines
    }
}

impl fmt::Display for StatsAccumulator {
    /// Formats the report grouped by category.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics:")?;
        for (category, items) in self.lines() {
            writeln!(f, "  {category}")?;
            for item in items {
                writeln!(f, "    {item}")?;
            }
        }
        Ok(())
    }
}

/// Splits a statistic name at the first `/` and returns category and title.
/// If there is no `/`, then category is the empty string.
///
/// * `s` - The statistic name to split.
fn category_and_title(s: &str) -> (&str, &str) {
    s.split_once('/').unwrap_or(("", s))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_tracks_range() {
        let mut d = StatsDistribution::<i64>::default();
        assert_eq!(d.range(), None);
        d.report(3);
        d.report(1);
        d.report(8);
        assert_eq!(d.count(), 3);
        assert_eq!(d.range(), Some((1, 8)));
        assert_eq!(d.average(), 4.0);

        let mut e = StatsDistribution::<i64>::default();
        e.report(12);
        d.accumulate(&e);
        assert_eq!(d.range(), Some((1, 12)));
    }

    #[test]
    fn accumulator_sums_reports() {
        let mut accum = StatsAccumulator::default();
        accum.report_counter("Closures/Composites built", 2);
        accum.report_counter("Closures/Composites built", 3);
        accum.report_percentage("Closures/Pruned leaves", 1, 4);
        accum.report_percentage("Closures/Pruned leaves", 1, 4);
        assert_eq!(accum.counter("Closures/Composites built"), 5);
        assert_eq!(accum.percentage("Closures/Pruned leaves"), (2, 8));

        let report = accum.to_string();
        assert!(report.contains("  Closures"));
        assert!(report.contains("Composites built"));
    }

    #[test]
    fn split_category() {
        assert_eq!(category_and_title("A/b/c"), ("A", "b/c"));
        assert_eq!(category_and_title("plain"), ("", "plain"));
    }
}
