use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bucket {
    pub lower: u32,
    /// Exclusive, except for the last bucket which includes the ceiling.
    pub upper: u32,
    pub count: usize,
}

/// Histogram of final scores in fixed-width buckets from 0 to the ceiling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreDistribution {
    pub bin_width: u32,
    pub ceiling: u32,
    pub buckets: Vec<Bucket>,
    /// Scores above the ceiling, which a well-formed table never has.
    pub out_of_range: usize,
}

impl ScoreDistribution {
    pub fn new(bin_width: u32, ceiling: u32) -> Self {
        let bin_width = bin_width.max(1);
        let mut buckets = Vec::new();
        let mut lower = 0;
        while lower < ceiling {
            let upper = lower.saturating_add(bin_width).min(ceiling);
            buckets.push(Bucket { lower, upper, count: 0 });
            lower = upper;
        }
        if buckets.is_empty() {
            buckets.push(Bucket { lower: 0, upper: ceiling, count: 0 });
        }

        Self {
            bin_width,
            ceiling,
            buckets,
            out_of_range: 0,
        }
    }

    pub fn from_scores<I>(scores: I, bin_width: u32, ceiling: u32) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let mut distribution = Self::new(bin_width, ceiling);
        for score in scores {
            distribution.add(score);
        }
        distribution
    }

    pub fn add(&mut self, score: u32) {
        if score > self.ceiling {
            self.out_of_range += 1;
            return;
        }
        let last = self.buckets.len() - 1;
        let index = ((score / self.bin_width) as usize).min(last);
        self.buckets[index].count += 1;
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

impl fmt::Display for ScoreDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widest = self.buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        let last = self.buckets.len().saturating_sub(1);

        for (i, bucket) in self.buckets.iter().enumerate() {
            let close = if i == last { ']' } else { ')' };
            let bar = "#".repeat(bucket.count * 40 / widest);
            writeln!(
                f,
                "[{:>4}, {:>4}{} {:>8}  {}",
                bucket.lower, bucket.upper, close, bucket.count, bar
            )?;
        }

        if self.out_of_range > 0 {
            writeln!(f, "out of range: {}", self.out_of_range)?;
        }
        Ok(())
    }
}
