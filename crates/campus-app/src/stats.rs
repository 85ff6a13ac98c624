// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ExamResult, ResultStatus};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub average_percentage: f64,
    pub highest_percentage: f64,
    pub lowest_percentage: f64,
}

impl ResultStats {
    /// `None` for an empty projection.
    pub fn compute<'a, I>(results: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a ExamResult>,
    {
        let mut total = 0usize;
        let mut passed = 0usize;
        let mut sum = 0.0;
        let mut highest = f64::NEG_INFINITY;
        let mut lowest = f64::INFINITY;

        for result in results {
            total += 1;
            if result.status == ResultStatus::Passed {
                passed += 1;
            }
            sum += result.percentage;
            highest = highest.max(result.percentage);
            lowest = lowest.min(result.percentage);
        }

        if total == 0 {
            return None;
        }
        Some(Self {
            total,
            passed,
            failed: total - passed,
            average_percentage: sum / total as f64,
            highest_percentage: highest,
            lowest_percentage: lowest,
        })
    }

    pub fn pass_rate(&self) -> f64 {
        self.passed as f64 * 100.0 / self.total as f64
    }
}
