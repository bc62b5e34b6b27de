//! Period aggregation of scored records.
//!
//! Groups `ScoredRecord`s by calendar day, ISO week or calendar month and
//! computes per-group statistics. All records of a group must be present
//! before its summary is emitted; this is a plain reduce-by-key over an
//! ordered map, so output is chronological by construction.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::{Factor, Period, PeriodSummary, ScoredRecord};

// ---------------------------------------------------------------------------
// Period keys
// ---------------------------------------------------------------------------

/// First calendar day of the period containing `date`.
pub fn period_start(date: NaiveDate, period: Period) -> NaiveDate {
    match period {
        Period::Daily => date,
        Period::Weekly => {
            let week = date.iso_week();
            NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon).unwrap_or(date)
        }
        Period::Monthly => date.with_day(1).unwrap_or(date),
    }
}

/// Human-readable period label: `2024-05-01`, `2024-W18` or `2024-05`.
pub fn period_label(date: NaiveDate, period: Period) -> String {
    match period {
        Period::Daily => date.format("%Y-%m-%d").to_string(),
        Period::Weekly => {
            let week = date.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        Period::Monthly => date.format("%Y-%m").to_string(),
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Accumulator {
    label: String,
    count: usize,
    composite_sum: f64,
    composite_max: u8,
    confidence_sum: f64,
    factor_sums: BTreeMap<Factor, (f64, usize)>,
}

impl Accumulator {
    fn add(&mut self, record: &ScoredRecord) {
        let m = &record.metrics;
        self.count += 1;
        self.composite_sum += f64::from(m.composite_score);
        self.composite_max = self.composite_max.max(m.composite_score);
        self.confidence_sum += m.confidence;
        for (factor, score) in &m.scores {
            let entry = self.factor_sums.entry(*factor).or_insert((0.0, 0));
            entry.0 += f64::from(*score);
            entry.1 += 1;
        }
    }

    fn finish(self, start_date: NaiveDate, period: Period) -> PeriodSummary {
        let n = self.count as f64;
        let scores = Factor::ALL
            .iter()
            .map(|factor| {
                let mean = match self.factor_sums.get(factor) {
                    Some((sum, k)) if *k > 0 => sum / *k as f64,
                    _ => 0.0,
                };
                (*factor, mean)
            })
            .collect();

        PeriodSummary {
            period: self.label,
            period_type: period,
            start_date,
            count: self.count,
            avg_composite_score: self.composite_sum / n,
            max_composite_score: self.composite_max,
            avg_confidence: self.confidence_sum / n,
            scores,
        }
    }
}

/// Rolls scored records up into one summary per distinct period, in
/// chronological order. An empty input yields an empty output.
pub fn aggregate(records: &[ScoredRecord], period: Period) -> Vec<PeriodSummary> {
    let mut groups: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();

    for record in records {
        let start = period_start(record.date, period);
        let acc = groups.entry(start).or_insert_with(|| Accumulator {
            label: period_label(record.date, period),
            ..Default::default()
        });
        acc.add(record);
    }

    groups
        .into_iter()
        .map(|(start, acc)| acc.finish(start, period))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HealthMetrics;
    use std::collections::BTreeMap;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, composite: u8, confidence: f64, pm25: u8) -> ScoredRecord {
        let scores = Factor::ALL
            .iter()
            .map(|f| (*f, if *f == Factor::Pm25 { pm25 } else { 0 }))
            .collect();
        ScoredRecord {
            date,
            lat: 40.7128,
            lon: -74.006,
            metrics: HealthMetrics {
                scores,
                composite_score: composite,
                confidence,
                risk_levels: BTreeMap::new(),
                exposure_hours: BTreeMap::new(),
                insights: Vec::new(),
            },
        }
    }

    #[test]
    fn test_three_same_day_records_make_one_summary() {
        let d = day(2024, 5, 1);
        let records = vec![
            record(d, 10, 1.0, 30),
            record(d, 20, 0.5, 60),
            record(d, 36, 0.0, 90),
        ];
        let summaries = aggregate(&records, Period::Daily);
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.count, 3);
        assert_eq!(s.period, "2024-05-01");
        assert_eq!(s.avg_composite_score, 22.0);
        assert_eq!(s.max_composite_score, 36);
        assert_eq!(s.avg_confidence, 0.5);
        assert_eq!(s.scores[&Factor::Pm25], 60.0);
        assert_eq!(s.scores[&Factor::Uv], 0.0);
    }

    #[test]
    fn test_daily_output_is_chronological_regardless_of_input_order() {
        let records = vec![
            record(day(2024, 5, 3), 10, 1.0, 0),
            record(day(2024, 5, 1), 20, 1.0, 0),
            record(day(2024, 5, 2), 30, 1.0, 0),
            record(day(2024, 5, 1), 40, 1.0, 0),
        ];
        let labels: Vec<_> = aggregate(&records, Period::Daily)
            .into_iter()
            .map(|s| (s.period, s.count))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("2024-05-01".to_string(), 2),
                ("2024-05-02".to_string(), 1),
                ("2024-05-03".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_weekly_groups_by_iso_week() {
        // 2024-05-05 is a Sunday (end of W18); 2024-05-06 is Monday of W19.
        let records = vec![
            record(day(2024, 4, 29), 10, 1.0, 0),
            record(day(2024, 5, 5), 20, 1.0, 0),
            record(day(2024, 5, 6), 30, 1.0, 0),
        ];
        let summaries = aggregate(&records, Period::Weekly);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].period, "2024-W18");
        assert_eq!(summaries[0].start_date, day(2024, 4, 29));
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[1].period, "2024-W19");
    }

    #[test]
    fn test_iso_week_spanning_new_year() {
        // 2024-12-30 and 2025-01-02 both fall in ISO week 2025-W01.
        let records = vec![
            record(day(2024, 12, 30), 10, 1.0, 0),
            record(day(2025, 1, 2), 20, 1.0, 0),
        ];
        let summaries = aggregate(&records, Period::Weekly);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].period, "2025-W01");
        assert_eq!(summaries[0].start_date, day(2024, 12, 30));
    }

    #[test]
    fn test_monthly_grouping() {
        let records = vec![
            record(day(2024, 5, 31), 10, 1.0, 0),
            record(day(2024, 6, 1), 20, 1.0, 0),
            record(day(2024, 5, 1), 30, 1.0, 0),
        ];
        let summaries = aggregate(&records, Period::Monthly);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].period, "2024-05");
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[0].avg_composite_score, 20.0);
        assert_eq!(summaries[1].period, "2024-06");
        assert_eq!(summaries[1].period_type, Period::Monthly);
    }

    #[test]
    fn test_factor_absent_in_group_averages_to_zero() {
        let mut r = record(day(2024, 5, 1), 10, 1.0, 50);
        r.metrics.scores.remove(&Factor::Wind);
        let summaries = aggregate(&[r], Period::Daily);
        assert_eq!(summaries[0].scores[&Factor::Wind], 0.0);
        assert_eq!(summaries[0].scores[&Factor::Pm25], 50.0);
        assert_eq!(summaries[0].scores.len(), 10);
    }

    #[test]
    fn test_factor_mean_uses_only_records_carrying_it() {
        let a = record(day(2024, 5, 1), 10, 1.0, 80);
        let mut b = record(day(2024, 5, 1), 10, 1.0, 0);
        b.metrics.scores.remove(&Factor::Pm25);
        let summaries = aggregate(&[a, b], Period::Daily);
        assert_eq!(summaries[0].scores[&Factor::Pm25], 80.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], Period::Weekly).is_empty());
    }
}
