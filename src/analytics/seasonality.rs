use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use super::{round1, DailyRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityResult {
    pub pattern: String,
    pub best_sales_day: String,
    pub worst_sales_day: String,
    pub weekend_lift_pct: f64,
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Weekly sales pattern from per-weekday mean sales. A weekend mean more
/// than 20% above the weekday mean reads as "Weekend Peak", more than 20%
/// below as "Weekday Peak", otherwise "Consistent Daily".
pub fn detect(history: &[DailyRecord]) -> SeasonalityResult {
    if history.is_empty() {
        return SeasonalityResult {
            pattern: "No clear pattern".to_string(),
            best_sales_day: "N/A".to_string(),
            worst_sales_day: "N/A".to_string(),
            weekend_lift_pct: 0.0,
        };
    }

    let mut totals = [0.0f64; 7];
    let mut counts = [0usize; 7];
    for record in history {
        let idx = record.date.weekday().num_days_from_monday() as usize;
        totals[idx] += record.units_sold as f64;
        counts[idx] += 1;
    }

    let day_means: Vec<(Weekday, f64)> = (0..7)
        .filter(|&i| counts[i] > 0)
        .map(|i| {
            let day = match i {
                0 => Weekday::Mon,
                1 => Weekday::Tue,
                2 => Weekday::Wed,
                3 => Weekday::Thu,
                4 => Weekday::Fri,
                5 => Weekday::Sat,
                _ => Weekday::Sun,
            };
            (day, totals[i] / counts[i] as f64)
        })
        .collect();

    let best = day_means
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(d, _)| day_name(*d))
        .unwrap_or("N/A");
    let worst = day_means
        .iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(d, _)| day_name(*d))
        .unwrap_or("N/A");

    let weekend: Vec<f64> = day_means
        .iter()
        .filter(|(d, _)| matches!(d, Weekday::Sat | Weekday::Sun))
        .map(|(_, m)| *m)
        .collect();
    let weekdays: Vec<f64> = day_means
        .iter()
        .filter(|(d, _)| !matches!(d, Weekday::Sat | Weekday::Sun))
        .map(|(_, m)| *m)
        .collect();

    let weekend_avg = super::mean(&weekend);
    let weekday_avg = super::mean(&weekdays);

    let pattern = if weekend_avg > weekday_avg * 1.2 {
        "Weekend Peak"
    } else if weekend_avg < weekday_avg * 0.8 {
        "Weekday Peak"
    } else {
        "Consistent Daily"
    };

    let weekend_lift_pct = if weekday_avg > 0.0 {
        round1((weekend_avg - weekday_avg) / weekday_avg * 100.0)
    } else {
        0.0
    };

    SeasonalityResult {
        pattern: pattern.to_string(),
        best_sales_day: best.to_string(),
        worst_sales_day: worst.to_string(),
        weekend_lift_pct,
    }
}
