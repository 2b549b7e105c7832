//! Moving-average trend over the monthly revenue series.

use crate::domain::MonthlyRevenue;

/// Trailing rolling mean over `window` consecutive entries of the series.
///
/// The result is aligned with `monthly`; positions with fewer than `window`
/// observations so far are `None`. A zero window yields all `None`.
pub fn moving_average(monthly: &[MonthlyRevenue], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; monthly.len()];
    }

    let mut out = Vec::with_capacity(monthly.len());
    let mut sum = 0.0;
    for (i, m) in monthly.iter().enumerate() {
        sum += m.revenue;
        if i >= window {
            sum -= monthly[i - window].revenue;
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::month_end;

    fn series(values: &[f64]) -> Vec<MonthlyRevenue> {
        values
            .iter()
            .enumerate()
            .map(|(i, &revenue)| MonthlyRevenue {
                month: month_end(NaiveDate::from_ymd_opt(2024, i as u32 + 1, 1).unwrap()),
                revenue,
            })
            .collect()
    }

    #[test]
    fn three_month_window() {
        let ma = moving_average(&series(&[3.0, 6.0, 9.0, 12.0]), 3);
        assert_eq!(ma, vec![None, None, Some(6.0), Some(9.0)]);
    }

    #[test]
    fn window_longer_than_series() {
        let ma = moving_average(&series(&[1.0, 2.0]), 3);
        assert_eq!(ma, vec![None, None]);
    }

    #[test]
    fn window_of_one_is_identity() {
        let ma = moving_average(&series(&[5.0, 7.0]), 1);
        assert_eq!(ma, vec![Some(5.0), Some(7.0)]);
        assert_eq!(moving_average(&series(&[5.0]), 0), vec![None]);
    }
}
