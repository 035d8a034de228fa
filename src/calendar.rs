use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::Serialize;

/// Odds that a day shows the cosmetic session marker.
const SESSION_MARK_ODDS: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub day: u32,
    pub is_today: bool,
    pub has_session: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub title: String,
    pub year: i32,
    pub month: u32,
    /// Sunday-first rows; `None` pads days outside the month.
    pub weeks: Vec<Vec<Option<CalendarDay>>>,
}

pub fn month_grid<R: Rng + ?Sized>(
    year: i32,
    month: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Option<CalendarMonth> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = days_in_month(year, month)?;
    let lead = first.weekday().num_days_from_sunday() as usize;

    let mut cells: Vec<Option<CalendarDay>> = vec![None; lead];
    for day in 1..=days {
        cells.push(Some(CalendarDay {
            day,
            is_today: today.year() == year && today.month() == month && today.day() == day,
            has_session: rng.gen_bool(SESSION_MARK_ODDS),
        }));
    }
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    Some(CalendarMonth {
        title: first.format("%B %Y").to_string(),
        year,
        month,
        weeks: cells.chunks(7).map(<[_]>::to_vec).collect(),
    })
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    next.pred_opt().map(|last| last.day())
}
