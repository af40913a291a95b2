use chrono::{
    DateTime, Duration, FixedOffset, Months, NaiveDate, NaiveTime, TimeZone, Timelike, Utc,
};

use atrium_models::search::SearchOperator;

use super::bounds::{parse_range_spec, RangeSpec};
use super::{invalid, ClauseError, ClauseResult};
use crate::clause::{Clause, RangeValue};

/// Date predicate.
///
/// `GREATER`/`LESSER` compare against the start of the given period. Other
/// operators read `from X to Y`, where both bounds include their whole
/// period; a bare date covers its own period (`2020-05-01` is that day).
pub(super) fn build_date_clause(attr: &str, op: SearchOperator, value: &str) -> ClauseResult {
    match op {
        SearchOperator::Greater => {
            let (start, _) = period(value)?;
            Ok(Clause::range(attr, Some(RangeValue::Timestamp(start)), None))
        }
        SearchOperator::Lesser => {
            let (start, _) = period(value)?;
            Ok(Clause::range(attr, None, Some(RangeValue::Timestamp(start))))
        }
        SearchOperator::Equals | SearchOperator::Regex => match parse_range_spec(value) {
            RangeSpec::Bare(v) => {
                let (start, end) = period(&v)?;
                Ok(Clause::range(
                    attr,
                    Some(RangeValue::Timestamp(start)),
                    Some(RangeValue::Timestamp(last_instant(end))),
                ))
            }
            RangeSpec::Between { from, to } => {
                if from.is_none() && to.is_none() {
                    return Err(invalid(format!("empty date range: '{value}'")));
                }
                let gte = from
                    .map(|f| period(&f).map(|(start, _)| RangeValue::Timestamp(start)))
                    .transpose()?;
                let lte = to
                    .map(|t| period(&t).map(|(_, end)| RangeValue::Timestamp(last_instant(end))))
                    .transpose()?;
                Ok(Clause::range(attr, gte, lte))
            }
        },
    }
}

type Period = (DateTime<Utc>, DateTime<Utc>);

fn period(raw: &str) -> Result<Period, ClauseError> {
    date_period(raw.trim_matches('"')).ok_or_else(|| invalid(format!("not a date: '{raw}'")))
}

fn last_instant(exclusive_end: DateTime<Utc>) -> DateTime<Utc> {
    exclusive_end - Duration::milliseconds(1)
}

/// `[start, end)` of a possibly partial date: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`
/// or `YYYY-MM-DDThh:mm[:ss[.fff]][Z|±hh:mm]`. Date-times without an offset
/// are UTC.
pub(crate) fn date_period(raw: &str) -> Option<Period> {
    let s = raw.trim();
    match s.split_once('T') {
        None => calendar_period(s),
        Some((date, time)) => instant_period(date, time),
    }
}

fn calendar_period(s: &str) -> Option<Period> {
    let mut parts = s.split('-');
    let year = fixed_digits::<i32>(parts.next()?, 4)?;
    let month = match parts.next() {
        Some(m) => Some(fixed_digits::<u32>(m, 2)?),
        None => None,
    };
    let day = match parts.next() {
        Some(d) => Some(fixed_digits::<u32>(d, 2)?),
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }

    let first = NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1))?;
    let next = match (month, day) {
        (None, _) => NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
        (Some(_), None) => first.checked_add_months(Months::new(1))?,
        (Some(_), Some(_)) => first.succ_opt()?,
    };
    Some((midnight(first)?, midnight(next)?))
}

fn instant_period(date: &str, time: &str) -> Option<Period> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let (clock, offset) = split_offset(time)?;
    let (clock, unit) = parse_clock(clock)?;
    let start = offset
        .from_local_datetime(&date.and_time(clock))
        .single()?
        .with_timezone(&Utc);
    Some((start, start + unit))
}

fn split_offset(time: &str) -> Option<(&str, FixedOffset)> {
    if let Some(clock) = time.strip_suffix('Z') {
        return Some((clock, FixedOffset::east_opt(0)?));
    }
    let Some(pos) = time.find(['+', '-']) else {
        return Some((time, FixedOffset::east_opt(0)?));
    };
    let (clock, zone) = time.split_at(pos);
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let (hours, minutes) = zone[1..].split_once(':')?;
    let seconds = fixed_digits::<i32>(hours, 2)? * 3600 + fixed_digits::<i32>(minutes, 2)? * 60;
    Some((clock, FixedOffset::east_opt(sign * seconds)?))
}

/// Time of day plus the width of its last given unit.
fn parse_clock(clock: &str) -> Option<(NaiveTime, Duration)> {
    let (whole, fraction) = match clock.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (clock, None),
    };
    let (time, unit) = match (whole.len(), fraction) {
        (5, None) => (
            NaiveTime::parse_from_str(whole, "%H:%M").ok()?,
            Duration::minutes(1),
        ),
        (8, _) => (
            NaiveTime::parse_from_str(whole, "%H:%M:%S").ok()?,
            Duration::seconds(1),
        ),
        _ => return None,
    };

    let Some(fraction) = fraction else {
        return Some((time, unit));
    };
    if fraction.is_empty() || fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let nanos: u32 = format!("{fraction:0<9}").parse().ok()?;
    // bounds are stored in milliseconds
    let width = 10_i64.pow(9 - fraction.len() as u32).max(1_000_000);
    Some((time.with_nanosecond(nanos)?, Duration::nanoseconds(width)))
}

fn fixed_digits<T: std::str::FromStr>(s: &str, width: usize) -> Option<T> {
    if s.len() != width || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}
