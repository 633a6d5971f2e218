//! Lenient parsing of user-typed dates and times.
//!
//! Input is normalized first (case, ordinals, commas, filler words,
//! weekday names) and then matched against a small set of shapes. A date
//! without a year resolves to its first occurrence on or after an anchor.

use chrono::{Datelike, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::validator::ValidationFailure;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Years searched forward from the anchor when inferring (covers Feb 29).
const YEAR_SEARCH_SPAN: i32 = 4;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("date pattern is valid")
}

static MERIDIEM_DOTS: Lazy<Regex> = Lazy::new(|| pattern(r"\b([ap])\.\s?m\.?"));
static ORDINAL: Lazy<Regex> = Lazy::new(|| pattern(r"\b(\d{1,2})(st|nd|rd|th)\b"));
static FILLER: Lazy<Regex> = Lazy::new(|| {
    pattern(r"\b(on|at|the|of|from|starting|until|till|by|around|about|approximately)\b")
});
static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    pattern(r"\b(monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thu|friday|fri|saturday|sat|sunday|sun)\b")
});

static ISO_DATE: Lazy<Regex> = Lazy::new(|| pattern(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})$"));
static US_DATE: Lazy<Regex> = Lazy::new(|| pattern(r"^(\d{1,2})[/-](\d{1,2})(?:[/-](\d{4}|\d{2}))?$"));
static MONTH_FIRST: Lazy<Regex> = Lazy::new(|| pattern(r"^([a-z]{3,}) (\d{1,2})(?: (\d{4}))?$"));
static DAY_FIRST: Lazy<Regex> = Lazy::new(|| pattern(r"^(\d{1,2}) ([a-z]{3,})(?: (\d{4}))?$"));

static TIME_12H: Lazy<Regex> = Lazy::new(|| pattern(r"^(\d{1,2})(?::(\d{2}))? ?(am|pm)$"));
static TIME_24H: Lazy<Regex> = Lazy::new(|| pattern(r"^(\d{1,2}):(\d{2})$"));
static BARE_HOUR: Lazy<Regex> = Lazy::new(|| pattern(r"^(\d{1,2})$"));

static TIME_12H_IN_TEXT: Lazy<Regex> = Lazy::new(|| pattern(r"\b\d{1,2}(?::\d{2})? ?(?:am|pm)\b"));
static TIME_24H_IN_TEXT: Lazy<Regex> = Lazy::new(|| pattern(r"\b\d{1,2}:\d{2}\b"));
static TIME_WORD_IN_TEXT: Lazy<Regex> = Lazy::new(|| pattern(r"\b(?:noon|midday|midnight)\b"));

/// A parsed calendar date and whether its year was guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParsedDate {
    pub date: NaiveDate,
    pub year_inferred: bool,
}

impl ParsedDate {
    fn explicit(date: NaiveDate) -> Self {
        Self {
            date,
            year_inferred: false,
        }
    }
}

/// Lower-cases and strips everything that does not carry date or time
/// information.
pub(crate) fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace('\u{2019}', "'");
    let text = MERIDIEM_DOTS.replace_all(&lowered, "${1}m");
    let text = ORDINAL.replace_all(&text, "$1");
    let text = text.replace([',', '.'], " ");
    let text = FILLER.replace_all(&text, " ");
    let text = WEEKDAY.replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn month_from_name(word: &str) -> Option<u32> {
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(word))
        .map(|i| i as u32 + 1)
}

fn number<T: std::str::FromStr>(caps: &regex::Captures<'_>, group: usize) -> Option<T> {
    caps.get(group).and_then(|m| m.as_str().parse().ok())
}

/// Resolves month/day to the first occurrence on or after `anchor`.
fn infer_year(month: u32, day: u32, anchor: NaiveDate) -> Result<ParsedDate, ValidationFailure> {
    (anchor.year()..=anchor.year() + YEAR_SEARCH_SPAN)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .find(|date| *date >= anchor)
        .map(|date| ParsedDate {
            date,
            year_inferred: true,
        })
        .ok_or(ValidationFailure::NoSuchDate)
}

fn resolve(year: Option<i32>, month: u32, day: u32, anchor: NaiveDate) -> Result<ParsedDate, ValidationFailure> {
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day)
            .map(ParsedDate::explicit)
            .ok_or(ValidationFailure::NoSuchDate),
        None => infer_year(month, day, anchor),
    }
}

fn parse_normalized_date(text: &str, today: NaiveDate, anchor: NaiveDate) -> Result<ParsedDate, ValidationFailure> {
    match text {
        "today" => return Ok(ParsedDate::explicit(today)),
        "tomorrow" => {
            return today
                .succ_opt()
                .map(ParsedDate::explicit)
                .ok_or(ValidationFailure::NoSuchDate)
        }
        _ => {}
    }

    if let Some(caps) = ISO_DATE.captures(text) {
        let (year, month, day) = (number(&caps, 1), number(&caps, 2), number(&caps, 3));
        if let (Some(year), Some(month), Some(day)) = (year, month, day) {
            return resolve(Some(year), month, day, anchor);
        }
    }

    if let Some(caps) = US_DATE.captures(text) {
        let year = caps.get(3).and_then(|m| {
            let y: i32 = m.as_str().parse().ok()?;
            Some(if m.as_str().len() == 2 { 2000 + y } else { y })
        });
        if let (Some(month), Some(day)) = (number(&caps, 1), number(&caps, 2)) {
            return resolve(year, month, day, anchor);
        }
    }

    let named = MONTH_FIRST
        .captures(text)
        .and_then(|caps| Some((month_from_name(caps.get(1)?.as_str())?, number(&caps, 2)?, number(&caps, 3))))
        .or_else(|| {
            DAY_FIRST
                .captures(text)
                .and_then(|caps| Some((month_from_name(caps.get(2)?.as_str())?, number(&caps, 1)?, number(&caps, 3))))
        });
    if let Some((month, day, year)) = named {
        return resolve(year, month, day, anchor);
    }

    Err(ValidationFailure::UnreadableDate)
}

fn parse_normalized_time(text: &str) -> Result<NaiveTime, ValidationFailure> {
    match text {
        "noon" | "midday" => return NaiveTime::from_hms_opt(12, 0, 0).ok_or(ValidationFailure::UnreadableTime),
        "midnight" => return NaiveTime::from_hms_opt(0, 0, 0).ok_or(ValidationFailure::UnreadableTime),
        _ => {}
    }

    if let Some(caps) = TIME_12H.captures(text) {
        let hour: u32 = number(&caps, 1).ok_or(ValidationFailure::UnreadableTime)?;
        let minute: u32 = number(&caps, 2).unwrap_or(0);
        if !(1..=12).contains(&hour) {
            return Err(ValidationFailure::UnreadableTime);
        }
        let pm = caps.get(3).is_some_and(|m| m.as_str() == "pm");
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0).ok_or(ValidationFailure::UnreadableTime);
    }

    if let Some(caps) = TIME_24H.captures(text) {
        let (hour, minute): (Option<u32>, Option<u32>) = (number(&caps, 1), number(&caps, 2));
        return hour
            .zip(minute)
            .and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
            .ok_or(ValidationFailure::UnreadableTime);
    }

    if let Some(caps) = BARE_HOUR.captures(text) {
        if let Some(hour) = number::<u32>(&caps, 1).filter(|h| *h <= 23) {
            return Err(ValidationFailure::AmbiguousHour(hour));
        }
    }

    Err(ValidationFailure::UnreadableTime)
}

/// Parses a calendar date. `today` resolves "today"/"tomorrow"; `anchor`
/// is where year inference starts.
pub(crate) fn parse_date(raw: &str, today: NaiveDate, anchor: NaiveDate) -> Result<ParsedDate, ValidationFailure> {
    parse_normalized_date(&normalize(raw), today, anchor)
}

/// Parses a time of day. A bare hour is rejected as ambiguous.
pub(crate) fn parse_time(raw: &str) -> Result<NaiveTime, ValidationFailure> {
    parse_normalized_time(&normalize(raw))
}

/// Parses a date, a time, or both from one answer.
pub(crate) fn parse_date_time(
    raw: &str,
    today: NaiveDate,
    anchor: NaiveDate,
) -> Result<(Option<ParsedDate>, Option<NaiveTime>), ValidationFailure> {
    let text = normalize(raw);

    let time_match = [&*TIME_12H_IN_TEXT, &*TIME_24H_IN_TEXT, &*TIME_WORD_IN_TEXT]
        .into_iter()
        .find_map(|re| re.find(&text));

    let Some(found) = time_match else {
        return match parse_normalized_date(&text, today, anchor) {
            Ok(date) => Ok((Some(date), None)),
            Err(ValidationFailure::UnreadableDate) => match parse_normalized_time(&text) {
                Err(ValidationFailure::AmbiguousHour(h)) => Err(ValidationFailure::AmbiguousHour(h)),
                _ => Err(ValidationFailure::UnreadableDateTime),
            },
            Err(other) => Err(other),
        };
    };

    let time = parse_normalized_time(found.as_str())?;
    let rest = format!("{} {}", &text[..found.start()], &text[found.end()..]);
    let rest = rest.split_whitespace().collect::<Vec<_>>().join(" ");

    if rest.is_empty() {
        return Ok((None, Some(time)));
    }
    let date = parse_normalized_date(&rest, today, anchor).map_err(|e| match e {
        ValidationFailure::UnreadableDate => ValidationFailure::UnreadableDateTime,
        other => other,
    })?;
    Ok((Some(date), Some(time)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn today() -> NaiveDate {
        ymd(2025, 11, 20)
    }

    fn date(raw: &str) -> Result<ParsedDate, ValidationFailure> {
        parse_date(raw, today(), today())
    }

    mod normalization {
        use super::*;

        #[test]
        fn strips_ordinals_commas_and_fillers() {
            assert_eq!(normalize("On December 10th, 2025 at 7 A.M."), "december 10 2025 7 am");
        }

        #[test]
        fn strips_weekday_names() {
            assert_eq!(normalize("Wednesday, December 10, 2025"), "december 10 2025");
        }
    }

    mod dates {
        use super::*;

        #[test]
        fn month_name_with_ordinal_and_year() {
            assert_eq!(date("Dec 10th 2025").unwrap(), ParsedDate::explicit(ymd(2025, 12, 10)));
            assert_eq!(date("December 10, 2025").unwrap().date, ymd(2025, 12, 10));
        }

        #[test]
        fn numeric_forms() {
            assert_eq!(date("12/10/2025").unwrap().date, ymd(2025, 12, 10));
            assert_eq!(date("2025-12-10").unwrap().date, ymd(2025, 12, 10));
            assert_eq!(date("12/10/25").unwrap().date, ymd(2025, 12, 10));
        }

        #[test]
        fn day_first_names() {
            assert_eq!(date("10 December 2025").unwrap().date, ymd(2025, 12, 10));
            assert_eq!(date("the 3rd of sept").unwrap().date, ymd(2026, 9, 3));
        }

        #[test]
        fn relative_words() {
            assert_eq!(date("today").unwrap().date, today());
            assert_eq!(date("Tomorrow").unwrap().date, ymd(2025, 11, 21));
        }

        #[test]
        fn missing_year_resolves_on_or_after_anchor() {
            let parsed = parse_date("December 12th", today(), ymd(2025, 12, 10)).unwrap();
            assert_eq!(parsed.date, ymd(2025, 12, 12));
            assert!(parsed.year_inferred);

            let wrapped = parse_date("January 5", today(), ymd(2025, 12, 10)).unwrap();
            assert_eq!(wrapped.date, ymd(2026, 1, 5));
        }

        #[test]
        fn leap_day_finds_next_leap_year() {
            let parsed = parse_date("Feb 29", today(), today()).unwrap();
            assert_eq!(parsed.date, ymd(2028, 2, 29));
        }

        #[test]
        fn impossible_dates_are_rejected() {
            assert_eq!(date("February 30 2025"), Err(ValidationFailure::NoSuchDate));
            assert_eq!(date("13/45/2025"), Err(ValidationFailure::NoSuchDate));
        }

        #[test]
        fn nonsense_is_unreadable() {
            assert_eq!(date("Smarch 3rd"), Err(ValidationFailure::UnreadableDate));
            assert_eq!(date("next week sometime"), Err(ValidationFailure::UnreadableDate));
        }

        #[test]
        fn display_form_parses_back() {
            assert_eq!(date("Wednesday, December 10, 2025").unwrap().date, ymd(2025, 12, 10));
        }
    }

    mod times {
        use super::*;

        #[test]
        fn twelve_hour_forms() {
            assert_eq!(parse_time("7 AM").unwrap(), hm(7, 0));
            assert_eq!(parse_time("7:30pm").unwrap(), hm(19, 30));
            assert_eq!(parse_time("6 p.m.").unwrap(), hm(18, 0));
            assert_eq!(parse_time("12 am").unwrap(), hm(0, 0));
            assert_eq!(parse_time("12pm").unwrap(), hm(12, 0));
        }

        #[test]
        fn twenty_four_hour_form() {
            assert_eq!(parse_time("19:00").unwrap(), hm(19, 0));
        }

        #[test]
        fn noon_and_midnight() {
            assert_eq!(parse_time("noon").unwrap(), hm(12, 0));
            assert_eq!(parse_time("Midnight").unwrap(), hm(0, 0));
        }

        #[test]
        fn bare_hour_is_ambiguous() {
            assert_eq!(parse_time("7"), Err(ValidationFailure::AmbiguousHour(7)));
        }

        #[test]
        fn out_of_range_is_unreadable() {
            assert_eq!(parse_time("13 pm"), Err(ValidationFailure::UnreadableTime));
            assert_eq!(parse_time("25:00"), Err(ValidationFailure::UnreadableTime));
        }
    }

    mod date_times {
        use super::*;

        fn parse(raw: &str) -> Result<(Option<ParsedDate>, Option<NaiveTime>), ValidationFailure> {
            parse_date_time(raw, today(), today())
        }

        #[test]
        fn date_and_time_together() {
            let (d, t) = parse("December 10th 2025 at 7 AM").unwrap();
            assert_eq!(d.unwrap().date, ymd(2025, 12, 10));
            assert_eq!(t, Some(hm(7, 0)));
        }

        #[test]
        fn iso_with_24h_time() {
            let (d, t) = parse("2025-12-10 19:00").unwrap();
            assert_eq!(d.unwrap().date, ymd(2025, 12, 10));
            assert_eq!(t, Some(hm(19, 0)));
        }

        #[test]
        fn date_only_is_partial() {
            let (d, t) = parse("December 10th 2025").unwrap();
            assert!(d.is_some());
            assert!(t.is_none());
        }

        #[test]
        fn time_only_is_partial() {
            let (d, t) = parse("6 PM").unwrap();
            assert!(d.is_none());
            assert_eq!(t, Some(hm(18, 0)));
        }

        #[test]
        fn bare_hour_reports_ambiguity() {
            assert_eq!(parse("7"), Err(ValidationFailure::AmbiguousHour(7)));
        }

        #[test]
        fn unreadable_remainder_fails() {
            assert_eq!(parse("whenever at 7 am"), Err(ValidationFailure::UnreadableDateTime));
            assert_eq!(parse("soon"), Err(ValidationFailure::UnreadableDateTime));
        }
    }
}
