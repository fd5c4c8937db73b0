//! # Date-Range Rule Support
//!
//! Helpers for rules that validate `StartDate`/`EndDate` children on feed
//! elements. [`gather_dates`] parses both fields into a [`DateBounds`]
//! value; the bounds accumulate a local error log through the helper checks
//! and are consumed by [`DateBounds::into_violation`].
//!
//! `DateBounds` is a per-invocation local value. Nothing persists between
//! elements, so checking one element can never leak date state into the
//! next.

use chrono::NaiveDate;
use roxmltree::Node;

use crate::error::{ErrorLogEntry, Severity, Violation};
use crate::schema;

/// The ISO calendar date format required of StartDate/EndDate text.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A parsed date field together with its source line in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    /// The parsed calendar date.
    pub date: NaiveDate,
    /// Source line of the date element.
    pub line: u32,
}

/// Start/end dates gathered from one element, plus the local error log the
/// helper checks append to.
#[derive(Debug, Clone)]
pub struct DateBounds {
    start: Option<ParsedDate>,
    end: Option<ParsedDate>,
    today: NaiveDate,
    error_log: Vec<ErrorLogEntry>,
}

/// Gather `StartDate` and `EndDate` children of `element`.
///
/// Each field present must parse as `yyyy-mm-dd`; a malformed field adds a
/// log entry keyed by that field's source line. If any field is malformed
/// the whole gather fails with an `Error` violation carrying the log;
/// otherwise the parsed dates (absent if the field was absent) are returned
/// for use by the helper checks.
pub fn gather_dates(element: Node<'_, '_>, today: NaiveDate) -> Result<DateBounds, Violation> {
    let mut log = Vec::new();
    let start = parse_date_child(element, "StartDate", &mut log);
    let end = parse_date_child(element, "EndDate", &mut log);

    if !log.is_empty() {
        return Err(Violation::error("The format for the feed dates is invalid").with_log(log));
    }

    Ok(DateBounds {
        start,
        end,
        today,
        error_log: Vec::new(),
    })
}

fn parse_date_child(
    element: Node<'_, '_>,
    name: &str,
    log: &mut Vec<ErrorLogEntry>,
) -> Option<ParsedDate> {
    let child = schema::find_child(element, name)?;
    let text = child.text().unwrap_or("").trim();
    match NaiveDate::parse_from_str(text, DATE_FORMAT) {
        Ok(date) => Some(ParsedDate {
            date,
            line: schema::source_line(child),
        }),
        Err(_) => {
            log.push(ErrorLogEntry::new(
                Some(schema::source_line(child)),
                format!("The {name} text should be of the format yyyy-mm-dd"),
            ));
            None
        }
    }
}

impl DateBounds {
    /// The gathered start date, if the element had one.
    pub fn start(&self) -> Option<ParsedDate> {
        self.start
    }

    /// The gathered end date, if the element had one.
    pub fn end(&self) -> Option<ParsedDate> {
        self.end
    }

    /// The accumulated error log.
    pub fn error_log(&self) -> &[ErrorLogEntry] {
        &self.error_log
    }

    /// Append a log entry if the start date is strictly before today.
    pub fn check_start_not_in_past(&mut self) {
        if let Some(start) = self.start {
            self.note_if_past(start);
        }
    }

    /// Append a log entry if the end date is strictly before today.
    pub fn check_end_not_in_past(&mut self) {
        if let Some(end) = self.end {
            self.note_if_past(end);
        }
    }

    fn note_if_past(&mut self, parsed: ParsedDate) {
        if parsed.date < self.today {
            self.error_log.push(ErrorLogEntry::new(
                Some(parsed.line),
                format!("The date {} is in the past.", parsed.date),
            ));
        }
    }

    /// Append a log entry if the end date precedes the start date. Absent
    /// fields skip the check.
    pub fn check_end_after_start(&mut self) {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end.date < start.date {
                self.error_log.push(ErrorLogEntry::new(
                    Some(end.line),
                    format!(
                        "The dates (start: {}, end: {}) are invalid. \
                         The end date must be the same or after the start date.",
                        start.date, end.date
                    ),
                ));
            }
        }
    }

    /// Succeed if the log is empty, otherwise raise a single violation at
    /// the given severity carrying the accumulated log.
    pub fn into_violation(
        self,
        severity: Severity,
        message: impl Into<String>,
    ) -> Result<(), Violation> {
        if self.error_log.is_empty() {
            Ok(())
        } else {
            Err(Violation::new(severity, message).with_log(self.error_log))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn election(start: &str, end: &str) -> String {
        format!("<Election>\n  <StartDate>{start}</StartDate>\n  <EndDate>{end}</EndDate>\n</Election>")
    }

    #[test]
    fn gathers_both_dates() {
        let xml = election("2024-07-01", "2024-07-02");
        let doc = Document::parse(&xml).unwrap();
        let bounds = gather_dates(doc.root_element(), today()).unwrap();
        assert_eq!(
            bounds.start().unwrap().date,
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
        );
        assert_eq!(
            bounds.end().unwrap().date,
            NaiveDate::from_ymd_opt(2024, 7, 2).unwrap()
        );
        assert_eq!(bounds.start().unwrap().line, 2);
        assert_eq!(bounds.end().unwrap().line, 3);
    }

    #[test]
    fn absent_fields_gather_as_none() {
        let doc = Document::parse("<Election/>").unwrap();
        let bounds = gather_dates(doc.root_element(), today()).unwrap();
        assert!(bounds.start().is_none());
        assert!(bounds.end().is_none());
    }

    #[test]
    fn impossible_calendar_date_is_malformed() {
        let xml = election("2024-02-30", "2024-07-02");
        let doc = Document::parse(&xml).unwrap();
        let violation = gather_dates(doc.root_element(), today()).unwrap_err();
        assert_eq!(violation.severity(), Severity::Error);
        assert_eq!(violation.error_log().len(), 1);
        assert!(violation.error_log()[0].message.contains("StartDate"));
        assert_eq!(violation.error_log()[0].line, Some(2));
    }

    #[test]
    fn both_malformed_fields_are_logged() {
        let xml = election("July 1st", "2024-13-01");
        let doc = Document::parse(&xml).unwrap();
        let violation = gather_dates(doc.root_element(), today()).unwrap_err();
        assert_eq!(violation.error_log().len(), 2);
        assert_eq!(violation.occurrence_count(), 2);
    }

    #[test]
    fn end_before_start_appends_exactly_one_entry() {
        let xml = election("2024-02-01", "2024-01-01");
        let doc = Document::parse(&xml).unwrap();
        let mut bounds = gather_dates(doc.root_element(), today()).unwrap();
        bounds.check_end_after_start();
        assert_eq!(bounds.error_log().len(), 1);
        assert!(bounds.error_log()[0].message.contains("2024-01-01"));
    }

    #[test]
    fn past_dates_are_noted() {
        let xml = election("2024-01-01", "2024-12-31");
        let doc = Document::parse(&xml).unwrap();
        let mut bounds = gather_dates(doc.root_element(), today()).unwrap();
        bounds.check_start_not_in_past();
        bounds.check_end_not_in_past();
        assert_eq!(bounds.error_log().len(), 1);
        assert!(bounds.error_log()[0].message.contains("2024-01-01"));
    }

    #[test]
    fn today_is_not_in_the_past() {
        let xml = election("2024-06-15", "2024-06-15");
        let doc = Document::parse(&xml).unwrap();
        let mut bounds = gather_dates(doc.root_element(), today()).unwrap();
        bounds.check_start_not_in_past();
        bounds.check_end_after_start();
        assert!(bounds.error_log().is_empty());
    }

    #[test]
    fn into_violation_carries_log_and_severity() {
        let xml = election("2024-02-01", "2024-01-01");
        let doc = Document::parse(&xml).unwrap();
        let mut bounds = gather_dates(doc.root_element(), today()).unwrap();
        bounds.check_end_after_start();
        let violation = bounds
            .into_violation(Severity::Warning, "dates invalid")
            .unwrap_err();
        assert_eq!(violation.severity(), Severity::Warning);
        assert_eq!(violation.occurrence_count(), 1);
    }

    #[test]
    fn clean_bounds_convert_to_ok() {
        let xml = election("2024-07-01", "2024-07-02");
        let doc = Document::parse(&xml).unwrap();
        let bounds = gather_dates(doc.root_element(), today()).unwrap();
        assert!(bounds.into_violation(Severity::Error, "unused").is_ok());
    }

    #[test]
    fn bounds_do_not_leak_between_elements() {
        // Two elements checked back to back: the second gather starts from
        // a fresh value, so the first element's log cannot bleed into it.
        let bad = election("2024-02-01", "2024-01-01");
        let good = election("2024-07-01", "2024-07-02");
        let bad_doc = Document::parse(&bad).unwrap();
        let good_doc = Document::parse(&good).unwrap();

        let mut first = gather_dates(bad_doc.root_element(), today()).unwrap();
        first.check_end_after_start();
        assert_eq!(first.error_log().len(), 1);

        let mut second = gather_dates(good_doc.root_element(), today()).unwrap();
        second.check_end_after_start();
        assert!(second.error_log().is_empty());
    }
}
