//! Line grammar.
//!
//! A data line is a date followed by up to three whitespace-separated
//! fields, wrapped in an optional prefix and suffix:
//!
//! ```text
//! prefix  date  [billcode]  [hours]  [range, range, ...]  [# comment]
//! ```
//!
//! The alternatives in [`ALTERNATIVES`] are tried in order and the first one
//! that consumes the whole line wins. There is no longest-match: a line that
//! fits several shapes takes the earliest.

use chrono::NaiveDate;

use crate::error::{GrammarError, LineError, Warnings};
use crate::line::ParsedLine;
use crate::ranges;

/// Which optional fields a grammar alternative requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alternative {
    pub billcode: bool,
    pub hours: bool,
    pub ranges: bool,
}

/// Grammar alternatives in priority order.
pub const ALTERNATIVES: [Alternative; 7] = [
    Alternative::new(true, true, true),
    Alternative::new(true, false, true),
    Alternative::new(true, true, false),
    Alternative::new(false, true, true),
    Alternative::new(false, false, true),
    Alternative::new(false, true, false),
    Alternative::new(false, false, false),
];

impl Alternative {
    const fn new(billcode: bool, hours: bool, ranges: bool) -> Self {
        Self {
            billcode,
            hours,
            ranges,
        }
    }
}

/// A time token as typed, e.g. `10:30a`.
pub type TimeToken<'a> = &'a str;

/// One range-list item before time resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRange<'a> {
    Duration(f64),
    Span {
        start: TimeToken<'a>,
        end: Option<TimeToken<'a>>,
        /// The parenthesized figure; decorative, never trusted.
        stated: Option<f64>,
    },
}

/// A line matched by one alternative, fields still as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine<'a> {
    pub prefix: &'a str,
    pub date: NaiveDate,
    pub billcode: Option<&'a str>,
    /// `None` when the alternative has no hours field; `Some(None)` for `-`.
    pub hours: Option<Option<f64>>,
    pub ranges: Option<Vec<RawRange<'a>>>,
    pub suffix: &'a str,
}

/// Parses one line.
///
/// Returns `Ok(None)` for a blank line. Warnings go to the log.
pub fn parse_line(text: &str) -> Result<Option<ParsedLine>, LineError> {
    parse_line_with(text, &mut Warnings::new())
}

/// Parses one line, collecting warnings into `warnings`.
pub fn parse_line_with(
    text: &str,
    warnings: &mut Warnings,
) -> Result<Option<ParsedLine>, LineError> {
    let text = text.trim_end_matches(['\n', '\r']);
    if text.trim().is_empty() {
        return Ok(None);
    }

    let raw = match_line(text).ok_or_else(|| GrammarError::new(text))?;
    tracing::trace!(?raw, "matched line");
    let parsed = ranges::evaluate(text, raw, warnings)?;
    Ok(Some(parsed))
}

/// Tries every alternative in priority order.
pub fn match_line(text: &str) -> Option<RawLine<'_>> {
    ALTERNATIVES
        .iter()
        .find_map(|alt| match_alternative(text, *alt))
}

fn match_alternative(text: &str, alt: Alternative) -> Option<RawLine<'_>> {
    let mut cur = Cursor::new(text);

    let prefix = cur.take_while(|c| c == '*' || c.is_whitespace());
    let date = date(&mut cur)?;

    let billcode = if alt.billcode {
        cur.space()?;
        Some(billcode(&mut cur)?)
    } else {
        None
    };

    let hours = if alt.hours {
        cur.space()?;
        Some(hours(&mut cur)?)
    } else {
        None
    };

    let ranges = if alt.ranges {
        cur.space()?;
        Some(range_list(&mut cur)?)
    } else {
        None
    };

    let suffix = suffix(&mut cur)?;

    Some(RawLine {
        prefix,
        date,
        billcode,
        hours,
        ranges,
        suffix,
    })
}

/// Parses the date column, rejecting tokens that are not real dates.
///
/// Accepts `Y-M-D`, `Y/M/D` and `M/D/Y`. The year field must have two or four
/// digits; two-digit years are read with chrono's `%y` pivot (`15` is 2015).
pub fn parse_date(token: &str) -> Option<NaiveDate> {
    let separator = if token.contains('/') { '/' } else { '-' };
    let fields: Vec<&str> = token.split(separator).collect();
    let [first, _, last] = fields.as_slice() else {
        return None;
    };

    let format = match (separator, first.len(), last.len()) {
        ('-', 4, _) => "%Y-%m-%d",
        ('-', 2, _) => "%y-%m-%d",
        ('/', 4, _) => "%Y/%m/%d",
        ('/', 1 | 2, 4) => "%m/%d/%Y",
        ('/', 1 | 2, 2) => "%m/%d/%y",
        _ => return None,
    };
    NaiveDate::parse_from_str(token, format).ok()
}

fn date(cur: &mut Cursor<'_>) -> Option<NaiveDate> {
    if !cur.peek()?.is_ascii_digit() {
        return None;
    }
    let token = cur.take_while(|c| c.is_ascii_digit() || c == '/' || c == '-');
    parse_date(token)
}

fn billcode<'a>(cur: &mut Cursor<'a>) -> Option<&'a str> {
    if !cur.peek()?.is_ascii_uppercase() {
        return None;
    }
    Some(cur.take_while(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'))
}

/// Explicit hours: a number with an optional `h`, or `-` for none.
fn hours(cur: &mut Cursor<'_>) -> Option<Option<f64>> {
    if cur.eat('-') {
        return Some(None);
    }
    number(cur).map(Some)
}

/// `[.0-9]+` followed by an optional `h`.
fn number(cur: &mut Cursor<'_>) -> Option<f64> {
    let start = cur.pos;
    let token = cur.take_while(|c| c.is_ascii_digit() || c == '.');
    let value = match token.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            cur.pos = start;
            return None;
        }
    };
    cur.eat('h');
    Some(value)
}

fn range_list<'a>(cur: &mut Cursor<'a>) -> Option<Vec<RawRange<'a>>> {
    let mut items = vec![range_item(cur)?];
    loop {
        let save = cur.pos;
        if !cur.eat(',') {
            break;
        }
        cur.take_while(char::is_whitespace);
        match range_item(cur) {
            Some(item) => items.push(item),
            None => {
                cur.pos = save;
                break;
            }
        }
    }
    Some(items)
}

fn range_item<'a>(cur: &mut Cursor<'a>) -> Option<RawRange<'a>> {
    let save = cur.pos;
    if let Some(span) = span(cur) {
        return Some(span);
    }
    cur.pos = save;
    number(cur).map(RawRange::Duration)
}

/// `start [-] [end] [(hours)]`, spaces allowed around the dash.
fn span<'a>(cur: &mut Cursor<'a>) -> Option<RawRange<'a>> {
    let start = time_token(cur)?;
    cur.take_while(char::is_whitespace);
    if !cur.eat('-') {
        return None;
    }

    let save = cur.pos;
    cur.take_while(char::is_whitespace);
    let end = time_token(cur);
    if end.is_none() {
        cur.pos = save;
    }

    let save = cur.pos;
    let stated = if cur.eat('(') {
        let value = number(cur);
        if value.is_some() && cur.eat(')') {
            value
        } else {
            cur.pos = save;
            None
        }
    } else {
        None
    };

    Some(RawRange::Span { start, end, stated })
}

/// One or two digit hour, optional `:` and one or two digit minute,
/// optional meridiem letter.
fn time_token<'a>(cur: &mut Cursor<'a>) -> Option<TimeToken<'a>> {
    let start = cur.pos;
    let hour = cur.take_while(|c| c.is_ascii_digit());
    if hour.is_empty() || hour.len() > 2 {
        cur.pos = start;
        return None;
    }

    let before_minute = cur.pos;
    if cur.eat(':') {
        let minute = cur.take_while(|c| c.is_ascii_digit());
        if minute.is_empty() || minute.len() > 2 {
            cur.pos = before_minute;
        }
    }

    if matches!(cur.peek(), Some('a' | 'A' | 'p' | 'P')) {
        cur.bump();
    }

    Some(&cur.text[start..cur.pos])
}

/// Optional whitespace, optional `#` comment, then end of line.
fn suffix<'a>(cur: &mut Cursor<'a>) -> Option<&'a str> {
    let text = cur.text;
    let start = cur.pos;
    cur.take_while(char::is_whitespace);
    if cur.peek() == Some('#') {
        cur.pos = text.len();
    }
    cur.at_end().then(|| &text[start..])
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
        &self.text[start..self.pos]
    }

    /// At least one whitespace character.
    fn space(&mut self) -> Option<()> {
        (!self.take_while(char::is_whitespace).is_empty()).then_some(())
    }

    const fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_only() {
        let raw = match_line("5/20/2015").unwrap();
        assert_eq!(raw.prefix, "");
        assert_eq!(raw.date, ymd(2015, 5, 20));
        assert_eq!(raw.hours, None);
        assert_eq!(raw.ranges, None);
        assert_eq!(raw.suffix, "");
    }

    #[test]
    fn accepts_iso_and_us_dates() {
        assert_eq!(parse_date("2015-05-20"), Some(ymd(2015, 5, 20)));
        assert_eq!(parse_date("5/20/2015"), Some(ymd(2015, 5, 20)));
        assert_eq!(parse_date("05/20/2015"), Some(ymd(2015, 5, 20)));
        assert_eq!(parse_date("5/20/15"), Some(ymd(2015, 5, 20)));
        assert_eq!(parse_date("2/30/2015"), None);
        assert_eq!(parse_date("5/20"), None);
    }

    #[test]
    fn two_digit_years_land_in_this_century() {
        assert_eq!(parse_date("15-05-20"), Some(ymd(2015, 5, 20)));
        assert_eq!(parse_date("05/20/15"), Some(ymd(2015, 5, 20)));
        assert_eq!(parse_date("2015/05/20"), Some(ymd(2015, 5, 20)));
        assert_eq!(parse_date("5/20/015"), None);
        assert_eq!(parse_date("015-05-20"), None);
        assert_eq!(parse_date("2015-05/20"), None);
    }

    #[test]
    fn overflowing_hours_are_not_a_number() {
        let huge = format!("2015-05-20 1{}", "0".repeat(400));
        assert!(match_line(&huge).is_none());
    }

    #[test]
    fn invalid_calendar_date_fails_the_line() {
        assert!(match_line("2/30/2015 5").is_none());
    }

    #[test]
    fn hours_and_ranges_with_prefix_and_comment() {
        let raw = match_line("* 6/3/2015  1.5  10a-11:15a, 12:45p-1p, 6-6:15 # whatever yo").unwrap();
        assert_eq!(raw.prefix, "* ");
        assert_eq!(raw.hours, Some(Some(1.5)));
        assert_eq!(
            raw.ranges.unwrap(),
            vec![
                RawRange::Span {
                    start: "10a",
                    end: Some("11:15a"),
                    stated: None
                },
                RawRange::Span {
                    start: "12:45p",
                    end: Some("1p"),
                    stated: None
                },
                RawRange::Span {
                    start: "6",
                    end: Some("6:15"),
                    stated: None
                },
            ]
        );
        assert_eq!(raw.suffix, " # whatever yo");
    }

    #[test]
    fn spaces_around_dash_and_open_range() {
        let raw = match_line("5/20/2015 5  10:10 - 10:25a, 12-").unwrap();
        assert_eq!(raw.hours, Some(Some(5.0)));
        assert_eq!(
            raw.ranges.unwrap(),
            vec![
                RawRange::Span {
                    start: "10:10",
                    end: Some("10:25a"),
                    stated: None
                },
                RawRange::Span {
                    start: "12",
                    end: None,
                    stated: None
                },
            ]
        );
    }

    #[test]
    fn stated_durations_and_bare_items() {
        let raw = match_line("7/13/2015 3.5  .25, 1:30p-5p(3.50)").unwrap();
        assert_eq!(
            raw.ranges.unwrap(),
            vec![
                RawRange::Duration(0.25),
                RawRange::Span {
                    start: "1:30p",
                    end: Some("5p"),
                    stated: Some(3.5)
                },
            ]
        );
    }

    #[test]
    fn bare_hours_line_prefers_range_list() {
        // Alternative 5 (range list) outranks alternative 6 (hours only).
        let raw = match_line("2015-05-20     5").unwrap();
        assert_eq!(raw.hours, None);
        assert_eq!(raw.ranges, Some(vec![RawRange::Duration(5.0)]));
    }

    #[test]
    fn dash_hours_means_none() {
        let raw = match_line("2015-05-20     -").unwrap();
        assert_eq!(raw.hours, Some(None));
        assert_eq!(raw.ranges, None);
    }

    #[test]
    fn billcode_alternatives() {
        let raw = match_line("2015-05-20   DEV     2 10a-12p").unwrap();
        assert_eq!(raw.billcode, Some("DEV"));
        assert_eq!(raw.hours, Some(Some(2.0)));
        assert_eq!(raw.ranges.map(|r| r.len()), Some(1));

        let raw = match_line("2015-05-20 OPS 10a-12p").unwrap();
        assert_eq!(raw.billcode, Some("OPS"));
        assert_eq!(raw.hours, None);

        let raw = match_line("2015-05-20 A 3h").unwrap();
        assert_eq!(raw.billcode, Some("A"));
        assert_eq!(raw.ranges, Some(vec![RawRange::Duration(3.0)]));
    }

    #[test]
    fn lowercase_word_is_not_a_billcode() {
        assert!(match_line("2015-05-20 dev 3").is_none());
    }

    #[test]
    fn rejects_free_text() {
        assert!(match_line("Notes for the week").is_none());
        assert!(match_line("==== # INV1, description").is_none());
        assert!(match_line("2015-05-20 5 stuff").is_none());
    }

    #[test]
    fn comment_directly_after_date() {
        let raw = match_line("2015-05-20# holiday").unwrap();
        assert_eq!(raw.suffix, "# holiday");
    }

    #[test]
    fn blank_line_is_not_data() {
        assert_eq!(parse_line("   \n"), Ok(None));
    }

    #[test]
    fn grammar_error_carries_line() {
        let err = parse_line("hello\n").unwrap_err();
        assert_eq!(err, LineError::Grammar(GrammarError::new("hello")));
    }
}
