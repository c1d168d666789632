//! Sequential identifiers from patterns such as `yyyymmnnnn`.
//!
//! `yyyy` is replaced by the four-digit year and `mm` by the two-digit month.
//! The longest run of `n` characters holds the zero-padded sequence number;
//! every other character is literal.

use chrono::{Datelike, NaiveDate};

use crate::core::errors::{BookkeepingError, Result};

/// A pattern resolved against a date, ready to produce ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdFormat {
    concrete: Vec<char>,
    start: usize,
    end: usize,
}

impl IdFormat {
    pub fn resolve(pattern: &str, today: NaiveDate) -> Result<Self> {
        let concrete: Vec<char> = pattern
            .replace("yyyy", &format!("{:04}", today.year()))
            .replace("mm", &format!("{:02}", today.month()))
            .chars()
            .collect();

        let (start, end) = longest_run(&concrete, 'n').ok_or_else(|| {
            BookkeepingError::Validation(format!(
                "id format `{pattern}` has no sequence placeholder"
            ))
        })?;
        Ok(Self {
            concrete,
            start,
            end,
        })
    }

    /// Width of the zero-padded sequence number.
    pub fn width(&self) -> usize {
        self.end - self.start
    }

    /// True when `id` has the resolved format's length and literal characters.
    pub fn matches(&self, id: &str) -> bool {
        let candidate: Vec<char> = id.chars().collect();
        candidate.len() == self.concrete.len()
            && candidate[..self.start] == self.concrete[..self.start]
            && candidate[self.end..] == self.concrete[self.end..]
    }

    /// Produces the id following `previous`. A previous id of another shape
    /// starts a new sequence.
    pub fn next_after(&self, previous: Option<&str>) -> Result<String> {
        let previous_sequence = match previous {
            Some(id) if self.matches(id) => {
                let digits: String = id.chars().skip(self.start).take(self.width()).collect();
                parse_sequence(id, &digits)?
            }
            _ => 0,
        };
        self.with_sequence_after(previous_sequence)
    }

    /// Produces the id following the highest sequence number among `existing`.
    ///
    /// Ids whose sequence outgrew the width count as well, so numbering
    /// continues past them instead of producing them again.
    pub fn next_unused<'a, I>(&self, existing: I) -> Result<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut highest = 0;
        for id in existing {
            if let Some(digits) = self.sequence_run(id) {
                highest = highest.max(parse_sequence(id, &digits)?);
            }
        }
        self.with_sequence_after(highest)
    }

    /// Sequence characters of `id`: any run for ids of exactly this shape, and
    /// longer all-digit runs for ids that overflowed the width.
    fn sequence_run(&self, id: &str) -> Option<String> {
        let candidate: Vec<char> = id.chars().collect();
        let suffix_len = self.concrete.len() - self.end;
        if candidate.len() < self.concrete.len()
            || candidate[..self.start] != self.concrete[..self.start]
            || candidate[candidate.len() - suffix_len..] != self.concrete[self.end..]
        {
            return None;
        }
        let run: String = candidate[self.start..candidate.len() - suffix_len]
            .iter()
            .collect();
        if candidate.len() == self.concrete.len() || run.chars().all(|ch| ch.is_ascii_digit()) {
            Some(run)
        } else {
            None
        }
    }

    fn with_sequence_after(&self, previous_sequence: u64) -> Result<String> {
        let next = previous_sequence.checked_add(1).ok_or_else(|| {
            BookkeepingError::Validation(format!(
                "sequence of id format `{}` is exhausted",
                self.concrete.iter().collect::<String>()
            ))
        })?;
        let mut id: String = self.concrete[..self.start].iter().collect();
        id.push_str(&format!("{:0width$}", next, width = self.width()));
        id.extend(self.concrete[self.end..].iter());
        Ok(id)
    }
}

fn parse_sequence(id: &str, digits: &str) -> Result<u64> {
    let malformed = || BookkeepingError::MalformedId {
        id: id.to_string(),
        reason: format!("`{digits}` is not a sequence number"),
    };
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(malformed());
    }
    digits.parse::<u64>().map_err(|_| malformed())
}

/// Returns the next id for `pattern` as of `today`, continuing from `previous`.
pub fn find_next_id(previous: Option<&str>, pattern: &str, today: NaiveDate) -> Result<String> {
    IdFormat::resolve(pattern, today)?.next_after(previous)
}

fn longest_run(chars: &[char], target: char) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut index = 0;
    while index < chars.len() {
        if chars[index] != target {
            index += 1;
            continue;
        }
        let start = index;
        while index < chars.len() && chars[index] == target {
            index += 1;
        }
        if best.map_or(true, |(s, e)| index - start > e - s) {
            best = Some((start, index));
        }
    }
    best
}
