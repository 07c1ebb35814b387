// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike, Utc};

use crate::{
	Result,
	error::diagnostic::value::{date_field_out_of_range, time_field_out_of_range},
	return_error,
};

/// Calendar date with a year in `[0, 9999]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date(NaiveDate);

impl Date {
	pub const MIN_YEAR: i32 = 0;
	pub const MAX_YEAR: i32 = 9999;

	pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
		if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
			return_error!(date_field_out_of_range(year, month, day));
		}
		match NaiveDate::from_ymd_opt(year, month, day) {
			Some(date) => Ok(Self(date)),
			None => return_error!(date_field_out_of_range(year, month, day)),
		}
	}

	pub fn year(&self) -> i32 {
		self.0.year()
	}

	pub fn month(&self) -> u32 {
		self.0.month()
	}

	pub fn day(&self) -> u32 {
		self.0.day()
	}

	pub fn naive(&self) -> NaiveDate {
		self.0
	}
}

impl Display for Date {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
	}
}

/// Time of day with a fractional-second precision and an optional UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
	time: NaiveTime,
	precision: u32,
	offset: Option<FixedOffset>,
}

impl Time {
	pub const MAX_PRECISION: u32 = 9;

	pub fn new(
		hour: u32,
		minute: u32,
		second: u32,
		nanosecond: u32,
		precision: u32,
		offset_minutes: Option<i32>,
	) -> Result<Self> {
		if precision > Self::MAX_PRECISION {
			return_error!(time_field_out_of_range(&format!("precision {} exceeds 9", precision)));
		}
		let Some(time) = NaiveTime::from_hms_nano_opt(hour, minute, second, nanosecond) else {
			return_error!(time_field_out_of_range(&format!("{:02}:{:02}:{:02}", hour, minute, second)));
		};
		let offset = match offset_minutes {
			None => None,
			Some(minutes) if minutes.abs() < 24 * 60 => FixedOffset::east_opt(minutes * 60),
			Some(minutes) => {
				return_error!(time_field_out_of_range(&format!("offset of {} minutes", minutes)))
			}
		};
		Ok(Self {
			time,
			precision,
			offset,
		})
	}

	pub fn with_offset(mut self, offset: FixedOffset) -> Self {
		self.offset = Some(offset);
		self
	}

	pub fn naive(&self) -> NaiveTime {
		self.time
	}

	pub fn precision(&self) -> u32 {
		self.precision
	}

	pub fn offset(&self) -> Option<FixedOffset> {
		self.offset
	}

	/// Nanoseconds since midnight UTC; times without an offset are read as UTC.
	pub(crate) fn normalized_nanos(&self) -> i64 {
		const DAY: i64 = 86_400;
		let seconds = self.time.num_seconds_from_midnight() as i64
			- self.offset.map(|o| o.local_minus_utc() as i64).unwrap_or(0);
		seconds.rem_euclid(DAY) * 1_000_000_000 + self.time.nanosecond() as i64
	}
}

impl Display for Time {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:02}:{:02}:{:02}", self.time.hour(), self.time.minute(), self.time.second())?;
		if self.precision > 0 {
			let fraction = format!("{:09}", self.time.nanosecond());
			write!(f, ".{}", &fraction[..self.precision as usize])?;
		}
		if let Some(offset) = self.offset {
			let minutes = offset.local_minus_utc() / 60;
			let sign = if minutes < 0 {
				'-'
			} else {
				'+'
			};
			write!(f, "{}{:02}:{:02}", sign, minutes.abs() / 60, minutes.abs() % 60)?;
		}
		Ok(())
	}
}

/// Instant with the offset it was written in; ordering and equality use the instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
	pub fn new(instant: DateTime<FixedOffset>) -> Self {
		Self(instant)
	}

	pub fn utc_now() -> Self {
		Self(Utc::now().fixed_offset())
	}

	/// Same instant expressed at offset zero.
	pub fn to_utc(self) -> Self {
		Self(self.0.with_timezone(&Utc).fixed_offset())
	}

	pub fn instant(&self) -> DateTime<FixedOffset> {
		self.0
	}
}

impl Display for Timestamp {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0.to_rfc3339())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ErrorCode;

	#[test]
	fn test_date_year_bounds() {
		assert!(Date::new(0, 1, 1).is_ok());
		assert!(Date::new(9999, 12, 31).is_ok());
		assert_eq!(Date::new(10000, 1, 1).unwrap_err().code(), ErrorCode::DateFieldOutOfRange);
		assert_eq!(Date::new(-1, 1, 1).unwrap_err().code(), ErrorCode::DateFieldOutOfRange);
		assert_eq!(Date::new(2021, 2, 29).unwrap_err().code(), ErrorCode::DateFieldOutOfRange);
	}

	#[test]
	fn test_date_display_pads_year() {
		assert_eq!(Date::new(7, 3, 9).unwrap().to_string(), "0007-03-09");
	}

	#[test]
	fn test_time_validation() {
		assert!(Time::new(23, 59, 59, 0, 0, None).is_ok());
		assert_eq!(Time::new(24, 0, 0, 0, 0, None).unwrap_err().code(), ErrorCode::TimeFieldOutOfRange);
		assert_eq!(Time::new(1, 0, 0, 0, 0, Some(24 * 60)).unwrap_err().code(), ErrorCode::TimeFieldOutOfRange);
	}

	#[test]
	fn test_time_display() {
		let time = Time::new(9, 5, 7, 123_000_000, 3, Some(-90)).unwrap();
		assert_eq!(time.to_string(), "09:05:07.123-01:30");
	}

	#[test]
	fn test_normalized_nanos_wraps_midnight() {
		let time = Time::new(0, 30, 0, 0, 0, Some(60)).unwrap();
		assert_eq!(time.normalized_nanos(), (23 * 3600 + 30 * 60) * 1_000_000_000);
	}

	#[test]
	fn test_timestamp_to_utc_keeps_instant() {
		let local = DateTime::parse_from_rfc3339("2024-05-01T10:00:00+02:00").unwrap();
		let utc = Timestamp::new(local).to_utc();
		assert_eq!(utc, Timestamp::new(local));
		assert_eq!(utc.instant().offset().local_minus_utc(), 0);
	}
}
