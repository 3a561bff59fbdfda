// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Right ascension and declination values.
//!
//! Both are stored in radians. The canonical string forms are
//! `HH:MM:SS.ss` for right ascension and `[+|-]DD:MM:SS.ss` for declination.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Angle parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AngleParseError {
    #[error("expected three colon separated fields, got '{0}'")]
    Format(String),

    #[error("invalid number '{0}'")]
    Number(String),

    #[error("value out of range: {0}")]
    Range(String),
}

/// Right ascension, in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ra(f64);

/// Declination, in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Dec(f64);

impl Ra {
    pub fn from_radians(radians: f64) -> Self {
        Self(radians)
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self(degrees.to_radians())
    }

    pub fn radians(&self) -> f64 {
        self.0
    }

    pub fn degrees(&self) -> f64 {
        self.0.to_degrees()
    }

    /// Hours of right ascension (15 degrees per hour).
    pub fn hours(&self) -> f64 {
        self.degrees() / 15.0
    }

    /// Parse `HH:MM:SS.ss`.
    pub fn parse_colon(s: &str) -> Result<Self, AngleParseError> {
        let (negative, h, m, sec) = split_sexagesimal(s)?;
        if negative {
            return Err(AngleParseError::Range(format!("negative RA '{}'", s)));
        }
        if h >= 24.0 {
            return Err(AngleParseError::Range(format!("RA hours {} >= 24", h)));
        }
        let hours = h + m / 60.0 + sec / 3600.0;
        Ok(Self::from_degrees(hours * 15.0))
    }
}

impl Dec {
    pub fn from_radians(radians: f64) -> Self {
        Self(radians)
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self(degrees.to_radians())
    }

    pub fn radians(&self) -> f64 {
        self.0
    }

    pub fn degrees(&self) -> f64 {
        self.0.to_degrees()
    }

    /// Parse `[+|-]DD:MM:SS.ss`.
    pub fn parse_colon(s: &str) -> Result<Self, AngleParseError> {
        let (negative, d, m, sec) = split_sexagesimal(s)?;
        let magnitude = d + m / 60.0 + sec / 3600.0;
        if magnitude > 90.0 {
            return Err(AngleParseError::Range(format!("|Dec| {} > 90", magnitude)));
        }
        let degrees = if negative { -magnitude } else { magnitude };
        Ok(Self::from_degrees(degrees))
    }
}

/// Split a colon separated value into sign and three unsigned parts.
///
/// The sign is taken from the first field text so `-00:30:00` stays negative.
fn split_sexagesimal(s: &str) -> Result<(bool, f64, f64, f64), AngleParseError> {
    let trimmed = s.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() != 3 {
        return Err(AngleParseError::Format(s.to_string()));
    }

    let (negative, first) = match parts[0].strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, parts[0].strip_prefix('+').unwrap_or(parts[0])),
    };

    let whole = parse_part(first)?;
    let minutes = parse_part(parts[1])?;
    let seconds = parse_part(parts[2])?;

    if minutes >= 60.0 {
        return Err(AngleParseError::Range(format!("minutes {} >= 60", minutes)));
    }
    if seconds >= 60.0 {
        return Err(AngleParseError::Range(format!("seconds {} >= 60", seconds)));
    }

    Ok((negative, whole, minutes, seconds))
}

fn parse_part(part: &str) -> Result<f64, AngleParseError> {
    let value: f64 = part
        .parse()
        .map_err(|_| AngleParseError::Number(part.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(AngleParseError::Number(part.to_string()));
    }
    Ok(value)
}

/// Split an unsigned amount of hundredths into (whole, minutes, seconds, hundredths).
fn sexagesimal_parts(hundredths: u64) -> (u64, u64, u64, u64) {
    let whole = hundredths / 360_000;
    let minutes = (hundredths / 6_000) % 60;
    let seconds = (hundredths / 100) % 60;
    (whole, minutes, seconds, hundredths % 100)
}

impl fmt::Display for Ra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hours = self.hours() % 24.0;
        if hours < 0.0 {
            hours += 24.0;
        }
        let hundredths = (hours * 360_000.0).round() as u64 % (24 * 360_000);
        let (h, m, s, cs) = sexagesimal_parts(hundredths);
        write!(f, "{:02}:{:02}:{:02}.{:02}", h, m, s, cs)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let degrees = self.degrees();
        let hundredths = (degrees.abs() * 360_000.0).round() as u64;
        let sign = if degrees < 0.0 && hundredths != 0 { '-' } else { '+' };
        let (d, m, s, cs) = sexagesimal_parts(hundredths);
        write!(f, "{}{:02}:{:02}:{:02}.{:02}", sign, d, m, s, cs)
    }
}

impl FromStr for Ra {
    type Err = AngleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_colon(s)
    }
}

impl FromStr for Dec {
    type Err = AngleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_colon(s)
    }
}
