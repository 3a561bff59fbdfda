// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoded notice records.

use crate::angle::{Dec, Ra};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mission that produced a notice.
///
/// [`Mission::Unknown`] marks a record that must never be propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mission {
    #[default]
    Unknown,
    Hete,
    Integral,
    Swift,
    Agile,
    Fermi,
}

impl Mission {
    /// All deliverable missions.
    pub const KNOWN: [Mission; 5] = [
        Mission::Hete,
        Mission::Integral,
        Mission::Swift,
        Mission::Agile,
        Mission::Fermi,
    ];

    /// Bit of this mission in a [`MissionSet`]. Zero for `Unknown`.
    pub const fn bit(self) -> u32 {
        match self {
            Mission::Unknown => 0,
            Mission::Hete => 1 << 0,
            Mission::Integral => 1 << 1,
            Mission::Swift => 1 << 2,
            Mission::Agile => 1 << 3,
            Mission::Fermi => 1 << 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Mission::Unknown => "UNKNOWN",
            Mission::Hete => "HETE",
            Mission::Integral => "INTEGRAL",
            Mission::Swift => "SWIFT",
            Mission::Agile => "AGILE",
            Mission::Fermi => "FERMI",
        }
    }

    /// Look up a known mission by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::KNOWN
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }

    pub fn is_known(self) -> bool {
        self != Mission::Unknown
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of missions allowed to trigger the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissionSet(u32);

impl MissionSet {
    pub const EMPTY: MissionSet = MissionSet(0);

    pub fn all() -> Self {
        Mission::KNOWN.into_iter().collect()
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub fn insert(&mut self, mission: Mission) {
        self.0 |= mission.bit();
    }

    pub fn remove(&mut self, mission: Mission) {
        self.0 &= !mission.bit();
    }

    /// `Unknown` is never contained.
    pub fn contains(&self, mission: Mission) -> bool {
        self.0 & mission.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Mission> + '_ {
        Mission::KNOWN.into_iter().filter(|m| self.contains(*m))
    }
}

impl FromIterator<Mission> for MissionSet {
    fn from_iter<I: IntoIterator<Item = Mission>>(iter: I) -> Self {
        let mut set = MissionSet::EMPTY;
        for mission in iter {
            set.insert(mission);
        }
        set
    }
}

impl fmt::Display for MissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(Mission::name).collect();
        write!(f, "{}", names.join("|"))
    }
}

/// A sky position. Right ascension and declination are always set together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub ra: Ra,
    pub dec: Dec,
}

/// One decoded alert.
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeRecord {
    /// Notice type code from word 0, or 0 for manual alerts.
    pub notice_type: u32,
    pub mission: Mission,
    pub trigger_number: u32,
    pub sequence_number: u32,
    pub position: Option<Position>,
    /// Decimal year the position is referred to.
    pub epoch: f64,
    pub burst_time: Option<DateTime<Utc>>,
    /// When the notice was received, not taken from the packet.
    pub notice_time: DateTime<Utc>,
    pub error_radius_arcmin: f64,
    pub status_bits: u32,
    pub is_test: bool,
    pub has_merit: bool,
}

impl NoticeRecord {
    /// A fresh record carrying no mission.
    pub fn new(notice_time: DateTime<Utc>) -> Self {
        Self {
            notice_type: 0,
            mission: Mission::Unknown,
            trigger_number: 0,
            sequence_number: 0,
            position: None,
            epoch: 2000.0,
            burst_time: None,
            notice_time,
            error_radius_arcmin: 0.0,
            status_bits: 0,
            is_test: false,
            has_merit: true,
        }
    }

    /// Set the error radius, clamping negative or NaN values to zero.
    pub fn set_error_radius(&mut self, arcmin: f64) {
        self.error_radius_arcmin = if arcmin.is_nan() { 0.0 } else { arcmin.max(0.0) };
    }

    pub fn ra(&self) -> Option<Ra> {
        self.position.map(|p| p.ra)
    }

    pub fn dec(&self) -> Option<Dec> {
        self.position.map(|p| p.dec)
    }

    /// Known mission and a complete position.
    pub fn is_deliverable(&self) -> bool {
        self.mission.is_known() && self.position.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_bits_are_distinct() {
        let bits: Vec<u32> = Mission::KNOWN.iter().map(|m| m.bit()).collect();
        assert_eq!(bits, vec![1, 2, 4, 8, 16]);
        assert_eq!(Mission::Unknown.bit(), 0);
    }

    #[test]
    fn test_mission_from_name() {
        assert_eq!(Mission::from_name("swift"), Some(Mission::Swift));
        assert_eq!(Mission::from_name("FERMI"), Some(Mission::Fermi));
        assert_eq!(Mission::from_name("unknown"), None);
        assert_eq!(Mission::from_name("BATSE"), None);
    }

    #[test]
    fn test_mission_set() {
        let mut set: MissionSet = [Mission::Hete, Mission::Swift].into_iter().collect();
        assert!(set.contains(Mission::Swift));
        assert!(!set.contains(Mission::Integral));
        assert!(!set.contains(Mission::Unknown));
        assert_eq!(set.to_string(), "HETE|SWIFT");

        set.remove(Mission::Hete);
        assert_eq!(set.bits(), Mission::Swift.bit());
        assert_eq!(MissionSet::all().bits(), 0x1f);
        assert_eq!(MissionSet::EMPTY.to_string(), "none");
    }

    #[test]
    fn test_new_record_defaults() {
        let record = NoticeRecord::new(Utc::now());
        assert_eq!(record.mission, Mission::Unknown);
        assert_eq!(record.epoch, 2000.0);
        assert!(record.has_merit);
        assert!(!record.is_deliverable());
    }

    #[test]
    fn test_error_radius_never_negative() {
        let mut record = NoticeRecord::new(Utc::now());
        record.set_error_radius(-3.0);
        assert_eq!(record.error_radius_arcmin, 0.0);
        record.set_error_radius(f64::NAN);
        assert_eq!(record.error_radius_arcmin, 0.0);
        record.set_error_radius(2.5);
        assert_eq!(record.error_radius_arcmin, 2.5);
    }
}
