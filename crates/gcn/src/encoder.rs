// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Notice packet encoder.
//!
//! [`NoticeBuilder`] writes values into the payload words the [`Layout`]
//! of its notice type names. A value the layout has no row for is
//! dropped, so a builder can never produce a word the decoder would not
//! read back the same way.

use crate::layout::{layout_for, FieldKind, FieldSpec, Instrument, Layout};
use crate::notice_type::NoticeType;
use crate::record::{NoticeRecord, Position};
use crate::time::datetime_to_tjd;
use crate::{Words, PACKET_WORDS};
use chrono::{DateTime, Timelike, Utc};
use tracing::trace;

/// Hop count written into every built packet.
pub const HOP_COUNT: u32 = 1;

/// Terminator word (bytes `00 00 00 0A`).
pub const TERMINATOR: u32 = 0x0000_000A;

/// Builds one notice packet.
#[derive(Debug, Clone)]
pub struct NoticeBuilder {
    words: [u32; PACKET_WORDS],
    layout: Option<&'static Layout>,
}

impl NoticeBuilder {
    pub fn new(notice_type: NoticeType) -> Self {
        let code = notice_type.code();
        let mut words = [0u32; PACKET_WORDS];
        words[0] = code;
        words[2] = HOP_COUNT;
        words[PACKET_WORDS - 1] = TERMINATOR;
        Self {
            words,
            layout: layout_for(code),
        }
    }

    fn rows(&self, kind: impl Fn(&FieldKind) -> bool) -> impl Iterator<Item = &'static FieldSpec> {
        self.layout
            .map(|layout| layout.fields)
            .unwrap_or(&[])
            .iter()
            .filter(move |spec| kind(&spec.kind))
    }

    fn set(&mut self, kind: impl Fn(&FieldKind) -> bool, value: u32) {
        let words: Vec<usize> = self.rows(kind).map(|spec| spec.word).collect();
        for word in words {
            trace!("word {} = {:#x}", word, value);
            self.words[word] = value;
        }
    }

    /// Packet serial number (word 1).
    pub fn serial(mut self, serial: u32) -> Self {
        self.words[1] = serial;
        self
    }

    /// Packet time of day (word 3).
    pub fn packet_time(mut self, t: &DateTime<Utc>) -> Self {
        let centis = t.num_seconds_from_midnight() * 100 + t.nanosecond() / 10_000_000;
        self.words[3] = centis;
        self
    }

    pub fn trigger(mut self, trigger: u32, sequence: u32) -> Self {
        let rows: Vec<(usize, u32)> = self
            .rows(|kind| matches!(kind, FieldKind::TrigSeq { .. }))
            .filter_map(|spec| match spec.kind {
                FieldKind::TrigSeq { trigger_bits } => Some((spec.word, trigger_bits)),
                _ => None,
            })
            .collect();
        for (word, trigger_bits) in rows {
            let mask = (1u32 << trigger_bits) - 1;
            self.words[word] = (trigger & mask) | (sequence << trigger_bits);
        }
        self
    }

    /// Burst time as TJD and centisecond of day. Out of range times are dropped.
    pub fn burst_time(mut self, t: &DateTime<Utc>) -> Self {
        if let Some((tjd, sod)) = datetime_to_tjd(t) {
            self.set(|kind| *kind == FieldKind::BurstTjd, tjd as u32);
            self.set(|kind| *kind == FieldKind::BurstSod, sod as u32);
        }
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        let ra = (position.ra.degrees() * 10_000.0).round() as i32;
        let dec = (position.dec.degrees() * 10_000.0).round() as i32;
        self.set(|kind| *kind == FieldKind::Ra, ra as u32);
        self.set(|kind| *kind == FieldKind::Dec, dec as u32);
        self
    }

    /// Error radius in the layout's unit. HETE boxes go to the WXM diameter.
    pub fn error_radius_arcmin(mut self, arcmin: f64) -> Self {
        let units: Vec<(usize, FieldKind)> = self
            .rows(|kind| {
                matches!(
                    kind,
                    FieldKind::ErrorRadius(_) | FieldKind::BoxDiameter(Instrument::Wxm)
                )
            })
            .map(|spec| (spec.word, spec.kind))
            .collect();
        for (word, kind) in units {
            self.words[word] = match kind {
                FieldKind::ErrorRadius(unit) => unit.from_arcmin(arcmin) as u32,
                _ => ((arcmin * 120.0).round() as u32) << 16,
            };
        }
        self
    }

    /// SWIFT BAT solution status.
    pub fn status(mut self, bits: u32) -> Self {
        self.set(|kind| *kind == FieldKind::SolnStatus, bits);
        self
    }

    /// Merit parameter 0: 1 ("is a GRB") or 0 ("not a GRB").
    pub fn merit(mut self, has_merit: bool) -> Self {
        let first = self
            .rows(|kind| *kind == FieldKind::Merit)
            .map(|spec| spec.word)
            .next();
        if let Some(word) = first {
            self.words[word] = if has_merit { 0x0100_0000 } else { 0 };
        }
        self
    }

    /// Raise the type's test flag, where it has one.
    pub fn test(mut self, is_test: bool) -> Self {
        let rows: Vec<(usize, u32)> = self
            .rows(|kind| matches!(kind, FieldKind::TestFlag(_)))
            .filter_map(|spec| match spec.kind {
                FieldKind::TestFlag(mask) => Some((spec.word, mask)),
                _ => None,
            })
            .collect();
        for (word, mask) in rows {
            if is_test {
                self.words[word] |= mask;
            } else {
                self.words[word] &= !mask;
            }
        }
        self
    }

    pub fn build(self) -> Words {
        Words::from_array(self.words)
    }
}

/// Encode a record back into a packet of its notice type.
///
/// The epoch is not transmitted and the packet time is taken from the
/// record's notice time.
pub fn encode(record: &NoticeRecord) -> Words {
    let mut builder = NoticeBuilder::new(NoticeType::from_code(record.notice_type))
        .packet_time(&record.notice_time)
        .trigger(record.trigger_number, record.sequence_number)
        .error_radius_arcmin(record.error_radius_arcmin)
        .status(record.status_bits)
        .merit(record.has_merit)
        .test(record.is_test);
    if let Some(burst_time) = &record.burst_time {
        builder = builder.burst_time(burst_time);
    }
    if let Some(position) = record.position {
        builder = builder.position(position);
    }
    builder.build()
}
