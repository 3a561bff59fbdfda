// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Notice packet decoder.
//!
//! [`decode`] reads the forty big-endian words of a packet, looks up the
//! [`Layout`] for the type code in word 0 and folds every listed field into
//! a fresh [`NoticeRecord`]. Types without a layout produce a record with
//! [`Mission::Unknown`], which is never propagated.

use crate::angle::{Dec, Ra};
use crate::layout::{layout_for, EpochRule, FieldKind, FieldSpec, Instrument, Layout};
use crate::notice_type::NoticeType;
use crate::record::{Mission, NoticeRecord, Position};
use crate::swift::{self, MeritVerdict};
use crate::time::{decimal_year, tjd_to_datetime};
use crate::{PACKET_LEN, PACKET_WORDS};
use byteorder::{BigEndian, ReadBytesExt};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Angle words below this mean "no position".
const NO_POSITION_SENTINEL: i32 = -999_000;

/// HETE validity: burst declared invalid.
const HETE_BURST_INVALID: u32 = 0x0000_0002;

/// HETE validity: neither WXM nor SXC produced a position.
const HETE_NO_POSITION: u32 = 0x0000_0040;

/// Decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("packet too short: {len} bytes, expected {PACKET_LEN}")]
    Truncated { len: usize },

    #[error("packet read failed: {0}")]
    Read(#[from] std::io::Error),
}

/// Inputs to a decode other than the packet itself.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Seeds the synthesized status of SWIFT sub-instrument notices.
    pub swift_accept_mask: u32,
    /// Receipt time, stored as the record's notice time.
    pub received_at: DateTime<Utc>,
}

impl DecodeOptions {
    /// Options stamped with the current time.
    pub fn now(swift_accept_mask: u32) -> Self {
        Self {
            swift_accept_mask,
            received_at: Utc::now(),
        }
    }
}

/// The forty words of one packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Words([u32; PACKET_WORDS]);

impl Words {
    /// Read the first 160 bytes of `buf`. Anything beyond is ignored.
    pub fn read(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < PACKET_LEN {
            return Err(DecodeError::Truncated { len: buf.len() });
        }
        let mut words = [0u32; PACKET_WORDS];
        let mut reader = &buf[..PACKET_LEN];
        reader.read_u32_into::<BigEndian>(&mut words)?;
        Ok(Self(words))
    }

    pub fn from_array(words: [u32; PACKET_WORDS]) -> Self {
        Self(words)
    }

    /// Unsigned value of word `index`.
    pub fn word(&self, index: usize) -> u32 {
        self.0[index]
    }

    /// Signed value of word `index`.
    pub fn signed(&self, index: usize) -> i32 {
        self.0[index] as i32
    }

    pub fn notice_type(&self) -> NoticeType {
        NoticeType::from_code(self.0[0])
    }

    /// Big-endian bytes of the whole packet.
    pub fn to_bytes(&self) -> [u8; PACKET_LEN] {
        let mut out = [0u8; PACKET_LEN];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}

/// Type of a raw packet from its first word, if it has one.
pub fn peek_notice_type(buf: &[u8]) -> Option<NoticeType> {
    let mut reader = buf;
    reader
        .read_u32::<BigEndian>()
        .ok()
        .map(NoticeType::from_code)
}

/// Split a trigger/sequence word. Unsigned shift, so a set top bit never
/// sign-extends into the sequence number.
pub fn split_trig_seq(word: u32, trigger_bits: u32) -> (u32, u32) {
    let mask = (1u32 << trigger_bits) - 1;
    (word & mask, word >> trigger_bits)
}

/// Upper 16 bits of a HETE `*_dim_nsig` word.
fn box_diameter_arcsec(word: u32) -> u32 {
    word >> 16
}

/// Smallest non-zero radius of the two HETE sub-instrument boxes, zero if
/// neither reported one.
pub fn hete_error_radius_arcmin(wxm_diameter_arcsec: u32, sxc_diameter_arcsec: u32) -> f64 {
    let smallest = [wxm_diameter_arcsec, sxc_diameter_arcsec]
        .into_iter()
        .filter(|d| *d != 0)
        .min()
        .unwrap_or(0);
    f64::from(smallest) / (2.0 * 60.0)
}

/// Raw values gathered while walking a layout.
#[derive(Debug, Default)]
struct Fields {
    trig_seq: Option<(u32, u32)>,
    tjd: Option<i32>,
    sod: Option<i32>,
    ra: Option<i32>,
    dec: Option<i32>,
    error_arcmin: Option<f64>,
    wxm_diameter: Option<u32>,
    sxc_diameter: Option<u32>,
    validity: Option<u32>,
    test_flagged: bool,
    soln_status: Option<u32>,
    misc: Option<u32>,
    merit: [u32; 3],
    merit_words: usize,
}

impl Fields {
    fn collect(layout: &Layout, words: &Words) -> Self {
        let mut fields = Self::default();
        for spec in layout.fields {
            fields.apply(spec, words);
        }
        fields
    }

    fn apply(&mut self, spec: &FieldSpec, words: &Words) {
        let raw = words.word(spec.word);
        let signed = words.signed(spec.word);
        match spec.kind {
            FieldKind::TrigSeq { trigger_bits } => {
                let (trigger, sequence) = split_trig_seq(raw, trigger_bits);
                debug!("Trigger No: {} Mesg Seq. No: {}", trigger, sequence);
                self.trig_seq = Some((trigger, sequence));
            }
            FieldKind::BurstTjd => {
                debug!("Burst TJD: {}", signed);
                self.tjd = Some(signed);
            }
            FieldKind::BurstSod => {
                debug!("Burst SOD: {} centi-seconds of day", signed);
                self.sod = Some(signed);
            }
            FieldKind::Ra => self.ra = Some(signed),
            FieldKind::Dec => self.dec = Some(signed),
            FieldKind::ErrorRadius(unit) => {
                let arcmin = unit.to_arcmin(signed);
                debug!("Error box radius: {} arcmin ({} raw {:?})", arcmin, signed, unit);
                self.error_arcmin = Some(arcmin);
            }
            FieldKind::BoxDiameter(instrument) => {
                let diameter = box_diameter_arcsec(raw);
                debug!(
                    "{:?} error box (diameter, arcsec): {} significance: {}",
                    instrument,
                    diameter,
                    raw & 0xFFFF
                );
                match instrument {
                    Instrument::Wxm => self.wxm_diameter = Some(diameter),
                    Instrument::Sxc => self.sxc_diameter = Some(diameter),
                }
            }
            FieldKind::Validity => {
                debug!("Validity flags: {:#x}", raw);
                self.validity = Some(raw);
            }
            FieldKind::TestFlag(mask) => {
                debug!("{}: {:#x} & {:#x} = {:#x}", spec.name, raw, mask, raw & mask);
                if raw & mask != 0 {
                    self.test_flagged = true;
                }
            }
            FieldKind::SolnStatus => {
                debug!("Soln Status: {:#x}", raw);
                for line in swift::describe_soln_status(raw) {
                    debug!("Soln Status: {}", line);
                }
                self.soln_status = Some(raw);
            }
            FieldKind::SwiftMisc => {
                debug!("Misc Bits: {:#x}", raw);
                self.misc = Some(raw);
            }
            FieldKind::Merit => {
                if self.merit_words < self.merit.len() {
                    self.merit[self.merit_words] = raw;
                    self.merit_words += 1;
                }
            }
            FieldKind::EnergyBands => {
                let bands = [raw >> 24, (raw >> 16) & 0xFF, (raw >> 8) & 0xFF, raw & 0xFF];
                debug!("Energy band counts: {:?}", bands);
            }
            FieldKind::Logged { scale, unit } => {
                debug!("{}: {} {}", spec.name, f64::from(signed) * scale, unit);
            }
            FieldKind::LoggedHex => {
                debug!("{}: {:#x}", spec.name, raw);
            }
        }
    }
}

/// Decode one packet.
///
/// Errors only when the buffer is shorter than a packet; every well-sized
/// buffer yields a record, with `Mission::Unknown` when it must not be
/// propagated.
pub fn decode(buf: &[u8], options: &DecodeOptions) -> Result<NoticeRecord, DecodeError> {
    let words = Words::read(buf)?;
    Ok(decode_words(&words, options))
}

/// Decode one packet, downgrading any error to an `Unknown` record.
pub fn decode_or_unknown(buf: &[u8], options: &DecodeOptions) -> NoticeRecord {
    match decode(buf, options) {
        Ok(record) => record,
        Err(e) => {
            warn!("Notice decode failed: {}", e);
            NoticeRecord::new(options.received_at)
        }
    }
}

/// Decode already split words.
pub fn decode_words(words: &Words, options: &DecodeOptions) -> NoticeRecord {
    let code = words.word(0);
    let notice_type = NoticeType::from_code(code);
    debug!("Read packet type: {} [{}]", code, notice_type);
    debug!(
        "Header: Packet Seq.No: {} Hop Count: {} SOD: {}",
        words.word(1),
        words.word(2),
        words.signed(3)
    );

    let mut record = NoticeRecord::new(options.received_at);
    record.notice_type = code;

    let Some(layout) = layout_for(code) else {
        debug!("[{}] carries no decodable payload", notice_type);
        trace!("Terminator: {:#010x}", words.word(PACKET_WORDS - 1));
        return record;
    };

    let fields = Fields::collect(layout, words);
    trace!("Terminator: {:#010x}", words.word(PACKET_WORDS - 1));
    finish(record, notice_type, layout, fields, options)
}

fn finish(
    mut record: NoticeRecord,
    notice_type: NoticeType,
    layout: &Layout,
    fields: Fields,
    options: &DecodeOptions,
) -> NoticeRecord {
    record.mission = layout.mission;
    record.is_test = layout.test_type;

    if let Some((trigger, sequence)) = fields.trig_seq {
        record.trigger_number = trigger;
        record.sequence_number = sequence;
    }

    if let (Some(tjd), Some(sod)) = (fields.tjd, fields.sod) {
        record.burst_time = tjd_to_datetime(tjd, sod);
        match record.burst_time {
            Some(t) => debug!("Burst Date: {}", t),
            None => warn!("[{}] burst TJD {} SOD {} out of range", notice_type, tjd, sod),
        }
    }

    if let (Some(ra), Some(dec)) = (fields.ra, fields.dec) {
        if ra < NO_POSITION_SENTINEL || dec < NO_POSITION_SENTINEL {
            debug!("RA/Dec out of range: ra (x10000) = {} dec (x10000) = {}", ra, dec);
            record.mission = Mission::Unknown;
        } else {
            let position = Position {
                ra: Ra::from_degrees(f64::from(ra) / 10_000.0),
                dec: Dec::from_degrees(f64::from(dec) / 10_000.0),
            };
            debug!("Burst RA: {} Dec: {}", position.ra, position.dec);
            record.position = Some(position);
        }
    }

    record.epoch = match (layout.epoch, record.burst_time) {
        (EpochRule::BurstDate, Some(t)) => decimal_year(&t),
        _ => 2000.0,
    };
    debug!("Epoch: {}", record.epoch);

    if let Some(arcmin) = fields.error_arcmin {
        record.set_error_radius(arcmin);
    }
    if fields.wxm_diameter.is_some() || fields.sxc_diameter.is_some() {
        let arcmin = hete_error_radius_arcmin(
            fields.wxm_diameter.unwrap_or(0),
            fields.sxc_diameter.unwrap_or(0),
        );
        debug!("Error box radius (smallest non-zero): {} arcmin", arcmin);
        record.set_error_radius(arcmin);
    }

    if let Some(validity) = fields.validity {
        if validity & HETE_NO_POSITION != 0 {
            debug!("Validity: no WXM or SXC position");
        }
        if validity & HETE_BURST_INVALID != 0 {
            debug!("BURST INVALID: RA/Dec not set");
            record.position = None;
            record.mission = Mission::Unknown;
        }
    }

    if layout.synthesize_status {
        record.status_bits =
            swift::synthesize_status(options.swift_accept_mask, fields.misc.unwrap_or(0));
        debug!("Synthesized status: {:#x}", record.status_bits);
    } else if let Some(status) = fields.soln_status {
        record.status_bits = status;
    }

    if fields.merit_words > 0 {
        let params = swift::unpack_merit(fields.merit);
        let verdict = MeritVerdict::from_param(params[0]);
        debug!("Merit params: {:?} ({:?})", params, verdict);
        record.has_merit = verdict.has_merit();
    }

    if fields.test_flagged {
        debug!("Test Notice - Not a real event.");
        record.is_test = true;
        record.mission = Mission::Unknown;
    }

    record
}
