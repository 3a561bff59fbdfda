// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per notice type payload layouts.
//!
//! Each decodable notice type maps to a [`Layout`]: the mission it reports,
//! how its position epoch is chosen, and a table of [`FieldSpec`]s naming
//! which payload word feeds which part of the record. The decoder walks the
//! table; nothing here touches I/O.
//!
//! Words 0 to 3 (type, serial number, hop count, packet SOD) and word 39
//! (terminator) are common to every notice and are not listed.

use crate::record::Mission;

/// Unit of a transmitted error radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorUnit {
    Arcsec,
    /// Degrees x 10000.
    DegTenThousandths,
    Arcmin,
}

impl ErrorUnit {
    /// Convert a raw word to arc-minutes.
    pub fn to_arcmin(self, raw: i32) -> f64 {
        let raw = f64::from(raw);
        match self {
            ErrorUnit::Arcsec => raw / 60.0,
            ErrorUnit::DegTenThousandths => raw * 60.0 / 10_000.0,
            ErrorUnit::Arcmin => raw,
        }
    }

    /// Convert arc-minutes to the raw word, rounding to the unit's precision.
    pub fn from_arcmin(self, arcmin: f64) -> i32 {
        let raw = match self {
            ErrorUnit::Arcsec => arcmin * 60.0,
            ErrorUnit::DegTenThousandths => arcmin * 10_000.0 / 60.0,
            ErrorUnit::Arcmin => arcmin,
        };
        raw.round() as i32
    }
}

/// HETE sub-instrument carrying its own error box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instrument {
    Wxm,
    Sxc,
}

/// What a payload word contributes to the record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Trigger number in the low `trigger_bits`, sequence number above it.
    TrigSeq { trigger_bits: u32 },
    BurstTjd,
    /// Centiseconds of day.
    BurstSod,
    /// Right ascension, degrees x 10000.
    Ra,
    /// Declination, degrees x 10000.
    Dec,
    ErrorRadius(ErrorUnit),
    /// Error box maximum dimension (diameter, arcsec) in the upper 16 bits.
    BoxDiameter(Instrument),
    /// HETE validity flags.
    Validity,
    /// Notice is a test when any of these bits is set.
    TestFlag(u32),
    /// SWIFT BAT solution status.
    SolnStatus,
    /// SWIFT misc bit-field.
    SwiftMisc,
    /// SWIFT merit parameters, four signed bytes per word, most significant first.
    Merit,
    /// Four 8-bit energy band counts.
    EnergyBands,
    /// Logged only, scaled by `scale`.
    Logged { scale: f64, unit: &'static str },
    /// Logged only, as hex.
    LoggedHex,
}

/// One table row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub word: usize,
    pub name: &'static str,
    pub kind: FieldKind,
}

/// How the position epoch is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochRule {
    J2000,
    /// Apparent coordinates, epoch of the burst time.
    BurstDate,
}

/// Layout of one notice type.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// Mission to report; `Unknown` for log-only and test types.
    pub mission: Mission,
    pub epoch: EpochRule,
    /// The type itself is a designated test notice.
    pub test_type: bool,
    /// No native status word; synthesize one from the accept mask and misc bits.
    pub synthesize_status: bool,
    pub fields: &'static [FieldSpec],
}

impl Layout {
    /// The row for `word`, if listed.
    pub fn field(&self, word: usize) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.word == word)
    }
}

const fn f(word: usize, name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { word, name, kind }
}

const fn logged(word: usize, name: &'static str, scale: f64, unit: &'static str) -> FieldSpec {
    f(word, name, FieldKind::Logged { scale, unit })
}

const fn hex(word: usize, name: &'static str) -> FieldSpec {
    f(word, name, FieldKind::LoggedHex)
}

const DEG: f64 = 1.0 / 10_000.0;

static HETE_POSITION: &[FieldSpec] = &[
    f(4, "trig_seq_num", FieldKind::TrigSeq { trigger_bits: 16 }),
    f(5, "burst_tjd", FieldKind::BurstTjd),
    f(6, "burst_sod", FieldKind::BurstSod),
    f(7, "burst_ra", FieldKind::Ra),
    f(8, "burst_dec", FieldKind::Dec),
    hex(9, "trig_flags"),
    logged(10, "gamma_cnts", 1.0, "cnts/s"),
    logged(11, "wxm_s_n", 1.0, "S/N"),
    logged(12, "sxc_cnts", 1.0, "cnts/s"),
    logged(13, "gamma_time", 1.0, "ms"),
    logged(14, "wxm_time", 1.0, "ms"),
    hex(15, "sc_pointing"),
    logged(16, "wxm_cnr1_ra", DEG, "deg"),
    logged(17, "wxm_cnr1_dec", DEG, "deg"),
    logged(18, "wxm_cnr2_ra", DEG, "deg"),
    logged(19, "wxm_cnr2_dec", DEG, "deg"),
    logged(20, "wxm_cnr3_ra", DEG, "deg"),
    logged(21, "wxm_cnr3_dec", DEG, "deg"),
    logged(22, "wxm_cnr4_ra", DEG, "deg"),
    logged(23, "wxm_cnr4_dec", DEG, "deg"),
    hex(24, "wxm_errors"),
    f(25, "wxm_dim_nsig", FieldKind::BoxDiameter(Instrument::Wxm)),
    logged(26, "sxc_cnr1_ra", DEG, "deg"),
    logged(27, "sxc_cnr1_dec", DEG, "deg"),
    logged(28, "sxc_cnr2_ra", DEG, "deg"),
    logged(29, "sxc_cnr2_dec", DEG, "deg"),
    logged(30, "sxc_cnr3_ra", DEG, "deg"),
    logged(31, "sxc_cnr3_dec", DEG, "deg"),
    logged(32, "sxc_cnr4_ra", DEG, "deg"),
    logged(33, "sxc_cnr4_dec", DEG, "deg"),
    hex(34, "sxc_errors"),
    f(35, "sxc_dim_nsig", FieldKind::BoxDiameter(Instrument::Sxc)),
    hex(36, "pos_flags"),
    f(37, "validity", FieldKind::Validity),
];

static HETE_ALERT: &[FieldSpec] = &[
    f(4, "trig_seq_num", FieldKind::TrigSeq { trigger_bits: 16 }),
    f(5, "burst_tjd", FieldKind::BurstTjd),
    f(6, "burst_sod", FieldKind::BurstSod),
    hex(9, "trig_flags"),
    logged(10, "gamma_cnts", 1.0, "cnts/s"),
    logged(11, "wxm_s_n", 1.0, "S/N"),
    logged(12, "sxc_cnts", 1.0, "cnts/s"),
    logged(13, "gamma_time", 1.0, "ms"),
    logged(14, "wxm_time", 1.0, "ms"),
    hex(15, "sc_pointing"),
];

static SAX_WFC: &[FieldSpec] = &[
    f(5, "burst_tjd", FieldKind::BurstTjd),
    f(6, "burst_sod", FieldKind::BurstSod),
    logged(7, "burst_ra", DEG, "deg"),
    logged(8, "burst_dec", DEG, "deg"),
    logged(9, "burst_inten", 1.0, "mCrab"),
    logged(11, "burst_error", DEG, "deg"),
    logged(12, "burst_conf", 1.0, "%"),
    hex(18, "trig_id"),
];

static INTEGRAL_POSITION: &[FieldSpec] = &[
    f(4, "trig_seq_num", FieldKind::TrigSeq { trigger_bits: 16 }),
    f(5, "burst_tjd", FieldKind::BurstTjd),
    f(6, "burst_sod", FieldKind::BurstSod),
    f(7, "burst_ra", FieldKind::Ra),
    f(8, "burst_dec", FieldKind::Dec),
    hex(9, "det_flags"),
    logged(10, "intensity_sigma", 0.01, "sigma"),
    f(11, "burst_error", FieldKind::ErrorRadius(ErrorUnit::Arcsec)),
    f(12, "test_mpos", FieldKind::TestFlag(1 << 31)),
];

static INTEGRAL_POINTDIR: &[FieldSpec] = &[
    logged(5, "slew_tjd", 1.0, "TJD"),
    logged(6, "slew_sod", 0.01, "s"),
    hex(12, "test_flags"),
    logged(14, "next_ra", DEG, "deg"),
    logged(15, "next_dec", DEG, "deg"),
    hex(19, "status"),
];

static SWIFT_BAT_ALERT: &[FieldSpec] = &[
    f(4, "trig_seq_num", FieldKind::TrigSeq { trigger_bits: 16 }),
    f(5, "burst_tjd", FieldKind::BurstTjd),
    f(6, "burst_sod", FieldKind::BurstSod),
];

static SWIFT_BAT_POSITION: &[FieldSpec] = &[
    f(4, "trig_seq_num", FieldKind::TrigSeq { trigger_bits: 24 }),
    f(5, "burst_tjd", FieldKind::BurstTjd),
    f(6, "burst_sod", FieldKind::BurstSod),
    f(7, "burst_ra", FieldKind::Ra),
    f(8, "burst_dec", FieldKind::Dec),
    logged(9, "burst_flue", 1.0, "cnts"),
    logged(10, "burst_ipeak", 1.0, "cnts"),
    f(11, "burst_error", FieldKind::ErrorRadius(ErrorUnit::DegTenThousandths)),
    logged(12, "phi", 0.01, "deg"),
    logged(13, "theta", 0.01, "deg"),
    logged(14, "integ_time", 0.004, "s"),
    f(18, "soln_status", FieldKind::SolnStatus),
    f(19, "misc", FieldKind::SwiftMisc),
    logged(20, "image_signif", 0.01, "sigma"),
    logged(21, "rate_signif", 0.01, "sigma"),
    f(36, "merit_0_3", FieldKind::Merit),
    f(37, "merit_4_7", FieldKind::Merit),
    f(38, "merit_8_9", FieldKind::Merit),
];

static SWIFT_XRT_POSITION: &[FieldSpec] = &[
    f(4, "trig_seq_num", FieldKind::TrigSeq { trigger_bits: 24 }),
    f(5, "burst_tjd", FieldKind::BurstTjd),
    f(6, "burst_sod", FieldKind::BurstSod),
    f(7, "burst_ra", FieldKind::Ra),
    f(8, "burst_dec", FieldKind::Dec),
    logged(9, "burst_flux", 1.0, "cnts"),
    f(11, "burst_error", FieldKind::ErrorRadius(ErrorUnit::DegTenThousandths)),
    f(19, "misc", FieldKind::SwiftMisc),
];

static SWIFT_UVOT_POSITION: &[FieldSpec] = &[
    f(4, "trig_obs_num", FieldKind::TrigSeq { trigger_bits: 16 }),
    f(5, "burst_tjd", FieldKind::BurstTjd),
    f(6, "burst_sod", FieldKind::BurstSod),
    f(7, "burst_ra", FieldKind::Ra),
    f(8, "burst_dec", FieldKind::Dec),
    logged(9, "burst_mag", 0.01, "mag"),
    logged(10, "filter", 1.0, ""),
    f(11, "burst_error", FieldKind::ErrorRadius(ErrorUnit::DegTenThousandths)),
    f(19, "misc", FieldKind::SwiftMisc),
];

static AGILE_POSITION: &[FieldSpec] = &[
    f(4, "trig_seq_num", FieldKind::TrigSeq { trigger_bits: 16 }),
    f(5, "burst_tjd", FieldKind::BurstTjd),
    f(6, "burst_sod", FieldKind::BurstSod),
    f(7, "burst_ra", FieldKind::Ra),
    f(8, "burst_dec", FieldKind::Dec),
    logged(9, "burst_flue", 1.0, "cnts"),
    logged(10, "burst_ipeak", 1.0, "cnts"),
    f(11, "burst_error", FieldKind::ErrorRadius(ErrorUnit::DegTenThousandths)),
    f(18, "trig_id", FieldKind::TestFlag(1 << 1)),
    hex(19, "misc"),
];

static AGILE_POINTDIR: &[FieldSpec] = &[
    f(4, "trig_seq_num", FieldKind::TrigSeq { trigger_bits: 16 }),
    logged(5, "slew_tjd", 1.0, "TJD"),
    logged(6, "slew_sod", 0.01, "s"),
    logged(7, "point_ra", DEG, "deg"),
    logged(8, "point_dec", DEG, "deg"),
];

static FERMI_POSITION: &[FieldSpec] = &[
    f(4, "trig_seq_num", FieldKind::TrigSeq { trigger_bits: 24 }),
    f(5, "burst_tjd", FieldKind::BurstTjd),
    f(6, "burst_sod", FieldKind::BurstSod),
    f(7, "burst_ra", FieldKind::Ra),
    f(8, "burst_dec", FieldKind::Dec),
    logged(9, "burst_inten", 1.0, "cnts"),
    f(10, "energy_bands", FieldKind::EnergyBands),
    f(11, "burst_error", FieldKind::ErrorRadius(ErrorUnit::DegTenThousandths)),
    logged(12, "phi", 0.01, "deg"),
    logged(13, "theta", 0.01, "deg"),
    f(18, "trig_id", FieldKind::TestFlag(1 << 1)),
    hex(19, "misc"),
];

static SWIFT_NO_POSITION: &[FieldSpec] = &[
    f(4, "trig_seq_num", FieldKind::TrigSeq { trigger_bits: 24 }),
    f(5, "burst_tjd", FieldKind::BurstTjd),
    f(6, "burst_sod", FieldKind::BurstSod),
];

const fn layout(mission: Mission, epoch: EpochRule, fields: &'static [FieldSpec]) -> Layout {
    Layout {
        mission,
        epoch,
        test_type: false,
        synthesize_status: false,
        fields,
    }
}

static HETE: Layout = layout(Mission::Hete, EpochRule::BurstDate, HETE_POSITION);
static HETE_ALERT_LOG: Layout = layout(Mission::Unknown, EpochRule::BurstDate, HETE_ALERT);
static SAX: Layout = layout(Mission::Unknown, EpochRule::J2000, SAX_WFC);
static INTEGRAL: Layout = layout(Mission::Integral, EpochRule::BurstDate, INTEGRAL_POSITION);
static INTEGRAL_POINTING: Layout = layout(Mission::Unknown, EpochRule::J2000, INTEGRAL_POINTDIR);
static SWIFT_ALERT: Layout = layout(Mission::Unknown, EpochRule::J2000, SWIFT_BAT_ALERT);
static SWIFT_BAT: Layout = layout(Mission::Swift, EpochRule::J2000, SWIFT_BAT_POSITION);
static SWIFT_LOG: Layout = layout(Mission::Unknown, EpochRule::J2000, SWIFT_NO_POSITION);
static SWIFT_BAT_TEST: Layout = Layout {
    test_type: true,
    ..layout(Mission::Unknown, EpochRule::J2000, SWIFT_BAT_POSITION)
};
static SWIFT_XRT: Layout = Layout {
    synthesize_status: true,
    ..layout(Mission::Swift, EpochRule::J2000, SWIFT_XRT_POSITION)
};
static SWIFT_UVOT: Layout = Layout {
    synthesize_status: true,
    ..layout(Mission::Swift, EpochRule::J2000, SWIFT_UVOT_POSITION)
};
static AGILE: Layout = layout(Mission::Agile, EpochRule::J2000, AGILE_POSITION);
static AGILE_POINTING: Layout = layout(Mission::Unknown, EpochRule::J2000, AGILE_POINTDIR);
static FERMI: Layout = layout(Mission::Fermi, EpochRule::J2000, FERMI_POSITION);
static FERMI_TEST: Layout = Layout {
    test_type: true,
    ..layout(Mission::Unknown, EpochRule::J2000, FERMI_POSITION)
};

/// Layout for a notice type code, `None` when the type carries nothing to decode.
pub fn layout_for(code: u32) -> Option<&'static Layout> {
    let layout = match code {
        34 => &SAX,
        40 => &HETE_ALERT_LOG,
        41 | 43 => &HETE,
        51 => &INTEGRAL_POINTING,
        53..=55 => &INTEGRAL,
        60 => &SWIFT_ALERT,
        61 => &SWIFT_BAT,
        62 | 65 | 66 | 71 => &SWIFT_LOG,
        67 => &SWIFT_XRT,
        81 => &SWIFT_UVOT,
        82 => &SWIFT_BAT_TEST,
        100 => &AGILE,
        109 => &AGILE_POINTING,
        121 | 127 => &FERMI,
        124 => &FERMI_TEST,
        _ => return None,
    };
    Some(layout)
}
