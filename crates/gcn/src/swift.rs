// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SWIFT BAT solution status, misc bits and merit parameters.

/// Solution status bits (BAT position word 18).
pub mod soln {
    pub const POINT_SOURCE: u32 = 1 << 0;
    pub const GRB: u32 = 1 << 1;
    pub const INTERESTING: u32 = 1 << 2;
    pub const FLIGHT_CATALOGUE: u32 = 1 << 3;
    /// Image trigger when set, rate trigger when clear.
    pub const IMAGE_TRIGGER: u32 = 1 << 4;
    pub const DEF_NOT_GRB: u32 = 1 << 5;
    pub const PROB_NOT_GRB_HIGH_BACKGROUND: u32 = 1 << 6;
    pub const PROB_NOT_GRB_LOW_SIGNIFICANCE: u32 = 1 << 7;
    pub const GROUND_CATALOGUE: u32 = 1 << 8;
    pub const XRAY_BURSTER: u32 = 1 << 9;
    /// Documented inconsistently: one revision of the notice format reads it
    /// as "X-ray burster", another as "StarTracker not locked".
    pub const BIT_10: u32 = 1 << 10;
}

/// Log descriptions for each set solution status bit.
pub fn describe_soln_status(status: u32) -> Vec<&'static str> {
    const TABLE: [(u32, &str); 10] = [
        (soln::POINT_SOURCE, "A point source was found."),
        (soln::GRB, "It is a GRB."),
        (soln::INTERESTING, "It is an interesting source."),
        (soln::FLIGHT_CATALOGUE, "It is a flight catalogue source."),
        (soln::DEF_NOT_GRB, "It is definitely not a GRB (ground-processing assigned)."),
        (
            soln::PROB_NOT_GRB_HIGH_BACKGROUND,
            "It is probably not a GRB (high background level).",
        ),
        (
            soln::PROB_NOT_GRB_LOW_SIGNIFICANCE,
            "It is probably not a GRB (low image significance).",
        ),
        (soln::GROUND_CATALOGUE, "It is a ground catalogue source."),
        (soln::XRAY_BURSTER, "It is an X-ray burster (automated ground assignment)."),
        (
            soln::BIT_10,
            "Bit 10 set (X-ray burster or StarTracker not locked, depending on format revision).",
        ),
    ];

    let mut lines: Vec<&'static str> = TABLE
        .iter()
        .filter(|(bit, _)| status & bit != 0)
        .map(|(_, text)| *text)
        .collect();
    lines.push(if status & soln::IMAGE_TRIGGER != 0 {
        "It is an image trigger."
    } else {
        "It is a rate trigger."
    });
    lines
}

/// Misc bits (word 19) of the XRT and UVOT position notices that carry a
/// solution status meaning, paired with the status bit they map to.
pub const MISC_TO_SOLN: [(u32, u32); 2] = [
    (1 << 11, soln::BIT_10),
    (1 << 12, soln::GROUND_CATALOGUE),
];

/// Translate misc bits into solution status bits.
pub fn translate_misc(misc: u32) -> u32 {
    MISC_TO_SOLN
        .iter()
        .filter(|(misc_bit, _)| misc & misc_bit != 0)
        .fold(0, |acc, (_, soln_bit)| acc | soln_bit)
}

/// Status word for a sub-instrument notice with no native status: the accept
/// mask, so uniform mask filtering passes, plus whatever the misc bits say.
pub fn synthesize_status(accept_mask: u32, misc: u32) -> u32 {
    accept_mask | translate_misc(misc)
}

/// Number of merit parameters carried by a BAT position notice.
pub const MERIT_PARAMS: usize = 10;

/// Unpack the merit parameters from words 36 to 38.
///
/// Each word holds four signed bytes, most significant first; the last two
/// bytes of the third word are spare.
pub fn unpack_merit(words: [u32; 3]) -> [i8; MERIT_PARAMS] {
    let mut params = [0i8; MERIT_PARAMS];
    let bytes = words.iter().flat_map(|w| w.to_be_bytes());
    for (slot, byte) in params.iter_mut().zip(bytes) {
        *slot = byte as i8;
    }
    params
}

/// Verdict of merit parameter 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeritVerdict {
    Grb,
    NotGrb,
    Undecided(i8),
}

impl MeritVerdict {
    pub fn from_param(param0: i8) -> Self {
        match param0 {
            1 => MeritVerdict::Grb,
            0 => MeritVerdict::NotGrb,
            other => MeritVerdict::Undecided(other),
        }
    }

    /// Only an explicit "not a GRB" clears merit.
    pub fn has_merit(self) -> bool {
        self != MeritVerdict::NotGrb
    }
}
