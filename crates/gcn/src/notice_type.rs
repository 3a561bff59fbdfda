// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Notice type codes carried in word 0.

use std::fmt;

macro_rules! notice_types {
    ($($variant:ident = $code:literal => $label:literal,)*) => {
        /// Notice type code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NoticeType {
            $($variant,)*
            /// Any code without a catalogued label.
            Other(u32),
        }

        impl NoticeType {
            pub fn from_code(code: u32) -> Self {
                match code {
                    $($code => NoticeType::$variant,)*
                    other => NoticeType::Other(other),
                }
            }

            pub fn code(self) -> u32 {
                match self {
                    $(NoticeType::$variant => $code,)*
                    NoticeType::Other(code) => code,
                }
            }

            /// Catalogue label, `None` for [`NoticeType::Other`].
            pub fn label(self) -> Option<&'static str> {
                match self {
                    $(NoticeType::$variant => Some($label),)*
                    NoticeType::Other(_) => None,
                }
            }
        }
    };
}

notice_types! {
    Imalive = 3 => "IMALIVE",
    Kill = 4 => "KILL",
    SaxWfcGrbPos = 34 => "SAX/WFC_GRB_POS",
    HeteAlert = 40 => "HETE_ALERT",
    HeteUpdate = 41 => "HETE_UPDATE",
    HeteGndAna = 43 => "HETE_GNDANA",
    IntegralPointdir = 51 => "INTEGRAL_POINTDIR",
    IntegralSpiacs = 52 => "INTEGRAL_SPIACS",
    IntegralWakeup = 53 => "INTEGRAL_WAKEUP",
    IntegralRefined = 54 => "INTEGRAL_REFINED",
    IntegralOffline = 55 => "INTEGRAL_OFFLINE",
    SwiftBatGrbAlert = 60 => "SWIFT_BAT_GRB_ALERT",
    SwiftBatGrbPosition = 61 => "SWIFT_BAT_GRB_POSITION",
    SwiftBatGrbNackPosition = 62 => "SWIFT_BAT_GRB_NACK_POSITION",
    SwiftBatGrbLc = 63 => "SWIFT_BAT_GRB_LC",
    SwiftBatScaledMap = 64 => "SWIFT_BAT_SCALEDMAP",
    SwiftFomObs = 65 => "SWIFT_FOM_OBS",
    SwiftScSlew = 66 => "SWIFT_SC_SLEW",
    SwiftXrtPosition = 67 => "SWIFT_XRT_POSITION",
    SwiftXrtSpectrum = 68 => "SWIFT_XRT_SPECTRUM",
    SwiftXrtImage = 69 => "SWIFT_XRT_IMAGE",
    SwiftXrtLc = 70 => "SWIFT_XRT_LC",
    SwiftXrtNackPosition = 71 => "SWIFT_XRT_NACK_POSITION",
    SwiftUvotDburst = 72 => "SWIFT_UVOT_DBURST",
    SwiftUvotFchart = 73 => "SWIFT_UVOT_FCHART",
    SwiftBatGrbLcProc = 76 => "SWIFT_BAT_GRB_LC_PROC",
    SwiftXrtSpectrumProc = 77 => "SWIFT_XRT_SPECTRUM_PROC",
    SwiftXrtImageProc = 78 => "SWIFT_XRT_IMAGE_PROC",
    SwiftUvotDburstProc = 79 => "SWIFT_UVOT_DBURST_PROC",
    SwiftUvotFchartProc = 80 => "SWIFT_UVOT_FCHART_PROC",
    SwiftUvotPosition = 81 => "SWIFT_UVOT_POSITION",
    SwiftBatGrbPosTest = 82 => "SWIFT_BAT_GRB_POS_TEST",
    AgileGrbWakeup = 100 => "AGILE_GRB_WAKEUP",
    AgilePointdir = 109 => "AGILE_POINTDIR",
    FermiLatPosUpd = 121 => "FERMI_LAT_POS_UPD",
    FermiLatPosTest = 124 => "FERMI_LAT_POS_TEST",
    FermiLatGnd = 127 => "FERMI_LAT_GND",
}

impl fmt::Display for NoticeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "TYPE-{}", self.code()),
        }
    }
}

impl From<u32> for NoticeType {
    fn from(code: u32) -> Self {
        Self::from_code(code)
    }
}
