// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::cast_sign_loss)]

//! Decoder fixtures: hand-built packets for each mission layout.

use chrono::{TimeZone, Utc};
use gcn::swift::soln;
use gcn::time::decimal_year;
use gcn::{decode, encode, DecodeOptions, Mission, Words, PACKET_WORDS};

const TJD_2005_05_09: u32 = 12640 + 365 + 366 + 128;

fn options() -> DecodeOptions {
    DecodeOptions {
        swift_accept_mask: 0x2,
        received_at: Utc.with_ymd_and_hms(2005, 5, 9, 4, 0, 0).unwrap(),
    }
}

fn build(code: u32, set: &[(usize, u32)]) -> Vec<u8> {
    let mut words = [0u32; PACKET_WORDS];
    words[0] = code;
    words[1] = 4711;
    words[2] = 1;
    words[3] = 1_440_000;
    words[PACKET_WORDS - 1] = 0x0A00_0000;
    for (index, value) in set {
        words[*index] = *value;
    }
    Words::from_array(words).to_bytes().to_vec()
}

fn deg(value: f64) -> u32 {
    (value * 10_000.0).round() as i32 as u32
}

#[test]
fn swift_bat_position() {
    // RA 10:00:00 (150 deg), Dec +20:00:00, error 0.05 deg
    let buf = build(
        61,
        &[
            (4, (3 << 24) | 114_299),
            (5, TJD_2005_05_09),
            (6, 360_000),
            (7, deg(150.0)),
            (8, deg(20.0)),
            (11, 500),
            (18, soln::POINT_SOURCE | soln::GRB),
            (36, 0x0100_0000),
        ],
    );
    let record = decode(&buf, &options()).unwrap();

    assert_eq!(record.mission, Mission::Swift);
    assert_eq!(record.notice_type, 61);
    assert_eq!(record.trigger_number, 114_299);
    assert_eq!(record.sequence_number, 3);
    assert_eq!(record.epoch, 2000.0);
    assert_eq!(record.error_radius_arcmin, 3.0);
    assert_eq!(record.status_bits, 0x3);
    assert!(record.has_merit);
    assert!(!record.is_test);
    assert_eq!(
        record.burst_time,
        Some(Utc.with_ymd_and_hms(2005, 5, 9, 1, 0, 0).unwrap())
    );
    assert_eq!(record.notice_time, options().received_at);

    let position = record.position.unwrap();
    assert_eq!(position.ra.to_string(), "10:00:00.00");
    assert_eq!(position.dec.to_string(), "+20:00:00.00");
}

#[test]
fn swift_bat_error_word_scale() {
    let buf = build(61, &[(7, deg(150.0)), (8, deg(20.0)), (11, 240_000)]);
    let record = decode(&buf, &options()).unwrap();
    // 24 degrees
    assert_eq!(record.error_radius_arcmin, 1440.0);
}

#[test]
fn angle_precision_within_fixed_point() {
    for (ra, dec) in [(0.0001, -89.9999), (359.9999, 0.0), (123.4567, -45.6789)] {
        let buf = build(61, &[(7, deg(ra)), (8, deg(dec))]);
        let record = decode(&buf, &options()).unwrap();
        let position = record.position.unwrap();
        assert!((position.ra.degrees() - ra).abs() < 1e-4);
        assert!((position.dec.degrees() - dec).abs() < 1e-4);
    }
}

#[test]
fn swift_bat_sequence_uses_unsigned_shift() {
    let buf = build(61, &[(4, 0xFF00_0001), (7, 1), (8, 1)]);
    let record = decode(&buf, &options()).unwrap();
    assert_eq!(record.trigger_number, 1);
    assert_eq!(record.sequence_number, 255);
}

#[test]
fn swift_bat_test_type_never_deliverable() {
    let buf = build(82, &[(7, deg(150.0)), (8, deg(20.0)), (11, 500)]);
    let record = decode(&buf, &options()).unwrap();
    assert_eq!(record.mission, Mission::Unknown);
    assert!(record.is_test);
    assert!(record.position.is_some());
}

#[test]
fn swift_uvot_packing_and_status() {
    let buf = build(
        81,
        &[
            (4, (2 << 16) | 7),
            (7, deg(10.0)),
            (8, deg(-10.0)),
            (9, 1850),
            (11, 5),
        ],
    );
    let record = decode(&buf, &options()).unwrap();
    assert_eq!(record.mission, Mission::Swift);
    assert_eq!(record.trigger_number, 7);
    assert_eq!(record.sequence_number, 2);
    assert_eq!(record.status_bits, options().swift_accept_mask);
    assert!((record.error_radius_arcmin - 0.03).abs() < 1e-12);
}

#[test]
fn hete_update_uses_smallest_box() {
    let buf = build(
        41,
        &[
            (4, (1 << 16) | 3456),
            (5, TJD_2005_05_09),
            (6, 0),
            (7, deg(200.0)),
            (8, deg(-5.0)),
            (25, 1200 << 16),
            (35, (240 << 16) | 9),
            (37, 0x1),
        ],
    );
    let record = decode(&buf, &options()).unwrap();
    assert_eq!(record.mission, Mission::Hete);
    assert_eq!(record.trigger_number, 3456);
    assert_eq!(record.sequence_number, 1);
    assert_eq!(record.error_radius_arcmin, 2.0);

    let burst = Utc.with_ymd_and_hms(2005, 5, 9, 0, 0, 0).unwrap();
    assert_eq!(record.burst_time, Some(burst));
    assert_eq!(record.epoch, decimal_year(&burst));
}

#[test]
fn hete_burst_invalid_forces_unknown() {
    let buf = build(41, &[(7, deg(200.0)), (8, deg(-5.0)), (37, 0x2)]);
    let record = decode(&buf, &options()).unwrap();
    assert_eq!(record.mission, Mission::Unknown);
    assert!(record.position.is_none());
}

#[test]
fn hete_missing_position_sentinel() {
    let sentinel = (-9_999_999i32) as u32;
    let buf = build(43, &[(7, sentinel), (8, sentinel)]);
    let record = decode(&buf, &options()).unwrap();
    assert_eq!(record.mission, Mission::Unknown);
    assert!(record.position.is_none());
}

#[test]
fn integral_refined() {
    let buf = build(
        54,
        &[
            (4, (4 << 16) | 2345),
            (5, TJD_2005_05_09),
            (6, 8_640_000 / 2),
            (7, deg(83.625)),
            (8, deg(22.0144)),
            (10, 850),
            (11, 180),
        ],
    );
    let record = decode(&buf, &options()).unwrap();
    assert_eq!(record.mission, Mission::Integral);
    assert_eq!(record.trigger_number, 2345);
    assert_eq!(record.sequence_number, 4);
    assert_eq!(record.error_radius_arcmin, 3.0);
    assert!(record.epoch > 2005.35 && record.epoch < 2005.36);
}

#[test]
fn integral_test_notice_forces_unknown() {
    let buf = build(53, &[(7, deg(83.6)), (8, deg(22.0)), (12, 1 << 31)]);
    let record = decode(&buf, &options()).unwrap();
    assert_eq!(record.mission, Mission::Unknown);
    assert!(record.is_test);
}

#[test]
fn fermi_position() {
    let buf = build(
        121,
        &[
            (4, (1 << 24) | 0x00AB_CDEF),
            (7, deg(45.0)),
            (8, deg(45.0)),
            (10, 0xFF01_0203),
            (11, 1000),
        ],
    );
    let record = decode(&buf, &options()).unwrap();
    assert_eq!(record.mission, Mission::Fermi);
    assert_eq!(record.trigger_number, 0x00AB_CDEF);
    assert_eq!(record.sequence_number, 1);
    assert_eq!(record.epoch, 2000.0);
    assert_eq!(record.error_radius_arcmin, 6.0);
}

#[test]
fn fermi_flagged_test_and_test_type() {
    let flagged = build(127, &[(7, deg(45.0)), (8, deg(45.0)), (18, 0x2)]);
    let record = decode(&flagged, &options()).unwrap();
    assert_eq!(record.mission, Mission::Unknown);
    assert!(record.is_test);

    let test_type = build(124, &[(7, deg(45.0)), (8, deg(45.0))]);
    let record = decode(&test_type, &options()).unwrap();
    assert_eq!(record.mission, Mission::Unknown);
    assert!(record.is_test);
}

#[test]
fn agile_position() {
    let buf = build(100, &[(4, (1 << 16) | 42), (7, deg(300.0)), (8, deg(60.0)), (11, 2000)]);
    let record = decode(&buf, &options()).unwrap();
    assert_eq!(record.mission, Mission::Agile);
    assert_eq!(record.trigger_number, 42);
    assert_eq!(record.error_radius_arcmin, 12.0);
}

#[test]
fn log_only_types_have_no_mission() {
    for code in [34, 40, 51, 60, 62, 65, 66, 71, 109] {
        let buf = build(code, &[(7, deg(10.0)), (8, deg(10.0))]);
        let record = decode(&buf, &options()).unwrap();
        assert_eq!(record.mission, Mission::Unknown, "type {}", code);
    }
}

#[test]
fn decoding_is_idempotent() {
    let buf = build(61, &[(4, 5), (7, deg(1.0)), (8, deg(2.0)), (11, 77), (18, 0x13)]);
    let first = decode(&buf, &options()).unwrap();
    let second = decode(&buf, &options()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn previous_packet_never_leaks() {
    let swift = build(61, &[(7, deg(1.0)), (8, deg(2.0)), (11, 77), (18, 0x13)]);
    let imalive = build(3, &[]);
    let _ = decode(&swift, &options()).unwrap();
    let record = decode(&imalive, &options()).unwrap();
    assert!(record.position.is_none());
    assert_eq!(record.status_bits, 0);
    assert_eq!(record.error_radius_arcmin, 0.0);
}

#[test]
fn encoding_a_decoded_record_restores_its_fields() {
    let cases: [(u32, Vec<(usize, u32)>); 7] = [
        (
            41,
            vec![
                (4, (2 << 16) | 3_051),
                (5, TJD_2005_05_09),
                (6, 4_501_525),
                (7, deg(210.5)),
                (8, deg(-45.25)),
                (25, 240 << 16),
            ],
        ),
        (
            54,
            vec![
                (4, (1 << 16) | 2_500),
                (5, TJD_2005_05_09),
                (6, 12_345),
                (7, deg(83.6331)),
                (8, deg(22.0145)),
                (11, 180),
            ],
        ),
        (
            61,
            vec![
                (4, (3 << 24) | 114_299),
                (5, TJD_2005_05_09),
                (6, 360_000),
                (7, deg(150.0)),
                (8, deg(-20.0)),
                (11, 500),
                (18, soln::POINT_SOURCE | soln::GRB | soln::INTERESTING),
                (36, 0x0100_0000),
            ],
        ),
        (
            67,
            vec![
                (4, (1 << 24) | 114_299),
                (5, TJD_2005_05_09),
                (6, 360_500),
                (7, deg(150.0123)),
                (8, deg(-20.0456)),
                (11, 10),
            ],
        ),
        (
            81,
            vec![
                (4, (7 << 16) | 42),
                (5, TJD_2005_05_09),
                (6, 361_000),
                (7, deg(0.5)),
                (8, deg(89.9)),
                (11, 3),
            ],
        ),
        (
            100,
            vec![
                (4, 77),
                (5, TJD_2005_05_09),
                (6, 1),
                (7, deg(359.9999)),
                (8, deg(0.0)),
                (11, 1_000),
            ],
        ),
        (
            121,
            vec![
                (4, 9_001),
                (5, TJD_2005_05_09),
                (6, 8_640_000 - 1),
                (7, deg(12.0)),
                (8, deg(-89.0)),
                (11, 2_000),
                (18, 1 << 1),
            ],
        ),
    ];

    for (code, set) in cases {
        let buf = build(code, &set);
        let record = decode(&buf, &options()).unwrap();
        let original = Words::read(&buf).unwrap();
        let encoded = encode(&record);

        assert_eq!(encoded.word(0), code);
        for index in 4..PACKET_WORDS - 1 {
            assert_eq!(
                encoded.word(index),
                original.word(index),
                "type {} word {}",
                code,
                index
            );
        }

        let again = decode(&encoded.to_bytes(), &options()).unwrap();
        assert_eq!(again, record, "type {}", code);
    }
}
