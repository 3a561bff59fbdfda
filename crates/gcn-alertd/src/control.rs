// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Control protocol.
//!
//! One whitespace-separated command line per connection. Parse failures
//! carry the exact response line sent back to the client.

use chrono::{DateTime, Utc};
use gcn::time::parse_timestamp;
use gcn::{Dec, Mission, NoticeRecord, Position, Ra};
use thiserror::Error;

/// Response block for `help`.
pub const HELP_TEXT: &str = "gcn-alertd Command Server Help:
\tdisable [all|socket|manual|status]
\tenable [all|socket|manual|status]
\tgamma_ray_burst_alert -ra <ra> -dec <dec> -epoch <epoch> -error_box <error_box> -trigger_number <n> -sequence_number <n> -grb_date <date> -notice_date <date> -HETE -SWIFT -INTEGRAL -AGILE -FERMI -test
\thelp
\tquit
\ttest
Dates specified in the form: yyyy-MM-dd'T'HH:mm:ss
-ra specified as HH:MM:SS.ss
-dec specified as [+|-]DD:MM:SS.ss
-error_box specified as a radius in decimal arc-minutes";

const DATE_FORM: &str = "an argument of the form yyyy-MM-dd'T'HH:mm:ss";

/// Target of `enable` / `disable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertScope {
    All,
    Socket,
    Manual,
    Status,
}

impl AlertScope {
    fn parse(verb: &'static str, arg: Option<&str>) -> Result<Self, ControlError> {
        match arg {
            None | Some("all") => Ok(Self::All),
            Some("socket") => Ok(Self::Socket),
            Some("manual") => Ok(Self::Manual),
            Some("status") => Ok(Self::Status),
            Some(_) => Err(ControlError::IllegalScope(verb)),
        }
    }
}

/// A parsed control command.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    Disable(AlertScope),
    Enable(AlertScope),
    GammaRayBurstAlert(ManualAlert),
    Help,
    Quit,
    Test,
}

/// Errors reported back to the control client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("No command specified.")]
    Empty,

    #[error("Unknown command:{0}")]
    UnknownCommand(String),

    #[error("Illegal {0} command : {0} [all|socket|manual|status].")]
    IllegalScope(&'static str),

    #[error("{flag} requires {expects}.")]
    MissingValue {
        flag: &'static str,
        expects: &'static str,
    },

    #[error("Parsing {field}:{value} failed:{reason}.")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Recieved unknown command argument:{0}.")]
    UnknownArgument(String),
}

/// Fields of a `gamma_ray_burst_alert` command, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualAlert {
    pub ra: Option<Ra>,
    pub dec: Option<Dec>,
    pub epoch: f64,
    pub error_box_arcmin: f64,
    pub trigger_number: u32,
    pub sequence_number: u32,
    pub burst_time: Option<DateTime<Utc>>,
    pub notice_time: Option<DateTime<Utc>>,
    pub mission: Mission,
    pub is_test: bool,
}

impl Default for ManualAlert {
    fn default() -> Self {
        Self {
            ra: None,
            dec: None,
            epoch: 2000.0,
            error_box_arcmin: 0.0,
            trigger_number: 0,
            sequence_number: 0,
            burst_time: None,
            notice_time: None,
            mission: Mission::Unknown,
            is_test: false,
        }
    }
}

/// Why a manual alert cannot be launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ManualAlertError {
    #[error("RA was NULL.")]
    MissingRa,

    #[error("Dec was NULL.")]
    MissingDec,

    #[error("No alert type specified.")]
    MissingMission,
}

impl ManualAlert {
    /// Build the notice record, with `now` as the notice time unless one was given.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<NoticeRecord, ManualAlertError> {
        let ra = self.ra.ok_or(ManualAlertError::MissingRa)?;
        let dec = self.dec.ok_or(ManualAlertError::MissingDec)?;
        if !self.mission.is_known() {
            return Err(ManualAlertError::MissingMission);
        }

        let mut record = NoticeRecord::new(self.notice_time.unwrap_or(now));
        record.mission = self.mission;
        record.position = Some(Position { ra, dec });
        record.epoch = self.epoch;
        record.set_error_radius(self.error_box_arcmin);
        record.trigger_number = self.trigger_number;
        record.sequence_number = self.sequence_number;
        record.burst_time = self.burst_time;
        record.is_test = self.is_test;
        Ok(record)
    }
}

/// Parse one control line.
pub fn parse_command(line: &str) -> Result<ControlCommand, ControlError> {
    let mut tokens = line.split_whitespace();
    let command = tokens.next().ok_or(ControlError::Empty)?;

    match command {
        "disable" => Ok(ControlCommand::Disable(AlertScope::parse(
            "disable",
            tokens.next(),
        )?)),
        "enable" => Ok(ControlCommand::Enable(AlertScope::parse(
            "enable",
            tokens.next(),
        )?)),
        "gamma_ray_burst_alert" => Ok(ControlCommand::GammaRayBurstAlert(parse_manual_alert(
            tokens,
        )?)),
        "help" => Ok(ControlCommand::Help),
        "quit" => Ok(ControlCommand::Quit),
        "test" => Ok(ControlCommand::Test),
        other => Err(ControlError::UnknownCommand(other.to_string())),
    }
}

fn parse_manual_alert<'a, I>(mut tokens: I) -> Result<ManualAlert, ControlError>
where
    I: Iterator<Item = &'a str>,
{
    let mut alert = ManualAlert::default();

    while let Some(token) = tokens.next() {
        match token {
            "-ra" => {
                let value = value_for(&mut tokens, "-ra", "a string argument")?;
                alert.ra = Some(parse_field(value, "RA", Ra::parse_colon)?);
            }
            "-dec" => {
                let value = value_for(&mut tokens, "-dec", "a string argument")?;
                alert.dec = Some(parse_field(value, "Dec", Dec::parse_colon)?);
            }
            "-epoch" => {
                let value = value_for(&mut tokens, "-epoch", "a number")?;
                alert.epoch = parse_field(value, "epoch", str::parse::<f64>)?;
            }
            "-error_box" => {
                let value = value_for(&mut tokens, "-error_box", "a number")?;
                alert.error_box_arcmin = parse_field(value, "error box", str::parse::<f64>)?;
            }
            "-trigger_number" => {
                let value = value_for(&mut tokens, "-trigger_number", "a number")?;
                alert.trigger_number = parse_field(value, "trigger number", str::parse::<u32>)?;
            }
            "-sequence_number" => {
                let value = value_for(&mut tokens, "-sequence_number", "a number")?;
                alert.sequence_number =
                    parse_field(value, "sequence number", str::parse::<u32>)?;
            }
            "-grb_date" => {
                let value = value_for(&mut tokens, "-grb_date", DATE_FORM)?;
                alert.burst_time = Some(parse_field(value, "GRB date", parse_timestamp)?);
            }
            "-notice_date" => {
                let value = value_for(&mut tokens, "-notice_date", DATE_FORM)?;
                alert.notice_time = Some(parse_field(value, "notice date", parse_timestamp)?);
            }
            "-test" => alert.is_test = true,
            flag => match mission_flag(flag) {
                Some(mission) => alert.mission = mission,
                None => return Err(ControlError::UnknownArgument(flag.to_string())),
            },
        }
    }

    Ok(alert)
}

/// Mission named by an exact `-SWIFT`-style flag.
fn mission_flag(flag: &str) -> Option<Mission> {
    let name = flag.strip_prefix('-')?;
    Mission::KNOWN.into_iter().find(|m| m.name() == name)
}

fn value_for<'a, I>(
    tokens: &mut I,
    flag: &'static str,
    expects: &'static str,
) -> Result<&'a str, ControlError>
where
    I: Iterator<Item = &'a str>,
{
    tokens
        .next()
        .ok_or(ControlError::MissingValue { flag, expects })
}

fn parse_field<T, E, F>(value: &str, field: &'static str, parse: F) -> Result<T, ControlError>
where
    E: std::fmt::Display,
    F: FnOnce(&str) -> Result<T, E>,
{
    parse(value).map_err(|e| ControlError::InvalidValue {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_command("help"), Ok(ControlCommand::Help));
        assert_eq!(parse_command("quit\r\n"), Ok(ControlCommand::Quit));
        assert_eq!(parse_command("  test  "), Ok(ControlCommand::Test));
        assert_eq!(parse_command(""), Err(ControlError::Empty));
        assert_eq!(
            parse_command("reboot now").unwrap_err().to_string(),
            "Unknown command:reboot"
        );
    }

    #[test]
    fn test_scopes() {
        assert_eq!(
            parse_command("disable"),
            Ok(ControlCommand::Disable(AlertScope::All))
        );
        assert_eq!(
            parse_command("disable socket"),
            Ok(ControlCommand::Disable(AlertScope::Socket))
        );
        assert_eq!(
            parse_command("enable manual"),
            Ok(ControlCommand::Enable(AlertScope::Manual))
        );
        assert_eq!(
            parse_command("enable status"),
            Ok(ControlCommand::Enable(AlertScope::Status))
        );
        assert_eq!(
            parse_command("disable everything").unwrap_err().to_string(),
            "Illegal disable command : disable [all|socket|manual|status]."
        );
        assert_eq!(
            parse_command("enable x").unwrap_err().to_string(),
            "Illegal enable command : enable [all|socket|manual|status]."
        );
    }

    #[test]
    fn test_full_manual_alert() {
        let command = parse_command(
            "gamma_ray_burst_alert -ra 10:00:00.00 -dec -20:30:00.0 -epoch 2005.5 \
             -error_box 2.5 -trigger_number 42 -sequence_number 3 \
             -grb_date 2005-05-09T01:00:00 -notice_date 2005-05-09T01:00:30 -SWIFT -test",
        )
        .unwrap();
        let ControlCommand::GammaRayBurstAlert(alert) = command else {
            panic!("expected a manual alert, got {:?}", command);
        };

        assert_eq!(alert.mission, Mission::Swift);
        assert!(alert.is_test);
        assert_eq!(alert.epoch, 2005.5);
        assert_eq!(alert.error_box_arcmin, 2.5);
        assert_eq!(alert.trigger_number, 42);
        assert_eq!(alert.sequence_number, 3);
        assert_eq!(
            alert.burst_time,
            Some(Utc.with_ymd_and_hms(2005, 5, 9, 1, 0, 0).unwrap())
        );

        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let record = alert.into_record(now).unwrap();
        assert_eq!(
            record.notice_time,
            Utc.with_ymd_and_hms(2005, 5, 9, 1, 0, 30).unwrap()
        );
        assert_eq!(record.ra().unwrap().to_string(), "10:00:00.00");
        assert_eq!(record.dec().unwrap().to_string(), "-20:30:00.00");
    }

    #[test]
    fn test_manual_alert_defaults_notice_time() {
        let ControlCommand::GammaRayBurstAlert(alert) =
            parse_command("gamma_ray_burst_alert -ra 1:00:00 -dec +1:00:00 -HETE").unwrap()
        else {
            panic!("expected a manual alert");
        };
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let record = alert.into_record(now).unwrap();
        assert_eq!(record.notice_time, now);
        assert_eq!(record.mission, Mission::Hete);
        assert_eq!(record.epoch, 2000.0);
        assert_eq!(record.burst_time, None);
    }

    #[test]
    fn test_manual_alert_missing_fields() {
        let now = Utc::now();
        let alert = ManualAlert::default();
        assert_eq!(alert.into_record(now), Err(ManualAlertError::MissingRa));

        let alert = ManualAlert {
            ra: Some(Ra::from_degrees(1.0)),
            ..Default::default()
        };
        assert_eq!(
            alert.into_record(now).unwrap_err().to_string(),
            "Dec was NULL."
        );

        let alert = ManualAlert {
            ra: Some(Ra::from_degrees(1.0)),
            dec: Some(Dec::from_degrees(1.0)),
            ..Default::default()
        };
        assert_eq!(
            alert.into_record(now).unwrap_err().to_string(),
            "No alert type specified."
        );
    }

    #[test]
    fn test_argument_errors() {
        assert_eq!(
            parse_command("gamma_ray_burst_alert -ra").unwrap_err().to_string(),
            "-ra requires a string argument."
        );
        assert_eq!(
            parse_command("gamma_ray_burst_alert -trigger_number")
                .unwrap_err()
                .to_string(),
            "-trigger_number requires a number."
        );
        assert_eq!(
            parse_command("gamma_ray_burst_alert -grb_date")
                .unwrap_err()
                .to_string(),
            "-grb_date requires an argument of the form yyyy-MM-dd'T'HH:mm:ss."
        );
        assert_eq!(
            parse_command("gamma_ray_burst_alert -bogus")
                .unwrap_err()
                .to_string(),
            "Recieved unknown command argument:-bogus."
        );
        assert_eq!(
            parse_command("gamma_ray_burst_alert -UNKNOWN")
                .unwrap_err()
                .to_string(),
            "Recieved unknown command argument:-UNKNOWN."
        );

        let err = parse_command("gamma_ray_burst_alert -ra nonsense").unwrap_err();
        assert!(matches!(
            err,
            ControlError::InvalidValue { field: "RA", .. }
        ));
        assert!(err.to_string().starts_with("Parsing RA:nonsense failed:"));

        let err = parse_command("gamma_ray_burst_alert -grb_date 2005-13-40").unwrap_err();
        assert!(err.to_string().starts_with("Parsing GRB date:2005-13-40 failed:"));

        let err = parse_command("gamma_ray_burst_alert -sequence_number -1").unwrap_err();
        assert!(matches!(err, ControlError::InvalidValue { .. }));
    }

    #[test]
    fn test_mission_flags() {
        for (flag, mission) in [
            ("-HETE", Mission::Hete),
            ("-INTEGRAL", Mission::Integral),
            ("-SWIFT", Mission::Swift),
            ("-AGILE", Mission::Agile),
            ("-FERMI", Mission::Fermi),
        ] {
            let line = format!("gamma_ray_burst_alert {}", flag);
            let Ok(ControlCommand::GammaRayBurstAlert(alert)) = parse_command(&line) else {
                panic!("{} did not parse", flag);
            };
            assert_eq!(alert.mission, mission);
        }

        for flag in ["-swift", "-Hete", "-fermi"] {
            let line = format!("gamma_ray_burst_alert {}", flag);
            assert_eq!(
                parse_command(&line).unwrap_err().to_string(),
                format!("Recieved unknown command argument:{}.", flag)
            );
        }
    }

    #[test]
    fn test_help_text() {
        assert!(HELP_TEXT.starts_with("gcn-alertd Command Server Help:"));
        assert!(HELP_TEXT.contains("-FERMI"));
        assert!(HELP_TEXT.ends_with("decimal arc-minutes"));
    }
}
