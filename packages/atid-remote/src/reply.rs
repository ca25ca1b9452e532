//! Reply body parsing.
//!
//! Records are one per line with seven `;` separated fields. The first line
//! that is too short or does not split cleanly ends the record list.

use atid_core::coords::{parse_dec_dms, parse_ra_hms};
use atid_core::{AstronomicalTarget, ReferenceFrame, SkyCoord};

use crate::error::ReplyError;

/// Marker the service writes when the script failed.
pub const ERROR_MARKER: &str = "::error";

/// Section marker preceding records when console echo is enabled.
pub const DATA_MARKER: &str = "::data::";

/// Token for a value the catalog does not supply.
pub const ABSENT: &str = "~";

/// Lines shorter than this end the record list.
pub const MIN_RECORD_LEN: usize = 6;

const FIELD_COUNT: usize = 7;

/// Parses a reply body into targets.
pub fn parse_reply(body: &str) -> Result<Vec<AstronomicalTarget>, ReplyError> {
    if let Some(pos) = body.find(ERROR_MARKER) {
        return Err(ReplyError::Service(error_message(&body[pos..])));
    }

    let mut targets = Vec::new();
    for line in records(body) {
        let line = line.trim_end();
        if line.len() < MIN_RECORD_LEN {
            break;
        }
        match parse_record(line) {
            Some(target) => targets.push(target),
            None => {
                tracing::debug!("Reply parsing stopped at line '{}'", line);
                break;
            }
        }
    }
    Ok(targets)
}

/// Parses one record line.
pub fn parse_record(line: &str) -> Option<AstronomicalTarget> {
    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    if fields.len() != FIELD_COUNT || fields[0].is_empty() {
        return None;
    }

    let ra = parse_ra_hms(fields[1]).ok()?;
    let dec = parse_dec_dms(fields[2]).ok()?;
    let pm_ra = optional_value(fields[3])?;
    let pm_dec = optional_value(fields[4])?;
    let parallax = optional_value(fields[5])?;
    let radial_velocity = optional_value(fields[6])?;

    Some(
        AstronomicalTarget::new(fields[0], SkyCoord::new(ra, dec))
            .with_proper_motion(pm_ra, pm_dec)
            .with_parallax(parallax)
            .with_radial_velocity(radial_velocity)
            .with_frame(ReferenceFrame::Icrs),
    )
}

/// `Some(None)` for the absent token, `None` when the field is malformed.
fn optional_value(field: &str) -> Option<Option<f64>> {
    if field == ABSENT {
        return Some(None);
    }
    field.parse::<f64>().ok().map(Some)
}

/// Lines holding records, skipping any echo section before the data marker.
fn records(body: &str) -> impl Iterator<Item = &str> {
    let mut lines: Vec<&str> = body.lines().collect();
    if let Some(idx) = lines.iter().position(|l| l.trim_start().starts_with(DATA_MARKER)) {
        lines.drain(..=idx);
        let blanks = lines.iter().take_while(|l| l.trim().is_empty()).count();
        lines.drain(..blanks);
    }
    lines.into_iter()
}

fn error_message(section: &str) -> String {
    let message = section
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if message.is_empty() {
        "unspecified".to_string()
    } else {
        message
    }
}
