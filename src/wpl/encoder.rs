//! # WPL Encoder
//!
//! Serializes command records into QGC WPL 120 text.

use super::protocol::*;

/// Encode records into a complete flight plan body
///
/// # Arguments
///
/// * `records` - Records in emission order
///
/// # Returns
///
/// * `String` - Header line followed by one CRLF-terminated line per record
///
/// # Examples
///
/// ```
/// use plan_to_wpl::wpl::encoder::encode_flight_plan;
/// use plan_to_wpl::wpl::protocol::{CommandRecord, MavCommand};
///
/// let land = CommandRecord::new(MavCommand::NavLand, [0.0; 7], true);
/// let body = encode_flight_plan(&[land]);
/// assert_eq!(body, "QGC WPL 120\r\n0\t0\t3\t21\t0.0\t0.0\t0.0\t0.0\t0.0\t0.0\t0.0\t1\r\n");
/// ```
pub fn encode_flight_plan(records: &[CommandRecord]) -> String {
    let mut body = String::from(WPL_HEADER);
    body.push_str(WPL_LINE_TERMINATOR);

    for record in records {
        body.push_str(&encode_record(record));
        body.push_str(WPL_LINE_TERMINATOR);
    }

    // Exactly one terminator after the last record
    let trimmed_len = body.trim_end().len();
    body.truncate(trimmed_len);
    body.push_str(WPL_LINE_TERMINATOR);
    body
}

/// Encode a single record as tab-separated fields, without terminator
///
/// Field order: `seq, current, frame, command, param1..param7, autocontinue`
pub fn encode_record(record: &CommandRecord) -> String {
    let mut fields = Vec::with_capacity(WPL_FIELD_COUNT);
    fields.push(record.seq.to_string());
    fields.push(WPL_CURRENT.to_string());
    fields.push(WPL_FRAME.to_string());
    fields.push(record.command.code().to_string());
    fields.extend(record.params.iter().map(|&value| format_param(value)));
    fields.push(u8::from(record.auto_continue).to_string());

    fields.join(WPL_FIELD_SEPARATOR)
}

/// Format a parameter the way the Anafi tooling prints floats
///
/// Integral values keep one decimal (`3.0`), other values use the shortest
/// representation that round-trips (`47.3977419`). Magnitudes below 1e-4 or
/// from 1e16 upward switch to exponent form with a signed two-digit exponent
/// (`1e-05`, `2.5e+16`).
pub fn format_param(value: f64) -> String {
    let magnitude = value.abs();

    if value != 0.0 && value.is_finite() && !(1e-4..1e16).contains(&magnitude) {
        return format_exponent(value);
    }

    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn format_exponent(value: f64) -> String {
    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}
