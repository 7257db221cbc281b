//! Line-oriented event files, as consumed by the test suite and the CLI.
//!
//! One record per line, whitespace separated:
//!
//! ```text
//! A <id> <GoodTillCancel|Market|FillAndKill|FillOrKill> <B|S> <price> <qty>
//! M <id> <B|S> <price> <qty>
//! C <id>
//! R <total_orders> <bid_levels> <ask_levels>
//! ```
//!
//! An empty line terminates the event section. The `R` record declares the
//! expected book shape and must be the last line of the file. Lines with an
//! unrecognised tag are skipped.

use std::fs;
use std::path::Path;

use crate::errors::ParseError;
use crate::orders::{OrderType, Side};
use crate::queue::Request;

/// Expected book shape declared by the final `R` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedResult {
    pub total_orders: usize,
    pub bid_levels: usize,
    pub ask_levels: usize,
}

pub fn parse_event_file(path: &Path) -> Result<(Vec<Request>, ExpectedResult), ParseError> {
    let text = fs::read_to_string(path)?;
    parse_events(&text)
}

pub fn parse_events(text: &str) -> Result<(Vec<Request>, ExpectedResult), ParseError> {
    let mut events = Vec::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        if line.is_empty() {
            break;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();

        match fields.first().copied() {
            Some("A") => events.push(Request::Add {
                id: parse_number(field(line, &fields, 1)?)?,
                order_type: parse_order_type(field(line, &fields, 2)?)?,
                side: parse_side(field(line, &fields, 3)?)?,
                price: parse_number(field(line, &fields, 4)?)?,
                quantity: parse_number(field(line, &fields, 5)?)?,
            }),
            Some("M") => events.push(Request::Modify {
                id: parse_number(field(line, &fields, 1)?)?,
                side: parse_side(field(line, &fields, 2)?)?,
                price: parse_number(field(line, &fields, 3)?)?,
                quantity: parse_number(field(line, &fields, 4)?)?,
            }),
            Some("C") => events.push(Request::Cancel {
                id: parse_number(field(line, &fields, 1)?)?,
            }),
            Some("R") => {
                let result = ExpectedResult {
                    total_orders: parse_number(field(line, &fields, 1)?)? as usize,
                    bid_levels: parse_number(field(line, &fields, 2)?)? as usize,
                    ask_levels: parse_number(field(line, &fields, 3)?)? as usize,
                };
                if lines.next().is_some() {
                    return Err(ParseError::ResultNotAtEnd);
                }
                return Ok((events, result));
            }
            _ => continue,
        }
    }

    Err(ParseError::MissingResult)
}

fn field<'a>(line: &str, fields: &[&'a str], index: usize) -> Result<&'a str, ParseError> {
    fields
        .get(index)
        .copied()
        .ok_or_else(|| ParseError::MissingField(line.to_string()))
}

fn parse_number(text: &str) -> Result<u64, ParseError> {
    let value: i64 = text
        .parse()
        .map_err(|_| ParseError::InvalidNumber(text.to_string()))?;
    if value < 0 {
        return Err(ParseError::Negative(text.to_string()));
    }
    Ok(value as u64)
}

fn parse_side(text: &str) -> Result<Side, ParseError> {
    match text {
        "B" => Ok(Side::Buy),
        "S" => Ok(Side::Sell),
        _ => Err(ParseError::UnknownSide(text.to_string())),
    }
}

fn parse_order_type(text: &str) -> Result<OrderType, ParseError> {
    match text {
        "GoodTillCancel" => Ok(OrderType::GoodTillCancel),
        "Market" => Ok(OrderType::Market),
        "FillAndKill" => Ok(OrderType::FillAndKill),
        "FillOrKill" => Ok(OrderType::FillOrKill),
        _ => Err(ParseError::UnknownOrderType(text.to_string())),
    }
}
