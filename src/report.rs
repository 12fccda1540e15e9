// Reduction of the scanned flight list to the requested report
use std::io;

use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};

use crate::error::FareError;
use crate::itinerary::PricedFlightRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    ShowAll,
    MaxPrice,
    MinPrice,
    MinTime,
    MaxTime,
}

impl SelectionMode {
    pub fn caption(&self) -> &'static str {
        match self {
            SelectionMode::ShowAll => "All flights:",
            SelectionMode::MaxPrice => "Most expensive flight:",
            SelectionMode::MinPrice => "Cheapest flight:",
            SelectionMode::MinTime => "Fastest flight:",
            SelectionMode::MaxTime => "Slowest flight:",
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Report<'a> {
    All(&'a [PricedFlightRecord]),
    Single(&'a PricedFlightRecord),
}

/// How reports are rendered. `Legacy` reproduces the older tool's output:
/// `", "` and `": "` separators in single records and every non-ASCII
/// character written as a lowercase `\uXXXX` escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    Native,
    Legacy,
}

impl Report<'_> {
    /// The full list is indented four spaces; a single record is compact.
    pub fn to_json(&self, style: JsonStyle) -> Result<String, FareError> {
        let pretty = || PrettyFormatter::with_indent(b"    ");
        match (self, style) {
            (Report::All(flights), JsonStyle::Native) => write_json(flights, pretty()),
            (Report::All(flights), JsonStyle::Legacy) => write_json(flights, AsciiEscaped(pretty())),
            (Report::Single(flight), JsonStyle::Native) => write_json(flight, CompactFormatter),
            (Report::Single(flight), JsonStyle::Legacy) => {
                write_json(flight, AsciiEscaped(SpacedFormatter))
            }
        }
    }
}

fn write_json<T, F>(value: &T, formatter: F) -> Result<String, FareError>
where
    T: Serialize + ?Sized,
    F: Formatter,
{
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| FareError::Output(e.to_string()))
}

// Single line with a space after every `,` and `:`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

// Wraps another formatter and escapes non-ASCII string content as UTF-16
// `\uXXXX` units (surrogate pairs above the BMP).
struct AsciiEscaped<F>(F);

impl<F: Formatter> Formatter for AsciiEscaped<F> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                writer.write_all(format!("\\u{unit:04x}").as_bytes())?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Reduce `flights` according to `mode`. The min/max modes fail with
/// `EmptySelection` on an empty list; ties go to the earliest record.
pub fn select(flights: &[PricedFlightRecord], mode: SelectionMode) -> Result<Report<'_>, FareError> {
    let best = match mode {
        SelectionMode::ShowAll => return Ok(Report::All(flights)),
        SelectionMode::MaxPrice => first_extremum(flights, |f| f.price, Extremum::Max),
        SelectionMode::MinPrice => first_extremum(flights, |f| f.price, Extremum::Min),
        SelectionMode::MinTime => first_extremum(flights, |f| f.time_to_flying, Extremum::Min),
        SelectionMode::MaxTime => first_extremum(flights, |f| f.time_to_flying, Extremum::Max),
    };
    best.map(Report::Single).ok_or(FareError::EmptySelection)
}

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

// Linear scan; a later record only wins when strictly better.
fn first_extremum<K, F>(flights: &[PricedFlightRecord], key: F, want: Extremum) -> Option<&PricedFlightRecord>
where
    K: PartialOrd,
    F: Fn(&PricedFlightRecord) -> K,
{
    let mut iter = flights.iter();
    let mut best = iter.next()?;
    let mut best_key = key(best);
    for flight in iter {
        let candidate = key(flight);
        let better = match want {
            Extremum::Min => candidate < best_key,
            Extremum::Max => candidate > best_key,
        };
        if better {
            best = flight;
            best_key = candidate;
        }
    }
    Some(best)
}
