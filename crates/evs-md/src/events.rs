use std::fs;
use std::path::Path;

use evs_schemas::Event;

use crate::{parse_date, parse_opt_f64, read_lowercase_csv, LoadError};

/// Parse an event table (`event,event_date[,value]`, headers case-insensitive).
///
/// Rows are returned in file order; ordering by date is the engine's job.
pub fn parse_events_csv<R: std::io::Read>(src: R) -> Result<Vec<Event>, LoadError> {
    let (headers, records) = read_lowercase_csv(src)?;
    let col = |name: &str| headers.iter().position(|h| h == name);

    let name_i = col("event").ok_or(LoadError::MissingColumn("event"))?;
    let date_i = col("event_date").ok_or(LoadError::MissingColumn("event_date"))?;
    let value_i = col("value");

    let mut out = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let line = i + 2;
        let name = rec.get(name_i).unwrap_or("");
        if name.is_empty() {
            return Err(LoadError::ParseField {
                row: line,
                field: "event",
                raw: String::new(),
            });
        }
        let raw_date = rec.get(date_i).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| LoadError::ParseField {
            row: line,
            field: "event_date",
            raw: raw_date.to_string(),
        })?;

        let mut ev = Event::new(name, date);
        if let Some(vi) = value_i {
            let raw = rec.get(vi).unwrap_or("");
            let v = parse_opt_f64(raw).map_err(|_| LoadError::ParseField {
                row: line,
                field: "value",
                raw: raw.to_string(),
            })?;
            ev.value = v.filter(|x| !x.is_nan());
        }
        out.push(ev);
    }
    Ok(out)
}

pub fn load_events_csv(path: &Path) -> Result<Vec<Event>, LoadError> {
    let file = fs::File::open(path)
        .map_err(|e| LoadError::Io(format!("open '{}': {e}", path.display())))?;
    parse_events_csv(file)
}
