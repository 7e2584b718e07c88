/// Text and JSON output for the `presets` and `response` commands
use crate::error::Result;
use aria_audio::analysis::FrequencyResponse;
use aria_audio::eq::{Preset, PresetId, EQUALIZER_FREQUENCIES};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct PresetEntry {
    id: &'static str,
    name: &'static str,
    gains_db: Vec<f64>,
}

/// Write every built-in preset with its band gains
pub fn write_presets(out: &mut impl Write, json: bool) -> Result<()> {
    let entries: Vec<PresetEntry> = PresetId::ALL
        .into_iter()
        .map(|id| PresetEntry {
            id: id.as_str(),
            name: id.name(),
            gains_db: Preset::builtin(id).gains(),
        })
        .collect();

    if json {
        serde_json::to_writer_pretty(&mut *out, &entries).map_err(std::io::Error::from)?;
        writeln!(out)?;
        return Ok(());
    }

    write!(out, "{:<16} {:<16}", "ID", "NAME")?;
    for frequency in EQUALIZER_FREQUENCIES {
        write!(out, " {:>6}", short_frequency(frequency))?;
    }
    writeln!(out)?;

    for entry in &entries {
        write!(out, "{:<16} {:<16}", entry.id, entry.name)?;
        for gain in &entry.gains_db {
            write!(out, " {gain:>6.1}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write a response as JSON (every bin) or as a table at the band centers
pub fn write_response(out: &mut impl Write, response: &FrequencyResponse, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, response).map_err(std::io::Error::from)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{:>10}  {:>10}", "FREQ (Hz)", "GAIN (dB)")?;
    for frequency in EQUALIZER_FREQUENCIES {
        if let Some(magnitude) = response.magnitude_at(f64::from(frequency)) {
            writeln!(out, "{frequency:>10}  {magnitude:>10.2}")?;
        }
    }
    if let Some(peak) = response.peak() {
        writeln!(out, "peak {:.1} dB at {:.1} Hz", peak.magnitude_db, peak.frequency_hz)?;
    }
    Ok(())
}

fn short_frequency(hz: u32) -> String {
    if hz >= 1000 {
        format!("{}k", hz / 1000)
    } else {
        hz.to_string()
    }
}
