//! SPICE rawfile reader
//!
//! Reads the SPICE3/ngspice rawfile format written by `ngspice -b`: an
//! ASCII header (`Title`, `Plotname`, `Flags`, `No. Variables`,
//! `No. Points`, a `Variables:` table) followed by either a `Binary:`
//! section of little-endian f64 values or an ASCII `Values:` section.
//!
//! The reader is a single atomic load with no streaming contract: the whole
//! file is parsed into a [`Waveform`] or a structured error is returned.
//! Complex plots (AC sweeps) are collapsed to per-point magnitude so every
//! trace is real-valued.

use crate::error::{Result, SpiceViewError};
use crate::types::{Trace, Waveform};
use std::path::Path;

/// Parsed rawfile header, up to the start of the data section
struct Header {
    plot_name: String,
    complex: bool,
    n_variables: usize,
    n_points: usize,
    names: Vec<String>,
}

/// Read a rawfile from disk
///
/// Fails with [`SpiceViewError::RawfileMissing`] if the file is absent and
/// [`SpiceViewError::RawfileFormat`] if it is truncated or not a rawfile.
pub fn read_rawfile(path: impl AsRef<Path>) -> Result<Waveform> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SpiceViewError::RawfileMissing(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    parse_rawfile(&bytes)
}

/// Parse rawfile contents
pub fn parse_rawfile(bytes: &[u8]) -> Result<Waveform> {
    let mut lines = LineCursor::new(bytes);

    let mut plot_name = String::new();
    let mut complex = false;
    let mut n_variables: Option<usize> = None;
    let mut n_points: Option<usize> = None;

    // Header key/value lines until the Variables: table
    loop {
        let line = lines
            .next_line()?
            .ok_or_else(|| format_err("header ended before a Variables: section"))?;
        let line = line.trim_end();

        if let Some(rest) = line.strip_prefix("Plotname:") {
            plot_name = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("Flags:") {
            complex = rest.to_ascii_lowercase().contains("complex");
        } else if let Some(rest) = line.strip_prefix("No. Variables:") {
            n_variables = Some(parse_count(rest, "No. Variables")?);
        } else if let Some(rest) = line.strip_prefix("No. Points:") {
            n_points = Some(parse_count(rest, "No. Points")?);
        } else if line.starts_with("Variables:") {
            break;
        }
        // Title:, Date:, Command: and unknown keys are skipped
    }

    let n_variables =
        n_variables.ok_or_else(|| format_err("missing 'No. Variables' header field"))?;
    let n_points = n_points.ok_or_else(|| format_err("missing 'No. Points' header field"))?;
    if n_variables == 0 {
        return Err(format_err("rawfile declares zero variables"));
    }

    // Variables table: one line per variable, "<index> <name> <kind>"
    let mut names = Vec::with_capacity(n_variables);
    for i in 0..n_variables {
        let line = lines
            .next_line()?
            .ok_or_else(|| format_err("variables table ended early"))?;
        let mut fields = line.split_whitespace();
        let index = fields
            .next()
            .and_then(|f| f.parse::<usize>().ok())
            .ok_or_else(|| format_err("variable line without an index"))?;
        if index != i {
            return Err(format_err(format!(
                "variable index {} out of order (expected {})",
                index, i
            )));
        }
        let name = fields
            .next()
            .ok_or_else(|| format_err("variable line without a name"))?;
        names.push(name.to_string());
    }

    let header = Header {
        plot_name,
        complex,
        n_variables,
        n_points,
        names,
    };

    // Data section marker
    let marker = lines
        .next_line()?
        .ok_or_else(|| format_err("missing data section"))?;
    let columns = if marker.trim_end() == "Binary:" {
        parse_binary(&header, lines.rest())?
    } else if marker.trim_end() == "Values:" {
        parse_values(&header, lines)?
    } else {
        return Err(format_err(format!(
            "expected 'Binary:' or 'Values:', found {:?}",
            marker.trim_end()
        )));
    };

    build_waveform(header, columns)
}

fn build_waveform(header: Header, mut columns: Vec<Vec<f64>>) -> Result<Waveform> {
    let scale = columns.remove(0);
    let mut names = header.names.into_iter();
    let scale_name = names.next().unwrap_or_default();

    let traces = names
        .zip(columns)
        .map(|(name, values)| Trace { name, values })
        .collect();

    Ok(Waveform {
        plot_name: header.plot_name,
        scale_name,
        scale,
        traces,
    })
}

/// Binary section: point-major runs of f64, two per value when complex
fn parse_binary(header: &Header, data: &[u8]) -> Result<Vec<Vec<f64>>> {
    let values_per_point = if header.complex {
        header.n_variables * 2
    } else {
        header.n_variables
    };
    let expected = header
        .n_points
        .checked_mul(values_per_point)
        .and_then(|v| v.checked_mul(8))
        .ok_or_else(|| format_err("point count overflows"))?;
    if data.len() < expected {
        return Err(format_err(format!(
            "binary section truncated: expected {} bytes, found {}",
            expected,
            data.len()
        )));
    }

    let mut columns = vec![Vec::with_capacity(header.n_points); header.n_variables];
    let mut offset = 0;
    for _ in 0..header.n_points {
        for column in columns.iter_mut() {
            let value = if header.complex {
                let re = read_f64(data, offset);
                let im = read_f64(data, offset + 8);
                offset += 16;
                re.hypot(im)
            } else {
                let v = read_f64(data, offset);
                offset += 8;
                v
            };
            column.push(value);
        }
    }
    Ok(columns)
}

fn read_f64(data: &[u8], offset: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    f64::from_le_bytes(buf)
}

/// ASCII section: per point, an index line followed by one value per line
fn parse_values(header: &Header, mut lines: LineCursor<'_>) -> Result<Vec<Vec<f64>>> {
    let mut columns = vec![Vec::with_capacity(header.n_points); header.n_variables];

    for point in 0..header.n_points {
        for (var, column) in columns.iter_mut().enumerate() {
            let line = loop {
                let line = lines
                    .next_line()?
                    .ok_or_else(|| format_err("values section ended early"))?;
                if !line.trim().is_empty() {
                    break line;
                }
            };
            let mut fields = line.split_whitespace();

            // The first value of each point is prefixed with the point index
            let value_field = if var == 0 {
                let index = fields
                    .next()
                    .and_then(|f| f.parse::<usize>().ok())
                    .ok_or_else(|| format_err("point without an index"))?;
                if index != point {
                    return Err(format_err(format!(
                        "point index {} out of order (expected {})",
                        index, point
                    )));
                }
                fields.next()
            } else {
                fields.next()
            };

            let value_field =
                value_field.ok_or_else(|| format_err("value line without a value"))?;
            column.push(parse_value(value_field, header.complex)?);
        }
    }

    Ok(columns)
}

/// Parse one ASCII value; complex values are written as "re,im"
fn parse_value(field: &str, complex: bool) -> Result<f64> {
    if complex {
        if let Some((re, im)) = field.split_once(',') {
            let re: f64 = re
                .trim()
                .parse()
                .map_err(|_| format_err(format!("invalid real part {:?}", field)))?;
            let im: f64 = im
                .trim()
                .parse()
                .map_err(|_| format_err(format!("invalid imaginary part {:?}", field)))?;
            return Ok(re.hypot(im));
        }
    }
    field
        .parse()
        .map_err(|_| format_err(format!("invalid value {:?}", field)))
}

fn parse_count(field: &str, what: &str) -> Result<usize> {
    field
        .trim()
        .parse()
        .map_err(|_| format_err(format!("invalid {} count {:?}", what, field.trim())))
}

fn format_err(msg: impl Into<String>) -> SpiceViewError {
    SpiceViewError::RawfileFormat(msg.into())
}

/// Incremental line reader over the raw bytes
///
/// The header is ASCII but the body may be binary, so lines are split on
/// the byte level and validated as UTF-8 one at a time.
struct LineCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> LineCursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Next line without its terminator, or None at end of input
    fn next_line(&mut self) -> Result<Option<&'a str>> {
        if self.offset >= self.bytes.len() {
            return Ok(None);
        }
        let rest = &self.bytes[self.offset..];
        let (line, consumed) = match rest.iter().position(|&b| b == b'\n') {
            Some(pos) => (&rest[..pos], pos + 1),
            None => (rest, rest.len()),
        };
        self.offset += consumed;

        let line = std::str::from_utf8(line)
            .map_err(|_| format_err("non-UTF-8 bytes in text section"))?;
        Ok(Some(line.trim_end_matches('\r')))
    }

    /// Remaining unread bytes (the binary payload)
    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.offset..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascii_rawfile() -> String {
        concat!(
            "Title: rc lowpass\n",
            "Date: Thu Aug  7 10:00:00 2025\n",
            "Plotname: Transient Analysis\n",
            "Flags: real\n",
            "No. Variables: 3\n",
            "No. Points: 3\n",
            "Variables:\n",
            "\t0\ttime\ttime\n",
            "\t1\tv(out)\tvoltage\n",
            "\t2\tv(in)\tvoltage\n",
            "Values:\n",
            " 0\t0.0\n",
            "\t0.0\n",
            "\t1.0\n",
            " 1\t1e-3\n",
            "\t0.5\n",
            "\t1.0\n",
            " 2\t2e-3\n",
            "\t0.75\n",
            "\t1.0\n",
        )
        .to_string()
    }

    fn binary_rawfile(points: &[[f64; 3]]) -> Vec<u8> {
        let mut bytes = format!(
            concat!(
                "Title: rc lowpass\n",
                "Plotname: Transient Analysis\n",
                "Flags: real\n",
                "No. Variables: 3\n",
                "No. Points: {}\n",
                "Variables:\n",
                "\t0\ttime\ttime\n",
                "\t1\tv(out)\tvoltage\n",
                "\t2\tv(in)\tvoltage\n",
                "Binary:\n",
            ),
            points.len()
        )
        .into_bytes();
        for point in points {
            for value in point {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        bytes
    }

    #[test]
    fn test_parse_ascii_rawfile() {
        let wf = parse_rawfile(ascii_rawfile().as_bytes()).unwrap();
        assert_eq!(wf.plot_name, "Transient Analysis");
        assert_eq!(wf.scale_name, "time");
        assert_eq!(wf.scale, vec![0.0, 1e-3, 2e-3]);
        assert_eq!(wf.names().collect::<Vec<_>>(), vec!["v(out)", "v(in)"]);
        assert_eq!(wf.trace("v(out)").unwrap().values, vec![0.0, 0.5, 0.75]);
        assert_eq!(wf.trace("v(in)").unwrap().values, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_parse_binary_rawfile() {
        let bytes = binary_rawfile(&[
            [0.0, 0.0, 1.0],
            [1e-3, 0.5, 1.0],
            [2e-3, 0.75, 1.0],
        ]);
        let wf = parse_rawfile(&bytes).unwrap();
        assert_eq!(wf.points(), 3);
        assert_eq!(wf.scale, vec![0.0, 1e-3, 2e-3]);
        assert_eq!(wf.trace("v(out)").unwrap().values, vec![0.0, 0.5, 0.75]);
    }

    #[test]
    fn test_truncated_binary_section() {
        let mut bytes = binary_rawfile(&[[0.0, 0.0, 1.0], [1e-3, 0.5, 1.0]]);
        bytes.truncate(bytes.len() - 4);
        let err = parse_rawfile(&bytes).unwrap_err();
        assert!(matches!(err, SpiceViewError::RawfileFormat(_)));
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_complex_values_become_magnitudes() {
        let raw = concat!(
            "Plotname: AC Analysis\n",
            "Flags: complex\n",
            "No. Variables: 2\n",
            "No. Points: 2\n",
            "Variables:\n",
            "\t0\tfrequency\tfrequency\n",
            "\t1\tv(out)\tvoltage\n",
            "Values:\n",
            " 0\t1.0,0.0\n",
            "\t3.0,4.0\n",
            " 1\t10.0,0.0\n",
            "\t0.0,2.0\n",
        );
        let wf = parse_rawfile(raw.as_bytes()).unwrap();
        assert_eq!(wf.scale_name, "frequency");
        assert_eq!(wf.scale, vec![1.0, 10.0]);
        assert_eq!(wf.trace("v(out)").unwrap().values, vec![5.0, 2.0]);
    }

    #[test]
    fn test_missing_header_field() {
        let raw = concat!(
            "Plotname: Transient Analysis\n",
            "No. Points: 1\n",
            "Variables:\n",
        );
        let err = parse_rawfile(raw.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("No. Variables"));
    }

    #[test]
    fn test_not_a_rawfile() {
        let err = parse_rawfile(b"this is just text\nnothing else\n").unwrap_err();
        assert!(matches!(err, SpiceViewError::RawfileFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_rawfile(dir.path().join("rawspice.raw")).unwrap_err();
        assert!(matches!(err, SpiceViewError::RawfileMissing(_)));
    }

    #[test]
    fn test_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rawspice.raw");
        std::fs::write(&path, ascii_rawfile()).unwrap();

        let wf = read_rawfile(&path).unwrap();
        assert_eq!(wf.names().count(), 2);
    }
}
