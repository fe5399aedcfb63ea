//! Latency dump files.
//!
//! Every writer takes the batch latencies in nanoseconds, sorted ascending.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Histogram bucket width in nanoseconds.
pub const HISTOGRAM_GRANULARITY: u64 = 10;

/// Appends the latencies to `path` as little-endian `u64`s.
pub fn write_raw(path: &Path, sorted: &[u64]) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut out = BufWriter::new(file);
    render_raw(&mut out, sorted)?;
    out.flush()
}

/// Writes the cumulative distribution to `path`, one `latency\tfraction`
/// line per sample.
pub fn write_cdf(path: &Path, sorted: &[u64]) -> io::Result<()> {
    write_new(path, |out| render_cdf(out, sorted))
}

/// Writes the reversed cumulative distribution to `path`, one
/// `fraction\tlatency` line per sample.
pub fn write_rcdf(path: &Path, sorted: &[u64]) -> io::Result<()> {
    write_new(path, |out| render_rcdf(out, sorted))
}

/// Writes the latency histogram to `path`, one `bucket\tcount` line per
/// non-empty bucket.
pub fn write_histogram(path: &Path, sorted: &[u64]) -> io::Result<()> {
    write_new(path, |out| render_histogram(out, sorted))
}

fn write_new(
    path: &Path,
    render: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    render(&mut out)?;
    out.flush()
}

pub fn render_raw(out: &mut impl Write, sorted: &[u64]) -> io::Result<()> {
    for latency in sorted {
        out.write_all(&latency.to_le_bytes())?;
    }
    Ok(())
}

pub fn render_cdf(out: &mut impl Write, sorted: &[u64]) -> io::Result<()> {
    let n = sorted.len() as f64;
    for (i, latency) in sorted.iter().enumerate() {
        writeln!(out, "{latency}\t{:.6}", (i + 1) as f64 / n)?;
    }
    Ok(())
}

pub fn render_rcdf(out: &mut impl Write, sorted: &[u64]) -> io::Result<()> {
    let n = sorted.len() as f64;
    for (i, latency) in sorted.iter().enumerate() {
        writeln!(out, "{:.6}\t{latency}", (i + 1) as f64 / n)?;
    }
    Ok(())
}

pub fn render_histogram(out: &mut impl Write, sorted: &[u64]) -> io::Result<()> {
    let mut buckets = sorted
        .iter()
        .map(|latency| latency - latency % HISTOGRAM_GRANULARITY);
    let Some(mut bucket) = buckets.next() else {
        return Ok(());
    };

    let mut count = 1usize;
    for floor in buckets {
        if floor == bucket {
            count += 1;
        } else {
            writeln!(out, "{bucket}\t{count}")?;
            bucket = floor;
            count = 1;
        }
    }
    writeln!(out, "{bucket}\t{count}")
}

#[cfg(test)]
mod output_tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn cdf_lines() {
        let text = render(|out| render_cdf(out, &[100, 200, 400]));
        assert_eq!(text, "100\t0.333333\n200\t0.666667\n400\t1.000000\n");
    }

    #[test]
    fn rcdf_lines() {
        let text = render(|out| render_rcdf(out, &[5, 7]));
        assert_eq!(text, "0.500000\t5\n1.000000\t7\n");
    }

    #[test]
    fn histogram_groups_by_ten_nanoseconds() {
        let text = render(|out| render_histogram(out, &[101, 105, 109, 110, 135, 139]));
        assert_eq!(text, "100\t3\n110\t1\n130\t2\n");
    }

    #[test]
    fn histogram_of_empty_sample_is_empty() {
        assert_eq!(render(|out| render_histogram(out, &[])), "");
    }

    #[test]
    fn raw_is_little_endian() {
        let mut out = Vec::new();
        render_raw(&mut out, &[1, 0x0102]).unwrap();
        assert_eq!(
            out,
            [1, 0, 0, 0, 0, 0, 0, 0, 0x02, 0x01, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn raw_file_is_appended() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("latencies.bin");

        write_raw(&path, &[1, 2]).unwrap();
        write_raw(&path, &[3]).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let values: Vec<u64> = bytes
            .chunks_exact(8)
            .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(values, [1, 2, 3]);
    }

    #[test]
    fn text_files_are_truncated() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("cdf.txt");

        write_cdf(&path, &[1, 2, 3, 4]).unwrap();
        write_cdf(&path, &[9]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "9\t1.000000\n");

        let hist = dir.path().join("hist.txt");
        write_histogram(&hist, &[12, 18]).unwrap();
        assert_eq!(std::fs::read_to_string(&hist).unwrap(), "10\t2\n");

        let rcdf = dir.path().join("rcdf.txt");
        write_rcdf(&rcdf, &[12, 18]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&rcdf).unwrap(),
            "0.500000\t12\n1.000000\t18\n"
        );
    }
}
