//! Throughput extraction from iperf3 bidirectional test logs.
//!
//! Each test starts with a `YYYY/Mon/DD HH:MM:SS` line written by the probe
//! launcher. The sender summary lines tagged `[TX-C]` and `[RX-C]` carry the
//! upload and download rates. A test is kept only when both rates are present.

use crate::constants::THROUGHPUT_COLUMNS;
use crate::error::{ExtractError, Result};
use crate::models::ProbeStats;

use regex::Regex;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

static TEST_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}/\w{3}/\d{2})\s+(\d{2}:\d{2}:\d{2})").expect("valid timestamp regex")
});
static UPLOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*\d+\]\[TX-C\].*?([\d.]+)\s+Mbits/sec.*?sender").expect("valid upload regex")
});
static DOWNLOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*\d+\]\[RX-C\].*?([\d.]+)\s+Mbits/sec.*?sender")
        .expect("valid download regex")
});

/// One completed bidirectional test, rates in Mbit/s
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputSample {
    pub date: String,
    pub time: String,
    pub upload_mbps: f64,
    pub download_mbps: f64,
}

#[derive(Default)]
struct OpenTest {
    date: String,
    time: String,
    upload: Option<f64>,
    download: Option<f64>,
}

impl OpenTest {
    fn close(self) -> Option<ThroughputSample> {
        match (self.upload, self.download) {
            (Some(upload_mbps), Some(download_mbps)) => Some(ThroughputSample {
                date: self.date,
                time: self.time,
                upload_mbps,
                download_mbps,
            }),
            _ => {
                debug!("Dropping incomplete test at {} {}", self.date, self.time);
                None
            }
        }
    }
}

pub fn parse_throughput_log(content: &str) -> Vec<ThroughputSample> {
    let mut samples = Vec::new();
    let mut current: Option<OpenTest> = None;

    for line in content.lines() {
        let line = line.trim();

        if let Some(caps) = TEST_START_RE.captures(line) {
            if let Some(sample) = current.take().and_then(OpenTest::close) {
                samples.push(sample);
            }
            current = Some(OpenTest {
                date: caps[1].to_string(),
                time: caps[2].to_string(),
                ..Default::default()
            });
            continue;
        }

        // Summary lines before the first timestamp have nothing to attach to
        let Some(test) = current.as_mut() else {
            continue;
        };
        if let Some(rate) = capture_rate(&UPLOAD_RE, line) {
            test.upload = Some(rate);
        }
        if let Some(rate) = capture_rate(&DOWNLOAD_RE, line) {
            test.download = Some(rate);
        }
    }

    if let Some(sample) = current.and_then(OpenTest::close) {
        samples.push(sample);
    }

    samples
}

fn capture_rate(re: &Regex, line: &str) -> Option<f64> {
    re.captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn write_throughput_table<W: Write>(writer: W, samples: &[ThroughputSample]) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(THROUGHPUT_COLUMNS)?;
    for s in samples {
        // Debug formatting keeps the trailing `.0` on whole rates
        let upload = format!("{:?}", s.upload_mbps);
        let download = format!("{:?}", s.download_mbps);
        csv.write_record([
            s.date.as_str(),
            s.time.as_str(),
            upload.as_str(),
            download.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(samples.len())
}

pub fn extract_throughput_log(input: &Path, output: &Path) -> Result<ProbeStats> {
    let bytes = fs::read(input).map_err(|e| ExtractError::missing_input(input, e))?;
    let content = String::from_utf8_lossy(&bytes);
    let samples = parse_throughput_log(&content);

    let file = fs::File::create(output).map_err(|e| ExtractError::OutputWrite {
        path: output.to_path_buf(),
        source: e,
    })?;
    let records_written = write_throughput_table(BufWriter::new(file), &samples)?;

    info!(
        "Wrote {} throughput samples to {}",
        records_written,
        output.display()
    );

    Ok(ProbeStats {
        records_written,
        output_path: output.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "



2025/Sep/04 22:47:45
Connecting to host 129.237.161.212, port 5201
[  5][TX-C] local 10.0.0.2 port 40112 connected to 129.237.161.212 port 5201
[  7][RX-C] local 10.0.0.2 port 40114 connected to 129.237.161.212 port 5201
[ ID][Role] Interval           Transfer     Bitrate         Retr
[  5][TX-C]   0.00-1.00   sec  1.38 MBytes  11.5 Mbits/sec    0             sender
[  5][TX-C]   0.00-1.05   sec  1.25 MBytes  9.98 Mbits/sec                  receiver
[  7][RX-C]   0.00-1.00   sec  5.12 MBytes  43.0 Mbits/sec   12             sender
[  7][RX-C]   0.00-1.05   sec  4.88 MBytes  39.1 Mbits/sec                  receiver

iperf Done.
2025/Sep/04 22:47:49
iperf3: error - unable to connect to server: Connection timed out
2025/Sep/04 22:47:58
[  5][TX-C]   0.00-1.00   sec  640 KBytes  5.24 Mbits/sec    2             sender
[  7][RX-C]   0.00-1.00   sec  2.50 MBytes  21.0 Mbits/sec    0             sender
";

    #[test]
    fn test_parse_tests() {
        let samples = parse_throughput_log(LOG);
        assert_eq!(samples.len(), 2);

        assert_eq!(samples[0].date, "2025/Sep/04");
        assert_eq!(samples[0].time, "22:47:45");
        assert_eq!(samples[0].upload_mbps, 11.5);
        assert_eq!(samples[0].download_mbps, 43.0);

        assert_eq!(samples[1].time, "22:47:58");
        assert_eq!(samples[1].upload_mbps, 5.24);
        assert_eq!(samples[1].download_mbps, 21.0);
    }

    #[test]
    fn test_receiver_lines_ignored() {
        let log = "2025/Sep/04 10:00:00\n[  5][TX-C]   0.00-1.05   sec  1.25 MBytes  9.98 Mbits/sec   receiver\n";
        assert!(parse_throughput_log(log).is_empty());
    }

    #[test]
    fn test_write_table() {
        let samples = parse_throughput_log(LOG);
        let mut out = Vec::new();
        write_throughput_table(&mut out, &samples).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![
            "Date,Time,UL,DL",
            "2025/Sep/04,22:47:45,11.5,43.0",
            "2025/Sep/04,22:47:58,5.24,21.0",
        ]);
    }
}
