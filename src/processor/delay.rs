//! Round-trip delay extraction from nping probe logs.
//!
//! The probe launcher appends one block per probe, each introduced by a
//! `Date and Time: YYYY/Mon/DD HH:MM:SS` line followed by the raw nping
//! output. One table row is produced per block.

use crate::constants::DELAY_COLUMNS;
use crate::error::{ExtractError, Result};
use crate::models::ProbeStats;

use regex::Regex;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Date and Time: (\d{4}/\w{3}/\d{2}) (\d{2}:\d{2}:\d{2})")
        .expect("valid entry regex")
});
static MAX_RTT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Max rtt: ([\d.]+|N/A)").expect("valid rtt regex"));
static SENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Raw packets sent: (\d+)").expect("valid sent regex"));
static RCVD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Rcvd: (\d+)").expect("valid rcvd regex"));

/// One probe result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelaySample {
    pub date: String,
    pub time: String,
    /// Milliseconds, or `N/A` when no reply arrived
    pub max_rtt_ms: String,
    pub sent_packets: u64,
    pub received_packets: u64,
}

/// Split the log into timestamped blocks and pull the statistics from each
pub fn parse_delay_log(content: &str) -> Vec<DelaySample> {
    let headers: Vec<_> = ENTRY_RE.captures_iter(content).collect();
    let mut samples = Vec::with_capacity(headers.len());

    for (i, caps) in headers.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let block_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(content.len(), |m| m.start());
        let block = &content[whole.end()..block_end];

        let capture = |re: &Regex| {
            re.captures(block)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        };

        let max_rtt = capture(&MAX_RTT_RE);
        let sent = capture(&SENT_RE);
        let received = capture(&RCVD_RE);

        // The last ping run may still be in progress when the log is read
        let is_last = i + 1 == headers.len();
        if is_last && max_rtt.is_none() && sent.is_none() && received.is_none() {
            debug!("Skipping unfinished ping run at {} {}", &caps[1], &caps[2]);
            continue;
        }

        let sample = DelaySample {
            date: caps[1].to_string(),
            time: caps[2].to_string(),
            max_rtt_ms: max_rtt.unwrap_or_else(|| "N/A".to_string()),
            sent_packets: sent.and_then(|s| s.parse().ok()).unwrap_or(0),
            received_packets: received.and_then(|s| s.parse().ok()).unwrap_or(0),
        };
        debug!("Delay sample at {} {}", sample.date, sample.time);
        samples.push(sample);
    }

    samples
}

pub fn write_delay_table<W: Write>(writer: W, samples: &[DelaySample]) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(DELAY_COLUMNS)?;
    for s in samples {
        let sent = s.sent_packets.to_string();
        let received = s.received_packets.to_string();
        csv.write_record([
            s.date.as_str(),
            s.time.as_str(),
            s.max_rtt_ms.as_str(),
            sent.as_str(),
            received.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(samples.len())
}

pub fn extract_delay_log(input: &Path, output: &Path) -> Result<ProbeStats> {
    let bytes = fs::read(input).map_err(|e| ExtractError::missing_input(input, e))?;
    let content = String::from_utf8_lossy(&bytes);
    let samples = parse_delay_log(&content);

    let file = fs::File::create(output).map_err(|e| ExtractError::OutputWrite {
        path: output.to_path_buf(),
        source: e,
    })?;
    let records_written = write_delay_table(BufWriter::new(file), &samples)?;

    info!(
        "Wrote {} delay samples to {}",
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

    const LOG: &str = "Date and Time: 2025/Sep/04 22:47:45

Starting Nping 0.7.80 ( https://nmap.org/nping ) at 2025-09-04 22:47 CDT
SENT (0.0302s) TCP 10.0.0.2:19321 > 129.237.161.212:62 S ttl=64 id=1 iplen=40
RCVD (0.0789s) TCP 129.237.161.212:62 > 10.0.0.2:19321 RA ttl=51 id=0 iplen=40

Max rtt: 48.512ms | Min rtt: 48.512ms | Avg rtt: 48.512ms
Raw packets sent: 1 (40B) | Rcvd: 1 (46B) | Lost: 0 (0.00%)
Nping done: 1 IP address pinged in 1.08 seconds


Date and Time: 2025/Sep/04 22:47:48

Starting Nping 0.7.80 ( https://nmap.org/nping ) at 2025-09-04 22:47 CDT
SENT (0.0301s) TCP 10.0.0.2:2046 > 129.237.161.212:62 S ttl=64 id=1 iplen=40

Max rtt: N/A | Min rtt: N/A | Avg rtt: N/A
Raw packets sent: 1 (40B) | Rcvd: 0 (0B) | Lost: 1 (100.00%)
Nping done: 1 IP address pinged in 1.03 seconds

Date and Time: 2025/Sep/04 22:47:50
";

    #[test]
    fn test_parse_blocks() {
        let samples = parse_delay_log(LOG);
        assert_eq!(samples.len(), 2);

        assert_eq!(samples[0].date, "2025/Sep/04");
        assert_eq!(samples[0].time, "22:47:45");
        assert_eq!(samples[0].max_rtt_ms, "48.512");
        assert_eq!(samples[0].sent_packets, 1);
        assert_eq!(samples[0].received_packets, 1);

        assert_eq!(samples[1].max_rtt_ms, "N/A");
        assert_eq!(samples[1].received_packets, 0);
    }

    #[test]
    fn test_unfinished_trailing_block_dropped() {
        let samples = parse_delay_log(LOG);
        assert!(samples.iter().all(|s| s.time != "22:47:50"));
    }

    #[test]
    fn test_inner_block_without_stats_uses_defaults() {
        let log = "Date and Time: 2025/Sep/04 22:47:45\n\
                   nping: unable to resolve host\n\
                   Date and Time: 2025/Sep/04 22:47:48\n\
                   Max rtt: 30.1ms\n";
        let samples = parse_delay_log(log);
        assert_eq!(samples.len(), 2);

        let first = &samples[0];
        assert_eq!(first.time, "22:47:45");
        assert_eq!(first.max_rtt_ms, "N/A");
        assert_eq!(first.sent_packets, 0);
        assert_eq!(first.received_packets, 0);
        assert_eq!(samples[1].max_rtt_ms, "30.1");
    }

    #[test]
    fn test_no_entries() {
        assert!(parse_delay_log("nping: command not found\n").is_empty());
    }

    #[test]
    fn test_write_table() {
        let samples = parse_delay_log(LOG);
        let mut out = Vec::new();
        assert_eq!(write_delay_table(&mut out, &samples).unwrap(), 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Time,Max_RTT_ms,Sent_Packets,Received_Packets");
        assert_eq!(lines[1], "2025/Sep/04,22:47:45,48.512,1,1");
        assert_eq!(lines[2], "2025/Sep/04,22:47:48,N/A,1,0");
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = extract_delay_log(
            &dir.path().join("nping_log.txt"),
            &dir.path().join("nping_data.txt"),
        );
        assert!(matches!(result, Err(ExtractError::MissingInputFile { .. })));
    }
}
