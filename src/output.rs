//! Plain terminal rendering of scan results and stored history.

use crate::scanner::ScanResult;
use console::style;
use std::io::{self, Write};

/// Maximum banner characters shown on one history line.
const BANNER_CLIP: usize = 120;

/// Print the header line for a scan invocation.
pub fn print_scan_header(range: &str, hosts: usize, ports: usize) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "{} {} ({} hosts x {} ports)",
        style("scanning").cyan().bold(),
        range,
        hosts,
        ports
    )
}

/// Print scan results, open ports first, then a summary line.
pub fn print_results(results: &[ScanResult], show_closed: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut sorted: Vec<&ScanResult> = results.iter().collect();
    sorted.sort_by(|a, b| (&a.ip, a.port).cmp(&(&b.ip, b.port)));

    for result in &sorted {
        if !result.is_open && !show_closed {
            continue;
        }
        writeln!(out, "{}", render_line(result))?;
    }

    let open = results.iter().filter(|r| r.is_open).count();
    writeln!(
        out,
        "\n{} {} of {} targets open",
        style("done:").bold(),
        style(open).green().bold(),
        results.len()
    )
}

/// Print stored history entries, one per line with timestamp.
pub fn print_history(results: &[ScanResult]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for result in results {
        writeln!(
            out,
            "{} {}",
            style(result.scanned_at.to_rfc3339()).dim(),
            render_line(result)
        )?;
    }
    Ok(())
}

fn render_line(result: &ScanResult) -> String {
    let status = if result.is_open {
        style("open").green().bold()
    } else {
        style("closed").red()
    };

    let mut line = format!(
        "{}:{} {} service={}",
        result.ip,
        result.port,
        status,
        result.service.as_deref().unwrap_or("-")
    );

    if let Some(banner) = &result.banner {
        if let Some(snippet) = first_line(banner) {
            line.push_str(&format!("\n    banner: {}", snippet));
        }
    }
    line
}

/// First non-empty banner line, clipped for display.
fn first_line(banner: &str) -> Option<String> {
    let line = banner.lines().map(str::trim).find(|l| !l.is_empty())?;
    if line.chars().count() > BANNER_CLIP {
        let clipped: String = line.chars().take(BANNER_CLIP - 3).collect();
        Some(format!("{clipped}..."))
    } else {
        Some(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_skips_blank_lines() {
        assert_eq!(
            first_line("\r\n\r\nSSH-2.0-OpenSSH_9.6\r\nmore").as_deref(),
            Some("SSH-2.0-OpenSSH_9.6")
        );
        assert_eq!(first_line("\r\n  \r\n"), None);
    }

    #[test]
    fn test_first_line_clips_long_banners() {
        let long = "A".repeat(500);
        let clipped = first_line(&long).unwrap();
        assert_eq!(clipped.chars().count(), BANNER_CLIP);
        assert!(clipped.ends_with("..."));
    }
}
