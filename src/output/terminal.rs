//! Terminal output formatting with colors and box drawing.

use colored::Colorize;

use crate::analysis::{FalsificationReport, GateDecision, VerificationReport};
use crate::types::letter_char;
use crate::wheel::WheelSet;

/// Format a verification report.
pub fn format_verification(report: &VerificationReport) -> String {
    let mut output = String::new();

    let header = if report.accepted() {
        format!("{} {}", "\u{2713}".green().bold(), "ACCEPTED".green().bold())
    } else {
        format!("{} {}", "\u{2717}".red().bold(), "REJECTED".red().bold())
    };
    output.push_str(&format_box_top());
    output.push_str(&format_box_line(&header));
    output.push_str(&format_box_separator());

    output.push_str(&format_box_line(&format!(
        "Fully resolved: {}",
        yes_no(report.fully_resolved)
    )));
    output.push_str(&format_box_line(&format!(
        "Round trip:     {}",
        yes_no(report.round_trip_ok)
    )));
    output.push_str(&format_box_line(&format!(
        "Digest match:   {}",
        yes_no(report.digest_match)
    )));

    if !report.unresolved.is_empty() {
        output.push_str(&format_box_line(&format!(
            "Unresolved positions: {}",
            report.unresolved.len()
        )));
    }
    if let Some(first) = report.mismatches.first() {
        output.push_str(&format_box_line(
            &format!(
                "Mismatches: {} (first at {}: {} -> {})",
                report.mismatches.len(),
                first.position,
                letter_char(first.expected),
                letter_char(first.found)
            )
            .red()
            .to_string(),
        ));
    }
    if let Some(digest) = report.digest {
        let hex = digest.to_hex();
        output.push_str(&format_box_line(&format!("Digest: {}...", &hex[..16]).dimmed().to_string()));
    }
    output.push_str(&format_box_bottom());
    output
}

/// Format a gate decision, one line per metric.
pub fn format_gate(decision: &GateDecision) -> String {
    let mut output = String::new();

    let header = if decision.passed {
        format!("{} {}", "\u{2713}".green().bold(), "GATE PASSED".green().bold())
    } else {
        format!("{} {}", "\u{26A0}".yellow().bold(), "GATE FAILED".red().bold())
    };
    output.push_str(&format_box_top());
    output.push_str(&format_box_line(&header));
    output.push_str(&format_box_line(&format!(
        "alpha = {}, {} null samples",
        decision.alpha, decision.samples
    )));
    output.push_str(&format_box_separator());

    for m in &decision.metrics {
        let line = format!(
            "{:<16} obs {:>8.4}  p {:.4}  adj {:.4}",
            m.metric, m.observed, m.raw_p, m.adjusted_p
        );
        let line = if m.passed { line.green() } else { line.red() };
        output.push_str(&format_box_line(&line.to_string()));
        if let Some(s) = m.null_summary {
            output.push_str(&format_box_line(
                &format!(
                    "  null: mean {:.3}  p50 {:.3}  p99 {:.3}  max {:.3}",
                    s.mean, s.median, s.p99, s.max
                )
                .dimmed()
                .to_string(),
            ));
        }
    }
    output.push_str(&format_box_bottom());
    output
}

/// Format the per-axis frequency table of a falsification batch.
pub fn format_falsification(report: &FalsificationReport) -> String {
    let mut output = String::new();
    output.push_str(&format_box_top());
    output.push_str(&format_box_line(&"Falsification".bold().to_string()));
    output.push_str(&format_box_separator());
    for tally in report.table() {
        let line = format!(
            "{:<16} {:>4} of {:<5} feasible, {:>4} round trip",
            tally.axis.to_string(),
            tally.feasible,
            tally.total,
            tally.round_trip_ok
        );
        output.push_str(&format_box_line(&line));
    }
    output.push_str(&format_box_bottom());
    output
}

/// Format the skeleton and forced-slot count of each wheel.
pub fn format_wheels(wheels: &WheelSet) -> String {
    let mut output = String::new();
    output.push_str(&format_box_top());
    output.push_str(&format_box_line(
        &format!("Wheels ({})", wheels.classifier()).bold().to_string(),
    ));
    output.push_str(&format_box_separator());
    for wheel in wheels.wheels() {
        let residues: String = wheel
            .residues()
            .iter()
            .map(|r| r.map_or('.', letter_char))
            .collect();
        output.push_str(&format_box_line(&format!(
            "class {} {:<18} {}",
            wheel.class,
            wheel.skeleton().to_string(),
            residues
        )));
    }
    output.push_str(&format_box_bottom());
    output
}

fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

// Box drawing helpers

const BOX_WIDTH: usize = 60;

fn format_box_top() -> String {
    format!("\u{250C}{}\u{2510}\n", "\u{2500}".repeat(BOX_WIDTH))
}

fn format_box_bottom() -> String {
    format!("\u{2514}{}\u{2518}\n", "\u{2500}".repeat(BOX_WIDTH))
}

fn format_box_separator() -> String {
    format!("\u{251C}{}\u{2524}\n", "\u{2500}".repeat(BOX_WIDTH))
}

fn format_box_line(content: &str) -> String {
    let visible_len = strip_ansi_codes(content).chars().count();
    let padding = (BOX_WIDTH - 2).saturating_sub(visible_len);
    format!("\u{2502} {}{} \u{2502}\n", content, " ".repeat(padding))
}

/// Strip ANSI escape codes for accurate length calculation.
fn strip_ansi_codes(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            while let Some(&next) = chars.peek() {
                chars.next();
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{evaluate_gate, FalsificationRecord, NullDistribution, Variant};
    use crate::family::Family;
    use crate::wheel::{SlotPolicy, Wheel};

    #[test]
    fn test_format_rejected_verification() {
        let report = VerificationReport {
            round_trip_ok: false,
            digest_match: false,
            fully_resolved: false,
            mismatches: Vec::new(),
            unresolved: vec![3, 4],
            digest: None,
            expected_digest: None,
        };
        let output = format_verification(&report);
        assert!(output.contains("REJECTED"));
        assert!(output.contains("Unresolved positions: 2"));
    }

    #[test]
    fn test_format_gate_lists_metrics() {
        let nulls = vec![NullDistribution::new("word_coverage", vec![0.1, 0.2])];
        let decision = evaluate_gate(&[0.9], &nulls, 0.5).unwrap();
        let output = format_gate(&decision);
        assert!(output.contains("GATE PASSED"));
        assert!(output.contains("word_coverage"));
    }

    #[test]
    fn test_format_falsification_table() {
        let report = FalsificationReport {
            records: vec![FalsificationRecord {
                variant: Variant::Baseline,
                feasible: true,
                round_trip_ok: false,
                fully_resolved: false,
                digest_match: false,
                reason: None,
            }],
        };
        let output = format_falsification(&report);
        assert!(output.contains("baseline"));
        assert!(output.contains("1 of 1"));
    }

    #[test]
    fn test_format_wheels_marks_unforced() {
        let mut wheel = Wheel::new(0, Family::Vigenere, 3, 0);
        wheel.force(1, 1, "X", SlotPolicy::Distinct);
        let output = format_wheels(&WheelSet::new("mod(1)", 3, vec![wheel]));
        assert!(output.contains(".B."));
        assert!(output.contains("vigenere/L=3/φ=0"));
    }

    #[test]
    fn test_strip_ansi_codes() {
        let colored = "\x1b[32mgreen\x1b[0m";
        assert_eq!(strip_ansi_codes(colored), "green");
    }
}
