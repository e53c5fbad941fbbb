//! Markdown and JSON report generation.
//!
//! This module renders a finished leaderboard run as a Markdown document
//! or as pretty-printed JSON.

use crate::analysis::aggregator::UNKNOWN_NAME;
use crate::config::ReportConfig;
use crate::models::{Distribution, Leaderboard, RankedEntry, Report, ReportMetadata};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# Contest Leaderboard\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.leaderboard));
    output.push_str(&generate_distribution_section(
        &report.leaderboard.distribution,
        options.bar_width,
    ));
    output.push_str(&generate_rankings_section(&report.leaderboard.entries));
    output.push_str(&generate_warnings_section(&report.leaderboard));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Roster:** `{}`\n", metadata.roster_path));
    section.push_str(&format!("- **Scoring Service:** {}\n", metadata.service_url));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Participants:** {}\n", metadata.roster_size));
    section.push_str(&format!("- **Batches:** {}\n", metadata.batches_total));
    if metadata.batches_failed > 0 {
        section.push_str(&format!(
            "- **Batches Failed:** {}\n",
            metadata.batches_failed
        ));
    }
    if metadata.batches_skipped > 0 {
        section.push_str(&format!(
            "- **Batches Skipped (cancelled):** {}\n",
            metadata.batches_skipped
        ));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary statistics section.
fn generate_summary_section(board: &Leaderboard) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    if board.ranked_count() == 0 {
        section.push_str("No score data: none of the fetched handles returned a score.\n\n");
        return section;
    }

    let stats = &board.summary;
    section.push_str("| Average | Median | Top Score |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {:.2} | {:.2} | {} |\n\n",
        stats.mean, stats.median, stats.top
    ));

    section.push_str(&format!(
        "**Active in last 7 days:** {} / {}\n\n",
        board.activity.active, board.activity.total
    ));

    section
}

/// Generate the score distribution section.
fn generate_distribution_section(distribution: &Distribution, bar_width: usize) -> String {
    if distribution.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Score Distribution\n\n");
    section.push_str("| Range | Count | |\n");
    section.push_str("|:---|:---:|:---|\n");

    let max_count = distribution.bins.iter().map(|b| b.count).max().unwrap_or(0);

    for (i, bin) in distribution.bins.iter().enumerate() {
        let marker = if distribution.mean_bin == Some(i) {
            " ◀ mean"
        } else {
            ""
        };
        section.push_str(&format!(
            "| {} | {} | `{}`{} |\n",
            bin.label(),
            bin.count,
            histogram_bar(bin.count, max_count, bar_width),
            marker
        ));
    }
    section.push('\n');

    section
}

/// Text bar proportional to `count`; any non-zero count gets at least one mark.
fn histogram_bar(count: usize, max_count: usize, width: usize) -> String {
    if count == 0 || max_count == 0 {
        return String::new();
    }
    let len = (count * width / max_count).max(1);
    "#".repeat(len)
}

/// Generate the rankings table.
fn generate_rankings_section(entries: &[RankedEntry]) -> String {
    let mut section = String::new();

    section.push_str("## Rankings\n\n");

    if entries.is_empty() {
        section.push_str("No participants were returned by the scoring service.\n\n");
        return section;
    }

    section.push_str("| Rank | Name | Username | Score | Recent Active Date |\n");
    section.push_str("|:---:|:---|:---|---:|:---|\n");

    for entry in entries {
        section.push_str(&generate_entry_row(entry));
    }
    section.push('\n');

    section
}

/// Generate a single leaderboard row.
fn generate_entry_row(entry: &RankedEntry) -> String {
    let (score, date) = match entry.record.valid_score() {
        Some(score) => (
            score.to_string(),
            entry
                .record
                .last_active_date
                .clone()
                .unwrap_or_else(|| "NA".to_string()),
        ),
        None => ("User Not Found".to_string(), "User Not Found".to_string()),
    };

    let name = if entry.name.is_empty() {
        UNKNOWN_NAME
    } else {
        entry.name.as_str()
    };

    format!(
        "| {} | {} | {} | {} | {} |\n",
        entry.rank,
        escape_cell(name),
        escape_cell(&entry.record.handle),
        score,
        escape_cell(&date)
    )
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Generate the batch warnings section, covering failed and skipped batches.
fn generate_warnings_section(board: &Leaderboard) -> String {
    if !board.is_partial() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Batch Warnings\n\n");
    section.push_str("Participants in these batches are missing from the leaderboard.\n\n");
    for warning in &board.warnings {
        section.push_str(&format!("- ⚠️ {}\n", warning));
    }
    if board.batches_skipped > 0 {
        section.push_str(&format!(
            "- ⛔ Run cancelled: {} of {} batches not requested ({} handles skipped)\n",
            board.batches_skipped, board.batches_total, board.handles_skipped
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by ContestRank*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{distribution, stats};
    use crate::models::{ActivitySummary, BatchWarning, Rank, ScoreRecord};
    use chrono::Utc;

    fn create_test_report(entries: Vec<RankedEntry>, warnings: Vec<BatchWarning>) -> Report {
        let summary = stats::summarize(&entries);
        let dist = distribution::build(&stats::sorted_valid_scores(&entries), summary.mean);
        let curve = dist.curve();

        Report {
            metadata: ReportMetadata {
                roster_path: "roster.json".to_string(),
                service_url: "http://localhost:8080".to_string(),
                generated_at: Utc::now(),
                roster_size: 3,
                batches_total: 1,
                batches_failed: warnings.len(),
                batches_skipped: 0,
                duration_seconds: 1.5,
            },
            leaderboard: Leaderboard {
                activity: stats::activity(&entries),
                entries,
                summary,
                distribution: dist,
                warnings,
                batches_total: 1,
                batches_skipped: 0,
                handles_skipped: 0,
            },
            curve,
        }
    }

    fn sample_entries() -> Vec<RankedEntry> {
        let mut alice = ScoreRecord::found("alice", 1820.0);
        alice.active = Some(true);
        alice.last_active_date = Some("2024-05-01".to_string());

        vec![
            RankedEntry {
                record: alice,
                name: "Alice".to_string(),
                rank: Rank::Position(1),
            },
            RankedEntry {
                record: ScoreRecord::found("bob", 1650.0),
                name: "Bob | Jr".to_string(),
                rank: Rank::Position(2),
            },
            RankedEntry {
                record: ScoreRecord::not_found("ghost"),
                name: UNKNOWN_NAME.to_string(),
                rank: Rank::Unranked,
            },
        ]
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(sample_entries(), Vec::new());
        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(markdown.contains("# Contest Leaderboard"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("| 1735.00 | 1735.00 | 1820 |"));
        assert!(markdown.contains("**Active in last 7 days:** 1 / 2"));
        assert!(markdown.contains("## Score Distribution"));
        assert!(markdown.contains("◀ mean"));
        assert!(!markdown.contains("## Batch Warnings"));
    }

    #[test]
    fn test_entry_rows() {
        let entries = sample_entries();

        let found = generate_entry_row(&entries[0]);
        assert_eq!(found, "| 1 | Alice | alice | 1820 | 2024-05-01 |\n");

        let no_date = generate_entry_row(&entries[1]);
        assert!(no_date.contains("Bob \\| Jr"));
        assert!(no_date.ends_with("| NA |\n"));

        let missing = generate_entry_row(&entries[2]);
        assert_eq!(
            missing,
            "| - | N/A | ghost | User Not Found | User Not Found |\n"
        );
    }

    #[test]
    fn test_no_score_data_state() {
        let entries = vec![RankedEntry {
            record: ScoreRecord::not_found("ghost"),
            name: "Ghost".to_string(),
            rank: Rank::Unranked,
        }];
        let report = create_test_report(entries, Vec::new());
        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(markdown.contains("No score data"));
        assert!(!markdown.contains("## Score Distribution"));
        assert_eq!(report.leaderboard.activity, ActivitySummary::default());
    }

    #[test]
    fn test_warnings_section() {
        let warnings = vec![BatchWarning {
            batch: 2,
            batch_count: 2,
            handles: 10,
            message: "scoring service returned 503: down".to_string(),
        }];
        let report = create_test_report(sample_entries(), warnings);
        let section = generate_warnings_section(&report.leaderboard);

        assert!(section.contains("## Batch Warnings"));
        assert!(section.contains("Batch 2 of 2 failed (10 handles skipped)"));
        assert!(!section.contains("Run cancelled"));
    }

    #[test]
    fn test_cancelled_run_is_visible() {
        let mut report = create_test_report(sample_entries(), Vec::new());
        report.metadata.batches_total = 3;
        report.metadata.batches_skipped = 2;
        report.leaderboard.batches_total = 3;
        report.leaderboard.batches_skipped = 2;
        report.leaderboard.handles_skipped = 80;

        let markdown = generate_markdown_report(&report, &ReportConfig::default());
        assert!(markdown.contains("- **Batches Skipped (cancelled):** 2"));
        assert!(markdown.contains("Run cancelled: 2 of 3 batches not requested (80 handles skipped)"));

        let value: serde_json::Value =
            serde_json::from_str(&generate_json_report(&report).unwrap()).unwrap();
        assert_eq!(value["metadata"]["batches_skipped"], 2);
        assert_eq!(value["leaderboard"]["handles_skipped"], 80);
    }

    #[test]
    fn test_histogram_bar() {
        assert_eq!(histogram_bar(4, 4, 8), "########");
        assert_eq!(histogram_bar(1, 100, 10), "#");
        assert_eq!(histogram_bar(0, 5, 10), "");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(sample_entries(), Vec::new());
        let json = generate_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["leaderboard"]["entries"][0]["rank"], 1);
        assert_eq!(value["leaderboard"]["entries"][2]["rank"], "-");
        assert_eq!(value["leaderboard"]["summary"]["top"], 1820.0);
        // Two bins: too few for an overlay
        assert_eq!(value["curve"].as_array().map(Vec::len), Some(0));
        assert_eq!(
            value["leaderboard"]["distribution"]["bins"][0]["range_start"],
            1650
        );
    }
}
