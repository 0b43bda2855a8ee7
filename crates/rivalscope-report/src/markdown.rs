// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::fmt::Write;

use crate::{call_title, Report};

pub(crate) fn render(report: &Report) -> String {
    let counts = report.source_counts();
    let labels: Vec<&str> = counts.iter().map(|c| c.source.as_str()).collect();
    let stamp = report.timestamp();

    let mut md = String::new();
    let _ = writeln!(md, "# Competitive Intelligence Report: {}\n", report.company);
    let _ = writeln!(md, "**Generated:** {stamp}  ");
    let _ = writeln!(md, "**Analysis Type:** Multi-Source Strategic Intelligence  ");
    let _ = writeln!(md, "**Data Sources:** {} ({})  ", report.tool_calls.len(), labels.join(", "));
    let _ = writeln!(md, "**Total Data Points Analyzed:** {}\n", report.data_points());
    md.push_str("---\n\n## Data Collection Summary\n\n");
    for c in &counts {
        let _ = writeln!(md, "- **{}:** {} items analyzed", c.source, c.count);
    }

    let _ = write!(md, "\n---\n\n## Strategic Analysis\n\n{}\n\n---\n\n", report.analysis);

    md.push_str("## Detailed Data Sources\n\n");
    for (i, call) in report.tool_calls.iter().enumerate() {
        let args = serde_json::to_string_pretty(&call.arguments).unwrap_or_default();
        let _ = writeln!(md, "### {}. {}\n", i + 1, call_title(&call.name));
        let _ = writeln!(md, "**Parameters:**\n```json\n{args}\n```\n");
        let _ = writeln!(md, "**Result:** {}\n", call.result.summary());
        let _ = writeln!(md, "**Items Found:** {}\n", call.result.count());
    }

    md.push_str(
        "---\n\n## Methodology\n\n\
         1. **Patent Analysis** - patent filings via Google Patents\n\
         2. **Hiring Intelligence** - job postings from Greenhouse boards\n\
         3. **News Monitoring** - Google News RSS coverage\n\
         4. **Developer Activity** - GitHub repository tracking\n\n",
    );
    let _ = writeln!(md, "---\n\n*Generated on {stamp}*");
    md
}
