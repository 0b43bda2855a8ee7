// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::fmt::Write;

use pulldown_cmark_escape::escape_html;
use pulldown_cmark::{html, Event, Options, Parser};

use crate::{call_title, Report};

const STYLE: &str = "\
body { font-family: sans-serif; line-height: 1.6; max-width: 900px; margin: 0 auto; padding: 2rem; color: #212121; }
.header { background: #1E88E5; color: white; padding: 2rem; border-radius: 12px; }
.metrics { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 1rem; margin: 2rem 0; }
.metric { border: 1px solid #E0E0E0; border-radius: 8px; padding: 1rem; text-align: center; }
.metric .value { font-size: 2rem; font-weight: 700; color: #1E88E5; }
.section { border-left: 4px solid #1E88E5; padding: 0 1.5rem; margin-bottom: 2rem; }
.tool-call { background: #F5F5F5; border-radius: 6px; padding: 1rem; margin: 1rem 0; }
.footer { text-align: center; color: #757575; border-top: 1px solid #E0E0E0; margin-top: 3rem; }
";

pub(crate) fn render(report: &Report) -> String {
    let counts = report.source_counts();
    let labels: Vec<&str> = counts.iter().map(|c| c.source.as_str()).collect();
    let company = escape(&report.company);
    let stamp = report.timestamp();

    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>Competitive Intelligence Report: {company}</title>\n<style>\n{STYLE}</style>\n\
         </head>\n<body>\n"
    );
    let _ = write!(
        out,
        "<div class=\"header\">\n<h1>Competitive Intelligence Report</h1>\n<h2>{company}</h2>\n\
         <div><strong>Generated:</strong> {stamp}</div>\n\
         <div><strong>Data Sources:</strong> {} ({})</div>\n\
         <div><strong>Total Data Points:</strong> {}</div>\n</div>\n",
        report.tool_calls.len(),
        escape(&labels.join(", ")),
        report.data_points()
    );

    out.push_str("<div class=\"metrics\">\n");
    for c in &counts {
        let _ = writeln!(
            out,
            "<div class=\"metric\"><div class=\"value\">{}</div><div>{}</div></div>",
            c.count,
            escape(&c.source)
        );
    }
    out.push_str("</div>\n");

    let _ = write!(
        out,
        "<div class=\"section\">\n<h2>Strategic Analysis</h2>\n{}</div>\n",
        markdown_to_html(&report.analysis)
    );

    out.push_str("<div class=\"section\">\n<h2>Data Sources</h2>\n");
    for (i, call) in report.tool_calls.iter().enumerate() {
        let _ = write!(
            out,
            "<div class=\"tool-call\">\n<h4>{}. {}</h4>\n\
             <p><strong>Result:</strong> {}</p>\n<p><strong>Items Found:</strong> {}</p>\n</div>\n",
            i + 1,
            escape(&call_title(&call.name)),
            escape(call.result.summary()),
            call.result.count()
        );
    }
    out.push_str("</div>\n");

    let _ = write!(out, "<div class=\"footer\"><p>Generated on {stamp}</p></div>\n</body>\n</html>\n");
    out
}

/// Render model-written Markdown.  Raw HTML in the source is shown as
/// text, never passed through.
fn markdown_to_html(src: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    let events = Parser::new_ext(src, opts).map(|ev| match ev {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, s);
    out
}
