//! HTML rendering for the node pages.
//!
//! # Responsibilities
//! - Render the index page from instance info and one state snapshot
//! - Render the health page body
//!
//! # Design Decisions
//! - Renderers take a `NodeSnapshot` by value and never touch live state
//! - Inline CSS, no template engine

use crate::health::HealthStatus;
use crate::metadata::InstanceInfo;
use crate::node::NodeSnapshot;

/// HTML-escape a string.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; background: #f6f8fa; color: #24292f; margin: 0; }}
.container {{ max-width: 640px; margin: 0 auto; padding: 24px 16px; }}
table {{ width: 100%; border-collapse: collapse; margin-bottom: 24px; }}
td {{ padding: 8px; border-bottom: 1px solid #d0d7de; }}
td.label {{ font-weight: 600; width: 40%; }}
.ok {{ color: #1a7f37; }}
.bad {{ color: #cf222e; }}
.actions a {{ display: inline-block; margin: 4px 8px 4px 0; padding: 8px 14px; border-radius: 6px; background: #0969da; color: #fff; text-decoration: none; }}
.actions a.danger {{ background: #cf222e; }}
</style>
</head>
<body>
<div class="container">
{body}
</div>
</body>
</html>"#,
        title = html_escape(title),
        body = body,
    )
}

fn row(field: &str, label: &str, value: &str, class: &str) -> String {
    format!(
        r#"<tr><td class="label">{label}</td><td class="{class}" data-field="{field}">{value}</td></tr>"#,
        label = label,
        class = class,
        field = field,
        value = html_escape(value),
    )
}

fn unknown_if_empty(value: &str) -> &str {
    if value.is_empty() {
        "unknown"
    } else {
        value
    }
}

/// Index page: instance identity, flags and control links.
pub fn render_index(info: &InstanceInfo, snapshot: NodeSnapshot) -> String {
    let status = snapshot.health_status();
    let health_class = match status {
        HealthStatus::Healthy => "ok",
        HealthStatus::Unhealthy => "bad",
    };
    let working_class = if snapshot.working { "bad" } else { "ok" };

    let rows = [
        row("hostname", "Hostname", &info.hostname, ""),
        row("zone", "Zone", unknown_if_empty(&info.zone), ""),
        row("template", "Template", unknown_if_empty(&info.template), ""),
        row(
            "machine_type",
            "Machine type",
            unknown_if_empty(&info.machine_type),
            "",
        ),
        row("healthy", "Healthy", &snapshot.healthy.to_string(), health_class),
        row("working", "Working", &snapshot.working.to_string(), working_class),
    ]
    .concat();

    let body = format!(
        r#"<h1>Instance node</h1>
<table>
{rows}
</table>
<div class="actions">
<a href="/makeHealthy">Make healthy</a>
<a href="/makeUnhealthy" class="danger">Make unhealthy</a>
<a href="/startLoad" class="danger">Start load</a>
<a href="/stopLoad">Stop load</a>
</div>"#
    );

    page(&info.hostname, &body)
}

/// Health page body; the status code carries the actual signal.
pub fn render_health(status: HealthStatus) -> String {
    let class = match status {
        HealthStatus::Healthy => "ok",
        HealthStatus::Unhealthy => "bad",
    };
    page(
        "health",
        &format!(r#"<h1 class="{class}" data-field="health">{status}</h1>"#),
    )
}
