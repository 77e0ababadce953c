use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn discovery_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

fn scanning_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg} {pos}/{len} hosts [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

/// Turns `span` into the run's spinner.
pub fn attach(span: &Span) {
    span.pb_set_style(&discovery_style());
    span.pb_set_message("Discovering targets...");
}

pub fn report_phase(span: &Span, msg: &str) {
    span.pb_set_message(msg);
}

pub fn start_scanning(span: &Span, hosts: usize) {
    span.pb_set_style(&scanning_style());
    span.pb_set_length(hosts as u64);
    span.pb_set_message("Scanning");
}

pub fn report_host_done(span: &Span) {
    span.pb_inc(1);
}
