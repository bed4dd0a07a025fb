use crate::types::{CaseResult, Summary};
use crate::{t, t_args};
use colored::Colorize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputKind {
    #[default]
    Normal,
    Compact,
    Terse,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub kind: OutputKind,
    pub hide_passes: bool,
    pub hide_fails: bool,
    pub verbose: bool,
}

fn header(summary: &Summary) -> String {
    t_args!("report-summary",
        "total" => summary.total,
        "passed" => summary.passed.to_string().green(),
        "failed" => if summary.failed > 0 {
            summary.failed.to_string().red().bold()
        } else {
            summary.failed.to_string().green()
        }
    )
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_failure_details(out: &mut String, c: &CaseResult) {
    out.push_str(&format!(
        "  {} {}\n",
        t!("report-command").bold(),
        c.command.join(" ")
    ));
    if let Some(err) = &c.error {
        out.push_str(&format!("  {} {}\n", t!("report-error").bold(), err.red()));
        if !c.actual.is_empty() {
            out.push_str(&format!("  {}\n{}\n", t!("report-output").bold(), indent(&c.actual)));
        }
    } else {
        out.push_str(&format!("  {}\n{}\n", t!("report-expected").bold(), indent(&c.expected)));
        out.push_str(&format!("  {}\n{}\n", t!("report-actual").bold(), indent(&c.actual)));
    }
}

pub fn render_human(summary: &Summary, opts: ReportOptions) -> String {
    let mut out = String::new();
    out.push_str(&header(summary));
    out.push('\n');
    if opts.kind == OutputKind::Terse {
        return out;
    }
    for c in &summary.cases {
        if (c.passed && opts.hide_passes) || (!c.passed && opts.hide_fails) {
            continue;
        }
        let tag = if c.passed {
            "[OK]".green().bold()
        } else {
            "[FAIL]".red().bold()
        };
        let name = if c.passed { c.name.green() } else { c.name.red().bold() };
        if opts.verbose {
            out.push_str(&format!("{tag} {name} ({} ms)\n", c.duration.as_millis()));
        } else {
            out.push_str(&format!("{tag} {name}\n"));
        }
        if !c.passed && opts.kind == OutputKind::Normal {
            render_failure_details(&mut out, c);
        }
    }
    out
}

pub fn print_human(summary: &Summary, opts: ReportOptions) {
    print!("{}", render_human(summary, opts));
}
