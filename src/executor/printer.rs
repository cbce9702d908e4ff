use std::path::Path;

use colored::{Color, Colorize};

use super::models::{BatchSummary, ExecutionResult, ResponseStatus};

pub fn print_result_line(result: &ExecutionResult) {
    let method = result.request.method_str().unwrap_or("GET");
    let url = result.request.url_str().unwrap_or("<missing url>");
    let status = result.response.status.to_string().color(status_color(result.response.status));

    println!(
        "{} {} {} {} {}",
        format!("#{}", result.request.index).dimmed(),
        method.bold(),
        url.cyan(),
        "→".dimmed(),
        status
    );

    if result.response.status == ResponseStatus::NotApplicable {
        println!("  {}", result.response.status_text.dimmed());
    }
}

pub fn print_summary(summary: &BatchSummary) {
    println!(
        "{} {} ok, {} server errors, {} failed",
        format!("{} requests:", summary.total).bold(),
        summary.succeeded.to_string().green(),
        summary.server_errors.to_string().yellow(),
        summary.transport_failures.to_string().red(),
    );
}

pub fn print_saved(path: &Path) {
    println!("{} {}", "Responses saved to".green(), path.display());
}

fn status_color(status: ResponseStatus) -> Color {
    match status.code() {
        Some(code) if code >= 400 => Color::Red,
        Some(code) if code >= 300 => Color::Yellow,
        Some(_) => Color::Green,
        None => Color::Red,
    }
}
