//! Terminal rendering of an analysis result

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::models::{AnalysisOption, AnalysisResponse, InterruptionRisk};

/// Plain-text table of the remote options
pub fn options_table(options: &[AnalysisOption]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("PROVIDER").fg(Color::Cyan),
        Cell::new("REGION").fg(Color::Cyan),
        Cell::new("INSTANCE").fg(Color::Cyan),
        Cell::new("COST/HR").fg(Color::Cyan),
        Cell::new("RISK").fg(Color::Cyan),
        Cell::new("EGRESS").fg(Color::Cyan),
        Cell::new("BREAK-EVEN").fg(Color::Cyan),
    ]);

    for option in options {
        let cost = if option.is_spot_instance {
            format!("${:.2} (volatile)", option.compute_cost_per_hour)
        } else {
            format!("${:.2}", option.compute_cost_per_hour)
        };
        let risk = match option.interruption_risk {
            Some(risk) => Cell::new(risk.as_str()).fg(risk_color(risk)),
            None => Cell::new("-"),
        };
        let egress = if option.one_time_egress_cost > 0.0 {
            format!("${:.2}", option.one_time_egress_cost)
        } else {
            "-".to_string()
        };
        let break_even = match option.break_even_hours {
            Some(hours) => format!("{:.1} h", hours),
            None => "never".to_string(),
        };

        table.add_row(vec![
            Cell::new(&option.provider),
            Cell::new(&option.region),
            Cell::new(&option.instance_type),
            Cell::new(cost),
            risk,
            Cell::new(egress),
            Cell::new(break_even),
        ]);
    }

    table
}

fn risk_color(risk: InterruptionRisk) -> Color {
    match risk {
        InterruptionRisk::Low => Color::Green,
        InterruptionRisk::Medium => Color::Yellow,
        InterruptionRisk::High => Color::Red,
    }
}

/// Full report: data-local baseline, options table, then advisories
pub fn render(job_name: &str, response: &AnalysisResponse) -> String {
    let local = &response.data_local_option;
    let mut out = String::new();

    out.push_str(&format!("{} {}\n\n", "Cost analysis:".bold(), job_name));
    out.push_str(&format!("{}\n", "Data-local option".green().bold()));
    out.push_str(&format!("  Provider: {}\n", local.provider));
    out.push_str(&format!("  Region:   {}\n", local.region));
    out.push_str(&format!("  Instance: {}\n", local.instance_type));
    out.push_str(&format!("  Cost/hr:  ${:.2}\n\n", local.compute_cost_per_hour));

    if response.remote_options.is_empty() {
        out.push_str(&format!("{}\n", "No remote options available.".yellow()));
        return out;
    }

    out.push_str(&format!(
        "{} ({})\n",
        "Remote options".cyan().bold(),
        response.remote_options.len()
    ));
    out.push_str(&options_table(&response.remote_options).to_string());
    out.push_str("\n\n");

    for option in &response.remote_options {
        out.push_str(&format!(
            "  {} {}:{} {}\n",
            "•".dimmed(),
            option.provider,
            option.instance_type,
            option.advisory_message
        ));
    }

    out
}
