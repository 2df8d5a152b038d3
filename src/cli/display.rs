//! Display formatting for CLI output
//!
//! SBIO pattern: Pure functions that format data for display

use super::commands::{StackInfo, SynthSummary, ValidationResult};

// ============================================================================
// Table formatting helpers
// ============================================================================

/// Format a simple table with headers and rows
pub fn format_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "No stacks found.\n".to_string();
    }

    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let mut output = String::new();

    for (i, header) in headers.iter().enumerate() {
        if i > 0 {
            output.push_str("   ");
        }
        output.push_str(&format!(
            "{:width$}",
            header.to_uppercase(),
            width = widths[i]
        ));
    }
    output.push('\n');

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                output.push_str("   ");
            }
            if i < widths.len() {
                output.push_str(&format!("{:width$}", cell, width = widths[i]));
            } else {
                output.push_str(cell);
            }
        }
        output.push('\n');
    }

    output
}

// ============================================================================
// Stack display
// ============================================================================

/// Format stack list for display
pub fn format_stack_list(stacks: &[StackInfo]) -> String {
    let headers = &["NAME", "ENVIRONMENT", "DEPENDS ON", "RESOURCES", "OUTPUTS"];
    let rows: Vec<Vec<String>> = stacks
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.environment.clone(),
                if s.dependencies.is_empty() {
                    "-".to_string()
                } else {
                    s.dependencies.join(",")
                },
                s.resources.to_string(),
                s.outputs.to_string(),
            ]
        })
        .collect();

    format_table(headers, rows)
}

/// Format the result of a synth run
pub fn format_synth_summary(summary: &SynthSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Synthesized {} stack(s) to {}\n\n",
        summary.stacks.len(),
        summary.output_dir.display()
    ));
    output.push_str(&format_stack_list(&summary.stacks));

    output.push_str("\nFiles:\n");
    for file in &summary.files {
        output.push_str(&format!("  {}\n", file.display()));
    }

    let order: Vec<&str> = summary.stacks.iter().map(|s| s.name.as_str()).collect();
    output.push_str(&format!("\nDeploy order: {}\n", order.join(" -> ")));

    output
}

// ============================================================================
// Validation display
// ============================================================================

/// Format validation result for display
pub fn format_validation_result(result: &ValidationResult, path: &str) -> String {
    let mut output = String::new();

    match (&result.config, result.valid) {
        (Some(config), true) => {
            output.push_str(&format!("✓ {} is valid\n\n", path));
            output.push_str(&format!("  Application: {}\n", config.application));
            output.push_str(&format!("  Endpoint:    https://{}\n", config.fqdn()));
            output.push_str(&format!("  VPC CIDR:    {}\n", config.cidr));
            output.push_str(&format!("  Port:        {}\n", config.port));
            output.push_str(&format!(
                "  Stacks:      {} -> {}\n",
                config.stacks.pre_container, config.stacks.post_container
            ));
        }
        _ => {
            output.push_str(&format!("✗ {} is invalid\n\n", path));
            if let Some(ref error) = result.error {
                output.push_str(&format!("  Error: {}\n", error));
            }
        }
    }

    output
}
