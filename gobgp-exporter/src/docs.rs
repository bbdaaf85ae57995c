//! Markdown reference table of exported metrics.

use std::fmt::Write;

use crate::descriptors;

/// Render every metric as a row of `| **Metric** | **Description** | **Labels** |`.
pub fn metrics_table() -> String {
    let mut out = String::new();
    out.push_str("| **Metric** | **Description** | **Labels** |\n");
    out.push_str("| ------ | ------- | ------ |\n");

    for descriptor in descriptors::describe() {
        let mut labels = descriptor.labels.to_vec();
        labels.sort_unstable();

        if labels.is_empty() {
            writeln!(out, "| `{}` | {} | |", descriptor.name, descriptor.help).ok();
        } else {
            writeln!(
                out,
                "| `{}` | {} | `{}` |",
                descriptor.name,
                descriptor.help,
                labels.join("`, `")
            )
            .ok();
        }
    }

    out
}
