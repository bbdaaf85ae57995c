//! HTML status page.

use std::fmt::Write;

use crate::node::{CollectionResult, RouterNode};

/// Render the status page listing every node.
///
/// `token` is the caller's accepted token; it is carried in the metrics link.
pub fn render(nodes: &[impl AsRef<RouterNode>], metrics_path: &str, token: &str) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("<html>");
    out.push_str("<head><title>Prometheus Exporter for GoBGP</title></head>");
    out.push_str("<body>");
    out.push_str("<h1>Prometheus Exporter for GoBGP</h1>");
    out.push_str("<table border='1'>");
    out.push_str("<tr><th>Node</th><th>Last Result</th><th>Last Scrape</th><th>Metrics</th></tr>");

    for node in nodes {
        let node = node.as_ref();
        let status = node.status();
        let color = match status.result {
            CollectionResult::Success => "lightgreen",
            CollectionResult::Failure => "tomato",
            CollectionResult::Unknown => "lightgray",
        };

        write!(
            out,
            "<tr><td>{}</td><td style=\"background-color:{}\">{}</td><td>{}</td>\
             <td><a href='{}?x-token={}'>Metrics</a></td></tr>",
            node.address(),
            color,
            status.result,
            status.timestamp.as_deref().unwrap_or(""),
            metrics_path,
            token
        )
        .ok();
    }

    out.push_str("</table>");
    out.push_str("</body>");
    out.push_str("</html>");
    out
}
