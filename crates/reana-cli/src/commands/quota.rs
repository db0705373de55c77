//! Quota reporting command.

use std::io::Write;

use colored::{ColoredString, Colorize};

use reana_api::ops::UserInfoResponse;
use reana_api::types::QuotaResource;

use crate::cli::{QuotaReport, QuotaShowArgs};
use crate::client::ReanaClient;
use crate::error::CliError;

/// Handler for the quota-show command.
pub struct QuotaShowCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> QuotaShowCommand<'a> {
    /// Creates a new quota-show command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the quota-show command.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the resource is unknown.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        args: &QuotaShowArgs,
    ) -> Result<(), CliError> {
        let quota = match self.client.user_info().await? {
            UserInfoResponse::Ok(payload) => payload.quota,
            UserInfoResponse::Forbidden(msg) => return Err(CliError::server(403, msg)),
            UserInfoResponse::ServerError(msg) => return Err(CliError::server(500, msg)),
        };

        let selected: Vec<(&String, &QuotaResource)> = match &args.resource {
            Some(resource) => {
                let Some(entry) = quota.get_key_value(resource) else {
                    let available: Vec<&str> =
                        quota.keys().map(String::as_str).collect();
                    return Err(CliError::Validation(format!(
                        "Resource '{resource}' is not valid. Available resources are: {}",
                        available.join(", ")
                    )));
                };
                vec![entry]
            }
            None => quota.iter().collect(),
        };

        for (name, resource) in selected {
            match args.report {
                Some(report) => writeln!(out, "{name}: {}", render_report(resource, report))?,
                None => writeln!(out, "{name}: {}", render_summary(resource))?,
            }
        }
        Ok(())
    }
}

fn render_report(resource: &QuotaResource, report: QuotaReport) -> String {
    let metric = resource.stats.get(report.as_str());
    match metric {
        Some(metric) if metric.raw != 0.0 => {
            if metric.human_readable.is_empty() {
                metric.raw.to_string()
            } else {
                metric.human_readable.clone()
            }
        }
        _ => format!("No {}.", report.as_str()),
    }
}

fn render_summary(resource: &QuotaResource) -> ColoredString {
    let usage = resource.stats.get("usage");
    let limit = resource.stats.get("limit");
    let usage_text = usage.map_or_else(|| "0".to_owned(), |m| m.human_readable.clone());

    let text = match limit {
        Some(limit) if limit.raw > 0.0 => {
            let used = usage.map_or(0.0, |m| m.raw);
            let percentage = (used / limit.raw * 100.0).round();
            format!(
                "{usage_text} out of {} used ({percentage}%)",
                limit.human_readable
            )
        }
        _ => format!("{usage_text} used"),
    };

    match resource.health.as_deref() {
        Some("healthy") => text.green(),
        Some("warning") => text.yellow(),
        Some("critical") => text.red(),
        _ => text.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reana_api::types::QuotaMetric;
    use std::collections::BTreeMap;

    fn resource(usage: f64, limit: f64, health: Option<&str>) -> QuotaResource {
        let mut stats = BTreeMap::new();
        stats.insert(
            "usage".to_owned(),
            QuotaMetric { human_readable: format!("{usage} GiB"), raw: usage },
        );
        if limit > 0.0 {
            stats.insert(
                "limit".to_owned(),
                QuotaMetric { human_readable: format!("{limit} GiB"), raw: limit },
            );
        }
        QuotaResource { health: health.map(str::to_owned), stats }
    }

    #[test]
    fn summary_shows_usage_out_of_limit_with_percentage() {
        let text = render_summary(&resource(2.0, 10.0, Some("healthy"))).to_string();
        assert!(text.contains("2 GiB out of 10 GiB used (20%)"));
    }

    #[test]
    fn summary_without_limit_shows_usage_only() {
        let text = render_summary(&resource(2.0, 0.0, None)).to_string();
        assert!(text.contains("2 GiB used"));
        assert!(!text.contains("out of"));
    }

    #[test]
    fn absent_report_metric_prints_no_metric() {
        let quota = resource(2.0, 0.0, None);
        assert_eq!(render_report(&quota, QuotaReport::Limit), "No limit.");
    }

    #[test]
    fn present_report_metric_prints_human_form() {
        let quota = resource(2.0, 10.0, None);
        assert_eq!(render_report(&quota, QuotaReport::Limit), "10 GiB");
    }
}
