//! Reachability probing
//!
//! Probes every configured target concurrently with a bounded wait and
//! reports reachability plus round-trip latency. Only reachability and
//! timing are observed; response status and body are ignored. Probes share
//! no mutable state and complete in no guaranteed order; the aggregate
//! report is assembled once all of them have finished.

use rosterlink_common::config::ProbeTarget;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Bounded wait before a target is treated as unreachable
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of probing one target
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeStatus {
    /// Target answered within the bound
    Ok { elapsed_ms: u64 },
    /// No answer within the bound
    Timeout,
    /// Connection failed outright
    Unreachable { reason: String },
}

/// Per-target probe result
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub name: String,
    pub url: String,
    #[serde(flatten)]
    pub outcome: ProbeStatus,
}

/// Aggregate report over all configured targets
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub targets: Vec<ProbeResult>,
    pub all_reachable: bool,
}

/// Probe all targets concurrently and await aggregate completion
pub async fn probe_targets(http: &reqwest::Client, targets: &[ProbeTarget]) -> ProbeReport {
    let probes = targets.iter().map(|target| probe_one(http, target));
    let targets = futures::future::join_all(probes).await;
    let all_reachable = targets
        .iter()
        .all(|result| matches!(result.outcome, ProbeStatus::Ok { .. }));

    tracing::info!(
        total = targets.len(),
        all_reachable,
        "Reachability probe completed"
    );
    ProbeReport {
        targets,
        all_reachable,
    }
}

async fn probe_one(http: &reqwest::Client, target: &ProbeTarget) -> ProbeResult {
    let started = Instant::now();
    let request = http.get(&target.url).send();

    let outcome = match tokio::time::timeout(PROBE_TIMEOUT, request).await {
        // any HTTP answer counts as reachable, whatever its status
        Ok(Ok(_response)) => ProbeStatus::Ok {
            elapsed_ms: started.elapsed().as_millis() as u64,
        },
        Ok(Err(e)) if e.is_timeout() => ProbeStatus::Timeout,
        Ok(Err(e)) => ProbeStatus::Unreachable {
            reason: e.to_string(),
        },
        Err(_) => ProbeStatus::Timeout,
    };

    ProbeResult {
        name: target.name.clone(),
        url: target.url.clone(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refused_connection_reports_unreachable() {
        // port 1 on loopback refuses immediately
        let targets = vec![ProbeTarget {
            name: "closed".to_string(),
            url: "http://127.0.0.1:1/".to_string(),
        }];

        let report = probe_targets(&reqwest::Client::new(), &targets).await;
        assert!(!report.all_reachable);
        assert_eq!(report.targets.len(), 1);
        assert!(matches!(
            report.targets[0].outcome,
            ProbeStatus::Unreachable { .. }
        ));
    }

    #[tokio::test]
    async fn empty_target_list_is_trivially_reachable() {
        let report = probe_targets(&reqwest::Client::new(), &[]).await;
        assert!(report.all_reachable);
        assert!(report.targets.is_empty());
    }

    #[test]
    fn probe_status_serializes_with_a_status_tag() {
        let result = ProbeResult {
            name: "rest-store".to_string(),
            url: "http://localhost:4000".to_string(),
            outcome: ProbeStatus::Ok { elapsed_ms: 12 },
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["elapsed_ms"], 12);

        let timeout = serde_json::to_value(ProbeStatus::Timeout).unwrap();
        assert_eq!(timeout["status"], "timeout");
    }
}
