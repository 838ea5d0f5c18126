use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters accumulated across resolve passes.
#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    passes: u64,
    nodes_resolved: u64,
    widgets_placed: u64,
    clamped_extents: u64,
    size_pulls: u64,
    geometry_changes: u64,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&mut self) {
        self.passes = self.passes.saturating_add(1);
    }

    pub fn record_node(&mut self) {
        self.nodes_resolved = self.nodes_resolved.saturating_add(1);
    }

    pub fn record_widget(&mut self) {
        self.widgets_placed = self.widgets_placed.saturating_add(1);
    }

    pub fn record_clamp(&mut self) {
        self.clamped_extents = self.clamped_extents.saturating_add(1);
    }

    pub fn record_size_pull(&mut self) {
        self.size_pulls = self.size_pulls.saturating_add(1);
    }

    pub fn record_geometry_change(&mut self) {
        self.geometry_changes = self.geometry_changes.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            passes: self.passes,
            nodes_resolved: self.nodes_resolved,
            widgets_placed: self.widgets_placed,
            clamped_extents: self.clamped_extents,
            size_pulls: self.size_pulls,
            geometry_changes: self.geometry_changes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub passes: u64,
    pub nodes_resolved: u64,
    pub widgets_placed: u64,
    pub clamped_extents: u64,
    pub size_pulls: u64,
    pub geometry_changes: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "layout_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("passes".to_string(), json!(self.passes));
        map.insert("nodes_resolved".to_string(), json!(self.nodes_resolved));
        map.insert("widgets_placed".to_string(), json!(self.widgets_placed));
        map.insert("clamped_extents".to_string(), json!(self.clamped_extents));
        map.insert("size_pulls".to_string(), json!(self.size_pulls));
        map.insert("geometry_changes".to_string(), json!(self.geometry_changes));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_counters() {
        let mut metrics = LayoutMetrics::new();
        metrics.record_pass();
        metrics.record_node();
        metrics.record_node();
        metrics.record_clamp();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.passes, 1);
        assert_eq!(snapshot.nodes_resolved, 2);
        assert_eq!(snapshot.clamped_extents, 1);

        let event = snapshot.to_log_event("boxlayout::metrics");
        assert_eq!(event.message, "layout_metrics");
        assert_eq!(event.fields["nodes_resolved"], json!(2));
    }
}
