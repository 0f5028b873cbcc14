//! Metrics collection for a graph store
//!
//! Each store owns its own Prometheus registry, so several stores can live in
//! one process without colliding on metric names.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

use crate::core::error::{Error, Result};

/// Structural mutation counters
pub struct OperationMetrics {
    /// Total number of nodes added
    pub nodes_added: IntCounter,
    /// Total number of nodes removed
    pub nodes_removed: IntCounter,
    /// Total number of edges added
    pub edges_added: IntCounter,
    /// Total number of edges removed
    pub edges_removed: IntCounter,
    /// Total number of attribute writes
    pub attributes_set: IntCounter,
}

/// View lifecycle counters
pub struct ViewMetrics {
    /// Total number of views created
    pub views_created: IntCounter,
    /// Total number of views destroyed
    pub views_destroyed: IntCounter,
}

/// Index usage counters
pub struct IndexMetrics {
    /// Value index handles handed out
    pub value_queries: IntCounter,
    /// Timestamp index handles handed out
    pub timestamp_queries: IntCounter,
}

/// Size gauges
pub struct SizeMetrics {
    /// Live nodes in the base store
    pub live_nodes: IntGauge,
    /// Live edges in the base store
    pub live_edges: IntGauge,
    /// Live views
    pub live_views: IntGauge,
}

/// Every collector of one store, registered in its own registry
pub struct StoreMetrics {
    registry: Registry,
    /// Structural mutations
    pub operations: OperationMetrics,
    /// View lifecycle
    pub views: ViewMetrics,
    /// Index usage
    pub index: IndexMetrics,
    /// Sizes
    pub size: SizeMetrics,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter> {
    let c = IntCounter::new(name, help)?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge> {
    let g = IntGauge::new(name, help)?;
    registry.register(Box::new(g.clone()))?;
    Ok(g)
}

impl StoreMetrics {
    /// Create and register every collector in a fresh registry
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let operations = OperationMetrics {
            nodes_added: counter(&registry, "dgs_nodes_added_total", "Total number of nodes added")?,
            nodes_removed: counter(&registry, "dgs_nodes_removed_total", "Total number of nodes removed")?,
            edges_added: counter(&registry, "dgs_edges_added_total", "Total number of edges added")?,
            edges_removed: counter(&registry, "dgs_edges_removed_total", "Total number of edges removed")?,
            attributes_set: counter(&registry, "dgs_attributes_set_total", "Total number of attribute writes")?,
        };
        let views = ViewMetrics {
            views_created: counter(&registry, "dgs_views_created_total", "Total number of views created")?,
            views_destroyed: counter(&registry, "dgs_views_destroyed_total", "Total number of views destroyed")?,
        };
        let index = IndexMetrics {
            value_queries: counter(&registry, "dgs_value_index_queries_total", "Value index handles handed out")?,
            timestamp_queries: counter(
                &registry,
                "dgs_timestamp_index_queries_total",
                "Timestamp index handles handed out",
            )?,
        };
        let size = SizeMetrics {
            live_nodes: gauge(&registry, "dgs_live_nodes", "Live nodes in the base store")?,
            live_edges: gauge(&registry, "dgs_live_edges", "Live edges in the base store")?,
            live_views: gauge(&registry, "dgs_live_views", "Live views")?,
        };
        Ok(Self { registry, operations, views, index, size })
    }

    /// Registry holding every collector of this store
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode the current values in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| Error::invalid_state(format!("metrics output is not UTF-8: {}", e)))
    }
}

impl std::fmt::Debug for StoreMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreMetrics")
            .field("live_nodes", &self.size.live_nodes.get())
            .field("live_edges", &self.size.live_edges.get())
            .field("live_views", &self.size.live_views.get())
            .finish()
    }
}
