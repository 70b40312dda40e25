//! NATS subject hierarchy.
//!
//! All dashboard subjects live under a configurable prefix (default
//! `dashboard`) so several simulations can share one NATS cluster.

/// Default root prefix for dashboard subjects.
pub const DEFAULT_PREFIX: &str = "dashboard";

/// Subject builder bound to one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subjects {
    prefix: String,
}

impl Subjects {
    /// Create a builder for the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    // ── Inbound channels ────────────────────────────────────────────────────

    /// Entity created/destroyed/moved events. Simulation → dashboard.
    ///
    /// `<prefix>.entities`
    #[must_use]
    pub fn entities(&self) -> String {
        format!("{}.entities", self.prefix)
    }

    /// Aggregate exchange snapshots. Simulation → dashboard.
    ///
    /// `<prefix>.exchange`
    #[must_use]
    pub fn exchange(&self) -> String {
        format!("{}.exchange", self.prefix)
    }

    /// Free-form simulation log events. Simulation → dashboard.
    ///
    /// `<prefix>.events`
    #[must_use]
    pub fn events(&self) -> String {
        format!("{}.events", self.prefix)
    }

    // ── Outbound commands ───────────────────────────────────────────────────

    /// Entity creation requests. Dashboard → simulation.
    ///
    /// `<prefix>.entity.create`
    #[must_use]
    pub fn entity_create(&self) -> String {
        format!("{}.entity.create", self.prefix)
    }

    /// Entity destruction requests. Dashboard → simulation.
    ///
    /// `<prefix>.entity.destroy`
    #[must_use]
    pub fn entity_destroy(&self) -> String {
        format!("{}.entity.destroy", self.prefix)
    }

    // ── Request/reply ───────────────────────────────────────────────────────

    /// Entity detail lookup.
    ///
    /// `<prefix>.entity.details`
    #[must_use]
    pub fn entity_details(&self) -> String {
        format!("{}.entity.details", self.prefix)
    }

    /// Full grid snapshot used to bootstrap (and re-bootstrap) the index.
    ///
    /// `<prefix>.grid.snapshot`
    #[must_use]
    pub fn grid_snapshot(&self) -> String {
        format!("{}.grid.snapshot", self.prefix)
    }
}

impl Default for Subjects {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
