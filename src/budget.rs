//! Resource budgets enforced while the tree is being built.
//!
//! The enforcer sees every event the builder consumes, so pathological
//! inputs (deep nesting, anchor storms, huge scalars) are rejected before
//! the corresponding tree is materialized.

use std::collections::HashSet;

use nohash_hasher::BuildNoHashHasher;
use serde::{Deserialize, Serialize};

use crate::de::Ev;

/// Budgets for one decode call.
///
/// The defaults are permissive for typical documents while stopping
/// obviously resource-amplifying inputs.
///
/// ```rust
/// let options = dynyaml::decode_options! {
///     budget: Some(dynyaml::budget! {
///         max_depth: 16,
///     }),
/// };
/// let ctx = dynyaml::CodecContext::default();
/// let value = dynyaml::from_str_with_options("a: [1, 2]", &options, &ctx).unwrap();
/// assert!(value.get("a").is_some());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Budget {
    /// Maximum total events (every scalar, alias, start and end).
    ///
    /// Default: 1,000,000
    pub max_events: usize,
    /// Maximum number of alias (`*ref`) events.
    ///
    /// Default: 50,000
    pub max_aliases: usize,
    /// Maximum number of distinct anchors.
    ///
    /// Default: 50,000
    pub max_anchors: usize,
    /// Maximum nesting depth of sequences and mappings.
    ///
    /// Default: 2,000
    pub max_depth: usize,
    /// Maximum number of documents in the stream.
    ///
    /// Default: 1,024
    pub max_documents: usize,
    /// Maximum number of nodes (scalars, sequence starts, mapping starts).
    ///
    /// Default: 250,000
    pub max_nodes: usize,
    /// Maximum total bytes of scalar text.
    ///
    /// Default: 67,108,864 (64 MiB)
    pub max_total_scalar_bytes: usize,
    /// Maximum number of merge keys (`<<`) expanded.
    ///
    /// Default: 10,000
    pub max_merge_keys: usize,
    /// Reject inputs with many more aliases than anchors.
    ///
    /// Default: true
    pub enforce_alias_anchor_ratio: bool,
    /// Aliases needed before the ratio check applies.
    ///
    /// Default: 100
    pub alias_anchor_min_aliases: usize,
    /// Breach when `aliases > multiplier * anchors`.
    ///
    /// Default: 10
    pub alias_anchor_ratio_multiplier: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_events: 1_000_000,
            max_aliases: 50_000,
            max_anchors: 50_000,
            max_depth: 2_000,
            max_documents: 1_024,
            max_nodes: 250_000,
            max_total_scalar_bytes: 64 * 1024 * 1024,
            max_merge_keys: 10_000,
            enforce_alias_anchor_ratio: true,
            alias_anchor_min_aliases: 100,
            alias_anchor_ratio_multiplier: 10,
        }
    }
}

/// Which limit was exceeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BudgetBreach {
    Events { events: usize },
    Aliases { aliases: usize },
    Anchors { anchors: usize },
    Depth { depth: usize },
    Documents { documents: usize },
    Nodes { nodes: usize },
    ScalarBytes { total_scalar_bytes: usize },
    MergeKeys { merge_keys: usize },
    AliasAnchorRatio { aliases: usize, anchors: usize },
    /// Nodes copied into the tree through aliases exceeded [`crate::AliasLimits`].
    AliasNodes { nodes: usize },
    /// One anchor was referenced more often than [`crate::AliasLimits`] allows.
    AliasExpansions { anchor: usize, expansions: usize },
}

/// Counters gathered during one decode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BudgetReport {
    /// `Some(..)` if a limit was exceeded.
    pub breached: Option<BudgetBreach>,
    pub events: usize,
    pub aliases: usize,
    pub anchors: usize,
    pub documents: usize,
    pub nodes: usize,
    pub max_depth: usize,
    pub total_scalar_bytes: usize,
    pub merge_keys: usize,
}

#[derive(Debug)]
pub(crate) struct BudgetEnforcer {
    budget: Budget,
    report: BudgetReport,
    depth: usize,
    anchors: HashSet<usize, BuildNoHashHasher<usize>>,
}

impl BudgetEnforcer {
    pub(crate) fn new(budget: Budget) -> Self {
        Self {
            budget,
            report: BudgetReport::default(),
            depth: 0,
            anchors: HashSet::with_capacity_and_hasher(64, BuildNoHashHasher::default()),
        }
    }

    fn trip(&mut self, breach: BudgetBreach) -> Result<(), BudgetBreach> {
        self.report.breached = Some(breach.clone());
        Err(breach)
    }

    /// Count one event against the limits.
    pub(crate) fn observe(&mut self, ev: &Ev) -> Result<(), BudgetBreach> {
        self.report.events += 1;
        if self.report.events > self.budget.max_events {
            return self.trip(BudgetBreach::Events {
                events: self.report.events,
            });
        }

        match ev {
            Ev::DocumentStart { .. } => {
                self.report.documents += 1;
                if self.report.documents > self.budget.max_documents {
                    return self.trip(BudgetBreach::Documents {
                        documents: self.report.documents,
                    });
                }
            }
            Ev::Alias { .. } => {
                self.report.aliases += 1;
                if self.report.aliases > self.budget.max_aliases {
                    return self.trip(BudgetBreach::Aliases {
                        aliases: self.report.aliases,
                    });
                }
            }
            Ev::Scalar { value, anchor, .. } => {
                self.node()?;
                self.report.total_scalar_bytes =
                    self.report.total_scalar_bytes.saturating_add(value.len());
                if self.report.total_scalar_bytes > self.budget.max_total_scalar_bytes {
                    return self.trip(BudgetBreach::ScalarBytes {
                        total_scalar_bytes: self.report.total_scalar_bytes,
                    });
                }
                self.anchor(*anchor)?;
            }
            Ev::SeqStart { anchor, .. } | Ev::MapStart { anchor, .. } => {
                self.node()?;
                self.depth += 1;
                self.report.max_depth = self.report.max_depth.max(self.depth);
                if self.depth > self.budget.max_depth {
                    return self.trip(BudgetBreach::Depth { depth: self.depth });
                }
                self.anchor(*anchor)?;
            }
            Ev::SeqEnd { .. } | Ev::MapEnd { .. } => {
                self.depth = self.depth.saturating_sub(1);
            }
        }
        Ok(())
    }

    /// Count one expanded merge key.
    pub(crate) fn observe_merge_key(&mut self) -> Result<(), BudgetBreach> {
        self.report.merge_keys += 1;
        if self.report.merge_keys > self.budget.max_merge_keys {
            return self.trip(BudgetBreach::MergeKeys {
                merge_keys: self.report.merge_keys,
            });
        }
        Ok(())
    }

    fn node(&mut self) -> Result<(), BudgetBreach> {
        self.report.nodes += 1;
        if self.report.nodes > self.budget.max_nodes {
            return self.trip(BudgetBreach::Nodes {
                nodes: self.report.nodes,
            });
        }
        Ok(())
    }

    fn anchor(&mut self, id: usize) -> Result<(), BudgetBreach> {
        if id != 0 && self.anchors.insert(id) {
            self.report.anchors = self.anchors.len();
            if self.report.anchors > self.budget.max_anchors {
                return self.trip(BudgetBreach::Anchors {
                    anchors: self.report.anchors,
                });
            }
        }
        Ok(())
    }

    /// Apply the end-of-stream alias/anchor ratio heuristic.
    pub(crate) fn finalize(mut self) -> BudgetReport {
        let report = &mut self.report;
        if report.breached.is_none()
            && self.budget.enforce_alias_anchor_ratio
            && report.aliases >= self.budget.alias_anchor_min_aliases
            && (report.anchors == 0
                || report.aliases
                    > self
                        .budget
                        .alias_anchor_ratio_multiplier
                        .saturating_mul(report.anchors))
        {
            report.breached = Some(BudgetBreach::AliasAnchorRatio {
                aliases: report.aliases,
                anchors: report.anchors,
            });
        }
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use saphyr_parser::ScalarStyle;

    fn scalar(anchor: usize) -> Ev {
        Ev::Scalar {
            value: "x".into(),
            tag: None,
            style: ScalarStyle::Plain,
            anchor,
            location: Location::UNKNOWN,
        }
    }

    #[test]
    fn depth_trips() {
        let mut enforcer = BudgetEnforcer::new(Budget {
            max_depth: 2,
            ..Budget::default()
        });
        let start = Ev::SeqStart {
            tag: None,
            anchor: 0,
            location: Location::UNKNOWN,
        };
        assert!(enforcer.observe(&start).is_ok());
        assert!(enforcer.observe(&start).is_ok());
        assert_eq!(
            enforcer.observe(&start),
            Err(BudgetBreach::Depth { depth: 3 })
        );
    }

    #[test]
    fn anchors_counted_once_per_id() {
        let mut enforcer = BudgetEnforcer::new(Budget {
            max_anchors: 2,
            ..Budget::default()
        });
        assert!(enforcer.observe(&scalar(1)).is_ok());
        assert!(enforcer.observe(&scalar(1)).is_ok());
        assert!(enforcer.observe(&scalar(2)).is_ok());
        assert_eq!(
            enforcer.observe(&scalar(3)),
            Err(BudgetBreach::Anchors { anchors: 3 })
        );
    }

    #[test]
    fn ratio_checked_at_the_end() {
        let mut enforcer = BudgetEnforcer::new(Budget {
            alias_anchor_min_aliases: 2,
            alias_anchor_ratio_multiplier: 1,
            ..Budget::default()
        });
        enforcer.observe(&scalar(1)).unwrap();
        for _ in 0..3 {
            enforcer
                .observe(&Ev::Alias {
                    anchor: 1,
                    location: Location::UNKNOWN,
                })
                .unwrap();
        }
        let report = enforcer.finalize();
        assert_eq!(
            report.breached,
            Some(BudgetBreach::AliasAnchorRatio {
                aliases: 3,
                anchors: 1
            })
        );
    }

    #[test]
    fn merge_keys_limited() {
        let mut enforcer = BudgetEnforcer::new(Budget {
            max_merge_keys: 1,
            ..Budget::default()
        });
        assert!(enforcer.observe_merge_key().is_ok());
        assert_eq!(
            enforcer.observe_merge_key(),
            Err(BudgetBreach::MergeKeys { merge_keys: 2 })
        );
    }
}
