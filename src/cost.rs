// Link costs, resolved once at startup from CUSTO_<a>_<b>_net variables

use std::collections::HashMap;

use log::warn;

use crate::error::{AppError, Result};

/// Cost of the direct link to each potential neighbor. The compose layer
/// exports one `CUSTO_<a>_<b>_net` variable per edge; the pair order is
/// arbitrary, so both orders are scanned, with `(self, neighbor)` winning
/// when both are present.
#[derive(Debug, Clone, Default)]
pub struct CostOracle {
    costs: HashMap<String, i32>,
}

impl CostOracle {
    pub fn from_env(router_id: &str) -> Self {
        Self::from_vars(router_id, std::env::vars())
    }

    pub fn from_vars(router_id: &str, vars: impl Iterator<Item = (String, String)>) -> Self {
        let self_first = format!("{}_", router_id);
        let self_last = format!("_{}", router_id);
        let mut costs: HashMap<String, i32> = HashMap::new();
        let mut reversed: HashMap<String, i32> = HashMap::new();

        for (key, value) in vars {
            let Some(pair) = key
                .strip_prefix("CUSTO_")
                .and_then(|rest| rest.strip_suffix("_net"))
            else {
                continue;
            };
            let cost = match value.trim().parse::<i32>() {
                Ok(cost) if cost > 0 => cost,
                _ => {
                    warn!("[INIT] ignoring {}: cost must be a positive integer, got {:?}", key, value);
                    continue;
                }
            };
            if let Some(neighbor) = pair.strip_prefix(&self_first) {
                costs.insert(neighbor.to_string(), cost);
            } else if let Some(neighbor) = pair.strip_suffix(&self_last) {
                reversed.insert(neighbor.to_string(), cost);
            }
        }
        for (neighbor, cost) in reversed {
            costs.entry(neighbor).or_insert(cost);
        }
        CostOracle { costs }
    }

    /// Pure map lookup on the packet-processing hot path.
    pub fn cost_to(&self, neighbor_id: &str) -> Option<i32> {
        self.costs.get(neighbor_id).copied()
    }

    /// Like [`cost_to`](Self::cost_to), but a miss is an error the caller
    /// can report before dropping the packet.
    pub fn require(&self, router_id: &str, neighbor_id: &str) -> Result<i32> {
        self.cost_to(neighbor_id).ok_or_else(|| {
            AppError::CostError(format!(
                "no CUSTO variable for link {} <-> {}",
                router_id, neighbor_id
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(entries: &[(&str, &str)]) -> impl Iterator<Item = (String, String)> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn resolves_both_pair_orders() {
        let oracle = CostOracle::from_vars(
            "rt0",
            vars(&[("CUSTO_rt0_rt1_net", "5"), ("CUSTO_rt2_rt0_net", "7")]),
        );
        assert_eq!(oracle.cost_to("rt1"), Some(5));
        assert_eq!(oracle.cost_to("rt2"), Some(7));
    }

    #[test]
    fn self_first_order_wins_over_reversed() {
        let oracle = CostOracle::from_vars(
            "rt0",
            vars(&[("CUSTO_rt1_rt0_net", "9"), ("CUSTO_rt0_rt1_net", "5")]),
        );
        assert_eq!(oracle.cost_to("rt1"), Some(5));
    }

    #[test]
    fn missing_neighbor_is_none() {
        let oracle = CostOracle::from_vars("rt0", vars(&[("CUSTO_rt0_rt1_net", "5")]));
        assert_eq!(oracle.cost_to("rt9"), None);
    }

    #[test]
    fn ignores_unrelated_and_malformed_vars() {
        let oracle = CostOracle::from_vars(
            "rt0",
            vars(&[
                ("CUSTO_rt1_rt2_net", "4"),
                ("CUSTO_rt0_rt3_net", "not-a-number"),
                ("CUSTO_rt0_rt4_net", "0"),
                ("PATH", "/usr/bin"),
            ]),
        );
        assert!(oracle.is_empty());
    }

    #[test]
    fn require_reports_the_link_pair() {
        let oracle = CostOracle::from_vars("rt0", vars(&[]));
        let err = oracle.require("rt0", "rt9").expect_err("missing cost");
        assert!(err.to_string().contains("rt0 <-> rt9"));
    }

    #[test]
    fn ids_sharing_a_prefix_do_not_collide() {
        let oracle = CostOracle::from_vars(
            "rt1",
            vars(&[("CUSTO_rt1_rt10_net", "3"), ("CUSTO_rt10_rt2_net", "8")]),
        );
        assert_eq!(oracle.cost_to("rt10"), Some(3));
        assert_eq!(oracle.cost_to("rt2"), None);
    }
}
