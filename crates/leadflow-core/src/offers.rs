//! Offer Selection Engine
//!
//! Chooses which commercial offer a visitor is routed to: first-active
//! for the `single` rule, weighted random for `rotate`, and a ranked
//! candidate list for `offer_wall`. Pure except for the random draw;
//! the seam taking an explicit rng is what the proportion tests drive.

use leadflow_common::types::RoutingRule;
use leadflow_storage::models::{Offer, RoutingConfig};
use rand::Rng;

/// Stateless selection engine
#[derive(Debug, Clone, Copy, Default)]
pub struct OfferEngine;

impl OfferEngine {
    pub fn new() -> Self {
        Self
    }

    /// Select one offer, or `None` when no active offer exists
    pub fn select<'a>(&self, offers: &'a [Offer], config: &RoutingConfig) -> Option<&'a Offer> {
        self.select_with(offers, config, &mut rand::thread_rng())
    }

    /// Selection with an injected random source
    pub fn select_with<'a, R: Rng>(
        &self,
        offers: &'a [Offer],
        config: &RoutingConfig,
        rng: &mut R,
    ) -> Option<&'a Offer> {
        let active: Vec<&Offer> = offers.iter().filter(|o| o.is_active).collect();
        if active.is_empty() {
            return None;
        }

        match config.rule {
            RoutingRule::Rotate => Some(Self::weighted_pick(&active, rng)),
            // `single` always takes the first active offer; `offer_wall`
            // defers the real choice to the user-facing list but still
            // resolves to a deterministic candidate here.
            RoutingRule::Single | RoutingRule::OfferWall => Some(active[0]),
        }
    }

    /// Weighted-by-mass pick over active offers in stored order.
    /// All-zero weights degrade to the first offer, not an error.
    fn weighted_pick<'a, R: Rng>(active: &[&'a Offer], rng: &mut R) -> &'a Offer {
        let total_weight: u64 = active.iter().map(|o| u64::from(o.weight)).sum();
        if total_weight == 0 {
            return active[0];
        }

        let mut r = rng.gen_range(0..total_weight);
        for offer in active {
            let weight = u64::from(offer.weight);
            if r < weight {
                return offer;
            }
            r -= weight;
        }

        // Unreachable while total_weight equals the sum of the walk,
        // but the walk has to return something.
        active[active.len() - 1]
    }

    /// Candidate ordering for the offer wall: active offers by
    /// popularity, then by numeric payout.
    pub fn rank<'a>(&self, offers: &'a [Offer]) -> Vec<&'a Offer> {
        let mut active: Vec<&Offer> = offers.iter().filter(|o| o.is_active).collect();
        active.sort_by(|a, b| {
            b.popularity
                .cmp(&a.popularity)
                .then_with(|| {
                    b.payout_value()
                        .partial_cmp(&a.payout_value())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });
        active
    }
}
