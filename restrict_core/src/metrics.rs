use serde::Serialize;

use crate::evaluator::Verdict;

/// Why an attempt was let through without consulting the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    Warmup,
    PickupAfterBuyTime,
    InactiveActor,
    Vip,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestrictMetrics {
    pub attempts: u64,
    pub fast_path: u64,
    pub exempt_warmup: u64,
    pub exempt_pickup: u64,
    pub exempt_inactive: u64,
    pub exempt_vip: u64,
    pub evaluations: u64,
    pub allowed: u64,
    pub denied_disabled: u64,
    pub denied_limit: u64,
    pub messages_sent: u64,
    pub messages_suppressed: u64,
    pub map_loads: u64,
}

impl RestrictMetrics {
    pub fn record_exemption(&mut self, exemption: Exemption) {
        match exemption {
            Exemption::Warmup => self.exempt_warmup += 1,
            Exemption::PickupAfterBuyTime => self.exempt_pickup += 1,
            Exemption::InactiveActor => self.exempt_inactive += 1,
            Exemption::Vip => self.exempt_vip += 1,
        }
    }

    pub fn record_verdict(&mut self, verdict: Verdict) {
        self.evaluations += 1;
        match verdict {
            Verdict::NotRestricted => self.allowed += 1,
            Verdict::Disabled => self.denied_disabled += 1,
            Verdict::LimitReached { .. } => self.denied_limit += 1,
        }
    }

    pub fn denied(&self) -> u64 {
        self.denied_disabled + self.denied_limit
    }
}
