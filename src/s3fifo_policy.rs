//! Weighted S3-FIFO eviction policy.
//!
//! Three resident FIFO tiers plus a ghost index:
//! - **Small**: Probation for small objects. New objects enter here.
//! - **Large**: Probation for objects above the size threshold.
//! - **Main**: Long-term storage. Promoted objects and ghost hits land here.
//! - **Ghost**: Ids of objects evicted without promotion.
//!
//! On eviction from Small or Large:
//! - If score >= threshold: promote to Main with a fresh frequency
//! - Otherwise: record the id in the ghost index, drop the object
//!
//! On eviction from Main:
//! - If score >= threshold: decay frequency and reinsert at tail (CLOCK-like)
//! - Otherwise: record the id in the ghost index, drop the object
//!
//! A miss whose id is found in the ghost index is admitted straight into
//! Main. Before every request the capacity planner may shift capacity
//! between the resident tiers; any tier left over its new budget is evicted
//! back under it.

use crate::cache_trait::EvictionPolicy;
use crate::config::{PolicyConfig, POLICY_NAME};
use crate::error::{PolicyError, PolicyResult};
use crate::eviction::{ItemFate, RetentionScorer};
use crate::fifo_queue::FifoTier;
use crate::metrics::PolicyMetrics;
use crate::object::{CacheObject, GhostEntry, ObjId, Request};
use crate::planner::{
    Adjustment, CapacityPlanner, RequestWindow, SignalSnapshot, TierBudgets, TierRatios,
    WorkloadSignals,
};
use crate::router::{Router, TierId};
use crate::tier::BoundedTier;
use tracing::{debug, info, trace};

/// Weighted S3-FIFO policy.
pub struct WeightedS3Fifo {
    /// Effective configuration.
    config: PolicyConfig,
    /// Total capacity in bytes shared by the resident tiers.
    capacity: u64,
    /// Current fractions of capacity per tier.
    ratios: TierRatios,
    /// Small probationary queue.
    small: FifoTier<CacheObject>,
    /// Main queue.
    main: FifoTier<CacheObject>,
    /// Large-object probationary queue.
    large: FifoTier<CacheObject>,
    /// Ghost index. `None` when the ghost ratio is zero.
    ghost: Option<FifoTier<GhostEntry>>,
    router: Router,
    scorer: RetentionScorer,
    planner: CapacityPlanner,
    /// Recent request mix fed to the planner by `get`.
    window: RequestWindow,
    /// Id removed from the ghost index by the last mutating lookup.
    ghost_hit: Option<ObjId>,
    /// Consecutive main-tier retentions since the last main-tier demotion.
    main_retained_streak: usize,
    metrics: PolicyMetrics,
}

impl WeightedS3Fifo {
    /// Create a policy over `capacity` bytes.
    pub fn new(capacity: u64, config: PolicyConfig) -> PolicyResult<Self> {
        config.validate()?;

        let ratios = TierRatios::new(config.s_ratio, config.m_ratio, config.lq_ratio);
        let budgets = ratios.budgets(capacity);
        let ghost_size = (capacity as f64 * config.ghost_size_ratio) as u64;

        info!(
            name = %config.name(),
            capacity,
            small = budgets.small,
            main = budgets.main,
            large = budgets.large,
            ghost = ghost_size,
            "policy initialized"
        );

        Ok(Self {
            capacity,
            ratios,
            small: FifoTier::new(budgets.small),
            main: FifoTier::new(budgets.main),
            large: FifoTier::new(budgets.large),
            ghost: (ghost_size > 0).then(|| FifoTier::new(ghost_size)),
            router: Router::new(config.size_threshold),
            scorer: RetentionScorer::from_config(&config),
            planner: CapacityPlanner::new(config.planner),
            window: RequestWindow::new(config.planner.window),
            ghost_hit: None,
            main_retained_streak: 0,
            metrics: PolicyMetrics::new(),
            config,
        })
    }

    /// Create a policy from a parameter string applied over the defaults.
    ///
    /// A `print` flag in `params` is ignored here; use
    /// [`PolicyConfig::from_params`] to observe it.
    pub fn from_params(capacity: u64, params: &str) -> PolicyResult<Self> {
        let parsed = PolicyConfig::from_params(params)?;
        Self::new(capacity, parsed.config)
    }

    /// Process one request: plan, look up, and admit on a miss.
    ///
    /// Returns `Ok(true)` on a hit.
    pub fn get(&mut self, request: &Request) -> PolicyResult<bool> {
        check_request(request)?;
        debug_assert!(self.occupied_bytes() <= self.capacity);

        self.window.record(self.router.is_large(request.size));
        self.plan();

        if self.find(request, true).is_some() {
            return Ok(true);
        }

        if !self.can_insert(request) {
            self.ghost_hit = None;
            return Ok(false);
        }

        let destination = self.destination(request);
        self.make_room(destination, request.size);
        self.insert(request)?;
        self.settle();

        Ok(false)
    }

    /// Run the capacity planner against the built-in request window.
    pub fn plan(&mut self) -> Adjustment {
        let signals = SignalSnapshot::capture(&self.window);
        self.plan_with(&signals)
    }

    /// Run the capacity planner against externally maintained signals, then
    /// resize every tier and evict until each is within its budget.
    pub fn plan_with<S: WorkloadSignals + ?Sized>(&mut self, signals: &S) -> Adjustment {
        let adjustment = self.planner.adjust(&mut self.ratios, signals);
        let budgets = self.ratios.budgets(self.capacity);

        if adjustment != Adjustment::Unchanged {
            self.metrics.planner_adjustments += 1;
            debug!(
                ?adjustment,
                small = budgets.small,
                main = budgets.main,
                large = budgets.large,
                "tier budgets adjusted"
            );
        }

        self.small.resize(budgets.small);
        self.main.resize(budgets.main);
        self.large.resize(budgets.large);
        self.settle();

        adjustment
    }

    /// Look up a resident object, checking Small, Main, then Large.
    ///
    /// With `mutate`, a hit increments the object's frequency (it is not
    /// moved), and a miss whose id is in the ghost index removes it from
    /// the index and marks the next admission of that id for Main.
    pub fn find(&mut self, request: &Request, mutate: bool) -> Option<&CacheObject> {
        let id = request.id;
        if !mutate {
            return self.peek(id);
        }

        self.ghost_hit = None;

        if let Some(tier) = self.tier_of(id) {
            let obj = self.tier_mut(tier).find_mut(id)?;
            obj.record_hit();
            return Some(&*obj);
        }

        if let Some(ghost) = self.ghost.as_mut()
            && ghost.remove(id).is_some()
        {
            self.ghost_hit = Some(id);
            self.metrics.ghost_hits += 1;
        }

        None
    }

    /// Look up a resident object without side effects.
    pub fn peek(&self, id: ObjId) -> Option<&CacheObject> {
        TierId::ALL.iter().find_map(|tier| self.tier(*tier).find(id))
    }

    /// Admit a missed object into Main (after a ghost hit), Large, or Small.
    ///
    /// The caller must already have made room in the destination tier.
    pub fn insert(&mut self, request: &Request) -> PolicyResult<&CacheObject> {
        check_request(request)?;

        let id = request.id;
        let flagged = self.ghost_hit.take() == Some(id);
        let in_ghost = self
            .ghost
            .as_mut()
            .is_some_and(|ghost| ghost.remove(id).is_some());

        for tier in TierId::ALL {
            self.tier_mut(tier).remove(id);
        }

        let destination = self.router.route(request.size, flagged || in_ghost);
        match destination {
            TierId::Small => {
                self.metrics.n_obj_admit_to_small += 1;
                self.metrics.n_byte_admit_to_small += request.size;
            }
            TierId::Main => {
                self.metrics.n_obj_admit_to_main += 1;
                self.metrics.n_byte_admit_to_main += request.size;
            }
            TierId::Large => {
                self.metrics.n_obj_admit_to_large += 1;
                self.metrics.n_byte_admit_to_large += request.size;
            }
        }

        let obj = self.tier_mut(destination).insert(CacheObject::new(request));
        Ok(&*obj)
    }

    /// Run one eviction step on each tier over its budget, in the order
    /// Small, Main, Large.
    ///
    /// Returns the number of objects that left their tier. A main-tier
    /// retention frees nothing, so callers repeat until every tier is
    /// within budget.
    pub fn evict(&mut self) -> usize {
        let mut evicted = 0;
        for tier in TierId::ALL {
            if self.tier(tier).is_over_budget() && self.evict_from(tier).frees_space() {
                evicted += 1;
            }
        }
        evicted
    }

    /// Preview of the next eviction. Not supported: the outcome depends on
    /// scoring and may cascade across tiers.
    pub fn to_evict(&self) -> PolicyResult<&CacheObject> {
        Err(PolicyError::Unsupported {
            operation: "to_evict",
        })
    }

    /// Remove an object from every tier and the ghost index.
    ///
    /// Returns `true` if any of them held it.
    pub fn remove(&mut self, id: ObjId) -> bool {
        let mut removed = false;
        for tier in TierId::ALL {
            removed |= self.tier_mut(tier).remove(id).is_some();
        }
        if let Some(ghost) = self.ghost.as_mut() {
            removed |= ghost.remove(id).is_some();
        }
        if self.ghost_hit == Some(id) {
            self.ghost_hit = None;
        }
        removed
    }

    /// Bytes held by Small, Main and Large.
    pub fn occupied_bytes(&self) -> u64 {
        TierId::ALL
            .iter()
            .map(|tier| self.tier(*tier).occupied_bytes())
            .sum()
    }

    /// Number of objects held by Small, Main and Large.
    pub fn object_count(&self) -> usize {
        TierId::ALL.iter().map(|tier| self.tier(*tier).len()).sum()
    }

    /// Returns `true` if the object fits within its destination tier's budget.
    pub fn can_insert(&self, request: &Request) -> bool {
        check_request(request).is_ok()
            && request.size <= self.tier(self.destination(request)).capacity()
    }

    /// Display name, e.g. `S3FIFO-0.1000-2`.
    pub fn name(&self) -> String {
        self.config.name()
    }

    /// Every effective parameter as a `key=value` string.
    pub fn current_params(&self) -> String {
        let config = &self.config;
        let mut params = format!(
            "s-ratio={:.4},m-ratio={:.4},lq-ratio={:.4},ghost-size-ratio={:.4},\
             move-to-main-threshold={},fifo-size-ratio={:.4},\
             alpha={},beta={},gamma={},score-threshold={}",
            self.ratios.small,
            self.ratios.main,
            self.ratios.large,
            config.ghost_size_ratio,
            config.move_to_main_threshold,
            config.fifo_size_ratio,
            config.alpha,
            config.beta,
            config.gamma,
            config.score_threshold,
        );
        if let Some(threshold) = config.size_threshold {
            params.push_str(&format!(",size-threshold={threshold}"));
        }
        params.push_str(&format!(
            ",dcp-window={},dcp-large-threshold={},dcp-small-threshold={},dcp-step={}",
            config.planner.window,
            config.planner.large_threshold,
            config.planner.small_threshold,
            config.planner.step,
        ));
        params
    }

    /// The tier currently holding `id`.
    pub fn tier_of(&self, id: ObjId) -> Option<TierId> {
        TierId::ALL
            .into_iter()
            .find(|tier| self.tier(*tier).contains(id))
    }

    /// Returns `true` if `id` is in the ghost index.
    pub fn in_ghost(&self, id: ObjId) -> bool {
        self.ghost.as_ref().is_some_and(|ghost| ghost.contains(id))
    }

    /// Read access to a resident tier.
    pub fn tier(&self, tier: TierId) -> &FifoTier<CacheObject> {
        match tier {
            TierId::Small => &self.small,
            TierId::Main => &self.main,
            TierId::Large => &self.large,
        }
    }

    /// Read access to the ghost index.
    pub fn ghost(&self) -> Option<&FifoTier<GhostEntry>> {
        self.ghost.as_ref()
    }

    /// Current tier budgets.
    pub fn budgets(&self) -> TierBudgets {
        TierBudgets {
            small: self.small.capacity(),
            main: self.main.capacity(),
            large: self.large.capacity(),
        }
    }

    /// Current tier ratios.
    pub fn ratios(&self) -> TierRatios {
        self.ratios
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Effective configuration.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Policy statistics.
    pub fn metrics(&self) -> &PolicyMetrics {
        &self.metrics
    }

    fn tier_mut(&mut self, tier: TierId) -> &mut FifoTier<CacheObject> {
        match tier {
            TierId::Small => &mut self.small,
            TierId::Main => &mut self.main,
            TierId::Large => &mut self.large,
        }
    }

    fn destination(&self, request: &Request) -> TierId {
        let ghost_hit = self.ghost_hit == Some(request.id) || self.in_ghost(request.id);
        self.router.route(request.size, ghost_hit)
    }

    /// Evict from `tier` until an object of `size` bytes fits in its budget.
    fn make_room(&mut self, tier: TierId, size: u64) {
        while !self.tier(tier).is_empty()
            && self.tier(tier).occupied_bytes() + size > self.tier(tier).capacity()
        {
            self.evict_from(tier);
        }
    }

    /// Evict until no tier is over budget.
    fn settle(&mut self) {
        while TierId::ALL
            .iter()
            .any(|tier| self.tier(*tier).is_over_budget())
        {
            self.evict();
        }
        self.main_retained_streak = 0;
    }

    /// Apply the tier's eviction discipline to its oldest object.
    fn evict_from(&mut self, tier: TierId) -> ItemFate {
        let occupied = self.tier(tier).occupied_bytes();
        let sweep_done = tier == TierId::Main && self.main_retained_streak >= self.main.len();
        let scorer = self.scorer;

        let Some((id, mut fate)) = self
            .tier_mut(tier)
            .to_evict()
            .map(|obj| (obj.id(), scorer.fate(obj, tier)))
        else {
            panic!("{tier} tier holds {occupied} bytes but has no eviction candidate");
        };

        if fate == ItemFate::Retain && sweep_done {
            // every resident already had its second chance
            self.metrics.main_forced_demotions += 1;
            debug!(id, "forced main demotion after full sweep");
            fate = ItemFate::Ghost;
        }

        let Some(obj) = self.tier_mut(tier).remove(id) else {
            panic!("{tier} tier eviction candidate {id} vanished before removal");
        };

        match fate {
            ItemFate::Promote => {
                trace!(id, from = %tier, "promote to main");
                self.metrics.n_obj_move_to_main += 1;
                self.metrics.n_byte_move_to_main += obj.size();
                self.main.insert(obj.reset());
            }
            ItemFate::Retain => {
                let mut obj = obj;
                obj.set_frequency(self.config.main_decay.apply(obj.frequency()));
                self.metrics.main_retained += 1;
                self.main_retained_streak += 1;
                self.main.insert(obj);
            }
            ItemFate::Ghost => {
                trace!(id, from = %tier, "demote to ghost");
                if tier == TierId::Main {
                    self.main_retained_streak = 0;
                }
                self.metrics.demoted_to_ghost += 1;
                if let Some(ghost) = self.ghost.as_mut() {
                    ghost.insert_evicting(GhostEntry::from(&obj));
                }
            }
        }

        fate
    }
}

impl EvictionPolicy for WeightedS3Fifo {
    fn name(&self) -> String {
        WeightedS3Fifo::name(self)
    }

    fn get(&mut self, request: &Request) -> PolicyResult<bool> {
        WeightedS3Fifo::get(self, request)
    }

    fn find(&mut self, request: &Request, mutate: bool) -> Option<&CacheObject> {
        WeightedS3Fifo::find(self, request, mutate)
    }

    fn insert(&mut self, request: &Request) -> PolicyResult<&CacheObject> {
        WeightedS3Fifo::insert(self, request)
    }

    fn evict(&mut self) -> usize {
        WeightedS3Fifo::evict(self)
    }

    fn to_evict(&self) -> PolicyResult<&CacheObject> {
        WeightedS3Fifo::to_evict(self)
    }

    fn remove(&mut self, id: ObjId) -> bool {
        WeightedS3Fifo::remove(self, id)
    }

    fn occupied_bytes(&self) -> u64 {
        WeightedS3Fifo::occupied_bytes(self)
    }

    fn object_count(&self) -> usize {
        WeightedS3Fifo::object_count(self)
    }

    fn can_insert(&self, request: &Request) -> bool {
        WeightedS3Fifo::can_insert(self, request)
    }
}

impl std::fmt::Debug for WeightedS3Fifo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(POLICY_NAME)
            .field("capacity", &self.capacity)
            .field("ratios", &self.ratios)
            .field("small", &(self.small.len(), self.small.occupied_bytes()))
            .field("main", &(self.main.len(), self.main.occupied_bytes()))
            .field("large", &(self.large.len(), self.large.occupied_bytes()))
            .field("ghost", &self.ghost.as_ref().map(|ghost| ghost.len()))
            .finish()
    }
}

/// Reject requests the retention score cannot handle.
fn check_request(request: &Request) -> PolicyResult<()> {
    if request.size == 0 {
        return Err(PolicyError::ZeroSize { id: request.id });
    }
    if !request.reload_cost.is_finite() || request.reload_cost < 0.0 {
        return Err(PolicyError::InvalidReloadCost {
            id: request.id,
            cost: request.reload_cost,
        });
    }
    Ok(())
}
