//! Seeded synthetic request stream.
//!
//! Every id gets a fixed size and reload cost up front, so repeated requests
//! for the same id always agree. Popularity is skewed toward low ids by
//! raising a uniform sample to the `skew` power.

use crate::config::WorkloadConfig;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use weighted_s3fifo::Request;

/// Static per-id attributes.
#[derive(Debug, Clone, Copy)]
struct ObjectSpec {
    size: u64,
    reload_cost: f64,
}

pub struct Workload {
    rng: Xoshiro256PlusPlus,
    objects: Vec<ObjectSpec>,
    skew: f64,
}

impl Workload {
    pub fn new(config: &WorkloadConfig, seed: u64) -> Self {
        let mut init_rng = Xoshiro256PlusPlus::seed_from_u64(seed);

        let objects = (0..config.keys)
            .map(|_| {
                let large = init_rng.random_bool(config.large_fraction);
                let range = if large {
                    config.large_size
                } else {
                    config.small_size
                };
                let size = init_rng.random_range(range.min..=range.max);
                let cost = config.reload_cost;
                let reload_cost = if cost.max > cost.min {
                    init_rng.random_range(cost.min..=cost.max)
                } else {
                    cost.min
                };
                ObjectSpec { size, reload_cost }
            })
            .collect();

        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(1)),
            objects,
            skew: config.skew,
        }
    }

    /// Next request in the stream.
    pub fn next_request(&mut self) -> Request {
        let sample: f64 = self.rng.random();
        let last = self.objects.len() - 1;
        let index = ((sample.powf(self.skew) * self.objects.len() as f64) as usize).min(last);
        let spec = self.objects[index];

        Request::new(index as u64, spec.size).with_reload_cost(spec.reload_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorkloadConfig {
        WorkloadConfig {
            keys: 100,
            ..WorkloadConfig::default()
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = Workload::new(&config(), 7);
        let mut b = Workload::new(&config(), 7);
        for _ in 0..1000 {
            assert_eq!(a.next_request(), b.next_request());
        }
    }

    #[test]
    fn test_sizes_stable_per_id() {
        let mut workload = Workload::new(&config(), 7);
        let mut seen = std::collections::HashMap::new();
        for _ in 0..5000 {
            let request = workload.next_request();
            assert!(request.id < 100);
            assert!(request.size > 0);
            let size = *seen.entry(request.id).or_insert(request.size);
            assert_eq!(size, request.size);
        }
    }

    #[test]
    fn test_skew_favors_low_ids() {
        let mut workload = Workload::new(&config(), 7);
        let low = (0..10_000)
            .filter(|_| workload.next_request().id < 25)
            .count();
        // With skew 2, P(id < 25) = sqrt(0.25) = 0.5
        assert!(low > 4000, "low ids drawn {low} times");
    }
}
