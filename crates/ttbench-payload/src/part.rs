//! Per-dimension value generators.

use tracing::debug;

use crate::error::{PayloadError, PayloadResult};
use crate::rng::PayloadRng;
use crate::value::{Distribution, Value, ValueKind};

/// Generator state for one part.
#[derive(Debug, Clone)]
enum PartState {
    /// Counts up from min, stopping before max.
    Incremental { next: Value },
    /// Counts down from max to min inclusive. `None` once min was served.
    Decremental { next: Option<Value> },
    /// Serves a pre-shuffled pool in order.
    Random { pool: Vec<Value>, index: usize },
}

/// One generated dimension of a payload tuple.
#[derive(Debug, Clone)]
pub struct Part {
    kind: ValueKind,
    min: Value,
    max: Value,
    distribution: Distribution,
    state: PartState,
    served: usize,
}

impl Part {
    /// Creates a part serving values between `min` and `max`.
    ///
    /// `demand` is the number of values the run will ever draw, and every
    /// distribution must be able to serve that many; `rng` shuffles a
    /// random part's pool once, here.
    pub fn new(
        min: Value,
        max: Value,
        distribution: Distribution,
        demand: usize,
        rng: &mut PayloadRng,
    ) -> PayloadResult<Self> {
        if min > max {
            return Err(PayloadError::InvalidRange { min, max });
        }

        let state = match distribution {
            Distribution::Incremental => {
                ensure_range(min, max, distribution, demand, min.span_to(max))?;
                PartState::Incremental { next: min }
            }
            Distribution::Decremental => {
                // Both bounds are served.
                let available = min.span_to(max).saturating_add(1);
                ensure_range(min, max, distribution, demand, available)?;
                PartState::Decremental { next: Some(max) }
            }
            Distribution::Linear => PartState::Random {
                pool: shuffled_pool(min, max, demand, rng)?,
                index: 0,
            },
            Distribution::Normal => {
                return Err(PayloadError::UnimplementedDistribution(distribution));
            }
        };

        debug!(%min, %max, %distribution, demand, "created payload part");

        Ok(Self {
            kind: min.kind(),
            min,
            max,
            distribution,
            state,
            served: 0,
        })
    }

    /// Creates an incremental part over `[min, max)`.
    pub fn incremental(min: Value, max: Value) -> Self {
        debug_assert!(min <= max, "min must be <= max");
        Self {
            kind: min.kind(),
            min,
            max,
            distribution: Distribution::Incremental,
            state: PartState::Incremental { next: min },
            served: 0,
        }
    }

    /// Returns the next value of this part.
    pub fn next(&mut self) -> PayloadResult<Value> {
        let value = match &mut self.state {
            PartState::Incremental { next } => {
                if *next >= self.max {
                    return Err(PayloadError::Exhausted {
                        served: self.served,
                    });
                }
                next.post_increment()?
            }
            PartState::Decremental { next } => {
                let Some(current) = next.as_mut() else {
                    return Err(PayloadError::Exhausted {
                        served: self.served,
                    });
                };
                if *current > self.min {
                    current.post_decrement()?
                } else {
                    let value = *current;
                    *next = None;
                    value
                }
            }
            PartState::Random { pool, index } => {
                let value = *pool.get(*index).ok_or(PayloadError::Exhausted {
                    served: self.served,
                })?;
                *index += 1;
                value
            }
        };
        self.served += 1;
        Ok(value)
    }

    /// Kind of the values this part produces.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Lower bound of the part.
    pub fn min(&self) -> Value {
        self.min
    }

    /// Upper bound of the part.
    pub fn max(&self) -> Value {
        self.max
    }

    /// How the part walks its range.
    pub fn distribution(&self) -> Distribution {
        self.distribution
    }
}

fn ensure_range(
    min: Value,
    max: Value,
    distribution: Distribution,
    demand: usize,
    available: u64,
) -> PayloadResult<()> {
    if available < demand as u64 {
        return Err(PayloadError::RangeTooSmall {
            distribution,
            min,
            max,
            demand,
            available,
        });
    }
    Ok(())
}

/// Materialises `[min, max)` and shuffles it.
fn shuffled_pool(
    min: Value,
    max: Value,
    demand: usize,
    rng: &mut PayloadRng,
) -> PayloadResult<Vec<Value>> {
    let available = min.span_to(max);
    if available < demand as u64 {
        return Err(PayloadError::PoolTooSmall { demand, available });
    }

    let len = usize::try_from(available).map_err(|_| PayloadError::PoolTooLarge(available))?;
    let mut pool = Vec::new();
    pool.try_reserve_exact(len)
        .map_err(|_| PayloadError::PoolTooLarge(available))?;
    let mut value = min;
    for _ in 0..len {
        pool.push(value.post_increment()?);
    }

    rng.shuffle(&mut pool);
    Ok(pool)
}
