//! Tuple generation from an ordered list of parts.

use tracing::info;

use crate::config::PayloadConfig;
use crate::error::PayloadResult;
use crate::part::Part;
use crate::rng::PayloadRng;
use crate::value::Value;

/// Ordered list of parts; each call to [`Payload::next`] draws one value
/// from every part, forming one tuple.
#[derive(Debug, Clone)]
pub struct Payload {
    parts: Vec<Part>,
    /// Number of tuples the run will draw.
    demand: usize,
}

impl Payload {
    /// Creates the default payload: a single incremental `uint64` part over
    /// `[0, demand)`.
    pub fn new(demand: usize) -> Self {
        Self {
            parts: vec![Part::incremental(Value::U64(0), Value::U64(demand as u64))],
            demand,
        }
    }

    /// Builds a payload from a shape configuration.
    pub fn from_config(
        config: &PayloadConfig,
        demand: usize,
        rng: &mut PayloadRng,
    ) -> PayloadResult<Self> {
        let mut payload = Self::new(demand);
        payload.configure(config, rng)?;
        Ok(payload)
    }

    /// Replaces the part list with the parts described by `config`.
    ///
    /// On error the current parts are left untouched.
    pub fn configure(&mut self, config: &PayloadConfig, rng: &mut PayloadRng) -> PayloadResult<()> {
        let parts = config
            .parts
            .iter()
            .map(|spec| {
                Part::new(
                    spec.min_value(),
                    spec.max_value(self.demand)?,
                    spec.distribution(),
                    self.demand,
                    rng,
                )
            })
            .collect::<PayloadResult<Vec<_>>>()?;

        info!(parts = parts.len(), seed = rng.seed(), "configured payload");
        self.parts = parts;
        Ok(())
    }

    /// Replaces the part list.
    pub fn set_parts(&mut self, parts: Vec<Part>) {
        self.parts = parts;
    }

    /// Appends one value per part to `out`.
    pub fn next(&mut self, out: &mut Vec<Value>) -> PayloadResult<()> {
        for part in &mut self.parts {
            out.push(part.next()?);
        }
        Ok(())
    }

    /// The parts, in tuple order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Number of values in each generated tuple.
    pub fn arity(&self) -> usize {
        self.parts.len()
    }

    /// Number of tuples the run will draw.
    pub fn demand(&self) -> usize {
        self.demand
    }
}
