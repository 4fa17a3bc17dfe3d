//! Synthetic order flow driven by a per-symbol geometric random walk.
//!
//! Each event nudges one symbol's mid price by a proportional Gaussian step,
//! then quotes a buy below or a sell above the mid. Side selection leans
//! against the latest move: a drop makes buys more likely and a rise makes
//! sells more likely, with the buy probability clamped to `[0.3, 0.7]`.
//! Arrivals alternate between bursts and quieter gaps.

use crate::error::{SimError, SimResult};
use crate::record::GeneratedOrder;
use crate::seed::SimSeed;
use crate::sequence::OrderSequencer;
use indexmap::IndexMap;
use lockstep_core::{TICK_SIZE, Timestamp, dollars_to_raw, raw_to_dollars};
use lockstep_wire::{MarketEvent, Side, SYMBOL_LEN};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Lot sizes drawn for synthetic orders; round lots dominate
pub const LOT_SIZES: [u64; 8] = [100, 100, 100, 200, 200, 300, 500, 1000];

/// Symbols used when none are configured
pub const DEFAULT_SYMBOLS: [&str; 8] = ["AAPL", "GOOG", "MSFT", "TSLA", "AMZN", "META", "NVDA", "AMD"];

const BURST_PROBABILITY: f64 = 0.2;
const BURST_GAP_NS: (u64, u64) = (100, 500);
const NORMAL_GAP_NS: (u64, u64) = (1_000, 10_000);
const MIN_MID: f64 = 1.0;
const MAX_SPREAD_TICKS: u32 = 10;
const SIDE_BIAS: f64 = 10.0;

/// Synthetic generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Number of events to produce
    pub count: u64,
    /// Symbols to draw from
    pub symbols: Vec<String>,
    /// Starting mid price in dollars for every symbol
    pub base_price: f64,
    /// Standard deviation of the proportional per-event price step
    pub volatility: f64,
    /// Seed for every random draw
    pub seed: SimSeed,
    /// Clock value before the first event
    pub start: Timestamp,
}

impl SyntheticConfig {
    /// Create a config producing `count` events with default parameters
    #[must_use]
    pub fn new(count: u64) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Set symbols
    #[must_use]
    pub fn with_symbols(mut self, symbols: Vec<String>) -> Self {
        self.symbols = symbols;
        self
    }

    /// Set base price
    #[must_use]
    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    /// Set volatility
    #[must_use]
    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// Set seed
    #[must_use]
    pub fn with_seed(mut self, seed: SimSeed) -> Self {
        self.seed = seed;
        self
    }

    /// Set the starting clock
    #[must_use]
    pub fn with_start(mut self, start: Timestamp) -> Self {
        self.start = start;
        self
    }

    /// Check parameters before generating
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] for an empty or invalid symbol list, a
    /// non-positive base price, or a negative volatility
    pub fn validate(&self) -> SimResult<()> {
        if self.symbols.is_empty() {
            return Err(SimError::Config("symbol list is empty".to_string()));
        }
        for symbol in &self.symbols {
            if symbol.is_empty()
                || symbol.len() > SYMBOL_LEN
                || !symbol.bytes().all(|b| b.is_ascii_graphic())
            {
                return Err(SimError::Config(format!(
                    "symbol '{}' must be 1-{} printable ASCII characters",
                    symbol, SYMBOL_LEN
                )));
            }
        }
        if !(self.base_price.is_finite() && self.base_price > 0.0) {
            return Err(SimError::Config(format!(
                "base price {} must be positive",
                self.base_price
            )));
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(SimError::Config(format!(
                "volatility {} must be non-negative",
                self.volatility
            )));
        }
        Ok(())
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            symbols: DEFAULT_SYMBOLS.iter().map(|s| (*s).to_string()).collect(),
            base_price: 150.0,
            volatility: 0.001,
            seed: SimSeed::default(),
            start: Timestamp::MARKET_OPEN,
        }
    }
}

/// Random-walk order generator
///
/// Yields exactly `count` orders unless an error occurs, after which it
/// yields nothing further.
pub struct SyntheticGenerator {
    mids: IndexMap<String, f64>,
    step: Normal<f64>,
    rng: ChaCha8Rng,
    sequencer: OrderSequencer,
    remaining: u64,
}

impl SyntheticGenerator {
    /// Create a generator
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the config does not validate
    pub fn new(config: SyntheticConfig) -> SimResult<Self> {
        config.validate()?;
        let step = Normal::new(0.0, config.volatility)
            .map_err(|e| SimError::Config(format!("volatility: {}", e)))?;
        let mids = config
            .symbols
            .iter()
            .map(|symbol| (symbol.clone(), config.base_price))
            .collect();

        Ok(Self {
            mids,
            step,
            rng: config.seed.derive("synthetic").into_rng(),
            sequencer: OrderSequencer::new(config.start),
            remaining: config.count,
        })
    }

    /// Current mid price of `symbol`
    #[must_use]
    pub fn mid(&self, symbol: &str) -> Option<f64> {
        self.mids.get(symbol).copied()
    }

    fn generate(&mut self) -> SimResult<GeneratedOrder> {
        let index = self.rng.gen_range(0..self.mids.len());
        let step = self.step.sample(&mut self.rng);
        let (symbol, mid) = self
            .mids
            .get_index_mut(index)
            .ok_or_else(|| SimError::Config("symbol table is empty".to_string()))?;

        let change = step * *mid;
        *mid = (*mid + change).max(MIN_MID);
        let mid = *mid;
        let symbol = symbol.clone();

        let buy_probability = (0.5 - (change / mid) * SIDE_BIAS).clamp(0.3, 0.7);
        let side = if self.rng.r#gen::<f64>() < buy_probability {
            Side::Buy
        } else {
            Side::Sell
        };

        let spread = f64::from(self.rng.gen_range(1..=MAX_SPREAD_TICKS)) * TICK_SIZE;
        let order_price = match side {
            Side::Buy => mid - spread,
            Side::Sell => mid + spread,
        };
        let price_raw = dollars_to_raw(order_price)?;
        let shares = LOT_SIZES[self.rng.gen_range(0..LOT_SIZES.len())];

        let gap = if self.rng.r#gen::<f64>() < BURST_PROBABILITY {
            self.rng.gen_range(BURST_GAP_NS.0..=BURST_GAP_NS.1)
        } else {
            self.rng.gen_range(NORMAL_GAP_NS.0..=NORMAL_GAP_NS.1)
        };
        let (order_ref, timestamp) = self.sequencer.next(gap)?;

        Ok(GeneratedOrder {
            event: MarketEvent {
                timestamp_ns: timestamp.as_nanos(),
                order_ref,
                side,
                shares,
                symbol,
                price_raw,
            },
            price_dollars: raw_to_dollars(price_raw),
        })
    }
}

impl Iterator for SyntheticGenerator {
    type Item = SimResult<GeneratedOrder>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let order = self.generate();
        if order.is_err() {
            self.remaining = 0;
        }
        Some(order)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (0, Some(remaining))
    }
}
