use serde::{Deserialize, Deserializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Base units per whole coin.
pub const UNITS_PER_COIN: u64 = 100_000_000;

/// Output value held as an integer number of base units.
///
/// Nodes report values as decimal coin amounts (`0.5`); they are converted on
/// deserialization so sums stay exact and ordering is total.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_coins(coins: u64) -> Self {
        Amount(coins * UNITS_PER_COIN)
    }

    pub fn units(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Amount {
    type Output = Amount;

    /// Saturates at the largest representable amount.
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:08}",
            self.0 / UNITS_PER_COIN,
            self.0 % UNITS_PER_COIN
        )
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let coins = f64::deserialize(deserializer)?;
        if !coins.is_finite() || coins < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "invalid output value: {coins}"
            )));
        }
        let units = (coins * UNITS_PER_COIN as f64).round();
        // 2^64 itself is not representable, so reject it along with anything above
        if units >= u64::MAX as f64 {
            return Err(serde::de::Error::custom(format!(
                "output value out of range: {coins}"
            )));
        }
        Ok(Amount(units as u64))
    }
}

/// Block as returned by `getblock` with verbosity 1.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Block {
    pub hash: String,
    #[serde(default)]
    pub height: u64,
    pub time: i64,
    #[serde(default)]
    pub tx: Vec<String>,
}

/// Block with the seconds elapsed since its chronological predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedBlock {
    pub block: Block,
    /// Seconds since the chronologically previous block of the batch.
    pub generation_time: i64,
}

/// Input of a decoded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxIn {
    /// Coinbase script, present only on the reward input.
    #[serde(default)]
    pub coinbase: Option<String>,
    /// Previous transaction of a spend.
    #[serde(default)]
    pub txid: Option<String>,
    /// Output index inside the previous transaction.
    #[serde(default)]
    pub vout: Option<u32>,
}

impl TxIn {
    /// True when the input references no previous output.
    pub fn is_coinbase(&self) -> bool {
        self.coinbase.is_some() || self.txid.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxOut {
    pub value: Amount,
    #[serde(default)]
    pub n: u32,
}

/// Transaction as returned by `decoderawtransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transaction {
    pub txid: String,
    #[serde(default)]
    pub vin: Vec<TxIn>,
    #[serde(default)]
    pub vout: Vec<TxOut>,
}

impl Transaction {
    /// A transaction is coinbase when its first input is.
    pub fn is_coinbase(&self) -> bool {
        self.vin.first().map_or(false, TxIn::is_coinbase)
    }

    /// Sum of all output values except the first one.
    ///
    /// The first output of an ordinary transaction usually carries an
    /// unrelated marker amount, so it is left out of both the value ranking
    /// and the organic value. A transaction with a single output totals zero.
    pub fn total_vout(&self) -> Amount {
        self.vout.iter().skip(1).map(|out| out.value).sum()
    }
}
