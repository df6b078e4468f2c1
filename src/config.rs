use serde::{Deserialize, Serialize};

/// Options controlling how a transaction is normalized and rendered.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeConfig {
    /// Abort the whole run on the first per-instruction decode or lookup failure.
    #[serde(default = "NormalizeConfig::default_throw_error")]
    pub throw_error: bool,
    /// Minimum absolute SOL movement that, paired with a one-sided token move,
    /// marks a record as a trade.
    #[serde(default = "NormalizeConfig::default_trade_threshold_sol")]
    pub trade_threshold_sol: f64,
    #[serde(default = "NormalizeConfig::default_csv_header")]
    pub csv_header: bool,
    #[serde(default)]
    pub pretty_json: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            throw_error: Self::default_throw_error(),
            trade_threshold_sol: Self::default_trade_threshold_sol(),
            csv_header: Self::default_csv_header(),
            pretty_json: false,
        }
    }
}

impl NormalizeConfig {
    const fn default_throw_error() -> bool {
        false
    }

    const fn default_trade_threshold_sol() -> f64 {
        0.005
    }

    const fn default_csv_header() -> bool {
        true
    }

    pub fn strict() -> Self {
        Self {
            throw_error: true,
            ..Self::default()
        }
    }
}
