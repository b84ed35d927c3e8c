//! General settings record stored alongside categories and entries

use serde::{Deserialize, Serialize};

/// Account name and currency code shown by the front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct General {
    #[serde(default = "default_account")]
    pub account: String,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_account() -> String {
    "sample".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

impl Default for General {
    fn default() -> Self {
        Self {
            account: default_account(),
            currency: default_currency(),
        }
    }
}

impl General {
    /// Shallow-merge a patch; fields left unset in the patch are kept
    pub fn merge(&mut self, patch: GeneralPatch) {
        if let Some(account) = patch.account {
            self.account = account;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
    }
}

/// Partial update for [`General`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl GeneralPatch {
    pub fn account(account: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            currency: None,
        }
    }

    pub fn currency(currency: impl Into<String>) -> Self {
        Self {
            account: None,
            currency: Some(currency.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.account.is_none() && self.currency.is_none()
    }
}
