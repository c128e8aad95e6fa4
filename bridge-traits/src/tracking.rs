//! Tracking payloads forwarded to attribution and analytics providers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Free-form arguments attached to an attribution event.
pub type EventArguments = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceFlowType {
    Source,
    Sink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionStatus {
    Start,
    Complete,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

/// Analytics custom dimension slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomDimensionSlot {
    One,
    Two,
    Three,
}

impl CustomDimensionSlot {
    pub const fn index(self) -> u8 {
        match self {
            CustomDimensionSlot::One => 1,
            CustomDimensionSlot::Two => 2,
            CustomDimensionSlot::Three => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InAppPurchase {
    pub product_id: String,
    pub currency_code: String,
    pub unit_price: f64,
    pub transaction_id: Option<String>,
    pub receipt: Option<String>,
    pub is_restored: bool,
}

impl InAppPurchase {
    pub fn new(product_id: impl Into<String>, currency_code: impl Into<String>, unit_price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            currency_code: currency_code.into(),
            unit_price,
            transaction_id: None,
            receipt: None,
            is_restored: false,
        }
    }

    pub fn with_transaction(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    pub fn with_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.receipt = Some(receipt.into());
        self
    }

    pub fn restored(mut self) -> Self {
        self.is_restored = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEvent {
    pub flow_type: ResourceFlowType,
    pub currency: String,
    pub amount: f32,
    pub item_type: String,
    pub item_id: String,
}

/// Progression through up to three nested levels (world / level / stage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionEvent {
    pub status: ProgressionStatus,
    pub levels: Vec<String>,
    pub score: Option<i32>,
}

impl ProgressionEvent {
    pub const MAX_LEVELS: usize = 3;

    pub fn new(status: ProgressionStatus, level: impl Into<String>) -> Self {
        Self {
            status,
            levels: vec![level.into()],
            score: None,
        }
    }

    /// Appends a nested level. Levels beyond [`Self::MAX_LEVELS`] are ignored.
    pub fn with_sub_level(mut self, level: impl Into<String>) -> Self {
        if self.levels.len() < Self::MAX_LEVELS {
            self.levels.push(level.into());
        }
        self
    }

    pub fn with_score(mut self, score: i32) -> Self {
        self.score = Some(score);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignEvent {
    pub name: String,
    pub value: Option<f32>,
}

impl DesignEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self
    }
}
