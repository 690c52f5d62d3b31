//! Optional prose generation for a computed fortune

use crate::core::fortune::FortuneResult;
use crate::core::personality::PersonalityType;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narration {
    pub love: String,
    pub work: String,
    pub tip: String,
}

/// Replaces the static per-type texts with generated ones. Failures are
/// never fatal; callers fall back to the configured texts.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(
        &self,
        personality: PersonalityType,
        date: NaiveDate,
        fortune: &FortuneResult,
    ) -> Result<Narration>;
}
