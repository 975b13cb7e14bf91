//! Token budget management for LLM calls.
//!
//! Enforces per-stage and global token budgets to control costs.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::providers::TokenUsage;
use crate::stages::Stage;

/// Token budget for a scope (stage or global).
pub struct TokenBudget {
    /// Maximum tokens allowed
    pub max_tokens: u32,

    /// Currently used tokens
    used: AtomicU32,
}

impl TokenBudget {
    /// Create a new token budget.
    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            used: AtomicU32::new(0),
        }
    }

    /// Check if we can afford to use tokens.
    pub fn can_afford(&self, tokens: u32) -> bool {
        self.remaining() >= tokens
    }

    /// Record token usage.
    pub fn record(&self, tokens: u32) {
        self.used.fetch_add(tokens, Ordering::SeqCst);
    }

    /// Get remaining tokens.
    pub fn remaining(&self) -> u32 {
        self.max_tokens
            .saturating_sub(self.used.load(Ordering::SeqCst))
    }

    /// Get used tokens.
    pub fn used(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }

    /// Reset the budget.
    pub fn reset(&self) {
        self.used.store(0, Ordering::SeqCst);
    }
}

/// Accumulated LLM usage across a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Total tokens used
    pub total_tokens: u32,

    /// Prompt/input tokens
    pub prompt_tokens: u32,

    /// Completion/output tokens
    pub completion_tokens: u32,

    /// Number of LLM calls made
    pub llm_calls: u32,

    /// Estimated cost in USD
    pub estimated_cost: f64,
}

impl LlmUsage {
    /// Add token usage from a provider response.
    pub fn add(&mut self, usage: &TokenUsage, model: &str) {
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.total_tokens += usage.total();
        self.llm_calls += 1;
        self.estimated_cost += Self::estimate_cost(usage, model);
    }

    /// Estimate cost for a usage entry.
    fn estimate_cost(usage: &TokenUsage, model: &str) -> f64 {
        // Pricing per million tokens
        let (input_rate, output_rate) = match model {
            m if m.contains("flash-lite") => (0.10, 0.40),
            m if m.contains("flash") => (0.30, 2.50),
            m if m.contains("pro") => (1.25, 10.0),
            _ => (0.30, 2.50), // Default to flash pricing
        };

        let input_cost = (usage.prompt_tokens as f64 / 1_000_000.0) * input_rate;
        let output_cost = (usage.completion_tokens as f64 / 1_000_000.0) * output_rate;

        input_cost + output_cost
    }
}

/// Budget tracker for the entire pipeline.
pub struct BudgetTracker {
    /// Per-stage budgets
    stage_budgets: HashMap<Stage, TokenBudget>,

    /// Global budget across all stages
    global_budget: TokenBudget,

    /// Accumulated usage
    usage: RwLock<LlmUsage>,
}

impl BudgetTracker {
    /// Create a new budget tracker with uniform per-stage budgets.
    pub fn new(global_max: u32, per_stage_max: u32) -> Self {
        let mut stage_budgets = HashMap::new();

        for stage in Stage::ALL {
            stage_budgets.insert(stage, TokenBudget::new(per_stage_max));
        }

        Self {
            stage_budgets,
            global_budget: TokenBudget::new(global_max),
            usage: RwLock::new(LlmUsage::default()),
        }
    }

    /// Check if we can afford a call for a stage.
    pub fn can_afford(&self, stage: Stage, estimated_tokens: u32) -> bool {
        let stage_ok = self
            .stage_budgets
            .get(&stage)
            .map(|b| b.can_afford(estimated_tokens))
            .unwrap_or(true);

        let global_ok = self.global_budget.can_afford(estimated_tokens);

        stage_ok && global_ok
    }

    /// Record usage after a call.
    pub fn record_usage(&self, stage: Stage, usage: &TokenUsage, model: &str) {
        let total = usage.total();

        if let Some(budget) = self.stage_budgets.get(&stage) {
            budget.record(total);
        }
        self.global_budget.record(total);

        self.usage.write().add(usage, model);
    }

    /// Get current usage.
    pub fn get_usage(&self) -> LlmUsage {
        self.usage.read().clone()
    }

    /// Get remaining global budget.
    pub fn remaining_global(&self) -> u32 {
        self.global_budget.remaining()
    }

    /// Get remaining budget for a stage.
    pub fn remaining_stage(&self, stage: Stage) -> u32 {
        self.stage_budgets
            .get(&stage)
            .map(|b| b.remaining())
            .unwrap_or(0)
    }

    /// Reset all budgets.
    pub fn reset(&self) {
        for budget in self.stage_budgets.values() {
            budget.reset();
        }
        self.global_budget.reset();
        *self.usage.write() = LlmUsage::default();
    }
}

impl Default for BudgetTracker {
    fn default() -> Self {
        Self::new(10_000, 3_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_enforcement() {
        let budget = TokenBudget::new(100);

        assert!(budget.can_afford(50));
        assert!(budget.can_afford(100));
        assert!(!budget.can_afford(101));

        budget.record(60);
        assert_eq!(budget.remaining(), 40);
        assert!(!budget.can_afford(50));
        assert!(budget.can_afford(40));
    }

    #[test]
    fn test_budget_tracker() {
        let tracker = BudgetTracker::new(500, 100);

        assert!(tracker.can_afford(Stage::Council, 50));

        let usage = TokenUsage {
            prompt_tokens: 30,
            completion_tokens: 20,
        };
        tracker.record_usage(Stage::Council, &usage, "gemini-3-flash-preview");

        assert_eq!(tracker.remaining_stage(Stage::Council), 50);
        assert_eq!(tracker.remaining_global(), 450);
        assert!(!tracker.can_afford(Stage::Council, 60));
    }

    #[test]
    fn test_cost_estimation() {
        let mut usage = LlmUsage::default();

        let token_usage = TokenUsage {
            prompt_tokens: 1000,
            completion_tokens: 500,
        };

        usage.add(&token_usage, "gemini-3-flash-preview");

        // 1000 input tokens * $0.30/MTok = $0.0003
        // 500 output tokens * $2.50/MTok = $0.00125
        assert!(usage.estimated_cost > 0.001 && usage.estimated_cost < 0.002);
        assert_eq!(usage.llm_calls, 1);
        assert_eq!(usage.total_tokens, 1500);
    }

    #[test]
    fn test_reset_clears_usage() {
        let tracker = BudgetTracker::new(500, 100);
        tracker.record_usage(
            Stage::Bias,
            &TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 10,
            },
            "gemini-3-flash-preview",
        );
        tracker.reset();

        assert_eq!(tracker.get_usage().llm_calls, 0);
        assert_eq!(tracker.remaining_global(), 500);
    }
}
