//! Centralized model pricing table.
//!
//! Reads `~/.stargazer/usage_pricing.toml` at runtime so prices can be
//! updated without a rebuild. Falls back to compiled-in defaults if the file
//! is missing, unparseable or empty.

use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::PathBuf;

// ── TOML schema ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
struct PricingFile {
    #[serde(default)]
    usage: UsageSection,
}

#[derive(Debug, Deserialize, Default)]
struct UsageSection {
    #[serde(default)]
    pricing: PricingSection,
}

#[derive(Debug, Deserialize, Default)]
struct PricingSection {
    #[serde(default)]
    openrouter: Vec<ModelPricing>,
    #[serde(default)]
    other: Vec<ModelPricing>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ModelPricing {
    /// Substring to match against the model id (case-insensitive)
    pub prefix: String,
    /// Cost per 1M input tokens in USD
    pub input_per_m: f64,
    /// Cost per 1M output tokens in USD
    pub output_per_m: f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

pub struct PricingTable {
    entries: Vec<ModelPricing>,
}

impl PricingTable {
    /// Parses a pricing file; `None` when it has no usable entries.
    pub fn from_toml_str(s: &str) -> Option<Self> {
        let section = toml::from_str::<PricingFile>(s).ok()?.usage.pricing;
        // Order = priority
        let mut entries = section.openrouter;
        entries.extend(section.other);
        (!entries.is_empty()).then_some(Self { entries })
    }

    pub fn defaults() -> Self {
        Self {
            entries: default_entries(),
        }
    }

    fn lookup(&self, model: &str) -> Option<&ModelPricing> {
        let m = model.to_lowercase();
        self.entries
            .iter()
            .find(|e| m.contains(&e.prefix.to_lowercase()))
    }

    /// Calculate cost for a model given input/output token counts.
    /// Returns 0.0 if the model is not in the pricing table.
    pub fn calculate_cost(&self, model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
        self.lookup(model).map_or(0.0, |entry| {
            (input_tokens as f64 / 1_000_000.0) * entry.input_per_m
                + (output_tokens as f64 / 1_000_000.0) * entry.output_per_m
        })
    }

    /// Returns true if the model has a known pricing entry.
    pub fn is_known(&self, model: &str) -> bool {
        self.lookup(model).is_some()
    }
}

// ── Global instance ───────────────────────────────────────────────────────────

static PRICING: OnceCell<PricingTable> = OnceCell::new();

/// Returns the global pricing table, loading from disk on first call.
pub fn pricing() -> &'static PricingTable {
    PRICING.get_or_init(load_pricing)
}

fn pricing_file_path() -> PathBuf {
    crate::config::stargazer_home().join("usage_pricing.toml")
}

fn load_pricing() -> PricingTable {
    let path = pricing_file_path();
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| {
            let table = PricingTable::from_toml_str(&s);
            if table.is_none() {
                tracing::warn!("Ignoring unusable pricing file {}", path.display());
            }
            table
        })
        .unwrap_or_else(PricingTable::defaults)
}

fn default_entries() -> Vec<ModelPricing> {
    vec![
        // ── OpenAI ───────────────────────────────────────────────────────────
        ModelPricing { prefix: "gpt-4o-mini".into(),         input_per_m: 0.15, output_per_m: 0.60  },
        ModelPricing { prefix: "gpt-4o".into(),              input_per_m: 2.50, output_per_m: 10.0  },
        ModelPricing { prefix: "gpt-4.1-mini".into(),        input_per_m: 0.40, output_per_m: 1.60  },
        ModelPricing { prefix: "gpt-4.1".into(),             input_per_m: 2.0,  output_per_m: 8.0   },
        // ── Anthropic ────────────────────────────────────────────────────────
        ModelPricing { prefix: "claude-3.5-haiku".into(),    input_per_m: 0.80, output_per_m: 4.0   },
        ModelPricing { prefix: "claude-3.5-sonnet".into(),   input_per_m: 3.0,  output_per_m: 15.0  },
        ModelPricing { prefix: "claude-sonnet-4".into(),     input_per_m: 3.0,  output_per_m: 15.0  },
        // ── Google ───────────────────────────────────────────────────────────
        ModelPricing { prefix: "gemini-2.0-flash".into(),    input_per_m: 0.10, output_per_m: 0.40  },
        ModelPricing { prefix: "gemini-flash-1.5".into(),    input_per_m: 0.075,output_per_m: 0.30  },
        // ── Meta / Mistral ───────────────────────────────────────────────────
        ModelPricing { prefix: "llama-3.1-70b".into(),       input_per_m: 0.12, output_per_m: 0.30  },
        ModelPricing { prefix: "llama-3.1-8b".into(),        input_per_m: 0.02, output_per_m: 0.05  },
        ModelPricing { prefix: "mistral-small".into(),       input_per_m: 0.10, output_per_m: 0.30  },
        // ── DeepSeek ─────────────────────────────────────────────────────────
        ModelPricing { prefix: "deepseek-r1".into(),         input_per_m: 0.55, output_per_m: 2.19  },
        ModelPricing { prefix: "deepseek".into(),            input_per_m: 0.27, output_per_m: 1.10  },
    ]
}
