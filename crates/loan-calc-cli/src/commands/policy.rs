use serde_json::Value;

use loan_calc_core::LoanPolicy;

/// Effective policy after applying any `--policy` override.
pub fn run_policy(policy: &LoanPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::json!({
        "result": policy,
        "methodology": "Effective loan policy",
        "warnings": [],
    }))
}
