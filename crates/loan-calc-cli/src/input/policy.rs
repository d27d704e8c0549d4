use std::fs;
use std::path::Path;

use loan_calc_core::LoanPolicy;
use tracing::debug;

/// Load the policy override given with `--policy`, or the built-in policy.
///
/// `.yaml` / `.yml` files are read as YAML, anything else as JSON. Keys left
/// out keep their default values.
pub fn load_policy(path: Option<&str>) -> Result<LoanPolicy, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(LoanPolicy::default());
    };

    let p = Path::new(path);
    let contents = fs::read_to_string(p)
        .map_err(|e| format!("Failed to read policy '{}': {}", p.display(), e))?;

    let is_yaml = matches!(
        p.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let policy: LoanPolicy = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse policy '{}': {}", p.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse policy '{}': {}", p.display(), e))?
    };

    policy.validate()?;
    debug!(path, "loaded policy override");
    Ok(policy)
}
