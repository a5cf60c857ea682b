//! Locale command implementation.

use anyhow::Result;
use keyscope_config::{Environment, LocaleSpec};
use serde_json::json;

pub fn run(spec: &str) -> Result<()> {
    let report = report(&LocaleSpec::parse(spec), &Environment::from_process());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn report(spec: &LocaleSpec, env: &Environment) -> serde_json::Value {
    json!({
        "spec": spec.as_str(),
        "valid": spec.is_valid(),
        "specificity": spec.specificity(),
        "matches": spec.matches(env),
        "environment": {
            "realm": env.realm,
            "region": env.region,
            "az": env.az,
            "domain": env.domain,
        },
    })
}
