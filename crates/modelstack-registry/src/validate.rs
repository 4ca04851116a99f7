use std::collections::HashSet;

use modelstack_common::Api;
use modelstack_config::DistributionConfig;

/// Outcome of a structural check pass over a distribution config. All
/// findings are collected in one pass; nothing stops at the first error.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn new() -> Self {
        Self::default()
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn print_summary(&self) {
        for warning in &self.warnings {
            println!("  warning: {warning}");
        }
        for error in &self.errors {
            println!("  error: {error}");
        }
        println!(
            "{} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        );
    }
}

/// Run every structural check against a loaded distribution config.
pub fn validate(config: &DistributionConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    if config.image_name.is_empty() {
        report.error("image_name must not be empty");
    }
    if config.server.port == 0 {
        report.error("server.port must be non-zero");
    }

    for api in &config.apis {
        if config.providers_for(*api).is_empty() {
            report.error(format!("api '{api}' is listed but has no provider bindings"));
        }
    }
    for api in config.providers.keys() {
        if !config.apis.contains(api) {
            report.warn(format!(
                "providers are declared for '{api}' but it is not listed under apis"
            ));
        }
    }

    for (api, specs) in &config.providers {
        let mut seen = HashSet::new();
        for spec in specs {
            if !seen.insert(&spec.provider_id) {
                report.error(format!(
                    "duplicate provider_id '{}' under '{api}'",
                    spec.provider_id
                ));
            }
        }
    }

    let inference: HashSet<_> = config
        .providers_for(Api::Inference)
        .iter()
        .map(|p| &p.provider_id)
        .collect();
    let mut model_ids = HashSet::new();
    for model in &config.models {
        if !model_ids.insert(&model.model_id) {
            report.error(format!("duplicate model_id '{}'", model.model_id));
        }
        for alias in &model.aliases {
            if !model_ids.insert(alias) {
                report.error(format!(
                    "alias '{alias}' of model '{}' collides with another model identifier",
                    model.model_id
                ));
            }
        }
        if !inference.contains(&model.provider_id) {
            report.error(format!(
                "model '{}' references '{}', which is not a declared inference provider",
                model.model_id, model.provider_id
            ));
        }
    }

    let tool_runtime: HashSet<_> = config
        .providers_for(Api::ToolRuntime)
        .iter()
        .map(|p| &p.provider_id)
        .collect();
    let mut toolgroup_ids = HashSet::new();
    for group in &config.tool_groups {
        if !toolgroup_ids.insert(&group.toolgroup_id) {
            report.error(format!("duplicate toolgroup_id '{}'", group.toolgroup_id));
        }
        if !tool_runtime.contains(&group.provider_id) {
            report.error(format!(
                "tool group '{}' references '{}', which is not a declared tool_runtime provider",
                group.toolgroup_id, group.provider_id
            ));
        }
    }

    let safety: HashSet<_> = config
        .providers_for(Api::Safety)
        .iter()
        .map(|p| &p.provider_id)
        .collect();
    let mut shield_ids = HashSet::new();
    for shield in &config.shields {
        if !shield_ids.insert(&shield.shield_id) {
            report.error(format!("duplicate shield_id '{}'", shield.shield_id));
        }
        if let Some(provider_id) = &shield.provider_id
            && !safety.contains(provider_id)
        {
            report.error(format!(
                "shield '{}' references '{}', which is not a declared safety provider",
                shield.shield_id, provider_id
            ));
        }
    }

    report
}
