use std::collections::HashSet;

use modelstack_config::env::collect_placeholders;
use modelstack_config::{DistributionConfig, PlaceholderOp};
use modelstack_registry::ProviderRegistry;

/// Render a distribution's markdown documentation: API surface, provider
/// tables, environment variables, models, tool groups, and an example
/// invocation. The env-var table is scanned from the raw file so defaults
/// are reported as written, not as resolved.
pub fn render(config: &DistributionConfig, raw: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {} distribution\n\n", config.image_name));
    out.push_str(&format!(
        "The `{}` distribution bundles the provider configuration and model \
         registry below into one deployable stack.\n\n",
        config.image_name
    ));

    out.push_str("## APIs\n\n");
    for api in &config.apis {
        out.push_str(&format!("- `{api}`\n"));
    }
    out.push('\n');

    out.push_str("## Providers\n\n");
    let providers = ProviderRegistry::from_config(config);
    for api in providers.apis() {
        out.push_str(&format!("### {api}\n\n"));
        out.push_str("| provider_id | provider_type |\n");
        out.push_str("|---|---|\n");
        for spec in providers.providers_for(api) {
            out.push_str(&format!(
                "| `{}` | `{}` |\n",
                spec.provider_id, spec.provider_type
            ));
        }
        out.push('\n');
    }

    render_env_vars(&mut out, raw);
    render_models(&mut out, config);
    render_tool_groups(&mut out, config);
    render_invocation(&mut out, config, raw);

    out
}

fn render_env_vars(out: &mut String, raw: &str) {
    let placeholders = collect_placeholders(raw);
    if placeholders.is_empty() {
        return;
    }

    out.push_str("## Environment variables\n\n");
    out.push_str("| Variable | Required | Default |\n");
    out.push_str("|---|---|---|\n");

    let mut seen = HashSet::new();
    for placeholder in placeholders {
        if !seen.insert(placeholder.name.clone()) {
            continue;
        }
        let (required, default) = match &placeholder.op {
            PlaceholderOp::Required => ("yes", "-".to_string()),
            PlaceholderOp::Default(default) if default.is_empty() => {
                ("no", "(empty)".to_string())
            }
            PlaceholderOp::Default(default) => ("no", format!("`{default}`")),
            PlaceholderOp::IfSet(alt) => ("no", format!("`{alt}` (when set)")),
        };
        out.push_str(&format!(
            "| `{}` | {} | {} |\n",
            placeholder.name, required, default
        ));
    }
    out.push('\n');
}

fn render_models(out: &mut String, config: &DistributionConfig) {
    if !config.models.is_empty() {
        out.push_str("## Models\n\n");
        out.push_str("| Model | Provider | Native id | Type |\n");
        out.push_str("|---|---|---|---|\n");
        for model in &config.models {
            let mut ids = format!("`{}`", model.model_id);
            for alias in &model.aliases {
                ids.push_str(&format!(", `{alias}`"));
            }
            out.push_str(&format!(
                "| {ids} | `{}` | `{}` | {} |\n",
                model.provider_id,
                model.native_model_id(),
                model.model_type.as_str()
            ));
        }
        out.push('\n');
    }

    if !config.shields.is_empty() {
        out.push_str("## Shields\n\n");
        for shield in &config.shields {
            match &shield.provider_id {
                Some(provider) => out.push_str(&format!(
                    "- `{}` (provider `{provider}`)\n",
                    shield.shield_id
                )),
                None => out.push_str(&format!("- `{}`\n", shield.shield_id)),
            }
        }
        out.push('\n');
    }
}

fn render_tool_groups(out: &mut String, config: &DistributionConfig) {
    if config.tool_groups.is_empty() {
        return;
    }

    out.push_str("## Tool groups\n\n");
    for group in &config.tool_groups {
        match &group.mcp_endpoint {
            Some(endpoint) => out.push_str(&format!(
                "- `{}` via `{}` ({endpoint})\n",
                group.toolgroup_id, group.provider_id
            )),
            None => out.push_str(&format!(
                "- `{}` via `{}`\n",
                group.toolgroup_id, group.provider_id
            )),
        }
    }
    out.push('\n');
}

fn render_invocation(out: &mut String, config: &DistributionConfig, raw: &str) {
    out.push_str("## Running\n\n");
    out.push_str("```bash\n");
    out.push_str("modelstack validate --yaml-config run.yaml\n");

    let required = collect_placeholders(raw)
        .into_iter()
        .find(|p| p.op == PlaceholderOp::Required);
    match required {
        Some(placeholder) => out.push_str(&format!(
            "modelstack show --yaml-config run.yaml --port {} --env {}=...\n",
            config.server.port, placeholder.name
        )),
        None => out.push_str(&format!(
            "modelstack show --yaml-config run.yaml --port {}\n",
            config.server.port
        )),
    }
    out.push_str("```\n");
}
