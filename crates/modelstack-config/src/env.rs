use std::collections::HashMap;
use std::sync::LazyLock;

use modelstack_common::{Error, Result};
use regex::{Captures, Regex};
use serde_yaml::Value;

/// Grammar: `${env.VAR}`, `${env.VAR:=default}`, `${env.VAR:+alt}`.
/// Anything that does not match (unterminated, bad operator) is not a
/// placeholder and passes through verbatim.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{env\.([A-Za-z_][A-Za-z0-9_]*)(?::([=+])([^}]*))?\}")
        .expect("placeholder pattern is valid")
});

/// Resolves environment variables with an override layer on top of the
/// process environment. Overrides come from repeated `--env KEY=VALUE`
/// arguments and always shadow the process.
#[derive(Debug, Clone, Default)]
pub struct EnvResolver {
    overrides: HashMap<String, String>,
}

impl EnvResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a resolver from `KEY=VALUE` pairs as passed on the command line.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = HashMap::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                Error::Env(format!("invalid env pair '{pair}': expected KEY=VALUE"))
            })?;
            if key.is_empty() {
                return Err(Error::Env(format!("invalid env pair '{pair}': empty key")));
            }
            overrides.insert(key.to_string(), value.to_string());
        }
        Ok(Self { overrides })
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.overrides.insert(key.into(), value.into());
    }

    /// Overrides first, process environment second.
    pub fn lookup(&self, name: &str) -> Option<String> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }
}

/// Which form a placeholder was written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderOp {
    /// `${env.VAR}`: the variable must be set.
    Required,
    /// `${env.VAR:=default}`: the default applies when unset.
    Default(String),
    /// `${env.VAR:+alt}`: `alt` applies when set, nothing otherwise.
    IfSet(String),
}

/// One placeholder occurrence in a raw document, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub op: PlaceholderOp,
}

/// Scan a raw document for every placeholder occurrence, without resolving
/// anything. Used for env-var listings and doc generation, where unset
/// required variables must not abort.
pub fn collect_placeholders(raw: &str) -> Vec<Placeholder> {
    PLACEHOLDER
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let op = match caps.get(2).map(|m| m.as_str()) {
                None => PlaceholderOp::Required,
                Some("=") => PlaceholderOp::Default(
                    caps.get(3).map(|m| m.as_str()).unwrap_or("").to_string(),
                ),
                Some(_) => PlaceholderOp::IfSet(
                    caps.get(3).map(|m| m.as_str()).unwrap_or("").to_string(),
                ),
            };
            Some(Placeholder { name, op })
        })
        .collect()
}

/// Interpolate every string scalar in a YAML tree. Mapping keys are left
/// untouched; only values are substituted.
pub fn substitute_value(value: Value, resolver: &EnvResolver) -> Result<Value> {
    match value {
        Value::String(s) => substitute_str(&s, resolver),
        Value::Sequence(items) => {
            let items = items
                .into_iter()
                .map(|item| substitute_value(item, resolver))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Sequence(items))
        }
        Value::Mapping(map) => {
            let mut out = serde_yaml::Mapping::with_capacity(map.len());
            for (key, val) in map {
                out.insert(key, substitute_value(val, resolver)?);
            }
            Ok(Value::Mapping(out))
        }
        other => Ok(other),
    }
}

/// Substitute placeholders in one string. A string that is exactly one
/// placeholder may resolve to null or a coerced scalar; embedded
/// placeholders always splice in as text.
fn substitute_str(s: &str, resolver: &EnvResolver) -> Result<Value> {
    if !s.contains("${env.") {
        return Ok(Value::String(s.to_string()));
    }

    if let Some(caps) = PLACEHOLDER.captures(s)
        && let Some(full) = caps.get(0)
        && full.start() == 0
        && full.end() == s.len()
    {
        return Ok(match resolve_one(&caps, resolver)? {
            None => Value::Null,
            Some(text) => coerce_scalar(text),
        });
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(s) {
        let Some(full) = caps.get(0) else { continue };
        out.push_str(&s[last..full.start()]);
        if let Some(text) = resolve_one(&caps, resolver)? {
            out.push_str(&text);
        }
        last = full.end();
    }
    out.push_str(&s[last..]);
    Ok(Value::String(out))
}

/// Resolve a single matched placeholder. `None` means "nothing here": null
/// for a whole-string placeholder, the empty splice otherwise.
fn resolve_one(caps: &Captures<'_>, resolver: &EnvResolver) -> Result<Option<String>> {
    let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let value = resolver.lookup(name);

    match caps.get(2).map(|m| m.as_str()) {
        // ${env.VAR}
        None => match value {
            Some(v) => Ok(Some(v)),
            None => Err(Error::Env(format!(
                "environment variable '{name}' is not set"
            ))),
        },
        // ${env.VAR:=default}
        Some("=") => {
            let default = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            match value {
                Some(v) => Ok(Some(v)),
                None if default.is_empty() => Ok(None),
                None => Ok(Some(default.to_string())),
            }
        }
        // ${env.VAR:+alt}, where set-but-empty counts as unset
        Some(_) => {
            let alt = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            match value {
                Some(v) if !v.is_empty() => Ok(Some(alt.to_string())),
                _ => Ok(None),
            }
        }
    }
}

/// Whole-string placeholder results are re-read as YAML scalars so that
/// `port: ${env.PORT:=8321}` deserializes as a number, not a string.
fn coerce_scalar(text: String) -> Value {
    match text.as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match text.parse::<i64>() {
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::String(text),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(pairs: &[(&str, &str)]) -> EnvResolver {
        let mut r = EnvResolver::new();
        for (k, v) in pairs {
            r.set(*k, *v);
        }
        r
    }

    fn sub(s: &str, r: &EnvResolver) -> Value {
        substitute_str(s, r).expect("substitution should succeed")
    }

    #[test]
    fn required_placeholder_uses_value_when_set() {
        let r = resolver(&[("MODEL", "llama3.2:3b")]);
        assert_eq!(sub("${env.MODEL}", &r), Value::String("llama3.2:3b".into()));
    }

    #[test]
    fn required_placeholder_errors_when_unset() {
        let r = resolver(&[]);
        let err = substitute_str("${env.MODELSTACK_TEST_NEVER_SET}", &r)
            .expect_err("unset required variable should fail");
        assert!(err.to_string().contains("MODELSTACK_TEST_NEVER_SET"));
    }

    #[test]
    fn default_applies_when_unset() {
        let r = resolver(&[]);
        assert_eq!(
            sub("${env.OLLAMA_URL:=http://localhost:11434}", &r),
            Value::String("http://localhost:11434".into())
        );
    }

    #[test]
    fn default_is_shadowed_by_value() {
        let r = resolver(&[("OLLAMA_URL", "http://10.0.0.1:11434")]);
        assert_eq!(
            sub("${env.OLLAMA_URL:=http://localhost:11434}", &r),
            Value::String("http://10.0.0.1:11434".into())
        );
    }

    #[test]
    fn empty_default_resolves_to_null_for_whole_string() {
        let r = resolver(&[]);
        assert_eq!(sub("${env.API_KEY:=}", &r), Value::Null);
    }

    #[test]
    fn empty_default_splices_as_empty_when_embedded() {
        let r = resolver(&[]);
        assert_eq!(
            sub("prefix-${env.SUFFIX:=}", &r),
            Value::String("prefix-".into())
        );
    }

    #[test]
    fn conditional_takes_alt_when_set() {
        let r = resolver(&[("TLS_CERT", "/etc/cert.pem")]);
        assert_eq!(
            sub("${env.TLS_CERT:+--tls}", &r),
            Value::String("--tls".into())
        );
    }

    #[test]
    fn conditional_resolves_to_null_when_unset() {
        let r = resolver(&[]);
        assert_eq!(sub("${env.TLS_CERT:+--tls}", &r), Value::Null);
    }

    #[test]
    fn conditional_treats_empty_value_as_unset() {
        let r = resolver(&[("TLS_CERT", "")]);
        assert_eq!(sub("${env.TLS_CERT:+--tls}", &r), Value::Null);
    }

    #[test]
    fn whole_string_results_coerce_to_scalars() {
        let r = resolver(&[("ENABLE", "true"), ("PORT", "8080")]);
        assert_eq!(sub("${env.ENABLE:=false}", &r), Value::Bool(true));
        assert_eq!(sub("${env.PORT:=8321}", &r), Value::Number(8080.into()));
        assert_eq!(sub("${env.MISSING:=8321}", &r), Value::Number(8321.into()));
    }

    #[test]
    fn embedded_placeholders_never_coerce() {
        let r = resolver(&[("PORT", "8080")]);
        assert_eq!(
            sub("host:${env.PORT}", &r),
            Value::String("host:8080".into())
        );
    }

    #[test]
    fn multiple_placeholders_splice_in_order() {
        let r = resolver(&[("DIR", "/data"), ("NAME", "store")]);
        assert_eq!(
            sub("${env.DIR:=/tmp}/${env.NAME}.db", &r),
            Value::String("/data/store.db".into())
        );
    }

    #[test]
    fn unterminated_placeholder_passes_through() {
        let r = resolver(&[]);
        assert_eq!(
            sub("${env.BROKEN", &r),
            Value::String("${env.BROKEN".into())
        );
    }

    #[test]
    fn process_env_is_visible_through_resolver() {
        // Unique name so other tests cannot collide.
        unsafe { std::env::set_var("MODELSTACK_ENV_RS_PROCESS_TEST", "from-process") };
        let r = resolver(&[]);
        assert_eq!(
            r.lookup("MODELSTACK_ENV_RS_PROCESS_TEST").as_deref(),
            Some("from-process")
        );

        let shadowed = resolver(&[("MODELSTACK_ENV_RS_PROCESS_TEST", "override")]);
        assert_eq!(
            shadowed.lookup("MODELSTACK_ENV_RS_PROCESS_TEST").as_deref(),
            Some("override")
        );
    }

    #[test]
    fn from_pairs_splits_on_first_equals() {
        let r = EnvResolver::from_pairs(["KEY=a=b", "PORT=1"]).expect("pairs should parse");
        assert_eq!(r.lookup("KEY").as_deref(), Some("a=b"));
        assert_eq!(r.lookup("PORT").as_deref(), Some("1"));
    }

    #[test]
    fn from_pairs_rejects_malformed_input() {
        assert!(EnvResolver::from_pairs(["NO_EQUALS"]).is_err());
        assert!(EnvResolver::from_pairs(["=value"]).is_err());
    }

    #[test]
    fn substitute_value_walks_nested_structures() {
        let r = resolver(&[("SQLITE_STORE_DIR", "/data")]);
        let doc: Value = serde_yaml::from_str(
            r#"
config:
  kvstore:
    type: sqlite
    db_path: ${env.SQLITE_STORE_DIR:=/tmp}/faiss_store.db
  limits:
  - ${env.MAX_CHUNKS:=512}
"#,
        )
        .expect("doc should parse");

        let out = substitute_value(doc, &r).expect("substitution should succeed");
        let rendered = serde_yaml::to_string(&out).expect("should serialize");
        assert!(rendered.contains("/data/faiss_store.db"));
        assert!(rendered.contains("512"));
    }

    #[test]
    fn collect_placeholders_reports_every_occurrence() {
        let raw = "a: ${env.A}\nb: ${env.B:=x}\nc: ${env.C:+y}\nagain: ${env.A}\n";
        let found = collect_placeholders(raw);
        assert_eq!(found.len(), 4);
        assert_eq!(found[0].name, "A");
        assert_eq!(found[0].op, PlaceholderOp::Required);
        assert_eq!(found[1].op, PlaceholderOp::Default("x".into()));
        assert_eq!(found[2].op, PlaceholderOp::IfSet("y".into()));
        assert_eq!(found[3].name, "A");
    }
}
