//! `${VAR}` and `${VAR:-default}` expansion for configuration values.

use crate::ConfigError;

/// Variable lookup failure reported back through `shellexpand`.
struct UnsetVar(String);

/// Expand braced environment references in `value`.
///
/// Values without `${` are returned untouched, so literal dollars in tokens
/// or URLs survive. `field` names the config key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded = shellexpand::env_with_context(value, |name: &str| {
        std::env::var(name)
            .map(Some)
            .map_err(|_| UnsetVar(name.to_owned()))
    })
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })?;

    Ok(expanded.into_owned())
}

/// Expand an optional value in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(inner) = value.as_deref() {
        *value = Some(expand_env(inner, field)?);
    }
    Ok(())
}
