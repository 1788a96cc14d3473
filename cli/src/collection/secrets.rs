use crate::core::error::AppError;
use reqpad_lib::Variable;
use std::fs;
use std::path::Path;

const OS_PREFIX: &str = "reqpad__";
const ENV_SCOPE: &str = "env__";

/// Variables that live outside the collection: a `.env` file next to it, then OS variables.
pub fn load_secrets(dir: &Path, environment: Option<&str>) -> Result<Vec<Variable>, AppError> {
    let mut variables = Vec::new();

    let env_file = dir.join(".env");
    if env_file.is_file() {
        let content = fs::read_to_string(&env_file)?;
        variables.extend(parse_env_file(&content, environment));
    }

    variables.extend(os_variables(std::env::vars(), environment));
    Ok(variables)
}

/// Splits `env__<name>__<key>`, matching the prefix and environment name without case.
fn scoped_key<'a>(key: &'a str, environment: &str) -> Option<&'a str> {
    let rest = strip_prefix_ignore_case(key, ENV_SCOPE)?;
    let sep = rest.find("__")?;
    let (env_name, var_name) = (&rest[..sep], &rest[sep + 2..]);
    if env_name.is_empty() || var_name.is_empty() || !env_name.eq_ignore_ascii_case(environment) {
        return None;
    }
    Some(var_name)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// `KEY=value` lines; `#` comments and blank lines are skipped, surrounding quotes trimmed.
/// Scoped entries for the selected environment come after the general ones so they win.
pub fn parse_env_file(content: &str, environment: Option<&str>) -> Vec<Variable> {
    let mut general = Vec::new();
    let mut scoped = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"').to_string();
        if key.is_empty() {
            continue;
        }
        if strip_prefix_ignore_case(key, ENV_SCOPE).is_some() {
            if let Some(var_name) = environment.and_then(|env| scoped_key(key, env)) {
                scoped.push(Variable::new(var_name, value));
            }
        } else {
            general.push(Variable::new(key, value));
        }
    }

    general.extend(scoped);
    general
}

/// `REQPAD__KEY` and `REQPAD__ENV__<name>__KEY`; the key keeps its case.
pub fn os_variables(
    vars: impl Iterator<Item = (String, String)>,
    environment: Option<&str>,
) -> Vec<Variable> {
    let mut general = Vec::new();
    let mut scoped = Vec::new();

    for (key, value) in vars {
        let Some(stripped) = strip_prefix_ignore_case(&key, OS_PREFIX) else {
            continue;
        };
        if strip_prefix_ignore_case(stripped, ENV_SCOPE).is_some() {
            if let Some(var_name) = environment.and_then(|env| scoped_key(stripped, env)) {
                scoped.push(Variable::new(var_name, value));
            }
        } else if !stripped.is_empty() {
            general.push(Variable::new(stripped, value));
        }
    }

    general.extend(scoped);
    general
}
