use regex::Regex;
use serde_json::{Map, Value};

use crate::core::data_tree::lookup_path;

/// Prefix a binding expression uses to address the action configuration; the
/// stored shape drops it.
const ACTION_CONFIG_PREFIX: &str = "actionConfiguration.";

/// 判断文本是否包含 {{...}} 动态绑定
pub fn is_dynamic_binding(text: &str) -> bool {
    let re = Regex::new(r"\{\{.*\}\}").unwrap();
    re.is_match(text)
}

/// Inner text of the first embedded `{{...}}` expression, trimmed.
pub fn first_binding(text: &str) -> Option<String> {
    let re = Regex::new(r"\{\{(.*?)\}\}").unwrap();
    re.captures(text).map(|cap| cap[1].trim().to_string())
}

/// Translate a binding expression into the equivalent path within an
/// entity's stored-configuration shape.
///
/// `actionConfiguration.formData.x.data` → `formData.x.data`.
pub fn to_evaluated_path(expr: &str) -> String {
    expr.strip_prefix(ACTION_CONFIG_PREFIX)
        .unwrap_or(expr)
        .to_string()
}

/// Resolve every binding-valued parameter in `declared` against
/// `evaluated_values`.
///
/// - Path absent → the parameter is omitted from the substituted set.
/// - Value present but still a binding-looking string → empty string; an
///   unresolved expression is never forwarded to the backend.
/// - Value present and concrete → included under the original key.
///
/// Non-binding declared values pass through untouched.
pub fn substitute_params(
    declared: &Map<String, Value>,
    evaluated_values: &Value,
) -> Map<String, Value> {
    let mut substituted = Map::new();
    for (key, value) in declared {
        let binding = value.as_str().and_then(first_binding);
        let Some(expr) = binding else {
            substituted.insert(key.clone(), value.clone());
            continue;
        };

        let path = to_evaluated_path(&expr);
        let Some(resolved) = lookup_path(evaluated_values, &path) else {
            continue;
        };

        if resolved.as_str().is_some_and(is_dynamic_binding) {
            substituted.insert(key.clone(), Value::String(String::new()));
        } else {
            substituted.insert(key.clone(), resolved.clone());
        }
    }
    substituted
}
