use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_nested(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Indented `key: value` rendering of an arbitrary serialisable model.
fn render_value(value: &Value, indent: usize, out: &mut String) {
    let pad = " ".repeat(indent);
    match value {
        Value::Array(items) => {
            for item in items {
                if is_nested(item) {
                    out.push_str(&format!("{pad}-\n"));
                    render_value(item, indent + 2, out);
                } else {
                    out.push_str(&format!("{pad}- {}\n", scalar_text(item)));
                }
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                if is_nested(item) {
                    out.push_str(&format!("{pad}{key}:\n"));
                    render_value(item, indent + 2, out);
                } else if let Value::String(s) = item {
                    if s.contains('\n') {
                        out.push_str(&format!("{pad}{key}:\n"));
                        for line in s.lines() {
                            out.push_str(&format!("{pad}  {line}\n"));
                        }
                    } else {
                        out.push_str(&format!("{pad}{key}: {s}\n"));
                    }
                } else {
                    out.push_str(&format!("{pad}{key}: {}\n", scalar_text(item)));
                }
            }
        }
        scalar => {
            for line in scalar_text(scalar).lines() {
                out.push_str(&format!("{pad}{line}\n"));
            }
        }
    }
}

fn render_text<T: Serialize + ?Sized>(model: &T) -> String {
    let value = serde_json::to_value(model).unwrap_or(Value::Null);
    let mut out = String::new();
    render_value(&value, 0, &mut out);
    out
}

pub struct Formatter {
    engine: OutputFormat,
}

impl Formatter {
    pub fn new(engine: OutputFormat) -> Self {
        Self { engine }
    }

    pub fn format<T: Serialize>(&self, model: &T) -> String {
        match self.engine {
            OutputFormat::Text => render_text(model),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(model).unwrap_or_default();
                json.push('\n');
                json
            }
        }
    }

    pub fn format_list<T: Serialize>(&self, list: &[T], title: &str, empty_msg: &str) -> String {
        match self.engine {
            OutputFormat::Text if list.is_empty() => format!("{empty_msg}\n"),
            OutputFormat::Text if title.is_empty() => render_text(list),
            OutputFormat::Text => format!("{title}\n{}", render_text(list)),
            OutputFormat::Json => {
                let mut json =
                    serde_json::to_string_pretty(list).unwrap_or_else(|_| "[]".to_string());
                json.push('\n');
                json
            }
        }
    }
}

pub fn get_formatter(output_format: &OutputFormat) -> Formatter {
    Formatter::new(*output_format)
}
