use crate::value::Value;

/// Expand `{0}`, `{1}`… in `reason` with `args` and make sure the phrase
/// reads "because …". Empty reasons stay empty.
pub fn format_reason(reason: &str, args: &[Value]) -> String {
    let mut out = reason.to_string();
    for (i, arg) in args.iter().enumerate() {
        let rendered = match arg {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        };
        out = out.replace(&format!("{{{i}}}"), &rendered);
    }
    let out = out.trim();
    if out.is_empty() {
        String::new()
    } else if out.starts_with("because") {
        out.to_string()
    } else {
        format!("because {out}")
    }
}

/// The reason as it is spliced into a failure message: `", because …"` or
/// nothing at all.
pub fn render_clause(reason: &str, args: &[Value]) -> String {
    let formatted = format_reason(reason, args);
    if formatted.is_empty() {
        formatted
    } else {
        format!(", {formatted}")
    }
}
