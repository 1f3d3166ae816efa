//! Markdown reference documentation for a form schema.

use serde_json::Value;

use sform_core::{properties, ref_pointer};

use crate::resolve::resolve_ref;

fn type_label(schema: &Value) -> Option<String> {
    match schema.get("type")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(list) => Some(
            list.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" | "),
        ),
        _ => None,
    }
}

/// Render `schema` as Markdown under the heading `name`.
///
/// One section per top-level property with its title, description, type,
/// default, allowed values and whether it is required. `$ref` properties
/// are documented from their resolved target and name the pointer.
pub fn generate_documentation(schema: &Value, name: &str) -> String {
    let mut doc = format!("# {name}\n\n");

    if let Some(description) = schema.get("description").and_then(Value::as_str) {
        doc.push_str(&format!("{description}\n\n"));
    }
    if let Some(ty) = type_label(schema) {
        doc.push_str(&format!("**Type:** {ty}\n\n"));
    }

    let Some(props) = properties(schema) else {
        return doc;
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    doc.push_str("## Properties\n\n");
    for (prop_name, raw) in props {
        let prop = resolve_ref(raw, schema);
        doc.push_str(&format!("### {prop_name}\n\n"));

        if let Some(title) = prop.get("title").and_then(Value::as_str) {
            doc.push_str(&format!("**Title:** {title}\n\n"));
        }
        if let Some(description) = prop.get("description").and_then(Value::as_str) {
            doc.push_str(&format!("{description}\n\n"));
        }
        if let Some(pointer) = ref_pointer(raw) {
            doc.push_str(&format!("**Reference:** `{pointer}`\n\n"));
        }
        if let Some(ty) = type_label(&prop) {
            doc.push_str(&format!("**Type:** {ty}\n\n"));
        }
        if let Some(default) = prop.get("default") {
            doc.push_str(&format!("**Default:** {default}\n\n"));
        }
        if let Some(values) = prop.get("enum").and_then(Value::as_array) {
            let rendered: Vec<String> = values.iter().map(Value::to_string).collect();
            doc.push_str(&format!("**Allowed Values:** {}\n\n", rendered.join(", ")));
        }
        if required.contains(&prop_name.as_str()) {
            doc.push_str("**Required:** Yes\n\n");
        }
        doc.push_str("---\n\n");
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn documents_properties() {
        let schema = json!({
            "type": "object",
            "description": "Application settings",
            "required": ["level"],
            "properties": {
                "level": {
                    "type": "string",
                    "title": "Log level",
                    "enum": ["debug", "info"],
                    "default": "info"
                },
                "retries": {"type": ["integer", "null"]}
            }
        });
        let doc = generate_documentation(&schema, "Settings");
        assert!(doc.starts_with("# Settings\n\nApplication settings\n\n**Type:** object\n\n"));
        assert!(doc.contains("### level\n\n**Title:** Log level\n\n**Type:** string\n\n"));
        assert!(doc.contains("**Default:** \"info\"\n\n"));
        assert!(doc.contains("**Allowed Values:** \"debug\", \"info\"\n\n**Required:** Yes\n\n---\n\n"));
        assert!(doc.contains("### retries\n\n**Type:** integer | null\n\n---\n\n"));
    }

    #[test]
    fn ref_properties_use_target() {
        let schema = json!({
            "type": "object",
            "properties": {"owner": {"$ref": "#/$defs/Person", "description": "Who owns it"}},
            "$defs": {"Person": {"type": "object", "title": "Person"}}
        });
        let doc = generate_documentation(&schema, "Thing");
        assert!(doc.contains(
            "### owner\n\n**Title:** Person\n\nWho owns it\n\n**Reference:** `#/$defs/Person`\n\n**Type:** object\n\n"
        ));
    }

    #[test]
    fn schema_without_properties() {
        assert_eq!(
            generate_documentation(&json!({"type": "string"}), "Name"),
            "# Name\n\n**Type:** string\n\n"
        );
    }
}
