use std::collections::HashSet;
use std::path::Path;
use tree_sitter::Node as TSNode;

use crate::core::entity::PropField;

use super::source::{collect_descendants_by_kind, extract_text, find_child_by_kind};

/// Call-expression identifiers that never refer to an application entity.
const RESERVED_CALLS: &[&str] = &[
    "require",
    "fetch",
    "setTimeout",
    "setInterval",
    "clearTimeout",
    "clearInterval",
    "parseInt",
    "parseFloat",
    "isNaN",
    "encodeURIComponent",
    "decodeURIComponent",
    "structuredClone",
    "alert",
    "confirm",
    "prompt",
    "typeof",
    "eval",
];

/// Declared-name precedence: default-export identifier, then a top-level
/// function declaration, then a capitalized (or hook-named) top-level const,
/// then the capitalized filename.
pub fn declared_name(root: &TSNode, source: &[u8], path: &str) -> String {
    if let Some(name) = default_export_name(root, source) {
        return name;
    }

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        let decl = unwrap_export(&child);
        if decl.kind() == "function_declaration" {
            if let Some(name) = decl.child_by_field_name("name") {
                return extract_text(&name, source).to_string();
            }
        }
    }

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        let decl = unwrap_export(&child);
        if matches!(decl.kind(), "lexical_declaration" | "variable_declaration") {
            for declarator in collect_descendants_by_kind(&decl, "variable_declarator") {
                if let Some(name_node) = declarator.child_by_field_name("name") {
                    let name = extract_text(&name_node, source);
                    if is_entity_name(name) {
                        return name.to_string();
                    }
                }
            }
        }
    }

    filename_fallback(path)
}

fn default_export_name(root: &TSNode, source: &[u8]) -> Option<String> {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "export_statement" || !has_default_keyword(&child) {
            continue;
        }
        let mut inner = child.walk();
        for part in child.children(&mut inner) {
            match part.kind() {
                "function_declaration" | "class_declaration" => {
                    if let Some(name) = part
                        .child_by_field_name("name")
                        .or_else(|| find_child_by_kind(&part, "identifier"))
                        .or_else(|| find_child_by_kind(&part, "type_identifier"))
                    {
                        return Some(extract_text(&name, source).to_string());
                    }
                }
                "identifier" => {
                    return Some(extract_text(&part, source).to_string());
                }
                _ => {}
            }
        }
    }
    None
}

/// Names the file exports; feeds the resolver's export index.
pub fn export_names(root: &TSNode, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |name: &str| {
        if !name.is_empty() && seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    };

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "export_statement" {
            continue;
        }
        let mut inner = child.walk();
        for part in child.children(&mut inner) {
            match part.kind() {
                "function_declaration" | "class_declaration" => {
                    if let Some(name) = part
                        .child_by_field_name("name")
                        .or_else(|| find_child_by_kind(&part, "identifier"))
                        .or_else(|| find_child_by_kind(&part, "type_identifier"))
                    {
                        push(extract_text(&name, source));
                    }
                }
                "lexical_declaration" | "variable_declaration" => {
                    for declarator in collect_descendants_by_kind(&part, "variable_declarator") {
                        if let Some(name) = declarator.child_by_field_name("name") {
                            push(extract_text(&name, source));
                        }
                    }
                }
                "export_clause" => {
                    for spec in collect_descendants_by_kind(&part, "export_specifier") {
                        if let Some(name) = spec
                            .child_by_field_name("name")
                            .or_else(|| find_child_by_kind(&spec, "identifier"))
                        {
                            push(extract_text(&name, source));
                        }
                    }
                }
                "identifier" if has_default_keyword(&child) => {
                    push(extract_text(&part, source));
                }
                _ => {}
            }
        }
    }

    names
}

/// Extracts the declared props surface: one field per member of a sibling
/// `<Name>Props` interface or object type alias. Absence is an empty list,
/// never an error.
pub fn props_fields(root: &TSNode, source: &[u8], entity_name: &str) -> Vec<PropField> {
    let target = format!("{entity_name}Props");

    for interface in collect_descendants_by_kind(root, "interface_declaration") {
        if named_type_matches(&interface, source, &target) {
            if let Some(body) = find_child_by_kind(&interface, "interface_body")
                .or_else(|| find_child_by_kind(&interface, "object_type"))
            {
                return member_fields(&body, source);
            }
        }
    }

    for alias in collect_descendants_by_kind(root, "type_alias_declaration") {
        if named_type_matches(&alias, source, &target) {
            if let Some(body) = find_child_by_kind(&alias, "object_type") {
                return member_fields(&body, source);
            }
        }
    }

    Vec::new()
}

fn named_type_matches(node: &TSNode, source: &[u8], target: &str) -> bool {
    node.child_by_field_name("name")
        .or_else(|| find_child_by_kind(node, "type_identifier"))
        .is_some_and(|name| extract_text(&name, source) == target)
}

fn member_fields(body: &TSNode, source: &[u8]) -> Vec<PropField> {
    let mut fields = Vec::new();
    let mut cursor = body.walk();
    for member in body.children(&mut cursor) {
        if member.kind() != "property_signature" {
            continue;
        }
        let Some(name_node) = member.child_by_field_name("name") else {
            continue;
        };
        let type_text = member
            .child_by_field_name("type")
            .map(|t| {
                extract_text(&t, source)
                    .trim_start_matches(':')
                    .trim()
                    .to_string()
            })
            .unwrap_or_else(|| "unknown".to_string());
        let optional = (0..member.child_count())
            .filter_map(|i| member.child(i))
            .any(|c| c.kind() == "?");
        fields.push(PropField {
            name: extract_text(&name_node, source).to_string(),
            type_text,
            required: !optional,
        });
    }
    fields
}

/// Raw outbound reference names, deliberately over-inclusive: local import
/// targets, names derived from imported module paths, and lower-case call
/// identifiers in the body. De-duplicated, order preserved.
pub fn reference_names(root: &TSNode, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |name: String| {
        if !name.is_empty() && seen.insert(name.clone()) {
            names.push(name);
        }
    };

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "import_statement" {
            continue;
        }
        let Some(source_node) = child
            .child_by_field_name("source")
            .or_else(|| find_child_by_kind(&child, "string"))
        else {
            continue;
        };
        let module = extract_text(&source_node, source)
            .trim_matches(|c| c == '\'' || c == '"' || c == '`')
            .to_string();
        if !is_local_module(&module) {
            continue;
        }

        if let Some(clause) = find_child_by_kind(&child, "import_clause") {
            if let Some(default_name) = find_child_by_kind(&clause, "identifier") {
                push(extract_text(&default_name, source).to_string());
            }
            for spec in collect_descendants_by_kind(&clause, "import_specifier") {
                if let Some(name) = spec.child_by_field_name("name") {
                    push(extract_text(&name, source).to_string());
                }
                if let Some(alias) = spec.child_by_field_name("alias") {
                    push(extract_text(&alias, source).to_string());
                }
            }
        }

        let stem = module_stem(&module);
        push(stem.to_string());
        push(pascal_case(stem));
    }

    for call in collect_descendants_by_kind(root, "call_expression") {
        let Some(callee) = call.child_by_field_name("function") else {
            continue;
        };
        if callee.kind() != "identifier" {
            continue;
        }
        let name = extract_text(&callee, source);
        if name.starts_with(|c: char| c.is_ascii_lowercase()) && !RESERVED_CALLS.contains(&name) {
            push(name.to_string());
        }
    }

    names
}

/// First prose line of a leading `/** ... */` block, if any.
pub fn leading_description(root: &TSNode, source: &[u8]) -> Option<String> {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "comment" {
            // Directive prologues ("use client" and friends) may precede the
            // doc block; anything else ends the leading-comment region.
            let is_directive = child.kind() == "expression_statement"
                && find_child_by_kind(&child, "string").is_some();
            if is_directive {
                continue;
            }
            break;
        }
        let text = extract_text(&child, source);
        if let Some(body) = text.strip_prefix("/**") {
            let body = body.strip_suffix("*/").unwrap_or(body);
            for line in body.lines() {
                let line = line.trim().trim_start_matches('*').trim();
                if !line.is_empty() && !line.starts_with('@') {
                    return Some(line.to_string());
                }
            }
        }
    }
    None
}

fn unwrap_export<'a>(node: &'a TSNode<'a>) -> TSNode<'a> {
    if node.kind() == "export_statement" {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(
                child.kind(),
                "function_declaration"
                    | "class_declaration"
                    | "lexical_declaration"
                    | "variable_declaration"
            ) {
                return child;
            }
        }
    }
    *node
}

fn has_default_keyword(export: &TSNode) -> bool {
    (0..export.child_count())
        .filter_map(|i| export.child(i))
        .any(|c| c.kind() == "default")
}

fn is_local_module(module: &str) -> bool {
    module.starts_with("./")
        || module.starts_with("../")
        || module.starts_with("@/")
        || module.starts_with("~/")
}

fn module_stem(module: &str) -> &str {
    let stem = module.rsplit('/').next().unwrap_or(module);
    if stem == "index" {
        // `./cart/index` names the directory, not the file.
        let trimmed = module.trim_end_matches("/index");
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    } else {
        stem
    }
}

fn is_entity_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
        || name
            .strip_prefix("use")
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_uppercase())
}

/// `cart-button` -> `CartButton`; used for filename fallbacks and module
/// path derivations.
pub fn pascal_case(input: &str) -> String {
    input
        .split(['-', '_', '.', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn filename_fallback(path: &str) -> String {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    let stem = file_name.split('.').next().unwrap_or(file_name);
    pascal_case(stem)
}
