use cartograph::analysis::FileAnalyzer;
use cartograph::core::entity::{Reference, Role, RuntimeHint};

fn analyzer() -> FileAnalyzer {
    FileAnalyzer::new().unwrap()
}

fn raw_names(uses: &[Reference]) -> Vec<&str> {
    uses.iter().map(|r| r.name()).collect()
}

#[test]
fn default_export_identifier_wins_the_name() {
    let content = r#"
function helper() { return 1; }
export default function ProductCard() {
    return <div>{helper()}</div>;
}
"#;
    let entity = analyzer()
        .analyze("components/product-card.tsx", content)
        .unwrap();
    assert_eq!(entity.name, "ProductCard");
}

#[test]
fn function_declaration_beats_const_declaration() {
    let content = r#"
const Card = () => <div />;
export function CardList() {
    return <div />;
}
"#;
    let entity = analyzer().analyze("components/cards.tsx", content).unwrap();
    assert_eq!(entity.name, "CardList");
}

#[test]
fn capitalized_const_is_used_when_nothing_else_declares_a_name() {
    let content = r#"
export const ProductCard = () => {
    return <div />;
};
"#;
    let entity = analyzer()
        .analyze("components/product-card.tsx", content)
        .unwrap();
    assert_eq!(entity.name, "ProductCard");
    assert!(entity.exports.contains(&"ProductCard".to_string()));
}

#[test]
fn anonymous_default_export_falls_back_to_the_filename() {
    let content = "export default () => <div />;\n";
    let entity = analyzer().analyze("components/nav-bar.tsx", content).unwrap();
    assert_eq!(entity.name, "NavBar");
}

#[test]
fn props_interface_members_become_fields() {
    let content = r#"
interface ProductCardProps {
    title: string;
    price?: number;
}

export default function ProductCard({ title, price }: ProductCardProps) {
    return <div>{title}</div>;
}
"#;
    let entity = analyzer()
        .analyze("components/product-card.tsx", content)
        .unwrap();

    assert_eq!(entity.props.len(), 2);
    assert_eq!(entity.props[0].name, "title");
    assert_eq!(entity.props[0].type_text, "string");
    assert!(entity.props[0].required);
    assert_eq!(entity.props[1].name, "price");
    assert_eq!(entity.props[1].type_text, "number");
    assert!(!entity.props[1].required);
}

#[test]
fn props_type_alias_also_counts() {
    let content = r#"
type BadgeProps = {
    label: string;
};

export default function Badge({ label }: BadgeProps) {
    return <span>{label}</span>;
}
"#;
    let entity = analyzer().analyze("components/badge.tsx", content).unwrap();
    assert_eq!(entity.props.len(), 1);
    assert_eq!(entity.props[0].name, "label");
}

#[test]
fn missing_props_declaration_yields_an_empty_list() {
    let entity = analyzer()
        .analyze(
            "components/plain.tsx",
            "export default function Plain() { return <div />; }\n",
        )
        .unwrap();
    assert!(entity.props.is_empty());
}

#[test]
fn references_union_imports_module_stems_and_calls() {
    let content = r#"
import Button from './button';
import { Price, formatLabel } from '../lib/pricing';
import React from 'react';

export default function Card() {
    const label = formatLabel('x');
    const total = computeTotal(1);
    return <Button>{label}{total}{Price}</Button>;
}
"#;
    let entity = analyzer().analyze("components/card.tsx", content).unwrap();
    let names = raw_names(&entity.uses);

    // Import targets from local modules.
    assert!(names.contains(&"Button"));
    assert!(names.contains(&"Price"));
    assert!(names.contains(&"formatLabel"));
    // Names derived from the imported module paths.
    assert!(names.contains(&"button"));
    assert!(names.contains(&"pricing"));
    assert!(names.contains(&"Pricing"));
    // Lower-case call identifiers from the body.
    assert!(names.contains(&"computeTotal"));
    // Package imports are not local references.
    assert!(!names.contains(&"React"));
    // De-duplicated despite appearing as both import and call.
    assert_eq!(names.iter().filter(|n| **n == "formatLabel").count(), 1);
}

#[test]
fn markup_in_a_plain_ts_file_uses_the_tolerant_retry() {
    let content = "export default function Widget() { return <div />; }\n";
    let entity = analyzer().analyze("components/Widget.ts", content).unwrap();
    assert_eq!(entity.name, "Widget");
}

#[test]
fn unparseable_content_is_skipped_not_fatal() {
    let content = "export default function {{{{\n";
    assert!(analyzer().analyze("components/Broken.tsx", content).is_none());
}

#[test]
fn runtime_hint_and_description_are_captured() {
    let content = r#"'use client'

/**
 * Shopping cart side panel.
 */
export default function CartPanel() {
    return <aside />;
}
"#;
    let entity = analyzer().analyze("components/cart-panel.tsx", content).unwrap();
    assert_eq!(entity.runtime, RuntimeHint::Client);
    assert_eq!(entity.description.as_deref(), Some("Shopping cart side panel."));
    assert_eq!(entity.role, Role::Component);
    assert_eq!(entity.source, content);
}
