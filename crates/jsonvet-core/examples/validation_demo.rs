//! Validation demonstration example
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use jsonvet_core::Validator;
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Jsonvet Validation Demo ===\n");

    demo_basic_validation()?;
    println!();
    demo_annotations_and_references()?;

    Ok(())
}

fn demo_basic_validation() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Basic validation against the 2020-12 dialect ---");

    let validator = Validator::new();
    let uri = validator.register_schema(
        Some("https://example.com/person"),
        r#"{
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"type": "string", "minLength": 1},
                "age": {"type": "integer", "minimum": 0}
            },
            "additionalProperties": false
        }"#,
    )?;

    let valid = json!({"name": "Ada", "age": 36});
    println!("validating {}:", valid);
    let outcome = validator.validate_value(uri.as_str(), &valid)?;
    println!("   valid: {}", outcome.valid());

    let invalid = json!({"name": "", "age": -1, "extra": true});
    println!("validating {}:", invalid);
    let outcome = validator.validate_value(uri.as_str(), &invalid)?;
    println!("   valid: {}", outcome.valid());
    for error in outcome.errors() {
        println!(
            "   {} at instance '{}': {}",
            error.evaluation_path,
            error.instance_location,
            error.message()
        );
    }

    Ok(())
}

fn demo_annotations_and_references() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Annotations and references ---");

    let validator = Validator::new();
    let uri = validator.register_schema(
        Some("https://example.com/doc"),
        r##"{
            "title": "A documented schema",
            "$defs": {"id": {"type": "string", "format": "uuid"}},
            "properties": {"id": {"$ref": "#/$defs/id"}}
        }"##,
    )?;

    let outcome = validator.validate(
        uri.as_str(),
        r#"{"id": "123e4567-e89b-12d3-a456-426614174000"}"#,
    )?;
    println!("valid: {}", outcome.valid());
    for annotation in outcome.annotations() {
        println!(
            "   annotation {} = {}",
            annotation.evaluation_path, annotation.detail
        );
    }

    Ok(())
}
