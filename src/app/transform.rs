//! Reshapes a published (canonical) document into the draft output contract.
//!
//! The transform is one-way: fields are renamed, so feeding its output back in
//! does not reproduce the same document.
//!
//! - `id` → `uuid`, identifier namespace stripped
//! - `bodyXML` → `body`, value untouched
//! - `type` keeps only the bare type name
//! - `brands` entries become `{"id": <brand>}` objects
//! - `mainImage` (only alongside `brands`) becomes the trailing segment of its `id`

use serde_json::{json, Value};
use thiserror::Error;

use crate::constants::{ID_PREFIX, TYPE_PREFIX};
use crate::types::NativeDocument;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldShapeError {
    #[error("invalid id value, was expecting string")]
    Id,

    #[error("invalid type value, was expecting string")]
    Type,

    #[error("invalid brands value, was expecting array")]
    Brands,

    #[error("invalid brand entry, was expecting string")]
    BrandEntry,

    #[error("invalid mainImage entry, was expecting a map, got: {0}")]
    MainImage(String),

    #[error("invalid mainImage entry, was expecting an id-value pair")]
    MainImageId,
}

/// Builds a new draft-shaped document; the input is never modified and nothing
/// is produced when any field has the wrong shape.
pub fn canonical_to_draft(canonical: &NativeDocument) -> Result<NativeDocument, FieldShapeError> {
    let mut out = canonical.clone();

    if let Some(id) = canonical.get("id") {
        let id = id.as_str().ok_or(FieldShapeError::Id)?;
        out.remove("id");
        out.insert("uuid".to_string(), json!(strip_namespace(id, ID_PREFIX)));
    }

    if let Some(body) = out.remove("bodyXML") {
        out.insert("body".to_string(), body);
    }

    if let Some(content_type) = canonical.get("type") {
        let content_type = content_type.as_str().ok_or(FieldShapeError::Type)?;
        out.insert("type".to_string(), json!(strip_namespace(content_type, TYPE_PREFIX)));
    }

    if let Some(brands) = canonical.get("brands") {
        let brands = brands.as_array().ok_or(FieldShapeError::Brands)?;
        let wrapped = brands
            .iter()
            .map(|brand| {
                brand
                    .as_str()
                    .map(|id| json!({ "id": id }))
                    .ok_or(FieldShapeError::BrandEntry)
            })
            .collect::<Result<Vec<Value>, _>>()?;
        out.insert("brands".to_string(), Value::Array(wrapped));

        if let Some(main_image) = canonical.get("mainImage") {
            out.insert("mainImage".to_string(), json!(main_image_uuid(main_image)?));
        }
    }

    Ok(out)
}

fn strip_namespace<'a>(value: &'a str, prefix: &str) -> &'a str {
    value.strip_prefix(prefix).unwrap_or(value)
}

fn main_image_uuid(main_image: &Value) -> Result<&str, FieldShapeError> {
    let image = main_image
        .as_object()
        .ok_or_else(|| FieldShapeError::MainImage(main_image.to_string()))?;
    let id = image
        .get("id")
        .and_then(Value::as_str)
        .ok_or(FieldShapeError::MainImageId)?;
    Ok(id.rsplit('/').next().unwrap_or(id))
}
