use serde_json::Value;

use super::MenuError;
use crate::model::menu::{Category, Item, MenuDocument, SalonInfo, SchemaVersion};

const DEFAULT_SALON_NAME: &str = "Salon";

/// Known homes of the booking-flow object, tried in order.
const SCHEMAS: [(SchemaVersion, &str); 3] = [
    (SchemaVersion::BookingFlowV1, "/data/bookingFlowInitialize"),
    (SchemaVersion::NextData, "/props/pageProps/bookingFlowInitialize"),
    (SchemaVersion::BookingFlowBare, ""),
];

pub fn match_schema(root: &Value) -> Option<(SchemaVersion, &Value)> {
    SCHEMAS.iter().find_map(|&(version, pointer)| {
        root.pointer(pointer)
            .filter(|v| v.get("layout").is_some())
            .map(|v| (version, v))
    })
}

pub fn parse(root: &Value) -> Result<MenuDocument, MenuError> {
    let (schema, flow) = match_schema(root).ok_or(MenuError::NotFound)?;

    let cart = flow
        .pointer("/layout/cart")
        .filter(|v| v.is_object())
        .ok_or(MenuError::MissingField("layout.cart"))?;

    let categories = flow
        .pointer("/screenServices/categories")
        .and_then(|v| v.as_array())
        .ok_or(MenuError::MissingField("screenServices.categories"))?;

    let salon = SalonInfo {
        // Only a missing key gets the default; an explicit null stays empty.
        name: cart
            .get("name")
            .map(scalar_text)
            .unwrap_or_else(|| DEFAULT_SALON_NAME.to_string()),
        address: cart.get("address").and_then(optional_text),
        avatar_url: cart.get("avatarUrl").and_then(optional_text),
    };

    let categories = categories.iter().map(parse_category).collect();

    Ok(MenuDocument {
        schema,
        salon,
        categories,
    })
}

fn parse_category(v: &Value) -> Category {
    let items = v
        .get("items")
        .and_then(|i| i.as_array())
        .map(|arr| arr.iter().map(parse_item).collect())
        .unwrap_or_default();

    Category {
        name: text_field(v, "name"),
        description: text_field(v, "description"),
        items,
    }
}

fn parse_item(v: &Value) -> Item {
    Item {
        name: text_field(v, "name"),
        description: text_field(v, "description"),
        price: price_of(v),
    }
}

// `price.formatted` on current payloads; some dumps carry a bare string.
fn price_of(item: &Value) -> String {
    match item.get("price") {
        Some(Value::Object(p)) => p.get("formatted").map(scalar_text).unwrap_or_default(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn text_field(v: &Value, key: &str) -> String {
    v.get(key).map(scalar_text).unwrap_or_default()
}

fn optional_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        other => Some(scalar_text(other)),
    }
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
