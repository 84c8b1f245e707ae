//! WebAssembly bindings for Kindred
//!
//! JSON in, JSON out wrappers around [`organize`](crate::organize) and
//! [`layout`](crate::layout) for a browser-side family tree editor.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::core::{Diagnostics, FamilyInput};
use crate::organizer::Organizer;
use crate::tree::{DragOffsets, TreeLayoutAlgorithm};

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(to_js_error)
}

/// Organize a family document
///
/// # Arguments
/// * `input` - JSON `{ "people": [...], "relationships": [...] }`
///
/// # Returns
/// * JSON with the organized family and the diagnostics recorded on the way
/// * Throws a JavaScript error if the input is not a valid family document
#[wasm_bindgen]
pub fn organize_family(input: &str) -> Result<String, JsValue> {
    let family_input = FamilyInput::from_json(input).map_err(to_js_error)?;
    let mut diagnostics = Diagnostics::new();
    let family = Organizer::new().organize_with_diagnostics(
        &family_input.people,
        &family_input.relationships,
        &mut diagnostics,
    );

    to_json(&serde_json::json!({
        "family": family,
        "diagnostics": diagnostics.entries(),
    }))
}

/// Organize and lay out a family document
///
/// # Arguments
/// * `input` - JSON `{ "people": [...], "relationships": [...] }`
/// * `container_width` - Width available for the tree
/// * `multi_row` - Pack large child tiers into a grid
/// * `drag_offsets` - JSON object of person id to `{ "dx": .., "dy": .. }`,
///   or an empty string for none
///
/// # Returns
/// * JSON with `positions`, `connections`, `container_width` and
///   `container_height`
#[wasm_bindgen]
pub fn layout_family(
    input: &str,
    container_width: f64,
    multi_row: bool,
    drag_offsets: &str,
) -> Result<String, JsValue> {
    let family_input = FamilyInput::from_json(input).map_err(to_js_error)?;
    let offsets = if drag_offsets.trim().is_empty() {
        DragOffsets::new()
    } else {
        DragOffsets::from_json(drag_offsets).map_err(to_js_error)?
    };

    let family = Organizer::new().organize(&family_input.people, &family_input.relationships);
    let tree = TreeLayoutAlgorithm::new().layout(&family, container_width, multi_row, &offsets);
    to_json(&tree)
}
