use serde_json::{json, Map, Value};
use uskill_client::{ParamType, ParameterDescriptor, SkillDescriptor, SkillParams};

/// Skills that delete, move, or import content. Verification runs call them
/// with parameters that point at nothing, so the full code path runs without
/// touching real assets or scene objects.
pub const SAFE_OVERRIDE_SKILLS: &[&str] = &[
    "asset_delete",
    "asset_delete_batch",
    "asset_move",
    "asset_move_batch",
    "asset_duplicate",
    "asset_import",
    "asset_import_batch",
    "cleaner_delete_assets",
    "script_delete",
    "shader_delete",
    "gameobject_delete",
    "gameobject_delete_batch",
    "prefab_unpack",
];

const NONEXISTENT_TEST_FILE: &str = "Assets/__nonexistent_test_file__.txt";

/// Returns the fixed side-effect-free parameter set for a known mutating skill.
pub fn safe_override(skill: &str) -> Option<SkillParams> {
    let params = match skill {
        "asset_delete" | "asset_duplicate" => json!({ "assetPath": NONEXISTENT_TEST_FILE }),
        "asset_delete_batch" | "asset_move_batch" | "asset_import_batch"
        | "gameobject_delete_batch" => json!({ "items": "[]" }),
        "asset_move" => json!({
            "sourcePath": "Assets/__nonexistent__.txt",
            "destinationPath": "Assets/__nonexistent2__.txt"
        }),
        "asset_import" => json!({
            "sourcePath": "C:/__nonexistent__.txt",
            "destinationPath": "Assets/__test__.txt"
        }),
        "cleaner_delete_assets" => json!({ "paths": [] }),
        "script_delete" => json!({ "scriptPath": "Assets/__nonexistent__.cs" }),
        "shader_delete" => json!({ "shaderPath": "Assets/__nonexistent__.shader" }),
        "gameobject_delete" => json!({ "name": "__NonExistentObject__" }),
        "prefab_unpack" => json!({ "name": "__NonExistentPrefab__" }),
        _ => return None,
    };
    match params {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Builds parameters for a skill without knowing what it does.
///
/// Override table first, then declared defaults, then typed placeholders for
/// required parameters. Optional parameters without a default are left out.
pub fn synthesize(skill: &SkillDescriptor) -> SkillParams {
    if let Some(params) = safe_override(&skill.name) {
        return params;
    }

    let mut params = Map::new();
    for parameter in &skill.parameters {
        if let Some(default) = parameter.usable_default() {
            params.insert(parameter.name.clone(), default.clone());
        } else if parameter.required {
            if let Some(value) = placeholder(parameter) {
                params.insert(parameter.name.clone(), value);
            }
        }
    }
    params
}

fn placeholder(parameter: &ParameterDescriptor) -> Option<Value> {
    let value = match parameter.param_type {
        ParamType::String => Value::String(string_placeholder(&parameter.name).to_string()),
        ParamType::Integer => json!(0),
        ParamType::Number => json!(0.0),
        ParamType::Boolean => Value::Bool(false),
        ParamType::Array => Value::Array(Vec::new()),
        ParamType::Object => Value::Object(Map::new()),
        ParamType::Unknown => return None,
    };
    Some(value)
}

/// Picks a string placeholder from the parameter name. First match wins.
pub fn string_placeholder(name: &str) -> &'static str {
    let lowered = name.to_ascii_lowercase();
    let has = |needle: &str| lowered.contains(needle);
    if has("assetpath") {
        "Assets/__nonexistent_test__.asset"
    } else if has("path") || has("folder") {
        "Assets"
    } else if has("name") {
        "TestObject"
    } else if has("items") {
        "[]"
    } else if has("filter") || has("search") {
        "*"
    } else {
        "test"
    }
}
