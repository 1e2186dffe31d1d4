//! 解析レスポンスのスキーマ
//!
//! Gemini の responseSchema（OpenAPIサブセット）形式

use serde_json::{json, Value};

use crate::types::Difficulty;

/// AnalysisResult に対応するレスポンススキーマ
pub fn analysis_response_schema() -> Value {
    let difficulties: Vec<&str> = Difficulty::ALL.iter().map(|d| d.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "detectedIngredients": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of food items identified in the image"
            },
            "suggestedRecipes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "ingredientsUsed": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "missingIngredients": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "steps": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "difficulty": { "type": "STRING", "enum": difficulties },
                        "cookingTime": { "type": "STRING" }
                    },
                    "required": [
                        "title", "ingredientsUsed", "missingIngredients",
                        "steps", "difficulty", "cookingTime"
                    ]
                }
            }
        },
        "required": ["detectedIngredients", "suggestedRecipes"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_top_level_required() {
        let schema = analysis_response_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["required"], json!(["detectedIngredients", "suggestedRecipes"]));
    }

    #[test]
    fn test_schema_recipe_fields_all_required() {
        let schema = analysis_response_schema();
        let recipe = &schema["properties"]["suggestedRecipes"]["items"];
        let required = recipe["required"].as_array().unwrap();
        assert_eq!(required.len(), 6);

        // required と properties が一致すること
        let properties = recipe["properties"].as_object().unwrap();
        for field in required {
            assert!(properties.contains_key(field.as_str().unwrap()));
        }
    }

    #[test]
    fn test_schema_difficulty_enum() {
        let schema = analysis_response_schema();
        let difficulty = &schema["properties"]["suggestedRecipes"]["items"]["properties"]["difficulty"];
        assert_eq!(difficulty["enum"], json!(["Easy", "Medium", "Hard"]));
    }
}
