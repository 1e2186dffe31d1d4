//! APIレスポンスパーサー
//!
//! 解析呼び出しのレスポンスからJSONを抽出し、AnalysisResultへパースする

use crate::error::{Error, Result};
use crate::types::AnalysisResult;

/// APIレスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} オブジェクト
/// 3. エラー
///
/// # Examples
/// ```
/// use fridge_chef_common::extract_json;
///
/// let response = "Result: {\"detectedIngredients\": []}";
/// let json = extract_json(response).unwrap();
/// assert!(json.starts_with('{'));
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    // 生の {...} を探す
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSON object not found".into()))
}

/// 解析レスポンスをパース
///
/// 要求スキーマの形（必須フィールド・難易度の列挙値）は厳密に検証する。
/// 食材とレシピの整合性など意味的な検証は行わない。
///
/// # Returns
/// * `Err(Error::EmptyResponse)` - レスポンスが空
/// * `Err(Error::Parse)` - JSONが見つからない
/// * `Err(Error::Json)` - JSONの形が合わない
pub fn parse_analysis_response(response: &str) -> Result<AnalysisResult> {
    if response.trim().is_empty() {
        return Err(Error::EmptyResponse);
    }

    let json_str = extract_json(response)?;
    Ok(serde_json::from_str(json_str.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;

    const OMELETTE: &str = r#"{
        "detectedIngredients": ["egg", "milk"],
        "suggestedRecipes": [{
            "title": "Omelette",
            "ingredientsUsed": ["egg", "milk"],
            "missingIngredients": ["salt"],
            "steps": ["Beat eggs", "Cook in pan"],
            "difficulty": "Easy",
            "cookingTime": "10 min"
        }]
    }"#;

    // =============================================
    // extract_json テスト
    // =============================================

    #[test]
    fn test_extract_json_with_block() {
        let response = "Here you go:\n```json\n{\"detectedIngredients\": []}\n```\nEnjoy.";
        let json = extract_json(response).unwrap();
        assert_eq!(json, "{\"detectedIngredients\": []}");
    }

    #[test]
    fn test_extract_json_raw() {
        let json = extract_json(OMELETTE).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = r#"Result: {"key": {"nested": 1}} done."#;
        assert_eq!(extract_json(response).unwrap(), r#"{"key": {"nested": 1}}"#);
    }

    #[test]
    fn test_extract_json_error() {
        let result = extract_json("No JSON here, just plain text.");
        if let Err(Error::Parse(msg)) = result {
            assert!(msg.contains("not found"));
        } else {
            panic!("Expected Parse error");
        }
    }

    // =============================================
    // parse_analysis_response テスト
    // =============================================

    #[test]
    fn test_parse_analysis_response() {
        let result = parse_analysis_response(OMELETTE).unwrap();
        assert_eq!(result.detected_ingredients, vec!["egg", "milk"]);
        assert_eq!(result.suggested_recipes.len(), 1);

        let recipe = &result.suggested_recipes[0];
        assert_eq!(recipe.title, "Omelette");
        assert_eq!(recipe.missing_ingredients, vec!["salt"]);
        assert_eq!(recipe.steps, vec!["Beat eggs", "Cook in pan"]);
        assert_eq!(recipe.difficulty, Difficulty::Easy);
        assert_eq!(recipe.cooking_time, "10 min");
    }

    #[test]
    fn test_parse_analysis_response_fenced() {
        let response = format!("```json\n{}\n```", OMELETTE);
        let result = parse_analysis_response(&response).unwrap();
        assert_eq!(result.suggested_recipes[0].title, "Omelette");
    }

    #[test]
    fn test_parse_analysis_response_empty() {
        assert!(matches!(parse_analysis_response(""), Err(Error::EmptyResponse)));
        assert!(matches!(parse_analysis_response("  \n"), Err(Error::EmptyResponse)));
    }

    #[test]
    fn test_parse_analysis_response_missing_recipe_field() {
        let response = r#"{"detectedIngredients": ["egg"], "suggestedRecipes": [{"title": "Egg"}]}"#;
        let err = parse_analysis_response(response).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_parse_analysis_response_missing_top_level_field() {
        let response = r#"{"detectedIngredients": ["egg"]}"#;
        assert!(parse_analysis_response(response).is_err());
    }

    #[test]
    fn test_parse_analysis_response_no_json() {
        let err = parse_analysis_response("Sorry, I can't see any food.").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_analysis_response_ignores_unknown_fields() {
        let response = r#"{"detectedIngredients": [], "suggestedRecipes": [], "notes": "x"}"#;
        let result = parse_analysis_response(response).unwrap();
        assert!(result.suggested_recipes.is_empty());
    }

    #[test]
    fn test_parse_analysis_response_no_semantic_check() {
        // 使用食材が検出食材に含まれなくても受け入れる
        let response = r#"{
            "detectedIngredients": ["egg"],
            "suggestedRecipes": [{
                "title": "Pancake", "ingredientsUsed": ["flour"], "missingIngredients": [],
                "steps": ["Mix"], "difficulty": "Medium", "cookingTime": "20 min"
            }]
        }"#;
        let result = parse_analysis_response(response).unwrap();
        assert_eq!(result.suggested_recipes[0].ingredients_used, vec!["flour"]);
    }
}
