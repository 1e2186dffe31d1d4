//! プロンプト生成モジュール
//!
//! - ANALYSIS_PROMPT: 画像解析用の固定プロンプト
//! - build_chat_system_instruction: チャット用のシステム指示
//! - 各種フォールバック文言

use crate::types::AnalysisResult;

/// 画像解析プロンプト
pub const ANALYSIS_PROMPT: &str = "Analyze this photo of a fridge, pantry, or food items.
1. Identify all visible food ingredients.
2. Suggest 3-5 simple and easy recipes that can be made primarily with these ingredients.
3. For each recipe, list the ingredients used, any common pantry staples that might be missing, step-by-step instructions, difficulty level (Easy, Medium or Hard), and estimated cooking time.
Ensure the recipes are creative but practical.";

/// 解析失敗時にメッセージが無い場合の文言
pub const ANALYSIS_FAILURE_MESSAGE: &str =
    "Something went wrong while analyzing the image. Please try again.";

/// 解析レスポンスが空だった場合の文言
pub const EMPTY_ANALYSIS_MESSAGE: &str = "Failed to get a response from the AI.";

/// チャット応答が空だった場合の代替応答（エラーではない）
pub const CHAT_FALLBACK_REPLY: &str =
    "I'm not sure how to answer that. Could you try rephrasing?";

/// チャット呼び出し失敗時にトランスクリプトへ追加する応答
pub const CHAT_FAILURE_REPLY: &str =
    "Sorry, I'm having trouble thinking right now. Please try again later.";

/// チャットの最初に表示する挨拶
pub const CHAT_GREETING: &str = "Hi there! Those look like some great ingredients. Any questions about these recipes or need a substitution for something?";

/// チャット用システム指示を生成
///
/// 検出食材とレシピ名を文脈として埋め込む
pub fn build_chat_system_instruction(context: &AnalysisResult) -> String {
    let ingredients = context.detected_ingredients.join(", ");
    let recipes = context.recipe_titles().join(", ");

    format!(
        "You are FridgeChef AI, a helpful kitchen assistant.
The user has these ingredients: {ingredients}.
You previously suggested these recipes: {recipes}.
Answer the user's questions about these recipes, suggest substitutions, or give general cooking advice based on what they have.
Keep answers concise, helpful, and friendly."
    )
}
