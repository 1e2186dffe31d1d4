//! ターミナル表示
//!
//! AppState を読むだけの文字列レンダラ。状態は変更しない。

use fridge_chef_common::{AppState, ChatMessage, ChatRole, Phase, Recipe, CHAT_GREETING};
use std::fmt::Write as _;

pub fn render_ingredients(ingredients: &[String]) -> String {
    if ingredients.is_empty() {
        return "Identified from image: (nothing recognised)".to_string();
    }
    let tags = ingredients
        .iter()
        .map(|i| format!("[{}]", i))
        .collect::<Vec<_>>()
        .join(" ");
    format!("Identified from image:\n  {}", tags)
}

/// レシピ一覧の1行（番号は1始まり）
pub fn render_recipe_card(index: usize, recipe: &Recipe) -> String {
    let mut card = format!(
        "{:>2}. {}  ({}, {})",
        index + 1,
        recipe.title,
        recipe.difficulty,
        recipe.cooking_time
    );
    if !recipe.missing_ingredients.is_empty() {
        let _ = write!(card, "\n    missing: {}", recipe.missing_ingredients.join(", "));
    }
    card
}

pub fn render_recipe_list(recipes: &[Recipe]) -> String {
    let mut out = String::from("Chef's picks (open one with /recipe N):");
    for (i, recipe) in recipes.iter().enumerate() {
        out.push('\n');
        out.push_str(&render_recipe_card(i, recipe));
    }
    out
}

pub fn render_recipe_detail(recipe: &Recipe) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", recipe.title);
    let _ = writeln!(out, "Difficulty: {}   Time: {}", recipe.difficulty, recipe.cooking_time);

    let _ = writeln!(out, "\nIngredients you have:");
    for item in &recipe.ingredients_used {
        let _ = writeln!(out, "  - {}", item);
    }

    if !recipe.missing_ingredients.is_empty() {
        let _ = writeln!(out, "\nYou may also need:");
        for item in &recipe.missing_ingredients {
            let _ = writeln!(out, "  - {}", item);
        }
    }

    let _ = writeln!(out, "\nSteps:");
    for (i, step) in recipe.steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, step);
    }
    let _ = write!(out, "\n(/close to return)");
    out
}

pub fn render_message(message: &ChatMessage) -> String {
    let speaker = match message.role {
        ChatRole::User => "you",
        ChatRole::Assistant => "chef",
    };
    format!("{}> {}", speaker, message.content)
}

pub fn render_chat(history: &[ChatMessage]) -> String {
    std::iter::once(format!("chef> {}", CHAT_GREETING))
        .chain(history.iter().map(render_message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 現在の状態の要約
pub fn render_status(state: &AppState) -> String {
    match state.phase() {
        Phase::Idle => "No photo yet. Use /new <IMAGE> to snap your fridge.".to_string(),
        Phase::Analyzing => "Analyzing ingredients... thinking of tasty recipes for you.".to_string(),
        Phase::Errored => format!(
            "Oops! Something went wrong: {}\nUse /retry to try again or /new <IMAGE> for another photo.",
            state.error().unwrap_or_default()
        ),
        Phase::Asking => "The chef is thinking...".to_string(),
        Phase::Ready => match state.result() {
            Some(result) => format!(
                "{}\n\n{}",
                render_ingredients(&result.detected_ingredients),
                render_recipe_list(&result.suggested_recipes)
            ),
            None => String::new(),
        },
    }
}
