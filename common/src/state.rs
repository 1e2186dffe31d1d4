//! アプリケーション状態遷移
//!
//! 画像選択 → 解析中 → 結果/エラー → チャット の状態を `(AppState, Intent) -> AppState`
//! の純粋な遷移関数として表現する。副作用（API呼び出し）は `Command` として返し、
//! 実行は呼び出し側に任せる。
//!
//! 非同期の完了通知には発行時の世代（Generation）が付く。画像の再選択かリセットで
//! 世代が進むため、古い世代の完了通知は状態に反映されず破棄される。

use crate::prompts::{ANALYSIS_FAILURE_MESSAGE, CHAT_FAILURE_REPLY};
use crate::types::{AnalysisResult, ChatMessage, ImagePayload, Recipe};

/// 状態の世代番号（単調増加）
pub type Generation = u64;

/// フラグから導出される状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 画像なし
    Idle,
    /// 解析呼び出し中
    Analyzing,
    /// 結果あり、チャット可能
    Ready,
    /// 解析失敗
    Errored,
    /// Ready のうちチャット呼び出し中
    Asking,
}

/// ユーザー操作と非同期完了通知
#[derive(Debug, Clone)]
pub enum Intent {
    SelectImage(ImagePayload),
    Retry,
    EditQuestion(String),
    AskQuestion(String),
    OpenRecipe(usize),
    CloseRecipe,
    Reset,
    AnalysisCompleted {
        generation: Generation,
        outcome: Result<AnalysisResult, String>,
    },
    AnswerReceived {
        generation: Generation,
        outcome: Result<String, String>,
    },
}

/// 遷移が要求する副作用
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Analyze {
        generation: Generation,
        image: ImagePayload,
    },
    Ask {
        generation: Generation,
        question: String,
        context: AnalysisResult,
        /// 質問を追加する前の履歴
        history: Vec<ChatMessage>,
    },
}

impl Command {
    pub fn generation(&self) -> Generation {
        match self {
            Command::Analyze { generation, .. } | Command::Ask { generation, .. } => *generation,
        }
    }
}

/// アプリケーション状態
///
/// 変更は `transition` / `dispatch` 経由のみ。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    image: Option<ImagePayload>,
    analyzing: bool,
    result: Option<AnalysisResult>,
    error: Option<String>,
    chat_history: Vec<ChatMessage>,
    is_asking: bool,
    /// `result.suggested_recipes` 内の位置
    selected_recipe: Option<usize>,
    question_input: String,
    generation: Generation,
}

/// 遷移関数
pub fn transition(mut state: AppState, intent: Intent) -> (AppState, Option<Command>) {
    let command = state.apply(intent);
    (state, command)
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// その場で遷移を適用する
    pub fn dispatch(&mut self, intent: Intent) -> Option<Command> {
        let (next, command) = transition(std::mem::take(self), intent);
        *self = next;
        command
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    pub fn analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat_history
    }

    pub fn is_asking(&self) -> bool {
        self.is_asking
    }

    pub fn selected_recipe_index(&self) -> Option<usize> {
        self.selected_recipe
    }

    pub fn selected_recipe(&self) -> Option<&Recipe> {
        let index = self.selected_recipe?;
        self.result.as_ref()?.suggested_recipes.get(index)
    }

    pub fn recipe_open(&self) -> bool {
        self.selected_recipe().is_some()
    }

    pub fn question_input(&self) -> &str {
        &self.question_input
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// 初期状態と同じか（世代は問わない）
    pub fn is_initial(&self) -> bool {
        *self
            == AppState {
                generation: self.generation,
                ..AppState::default()
            }
    }

    pub fn phase(&self) -> Phase {
        if self.image.is_none() {
            Phase::Idle
        } else if self.analyzing {
            Phase::Analyzing
        } else if self.error.is_some() {
            Phase::Errored
        } else if self.result.is_some() {
            if self.is_asking {
                Phase::Asking
            } else {
                Phase::Ready
            }
        } else {
            Phase::Idle
        }
    }

    fn apply(&mut self, intent: Intent) -> Option<Command> {
        match intent {
            Intent::SelectImage(image) => Some(self.select_image(image)),
            Intent::Retry => self.retry(),
            Intent::EditQuestion(text) => {
                self.question_input = text;
                None
            }
            Intent::AskQuestion(text) => self.ask_question(&text),
            Intent::OpenRecipe(index) => {
                let in_range = self
                    .result
                    .as_ref()
                    .is_some_and(|r| index < r.suggested_recipes.len());
                if in_range {
                    self.selected_recipe = Some(index);
                }
                None
            }
            Intent::CloseRecipe => {
                self.selected_recipe = None;
                None
            }
            Intent::Reset => {
                *self = AppState {
                    generation: self.generation + 1,
                    ..AppState::default()
                };
                None
            }
            Intent::AnalysisCompleted { generation, outcome } => {
                self.complete_analysis(generation, outcome);
                None
            }
            Intent::AnswerReceived { generation, outcome } => {
                self.receive_answer(generation, outcome);
                None
            }
        }
    }

    fn select_image(&mut self, image: ImagePayload) -> Command {
        let generation = self.generation + 1;
        // チャット中の応答も世代が変わるので破棄される
        *self = AppState {
            image: Some(image.clone()),
            analyzing: true,
            generation,
            ..AppState::default()
        };
        Command::Analyze { generation, image }
    }

    fn retry(&mut self) -> Option<Command> {
        if self.phase() != Phase::Errored {
            return None;
        }
        let image = self.image.clone()?;
        Some(self.select_image(image))
    }

    fn ask_question(&mut self, text: &str) -> Option<Command> {
        let question = text.trim();
        if question.is_empty() || self.is_asking {
            return None;
        }
        let context = self.result.clone()?;

        let history = self.chat_history.clone();
        self.chat_history.push(ChatMessage::user(question));
        self.is_asking = true;
        self.question_input.clear();

        Some(Command::Ask {
            generation: self.generation,
            question: question.to_string(),
            context,
            history,
        })
    }

    fn complete_analysis(&mut self, generation: Generation, outcome: Result<AnalysisResult, String>) {
        if !self.is_current(generation) || !self.analyzing {
            return;
        }
        self.analyzing = false;
        match outcome {
            Ok(result) => self.result = Some(result),
            Err(message) if message.trim().is_empty() => {
                self.error = Some(ANALYSIS_FAILURE_MESSAGE.to_string());
            }
            Err(message) => self.error = Some(message),
        }
    }

    fn receive_answer(&mut self, generation: Generation, outcome: Result<String, String>) {
        if !self.is_current(generation) || !self.is_asking {
            return;
        }
        self.is_asking = false;
        let reply = outcome.unwrap_or_else(|_| CHAT_FAILURE_REPLY.to_string());
        self.chat_history.push(ChatMessage::assistant(reply));
    }
}
