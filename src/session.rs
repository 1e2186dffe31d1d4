//! セッション
//!
//! 唯一の AppState を所有し、遷移が返した Command を tokio タスクとして実行する。
//! 完了通知は `next_completion` で1件ずつ受け取り、所有者側で遷移を適用するため、
//! 状態の変更は常に1か所・1件ずつ行われる。
//!
//! 実行中の呼び出しはキャンセルしない。リセットや再選択の後に届いた応答は
//! 世代が合わないので破棄される。

use crate::inference::Inference;
use fridge_chef_common::{AppState, Command, Generation, Intent};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// 完了通知の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// 現在の状態に反映した
    Current,
    /// 古い世代のため破棄した
    Stale,
    /// タスク自体が失われた（ランタイム停止など）
    Aborted,
}

pub struct Session<I: ?Sized> {
    state: AppState,
    inference: Arc<I>,
    tasks: JoinSet<Intent>,
}

impl<I: Inference + ?Sized + 'static> Session<I> {
    pub fn new(inference: Arc<I>) -> Self {
        Self {
            state: AppState::new(),
            inference,
            tasks: JoinSet::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// 実行中の呼び出し数（破棄予定のものも含む）
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// ユーザー操作を適用する
    pub fn dispatch(&mut self, intent: Intent) {
        if let Some(command) = self.state.dispatch(intent) {
            self.spawn(command);
        }
    }

    fn spawn(&mut self, command: Command) {
        debug!(generation = command.generation(), kind = command_kind(&command), "spawning request");
        let inference = Arc::clone(&self.inference);
        self.tasks.spawn(supervise(inference, command));
    }

    /// 完了通知を1件受け取って適用する。実行中のものが無ければ None
    pub async fn next_completion(&mut self) -> Option<Applied> {
        let joined = self.tasks.join_next().await?;

        let intent = match joined {
            Ok(intent) => intent,
            Err(e) => {
                error!(error = %e, "inference task aborted");
                return Some(Applied::Aborted);
            }
        };

        let generation = completion_generation(&intent);
        if !self.state.is_current(generation) {
            debug!(
                generation,
                current = self.state.generation(),
                "discarding stale response"
            );
            return Some(Applied::Stale);
        }

        self.state.dispatch(intent);
        Some(Applied::Current)
    }

    /// 実行中の呼び出しがすべて終わるまで待つ
    pub async fn settle(&mut self) {
        while self.next_completion().await.is_some() {}
    }
}

/// 呼び出しを別タスクで実行し、panic も失敗の完了通知に変換する
async fn supervise<I: Inference + ?Sized + 'static>(inference: Arc<I>, command: Command) -> Intent {
    let generation = command.generation();
    let is_analysis = matches!(command, Command::Analyze { .. });

    let handle = tokio::spawn(async move { run_command(inference.as_ref(), command).await });
    match handle.await {
        Ok(intent) => intent,
        Err(e) => {
            error!(error = %e, generation, "inference task aborted");
            let message = format!("Request aborted: {}", e);
            if is_analysis {
                Intent::AnalysisCompleted {
                    generation,
                    outcome: Err(message),
                }
            } else {
                Intent::AnswerReceived {
                    generation,
                    outcome: Err(message),
                }
            }
        }
    }
}

/// Command を実行し、結果を完了通知に変換する
///
/// 推論エラーはここで文字列に変換され、これより外には伝播しない
async fn run_command<I: Inference + ?Sized>(inference: &I, command: Command) -> Intent {
    match command {
        Command::Analyze { generation, image } => {
            let outcome = inference.analyze(&image).await.map_err(|e| {
                warn!(error = %e, generation, "analysis failed");
                e.to_string()
            });
            Intent::AnalysisCompleted { generation, outcome }
        }
        Command::Ask {
            generation,
            question,
            context,
            history,
        } => {
            let outcome = inference
                .ask(&question, &context, &history)
                .await
                .map_err(|e| {
                    warn!(error = %e, generation, "chat failed");
                    e.to_string()
                });
            Intent::AnswerReceived { generation, outcome }
        }
    }
}

fn command_kind(command: &Command) -> &'static str {
    match command {
        Command::Analyze { .. } => "analyze",
        Command::Ask { .. } => "ask",
    }
}

fn completion_generation(intent: &Intent) -> Generation {
    match intent {
        Intent::AnalysisCompleted { generation, .. } | Intent::AnswerReceived { generation, .. } => {
            *generation
        }
        // 完了通知以外はタスクから返らない
        _ => 0,
    }
}
