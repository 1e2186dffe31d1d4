//! 対話モード
//!
//! 1行ずつ入力を読み、質問またはスラッシュコマンドとしてセッションへ渡す。
//! 呼び出し中はスピナーを表示して完了を待つ。

use crate::acquire::{acquire, ImageSource};
use crate::error::Result;
use crate::inference::Inference;
use crate::render;
use crate::session::Session;
use fridge_chef_common::{Intent, Phase};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

const HELP: &str = "Type a question for the chef, or:
  /recipe N      open recipe N
  /close         close the open recipe
  /chat          show the conversation so far
  /retry         retry a failed analysis
  /new <IMAGE>   analyze another photo
  /reset         start over
  /help          show this help
  /quit          exit";

/// 1行の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Ask(String),
    OpenRecipe(usize),
    CloseRecipe,
    ShowChat,
    Retry,
    New(ImageSource),
    Reset,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Ask(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "recipe" => match arg.parse::<usize>() {
            Ok(n) if n >= 1 => ReplCommand::OpenRecipe(n - 1),
            _ => ReplCommand::Invalid("usage: /recipe N".to_string()),
        },
        "close" => ReplCommand::CloseRecipe,
        "chat" => ReplCommand::ShowChat,
        "retry" => ReplCommand::Retry,
        "new" if !arg.is_empty() => match arg.parse::<ImageSource>() {
            Ok(source) => ReplCommand::New(source),
            Err(never) => match never {},
        },
        "new" => ReplCommand::Invalid("usage: /new <IMAGE>".to_string()),
        "reset" => ReplCommand::Reset,
        "help" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => ReplCommand::Invalid(format!("unknown command /{} (try /help)", other)),
    }
}

/// 対話ループ
pub async fn run<I>(session: &mut Session<I>, initial: Option<ImageSource>, max_edge: u32) -> Result<()>
where
    I: Inference + ?Sized + 'static,
{
    if let Some(source) = initial {
        select_image(session, &source, max_edge).await;
    } else {
        println!("{}", render::render_status(session.state()));
    }
    println!("\n{}\n", HELP);

    loop {
        let Some(line) = read_line().await else {
            break;
        };

        match parse_line(&line) {
            ReplCommand::Ask(question) if question.is_empty() => continue,
            ReplCommand::Ask(question) => ask(session, question).await,
            ReplCommand::OpenRecipe(index) => {
                session.dispatch(Intent::OpenRecipe(index));
                match session.state().selected_recipe() {
                    Some(recipe) => println!("{}", render::render_recipe_detail(recipe)),
                    None => println!("No recipe #{} to open.", index + 1),
                }
            }
            ReplCommand::CloseRecipe => {
                session.dispatch(Intent::CloseRecipe);
                println!("{}", render::render_status(session.state()));
            }
            ReplCommand::ShowChat => println!("{}", render::render_chat(session.state().chat_history())),
            ReplCommand::Retry => {
                if session.state().phase() != Phase::Errored {
                    println!("Nothing to retry.");
                    continue;
                }
                session.dispatch(Intent::Retry);
                wait_for_analysis(session).await;
            }
            ReplCommand::New(source) => select_image(session, &source, max_edge).await,
            ReplCommand::Reset => {
                session.dispatch(Intent::Reset);
                println!("{}", render::render_status(session.state()));
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => break,
            ReplCommand::Invalid(message) => println!("{}", message),
        }
    }

    Ok(())
}

async fn select_image<I>(session: &mut Session<I>, source: &ImageSource, max_edge: u32)
where
    I: Inference + ?Sized + 'static,
{
    match acquire(source, max_edge).await {
        Ok(image) => {
            session.dispatch(Intent::SelectImage(image));
            wait_for_analysis(session).await;
        }
        // 画像以外は警告のみで状態を変えない
        Err(e) if e.is_rejection() => println!("⚠ {}", e),
        Err(e) => println!("✖ {}", e),
    }
}

async fn wait_for_analysis<I>(session: &mut Session<I>)
where
    I: Inference + ?Sized + 'static,
{
    with_spinner(session, "Analyzing ingredients...").await;
    println!("{}", render::render_status(session.state()));
}

async fn ask<I>(session: &mut Session<I>, question: String)
where
    I: Inference + ?Sized + 'static,
{
    if session.state().result().is_none() {
        println!("Analyze a photo first (/new <IMAGE>).");
        return;
    }

    session.dispatch(Intent::EditQuestion(question.clone()));
    session.dispatch(Intent::AskQuestion(question));
    with_spinner(session, "The chef is thinking...").await;

    if let Some(reply) = session.state().chat_history().last() {
        println!("{}", render::render_message(reply));
    }
}

async fn with_spinner<I>(session: &mut Session<I>, message: &'static str)
where
    I: Inference + ?Sized + 'static,
{
    if session.in_flight() == 0 {
        return;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));

    session.settle().await;
    spinner.finish_and_clear();
}

/// 入力を1行読む。EOF や端末エラーでは None
async fn read_line() -> Option<String> {
    let joined = tokio::task::spawn_blocking(|| {
        dialoguer::Input::<String>::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()
    })
    .await;

    match joined {
        Ok(Ok(line)) => Some(line),
        Ok(Err(e)) => {
            debug!(error = %e, "input closed");
            None
        }
        Err(e) => {
            debug!(error = %e, "input task failed");
            None
        }
    }
}
