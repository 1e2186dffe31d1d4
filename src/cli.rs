use crate::acquire::ImageSource;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fridge-chef")]
#[command(about = "Snap your fridge, get recipes, ask the chef", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真を解析して対話モードに入る
    Cook {
        /// 画像ファイルのパス、または data: URL
        image: Option<ImageSource>,

        /// キャッシュを使用（同じ写真の再解析をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 写真を解析して結果JSONを出力
    Analyze {
        /// 画像ファイルのパス、または data: URL
        #[arg(required = true)]
        image: ImageSource,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// キャッシュを使用
        #[arg(long)]
        use_cache: bool,
    },

    /// 設定の表示・変更
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// モデルを設定
        #[arg(long)]
        set_model: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 解析キャッシュの管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}
