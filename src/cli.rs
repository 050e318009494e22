use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "incident-ai")]
#[command(about = "Análisis de incidentes con Gemini: candidatos a mejora definitiva", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Excelの障害を解析し、結果シートを同じファイルに追加
    Analyze {
        /// 入力Excelファイル（省略時は設定ファイルの input_path）
        file: Option<PathBuf>,

        /// Geminiモデル名（設定ファイルより優先）
        #[arg(short, long)]
        model: Option<String>,

        /// API呼び出しとファイル書き込みを行わず、分類結果のみ表示
        #[arg(long)]
        dry_run: bool,
    },

    /// 解決テキストを分類して表示（オフライン）
    Classify {
        /// 解決テキスト
        #[arg(required = true)]
        text: String,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 既定の入力ファイルを設定
        #[arg(long)]
        set_input: Option<PathBuf>,

        /// 既定のモデルを設定
        #[arg(long)]
        set_model: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
