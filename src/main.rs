// ==========================================
// Syngo 导入引擎 - 命令行入口
// ==========================================
// 用法: syngo-ingest [OPTIONS] <FILES>...
// 输出: --output 指定时写出工作簿，否则向 stdout 打印 JSON
// ==========================================

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use syngo_ingest::config::{default_config_db_path, ConfigManager, ImportSettings};
use syngo_ingest::{logging, SyngoImporter, WorkbookWriter};

#[derive(Debug, Parser)]
#[command(name = "syngo-ingest", version, about = "合并并去重 Syngo 放射科操作日志导出")]
struct Cli {
    /// Syngo 导出文件（按给定顺序合并，后者覆盖前者）
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// 写出去重后记录的工作簿路径
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 写出时使用的工作表名
    #[arg(long, default_value = "Syngo")]
    sheet: String,

    /// SQLite 配置库路径
    #[arg(long)]
    config_db: Option<PathBuf>,

    /// 并发解析文件（覆盖配置）
    #[arg(long)]
    concurrent: bool,

    /// JSON 格式日志
    #[arg(long)]
    log_json: bool,
}

async fn load_settings(cli: &Cli) -> Result<ImportSettings> {
    let db_path = match &cli.config_db {
        Some(path) => Some(path.clone()),
        None => default_config_db_path().filter(|path| path.exists()),
    };

    let Some(db_path) = db_path else {
        tracing::info!("未找到配置库，使用默认配置");
        return Ok(ImportSettings::default());
    };

    tracing::info!("使用配置库: {}", db_path.display());
    let manager = ConfigManager::new(&db_path.to_string_lossy())
        .map_err(|e| anyhow!("无法打开配置库 {}: {}", db_path.display(), e))?;
    let snapshot = manager
        .get_config_snapshot()
        .map_err(|e| anyhow!("读取配置快照失败: {}", e))?;
    tracing::info!(config = %snapshot, "配置快照");

    ImportSettings::load(&manager).await.context("读取配置失败")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }
    tracing::info!("{} v{}", syngo_ingest::APP_NAME, syngo_ingest::VERSION);

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = load_settings(&cli).await?;
    if cli.concurrent {
        settings.parallel_parse = true;
    }

    let importer = SyngoImporter::new(settings.clone());
    let outcome = importer
        .import(cli.files.clone())
        .await
        .context("合并 Syngo 文件失败")?;

    match &cli.output {
        Some(output) => {
            WorkbookWriter::new(&settings)
                .write(output, &[(cli.sheet.as_str(), outcome.records.as_slice())])
                .with_context(|| format!("写出工作簿失败: {}", output.display()))?;
            tracing::info!(
                "已写出 {} 条记录到 {}（移除重复 {} 条）",
                outcome.records.len(),
                output.display(),
                outcome.duplicates_removed
            );
        }
        None => {
            let json = serde_json::to_string_pretty(&outcome).context("JSON 序列化失败")?;
            println!("{}", json);
        }
    }

    Ok(())
}
