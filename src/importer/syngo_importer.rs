// ==========================================
// Syngo 导入引擎 - 多文件合并导入器
// ==========================================
// 流程: 逐文件解析 → 按调用方给定顺序拼接 → 去重
// 红线: 任一文件失败即中止整个合并（fail-fast），已解析文件的结果一并丢弃
// 红线: 并发解析不得改变拼接顺序（去重的胜出者由顺序决定）
// ==========================================

use crate::config::settings::ImportSettings;
use crate::domain::procedure::ProcedureRecord;
use crate::importer::dedup::{deduplicate, detect_duplicates};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::SyngoFileParser;
use crate::importer::importer_trait::ProcedureFileParser;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// ==========================================
// MergeOutcome - 合并结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub batch_id: String,
    pub files: usize,
    pub parsed_records: usize,
    pub duplicates_removed: usize,
    /// 去重后的记录（顺序不作保证）
    pub records: Vec<ProcedureRecord>,
}

// ==========================================
// SyngoImporter
// ==========================================
pub struct SyngoImporter {
    parser: Arc<dyn ProcedureFileParser>,
    settings: ImportSettings,
}

impl SyngoImporter {
    /// 使用默认 Syngo 文件解析器
    pub fn new(settings: ImportSettings) -> Self {
        let parser = Arc::new(SyngoFileParser::new(&settings));
        Self { parser, settings }
    }

    /// 注入自定义解析器
    pub fn with_parser(parser: Arc<dyn ProcedureFileParser>, settings: ImportSettings) -> Self {
        Self { parser, settings }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// 导入单个文件
    ///
    /// # 参数
    /// - run_dedup: 是否对该文件的记录去重
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        run_dedup: bool,
    ) -> ImportResult<Vec<ProcedureRecord>> {
        let records = self.parser.parse_file(file_path.as_ref())?;
        if run_dedup {
            Ok(deduplicate(records))
        } else {
            Ok(records)
        }
    }

    /// 顺序导入多个文件并合并去重
    pub fn import_files<P: AsRef<Path>>(&self, file_paths: &[P]) -> ImportResult<MergeOutcome> {
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, files = file_paths.len(), "开始合并 Syngo 文件");

        let mut all_records = Vec::new();
        for file_path in file_paths {
            let path = file_path.as_ref();
            let records = self.parser.parse_file(path).map_err(|e| {
                error!(batch_id = %batch_id, file = %path.display(), error = %e, "Syngo 文件解析失败");
                e.in_file(path.display().to_string())
            })?;
            debug!(file = %path.display(), records = records.len(), "文件已解析");
            all_records.extend(records);
        }

        Ok(self.finish(batch_id, file_paths.len(), all_records))
    }

    /// 并发导入多个文件并合并去重
    ///
    /// # 说明
    /// - 每个文件在独立的阻塞任务中解析，工作簿句柄由该任务独占
    /// - 结果按调用方给定的文件顺序拼接
    /// - 多个文件失败时，报告顺序最靠前的那个
    pub async fn import_files_concurrent(&self, file_paths: Vec<PathBuf>) -> ImportResult<MergeOutcome> {
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, files = file_paths.len(), "开始并发合并 Syngo 文件");

        let tasks = file_paths.iter().cloned().map(|path| {
            let parser = Arc::clone(&self.parser);
            tokio::task::spawn_blocking(move || parser.parse_file(&path))
        });
        let results = join_all(tasks).await;

        let mut all_records = Vec::new();
        for (path, joined) in file_paths.iter().zip(results) {
            let file_name = path.display().to_string();
            let records = joined
                .map_err(|e| ImportError::InternalError(format!("解析任务异常退出: {}", e)))
                .and_then(|parsed| parsed)
                .map_err(|e| {
                    error!(batch_id = %batch_id, file = %file_name, error = %e, "Syngo 文件解析失败");
                    e.in_file(file_name.clone())
                })?;
            all_records.extend(records);
        }

        Ok(self.finish(batch_id, file_paths.len(), all_records))
    }

    /// 按配置选择顺序或并发合并
    pub async fn import(&self, file_paths: Vec<PathBuf>) -> ImportResult<MergeOutcome> {
        if self.settings.parallel_parse {
            self.import_files_concurrent(file_paths).await
        } else {
            self.import_files(&file_paths)
        }
    }

    fn finish(&self, batch_id: String, files: usize, all_records: Vec<ProcedureRecord>) -> MergeOutcome {
        let parsed_records = all_records.len();

        let overwritten = detect_duplicates(&all_records);
        for (position, key) in &overwritten {
            debug!(position, key = ?key, "重复记录被后续记录覆盖");
        }

        let records = deduplicate(all_records);
        info!(
            batch_id = %batch_id,
            parsed = parsed_records,
            kept = records.len(),
            removed = overwritten.len(),
            "合并去重完成"
        );

        MergeOutcome {
            batch_id,
            files,
            parsed_records,
            duplicates_removed: overwritten.len(),
            records,
        }
    }
}
