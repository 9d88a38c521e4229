// 该文件是 MaizeScan 项目的一部分。
// src/history.rs - 诊断历史记录
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params, types::Type};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{Diagnosis, DiseaseInfo, Label, Severity, Verdict};

/// 历史页面默认展示条数
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Error, Debug)]
pub enum HistoryError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("数据库错误: {0}")]
  SqliteError(#[from] rusqlite::Error),
  #[error("序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
  #[error("历史记录锁已损坏")]
  Poisoned,
}

/// 写入记录时的病害信息快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseSnapshot {
  pub description: String,
  pub symptoms: String,
  pub treatment: String,
  pub prevention: String,
  pub severity: Severity,
  pub ui_hint: String,
}

impl From<&DiseaseInfo> for DiseaseSnapshot {
  fn from(info: &DiseaseInfo) -> Self {
    Self {
      description: info.description.to_string(),
      symptoms: info.symptoms.to_string(),
      treatment: info.treatment.to_string(),
      prevention: info.prevention.to_string(),
      severity: info.severity,
      ui_hint: info.ui_hint.to_string(),
    }
  }
}

/// 待写入的记录，编号由存储分配
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
  pub timestamp: DateTime<Utc>,
  pub source_filename: String,
  pub annotated_filename: Option<String>,
  pub verdict: Verdict,
  pub disease_info: DiseaseSnapshot,
}

impl NewRecord {
  pub fn from_diagnosis(
    source_filename: impl Into<String>,
    annotated_filename: Option<String>,
    diagnosis: &Diagnosis,
  ) -> Self {
    Self {
      timestamp: Utc::now(),
      source_filename: source_filename.into(),
      annotated_filename,
      verdict: diagnosis.verdict,
      disease_info: DiseaseSnapshot::from(diagnosis.info),
    }
  }

  pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
    self.timestamp = timestamp;
    self
  }

  fn into_record(self, id: u64) -> AnalysisRecord {
    AnalysisRecord {
      id,
      timestamp: self.timestamp,
      source_filename: self.source_filename,
      annotated_filename: self.annotated_filename,
      verdict: self.verdict,
      disease_info: self.disease_info,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
  pub id: u64,
  pub timestamp: DateTime<Utc>,
  pub source_filename: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub annotated_filename: Option<String>,
  pub verdict: Verdict,
  pub disease_info: DiseaseSnapshot,
}

pub trait HistoryStore {
  /// 追加一条记录，返回单调递增的编号
  fn append(&self, record: NewRecord) -> Result<u64, HistoryError>;
  /// 最近的 `limit` 条记录，新的在前
  fn list_recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, HistoryError>;
}

impl<T: HistoryStore + ?Sized> HistoryStore for &T {
  fn append(&self, record: NewRecord) -> Result<u64, HistoryError> {
    (**self).append(record)
  }

  fn list_recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, HistoryError> {
    (**self).list_recent(limit)
  }
}

fn newest_first(mut records: Vec<AnalysisRecord>, limit: usize) -> Vec<AnalysisRecord> {
  records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
  records.truncate(limit);
  records
}

#[derive(Debug, Default)]
pub struct MemoryHistory {
  records: Mutex<Vec<AnalysisRecord>>,
}

impl MemoryHistory {
  pub fn new() -> Self {
    Self::default()
  }
}

impl HistoryStore for MemoryHistory {
  fn append(&self, record: NewRecord) -> Result<u64, HistoryError> {
    let mut records = self.records.lock().map_err(|_| HistoryError::Poisoned)?;
    let id = records.last().map(|r| r.id + 1).unwrap_or(1);
    records.push(record.into_record(id));
    Ok(id)
  }

  fn list_recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, HistoryError> {
    let records = self.records.lock().map_err(|_| HistoryError::Poisoned)?;
    Ok(newest_first(records.clone(), limit))
  }
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS analysis_history (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  timestamp TEXT NOT NULL,
  filename TEXT NOT NULL,
  annotated TEXT,
  prediction TEXT NOT NULL,
  confidence REAL NOT NULL,
  disease_info TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_analysis_history_timestamp
  ON analysis_history (timestamp DESC, id DESC);";

// 多个进程同时写入时等待锁的上限
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite 历史库，编号由数据库分配，多个进程共享同一文件也不会重复
#[derive(Debug)]
pub struct SqliteHistory {
  path: PathBuf,
  conn: Mutex<Connection>,
}

impl SqliteHistory {
  pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(&path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch(SCHEMA)?;
    info!("历史记录数据库: {}", path.display());

    Ok(Self {
      path,
      conn: Mutex::new(conn),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

fn text_error(column: usize, e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
  rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e))
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<AnalysisRecord> {
  let label: String = row.get(4)?;
  let label = label.parse::<Label>().map_err(|e| text_error(4, e))?;
  let disease_info: String = row.get(6)?;
  let disease_info = serde_json::from_str(&disease_info).map_err(|e| text_error(6, e))?;

  Ok(AnalysisRecord {
    id: row.get::<_, i64>(0)? as u64,
    timestamp: row.get(1)?,
    source_filename: row.get(2)?,
    annotated_filename: row.get(3)?,
    verdict: Verdict {
      label,
      confidence: row.get(5)?,
    },
    disease_info,
  })
}

impl HistoryStore for SqliteHistory {
  fn append(&self, record: NewRecord) -> Result<u64, HistoryError> {
    let disease_info = serde_json::to_string(&record.disease_info)?;
    let conn = self.conn.lock().map_err(|_| HistoryError::Poisoned)?;
    conn.execute(
      "INSERT INTO analysis_history
         (timestamp, filename, annotated, prediction, confidence, disease_info)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      params![
        record.timestamp,
        record.source_filename,
        record.annotated_filename,
        record.verdict.label.as_str(),
        record.verdict.confidence,
        disease_info,
      ],
    )?;
    let id = conn.last_insert_rowid() as u64;
    debug!("写入历史记录 #{}: {}", id, record.source_filename);
    Ok(id)
  }

  fn list_recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, HistoryError> {
    let conn = self.conn.lock().map_err(|_| HistoryError::Poisoned)?;
    let mut stmt = conn.prepare(
      "SELECT id, timestamp, filename, annotated, prediction, confidence, disease_info
       FROM analysis_history
       ORDER BY timestamp DESC, id DESC
       LIMIT ?1",
    )?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let records = stmt
      .query_map(params![limit], read_row)?
      .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{ColorRatios, Label, disease_info};
  use chrono::{Duration, TimeZone};

  fn diagnosis(label: Label, confidence: f64) -> Diagnosis {
    Diagnosis {
      ratios: ColorRatios::default(),
      verdict: Verdict { label, confidence },
      info: disease_info(label),
    }
  }

  fn record_at(name: &str, seconds: i64) -> NewRecord {
    let base = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    NewRecord::from_diagnosis(name, None, &diagnosis(Label::Healthy, 0.8))
      .with_timestamp(base + Duration::seconds(seconds))
  }

  fn check_recent_order(store: &impl HistoryStore) {
    for i in 0..5 {
      let id = store.append(record_at(&format!("leaf-{}.jpg", i), i)).unwrap();
      assert_eq!(id, i as u64 + 1);
    }
    let recent = store.list_recent(3).unwrap();
    let names: Vec<_> = recent.iter().map(|r| r.source_filename.as_str()).collect();
    assert_eq!(names, ["leaf-4.jpg", "leaf-3.jpg", "leaf-2.jpg"]);
    assert!(recent.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    assert_eq!(store.list_recent(100).unwrap().len(), 5);
    assert!(store.list_recent(0).unwrap().is_empty());
  }

  #[test]
  fn test_memory_history_order() {
    check_recent_order(&MemoryHistory::new());
  }

  #[test]
  fn test_sqlite_history_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteHistory::open(dir.path().join("analysis.db")).unwrap();
    check_recent_order(&store);
  }

  #[test]
  fn test_same_timestamp_uses_id() {
    let store = MemoryHistory::new();
    store.append(record_at("a.png", 0)).unwrap();
    store.append(record_at("b.png", 0)).unwrap();
    let recent = store.list_recent(1).unwrap();
    assert_eq!(recent[0].source_filename, "b.png");
  }

  #[test]
  fn test_sqlite_reopen_continues_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("analysis.db");
    {
      let store = SqliteHistory::open(&path).unwrap();
      store.append(record_at("a.png", 0)).unwrap();
      store.append(record_at("b.png", 1)).unwrap();
    }
    let store = SqliteHistory::open(&path).unwrap();
    assert_eq!(store.append(record_at("c.png", 2)).unwrap(), 3);
    let recent = store.list_recent(10).unwrap();
    assert_eq!(recent[0].id, 3);
    assert_eq!(recent[0].disease_info.severity, Severity::None);
    assert_eq!(recent[0].timestamp, record_at("c.png", 2).timestamp);
  }

  #[test]
  fn test_two_stores_on_one_file_never_share_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.db");
    SqliteHistory::open(&path).unwrap();

    let writers: Vec<_> = (0..2)
      .map(|w| {
        let path = path.clone();
        std::thread::spawn(move || {
          let store = SqliteHistory::open(&path).unwrap();
          (0..10)
            .map(|i| store.append(record_at(&format!("w{}-{}.png", w, i), i)).unwrap())
            .collect::<Vec<_>>()
        })
      })
      .collect();
    let mut ids: Vec<u64> = writers
      .into_iter()
      .flat_map(|h| h.join().unwrap())
      .collect();
    ids.sort();
    assert_eq!(ids, (1..=20).collect::<Vec<u64>>());

    let store = SqliteHistory::open(&path).unwrap();
    assert_eq!(store.list_recent(100).unwrap().len(), 20);
  }

  #[test]
  fn test_snapshot_keeps_disease_text() {
    let store = MemoryHistory::new();
    let d = diagnosis(Label::LeafBlight, 0.95);
    store
      .append(NewRecord::from_diagnosis("x.jpg", Some("annotated_x.jpg".into()), &d))
      .unwrap();
    let record = &store.list_recent(1).unwrap()[0];
    assert_eq!(record.verdict.label, Label::LeafBlight);
    assert_eq!(record.disease_info.ui_hint, "danger");
    assert_eq!(record.annotated_filename.as_deref(), Some("annotated_x.jpg"));
  }

  #[test]
  fn test_non_database_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.db");
    std::fs::write(&path, "this is not a sqlite database, just some text padding it out").unwrap();
    let result = SqliteHistory::open(&path);
    assert!(matches!(result, Err(HistoryError::SqliteError(_))));
  }
}
