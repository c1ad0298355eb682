use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tracing::warn;

pub const ERROR_LOG_FILE: &str = "error_log_01.txt";
pub const DEBUG_LOG_FILE: &str = "youtube-debug.txt";

fn open_append(path: &Path) -> io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

/// 追加写入的错误日志，每次失败一行
///
/// 每次运行只打开一次，drop 时刷盘。
pub struct ErrorLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ErrorLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = open_append(&path)?;
        Ok(Self { path, writer })
    }

    /// 在输出目录下打开 error_log_01.txt
    pub fn in_dir(dir: impl AsRef<Path>) -> io::Result<Self> {
        Self::open(dir.as_ref().join(ERROR_LOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // 日志写失败不影响批量流程
    pub fn append(&mut self, line: &str) {
        let result = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush());
        if let Err(e) = result {
            warn!("写入错误日志失败 {:?}: {}", self.path, e);
        }
    }
}

impl Drop for ErrorLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// 带 UTC 时间戳的调试日志，按块写入
pub struct DebugLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl DebugLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = open_append(&path)?;
        Ok(Self { path, writer })
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> io::Result<Self> {
        Self::open(dir.as_ref().join(DEBUG_LOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入一个块: 首行 `[时间] TAG: 标题`，之后逐行写详情，末尾空行
    pub fn block(&mut self, tag: &str, headline: &str, details: &[String]) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false);
        let result = (|| -> io::Result<()> {
            writeln!(self.writer, "[{}] {}: {}", timestamp, tag, headline)?;
            for line in details {
                writeln!(self.writer, "{}", line)?;
            }
            writeln!(self.writer)?;
            self.writer.flush()
        })();
        if let Err(e) = result {
            warn!("写入调试日志失败 {:?}: {}", self.path, e);
        }
    }
}

impl Drop for DebugLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// 展开错误链，代替堆栈信息写进调试日志
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut lines = vec![format!("Error: {}", error)];
    let mut source = error.source();
    while let Some(cause) = source {
        lines.push(format!("Caused by: {}", cause));
        source = cause.source();
    }
    lines
}
