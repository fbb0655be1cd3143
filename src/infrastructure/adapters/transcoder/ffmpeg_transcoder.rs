//! FFmpeg Transcoder - 调用外部转码器
//!
//! 命令格式: `<binary> -y -i <input> -filter:a asetrate=<rate> <output>`
//!
//! asetrate 只改写采样率而不重采样，播放时音高和语速同时变化

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::application::ports::{AudioTranscoderPort, TranscodeError};

/// stderr 保留的最大字符数
const MAX_STDERR_LEN: usize = 500;

/// FFmpeg 转码器配置
#[derive(Debug, Clone)]
pub struct FfmpegTranscoderConfig {
    /// 可执行文件路径
    pub binary: PathBuf,
    /// asetrate 采样率（Hz）
    pub sample_rate: u32,
    /// 超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for FfmpegTranscoderConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            sample_rate: 30000,
            timeout_secs: 30,
        }
    }
}

/// FFmpeg 转码器
pub struct FfmpegTranscoder {
    config: FfmpegTranscoderConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: FfmpegTranscoderConfig) -> Self {
        Self { config }
    }

    /// 音频滤镜参数
    fn filter(&self) -> String {
        format!("asetrate={}", self.config.sample_rate)
    }

    fn build_command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-filter:a")
            .arg(self.filter())
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl AudioTranscoderPort for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let child = self.build_command(input, output).spawn().map_err(|e| {
            TranscodeError::SpawnFailed(format!("{}: {}", self.config.binary.display(), e))
        })?;

        tracing::debug!(
            binary = %self.config.binary.display(),
            input = %input.display(),
            output = %output.display(),
            filter = %self.filter(),
            "Transcoder started"
        );

        // 超时后 child 被 drop，kill_on_drop 负责结束进程
        let result = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| TranscodeError::Timeout(self.config.timeout_secs))?;

        let output_status = result.map_err(|e| TranscodeError::IoError(e.to_string()))?;

        if !output_status.status.success() {
            let stderr = String::from_utf8_lossy(&output_status.stderr);
            // ffmpeg 把真正的错误写在最后几行
            let tail: String = stderr
                .chars()
                .rev()
                .take(MAX_STDERR_LEN)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return Err(TranscodeError::NonZeroExit {
                status: output_status.status.to_string(),
                stderr: tail.trim().to_string(),
            });
        }

        tracing::info!(output = %output.display(), "Transcoding completed");

        Ok(())
    }
}
