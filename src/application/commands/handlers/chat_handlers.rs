//! Chat Command Handlers
//!
//! 一次请求的完整流程（严格顺序执行）：
//! 1. 校验消息
//! 2. 语言模型补全
//! 3. 语音合成（可选）
//! 4. 写入音频目录
//! 5. 外部转码（可选），临时文件成功后才替换最终文件

use std::sync::Arc;

use crate::application::commands::chat_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioStoragePort, AudioTranscoderPort, CompletionRequest, LlmEnginePort, SpeechRequest,
    TtsEnginePort,
};
use crate::domain::chat::{ChatMessage, ReplyText};

/// 对话处理参数
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub max_tokens: u32,
    /// 合成/转码失败时降级为纯文本响应
    pub fallback_to_text: bool,
}

/// SendChat Handler - 处理一条用户消息
pub struct SendChatHandler {
    llm: Arc<dyn LlmEnginePort>,
    tts: Option<Arc<dyn TtsEnginePort>>,
    transcoder: Option<Arc<dyn AudioTranscoderPort>>,
    storage: Arc<dyn AudioStoragePort>,
    settings: ChatSettings,
}

impl SendChatHandler {
    pub fn new(
        llm: Arc<dyn LlmEnginePort>,
        tts: Option<Arc<dyn TtsEnginePort>>,
        transcoder: Option<Arc<dyn AudioTranscoderPort>>,
        storage: Arc<dyn AudioStoragePort>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            llm,
            tts,
            transcoder,
            storage,
            settings,
        }
    }

    /// 是否合成语音
    pub fn speaks(&self) -> bool {
        self.tts.is_some()
    }

    /// 是否对语音做外部转码
    pub fn transcodes(&self) -> bool {
        self.tts.is_some() && self.transcoder.is_some()
    }

    pub async fn handle(&self, cmd: SendChatCommand) -> Result<SendChatResponse, ApplicationError> {
        let message = ChatMessage::new(cmd.message)?;

        let completion = self
            .llm
            .complete(CompletionRequest {
                system_prompt: self.settings.system_prompt.clone(),
                user_message: message.as_str().to_string(),
                max_tokens: self.settings.max_tokens,
            })
            .await?;

        let reply = ReplyText::from_completion(&completion.content)?;

        tracing::info!(
            model = ?completion.model,
            finish_reason = ?completion.finish_reason,
            reply_len = reply.as_str().len(),
            "Language model replied"
        );

        let audio_url = match &self.tts {
            None => None,
            Some(tts) => match self.speak(tts.as_ref(), &reply).await {
                Ok(url) => Some(url),
                Err(e) if self.settings.fallback_to_text => {
                    tracing::warn!(error = %e, "Speech pipeline failed, replying with text only");
                    None
                }
                Err(e) => return Err(e),
            },
        };

        Ok(SendChatResponse {
            response: reply.into_inner(),
            audio_url,
        })
    }

    /// 合成、落盘、转码，返回最终产物的 URL
    async fn speak(
        &self,
        tts: &dyn TtsEnginePort,
        reply: &ReplyText,
    ) -> Result<String, ApplicationError> {
        let speech = tts
            .synthesize(SpeechRequest {
                text: reply.as_str().to_string(),
            })
            .await?;

        if speech.audio_data.is_empty() {
            return Err(ApplicationError::upstream(
                None,
                "Speech service returned empty audio",
            ));
        }

        let artifact = self.storage.allocate(tts.file_extension());
        let raw_name = artifact.raw_file_name();
        let raw_path = self.storage.write(&raw_name, &speech.audio_data).await?;

        tracing::debug!(
            path = %raw_path.display(),
            size = speech.audio_data.len(),
            content_type = ?speech.content_type,
            "Speech audio written"
        );

        let final_name = match &self.transcoder {
            None => raw_name,
            Some(transcoder) => {
                let staging_name = artifact.staging_file_name();
                let staging_path = self.storage.path_of(&staging_name);

                if let Err(e) = transcoder.transcode(&raw_path, &staging_path).await {
                    self.discard(&staging_name).await;
                    if artifact.is_unique() {
                        self.discard(&raw_name).await;
                    }
                    return Err(e.into());
                }

                let processed_name = artifact.processed_file_name();
                self.storage.promote(&staging_name, &processed_name).await?;

                // 唯一命名时原始文件不再被引用
                if artifact.is_unique() {
                    self.discard(&raw_name).await;
                }
                processed_name
            }
        };

        match self.storage.prune().await {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed = removed, "Pruned old audio artifacts"),
            Err(e) => tracing::warn!(error = %e, "Failed to prune audio artifacts"),
        }

        Ok(self.storage.url_of(&final_name))
    }

    async fn discard(&self, file_name: &str) {
        if let Err(e) = self.storage.remove(file_name).await {
            tracing::warn!(file = %file_name, error = %e, "Failed to remove audio file");
        }
    }
}
