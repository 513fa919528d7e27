//! OpenAI-compatible chat backend (Ollama, OpenAI, vLLM, ...).

use super::{ChatMessage, ChatModel, ModelReply, ModelRequest, ToolInvocation, ToolSpec};
use crate::config::ModelSettings;
use crate::error::{ReelcrewError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObject, ResponseFormat, ResponseFormatJsonSchema,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat model served over the OpenAI chat completions API.
pub struct OpenAiChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiChatModel {
    /// Create a chat model from settings.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let client = create_client(
            Some(&settings.base_url),
            Some(&settings.api_key),
            Duration::from_secs(settings.timeout_secs),
        )?;

        Ok(Self {
            client,
            model: settings.name.clone(),
            temperature: settings.temperature,
        })
    }

    fn build_request(
        &self,
        request: ModelRequest,
    ) -> Result<async_openai::types::CreateChatCompletionRequest> {
        let messages = request
            .messages
            .into_iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);

        if !request.tools.is_empty() {
            builder.tools(request.tools.into_iter().map(to_tool).collect::<Vec<_>>());
        }

        if let Some(schema) = request.output_schema {
            builder.response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: None,
                    name: schema.name,
                    schema: Some(schema.schema),
                    strict: Some(true),
                },
            });
        }

        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }

        builder.build().map_err(|e| ReelcrewError::Model(e.to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    #[instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len()))]
    async fn complete(&self, request: ModelRequest) -> Result<ModelReply> {
        let request = self.build_request(request)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ReelcrewError::Model(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ReelcrewError::Model("No response from model".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolInvocation {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect::<Vec<_>>();

        debug!("Model replied with {} tool call(s)", tool_calls.len());

        Ok(ModelReply {
            content: choice.message.content,
            tool_calls,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn to_request_message(message: ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message {
        ChatMessage::System(content) => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| ReelcrewError::Model(e.to_string()))?
            .into(),

        ChatMessage::User { name, content } => {
            let mut builder = ChatCompletionRequestUserMessageArgs::default();
            builder.content(content);
            if let Some(name) = name {
                builder.name(name);
            }
            builder
                .build()
                .map_err(|e| ReelcrewError::Model(e.to_string()))?
                .into()
        }

        ChatMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(content) = content {
                builder.content(content);
            }
            if !tool_calls.is_empty() {
                builder.tool_calls(
                    tool_calls
                        .into_iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id,
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name,
                                arguments: call.arguments,
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            builder
                .build()
                .map_err(|e| ReelcrewError::Model(e.to_string()))?
                .into()
        }

        ChatMessage::Tool { call_id, content } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id)
            .content(content)
            .build()
            .map_err(|e| ReelcrewError::Model(e.to_string()))?
            .into(),
    };

    Ok(built)
}

fn to_tool(spec: ToolSpec) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: spec.name,
            description: Some(spec.description),
            parameters: Some(spec.parameters),
            strict: None,
        },
    }
}
