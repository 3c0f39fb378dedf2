use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use std::time::Instant;

use crate::compose::Composer;
use crate::error::Result;
use crate::models::TargetModel;
use crate::parsing::parse_structured_input;
use crate::prompts::build_user_prompt;
use crate::strategy::{strategy_for, Strategy};
use crate::types::{GeneratedPrompt, GeneratorConfig, StructuredPromptInput, Usage};

/// Turns a free-form idea into a model-specific prompt
///
/// Resolves the strategy for the target, asks an OpenAI-compatible chat model
/// for structured fields, then composes the final prompt from them.
pub struct PromptGenerator {
    config: GeneratorConfig,
    client: Client<OpenAIConfig>,
    composer: Composer,
}

impl PromptGenerator {
    /// Create a new generator with the given config
    ///
    /// Reads OPENAI_API_KEY from environment.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Self::with_client(config, Client::new())
    }

    /// Create with explicit API key
    pub fn with_api_key(config: GeneratorConfig, api_key: &str) -> Result<Self> {
        let openai_config = OpenAIConfig::new().with_api_key(api_key);
        Self::with_client(config, Client::with_config(openai_config))
    }

    /// Create with custom base URL (for Ollama, local models, etc.)
    pub fn with_base_url(config: GeneratorConfig, base_url: &str) -> Result<Self> {
        let openai_config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key("ollama"); // Ollama doesn't need a real key
        Self::with_client(config, Client::with_config(openai_config))
    }

    /// Create with custom base URL and API key
    pub fn with_base_url_and_key(
        config: GeneratorConfig,
        base_url: &str,
        api_key: &str,
    ) -> Result<Self> {
        let openai_config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(api_key);
        Self::with_client(config, Client::with_config(openai_config))
    }

    fn with_client(config: GeneratorConfig, client: Client<OpenAIConfig>) -> Result<Self> {
        let composer = Composer::try_new(config.compose.clone())?;
        Ok(Self {
            config,
            client,
            composer,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Ask the chat model for structured fields describing `idea`
    pub async fn structure(
        &self,
        idea: &str,
        target_model: &str,
        style: &str,
    ) -> Result<(StructuredPromptInput, Usage)> {
        let model = TargetModel::from_identifier(target_model);
        let strategy = strategy_for(model, style);
        self.structure_with(idea, style, &strategy).await
    }

    /// Run the whole idea -> structure -> prompt pipeline
    pub async fn generate(
        &self,
        idea: &str,
        target_model: &str,
        style: &str,
    ) -> Result<GeneratedPrompt> {
        let start = Instant::now();
        let model = TargetModel::from_identifier(target_model);
        let strategy = strategy_for(model, style);

        let (structured, usage) = self.structure_with(idea, style, &strategy).await?;
        let prompt = self.composer.compose_for(&structured, model);

        tracing::info!(
            target_model = %model,
            template = strategy.template.as_str(),
            prompt_len = prompt.chars().count(),
            total_tokens = usage.total_tokens,
            "prompt generated"
        );

        Ok(GeneratedPrompt {
            target_model: model,
            strategy,
            structured,
            prompt,
            usage,
            execution_time: start.elapsed(),
        })
    }

    async fn structure_with(
        &self,
        idea: &str,
        style: &str,
        strategy: &Strategy,
    ) -> Result<(StructuredPromptInput, Usage)> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(strategy.system_prompt())
                    .build()?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(build_user_prompt(idea, style))
                    .build()?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .temperature(strategy.temperature)
            .max_tokens(strategy.max_tokens)
            .build()?;

        tracing::debug!(
            model = %self.config.model,
            template = strategy.template.as_str(),
            temperature = strategy.temperature,
            max_tokens = strategy.max_tokens,
            "requesting structured fields"
        );

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        if self.config.verbose {
            tracing::info!(response = %content, "structuring response");
        }

        let usage = response
            .usage
            .map(|u| Usage::new(u.prompt_tokens as u64, u.completion_tokens as u64))
            .unwrap_or_default();

        let structured = parse_structured_input(&content)?;
        Ok((structured, usage))
    }
}
