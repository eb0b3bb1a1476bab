use super::fsm::{RequestEvent, RequestStateMachine};
use crate::{
    Error, Result,
    config::LlmConfig,
    decode,
    llm::{ChatCompletionRequest, ChatMessage, LlmClient, OpenAiClient},
    prompt,
    rig::{
        AnimationOutput, AnimationRequest, ControlPoint, DenseFrame, DenseId, IdentifierMap,
        OutputMode,
    },
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

enum Decoded {
    Single(DenseFrame),
    Sequence(Vec<DenseFrame>),
}

/// Runs one request through validate, normalize, dispatch, decode, remap.
pub struct Animator {
    llm_client: Option<Box<dyn LlmClient>>,
    temperature: Option<f32>,
}

impl Animator {
    /// Without an API key the animator is still built; dispatch then fails
    /// with a configuration error for each request.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let llm_client: Option<Box<dyn LlmClient>> = match config.api_key() {
            Some(api_key) => Some(Box::new(OpenAiClient::new(config, api_key)?)),
            None => {
                warn!("OPENAI_API_KEY is not set, generation requests will fail");
                None
            }
        };

        info!(
            "Animator initialized with model {} (client configured: {})",
            config.model,
            llm_client.is_some()
        );

        Ok(Self {
            llm_client,
            temperature: config.temperature,
        })
    }

    pub fn with_client(llm_client: Box<dyn LlmClient>) -> Self {
        Self {
            llm_client: Some(llm_client),
            temperature: None,
        }
    }

    pub async fn process(
        &self,
        mode: OutputMode,
        request: AnimationRequest,
    ) -> Result<AnimationOutput> {
        let mut fsm = RequestStateMachine::new();
        fsm.transition(RequestEvent::Received)?;

        step(
            &mut fsm,
            validate(mode, &request),
            RequestEvent::Validated,
            RequestEvent::Rejected,
        )?;

        let (points, ids) = IdentifierMap::normalize(&request.control_points);
        debug!(
            "Normalized {} control points into {} ids",
            points.len(),
            ids.len()
        );
        fsm.transition(RequestEvent::Normalized)?;

        let content = step(
            &mut fsm,
            self.dispatch(mode, &points, &request).await,
            RequestEvent::Completed,
            RequestEvent::Failed,
        )?;

        let decoded = step(
            &mut fsm,
            decode_content(mode, &content, &points),
            RequestEvent::Decoded,
            RequestEvent::Failed,
        )?;

        let output = match decoded {
            Decoded::Single(frame) => AnimationOutput::Single(ids.restore(&frame)),
            Decoded::Sequence(frames) => AnimationOutput::Sequence(ids.restore_all(&frames)),
        };
        fsm.transition(RequestEvent::Remapped)?;

        info!("Generated {} frame(s) in {} mode", output.frame_count(), mode);
        Ok(output)
    }

    async fn dispatch(
        &self,
        mode: OutputMode,
        points: &[ControlPoint],
        request: &AnimationRequest,
    ) -> Result<String> {
        let client = self
            .llm_client
            .as_ref()
            .ok_or_else(|| Error::config("OpenAI API key not configured"))?;

        let payload = prompt::assemble(mode, points, &request.prompt, request.length)?;
        debug!("Sending payload to OpenAI: {}", payload.user);

        let response = client
            .create_chat_completion(ChatCompletionRequest {
                messages: vec![
                    ChatMessage::system(payload.system),
                    ChatMessage::user(payload.user),
                ],
                json_response: true,
                temperature: self.temperature,
            })
            .await?;

        if let Some(usage) = &response.usage {
            debug!(
                "Completion {} used {} tokens ({} prompt, {} completion), finish reason {:?}",
                response.id,
                usage.total_tokens,
                usage.prompt_tokens,
                usage.completion_tokens,
                response.first_finish_reason()
            );
        }

        let content = response
            .first_content()
            .ok_or_else(|| Error::upstream("completion returned no content"))?;
        debug!("OpenAI response content: {}", content);

        Ok(content.to_string())
    }
}

/// Checks the request before anything leaves the service.
pub fn validate(mode: OutputMode, request: &AnimationRequest) -> Result<()> {
    if request.control_points.is_empty() {
        return Err(Error::bad_request("Missing control_points"));
    }
    if request.prompt.trim().is_empty() {
        return Err(Error::bad_request("Missing prompt"));
    }
    if mode.requires_length() {
        match request.length {
            None => return Err(Error::bad_request("Missing length")),
            Some(length) if length <= 0 => {
                return Err(Error::bad_request(format!(
                    "Invalid length {}: must be a positive integer",
                    length
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn decode_content(mode: OutputMode, content: &str, points: &[ControlPoint]) -> Result<Decoded> {
    match mode {
        OutputMode::Pose => decode::decode_deltas(content).map(Decoded::Single),
        OutputMode::Animation => decode::decode_delta_frames(content).map(Decoded::Sequence),
        OutputMode::Keyframes => {
            // Later duplicates overwrite earlier rest positions.
            let originals: HashMap<DenseId, [f64; 3]> = points
                .iter()
                .map(|point| (point.id as DenseId, point.position))
                .collect();
            decode::decode_position_frames(content, &originals).map(Decoded::Sequence)
        }
    }
}

/// Advances the FSM with `ok` or `err` depending on `result`.
fn step<T>(
    fsm: &mut RequestStateMachine,
    result: Result<T>,
    ok: RequestEvent,
    err: RequestEvent,
) -> Result<T> {
    match result {
        Ok(value) => {
            fsm.transition(ok)?;
            Ok(value)
        }
        Err(e) => {
            fsm.transition(err)?;
            Err(e)
        }
    }
}
