use crate::{
    client::Client,
    config::Config,
    error::Error,
    streaming::{DecodeMode, MessageStream, event_stream_from_response},
    types::common::validate_mixed_ttl_order,
    types::content::{ContentBlockParam, MessageContentParam, SystemParam},
    types::messages::{
        Message, MessageTokensCountRequest, MessageTokensCountResponse, MessagesCreateRequest,
    },
};

/// Validates a message creation request before dispatch.
///
/// Checks cache TTL ordering across system and message blocks, and sampling
/// parameter ranges.
fn validate_create_request(req: &MessagesCreateRequest) -> Result<(), Error> {
    let mut ttls = Vec::new();

    if let Some(SystemParam::Blocks(blocks)) = &req.system {
        for tb in blocks {
            if let Some(cc) = &tb.cache_control
                && let Some(ttl) = cc.ttl
            {
                ttls.push(ttl);
            }
        }
    }

    for message in &req.messages {
        if let MessageContentParam::Blocks(blocks) = &message.content {
            for block in blocks {
                match block {
                    ContentBlockParam::Text {
                        cache_control: Some(cc),
                        ..
                    }
                    | ContentBlockParam::Image {
                        cache_control: Some(cc),
                        ..
                    }
                    | ContentBlockParam::ToolResult {
                        cache_control: Some(cc),
                        ..
                    } => {
                        if let Some(ttl) = cc.ttl {
                            ttls.push(ttl);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    if !validate_mixed_ttl_order(ttls) {
        return Err(Error::Config(
            "invalid cache_control TTL ordering: 1h must precede 5m".into(),
        ));
    }

    if let Some(t) = req.temperature
        && !(0.0..=1.0).contains(&t)
    {
        return Err(Error::Config(format!(
            "invalid temperature {t}: must be in [0.0, 1.0]"
        )));
    }

    if let Some(p) = req.top_p
        && (!(0.0..=1.0).contains(&p) || p == 0.0)
    {
        return Err(Error::Config(format!(
            "invalid top_p {p}: must be in (0.0, 1.0]"
        )));
    }

    if let Some(k) = req.top_k
        && k < 1
    {
        return Err(Error::Config(format!("invalid top_k {k}: must be >= 1")));
    }

    if req.max_tokens == 0 {
        return Err(Error::Config("max_tokens must be greater than 0".into()));
    }

    Ok(())
}

/// API resource for the `/v1/messages` endpoints.
pub struct Messages<'c, C: Config> {
    client: &'c Client<C>,
}

impl<'c, C: Config> Messages<'c, C> {
    /// Creates a new Messages resource.
    #[must_use]
    pub const fn new(client: &'c Client<C>) -> Self {
        Self { client }
    }

    /// Creates a message, blocking until the whole turn is generated.
    pub async fn create(&self, req: MessagesCreateRequest) -> Result<Message, Error> {
        validate_create_request(&req)?;
        self.client.post("/v1/messages", req).await
    }

    /// Counts the tokens a request would consume.
    pub async fn count_tokens(
        &self,
        req: MessageTokensCountRequest,
    ) -> Result<MessageTokensCountResponse, Error> {
        self.client.post("/v1/messages/count_tokens", req).await
    }

    /// Creates a message as a live stream, with lenient decoding.
    ///
    /// `stream: true` is set automatically. The returned [`MessageStream`]
    /// yields typed events as they arrive and produces the final turn after
    /// `message_stop`; dropping it abandons the turn and closes the
    /// connection.
    pub async fn create_stream(&self, req: MessagesCreateRequest) -> Result<MessageStream, Error> {
        self.create_stream_with(req, DecodeMode::default()).await
    }

    /// Creates a message stream with an explicit [`DecodeMode`].
    pub async fn create_stream_with(
        &self,
        mut req: MessagesCreateRequest,
        mode: DecodeMode,
    ) -> Result<MessageStream, Error> {
        req.stream = Some(true);
        validate_create_request(&req)?;

        let response = self.client.post_stream("/v1/messages", req).await?;
        Ok(MessageStream::new(event_stream_from_response(
            response, mode,
        )))
    }
}

impl<C: Config> Client<C> {
    /// Returns the Messages API resource.
    #[must_use]
    pub const fn messages(&self) -> Messages<'_, C> {
        Messages::new(self)
    }
}
