use crate::{
    client::Client,
    config::Config,
    error::Error,
    types::models::{ModelInfo, ModelListParams, ModelsListResponse},
};

/// API resource for the `/v1/models` endpoints.
pub struct Models<'c, C: Config> {
    client: &'c Client<C>,
}

impl<'c, C: Config> Models<'c, C> {
    /// Creates a new Models resource.
    #[must_use]
    pub const fn new(client: &'c Client<C>) -> Self {
        Self { client }
    }

    /// Lists available models with optional pagination.
    pub async fn list(&self, params: &ModelListParams) -> Result<ModelsListResponse, Error> {
        self.client.get_with_query("/v1/models", params).await
    }

    /// Gets one model by id.
    pub async fn get(&self, model_id: &str) -> Result<ModelInfo, Error> {
        self.client.get(&format!("/v1/models/{model_id}")).await
    }
}

impl<C: Config> Client<C> {
    /// Returns the Models API resource.
    #[must_use]
    pub const fn models(&self) -> Models<'_, C> {
        Models::new(self)
    }
}
