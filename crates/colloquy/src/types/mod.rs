//! Type definitions for API requests and responses.

/// Message batch types
pub mod batches;
/// Common types used across the API
pub mod common;
/// Content block types for requests and responses
pub mod content;
/// Messages API types
pub mod messages;
/// Models API types
pub mod models;
/// Tool definition types
pub mod tools;

pub use batches::{
    BatchRequest, BatchResult, BatchResultEntry, MessageBatch, MessageBatchCreateRequest,
    ProcessingStatus, RequestCounts,
};
pub use common::{
    CacheControl, CacheTtl, Metadata, ServerToolUsage, StopReason, Usage, validate_mixed_ttl_order,
};
pub use content::{
    ContentBlock, ContentBlockParam, ImageSource, MessageContentParam, MessageParam, MessageRole,
    SystemParam, TextBlockParam, ToolResultContent, ToolResultContentBlock,
};
pub use messages::{
    Message, MessageTokensCountRequest, MessageTokensCountResponse, MessagesCreateRequest,
    MessagesCreateRequestBuilder, OutputFormat,
};
pub use models::{ModelInfo, ModelListParams, ModelsListResponse};
pub use tools::{Tool, ToolChoice};
