//! Outbound HTTP integrations: image hosting and generative text.

pub mod assistant;
pub mod uploads;

pub use assistant::{
    review_prompt, AssistKind, AssistRequest, AssistantError, GeminiAssistant, ProxyAssistant,
    TextAssistant, UnconfiguredAssistant,
};
pub use uploads::{
    upload_batch, FileOutcome, FileReport, HttpImageUploader, ImageFile, ImageUploader,
    UploadBatch, UploadError, MAX_IMAGE_BYTES,
};
