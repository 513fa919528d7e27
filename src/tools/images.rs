//! Image generation through the OpenAI images API.

use crate::error::{ReelcrewError, Result};
use async_openai::types::{
    CreateImageRequestArgs, ImageModel, ImageResponseFormat, ImageSize, ImagesResponse,
};
use std::path::Path;
use tracing::{debug, instrument};

/// Map a configured size like "1024x1792" to the API enum.
pub(super) fn parse_image_size(size: &str) -> Result<ImageSize> {
    match size {
        "256x256" => Ok(ImageSize::S256x256),
        "512x512" => Ok(ImageSize::S512x512),
        "1024x1024" => Ok(ImageSize::S1024x1024),
        "1792x1024" => Ok(ImageSize::S1792x1024),
        "1024x1792" => Ok(ImageSize::S1024x1792),
        other => Err(ReelcrewError::Config(format!("Unsupported image size: {}", other))),
    }
}

/// Map a configured image model name to the API enum.
pub(super) fn parse_image_model(name: &str) -> ImageModel {
    match name {
        "dall-e-2" => ImageModel::DallE2,
        "dall-e-3" => ImageModel::DallE3,
        other => ImageModel::Other(other.to_string()),
    }
}

/// Response format to request for a model.
///
/// DALL-E models can return URLs; newer models only return base64 data and
/// reject the parameter.
pub(super) fn response_format(model: &ImageModel) -> Option<ImageResponseFormat> {
    match model {
        ImageModel::DallE2 | ImageModel::DallE3 => Some(ImageResponseFormat::Url),
        ImageModel::Other(_) => None,
    }
}

/// Generate one image for a prompt and write it to `dest`.
#[instrument(skip(client, model, size, prompt), fields(dest = %dest.display()))]
pub(super) async fn render(
    client: &async_openai::Client<async_openai::config::OpenAIConfig>,
    model: ImageModel,
    size: ImageSize,
    prompt: &str,
    dest: &Path,
) -> Result<()> {
    let format = response_format(&model);
    let mut args = CreateImageRequestArgs::default();
    args.prompt(prompt).model(model).n(1).size(size);
    if let Some(format) = format {
        args.response_format(format);
    }
    let request = args
        .build()
        .map_err(|e| ReelcrewError::Image(format!("Failed to build request: {}", e)))?;

    let response = client
        .images()
        .create(request)
        .await
        .map_err(|e| ReelcrewError::OpenAI(format!("Image API error: {}", e)))?;

    save_first(&response, dest).await
}

/// Write the first image of a response to `dest`.
///
/// URL images are downloaded and base64 images decoded. The images are saved
/// into a scratch directory next to `dest` and the first one moved into place.
pub(super) async fn save_first(response: &ImagesResponse, dest: &Path) -> Result<()> {
    if response.data.is_empty() {
        return Err(ReelcrewError::Image("Empty image response".to_string()));
    }

    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let scratch = tempfile::Builder::new().prefix(".image_").tempdir_in(parent)?;

    debug!("Saving generated image");
    let saved = response
        .save(scratch.path())
        .await
        .map_err(|e| ReelcrewError::Image(format!("Failed to save image: {}", e)))?;

    let first = saved
        .first()
        .ok_or_else(|| ReelcrewError::Image("Empty image response".to_string()))?;
    tokio::fs::rename(first, dest).await?;

    Ok(())
}
