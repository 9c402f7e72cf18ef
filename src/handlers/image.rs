use crate::assets::AssetStore;
use crate::codec;
use crate::error::Result;
use crate::http::response::Response;
use crate::routing::classifier::ImageExtension;

/// Reads an image asset and re-encodes it as `extension`.
pub async fn static_image(
    assets: &AssetStore,
    path: &str,
    extension: ImageExtension,
) -> Result<Response> {
    let raw = assets.read_bytes(path).await?;
    let encoded = codec::transcode(&raw, extension)?;

    Ok(Response::ok(&extension.content_type(), encoded))
}
