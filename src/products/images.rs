use anyhow::Context;
use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::state::AppState;

const PRESIGN_TTL_SECS: u64 = 60 * 60;

pub struct UploadItem<'a> {
    pub body: Bytes,
    pub content_type: &'a str,
}

pub(crate) fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

fn is_external(image: &str) -> bool {
    image.starts_with("http://") || image.starts_with("https://")
}

/// Store an image and return its object key.
pub async fn upload_product_image(
    st: &AppState,
    product_id: Uuid,
    img: UploadItem<'_>,
) -> anyhow::Result<String> {
    let ext = ext_from_mime(img.content_type)
        .with_context(|| format!("unsupported image type {}", img.content_type))?;
    let key = format!("products/{}/{}.{}", product_id, Uuid::new_v4(), ext);
    st.storage
        .put_object(&key, img.body, img.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    Ok(key)
}

/// External URLs pass through; stored keys become presigned URLs.
pub async fn resolve_urls(st: &AppState, images: &[String]) -> anyhow::Result<Vec<String>> {
    let mut out = Vec::with_capacity(images.len());
    for image in images {
        if is_external(image) {
            out.push(image.clone());
        } else {
            out.push(st.storage.presign_get(image, PRESIGN_TTL_SECS).await?);
        }
    }
    Ok(out)
}

/// Best effort: a failed delete leaves an orphan object, not a broken product.
pub async fn remove_stored(st: &AppState, images: &[String]) {
    for key in images.iter().filter(|i| !is_external(i)) {
        if let Err(e) = st.storage.delete_object(key).await {
            warn!(error = %e, key = %key, "delete product image failed");
        }
    }
}

#[cfg(test)]
mod image_tests {
    use super::*;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[tokio::test]
    async fn resolve_keeps_external_and_presigns_keys() {
        let state = AppState::fake();
        let urls = resolve_urls(
            &state,
            &["https://cdn.test/a.jpg".into(), "products/x/y.png".into()],
        )
        .await
        .unwrap();
        assert_eq!(urls[0], "https://cdn.test/a.jpg");
        assert_eq!(urls[1], "https://fake.local/products/x/y.png");
    }

    #[tokio::test]
    async fn upload_builds_key_under_product() {
        let state = AppState::fake();
        let id = Uuid::new_v4();
        let key = upload_product_image(
            &state,
            id,
            UploadItem {
                body: Bytes::from_static(b"png"),
                content_type: "image/png",
            },
        )
        .await
        .unwrap();
        assert!(key.starts_with(&format!("products/{id}/")));
        assert!(key.ends_with(".png"));
    }

    #[tokio::test]
    async fn upload_rejects_unknown_type() {
        let state = AppState::fake();
        let err = upload_product_image(
            &state,
            Uuid::new_v4(),
            UploadItem {
                body: Bytes::new(),
                content_type: "text/plain",
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("unsupported image type"));
    }
}
