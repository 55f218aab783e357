mod common;

use base64::Engine;
use base64::engine::general_purpose;
use brandgen::config::{VariantSpec, setup_logging};
use brandgen::producer::{ImageProducer, ImagenProducer, PlaceholderProducer};
use brandgen::render::render_variant;
use brandgen::secrets::ApiKey;
use image::{Rgb, RgbImage};
use std::io::Cursor;

#[tokio::test]
async fn test_imagen_decodes_first_prediction() {
    let _ = setup_logging(true);
    let source = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
    let mut png = Vec::new();
    source
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .expect("encode png");
    let body = serde_json::json!({
        "predictions": [{
            "bytesBase64Encoded": general_purpose::STANDARD.encode(&png),
            "mimeType": "image/png"
        }]
    })
    .to_string();

    let (base, server) = common::serve_once("200 OK", body).await;
    let key = ApiKey::new("test-key").expect("key");
    let producer = ImagenProducer::with_api_base(key, "imagen-test", &base).expect("producer");
    let image = producer.produce("a cat").await.expect("produce");
    assert_eq!(image.as_raw(), source.as_raw());

    let request = server.await.expect("server task");
    assert!(request.starts_with("POST /imagen-test:predict"));
    assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
    let payload: serde_json::Value =
        serde_json::from_str(common::request_body(&request)).expect("json body");
    assert_eq!(payload["instances"][0]["prompt"], "a cat");
}

#[tokio::test]
async fn test_imagen_error_status_fails_the_request() {
    let _ = setup_logging(true);
    let (base, server) =
        common::serve_once("429 Too Many Requests", r#"{"error":"quota"}"#.to_string()).await;
    let key = ApiKey::new("test-key").expect("key");
    let producer = ImagenProducer::with_api_base(key, "imagen-test", &base).expect("producer");
    let err = producer.produce("a cat").await.expect_err("rate limited");
    assert!(err.to_string().contains("429"));
    let _ = server.await;
}

#[tokio::test]
async fn test_imagen_empty_predictions_fail_the_request() {
    let _ = setup_logging(true);
    let (base, server) = common::serve_once("200 OK", r#"{"predictions": []}"#.to_string()).await;
    let key = ApiKey::new("test-key").expect("key");
    let producer = ImagenProducer::with_api_base(key, "imagen-test", &base).expect("producer");
    assert!(producer.produce("a cat").await.is_err());
    let _ = server.await;
}

#[tokio::test]
async fn test_placeholder_golden_variant_is_stable() {
    let producer = PlaceholderProducer::new(vec![Rgb([0x00, 0x66, 0xCC])]);
    let spec = VariantSpec::new("thumbnail", 400, 400, "");
    let first = render_variant(&producer.produce("golden").await.expect("first"), &spec);
    let second = render_variant(&producer.produce("golden").await.expect("second"), &spec);
    assert_eq!(first.as_raw(), second.as_raw());
}
