mod common;

use brandgen::batch::sample_requests;
use brandgen::config::{NotificationConfig, setup_logging};
use brandgen::notify::{NotificationOutcome, Notifier};
use brandgen::pipeline::Pipeline;
use brandgen::producer::Producer;
use std::collections::HashSet;
use std::path::PathBuf;

fn collect_files(root: &std::path::Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for dir in std::fs::read_dir(root).expect("read output root") {
        let dir = dir.expect("dir entry").path();
        for file in std::fs::read_dir(&dir).expect("read variant dir") {
            files.push(file.expect("file entry").path());
        }
    }
    files
}

#[tokio::test]
async fn test_sample_batch_writes_25_files() {
    let _ = setup_logging(true);
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("generated_images");
    let config = common::config_for(&output, NotificationConfig::default());

    let producer = Producer::from_config(&config, None).expect("placeholder producer");
    let pipeline = Pipeline::new(&config, producer);
    let report = pipeline.run_batch(&sample_requests()).await;

    assert!(report.is_clean(), "failures: {:?}", report.failures);
    assert_eq!(report.results.len(), 5);
    assert_eq!(report.file_count(), 25);

    let reported: HashSet<PathBuf> = report
        .results
        .iter()
        .flat_map(|result| result.variants.iter().cloned())
        .collect();
    assert_eq!(reported.len(), 25, "reported paths must be distinct");

    let on_disk: HashSet<PathBuf> = collect_files(&output).into_iter().collect();
    assert_eq!(on_disk, reported);

    for spec in &config.image_variants.sizes {
        let count = on_disk
            .iter()
            .filter(|path| path.parent() == Some(output.join(&spec.name).as_path()))
            .count();
        assert_eq!(count, 5, "variant {}", spec.name);
    }

    let summer = output.join("social_square");
    assert!(on_disk.iter().any(|path| {
        path.parent() == Some(summer.as_path())
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| {
                    name.starts_with("summer_sale_social_square_") && name.ends_with(".jpg")
                })
    }));
}

#[tokio::test]
async fn test_unreachable_webhook_does_not_change_the_report() {
    let _ = setup_logging(true);
    let dir = tempfile::tempdir().expect("tempdir");
    let notification = NotificationConfig {
        enabled: true,
        webhook_url: "http://127.0.0.1:9/notify".to_string(),
    };
    let config = common::config_for(dir.path(), notification);

    let producer = Producer::from_config(&config, None).expect("placeholder producer");
    let pipeline = Pipeline::new(&config, producer);
    let requests = &sample_requests()[..1];
    let report = pipeline.run_batch(requests).await;
    let before = (report.results.clone(), report.failures.clone());

    let notifier = Notifier::new(&config.notification).expect("notifier");
    let outcome = notifier.notify(&report.results).await;
    assert!(matches!(outcome, NotificationOutcome::Failed(_)));

    assert!(report.is_clean());
    assert_eq!((report.results, report.failures), before);
}

#[tokio::test]
async fn test_webhook_receives_batch_summary() {
    let _ = setup_logging(true);
    let (base, server) = common::serve_once("200 OK", "{}".to_string()).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let notification = NotificationConfig {
        enabled: true,
        webhook_url: format!("{base}/notify"),
    };
    let config = common::config_for(dir.path(), notification);

    let producer = Producer::from_config(&config, None).expect("placeholder producer");
    let pipeline = Pipeline::new(&config, producer);
    let report = pipeline.run_batch(&sample_requests()[..2]).await;

    let notifier = Notifier::new(&config.notification).expect("notifier");
    assert_eq!(
        notifier.notify(&report.results).await,
        NotificationOutcome::Delivered(200)
    );

    let request = server.await.expect("server task");
    assert!(request.starts_with("POST /notify"));
    let payload: serde_json::Value =
        serde_json::from_str(common::request_body(&request)).expect("json payload");
    assert!(
        payload["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("Image Generation Complete!"))
    );
    let results = payload["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0]["prompt"],
        "Summer sale promotion with beach vibes and tropical elements"
    );
    assert!(results[0]["timestamp"].is_string());
    assert_eq!(results[0]["variants"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn test_rejected_webhook_is_reported_not_raised() {
    let _ = setup_logging(true);
    let (base, server) =
        common::serve_once("500 Internal Server Error", "{}".to_string()).await;
    let notifier = Notifier::new(&NotificationConfig {
        enabled: true,
        webhook_url: base,
    })
    .expect("notifier");
    assert_eq!(
        notifier.notify(&[]).await,
        NotificationOutcome::Rejected(500)
    );
    let _ = server.await;
}
