use std::fs;

use gallery_lightbox::Error;
use gallery_lightbox::config::GalleryConfig;
use gallery_lightbox::gallery::GalleryService;

fn service(root: &std::path::Path) -> GalleryService {
    GalleryService::new(GalleryConfig {
        root_dir: root.to_path_buf(),
        ..GalleryConfig::default()
    })
}

fn write_manifest(root: &std::path::Path, product: &str, body: &str) {
    let dir = root.join("img/applications/previews").join(product);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("gallery.json"), body).unwrap();
}

#[tokio::test]
async fn loads_manifest_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    write_manifest(tmp.path(), "tools/editor", r#"["b.png", "a.png", "Ärger 1.webp"]"#);

    let images = service(tmp.path()).load_images("/tools/editor").await;
    assert_eq!(images.len(), 3);
    assert_eq!(
        images.iter().collect::<Vec<_>>(),
        ["b.png", "a.png", "Ärger 1.webp"]
    );
}

#[tokio::test]
async fn missing_manifest_yields_empty_set() {
    let tmp = tempfile::tempdir().unwrap();
    let svc = service(tmp.path());
    assert!(svc.load_images("nope").await.is_empty());
    assert!(matches!(
        svc.try_load_images("nope").await,
        Err(Error::ManifestRead { .. })
    ));
}

#[tokio::test]
async fn malformed_manifest_yields_empty_set() {
    let tmp = tempfile::tempdir().unwrap();
    write_manifest(tmp.path(), "objects", r#"{"files": ["a.png"]}"#);
    write_manifest(tmp.path(), "numbers", "[1, 2]");
    let svc = service(tmp.path());

    for product in ["objects", "numbers"] {
        assert!(svc.load_images(product).await.is_empty());
        assert!(matches!(
            svc.try_load_images(product).await,
            Err(Error::ManifestFormat { .. })
        ));
    }
}

#[test]
fn image_url_keeps_file_name_intact() {
    let svc = GalleryService::new(GalleryConfig::default());
    for file in ["a.png", "Screen Shot 2.PNG", "ü-ß%20.webp", "..odd..jpg"] {
        let url = svc.image_url("//tools/editor", file);
        let (dir, name) = url.rsplit_once('/').unwrap();
        assert_eq!(name, file);
        assert_eq!(dir, "/img/applications/previews/tools/editor");
    }
}
