use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use serde::Deserialize;

pub use gallery::GalleryConfig;

mod gallery {
    use super::*;

    /// Where product galleries live and how their manifests are named.
    ///
    /// Shared by the viewer (which reads manifests) and the manifest builder
    /// (which writes them), so both agree on file names and extensions.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
    pub struct GalleryConfig {
        /// Public URL prefix under which every product gallery is served.
        pub base_path: String,
        /// Local directory that the public URL space is rooted at.
        pub root_dir: PathBuf,
        /// File name of the per-directory manifest.
        pub manifest_file: String,
        /// Lowercase file extensions (without dot) that count as images.
        pub image_extensions: Vec<String>,
    }

    impl Default for GalleryConfig {
        fn default() -> Self {
            Self {
                base_path: Self::DEFAULT_BASE_PATH.to_string(),
                root_dir: PathBuf::from("public"),
                manifest_file: Self::DEFAULT_MANIFEST_FILE.to_string(),
                image_extensions: Self::DEFAULT_EXTENSIONS
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect(),
            }
        }
    }

    impl GalleryConfig {
        pub const DEFAULT_BASE_PATH: &'static str = "/img/applications/previews";
        pub const DEFAULT_MANIFEST_FILE: &'static str = "gallery.json";
        const DEFAULT_EXTENSIONS: &'static [&'static str] =
            &["jpg", "jpeg", "png", "webp", "gif", "avif", "svg"];

        /// Base path without a trailing slash.
        pub fn base(&self) -> &str {
            self.base_path.trim_end_matches('/')
        }

        /// Local directory that mirrors `base_path`.
        pub fn gallery_root(&self) -> PathBuf {
            self.root_dir.join(self.base().trim_start_matches('/'))
        }

        pub fn is_image(&self, path: &Path) -> bool {
            let Some(ext) = path
                .extension()
                .and_then(OsStr::to_str)
                .map(str::to_ascii_lowercase)
            else {
                return false;
            };
            self.image_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
        }

        pub fn validate(&self, prefix: &str) -> Result<()> {
            ensure!(
                !self.base_path.trim().is_empty(),
                "{}.base-path must not be empty",
                prefix
            );
            ensure!(
                !self.manifest_file.trim().is_empty(),
                "{}.manifest-file must not be empty",
                prefix
            );
            ensure!(
                !self.manifest_file.contains('/'),
                "{}.manifest-file must be a bare file name",
                prefix
            );
            ensure!(
                !self.image_extensions.is_empty(),
                "{}.image-extensions must list at least one extension",
                prefix
            );
            for ext in &self.image_extensions {
                ensure!(
                    !ext.trim().is_empty() && !ext.starts_with('.'),
                    "{}.image-extensions entries must be non-empty and given without a dot",
                    prefix
                );
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_public_layout() {
        let cfg = GalleryConfig::default();
        assert_eq!(cfg.base(), "/img/applications/previews");
        assert_eq!(
            cfg.gallery_root(),
            PathBuf::from("public/img/applications/previews")
        );
        assert_eq!(cfg.manifest_file, "gallery.json");
        cfg.validate("gallery").expect("defaults validate");
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let cfg = GalleryConfig::default();
        assert!(cfg.is_image(Path::new("shots/Front.PNG")));
        assert!(cfg.is_image(Path::new("a.jpeg")));
        assert!(!cfg.is_image(Path::new("gallery.json")));
        assert!(!cfg.is_image(Path::new("README")));
    }

    #[test]
    fn parses_kebab_case_and_rejects_dotted_extensions() {
        let cfg: GalleryConfig = serde_yaml::from_str(
            r#"
base-path: /img/
manifest-file: list.json
image-extensions: [".png"]
"#,
        )
        .expect("valid yaml");
        assert_eq!(cfg.base(), "/img");
        assert_eq!(cfg.root_dir, PathBuf::from("public"));
        let err = cfg.validate("gallery").unwrap_err();
        assert!(err.to_string().contains("without a dot"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = serde_yaml::from_str::<GalleryConfig>("base-url: /x\n");
        assert!(parsed.is_err());
    }
}
