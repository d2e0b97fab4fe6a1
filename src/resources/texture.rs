use std::{collections::HashMap, path::Path};

use anyhow::Context as _;
use futures::{StreamExt, stream::FuturesUnordered};

use crate::resources::{LoadingManager, TextureKey};

/// How sampled values are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
}

/// How a texture is projected onto its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mapping {
    Uv,
    /// A 360 degree panorama used as background and reflection source.
    EquirectangularReflection,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureSettings {
    pub color_space: ColorSpace,
    pub wrap: Wrap,
    pub repeat: [f32; 2],
    pub mapping: Mapping,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            color_space: ColorSpace::Linear,
            wrap: Wrap::ClampToEdge,
            repeat: [1.0, 1.0],
            mapping: Mapping::Uv,
        }
    }
}

/// One image to fetch, and how it is meant to be sampled once decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureRequest {
    pub key: TextureKey,
    pub url: String,
    pub settings: TextureSettings,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadedTexture {
    pub key: TextureKey,
    pub url: String,
    pub image: image::DynamicImage,
    pub settings: TextureSettings,
}

/// How a single request settled.
#[derive(Clone, Debug)]
pub enum TextureOutcome {
    Loaded(LoadedTexture),
    /// The request could not be fetched or decoded. Nothing is retried.
    Failed(TextureRequest),
}

impl TextureOutcome {
    pub fn key(&self) -> TextureKey {
        match self {
            TextureOutcome::Loaded(loaded) => loaded.key,
            TextureOutcome::Failed(request) => request.key,
        }
    }
}

/// Textures known so far. Keys that are still pending or failed have no
/// image, and the renderer binds a fallback in their place until one arrives.
#[derive(Debug, Default)]
pub struct TextureLibrary {
    textures: HashMap<TextureKey, LoadedTexture>,
    settings: HashMap<TextureKey, TextureSettings>,
    failed: Vec<TextureKey>,
}

impl TextureLibrary {
    /// An empty library that already knows how each requested key is sampled.
    pub fn expecting(requests: &[TextureRequest]) -> Self {
        Self {
            settings: requests.iter().map(|r| (r.key, r.settings)).collect(),
            ..Self::default()
        }
    }

    /// Stores a settled request.
    pub fn record(&mut self, outcome: TextureOutcome) {
        match outcome {
            TextureOutcome::Loaded(loaded) => {
                self.settings.insert(loaded.key, loaded.settings);
                self.failed.retain(|k| *k != loaded.key);
                self.textures.insert(loaded.key, loaded);
            }
            TextureOutcome::Failed(request) => {
                self.settings.insert(request.key, request.settings);
                if !self.failed.contains(&request.key) {
                    self.failed.push(request.key);
                }
            }
        }
    }

    pub fn get(&self, key: TextureKey) -> Option<&LoadedTexture> {
        self.textures.get(&key)
    }

    pub fn settings(&self, key: TextureKey) -> TextureSettings {
        self.settings.get(&key).copied().unwrap_or_default()
    }

    pub fn is_loaded(&self, key: TextureKey) -> bool {
        self.textures.contains_key(&key)
    }

    pub fn failed(&self) -> &[TextureKey] {
        &self.failed
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Fetches and decodes images, reporting to a shared [`LoadingManager`].
pub struct TextureLoader<'m> {
    root: &'m Path,
    manager: &'m LoadingManager,
}

impl<'m> TextureLoader<'m> {
    pub fn new(root: &'m Path, manager: &'m LoadingManager) -> Self {
        Self { root, manager }
    }

    /// Issues all requests at once and hands each outcome to `on_settled` as
    /// soon as that request settles, in completion order.
    ///
    /// Individual failures are reported through the manager and delivered as
    /// [`TextureOutcome::Failed`]; they never fail the batch.
    pub async fn load_each(
        &self,
        requests: Vec<TextureRequest>,
        mut on_settled: impl FnMut(TextureOutcome),
    ) {
        // Register the whole batch up front so `Finished` fires exactly once
        for request in &requests {
            self.manager.item_start(&request.url);
        }
        let mut pending: FuturesUnordered<_> = requests
            .into_iter()
            .map(|request| self.load(request))
            .collect();
        while let Some(outcome) = pending.next().await {
            on_settled(outcome);
        }
    }

    /// Waits for every request and collects the outcomes.
    pub async fn load_all(&self, requests: Vec<TextureRequest>) -> TextureLibrary {
        let mut library = TextureLibrary::expecting(&requests);
        self.load_each(requests, |outcome| library.record(outcome))
            .await;
        library
    }

    async fn load(&self, request: TextureRequest) -> TextureOutcome {
        let result = load_image(self.root, &request.url).await;
        if let Err(e) = &result {
            log::warn!("{:#}", e);
            self.manager.item_error(&request.url);
        }
        self.manager.item_end(&request.url);
        match result {
            Ok(image) => TextureOutcome::Loaded(LoadedTexture {
                key: request.key,
                url: request.url,
                image,
                settings: request.settings,
            }),
            Err(_) => TextureOutcome::Failed(request),
        }
    }
}

async fn load_image(root: &Path, file_name: &str) -> anyhow::Result<image::DynamicImage> {
    let data = load_binary(root, file_name).await?;
    image::load_from_memory(&data).with_context(|| format!("decoding {file_name}"))
}

/// Absolute url path of an asset on the page origin. An empty root serves
/// assets from the site root.
pub fn asset_path(root: &Path, file_name: &str) -> String {
    let root = root.to_string_lossy();
    let root = root.trim_matches('/');
    let file_name = file_name.trim_start_matches('/');
    if root.is_empty() {
        format!("/{file_name}")
    } else {
        format!("/{root}/{file_name}")
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(root: &Path, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page origin unavailable"))?;
    let base = reqwest::Url::parse(&origin)?;
    Ok(base.join(&asset_path(root, file_name))?)
}

pub async fn load_binary(root: &Path, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(root, file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = root.join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?
    };

    Ok(data)
}
