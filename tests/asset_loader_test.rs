use std::{cell::RefCell, path::Path, rc::Rc};

use texture_scene::{
    SceneConfig,
    config::{AssetPaths, DEFAULT_ASSET_ROOT},
    frame::{LoopState, RenderLoop},
    resources::{
        ColorSpace, LoadEvent, LoadedTexture, LoadingManager, Mapping, TextureKey, TextureLibrary, TextureLoader,
        TextureOutcome, TextureRequest, TextureSettings, Wrap, asset_path, load_scene_textures,
        texture_requests,
    },
    state::AppContext,
    viewport::Sizes,
};

use crate::common::test_utils::{
    FrameTextures, ManualStepper, RecordingRenderer, Sampled, fixture_dir, small_config,
    write_image,
};

mod common;

fn record(manager: &LoadingManager) -> Rc<RefCell<Vec<LoadEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    manager.on_event(move |event| sink.borrow_mut().push(event.clone()));
    events
}

/// Writes every scene image except those in `skip`.
fn write_scene_fixtures(name: &str, skip: &[TextureKey]) -> SceneConfig {
    let root = fixture_dir(name);
    let config = small_config().with_asset_root(&root);
    for request in texture_requests(&config) {
        if !skip.contains(&request.key) {
            write_image(&root, &request.url, [40, 160, 60]);
        }
    }
    config
}

#[test]
fn should_request_six_textures_with_their_settings() {
    let requests = texture_requests(&SceneConfig::default());
    let find = |key| {
        requests
            .iter()
            .find(|r: &&TextureRequest| r.key == key)
            .unwrap()
    };

    assert_eq!(requests.len(), 6);
    let env = find(TextureKey::Environment);
    assert_eq!(env.url, "jodhpurEnv.jpg");
    assert_eq!(env.settings.color_space, ColorSpace::Srgb);
    assert_eq!(env.settings.mapping, Mapping::EquirectangularReflection);
    let color = find(TextureKey::Color);
    assert_eq!(
        color.url,
        "textures/Stylized_Grass_003_SD/Stylized_Grass_003_basecolor.jpg"
    );
    assert_eq!(color.settings.color_space, ColorSpace::Srgb);
    assert_eq!(color.settings.wrap, Wrap::Repeat);
    assert_eq!(color.settings.repeat, [3.0, 3.0]);
    let height = find(TextureKey::Height);
    assert_eq!(
        height.url,
        "textures/Stylized_Grass_003_SD/Stylized_Grass_003_height.png"
    );
    assert_eq!(height.settings, TextureSettings::default());
    assert_eq!(find(TextureKey::Normal).settings.color_space, ColorSpace::Linear);
}

#[tokio::test]
async fn should_load_all_textures() {
    let config = write_scene_fixtures("all", &[]);
    let manager = LoadingManager::new();
    let events = record(&manager);

    let library = load_scene_textures(&config, &manager).await;

    assert_eq!(library.len(), 6);
    assert!(library.failed().is_empty());
    for key in TextureKey::ALL {
        assert!(library.is_loaded(key), "{key:?} missing");
    }
    let color = library.get(TextureKey::Color).unwrap();
    assert_eq!((color.image.width(), color.image.height()), (4, 2));
    assert_eq!(library.settings(TextureKey::Color).repeat, [3.0, 3.0]);

    let events = events.borrow();
    assert!(matches!(events.first(), Some(LoadEvent::Started { .. })));
    assert_eq!(events.last(), Some(&LoadEvent::Finished));
    let progress = events
        .iter()
        .filter(|e| matches!(e, LoadEvent::Progress { .. }))
        .count();
    assert_eq!(progress, 6);
    assert_eq!(manager.items_loaded(), 6);
    assert_eq!(manager.items_total(), 6);
    assert!(!manager.is_loading());
}

#[tokio::test]
async fn should_report_missing_texture_and_still_finish() {
    let config = write_scene_fixtures("missing", &[TextureKey::Height]);
    let height_url = config.assets.height.clone();
    let manager = LoadingManager::new();
    let events = record(&manager);

    let library = load_scene_textures(&config, &manager).await;

    assert_eq!(library.len(), 5);
    assert_eq!(library.failed(), &[TextureKey::Height]);
    assert!(!library.is_loaded(TextureKey::Height));
    // Settings survive a failure so a fallback can be sampled the same way
    assert_eq!(library.settings(TextureKey::Color).wrap, Wrap::Repeat);

    let events = events.borrow();
    let errors: Vec<&LoadEvent> = events
        .iter()
        .filter(|e| matches!(e, LoadEvent::Error { .. }))
        .collect();
    assert_eq!(
        errors,
        [&LoadEvent::Error {
            url: height_url.clone()
        }]
    );
    let error_at = events
        .iter()
        .position(|e| matches!(e, LoadEvent::Error { .. }))
        .unwrap();
    let progress_at = events
        .iter()
        .position(|e| matches!(e, LoadEvent::Progress { url, .. } if *url == height_url))
        .unwrap();
    assert!(error_at < progress_at);
    assert_eq!(events.last(), Some(&LoadEvent::Finished));
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == LoadEvent::Finished)
            .count(),
        1
    );
}

const FLAT_NORMAL: [u8; 4] = [127, 127, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

#[tokio::test]
async fn should_keep_rendering_after_failed_load() {
    let config = write_scene_fixtures("render", &[TextureKey::Height, TextureKey::Normal]);
    let manager = LoadingManager::new();

    let library = load_scene_textures(&config, &manager).await;
    assert_eq!(library.failed().len(), 2);
    assert!(library.failed().contains(&TextureKey::Height));
    assert!(library.failed().contains(&TextureKey::Normal));

    let mut ctx = AppContext::new(&config, Sizes::new(800, 600));
    let mut render_loop = RenderLoop::start(ManualStepper::new());
    let mut renderer = RecordingRenderer::with_library(library);
    for _ in 0..3 {
        render_loop.tick(&mut ctx, &mut renderer).unwrap();
    }

    assert_eq!(render_loop.state(), LoopState::Running);
    assert_eq!(renderer.renders(), 3);
    // The scene keeps the keys bound even though the images are missing
    let material = &ctx.scene.materials()[0];
    assert_eq!(material.displacement_map, Some(TextureKey::Height));
    assert_eq!(material.normal_map, Some(TextureKey::Normal));

    let expected = FrameTextures {
        background: Sampled::Image(config.assets.environment.clone()),
        maps: [
            Sampled::Image(config.assets.color.clone()),
            Sampled::Solid(FLAT_NORMAL),
            Sampled::Image(config.assets.ambient_occlusion.clone()),
            Sampled::Solid(BLACK),
            // roughness stays unbound by default
            Sampled::Solid(WHITE),
        ],
    };
    assert_eq!(renderer.frames(), [expected.clone(), expected.clone(), expected]);
}

#[tokio::test]
async fn should_bind_textures_as_they_arrive() {
    let config = write_scene_fixtures("arrive", &[]);
    let manager = LoadingManager::new();
    let loader = TextureLoader::new(&config.asset_root, &manager);
    let mut outcomes = Vec::new();
    loader
        .load_each(texture_requests(&config), |outcome| outcomes.push(outcome))
        .await;
    let color = outcomes
        .iter()
        .position(|o| o.key() == TextureKey::Color)
        .unwrap();
    let color = outcomes.remove(color);

    let mut ctx = AppContext::new(&config, Sizes::new(800, 600));
    let mut render_loop = RenderLoop::start(ManualStepper::new());
    let mut renderer =
        RecordingRenderer::with_library(TextureLibrary::expecting(&texture_requests(&config)));

    render_loop.tick(&mut ctx, &mut renderer).unwrap();
    renderer.library_mut().record(color);
    render_loop.tick(&mut ctx, &mut renderer).unwrap();
    for outcome in outcomes {
        renderer.library_mut().record(outcome);
    }
    render_loop.tick(&mut ctx, &mut renderer).unwrap();

    let frames = renderer.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(
        frames[0],
        FrameTextures {
            background: Sampled::Solid([128, 128, 128, 255]),
            maps: [
                Sampled::Solid(WHITE),
                Sampled::Solid(FLAT_NORMAL),
                Sampled::Solid(WHITE),
                Sampled::Solid(BLACK),
                Sampled::Solid(WHITE),
            ],
        }
    );
    assert_eq!(frames[1].maps[0], Sampled::Image(config.assets.color.clone()));
    assert_eq!(frames[1].maps[1], Sampled::Solid(FLAT_NORMAL));
    assert_eq!(
        frames[2].maps[1],
        Sampled::Image(config.assets.normal.clone())
    );
    assert_eq!(
        frames[2].background,
        Sampled::Image(config.assets.environment.clone())
    );
}

#[tokio::test]
async fn should_render_frames_while_textures_load() {
    let config = write_scene_fixtures("concurrent", &[TextureKey::Roughness]);
    let manager = LoadingManager::new();
    let loader = TextureLoader::new(&config.asset_root, &manager);
    let requests = texture_requests(&config);

    let mut ctx = AppContext::new(&config, Sizes::new(800, 600));
    let mut render_loop = RenderLoop::start(ManualStepper::new());
    let mut renderer = RecordingRenderer::with_library(TextureLibrary::expecting(&requests));
    let mut outcomes = Vec::new();
    let mut ticks_while_loading = 0;

    let load = loader.load_each(requests, |outcome| outcomes.push(outcome));
    let render = async {
        for _ in 0..3 {
            render_loop.tick(&mut ctx, &mut renderer).unwrap();
            if manager.is_loading() {
                ticks_while_loading += 1;
            }
            tokio::task::yield_now().await;
        }
    };
    tokio::join!(load, render);

    // the batch registers before the first tick, so that frame rendered mid-load
    assert!(ticks_while_loading >= 1);
    assert!(!manager.is_loading());
    assert_eq!(renderer.frames()[0].maps[0], Sampled::Solid(WHITE));

    assert_eq!(outcomes.len(), 6);
    let failed: Vec<&TextureRequest> = outcomes
        .iter()
        .filter_map(|o| match o {
            TextureOutcome::Failed(request) => Some(request),
            TextureOutcome::Loaded(_) => None,
        })
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].key, TextureKey::Roughness);
    assert_eq!(failed[0].url, config.assets.roughness);

    for outcome in outcomes {
        renderer.library_mut().record(outcome);
    }
    render_loop.tick(&mut ctx, &mut renderer).unwrap();
    let last = renderer.frames().last().unwrap();
    assert_eq!(last.maps[0], Sampled::Image(config.assets.color.clone()));
    assert_eq!(renderer.renders(), 4);
}

#[test]
fn should_forget_failure_once_texture_loads() {
    let request = TextureRequest {
        key: TextureKey::Color,
        url: "color.jpg".to_string(),
        settings: TextureSettings::default(),
    };
    let mut library = TextureLibrary::expecting(std::slice::from_ref(&request));

    library.record(TextureOutcome::Failed(request.clone()));
    library.record(TextureOutcome::Failed(request.clone()));
    assert_eq!(library.failed(), &[TextureKey::Color]);

    library.record(TextureOutcome::Loaded(LoadedTexture {
        key: request.key,
        url: request.url,
        image: image::DynamicImage::new_rgb8(1, 1),
        settings: request.settings,
    }));
    assert!(library.failed().is_empty());
    assert!(library.is_loaded(TextureKey::Color));
}

#[tokio::test]
async fn should_fail_undecodable_images() {
    let root = fixture_dir("corrupt");
    std::fs::write(root.join("broken.png"), b"not an image").unwrap();
    let manager = LoadingManager::new();
    let events = record(&manager);
    let loader = TextureLoader::new(&root, &manager);

    let library = loader
        .load_all(vec![TextureRequest {
            key: TextureKey::Normal,
            url: "broken.png".to_string(),
            settings: TextureSettings::default(),
        }])
        .await;

    assert!(library.is_empty());
    assert_eq!(library.failed(), &[TextureKey::Normal]);
    assert_eq!(
        *events.borrow(),
        [
            LoadEvent::Started {
                url: "broken.png".to_string(),
                loaded: 0,
                total: 1
            },
            LoadEvent::Error {
                url: "broken.png".to_string()
            },
            LoadEvent::Progress {
                url: "broken.png".to_string(),
                loaded: 1,
                total: 1
            },
            LoadEvent::Finished,
        ]
    );
}

#[test]
fn asset_paths_point_at_grass_set() {
    let assets = AssetPaths::default();

    assert_eq!(
        assets.ambient_occlusion,
        "textures/Stylized_Grass_003_SD/Stylized_Grass_003_ambientOcclusion.jpg"
    );
    assert_eq!(
        assets.roughness,
        "textures/Stylized_Grass_003_SD/Stylized_Grass_003_roughness.jpg"
    );
    assert_eq!(
        assets.normal,
        "textures/Stylized_Grass_003_SD/Stylized_Grass_003_normal.jpg"
    );
}

#[test]
fn asset_path_joins_root_and_file() {
    assert_eq!(asset_path(Path::new(""), "jodhpurEnv.jpg"), "/jodhpurEnv.jpg");
    assert_eq!(
        asset_path(Path::new("assets/"), "/jodhpurEnv.jpg"),
        "/assets/jodhpurEnv.jpg"
    );
}

#[test]
fn default_asset_root_is_native_asset_dir() {
    assert_eq!(DEFAULT_ASSET_ROOT, "assets");
    assert_eq!(SceneConfig::default().asset_root, Path::new("assets"));
}
