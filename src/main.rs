use texture_scene::SceneConfig;

fn main() -> anyhow::Result<()> {
    texture_scene::run(SceneConfig::default())
}
