use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scratch_render::{
    ColorInput, Costume, CostumeFormat, Engine as _, HeadlessEngine, RenderOpts, Scene,
    SpriteProps, TargetId,
};

#[derive(Parser, Debug)]
#[command(name = "scratch-render", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON-described stage as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Pixels per stage unit.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Render the pen layer at high quality.
    #[arg(long)]
    hq_pen: bool,

    /// Print the stage colour seen at each `--probe x,y` point.
    #[arg(long, value_parser = parse_probe)]
    probe: Vec<(f64, f64)>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    #[serde(default = "default_stage_width")]
    width: u32,
    #[serde(default = "default_stage_height")]
    height: u32,
    #[serde(default)]
    opts: RenderOpts,
    #[serde(default)]
    backdrops: Vec<CostumeFile>,
    #[serde(default)]
    sprites: Vec<SpriteFile>,
}

#[derive(Debug, serde::Deserialize)]
struct CostumeFile {
    /// Relative to the scene file.
    path: PathBuf,
    #[serde(flatten)]
    costume: Costume,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SpriteFile {
    name: String,
    costumes: Vec<CostumeFile>,
    #[serde(default)]
    costume: usize,
    #[serde(default)]
    props: SpriteProps,
    #[serde(default)]
    effects: BTreeMap<String, f64>,
    #[serde(default)]
    pen: Option<PenFile>,
    #[serde(default)]
    stamp: bool,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct PenFile {
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    size: Option<f64>,
    /// Points visited with the pen down, starting from the first.
    path: Vec<[f64; 2]>,
}

fn default_stage_width() -> u32 {
    480
}

fn default_stage_height() -> u32 {
    360
}

fn parse_probe(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'x,y', got '{s}'"))?;
    let x = x.trim().parse().map_err(|_| format!("bad x in '{s}'"))?;
    let y = y.trim().parse().map_err(|_| format!("bad y in '{s}'"))?;
    Ok((x, y))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
    }
}

fn read_scene_json(path: &Path) -> anyhow::Result<SceneFile> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scene: SceneFile = serde_json::from_reader(r).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

fn load_costumes(files: Vec<CostumeFile>, root: &Path) -> anyhow::Result<Vec<Costume>> {
    files
        .into_iter()
        .map(|file| {
            let path = root.join(&file.path);
            let data = std::fs::read(&path)
                .with_context(|| format!("read costume '{}'", path.display()))?;
            let mut costume = file.costume;
            if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
            {
                costume.format = CostumeFormat::Svg;
            }
            costume.data = Arc::new(data);
            Ok(costume)
        })
        .collect()
}

fn add_sprite(
    scene: &mut Scene,
    engine: &HeadlessEngine,
    sprite: SpriteFile,
    root: &Path,
) -> anyhow::Result<TargetId> {
    let costumes = load_costumes(sprite.costumes, root)?;
    let id = scene
        .add_sprite(engine.id(), sprite.name.clone(), costumes, sprite.props)
        .with_context(|| format!("add sprite '{}'", sprite.name))?;
    if sprite.costume != 0 {
        scene.set_costume(id, sprite.costume)?;
    }
    for (name, value) in &sprite.effects {
        if !scene.set_effect(id, name, *value) {
            anyhow::bail!("sprite '{}': unknown effect '{name}'", sprite.name);
        }
    }

    if let Some(pen) = sprite.pen {
        let home = scene.target(id).rendered.position();
        if let Some(color) = pen.color {
            scene.set_pen_color_to_color(id, &ColorInput::from(color));
        }
        if let Some(size) = pen.size {
            scene.set_pen_size(id, size);
        }
        let mut points = pen.path.iter();
        if let Some([x, y]) = points.next() {
            scene.set_position(id, *x, *y);
            scene.pen_down(id);
            for [x, y] in points {
                scene.set_position(id, *x, *y);
            }
            scene.pen_up(id);
        }
        scene.set_position(id, home.x, home.y);
    }
    if sprite.stamp {
        scene.stamp(id);
    }
    Ok(id)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let file = read_scene_json(&args.scene)?;
    let root = args.scene.parent().unwrap_or_else(|| Path::new("."));

    let mut opts = file
        .opts
        .apply_env_with(|key| std::env::var(key).ok())?;
    opts.hq_pen |= args.hq_pen;
    opts.clear_rgba.get_or_insert([255, 255, 255, 255]);
    opts.validate()?;

    let engine = Arc::new(HeadlessEngine::with_stage_size(1, file.width, file.height));
    let mut scene = Scene::software(opts);
    scene.set_stage_scale(args.scale)?;
    scene.attach_engine(engine.clone())?;

    let backdrops = load_costumes(file.backdrops, root)?;
    if !backdrops.is_empty() {
        scene.add_stage(engine.id(), backdrops)?;
    }
    for sprite in file.sprites {
        add_sprite(&mut scene, &engine, sprite, root)?;
    }

    for (x, y) in &args.probe {
        let [r, g, b] = scene.sample_color3b(engine.id(), *x, *y);
        println!("{x},{y}: #{r:02x}{g:02x}{b:02x}");
    }

    let frame = scene.render_frame(engine.id())?;
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    scene.release();
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
