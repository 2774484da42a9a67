use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use bsp_atlas_core::{
    AtlasConfig, AtlasOutput, InputImage, build_atlas, codegen_context, load_input, to_json,
};
use clap::{ArgAction, Parser};
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

const AS3_TEMPLATE: &str = include_str!("templates/as3.hbs");
const AS3_META_TEMPLATE: &str = include_str!("templates/as3_meta.hbs");
const AS3_META_FILE: &str = "AtlasImageMeta.as";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "bsp-atlas",
    about = "Trim sprites and pack them into a single texture atlas",
    version
)]
struct Cli {
    // Input/Output
    /// Image files, directories (walked recursively) or glob patterns
    #[arg(required = true, help_heading = "Input/Output")]
    inputs: Vec<String>,
    /// Atlas image path
    #[arg(short, long, default_value = "atlas.png", help_heading = "Input/Output")]
    out: PathBuf,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// YAML config file path (keys present in the file override CLI values)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Layout
    /// Atlas width
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    width: u32,
    /// Atlas height
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    height: u32,
    /// Number of packing seeds to try
    #[arg(long, default_value_t = 1000, help_heading = "Layout")]
    trials: u32,
    /// Stop starting new seeds after this many milliseconds (once a layout was found)
    #[arg(long, help_heading = "Layout")]
    time_budget: Option<u64>,
    /// Evaluate seeds in parallel (requires the `parallel` feature)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    parallel: bool,

    // Export
    /// Write the manifest as JSON to this path
    #[arg(long, help_heading = "Export")]
    json: Option<PathBuf>,
    /// Write the manifest as an ActionScript class to this path
    #[arg(long, help_heading = "Export")]
    as3: Option<PathBuf>,
    /// Package and class name of the ActionScript class
    #[arg(long, alias = "as3name", default_value = "Atlas", help_heading = "Export")]
    as3_name: String,
    /// Custom handlebars template rendered to the --as3 path instead of the built-in class
    #[arg(long, help_heading = "Export")]
    template: Option<PathBuf>,
    /// Number of leading path segments removed from image identifiers
    #[arg(long, default_value_t = 0, help_heading = "Export")]
    strip: usize,
    /// Draw a 1px black frame around every sprite (debug)
    #[arg(long, alias = "drawpadding", default_value_t = false, help_heading = "Export")]
    draw_padding: bool,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
    /// Write per-phase timings as JSON to this path
    #[arg(long, alias = "cpuprofile", help_heading = "Export")]
    profile: Option<PathBuf>,

    // Logging/UX
    /// Show progress bars (disable with --progress=false or --quiet)
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let started = Instant::now();
    let cfg = resolve_config(cli)?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }
    cfg.validate()?;
    if cli.template.is_some() && cli.as3.is_none() {
        anyhow::bail!("--template needs an output path via --as3");
    }

    let mut profile = Profile::default();

    let phase = Instant::now();
    let paths = gather_paths(&cli.inputs, &cli.include, &cli.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no input images matched {:?}", cli.inputs);
    }
    let inputs = load_images_with_progress(&paths, cli.progress && !cli.quiet)?;
    info!(count = inputs.len(), "loaded input images");
    profile.load_ms = millis(phase.elapsed());

    let phase = Instant::now();
    let out = build_atlas(inputs, &cfg)?;
    profile.pack_ms = millis(phase.elapsed());
    profile.seed = out.layout.seed;
    profile.score = out.layout.score;
    profile.images = out.meta.images.len();
    profile.trials = cfg.trials;

    info!(seed = out.layout.seed, score = out.layout.score, "{}", out.stats().summary());

    let phase = Instant::now();
    if !cli.dry_run {
        write_outputs(cli, &out)?;
    }
    profile.write_ms = millis(phase.elapsed());
    profile.total_ms = millis(started.elapsed());

    if let Some(path) = &cli.profile {
        fs::write(path, serde_json::to_string_pretty(&profile)?)
            .with_context(|| format!("write {}", path.display()))?;
        info!(?path, "profile written");
    }
    Ok(())
}

fn write_outputs(cli: &Cli, out: &AtlasOutput) -> anyhow::Result<()> {
    out.rgba
        .save(&cli.out)
        .with_context(|| format!("write {}", cli.out.display()))?;
    info!(path = ?cli.out, "atlas image written");

    if let Some(json_path) = &cli.json {
        let json = serde_json::to_string_pretty(&to_json(&out.meta))?;
        fs::write(json_path, json).with_context(|| format!("write {}", json_path.display()))?;
        info!(?json_path, "json manifest written");
    }

    if let Some(as3_path) = &cli.as3 {
        let ctx = codegen_context(&out.meta, &cli.as3_name);
        let custom = match &cli.template {
            Some(path) => Some(
                fs::read_to_string(path)
                    .with_context(|| format!("read template {}", path.display()))?,
            ),
            None => None,
        };
        let rendered = render_template(custom.as_deref().unwrap_or(AS3_TEMPLATE), &ctx)?;
        fs::write(as3_path, rendered).with_context(|| format!("write {}", as3_path.display()))?;
        info!(?as3_path, "code written");

        if custom.is_none() {
            let meta_path = as3_path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(AS3_META_FILE);
            let rendered = render_template(AS3_META_TEMPLATE, &ctx)?;
            fs::write(&meta_path, rendered)
                .with_context(|| format!("write {}", meta_path.display()))?;
            debug!(?meta_path, "meta class written");
        }
    }
    Ok(())
}

fn render_template<T: Serialize>(template: &str, ctx: &T) -> anyhow::Result<String> {
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    reg.register_escape_fn(handlebars::no_escape);
    reg.register_template_string("tpl", template)?;
    Ok(reg.render("tpl", ctx)?)
}

/// Build the atlas config from CLI flags, then apply the YAML file on top if given.
fn resolve_config(cli: &Cli) -> anyhow::Result<AtlasConfig> {
    let cfg = AtlasConfig {
        width: cli.width,
        height: cli.height,
        trials: cli.trials,
        draw_padding: cli.draw_padding,
        strip: cli.strip,
        time_budget_ms: cli.time_budget,
        parallel: cli.parallel,
    };
    match &cli.config {
        Some(path) => {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            let y: YamlConfig = serde_yaml::from_str(&file)
                .with_context(|| format!("parse config {}", path.display()))?;
            Ok(y.into_atlas_config(cfg))
        }
        None => Ok(cfg),
    }
}

#[derive(Debug, Default, Serialize)]
struct Profile {
    images: usize,
    trials: u32,
    seed: u32,
    score: u64,
    load_ms: f64,
    pack_ms: f64,
    write_ms: f64,
    total_ms: f64,
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Expand every input into image paths. Result is sorted and free of duplicates so the
/// build does not depend on directory iteration order.
fn gather_paths(
    inputs: &[String],
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_glob_set(include)?;
    let exc_set = build_glob_set(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) {
                list.push(path.to_path_buf());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path) {
                let entry = entry?;
                let p = entry.path();
                if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p)
                {
                    list.push(p.to_path_buf());
                }
            }
        } else {
            let (base, matcher) = glob_pattern(input)?;
            let walk_root = if base.as_os_str().is_empty() {
                Path::new(".")
            } else {
                base.as_path()
            };
            for entry in WalkDir::new(walk_root) {
                let entry = entry?;
                let p = entry.path();
                let rel = if base.as_os_str().is_empty() {
                    p.strip_prefix(".").unwrap_or(p)
                } else {
                    p
                };
                if p.is_file()
                    && matcher.is_match(normalized(rel))
                    && !should_skip(rel, inc_set.as_ref(), exc_set.as_ref())
                {
                    list.push(rel.to_path_buf());
                }
            }
        }
    }
    list.sort();
    list.dedup();
    Ok(list)
}

fn build_glob_set(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat)?);
    }
    Ok(Some(b.build()?))
}

/// Split a glob into the literal directory prefix to walk and a matcher for the full path.
/// An absolute pattern keeps its root, so the walk yields paths the matcher can compare.
fn glob_pattern(pattern: &str) -> anyhow::Result<(PathBuf, GlobMatcher)> {
    let pattern = pattern.replace('\\', "/");
    let segments: Vec<&str> = pattern.split('/').collect();
    let literal = segments
        .iter()
        .take_while(|s| !s.contains(['*', '?', '[', '{']))
        .count();
    if literal == segments.len() {
        anyhow::bail!("input not found: {}", pattern);
    }
    let prefix = segments[..literal].join("/");
    let base = if prefix.is_empty() && pattern.starts_with('/') {
        PathBuf::from("/")
    } else {
        PathBuf::from(prefix)
    };
    let matcher = GlobBuilder::new(&pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob {}", pattern))?
        .compile_matcher();
    Ok((base, matcher))
}

fn normalized(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = normalized(p);
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif")
    )
}

/// Decode every path. The first unreadable image aborts the run.
fn load_images_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<InputImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        if let Some(b) = &bar {
            let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
            b.set_message(msg.to_string());
        }
        let input = load_input(p)?;
        debug!(key = %input.key, w = input.image.width(), h = input.image.height(), "decoded");
        list.push(input);
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    width: Option<u32>,
    height: Option<u32>,
    trials: Option<u32>,
    draw_padding: Option<bool>,
    strip: Option<usize>,
    time_budget_ms: Option<u64>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_atlas_config(self, mut cfg: AtlasConfig) -> AtlasConfig {
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.height {
            cfg.height = v;
        }
        if let Some(v) = self.trials {
            cfg.trials = v;
        }
        if let Some(v) = self.draw_padding {
            cfg.draw_padding = v;
        }
        if let Some(v) = self.strip {
            cfg.strip = v;
        }
        if let Some(v) = self.time_budget_ms {
            cfg.time_budget_ms = Some(v);
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        cfg
    }
}
