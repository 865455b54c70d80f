use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use foundation::math::GeoPoint;
use layers::MarkerSet;
use scene::ViewConfig;
use tools::{
    FileBoundarySource, HashingWriter, Snapshot, ViewKind, load_index, render_svg, summarize,
    surface_stats,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "inspect" => cmd_inspect(args),
        "stats" => cmd_stats(args),
        "pick" => cmd_pick(args),
        "render" => cmd_render(args),
        _ => Err(usage()),
    }
}

/// `--flag value` pairs plus positionals.
struct Args {
    flags: BTreeMap<String, String>,
    positional: Vec<String>,
}

impl Args {
    fn parse(args: Vec<String>, known: &[&str]) -> Result<Self, String> {
        let mut flags = BTreeMap::new();
        let mut positional = Vec::new();
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.strip_prefix("--") {
                Some(name) if known.contains(&name) => {
                    let value = iter.next().ok_or_else(|| format!("--{name} requires a value"))?;
                    flags.insert(name.to_string(), value);
                }
                // Negative coordinates are positionals.
                Some(_) if arg.parse::<f64>().is_err() => {
                    return Err(format!("unknown arg: {arg}\n\n{}", usage()));
                }
                _ => positional.push(arg),
            }
        }
        Ok(Self { flags, positional })
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    fn number(&self, name: &str, default: f64) -> Result<f64, String> {
        match self.get(name) {
            Some(v) => v.parse().map_err(|_| format!("--{name}: not a number: {v}")),
            None => Ok(default),
        }
    }

    fn source(&self) -> Result<Option<FileBoundarySource>, String> {
        match (self.get("boundaries"), self.get("names")) {
            (Some(b), Some(n)) => Ok(Some(FileBoundarySource {
                boundaries: PathBuf::from(b),
                names: PathBuf::from(n),
            })),
            (None, None) => Ok(None),
            _ => Err("--boundaries and --names go together".to_string()),
        }
    }

    fn require_source(&self) -> Result<FileBoundarySource, String> {
        self.source()?
            .ok_or_else(|| "--boundaries and --names are required".to_string())
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

fn cmd_inspect(args: Vec<String>) -> Result<(), String> {
    // globe inspect --boundaries F --names F [--object NAME]
    let args = Args::parse(args, &["boundaries", "names", "object"])?;
    let source = args.require_source()?;
    let index = load_index(&source, args.get("object")).map_err(|e| e.to_string())?;
    print_json(&summarize(&index))
}

fn cmd_stats(args: Vec<String>) -> Result<(), String> {
    // globe stats <body> [--spacing DEG] [--seed S] [--boundaries F --names F]
    let args = Args::parse(args, &["boundaries", "names", "object", "spacing", "seed"])?;
    let [id] = args.positional.as_slice() else {
        return Err(usage());
    };
    let spec = scene::body(id).ok_or_else(|| format!("unknown body: {id}"))?;

    let index = match args.source()? {
        Some(source) => Some(load_index(&source, args.get("object")).map_err(|e| e.to_string())?),
        None => None,
    };
    let spacing = args.number("spacing", spec.planet_spacing())?;
    let seed = args.number("seed", 0.0)?;

    let dots = spec
        .generate_surface(index.as_ref(), spacing, seed)
        .ok_or_else(|| format!("{id} needs --boundaries and --names"))?;
    print_json(&surface_stats(id, spacing, &dots))
}

fn cmd_pick(args: Vec<String>) -> Result<(), String> {
    // globe pick <lon> <lat> --boundaries F --names F
    let args = Args::parse(args, &["boundaries", "names", "object"])?;
    let [lon, lat] = args.positional.as_slice() else {
        return Err(usage());
    };
    let lon: f64 = lon.parse().map_err(|_| format!("bad longitude: {lon}"))?;
    let lat: f64 = lat.parse().map_err(|_| format!("bad latitude: {lat}"))?;

    let index = load_index(&args.require_source()?, args.get("object")).map_err(|e| e.to_string())?;
    match index.find_containing(GeoPoint::new(lon, lat)) {
        Some(region) => println!("{}\t{}\t{}", region.key, region.code, region.name),
        None => println!("-"),
    }
    Ok(())
}

fn cmd_render(args: Vec<String>) -> Result<(), String> {
    // globe render <view> <out.svg> [--config F] [--width W] [--height H] [--frames N]
    //   [--boundaries F --names F] [--destinations F] [--status F]
    let args = Args::parse(
        args,
        &[
            "boundaries",
            "names",
            "object",
            "config",
            "width",
            "height",
            "frames",
            "destinations",
            "status",
        ],
    )?;
    let [view, out] = args.positional.as_slice() else {
        return Err(usage());
    };
    let kind: ViewKind = view.parse()?;

    let base = kind.base_config();
    let config = match args.get("config") {
        Some(path) => {
            let payload = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
            ViewConfig::from_json_over(&payload, &base).map_err(|e| format!("{path}: {e}"))?
        }
        None => base,
    };

    let load = args
        .source()?
        .map(|source| load_index(&source, args.get("object")));
    if let Some(Err(e)) = &load {
        tracing::warn!(error = %e, "boundaries unavailable, rendering without regions");
    }

    let markers = match args.get("destinations") {
        Some(path) => {
            let payload = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
            let destinations = formats::parse_destinations(&payload).map_err(|e| format!("{path}: {e}"))?;
            let statuses = match args.get("status") {
                Some(path) => {
                    let payload = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
                    formats::parse_travel_status(&payload).map_err(|e| format!("{path}: {e}"))?
                }
                None => BTreeMap::new(),
            };
            Some(MarkerSet::new(&destinations, &statuses))
        }
        None => None,
    };

    let svg = render_svg(Snapshot {
        kind,
        config,
        width: args.number("width", 800.0)?,
        height: args.number("height", 800.0)?,
        load,
        markers,
        frames: args.number("frames", 1.0)?.max(0.0) as u32,
    });

    let file = fs::File::create(out).map_err(|e| format!("create {out:?}: {e}"))?;
    let mut writer = HashingWriter::new(BufWriter::new(file));
    writer
        .write_all(svg.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| format!("write {out:?}: {e}"))?;
    eprintln!("{out}\t{} bytes\tblake3 {}", svg.len(), writer.finalize_hex());
    Ok(())
}

fn usage() -> String {
    let exe = env::args().next().unwrap_or_else(|| "globe".to_string());
    format!(
        "Usage:\n  {exe} inspect --boundaries <topo.json> --names <names.json> [--object NAME]\n  {exe} stats <body> [--spacing DEG] [--seed S] [--boundaries F --names F]\n  {exe} pick <lon> <lat> --boundaries F --names F\n  {exe} render <globe|solar|body> <out.svg> [--config F] [--width W] [--height H] [--frames N]\n         [--boundaries F --names F] [--destinations F] [--status F]\n\nNotes:\n- `--config` is a JSON view config merged over the view's preset.\n- A failed boundary load still renders; region dots are left out.\n- Set RUST_LOG=debug for load and paint traces.\n"
    )
}
