//! hand_control: interactive entry point.

use std::path::PathBuf;

use anyhow::{bail, Context};
use hand_control::app::{run, AppConfig, SourceKind};
use hand_engine::EngineConfig;

#[derive(Debug, Default, PartialEq)]
struct Cli {
    config:       Option<PathBuf>,
    replay:       Option<PathBuf>,
    fps:          Option<f32>,
    print_config: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Cli> {
    let mut cli = Cli::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => cli.config = Some(args.next().context("--config needs a path")?.into()),
            "--replay" => cli.replay = Some(args.next().context("--replay needs a path")?.into()),
            "--fps" => {
                let v = args.next().context("--fps needs a number")?;
                let fps: f32 = v.parse().with_context(|| format!("bad --fps value {:?}", v))?;
                if !(fps > 0.0) {
                    bail!("--fps must be positive");
                }
                cli.fps = Some(fps);
            }
            "--print-config" => cli.print_config = true,
            other => bail!("unknown argument {:?} (expected --config, --replay, --fps, --print-config)", other),
        }
    }
    Ok(cli)
}

fn build_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let engine = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut cfg = AppConfig { engine, ..AppConfig::default() };
    if let Some(path) = &cli.replay {
        cfg.source = SourceKind::Replay(path.clone());
    }
    if let Some(fps) = cli.fps {
        cfg.fps = fps;
    }
    Ok(cfg)
}

fn real_main() -> anyhow::Result<()> {
    let cli = parse_args(std::env::args().skip(1))?;
    let cfg = build_config(&cli)?;

    if cli.print_config {
        println!("{}", cfg.engine.to_json_pretty()?);
        return Ok(());
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║         Hand Control — Gesture Desktop Controller            ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match &cfg.source {
        SourceKind::Sim       => println!("  Source: simulation  (mouse + keys 1-5, see window legend)"),
        SourceKind::Replay(p) => println!("  Source: replay of {}", p.display()),
        #[cfg(feature = "leap")]
        SourceKind::Leap      => println!("  Source: LeapMotion hardware"),
    }
    println!("  Start mode: {}", cfg.engine.initial_mode);
    println!();

    run(cfg)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = real_main() {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> { s.iter().map(|a| a.to_string()).collect() }

    #[test]
    fn parses_all_flags() {
        let cli = parse_args(args(&["--config", "c.json", "--replay", "r.jsonl", "--fps", "15", "--print-config"])).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert_eq!(cli.replay, Some(PathBuf::from("r.jsonl")));
        assert_eq!(cli.fps, Some(15.0));
        assert!(cli.print_config);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_args(args(&["--fps", "fast"])).is_err());
        assert!(parse_args(args(&["--fps", "0"])).is_err());
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--quick"])).is_err());
    }

    #[test]
    fn replay_flag_selects_replay_source() {
        let cli = parse_args(args(&["--replay", "r.jsonl"])).unwrap();
        let cfg = build_config(&cli).unwrap();
        assert_eq!(cfg.source, SourceKind::Replay(PathBuf::from("r.jsonl")));
        assert_eq!(cfg.fps, 30.0);
    }

    #[test]
    fn missing_config_file_is_reported() {
        let cli = Cli { config: Some(PathBuf::from("/nonexistent/hand.json")), ..Cli::default() };
        let err = build_config(&cli).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/hand.json"));
    }
}
