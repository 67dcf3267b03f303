#![deny(warnings)]

//! Headless CLI: loads the catalog, settings and save, plays the economy
//! with the seeded autoplayer and persists progress.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use persistence::{
    default_catalog_path, default_save_path, default_settings_path, delete_save, load_catalog,
    load_save, load_settings_or_default, now_unix, save_to_path,
};
use sim_core::format::{format_number, format_percent, NumberFormat};
use sim_econ::RunPhase;
use sim_runtime::{Autoplayer, Catalog, Session, TickClock};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

struct Args {
    catalog: PathBuf,
    save: PathBuf,
    settings: PathBuf,
    seconds: u64,
    seed: u64,
    realtime: bool,
    reset: bool,
    version: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        catalog: PathBuf::from(default_catalog_path()),
        save: PathBuf::from(default_save_path()),
        settings: PathBuf::from(default_settings_path()),
        seconds: 600,
        seed: 42,
        realtime: false,
        reset: false,
        version: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--catalog" => {
                if let Some(p) = it.next() {
                    args.catalog = p.into();
                }
            }
            "--save" => {
                if let Some(p) = it.next() {
                    args.save = p.into();
                }
            }
            "--settings" => {
                if let Some(p) = it.next() {
                    args.settings = p.into();
                }
            }
            "--seconds" => {
                if let Some(n) = it.next().and_then(|s| s.parse().ok()) {
                    args.seconds = n;
                }
            }
            "--seed" => {
                if let Some(n) = it.next().and_then(|s| s.parse().ok()) {
                    args.seed = n;
                }
            }
            "--realtime" => args.realtime = true,
            "--reset" => args.reset = true,
            "--version" => args.version = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

fn load_catalog_or_empty(args: &Args) -> Catalog {
    let entries = match load_catalog(&args.catalog) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %args.catalog.display(), error = %e, "catalog unavailable, starting empty");
            return Catalog::default();
        }
    };
    Catalog::new(entries).unwrap_or_else(|e| {
        warn!(error = %e, "catalog rejected, starting empty");
        Catalog::default()
    })
}

fn persist(session: &mut Session, args: &Args) -> Result<()> {
    save_to_path(&args.save, &session.to_save(now_unix()))
        .with_context(|| format!("writing save to {}", args.save.display()))?;
    session.mark_saved();
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    if args.version {
        println!(
            "clicker-startup {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(git_sha = env!("GIT_SHA"), seconds = args.seconds, seed = args.seed, "starting CLI");

    let settings = load_settings_or_default(&args.settings);
    let fmt = settings.number_format;
    let mut session = Session::with_settings(load_catalog_or_empty(&args), settings);
    info!(upgrades = session.catalog().len(), "catalog loaded");

    if args.reset {
        session.reset_all();
        if delete_save(&args.save)? {
            info!(path = %args.save.display(), "save deleted");
        }
    } else {
        match load_save(&args.save) {
            Ok(Some(save)) => {
                let saved_at = DateTime::<Utc>::from_timestamp(save.last_saved_unix_seconds, 0);
                let report = session.restore(&save, now_unix());
                info!(
                    saved_at = ?saved_at,
                    offline = %format_number(report.offline_earned, fmt),
                    "welcome back"
                );
            }
            Ok(None) => info!("no save found, starting fresh"),
            Err(e) => warn!(error = %e, "save unreadable, starting fresh"),
        }
    }

    let mut bot = Autoplayer::new(args.seed);
    let step = Duration::from_secs(1);
    let mut clock = args.realtime.then(TickClock::start);
    let (mut clicks, mut bought, mut prestiges) = (0u64, 0u64, 0u64);
    for _ in 0..args.seconds {
        let dt = match clock.as_mut() {
            Some(c) => {
                std::thread::sleep(step);
                c.lap()
            }
            None => step,
        };
        let summary = bot.step(&mut session, dt);
        clicks += u64::from(summary.clicks);
        bought += u64::from(summary.bought);
        prestiges += u64::from(summary.prestiged > 0);
        if summary.autosave_due {
            if let Err(e) = persist(&mut session, &args) {
                warn!(error = %e, "autosave failed");
            }
        }
    }
    persist(&mut session, &args)?;

    let state = session.state();
    let preview = session.prestige_preview();
    let phase = match preview.phase {
        RunPhase::Active => "active",
        RunPhase::Eligible => "eligible",
    };
    println!(
        "KPI | money: ${} | income: ${}/s | click: ${} | IC: {} (+{}) | clicks: {} | upgrades bought: {} | prestiges: {}",
        format_number(state.money(), fmt),
        format_number(state.current_income_per_sec(), fmt),
        format_number(state.click_gain_per_press(), fmt),
        format_number(state.investor_capital(), NumberFormat::Short),
        format_percent(state.global_bonus_percent_points()),
        clicks,
        bought,
        prestiges
    );
    println!(
        "Prestige | {} | gain now: {} | next point at: ${}",
        phase,
        preview.gain,
        format_number(preview.next_target, fmt)
    );

    Ok(())
}
