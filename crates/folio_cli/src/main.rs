//! Folio CLI
//!
//! Inspect and simulate the portfolio's scroll-linked animations against a
//! headless page.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_animation::{ElementRef, HeadlessDocument, Host, Property, ScrollEngine};
use folio_site::{mount_site, SiteElements, SiteMount};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::FolioConfig;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Folio scroll animation tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./folio.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every view, binding and resolved trigger range
    Plan,

    /// Scroll from top to bottom and print tracked property values
    Simulate {
        /// Scroll positions to visit (overrides the config)
        #[arg(short, long)]
        steps: Option<u32>,

        /// Print every write instead of the summary columns
        #[arg(long)]
        writes: bool,
    },

    /// Validate the config file and print it with defaults filled in
    CheckConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = FolioConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Plan => cmd_plan(&config),
        Commands::Simulate { steps, writes } => cmd_simulate(&config, steps, writes),
        Commands::CheckConfig => cmd_check_config(&config),
    }
}

/// Headless page with every view mounted
struct Session {
    doc: Rc<HeadlessDocument>,
    site: SiteElements,
    engine: ScrollEngine,
    mount: SiteMount,
    now: Duration,
    frame_interval: Duration,
}

impl Session {
    fn start(config: &FolioConfig) -> Result<Self> {
        let (doc, site) =
            SiteElements::headless(config.viewport.height).context("Failed to lay out site")?;
        let host: Rc<dyn Host> = doc.clone();
        let engine = ScrollEngine::new(Rc::clone(&host), config.engine.clone());
        let mount = mount_site(&engine, host, &site).context("Failed to mount site")?;

        let mut session = Self {
            doc,
            site,
            engine,
            mount,
            now: Duration::ZERO,
            frame_interval: Duration::from_millis(config.simulation.frame_ms),
        };
        session.frame();
        Ok(session)
    }

    fn frame(&mut self) {
        self.engine.frame(self.now);
        self.now += self.frame_interval;
    }

    fn scroll_to(&mut self, offset: f32, settle_frames: u32) {
        self.doc.scroll_to(offset);
        self.engine.notify_scroll();
        for _ in 0..settle_frames.max(1) {
            self.frame();
        }
    }

    fn label(&self, element: ElementRef) -> String {
        self.doc.label(element).unwrap_or_else(|| element.to_string())
    }

    fn value(&self, element: ElementRef, property: Property) -> String {
        match self.doc.value(element, property) {
            Some(v) => format!("{v:>9.2}"),
            None => format!("{:>9}", "-"),
        }
    }

    fn report_diagnostics(&self) {
        for diagnostic in self.engine.drain_diagnostics() {
            warn!("{}", diagnostic);
        }
    }
}

fn cmd_plan(config: &FolioConfig) -> Result<()> {
    let session = Session::start(config)?;

    info!(
        "{} views, {} bindings, {} pending",
        session.mount.views().len(),
        session.mount.attached(),
        session.mount.pending()
    );

    for view in session.mount.views() {
        println!("{} ({} bindings)", view.name, view.binding_count());
    }
    println!();

    for binding in session.engine.bindings() {
        let range = match binding.range {
            Some(r) => format!("{:>8.1} .. {:<8.1}", r.start(), r.end()),
            None => format!("{:^20}", "-"),
        };
        println!(
            "{:<18} {:<8} {:<32} {:<18} {}",
            binding.view,
            binding.mode,
            session.label(binding.key.element),
            binding.key.property,
            range
        );
    }

    session.report_diagnostics();
    Ok(())
}

fn cmd_simulate(config: &FolioConfig, steps: Option<u32>, print_writes: bool) -> Result<()> {
    let steps = steps.unwrap_or(config.simulation.steps);
    if steps == 0 {
        anyhow::bail!("--steps must be at least 1");
    }

    let mut session = Session::start(config)?;
    let max_offset = session.doc.metrics().max_offset();
    info!(
        "Simulating {} steps over {:.0}px ({} settle frames per step)",
        steps, max_offset, config.simulation.settle_frames
    );

    let skill_bar = session.site.skill_bars.first().map(|b| b.element);
    let flow_line = session.site.flow_lines.first().map(|l| l.element);

    if !print_writes {
        println!(
            "{:>8} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "offset", "progress", "hero", "flow", "skill", "card"
        );
    }

    for step in 0..=steps {
        let offset = max_offset * step as f32 / steps as f32;
        session.doc.clear_writes();
        session.scroll_to(offset, config.simulation.settle_frames);

        if print_writes {
            for write in session.doc.writes() {
                println!(
                    "{:>8.1} {:<32} {:<18} {:>9.3}",
                    offset,
                    session.label(write.element),
                    write.property,
                    write.value
                );
            }
            continue;
        }

        let column = |element: Option<ElementRef>, property| match element {
            Some(el) => session.value(el, property),
            None => format!("{:>9}", "-"),
        };
        println!(
            "{:>8.1} {} {} {} {} {}",
            offset,
            session.value(session.site.indicator, Property::ScaleX),
            session.value(session.site.hero_progress, Property::HeightPercent),
            column(flow_line, Property::StrokeDashOffset),
            column(skill_bar, Property::WidthPercent),
            column(session.site.cards.first().map(|c| c.card), Property::Opacity),
        );
    }

    session.report_diagnostics();
    Ok(())
}

fn cmd_check_config(config: &FolioConfig) -> Result<()> {
    info!("Config OK");
    print!("{}", config.to_toml()?);
    Ok(())
}
