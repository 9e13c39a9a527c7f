use anyhow::Context;
use clap::{Parser, ValueEnum};
use ecgcore::config::ViewerConfig;
use ecgcore::filters::FilterPreset;
use ecgcore::layout::{DisplayFormat, Scale, Size, Zoom};
use generator::synthetic::{build_record_from_config, SyntheticConfig};
use gui_bridge::bridge::GuiBridge;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{load_config, load_record, parse_scale, parse_zoom, DisplayOptions, MeasureRequest};
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    #[value(name = "1xfull")]
    Full,
    #[value(name = "2x6")]
    TwoColumn,
    #[value(name = "4x3")]
    FourColumn,
    #[value(name = "4x3+r")]
    FourColumnRhythm,
}

impl From<FormatArg> for DisplayFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Full => DisplayFormat::Default,
            FormatArg::TwoColumn => DisplayFormat::TwoColumn,
            FormatArg::FourColumn => DisplayFormat::FourColumn,
            FormatArg::FourColumnRhythm => DisplayFormat::FourColumnWithRhythm,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Offline driver for the ECG waveform core")]
struct Args {
    /// Waveform record as JSON; a synthetic 12-lead record is used otherwise
    #[arg(long)]
    record: Option<PathBuf>,
    /// Load a viewer config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = FormatArg::Full)]
    format: FormatArg,
    /// mm/s, or `auto`
    #[arg(long, value_parser = parse_scale)]
    speed: Option<Scale>,
    /// mm/mV, or `auto`
    #[arg(long, value_parser = parse_scale)]
    amplitude: Option<Scale>,
    /// Zoom factor, or `auto`
    #[arg(long, value_parser = parse_zoom)]
    zoom: Option<Zoom>,
    #[arg(long, value_parser = FilterPreset::from_str, default_value = "noop")]
    filter: FilterPreset,
    #[arg(long, default_value_t = 1280.0)]
    width: f64,
    #[arg(long, default_value_t = 800.0)]
    height: f64,
    /// Vertical measurement `LEAD:START:STOP[:rr|qt]`, may be repeated
    #[arg(long = "measure", value_parser = MeasureRequest::from_str)]
    measures: Vec<MeasureRequest>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Add a flagged rhythm channel to the synthetic record
    #[arg(long, default_value_t = false)]
    rhythm_channel: bool,
    /// Print the rendering model as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Keep the HTTP bridge alive after the run
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = 9000)]
    port: u16,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ViewerConfig::default(),
    };
    let record = match &args.record {
        Some(path) => load_record(path)?,
        None => build_record_from_config(&SyntheticConfig {
            seed: args.seed,
            rhythm_channel: args.rhythm_channel,
            ..SyntheticConfig::default()
        })?,
    };

    let mut display = DisplayOptions::from_config(&config);
    display.format = args.format.into();
    display.filter = args.filter;
    display.viewport = Size::new(args.width, args.height);
    if let Some(speed) = args.speed {
        display.speed = speed;
    }
    if let Some(amplitude) = args.amplitude {
        display.amplitude = amplitude;
    }
    if let Some(zoom) = args.zoom {
        display.zoom = zoom;
    }

    let runner = Runner::new(config);
    let report = runner
        .execute(&record, &display, &args.measures)
        .context("running waveform viewer")?;

    let summary = &report.summary;
    println!(
        "{} record -> {} channels, {} samples @ {} Hz ({} s), {} mV cells, standard leads: {}",
        summary.modality,
        summary.channels,
        summary.samples_per_channel,
        summary.sample_rate,
        summary.seconds,
        summary.millivolt_cells,
        summary.standard_leads
    );
    if let Some(preferred) = &report.model.layout.preferred {
        println!(
            "layout {:?}: {:.0}x{:.0} px, {} mm/s, {} mm/mV, zoom {:.2}",
            report.model.layout.format,
            preferred.width,
            preferred.height,
            preferred.mm_per_second,
            preferred.mm_per_millivolt,
            preferred.zoom
        );
    }
    for annotation in &report.model.annotations.annotations {
        println!("  {}", annotation);
    }
    for interval in &report.model.annotations.committed {
        match interval.bpm {
            Some(bpm) => println!(
                "  {} interval: {} ms ({} bpm)",
                interval.kind, interval.milliseconds, bpm
            ),
            None => println!("  {} interval: {} ms", interval.kind, interval.milliseconds),
        }
    }
    for err in &report.commit_errors {
        println!("  commit rejected: {}", err);
    }
    if args.json {
        let body = serde_json::to_string_pretty(&report.model).context("serializing model")?;
        println!("{}", body);
    }

    if args.serve {
        let gui_bridge = GuiBridge::new(Arc::new(runner));
        gui_bridge.publish(&report.model);
        gui_bridge.serve(SocketAddr::from(([127, 0, 0, 1], args.port)));
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
