//! Extract text from a raw content stream
//!
//! Reads an already decoded content stream from a file and interprets it
//! with a fixed-width Latin font standing in for every font the stream
//! selects.
//!
//! Usage:
//!   cargo run --bin extract_content_text -- page.content
//!   cargo run --bin extract_content_text -- page.content --events
//!   cargo run --bin extract_content_text -- page.content --markup
//!   cargo run --bin extract_content_text -- page.content --space-ratio 0.3 --skip-invisible

use pdf_textflow::content::{CollectingListener, ContentProcessor, parse_content_stream};
use pdf_textflow::fonts::{BaseEncoding, Font, SimpleFont};
use pdf_textflow::geometry::Point;
use pdf_textflow::resources::Resources;
use pdf_textflow::{
    MarkedContentExtractor, ProcessorConfig, SimpleTextExtractor, TextExtractionOptions,
    TextRenderInfo,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

struct CliConfig {
    input: Option<PathBuf>,
    events: bool,
    markup: bool,
    options: TextExtractionOptions,
    processor: ProcessorConfig,
}

impl CliConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self {
            input: None,
            events: false,
            markup: false,
            options: TextExtractionOptions::default(),
            processor: ProcessorConfig::default(),
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--events" => config.events = true,
                "--markup" => config.markup = true,
                "--skip-invisible" => config.options.skip_invisible = true,
                "--no-forms" => config.processor.process_forms = false,
                "--space-ratio" => {
                    i += 1;
                    config.options.space_ratio = parse_value(&args, i, "--space-ratio")?;
                },
                "--line-threshold" => {
                    i += 1;
                    config.options.line_break_threshold =
                        parse_value(&args, i, "--line-threshold")?;
                },
                "--max-operations" => {
                    i += 1;
                    config.processor.max_operations =
                        Some(parse_value(&args, i, "--max-operations")?);
                },
                flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
                path => config.input = Some(PathBuf::from(path)),
            }
            i += 1;
        }

        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    args.get(i)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("{} needs a numeric value", flag))
}

/// Map every font name selected by `Tf` to a 600-unit WinAnsi font.
fn stand_in_resources(content: &[u8]) -> Resources {
    let names: BTreeSet<String> = parse_content_stream(content)
        .into_iter()
        .filter(|op| op.operator == "Tf")
        .filter_map(|op| op.operands.first().and_then(|o| o.as_name()).map(str::to_string))
        .collect();

    let font: Arc<dyn Font> =
        Arc::new(SimpleFont::new("Courier", BaseEncoding::WinAnsi).with_default_width(600.0));
    names
        .into_iter()
        .fold(Resources::new(), |resources, name| resources.with_font(name, Arc::clone(&font)))
}

#[derive(Serialize)]
struct EventRecord<'a> {
    text: &'a str,
    font: Option<&'a str>,
    font_size: f32,
    render_mode: u8,
    baseline_start: Point,
    baseline_end: Point,
    single_space_width: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    mcid: Option<i64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    artifact: bool,
}

impl<'a> From<&'a TextRenderInfo> for EventRecord<'a> {
    fn from(info: &'a TextRenderInfo) -> Self {
        Self {
            text: info.text(),
            font: info.graphics_state().font_name(),
            font_size: info.font_size(),
            render_mode: info.render_mode().code(),
            baseline_start: info.baseline_start(),
            baseline_end: info.baseline_end(),
            single_space_width: info.single_space_width(),
            mcid: info.mcid(),
            artifact: info.is_artifact(),
        }
    }
}

fn run(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let input = config
        .input
        .as_ref()
        .ok_or("usage: extract_content_text <content-file> [--events] [options]")?;
    let content = std::fs::read(input)?;
    let resources = Arc::new(stand_in_resources(&content));
    log::info!(
        "Read {} bytes, {} fonts selected",
        content.len(),
        resources.font_names().count()
    );

    if config.events {
        let mut processor =
            ContentProcessor::new(CollectingListener::new()).with_config(config.processor.clone());
        processor.process(&content, resources)?;
        for info in &processor.listener().events {
            println!("{}", serde_json::to_string(&EventRecord::from(info))?);
        }
    } else if config.markup {
        let extractor =
            MarkedContentExtractor::with_options(config.options.clone()).with_markup(true);
        let mut processor =
            ContentProcessor::new(extractor).with_config(config.processor.clone());
        processor.process(&content, resources)?;
        println!("{}", processor.listener().text());
    } else {
        let mut processor =
            ContentProcessor::new(SimpleTextExtractor::with_options(config.options.clone()))
                .with_config(config.processor.clone());
        processor.process(&content, resources)?;
        println!("{}", processor.listener().text());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let config = match CliConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        },
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
