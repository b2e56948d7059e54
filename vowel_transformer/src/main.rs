use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dialoguer::Input;
use tracing_subscriber::EnvFilter;

use audio_device::{Microphone, Speaker};
use lpc_model::{ArModel, Method, Window};
use vowel_converter::{
    run_pipeline, BoxError, ConverterConfig, SignalSink, SignalSource, VowelConverter, WavSink, WavSource,
    Waveform,
};

/// Number of envelope bins formants are picked from in debug output
const FORMANT_POINTS: usize = 512;

/// Vowel Transformer - give a recorded vowel the formants of another vowel using AR modeling
#[derive(Parser, Debug)]
#[command(name = "vowel-transformer", version, about)]
struct Cli {
    /// WAV file whose formants the output takes on
    #[arg(short, long, env = "VOWEL_TARGET", default_value = "Oving8/a.wav")]
    target: PathBuf,

    /// Transform this WAV file instead of recording from the microphone
    #[arg(short, long, env = "VOWEL_SOURCE")]
    source: Option<PathBuf>,

    /// Recording length in seconds
    #[arg(short, long, env = "VOWEL_DURATION", default_value_t = 2.0)]
    duration: f64,

    /// Sample rate for recording, analysis and playback
    #[arg(short, long, env = "VOWEL_RATE", default_value_t = vowel_converter::config::DEFAULT_SAMPLE_RATE)]
    rate: u32,

    /// AR model order
    #[arg(long, env = "VOWEL_ORDER", default_value_t = vowel_converter::config::DEFAULT_ORDER)]
    order: usize,

    /// Estimation method (autocorrelation, covariance)
    #[arg(long, env = "VOWEL_METHOD", default_value_t = Method::Autocorrelation)]
    method: Method,

    /// Analysis window (rectangular, hamming, blackman-harris)
    #[arg(long, env = "VOWEL_WINDOW", default_value_t = Window::Rectangular)]
    window: Window,

    /// Also save the transformed vowel to this WAV file
    #[arg(short, long, env = "VOWEL_OUTPUT")]
    output: Option<PathBuf>,

    /// Don't play the recording or the result
    #[arg(long)]
    no_playback: bool,

    /// Start recording without waiting for Enter
    #[arg(short, long)]
    yes: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn converter_config(&self) -> ConverterConfig {
        ConverterConfig {
            sample_rate: self.rate,
            order: self.order,
            method: self.method,
            window: self.window,
            ..ConverterConfig::default()
        }
    }
}

/// Plays the converted vowel and optionally saves it
struct ResultSink {
    speaker: Option<Speaker>,
    file: Option<WavSink>,
}

impl SignalSink for ResultSink {
    fn render(&mut self, waveform: &Waveform) -> Result<(), BoxError> {
        if let Some(file) = self.file.as_mut() {
            file.render(waveform)?;
        }
        if let Some(speaker) = self.speaker.as_mut() {
            println!("Playing transformed version...");
            speaker.render(waveform)?;
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn,vowel_transformer=info",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let converter = VowelConverter::new(cli.converter_config())?;
    tracing::info!(
        target_file = %cli.target.display(),
        rate = cli.rate,
        order = cli.order,
        method = %cli.method,
        window = %cli.window,
        "starting vowel transformer"
    );

    println!("=== Vowel Transformer ===");
    let mut source = acquire_source(cli)?;
    if !cli.no_playback {
        println!("Playing back your recording...");
        Speaker.render(&source).map_err(|e| anyhow::anyhow!(e))?;
    }

    let mut target = WavSource::new(&cli.target, cli.rate);
    let mut sink = ResultSink {
        speaker: (!cli.no_playback).then_some(Speaker),
        file: cli.output.as_ref().map(WavSink::new),
    };

    println!("Transforming your vowel...");
    let conversion = run_pipeline(&mut source, &mut target, &converter, &mut sink)?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        let rate = f64::from(cli.rate);
        log_formants("source", &conversion.source_model, rate);
        log_formants("target", &conversion.target_model, rate);
        match converter.analyze(&conversion.waveform) {
            Ok(model) => log_formants("converted", &model, rate),
            Err(e) => tracing::debug!(error = %e, "could not model converted vowel"),
        }
    }
    if let Some(path) = &cli.output {
        println!("Saved transformed vowel to {}", path.display());
    }
    Ok(())
}

fn acquire_source(cli: &Cli) -> anyhow::Result<Waveform> {
    if let Some(path) = &cli.source {
        println!("Loading source vowel from {}", path.display());
        return WavSource::new(path, cli.rate)
            .acquire()
            .map_err(|e| anyhow::anyhow!(e));
    }

    if !cli.yes {
        let _: String = Input::new()
            .with_prompt(format!(
                "Press Enter to start recording your vowel (say 'aaaa' for {} seconds)",
                cli.duration
            ))
            .allow_empty(true)
            .interact_text()?;
    }
    println!("Recording for {} seconds...", cli.duration);
    let recording = Microphone::new(cli.duration, cli.rate)
        .acquire()
        .map_err(|e| anyhow::anyhow!(e))?;
    println!("Recording finished!");
    Ok(recording)
}

fn log_formants(role: &str, model: &ArModel, sample_rate: f64) {
    tracing::debug!(
        role,
        stable = model.is_stable(),
        formants = ?model.formants(sample_rate, FORMANT_POINTS),
        "estimated formants"
    );
}
