// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and prints results. All work is
// delegated to Layer 2 (application).
//
//   1. `train`   — trains a ResNet on an image folder
//   2. `predict` — classifies one image with a checkpoint
//   3. `summary` — prints a network's layout and size
//
// Reference: Rust Book §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::path::Path;

use commands::{resolve_device, Commands, PredictArgs, SummaryArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "resnet-trainer",
    version = "0.1.0",
    about = "Train residual image classifiers with Burn, then classify images."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
            Commands::Summary(args) => run_summary(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let report = TrainUseCase::new(args.into()).execute()?;

    match &report.last_epoch {
        Some(m) => println!(
            "Finished Training: {} epochs, last epoch mean loss {:.4}",
            report.epochs,
            m.mean_loss()
        ),
        None => println!("Finished Training: 0 epochs"),
    }
    println!("Parameters saved to {}", report.params_path.display());
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case   = PredictUseCase::new(&args.model, resolve_device(args.device));
    let prediction = use_case.classify(Path::new(&args.image))?;

    println!(
        "{} (class {}, p = {:.4})",
        prediction.class_name, prediction.label, prediction.probability
    );
    Ok(())
}

fn run_summary(args: SummaryArgs) -> Result<()> {
    use crate::application::summary_use_case::SummaryUseCase;
    use crate::application::train_use_case::TrainConfig;

    let config = TrainConfig {
        preset:      args.arch.into(),
        num_classes: args.num_classes,
        base_width:  args.base_width,
        ..TrainConfig::default()
    }
    .model_config();

    let summary = SummaryUseCase::new(config).execute()?;

    println!("{:?}: {} blocks, {} classes", args.arch, summary.plan.block, summary.plan.num_classes);
    for line in summary.stage_lines() {
        println!("  {line}");
    }
    println!("Weighted layers: {}", summary.weighted_layers);
    println!("Projections:     {}", summary.projections);
    println!("Output stride:   {}", summary.output_stride);
    println!("Parameters:      {}", summary.parameters);
    Ok(())
}
