//! Run command - automatic mode over a local document

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use tracing::{info, warn};

use crate::domain::{
    Artifact, ArtifactFormat, ChainController, Credentials, Document, InstructionMode,
    StepIndex, WorkflowState,
};

/// Arguments for the run command
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Document to analyze
    #[arg(long, short)]
    pub document: PathBuf,

    /// Gemini API key (falls back to configuration)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Artifact destination; stdout when omitted
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Artifact format
    #[arg(long, value_enum, default_value_t = FormatArg::Json)]
    pub format: FormatArg,

    /// Override the instruction mode of every step
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Text,
}

impl From<FormatArg> for ArtifactFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => ArtifactFormat::Json,
            FormatArg::Text => ArtifactFormat::Text,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    Continuation,
    InjectedContext,
}

impl From<ModeArg> for InstructionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Continuation => InstructionMode::Continuation,
            ModeArg::InjectedContext => InstructionMode::InjectedContext,
        }
    }
}

/// Run the full chain and write the artifact
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = super::bootstrap()?;

    if let Some(mode) = args.mode {
        for step in &mut config.chain.steps {
            step.mode = mode.into();
        }
    }

    let api_key = args
        .api_key
        .clone()
        .or_else(|| config.gemini.resolve_api_key())
        .context("No API key: pass --api-key or set GEMINI_API_KEY")?;

    let document = Document::from_path(&args.document)
        .await
        .with_context(|| format!("Failed to read {}", args.document.display()))?;

    let controller = crate::build_controller(&config)?;
    let state = WorkflowState::new()
        .with_credentials(Credentials::new(api_key)?)
        .with_document(document);

    let artifact = execute(&controller, &state, args.format.into()).await?;

    emit_artifact(&artifact, args.output.as_deref(), &mut std::io::stdout()).await
}

/// Write the artifact to `output`, or to `stdout` when no path is given
async fn emit_artifact<W: Write>(
    artifact: &Artifact,
    output: Option<&Path>,
    stdout: &mut W,
) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, &artifact.content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Artifact written");
        }
        None => {
            writeln!(stdout, "{}", artifact.content)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Drive every step and package the final result
async fn execute(
    controller: &ChainController,
    state: &WorkflowState,
    format: ArtifactFormat,
) -> anyhow::Result<Artifact> {
    let finished = match controller.run_chain(state).await {
        Ok(finished) => finished,
        Err(err) => {
            for step in StepIndex::all().filter(|s| err.state.is_complete(*s)) {
                warn!(step = step.get(), "Completed before failure");
            }
            return Err(err.into());
        }
    };

    for step in StepIndex::all() {
        let title = &controller.definition(step).title;
        let len = finished.result(step).map(str::len).unwrap_or_default();
        info!(step = step.get(), title = %title, result_len = len, "Step result");
    }

    Artifact::from_state(&finished, format).context("Chain finished without a final result")
}
