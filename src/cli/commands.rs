//! Command dispatch

use std::time::Duration;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, TraversalPlayer, TreeSession};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{format_value, ToTermTree};
use crate::config::{global_config_path, Settings};
use crate::domain::{NodeId, TraversalOrder, TreeMode, Value, Viewport, VisitPhase};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Build {
            mode,
            edges,
            layout,
            values,
        }) => {
            let settings = Settings::load(cli.config.as_deref())?;
            cmd_build(&settings, *mode, *edges, layout.as_deref(), values)
        }
        Some(Commands::Traverse {
            mode,
            order,
            delay_ms,
            values,
        }) => {
            let settings = Settings::load(cli.config.as_deref())?;
            let delay = delay_ms.unwrap_or(settings.traversal.step_delay_ms);
            cmd_traverse(&settings, *mode, *order, Duration::from_millis(delay), values)
        }
        Some(Commands::Info { mode }) => cmd_info(*mode),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `treeviz --help`".to_string(),
        )),
    }
}

/// Session in `mode` (or the configured default) holding `values`.
#[instrument(level = "debug", skip(settings))]
fn build_session(
    settings: &Settings,
    mode: Option<TreeMode>,
    values: &[Value],
) -> CliResult<TreeSession> {
    let mut session = TreeSession::from_settings(settings);
    session.set_mode(mode.unwrap_or(settings.default_mode))?;
    for &value in values {
        if session.insert(value)?.is_none() {
            output::warning(&format!("duplicate value {} skipped", format_value(value)));
        }
    }
    debug!(roots = session.roots().len(), "session built");
    Ok(session)
}

fn label(session: &TreeSession, id: NodeId) -> String {
    session
        .find(id)
        .map(|node| format_value(node.value))
        .unwrap_or_else(|| id.to_string())
}

fn cmd_build(
    settings: &Settings,
    mode: Option<TreeMode>,
    edges: bool,
    layout: Option<&[f64]>,
    values: &[Value],
) -> CliResult<()> {
    let session = build_session(settings, mode, values)?;

    output::header(&format!("{} tree", session.mode()));
    for root in session.roots() {
        output::info(&root.to_term_tree());
    }

    if edges {
        output::header("Edges");
        for edge in session.edges() {
            output::detail(&format!(
                "{} -> {}",
                label(&session, edge.parent_id),
                label(&session, edge.child_id)
            ));
        }
    }

    if let Some(dims) = layout {
        let [width, height] = dims else {
            return Err(CliError::InvalidArgs(
                "--layout takes WIDTH and HEIGHT".to_string(),
            ));
        };
        output::header(&format!("Layout {width}x{height}"));
        for placement in session.layout(&Viewport::sized(*width, *height)) {
            output::detail(&format!(
                "{:>8}  top {:>7.1}  left {:>7.1}",
                label(&session, placement.id),
                placement.top,
                placement.left
            ));
        }
    }
    Ok(())
}

fn cmd_traverse(
    settings: &Settings,
    mode: Option<TreeMode>,
    order: TraversalOrder,
    delay: Duration,
    values: &[Value],
) -> CliResult<()> {
    let session = build_session(settings, mode, values)?;
    let visits: Vec<_> = session
        .traversal(order)
        .into_iter()
        .filter(|event| event.phase == VisitPhase::Visit)
        .collect();
    output::header(&format!("{order} traversal"));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| ApplicationError::Animation {
            message: format!("start runtime: {e}"),
        })?;

    let visited: Vec<String> = runtime.block_on(async {
        let mut player = TraversalPlayer::new();
        let mut rx = player.play(visits, delay)?;
        let mut visited = Vec::new();
        while let Some(event) = rx.recv().await {
            let value = label(&session, event.id);
            output::step(visited.len() + 1, &value);
            visited.push(value);
        }
        Ok::<_, ApplicationError>(visited)
    })?;

    output::action("Order", &visited.iter().join(" -> "));
    Ok(())
}

fn cmd_info(mode: Option<TreeMode>) -> CliResult<()> {
    let modes = match mode {
        Some(mode) => vec![mode],
        None => TreeMode::ALL.to_vec(),
    };
    for mode in modes {
        output::header(mode.title());
        for line in mode.description() {
            output::detail(line);
        }
        output::info(&format!(
            "  {:<8} {:<32} {:<32} {}",
            "", "Average", "Worst", ""
        ));
        for row in mode.complexity() {
            output::info(&format!(
                "  {:<8} {:<32} {:<32} {}",
                row.operation, row.average, row.worst, row.measure
            ));
        }
        output::info("");
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(no config directory)".to_string());
            output::action("Global", &global);
            if let Some(path) = &cli.config {
                output::action("File", &path.display());
            }
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
