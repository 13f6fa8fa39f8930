/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Command line access to the canvas store: list and manage projects and
//! inspect the persisted workspace without a window system.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use bpaf::Bpaf;
use canvasshell::model::ProjectId;
use canvasshell::prefs::CanvasPreferences;
use canvasshell::{CanvasApp, VERSION};
use log::error;
use time::OffsetDateTime;
use time::macros::format_description;

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version(VERSION))]
struct Options {
    /// Directory holding the canvas store
    #[bpaf(long("data-dir"), argument("DIR"))]
    data_dir: Option<PathBuf>,
    /// Preferences file, defaults to the platform config directory
    #[bpaf(long, argument("FILE"))]
    config: Option<PathBuf>,
    /// Log filter, e.g. "canvasshell=debug"
    #[bpaf(long("log-filter"), argument("FILTER"))]
    log_filter: Option<String>,
    #[bpaf(external(cli_command))]
    command: CliCommand,
}

#[derive(Debug, Clone, Bpaf)]
enum CliCommand {
    /// Manage saved projects
    #[bpaf(command)]
    Projects {
        #[bpaf(external(project_command))]
        action: ProjectCommand,
    },
    /// Inspect the persisted workspace
    #[bpaf(command)]
    Workspace {
        #[bpaf(external(workspace_command))]
        action: WorkspaceCommand,
    },
}

#[derive(Debug, Clone, Bpaf)]
enum ProjectCommand {
    /// List saved projects in creation order
    #[bpaf(command)]
    List,
    /// Create a project and make it the open one
    #[bpaf(command)]
    Create {
        #[bpaf(positional("NAME"))]
        name: String,
    },
    /// Open a saved project in the workspace
    #[bpaf(command)]
    Open {
        #[bpaf(positional("ID"))]
        id: ProjectId,
    },
    /// Rename a project
    #[bpaf(command)]
    Rename {
        #[bpaf(positional("ID"))]
        id: ProjectId,
        #[bpaf(positional("NAME"))]
        name: String,
    },
    /// Copy a project under a new id
    #[bpaf(command)]
    Duplicate {
        #[bpaf(positional("ID"))]
        id: ProjectId,
    },
    /// Delete a project
    #[bpaf(command)]
    Delete {
        #[bpaf(positional("ID"))]
        id: ProjectId,
    },
}

#[derive(Debug, Clone, Bpaf)]
enum WorkspaceCommand {
    /// Print the live windows and history depth
    #[bpaf(command)]
    Show,
    /// Save the live layout into the open project
    #[bpaf(command)]
    Save,
}

fn main() -> ExitCode {
    let options = options().run();
    init_tracing(options.log_filter.as_deref());

    let prefs_path = options
        .config
        .clone()
        .unwrap_or_else(CanvasPreferences::default_path);
    let mut prefs = CanvasPreferences::load_or_default(&prefs_path);
    if let Some(dir) = options.data_dir {
        prefs.data_dir = Some(dir);
    }

    let mut app = CanvasApp::new(prefs);
    if !app.has_persistence() {
        error!("Canvas store unavailable; nothing to do");
        return ExitCode::FAILURE;
    }

    match run(&mut app, options.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        },
    }
}

fn run(app: &mut CanvasApp, command: CliCommand) -> Result<(), String> {
    let now = Instant::now();
    match command {
        CliCommand::Projects { action } => match action {
            ProjectCommand::List => {
                let current = app.current_project_id();
                for project in app.projects().list() {
                    let marker = if Some(project.id) == current { "*" } else { " " };
                    println!(
                        "{marker} {}  {:<24} {:>3} windows  {}",
                        project.id,
                        project.name,
                        project.windows.len(),
                        format_millis(project.last_modified_at)
                    );
                }
                Ok(())
            },
            ProjectCommand::Create { name } => {
                let id = app.create_project(&name, now);
                println!("{id}");
                Ok(())
            },
            ProjectCommand::Open { id } => app
                .open_project(id, now)
                .then_some(())
                .ok_or_else(|| format!("No project {id}")),
            ProjectCommand::Rename { id, name } => app
                .rename_project(id, &name)
                .then_some(())
                .ok_or_else(|| format!("No project {id}")),
            ProjectCommand::Duplicate { id } => {
                let copy = app
                    .duplicate_project(id)
                    .ok_or_else(|| format!("No project {id}"))?;
                println!("{copy}");
                Ok(())
            },
            ProjectCommand::Delete { id } => app
                .delete_project(id)
                .then_some(())
                .ok_or_else(|| format!("No project {id}")),
        },
        CliCommand::Workspace { action } => match action {
            WorkspaceCommand::Show => {
                show_workspace(app);
                Ok(())
            },
            WorkspaceCommand::Save => app
                .save_current_project()
                .then_some(())
                .ok_or_else(|| "No open project, or the canvas is empty".to_string()),
        },
    }
}

fn show_workspace(app: &CanvasApp) {
    let state = app.state();
    println!("Project: {}", app.current_project_name());
    println!(
        "Zoom {:.2}, pan ({:.0}, {:.0}); {} undo / {} redo",
        state.canvas.zoom,
        state.canvas.pan_x,
        state.canvas.pan_y,
        app.history().past_len(),
        app.history().future_len()
    );
    for window in state.windows_by_z().into_iter().rev() {
        let rect = window.rect();
        let active = if Some(window.id) == state.active_window_id { "*" } else { " " };
        println!(
            "{active} {:<20} {:>6.0},{:<6.0} {:>5.0}x{:<5.0} z={} tabs={}",
            window.name,
            rect.origin.x,
            rect.origin.y,
            rect.size.width,
            rect.size.height,
            window.z_index,
            window.tabs.len()
        );
        for (index, tab) in window.tabs.iter().enumerate() {
            let marker = if index == window.active_tab_index { ">" } else { " " };
            println!("    {marker} {}", tab.url);
        }
    }
}

fn format_millis(millis: u64) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|t| t.format(format).ok())
        .unwrap_or_else(|| millis.to_string())
}

#[cfg(feature = "tracing")]
fn init_tracing(filter: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let filter = filter
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Failed to initialize tracing: {e}");
    }
}

#[cfg(not(feature = "tracing"))]
fn init_tracing(_filter: Option<&str>) {}
