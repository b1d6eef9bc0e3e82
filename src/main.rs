//! # ztl CLI
//!
//! Command-line interface for the ztl Zettelkasten manager.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use ztl::{
    commands::{
        self,
        link::LinkListArgs,
        source::SourceArgs,
        sync::SyncAction,
        ListArgs, NewArgs,
    },
    constants::{DEFAULT_PAGE_SIZE, LOG_ENV_VAR},
    index::SourceType,
    lifecycle::SourcePatch,
    note::NoteType,
};

const GLOBAL_HELP: &str = "\
Note Types:
  fleeting     Quick captures, meant to be processed later
  literature   Notes taken while reading a source
  permanent    Atomic, self-contained ideas
  index        Entry points into a topic (may cite a book: --book)
  structure    Outlines that arrange other notes
  task         Notes with a status (Not started, In progress, Waiting, On hold, Done)

Linking:
  Write [any text](<note-id>.md) in a note body to link it to another note.
  The link graph is rebuilt from the files on every `ztl link list`.

Getting Started:
  ztl init                              Write the config and create directories
  ztl permanent new \"Spaced repetition\" Create a note
  ztl permanent list                    List live permanent notes
  ztl permanent edit n001               Open a note in your editor

Environment:
  ZTL_CONFIG   Path of the configuration file
  ZTL_LOG      Log filter (e.g. debug, ztl::sync=info)";

#[derive(Parser)]
#[command(name = "ztl")]
#[command(author = "Dominic Rodemer")]
#[command(version)]
#[command(about = "Zettelkasten notes in plain Markdown, with tags, links, sources and sync")]
#[command(
    long_about = "ztl manages a Zettelkasten: typed notes stored as Markdown files with YAML \
front matter, plus a set of JSON indexes for tags, links, sources, projects and tasks.\n\n\
Notes move between three places: the working directory (live), the archive and the trash. \
Trashed notes and edit backups are purged after a configurable number of days. \
The working directory and the indexes can be mirrored to a remote store with `ztl sync`."
)]
#[command(after_help = GLOBAL_HELP)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the configuration file and create all directories
    #[command(
        long_about = "Write the configuration file and create the note, archive, trash, backup \
and index directories.\n\n\
Refuses to run when a configuration already exists. With --force the existing file is \
rewritten (keeping its values) and missing directories are created.",
        after_help = "Examples:\n  \
ztl init\n  \
ZTL_CONFIG=~/notes/ztl.toml ztl init\n  \
ztl init --force"
    )]
    Init {
        /// Rewrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Edit the configuration interactively
    Config,

    /// Fleeting notes
    #[command(subcommand)]
    Fleeting(NoteAction),

    /// Literature notes
    #[command(subcommand)]
    Literature(NoteAction),

    /// Permanent notes
    #[command(subcommand)]
    Permanent(NoteAction),

    /// Index notes
    #[command(subcommand)]
    Index(NoteAction),

    /// Structure notes
    #[command(subcommand)]
    Structure(NoteAction),

    /// Task notes and their status
    #[command(subcommand)]
    Task(TaskAction),

    /// Tags on notes
    #[command(subcommand)]
    Tag(TagAction),

    /// Links between notes
    #[command(subcommand)]
    Link(LinkAction),

    /// Bibliographic sources
    #[command(subcommand)]
    Source(SourceAction),

    /// Projects grouping notes
    #[command(subcommand)]
    Project(ProjectAction),

    /// Mirror notes and indexes to the configured remote
    #[command(
        subcommand,
        long_about = "Mirror the working directory and the JSON indexes to the remote store \
configured under [sync].\n\n\
Each side keeps a manifest of modification times. Push uploads files that are newer \
locally, pull downloads files that are newer remotely. When a file changed on both \
machines the newer copy wins."
    )]
    Sync(SyncCommand),

    /// Generate shell completion scripts
    #[command(after_help = "Examples:\n  \
ztl completions bash > ~/.local/share/bash-completion/completions/ztl\n  \
ztl completions zsh > ~/.zfunc/_ztl\n  \
ztl completions fish > ~/.config/fish/completions/ztl.fish")]
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Operations shared by every note type.
#[derive(Subcommand)]
enum NoteAction {
    /// Create a note and print its id and path
    New {
        /// Title of the note
        title: String,

        /// Tag for the note (can be repeated)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Source id the note is about (index notes only)
        #[arg(long)]
        book: Option<String>,
    },

    /// List notes
    #[command(after_help = "Examples:\n  \
ztl permanent list -t memory -t learning\n  \
ztl permanent list -q \"spaced repetition\" --from 2024-01-01\n  \
ztl fleeting list --trash\n  \
ztl task list --status in-progress --limit -1")]
    List(ListOpts),

    /// Show a note's metadata and content
    Show {
        /// Note id (e.g. n001)
        seq_id: String,

        /// Only print metadata
        #[arg(long)]
        meta: bool,
    },

    /// Open a note in the configured editor
    Edit {
        /// Note id (e.g. n001)
        seq_id: String,
    },

    /// Move a note to the trash, or delete it for good with --force
    Remove {
        /// Note id (e.g. n001)
        seq_id: String,

        /// Delete the file and every index entry instead of trashing
        #[arg(short, long)]
        force: bool,
    },

    /// Move a note to the archive
    Archive {
        /// Note id (e.g. n001)
        seq_id: String,
    },

    /// Move a note back into the working directory
    Restore {
        /// Note id (e.g. n001)
        seq_id: String,

        /// Restore from the trash
        #[arg(long)]
        trash: bool,

        /// Restore from the archive
        #[arg(long)]
        archive: bool,
    },
}

#[derive(Args)]
struct ListOpts {
    /// Only notes carrying one of these tags (can be repeated)
    #[arg(short, long = "tag")]
    tags: Vec<String>,

    /// Created on or after this date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Created on or before this date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Case-insensitive text search in title and body
    #[arg(short, long)]
    query: Option<String>,

    /// Rows per page (-1 shows everything)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, allow_negative_numbers = true)]
    limit: i64,

    /// List trashed notes
    #[arg(long)]
    trash: bool,

    /// List archived notes
    #[arg(long)]
    archive: bool,

    /// Task status filter (task notes only)
    #[arg(long)]
    status: Option<String>,
}

impl From<ListOpts> for ListArgs {
    fn from(opts: ListOpts) -> Self {
        Self {
            tags: opts.tags,
            from: opts.from,
            to: opts.to,
            query: opts.query,
            limit: opts.limit,
            trash: opts.trash,
            archive: opts.archive,
            status: opts.status,
        }
    }
}

#[derive(Subcommand)]
enum TaskAction {
    #[command(flatten)]
    Note(NoteAction),

    /// Set the status of a task
    Update {
        /// Task id (e.g. task-001)
        task_id: String,

        /// Status, e.g. "In progress" or in-progress
        status: String,
    },
}

#[derive(Subcommand)]
enum TagAction {
    /// Add a tag to a note
    Add { seq_id: String, tag: String },

    /// Remove a tag from a note
    Remove { seq_id: String, tag: String },

    /// List tags with their usage count
    List {
        /// Only tags containing this text
        #[arg(short, long)]
        query: Option<String>,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, allow_negative_numbers = true)]
        limit: i64,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Rebuild the link graph and list edges
    List {
        /// Only edges where either note carries this tag
        #[arg(long)]
        tag: Option<String>,

        /// Only edges where either title contains this text
        #[arg(short, long)]
        query: Option<String>,

        /// Hide notes without links
        #[arg(long)]
        only_linked: bool,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, allow_negative_numbers = true)]
        limit: i64,
    },

    /// Rebuild the link graph from the note files
    Rebuild,
}

#[derive(Args)]
struct SourceFields {
    /// Author(s)
    #[arg(long)]
    author: Option<String>,

    #[arg(long)]
    publisher: Option<String>,

    /// Publication year
    #[arg(long, allow_negative_numbers = true)]
    year: Option<i32>,

    #[arg(long)]
    isbn: Option<String>,

    #[arg(long)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum SourceAction {
    /// Register a source
    New {
        /// book, web, paper or video
        #[arg(long = "type", value_enum)]
        source_type: SourceType,

        #[arg(long)]
        title: String,

        #[command(flatten)]
        fields: SourceFields,
    },

    /// List sources
    List {
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, allow_negative_numbers = true)]
        limit: i64,
    },

    /// Show a source and the notes citing it
    Show { source_id: String },

    /// Update the given fields of a source
    Edit {
        source_id: String,

        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: SourceFields,
    },

    /// Attach a note to a source
    AddNote { seq_id: String, source_id: String },

    /// Detach a note from a source
    RemoveNote { seq_id: String, source_id: String },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Create a project
    New { name: String },

    /// Add a note to a project
    Add { seq_id: String, project_id: String },

    /// List projects with their note count
    List,

    /// Show the notes of a project
    Show { project_id: String },
}

#[derive(Subcommand)]
enum SyncCommand {
    /// Upload files that are newer locally
    Push,
    /// Download files that are newer remotely
    Pull,
    /// Show what push and pull would transfer
    Status,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli.command) {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

/// Logs go to stderr; `ZTL_LOG` (then `RUST_LOG`) overrides `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Init { force } => commands::init(force),
        Commands::Config => commands::config(),

        Commands::Fleeting(action) => run_note(NoteType::Fleeting, action),
        Commands::Literature(action) => run_note(NoteType::Literature, action),
        Commands::Permanent(action) => run_note(NoteType::Permanent, action),
        Commands::Index(action) => run_note(NoteType::Index, action),
        Commands::Structure(action) => run_note(NoteType::Structure, action),
        Commands::Task(TaskAction::Note(action)) => run_note(NoteType::Task, action),
        Commands::Task(TaskAction::Update { task_id, status }) => {
            commands::task::execute_update(&task_id, &status)
        }

        Commands::Tag(action) => match action {
            TagAction::Add { seq_id, tag } => commands::tag::execute_add(&seq_id, &tag),
            TagAction::Remove { seq_id, tag } => commands::tag::execute_remove(&seq_id, &tag),
            TagAction::List { query, limit } => {
                commands::tag::execute_list(query.as_deref(), limit)
            }
        },

        Commands::Link(action) => match action {
            LinkAction::List {
                tag,
                query,
                only_linked,
                limit,
            } => commands::link::execute_list(&LinkListArgs {
                tag,
                query,
                only_linked,
                limit,
            }),
            LinkAction::Rebuild => commands::link::execute_rebuild(),
        },

        Commands::Source(action) => run_source(action),

        Commands::Project(action) => match action {
            ProjectAction::New { name } => commands::project::execute_new(&name),
            ProjectAction::Add { seq_id, project_id } => {
                commands::project::execute_add(&seq_id, &project_id)
            }
            ProjectAction::List => commands::project::execute_list(),
            ProjectAction::Show { project_id } => commands::project::execute_show(&project_id),
        },

        Commands::Sync(action) => commands::sync::execute(match action {
            SyncCommand::Push => SyncAction::Push,
            SyncCommand::Pull => SyncAction::Pull,
            SyncCommand::Status => SyncAction::Status,
        }),

        Commands::Completions { shell } => commands::completions::execute(shell, &mut Cli::command()),
    }
}

fn run_note(note_type: NoteType, action: NoteAction) -> Result<()> {
    match action {
        NoteAction::New { title, tags, book } => {
            commands::new(note_type, NewArgs { title, tags, book })
        }
        NoteAction::List(opts) => commands::list(note_type, &opts.into()),
        NoteAction::Show { seq_id, meta } => commands::show(note_type, &seq_id, meta),
        NoteAction::Edit { seq_id } => commands::edit(note_type, &seq_id),
        NoteAction::Remove { seq_id, force } => commands::remove(note_type, &seq_id, force),
        NoteAction::Archive { seq_id } => commands::archive(note_type, &seq_id),
        NoteAction::Restore {
            seq_id,
            trash,
            archive,
        } => commands::restore(note_type, &seq_id, trash, archive),
    }
}

fn run_source(action: SourceAction) -> Result<()> {
    use commands::source;

    match action {
        SourceAction::New {
            source_type,
            title,
            fields,
        } => source::execute_new(SourceArgs {
            source_type,
            title,
            author: fields.author,
            publisher: fields.publisher,
            year: fields.year,
            isbn: fields.isbn,
            url: fields.url,
        }),
        SourceAction::List { limit } => source::execute_list(limit),
        SourceAction::Show { source_id } => source::execute_show(&source_id),
        SourceAction::Edit {
            source_id,
            title,
            fields,
        } => source::execute_edit(
            &source_id,
            SourcePatch {
                title,
                author: fields.author,
                publisher: fields.publisher,
                year: fields.year,
                isbn: fields.isbn,
                url: fields.url,
            },
        ),
        SourceAction::AddNote { seq_id, source_id } => source::execute_add_note(&seq_id, &source_id),
        SourceAction::RemoveNote { seq_id, source_id } => {
            source::execute_remove_note(&seq_id, &source_id)
        }
    }
}
