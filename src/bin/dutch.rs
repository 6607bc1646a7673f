use std::{error::Error, fs::OpenOptions, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

use dutch_rs::{
    GroupId, NewExpense, NewGroup, NewParticipant, ParticipantId, SpendSummary, Transfer,
    setup_logging,
    stores::{ParticipantStore, sqlite::create_app_state},
};

/// Settle shared expenses between the members of a group.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The lowest level of log messages to print. `RUST_LOG` takes precedence.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// Also write debug logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database tables.
    Init,

    /// Register a participant.
    Register {
        /// The external identity of the participant.
        #[arg(long)]
        subject: String,

        /// The display name of the participant.
        #[arg(long)]
        name: String,
    },

    /// Create a group administered by the participant registered for `subject`.
    CreateGroup {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        currency: String,

        /// Further members, in joining order.
        #[arg(long = "member")]
        members: Vec<ParticipantId>,
    },

    /// Print the groups of the participant registered for `subject`.
    Groups {
        #[arg(long)]
        subject: String,
    },

    /// Print the members of a group on behalf of a member.
    Members {
        #[arg(long)]
        group_id: GroupId,

        #[arg(long)]
        subject: String,
    },

    /// Add a participant to a group administered by `subject`.
    AddMember {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        group_id: GroupId,

        #[arg(long)]
        participant_id: ParticipantId,
    },

    /// Remove a participant from a group administered by `subject`.
    RemoveMember {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        group_id: GroupId,

        #[arg(long)]
        participant_id: ParticipantId,
    },

    /// Record an expense paid by the participant registered for `subject`.
    AddExpense {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        group_id: GroupId,

        #[arg(long)]
        amount: Decimal,

        #[arg(long)]
        currency: String,

        #[arg(long)]
        name: String,
    },

    /// Recompute and print a group's transfers and spend summaries.
    Recompute {
        #[arg(long)]
        group_id: GroupId,
    },

    /// Print a group's transfers on behalf of a member.
    Transfers {
        #[arg(long)]
        group_id: GroupId,

        #[arg(long)]
        subject: String,
    },

    /// Print a group's spend summaries on behalf of a member.
    Summaries {
        #[arg(long)]
        group_id: GroupId,

        #[arg(long)]
        subject: String,
    },
}

#[derive(Serialize)]
struct Aggregates {
    transfers: Vec<Transfer>,
    summaries: Vec<SpendSummary>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_file = args.log_file.as_ref().map(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("Could not create log file")
    });
    setup_logging(args.log_level, log_file);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let connection = Connection::open(&args.db_path)?;
    let state = create_app_state(connection)?;

    match args.command {
        Command::Init => {
            tracing::info!("initialized database at {}", args.db_path);
        }
        Command::Register { subject, name } => {
            let participant = state
                .participant_store
                .create(NewParticipant::new(&subject, &name)?)?;
            print_json(&participant)?;
        }
        Command::CreateGroup {
            subject,
            name,
            currency,
            members,
        } => {
            let admin = state.participant_store.get_by_subject(&subject)?;
            let new_group = members
                .into_iter()
                .fold(NewGroup::new(&name, admin.id, &currency)?, |group, id| {
                    group.member(id)
                });
            let group = state.group_service.create_group(&subject, new_group)?;
            print_json(&group)?;
        }
        Command::Groups { subject } => {
            let groups = state.group_service.find_groups_for_subject(&subject)?;
            print_json(&groups)?;
        }
        Command::Members { group_id, subject } => {
            let members = state.group_service.find_members(&subject, group_id)?;
            print_json(&members)?;
        }
        Command::AddMember {
            subject,
            group_id,
            participant_id,
        } => {
            let group = state
                .group_service
                .add_member(&subject, group_id, participant_id)?;
            print_json(&group)?;
        }
        Command::RemoveMember {
            subject,
            group_id,
            participant_id,
        } => {
            let group = state
                .group_service
                .remove_member(&subject, group_id, participant_id)?;
            print_json(&group)?;
        }
        Command::AddExpense {
            subject,
            group_id,
            amount,
            currency,
            name,
        } => {
            let participant = state.participant_store.get_by_subject(&subject)?;
            let expense = state.expense_service.create_expense(
                &subject,
                NewExpense {
                    group_id,
                    participant_id: participant.id,
                    amount,
                    currency,
                    name,
                },
            )?;
            print_json(&expense)?;
        }
        Command::Recompute { group_id } => {
            let transfers = state.transfer_service.recompute_transfers(group_id)?;
            let summaries = state.summary_service.recompute_summaries(group_id)?;
            print_json(&Aggregates {
                transfers,
                summaries,
            })?;
        }
        Command::Transfers { group_id, subject } => {
            let transfers = state
                .transfer_service
                .find_transfers_for_group(&subject, group_id)?;
            print_json(&transfers)?;
        }
        Command::Summaries { group_id, subject } => {
            let summaries = state
                .summary_service
                .find_summaries_for_group(&subject, group_id)?;
            print_json(&summaries)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}
