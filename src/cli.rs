//! This module contains the command-line interface [`Cli`] parser for recording and reviewing
//! student attendance.

use crate::models::Role;
use clap::{Parser, Subcommand};

/// The command line configuration struct, where the command-line interface parser is automatically
/// derived by [`clap::Parser`].
#[derive(Parser, Debug)]
#[command(name = "attendance", version, about = "Track school attendance")]
pub struct Cli {
    /// The email of the user to act as.
    #[arg(long = "as", global = true, value_name = "EMAIL")]
    pub actor: Option<String>,

    /// The different commands available for recording and reviewing attendance.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up the user behind an email address.
    SignIn,

    /// Show a class roster with everyone's status for a day.
    Roster {
        #[arg(long)]
        class: String,
        /// Date in YYYY-MM-DD form. Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Mark one student present, absent or late.
    Mark {
        #[arg(long)]
        class: String,
        #[arg(long)]
        student: String,
        /// One of present, absent or late.
        #[arg(long)]
        status: String,
        /// Date in YYYY-MM-DD form. Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Show a student's attendance records and summary.
    History {
        /// Defaults to the signed-in user.
        #[arg(long)]
        student: Option<String>,
        #[arg(long)]
        class: Option<String>,
    },

    /// Show per-day attendance counts for the last few days.
    Trend {
        /// Defaults to the signed-in user.
        #[arg(long)]
        student: Option<String>,
        #[arg(long)]
        class: Option<String>,
        /// How many days to cover. Defaults to the configured `history_days`.
        #[arg(long)]
        days: Option<u32>,
        /// Last day covered, in YYYY-MM-DD form. Defaults to today.
        #[arg(long)]
        until: Option<String>,
    },

    /// List the classes relevant to the signed-in user.
    MyClasses,

    /// Add a user.
    AddUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = parse_role)]
        role: Role,
    },

    /// Add a class.
    AddClass {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        teacher: String,
    },

    /// Enroll a student in a class.
    Enroll {
        #[arg(long)]
        student: String,
        #[arg(long)]
        class: String,
    },

    /// List every user.
    Users,

    /// List every class.
    Classes,

    /// Show school-wide totals.
    Overview,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse().map_err(|err: crate::AttendanceError| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_a_mark() {
        let cli = Cli::parse_from([
            "attendance",
            "--as",
            "t@school.test",
            "mark",
            "--class",
            "c1",
            "--student",
            "s1",
            "--status",
            "late",
            "--date",
            "2024-01-15",
        ]);

        assert_eq!(cli.actor.as_deref(), Some("t@school.test"));
        match cli.command {
            Command::Mark {
                class,
                student,
                status,
                date,
            } => {
                assert_eq!(class, "c1");
                assert_eq!(student, "s1");
                assert_eq!(status, "late");
                assert_eq!(date.as_deref(), Some("2024-01-15"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn the_actor_can_follow_the_subcommand() {
        let cli = Cli::parse_from(["attendance", "sign-in", "--as", "ada@school.test"]);

        assert_eq!(cli.actor.as_deref(), Some("ada@school.test"));
        assert!(matches!(cli.command, Command::SignIn));
    }

    #[test]
    fn parses_my_classes() {
        let cli = Cli::parse_from(["attendance", "--as", "t@school.test", "my-classes"]);

        assert_eq!(cli.actor.as_deref(), Some("t@school.test"));
        assert!(matches!(cli.command, Command::MyClasses));
    }

    #[test]
    fn sign_in_takes_no_email_of_its_own() {
        let result = Cli::try_parse_from(["attendance", "sign-in", "--email", "a@school.test"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_roles() {
        let result = Cli::try_parse_from([
            "attendance",
            "add-user",
            "--name",
            "P",
            "--email",
            "p@school.test",
            "--role",
            "principal",
        ]);
        assert!(result.is_err());
    }
}
