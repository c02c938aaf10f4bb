use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use school_attendance::cli::{Cli, Command};
use school_attendance::config::Settings;
use school_attendance::models::{NewClass, NewUser, format_date};
use school_attendance::writer::MarkRequest;
use school_attendance::{AttendanceManager, Session, display};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load()?;
    school_attendance::init_logging(&settings.log_level);

    let mut manager = AttendanceManager::connect(&settings.database_url)?;

    let actor = cli
        .actor
        .as_deref()
        .context("pass --as <EMAIL> to choose who is acting")?;
    let session = manager.sign_in(actor)?;

    run(&mut manager, &session, &settings, cli.command)
}

fn today() -> String {
    format_date(Local::now().date_naive())
}

fn run(
    manager: &mut AttendanceManager,
    session: &Session,
    settings: &Settings,
    command: Command,
) -> Result<()> {
    match command {
        Command::SignIn => {
            let user = session.user();
            println!("{} <{}> signed in as {} ({})", user.name, user.email, user.role, user.id);
        }
        Command::Roster { class, date } => {
            let date = date.unwrap_or_else(today);
            let roster = manager.class_roster(session, &class, &date)?;
            display::show_roster(&class, &date, &roster);
        }
        Command::Mark {
            class,
            student,
            status,
            date,
        } => {
            let date = date.unwrap_or_else(today);
            let request = MarkRequest::new(student, class, date, status);
            let record = manager.mark(session, &request)?;
            println!(
                "Marked {} as {} in {} on {}",
                record.student_id,
                record.status,
                record.class_id,
                format_date(record.date)
            );
        }
        Command::History { student, class } => {
            let student = student.unwrap_or_else(|| session.user_id().to_string());
            let history = manager.student_history(session, &student, class.as_deref())?;
            display::show_history(&student, &history);
        }
        Command::Trend {
            student,
            class,
            days,
            until,
        } => {
            let student = student.unwrap_or_else(|| session.user_id().to_string());
            let until = until.unwrap_or_else(today);
            let days = days.unwrap_or(settings.history_days);
            let trend =
                manager.student_trend(session, &student, class.as_deref(), &until, days)?;
            display::show_trend(&trend);
        }
        Command::MyClasses => display::show_classes(&manager.my_classes(session)?),
        Command::AddUser { name, email, role } => {
            let user = manager.add_user(session, NewUser { email, name, role })?;
            println!("Added {} <{}> as {} ({})", user.name, user.email, user.role, user.id);
        }
        Command::AddClass {
            name,
            description,
            teacher,
        } => {
            let class = manager.add_class(
                session,
                NewClass {
                    name,
                    description,
                    teacher_id: teacher,
                },
            )?;
            println!("Added class {} ({})", class.name, class.id);
        }
        Command::Enroll { student, class } => {
            if manager.enroll(session, &student, &class)? {
                println!("Enrolled {student} in {class}");
            } else {
                println!("{student} was already enrolled in {class}");
            }
        }
        Command::Users => display::show_users(&manager.list_users(session)?),
        Command::Classes => display::show_classes(&manager.list_classes(session)?),
        Command::Overview => display::show_overview(&manager.overview(session)?),
    }

    Ok(())
}
