use crate::manager::{Overview, StudentHistory};
use crate::models::{ClassListing, User};
use crate::roster::MergedRoster;
use crate::stats::DailyCounts;
use tabled::{Table, Tabled, settings::Style};

fn render<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}

/// Pretty prints a class roster for one day.
pub fn show_roster(class_id: &str, date: &str, roster: &MergedRoster) {
    #[derive(Tabled)]
    struct Row<'a> {
        id: &'a str,
        name: &'a str,
        email: &'a str,
        status: &'a str,
    }

    let table = render(roster.entries.iter().map(|entry| Row {
        id: &entry.student_id,
        name: &entry.student_name,
        email: &entry.email,
        status: entry.status.map_or("not marked", |s| s.as_str()),
    }));

    println!("Class {class_id} on {date}:\n{table}");
    println!(
        "Present {}/{} ({} late, {} absent, {} not marked)",
        roster.count(crate::Status::Present),
        roster.entries.len(),
        roster.count(crate::Status::Late),
        roster.count(crate::Status::Absent),
        roster.unmarked(),
    );

    for warning in &roster.warnings {
        eprintln!("Warning: {warning}");
    }
}

/// Pretty prints a student's attendance records followed by their summary.
pub fn show_history(student_id: &str, history: &StudentHistory) {
    #[derive(Tabled)]
    struct Row {
        date: String,
        class: String,
        status: String,
        recorded_by: String,
    }

    let table = render(history.records.iter().map(|record| Row {
        date: crate::models::format_date(record.date),
        class: record.class_id.clone(),
        status: record.status.to_string(),
        recorded_by: record.recorded_by.clone(),
    }));

    let s = history.summary;
    println!("Attendance of {student_id}:\n{table}");
    println!(
        "Total {}, present {}, absent {}, late {}, attendance rate {}%",
        s.total, s.present_count, s.absent_count, s.late_count, s.rate_percent
    );
}

/// Prints one line per day with a bar of present/absent/late marks.
pub fn show_trend(trend: &[DailyCounts]) {
    #[derive(Tabled)]
    struct Row {
        date: String,
        present: usize,
        absent: usize,
        late: usize,
        bar: String,
    }

    let table = render(trend.iter().map(|day| Row {
        date: day.date.format("%b %-d").to_string(),
        present: day.present,
        absent: day.absent,
        late: day.late,
        bar: format!(
            "{}{}{}",
            "P".repeat(day.present),
            "A".repeat(day.absent),
            "L".repeat(day.late)
        ),
    }));

    println!("Daily attendance:\n{table}");
}

pub fn show_classes(classes: &[ClassListing]) {
    #[derive(Tabled)]
    struct Row<'a> {
        id: &'a str,
        name: &'a str,
        description: &'a str,
        teacher: &'a str,
        students: usize,
    }

    let table = render(classes.iter().map(|listing| Row {
        id: &listing.class.id,
        name: &listing.class.name,
        description: &listing.class.description,
        teacher: &listing.teacher_name,
        students: listing.student_count,
    }));

    println!("Classes:\n{table}");
}

pub fn show_users(users: &[User]) {
    #[derive(Tabled)]
    struct Row<'a> {
        id: &'a str,
        name: &'a str,
        email: &'a str,
        role: &'a str,
    }

    let table = render(users.iter().map(|user| Row {
        id: &user.id,
        name: &user.name,
        email: &user.email,
        role: user.role.as_str(),
    }));

    println!("Users:\n{table}");
}

pub fn show_overview(overview: &Overview) {
    println!("Users:    {}", overview.total_users);
    println!("Students: {}", overview.total_students);
    println!("Teachers: {}", overview.total_teachers);
    println!("Classes:  {}", overview.total_classes);
}
