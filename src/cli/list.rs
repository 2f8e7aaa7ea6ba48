use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use enlist::{Directory, Registry, domain::Role};
use serde::Serialize;
use tracing::instrument;

use crate::cli::{render, terminal::Colorize};

/// Command arguments for `enlist list`.
#[derive(Debug, Parser)]
#[command(about = "List courses, classes, accounts, or enrollment history")]
pub struct Command {
    /// Which records to list.
    #[arg(value_enum)]
    records: Records,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Records {
    Courses,
    Classes,
    Users,
    History,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Serialize)]
struct CourseRow<'a> {
    name: &'a str,
    units: u32,
    prerequisites: Vec<&'a str>,
}

#[derive(Serialize)]
pub struct ClassRow<'a> {
    course: &'a str,
    classroom: &'a str,
    units: Option<u32>,
    roster: Vec<&'a str>,
}

impl<'a> ClassRow<'a> {
    pub fn new(registry: &'a Registry, class: &'a enlist::Class) -> Self {
        Self {
            course: class.course(),
            classroom: class.classroom(),
            units: registry
                .course(class.course())
                .map(|course| course.units().get()),
            roster: class.roster().iter().map(|id| id.as_str()).collect(),
        }
    }
}

#[derive(Serialize)]
struct UserRow<'a> {
    id: &'a str,
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit_limit: Option<u32>,
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    student: &'a str,
    courses: Vec<&'a str>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root).load()?;
        let registry = directory.registry();

        match (self.records, self.format) {
            (Records::Courses, OutputFormat::Table) => render::print_courses(registry.courses()),
            (Records::Classes, OutputFormat::Table) => {
                render::print_classes(registry, registry.classes());
            }
            (Records::Users, OutputFormat::Table) => print_users(registry),
            (Records::History, OutputFormat::Table) => print_history(registry),
            (records, OutputFormat::Json) => {
                println!("{}", to_json(registry, records)?);
            }
        }
        Ok(())
    }
}

fn to_json(registry: &Registry, records: Records) -> serde_json::Result<String> {
    match records {
        Records::Courses => serde_json::to_string_pretty(
            &registry
                .courses()
                .map(|course| CourseRow {
                    name: course.name(),
                    units: course.units().get(),
                    prerequisites: course.prerequisites().iter().map(|p| p.as_str()).collect(),
                })
                .collect::<Vec<_>>(),
        ),
        Records::Classes => serde_json::to_string_pretty(
            &registry
                .classes()
                .map(|class| ClassRow::new(registry, class))
                .collect::<Vec<_>>(),
        ),
        Records::Users => serde_json::to_string_pretty(
            &registry
                .users()
                .map(|user| match user.role() {
                    Role::Admin => UserRow {
                        id: user.id(),
                        role: "admin",
                        name: None,
                        unit_limit: None,
                    },
                    Role::Student(profile) => UserRow {
                        id: user.id(),
                        role: "student",
                        name: Some(profile.display_name.as_str()),
                        unit_limit: Some(profile.unit_limit),
                    },
                })
                .collect::<Vec<_>>(),
        ),
        Records::History => serde_json::to_string_pretty(
            &registry
                .history()
                .map(|record| HistoryRow {
                    student: record.student(),
                    courses: record.courses().iter().map(|c| c.as_str()).collect(),
                })
                .collect::<Vec<_>>(),
        ),
    }
}

fn print_users(registry: &Registry) {
    println!(
        "{}",
        format!("{:<20} {:<8} {:<30} {:>5}", "ID", "ROLE", "NAME", "LIMIT").heading()
    );
    for user in registry.users() {
        match user.role() {
            Role::Admin => println!("{:<20} {:<8}", user.id(), "admin"),
            Role::Student(profile) => println!(
                "{:<20} {:<8} {:<30} {:>5}",
                user.id(),
                "student",
                profile.display_name,
                profile.unit_limit
            ),
        }
    }
}

fn print_history(registry: &Registry) {
    let mut any = false;
    for record in registry.history() {
        any = true;
        let courses: Vec<&str> = record.courses().iter().map(|c| c.as_str()).collect();
        let courses = if courses.is_empty() {
            "-".to_string()
        } else {
            courses.join(", ")
        };
        println!("{:<20} {courses}", record.student());
    }
    if !any {
        println!("{}", "No enrollment history.".dim());
    }
}
