//! Plain-text tables shared by the session and the listing commands.

use std::fmt::Display;

use enlist::{Class, Classify, Course, Registry};

use crate::cli::terminal::Colorize;

fn prerequisites(course: &Course) -> String {
    if course.prerequisites().is_empty() {
        "-".to_string()
    } else {
        course
            .prerequisites()
            .iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Prints one row per course.
pub fn print_courses<'a>(courses: impl IntoIterator<Item = &'a Course>) {
    let courses: Vec<&Course> = courses.into_iter().collect();
    if courses.is_empty() {
        println!("{}", "No courses.".dim());
        return;
    }

    println!("{}", format!("{:<20} {:>5}  PREREQUISITES", "COURSE", "UNITS").heading());
    for course in courses {
        println!(
            "{:<20} {:>5}  {}",
            course.name(),
            course.units(),
            prerequisites(course)
        );
    }
}

/// Prints one row per class, with the units of its course.
pub fn print_classes<'a>(registry: &Registry, classes: impl IntoIterator<Item = &'a Class>) {
    let classes: Vec<&Class> = classes.into_iter().collect();
    if classes.is_empty() {
        println!("{}", "No classes.".dim());
        return;
    }

    println!(
        "{}",
        format!("{:<20} {:<20} {:>5} {:>8}", "COURSE", "CLASSROOM", "UNITS", "ENROLLED").heading()
    );
    for class in classes {
        let units = registry
            .course(class.course())
            .map_or_else(|| "?".to_string(), |course| course.units().to_string());
        println!(
            "{:<20} {:<20} {:>5} {:>8}",
            class.course(),
            class.classroom(),
            units,
            class.roster().len()
        );
    }
}

/// Prints a recoverable failure with its category.
pub fn report<E: Classify + Display>(error: &E) {
    eprintln!("{}", format!("✗ {}: {error}", error.kind()).failure());
}

/// Prints a confirmation.
pub fn done(message: impl Display) {
    println!("{}", format!("✓ {message}").success());
}
