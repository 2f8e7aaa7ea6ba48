//! The interactive enlistment session.
//!
//! One user is logged in at a time. All changes are held in memory until the
//! user saves, and leaving with unsaved changes forces an explicit save or
//! discard decision.

use std::path::PathBuf;

use enlist::{
    ClassKey, Classify, Directory, ErrorKind, Loaded, Name,
    domain::{RoleKind, admin, enrollment},
};
use tracing::instrument;

use crate::cli::{
    prompt,
    render::{self, done, report},
    terminal::Colorize,
};

#[derive(Debug, Default, clap::Parser)]
pub struct Command {}

impl Command {
    #[instrument(skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root).load()?;

        if !directory.skipped().is_empty() {
            eprintln!(
                "{}",
                format!(
                    "⚠️  {} malformed line(s) were skipped; run 'enlist validate' for details",
                    directory.skipped().len()
                )
                .warning()
            );
        }

        Session { directory }.run()
    }
}

struct Session {
    directory: Directory<Loaded>,
}

enum Exit {
    Save,
    Discard,
    Stay,
}

const MAIN_MENU: [&str; 3] = ["Admin login", "Student login", "Quit"];

const ADMIN_MENU: [&str; 9] = [
    "Create course",
    "Remove course",
    "Create class",
    "Remove class",
    "List courses",
    "List classes",
    "Change password",
    "Save changes",
    "Log out",
];

const STUDENT_MENU: [&str; 7] = [
    "Available classes",
    "Enroll in a class",
    "Drop a class",
    "My classes",
    "Change password",
    "Save changes",
    "Log out",
];

impl Session {
    fn run(mut self) -> anyhow::Result<()> {
        loop {
            match prompt::select("Enlistment", &MAIN_MENU)? {
                Some(0) => {
                    if let Some(admin) = self.login(RoleKind::Admin)? {
                        self.admin_menu(&admin)?;
                    }
                }
                Some(1) => {
                    if let Some(student) = self.login(RoleKind::Student)? {
                        self.student_menu(&student)?;
                    }
                }
                _ => match self.exit()? {
                    Exit::Save => {
                        if self.save() {
                            return Ok(());
                        }
                    }
                    Exit::Discard => {
                        let _closed = self.directory.discard();
                        return Ok(());
                    }
                    Exit::Stay => {}
                },
            }
        }
    }

    fn exit(&self) -> anyhow::Result<Exit> {
        if !self.directory.is_dirty() {
            return Ok(Exit::Save);
        }
        let choice = prompt::select(
            "You have unsaved changes",
            &["Save and quit", "Discard changes and quit", "Go back"],
        )?;
        Ok(match choice {
            Some(0) => Exit::Save,
            Some(1) => Exit::Discard,
            _ => Exit::Stay,
        })
    }

    /// Writes the records, returning whether it worked.
    fn save(&mut self) -> bool {
        if !self.directory.is_dirty() {
            return true;
        }
        match self.directory.save() {
            Ok(()) => {
                done("Changes saved");
                true
            }
            Err(e) => {
                eprintln!("{}", format!("✗ {e}").failure());
                false
            }
        }
    }

    fn login(&self, role: RoleKind) -> anyhow::Result<Option<Name>> {
        let label = match role {
            RoleKind::Admin => "Username",
            RoleKind::Student => "ID number",
        };
        let Some(id) = prompt::text(&format!("{label} (blank to cancel)"))? else {
            return Ok(None);
        };
        let secret = prompt::password("Password")?;

        match self.directory.registry().authenticate(&id, &secret, role) {
            Ok(user) => {
                done(format!("Welcome, {user}"));
                Ok(Some(user.id().clone()))
            }
            Err(e) => {
                tracing::debug!("Login failed: {e}");
                eprintln!("{}", "Invalid login details.".failure());
                Ok(None)
            }
        }
    }

    // --- admin ---

    fn admin_menu(&mut self, admin: &Name) -> anyhow::Result<()> {
        loop {
            match prompt::select(&format!("Admin: {admin}"), &ADMIN_MENU)? {
                Some(0) => self.create_course()?,
                Some(1) => self.remove_course()?,
                Some(2) => self.create_class()?,
                Some(3) => self.remove_class()?,
                Some(4) => render::print_courses(self.directory.registry().courses()),
                Some(5) => {
                    let registry = self.directory.registry();
                    render::print_classes(registry, registry.classes());
                }
                Some(6) => self.change_password(admin)?,
                Some(7) => {
                    self.save();
                }
                _ => return Ok(()),
            }
        }
    }

    fn course_names(&self) -> Vec<String> {
        self.directory
            .registry()
            .courses()
            .map(|course| course.name().to_string())
            .collect()
    }

    fn create_course(&mut self) -> anyhow::Result<()> {
        loop {
            let Some(name) = prompt::text("Course name (blank to cancel)")? else {
                return Ok(());
            };
            let Some(units) = read_units()? else {
                return Ok(());
            };

            let existing = self.course_names();
            let Some(picked) = prompt::multi_select(
                "Prerequisites (space to toggle, enter to confirm)",
                &existing,
            )?
            else {
                return Ok(());
            };
            let prerequisites: Vec<&str> = picked
                .iter()
                .filter_map(|&i| existing.get(i))
                .map(String::as_str)
                .collect();

            let config = self.directory.config().clone();
            match self.directory.apply(|registry| {
                admin::create_course(registry, &config, &name, units, &prerequisites)
            }) {
                Ok(course) => {
                    done(format!("Created course {course}"));
                    return Ok(());
                }
                Err(e) => {
                    report(&e);
                    if e.kind() != ErrorKind::ValidationFailed {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn remove_course(&mut self) -> anyhow::Result<()> {
        let names = self.course_names();
        let Some(index) = prompt::select("Course to remove", &names)? else {
            return Ok(());
        };
        let Some(name) = names.get(index) else {
            return Ok(());
        };

        match self
            .directory
            .apply(|registry| admin::remove_course(registry, name))
        {
            Ok(course) => done(format!("Removed course {}", course.name())),
            Err(e) => report(&e),
        }
        Ok(())
    }

    fn create_class(&mut self) -> anyhow::Result<()> {
        let names = self.course_names();
        if names.is_empty() {
            eprintln!("{}", "Create a course first.".warning());
            return Ok(());
        }
        let Some(index) = prompt::select("Course", &names)? else {
            return Ok(());
        };
        let Some(course) = names.get(index) else {
            return Ok(());
        };

        loop {
            let Some(classroom) = prompt::text("Classroom (blank to cancel)")? else {
                return Ok(());
            };

            let config = self.directory.config().clone();
            match self
                .directory
                .apply(|registry| admin::create_class(registry, &config, course, &classroom))
            {
                Ok(class) => {
                    done(format!("Created class {}", class.key()));
                    return Ok(());
                }
                Err(e) => {
                    report(&e);
                    if e.kind() != ErrorKind::ValidationFailed {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn remove_class(&mut self) -> anyhow::Result<()> {
        let classes: Vec<(ClassKey, usize)> = self
            .directory
            .registry()
            .classes()
            .map(|class| (class.key().clone(), class.roster().len()))
            .collect();
        let labels: Vec<String> = classes
            .iter()
            .map(|(key, enrolled)| format!("{key} ({enrolled} enrolled)"))
            .collect();

        let Some(index) = prompt::select("Class to remove", &labels)? else {
            return Ok(());
        };
        let Some((key, enrolled)) = classes.get(index) else {
            return Ok(());
        };

        if *enrolled > 0
            && !prompt::confirm(
                &format!("{enrolled} student(s) will lose their seat. Remove anyway?"),
                false,
            )?
        {
            return Ok(());
        }

        match self
            .directory
            .apply(|registry| admin::remove_class(registry, &key.course, &key.classroom))
        {
            Ok(class) => done(format!("Removed class {}", class.key())),
            Err(e) => report(&e),
        }
        Ok(())
    }

    // --- student ---

    fn student_menu(&mut self, student: &Name) -> anyhow::Result<()> {
        loop {
            match prompt::select(&format!("Student: {student}"), &STUDENT_MENU)? {
                Some(0) => self.show_available(student)?,
                Some(1) => self.enroll(student)?,
                Some(2) => self.drop_class(student)?,
                Some(3) => self.show_enrolled(student)?,
                Some(4) => self.change_password(student)?,
                Some(5) => {
                    self.save();
                }
                _ => return Ok(()),
            }
        }
    }

    fn show_available(&self, student: &Name) -> anyhow::Result<()> {
        let registry = self.directory.registry();
        let available = enrollment::available_classes(registry, student)?;
        render::print_classes(registry, available);
        println!(
            "{}",
            format!(
                "Units remaining: {}",
                enrollment::units_remaining(registry, student)?
            )
            .dim()
        );
        Ok(())
    }

    fn show_enrolled(&self, student: &Name) -> anyhow::Result<()> {
        let registry = self.directory.registry();
        let enrolled = enrollment::enrolled_classes(registry, student)?;
        render::print_classes(registry, enrolled);

        let prior: Vec<&str> = registry
            .prior_courses(student)
            .into_iter()
            .map(Name::as_str)
            .collect();
        if !prior.is_empty() {
            println!("{}", format!("Completed: {}", prior.join(", ")).dim());
        }
        println!(
            "{}",
            format!(
                "Units remaining: {}",
                enrollment::units_remaining(registry, student)?
            )
            .dim()
        );
        Ok(())
    }

    fn class_choices(&self, classes: &[&enlist::Class]) -> (Vec<ClassKey>, Vec<String>) {
        let registry = self.directory.registry();
        classes
            .iter()
            .map(|class| {
                let units = registry
                    .course(class.course())
                    .map_or(0, |course| course.units().get());
                (
                    class.key().clone(),
                    format!("{} ({units} units)", class.key()),
                )
            })
            .unzip()
    }

    fn enroll(&mut self, student: &Name) -> anyhow::Result<()> {
        let (keys, labels) = {
            let available = enrollment::available_classes(self.directory.registry(), student)?;
            self.class_choices(&available)
        };
        if keys.is_empty() {
            println!("{}", "No classes are available to you.".dim());
            return Ok(());
        }

        let Some(index) = prompt::select("Class to enroll in", &labels)? else {
            return Ok(());
        };
        let Some(key) = keys.get(index) else {
            return Ok(());
        };

        match self
            .directory
            .apply(|registry| enrollment::enroll(registry, student, key))
        {
            Ok(()) => done(format!("Enrolled in {key}")),
            Err(e) => report(&e),
        }
        Ok(())
    }

    fn drop_class(&mut self, student: &Name) -> anyhow::Result<()> {
        let (keys, labels) = {
            let enrolled = enrollment::enrolled_classes(self.directory.registry(), student)?;
            self.class_choices(&enrolled)
        };
        if keys.is_empty() {
            println!("{}", "You are not enrolled in any class.".dim());
            return Ok(());
        }

        let Some(index) = prompt::select("Class to drop", &labels)? else {
            return Ok(());
        };
        let Some(key) = keys.get(index) else {
            return Ok(());
        };

        match self
            .directory
            .apply(|registry| enrollment::drop_class(registry, student, key))
        {
            Ok(()) => done(format!("Dropped {key}")),
            Err(e) => report(&e),
        }
        Ok(())
    }

    fn change_password(&mut self, user: &Name) -> anyhow::Result<()> {
        let old = prompt::password("Current password")?;
        let new = prompt::password("New password")?;
        let confirm = prompt::password("Confirm new password")?;

        match self
            .directory
            .apply(|registry| registry.change_password(user, &old, &new, &confirm))
        {
            Ok(()) => done("Password changed"),
            Err(e) => report(&e),
        }
        Ok(())
    }
}

/// Prompts until the answer is a whole number. `None` if cancelled.
fn read_units() -> anyhow::Result<Option<i64>> {
    loop {
        let Some(raw) = prompt::text("Units (0-50)")? else {
            return Ok(None);
        };
        match raw.parse::<i64>() {
            Ok(units) => return Ok(Some(units)),
            Err(_) => eprintln!("{}", "Units must be a whole number.".warning()),
        }
    }
}
