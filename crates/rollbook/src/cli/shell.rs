//! Interactive menu shell.
//!
//! The menu is a dispatch table: each [`MenuEntry`] maps a number and a name
//! to a prompt routine that gathers arguments and turns them into a
//! [`Request`]. The shell hands the request to the [`RecordService`] and
//! prints the reply, so prompting never touches the store directly.

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::service::{NewStudent, RecordService, Request};
use crate::storage::LoadOutcome;
use crate::student::{parse_gpa, StudentPatch};

use super::render::{format_student, render_reply};
use super::OutputFormat;

/// What a prompt routine produced.
#[derive(Debug)]
pub enum Step {
    /// Send this request to the service.
    Run(Request),
    /// Nothing to run; print this reply as is.
    Done(crate::service::Reply),
    /// Leave the shell.
    Exit,
    /// Input ended in the middle of a prompt.
    Eof,
}

type Prompt = fn(&mut Prompter<'_>, &RecordService) -> io::Result<Step>;

/// One line of the menu.
pub struct MenuEntry {
    /// Number typed to select the entry.
    pub key: &'static str,
    /// Name typed to select the entry (case-insensitive).
    pub name: &'static str,
    /// Text shown in the menu.
    pub label: &'static str,
    prompt: Prompt,
}

impl std::fmt::Debug for MenuEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuEntry")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// The menu, in display order.
pub const MENU: &[MenuEntry] = &[
    MenuEntry {
        key: "1",
        name: "add",
        label: "Add Student",
        prompt: prompt_add,
    },
    MenuEntry {
        key: "2",
        name: "list",
        label: "View All Students",
        prompt: prompt_list,
    },
    MenuEntry {
        key: "3",
        name: "search",
        label: "Search Student",
        prompt: prompt_search,
    },
    MenuEntry {
        key: "4",
        name: "update",
        label: "Update Student",
        prompt: prompt_update,
    },
    MenuEntry {
        key: "5",
        name: "delete",
        label: "Delete Student",
        prompt: prompt_delete,
    },
    MenuEntry {
        key: "6",
        name: "filter",
        label: "Filter by Course",
        prompt: prompt_filter,
    },
    MenuEntry {
        key: "7",
        name: "stats",
        label: "View Statistics",
        prompt: prompt_stats,
    },
    MenuEntry {
        key: "8",
        name: "exit",
        label: "Exit",
        prompt: prompt_exit,
    },
];

/// Find the menu entry selected by `choice`.
#[must_use]
pub fn lookup(choice: &str) -> Option<&'static MenuEntry> {
    let choice = choice.trim();
    MENU.iter()
        .find(|e| e.key == choice || e.name.eq_ignore_ascii_case(choice))
}

/// Line-oriented prompt/answer exchange.
pub struct Prompter<'a> {
    input: &'a mut dyn BufRead,
    output: &'a mut dyn Write,
    precision: usize,
}

impl std::fmt::Debug for Prompter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prompter")
            .field("precision", &self.precision)
            .finish_non_exhaustive()
    }
}

impl<'a> Prompter<'a> {
    /// Wrap an input and output stream.
    #[must_use]
    pub fn new(input: &'a mut dyn BufRead, output: &'a mut dyn Write, precision: usize) -> Self {
        Self {
            input,
            output,
            precision,
        }
    }

    /// Print `label` and read one trimmed line; `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail.
    pub fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask for a text field.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail.
    pub fn ask_text(&mut self, label: &str) -> io::Result<Option<String>> {
        self.ask(&format!("{label}: "))
    }

    /// Ask for a replacement text field, showing `current`. A blank answer
    /// yields `Some(None)`, meaning no change.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail.
    pub fn ask_edit(
        &mut self,
        label: &str,
        current: &str,
    ) -> io::Result<Option<Option<String>>> {
        Ok(self
            .ask(&format!("{label} [{current}]: "))?
            .map(|answer| (!answer.is_empty()).then_some(answer)))
    }

    /// Ask for a GPA until a valid one is entered.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail.
    pub fn ask_gpa(&mut self, label: &str) -> io::Result<Option<f64>> {
        let prompt = format!("{label}: ");
        Ok(self.read_gpa(&prompt, false)?.flatten())
    }

    /// Ask for a replacement GPA, showing `current`. A blank answer yields
    /// `Some(None)`; anything else must parse.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail.
    pub fn ask_gpa_edit(
        &mut self,
        label: &str,
        current: f64,
    ) -> io::Result<Option<Option<f64>>> {
        let precision = self.precision;
        let prompt = format!("{label} [{current:.precision$}]: ");
        self.read_gpa(&prompt, true)
    }

    fn read_gpa(&mut self, prompt: &str, blank_ok: bool) -> io::Result<Option<Option<f64>>> {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            if blank_ok && answer.is_empty() {
                return Ok(Some(None));
            }
            match parse_gpa(&answer) {
                Ok(gpa) => return Ok(Some(Some(gpa))),
                Err(e) => {
                    debug!("Rejected GPA input: {e}");
                    writeln!(self.output, " Invalid GPA ({e}). Please enter a number.")?;
                }
            }
        }
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }
}

/// Bail out of a prompt routine when input ends.
macro_rules! answer {
    ($expr:expr) => {
        match $expr? {
            Some(value) => value,
            None => return Ok(Step::Eof),
        }
    };
}

fn prompt_add(p: &mut Prompter<'_>, _service: &RecordService) -> io::Result<Step> {
    p.say("\n--- Add New Student ---")?;
    let roll_number = answer!(p.ask_text("Roll Number"));
    let name = answer!(p.ask_text("Name"));
    let email = answer!(p.ask_text("Email"));
    let gpa = answer!(p.ask_gpa("GPA"));
    let course = answer!(p.ask_text("Course (CSE/ECE/ME/CE)"));

    Ok(Step::Run(Request::Create(NewStudent {
        roll_number,
        name,
        email,
        gpa,
        course,
    })))
}

fn prompt_list(_p: &mut Prompter<'_>, _service: &RecordService) -> io::Result<Step> {
    Ok(Step::Run(Request::List))
}

fn prompt_search(p: &mut Prompter<'_>, _service: &RecordService) -> io::Result<Step> {
    let roll_number = answer!(p.ask("\nEnter Roll Number to search: "));
    Ok(Step::Run(Request::Search { roll_number }))
}

fn prompt_update(p: &mut Prompter<'_>, service: &RecordService) -> io::Result<Step> {
    let roll_number = answer!(p.ask("\nEnter Roll Number to update: "));
    let Some(current) = service.store().find_by_key(&roll_number) else {
        return Ok(Step::Done(service.search_student(&roll_number)));
    };

    let details = format_student(&current, p.precision);
    p.say(&format!("Current Details: {details}"))?;
    p.say("(press Enter to keep a value)")?;

    let patch = StudentPatch {
        name: answer!(p.ask_edit("Enter new name", &current.name)),
        email: answer!(p.ask_edit("Enter new email", &current.email)),
        gpa: answer!(p.ask_gpa_edit("Enter new GPA", current.gpa)),
        course: answer!(p.ask_edit("Enter new course", &current.course)),
    };

    Ok(Step::Run(Request::Update {
        fields: patch.resolve(&current),
        roll_number,
    }))
}

fn prompt_delete(p: &mut Prompter<'_>, _service: &RecordService) -> io::Result<Step> {
    let roll_number = answer!(p.ask("\nEnter Roll Number to delete: "));
    Ok(Step::Run(Request::Delete { roll_number }))
}

fn prompt_filter(p: &mut Prompter<'_>, _service: &RecordService) -> io::Result<Step> {
    let course = answer!(p.ask("\nEnter Course (CSE/ECE/ME/CE): "));
    Ok(Step::Run(Request::FilterByCourse { course }))
}

fn prompt_stats(_p: &mut Prompter<'_>, _service: &RecordService) -> io::Result<Step> {
    Ok(Step::Run(Request::Statistics))
}

fn prompt_exit(_p: &mut Prompter<'_>, _service: &RecordService) -> io::Result<Step> {
    Ok(Step::Exit)
}

/// Run the menu loop until the user exits or input ends.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub fn run(
    service: &mut RecordService,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    precision: usize,
) -> io::Result<()> {
    let mut p = Prompter::new(input, output, precision);

    p.say("\nSTUDENT MANAGEMENT SYSTEM")?;
    match service.store().load_outcome() {
        LoadOutcome::Loaded { records } => {
            p.say(&format!("Data loaded from file ({records} records)"))?;
        }
        LoadOutcome::Fresh => p.say("No existing data file found. Starting fresh.")?,
        LoadOutcome::Recovered { reason } => {
            p.say(&format!("Error loading data: {reason}. Starting fresh."))?;
        }
        LoadOutcome::InMemory => {}
    }

    loop {
        p.say("")?;
        for entry in MENU {
            p.say(&format!("{}. {}", entry.key, entry.label))?;
        }
        let Some(choice) = p.ask("Enter your choice: ")? else {
            break;
        };

        let Some(entry) = lookup(&choice) else {
            p.say(" Invalid choice! Please try again.")?;
            continue;
        };
        debug!("Menu selection: {}", entry.name);

        let reply = match (entry.prompt)(&mut p, service)? {
            Step::Run(request) => service.handle(request),
            Step::Done(reply) => reply,
            Step::Exit => {
                p.say("\n Thank you for using Student Management System!")?;
                return Ok(());
            }
            Step::Eof => break,
        };

        let text = render_reply(&reply, OutputFormat::Plain, precision).map_err(io::Error::other)?;
        write!(p.output, "\n{text}")?;
    }

    p.say("")?;
    Ok(())
}
