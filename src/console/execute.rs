use std::fmt::Write;

use crate::{
    scheduling::Clock,
    session::Session,
    sponsored,
    units::SlideDirection,
};

use super::{Command, HELP, render_anniversary, render_fired, render_progress, render_timeline};

/// Applies `command` to the session and returns the text to show. Every
/// time-dependent step reads `clock` once, so commands and ticks agree on
/// what "now" is.
pub fn execute(session: &mut Session, command: Command, clock: &dyn Clock, placeholder_count: usize) -> String {
    let now = clock.now();

    match command {
        Command::Birth(entry) => match session.enter_birth_date(entry, now) {
            Ok(Some(_)) => "Birth date saved".to_owned(),
            Ok(None) => "Birth date cleared".to_owned(),
            Err(error) => error.to_string(),
        },
        Command::Add(form) => match session.add_anniversary(form, now) {
            Ok(added) => format!("Added {}", render_anniversary(&added, now)),
            Err(error) => error.to_string(),
        },
        Command::Edit { id, form } => {
            let Some(target) = session.find_anniversary(&id).map(|a| a.id.clone()) else {
                return no_match(&id);
            };
            match session.update_anniversary(&target, form, now) {
                Ok(_) => format!("Updated {}", target),
                Err(error) => error.to_string(),
            }
        }
        Command::Remove { id } => {
            let Some(target) = session.find_anniversary(&id).map(|a| a.id.clone()) else {
                return no_match(&id);
            };
            match session.remove_anniversary(&target) {
                Some(removed) => format!("Removed {}", removed.name),
                None => no_match(&id),
            }
        }
        Command::Unit(unit) => {
            session.navigator_mut().change_unit(unit);
            status(session)
        }
        Command::Next => {
            session.navigator_mut().page(SlideDirection::Forward);
            status(session)
        }
        Command::Prev => {
            session.navigator_mut().page(SlideDirection::Backward);
            status(session)
        }
        Command::Dismiss => match session.dismiss_alarm() {
            Some(dismissed) => format!("Dismissed {}", dismissed.name),
            None => "No alarm is ringing".to_owned(),
        },
        Command::Hide { id } => {
            if session.hide_sponsored_item(&id) {
                format!("Hidden {}", id)
            } else {
                format!("{} is already hidden", id)
            }
        }
        Command::Lang(language) => {
            session.set_language(language);
            if sponsored::is_placeholder_pool(session.sponsored_pool()) {
                let localized = sponsored::or_placeholders(Vec::new(), placeholder_count, language);
                session.replace_sponsored_pool(localized);
            }
            format!("Language set to {}", language)
        }
        Command::List { page } => render_timeline(&session.timeline(now), page, now),
        Command::Status => status(session),
        Command::Help => HELP.to_owned(),
        Command::Quit => String::new(),
    }
}

fn no_match(id: &str) -> String {
    format!("No single anniversary matches `{}`", id)
}

fn status(session: &Session) -> String {
    let mut out = render_progress(session.last_progress(), session.navigator().current());
    if let Some(alarm) = session.active_alarm() {
        let _ = write!(out, "\n{}", render_fired(alarm));
    }
    out
}
