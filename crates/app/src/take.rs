use std::io::{self, BufRead, Write};

use quiz_core::model::Subject;
use services::quiz::QuizItem;
use services::{QuizError, QuizService, QuizState, Score};

use crate::prompt::prompt;

/// Terminal quiz loop: pick a subject, answer, submit, review, repeat.
///
/// Returns when the user chooses to exit or input ends.
pub async fn run<R: BufRead, W: Write>(
    service: &QuizService,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    let mut state = QuizState::default();
    loop {
        let Some(subject) = select_subject(input, out)? else {
            return Ok(());
        };

        match service.start(&mut state, subject).await {
            Ok(()) => {}
            Err(QuizError::EmptySubject(subject)) => {
                writeln!(out, "\nNo questions available for {subject}.")?;
                continue;
            }
            Err(err) => {
                if err.is_persistence() {
                    tracing::error!(error = %err, %subject, "could not start quiz");
                }
                writeln!(out, "\n{err}")?;
                continue;
            }
        }

        if !answer_all(&mut state, input, out)? {
            return Ok(());
        }

        let score = service.submit(&mut state).map_err(io::Error::other)?;
        show_results(&state, score, out)?;

        if !choose_another(input, out)? {
            return Ok(());
        }
        state.reset().map_err(io::Error::other)?;
    }
}

fn select_subject<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<Option<Subject>> {
    writeln!(out, "\nWelcome to the Quiz Application!")?;
    writeln!(out, "Choose a subject to start the quiz:")?;
    for subject in Subject::ALL {
        writeln!(out, "  {} ({})", subject, subject.shorthand())?;
    }

    loop {
        let Some(line) = prompt(input, out, "Subject: ")? else {
            return Ok(None);
        };
        match Subject::normalize(line.trim()) {
            Ok(subject) => return Ok(Some(subject)),
            Err(err) => writeln!(out, "{err}")?,
        }
    }
}

/// Walk every question once, then let the user revise until `submit`.
/// Returns `false` at end of input.
fn answer_all<R: BufRead, W: Write>(
    state: &mut QuizState,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    let items: Vec<QuizItem> = state
        .in_progress()
        .map(|quiz| quiz.items().to_vec())
        .unwrap_or_default();
    let total = items.len();

    for (n, item) in items.iter().enumerate() {
        if !ask(state, n + 1, total, item, input, out)? {
            return Ok(false);
        }
    }

    loop {
        if let Some(progress) = state.progress() {
            if progress.unanswered > 0 {
                writeln!(
                    out,
                    "\n{} of {} questions are still unanswered.",
                    progress.unanswered, progress.total
                )?;
            }
        }
        let Some(line) = prompt(
            input,
            out,
            "Type 'submit' to finish, or a question number to change its answer: ",
        )?
        else {
            return Ok(false);
        };

        let line = line.trim();
        if line.eq_ignore_ascii_case("submit") {
            return Ok(true);
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=total).contains(&n) => {
                if !ask(state, n, total, &items[n - 1], input, out)? {
                    return Ok(false);
                }
            }
            _ => writeln!(out, "Please enter 'submit' or a number between 1 and {total}.")?,
        }
    }
}

/// Show one question and read a choice; a blank line leaves it unanswered.
fn ask<R: BufRead, W: Write>(
    state: &mut QuizState,
    position: usize,
    total: usize,
    item: &QuizItem,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    writeln!(out, "\nQuestion {position} of {total}: {}", item.text())?;
    for (i, choice) in item.choices().iter().enumerate() {
        writeln!(out, "  {}. {choice}", i + 1)?;
    }
    let current = state
        .in_progress()
        .and_then(|quiz| quiz.item(item.id()))
        .and_then(QuizItem::selected);
    if let Some(current) = current {
        writeln!(out, "  (current answer: {current})")?;
    }

    let count = item.choices().len();
    loop {
        let Some(line) = prompt(input, out, &format!("Your answer (1-{count}, blank to skip): "))?
        else {
            return Ok(false);
        };
        let line = line.trim();
        if line.is_empty() {
            state.clear_answer(item.id()).map_err(io::Error::other)?;
            return Ok(true);
        }
        match line.parse::<usize>() {
            Ok(k) if (1..=count).contains(&k) => {
                state
                    .record_answer(item.id(), item.choices()[k - 1].clone())
                    .map_err(io::Error::other)?;
                return Ok(true);
            }
            _ => writeln!(out, "Please enter a number between 1 and {count}.")?,
        }
    }
}

fn show_results<W: Write>(state: &QuizState, score: Score, out: &mut W) -> io::Result<()> {
    writeln!(out, "\nYou scored {score}")?;
    if let Some(done) = state.completed() {
        writeln!(out, "Time taken: {}s", done.duration().num_seconds())?;
    }

    let review = state.review().map_err(io::Error::other)?;
    for (n, entry) in review.iter().enumerate() {
        let mark = if entry.is_correct { '✔' } else { '✘' };
        writeln!(out, "\n{mark} Question {}: {}", n + 1, entry.question_text)?;
        writeln!(
            out,
            "  Your answer: {}",
            entry.selected.as_deref().unwrap_or("(no answer)")
        )?;
        writeln!(out, "  Correct answer: {}", entry.correct_answer)?;
    }
    Ok(())
}

fn choose_another<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<bool> {
    loop {
        writeln!(out, "\n1. Choose Another Quiz")?;
        writeln!(out, "2. Exit")?;
        let Some(line) = prompt(input, out, "Choose an option: ")? else {
            return Ok(false);
        };
        match line.trim() {
            "1" => return Ok(true),
            "2" => return Ok(false),
            _ => writeln!(out, "Invalid option. Please try again.")?,
        }
    }
}
