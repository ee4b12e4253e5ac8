use std::io::{self, BufRead, Write};

use quiz_core::model::{Question, QuestionDraft, QuestionId, Subject};
use services::{QuestionStore, QuestionStoreError};

use crate::prompt::prompt;

enum Step {
    Continue,
    Quit,
}

/// Interactive add / remove / list loop over the question bank.
///
/// Store errors are printed and the menu is shown again. Returns on the exit
/// option or at end of input.
pub async fn run<R: BufRead, W: Write>(
    store: &QuestionStore,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    loop {
        writeln!(out, "\nQuiz Question Manager")?;
        writeln!(out, "1. Add Question")?;
        writeln!(out, "2. Remove Question")?;
        writeln!(out, "3. Read Questions")?;
        writeln!(out, "4. Exit")?;

        let Some(choice) = prompt(input, out, "\nChoose an option: ")? else {
            return Ok(());
        };
        let step = match choice.trim() {
            "1" => add(store, input, out).await?,
            "2" => remove(store, input, out).await?,
            "3" => read(store, input, out).await?,
            "4" => {
                writeln!(out, "\nExiting Quiz Question Manager.")?;
                Step::Quit
            }
            _ => {
                writeln!(out, "\nInvalid option. Please try again.")?;
                Step::Continue
            }
        };
        if let Step::Quit = step {
            return Ok(());
        }
    }
}

async fn add<R: BufRead, W: Write>(
    store: &QuestionStore,
    input: &mut R,
    out: &mut W,
) -> io::Result<Step> {
    let Some(raw) = prompt(input, out, "\nEnter subject (or shorthand letter): ")? else {
        return Ok(Step::Quit);
    };
    let subject = match Subject::normalize(raw.trim()) {
        Ok(subject) => subject,
        Err(err) => {
            writeln!(out, "\n{err}")?;
            return Ok(Step::Continue);
        }
    };

    let mut fields = Vec::with_capacity(5);
    for label in [
        "Enter question: ",
        "Enter correct answer: ",
        "Enter wrong answer 1: ",
        "Enter wrong answer 2: ",
        "Enter wrong answer 3: ",
    ] {
        let Some(value) = prompt(input, out, label)? else {
            return Ok(Step::Quit);
        };
        fields.push(value);
    }
    let Ok([text, correct, w1, w2, w3]) = <[String; 5]>::try_from(fields) else {
        return Ok(Step::Quit);
    };

    match store
        .add(QuestionDraft::new(subject, text, correct, [w1, w2, w3]))
        .await
    {
        Ok(question) => writeln!(
            out,
            "\nQuestion added to {} with ID {}",
            question.subject(),
            question.id()
        )?,
        Err(err) => report(out, &err)?,
    }
    Ok(Step::Continue)
}

async fn remove<R: BufRead, W: Write>(
    store: &QuestionStore,
    input: &mut R,
    out: &mut W,
) -> io::Result<Step> {
    let Some(raw_subject) = prompt(input, out, "\nEnter subject (or shorthand letter): ")? else {
        return Ok(Step::Quit);
    };
    let subject = match Subject::normalize(raw_subject.trim()) {
        Ok(subject) => subject,
        Err(err) => {
            writeln!(out, "\n{err}")?;
            return Ok(Step::Continue);
        }
    };
    let Some(raw_id) = prompt(input, out, "Enter question ID to remove: ")? else {
        return Ok(Step::Quit);
    };
    let id = match raw_id.parse::<QuestionId>() {
        Ok(id) => id,
        Err(err) => {
            writeln!(out, "\n{err}")?;
            return Ok(Step::Continue);
        }
    };

    match store.delete(subject.as_str(), id).await {
        Ok(()) => writeln!(out, "\nQuestion {id} removed from {subject}")?,
        Err(err) => report(out, &err)?,
    }
    Ok(Step::Continue)
}

async fn read<R: BufRead, W: Write>(
    store: &QuestionStore,
    input: &mut R,
    out: &mut W,
) -> io::Result<Step> {
    let Some(raw) = prompt(
        input,
        out,
        "\nEnter subject to read (leave blank for all, or use shorthand letter): ",
    )?
    else {
        return Ok(Step::Quit);
    };

    let listing = if raw.trim().is_empty() {
        store.list_grouped().await
    } else {
        match Subject::normalize(raw.trim()) {
            Ok(subject) => store
                .list_subject(subject)
                .await
                .map(|questions| vec![(subject, questions)]),
            Err(err) => Err(err.into()),
        }
    };

    match listing {
        Ok(groups) => {
            for (subject, questions) in &groups {
                print_group(out, *subject, questions)?;
            }
        }
        Err(err) => report(out, &err)?,
    }
    Ok(Step::Continue)
}

/// Print one subject's questions, or a note that it has none.
pub fn print_group<W: Write>(out: &mut W, subject: Subject, questions: &[Question]) -> io::Result<()> {
    if questions.is_empty() {
        return writeln!(out, "\nNo questions found in {subject}");
    }
    writeln!(out, "\nQuestions in {subject}:")?;
    for q in questions {
        let [w1, w2, w3] = q.wrong_answers();
        writeln!(
            out,
            "  [{}] {} | correct: {} | wrong: {w1}, {w2}, {w3}",
            q.id(),
            q.text(),
            q.correct_answer()
        )?;
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, err: &QuestionStoreError) -> io::Result<()> {
    if err.is_persistence() {
        tracing::error!(error = %err, "question bank operation failed");
    }
    writeln!(out, "\n{err}")
}
