use quiz_core::model::{QuestionDraft, Subject};
use services::{QuestionStore, QuestionStoreError};

type Sample = (&'static str, &'static str, [&'static str; 3]);

const MATH: &[Sample] = &[
    ("What is 7 x 8?", "56", ["54", "48", "64"]),
    ("What is the square root of 81?", "9", ["8", "7", "81"]),
    ("How many degrees are in a right angle?", "90", ["180", "45", "360"]),
];

const SCIENCE: &[Sample] = &[
    ("What gas do plants absorb from the air?", "Carbon dioxide", ["Oxygen", "Nitrogen", "Helium"]),
    ("What is the chemical symbol for gold?", "Au", ["Ag", "Gd", "Go"]),
    ("Which planet is closest to the Sun?", "Mercury", ["Venus", "Mars", "Earth"]),
];

const ENGLISH: &[Sample] = &[
    ("Which word is a noun?", "Table", ["Quickly", "Run", "Blue"]),
    ("What is the plural of \"mouse\"?", "Mice", ["Mouses", "Meese", "Mousen"]),
    ("Which is a synonym of \"happy\"?", "Joyful", ["Gloomy", "Tired", "Angry"]),
];

const HISTORY: &[Sample] = &[
    ("In which year did the Battle of Hastings take place?", "1066", ["1215", "1415", "966"]),
    ("Who was the first President of the United States?", "George Washington", ["John Adams", "Thomas Jefferson", "Abraham Lincoln"]),
    ("Which empire built Machu Picchu?", "Inca", ["Aztec", "Maya", "Olmec"]),
];

const GEOGRAPHY: &[Sample] = &[
    ("What is the capital of Australia?", "Canberra", ["Sydney", "Melbourne", "Perth"]),
    ("Which is the longest river in South America?", "Amazon", ["Parana", "Orinoco", "Magdalena"]),
    ("On which continent is Kenya?", "Africa", ["Asia", "South America", "Oceania"]),
];

fn samples(subject: Subject) -> &'static [Sample] {
    match subject {
        Subject::Math => MATH,
        Subject::Science => SCIENCE,
        Subject::English => ENGLISH,
        Subject::History => HISTORY,
        Subject::Geography => GEOGRAPHY,
    }
}

/// Insert the sample questions into every subject that has none.
///
/// Returns the subjects that were filled and how many questions each got.
///
/// # Errors
///
/// Returns the first `QuestionStoreError`; subjects seeded before it stay seeded.
pub async fn seed_empty_subjects(
    store: &QuestionStore,
) -> Result<Vec<(Subject, usize)>, QuestionStoreError> {
    let mut seeded = Vec::new();
    for subject in Subject::ALL {
        if store.count(subject).await? > 0 {
            tracing::debug!(%subject, "subject already has questions; not seeding");
            continue;
        }
        let questions = samples(subject);
        for (text, correct, wrong) in questions {
            store
                .add(QuestionDraft::new(
                    subject,
                    *text,
                    *correct,
                    wrong.map(String::from),
                ))
                .await?;
        }
        seeded.push((subject, questions.len()));
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::Storage;

    #[tokio::test]
    async fn fills_only_empty_subjects() {
        let store = QuestionStore::new(Storage::in_memory().questions);
        store
            .create("g", "Own question", "yes", ["a".into(), "b".into(), "c".into()])
            .await
            .unwrap();

        let seeded = seed_empty_subjects(&store).await.unwrap();

        let subjects: Vec<Subject> = seeded.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            subjects,
            vec![Subject::Math, Subject::Science, Subject::English, Subject::History]
        );
        assert_eq!(store.count(Subject::Geography).await.unwrap(), 1);
        assert_eq!(store.count(Subject::Math).await.unwrap(), 3);

        assert!(seed_empty_subjects(&store).await.unwrap().is_empty());
    }

    #[test]
    fn samples_have_distinct_correct_answers() {
        for subject in Subject::ALL {
            for (_, correct, wrong) in samples(subject) {
                assert!(!wrong.contains(correct), "{subject}: {correct}");
            }
        }
    }
}
