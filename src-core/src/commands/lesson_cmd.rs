//! Training Commands

use crate::domain::{Feature, TrainingLesson};
use crate::repository::{Repository, TeamRepository};
use crate::session::Session;

pub async fn save_lesson(session: &Session, lesson: TrainingLesson) -> Result<TrainingLesson, String> {
    let (_, repo) = session.editor::<TrainingLesson>(Feature::Training)?;
    if lesson.title.trim().is_empty() {
        return Err("Lesson title cannot be empty.".to_string());
    }
    repo.save(lesson).await.map_err(|e| e.to_string())
}

pub async fn delete_lesson(session: &Session, id: &str) -> Result<(), String> {
    let (_, repo) = session.editor::<TrainingLesson>(Feature::Training)?;
    repo.delete(id).await.map_err(|e| e.to_string())
}

pub async fn replace_all_lessons(
    session: &Session,
    lessons: Vec<TrainingLesson>,
) -> Result<Vec<TrainingLesson>, String> {
    let (_, repo) = session.editor::<TrainingLesson>(Feature::Training)?;
    let lessons = lessons
        .into_iter()
        .map(|mut lesson| {
            lesson.id.clear();
            lesson
        })
        .collect();
    repo.replace_all(lessons).await.map_err(|e| e.to_string())
}
