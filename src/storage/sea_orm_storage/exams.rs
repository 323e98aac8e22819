//! 考试、题目与作答存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::exam_attempts::{
    ActiveModel as AttemptActiveModel, Column as AttemptColumn, Entity as ExamAttempts,
    Model as AttemptModel,
};
use crate::entity::exam_questions::{
    ActiveModel as QuestionActiveModel, Column as QuestionColumn, Entity as ExamQuestions,
    Model as QuestionModel,
};
use crate::entity::exams::{ActiveModel, Column, Entity as Exams, Model};
use crate::entity::question_answers::{
    ActiveModel as AnswerActiveModel, Column as AnswerColumn, Entity as QuestionAnswers,
    Model as AnswerModel,
};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationQuery,
    exams::{
        AnswerInput, AnswerMark, AttemptStatus, Exam, ExamAttempt, NewExam, NewQuestion, Question,
        QuestionAnswer, UpdateExamRequest, UpdateQuestionRequest,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

fn encode_options(options: &[String]) -> Result<Option<String>> {
    if options.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(options)?))
    }
}

impl SeaOrmStorage {
    pub async fn create_exam_impl(&self, exam: NewExam) -> Result<Exam> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            class_id: Set(exam.class_id),
            created_by: Set(exam.created_by),
            title: Set(exam.title),
            description: Set(exam.description),
            duration_minutes: Set(exam.duration_minutes),
            starts_at: Set(exam.starts_at.map(|t| t.timestamp())),
            ends_at: Set(exam.ends_at.map(|t| t.timestamp())),
            total_marks: Set(0.0),
            shuffle_questions: Set(exam.shuffle_questions),
            is_published: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(db_err("创建考试失败"))?;

        Ok(result.into_exam())
    }

    pub async fn get_exam_by_id_impl(&self, id: i64) -> Result<Option<Exam>> {
        let result = Exams::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询考试失败"))?;

        Ok(result.map(Model::into_exam))
    }

    pub async fn list_class_exams_impl(
        &self,
        class_id: i64,
        published_only: bool,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Exam>> {
        let mut select = Exams::find().filter(Column::ClassId.eq(class_id));
        if published_only {
            select = select.filter(Column::IsPublished.eq(true));
        }
        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        self.fetch_page(select, pagination, "查询考试列表失败", Model::into_exam)
            .await
    }

    pub async fn list_exams_for_classes_impl(
        &self,
        class_ids: &[i64],
        published_only: bool,
    ) -> Result<Vec<Exam>> {
        if class_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut select = Exams::find().filter(Column::ClassId.is_in(class_ids.iter().copied()));
        if published_only {
            select = select.filter(Column::IsPublished.eq(true));
        }

        let result = select
            .order_by_asc(Column::StartsAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("查询考试列表失败"))?;

        Ok(result.into_iter().map(Model::into_exam).collect())
    }

    pub async fn update_exam_impl(
        &self,
        id: i64,
        update: UpdateExamRequest,
    ) -> Result<Option<Exam>> {
        let Some(existing) = Exams::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询考试失败"))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(duration) = update.duration_minutes {
            model.duration_minutes = Set(Some(duration));
        }
        if let Some(starts_at) = update.starts_at {
            model.starts_at = Set(Some(starts_at.timestamp()));
        }
        if let Some(ends_at) = update.ends_at {
            model.ends_at = Set(Some(ends_at.timestamp()));
        }
        if let Some(shuffle) = update.shuffle_questions {
            model.shuffle_questions = Set(shuffle);
        }
        if let Some(published) = update.is_published {
            model.is_published = Set(published);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model.update(&self.db).await.map_err(db_err("更新考试失败"))?;

        Ok(Some(updated.into_exam()))
    }

    pub async fn delete_exam_impl(&self, id: i64) -> Result<bool> {
        let result = Exams::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除考试失败"))?;

        Ok(result.rows_affected > 0)
    }

    /// 按题目分值重新计算考试总分
    async fn refresh_total_marks<C: ConnectionTrait>(conn: &C, exam_id: i64) -> Result<()> {
        let marks: Vec<f64> = ExamQuestions::find()
            .select_only()
            .column(QuestionColumn::Marks)
            .filter(QuestionColumn::ExamId.eq(exam_id))
            .into_tuple::<f64>()
            .all(conn)
            .await
            .map_err(db_err("查询题目分值失败"))?;

        Exams::update_many()
            .col_expr(Column::TotalMarks, Expr::value(marks.iter().sum::<f64>()))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(exam_id))
            .exec(conn)
            .await
            .map_err(db_err("更新考试总分失败"))?;

        Ok(())
    }

    pub async fn create_question_impl(&self, question: NewQuestion) -> Result<Question> {
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let model = QuestionActiveModel {
            exam_id: Set(question.exam_id),
            question_type: Set(question.question_type.to_string()),
            prompt: Set(question.prompt),
            options: Set(encode_options(&question.options)?),
            correct_answer: Set(question.correct_answer),
            marks: Set(question.marks),
            position: Set(question.position),
            ..Default::default()
        };

        let inserted = model.insert(&txn).await.map_err(db_err("创建题目失败"))?;
        Self::refresh_total_marks(&txn, question.exam_id).await?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;

        Ok(inserted.into_question())
    }

    pub async fn get_question_by_id_impl(&self, id: i64) -> Result<Option<Question>> {
        let result = ExamQuestions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询题目失败"))?;

        Ok(result.map(QuestionModel::into_question))
    }

    pub async fn list_exam_questions_impl(&self, exam_id: i64) -> Result<Vec<Question>> {
        let result = ExamQuestions::find()
            .filter(QuestionColumn::ExamId.eq(exam_id))
            .order_by_asc(QuestionColumn::Position)
            .order_by_asc(QuestionColumn::Id)
            .all(&self.db)
            .await
            .map_err(db_err("查询题目列表失败"))?;

        Ok(result.into_iter().map(QuestionModel::into_question).collect())
    }

    pub async fn update_question_impl(
        &self,
        id: i64,
        update: UpdateQuestionRequest,
    ) -> Result<Option<Question>> {
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let Some(existing) = ExamQuestions::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err("查询题目失败"))?
        else {
            return Ok(None);
        };

        let exam_id = existing.exam_id;
        let mut model: QuestionActiveModel = existing.into();

        if let Some(question_type) = update.question_type {
            model.question_type = Set(question_type.to_string());
        }
        if let Some(prompt) = update.prompt {
            model.prompt = Set(prompt);
        }
        if let Some(options) = update.options {
            model.options = Set(encode_options(&options)?);
        }
        if let Some(correct_answer) = update.correct_answer {
            model.correct_answer = Set(Some(correct_answer));
        }
        if let Some(marks) = update.marks {
            model.marks = Set(marks);
        }
        if let Some(position) = update.position {
            model.position = Set(position);
        }

        let updated = model.update(&txn).await.map_err(db_err("更新题目失败"))?;
        Self::refresh_total_marks(&txn, exam_id).await?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;

        Ok(Some(updated.into_question()))
    }

    pub async fn delete_question_impl(&self, id: i64) -> Result<bool> {
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let Some(existing) = ExamQuestions::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err("查询题目失败"))?
        else {
            return Ok(false);
        };

        ExamQuestions::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err("删除题目失败"))?;
        Self::refresh_total_marks(&txn, existing.exam_id).await?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;

        Ok(true)
    }

    /// 开始作答，同一考试同一学生只能有一条记录
    pub async fn create_attempt_impl(
        &self,
        exam_id: i64,
        student_id: i64,
        question_order: Vec<i64>,
    ) -> Result<ExamAttempt> {
        let model = AttemptActiveModel {
            exam_id: Set(exam_id),
            student_id: Set(student_id),
            status: Set(AttemptStatus::InProgress.to_string()),
            question_order: Set(Some(serde_json::to_string(&question_order)?)),
            started_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(db_err("创建作答记录失败"))?;

        Ok(result.into_attempt())
    }

    pub async fn get_attempt_by_id_impl(&self, id: i64) -> Result<Option<ExamAttempt>> {
        let result = ExamAttempts::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询作答记录失败"))?;

        Ok(result.map(AttemptModel::into_attempt))
    }

    pub async fn get_attempt_impl(
        &self,
        exam_id: i64,
        student_id: i64,
    ) -> Result<Option<ExamAttempt>> {
        let result = ExamAttempts::find()
            .filter(AttemptColumn::ExamId.eq(exam_id))
            .filter(AttemptColumn::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询作答记录失败"))?;

        Ok(result.map(AttemptModel::into_attempt))
    }

    pub async fn list_exam_attempts_impl(
        &self,
        exam_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<ExamAttempt>> {
        let select = ExamAttempts::find()
            .filter(AttemptColumn::ExamId.eq(exam_id))
            .order_by_desc(AttemptColumn::StartedAt)
            .order_by_desc(AttemptColumn::Id);

        self.fetch_page(select, pagination, "查询作答列表失败", AttemptModel::into_attempt)
            .await
    }

    pub async fn list_student_attempts_impl(
        &self,
        student_id: i64,
        exam_ids: &[i64],
    ) -> Result<Vec<ExamAttempt>> {
        if exam_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = ExamAttempts::find()
            .filter(AttemptColumn::StudentId.eq(student_id))
            .filter(AttemptColumn::ExamId.is_in(exam_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err("查询作答记录失败"))?;

        Ok(result.into_iter().map(AttemptModel::into_attempt).collect())
    }

    /// 保存答案，同一题目重复保存时覆盖
    pub async fn save_answers_impl(
        &self,
        attempt_id: i64,
        answers: &[AnswerInput],
    ) -> Result<Vec<QuestionAnswer>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        for input in answers {
            let existing = QuestionAnswers::find()
                .filter(AnswerColumn::AttemptId.eq(attempt_id))
                .filter(AnswerColumn::QuestionId.eq(input.question_id))
                .one(&txn)
                .await
                .map_err(db_err("查询答案失败"))?;

            match existing {
                Some(model) => {
                    let mut active: AnswerActiveModel = model.into();
                    active.answer = Set(input.answer.clone());
                    active.updated_at = Set(now);
                    active.update(&txn).await.map_err(db_err("更新答案失败"))?;
                }
                None => {
                    AnswerActiveModel {
                        attempt_id: Set(attempt_id),
                        question_id: Set(input.question_id),
                        answer: Set(input.answer.clone()),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                    .map_err(db_err("保存答案失败"))?;
                }
            }
        }

        txn.commit().await.map_err(db_err("提交事务失败"))?;

        self.list_attempt_answers_impl(attempt_id).await
    }

    pub async fn list_attempt_answers_impl(&self, attempt_id: i64) -> Result<Vec<QuestionAnswer>> {
        let result = QuestionAnswers::find()
            .filter(AnswerColumn::AttemptId.eq(attempt_id))
            .order_by_asc(AnswerColumn::QuestionId)
            .all(&self.db)
            .await
            .map_err(db_err("查询答案失败"))?;

        Ok(result.into_iter().map(AnswerModel::into_answer).collect())
    }

    /// 切换作答状态并写入每题得分
    ///
    /// 状态更新带 `status = expected` 条件，并发提交时只有一个请求成功。
    pub async fn finalize_attempt_impl(
        &self,
        attempt_id: i64,
        expected: AttemptStatus,
        next: AttemptStatus,
        marks: Vec<AnswerMark>,
        score: Option<f64>,
        graded_by: Option<i64>,
    ) -> Result<Option<ExamAttempt>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let mut update = ExamAttempts::update_many()
            .col_expr(AttemptColumn::Status, Expr::value(next.as_str()))
            .filter(AttemptColumn::Id.eq(attempt_id))
            .filter(AttemptColumn::Status.eq(expected.as_str()));

        if expected == AttemptStatus::InProgress {
            update = update.col_expr(AttemptColumn::SubmittedAt, Expr::value(now));
        }
        if next == AttemptStatus::Graded {
            update = update.col_expr(AttemptColumn::GradedAt, Expr::value(now));
        }
        if let Some(score) = score {
            update = update.col_expr(AttemptColumn::Score, Expr::value(score));
        }
        if let Some(graded_by) = graded_by {
            update = update.col_expr(AttemptColumn::GradedBy, Expr::value(graded_by));
        }

        let result = update
            .exec(&txn)
            .await
            .map_err(db_err("更新作答状态失败"))?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(db_err("回滚事务失败"))?;
            return Ok(None);
        }

        for mark in marks {
            let existing = QuestionAnswers::find()
                .filter(AnswerColumn::AttemptId.eq(attempt_id))
                .filter(AnswerColumn::QuestionId.eq(mark.question_id))
                .one(&txn)
                .await
                .map_err(db_err("查询答案失败"))?;

            match existing {
                Some(model) => {
                    let mut active: AnswerActiveModel = model.into();
                    active.is_correct = Set(mark.is_correct);
                    active.marks_awarded = Set(mark.marks_awarded);
                    active.update(&txn).await.map_err(db_err("写入得分失败"))?;
                }
                // 未作答的题目补一条空答案记录
                None => {
                    AnswerActiveModel {
                        attempt_id: Set(attempt_id),
                        question_id: Set(mark.question_id),
                        answer: Set(String::new()),
                        is_correct: Set(mark.is_correct),
                        marks_awarded: Set(mark.marks_awarded),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                    .map_err(db_err("写入得分失败"))?;
                }
            }
        }

        let attempt = ExamAttempts::find_by_id(attempt_id)
            .one(&txn)
            .await
            .map_err(db_err("查询作答记录失败"))?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;

        Ok(attempt.map(AttemptModel::into_attempt))
    }

    pub async fn count_attempts_by_status_impl(
        &self,
        class_ids: &[i64],
        status: AttemptStatus,
    ) -> Result<u64> {
        if class_ids.is_empty() {
            return Ok(0);
        }

        let exam_ids: Vec<i64> = Exams::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::ClassId.is_in(class_ids.iter().copied()))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("查询考试失败"))?;

        if exam_ids.is_empty() {
            return Ok(0);
        }

        ExamAttempts::find()
            .filter(AttemptColumn::ExamId.is_in(exam_ids))
            .filter(AttemptColumn::Status.eq(status.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err("统计作答记录失败"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use super::*;
    use crate::models::classes::requests::NewClass;
    use crate::models::exams::QuestionType;
    use crate::models::users::entities::UserRole;

    async fn setup_exam(storage: &SeaOrmStorage) -> (i64, i64, Exam) {
        let teacher = seed_user(storage, "teacher1", UserRole::Teacher).await;
        let student = seed_user(storage, "student1", UserRole::Student).await;
        let class = storage
            .create_class_impl(NewClass {
                teacher_id: teacher.id,
                name: "Geography".to_string(),
                subject: None,
                description: None,
                room: None,
                schedule: None,
                capacity: None,
                class_code: "GEOG2345".to_string(),
            })
            .await
            .unwrap();
        let exam = storage
            .create_exam_impl(NewExam {
                class_id: class.id,
                created_by: teacher.id,
                title: "Midterm".to_string(),
                description: None,
                duration_minutes: Some(30),
                starts_at: None,
                ends_at: None,
                shuffle_questions: false,
            })
            .await
            .unwrap();
        (teacher.id, student.id, exam)
    }

    fn question(exam_id: i64, marks: f64, position: i32) -> NewQuestion {
        NewQuestion {
            exam_id,
            question_type: QuestionType::MultipleChoice,
            prompt: "Capital of France?".to_string(),
            options: vec!["Paris".to_string(), "Rome".to_string()],
            correct_answer: Some("Paris".to_string()),
            marks,
            position,
        }
    }

    #[tokio::test]
    async fn test_total_marks_follow_questions() {
        let storage = memory_storage().await;
        let (_, _, exam) = setup_exam(&storage).await;

        let q1 = storage.create_question_impl(question(exam.id, 2.0, 1)).await.unwrap();
        storage.create_question_impl(question(exam.id, 3.0, 2)).await.unwrap();
        assert_eq!(q1.options.len(), 2);

        let reloaded = storage.get_exam_by_id_impl(exam.id).await.unwrap().unwrap();
        assert_eq!(reloaded.total_marks, 5.0);

        storage.delete_question_impl(q1.id).await.unwrap();
        let reloaded = storage.get_exam_by_id_impl(exam.id).await.unwrap().unwrap();
        assert_eq!(reloaded.total_marks, 3.0);
    }

    #[tokio::test]
    async fn test_finalize_attempt_only_once() {
        let storage = memory_storage().await;
        let (_, student_id, exam) = setup_exam(&storage).await;
        let q = storage.create_question_impl(question(exam.id, 2.0, 1)).await.unwrap();

        let attempt = storage
            .create_attempt_impl(exam.id, student_id, vec![q.id])
            .await
            .unwrap();
        assert_eq!(attempt.question_order, vec![q.id]);

        storage
            .save_answers_impl(
                attempt.id,
                &[AnswerInput {
                    question_id: q.id,
                    answer: "Rome".to_string(),
                }],
            )
            .await
            .unwrap();
        let answers = storage
            .save_answers_impl(
                attempt.id,
                &[AnswerInput {
                    question_id: q.id,
                    answer: "Paris".to_string(),
                }],
            )
            .await
            .unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].answer, "Paris");

        let marks = vec![AnswerMark {
            question_id: q.id,
            is_correct: Some(true),
            marks_awarded: Some(2.0),
        }];
        let done = storage
            .finalize_attempt_impl(
                attempt.id,
                AttemptStatus::InProgress,
                AttemptStatus::Graded,
                marks.clone(),
                Some(2.0),
                None,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.status, AttemptStatus::Graded);
        assert_eq!(done.score, Some(2.0));
        assert!(done.submitted_at.is_some());

        let again = storage
            .finalize_attempt_impl(
                attempt.id,
                AttemptStatus::InProgress,
                AttemptStatus::Graded,
                marks,
                Some(2.0),
                None,
            )
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_second_attempt_conflicts() {
        let storage = memory_storage().await;
        let (_, student_id, exam) = setup_exam(&storage).await;

        storage.create_attempt_impl(exam.id, student_id, vec![]).await.unwrap();
        let err = storage
            .create_attempt_impl(exam.id, student_id, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, crate::errors::EduConnectError::Conflict(_)));
    }
}
