//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - Classes(ClassName, HeadTeacher, CourseName)
//! - Courses(CourseID, CourseName, Credit)
//! - Students(StudentID, StudentName, Gender, BirthDate, ClassName)
//! - Teachers(TeacherID, TeacherName, CourseID, ClassName)
//! - Scores(StudentID, CourseID, RegularScore, FinalScore)
//!
//! Foreign keys are enforced by the store; constraint violations surface to
//! the caller rather than cascading or being repaired.

pub mod schema;
pub mod sqlite;

pub use sqlite::RecordStore;
