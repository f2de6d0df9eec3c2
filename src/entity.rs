//! Entity registry - static descriptors for the five record types
//!
//! The school domain is a fixed, closed set of entities:
//! - `Class`: home room keyed by name
//! - `Course`: taught subject with a credit value
//! - `Student`: enrolled pupil, key assigned by the store
//! - `Teacher`: staff member tied to a course and a class
//! - `Score`: per-student per-course grades, composite key
//!
//! Each entity has exactly one [`EntityDescriptor`], the single source of
//! truth for column order, primary key, and foreign keys. Schema bootstrap,
//! input parsing, and CRUD all read the descriptor; none of them hardcodes
//! column lists of their own.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The five fixed record types.
///
/// The set is closed: dispatch happens over this enum, so an unknown entity
/// cannot reach the storage layer. Only user-facing name parsing can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Student,
    Class,
    Teacher,
    Course,
    Score,
}

impl Entity {
    /// Get the string representation of the entity
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Student => "Student",
            Entity::Class => "Class",
            Entity::Teacher => "Teacher",
            Entity::Course => "Course",
            Entity::Score => "Score",
        }
    }

    /// All entities, in the fixed presentation order
    pub fn all() -> &'static [Entity] {
        &[
            Entity::Student,
            Entity::Class,
            Entity::Teacher,
            Entity::Course,
            Entity::Score,
        ]
    }

    /// The static descriptor for this entity
    pub fn descriptor(&self) -> &'static EntityDescriptor {
        match self {
            Entity::Student => &STUDENT,
            Entity::Class => &CLASS,
            Entity::Teacher => &TEACHER,
            Entity::Course => &COURSE,
            Entity::Score => &SCORE,
        }
    }
}

impl FromStr for Entity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "student" | "students" => Ok(Entity::Student),
            "class" | "classes" => Ok(Entity::Class),
            "teacher" | "teachers" => Ok(Entity::Teacher),
            "course" | "courses" => Ok(Entity::Course),
            "score" | "scores" => Ok(Entity::Score),
            _ => Err(Error::UnknownEntity(s.to_string())),
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Text,
    /// Calendar date, `%Y-%m-%d` on the wire and in display
    Date,
}

/// A single column: name plus declared type
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
}

impl Field {
    const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

/// A foreign key from one column to another entity's column
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: Entity,
    pub target_column: &'static str,
}

/// Static metadata for one entity: the source of truth consumed by schema
/// bootstrap, the input parser, and the record store.
#[derive(Debug)]
pub struct EntityDescriptor {
    pub entity: Entity,
    /// Backing table name
    pub table: &'static str,
    /// All columns in store order
    pub fields: &'static [Field],
    /// Columns forming the primary key
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
    /// Whether the key is assigned by the store on insert (Student only)
    pub generated_key: bool,
}

impl EntityDescriptor {
    /// Columns supplied by the caller on insert. For a generated key the
    /// leading key column is skipped, matching the store's assignment.
    pub fn insert_fields(&self) -> &'static [Field] {
        if self.generated_key {
            &self.fields[1..]
        } else {
            self.fields
        }
    }

    /// Whether the named column is part of the primary key
    pub fn is_key(&self, name: &str) -> bool {
        self.primary_key.contains(&name)
    }

    /// Key columns, in store order
    pub fn key_fields(&self) -> impl Iterator<Item = &'static Field> + '_ {
        self.fields.iter().filter(|f| self.is_key(f.name))
    }

    /// Non-key columns, in store order
    pub fn non_key_fields(&self) -> impl Iterator<Item = &'static Field> + '_ {
        self.fields.iter().filter(|f| !self.is_key(f.name))
    }

    /// Column names, in store order
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

static CLASS: EntityDescriptor = EntityDescriptor {
    entity: Entity::Class,
    table: "Classes",
    fields: &[
        Field::new("ClassName", FieldType::Text),
        // HeadTeacher and CourseName are free text, not enforced references
        Field::new("HeadTeacher", FieldType::Text),
        Field::new("CourseName", FieldType::Text),
    ],
    primary_key: &["ClassName"],
    foreign_keys: &[],
    generated_key: false,
};

static COURSE: EntityDescriptor = EntityDescriptor {
    entity: Entity::Course,
    table: "Courses",
    fields: &[
        Field::new("CourseID", FieldType::Integer),
        Field::new("CourseName", FieldType::Text),
        Field::new("Credit", FieldType::Integer),
    ],
    primary_key: &["CourseID"],
    foreign_keys: &[],
    generated_key: false,
};

static STUDENT: EntityDescriptor = EntityDescriptor {
    entity: Entity::Student,
    table: "Students",
    fields: &[
        Field::new("StudentID", FieldType::Integer),
        Field::new("StudentName", FieldType::Text),
        Field::new("Gender", FieldType::Text),
        Field::new("BirthDate", FieldType::Date),
        Field::new("ClassName", FieldType::Text),
    ],
    primary_key: &["StudentID"],
    foreign_keys: &[ForeignKey {
        column: "ClassName",
        references: Entity::Class,
        target_column: "ClassName",
    }],
    generated_key: true,
};

static TEACHER: EntityDescriptor = EntityDescriptor {
    entity: Entity::Teacher,
    table: "Teachers",
    fields: &[
        Field::new("TeacherID", FieldType::Integer),
        Field::new("TeacherName", FieldType::Text),
        Field::new("CourseID", FieldType::Integer),
        Field::new("ClassName", FieldType::Text),
    ],
    primary_key: &["TeacherID"],
    foreign_keys: &[
        ForeignKey {
            column: "CourseID",
            references: Entity::Course,
            target_column: "CourseID",
        },
        ForeignKey {
            column: "ClassName",
            references: Entity::Class,
            target_column: "ClassName",
        },
    ],
    generated_key: false,
};

static SCORE: EntityDescriptor = EntityDescriptor {
    entity: Entity::Score,
    table: "Scores",
    fields: &[
        Field::new("StudentID", FieldType::Integer),
        Field::new("CourseID", FieldType::Integer),
        Field::new("RegularScore", FieldType::Integer),
        Field::new("FinalScore", FieldType::Integer),
    ],
    primary_key: &["StudentID", "CourseID"],
    foreign_keys: &[
        ForeignKey {
            column: "StudentID",
            references: Entity::Student,
            target_column: "StudentID",
        },
        ForeignKey {
            column: "CourseID",
            references: Entity::Course,
            target_column: "CourseID",
        },
    ],
    generated_key: false,
};
