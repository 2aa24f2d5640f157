//! Fixtures shared by the unit tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;

use crate::model::{FieldKind, Model, Schema};
use crate::request::PageRequest;

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub is_active: bool,
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

static PERSON_SCHEMA: Lazy<Schema<Person>> = Lazy::new(|| {
    Schema::<Person>::builder("people")
        .field("id", FieldKind::Integer, |p| p.id.into())
        .field("name", FieldKind::String, |p| p.name.clone().into())
        .field("email", FieldKind::String, |p| p.email.clone().into())
        .field("age", FieldKind::Integer, |p| p.age.into())
        .field("is_active", FieldKind::Boolean, |p| p.is_active.into())
        .field("score", FieldKind::Float, |p| p.score.into())
        .field("created_at", FieldKind::DateTime, |p| p.created_at.into())
        .build()
});

impl Model for Person {
    fn schema() -> &'static Schema<Self> {
        &PERSON_SCHEMA
    }
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn person(id: i64, name: &str, email: &str, age: i64, is_active: bool, score: Option<f64>) -> Person {
    Person {
        id,
        name: name.to_string(),
        email: email.to_string(),
        age,
        is_active,
        score,
        created_at: epoch() + Duration::days(id),
    }
}

/// John (17, active), Jane (20, active), Bob (30, inactive)
pub fn people() -> Vec<Person> {
    vec![
        person(1, "John Doe", "jd@example.com", 17, true, Some(1.5)),
        person(2, "Jane", "jane@example.com", 20, true, Some(2.0)),
        person(3, "Bob", "bob@example.com", 30, false, None),
    ]
}

/// Ids `1..=n`; even ids are active
pub fn numbered(n: i64) -> Vec<Person> {
    (1..=n)
        .map(|id| {
            person(
                id,
                &format!("person-{id}"),
                &format!("p{id}@example.com"),
                18 + id % 40,
                id % 2 == 0,
                None,
            )
        })
        .collect()
}

/// `n` rows sharing one `created_at`
pub fn tied(n: i64) -> Vec<Person> {
    numbered(n)
        .into_iter()
        .map(|p| Person {
            created_at: epoch(),
            ..p
        })
        .collect()
}

pub fn request(query: &str) -> PageRequest {
    let url = if query.is_empty() {
        "http://testserver/api/people".to_string()
    } else {
        format!("http://testserver/api/people?{query}")
    };
    PageRequest::parse(&url).unwrap()
}
